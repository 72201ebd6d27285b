use clap::Parser;
use link_scout::{ScanRequest, Scout, ScoutConfig, SiteProgress};
use std::error::Error;
use tokio::sync::mpsc;

mod args;
use args::{Args, keyword_list, parse_url_list};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ScoutConfig::from_file(path)?,
        None => ScoutConfig::default(),
    };
    args.apply_overrides(&mut config);

    let mut urls = args.urls.clone();
    if let Some(path) = &args.urls_file {
        urls.extend(parse_url_list(&std::fs::read_to_string(path)?));
    }
    if urls.is_empty() {
        return Err("no URLs given (pass them as arguments or with --urls-file)".into());
    }

    let request = ScanRequest {
        urls,
        positive_keywords: keyword_list(&args.keywords),
        strong_negative_keywords: keyword_list(&args.strong_negative),
        weak_negative_keywords: keyword_list(&args.weak_negative),
    };

    ::log::info!(
        "Starting scan of {} URLs with concurrency {}",
        request.urls.len(),
        config.workers()
    );

    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(report_progress(progress_rx));

    let report = Scout::new(config)
        .with_progress(progress_tx)
        .scan(&request)
        .await;
    // The scout (and its progress sender) is gone, so the reporter drains and exits
    reporter.await?;
    let report = report?;

    let output = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{}", output);

    Ok(())
}

/// Surfaces notable sites while the scan runs
async fn report_progress(mut rx: mpsc::UnboundedReceiver<SiteProgress>) {
    let mut with_matches = 0;
    while let Some(progress) = rx.recv().await {
        if progress.match_count > 0 {
            with_matches += 1;
        }
        if progress.script_rendered {
            ::log::warn!(
                "{} likely renders its listings with JavaScript; no static links found",
                progress.url
            );
        }
        if progress.flagged && progress.match_count > 0 {
            ::log::warn!(
                "Flagged site {} produced {} links",
                progress.url,
                progress.match_count
            );
        }
    }
    ::log::info!("{} sites produced at least one opportunity", with_matches);
}
