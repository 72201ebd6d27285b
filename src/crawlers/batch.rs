use crate::crawlers::fetcher::Fetcher;
use crate::crawlers::site::SiteAnalyzer;
use crate::error::ScoutError;
use crate::results::{SiteProgress, SiteResult};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

type Job = (usize, String);

/// Analyzes every URL with at most `concurrency` sites in flight.
///
/// A fixed pool of workers pulls from a pre-filled job queue, so a slot is
/// refilled as soon as a site finishes. Results are slotted by input index:
/// the returned vector lines up with `urls` whatever the completion order.
/// Each completion is logged and, when a sender is given, forwarded as a
/// [`SiteProgress`] without waiting on the receiver.
pub async fn run_batch<F>(
    analyzer: Arc<SiteAnalyzer<F>>,
    urls: Vec<String>,
    concurrency: usize,
    progress: Option<mpsc::UnboundedSender<SiteProgress>>,
) -> Result<Vec<SiteResult>, ScoutError>
where
    F: Fetcher + 'static,
{
    let total = urls.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let (job_tx, job_rx) = mpsc::channel::<Job>(total);
    for job in urls.into_iter().enumerate() {
        job_tx
            .send(job)
            .await
            .map_err(|_| ScoutError::Worker("job queue closed early".to_string()))?;
    }
    // Workers stop once the queue drains
    drop(job_tx);

    let job_rx = Arc::new(Mutex::new(job_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<(usize, SiteResult)>(total);

    let num_workers = concurrency.max(1).min(total);
    ::log::info!("Scanning {} sites with {} workers", total, num_workers);

    let mut workers = JoinSet::new();
    for worker_id in 0..num_workers {
        workers.spawn(worker_loop(
            worker_id,
            Arc::clone(&analyzer),
            Arc::clone(&job_rx),
            result_tx.clone(),
        ));
    }
    // Each worker holds its own sender; the channel closes when they all exit
    drop(result_tx);

    let mut slots: Vec<Option<SiteResult>> = vec![None; total];
    let mut completed = 0;
    while let Some((index, result)) = result_rx.recv().await {
        completed += 1;
        report_progress(
            SiteProgress::from_result(index, completed, total, &result),
            progress.as_ref(),
        );
        slots[index] = Some(result);
    }

    while let Some(joined) = workers.join_next().await {
        joined.map_err(|e| ScoutError::Worker(e.to_string()))?;
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| ScoutError::Worker(format!("no result recorded for site {}", index)))
        })
        .collect()
}

/// Pulls jobs until the queue is empty
async fn worker_loop<F>(
    worker_id: usize,
    analyzer: Arc<SiteAnalyzer<F>>,
    jobs: Arc<Mutex<mpsc::Receiver<Job>>>,
    results: mpsc::Sender<(usize, SiteResult)>,
) where
    F: Fetcher,
{
    ::log::debug!("Worker {} started", worker_id);

    while let Some((index, url)) = next_job(&jobs).await {
        ::log::trace!("Worker {} analyzing {}", worker_id, url);
        let result = analyzer.analyze(&url).await;

        if results.send((index, result)).await.is_err() {
            ::log::error!("Worker {} could not deliver result for {}", worker_id, url);
            break;
        }
    }

    ::log::debug!("Worker {} finished, no more sites queued", worker_id);
}

/// Holding the lock across `recv` never stalls other workers: the queue is
/// filled and its sender dropped before any worker starts, so `recv` only
/// ever returns a queued job or `None`.
async fn next_job(jobs: &Arc<Mutex<mpsc::Receiver<Job>>>) -> Option<Job> {
    let mut rx = jobs.lock().await;
    rx.recv().await
}

fn report_progress(event: SiteProgress, sink: Option<&mpsc::UnboundedSender<SiteProgress>>) {
    ::log::info!(
        "[{}/{}] {} -> {} ({} links{}{})",
        event.completed,
        event.total,
        event.url,
        event.status,
        event.match_count,
        if event.script_rendered { ", script rendered" } else { "" },
        if event.flagged { ", flagged" } else { "" },
    );

    if let Some(tx) = sink {
        // A dropped receiver just means nobody is listening anymore
        let _ = tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoutConfig;
    use crate::crawlers::fetcher::FetchedPage;
    use crate::crawlers::testing::StaticFetcher;
    use crate::error::FetchError;
    use crate::filter::LinkFilter;
    use crate::policy::KeywordPolicy;
    use crate::results::SiteStatus;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    fn analyzer(fetcher: StaticFetcher) -> Arc<SiteAnalyzer<StaticFetcher>> {
        Arc::new(SiteAnalyzer::new(
            fetcher,
            KeywordPolicy::default().normalized().unwrap(),
            LinkFilter::default(),
            &ScoutConfig::default(),
        ))
    }

    fn page(link: &str) -> FetchedPage {
        FetchedPage::new(
            200,
            format!("<html><body><div><a href=\"{link}\">Trator usado</a></div></body></html>"),
        )
    }

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let urls: Vec<String> = (0..8).map(|i| format!("https://site{}.example/", i)).collect();
        let mut fetcher = StaticFetcher::new().with_delay(Duration::from_millis(5));
        for (i, url) in urls.iter().enumerate() {
            fetcher = if i % 3 == 0 {
                fetcher.with_error(url, FetchError::Timeout)
            } else {
                fetcher.with_page(url, page(&format!("/trator/{}", i)))
            };
        }

        let results = run_batch(analyzer(fetcher), urls.clone(), 3, None).await.unwrap();

        assert_eq!(results.len(), urls.len());
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.url, urls[i]);
            if i % 3 == 0 {
                assert_eq!(result.status, SiteStatus::Timeout);
            } else {
                assert_eq!(result.links.len(), 1);
                assert_eq!(result.links[0].destination_url, format!("{}trator/{}", urls[i], i));
            }
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let urls: Vec<String> = (0..12).map(|i| format!("https://site{}.example/", i)).collect();
        let fetcher = StaticFetcher::new().with_delay(Duration::from_millis(20));
        let peak = fetcher.peak();

        let results = run_batch(analyzer(fetcher), urls, 3, None).await.unwrap();

        assert_eq!(results.len(), 12);
        // Unknown URLs fail DNS in the test fetcher
        assert!(results.iter().all(|r| r.status == SiteStatus::DnsFailure));
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_progress_once_per_site() {
        let urls: Vec<String> = (0..5).map(|i| format!("https://site{}.example/", i)).collect();
        let fetcher = StaticFetcher::new().with_page(&urls[2], page("/trator/2"));
        let (tx, mut rx) = mpsc::unbounded_channel();

        run_batch(analyzer(fetcher), urls, 2, Some(tx)).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(events.len(), 5);
        assert_eq!(
            events.iter().map(|e| e.completed).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
        let mut indexes: Vec<usize> = events.iter().map(|e| e.index).collect();
        indexes.sort();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4]);

        let matched = events.iter().find(|e| e.index == 2).unwrap();
        assert_eq!(matched.match_count, 1);
        assert_eq!(matched.total, 5);
    }

    #[tokio::test]
    async fn test_dropped_progress_receiver_does_not_fail() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let urls = vec!["https://a.example/".to_string()];
        let results = run_batch(analyzer(StaticFetcher::new()), urls, 5, Some(tx))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let results = run_batch(analyzer(StaticFetcher::new()), Vec::new(), 5, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }
}
