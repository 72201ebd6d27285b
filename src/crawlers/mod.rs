pub mod batch;
pub mod fetcher;
pub mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::run_batch;
pub use fetcher::{FetchedPage, Fetcher, HttpFetcher};
pub use site::SiteAnalyzer;
