use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CrawlError {
    #[error("Missing page parameter")]
    MissingSeed,

    #[error("max_pages must be at least 1")]
    ZeroPageBudget,

    #[error("Event stream closed before the crawl finished")]
    StreamClosed,
}

pub type Result<T> = std::result::Result<T, CrawlError>;
