//! Crawl module
//!
//! Breadth-first, single-domain crawling on top of a [`PageRenderer`](crate::browser::PageRenderer).

pub mod controller;
pub mod frontier;
pub mod scope;

pub use controller::{
    CrawlConfig, CrawlConfigBuilder, CrawlController, CrawlReport, CrawlState, PageFailure,
};
pub use frontier::Frontier;
pub use scope::{domain_of, LinkScope, LinkVerdict, DEFAULT_EXCLUDED_EXTENSIONS};
