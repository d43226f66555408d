//! Docs Corpus - Rendered Site Crawling & Markdown Extraction
//!
//! This crate turns a documentation site into a corpus of Markdown documents
//! in two phases coupled only through the filesystem:
//!
//! 1. **Crawl**: a headless browser (ChromiumOxide, CDP) renders pages
//!    breadth-first from a seed, staying on one domain. Each rendered page is
//!    stored as a raw HTML snapshot and logged with its source URL.
//! 2. **Extract**: every snapshot is stripped of boilerplate, converted to
//!    Markdown and written with a frontmatter block of metadata.
//!
//! # Architecture
//!
//! ```text
//! seed ──▶ CrawlController ──▶ PageRenderer (CDP) ──▶ SnapshotStore
//!              ▲    │                                   │  html/<id>.html
//!              └────┘ in-scope links                    │  html/url_mapping.txt
//!                                                       ▼
//!                                      ExtractionPipeline ──▶ markdown/<id>.md
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docs_corpus::browser::{BrowserConfig, BrowserRenderer, NavigationOptions};
//! use docs_corpus::crawl::{CrawlConfig, CrawlController};
//! use docs_corpus::extraction::{ExtractionPipeline, MARKDOWN_DIR};
//! use docs_corpus::snapshot::SnapshotStore;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let out = Path::new("corpus");
//!     let store = SnapshotStore::open(out).await?;
//!
//!     let renderer =
//!         BrowserRenderer::launch(BrowserConfig::default(), NavigationOptions::default()).await?;
//!     let mut crawler = CrawlController::new(renderer, store.clone(), CrawlConfig::default());
//!     let crawled = crawler.crawl("https://docs.example.com/").await;
//!     crawler.into_renderer().close().await?;
//!     println!("Visited {} pages", crawled?.visited);
//!
//!     let report = ExtractionPipeline::default()
//!         .run(&store, &out.join(MARKDOWN_DIR))
//!         .await?;
//!     println!("Wrote {} documents", report.converted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod browser;
pub mod crawl;
pub mod error;
pub mod extraction;
pub mod snapshot;

// Re-exports for convenience
pub use browser::{BrowserController, BrowserRenderer, PageRenderer};
pub use crawl::{CrawlConfig, CrawlController, CrawlReport};
pub use error::{Error, Result};
pub use extraction::{ContentExtractor, Document, ExtractionPipeline, MetadataExtractor};
pub use snapshot::{identifier_for, SnapshotStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
