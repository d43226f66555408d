//! Content extraction module
//!
//! Turns stored snapshots into Markdown documents: main content via
//! boilerplate removal, metadata from meta tags, Open Graph and JSON-LD.

pub mod content;
pub mod document;
pub mod metadata;
pub mod pipeline;

pub use content::{ContentExtractor, ExtractedContent, ExtractorConfig};
pub use document::{Document, MARKDOWN_EXTENSION};
pub use metadata::{
    normalize_date, MetadataExtractor, OpenGraphData, PageMetadata, TwitterCardData,
};
pub use pipeline::{ExtractOutcome, ExtractionPipeline, ExtractionReport, MARKDOWN_DIR};
