//! Snapshot-to-document pipeline
//!
//! Reads every stored snapshot, joins it with the provenance log and writes
//! one Markdown document per snapshot that has usable content.

use super::content::{ContentExtractor, ExtractorConfig};
use super::document::Document;
use super::metadata::MetadataExtractor;
use crate::error::{Error, ExtractionError, PersistenceError, Result};
use crate::snapshot::{Provenance, SnapshotStore};
use scraper::Html;
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, instrument, warn};

/// Directory under the output root that receives documents
pub const MARKDOWN_DIR: &str = "markdown";

/// Result of extracting one snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractOutcome {
    /// A document was produced
    Extracted(Document),
    /// No usable main content
    Skipped,
}

/// Totals for one extraction pass
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Documents in snapshot order
    pub documents: Vec<Document>,
    /// Snapshots turned into documents
    pub converted: usize,
    /// Snapshots without usable content
    pub skipped: usize,
    /// Snapshots that could not be read, parsed or written
    pub failed: usize,
    /// Snapshots with no provenance entry
    pub missing_provenance: usize,
}

impl ExtractionReport {
    /// Snapshots looked at
    pub fn total(&self) -> usize {
        self.converted + self.skipped + self.failed
    }
}

/// Turns stored snapshots into documents
#[derive(Debug, Clone, Default)]
pub struct ExtractionPipeline {
    content: ContentExtractor,
}

impl ExtractionPipeline {
    /// Create a pipeline with the given content options
    pub fn new(config: ExtractorConfig) -> Self {
        Self {
            content: ContentExtractor::new(config),
        }
    }

    /// Content extractor in use
    pub fn content_extractor(&self) -> &ContentExtractor {
        &self.content
    }

    /// Extract one snapshot. Metadata and main content are gathered
    /// independently; only missing content skips the snapshot.
    pub fn extract_document(
        &self,
        identifier: &str,
        raw: &[u8],
        source_url: Option<&str>,
    ) -> Result<ExtractOutcome> {
        let html = std::str::from_utf8(raw).map_err(|e| ExtractionError::Unreadable {
            identifier: identifier.to_string(),
            reason: e.to_string(),
        })?;
        let parsed = Html::parse_document(html);

        let metadata = MetadataExtractor::extract(&parsed);
        let Some(content) = self.content.extract_main_content(&parsed)? else {
            return Ok(ExtractOutcome::Skipped);
        };

        Ok(ExtractOutcome::Extracted(Document {
            identifier: identifier.to_string(),
            source_url: source_url.map(str::to_string),
            title: MetadataExtractor::best_title(&metadata),
            author: MetadataExtractor::best_author(&metadata),
            date: MetadataExtractor::best_date(&metadata),
            description: MetadataExtractor::best_description(&metadata),
            body_markdown: content.markdown,
        }))
    }

    /// Extract every snapshot in the store without writing anything
    #[instrument(skip_all, fields(dir = %store.dir().display()))]
    pub async fn extract_all(
        &self,
        store: &SnapshotStore,
        provenance: &Provenance,
    ) -> Result<ExtractionReport> {
        let mut report = ExtractionReport::default();
        for identifier in store.snapshots().await? {
            if let Some(document) = self.process(store, provenance, &identifier, &mut report).await {
                report.converted += 1;
                report.documents.push(document);
            }
        }
        Ok(report)
    }

    /// Extract every snapshot and write documents into `markdown_dir`
    #[instrument(skip_all, fields(dir = %markdown_dir.display()))]
    pub async fn run(&self, store: &SnapshotStore, markdown_dir: &Path) -> Result<ExtractionReport> {
        fs::create_dir_all(markdown_dir)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: markdown_dir.to_path_buf(),
                source,
            })?;

        let provenance = store.load_provenance().await?;
        info!(
            snapshots_with_provenance = provenance.len(),
            "Starting extraction"
        );

        let mut report = ExtractionReport::default();
        for identifier in store.snapshots().await? {
            let Some(document) = self.process(store, &provenance, &identifier, &mut report).await
            else {
                continue;
            };

            let path = markdown_dir.join(document.file_name());
            match write_document(&path, &document).await {
                Ok(()) => {
                    debug!(path = %path.display(), "Wrote document");
                    report.converted += 1;
                    report.documents.push(document);
                }
                Err(e) => {
                    error!(identifier = %identifier, error = %e, "Failed to write document");
                    report.failed += 1;
                }
            }
        }

        info!(
            converted = report.converted,
            skipped = report.skipped,
            failed = report.failed,
            missing_provenance = report.missing_provenance,
            "Extraction complete"
        );
        Ok(report)
    }

    /// Read and extract one snapshot, updating the counts. Returns the
    /// document on success; `converted` is left to the caller.
    async fn process(
        &self,
        store: &SnapshotStore,
        provenance: &Provenance,
        identifier: &str,
        report: &mut ExtractionReport,
    ) -> Option<Document> {
        let source_url = provenance.get(identifier);
        if source_url.is_none() {
            warn!(identifier = %identifier, "Snapshot has no provenance entry");
            report.missing_provenance += 1;
        }

        let outcome = match store.read(identifier).await {
            Ok(raw) => self.extract_document(identifier, &raw, source_url),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(ExtractOutcome::Extracted(document)) => Some(document),
            Ok(ExtractOutcome::Skipped) => {
                warn!(identifier = %identifier, "No content extracted");
                report.skipped += 1;
                None
            }
            Err(e) => {
                error!(identifier = %identifier, error = %e, "Failed to extract snapshot");
                report.failed += 1;
                None
            }
        }
    }
}

async fn write_document(path: &Path, document: &Document) -> Result<()> {
    fs::write(path, document.render())
        .await
        .map_err(|source| -> Error {
            PersistenceError::DocumentWrite {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_skipped() {
        let pipeline = ExtractionPipeline::default();
        let outcome = pipeline
            .extract_document("index.html", b"<html><body></body></html>", None)
            .unwrap();
        assert_eq!(outcome, ExtractOutcome::Skipped);
    }

    #[test]
    fn test_metadata_absence_does_not_block_content() {
        let pipeline = ExtractionPipeline::default();
        let outcome = pipeline
            .extract_document("a.html", b"<html><body><p>Body only.</p></body></html>", None)
            .unwrap();
        let ExtractOutcome::Extracted(doc) = outcome else {
            panic!("expected a document");
        };
        assert_eq!(doc.title, None);
        assert_eq!(doc.author, None);
        assert_eq!(doc.body_markdown, "Body only.");
    }

    #[test]
    fn test_invalid_utf8_is_an_extraction_error() {
        let pipeline = ExtractionPipeline::default();
        let err = pipeline
            .extract_document("bad.html", &[0xff, 0xfe, 0x00], None)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Extraction(ExtractionError::Unreadable { .. })
        ));
        assert!(err.is_page_local());
    }

    #[test]
    fn test_report_total() {
        let report = ExtractionReport {
            converted: 3,
            skipped: 2,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(report.total(), 6);
    }
}
