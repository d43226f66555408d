//! Snapshot persistence
//!
//! Raw rendered HTML lives at `<output>/html/<identifier>`; every successful
//! save is followed by one provenance line so extraction can recover the URL.

use super::provenance::{Provenance, PROVENANCE_FILE};
use crate::error::{PersistenceError, Result};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Name of the snapshot subdirectory
pub const HTML_DIR: &str = "html";

const SNAPSHOT_SUFFIX: &str = ".html";

/// Derive the filesystem-safe snapshot identifier for a URL.
///
/// Path with trailing `/` stripped, `index` when empty, every `/` replaced by
/// `_`, any `.html` removed, then `.html` appended. Query and fragment are
/// ignored, so distinct URLs sharing a path map to the same identifier and the
/// later snapshot overwrites the earlier one.
pub fn identifier_for(url: &Url) -> String {
    let path = url.path().trim_end_matches('/');
    let path = if path.is_empty() { "index" } else { path };
    let mut identifier = path.replace('/', "_").replace(SNAPSHOT_SUFFIX, "");
    identifier.push_str(SNAPSHOT_SUFFIX);
    identifier
}

/// Directory-backed snapshot store with an append-only provenance log
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    html_dir: PathBuf,
}

impl SnapshotStore {
    /// Open (creating if needed) the snapshot directory under `output_dir`
    #[instrument]
    pub async fn open(output_dir: &Path) -> Result<Self> {
        let html_dir = output_dir.join(HTML_DIR);
        fs::create_dir_all(&html_dir)
            .await
            .map_err(|source| PersistenceError::CreateDir {
                path: html_dir.clone(),
                source,
            })?;
        debug!(dir = %html_dir.display(), "Snapshot store ready");
        Ok(Self { html_dir })
    }

    /// Open the snapshot directory of a previous crawl without creating it
    #[instrument]
    pub async fn open_existing(output_dir: &Path) -> Result<Self> {
        let html_dir = output_dir.join(HTML_DIR);
        if !fs::metadata(&html_dir).await.is_ok_and(|m| m.is_dir()) {
            return Err(PersistenceError::MissingSnapshotDir { path: html_dir }.into());
        }
        Ok(Self { html_dir })
    }

    /// Directory holding snapshots and the provenance log
    pub fn dir(&self) -> &Path {
        &self.html_dir
    }

    /// Path of the provenance log
    pub fn provenance_path(&self) -> PathBuf {
        self.html_dir.join(PROVENANCE_FILE)
    }

    /// Path of the snapshot with `identifier`
    pub fn snapshot_path(&self, identifier: &str) -> PathBuf {
        self.html_dir.join(identifier)
    }

    /// Persist `html` for `url` and record its provenance.
    ///
    /// The provenance line is only appended after the snapshot write
    /// succeeded; a failed append leaves an orphan snapshot behind.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn save(&self, url: &Url, html: &str) -> Result<String> {
        let identifier = identifier_for(url);
        let path = self.snapshot_path(&identifier);

        if fs::try_exists(&path).await.unwrap_or(false) {
            warn!(identifier = %identifier, "Identifier collision, overwriting snapshot");
        }

        fs::write(&path, html.as_bytes())
            .await
            .map_err(|source| PersistenceError::SnapshotWrite {
                identifier: identifier.clone(),
                source,
            })?;

        self.append_provenance(&identifier, url.as_str())
            .await
            .map_err(|source| PersistenceError::ProvenanceAppend {
                identifier: identifier.clone(),
                source,
            })?;

        info!(identifier = %identifier, bytes = html.len(), "Snapshot saved");
        Ok(identifier)
    }

    async fn append_provenance(&self, identifier: &str, url: &str) -> std::io::Result<()> {
        let mut log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.provenance_path())
            .await?;
        log.write_all(Provenance::format_line(identifier, url).as_bytes())
            .await?;
        log.flush().await
    }

    /// Read the provenance log. A missing log yields an empty lookup.
    pub async fn load_provenance(&self) -> Result<Provenance> {
        let path = self.provenance_path();
        let text = match fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "No provenance log found");
                return Ok(Provenance::default());
            }
            Err(source) => return Err(PersistenceError::Read { path, source }.into()),
        };

        let provenance = Provenance::parse(&text);
        if provenance.skipped_lines() > 0 {
            warn!(
                skipped = provenance.skipped_lines(),
                "Skipped malformed provenance lines"
            );
        }
        Ok(provenance)
    }

    /// Identifiers of every stored snapshot, sorted by file name
    pub async fn snapshots(&self) -> Result<Vec<String>> {
        let read_err = |source: std::io::Error| PersistenceError::Read {
            path: self.html_dir.clone(),
            source,
        };

        let mut entries = fs::read_dir(&self.html_dir).await.map_err(read_err)?;
        let mut identifiers = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_file && name.ends_with(SNAPSHOT_SUFFIX) {
                identifiers.push(name);
            }
        }
        identifiers.sort();
        Ok(identifiers)
    }

    /// Raw HTML of a stored snapshot
    pub async fn read(&self, identifier: &str) -> Result<Vec<u8>> {
        let path = self.snapshot_path(identifier);
        fs::read(&path)
            .await
            .map_err(|source| PersistenceError::Read { path, source }.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(url: &str) -> String {
        identifier_for(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_identifier_root_is_index() {
        assert_eq!(id("https://x.com/"), "index.html");
        assert_eq!(id("https://x.com"), "index.html");
    }

    #[test]
    fn test_identifier_nested_path() {
        assert_eq!(id("https://x.com/a/b"), "_a_b.html");
        assert_eq!(id("https://example.com/docs/intro/"), "_docs_intro.html");
    }

    #[test]
    fn test_identifier_strips_existing_html_suffix() {
        assert_eq!(id("https://x.com/guide/page.html"), "_guide_page.html");
        assert_eq!(id("https://x.com/a.html/b"), "_a_b.html");
    }

    #[test]
    fn test_identifier_ignores_query_and_fragment() {
        assert_eq!(id("https://x.com/a?page=2"), "_a.html");
        assert_eq!(id("https://x.com/a#top"), "_a.html");
    }

    #[test]
    fn test_identifier_multiple_trailing_slashes() {
        assert_eq!(id("https://x.com/a//"), "_a.html");
    }

    #[tokio::test]
    async fn test_open_creates_html_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        assert!(store.dir().is_dir());
        assert_eq!(store.dir(), tmp.path().join("html"));
    }
}
