//! Snapshot store tests
//!
//! These tests verify the on-disk layout, identifier derivation and the
//! provenance log shared between the crawl and extraction phases.

use docs_corpus::snapshot::{identifier_for, SnapshotStore, HTML_DIR, PROVENANCE_FILE};
use pretty_assertions::assert_eq;
use url::Url;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[test]
fn test_identifier_examples() {
    assert_eq!(identifier_for(&url("https://example.com/docs/intro/")), "_docs_intro.html");
    assert_eq!(identifier_for(&url("https://example.com/")), "index.html");
    assert_eq!(identifier_for(&url("https://example.com")), "index.html");
    assert_eq!(identifier_for(&url("https://example.com/a/b.html")), "_a_b.html");
    assert_eq!(identifier_for(&url("https://example.com/a?page=2")), "_a.html");
}

#[tokio::test]
async fn test_save_writes_snapshot_and_provenance() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();

    let id = store
        .save(&url("https://x.com/docs/intro/"), "<html><body>Intro</body></html>")
        .await
        .unwrap();
    assert_eq!(id, "_docs_intro.html");

    let html_dir = tmp.path().join(HTML_DIR);
    let saved = std::fs::read_to_string(html_dir.join("_docs_intro.html")).unwrap();
    assert_eq!(saved, "<html><body>Intro</body></html>");

    let log = std::fs::read_to_string(html_dir.join(PROVENANCE_FILE)).unwrap();
    assert_eq!(log, "_docs_intro.html\thttps://x.com/docs/intro/\n");
}

#[tokio::test]
async fn test_provenance_log_is_append_only() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();

    store.save(&url("https://x.com/"), "<p>home</p>").await.unwrap();
    store.save(&url("https://x.com/a"), "<p>a</p>").await.unwrap();

    let log = std::fs::read_to_string(store.provenance_path()).unwrap();
    assert_eq!(
        log,
        "index.html\thttps://x.com/\n_a.html\thttps://x.com/a\n"
    );
}

#[tokio::test]
async fn test_identifier_collision_overwrites_snapshot() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();

    store.save(&url("https://x.com/a?v=1"), "first").await.unwrap();
    store.save(&url("https://x.com/a?v=2"), "second").await.unwrap();

    assert_eq!(store.snapshots().await.unwrap(), vec!["_a.html".to_string()]);
    let raw = store.read("_a.html").await.unwrap();
    assert_eq!(raw, b"second");

    let provenance = store.load_provenance().await.unwrap();
    assert_eq!(provenance.get("_a.html"), Some("https://x.com/a?v=2"));
}

#[tokio::test]
async fn test_load_provenance_skips_malformed_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();
    std::fs::write(
        store.provenance_path(),
        "index.html\thttps://x.com/\nno-tab-here\n\n\thttps://x.com/empty-id\n_a.html\thttps://x.com/a\n",
    )
    .unwrap();

    let provenance = store.load_provenance().await.unwrap();
    assert_eq!(provenance.len(), 2);
    assert_eq!(provenance.skipped_lines(), 2);
    assert_eq!(provenance.get("_a.html"), Some("https://x.com/a"));
}

#[tokio::test]
async fn test_missing_provenance_log_is_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();

    let provenance = store.load_provenance().await.unwrap();
    assert!(provenance.is_empty());
}

#[tokio::test]
async fn test_snapshots_lists_only_html_files() {
    let tmp = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(tmp.path()).await.unwrap();

    store.save(&url("https://x.com/b"), "b").await.unwrap();
    store.save(&url("https://x.com/"), "home").await.unwrap();
    std::fs::write(store.dir().join("notes.txt"), "ignored").unwrap();
    std::fs::create_dir(store.dir().join("nested.html")).unwrap();

    assert_eq!(
        store.snapshots().await.unwrap(),
        vec!["_b.html".to_string(), "index.html".to_string()]
    );
}

#[tokio::test]
async fn test_open_fails_when_output_is_a_file() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("not-a-dir");
    std::fs::write(&file, "x").unwrap();

    let err = SnapshotStore::open(&file).await.unwrap_err();
    assert!(!err.is_page_local());
}

#[tokio::test]
async fn test_open_existing_requires_a_previous_crawl() {
    let tmp = tempfile::tempdir().unwrap();
    let typo = tmp.path().join("typo");

    let err = SnapshotStore::open_existing(&typo).await.unwrap_err();
    assert!(err.to_string().contains("No snapshot directory"));
    assert!(!err.is_page_local());
    assert!(!typo.exists());

    SnapshotStore::open(tmp.path()).await.unwrap();
    let store = SnapshotStore::open_existing(tmp.path()).await.unwrap();
    assert_eq!(store.dir(), tmp.path().join(HTML_DIR));
}
