//! Provenance log parsing
//!
//! The log is `url_mapping.txt` inside the snapshot directory: one
//! `identifier\tsource_url` line per saved snapshot, append-only, no header.

use std::collections::HashMap;

/// File name of the provenance log inside the snapshot directory
pub const PROVENANCE_FILE: &str = "url_mapping.txt";

/// Identifier → source URL lookup recovered from the provenance log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provenance {
    entries: HashMap<String, String>,
    skipped_lines: usize,
}

impl Provenance {
    /// Parse log text. Malformed lines are counted and skipped.
    ///
    /// When an identifier appears more than once the last line wins, matching
    /// the overwrite semantics of the snapshot files themselves.
    pub fn parse(text: &str) -> Self {
        let mut provenance = Self::default();

        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((identifier, url))
                    if !identifier.is_empty() && !url.is_empty() && !url.contains('\t') =>
                {
                    provenance
                        .entries
                        .insert(identifier.to_string(), url.to_string());
                }
                _ => provenance.skipped_lines += 1,
            }
        }

        provenance
    }

    /// Format one log line, newline included
    pub fn format_line(identifier: &str, url: &str) -> String {
        format!("{}\t{}\n", identifier, url)
    }

    /// Source URL for a snapshot identifier
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log had no usable entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines that were present but not parseable
    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    /// Iterate over `(identifier, url)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed() {
        let log = "index.html\thttps://x.com/\n_a_b.html\thttps://x.com/a/b\n";
        let p = Provenance::parse(log);
        assert_eq!(p.len(), 2);
        assert_eq!(p.get("index.html"), Some("https://x.com/"));
        assert_eq!(p.get("_a_b.html"), Some("https://x.com/a/b"));
        assert_eq!(p.skipped_lines(), 0);
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let log = "no-tab-here\n\tmissing-id\nmissing-url\t\nok.html\thttps://x.com/ok\na\tb\tc\n\n";
        let p = Provenance::parse(log);
        assert_eq!(p.len(), 1);
        assert_eq!(p.get("ok.html"), Some("https://x.com/ok"));
        assert_eq!(p.skipped_lines(), 4);
    }

    #[test]
    fn test_parse_last_entry_wins() {
        let log = "_a.html\thttps://x.com/a\n_a.html\thttps://x.com/a/\n";
        let p = Provenance::parse(log);
        assert_eq!(p.len(), 1);
        assert_eq!(p.get("_a.html"), Some("https://x.com/a/"));
    }

    #[test]
    fn test_parse_crlf() {
        let p = Provenance::parse("index.html\thttps://x.com/\r\n");
        assert_eq!(p.get("index.html"), Some("https://x.com/"));
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            Provenance::format_line("index.html", "https://x.com/"),
            "index.html\thttps://x.com/\n"
        );
    }
}
