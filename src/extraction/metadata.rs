//! Page metadata extraction
//!
//! This module reads title, author, publication date and description from a
//! parsed snapshot. Sources are collected separately (plain meta tags, Open
//! Graph, Twitter Card, JSON-LD, DOM fallbacks) and the `best_*` functions
//! pick among them.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::debug;

/// Extracted page metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageMetadata {
    /// `<title>` text
    pub title: Option<String>,
    /// First `<h1>` text
    pub heading: Option<String>,
    /// Meta description
    pub description: Option<String>,
    /// Meta author (`author`, `article:author`, `dc.creator`)
    pub author: Option<String>,
    /// First date-like meta value (`article:published_time`, `date`, ...)
    pub published: Option<String>,
    /// First `<time datetime>` value
    pub time_element: Option<String>,
    /// `<html lang>`
    pub language: Option<String>,
    /// Open Graph metadata
    pub open_graph: OpenGraphData,
    /// Twitter Card metadata
    pub twitter_card: TwitterCardData,
    /// JSON-LD structured data blocks that parsed
    pub json_ld: Vec<Value>,
}

/// Open Graph metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenGraphData {
    /// og:title
    pub title: Option<String>,
    /// og:description
    pub description: Option<String>,
    /// og:type
    pub og_type: Option<String>,
    /// og:site_name
    pub site_name: Option<String>,
}

/// Twitter Card metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TwitterCardData {
    /// twitter:title
    pub title: Option<String>,
    /// twitter:description
    pub description: Option<String>,
    /// twitter:creator
    pub creator: Option<String>,
}

const DATE_META_KEYS: &[&str] = &[
    "article:published_time",
    "og:published_time",
    "date",
    "dc.date",
    "dc.date.issued",
    "dcterms.date",
    "dcterms.created",
    "publish-date",
    "publish_date",
    "pubdate",
    "citation_publication_date",
];

const AUTHOR_META_KEYS: &[&str] = &["author", "article:author", "dc.creator", "dcterms.creator"];

struct Selectors {
    title: Selector,
    h1: Selector,
    meta: Selector,
    html: Selector,
    time: Selector,
    json_ld: Selector,
}

fn selectors() -> &'static Selectors {
    static SELECTORS: OnceLock<Selectors> = OnceLock::new();
    SELECTORS.get_or_init(|| {
        let parse = |s: &str| Selector::parse(s).expect("static selector");
        Selectors {
            title: parse("head title, title"),
            h1: parse("h1"),
            meta: parse("meta[content]"),
            html: parse("html[lang]"),
            time: parse("time[datetime]"),
            json_ld: parse(r#"script[type="application/ld+json"]"#),
        }
    })
}

/// Collapse runs of whitespace and drop empty values
fn clean(text: &str) -> Option<String> {
    let joined = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!joined.is_empty()).then_some(joined)
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = clean(value);
    }
}

/// Metadata extraction functionality
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Extract all metadata from a parsed document
    pub fn extract(document: &Html) -> PageMetadata {
        let sel = selectors();
        let mut meta = PageMetadata::default();

        meta.title = document
            .select(&sel.title)
            .next()
            .and_then(|el| clean(&el.text().collect::<String>()));
        meta.heading = document
            .select(&sel.h1)
            .next()
            .and_then(|el| clean(&el.text().collect::<String>()));
        meta.language = document
            .select(&sel.html)
            .next()
            .and_then(|el| el.value().attr("lang"))
            .and_then(clean);
        meta.time_element = document
            .select(&sel.time)
            .next()
            .and_then(|el| el.value().attr("datetime"))
            .and_then(clean);

        for el in document.select(&sel.meta) {
            let attrs = el.value();
            let Some(key) = attrs
                .attr("name")
                .or_else(|| attrs.attr("property"))
                .or_else(|| attrs.attr("itemprop"))
            else {
                continue;
            };
            let key = key.trim().to_lowercase();
            let content = attrs.attr("content").unwrap_or_default();

            match key.as_str() {
                "description" => set_once(&mut meta.description, content),
                "og:title" => set_once(&mut meta.open_graph.title, content),
                "og:description" => set_once(&mut meta.open_graph.description, content),
                "og:type" => set_once(&mut meta.open_graph.og_type, content),
                "og:site_name" => set_once(&mut meta.open_graph.site_name, content),
                "twitter:title" => set_once(&mut meta.twitter_card.title, content),
                "twitter:description" => set_once(&mut meta.twitter_card.description, content),
                "twitter:creator" => set_once(&mut meta.twitter_card.creator, content),
                k if AUTHOR_META_KEYS.contains(&k) => {
                    // article:author is frequently a profile URL rather than a name
                    if !content.trim_start().starts_with("http") {
                        set_once(&mut meta.author, content);
                    }
                }
                k if DATE_META_KEYS.contains(&k) => set_once(&mut meta.published, content),
                _ => {}
            }
        }

        for el in document.select(&sel.json_ld) {
            let raw = el.text().collect::<String>();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => meta.json_ld.push(value),
                Err(e) => debug!(error = %e, "Ignoring malformed JSON-LD block"),
            }
        }

        debug!(
            title = ?meta.title,
            author = ?meta.author,
            published = ?meta.published,
            json_ld = meta.json_ld.len(),
            "Extracted metadata"
        );
        meta
    }

    /// Get the best title from available sources
    pub fn best_title(metadata: &PageMetadata) -> Option<String> {
        metadata
            .open_graph
            .title
            .clone()
            .or_else(|| metadata.twitter_card.title.clone())
            .or_else(|| Self::json_ld_text(metadata, "headline"))
            .or_else(|| metadata.title.clone())
            .or_else(|| metadata.heading.clone())
    }

    /// Get the best description from available sources
    pub fn best_description(metadata: &PageMetadata) -> Option<String> {
        metadata
            .open_graph
            .description
            .clone()
            .or_else(|| metadata.twitter_card.description.clone())
            .or_else(|| metadata.description.clone())
            .or_else(|| Self::json_ld_text(metadata, "description"))
    }

    /// Get the best author name from available sources
    pub fn best_author(metadata: &PageMetadata) -> Option<String> {
        metadata
            .author
            .clone()
            .or_else(|| Self::json_ld_author(metadata))
    }

    /// Get the best publication date, normalized to `YYYY-MM-DD`
    pub fn best_date(metadata: &PageMetadata) -> Option<String> {
        let candidates = [
            metadata.published.clone(),
            Self::json_ld_text(metadata, "datePublished"),
            Self::json_ld_text(metadata, "dateCreated"),
            metadata.time_element.clone(),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(|raw| normalize_date(&raw))
    }

    /// Every JSON object in the JSON-LD blocks, arrays and `@graph` flattened
    fn json_ld_nodes(metadata: &PageMetadata) -> Vec<&serde_json::Map<String, Value>> {
        fn walk<'a>(value: &'a Value, out: &mut Vec<&'a serde_json::Map<String, Value>>) {
            match value {
                Value::Array(items) => items.iter().for_each(|v| walk(v, out)),
                Value::Object(map) => {
                    out.push(map);
                    if let Some(graph) = map.get("@graph") {
                        walk(graph, out);
                    }
                }
                _ => {}
            }
        }

        let mut nodes = Vec::new();
        for block in &metadata.json_ld {
            walk(block, &mut nodes);
        }
        nodes
    }

    fn json_ld_text(metadata: &PageMetadata, key: &str) -> Option<String> {
        Self::json_ld_nodes(metadata)
            .into_iter()
            .filter_map(|node| node.get(key))
            .find_map(|v| v.as_str().and_then(clean))
    }

    fn json_ld_author(metadata: &PageMetadata) -> Option<String> {
        fn name_of(value: &Value) -> Option<String> {
            match value {
                Value::String(s) => clean(s),
                Value::Object(map) => map.get("name").and_then(|n| n.as_str()).and_then(clean),
                Value::Array(items) => items.iter().find_map(name_of),
                _ => None,
            }
        }

        Self::json_ld_nodes(metadata)
            .into_iter()
            .filter_map(|node| node.get("author"))
            .find_map(name_of)
    }
}

/// Normalize a date string to `YYYY-MM-DD`, or `None` if it is not a date
pub fn normalize_date(raw: &str) -> Option<String> {
    const ISO: &str = "%Y-%m-%d";
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.format(ISO).to_string());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.format(ISO).to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.format(ISO).to_string());
        }
    }
    for fmt in [ISO, "%Y/%m/%d", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d.format(ISO).to_string());
        }
    }

    // Leading ISO date with an unusual time suffix
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, ISO).ok())
        .map(|d| d.format(ISO).to_string())
}
