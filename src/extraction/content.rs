//! Main content extraction
//!
//! This module strips boilerplate (navigation, headers, footers, ads, cookie
//! banners) from a parsed snapshot, locates the main content container and
//! converts it to Markdown.

use crate::error::{ExtractionError, Result};
use htmd::options::{HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, instrument};

/// Containers tried in order before falling back to text-density scoring
const MAIN_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    "[role=\"article\"]",
    "[data-docs-content]",
    ".markdown-body",
    ".docs-content",
    ".article",
    ".post",
    ".content",
    ".entry-content",
    ".post-content",
    ".prose",
    "#content",
    "#main-content",
    ".main-content",
];

/// Elements that never carry main content
const BOILERPLATE_SELECTOR: &str = "script, style, noscript, template, nav, header, footer, \
     aside, iframe, svg, canvas, button, [hidden], [aria-hidden=\"true\"], \
     [role=\"navigation\"], [role=\"banner\"], [role=\"contentinfo\"], [role=\"search\"]";

/// A main-content candidate needs this much text to win outright
const MIN_MAIN_TEXT_CHARS: usize = 200;

/// Options for content extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Minimum characters of cleaned text for a snapshot to count as having content
    pub min_text_chars: usize,
    /// Keep hyperlinks in the Markdown output
    pub include_links: bool,
    /// Keep images in the Markdown output
    pub include_images: bool,
    /// Keep tables in the Markdown output
    pub include_tables: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 1,
            include_links: true,
            include_images: true,
            include_tables: true,
        }
    }
}

/// Extracted content from a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedContent {
    /// Plain text of the main content
    pub text: String,
    /// Main content as Markdown
    pub markdown: String,
    /// Word count
    pub word_count: usize,
    /// Character count
    pub char_count: usize,
    /// Whether content came from an article/main-like container
    pub from_main: bool,
}

struct Patterns {
    main: Vec<Selector>,
    main_marker: Selector,
    boilerplate: Selector,
    body: Selector,
    all: Selector,
    paragraph: Selector,
    table: Selector,
    image: Selector,
    boilerplate_attr: Regex,
    image_md: Regex,
    link_md: Regex,
    blank_lines: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let sel = |s: &str| Selector::parse(s).expect("static selector");
        let re = |s: &str| Regex::new(s).expect("static regex");
        Patterns {
            main: MAIN_SELECTORS.iter().map(|s| sel(s)).collect(),
            main_marker: sel("main, article, [role=\"main\"]"),
            boilerplate: sel(BOILERPLATE_SELECTOR),
            body: sel("body"),
            all: sel("body *"),
            paragraph: sel("p, pre, li, blockquote, td, dd"),
            table: sel("table"),
            image: sel("img, picture, figure"),
            boilerplate_attr: re(
                r"(?i)(^|[\s_-])(nav|navbar|navigation|menu|sidebar|breadcrumbs?|footer|header|cookies?|consent|banner|advert|advertisement|ads?|sponsor|promo|share|social|related|toc|skip)([\s_-]|$)",
            ),
            image_md: re(r"!\[[^\]]*\]\([^)]*\)"),
            link_md: re(r"\[([^\]]*)\]\([^)]*\)"),
            blank_lines: re(r"\n{3,}"),
        }
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(el: &ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Content extraction functionality
#[derive(Debug, Clone, Default)]
pub struct ContentExtractor {
    config: ExtractorConfig,
}

impl ContentExtractor {
    /// Create an extractor with the given options
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extraction options
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract the main content of a document.
    ///
    /// Returns `Ok(None)` when nothing usable remains after boilerplate removal.
    #[instrument(skip_all)]
    pub fn extract_main_content(&self, document: &Html) -> Result<Option<ExtractedContent>> {
        let mut stripped = document.clone();
        let removed = self.strip_boilerplate(&mut stripped);
        // Detached subtrees stay in the node arena and `select` still walks them
        let cleaned = Html::parse_document(&stripped.root_element().html());

        let Some((element, from_main)) = Self::find_main_content(&cleaned) else {
            debug!("No body element");
            return Ok(None);
        };

        let text = element_text(&element);
        let char_count = text.chars().count();
        if char_count < self.config.min_text_chars.max(1) {
            debug!(char_count, removed, "Main content too short");
            return Ok(None);
        }

        let markdown = self.html_to_markdown(&element.inner_html())?;
        if markdown.is_empty() {
            return Ok(None);
        }

        let word_count = text.split_whitespace().count();
        debug!(word_count, char_count, from_main, removed, "Extracted main content");

        Ok(Some(ExtractedContent {
            text,
            markdown,
            word_count,
            char_count,
            from_main,
        }))
    }

    /// Detach boilerplate subtrees in place. Returns how many were removed.
    fn strip_boilerplate(&self, document: &mut Html) -> usize {
        let p = patterns();

        let mut doomed: Vec<_> = document
            .select(&p.boilerplate)
            .map(|el| el.id())
            .collect();

        doomed.extend(
            document
                .select(&p.all)
                .filter(|el| Self::looks_like_boilerplate(el))
                .map(|el| el.id()),
        );

        if !self.config.include_tables {
            doomed.extend(document.select(&p.table).map(|el| el.id()));
        }
        if !self.config.include_images {
            doomed.extend(document.select(&p.image).map(|el| el.id()));
        }

        let mut removed = 0;
        for id in doomed {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
                removed += 1;
            }
        }
        removed
    }

    /// Class/id heuristics for wrappers that are not semantic boilerplate tags
    fn looks_like_boilerplate(el: &ElementRef<'_>) -> bool {
        let value = el.value();
        if matches!(value.name(), "main" | "article" | "body" | "html") {
            return false;
        }
        let p = patterns();
        let flagged = value.attr("id").is_some_and(|id| p.boilerplate_attr.is_match(id))
            || value.classes().any(|class| p.boilerplate_attr.is_match(class));
        // Layout wrappers such as `.sidebar-layout` may hold the article itself
        flagged && el.select(&p.main_marker).next().is_none()
    }

    /// Find the main content element using various strategies
    fn find_main_content(document: &Html) -> Option<(ElementRef<'_>, bool)> {
        let p = patterns();

        // Strategy 1: semantic or conventional content containers
        for selector in &p.main {
            if let Some(el) = document
                .select(selector)
                .find(|el| element_text(el).chars().count() >= MIN_MAIN_TEXT_CHARS)
            {
                return Some((el, true));
            }
        }

        // Strategy 2: parent with the most paragraph-like text
        let mut scores: HashMap<_, usize> = HashMap::new();
        let mut order = Vec::new();
        for block in document.select(&p.paragraph) {
            let Some(parent) = block.parent().and_then(ElementRef::wrap) else {
                continue;
            };
            let score = scores.entry(parent.id()).or_insert_with(|| {
                order.push(parent.id());
                0
            });
            *score += element_text(&block).chars().count();
        }
        // Earliest candidate wins ties
        let mut best_id = None;
        let mut best_score = MIN_MAIN_TEXT_CHARS.saturating_sub(1);
        for id in order {
            let score = scores.get(&id).copied().unwrap_or_default();
            if score > best_score {
                best_score = score;
                best_id = Some(id);
            }
        }
        let best = best_id
            .and_then(|id| document.tree.get(id))
            .and_then(ElementRef::wrap);
        if let Some(el) = best {
            return Some((el, false));
        }

        // Fallback: whatever is left of the body
        document.select(&p.body).next().map(|el| (el, false))
    }

    /// Convert an HTML fragment to Markdown
    fn html_to_markdown(&self, html: &str) -> Result<String> {
        let converter = HtmlToMarkdown::builder()
            .options(Options {
                heading_style: HeadingStyle::Atx,
                ..Default::default()
            })
            .skip_tags(vec!["script", "style", "noscript"])
            .build();
        let mut md = converter
            .convert(html)
            .map_err(|e| ExtractionError::ConversionFailed(e.to_string()))?;

        let p = patterns();
        if !self.config.include_images {
            md = p.image_md.replace_all(&md, "").into_owned();
        }
        if !self.config.include_links {
            md = p.link_md.replace_all(&md, "$1").into_owned();
        }
        md = p.blank_lines.replace_all(&md, "\n\n").into_owned();

        Ok(md.trim().to_string())
    }
}
