//! Shared fixtures for integration tests
//!
//! [`GraphRenderer`] serves a fixed link graph in place of a browser.

#![allow(dead_code)]

use async_trait::async_trait;
use docs_corpus::browser::{PageRenderer, RenderedPage};
use docs_corpus::error::{BrowserError, NavigationError, Result};
use std::collections::{HashMap, HashSet};

/// Renderer backed by an in-memory link graph
#[derive(Debug, Default)]
pub struct GraphRenderer {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    fatal: HashSet<String>,
    disconnect_at: Option<String>,
    disconnected: bool,
    /// Every URL passed to `render`, in call order
    pub rendered: Vec<String>,
}

impl GraphRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page and its outbound links
    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.pages
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    /// Make `url` time out
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Make `url` kill the browser session
    pub fn fatal(mut self, url: &str) -> Self {
        self.fatal.insert(url.to_string());
        self
    }

    /// Lose the browser session when `url` is rendered; every later render fails too
    pub fn disconnect_at(mut self, url: &str) -> Self {
        self.disconnect_at = Some(url.to_string());
        self
    }

    pub fn render_count(&self, url: &str) -> usize {
        self.rendered.iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageRenderer for GraphRenderer {
    async fn render(&mut self, url: &str) -> Result<RenderedPage> {
        self.rendered.push(url.to_string());

        if self.disconnect_at.as_deref() == Some(url) {
            self.disconnected = true;
        }
        if self.disconnected || self.fatal.contains(url) {
            return Err(BrowserError::AlreadyClosed.into());
        }
        if self.failing.contains(url) {
            return Err(NavigationError::Timeout(30_000).into());
        }

        let links = self.pages.get(url).cloned().unwrap_or_default();
        Ok(RenderedPage {
            html: page_html(url),
            links,
        })
    }
}

/// HTML served for `url`
pub fn page_html(url: &str) -> String {
    format!(
        "<html><head><title>{url}</title></head><body><p>Content of {url}</p></body></html>"
    )
}
