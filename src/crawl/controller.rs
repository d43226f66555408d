//! Crawl orchestration
//!
//! [`CrawlController`] owns the frontier and visited set for exactly one run.
//! It drives a [`PageRenderer`] breadth-first from a seed, persists each page
//! through the [`SnapshotStore`] and feeds in-scope links back to the frontier.

use super::frontier::Frontier;
use super::scope::{domain_of, LinkScope, LinkVerdict, DEFAULT_EXCLUDED_EXTENSIONS};
use crate::browser::{PageRenderer, UrlValidator};
use crate::error::{Error, NavigationError, Result};
use crate::snapshot::SnapshotStore;
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Crawl limits and scoping
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Ceiling on pages dispatched to the renderer, failures included (default: 250)
    pub max_pages: usize,
    /// Domain links must belong to (None = the seed's domain)
    pub base_domain: Option<String>,
    /// Pause after every page, successful or not (default: 1s)
    pub politeness_delay: Duration,
    /// Link suffixes never crawled, matched case-sensitively
    pub excluded_extensions: Vec<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 250,
            base_domain: None,
            politeness_delay: Duration::from_secs(1),
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CrawlConfig {
    /// Create a new config builder
    pub fn builder() -> CrawlConfigBuilder {
        CrawlConfigBuilder::default()
    }
}

/// Builder for CrawlConfig
#[derive(Default)]
pub struct CrawlConfigBuilder {
    config: CrawlConfig,
}

impl CrawlConfigBuilder {
    /// Set the page ceiling
    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Restrict the crawl to this domain instead of the seed's
    pub fn base_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.config.base_domain = Some(domain.into());
        self
    }

    /// Set the inter-request delay
    pub fn politeness_delay(mut self, delay: Duration) -> Self {
        self.config.politeness_delay = delay;
        self
    }

    /// Exclude one more link suffix (e.g. `.svg`)
    pub fn exclude_extension<S: Into<String>>(mut self, ext: S) -> Self {
        self.config.excluded_extensions.push(ext.into());
        self
    }

    /// Build the config
    pub fn build(self) -> CrawlConfig {
        self.config
    }
}

/// Lifecycle of one crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    /// Not seeded yet
    Idle,
    /// Frontier is being processed
    Running,
    /// Frontier ran dry
    Exhausted,
    /// Visited set hit `max_pages`
    CeilingReached,
    /// Report taken; the controller will not run again
    Done,
}

/// A page that was dispatched but produced no snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageFailure {
    /// URL that failed
    pub url: String,
    /// Rendered error message
    pub error: String,
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Visited-set size (every dispatched page, failures included)
    pub visited: usize,
    /// Snapshots written
    pub saved: usize,
    /// Per-page failures, in crawl order
    pub failures: Vec<PageFailure>,
    /// `Exhausted` or `CeilingReached`
    pub outcome: CrawlState,
    /// Wall time since seeding
    pub elapsed: Duration,
}

/// Single-run crawl orchestrator.
///
/// The controller is the only mutator of its frontier and visited set, so no
/// locking is involved. Create one per run.
pub struct CrawlController<R> {
    renderer: R,
    store: SnapshotStore,
    config: CrawlConfig,
    scope: Option<LinkScope>,
    frontier: Frontier,
    visited: HashSet<String>,
    state: CrawlState,
    outcome: Option<CrawlState>,
    saved: usize,
    failures: Vec<PageFailure>,
    started: Option<Instant>,
}

impl<R: PageRenderer> CrawlController<R> {
    /// Create an idle controller
    pub fn new(renderer: R, store: SnapshotStore, config: CrawlConfig) -> Self {
        Self {
            renderer,
            store,
            config,
            scope: None,
            frontier: Frontier::new(),
            visited: HashSet::new(),
            state: CrawlState::Idle,
            outcome: None,
            saved: 0,
            failures: Vec::new(),
            started: None,
        }
    }

    /// Seed and run to completion
    #[instrument(skip(self))]
    pub async fn crawl(&mut self, seed: &str) -> Result<CrawlReport> {
        self.seed(seed)?;
        while self.step().await? == CrawlState::Running {}
        Ok(self.finish())
    }

    /// Put the seed on the frontier and start the run
    pub fn seed(&mut self, seed: &str) -> Result<()> {
        if self.state != CrawlState::Idle {
            return Err(Error::generic("crawl controller already seeded"));
        }

        UrlValidator::validate(seed).map_err(NavigationError::InvalidUrl)?;
        let seed_url =
            Url::parse(seed).map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", seed, e)))?;

        let base_domain = match &self.config.base_domain {
            Some(domain) => domain.clone(),
            None => domain_of(&seed_url).ok_or_else(|| {
                NavigationError::InvalidUrl(format!("seed has no host: {}", seed))
            })?,
        };
        let scope = LinkScope::new(base_domain, self.config.excluded_extensions.clone());

        info!(
            seed = %seed_url,
            base_domain = scope.base_domain(),
            max_pages = self.config.max_pages,
            "Starting crawl"
        );

        self.frontier.push(seed_url.into());
        self.scope = Some(scope);
        self.started = Some(Instant::now());
        self.state = CrawlState::Running;
        Ok(())
    }

    /// Process one frontier entry. Returns the state after the step.
    ///
    /// Page-local failures are recorded and do not surface as `Err`; only
    /// run-fatal errors do.
    pub async fn step(&mut self) -> Result<CrawlState> {
        if self.state != CrawlState::Running {
            return Ok(self.state);
        }

        if self.frontier.is_empty() {
            self.state = CrawlState::Exhausted;
            return Ok(self.state);
        }
        if self.visited.len() >= self.config.max_pages {
            info!(
                max_pages = self.config.max_pages,
                pending = self.frontier.len(),
                "Page ceiling reached"
            );
            self.state = CrawlState::CeilingReached;
            return Ok(self.state);
        }

        let Some(url) = self.frontier.pop() else {
            self.state = CrawlState::Exhausted;
            return Ok(self.state);
        };
        if !self.visited.insert(url.clone()) {
            return Ok(self.state);
        }

        info!(
            url = %url,
            n = self.visited.len(),
            max = self.config.max_pages,
            "Crawling"
        );

        match self.visit(&url).await {
            Ok(links) => self.enqueue(&url, &links),
            Err(e) if e.is_page_local() => {
                error!(url = %url, error = %e, "Error crawling page");
                self.failures.push(PageFailure {
                    url: url.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }

        tokio::time::sleep(self.config.politeness_delay).await;
        Ok(self.state)
    }

    /// Render and persist one page, returning its outbound links
    async fn visit(&mut self, url: &str) -> Result<Vec<String>> {
        let page = self.renderer.render(url).await?;
        let parsed =
            Url::parse(url).map_err(|e| NavigationError::InvalidUrl(format!("{}: {}", url, e)))?;
        self.store.save(&parsed, &page.html).await?;
        self.saved += 1;
        Ok(page.links)
    }

    fn enqueue(&mut self, from: &str, links: &[String]) {
        let Some(scope) = &self.scope else {
            return;
        };

        let mut added = 0usize;
        for link in links {
            match scope.classify(link) {
                LinkVerdict::Admit(url) => {
                    let url = String::from(url);
                    if !self.visited.contains(&url) && self.frontier.push(url) {
                        added += 1;
                    }
                }
                verdict => debug!(link = %link, ?verdict, "Link filtered"),
            }
        }

        debug!(
            from = %from,
            discovered = links.len(),
            added,
            pending = self.frontier.len(),
            "Links enqueued"
        );
    }

    /// Close the run and produce its report. Moves `Exhausted`/`CeilingReached` to `Done`.
    pub fn finish(&mut self) -> CrawlReport {
        match self.state {
            CrawlState::Exhausted | CrawlState::CeilingReached => {
                self.outcome = Some(self.state);
                self.state = CrawlState::Done;
            }
            CrawlState::Idle | CrawlState::Running => {
                warn!(state = ?self.state, "Crawl report requested before completion");
            }
            CrawlState::Done => {}
        }

        let elapsed = self.started.map(|s| s.elapsed()).unwrap_or_default();
        let report = CrawlReport {
            visited: self.visited.len(),
            saved: self.saved,
            failures: self.failures.clone(),
            outcome: self.outcome.unwrap_or(self.state),
            elapsed,
        };

        info!(
            visited = report.visited,
            saved = report.saved,
            failed = report.failures.len(),
            outcome = ?report.outcome,
            elapsed_secs = elapsed.as_secs_f64(),
            "Crawl finished"
        );
        report
    }

    /// Current lifecycle state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// URLs dispatched so far
    pub fn visited(&self) -> impl Iterator<Item = &str> {
        self.visited.iter().map(String::as_str)
    }

    /// Number of URLs dispatched so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Pending URLs in crawl order
    pub fn frontier_urls(&self) -> Vec<&str> {
        self.frontier.iter().collect()
    }

    /// Give the renderer back, e.g. to close the browser session
    pub fn into_renderer(self) -> R {
        self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::RenderedPage;
    use async_trait::async_trait;

    struct EchoRenderer;

    #[async_trait]
    impl PageRenderer for EchoRenderer {
        async fn render(&mut self, url: &str) -> Result<RenderedPage> {
            Ok(RenderedPage {
                html: format!("<html><body><p>{}</p></body></html>", url),
                links: Vec::new(),
            })
        }
    }

    #[test]
    fn test_crawl_config_default() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_pages, 250);
        assert!(config.base_domain.is_none());
        assert_eq!(config.politeness_delay, Duration::from_secs(1));
        assert_eq!(
            config.excluded_extensions,
            vec![".pdf", ".zip", ".png", ".jpg", ".jpeg"]
        );
    }

    #[test]
    fn test_crawl_config_builder() {
        let config = CrawlConfig::builder()
            .max_pages(10)
            .base_domain("docs.x.com")
            .politeness_delay(Duration::ZERO)
            .exclude_extension(".svg")
            .build();
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.base_domain.as_deref(), Some("docs.x.com"));
        assert_eq!(config.politeness_delay, Duration::ZERO);
        assert!(config.excluded_extensions.contains(&".svg".to_string()));
        assert_eq!(config.excluded_extensions.len(), 6);
    }

    #[tokio::test]
    async fn test_state_machine() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        let config = CrawlConfig::builder()
            .politeness_delay(Duration::ZERO)
            .build();
        let mut controller = CrawlController::new(EchoRenderer, store, config);

        assert_eq!(controller.state(), CrawlState::Idle);
        controller.seed("https://x.com/").unwrap();
        assert_eq!(controller.state(), CrawlState::Running);
        assert!(controller.seed("https://x.com/").is_err());

        assert_eq!(controller.step().await.unwrap(), CrawlState::Running);
        assert_eq!(controller.step().await.unwrap(), CrawlState::Exhausted);

        let report = controller.finish();
        assert_eq!(report.outcome, CrawlState::Exhausted);
        assert_eq!(controller.state(), CrawlState::Done);
        // No transition back once done
        assert_eq!(controller.step().await.unwrap(), CrawlState::Done);
    }

    #[tokio::test]
    async fn test_rejects_invalid_seed() {
        let tmp = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(tmp.path()).await.unwrap();
        let mut controller = CrawlController::new(EchoRenderer, store, CrawlConfig::default());

        assert!(controller.seed("not a url").is_err());
        assert_eq!(controller.state(), CrawlState::Idle);
    }
}
