//! Page navigation functionality
//!
//! Navigation is a two-stage wait: first until the network has been quiet
//! for [`NavigationOptions::idle_window`], then a fixed settle delay so that
//! client-side scripts can finish mutating the DOM.

use crate::browser::PageHandle;
use crate::error::{Error, NavigationError, Result};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use std::collections::HashSet;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument};

/// Options for page navigation
#[derive(Debug, Clone)]
pub struct NavigationOptions {
    /// Upper bound for navigation plus network-idle wait (default: 30s)
    pub timeout: Duration,
    /// Quiet period with zero in-flight requests that counts as idle (default: 500ms)
    pub idle_window: Duration,
    /// Extra wait after network idle for script-driven rendering (default: 2s)
    pub settle_delay: Duration,
}

impl Default for NavigationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            idle_window: Duration::from_millis(500),
            settle_delay: Duration::from_secs(2),
        }
    }
}

/// Result of a navigation operation
#[derive(Debug)]
pub struct NavigationResult {
    /// Final URL after any redirects
    pub final_url: String,
    /// Navigation duration in milliseconds, settle delay included
    pub duration_ms: u64,
}

/// URL validation utilities
pub struct UrlValidator;

impl UrlValidator {
    /// Validate a URL for navigation
    pub fn validate(url: &str) -> std::result::Result<(), String> {
        if url.is_empty() {
            return Err("URL cannot be empty".to_string());
        }

        if !url.starts_with("http://")
            && !url.starts_with("https://")
            && !url.starts_with("file://")
        {
            return Err(format!(
                "URL must start with http://, https://, or file://: {}",
                url
            ));
        }

        // Max 2048 characters is the common limit
        if url.len() > 2048 {
            return Err("URL exceeds maximum length of 2048 characters".to_string());
        }

        Ok(())
    }
}

#[derive(Debug)]
enum NetworkEvent {
    Started(String),
    Settled(String),
}

/// Drives a page to a URL and waits for it to become quiescent
pub struct PageNavigator;

impl PageNavigator {
    /// Navigate to `url` and wait for network idle plus the settle delay
    #[instrument(skip(page, opts))]
    pub async fn goto(
        page: &PageHandle,
        url: &str,
        opts: &NavigationOptions,
    ) -> Result<NavigationResult> {
        UrlValidator::validate(url).map_err(NavigationError::InvalidUrl)?;

        let start = Instant::now();
        let deadline = start + opts.timeout;
        let timeout_ms = opts.timeout.as_millis() as u64;

        // Subscribe before navigating so no request slips past the counter.
        let mut events = Self::network_events(&page.page).await?;

        info!(url, "Navigating");

        tokio::time::timeout_at(deadline, page.page.goto(url))
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?
            .map_err(Self::classify_load_error)?;

        Self::wait_for_network_idle(&mut events, opts.idle_window, deadline)
            .await
            .map_err(|_| NavigationError::Timeout(timeout_ms))?;

        tokio::time::sleep(opts.settle_delay).await;

        let final_url = page
            .page
            .url()
            .await
            .map_err(|e| Error::cdp(e.to_string()))?
            .unwrap_or_else(|| url.to_string());

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(url, final_url = %final_url, duration_ms, "Navigation complete");

        Ok(NavigationResult {
            final_url,
            duration_ms,
        })
    }

    async fn network_events(
        page: &chromiumoxide::Page,
    ) -> Result<BoxStream<'static, NetworkEvent>> {
        let started = page
            .event_listener::<EventRequestWillBeSent>()
            .await?
            .map(|e| NetworkEvent::Started(e.request_id.inner().clone()))
            .boxed();
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await?
            .map(|e| NetworkEvent::Settled(e.request_id.inner().clone()))
            .boxed();
        let failed = page
            .event_listener::<EventLoadingFailed>()
            .await?
            .map(|e| NetworkEvent::Settled(e.request_id.inner().clone()))
            .boxed();

        Ok(stream::select_all(vec![started, finished, failed]).boxed())
    }

    /// Resolve once no request has been in flight for `idle_window`.
    ///
    /// Fails with `Err(())` if `deadline` passes first.
    async fn wait_for_network_idle(
        events: &mut BoxStream<'static, NetworkEvent>,
        idle_window: Duration,
        deadline: Instant,
    ) -> std::result::Result<(), ()> {
        let mut in_flight: HashSet<String> = HashSet::new();

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(());
            }

            let quiet_until = in_flight.is_empty().then(|| now + idle_window);
            let wake_at = quiet_until.map_or(deadline, |q| q.min(deadline));

            match tokio::time::timeout_at(wake_at, events.next()).await {
                Ok(Some(NetworkEvent::Started(id))) => {
                    in_flight.insert(id);
                }
                Ok(Some(NetworkEvent::Settled(id))) => {
                    in_flight.remove(&id);
                }
                // Event streams closed with the page; nothing left to wait for.
                Ok(None) => return Ok(()),
                Err(_) => match quiet_until {
                    Some(q) if q <= deadline => return Ok(()),
                    _ => return Err(()),
                },
            }
        }
    }

    fn classify_load_error(err: chromiumoxide::error::CdpError) -> NavigationError {
        let msg = err.to_string();
        if msg.contains("net::ERR") {
            NavigationError::NetworkError(msg)
        } else {
            NavigationError::LoadFailed(msg)
        }
    }
}
