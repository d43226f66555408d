//! Page rendering
//!
//! A [`PageRenderer`] turns a URL into fully rendered HTML plus the anchors
//! visible in the live DOM. [`BrowserRenderer`] is the Chromium-backed
//! implementation: one browser, one tab, reused for every navigation.

use crate::browser::{BrowserConfig, BrowserController, NavigationOptions, PageHandle, PageNavigator};
use crate::error::{BrowserError, Error, RenderError, Result};
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

/// Collects the resolved `href` of every anchor in the rendered document.
const COLLECT_LINKS_JS: &str = r#"
    Array.from(document.querySelectorAll('a[href]'), a => a.href)
"#;

/// Serializes the live document the way `page.content()` does: doctype, then `<html>`.
const SERIALIZE_DOCUMENT_JS: &str = r#"
    (document.doctype ? new XMLSerializer().serializeToString(document.doctype) : '')
        + document.documentElement.outerHTML
"#;

/// Fully rendered page content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Doctype plus `document.documentElement.outerHTML` after rendering settled
    pub html: String,
    /// Absolute hyperlink targets read from the live DOM, in document order
    pub links: Vec<String>,
}

/// Something that can render a URL.
///
/// Implementations are driven sequentially by one crawl; they never see two
/// concurrent `render` calls.
#[async_trait]
pub trait PageRenderer: Send {
    /// Render `url`, failing with a navigation or render error
    async fn render(&mut self, url: &str) -> Result<RenderedPage>;
}

/// Chromium-backed renderer holding a single reusable tab
pub struct BrowserRenderer {
    controller: BrowserController,
    page: PageHandle,
    options: NavigationOptions,
}

impl BrowserRenderer {
    /// Launch the browser session used for a whole crawl
    #[instrument(skip_all)]
    pub async fn launch(config: BrowserConfig, options: NavigationOptions) -> Result<Self> {
        let controller = BrowserController::with_config(config).await?;
        let page = match controller.new_page().await {
            Ok(page) => page,
            Err(e) => {
                let _ = controller.close().await;
                return Err(e);
            }
        };

        info!(
            timeout_ms = options.timeout.as_millis() as u64,
            settle_ms = options.settle_delay.as_millis() as u64,
            "Rendering session ready"
        );

        Ok(Self {
            controller,
            page,
            options,
        })
    }

    /// Navigation options used for every render
    pub fn options(&self) -> &NavigationOptions {
        &self.options
    }

    /// Release the browser process
    pub async fn close(self) -> Result<()> {
        self.controller.close().await
    }

    async fn evaluate<T: serde::de::DeserializeOwned>(
        &self,
        script: &str,
        on_err: fn(String) -> RenderError,
    ) -> Result<T> {
        let value = self
            .page
            .page
            .evaluate(script)
            .await
            .map_err(|e| on_err(e.to_string()))?
            .into_value()
            .map_err(|e| on_err(e.to_string()))?;
        Ok(value)
    }
}

#[async_trait]
impl PageRenderer for BrowserRenderer {
    #[instrument(skip(self))]
    async fn render(&mut self, url: &str) -> Result<RenderedPage> {
        if !self.controller.is_connected() {
            return Err(BrowserError::AlreadyClosed.into());
        }

        match self.render_page(url).await {
            Ok(page) => Ok(page),
            Err(e) => Err(session_error(e, self.controller.is_connected())),
        }
    }
}

impl BrowserRenderer {
    async fn render_page(&self, url: &str) -> Result<RenderedPage> {
        PageNavigator::goto(&self.page, url, &self.options).await?;

        let html: String = self
            .evaluate(SERIALIZE_DOCUMENT_JS, RenderError::HtmlFailed)
            .await?;
        let links: Vec<String> = self
            .evaluate(COLLECT_LINKS_JS, RenderError::LinksFailed)
            .await?;

        debug!(url, bytes = html.len(), links = links.len(), "Page rendered");
        Ok(RenderedPage { html, links })
    }
}

/// A page error raised after the CDP connection died is a session failure,
/// not a problem with that page.
fn session_error(err: Error, connected: bool) -> Error {
    if connected || !err.is_page_local() {
        return err;
    }
    warn!(error = %err, "Browser session lost");
    BrowserError::AlreadyClosed.into()
}
