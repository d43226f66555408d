//! Link scoping
//!
//! Decides which discovered links are eligible for the frontier: same domain
//! as the crawl, no fragment, no binary-asset suffix.

use url::Url;

/// Suffixes excluded from crawling unless configured otherwise
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".pdf", ".zip", ".png", ".jpg", ".jpeg"];

/// Why a link was or was not admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkVerdict {
    /// In scope; carries the normalized URL
    Admit(Url),
    /// Contains a `#` anywhere
    Fragment,
    /// Ends with an excluded suffix
    ExcludedExtension,
    /// Not parseable as an absolute URL
    Unparseable,
    /// Not http(s)
    UnsupportedScheme,
    /// Host differs from the crawl's base domain
    OffDomain,
}

/// Host (and explicit port) of a URL, lowercased.
///
/// `https://Docs.Example.com:8443/x` → `docs.example.com:8443`
pub fn domain_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    })
}

/// Link filter bound to one crawl's base domain
#[derive(Debug, Clone)]
pub struct LinkScope {
    base_domain: String,
    excluded_extensions: Vec<String>,
}

impl LinkScope {
    /// Scope links to `base_domain`, rejecting the given suffixes
    pub fn new<S: Into<String>>(base_domain: S, excluded_extensions: Vec<String>) -> Self {
        Self {
            base_domain: base_domain.into().to_lowercase(),
            excluded_extensions,
        }
    }

    /// The domain links must match
    pub fn base_domain(&self) -> &str {
        &self.base_domain
    }

    /// Classify a discovered link
    pub fn classify(&self, link: &str) -> LinkVerdict {
        if link.contains('#') {
            return LinkVerdict::Fragment;
        }
        if self
            .excluded_extensions
            .iter()
            .any(|ext| link.ends_with(ext.as_str()))
        {
            return LinkVerdict::ExcludedExtension;
        }

        let url = match Url::parse(link) {
            Ok(url) => url,
            Err(_) => return LinkVerdict::Unparseable,
        };
        if !matches!(url.scheme(), "http" | "https") {
            return LinkVerdict::UnsupportedScheme;
        }
        match domain_of(&url) {
            Some(domain) if domain == self.base_domain => LinkVerdict::Admit(url),
            _ => LinkVerdict::OffDomain,
        }
    }

    /// Normalized URL if the link is in scope
    pub fn admit(&self, link: &str) -> Option<Url> {
        match self.classify(link) {
            LinkVerdict::Admit(url) => Some(url),
            _ => None,
        }
    }
}
