//! Site router: picks the extraction strategy for a page by its domain

use crate::extract::custom::CustomExtractor;
use crate::extract::wechat::{WechatArticleExtractor, WECHAT_DOMAIN};
use crate::url::network_location;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

/// Routing decision for one page
#[derive(Clone)]
pub enum Route {
    Custom(Arc<dyn CustomExtractor>),
    Generic,
}

impl Route {
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Custom(extractor) => write!(f, "Custom({})", extractor.name()),
            Self::Generic => write!(f, "Generic"),
        }
    }
}

/// Static registry of domain → custom extractor, built once at startup
///
/// Lookups are exact: `www.example.com` and `example.com` are different
/// keys, and a mismatch simply falls back to the generic strategy.
pub struct SiteRouter {
    enabled: bool,
    extractors: HashMap<String, Arc<dyn CustomExtractor>>,
}

impl SiteRouter {
    /// Creates an empty router; when `enabled` is false every page routes to the generic strategy
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            extractors: HashMap::new(),
        }
    }

    /// Creates a router with the built-in extractors registered
    pub fn with_builtin(enabled: bool) -> Self {
        Self::new(enabled).register(WECHAT_DOMAIN, Arc::new(WechatArticleExtractor::new()))
    }

    /// Registers an extractor for an exact domain (`host[:port]`)
    pub fn register(mut self, domain: &str, extractor: Arc<dyn CustomExtractor>) -> Self {
        if !self.enabled {
            tracing::debug!(
                "Custom extractors disabled, not registering {} for {}",
                extractor.name(),
                domain
            );
            return self;
        }
        self.extractors.insert(domain.to_lowercase(), extractor);
        self
    }

    /// Routes by domain
    pub fn route(&self, domain: &str) -> Route {
        match self.extractors.get(domain) {
            Some(extractor) => Route::Custom(Arc::clone(extractor)),
            None => Route::Generic,
        }
    }

    /// Routes by the network location of a page URL
    pub fn route_url(&self, url: &Url) -> Route {
        match network_location(url) {
            Some(domain) => self.route(&domain),
            None => Route::Generic,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registered domains, sorted
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = self.extractors.keys().map(String::as_str).collect();
        domains.sort_unstable();
        domains
    }
}
