//! Web search providers.

pub mod duckduckgo;

pub use duckduckgo::DuckDuckGoProvider;

use serde::{Deserialize, Serialize};
use sourced_core::AppResult;

/// A raw hit as returned by a search provider.
///
/// Providers differ in which fields they fill; the retriever supplies
/// defaults for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub href: Option<String>,
    pub url: Option<String>,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            body: Some(body.into()),
            href: Some(href.into()),
            url: None,
        }
    }

    /// Link target, preferring `href` over `url`. Empty values are skipped.
    pub fn link(&self) -> &str {
        [self.href.as_deref(), self.url.as_deref()]
            .into_iter()
            .flatten()
            .find(|link| !link.is_empty())
            .unwrap_or_default()
    }
}

/// A web search backend.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Run a text search returning at most `max_results` hits in ranked order.
    ///
    /// Failures are returned as `AppError::Search`.
    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<SearchHit>>;
}
