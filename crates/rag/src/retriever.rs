//! Web retrieval: search, then extract each hit's page text.

use crate::extract::PageFetcher;
use crate::search::{SearchHit, SearchProvider};
use sourced_core::config::{SearchConfig, SiteRule};
use sourced_core::{AppError, SourceRecord};
use std::sync::Arc;
use std::time::Duration;

/// Result of the provider call before it is collapsed into a list.
///
/// The external contract treats all three the same (possibly empty list);
/// the distinction exists for logging.
#[derive(Debug)]
pub enum SearchOutcome {
    Hits(Vec<SearchHit>),
    Empty,
    Failed(AppError),
}

/// Searches the web and enriches every hit with its page text.
pub struct SearchRetriever {
    provider: Arc<dyn SearchProvider>,
    fetcher: Arc<dyn PageFetcher>,
    site_rules: Vec<SiteRule>,
    pause: Duration,
}

impl SearchRetriever {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        fetcher: Arc<dyn PageFetcher>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            provider,
            fetcher,
            site_rules: config.site_rules.clone(),
            pause: Duration::from_millis(config.pause_ms),
        }
    }

    /// Prepend a `site:` restriction when the query names a known organization.
    pub fn rewrite_query(&self, query: &str) -> String {
        let lowered = query.to_lowercase();
        match self
            .site_rules
            .iter()
            .find(|rule| lowered.contains(&rule.keyword.to_lowercase()))
        {
            Some(rule) => format!("site:{} {}", rule.site, query),
            None => query.to_string(),
        }
    }

    /// Call the provider and classify the outcome.
    pub async fn run_search(&self, query: &str, max_results: usize) -> SearchOutcome {
        match self.provider.search(query, max_results).await {
            Ok(hits) if hits.is_empty() => SearchOutcome::Empty,
            Ok(hits) => SearchOutcome::Hits(hits),
            Err(e) => SearchOutcome::Failed(e),
        }
    }

    /// Retrieve up to `max_results` sources for `query`.
    ///
    /// Never fails: a provider error yields an empty list, a page error
    /// yields a record without content. Order follows the provider.
    pub async fn search(&self, query: &str, max_results: usize) -> Vec<SourceRecord> {
        let query = self.rewrite_query(query);
        tracing::info!("Searching {} for: {}", self.provider.name(), query);

        let hits = match self.run_search(&query, max_results).await {
            SearchOutcome::Hits(hits) => hits,
            SearchOutcome::Empty => {
                tracing::info!("Search returned no results");
                return Vec::new();
            }
            SearchOutcome::Failed(e) => {
                tracing::warn!("Search provider failed, continuing without sources: {}", e);
                return Vec::new();
            }
        };

        let mut sources = Vec::with_capacity(hits.len().min(max_results));
        for (i, hit) in hits.into_iter().take(max_results).enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }

            let record = SourceRecord::new(
                hit.title.clone().unwrap_or_default(),
                hit.body.clone().unwrap_or_default(),
                hit.link(),
            );
            let content = self.fetcher.fetch_text(&record.url).await;
            if content.is_empty() {
                tracing::debug!("No content extracted for source {} ({})", i + 1, record.url);
            }

            sources.push(record.with_content(content));
        }

        tracing::info!(
            "Retrieved {} sources ({} with page content)",
            sources.len(),
            sources.iter().filter(|s| s.has_content()).count()
        );

        sources
    }
}
