//! DuckDuckGo search provider.
//!
//! Uses the JavaScript-free HTML interface: the query is posted as a form and
//! results are scraped from the returned page.

use crate::search::{SearchHit, SearchProvider};
use scraper::{Html, Selector};
use sourced_core::config::{FetchConfig, SearchConfig};
use sourced_core::{AppError, AppResult};
use std::time::Duration;
use url::Url;

/// Markers of the anti-bot challenge page served instead of results.
const CHALLENGE_MARKERS: [&str; 4] = [
    "Unfortunately, bots use DuckDuckGo too",
    "anomaly-modal",
    "challenge-form",
    "Please complete the following challenge",
];

/// DuckDuckGo HTML search client.
pub struct DuckDuckGoProvider {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    timeout: Duration,
}

impl DuckDuckGoProvider {
    pub fn new(search: &SearchConfig, fetch: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: search.endpoint.clone(),
            user_agent: fetch.user_agent.clone(),
            timeout: Duration::from_secs(search.timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<SearchHit>> {
        tracing::debug!("DuckDuckGo search: {}", query);

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, "text/html")
            .form(&[("q", query)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| AppError::Search(format!("DuckDuckGo request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Search(format!(
                "DuckDuckGo returned HTTP {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Search(format!("Failed to read DuckDuckGo response: {}", e)))?;

        // The challenge page comes back as 202 with no result blocks
        if status == reqwest::StatusCode::ACCEPTED || is_challenge_page(&body) {
            tracing::warn!("DuckDuckGo served a bot challenge (HTTP {})", status);
            return Err(AppError::Search(
                "DuckDuckGo detected automated access and served a challenge page".to_string(),
            ));
        }

        parse_results(&body, max_results)
    }
}

/// Parse hits from a DuckDuckGo HTML results page.
///
/// Sponsored results and entries without a title are skipped.
pub fn parse_results(html: &str, max_results: usize) -> AppResult<Vec<SearchHit>> {
    let selector = |css: &str| {
        Selector::parse(css)
            .map_err(|e| AppError::Search(format!("Invalid selector {}: {:?}", css, e)))
    };
    let result_selector = selector(".result")?;
    let link_selector = selector("a.result__a")?;
    let snippet_selector = selector(".result__snippet")?;

    // `Html` is not Send; it never lives across an await
    let document = Html::parse_document(html);

    let hits = document
        .select(&result_selector)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let link = result.select(&link_selector).next()?;
            let title = collapse(&link.text().collect::<String>());
            if title.is_empty() {
                return None;
            }

            let href = link.value().attr("href").map(resolve_redirect).unwrap_or_default();
            let body = result
                .select(&snippet_selector)
                .next()
                .map(|s| collapse(&s.text().collect::<String>()))
                .unwrap_or_default();

            Some(SearchHit::new(title, body, href))
        })
        .take(max_results)
        .collect();

    Ok(hits)
}

/// Whether the page is DuckDuckGo's anti-bot challenge rather than results.
pub fn is_challenge_page(html: &str) -> bool {
    CHALLENGE_MARKERS.iter().any(|marker| html.contains(marker))
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links.
fn resolve_redirect(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    match Url::parse(&absolute) {
        Ok(parsed) => parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned())
            .unwrap_or(absolute),
        Err(_) => href.to_string(),
    }
}

fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
