//! Page text extraction.
//!
//! Fetches a page and reduces its HTML to readable paragraph text. Failures
//! never escape: a source whose page cannot be fetched simply has no content.

use scraper::{ElementRef, Html, Selector};
use sourced_core::config::FetchConfig;
use sourced_core::{AppError, AppResult};
use std::time::Duration;

/// Something that can turn a URL into readable text.
///
/// Implementations must not fail: any error is reported as an empty string.
#[async_trait::async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> String;
}

/// HTTP page fetcher with paragraph extraction.
pub struct PageTextExtractor {
    client: reqwest::Client,
    user_agent: String,
    timeout: Duration,
}

impl PageTextExtractor {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: config.user_agent.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Fetch `url` and extract its readable text.
    ///
    /// Returns an empty string on transport errors, timeouts, non-success
    /// statuses and unreadable bodies.
    pub async fn extract(&self, url: &str, timeout: Duration) -> String {
        match self.try_extract(url, timeout).await {
            Ok(text) => {
                tracing::debug!("Extracted {} characters from {}", text.len(), url);
                text
            }
            Err(e) => {
                tracing::warn!("{}", e);
                String::new()
            }
        }
    }

    async fn try_extract(&self, url: &str, timeout: Duration) -> AppResult<String> {
        if url.is_empty() {
            return Err(AppError::Fetch("Source has no URL".to_string()));
        }

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to fetch {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("HTTP {} for {}", status, url)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(extract_text(&body))
    }
}

#[async_trait::async_trait]
impl PageFetcher for PageTextExtractor {
    async fn fetch_text(&self, url: &str) -> String {
        self.extract(url, self.timeout).await
    }
}

/// Extract readable text from an HTML document.
///
/// Paragraphs inside the first `<article>` are used when the page has one;
/// otherwise every `<p>` in the document. Whitespace runs collapse to a
/// single space.
pub fn extract_text(html: &str) -> String {
    let (Ok(article_selector), Ok(paragraph_selector)) =
        (Selector::parse("article"), Selector::parse("p"))
    else {
        return String::new();
    };

    let document = Html::parse_document(html);

    let paragraphs: Vec<String> = match document.select(&article_selector).next() {
        Some(article) => article.select(&paragraph_selector).map(visible_text).collect(),
        None => document.select(&paragraph_selector).map(visible_text).collect(),
    };

    paragraphs.join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"
        <html><body>
          <nav><p>Menu entry</p></nav>
          <article>
            <h1>Title</h1>
            <p>First   paragraph
               with a <a href="/x">link</a>.</p>
            <p>Second paragraph.</p>
          </article>
          <footer><p>Footer text</p></footer>
        </body></html>
    "#;

    fn extractor() -> PageTextExtractor {
        PageTextExtractor::new(&FetchConfig::default())
    }

    #[test]
    fn test_article_paragraphs_preferred() {
        assert_eq!(
            extract_text(PAGE),
            "First paragraph with a link . Second paragraph."
        );
    }

    #[test]
    fn test_all_paragraphs_without_article() {
        let html = "<html><body><p>One</p><div><p>Two\n\tthree</p></div><span>skip</span></body></html>";
        assert_eq!(extract_text(html), "One Two three");
    }

    #[test]
    fn test_no_paragraphs_gives_empty_text() {
        assert_eq!(extract_text("<html><body><div>No paragraphs</div></body></html>"), "");
        assert_eq!(extract_text(""), "");
    }

    #[tokio::test]
    async fn test_extract_sends_user_agent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/article"))
            .and(header("user-agent", "Sourced-RAGBot/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/article", server.uri());
        let text = extractor().extract(&url, Duration::from_secs(5)).await;
        assert_eq!(text, "First paragraph with a link . Second paragraph.");
    }

    #[tokio::test]
    async fn test_non_success_status_gives_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<p>Not found</p>"))
            .mount(&server)
            .await;

        let url = format!("{}/missing", server.uri());
        assert_eq!(extractor().extract(&url, Duration::from_secs(5)).await, "");
    }

    #[tokio::test]
    async fn test_timeout_gives_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(PAGE)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let url = format!("{}/slow", server.uri());
        assert_eq!(extractor().extract(&url, Duration::from_millis(100)).await, "");
    }

    #[tokio::test]
    async fn test_unreachable_and_empty_urls_give_empty_text() {
        let extractor = extractor();
        assert_eq!(extractor.fetch_text("").await, "");
        assert_eq!(extractor.fetch_text("not a url").await, "");
    }
}
