//! In-memory collaborators that record how they were called.

use crate::extract::PageFetcher;
use crate::search::{SearchHit, SearchProvider};
use sourced_core::{AppError, AppResult};
use sourced_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use std::collections::HashSet;
use std::sync::Mutex;

/// Search provider returning canned hits.
pub struct FakeSearch {
    hits: Vec<SearchHit>,
    fail: bool,
    honor_limit: bool,
    queries: Mutex<Vec<String>>,
}

impl FakeSearch {
    /// `count` hits pointing at `https://site{n}.example/page`.
    pub fn with_hits(count: usize) -> Self {
        let hits = (1..=count)
            .map(|n| {
                SearchHit::new(
                    format!("Site {}", n),
                    format!("Snippet {}", n),
                    format!("https://site{}.example/page", n),
                )
            })
            .collect();
        Self::from_hits(hits)
    }

    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            honor_limit: true,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::from_hits(Vec::new())
        }
    }

    /// Return every hit regardless of the requested count.
    pub fn ignoring_limit(mut self) -> Self {
        self.honor_limit = false;
        self
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SearchProvider for FakeSearch {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(&self, query: &str, max_results: usize) -> AppResult<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());

        if self.fail {
            return Err(AppError::Search("provider unavailable".to_string()));
        }

        let limit = if self.honor_limit {
            max_results
        } else {
            self.hits.len()
        };
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

/// Page fetcher returning `text of <url>`, or nothing for failing URLs.
#[derive(Default)]
pub struct FakeFetcher {
    failing: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn failing_on(url: &str) -> Self {
        Self {
            failing: HashSet::from([url.to_string()]),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> String {
        self.calls.lock().unwrap().push(url.to_string());

        if url.is_empty() || self.failing.contains(url) {
            String::new()
        } else {
            format!("text of {}", url)
        }
    }
}

enum Reply {
    /// Cite every `URL:` line of the prompt
    Citing,
    Fixed(String),
    Fail,
}

/// Language model stand-in.
pub struct FakeLlm {
    reply: Reply,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeLlm {
    pub fn citing() -> Self {
        Self::with_reply(Reply::Citing)
    }

    pub fn replying(text: &str) -> Self {
        Self::with_reply(Reply::Fixed(text.to_string()))
    }

    pub fn failing() -> Self {
        Self::with_reply(Reply::Fail)
    }

    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl LlmClient for FakeLlm {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.requests.lock().unwrap().push(request.clone());

        let content = match &self.reply {
            Reply::Fail => return Err(AppError::Llm("quota exceeded".to_string())),
            Reply::Fixed(text) => text.clone(),
            Reply::Citing => {
                let user = request
                    .messages
                    .last()
                    .map(|m| m.content.as_str())
                    .unwrap_or_default();
                let citations: Vec<String> = user
                    .lines()
                    .filter_map(|line| line.strip_prefix("URL: "))
                    .enumerate()
                    .map(|(i, url)| format!("[{}] {}", i + 1, url))
                    .collect();
                format!("A grounded answer.\n\nSources:\n{}", citations.join("\n"))
            }
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::new(10, 5),
        })
    }
}
