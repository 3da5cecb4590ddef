//! Shared data types.

use serde::{Deserialize, Serialize};
use url::Url;

/// One retrieved web result, enriched with the readable text of its page.
///
/// A record is created by the retriever with empty content, enriched by a
/// single extraction attempt, and then consumed once by the synthesizer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Display title, possibly empty
    pub title: String,

    /// Provider-supplied summary, possibly empty
    pub snippet: String,

    /// Absolute URL, empty if the provider omitted it
    pub url: String,

    /// Host component derived from `url`
    pub domain: String,

    /// Extracted page text; `None` or empty when the fetch failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SourceRecord {
    /// Create a record from provider fields. The domain is always derived
    /// from the URL, never taken from the provider.
    pub fn new(
        title: impl Into<String>,
        snippet: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let domain = domain_of(&url);
        Self {
            title: title.into(),
            snippet: snippet.into(),
            url,
            domain,
            content: None,
        }
    }

    /// Attach extracted page text. Empty text is stored as `None`.
    pub fn with_content(mut self, content: String) -> Self {
        self.content = if content.is_empty() {
            None
        } else {
            Some(content)
        };
        self
    }

    /// Whether page text was extracted for this record.
    pub fn has_content(&self) -> bool {
        self.content.as_deref().is_some_and(|c| !c.is_empty())
    }

    /// Text used as evidence: page content when present, the snippet otherwise.
    pub fn evidence(&self) -> &str {
        match self.content.as_deref() {
            Some(content) if !content.is_empty() => content,
            _ => &self.snippet,
        }
    }
}

/// Language-model backends Sourced can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAI,
    Ollama,
}

impl ProviderType {
    /// Every supported provider, in display order.
    pub const ALL: [ProviderType; 2] = [ProviderType::OpenAI, ProviderType::Ollama];

    /// Parse provider type from string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|provider| provider.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Canonical provider name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Ollama => "ollama",
        }
    }

    /// Human-readable provider name for messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::OpenAI => "OpenAI",
            Self::Ollama => "Ollama",
        }
    }

    /// Default endpoint base URL for this provider.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com",
            Self::Ollama => "http://localhost:11434",
        }
    }

    /// Whether this provider refuses to run without an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

/// Extract the host (with a non-default port, if any) from an absolute URL.
///
/// Userinfo and an explicit default port are not part of the domain. Returns an empty string for empty or unparseable input.
pub fn domain_of(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => String::new(),
    }
}
