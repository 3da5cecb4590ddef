//! LLM provider factory.
//!
//! Creates LLM clients from a provider name, an optional endpoint and an
//! optional API key.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use sourced_core::ProviderType;
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint base URL
/// * `api_key` - Optional API key (required by OpenAI)
///
/// # Errors
/// Returns error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    let provider_type =
        ProviderType::parse(provider).ok_or_else(|| format!("Unknown provider: {}", provider))?;
    let base_url = endpoint.unwrap_or(provider_type.default_endpoint());
    let api_key = api_key.filter(|key| !key.trim().is_empty());

    if provider_type.requires_api_key() && api_key.is_none() {
        return Err(format!("{} provider requires API key", provider_type.display_name()));
    }

    match provider_type {
        ProviderType::OpenAI => Ok(Arc::new(OpenAiClient::with_base_url(
            base_url,
            api_key.unwrap_or_default(),
        ))),
        ProviderType::Ollama => Ok(Arc::new(OllamaClient::with_base_url(base_url))),
    }
}
