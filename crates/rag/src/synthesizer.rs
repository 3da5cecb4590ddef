//! Evidence-bounded answer synthesis.

use sourced_core::{AppConfig, AppError, AppResult, SourceRecord};
use sourced_llm::{create_client, ChatMessage, LlmClient, LlmRequest};
use sourced_prompt::build_prompt;
use std::sync::Arc;

/// Builds a grounded prompt from sources and asks the model for an answer.
pub struct AnswerSynthesizer {
    client: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnswerSynthesizer {
    /// Create a synthesizer from application config.
    ///
    /// Fails with `AppError::Config` when no usable credential or model is
    /// configured, so a misconfigured process stops before its first request.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let client = create_client(
            &config.llm.provider,
            config.llm.endpoint.as_deref(),
            config.llm.api_key.as_deref(),
        )
        .map_err(AppError::Config)?;

        tracing::info!(
            "Answer synthesizer using {} model {}",
            client.provider_name(),
            config.llm.model
        );

        Ok(Self::new(client, &config.llm.model)
            .with_max_tokens(config.llm.max_tokens)
            .with_temperature(config.llm.temperature))
    }

    /// Create a synthesizer around an existing client with deterministic
    /// decoding and a 200-token answer budget.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_tokens: 200,
            temperature: 0.0,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the system + user request for a question.
    pub fn build_request(&self, sources: &[SourceRecord], question: &str) -> AppResult<LlmRequest> {
        let built = build_prompt(question, sources)?;

        Ok(LlmRequest::new(
            vec![ChatMessage::system(built.system), ChatMessage::user(built.user)],
            &self.model,
        )
        .with_max_tokens(self.max_tokens)
        .with_temperature(self.temperature))
    }

    /// Answer `question` from `sources`, returning the model text unmodified.
    ///
    /// Backend failures propagate as `AppError::Llm`.
    pub async fn synthesize(&self, sources: &[SourceRecord], question: &str) -> AppResult<String> {
        tracing::info!("Synthesizing answer from {} sources", sources.len());

        let request = self.build_request(sources, question)?;
        let response = self.client.complete(&request).await?;

        Ok(response.content)
    }
}
