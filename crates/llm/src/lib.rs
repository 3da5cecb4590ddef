//! LLM integration crate for Sourced.
//!
//! This crate provides a provider-agnostic abstraction for chat-style
//! completions. Requests are an ordered list of role-tagged messages.
//!
//! # Providers
//! - **OpenAI**: Chat Completions API (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use sourced_llm::{ChatMessage, LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new(vec![ChatMessage::user("Hello, world!")], "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{ChatMessage, ChatRole, LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
pub use sourced_core::ProviderType;
