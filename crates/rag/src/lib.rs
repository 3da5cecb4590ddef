//! Retrieval-augmented answering over live web sources.
//!
//! A query passes an injection guard, then the top search hits are fetched
//! and reduced to readable text, and finally a language model writes a short
//! answer citing those sources by index.
//!
//! # Example
//! ```no_run
//! use sourced_core::AppConfig;
//! use sourced_rag::Pipeline;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None)?;
//! let pipeline = Pipeline::from_config(&config)?;
//! println!("{}", pipeline.answer("What is CloudWalk?").await?);
//! # Ok(())
//! # }
//! ```

pub mod extract;
pub mod guard;
pub mod pipeline;
pub mod retriever;
pub mod search;
pub mod synthesizer;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use extract::{extract_text, PageFetcher, PageTextExtractor};
pub use guard::{GuardVerdict, InjectionGuard};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineStage, REFUSAL_MESSAGE};
pub use retriever::{SearchOutcome, SearchRetriever};
pub use search::{DuckDuckGoProvider, SearchHit, SearchProvider};
pub use synthesizer::AnswerSynthesizer;
