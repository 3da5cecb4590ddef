//! Prompt system for Sourced.
//!
//! This crate turns retrieved sources and a question into the two
//! instructions sent to the language model:
//! - A numbered context block with bounded excerpts
//! - Handlebars-rendered system and user instructions

pub mod builder;
pub mod context;
pub mod templates;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use context::{build_context, excerpt, MAX_EXCERPT_CHARS};
pub use types::{BuiltPrompt, BuiltPromptMetadata};
