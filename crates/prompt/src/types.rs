//! Prompt types.

use serde::{Deserialize, Serialize};

/// A rendered prompt ready to be sent to the language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System instruction
    pub system: String,

    /// User instruction carrying the question and context block
    pub user: String,

    /// Build metadata
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about how a prompt was built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Number of sources in the context block
    #[serde(rename = "sourceCount")]
    pub source_count: usize,

    /// Characters in the rendered context block
    #[serde(rename = "contextChars")]
    pub context_chars: usize,

    /// Sources whose evidence was cut to the excerpt limit
    #[serde(rename = "truncatedSources")]
    pub truncated_sources: usize,
}
