//! Prompt-injection guard.
//!
//! A cheap lexical screen run before any retrieval or generation. It is a
//! heuristic, not a security boundary: false positives and negatives are
//! expected.

use sourced_core::config::GuardConfig;

/// Which heuristic classified a query.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardVerdict {
    /// No heuristic fired
    Safe,
    /// Too many non-alphanumeric, non-whitespace characters
    SymbolDensity { symbols: usize, length: usize },
    /// A known meta-instruction phrase appeared in the query
    TriggerPhrase(String),
}

impl GuardVerdict {
    pub fn is_suspicious(&self) -> bool {
        !matches!(self, Self::Safe)
    }

    /// Short label for logs and the `check` command.
    pub fn reason(&self) -> String {
        match self {
            Self::Safe => "safe".to_string(),
            Self::SymbolDensity { symbols, length } => {
                format!("symbol density {}/{}", symbols, length)
            }
            Self::TriggerPhrase(phrase) => format!("trigger phrase \"{}\"", phrase),
        }
    }
}

/// Classifies queries as safe or suspicious.
#[derive(Debug, Clone)]
pub struct InjectionGuard {
    symbol_density_threshold: f64,
    min_length: usize,
    trigger_phrases: Vec<String>,
}

impl InjectionGuard {
    pub fn new(config: &GuardConfig) -> Self {
        Self {
            symbol_density_threshold: config.symbol_density_threshold,
            min_length: config.min_length,
            trigger_phrases: config
                .trigger_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Classify a query, reporting which heuristic fired.
    ///
    /// Checks run in order (symbol density, then trigger phrases) and the
    /// first hit wins.
    pub fn inspect(&self, query: &str) -> GuardVerdict {
        let normalized = query.trim().to_lowercase();

        // Lengths are in characters so non-ASCII input is measured fairly
        let length = normalized.chars().count();
        let symbols = normalized
            .chars()
            .filter(|c| !c.is_alphanumeric() && !c.is_whitespace())
            .count();

        if length > self.min_length
            && (symbols as f64 / length as f64) > self.symbol_density_threshold
        {
            return GuardVerdict::SymbolDensity { symbols, length };
        }

        if let Some(phrase) = self
            .trigger_phrases
            .iter()
            .find(|phrase| normalized.contains(phrase.as_str()))
        {
            return GuardVerdict::TriggerPhrase(phrase.clone());
        }

        GuardVerdict::Safe
    }

    /// Whether a query looks like a prompt-injection attempt.
    pub fn is_suspicious(&self, query: &str) -> bool {
        let verdict = self.inspect(query);
        if verdict.is_suspicious() {
            tracing::warn!(
                reason = %verdict.reason(),
                "Potential prompt injection attempt detected and blocked"
            );
            true
        } else {
            tracing::debug!("No prompt injection detected");
            false
        }
    }
}

impl Default for InjectionGuard {
    fn default() -> Self {
        Self::new(&GuardConfig::default())
    }
}
