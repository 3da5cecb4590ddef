//! Check command handler.
//!
//! Runs only the injection guard, for tuning trigger phrases and thresholds.

use clap::Args;
use sourced_core::{config::AppConfig, AppResult};
use sourced_rag::InjectionGuard;

/// Screen a query for prompt injection
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// The query to screen
    pub query: String,
}

impl CheckCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let guard = InjectionGuard::new(&config.guard);
        let verdict = guard.inspect(&self.query);

        if verdict.is_suspicious() {
            println!("suspicious ({})", verdict.reason());
        } else {
            println!("safe");
        }

        Ok(())
    }
}
