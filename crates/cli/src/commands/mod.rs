//! Command handlers for the Sourced CLI.

pub mod ask;
pub mod check;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use check::CheckCommand;
