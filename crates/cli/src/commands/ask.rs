//! Ask command handler.
//!
//! Runs the full pipeline once and prints the answer to stdout.

use clap::Args;
use sourced_core::{config::AppConfig, AppError, AppResult};
use sourced_rag::{Pipeline, PipelineOutcome};
use std::path::PathBuf;

/// Answer a question from web sources
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Number of web sources to retrieve
    #[arg(long)]
    pub max_results: Option<usize>,

    /// Abort if answering takes longer than this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let question = self.get_question()?;

        let mut config = config.clone();
        if let Some(max_results) = self.max_results {
            config.search.max_results = max_results;
        }
        if self.timeout.is_some() {
            config.request_timeout_secs = self.timeout;
        }

        let pipeline = Pipeline::from_config(&config)?;
        let outcome = pipeline.run(&question).await?;

        if self.json {
            let json = serde_json::to_string_pretty(&self.to_json(&outcome, &pipeline))
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", outcome.text());
        }

        Ok(())
    }

    fn to_json(&self, outcome: &PipelineOutcome, pipeline: &Pipeline) -> serde_json::Value {
        let sources = match outcome {
            PipelineOutcome::Answered { sources, .. } => sources
                .iter()
                .enumerate()
                .map(|(i, s)| {
                    serde_json::json!({
                        "index": i + 1,
                        "title": s.title,
                        "url": s.url,
                        "domain": s.domain,
                        "hasContent": s.has_content()
                    })
                })
                .collect(),
            PipelineOutcome::Blocked { .. } => Vec::new(),
        };

        serde_json::json!({
            "answer": outcome.text(),
            "blocked": outcome.is_blocked(),
            "provider": pipeline.synthesizer().provider_name(),
            "model": pipeline.synthesizer().model(),
            "sources": sources
        })
    }

    /// Get the question text from the argument or a file.
    fn get_question(&self) -> AppResult<String> {
        let question = match (&self.question, &self.file) {
            (Some(question), _) => question.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };

        if question.trim().is_empty() {
            return Err(AppError::Config("No question provided".to_string()));
        }

        Ok(question)
    }
}
