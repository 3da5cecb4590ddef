//! Request-scoped answer pipeline.
//!
//! `Start -> Blocked` for suspicious queries, otherwise
//! `Start -> Retrieving -> Synthesizing -> Done`. Nothing is retried and no
//! state survives between invocations.

use crate::extract::PageTextExtractor;
use crate::guard::InjectionGuard;
use crate::retriever::SearchRetriever;
use crate::search::DuckDuckGoProvider;
use crate::synthesizer::AnswerSynthesizer;
use serde::Serialize;
use sourced_core::{AppConfig, AppError, AppResult, SourceRecord};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Reply given to queries the guard rejects.
pub const REFUSAL_MESSAGE: &str =
    "Please ask different questions, I am unable to answer that question.";

/// Stages a single invocation moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    Blocked,
    Retrieving,
    Synthesizing,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Blocked => "blocked",
            Self::Retrieving => "retrieving",
            Self::Synthesizing => "synthesizing",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal result of one invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PipelineOutcome {
    /// The guard rejected the query; nothing was retrieved or generated
    Blocked { message: String },
    /// The model answered from the retrieved sources
    Answered {
        answer: String,
        sources: Vec<SourceRecord>,
    },
}

impl PipelineOutcome {
    /// Text returned to the user.
    pub fn text(&self) -> &str {
        match self {
            Self::Blocked { message } => message,
            Self::Answered { answer, .. } => answer,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Blocked { message } => message,
            Self::Answered { answer, .. } => answer,
        }
    }
}

/// Guard, retrieval and synthesis wired together.
pub struct Pipeline {
    guard: InjectionGuard,
    retriever: SearchRetriever,
    synthesizer: AnswerSynthesizer,
    max_results: usize,
    deadline: Option<Duration>,
}

impl Pipeline {
    pub fn new(
        guard: InjectionGuard,
        retriever: SearchRetriever,
        synthesizer: AnswerSynthesizer,
    ) -> Self {
        Self {
            guard,
            retriever,
            synthesizer,
            max_results: 2,
            deadline: None,
        }
    }

    /// Build the production pipeline (DuckDuckGo search, HTTP page fetches,
    /// configured LLM backend).
    ///
    /// Fails with `AppError::Config` when the LLM backend is unusable.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let synthesizer = AnswerSynthesizer::from_config(config)?;
        let provider = Arc::new(DuckDuckGoProvider::new(&config.search, &config.fetch));
        let fetcher = Arc::new(PageTextExtractor::new(&config.fetch));
        let retriever = SearchRetriever::new(provider, fetcher, &config.search);

        let mut pipeline = Self::new(InjectionGuard::new(&config.guard), retriever, synthesizer)
            .with_max_results(config.search.max_results);
        if let Some(secs) = config.request_timeout_secs {
            pipeline = pipeline.with_deadline(Duration::from_secs(secs));
        }

        Ok(pipeline)
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Abort the whole invocation after `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn guard(&self) -> &InjectionGuard {
        &self.guard
    }

    pub fn synthesizer(&self) -> &AnswerSynthesizer {
        &self.synthesizer
    }

    /// Answer a query, returning only the final text.
    pub async fn answer(&self, query: &str) -> AppResult<String> {
        Ok(self.run(query).await?.into_text())
    }

    /// Run one invocation.
    ///
    /// The query is trimmed and lowercased first. When a deadline is set and
    /// expires, in-flight fetches and model calls are dropped and
    /// `AppError::Timeout` is returned; no partial answer escapes.
    pub async fn run(&self, query: &str) -> AppResult<PipelineOutcome> {
        let query = query.trim().to_lowercase();
        let stages = self
            .run_stages(&query)
            .instrument(tracing::info_span!("pipeline", query = %query));

        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, stages)
                .await
                .map_err(|_| {
                    tracing::warn!("Pipeline deadline of {:?} exceeded", deadline);
                    AppError::Timeout(deadline)
                })?,
            None => stages.await,
        }
    }

    async fn run_stages(&self, query: &str) -> AppResult<PipelineOutcome> {
        log_stage(PipelineStage::Start);

        if self.guard.is_suspicious(query) {
            log_stage(PipelineStage::Blocked);
            return Ok(PipelineOutcome::Blocked {
                message: REFUSAL_MESSAGE.to_string(),
            });
        }

        log_stage(PipelineStage::Retrieving);
        let sources = self.retriever.search(query, self.max_results).await;

        log_stage(PipelineStage::Synthesizing);
        let answer = self.synthesizer.synthesize(&sources, query).await?;

        log_stage(PipelineStage::Done);
        Ok(PipelineOutcome::Answered { answer, sources })
    }
}

fn log_stage(stage: PipelineStage) {
    tracing::info!(stage = %stage, "Pipeline stage");
}
