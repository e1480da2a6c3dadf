//! PRIS analysis engine.
//!
//! Ties the reactor statistics, evidence retrieval, prompt templates and the
//! generative model together behind [`Engine`]. Presentation layers talk to
//! the engine through [`ReportRequest`] and [`QuestionRequest`] and keep
//! per-user state in a [`Session`].

pub mod catalog;
pub mod pipeline;
pub mod requests;
pub mod session;


pub use catalog::QuestionCatalog;
pub use pipeline::{SynthesisPipeline, SYNTHESIS_TEMPERATURE};
pub use requests::{QuestionRequest, ReportRequest, SynthesisResponse};
pub use session::{
    enforce_limit, ChatRole, ChatTranscript, ChatTurn, SelectionState, Session, ToggleOutcome,
    MAX_SELECTED,
};

use pris_core::{AppConfig, AppError, AppResult, Deadline};
use pris_knowledge::{open_index, EvidenceRetriever};
use pris_llm::create_client;
use pris_prompt::PromptComposer;
use pris_stats::{CountrySummary, Dataset, StatisticsSummarizer};
use std::sync::Arc;

/// Shared, read-only engine state. One per process.
#[derive(Clone)]
pub struct Engine {
    catalog: Arc<QuestionCatalog>,
    summarizer: StatisticsSummarizer,
    pipeline: SynthesisPipeline,
}

impl Engine {
    pub fn new(
        catalog: QuestionCatalog,
        summarizer: StatisticsSummarizer,
        pipeline: SynthesisPipeline,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            summarizer,
            pipeline,
        }
    }

    /// Build the engine from configuration.
    ///
    /// A missing dataset is fatal. A missing index only degrades retrieval.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let dataset = Arc::new(Dataset::load(&config.dataset_path())?);
        let summarizer = StatisticsSummarizer::new(dataset);

        let catalog = match config.catalog_path() {
            Some(path) => QuestionCatalog::load(&path)?,
            None => QuestionCatalog::builtin(),
        };

        let embedding_key = config.resolve_api_key(&config.embedding.provider);
        let retriever = EvidenceRetriever::from_result(open_index(
            &config.index_path(),
            &config.embedding,
            embedding_key.as_deref(),
        ));

        let composer = Arc::new(PromptComposer::from_dir(&config.prompts_dir())?);

        let endpoint = config
            .get_provider_config(&config.provider)
            .and_then(|p| p.endpoint());
        let api_key = config.resolve_api_key(&config.provider);
        let llm = create_client(&config.provider, endpoint, api_key.as_deref())?;

        let deadline = Deadline::from_secs(config.deadline_secs);
        let pipeline = SynthesisPipeline::new(retriever, composer, llm, config.model.as_str(), deadline)
            .with_max_tokens(config.max_tokens);

        tracing::info!(
            provider = %config.provider,
            model = %config.model,
            retrieval = pipeline.retriever().is_available(),
            "Engine ready"
        );

        Ok(Self::new(catalog, summarizer, pipeline))
    }

    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    pub fn summarizer(&self) -> &StatisticsSummarizer {
        &self.summarizer
    }

    pub fn pipeline(&self) -> &SynthesisPipeline {
        &self.pipeline
    }

    /// Fresh summary for `country`; never cached.
    pub fn summarize(&self, country: &str) -> CountrySummary {
        self.summarizer.summarize(country)
    }

    pub fn new_session(&self, country: impl Into<String>) -> Session {
        Session::new(country)
    }

    /// Generate a report for up to [`MAX_SELECTED`] questions.
    pub async fn generate_report(&self, request: &ReportRequest) -> AppResult<SynthesisResponse> {
        if request.questions.is_empty() {
            return Err(AppError::Other(format!(
                "Select up to {} guided questions to run the analysis.",
                MAX_SELECTED
            )));
        }

        let (questions, clamped) = enforce_limit(request.questions.iter().cloned().collect());
        if clamped {
            tracing::warn!(
                "Report request had {} questions, using the last {}",
                request.questions.len(),
                MAX_SELECTED
            );
        }
        let questions: Vec<String> = questions.into_iter().collect();

        let summary = self.summarize(&request.country);
        let text = self
            .pipeline
            .generate_analysis(&questions, &request.country, &summary)
            .await?;

        Ok(SynthesisResponse { text })
    }

    /// Answer a single free-form question.
    pub async fn answer(&self, request: &QuestionRequest) -> AppResult<SynthesisResponse> {
        let summary = self.summarize(&request.country);
        let text = self
            .pipeline
            .answer_question(&request.question, &request.country, &summary)
            .await?;

        Ok(SynthesisResponse { text })
    }
}
