//! Retrieval-augmented synthesis: evidence → prompt → one model call.

use pris_core::{AppError, AppResult, Deadline};
use pris_knowledge::{render_evidence_block, EvidenceRetriever, RetrievalQuery};
use pris_llm::{LlmClient, LlmRequest};
use pris_prompt::{BuiltPrompt, PromptComposer};
use pris_stats::CountrySummary;
use std::sync::Arc;

/// Sampling temperature for every synthesis request.
pub const SYNTHESIS_TEMPERATURE: f32 = 0.0;

/// Orchestrates retrieval, prompt composition and the model call.
///
/// Retrieval problems reach the model as evidence; only the model call can
/// fail a request.
#[derive(Clone)]
pub struct SynthesisPipeline {
    retriever: EvidenceRetriever,
    composer: Arc<PromptComposer>,
    llm: Arc<dyn LlmClient>,
    model: String,
    deadline: Deadline,
    max_tokens: Option<u32>,
}

impl SynthesisPipeline {
    pub fn new(
        retriever: EvidenceRetriever,
        composer: Arc<PromptComposer>,
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        deadline: Deadline,
    ) -> Self {
        Self {
            retriever,
            composer,
            llm,
            model: model.into(),
            deadline,
            max_tokens: None,
        }
    }

    /// Cap the length of every generated response.
    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn retriever(&self) -> &EvidenceRetriever {
        &self.retriever
    }

    /// Build a report covering every question.
    pub async fn generate_analysis(
        &self,
        questions: &[String],
        country: &str,
        summary: &CountrySummary,
    ) -> AppResult<String> {
        tracing::info!(country, questions = questions.len(), "Generating analysis report");

        let evidence = self
            .retriever
            .retrieve_many(questions, country, self.deadline)
            .await;
        let block = render_evidence_block(&evidence);

        let prompt = self
            .composer
            .compose_report(&summary.to_string(), &block, questions);

        self.complete(prompt).await
    }

    /// Answer one question.
    pub async fn answer_question(
        &self,
        question: &str,
        country: &str,
        summary: &CountrySummary,
    ) -> AppResult<String> {
        tracing::info!(country, "Answering question");

        let evidence = self
            .retriever
            .retrieve(&RetrievalQuery::new(question, country), self.deadline)
            .await;
        let block = render_evidence_block(&evidence);

        let prompt = self
            .composer
            .compose_answer(&summary.to_string(), &block, question);

        self.complete(prompt).await
    }

    async fn complete(&self, prompt: BuiltPrompt) -> AppResult<String> {
        let mut request =
            LlmRequest::new(prompt.user, self.model.as_str()).with_temperature(SYNTHESIS_TEMPERATURE);
        if let Some(system) = prompt.system {
            request = request.with_system(system);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        tracing::debug!(
            provider = self.llm.provider_name(),
            model = %self.model,
            prompt_id = %prompt.metadata.source_prompt_id,
            chars = request.prompt.len(),
            "Sending synthesis request"
        );

        let response = self
            .deadline
            .run(self.llm.complete(&request), |limit| {
                AppError::SynthesisFailure(format!("model call timed out after {:?}", limit))
            })
            .await
            .map_err(|e| match e {
                AppError::SynthesisFailure(_) => e,
                other => AppError::SynthesisFailure(other.to_string()),
            })?;

        tracing::debug!(
            total_tokens = response.usage.total_tokens,
            "Synthesis completed"
        );

        Ok(response.content)
    }
}
