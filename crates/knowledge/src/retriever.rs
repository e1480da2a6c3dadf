//! Evidence retrieval with deterministic fallback.
//!
//! The retriever never fails: an index that could not be loaded, a search
//! error or an elapsed deadline all become a single
//! [`EvidenceDocument::RetrievalError`] that flows into the prompt like any
//! other passage.

use crate::types::{EvidenceDocument, RetrievalQuery};
use crate::vector_index::VectorIndex;
use pris_core::{AppError, AppResult, Deadline};
use std::collections::HashSet;
use std::sync::Arc;

/// Whether the index could be loaded at construction.
#[derive(Clone)]
pub enum RetrieverState {
    Available(Arc<dyn VectorIndex>),
    /// Permanent for the lifetime of the retriever.
    Unavailable(String),
}

/// Retrieves and renders evidence passages for questions.
#[derive(Clone)]
pub struct EvidenceRetriever {
    state: RetrieverState,
}

impl EvidenceRetriever {
    pub fn new(index: Arc<dyn VectorIndex>) -> Self {
        tracing::debug!("Evidence retriever using '{}' index", index.name());
        Self {
            state: RetrieverState::Available(index),
        }
    }

    /// A retriever that answers every query with the error marker.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!("Vector index unavailable, retrieval is degraded: {}", reason);
        Self {
            state: RetrieverState::Unavailable(reason),
        }
    }

    /// Build from the outcome of opening an index.
    pub fn from_result(result: AppResult<Arc<dyn VectorIndex>>) -> Self {
        match result {
            Ok(index) => Self::new(index),
            Err(e) => Self::unavailable(e.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, RetrieverState::Available(_))
    }

    pub fn state(&self) -> &RetrieverState {
        &self.state
    }

    /// Run one query. Never fails.
    pub async fn retrieve(&self, query: &RetrievalQuery, deadline: Deadline) -> Vec<EvidenceDocument> {
        let index = match &self.state {
            RetrieverState::Available(index) => index,
            RetrieverState::Unavailable(_) => {
                return vec![EvidenceDocument::error("Vector index could not be loaded.")];
            }
        };

        let filter = query.filter();
        let search = index.similarity_search(&query.query_text, query.top_k, filter.as_ref());

        let result = deadline
            .run(search, |limit| {
                AppError::RetrievalFailure(format!("search timed out after {:?}", limit))
            })
            .await;

        match result {
            Ok(hits) => {
                tracing::debug!(
                    country = ?query.country_filter,
                    hits = hits.len(),
                    "Retrieved evidence"
                );
                hits.iter().map(EvidenceDocument::from_hit).collect()
            }
            Err(e) => {
                if e.is_degradable() {
                    tracing::warn!("Document search failed: {}", e);
                } else {
                    tracing::error!("Document search failed unexpectedly: {}", e);
                }
                vec![EvidenceDocument::error(format!(
                    "Failed to search documents: {}",
                    e
                ))]
            }
        }
    }

    /// Retrieve independently for each question, then deduplicate.
    pub async fn retrieve_many(
        &self,
        questions: &[String],
        country: &str,
        deadline: Deadline,
    ) -> Vec<EvidenceDocument> {
        let mut collected = Vec::new();
        for question in questions {
            let query = RetrievalQuery::new(question.as_str(), country);
            collected.extend(self.retrieve(&query, deadline).await);
        }

        let before = collected.len();
        let deduped = dedup_evidence(collected);
        tracing::debug!("Evidence dedup: {} -> {} documents", before, deduped.len());
        deduped
    }
}

/// Remove documents whose rendered line was already seen. First occurrence wins.
pub fn dedup_evidence(documents: Vec<EvidenceDocument>) -> Vec<EvidenceDocument> {
    let mut seen = HashSet::new();
    documents
        .into_iter()
        .filter(|doc| seen.insert(doc.render()))
        .collect()
}

/// Join rendered documents with a blank line, as they appear in prompts.
pub fn render_evidence_block(documents: &[EvidenceDocument]) -> String {
    documents
        .iter()
        .map(EvidenceDocument::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}
