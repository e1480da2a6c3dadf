//! Evidence retrieval for the PRIS engine.
//!
//! Searches a pre-built passage index (SQLite + embeddings) with an optional
//! country filter and turns the hits into rendered evidence lines. Index
//! failures degrade to an error marker instead of aborting synthesis.

pub mod embeddings;
pub mod index;
pub mod retriever;
pub mod types;
pub mod vector_index;


// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use index::SqliteVectorIndex;
pub use retriever::{dedup_evidence, render_evidence_block, EvidenceRetriever, RetrieverState};
pub use types::{
    DocumentMetadata, EvidenceDocument, MetadataFilter, RetrievalQuery, SearchHit, CNPP_SOURCE,
    DEFAULT_TOP_K,
};
pub use vector_index::VectorIndex;

use pris_core::config::EmbeddingSettings;
use pris_core::AppResult;
use std::path::Path;
use std::sync::Arc;

/// Open the passage index at `index_path` with a query embedder built from `settings`.
///
/// Callers usually hand the result to [`EvidenceRetriever::from_result`] so
/// that a missing index degrades retrieval instead of failing startup.
pub fn open_index(
    index_path: &Path,
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn VectorIndex>> {
    let embedder = create_provider(settings, api_key)?;
    let index = SqliteVectorIndex::open(index_path, embedder)?;

    tracing::info!(
        "Opened passage index {:?} ({} documents)",
        index_path,
        index.document_count()?
    );

    Ok(Arc::new(index))
}
