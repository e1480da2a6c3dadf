//! Vector index abstraction.
//!
//! Defines the search capability the retriever depends on, independent of
//! the storage backend and of how query text is embedded.

use crate::types::{MetadataFilter, SearchHit};
use pris_core::AppResult;

/// Trait for vector index backends.
///
/// Implementations must:
/// - Embed `query_text` themselves
/// - Apply `filter` as exact metadata equality before ranking
/// - Return at most `k` hits ordered by descending similarity
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search for the `k` passages most similar to `query_text`.
    ///
    /// Failures are reported as `AppError::RetrievalFailure`.
    async fn similarity_search(
        &self,
        query_text: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<SearchHit>>;
}
