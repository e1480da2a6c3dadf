//! Query embedding providers.
//!
//! The index stores vectors produced by one provider; queries must be
//! embedded with the same provider, model and dimensions.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{OllamaEmbeddingProvider, OpenAiEmbeddingProvider, TrigramProvider};
