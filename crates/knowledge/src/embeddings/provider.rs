//! Embedding provider trait and factory.

use super::providers::{OllamaEmbeddingProvider, OpenAiEmbeddingProvider, TrigramProvider};
use pris_core::config::EmbeddingSettings;
use pris_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "openai", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Knowledge("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from settings.
///
/// `api_key` is only consulted by the `openai` provider.
pub fn create_provider(
    settings: &EmbeddingSettings,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    if settings.dimensions == 0 {
        return Err(AppError::Config(
            "Embedding dimensions must be greater than zero".to_string(),
        ));
    }

    tracing::debug!(
        "Creating embedding provider: provider={}, model={}, dimensions={}",
        settings.provider,
        settings.model,
        settings.dimensions
    );

    match settings.provider.as_str() {
        "trigram" => Ok(Arc::new(TrigramProvider::new(settings.dimensions))),

        "ollama" => Ok(Arc::new(OllamaEmbeddingProvider::new(
            settings.endpoint.as_deref(),
            &settings.model,
            settings.dimensions,
        )?)),

        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config(
                    "OpenAI embeddings require an API key (set PRIS_API_KEY or OPENAI_API_KEY)"
                        .to_string(),
                )
            })?;
            Ok(Arc::new(OpenAiEmbeddingProvider::new(
                settings.endpoint.as_deref(),
                key,
                &settings.model,
                settings.dimensions,
            )))
        }

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama, openai",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider(&EmbeddingSettings::default(), None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_unknown_provider() {
        let settings = EmbeddingSettings {
            provider: "gguf".to_string(),
            ..Default::default()
        };

        let result = create_provider(&settings, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[test]
    fn test_openai_requires_key() {
        let settings = EmbeddingSettings {
            provider: "openai".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            endpoint: None,
        };

        assert!(matches!(
            create_provider(&settings, None),
            Err(AppError::Config(_))
        ));
        let provider = create_provider(&settings, Some("sk-test")).unwrap();
        assert_eq!(provider.provider_name(), "openai");
        assert_eq!(provider.dimensions(), 1536);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let settings = EmbeddingSettings {
            dimensions: 0,
            ..Default::default()
        };
        assert!(create_provider(&settings, None).is_err());
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&EmbeddingSettings::default(), None).unwrap();
        let embedding = provider.embed("Barakah unit 4").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
