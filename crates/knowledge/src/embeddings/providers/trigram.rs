//! Deterministic local embeddings from character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use pris_core::AppResult;
use std::collections::BTreeMap;

const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "how", "does",
];

/// Offline embedding provider.
///
/// Each significant word contributes its hashed trigrams (weighted by the
/// square root of its frequency) and its whole-word hash (weighted by
/// frequency); the result is L2-normalized. Not semantic, but stable across
/// runs, which is what fixture indexes and offline use need.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        // Sorted so float accumulation order depends only on the text
        let mut frequencies: BTreeMap<&str, u32> = BTreeMap::new();
        for word in lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
        {
            *frequencies.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &frequencies {
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let bucket = self.bucket(window.iter().collect::<String>().as_bytes(), 37);
                vector[bucket] += (*freq as f32).sqrt();
            }

            let bucket = self.bucket(word.as_bytes(), 31);
            vector[bucket] += *freq as f32;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }

        vector
    }

    fn bucket(&self, bytes: &[u8], multiplier: u64) -> usize {
        let hash = bytes
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_mul(multiplier).wrapping_add(b as u64));
        (hash % self.dimensions as u64) as usize
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vectorize(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_embedding_is_unit_length() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("pressurized heavy water reactor").await.unwrap();

        assert_eq!(embedding.len(), 384);
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_deterministic() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("Hualong One deployment").await.unwrap();
        let b = provider.embed("Hualong One deployment").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_word_order_does_not_change_bits() {
        let provider = TrigramProvider::new(16);
        let a = provider
            .embed("barakah enec fanr korea apr1400 emirates safety workforce barakah")
            .await
            .unwrap();
        let b = provider
            .embed("workforce safety emirates apr1400 korea fanr enec barakah barakah")
            .await
            .unwrap();

        let bits = |v: &[f32]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a), bits(&b));
    }

    #[tokio::test]
    async fn test_stop_words_only_yields_zero_vector() {
        let provider = TrigramProvider::new(64);
        let embedding = provider.embed("the and of it").await.unwrap();
        assert!(embedding.iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_related_text_scores_higher() {
        let provider = TrigramProvider::new(384);
        let texts = vec![
            "CANDU reactor refurbishment in Ontario".to_string(),
            "Refurbishment of CANDU units".to_string(),
            "Desalination plant financing".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings.len(), 3);
        assert!(cosine(&embeddings[0], &embeddings[1]) > cosine(&embeddings[0], &embeddings[2]));
    }
}
