//! Mock embedding provider with deterministic content-derived vectors.

use crate::embeddings::provider::EmbeddingProvider;
use medrag_core::AppResult;

/// Mock provider for tests and local runs.
///
/// Hashes each word of the input into a handful of dimensions and
/// normalizes the result. Not semantically meaningful, but deterministic
/// and content-dependent: identical texts embed identically, different
/// texts almost always differ.
#[derive(Debug)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    /// Create a new mock provider with the given dimensionality.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash_embedding(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        for word in text.to_lowercase().split_whitespace() {
            let hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            // Spread each word across three dimensions so short texts
            // still produce distinguishable vectors
            for salt in 0..3u64 {
                let idx = (hash.wrapping_add(salt.wrapping_mul(0x9e3779b9)) as usize)
                    % self.dimensions;
                embedding[idx] += 1.0;
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "word-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        Ok(self.hash_embedding(text))
    }
}
