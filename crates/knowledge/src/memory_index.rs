//! In-memory vector index.
//!
//! Cosine-similarity index over namespaced entries, used by tests and
//! local runs without a hosted index.

use crate::types::IndexMatch;
use crate::vector_index::VectorIndex;
use medrag_core::AppResult;
use std::collections::HashMap;
use std::sync::RwLock;

struct Entry {
    vector: Vec<f32>,
    metadata: serde_json::Value,
}

/// In-process vector index keyed by namespace.
#[derive(Default)]
pub struct InMemoryIndex {
    namespaces: RwLock<HashMap<String, Vec<Entry>>>,
}

impl InMemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry into a namespace.
    pub fn insert(&self, namespace: &str, vector: Vec<f32>, metadata: serde_json::Value) {
        let mut namespaces = self.namespaces.write().unwrap();
        namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(Entry { vector, metadata });
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait::async_trait]
impl VectorIndex for InMemoryIndex {
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> AppResult<Vec<IndexMatch>> {
        let namespaces = self.namespaces.read().unwrap();
        let entries = match namespaces.get(namespace) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let mut scored: Vec<IndexMatch> = entries
            .iter()
            .map(|entry| IndexMatch {
                score: cosine_similarity(vector, &entry.vector),
                metadata: entry.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored)
    }
}
