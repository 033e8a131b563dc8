//! Similarity-ranked retrieval.
//!
//! The Retriever embeds a query and fetches the nearest passages from the
//! vector index. It never raises: an embedding failure, an index failure,
//! and an empty result all collapse to an empty passage list with a logged
//! diagnostic, which the orchestrator treats uniformly as "unable to help".

use crate::embeddings::EmbeddingProvider;
use crate::types::RetrievedPassage;
use crate::vector_index::VectorIndex;
use std::sync::Arc;

/// Retrieves ranked candidate passages for a query.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a retriever over an embedder and a vector index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve the top-k passages for a query within a namespace.
    ///
    /// Passages are returned in the index's rank order. Matches whose
    /// metadata carries no extractable `"text"` string are silently
    /// dropped.
    pub async fn retrieve(&self, query: &str, k: usize, namespace: &str) -> Vec<RetrievedPassage> {
        let vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                tracing::error!("Query embedding failed: {}", e);
                return Vec::new();
            }
        };

        let matches = match self.index.query(&vector, k, namespace).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::error!("Vector index query failed: {}", e);
                return Vec::new();
            }
        };

        matches
            .into_iter()
            .filter_map(|m| {
                m.metadata
                    .get("text")
                    .and_then(|t| t.as_str())
                    .map(|text| RetrievedPassage::new(text, m.score))
            })
            .collect()
    }
}
