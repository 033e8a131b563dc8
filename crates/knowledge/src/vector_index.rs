//! Vector index abstraction.
//!
//! Defines a trait for provider-agnostic similarity search over a
//! namespaced index.

use crate::types::IndexMatch;
use medrag_core::AppResult;

/// Trait for vector index backends.
///
/// A namespace is a logical partition of the index selecting which
/// knowledge base to search; the empty string selects the index's default
/// partition.
#[async_trait::async_trait]
pub trait VectorIndex: Send + Sync {
    /// Query the index for the top-k nearest neighbors of `vector` within
    /// `namespace`.
    ///
    /// Returns matches in rank order (most similar first). Index-level
    /// failures (timeout, auth, not-found) surface as `AppError::Index`.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        namespace: &str,
    ) -> AppResult<Vec<IndexMatch>>;
}
