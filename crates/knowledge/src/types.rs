//! Retrieval types.

use serde::{Deserialize, Serialize};

/// A raw match returned by a vector index query.
///
/// Carries the similarity score and whatever metadata the index stored with
/// the vector. The Retriever extracts passage text from the metadata and
/// silently drops matches without any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMatch {
    /// Similarity score in index units (not guaranteed probability-normalized)
    pub score: f32,

    /// Metadata stored alongside the vector
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// A unit of retrieved knowledge: passage text plus its similarity score.
///
/// Ordering from the index is rank order and is preserved downstream; the
/// relevance filter never re-sorts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Passage text extracted from the match metadata
    pub text: String,

    /// Similarity score from the index
    pub score: f32,
}

impl RetrievedPassage {
    /// Create a new passage.
    pub fn new(text: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            score,
        }
    }
}
