//! Knowledge retrieval for the medrag answer pipeline.
//!
//! Provides query embedding, similarity-ranked retrieval from a namespaced
//! vector index, and relevance filtering. Retrieval failures never escape
//! this crate: the Retriever collapses embedding and index errors into an
//! empty result with a logged diagnostic, which the orchestrator treats as
//! "unable to help".

pub mod embeddings;
pub mod filter;
pub mod memory_index;
pub mod pinecone;
pub mod retriever;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use embeddings::{create_provider, EmbeddingProvider};
pub use filter::filter_by_score;
pub use memory_index::InMemoryIndex;
pub use pinecone::PineconeIndex;
pub use retriever::Retriever;
pub use types::{IndexMatch, RetrievedPassage};
pub use vector_index::VectorIndex;
