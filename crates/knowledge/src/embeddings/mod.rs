//! Query embedding for retrieval.
//!
//! Provides provider-agnostic embedding generation. The pipeline only ever
//! embeds one query at a time; vectors are transient and never persisted.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
