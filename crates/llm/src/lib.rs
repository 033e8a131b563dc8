//! LLM integration crate for the medrag answer pipeline.
//!
//! This crate provides a provider-agnostic abstraction for single-turn
//! text completion. Every refinement stage in the pipeline is one blocking
//! `complete` call; there is no streaming and no conversation state held by
//! the client.
//!
//! # Providers
//! - **Gemini**: hosted API (default)
//! - **Ollama**: local LLM runtime (keyless development path)
//!
//! # Example
//! ```no_run
//! use medrag_llm::{LlmClient, LlmRequest, providers::GeminiClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GeminiClient::new("api-key");
//! let request = LlmRequest::new("Hello, world!", "gemini-2.0-flash");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GeminiClient, OllamaClient};
