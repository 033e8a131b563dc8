//! Command handlers for the medrag CLI.
//!
//! This module organizes all CLI commands into separate submodules and
//! holds the shared capability wiring: every command that runs the
//! pipeline builds its collaborators (embedder, index, LLM client, prompt
//! set, history store) once here and passes them in by reference.

pub mod ask;
pub mod batch;
pub mod history;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use batch::BatchCommand;
pub use history::HistoryCommand;

use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_history::{HistoryStore, WindowBudget};
use medrag_knowledge::{create_provider, PineconeIndex, Retriever};
use medrag_pipeline::{Orchestrator, RefinementPipeline};
use medrag_prompt::PromptSet;
use std::sync::Arc;

/// Build the orchestrator from configuration.
///
/// Capability objects are constructed once per invocation and handed to
/// the orchestrator; nothing holds hidden global state.
pub fn build_orchestrator(config: &AppConfig, with_history: bool) -> AppResult<Orchestrator> {
    config.validate()?;

    // Query embedder
    let gemini_key = config.resolve_api_key("gemini");
    let embedder = create_provider(&config.embedding, gemini_key.as_deref())?;

    // Vector index
    let host = config.retrieval.index_host.as_deref().ok_or_else(|| {
        AppError::Config(
            "No vector index host configured. Set PINECONE_INDEX_HOST or retrieval.indexHost."
                .to_string(),
        )
    })?;
    let index_key = config.resolve_index_api_key().ok_or_else(|| {
        AppError::Config("No index API key found. Set PINECONE_API_KEY.".to_string())
    })?;
    let index = Arc::new(PineconeIndex::new(host, index_key));

    let retriever = Retriever::new(embedder, index);

    // Language model
    let api_key = config.resolve_api_key(&config.provider);
    let llm = medrag_llm::create_client(&config.provider, None, api_key.as_deref())?;

    // Stage prompts, with per-deployment overrides when configured
    let prompts = match &config.pipeline.prompt_dir {
        Some(dir) => PromptSet::with_overrides(dir)?,
        None => PromptSet::builtin()?,
    };

    let refinery = RefinementPipeline::new(
        llm,
        prompts,
        &config.model,
        &config.pipeline.working_language,
        config.pipeline.normalize_language,
    );

    let orchestrator = Orchestrator::new(
        retriever,
        refinery,
        config.retrieval.top_k as usize,
        config.retrieval.threshold,
    );

    if with_history {
        let store = Arc::new(HistoryStore::open(&config.history.path)?);
        let budget = WindowBudget {
            limit: config.history.window_limit,
            char_budget: config.history.char_budget,
            turn_max_chars: config.history.turn_max_chars,
        };
        Ok(orchestrator.with_history(store, budget))
    } else {
        Ok(orchestrator)
    }
}
