//! Batch command handler.
//!
//! Drives a file of newline-delimited questions through the bounded
//! worker pool. Questions run concurrently up to the configured worker
//! bound; output order follows completion order.

use crate::commands::build_orchestrator;
use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_pipeline::{AnswerRequest, AnswerService};
use std::path::PathBuf;
use std::sync::Arc;

/// Answer a file of questions through the bounded worker pool
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// File with one question per line
    pub file: PathBuf,

    /// Knowledge namespace to search
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Output as JSON lines
    #[arg(long)]
    pub json: bool,
}

impl BatchCommand {
    /// Execute the batch command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing batch command on {:?}", self.file);

        let contents = std::fs::read_to_string(&self.file)
            .map_err(|e| AppError::Config(format!("Failed to read {:?}: {}", self.file, e)))?;

        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| config.resolve_namespace(None));

        let requests: Vec<AnswerRequest> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| AnswerRequest::new(line, namespace.clone()))
            .collect();

        if requests.is_empty() {
            return Err(AppError::Config(format!(
                "No questions found in {:?}",
                self.file
            )));
        }

        tracing::info!(
            "Answering {} questions with {} workers",
            requests.len(),
            config.pipeline.max_workers
        );

        let orchestrator = Arc::new(build_orchestrator(config, false)?);
        let service = AnswerService::new(orchestrator, config.pipeline.max_workers);

        let results = service.answer_all(requests).await;

        for (request, result) in results {
            if self.json {
                let line = serde_json::json!({
                    "question": request.question,
                    "answer": result.text,
                    "sourceCount": result.passages.len(),
                });
                println!("{}", line);
            } else {
                println!("Q: {}", request.question);
                println!("A: {}", result.text);
                println!();
            }
        }

        Ok(())
    }
}
