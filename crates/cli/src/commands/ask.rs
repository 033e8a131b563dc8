//! Ask command handler.
//!
//! Runs one question through the full answer pipeline and prints the
//! result.

use crate::commands::build_orchestrator;
use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_pipeline::{AnswerRequest, ConversationKey};
use std::path::PathBuf;

/// Answer one question through the full pipeline
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Knowledge namespace to search (overrides namespace resolution)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Channel identifier (namespace resolution and history key)
    #[arg(long)]
    pub channel: Option<String>,

    /// User identifier (history key; requires --channel)
    #[arg(long)]
    pub user: Option<String>,

    /// Show supporting passages on stderr
    #[arg(long)]
    pub sources: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let question = self
            .get_question()
            .ok_or_else(|| AppError::Config("No question provided".to_string()))?;

        let conversational = self.user.is_some() && self.channel.is_some();
        let orchestrator = build_orchestrator(config, conversational)?;

        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| config.resolve_namespace(self.channel.as_deref()));

        let mut request = AnswerRequest::new(question, namespace);
        if let (Some(user), Some(channel)) = (&self.user, &self.channel) {
            request = request.with_conversation(ConversationKey::new(user, channel));
        }

        let result = orchestrator.answer(&request).await;

        if self.json {
            let output = serde_json::json!({
                "answer": result.text,
                "namespace": request.namespace,
                "sources": result.passages.iter().map(|p| {
                    serde_json::json!({ "text": p.text, "score": p.score })
                }).collect::<Vec<_>>(),
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", result.text);

            if self.sources {
                for (i, passage) in result.passages.iter().enumerate() {
                    eprintln!("[{}] (score {:.3}) {}", i + 1, passage.score, passage.text);
                }
            }
        }

        Ok(())
    }

    /// Get the question text from the positional argument or a file.
    fn get_question(&self) -> Option<String> {
        self.question.clone().or_else(|| {
            self.file.as_ref().and_then(|path| {
                std::fs::read_to_string(path)
                    .map_err(|e| tracing::error!("Failed to read question file: {}", e))
                    .ok()
                    .map(|s| s.trim().to_string())
            })
        })
    }
}
