//! History command handler.
//!
//! Inspects the conversation history store.

use clap::{Args, Subcommand};
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_history::HistoryStore;

/// Inspect the conversation history store
#[derive(Args, Debug)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub action: HistoryAction,
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Show recent turns for one conversation
    Show(HistoryShowCommand),
    /// Show aggregate store statistics
    Stats(HistoryStatsCommand),
}

/// Show recent turns for one conversation
#[derive(Args, Debug)]
pub struct HistoryShowCommand {
    /// User identifier
    pub user: String,

    /// Channel identifier
    pub channel: String,

    /// Maximum turns to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show aggregate store statistics
#[derive(Args, Debug)]
pub struct HistoryStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HistoryCommand {
    /// Execute the history command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let store = HistoryStore::open(&config.history.path)?;

        match &self.action {
            HistoryAction::Show(cmd) => cmd.execute(&store),
            HistoryAction::Stats(cmd) => cmd.execute(&store),
        }
    }
}

impl HistoryShowCommand {
    fn execute(&self, store: &HistoryStore) -> AppResult<()> {
        let turns = store.query_recent(&self.user, &self.channel, self.limit)?;

        if self.json {
            let json = serde_json::to_string_pretty(&turns)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else if turns.is_empty() {
            println!("No turns for {} on {}", self.user, self.channel);
        } else {
            for turn in turns {
                println!(
                    "[{}] {}: {}",
                    turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    turn.role.as_str(),
                    turn.text
                );
            }
        }

        Ok(())
    }
}

impl HistoryStatsCommand {
    fn execute(&self, store: &HistoryStore) -> AppResult<()> {
        let stats = store.stats()?;

        if self.json {
            let output = serde_json::json!({
                "turns": stats.turns,
                "conversations": stats.conversations,
            });
            println!("{}", serde_json::to_string_pretty(&output).unwrap());
        } else {
            println!("{} turns across {} conversations", stats.turns, stats.conversations);
        }

        Ok(())
    }
}
