//! SQLite-backed conversation log.
//!
//! An append-only log of turns keyed by (user_key, channel_key) with a
//! bounded-read API. Writers within one process are serialized by a mutex
//! around the connection; appends from a concurrent request are not
//! guaranteed visible to an in-flight read for the same user. That eventual
//! consistency is an accepted tradeoff: a read that misses a just-appended
//! turn only shortens the composed window by one turn.

use crate::types::{ConversationTurn, Role};
use chrono::{DateTime, Utc};
use medrag_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Aggregate counts over the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Total stored turns
    pub turns: u64,

    /// Distinct (user, channel) conversation keys
    pub conversations: u64,
}

/// Durable conversation log.
pub struct HistoryStore {
    conn: Mutex<Connection>,
}

impl HistoryStore {
    /// Open (or create) the log at the given path.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    AppError::History(format!("Failed to create history directory: {}", e))
                })?;
            }
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::History(format!("Failed to open history store: {}", e)))?;

        Self::init_schema(&conn)?;

        tracing::debug!("Opened history store at {:?}", db_path);
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory log (tests and ephemeral runs).
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::History(format!("Failed to open history store: {}", e)))?;

        Self::init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> AppResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_key TEXT NOT NULL,
                channel_key TEXT NOT NULL,
                role TEXT NOT NULL,
                text TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_turns_conversation
                ON turns(user_key, channel_key, id);
            "#,
        )
        .map_err(|e| AppError::History(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    /// Append a question/answer exchange for a conversation key.
    ///
    /// Writes one user turn and one assistant turn sharing the timestamp.
    pub fn append(
        &self,
        user_key: &str,
        channel_key: &str,
        question: &str,
        answer: &str,
        timestamp: DateTime<Utc>,
    ) -> AppResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::History("History store lock poisoned".to_string()))?;

        let created_at = timestamp.to_rfc3339();

        conn.execute(
            "INSERT INTO turns (user_key, channel_key, role, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_key, channel_key, Role::User.as_str(), question, created_at],
        )
        .map_err(|e| AppError::History(format!("Failed to append user turn: {}", e)))?;

        conn.execute(
            "INSERT INTO turns (user_key, channel_key, role, text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user_key,
                channel_key,
                Role::Assistant.as_str(),
                answer,
                created_at
            ],
        )
        .map_err(|e| AppError::History(format!("Failed to append assistant turn: {}", e)))?;

        Ok(())
    }

    /// Read the most recent turns for a conversation key, oldest first.
    pub fn query_recent(
        &self,
        user_key: &str,
        channel_key: &str,
        limit: usize,
    ) -> AppResult<Vec<ConversationTurn>> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::History("History store lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT role, text, created_at FROM turns
                 WHERE user_key = ?1 AND channel_key = ?2
                 ORDER BY id DESC LIMIT ?3",
            )
            .map_err(|e| AppError::History(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map(params![user_key, channel_key, limit as i64], |row| {
                let role: String = row.get(0)?;
                let text: String = row.get(1)?;
                let created_at: String = row.get(2)?;
                Ok((role, text, created_at))
            })
            .map_err(|e| AppError::History(format!("Failed to query turns: {}", e)))?;

        let mut turns = Vec::new();
        for row in rows {
            let (role, text, created_at) =
                row.map_err(|e| AppError::History(format!("Failed to read turn: {}", e)))?;

            let role = Role::parse(&role)
                .ok_or_else(|| AppError::History(format!("Unknown role in store: {}", role)))?;
            let timestamp = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| AppError::History(format!("Bad timestamp in store: {}", e)))?
                .with_timezone(&Utc);

            turns.push(ConversationTurn::new(role, text, timestamp));
        }

        // Rows came newest-first; callers want oldest-first
        turns.reverse();
        Ok(turns)
    }

    /// Aggregate counts for operational inspection.
    pub fn stats(&self) -> AppResult<StoreStats> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| AppError::History("History store lock poisoned".to_string()))?;

        let turns: u64 = conn
            .query_row("SELECT COUNT(*) FROM turns", [], |row| row.get(0))
            .map_err(|e| AppError::History(format!("Failed to count turns: {}", e)))?;

        let conversations: u64 = conn
            .query_row(
                "SELECT COUNT(DISTINCT user_key || ':' || channel_key) FROM turns",
                [],
                |row| row.get(0),
            )
            .map_err(|e| AppError::History(format!("Failed to count conversations: {}", e)))?;

        Ok(StoreStats {
            turns,
            conversations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_append_and_query_round_trip() {
        let store = HistoryStore::open_in_memory().unwrap();
        store
            .append("user-1", "channel-1", "What is O negative?", "A blood type.", now())
            .unwrap();

        let turns = store.query_recent("user-1", "channel-1", 10).unwrap();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].text, "What is O negative?");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].text, "A blood type.");
    }

    #[test]
    fn test_query_recent_keeps_most_recent_oldest_first() {
        let store = HistoryStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .append(
                    "user-1",
                    "channel-1",
                    &format!("question {}", i),
                    &format!("answer {}", i),
                    now(),
                )
                .unwrap();
        }

        // 10 turns stored; ask for the 4 most recent
        let turns = store.query_recent("user-1", "channel-1", 4).unwrap();

        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].text, "question 3");
        assert_eq!(turns[1].text, "answer 3");
        assert_eq!(turns[2].text, "question 4");
        assert_eq!(turns[3].text, "answer 4");
    }

    #[test]
    fn test_conversations_are_keyed_exactly() {
        let store = HistoryStore::open_in_memory().unwrap();
        store
            .append("user-1", "channel-1", "q1", "a1", now())
            .unwrap();
        store
            .append("user-1", "channel-2", "q2", "a2", now())
            .unwrap();
        store
            .append("user-2", "channel-1", "q3", "a3", now())
            .unwrap();

        let turns = store.query_recent("user-1", "channel-1", 10).unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].text, "q1");
    }

    #[test]
    fn test_query_unknown_key_is_empty() {
        let store = HistoryStore::open_in_memory().unwrap();
        let turns = store.query_recent("nobody", "nowhere", 10).unwrap();
        assert!(turns.is_empty());
    }

    #[test]
    fn test_stats() {
        let store = HistoryStore::open_in_memory().unwrap();
        store
            .append("user-1", "channel-1", "q", "a", now())
            .unwrap();
        store
            .append("user-2", "channel-1", "q", "a", now())
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.turns, 4);
        assert_eq!(stats.conversations, 2);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        {
            let store = HistoryStore::open(&path).unwrap();
            store
                .append("user-1", "channel-1", "q", "a", now())
                .unwrap();
        }

        // Reopen and confirm durability
        let store = HistoryStore::open(&path).unwrap();
        let turns = store.query_recent("user-1", "channel-1", 10).unwrap();
        assert_eq!(turns.len(), 2);
    }
}
