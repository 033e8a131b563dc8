//! Bounded history window composition.
//!
//! Turns stored history into a budgeted view for prompt injection. Three
//! caps apply, in order: at most `limit` turns, each turn's text truncated
//! to `turn_max_chars`, and the total serialized size capped at
//! `char_budget`. When the full window does not fit the budget, older turns
//! are dropped first; the most recent turns are always retained.

use crate::types::ConversationTurn;

/// Budgets for one composed window.
#[derive(Debug, Clone)]
pub struct WindowBudget {
    /// Maximum number of turns
    pub limit: usize,

    /// Total serialized character budget
    pub char_budget: usize,

    /// Per-turn text truncation length
    pub turn_max_chars: usize,
}

impl Default for WindowBudget {
    fn default() -> Self {
        Self {
            limit: 8,
            char_budget: 1500,
            turn_max_chars: 400,
        }
    }
}

/// Compose a bounded window from turns ordered oldest-first.
///
/// Walks from the most recent turn backward, truncating each turn's text
/// and accumulating serialized size; stops before the budget would
/// overflow. The result is returned oldest-first.
pub fn compose_window(turns: &[ConversationTurn], budget: &WindowBudget) -> Vec<ConversationTurn> {
    let start = turns.len().saturating_sub(budget.limit);
    let candidates = &turns[start..];

    let mut kept: Vec<ConversationTurn> = Vec::new();
    let mut used = 0usize;

    for turn in candidates.iter().rev() {
        let text = truncate_chars(&turn.text, budget.turn_max_chars);
        let cost = serialized_len(turn, &text);

        if used + cost > budget.char_budget {
            // Budget exhausted; everything older is dropped too
            break;
        }

        used += cost;
        kept.push(ConversationTurn::new(turn.role, text, turn.timestamp));
    }

    kept.reverse();
    kept
}

/// Render a window for prompt injection, one role-prefixed line per turn.
///
/// This is the serialization the character budget measures.
pub fn render_window(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialized cost of one turn: role prefix, separator, text, newline.
fn serialized_len(turn: &ConversationTurn, text: &str) -> usize {
    turn.role.as_str().len() + 2 + text.chars().count() + 1
}

/// Truncate on a character boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
