//! Pipeline output types and fixed fallback messages.

use medrag_knowledge::RetrievedPassage;
use serde::{Deserialize, Serialize};

/// Returned when retrieval comes back empty (embedding failure, index
/// failure, or nothing found — all collapse to "unable to help").
pub const KNOWLEDGE_BASE_UNREACHABLE: &str =
    "Sorry, I couldn't reach the knowledge base right now.";

/// Returned when every retrieved passage scored below the threshold.
pub const NO_RELEVANT_INFORMATION: &str =
    "No relevant information found in the knowledge base.";

/// Returned when any refinement stage fails; partial drafts are discarded.
pub const GENERATION_FAILED: &str = "Sorry, something went wrong. Please try again.";

/// The user-facing conversion of the sentinel: apologetic, information-free,
/// and without requesting more detail.
pub const INSUFFICIENT_APOLOGY: &str =
    "I'm sorry, but I don't have enough information to answer that.";

/// The externally visible output of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Final user-facing answer text
    pub text: String,

    /// Passages the answer was grounded on, in retrieval order.
    /// Empty for every fallback and for insufficient-knowledge answers.
    pub passages: Vec<RetrievedPassage>,
}

impl AnswerResult {
    /// A grounded answer with its supporting passages.
    pub fn new(text: impl Into<String>, passages: Vec<RetrievedPassage>) -> Self {
        Self {
            text: text.into(),
            passages,
        }
    }

    /// Retrieval unavailable or empty.
    pub fn knowledge_base_unreachable() -> Self {
        Self::new(KNOWLEDGE_BASE_UNREACHABLE, Vec::new())
    }

    /// Everything retrieved fell below the relevance threshold.
    pub fn no_relevant_information() -> Self {
        Self::new(NO_RELEVANT_INFORMATION, Vec::new())
    }

    /// A refinement stage failed.
    pub fn generation_failed() -> Self {
        Self::new(GENERATION_FAILED, Vec::new())
    }

    /// The refinement chain declared the context insufficient.
    pub fn insufficient_information() -> Self {
        Self::new(INSUFFICIENT_APOLOGY, Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_results_have_no_passages() {
        assert!(AnswerResult::knowledge_base_unreachable().passages.is_empty());
        assert!(AnswerResult::no_relevant_information().passages.is_empty());
        assert!(AnswerResult::generation_failed().passages.is_empty());
        assert!(AnswerResult::insufficient_information().passages.is_empty());
    }
}
