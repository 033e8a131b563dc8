//! Pipeline state and the insufficiency sentinel.

/// Fixed string the refinement chain emits when the context does not
/// support an answer. Downstream stages must preserve it rather than
/// overwrite it; the Format stage converts it into the fixed apology.
pub const SENTINEL: &str = "Not enough information";

/// State carried through the refinement stages.
///
/// Owned by exactly one pipeline run; each stage reads the previous
/// stage's output from `draft` and replaces it.
#[derive(Debug, Clone)]
pub struct PipelineState {
    /// Working-language question (history-composed when conversational)
    pub question: String,

    /// Composed context from the filtered passages
    pub context: String,

    /// Output of the most recent stage
    pub draft: String,
}

impl PipelineState {
    /// Start a run with a question and its composed context.
    pub fn new(question: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            context: context.into(),
            draft: String::new(),
        }
    }

    /// Whether the current draft is the insufficiency sentinel.
    pub fn is_sentinel(&self) -> bool {
        is_sentinel(&self.draft)
    }
}

/// Sentinel predicate, checked between stages.
///
/// Tolerates surrounding whitespace, case drift, and trailing punctuation —
/// models told to emit the sentinel verbatim still occasionally append a
/// period.
pub fn is_sentinel(text: &str) -> bool {
    text.trim()
        .trim_end_matches(['.', '!'])
        .trim_end()
        .eq_ignore_ascii_case(SENTINEL)
}
