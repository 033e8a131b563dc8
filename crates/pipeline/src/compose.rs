//! Context composition.
//!
//! Joins filtered passage texts into the single context blob the
//! refinement stages read. Deterministic, order-preserving concatenation:
//! no deduplication, no re-ranking.

use medrag_knowledge::RetrievedPassage;

/// Join passage texts with a blank-line separator, in input order.
pub fn compose_context(passages: &[RetrievedPassage]) -> String {
    passages
        .iter()
        .map(|p| p.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
