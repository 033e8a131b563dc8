//! Relevance filtering.
//!
//! Drops retrieved passages scoring below the configured similarity
//! threshold. Input order (the index's rank order) is preserved; nothing is
//! re-sorted. An empty result is the "insufficient knowledge" condition the
//! orchestrator short-circuits on.

use crate::types::RetrievedPassage;

/// Keep passages with score >= threshold, preserving input order.
pub fn filter_by_score(
    passages: Vec<RetrievedPassage>,
    threshold: f32,
) -> Vec<RetrievedPassage> {
    let before = passages.len();
    let filtered: Vec<RetrievedPassage> = passages
        .into_iter()
        .filter(|p| p.score >= threshold)
        .collect();

    if filtered.is_empty() && before > 0 {
        tracing::info!(
            "No relevant passages ({} candidates all below {:.2} threshold)",
            before,
            threshold
        );
    } else {
        tracing::debug!(
            "Relevance filter kept {}/{} passages at threshold {:.2}",
            filtered.len(),
            before,
            threshold
        );
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_keeps_above_threshold() {
        let passages = vec![
            RetrievedPassage::new("O negative is the universal donor type.", 0.8),
            RetrievedPassage::new("Donation centers open at nine.", 0.3),
        ];

        let filtered = filter_by_score(passages, 0.4);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].score, 0.8);
    }

    #[test]
    fn test_filter_keeps_exact_threshold() {
        let passages = vec![RetrievedPassage::new("boundary", 0.4)];
        let filtered = filter_by_score(passages, 0.4);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_preserves_order_without_sorting() {
        // Index rank order may not be score-sorted; the filter must not fix it
        let passages = vec![
            RetrievedPassage::new("a", 0.5),
            RetrievedPassage::new("b", 0.9),
            RetrievedPassage::new("c", 0.6),
        ];

        let filtered = filter_by_score(passages, 0.4);

        let texts: Vec<&str> = filtered.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_filter_all_below_threshold_is_empty() {
        let passages = vec![
            RetrievedPassage::new("a", 0.1),
            RetrievedPassage::new("b", 0.2),
        ];

        let filtered = filter_by_score(passages, 0.57);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_filter_empty_input() {
        let filtered = filter_by_score(Vec::new(), 0.4);
        assert!(filtered.is_empty());
    }
}
