//! Token counting capability.

/// Heuristic bytes-per-token ratio used by [`CharEstimateCounter`].
pub const CHARS_PER_TOKEN: usize = 4;

/// Counts tokens in a piece of text.
///
/// Counts are only ever compared against thresholds, so implementations are
/// free to trade accuracy for speed as long as they are deterministic.
pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, text: &str) -> usize;
}

/// Cheap estimator: `bytes / CHARS_PER_TOKEN`, at least 1 for non-empty text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharEstimateCounter;

impl TokenCounter for CharEstimateCounter {
    fn count_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        (text.len() / CHARS_PER_TOKEN).max(1)
    }
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize + Send + Sync,
{
    fn count_tokens(&self, text: &str) -> usize {
        self(text)
    }
}
