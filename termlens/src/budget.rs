//! Content-length budgeting against model context limits.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Budget for models whose identifier contains `gpt-4.1`.
pub const GPT_41_MAX_CHARS: usize = 1_037_576;

/// Budget for models whose identifier contains `gpt-4o`.
pub const GPT_4O_MAX_CHARS: usize = 128_000;

/// Budget for every other model.
pub const DEFAULT_MAX_CHARS: usize = 64_000;

/// Appended to content cut at the budget.
pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated due to length...]";

/// Returns the character budget for a model identifier.
///
/// Rules are case-sensitive substring checks and the first match wins, so
/// `gpt-4.1-nano` and `gpt-4.1-mini` share the `gpt-4.1` budget.
#[must_use]
pub fn max_content_chars(model: &str) -> usize {
    if model.contains("gpt-4.1") {
        GPT_41_MAX_CHARS
    } else if model.contains("gpt-4o") {
        GPT_4O_MAX_CHARS
    } else {
        DEFAULT_MAX_CHARS
    }
}

/// Combined content after the budget was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetedContent {
    /// The content to send, including the marker when cut.
    pub content: String,
    /// Character count before budgeting.
    pub original_chars: usize,
    /// The budget that was applied.
    pub max_chars: usize,
    /// Whether the content was cut.
    pub truncated: bool,
}

/// Applies the budget for `model` to already-joined content.
#[must_use]
pub fn apply_budget(combined: String, model: &str) -> BudgetedContent {
    truncate_to(combined, max_content_chars(model))
}

/// Keeps the first `max_chars` characters and appends
/// [`TRUNCATION_MARKER`]. Content within budget is returned untouched.
#[must_use]
pub fn truncate_to(mut combined: String, max_chars: usize) -> BudgetedContent {
    let original_chars = combined.chars().count();
    if original_chars <= max_chars {
        return BudgetedContent {
            content: combined,
            original_chars,
            max_chars,
            truncated: false,
        };
    }

    let cut = combined
        .char_indices()
        .nth(max_chars)
        .map_or(combined.len(), |(index, _)| index);
    combined.truncate(cut);
    combined.push_str(TRUNCATION_MARKER);

    info!(original_chars, max_chars, "Content truncated to fit the model budget");
    BudgetedContent {
        content: combined,
        original_chars,
        max_chars,
        truncated: true,
    }
}
