//! User-facing text for failed and partially failed batches.

use crate::fetch::host_of;

use super::models::SkippedDocument;

/// Headline shown when every selected document failed.
pub const AGGREGATE_FAILURE_HEADLINE: &str =
    "All content extraction attempts failed. This usually happens when websites block automated access.";

/// Shown when the user starts a summary with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one terms document to summarize.";

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Lists every failed document with its reason.
#[must_use]
pub fn aggregate_failure_detail(failures: &[SkippedDocument]) -> String {
    let mut detail = String::from("Failed to extract content from all selected terms documents:\n\n");
    for (index, failure) in failures.iter().enumerate() {
        detail.push_str(&format!("{}. {}: {}\n", index + 1, failure.title, failure.reason));
    }
    detail.push_str("\nPlease try different terms documents or visit the pages directly.");
    detail
}

/// Note appended to a summary built from a subset of the selection.
#[must_use]
pub fn partial_note(skipped: &[SkippedDocument], succeeded: usize) -> String {
    let lines: Vec<String> = skipped
        .iter()
        .map(|s| format!("• {}: {}", s.title, s.reason))
        .collect();
    format!(
        "\n\n---\n\n**Note:** {} document{} could not be processed:\n{}\n\nThis summary is based on {} successfully extracted document{}.",
        skipped.len(),
        plural(skipped.len()),
        lines.join("\n"),
        succeeded,
        plural(succeeded),
    )
}

/// Message for a page that yielded too little text.
#[must_use]
pub fn unreadable_content_message(url: &str) -> String {
    format!(
        "Could not extract readable content from {}. The page may require JavaScript or have an unusual format.",
        host_of(url)
    )
}

/// Message for any other extraction failure.
#[must_use]
pub fn processing_error_message(url: &str, detail: &str) -> String {
    format!("Error processing content from {}: {detail}", host_of(url))
}

/// Message for a failed summarization call.
#[must_use]
pub fn summarization_error_message(detail: &str) -> String {
    format!("Error during summarization: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_partial_note_single() {
        let note = partial_note(&[SkippedDocument::new("Privacy Policy", "Could not connect to x.com.")], 1);
        assert_eq!(
            note,
            "\n\n---\n\n**Note:** 1 document could not be processed:\n\
             • Privacy Policy: Could not connect to x.com.\n\n\
             This summary is based on 1 successfully extracted document."
        );
    }

    #[test]
    fn test_partial_note_plural() {
        let skipped = [SkippedDocument::new("A", "r1"), SkippedDocument::new("B", "r2")];
        let note = partial_note(&skipped, 3);
        assert!(note.contains("**Note:** 2 documents could not be processed:\n• A: r1\n• B: r2"));
        assert!(note.ends_with("based on 3 successfully extracted documents."));
    }

    #[test]
    fn test_aggregate_detail() {
        let detail = aggregate_failure_detail(&[
            SkippedDocument::new("Terms", "not found"),
            SkippedDocument::new("Privacy", "blocked"),
        ]);
        assert_eq!(
            detail,
            "Failed to extract content from all selected terms documents:\n\n\
             1. Terms: not found\n2. Privacy: blocked\n\n\
             Please try different terms documents or visit the pages directly."
        );
    }

    #[test]
    fn test_extraction_messages_use_host() {
        assert!(unreadable_content_message("https://legal.example.com/terms")
            .starts_with("Could not extract readable content from legal.example.com."));
        assert_eq!(
            processing_error_message("https://legal.example.com/terms", "bad markup"),
            "Error processing content from legal.example.com: bad markup"
        );
    }
}
