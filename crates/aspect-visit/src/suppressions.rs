//! Suppression comments.
//!
//! `// aspect-ignore <category>` on the line above a node silences matching
//! diagnostics for that node and everything beneath it. The category is a
//! path prefix: `lint` silences every rule, `lint/a11y/useAltText` one rule,
//! `parse` recovered syntax errors. A bare `aspect-ignore` silences
//! everything.

use aspect_common::diagnostics::category_matches;

const MARKER: &str = "aspect-ignore";

/// Extract the suppressed category prefix from a comment's text, if the
/// comment is a suppression. The empty string means "suppress everything".
pub fn suppressed_category(comment_text: &str) -> Option<String> {
    let text = comment_text.trim();
    let rest = text.strip_prefix(MARKER)?;
    if rest.is_empty() {
        return Some(String::new());
    }
    // Reject words that merely start with the marker (`aspect-ignored`).
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let category = rest.split_whitespace().next().unwrap_or("");
    Some(category.to_string())
}

/// Whether a suppression prefix covers a diagnostic category.
pub fn suppresses(prefix: &str, category: &str) -> bool {
    prefix.is_empty() || category_matches(category, prefix)
}
