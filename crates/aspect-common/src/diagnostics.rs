//! Diagnostics as plain, accumulated data.
//!
//! Diagnostics are never thrown: the parser, the visitor engine, and the
//! formatter all append to an ordered list and keep going. Only violated
//! internal invariants unwind, and the pipeline boundary converts those into
//! `internal-error` diagnostics before they reach the caller. Everything in
//! this module is serializable so diagnostics can cross a process bridge.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// Well-known category prefixes.
pub mod category {
    /// Syntax errors recovered by the JS parser.
    pub const PARSE: &str = "parse";
    /// Syntax errors recovered by the CSS parser.
    pub const PARSE_CSS: &str = "parse/css";
    /// A pass panicked or a structural invariant failed. Fatal for the file.
    pub const INTERNAL_ERROR: &str = "internalError";
    /// Prefix for rule findings: `lint/<ruleName>`.
    pub const LINT: &str = "lint";
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Hint,
    Information,
    Warning,
    Error,
}

bitflags::bitflags! {
    /// Extra machine-readable facts about a diagnostic.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DiagnosticTags: u8 {
        /// A machine-applicable fix was recorded for this diagnostic.
        const FIXABLE = 1 << 0;
        /// Processing of this file stopped at this diagnostic.
        const FATAL = 1 << 1;
        /// The toolchain itself misbehaved, not the user's code.
        const INTERNAL = 1 << 2;
    }
}

/// A secondary note attached to a diagnostic (a related location, a hint).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub message: String,
    pub span: Option<Span>,
}

/// One structured report: category, message, location, severity, tags.
///
/// The span is a byte range; callers resolve it to line/column through the
/// file's `LineMap` when rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub category: String,
    pub message: String,
    pub span: Span,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "DiagnosticTags::is_empty")]
    pub tags: DiagnosticTags,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advice: Vec<Advice>,
}

impl Diagnostic {
    pub fn new(
        category: impl Into<String>,
        span: Span,
        message: impl Into<String>,
        severity: Severity,
    ) -> Diagnostic {
        Diagnostic {
            category: category.into(),
            message: message.into(),
            span,
            severity,
            tags: DiagnosticTags::empty(),
            advice: Vec::new(),
        }
    }

    /// A recovered syntax error.
    pub fn parse_error(span: Span, message: impl Into<String>) -> Diagnostic {
        Diagnostic::new(category::PARSE, span, message, Severity::Error)
    }

    /// A fatal-for-this-file engine failure.
    pub fn internal_error(span: Span, message: impl Into<String>) -> Diagnostic {
        let mut diag = Diagnostic::new(category::INTERNAL_ERROR, span, message, Severity::Error);
        diag.tags |= DiagnosticTags::FATAL | DiagnosticTags::INTERNAL;
        diag
    }

    pub fn with_tags(mut self, tags: DiagnosticTags) -> Diagnostic {
        self.tags |= tags;
        self
    }

    pub fn with_advice(mut self, message: impl Into<String>, span: Option<Span>) -> Diagnostic {
        self.advice.push(Advice {
            message: message.into(),
            span,
        });
        self
    }

    pub fn is_fixable(&self) -> bool {
        self.tags.contains(DiagnosticTags::FIXABLE)
    }

    pub fn is_fatal(&self) -> bool {
        self.tags.contains(DiagnosticTags::FATAL)
    }

    /// Whether this diagnostic's category equals `prefix` or sits below it
    /// (`lint` matches `lint/noDuplicateCase`; `lint/no` does not).
    pub fn category_matches(&self, prefix: &str) -> bool {
        category_matches(&self.category, prefix)
    }
}

/// Category-path matching shared with suppression handling.
pub fn category_matches(cat: &str, prefix: &str) -> bool {
    match cat.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_prefix_matching_is_path_wise() {
        assert!(category_matches("lint/noDuplicateCase", "lint"));
        assert!(category_matches("lint/noDuplicateCase", "lint/noDuplicateCase"));
        assert!(!category_matches("lint/noDuplicateCase", "lint/no"));
        assert!(!category_matches("parse", "lint"));
    }

    #[test]
    fn diagnostics_serialize_as_plain_data() {
        let diag = Diagnostic::parse_error(Span::new(3, 7), "unterminated string literal")
            .with_tags(DiagnosticTags::FIXABLE);
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["category"], "parse");
        assert_eq!(json["span"]["start"], 3);
        let back: Diagnostic = serde_json::from_value(json).unwrap();
        assert_eq!(back, diag);
    }
}
