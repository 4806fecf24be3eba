//! Shared state threaded through a visitor run.

use aspect_common::comments::CommentsConsumer;
use aspect_common::diagnostics::{Diagnostic, DiagnosticTags, Severity, category};
use aspect_parser::{NodeArena, NodeIndex};

use crate::scope::ScopeTree;
use crate::suppressions::{suppressed_category, suppresses};

/// Everything a visitor can see and mutate while walking one compile unit:
/// the arena (for allocating replacement nodes), the comment table, the
/// scope analysis of the input tree, and the diagnostic sink.
///
/// Diagnostics pass through the active suppression stack before being
/// recorded; the engine pushes a frame for each node whose leading comments
/// carry `aspect-ignore` markers.
pub struct CompilerContext {
    pub arena: NodeArena,
    pub comments: CommentsConsumer,
    pub scopes: ScopeTree,
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
    suppression_stack: Vec<Vec<String>>,
}

impl CompilerContext {
    pub fn new(
        arena: NodeArena,
        comments: CommentsConsumer,
        scopes: ScopeTree,
        path: impl Into<String>,
    ) -> CompilerContext {
        CompilerContext {
            arena,
            comments,
            scopes,
            path: path.into(),
            diagnostics: Vec::new(),
            suppression_stack: Vec::new(),
        }
    }

    /// Category string for a rule finding: `lint/<ruleName>`.
    pub fn lint_category(rule: &str) -> String {
        format!("{}/{rule}", category::LINT)
    }

    /// Suppression prefixes carried by a node's own leading comments.
    pub fn node_suppressions(&self, node: NodeIndex) -> Vec<String> {
        let Some(node) = self.arena.get(node) else {
            return Vec::new();
        };
        node.leading_comments
            .iter()
            .filter_map(|id| self.comments.get(*id))
            .filter_map(|comment| suppressed_category(&comment.text))
            .collect()
    }

    pub(crate) fn push_suppression_frame(&mut self, node: NodeIndex) {
        let frame = self.node_suppressions(node);
        self.suppression_stack.push(frame);
    }

    pub(crate) fn pop_suppression_frame(&mut self) {
        self.suppression_stack.pop();
    }

    pub fn is_suppressed(&self, diagnostic_category: &str) -> bool {
        self.suppression_stack
            .iter()
            .flatten()
            .any(|prefix| suppresses(prefix, diagnostic_category))
    }

    /// Record a diagnostic unless an active suppression covers it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if !self.is_suppressed(&diagnostic.category) {
            self.diagnostics.push(diagnostic);
        }
    }

    /// Rule finding anchored at a node.
    pub fn report_node(&mut self, rule: &str, node: NodeIndex, message: impl Into<String>) {
        let span = self.arena.span(node);
        self.report(Diagnostic::new(
            Self::lint_category(rule),
            span,
            message,
            Severity::Warning,
        ));
    }

    /// Rule finding for which the rule also rewrites the tree.
    pub fn report_fixable(&mut self, rule: &str, node: NodeIndex, message: impl Into<String>) {
        let span = self.arena.span(node);
        self.report(
            Diagnostic::new(Self::lint_category(rule), span, message, Severity::Warning)
                .with_tags(DiagnosticTags::FIXABLE),
        );
    }

    /// A violated engine invariant; fatal for the file, never suppressed.
    pub fn report_internal(&mut self, node: NodeIndex, message: impl Into<String>) {
        let span = self.arena.span(node);
        self.diagnostics.push(Diagnostic::internal_error(span, message));
    }
}
