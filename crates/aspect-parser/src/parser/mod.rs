//! Parser state and entry point.
//!
//! The parser is total: it consumes any byte sequence and returns a tree
//! plus accumulated diagnostics. Unexpected tokens produce a diagnostic and
//! either resynchronize at a statement boundary or synthesize a
//! `BogusStatement`/`BogusExpression` placeholder so parent productions can
//! complete.

mod state_expressions;
mod state_jsx;
mod state_statements;

#[cfg(test)]
mod tests;

use aspect_common::comments::{CommentId, CommentsConsumer};
use aspect_common::diagnostics::Diagnostic;
use aspect_common::span::Span;
use aspect_scanner::{ScannerState, SyntaxKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::syntax::arena::{NodeArena, NodeIndex};
use crate::syntax::node::NodeData;

bitflags::bitflags! {
    /// Grammar extensions gated by configuration.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct DialectFlags: u8 {
        /// JSX elements and fragments in expression position.
        const JSX = 1 << 0;
        /// Reserved for a type-annotation dialect; no production consumes
        /// it yet.
        const TYPE_ANNOTATIONS = 1 << 1;
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Script,
    #[default]
    Module,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    pub source_type: SourceType,
    pub dialect: DialectFlags,
}

impl ParseOptions {
    pub fn jsx() -> ParseOptions {
        ParseOptions {
            source_type: SourceType::Module,
            dialect: DialectFlags::JSX,
        }
    }
}

/// Everything one parse produces. The arena, comment table, and source text
/// travel together through the rewrite and format stages.
#[derive(Debug)]
pub struct Parse {
    pub arena: NodeArena,
    pub root: NodeIndex,
    pub diagnostics: Vec<Diagnostic>,
    pub comments: CommentsConsumer,
    pub path: String,
    pub source: String,
}

/// Statement nesting deeper than this produces a diagnostic instead of a
/// stack overflow.
pub(crate) const MAX_RECURSION_DEPTH: u32 = 2_048;

pub struct ParserState {
    pub(crate) scanner: ScannerState,
    pub(crate) arena: NodeArena,
    pub(crate) options: ParseOptions,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) last_error_pos: u32,
    pub(crate) recursion_depth: u32,
    /// `in` is not a binary operator inside a `for (...)` init clause.
    pub(crate) allow_in: bool,
    /// End offset of the most recently consumed token; finished nodes end
    /// here, not at the start of the lookahead token.
    pub(crate) prev_token_end: u32,
    /// Leading comments scanned but not yet claimed by a node.
    pub(crate) pending_leading: Vec<CommentId>,
    /// Same-line trailing comments not yet claimed by a completed node.
    pub(crate) pending_trailing: Vec<CommentId>,
}

impl ParserState {
    pub fn new(source: impl Into<String>, options: ParseOptions) -> ParserState {
        ParserState {
            scanner: ScannerState::new(source),
            arena: NodeArena::new(),
            options,
            diagnostics: Vec::new(),
            last_error_pos: u32::MAX,
            recursion_depth: 0,
            allow_in: true,
            prev_token_end: 0,
            pending_leading: Vec::new(),
            pending_trailing: Vec::new(),
        }
    }

    // =========================================================================
    // Token plumbing
    // =========================================================================

    pub(crate) fn token(&self) -> SyntaxKind {
        self.scanner.token()
    }

    pub(crate) fn is_token(&self, kind: SyntaxKind) -> bool {
        self.scanner.token() == kind
    }

    pub(crate) fn token_span(&self) -> Span {
        self.scanner.token_span()
    }

    pub(crate) fn token_start(&self) -> u32 {
        self.scanner.token_start()
    }

    pub(crate) fn token_end(&self) -> u32 {
        self.scanner.token_end()
    }

    /// Advance the scanner and fold freshly scanned comments into the
    /// pending buffers.
    pub(crate) fn next_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end();
        let kind = self.scanner.next_token();
        self.collect_comments();
        kind
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn finish_span(&self, start: u32) -> Span {
        Span::new(start, self.prev_token_end.max(start))
    }

    /// Peek one token ahead without disturbing parser state.
    pub(crate) fn lookahead_token(&mut self) -> SyntaxKind {
        let checkpoint = self.scanner.save_state();
        let kind = self.scanner.next_token();
        self.scanner.restore_state(checkpoint);
        kind
    }

    pub(crate) fn collect_comments(&mut self) {
        let trailing = self.scanner.take_trailing_comments();
        self.pending_trailing.extend(trailing);
        let leading = self.scanner.take_leading_comments();
        self.pending_leading.extend(leading);
    }

    /// Claim the leading comments accumulated so far for a node that is
    /// about to be parsed.
    pub(crate) fn take_pending_leading(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.pending_leading)
    }

    pub(crate) fn take_pending_trailing(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.pending_trailing)
    }

    // =========================================================================
    // Diagnostics and recovery
    // =========================================================================

    /// Report an error at the current token. Consecutive errors at the same
    /// position are collapsed to avoid cascades.
    pub(crate) fn error_at_current(&mut self, message: impl Into<String>) {
        if self.token_start() == self.last_error_pos {
            return;
        }
        self.last_error_pos = self.token_start();
        self.diagnostics
            .push(Diagnostic::parse_error(self.token_span(), message));
    }

    pub(crate) fn error_at(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::parse_error(span, message));
    }

    /// Consume the expected token or report and stay put.
    pub(crate) fn parse_expected(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            let expected = kind.text().unwrap_or("token");
            self.error_at_current(format!("expected `{expected}`"));
            false
        }
    }

    /// Consume the current token if it matches.
    pub(crate) fn parse_optional(&mut self, kind: SyntaxKind) -> bool {
        if self.is_token(kind) {
            self.next_token();
            true
        } else {
            false
        }
    }

    /// Automatic semicolon insertion: an explicit `;`, a `}`, end of file,
    /// or a preceding line break all terminate the statement.
    pub(crate) fn parse_semicolon(&mut self) {
        if self.parse_optional(SyntaxKind::SemicolonToken) {
            return;
        }
        if self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.scanner.has_preceding_line_break()
        {
            return;
        }
        self.error_at_current("expected `;`");
    }

    pub(crate) fn can_insert_semicolon(&self) -> bool {
        self.is_token(SyntaxKind::CloseBraceToken)
            || self.is_token(SyntaxKind::EndOfFileToken)
            || self.scanner.has_preceding_line_break()
    }

    /// Skip forward to a plausible statement boundary and produce a bogus
    /// statement covering the skipped region.
    pub(crate) fn resync_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        loop {
            match self.token() {
                SyntaxKind::EndOfFileToken | SyntaxKind::CloseBraceToken => break,
                SyntaxKind::SemicolonToken => {
                    self.next_token();
                    break;
                }
                kind if is_statement_start(kind) && self.token_start() != start => break,
                _ => {
                    self.next_token();
                }
            }
        }
        let end = self.token_start().max(start);
        self.arena
            .add(NodeData::BogusStatement, Span::new(start, end))
    }

    /// Whether an identifier-like token can start a binding name here.
    /// Contextual keywords are valid identifiers.
    pub(crate) fn is_identifier_like(&self) -> bool {
        self.is_token(SyntaxKind::Identifier) || self.token().is_contextual_keyword()
    }

    /// Parse an identifier node, accepting contextual keywords.
    pub(crate) fn parse_identifier(&mut self) -> NodeIndex {
        if self.is_identifier_like() {
            let span = self.token_span();
            let name = self.scanner.token_value().to_string();
            self.next_token();
            self.arena.add(NodeData::Identifier { name }, span)
        } else {
            self.error_at_current("expected an identifier");
            self.arena
                .add(NodeData::BogusExpression, Span::empty(self.token_start()))
        }
    }
}

/// Token kinds that unambiguously begin a statement; used as
/// resynchronization anchors during recovery.
pub(crate) fn is_statement_start(kind: SyntaxKind) -> bool {
    use SyntaxKind::*;
    matches!(
        kind,
        VarKeyword
            | LetKeyword
            | ConstKeyword
            | FunctionKeyword
            | ClassKeyword
            | IfKeyword
            | ForKeyword
            | WhileKeyword
            | DoKeyword
            | SwitchKeyword
            | TryKeyword
            | ReturnKeyword
            | ThrowKeyword
            | BreakKeyword
            | ContinueKeyword
            | ImportKeyword
            | ExportKeyword
            | DebuggerKeyword
            | OpenBraceToken
    )
}

/// Parse a JS/JSX source file.
pub fn parse(source: impl Into<String>, path: impl Into<String>, options: ParseOptions) -> Parse {
    let path = path.into();
    let mut state = ParserState::new(source, options);
    debug!(path = %path, "parse start");

    state.scanner.scan_shebang_trivia();
    state.next_token();
    let statements = state.parse_source_file_statements();

    let end = state.token_end();
    let root = state
        .arena
        .add(NodeData::SourceFile { statements }, Span::new(0, end));

    // Comments left unclaimed at EOF hang off the source file itself.
    let leftovers_leading = state.take_pending_leading();
    let leftovers_trailing = state.take_pending_trailing();
    state
        .arena
        .attach_trailing_comments(root, &leftovers_trailing);
    state.arena.attach_trailing_comments(root, &leftovers_leading);

    // Fold scanner-level diagnostics (unterminated literals, bad comments)
    // into the parse diagnostics, then order everything by position.
    let mut diagnostics = state.diagnostics;
    for diag in state.scanner.diagnostics() {
        diagnostics.push(Diagnostic::parse_error(diag.span, diag.message.clone()));
    }
    diagnostics.sort_by_key(|d| (d.span.start, d.span.end));

    let mut comments = CommentsConsumer::new();
    for comment in state.scanner.take_comments() {
        comments.add_with_newline(
            comment.kind,
            comment.text,
            comment.span,
            comment.has_trailing_newline,
        );
    }

    let source = state.scanner.source_text().to_string();
    debug!(
        path = %path,
        nodes = state.arena.len(),
        diagnostics = diagnostics.len(),
        "parse finish"
    );

    Parse {
        arena: state.arena,
        root,
        diagnostics,
        comments,
        path,
        source,
    }
}
