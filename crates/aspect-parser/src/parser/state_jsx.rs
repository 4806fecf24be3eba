//! JSX elements, fragments, and attributes.
//!
//! Child content does not tokenize like JS, so the parser drives the scanner
//! explicitly: between an opening tag's `>` and the next `<` or `{`,
//! `scan_jsx_token` yields raw text tokens. Tag internals (names, attributes)
//! scan in the normal mode. Every tag-parsing helper leaves the final `>` as
//! the current token; the caller advances in whichever mode its context
//! needs.

use aspect_common::span::Span;
use aspect_scanner::SyntaxKind;

use crate::syntax::arena::{NodeIndex, NodeList};
use crate::syntax::node::NodeData;

use super::ParserState;

impl ParserState {
    /// Entry from expression position; the current token is `<`.
    pub(crate) fn parse_jsx_element_or_fragment(&mut self) -> NodeIndex {
        let element = self.parse_jsx_tag();
        // Step past the final `>` back into normal expression tokens.
        self.next_token();
        element
    }

    /// Scan the next token of JSX child content (text, `{`, `<`, `</`).
    fn next_jsx_child_token(&mut self) -> SyntaxKind {
        self.prev_token_end = self.scanner.token_end();
        self.scanner.scan_jsx_token()
    }

    /// Parse an element or fragment from its `<`. On return the current
    /// token is the final `>` of the construct, not yet consumed.
    fn parse_jsx_tag(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();

        if self.is_token(SyntaxKind::GreaterThanToken) {
            // `<>` fragment
            let children = self.parse_jsx_children();
            if self.is_token(SyntaxKind::LessThanSlashToken) {
                self.next_token();
                if !self.is_token(SyntaxKind::GreaterThanToken) {
                    self.error_at_current("expected `>` to close the fragment");
                    self.skip_to_tag_end();
                }
            } else {
                self.error_at_current("unterminated JSX fragment");
            }
            let span = Span::new(start, self.token_end());
            return self.arena.add(NodeData::JsxFragment { children }, span);
        }

        let name = self.parse_jsx_name();
        let attributes = self.parse_jsx_attributes();

        if self.is_token(SyntaxKind::SlashToken) {
            self.next_token();
            if !self.is_token(SyntaxKind::GreaterThanToken) {
                self.error_at_current("expected `>` after `/`");
                self.skip_to_tag_end();
            }
            let span = Span::new(start, self.token_end());
            return self.arena.add(
                NodeData::JsxElement {
                    name,
                    attributes,
                    children: Vec::new(),
                    self_closing: true,
                },
                span,
            );
        }

        if !self.is_token(SyntaxKind::GreaterThanToken) {
            self.error_at_current("expected `>` to finish the opening tag");
            self.skip_to_tag_end();
        }

        let children = self.parse_jsx_children();

        if self.is_token(SyntaxKind::LessThanSlashToken) {
            self.next_token();
            let closing = self.parse_jsx_name();
            self.check_jsx_name_match(name, closing);
            if !self.is_token(SyntaxKind::GreaterThanToken) {
                self.error_at_current("expected `>` to close the element");
                self.skip_to_tag_end();
            }
        } else {
            let span = self.arena.span(name);
            self.error_at(span, "unterminated JSX element");
        }

        let span = Span::new(start, self.token_end());
        self.arena.add(
            NodeData::JsxElement {
                name,
                attributes,
                children,
                self_closing: false,
            },
            span,
        )
    }

    fn skip_to_tag_end(&mut self) {
        while !matches!(
            self.token(),
            SyntaxKind::GreaterThanToken | SyntaxKind::EndOfFileToken
        ) {
            self.next_token();
        }
    }

    /// Element or attribute name: identifier segments joined by `.` or `:`,
    /// with `-` continuation inside a segment.
    fn parse_jsx_name(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut text = String::new();
        self.parse_jsx_name_segment(&mut text);
        while matches!(self.token(), SyntaxKind::DotToken | SyntaxKind::ColonToken) {
            text.push(if self.is_token(SyntaxKind::DotToken) { '.' } else { ':' });
            self.next_token();
            self.parse_jsx_name_segment(&mut text);
        }
        self.arena
            .add(NodeData::JsxName { name: text }, self.finish_span(start))
    }

    fn parse_jsx_name_segment(&mut self, text: &mut String) {
        let token = self.token();
        if token == SyntaxKind::Identifier || token.is_keyword() {
            self.scanner.scan_jsx_identifier();
            text.push_str(self.scanner.token_value());
            self.next_token();
        } else {
            self.error_at_current("expected a JSX name");
        }
    }

    fn check_jsx_name_match(&mut self, opening: NodeIndex, closing: NodeIndex) {
        let open_name = match self.arena.get(opening).map(|n| &n.data) {
            Some(NodeData::JsxName { name }) => name.clone(),
            _ => return,
        };
        let close_name = match self.arena.get(closing).map(|n| &n.data) {
            Some(NodeData::JsxName { name }) => name.clone(),
            _ => return,
        };
        if open_name != close_name {
            let span = self.arena.span(closing);
            self.error_at(
                span,
                format!("expected `</{open_name}>`, found `</{close_name}>`"),
            );
        }
    }

    fn parse_jsx_attributes(&mut self) -> NodeList {
        let mut attributes = Vec::new();
        loop {
            match self.token() {
                SyntaxKind::SlashToken
                | SyntaxKind::GreaterThanToken
                | SyntaxKind::EndOfFileToken => break,
                SyntaxKind::OpenBraceToken => {
                    // `{...props}`
                    let start = self.token_start();
                    self.next_token();
                    self.parse_expected(SyntaxKind::DotDotDotToken);
                    let argument = self.parse_assignment_expression();
                    self.parse_expected(SyntaxKind::CloseBraceToken);
                    attributes.push(self.arena.add(
                        NodeData::JsxSpreadAttribute { argument },
                        self.finish_span(start),
                    ));
                }
                token if token == SyntaxKind::Identifier || token.is_keyword() => {
                    attributes.push(self.parse_jsx_attribute());
                }
                _ => {
                    self.error_at_current("expected a JSX attribute");
                    self.next_token();
                }
            }
        }
        attributes
    }

    fn parse_jsx_attribute(&mut self) -> NodeIndex {
        let start = self.token_start();
        let name = self.parse_jsx_name();
        let value = if self.parse_optional(SyntaxKind::EqualsToken) {
            match self.token() {
                SyntaxKind::StringLiteral => {
                    let span = self.token_span();
                    let text = self.scanner.token_value().to_string();
                    self.next_token();
                    self.arena.add(NodeData::StringLiteral { value: text }, span)
                }
                SyntaxKind::OpenBraceToken => {
                    let container = self.parse_jsx_expression_container();
                    // The container leaves `}` current; attributes continue
                    // in normal token mode.
                    self.next_token();
                    container
                }
                _ => {
                    self.error_at_current("expected a string or `{` attribute value");
                    NodeIndex::NONE
                }
            }
        } else {
            NodeIndex::NONE
        };
        self.arena
            .add(NodeData::JsxAttribute { name, value }, self.finish_span(start))
    }

    /// `{ expression }` in child or attribute position. On return the
    /// current token is the closing `}`, not yet consumed, so the caller can
    /// pick its scanning mode.
    fn parse_jsx_expression_container(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let expression = if self.is_token(SyntaxKind::CloseBraceToken) {
            NodeIndex::NONE
        } else {
            let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
            let expression = self.parse_expression();
            self.allow_in = saved_allow_in;
            expression
        };
        if !self.is_token(SyntaxKind::CloseBraceToken) {
            self.error_at_current("expected `}`");
            while !matches!(
                self.token(),
                SyntaxKind::CloseBraceToken | SyntaxKind::EndOfFileToken
            ) {
                self.next_token();
            }
        }
        let span = Span::new(start, self.token_end());
        self.arena.add(NodeData::JsxExpression { expression }, span)
    }

    /// Children between a tag's `>` and the matching `</`. The current token
    /// on entry is the `>`; on exit it is `</` (or EOF on unterminated
    /// input).
    fn parse_jsx_children(&mut self) -> NodeList {
        let mut children = Vec::new();
        self.next_jsx_child_token();
        loop {
            match self.token() {
                SyntaxKind::JsxText => {
                    let span = self.token_span();
                    let value = self.scanner.token_value().to_string();
                    if !value.is_empty() {
                        children.push(self.arena.add(NodeData::JsxText { value }, span));
                    }
                    self.next_jsx_child_token();
                }
                SyntaxKind::OpenBraceToken => {
                    children.push(self.parse_jsx_expression_container());
                    self.next_jsx_child_token();
                }
                SyntaxKind::LessThanToken => {
                    children.push(self.parse_jsx_tag());
                    self.next_jsx_child_token();
                }
                SyntaxKind::LessThanSlashToken | SyntaxKind::EndOfFileToken => break,
                _ => {
                    self.error_at_current("unexpected token in JSX children");
                    self.next_jsx_child_token();
                }
            }
        }
        children
    }
}
