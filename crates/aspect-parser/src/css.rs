//! CSS dialect parser.
//!
//! A deliberately compact grammar sharing the JS arena and diagnostics
//! plumbing: rules are selector lists over declaration blocks, at-rules keep
//! their prelude as raw text, and selectors/values are stored verbatim
//! rather than as sub-syntax. Recovery skips to the next `;` or `}` so one
//! bad declaration never takes down the stylesheet.

use aspect_common::comments::{CommentId, CommentKind, CommentsConsumer};
use aspect_common::diagnostics::{Diagnostic, Severity, category};
use aspect_common::span::Span;
use tracing::debug;

use crate::parser::Parse;
use crate::syntax::arena::{NodeArena, NodeIndex, NodeList};
use crate::syntax::node::NodeData;

/// At-rules whose block nests rules rather than declarations.
const NESTED_RULE_AT_KEYWORDS: &[&str] = &[
    "media",
    "supports",
    "layer",
    "container",
    "document",
    "keyframes",
];

struct CssParser<'a> {
    source: &'a str,
    pos: usize,
    arena: NodeArena,
    diagnostics: Vec<Diagnostic>,
    comments: CommentsConsumer,
    /// Comments scanned since the last node, attached as leading trivia of
    /// the next rule or declaration.
    pending_comments: Vec<CommentId>,
}

impl<'a> CssParser<'a> {
    fn new(source: &'a str) -> CssParser<'a> {
        CssParser {
            source,
            pos: 0,
            arena: NodeArena::new(),
            diagnostics: Vec::new(),
            comments: CommentsConsumer::new(),
            pending_comments: Vec::new(),
        }
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::new(
            category::PARSE_CSS,
            span,
            message,
            Severity::Error,
        ));
    }

    fn cur(&self) -> u8 {
        self.source.as_bytes().get(self.pos).copied().unwrap_or(0)
    }

    fn peek(&self, ahead: usize) -> u8 {
        self.source
            .as_bytes()
            .get(self.pos + ahead)
            .copied()
            .unwrap_or(0)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Skip whitespace and collect `/* */` comments into the side table.
    fn skip_trivia(&mut self) {
        loop {
            while !self.is_eof() && self.cur().is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.cur() == b'/' && self.peek(1) == b'*' {
                let start = self.pos;
                self.pos += 2;
                while !self.is_eof() && !(self.cur() == b'*' && self.peek(1) == b'/') {
                    self.pos += 1;
                }
                let text_end = self.pos;
                if self.is_eof() {
                    self.error(
                        Span::new(start as u32, text_end as u32),
                        "unterminated comment",
                    );
                } else {
                    self.pos += 2;
                }
                let text = self.source[start + 2..text_end].to_string();
                let span = Span::new(start as u32, self.pos as u32);
                let id = self.comments.add(CommentKind::Block, text, span);
                self.pending_comments.push(id);
            } else {
                break;
            }
        }
    }

    fn take_pending_comments(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.pending_comments)
    }

    /// Consume raw text until one of `stops` at nesting depth zero.
    /// Parentheses, brackets, strings, and comments are skipped as units.
    fn scan_raw_until(&mut self, stops: &[u8]) -> (u32, u32) {
        let start = self.pos;
        let mut depth = 0u32;
        while !self.is_eof() {
            let ch = self.cur();
            if depth == 0 && stops.contains(&ch) {
                break;
            }
            match ch {
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'"' | b'\'' => {
                    self.skip_string();
                    continue;
                }
                b'/' if self.peek(1) == b'*' => {
                    self.pos += 2;
                    while !self.is_eof() && !(self.cur() == b'*' && self.peek(1) == b'/') {
                        self.pos += 1;
                    }
                    if !self.is_eof() {
                        self.pos += 2;
                    }
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }
        (start as u32, self.pos as u32)
    }

    fn skip_string(&mut self) {
        let quote = self.cur();
        self.pos += 1;
        while !self.is_eof() {
            let ch = self.cur();
            if ch == b'\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
            if ch == quote {
                break;
            }
        }
    }

    fn raw_text(&self, start: u32, end: u32) -> &str {
        self.source[start as usize..end as usize].trim()
    }

    // =========================================================================
    // Grammar
    // =========================================================================

    fn parse_stylesheet(&mut self) -> NodeIndex {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_eof() {
                break;
            }
            if let Some(item) = self.parse_item() {
                items.push(item);
            }
        }
        let root = self.arena.add(
            NodeData::CssStylesheet { items },
            Span::new(0, self.source.len() as u32),
        );
        // Comments after the last rule hang off the stylesheet.
        let leftovers = self.take_pending_comments();
        self.arena.attach_trailing_comments(root, &leftovers);
        root
    }

    /// One top-level or nested item: at-rule or style rule. Returns `None`
    /// when recovery consumed stray input instead.
    fn parse_item(&mut self) -> Option<NodeIndex> {
        if self.cur() == b'@' {
            return Some(self.parse_at_rule());
        }
        self.parse_rule()
    }

    fn parse_at_rule(&mut self) -> NodeIndex {
        let leading = self.take_pending_comments();
        let start = self.pos as u32;
        self.pos += 1; // `@`
        let name_start = self.pos;
        while !self.is_eof() && (self.cur().is_ascii_alphanumeric() || self.cur() == b'-') {
            self.pos += 1;
        }
        let name = self.source[name_start..self.pos].to_string();
        if name.is_empty() {
            self.error(Span::new(start, self.pos as u32), "expected an at-rule name");
        }

        let (prelude_start, prelude_end) = self.scan_raw_until(&[b';', b'{', b'}']);
        let prelude = self.raw_text(prelude_start, prelude_end).to_string();

        let (body, has_block) = match self.cur() {
            b'{' => {
                self.pos += 1;
                let body = if NESTED_RULE_AT_KEYWORDS.contains(&name.as_str()) {
                    self.parse_block_items()
                } else {
                    self.parse_declaration_block_contents()
                };
                if self.cur() == b'}' {
                    self.pos += 1;
                } else {
                    self.error(
                        Span::empty(self.pos as u32),
                        format!("unterminated `@{name}` block"),
                    );
                }
                (body, true)
            }
            b';' => {
                self.pos += 1;
                (Vec::new(), false)
            }
            _ => {
                if !self.is_eof() {
                    self.error(
                        Span::empty(self.pos as u32),
                        format!("expected `;` or `{{` after `@{name}`"),
                    );
                }
                (Vec::new(), false)
            }
        };

        let node = self.arena.add(
            NodeData::CssAtRule {
                name,
                prelude,
                body,
                has_block,
            },
            Span::new(start, self.pos as u32),
        );
        self.arena.attach_leading_comments(node, &leading);
        node
    }

    /// Items inside a nesting at-rule block, up to the closing `}`.
    fn parse_block_items(&mut self) -> NodeList {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_eof() || self.cur() == b'}' {
                break;
            }
            if let Some(item) = self.parse_item() {
                items.push(item);
            }
        }
        items
    }

    fn parse_rule(&mut self) -> Option<NodeIndex> {
        let leading = self.take_pending_comments();
        let start = self.pos as u32;
        let mut selectors = Vec::new();
        loop {
            self.skip_trivia();
            let (sel_start, sel_end) = self.scan_raw_until(&[b',', b'{', b'}', b';']);
            let text = self.raw_text(sel_start, sel_end).to_string();
            if !text.is_empty() {
                selectors.push(self.arena.add(
                    NodeData::CssSelector { text },
                    Span::new(sel_start, sel_end),
                ));
            }
            match self.cur() {
                b',' => {
                    self.pos += 1;
                }
                b'{' => break,
                _ => {
                    // Stray `;`/`}`/EOF before any block.
                    let span = Span::new(start, self.pos as u32);
                    self.error(span, "expected `{` after the selector");
                    if !self.is_eof() {
                        self.pos += 1;
                    }
                    self.pending_comments = leading;
                    return None;
                }
            }
        }
        if selectors.is_empty() {
            self.error(Span::new(start, self.pos as u32), "expected a selector");
        }

        self.pos += 1; // `{`
        let declarations = self.parse_declaration_block_contents();
        if self.cur() == b'}' {
            self.pos += 1;
        } else {
            self.error(Span::empty(self.pos as u32), "unterminated rule block");
        }

        let node = self.arena.add(
            NodeData::CssRule {
                selectors,
                declarations,
            },
            Span::new(start, self.pos as u32),
        );
        self.arena.attach_leading_comments(node, &leading);
        Some(node)
    }

    /// Declarations up to (not including) the closing `}`.
    fn parse_declaration_block_contents(&mut self) -> NodeList {
        let mut declarations = Vec::new();
        loop {
            self.skip_trivia();
            match self.cur() {
                0 if self.is_eof() => break,
                b'}' => break,
                b';' => {
                    self.pos += 1;
                }
                _ => {
                    if let Some(declaration) = self.parse_declaration() {
                        declarations.push(declaration);
                    }
                }
            }
        }
        declarations
    }

    fn parse_declaration(&mut self) -> Option<NodeIndex> {
        let leading = self.take_pending_comments();
        let start = self.pos as u32;
        let (prop_start, prop_end) = self.scan_raw_until(&[b':', b';', b'}']);
        let property = self.raw_text(prop_start, prop_end).to_string();

        if self.cur() != b':' {
            let span = Span::new(start, self.pos as u32);
            self.error(span, "expected `:` after the property name");
            // Skip the fragment so the block loop continues at `;` / `}`.
            if self.cur() == b';' {
                self.pos += 1;
            }
            self.pending_comments = leading;
            return None;
        }
        self.pos += 1;

        let (value_start, value_end) = self.scan_raw_until(&[b';', b'}']);
        let mut value = self.raw_text(value_start, value_end).to_string();
        let mut important = false;
        if let Some(stripped) = strip_important(&value) {
            value = stripped;
            important = true;
        }
        if value.is_empty() {
            self.error(
                Span::new(value_start, value_end),
                format!("missing value for `{property}`"),
            );
        }
        if self.cur() == b';' {
            self.pos += 1;
        }

        let node = self.arena.add(
            NodeData::CssDeclaration {
                property,
                value,
                important,
            },
            Span::new(start, self.pos as u32),
        );
        self.arena.attach_leading_comments(node, &leading);
        Some(node)
    }
}

/// Detect and remove a trailing `!important`, tolerating internal spacing.
fn strip_important(value: &str) -> Option<String> {
    let trimmed = value.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    let bang = lower.rfind('!')?;
    if lower[bang + 1..].trim() == "important" {
        Some(trimmed[..bang].trim_end().to_string())
    } else {
        None
    }
}

/// Parse a stylesheet into the shared arena representation.
pub fn parse_css(source: impl Into<String>, path: impl Into<String>) -> Parse {
    let source = source.into();
    let path = path.into();
    debug!(path = %path, "css parse start");

    let mut parser = CssParser::new(&source);
    let root = parser.parse_stylesheet();
    let mut diagnostics = parser.diagnostics;
    diagnostics.sort_by_key(|d| (d.span.start, d.span.end));
    debug!(
        path = %path,
        nodes = parser.arena.len(),
        diagnostics = diagnostics.len(),
        "css parse finish"
    );

    Parse {
        arena: parser.arena,
        root,
        diagnostics,
        comments: parser.comments,
        path,
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::node::NodeKind;

    fn items(parse: &Parse) -> Vec<NodeIndex> {
        match &parse.arena.get(parse.root).unwrap().data {
            NodeData::CssStylesheet { items } => items.clone(),
            other => panic!("root is not a stylesheet: {other:?}"),
        }
    }

    #[test]
    fn parses_a_simple_rule() {
        let parsed = parse_css("a, .btn { color: red; margin: 0 auto }", "test.css");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        assert_eq!(items.len(), 1);
        let NodeData::CssRule {
            selectors,
            declarations,
        } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected a rule");
        };
        assert_eq!(selectors.len(), 2);
        assert_eq!(declarations.len(), 2);
        let NodeData::CssDeclaration {
            property,
            value,
            important,
        } = &parsed.arena.get(declarations[0]).unwrap().data
        else {
            panic!("expected a declaration");
        };
        assert_eq!(property, "color");
        assert_eq!(value, "red");
        assert!(!important);
    }

    #[test]
    fn important_is_split_from_the_value() {
        let parsed = parse_css("p { color: blue !important; }", "test.css");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        let NodeData::CssRule { declarations, .. } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected a rule");
        };
        let NodeData::CssDeclaration {
            value, important, ..
        } = &parsed.arena.get(declarations[0]).unwrap().data
        else {
            panic!("expected a declaration");
        };
        assert_eq!(value, "blue");
        assert!(*important);
    }

    #[test]
    fn media_query_nests_rules() {
        let parsed = parse_css(
            "@media (max-width: 600px) { body { font-size: 14px; } }",
            "test.css",
        );
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        let NodeData::CssAtRule {
            name,
            prelude,
            body,
            has_block,
        } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected an at-rule");
        };
        assert_eq!(name, "media");
        assert_eq!(prelude, "(max-width: 600px)");
        assert!(*has_block);
        assert_eq!(body.len(), 1);
        assert_eq!(parsed.arena.kind(body[0]), Some(NodeKind::CssRule));
    }

    #[test]
    fn import_at_rule_without_block() {
        let parsed = parse_css("@import url(\"theme.css\");\nbody { margin: 0; }", "test.css");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        assert_eq!(items.len(), 2);
        let NodeData::CssAtRule {
            name, has_block, ..
        } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected an at-rule");
        };
        assert_eq!(name, "import");
        assert!(!has_block);
    }

    #[test]
    fn font_face_block_holds_declarations() {
        let parsed = parse_css(
            "@font-face { font-family: \"Inter\"; src: url(inter.woff2); }",
            "test.css",
        );
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        let NodeData::CssAtRule { body, .. } = &parsed.arena.get(items[0]).unwrap().data else {
            panic!("expected an at-rule");
        };
        assert_eq!(body.len(), 2);
        assert_eq!(parsed.arena.kind(body[0]), Some(NodeKind::CssDeclaration));
    }

    #[test]
    fn bad_declaration_recovers_within_the_block() {
        let parsed = parse_css("a { color red; margin: 0; }", "test.css");
        assert!(!parsed.diagnostics.is_empty());
        assert!(parsed.diagnostics[0].category.starts_with("parse/css"));
        let items = items(&parsed);
        let NodeData::CssRule { declarations, .. } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected a rule");
        };
        // The malformed declaration is dropped; the next one survives.
        assert_eq!(declarations.len(), 1);
        let NodeData::CssDeclaration { property, .. } =
            &parsed.arena.get(declarations[0]).unwrap().data
        else {
            panic!("expected a declaration");
        };
        assert_eq!(property, "margin");
    }

    #[test]
    fn comments_attach_to_the_next_rule() {
        let parsed = parse_css("/* header */\nh1 { font-weight: bold; }", "test.css");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_eq!(parsed.comments.len(), 1);
        let items = items(&parsed);
        let node = parsed.arena.get(items[0]).unwrap();
        assert_eq!(node.leading_comments.len(), 1);
        let comment = parsed.comments.get(node.leading_comments[0]).unwrap();
        assert_eq!(comment.text, " header ");
    }

    #[test]
    fn selector_preserves_complex_text() {
        let parsed = parse_css("ul > li:not(.active) [data-id] { color: red; }", "test.css");
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let items = items(&parsed);
        let NodeData::CssRule { selectors, .. } = &parsed.arena.get(items[0]).unwrap().data
        else {
            panic!("expected a rule");
        };
        let NodeData::CssSelector { text } = &parsed.arena.get(selectors[0]).unwrap().data
        else {
            panic!("expected a selector");
        };
        assert_eq!(text, "ul > li:not(.active) [data-id]");
    }
}
