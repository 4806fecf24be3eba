//! Tokenizer state machine.
//!
//! One token is produced at a time with `next_token`. The parser drives
//! speculative lookahead through `save_state`/`restore_state` and switches
//! lexing modes (regex, template continuation, JSX) through the dedicated
//! rescan entry points, because slash, backtick-continuation, and JSX text
//! are not decidable without grammatical context.
//!
//! Trivia is never handed to the parser: whitespace is skipped and comments
//! are captured positionally, split into "trailing of the previous token"
//! (same line, before any line break) and "leading of the current token".

use aspect_common::comments::{Comment, CommentId, CommentKind};
use aspect_common::span::Span;
use tracing::trace;

use crate::syntax_kind::{SyntaxKind, keyword_kind};

bitflags::bitflags! {
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct TokenFlags: u8 {
        /// A line break occurred in the trivia before this token.
        const PRECEDING_LINE_BREAK = 1 << 0;
        /// The token is a best-effort recovery for an unterminated
        /// string/template/regex/comment.
        const UNTERMINATED = 1 << 1;
    }
}

/// A diagnostic raised during scanning; merged into the parse diagnostics
/// once the whole file has been consumed.
#[derive(Clone, Debug)]
pub struct ScannerDiagnostic {
    pub span: Span,
    pub message: String,
}

/// Snapshot for speculative lookahead. Restoring truncates everything the
/// scanner accumulated past the snapshot (comments, diagnostics).
#[derive(Clone, Debug)]
pub struct ScannerCheckpoint {
    pos: usize,
    token: SyntaxKind,
    token_start: u32,
    token_value: String,
    token_flags: TokenFlags,
    comments_len: usize,
    diagnostics_len: usize,
    leading: Vec<CommentId>,
    trailing_of_previous: Vec<CommentId>,
}

pub struct ScannerState {
    source: String,
    pos: usize,
    token: SyntaxKind,
    token_start: u32,
    token_value: String,
    token_flags: TokenFlags,
    comments: Vec<Comment>,
    diagnostics: Vec<ScannerDiagnostic>,
    /// Comments in the trivia before the current token, after a line break
    /// (or at the start of a line): they lead the current token.
    leading: Vec<CommentId>,
    /// Comments in the trivia before the current token but on the same line
    /// as the previous token: they trail whatever node just ended.
    trailing_of_previous: Vec<CommentId>,
}

impl ScannerState {
    pub fn new(source: impl Into<String>) -> ScannerState {
        ScannerState {
            source: source.into(),
            pos: 0,
            token: SyntaxKind::Unknown,
            token_start: 0,
            token_value: String::new(),
            token_flags: TokenFlags::empty(),
            comments: Vec::new(),
            diagnostics: Vec::new(),
            leading: Vec::new(),
            trailing_of_previous: Vec::new(),
        }
    }

    // =========================================================================
    // Token accessors
    // =========================================================================

    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Start offset of the current token (after trivia).
    pub fn token_start(&self) -> u32 {
        self.token_start
    }

    /// End offset of the current token.
    pub fn token_end(&self) -> u32 {
        self.pos as u32
    }

    pub fn token_span(&self) -> Span {
        Span::new(self.token_start, self.pos as u32)
    }

    /// Cooked value of the current token (identifier text, decoded string,
    /// raw number text, template chunk, regex source).
    pub fn token_value(&self) -> &str {
        &self.token_value
    }

    /// Raw source text of the current token.
    pub fn token_text(&self) -> &str {
        self.token_span().text(&self.source)
    }

    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    pub fn is_unterminated(&self) -> bool {
        self.token_flags.contains(TokenFlags::UNTERMINATED)
    }

    pub fn source_text(&self) -> &str {
        &self.source
    }

    pub fn diagnostics(&self) -> &[ScannerDiagnostic] {
        &self.diagnostics
    }

    /// Drain the comment records collected over the whole scan. Ids handed
    /// out during scanning are indexes into this list, in order.
    pub fn take_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.comments)
    }

    /// Comments leading the current token. Drained by the parser when it
    /// opens the node the token starts.
    pub fn take_leading_comments(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.leading)
    }

    /// Comments on the same line as the previous token. Drained by the
    /// parser and attached to the node that just closed.
    pub fn take_trailing_comments(&mut self) -> Vec<CommentId> {
        std::mem::take(&mut self.trailing_of_previous)
    }

    // =========================================================================
    // Lookahead
    // =========================================================================

    pub fn save_state(&self) -> ScannerCheckpoint {
        ScannerCheckpoint {
            pos: self.pos,
            token: self.token,
            token_start: self.token_start,
            token_value: self.token_value.clone(),
            token_flags: self.token_flags,
            comments_len: self.comments.len(),
            diagnostics_len: self.diagnostics.len(),
            leading: self.leading.clone(),
            trailing_of_previous: self.trailing_of_previous.clone(),
        }
    }

    pub fn restore_state(&mut self, checkpoint: ScannerCheckpoint) {
        self.pos = checkpoint.pos;
        self.token = checkpoint.token;
        self.token_start = checkpoint.token_start;
        self.token_value = checkpoint.token_value;
        self.token_flags = checkpoint.token_flags;
        self.comments.truncate(checkpoint.comments_len);
        self.diagnostics.truncate(checkpoint.diagnostics_len);
        self.leading = checkpoint.leading;
        self.trailing_of_previous = checkpoint.trailing_of_previous;
    }

    // =========================================================================
    // Character helpers
    // =========================================================================

    fn byte(&self, at: usize) -> u8 {
        *self.source.as_bytes().get(at).unwrap_or(&0)
    }

    fn cur(&self) -> u8 {
        self.byte(self.pos)
    }

    fn peek(&self, ahead: usize) -> u8 {
        self.byte(self.pos + ahead)
    }

    fn char_at(&self, at: usize) -> Option<char> {
        self.source[at..].chars().next()
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.source.len()
    }

    fn error(&mut self, span: Span, message: impl Into<String>) {
        let message = message.into();
        trace!(start = span.start, end = span.end, %message, "scan error");
        self.diagnostics.push(ScannerDiagnostic { span, message });
    }

    fn is_identifier_start(ch: char) -> bool {
        ch.is_ascii_alphabetic() || ch == '_' || ch == '$' || (!ch.is_ascii() && ch.is_alphabetic())
    }

    fn is_identifier_part(ch: char) -> bool {
        ch.is_ascii_alphanumeric()
            || ch == '_'
            || ch == '$'
            || (!ch.is_ascii() && (ch.is_alphanumeric() || ch == '\u{200C}' || ch == '\u{200D}'))
    }

    fn is_line_break(ch: u8) -> bool {
        ch == b'\n' || ch == b'\r'
    }

    // =========================================================================
    // Trivia
    // =========================================================================

    /// Skip a `#!` line at the very start of the file.
    pub fn scan_shebang_trivia(&mut self) {
        if self.pos == 0 && self.cur() == b'#' && self.peek(1) == b'!' {
            while !self.is_eof() && !Self::is_line_break(self.cur()) {
                self.pos += 1;
            }
        }
    }

    fn skip_trivia(&mut self) {
        let mut seen_line_break = false;
        loop {
            match self.cur() {
                b' ' | b'\t' | 0x0B | 0x0C => {
                    self.pos += 1;
                }
                b'\n' | b'\r' => {
                    seen_line_break = true;
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                }
                b'/' if self.peek(1) == b'/' => {
                    let id = self.scan_line_comment();
                    self.classify_comment(id, seen_line_break);
                }
                b'/' if self.peek(1) == b'*' => {
                    let (id, crossed_line) = self.scan_block_comment();
                    self.classify_comment(id, seen_line_break);
                    if crossed_line {
                        seen_line_break = true;
                        self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    }
                }
                0xE2 if self.peek(1) == 0x80 && (self.peek(2) == 0xA8 || self.peek(2) == 0xA9) => {
                    // U+2028 / U+2029 count as line terminators
                    seen_line_break = true;
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 3;
                }
                _ => break,
            }
        }
    }

    fn classify_comment(&mut self, id: CommentId, seen_line_break: bool) {
        // A comment on the same line as the previous token trails it;
        // everything else leads the upcoming token.
        if !seen_line_break && self.token != SyntaxKind::Unknown {
            self.trailing_of_previous.push(id);
        } else {
            self.leading.push(id);
        }
    }

    fn scan_line_comment(&mut self) -> CommentId {
        let start = self.pos as u32;
        self.pos += 2;
        let text_start = self.pos;
        while !self.is_eof() && !Self::is_line_break(self.cur()) {
            self.pos += 1;
        }
        let text = self.source[text_start..self.pos].to_string();
        let has_trailing_newline = !self.is_eof();
        self.push_comment(
            CommentKind::Line,
            text,
            Span::new(start, self.pos as u32),
            has_trailing_newline,
        )
    }

    fn scan_block_comment(&mut self) -> (CommentId, bool) {
        let start = self.pos as u32;
        self.pos += 2;
        let text_start = self.pos;
        let mut crossed_line = false;
        let mut closed = false;
        while !self.is_eof() {
            if self.cur() == b'*' && self.peek(1) == b'/' {
                closed = true;
                break;
            }
            if Self::is_line_break(self.cur()) {
                crossed_line = true;
            }
            self.pos += 1;
        }
        let text = self.source[text_start..self.pos].to_string();
        if closed {
            self.pos += 2;
        } else {
            self.error(
                Span::new(start, self.pos as u32),
                "unterminated block comment",
            );
        }
        let has_trailing_newline = Self::is_line_break(self.cur());
        let id = self.push_comment(
            CommentKind::Block,
            text,
            Span::new(start, self.pos as u32),
            has_trailing_newline,
        );
        (id, crossed_line)
    }

    fn push_comment(
        &mut self,
        kind: CommentKind,
        text: String,
        span: Span,
        has_trailing_newline: bool,
    ) -> CommentId {
        let id = CommentId(self.comments.len() as u32);
        self.comments.push(Comment {
            id,
            kind,
            text,
            span,
            has_trailing_newline,
        });
        id
    }

    // =========================================================================
    // Main scan loop
    // =========================================================================

    /// Advance to the next token and return its kind.
    pub fn next_token(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::empty();
        self.skip_trivia();
        self.token_start = self.pos as u32;
        self.token_value.clear();

        if self.is_eof() {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        }

        let kind = match self.cur() {
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b'[' => self.single(SyntaxKind::OpenBracketToken),
            b']' => self.single(SyntaxKind::CloseBracketToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b'@' => self.single(SyntaxKind::AtToken),
            b':' => self.single(SyntaxKind::ColonToken),
            b'~' => self.single(SyntaxKind::TildeToken),
            b'.' => {
                if self.peek(1).is_ascii_digit() {
                    self.scan_number()
                } else if self.peek(1) == b'.' && self.peek(2) == b'.' {
                    self.multi(3, SyntaxKind::DotDotDotToken)
                } else {
                    self.single(SyntaxKind::DotToken)
                }
            }
            b'?' => {
                if self.peek(1) == b'.' && !self.peek(2).is_ascii_digit() {
                    self.multi(2, SyntaxKind::QuestionDotToken)
                } else if self.peek(1) == b'?' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::QuestionQuestionEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::QuestionQuestionToken)
                    }
                } else {
                    self.single(SyntaxKind::QuestionToken)
                }
            }
            b'<' => {
                if self.peek(1) == b'<' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::LessThanLessThanEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::LessThanLessThanToken)
                    }
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::LessThanEqualsToken)
                } else {
                    self.single(SyntaxKind::LessThanToken)
                }
            }
            b'>' => {
                if self.peek(1) == b'>' {
                    if self.peek(2) == b'>' {
                        if self.peek(3) == b'=' {
                            self.multi(4, SyntaxKind::GreaterThanGreaterThanGreaterThanEqualsToken)
                        } else {
                            self.multi(3, SyntaxKind::GreaterThanGreaterThanGreaterThanToken)
                        }
                    } else if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::GreaterThanGreaterThanEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::GreaterThanGreaterThanToken)
                    }
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::GreaterThanEqualsToken)
                } else {
                    self.single(SyntaxKind::GreaterThanToken)
                }
            }
            b'=' => {
                if self.peek(1) == b'=' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::EqualsEqualsEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::EqualsEqualsToken)
                    }
                } else if self.peek(1) == b'>' {
                    self.multi(2, SyntaxKind::EqualsGreaterThanToken)
                } else {
                    self.single(SyntaxKind::EqualsToken)
                }
            }
            b'!' => {
                if self.peek(1) == b'=' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::ExclamationEqualsEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::ExclamationEqualsToken)
                    }
                } else {
                    self.single(SyntaxKind::ExclamationToken)
                }
            }
            b'+' => {
                if self.peek(1) == b'+' {
                    self.multi(2, SyntaxKind::PlusPlusToken)
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::PlusEqualsToken)
                } else {
                    self.single(SyntaxKind::PlusToken)
                }
            }
            b'-' => {
                if self.peek(1) == b'-' {
                    self.multi(2, SyntaxKind::MinusMinusToken)
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::MinusEqualsToken)
                } else {
                    self.single(SyntaxKind::MinusToken)
                }
            }
            b'*' => {
                if self.peek(1) == b'*' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::AsteriskAsteriskEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::AsteriskAsteriskToken)
                    }
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::AsteriskEqualsToken)
                } else {
                    self.single(SyntaxKind::AsteriskToken)
                }
            }
            b'/' => {
                if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::SlashEqualsToken)
                } else {
                    self.single(SyntaxKind::SlashToken)
                }
            }
            b'%' => {
                if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::PercentEqualsToken)
                } else {
                    self.single(SyntaxKind::PercentToken)
                }
            }
            b'&' => {
                if self.peek(1) == b'&' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::AmpersandAmpersandEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::AmpersandAmpersandToken)
                    }
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::AmpersandEqualsToken)
                } else {
                    self.single(SyntaxKind::AmpersandToken)
                }
            }
            b'|' => {
                if self.peek(1) == b'|' {
                    if self.peek(2) == b'=' {
                        self.multi(3, SyntaxKind::BarBarEqualsToken)
                    } else {
                        self.multi(2, SyntaxKind::BarBarToken)
                    }
                } else if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::BarEqualsToken)
                } else {
                    self.single(SyntaxKind::BarToken)
                }
            }
            b'^' => {
                if self.peek(1) == b'=' {
                    self.multi(2, SyntaxKind::CaretEqualsToken)
                } else {
                    self.single(SyntaxKind::CaretToken)
                }
            }
            b'"' | b'\'' => self.scan_string(),
            b'`' => self.scan_template(true),
            b'0'..=b'9' => self.scan_number(),
            _ => {
                let ch = match self.char_at(self.pos) {
                    Some(ch) => ch,
                    None => {
                        // Invalid UTF-8 boundary cannot occur for &str input;
                        // treat defensively as an unknown byte.
                        self.pos += 1;
                        self.token = SyntaxKind::Unknown;
                        return self.token;
                    }
                };
                if Self::is_identifier_start(ch) {
                    self.scan_identifier()
                } else {
                    self.pos += ch.len_utf8();
                    SyntaxKind::Unknown
                }
            }
        };

        self.token = kind;
        self.token
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    fn multi(&mut self, len: usize, kind: SyntaxKind) -> SyntaxKind {
        self.pos += len;
        kind
    }

    // =========================================================================
    // Identifiers and keywords
    // =========================================================================

    fn scan_identifier(&mut self) -> SyntaxKind {
        let start = self.pos;
        while let Some(ch) = self.char_at(self.pos) {
            if Self::is_identifier_part(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        self.token_value.push_str(&self.source[start..self.pos]);
        keyword_kind(&self.token_value).unwrap_or(SyntaxKind::Identifier)
    }

    /// Extend the current identifier with JSX name continuation characters
    /// (`-`), as in `<data-list aria-label="...">`.
    pub fn scan_jsx_identifier(&mut self) -> SyntaxKind {
        debug_assert!(self.token == SyntaxKind::Identifier || self.token.is_keyword());
        while !self.is_eof() {
            if self.cur() == b'-' {
                self.token_value.push('-');
                self.pos += 1;
                let part_start = self.pos;
                while let Some(ch) = self.char_at(self.pos) {
                    if Self::is_identifier_part(ch) {
                        self.pos += ch.len_utf8();
                    } else {
                        break;
                    }
                }
                self.token_value.push_str(&self.source[part_start..self.pos]);
            } else {
                break;
            }
        }
        self.token = SyntaxKind::Identifier;
        self.token
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    fn scan_number(&mut self) -> SyntaxKind {
        let start = self.pos;
        if self.cur() == b'0' && matches!(self.peek(1), b'x' | b'X' | b'o' | b'O' | b'b' | b'B') {
            self.pos += 2;
            while self.cur().is_ascii_alphanumeric() || self.cur() == b'_' {
                self.pos += 1;
            }
        } else {
            self.scan_digits();
            if self.cur() == b'.' {
                self.pos += 1;
                self.scan_digits();
            }
            if matches!(self.cur(), b'e' | b'E') {
                let mut ahead = 1;
                if matches!(self.peek(1), b'+' | b'-') {
                    ahead = 2;
                }
                if self.peek(ahead).is_ascii_digit() {
                    self.pos += ahead;
                    self.scan_digits();
                }
            }
        }
        // BigInt suffix stays part of the raw text
        if self.cur() == b'n' {
            self.pos += 1;
        }
        self.token_value.push_str(&self.source[start..self.pos]);
        SyntaxKind::NumericLiteral
    }

    fn scan_digits(&mut self) {
        while self.cur().is_ascii_digit() || self.cur() == b'_' {
            self.pos += 1;
        }
    }

    // =========================================================================
    // Strings and templates
    // =========================================================================

    fn scan_string(&mut self) -> SyntaxKind {
        let quote = self.cur();
        let start = self.pos as u32;
        self.pos += 1;
        loop {
            if self.is_eof() || Self::is_line_break(self.cur()) {
                // Best-effort token spanning to line end / EOF
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(
                    Span::new(start, self.pos as u32),
                    "unterminated string literal",
                );
                break;
            }
            let ch = self.cur();
            if ch == quote {
                self.pos += 1;
                break;
            }
            if ch == b'\\' {
                self.scan_escape_sequence();
                continue;
            }
            let ch = self.char_at(self.pos).unwrap_or('\u{FFFD}');
            self.token_value.push(ch);
            self.pos += ch.len_utf8();
        }
        SyntaxKind::StringLiteral
    }

    fn scan_escape_sequence(&mut self) {
        self.pos += 1; // backslash
        if self.is_eof() {
            return;
        }
        let ch = self.cur();
        self.pos += 1;
        match ch {
            b'n' => self.token_value.push('\n'),
            b't' => self.token_value.push('\t'),
            b'r' => self.token_value.push('\r'),
            b'b' => self.token_value.push('\u{8}'),
            b'f' => self.token_value.push('\u{C}'),
            b'v' => self.token_value.push('\u{B}'),
            b'0' if !self.cur().is_ascii_digit() => self.token_value.push('\0'),
            b'x' => {
                let value = self.scan_hex_digits(2);
                if let Some(ch) = value.and_then(char::from_u32) {
                    self.token_value.push(ch);
                }
            }
            b'u' => {
                if self.cur() == b'{' {
                    self.pos += 1;
                    let digits_start = self.pos;
                    while self.cur() != b'}' && !self.is_eof() {
                        self.pos += 1;
                    }
                    let value = u32::from_str_radix(&self.source[digits_start..self.pos], 16).ok();
                    if self.cur() == b'}' {
                        self.pos += 1;
                    }
                    if let Some(ch) = value.and_then(char::from_u32) {
                        self.token_value.push(ch);
                    }
                } else if let Some(ch) = self.scan_hex_digits(4).and_then(char::from_u32) {
                    self.token_value.push(ch);
                }
            }
            b'\r' => {
                // Line continuation; \r\n consumes both
                if self.cur() == b'\n' {
                    self.pos += 1;
                }
            }
            b'\n' => {}
            _ => {
                self.pos -= 1;
                let ch = self.char_at(self.pos).unwrap_or('\u{FFFD}');
                self.token_value.push(ch);
                self.pos += ch.len_utf8();
            }
        }
    }

    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let start = self.pos;
        for _ in 0..count {
            if self.cur().is_ascii_hexdigit() {
                self.pos += 1;
            } else {
                return None;
            }
        }
        u32::from_str_radix(&self.source[start..self.pos], 16).ok()
    }

    /// Scan a template token starting at a backtick (`from_backtick`) or at
    /// the `}` closing a substitution (template continuation; the parser
    /// calls `rescan_template_continuation` for that case).
    fn scan_template(&mut self, from_backtick: bool) -> SyntaxKind {
        let start = self.pos as u32;
        self.pos += 1; // ` or }
        loop {
            if self.is_eof() {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(
                    Span::new(start, self.pos as u32),
                    "unterminated template literal",
                );
                return if from_backtick {
                    SyntaxKind::NoSubstitutionTemplateLiteral
                } else {
                    SyntaxKind::TemplateTail
                };
            }
            match self.cur() {
                b'`' => {
                    self.pos += 1;
                    return if from_backtick {
                        SyntaxKind::NoSubstitutionTemplateLiteral
                    } else {
                        SyntaxKind::TemplateTail
                    };
                }
                b'$' if self.peek(1) == b'{' => {
                    self.pos += 2;
                    return if from_backtick {
                        SyntaxKind::TemplateHead
                    } else {
                        SyntaxKind::TemplateMiddle
                    };
                }
                b'\\' => self.scan_escape_sequence(),
                _ => {
                    let ch = self.char_at(self.pos).unwrap_or('\u{FFFD}');
                    self.token_value.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    /// Continue a template after the expression of a `${...}` substitution.
    /// The current token must be `}`.
    pub fn rescan_template_continuation(&mut self) -> SyntaxKind {
        debug_assert_eq!(self.token, SyntaxKind::CloseBraceToken);
        trace!(start = self.token_start, "rescanning template continuation");
        self.pos = self.token_start as usize;
        self.token_value.clear();
        self.token = self.scan_template(false);
        self.token
    }

    // =========================================================================
    // Regular expressions
    // =========================================================================

    /// Re-lex the current `/` or `/=` token as a regular expression literal.
    /// Only the parser knows whether a slash sits in expression position.
    pub fn rescan_slash_as_regex(&mut self) -> SyntaxKind {
        debug_assert!(matches!(
            self.token,
            SyntaxKind::SlashToken | SyntaxKind::SlashEqualsToken
        ));
        trace!(start = self.token_start, "rescanning slash as regex");
        let start = self.token_start as usize;
        self.pos = start + 1;
        self.token_value.clear();

        let mut in_class = false;
        loop {
            if self.is_eof() || Self::is_line_break(self.cur()) {
                self.token_flags |= TokenFlags::UNTERMINATED;
                self.error(
                    Span::new(start as u32, self.pos as u32),
                    "unterminated regular expression literal",
                );
                break;
            }
            match self.cur() {
                b'\\' => {
                    self.pos += 1;
                    if !self.is_eof() && !Self::is_line_break(self.cur()) {
                        self.pos += 1;
                    }
                }
                b'[' => {
                    in_class = true;
                    self.pos += 1;
                }
                b']' => {
                    in_class = false;
                    self.pos += 1;
                }
                b'/' if !in_class => {
                    self.pos += 1;
                    // Flags
                    while let Some(ch) = self.char_at(self.pos) {
                        if Self::is_identifier_part(ch) {
                            self.pos += ch.len_utf8();
                        } else {
                            break;
                        }
                    }
                    break;
                }
                _ => self.pos += 1,
            }
        }
        self.token_value
            .push_str(&self.source[start..self.pos]);
        self.token = SyntaxKind::RegularExpressionLiteral;
        self.token
    }

    // =========================================================================
    // JSX
    // =========================================================================

    /// Scan one token of JSX child content: `<`, `</`, `{`, raw text, or EOF.
    pub fn scan_jsx_token(&mut self) -> SyntaxKind {
        trace!(pos = self.pos, "scanning in JSX text mode");
        self.token_flags = TokenFlags::empty();
        self.token_start = self.pos as u32;
        self.token_value.clear();

        if self.is_eof() {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        }
        match self.cur() {
            b'<' => {
                if self.peek(1) == b'/' {
                    self.pos += 2;
                    self.token = SyntaxKind::LessThanSlashToken;
                } else {
                    self.pos += 1;
                    self.token = SyntaxKind::LessThanToken;
                }
            }
            b'{' => {
                self.pos += 1;
                self.token = SyntaxKind::OpenBraceToken;
            }
            _ => {
                let start = self.pos;
                while !self.is_eof() && self.cur() != b'<' && self.cur() != b'{' {
                    self.pos += 1;
                }
                self.token_value.push_str(&self.source[start..self.pos]);
                self.token = SyntaxKind::JsxText;
            }
        }
        self.token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<SyntaxKind> {
        let mut scanner = ScannerState::new(source);
        let mut out = Vec::new();
        loop {
            let kind = scanner.next_token();
            if kind == SyntaxKind::EndOfFileToken {
                break;
            }
            out.push(kind);
        }
        out
    }

    #[test]
    fn scans_compound_operators_longest_first() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("a >>>= b ** c ??= d"),
            vec![
                Identifier,
                GreaterThanGreaterThanGreaterThanEqualsToken,
                Identifier,
                AsteriskAsteriskToken,
                Identifier,
                QuestionQuestionEqualsToken,
                Identifier,
            ]
        );
    }

    #[test]
    fn question_dot_followed_by_digit_is_conditional() {
        use SyntaxKind::*;
        assert_eq!(
            kinds("a?.5:b"),
            vec![
                Identifier,
                QuestionToken,
                NumericLiteral,
                ColonToken,
                Identifier
            ]
        );
        assert_eq!(kinds("a?.b"), vec![Identifier, QuestionDotToken, Identifier]);
    }

    #[test]
    fn string_escapes_are_cooked() {
        let mut scanner = ScannerState::new(r#"'a\nbA'"#);
        assert_eq!(scanner.next_token(), SyntaxKind::StringLiteral);
        assert_eq!(scanner.token_value(), "a\nbA");
    }

    #[test]
    fn unterminated_string_recovers_at_line_end() {
        let mut scanner = ScannerState::new("\"abc\nnext");
        assert_eq!(scanner.next_token(), SyntaxKind::StringLiteral);
        assert!(scanner.is_unterminated());
        assert_eq!(scanner.token_value(), "abc");
        assert_eq!(scanner.diagnostics().len(), 1);
        // Scanning continues on the next line
        assert_eq!(scanner.next_token(), SyntaxKind::Identifier);
        assert!(scanner.has_preceding_line_break());
    }

    #[test]
    fn template_tokens_split_at_substitutions() {
        let mut scanner = ScannerState::new("`a${x}b`");
        assert_eq!(scanner.next_token(), SyntaxKind::TemplateHead);
        assert_eq!(scanner.token_value(), "a");
        assert_eq!(scanner.next_token(), SyntaxKind::Identifier);
        assert_eq!(scanner.next_token(), SyntaxKind::CloseBraceToken);
        assert_eq!(
            scanner.rescan_template_continuation(),
            SyntaxKind::TemplateTail
        );
        assert_eq!(scanner.token_value(), "b");
    }

    #[test]
    fn slash_rescans_to_regex_on_demand() {
        let mut scanner = ScannerState::new("/ab[/]c/gi");
        assert_eq!(scanner.next_token(), SyntaxKind::SlashToken);
        assert_eq!(
            scanner.rescan_slash_as_regex(),
            SyntaxKind::RegularExpressionLiteral
        );
        assert_eq!(scanner.token_value(), "/ab[/]c/gi");
        assert_eq!(scanner.next_token(), SyntaxKind::EndOfFileToken);
    }

    #[test]
    fn comments_attach_by_line_position() {
        let mut scanner = ScannerState::new("a // trailing\n// leading\nb");
        scanner.next_token(); // a
        scanner.next_token(); // b
        let trailing = scanner.take_trailing_comments();
        let leading = scanner.take_leading_comments();
        assert_eq!(trailing.len(), 1);
        assert_eq!(leading.len(), 1);
        let comments = scanner.take_comments();
        assert_eq!(comments[trailing[0].0 as usize].text, " trailing");
        assert_eq!(comments[leading[0].0 as usize].text, " leading");
    }

    #[test]
    fn lookahead_restore_discards_accumulated_state() {
        let mut scanner = ScannerState::new("a /* c */ \"x");
        scanner.next_token();
        let checkpoint = scanner.save_state();
        scanner.next_token(); // string, records comment + diagnostic
        assert_eq!(scanner.diagnostics().len(), 1);
        scanner.restore_state(checkpoint);
        assert_eq!(scanner.diagnostics().len(), 0);
        assert_eq!(scanner.token(), SyntaxKind::Identifier);
    }

    #[test]
    fn jsx_text_stops_at_angle_and_brace() {
        let mut scanner = ScannerState::new("hello {x}</");
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::JsxText);
        assert_eq!(scanner.token_value(), "hello ");
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::OpenBraceToken);
        scanner.next_token(); // x
        scanner.next_token(); // }
        assert_eq!(scanner.scan_jsx_token(), SyntaxKind::LessThanSlashToken);
    }

    #[test]
    fn unicode_identifiers() {
        let mut scanner = ScannerState::new("préfixe");
        assert_eq!(scanner.next_token(), SyntaxKind::Identifier);
        assert_eq!(scanner.token_value(), "préfixe");
    }
}
