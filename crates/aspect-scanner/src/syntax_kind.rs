//! Token kinds and classification helpers.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Every token the scanner can produce.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum SyntaxKind {
    Unknown = 0,
    EndOfFileToken,

    // Literals
    Identifier,
    NumericLiteral,
    StringLiteral,
    RegularExpressionLiteral,
    NoSubstitutionTemplateLiteral,
    TemplateHead,
    TemplateMiddle,
    TemplateTail,
    JsxText,

    // Punctuation
    OpenBraceToken,
    CloseBraceToken,
    OpenParenToken,
    CloseParenToken,
    OpenBracketToken,
    CloseBracketToken,
    DotToken,
    DotDotDotToken,
    SemicolonToken,
    CommaToken,
    QuestionDotToken,
    LessThanToken,
    LessThanSlashToken,
    GreaterThanToken,
    LessThanEqualsToken,
    GreaterThanEqualsToken,
    EqualsEqualsToken,
    ExclamationEqualsToken,
    EqualsEqualsEqualsToken,
    ExclamationEqualsEqualsToken,
    EqualsGreaterThanToken,
    PlusToken,
    MinusToken,
    AsteriskToken,
    AsteriskAsteriskToken,
    SlashToken,
    PercentToken,
    PlusPlusToken,
    MinusMinusToken,
    LessThanLessThanToken,
    GreaterThanGreaterThanToken,
    GreaterThanGreaterThanGreaterThanToken,
    AmpersandToken,
    BarToken,
    CaretToken,
    ExclamationToken,
    TildeToken,
    AmpersandAmpersandToken,
    BarBarToken,
    QuestionQuestionToken,
    QuestionToken,
    ColonToken,
    AtToken,

    // Assignment operators
    EqualsToken,
    PlusEqualsToken,
    MinusEqualsToken,
    AsteriskEqualsToken,
    AsteriskAsteriskEqualsToken,
    SlashEqualsToken,
    PercentEqualsToken,
    LessThanLessThanEqualsToken,
    GreaterThanGreaterThanEqualsToken,
    GreaterThanGreaterThanGreaterThanEqualsToken,
    AmpersandEqualsToken,
    BarEqualsToken,
    CaretEqualsToken,
    AmpersandAmpersandEqualsToken,
    BarBarEqualsToken,
    QuestionQuestionEqualsToken,

    // Reserved words
    BreakKeyword,
    CaseKeyword,
    CatchKeyword,
    ClassKeyword,
    ConstKeyword,
    ContinueKeyword,
    DebuggerKeyword,
    DefaultKeyword,
    DeleteKeyword,
    DoKeyword,
    ElseKeyword,
    ExportKeyword,
    ExtendsKeyword,
    FalseKeyword,
    FinallyKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    ImportKeyword,
    InKeyword,
    InstanceOfKeyword,
    NewKeyword,
    NullKeyword,
    ReturnKeyword,
    SuperKeyword,
    SwitchKeyword,
    ThisKeyword,
    ThrowKeyword,
    TrueKeyword,
    TryKeyword,
    TypeOfKeyword,
    VarKeyword,
    VoidKeyword,
    WhileKeyword,
    WithKeyword,

    // Contextual keywords
    LetKeyword,
    StaticKeyword,
    AsyncKeyword,
    AwaitKeyword,
    YieldKeyword,
    OfKeyword,
    GetKeyword,
    SetKeyword,
    AsKeyword,
    FromKeyword,
}

static KEYWORDS: Lazy<FxHashMap<&'static str, SyntaxKind>> = Lazy::new(|| {
    use SyntaxKind::*;
    let entries: &[(&str, SyntaxKind)] = &[
        ("break", BreakKeyword),
        ("case", CaseKeyword),
        ("catch", CatchKeyword),
        ("class", ClassKeyword),
        ("const", ConstKeyword),
        ("continue", ContinueKeyword),
        ("debugger", DebuggerKeyword),
        ("default", DefaultKeyword),
        ("delete", DeleteKeyword),
        ("do", DoKeyword),
        ("else", ElseKeyword),
        ("export", ExportKeyword),
        ("extends", ExtendsKeyword),
        ("false", FalseKeyword),
        ("finally", FinallyKeyword),
        ("for", ForKeyword),
        ("function", FunctionKeyword),
        ("if", IfKeyword),
        ("import", ImportKeyword),
        ("in", InKeyword),
        ("instanceof", InstanceOfKeyword),
        ("new", NewKeyword),
        ("null", NullKeyword),
        ("return", ReturnKeyword),
        ("super", SuperKeyword),
        ("switch", SwitchKeyword),
        ("this", ThisKeyword),
        ("throw", ThrowKeyword),
        ("true", TrueKeyword),
        ("try", TryKeyword),
        ("typeof", TypeOfKeyword),
        ("var", VarKeyword),
        ("void", VoidKeyword),
        ("while", WhileKeyword),
        ("with", WithKeyword),
        ("let", LetKeyword),
        ("static", StaticKeyword),
        ("async", AsyncKeyword),
        ("await", AwaitKeyword),
        ("yield", YieldKeyword),
        ("of", OfKeyword),
        ("get", GetKeyword),
        ("set", SetKeyword),
        ("as", AsKeyword),
        ("from", FromKeyword),
    ];
    entries.iter().copied().collect()
});

/// Map an identifier's text to its keyword kind, if it is one.
pub fn keyword_kind(text: &str) -> Option<SyntaxKind> {
    KEYWORDS.get(text).copied()
}

impl SyntaxKind {
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::BreakKeyword as u16)
    }

    /// Contextual keywords may be used as plain identifiers.
    pub fn is_contextual_keyword(self) -> bool {
        (self as u16) >= (SyntaxKind::LetKeyword as u16)
    }

    pub fn is_assignment_operator(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            EqualsToken
                | PlusEqualsToken
                | MinusEqualsToken
                | AsteriskEqualsToken
                | AsteriskAsteriskEqualsToken
                | SlashEqualsToken
                | PercentEqualsToken
                | LessThanLessThanEqualsToken
                | GreaterThanGreaterThanEqualsToken
                | GreaterThanGreaterThanGreaterThanEqualsToken
                | AmpersandEqualsToken
                | BarEqualsToken
                | CaretEqualsToken
                | AmpersandAmpersandEqualsToken
                | BarBarEqualsToken
                | QuestionQuestionEqualsToken
        )
    }

    /// Short-circuiting compound assignments (`&&=`, `||=`, `??=`).
    pub fn is_logical_assignment_operator(self) -> bool {
        use SyntaxKind::*;
        matches!(
            self,
            AmpersandAmpersandEqualsToken | BarBarEqualsToken | QuestionQuestionEqualsToken
        )
    }

    /// The source text of a fixed-spelling token, or `None` for tokens whose
    /// text is carried in the token value (identifiers, literals).
    pub fn text(self) -> Option<&'static str> {
        use SyntaxKind::*;
        let text = match self {
            OpenBraceToken => "{",
            CloseBraceToken => "}",
            OpenParenToken => "(",
            CloseParenToken => ")",
            OpenBracketToken => "[",
            CloseBracketToken => "]",
            DotToken => ".",
            DotDotDotToken => "...",
            SemicolonToken => ";",
            CommaToken => ",",
            QuestionDotToken => "?.",
            LessThanToken => "<",
            LessThanSlashToken => "</",
            GreaterThanToken => ">",
            LessThanEqualsToken => "<=",
            GreaterThanEqualsToken => ">=",
            EqualsEqualsToken => "==",
            ExclamationEqualsToken => "!=",
            EqualsEqualsEqualsToken => "===",
            ExclamationEqualsEqualsToken => "!==",
            EqualsGreaterThanToken => "=>",
            PlusToken => "+",
            MinusToken => "-",
            AsteriskToken => "*",
            AsteriskAsteriskToken => "**",
            SlashToken => "/",
            PercentToken => "%",
            PlusPlusToken => "++",
            MinusMinusToken => "--",
            LessThanLessThanToken => "<<",
            GreaterThanGreaterThanToken => ">>",
            GreaterThanGreaterThanGreaterThanToken => ">>>",
            AmpersandToken => "&",
            BarToken => "|",
            CaretToken => "^",
            ExclamationToken => "!",
            TildeToken => "~",
            AmpersandAmpersandToken => "&&",
            BarBarToken => "||",
            QuestionQuestionToken => "??",
            QuestionToken => "?",
            ColonToken => ":",
            AtToken => "@",
            EqualsToken => "=",
            PlusEqualsToken => "+=",
            MinusEqualsToken => "-=",
            AsteriskEqualsToken => "*=",
            AsteriskAsteriskEqualsToken => "**=",
            SlashEqualsToken => "/=",
            PercentEqualsToken => "%=",
            LessThanLessThanEqualsToken => "<<=",
            GreaterThanGreaterThanEqualsToken => ">>=",
            GreaterThanGreaterThanGreaterThanEqualsToken => ">>>=",
            AmpersandEqualsToken => "&=",
            BarEqualsToken => "|=",
            CaretEqualsToken => "^=",
            AmpersandAmpersandEqualsToken => "&&=",
            BarBarEqualsToken => "||=",
            QuestionQuestionEqualsToken => "??=",
            BreakKeyword => "break",
            CaseKeyword => "case",
            CatchKeyword => "catch",
            ClassKeyword => "class",
            ConstKeyword => "const",
            ContinueKeyword => "continue",
            DebuggerKeyword => "debugger",
            DefaultKeyword => "default",
            DeleteKeyword => "delete",
            DoKeyword => "do",
            ElseKeyword => "else",
            ExportKeyword => "export",
            ExtendsKeyword => "extends",
            FalseKeyword => "false",
            FinallyKeyword => "finally",
            ForKeyword => "for",
            FunctionKeyword => "function",
            IfKeyword => "if",
            ImportKeyword => "import",
            InKeyword => "in",
            InstanceOfKeyword => "instanceof",
            NewKeyword => "new",
            NullKeyword => "null",
            ReturnKeyword => "return",
            SuperKeyword => "super",
            SwitchKeyword => "switch",
            ThisKeyword => "this",
            ThrowKeyword => "throw",
            TrueKeyword => "true",
            TryKeyword => "try",
            TypeOfKeyword => "typeof",
            VarKeyword => "var",
            VoidKeyword => "void",
            WhileKeyword => "while",
            WithKeyword => "with",
            LetKeyword => "let",
            StaticKeyword => "static",
            AsyncKeyword => "async",
            AwaitKeyword => "await",
            YieldKeyword => "yield",
            OfKeyword => "of",
            GetKeyword => "get",
            SetKeyword => "set",
            AsKeyword => "as",
            FromKeyword => "from",
            _ => return None,
        };
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_lookup() {
        assert_eq!(keyword_kind("instanceof"), Some(SyntaxKind::InstanceOfKeyword));
        assert_eq!(keyword_kind("of"), Some(SyntaxKind::OfKeyword));
        assert_eq!(keyword_kind("foo"), None);
    }

    #[test]
    fn operator_classification() {
        assert!(SyntaxKind::AmpersandAmpersandEqualsToken.is_assignment_operator());
        assert!(SyntaxKind::AmpersandAmpersandEqualsToken.is_logical_assignment_operator());
        assert!(!SyntaxKind::PlusEqualsToken.is_logical_assignment_operator());
        assert!(!SyntaxKind::EqualsEqualsToken.is_assignment_operator());
    }

    #[test]
    fn contextual_keywords_are_keywords_too() {
        assert!(SyntaxKind::LetKeyword.is_keyword());
        assert!(SyntaxKind::LetKeyword.is_contextual_keyword());
        assert!(!SyntaxKind::ReturnKeyword.is_contextual_keyword());
    }
}
