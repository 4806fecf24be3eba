//! Node kinds and per-kind payloads.
//!
//! Every node is one `NodeData` variant: a tagged union rather than a class
//! hierarchy, so traversal, rewriting, and printing can be written as
//! exhaustive matches that the compiler checks. Child fields are
//! `NodeIndex` (required), `NodeIndex::NONE` (optional absent), or
//! `NodeList` (ordered). Non-child payload (names, literal text, operator
//! kinds, flags) lives inline.

use aspect_common::comments::CommentId;
use aspect_common::span::Span;
use aspect_scanner::SyntaxKind;
use serde::{Deserialize, Serialize};

use super::arena::{NodeIndex, NodeList};

/// Discriminant tag for every node variant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    SourceFile,

    // Statements
    Block,
    EmptyStatement,
    ExpressionStatement,
    VariableStatement,
    VariableDeclaration,
    IfStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    WhileStatement,
    DoWhileStatement,
    SwitchStatement,
    CaseClause,
    TryStatement,
    CatchClause,
    ReturnStatement,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    LabeledStatement,
    DebuggerStatement,
    FunctionDeclaration,
    ClassDeclaration,
    ClassMethod,
    ClassProperty,
    ImportDeclaration,
    ImportSpecifier,
    ExportNamedDeclaration,
    ExportSpecifier,
    ExportDefaultDeclaration,
    BogusStatement,

    // Expressions
    Identifier,
    NumericLiteral,
    StringLiteral,
    BooleanLiteral,
    NullLiteral,
    RegexLiteral,
    TemplateLiteral,
    TemplateElement,
    TaggedTemplateExpression,
    ThisExpression,
    SuperExpression,
    ArrayLiteral,
    Elision,
    ObjectLiteral,
    PropertyAssignment,
    ShorthandProperty,
    ObjectMethod,
    SpreadElement,
    FunctionExpression,
    ArrowFunction,
    ClassExpression,
    BinaryExpression,
    AssignmentExpression,
    ConditionalExpression,
    UnaryExpression,
    UpdateExpression,
    MemberExpression,
    ComputedMemberExpression,
    CallExpression,
    NewExpression,
    SequenceExpression,
    YieldExpression,
    AwaitExpression,
    BogusExpression,

    // Patterns
    ArrayPattern,
    ObjectPattern,
    PropertyPattern,
    ShorthandPropertyPattern,
    RestElement,
    AssignmentPattern,

    // JSX
    JsxElement,
    JsxFragment,
    JsxAttribute,
    JsxSpreadAttribute,
    JsxExpression,
    JsxText,
    JsxName,

    // CSS
    CssStylesheet,
    CssRule,
    CssAtRule,
    CssSelector,
    CssDeclaration,
}

/// `var` / `let` / `const`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclKind {
    Var,
    Let,
    Const,
}

impl DeclKind {
    pub fn text(self) -> &'static str {
        match self {
            DeclKind::Var => "var",
            DeclKind::Let => "let",
            DeclKind::Const => "const",
        }
    }
}

/// Role of a method-shaped member.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodKind {
    Method,
    Get,
    Set,
    Constructor,
}

/// The payload of one syntax tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeData {
    SourceFile {
        statements: NodeList,
    },

    // =====================================================================
    // Statements
    // =====================================================================
    Block {
        statements: NodeList,
    },
    EmptyStatement,
    ExpressionStatement {
        expression: NodeIndex,
    },
    VariableStatement {
        decl_kind: DeclKind,
        declarations: NodeList,
    },
    VariableDeclaration {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    IfStatement {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    ForStatement {
        initializer: NodeIndex,
        test: NodeIndex,
        update: NodeIndex,
        body: NodeIndex,
    },
    ForInStatement {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    },
    ForOfStatement {
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    },
    WhileStatement {
        test: NodeIndex,
        body: NodeIndex,
    },
    DoWhileStatement {
        body: NodeIndex,
        test: NodeIndex,
    },
    SwitchStatement {
        discriminant: NodeIndex,
        cases: NodeList,
    },
    /// `test` is NONE for `default:`.
    CaseClause {
        test: NodeIndex,
        consequent: NodeList,
    },
    TryStatement {
        block: NodeIndex,
        handler: NodeIndex,
        finalizer: NodeIndex,
    },
    /// `param` is NONE for the optional-binding form `catch {}`.
    CatchClause {
        param: NodeIndex,
        body: NodeIndex,
    },
    ReturnStatement {
        argument: NodeIndex,
    },
    BreakStatement {
        label: NodeIndex,
    },
    ContinueStatement {
        label: NodeIndex,
    },
    ThrowStatement {
        argument: NodeIndex,
    },
    LabeledStatement {
        label: NodeIndex,
        body: NodeIndex,
    },
    DebuggerStatement,
    FunctionDeclaration {
        name: NodeIndex,
        params: NodeList,
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    },
    ClassDeclaration {
        name: NodeIndex,
        extends: NodeIndex,
        members: NodeList,
    },
    ClassMethod {
        name: NodeIndex,
        computed: bool,
        method_kind: MethodKind,
        is_static: bool,
        params: NodeList,
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    },
    ClassProperty {
        name: NodeIndex,
        computed: bool,
        is_static: bool,
        value: NodeIndex,
    },
    ImportDeclaration {
        default_binding: NodeIndex,
        namespace_binding: NodeIndex,
        named: NodeList,
        source: NodeIndex,
    },
    ImportSpecifier {
        imported: NodeIndex,
        local: NodeIndex,
    },
    /// `declaration` xor `specifiers` (+ optional `source`).
    ExportNamedDeclaration {
        declaration: NodeIndex,
        specifiers: NodeList,
        source: NodeIndex,
    },
    ExportSpecifier {
        local: NodeIndex,
        exported: NodeIndex,
    },
    ExportDefaultDeclaration {
        declaration: NodeIndex,
    },
    /// Placeholder produced by error recovery so parents can complete. The
    /// span covers the skipped source text.
    BogusStatement,

    // =====================================================================
    // Expressions
    // =====================================================================
    Identifier {
        name: String,
    },
    NumericLiteral {
        text: String,
    },
    StringLiteral {
        value: String,
    },
    BooleanLiteral {
        value: bool,
    },
    NullLiteral,
    RegexLiteral {
        text: String,
    },
    TemplateLiteral {
        quasis: NodeList,
        expressions: NodeList,
    },
    TemplateElement {
        cooked: String,
        raw: String,
        tail: bool,
    },
    TaggedTemplateExpression {
        tag: NodeIndex,
        quasi: NodeIndex,
    },
    ThisExpression,
    SuperExpression,
    ArrayLiteral {
        elements: NodeList,
    },
    /// A hole in an array literal or pattern.
    Elision,
    ObjectLiteral {
        members: NodeList,
    },
    PropertyAssignment {
        name: NodeIndex,
        computed: bool,
        value: NodeIndex,
    },
    ShorthandProperty {
        name: NodeIndex,
    },
    ObjectMethod {
        name: NodeIndex,
        computed: bool,
        method_kind: MethodKind,
        params: NodeList,
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    },
    SpreadElement {
        argument: NodeIndex,
    },
    FunctionExpression {
        name: NodeIndex,
        params: NodeList,
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    },
    /// `body` is a Block or a bare expression.
    ArrowFunction {
        params: NodeList,
        body: NodeIndex,
        is_async: bool,
    },
    ClassExpression {
        name: NodeIndex,
        extends: NodeIndex,
        members: NodeList,
    },
    BinaryExpression {
        operator: SyntaxKind,
        left: NodeIndex,
        right: NodeIndex,
    },
    AssignmentExpression {
        operator: SyntaxKind,
        left: NodeIndex,
        right: NodeIndex,
    },
    ConditionalExpression {
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    },
    UnaryExpression {
        operator: SyntaxKind,
        argument: NodeIndex,
    },
    UpdateExpression {
        operator: SyntaxKind,
        argument: NodeIndex,
        prefix: bool,
    },
    /// `a.b` / `a?.b`; `property` is always an Identifier.
    MemberExpression {
        object: NodeIndex,
        property: NodeIndex,
        optional: bool,
    },
    /// `a[b]` / `a?.[b]`.
    ComputedMemberExpression {
        object: NodeIndex,
        index: NodeIndex,
        optional: bool,
    },
    /// `f(...)` / `f?.(...)`.
    CallExpression {
        callee: NodeIndex,
        arguments: NodeList,
        optional: bool,
    },
    NewExpression {
        callee: NodeIndex,
        arguments: NodeList,
    },
    SequenceExpression {
        expressions: NodeList,
    },
    YieldExpression {
        argument: NodeIndex,
        delegate: bool,
    },
    AwaitExpression {
        argument: NodeIndex,
    },
    /// Error-recovery placeholder in expression position.
    BogusExpression,

    // =====================================================================
    // Patterns
    // =====================================================================
    ArrayPattern {
        elements: NodeList,
    },
    ObjectPattern {
        properties: NodeList,
    },
    PropertyPattern {
        key: NodeIndex,
        computed: bool,
        value: NodeIndex,
    },
    /// `{ a }` / `{ a = 1 }` in a destructuring pattern.
    ShorthandPropertyPattern {
        name: NodeIndex,
        initializer: NodeIndex,
    },
    RestElement {
        argument: NodeIndex,
    },
    /// Pattern with a default: `x = 1` in parameters and destructuring.
    AssignmentPattern {
        target: NodeIndex,
        initializer: NodeIndex,
    },

    // =====================================================================
    // JSX
    // =====================================================================
    JsxElement {
        name: NodeIndex,
        attributes: NodeList,
        children: NodeList,
        self_closing: bool,
    },
    JsxFragment {
        children: NodeList,
    },
    /// `value` is NONE for bare attributes (`<input disabled>`).
    JsxAttribute {
        name: NodeIndex,
        value: NodeIndex,
    },
    JsxSpreadAttribute {
        argument: NodeIndex,
    },
    /// `{expr}` as a child or attribute value; `expression` NONE for `{}`.
    JsxExpression {
        expression: NodeIndex,
    },
    JsxText {
        value: String,
    },
    /// Element or attribute name; keeps dots and dashes verbatim
    /// (`foo.bar`, `aria-label`).
    JsxName {
        name: String,
    },

    // =====================================================================
    // CSS
    // =====================================================================
    CssStylesheet {
        items: NodeList,
    },
    CssRule {
        selectors: NodeList,
        declarations: NodeList,
    },
    CssAtRule {
        name: String,
        prelude: String,
        body: NodeList,
        has_block: bool,
    },
    CssSelector {
        text: String,
    },
    CssDeclaration {
        property: String,
        value: String,
        important: bool,
    },
}

impl NodeData {
    /// The discriminant tag of this payload.
    pub fn kind(&self) -> NodeKind {
        use NodeData as D;
        use NodeKind as K;
        match self {
            D::SourceFile { .. } => K::SourceFile,
            D::Block { .. } => K::Block,
            D::EmptyStatement => K::EmptyStatement,
            D::ExpressionStatement { .. } => K::ExpressionStatement,
            D::VariableStatement { .. } => K::VariableStatement,
            D::VariableDeclaration { .. } => K::VariableDeclaration,
            D::IfStatement { .. } => K::IfStatement,
            D::ForStatement { .. } => K::ForStatement,
            D::ForInStatement { .. } => K::ForInStatement,
            D::ForOfStatement { .. } => K::ForOfStatement,
            D::WhileStatement { .. } => K::WhileStatement,
            D::DoWhileStatement { .. } => K::DoWhileStatement,
            D::SwitchStatement { .. } => K::SwitchStatement,
            D::CaseClause { .. } => K::CaseClause,
            D::TryStatement { .. } => K::TryStatement,
            D::CatchClause { .. } => K::CatchClause,
            D::ReturnStatement { .. } => K::ReturnStatement,
            D::BreakStatement { .. } => K::BreakStatement,
            D::ContinueStatement { .. } => K::ContinueStatement,
            D::ThrowStatement { .. } => K::ThrowStatement,
            D::LabeledStatement { .. } => K::LabeledStatement,
            D::DebuggerStatement => K::DebuggerStatement,
            D::FunctionDeclaration { .. } => K::FunctionDeclaration,
            D::ClassDeclaration { .. } => K::ClassDeclaration,
            D::ClassMethod { .. } => K::ClassMethod,
            D::ClassProperty { .. } => K::ClassProperty,
            D::ImportDeclaration { .. } => K::ImportDeclaration,
            D::ImportSpecifier { .. } => K::ImportSpecifier,
            D::ExportNamedDeclaration { .. } => K::ExportNamedDeclaration,
            D::ExportSpecifier { .. } => K::ExportSpecifier,
            D::ExportDefaultDeclaration { .. } => K::ExportDefaultDeclaration,
            D::BogusStatement => K::BogusStatement,
            D::Identifier { .. } => K::Identifier,
            D::NumericLiteral { .. } => K::NumericLiteral,
            D::StringLiteral { .. } => K::StringLiteral,
            D::BooleanLiteral { .. } => K::BooleanLiteral,
            D::NullLiteral => K::NullLiteral,
            D::RegexLiteral { .. } => K::RegexLiteral,
            D::TemplateLiteral { .. } => K::TemplateLiteral,
            D::TemplateElement { .. } => K::TemplateElement,
            D::TaggedTemplateExpression { .. } => K::TaggedTemplateExpression,
            D::ThisExpression => K::ThisExpression,
            D::SuperExpression => K::SuperExpression,
            D::ArrayLiteral { .. } => K::ArrayLiteral,
            D::Elision => K::Elision,
            D::ObjectLiteral { .. } => K::ObjectLiteral,
            D::PropertyAssignment { .. } => K::PropertyAssignment,
            D::ShorthandProperty { .. } => K::ShorthandProperty,
            D::ObjectMethod { .. } => K::ObjectMethod,
            D::SpreadElement { .. } => K::SpreadElement,
            D::FunctionExpression { .. } => K::FunctionExpression,
            D::ArrowFunction { .. } => K::ArrowFunction,
            D::ClassExpression { .. } => K::ClassExpression,
            D::BinaryExpression { .. } => K::BinaryExpression,
            D::AssignmentExpression { .. } => K::AssignmentExpression,
            D::ConditionalExpression { .. } => K::ConditionalExpression,
            D::UnaryExpression { .. } => K::UnaryExpression,
            D::UpdateExpression { .. } => K::UpdateExpression,
            D::MemberExpression { .. } => K::MemberExpression,
            D::ComputedMemberExpression { .. } => K::ComputedMemberExpression,
            D::CallExpression { .. } => K::CallExpression,
            D::NewExpression { .. } => K::NewExpression,
            D::SequenceExpression { .. } => K::SequenceExpression,
            D::YieldExpression { .. } => K::YieldExpression,
            D::AwaitExpression { .. } => K::AwaitExpression,
            D::BogusExpression => K::BogusExpression,
            D::ArrayPattern { .. } => K::ArrayPattern,
            D::ObjectPattern { .. } => K::ObjectPattern,
            D::PropertyPattern { .. } => K::PropertyPattern,
            D::ShorthandPropertyPattern { .. } => K::ShorthandPropertyPattern,
            D::RestElement { .. } => K::RestElement,
            D::AssignmentPattern { .. } => K::AssignmentPattern,
            D::JsxElement { .. } => K::JsxElement,
            D::JsxFragment { .. } => K::JsxFragment,
            D::JsxAttribute { .. } => K::JsxAttribute,
            D::JsxSpreadAttribute { .. } => K::JsxSpreadAttribute,
            D::JsxExpression { .. } => K::JsxExpression,
            D::JsxText { .. } => K::JsxText,
            D::JsxName { .. } => K::JsxName,
            D::CssStylesheet { .. } => K::CssStylesheet,
            D::CssRule { .. } => K::CssRule,
            D::CssAtRule { .. } => K::CssAtRule,
            D::CssSelector { .. } => K::CssSelector,
            D::CssDeclaration { .. } => K::CssDeclaration,
        }
    }
}

/// One allocated node: tag, span, comment references, payload.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub leading_comments: Vec<CommentId>,
    pub trailing_comments: Vec<CommentId>,
    pub data: NodeData,
}

impl Node {
    pub fn is_statement(&self) -> bool {
        use NodeKind::*;
        matches!(
            self.kind,
            Block
                | EmptyStatement
                | ExpressionStatement
                | VariableStatement
                | IfStatement
                | ForStatement
                | ForInStatement
                | ForOfStatement
                | WhileStatement
                | DoWhileStatement
                | SwitchStatement
                | TryStatement
                | ReturnStatement
                | BreakStatement
                | ContinueStatement
                | ThrowStatement
                | LabeledStatement
                | DebuggerStatement
                | FunctionDeclaration
                | ClassDeclaration
                | ImportDeclaration
                | ExportNamedDeclaration
                | ExportDefaultDeclaration
                | BogusStatement
        )
    }

    /// Identifier text, if this node is an identifier.
    pub fn identifier_name(&self) -> Option<&str> {
        match &self.data {
            NodeData::Identifier { name } => Some(name),
            _ => None,
        }
    }
}
