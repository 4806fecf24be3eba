//! Factories for synthetically constructed nodes, and shape assertions.
//!
//! Rewrite passes build replacement subtrees through these helpers; all
//! produced nodes carry `Span::SYNTHETIC` and resolve to no source location.
//! `assert_kind` is the pervasive "I know this subtree's shape from grammar
//! context" accessor: failing it is a programmer error, surfaced as an
//! internal-error diagnostic at the pipeline boundary rather than ignored.

use aspect_common::span::Span;
use aspect_scanner::SyntaxKind;
use std::fmt;

use super::arena::{NodeArena, NodeIndex, NodeList};
use super::node::{NodeData, NodeKind};

/// A structural invariant was violated: a node did not have the kind the
/// caller's grammar context guaranteed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: NodeKind,
    pub actual: Option<NodeKind>,
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.actual {
            Some(actual) => write!(f, "expected {:?} node, found {:?}", self.expected, actual),
            None => write!(f, "expected {:?} node, found a dangling index", self.expected),
        }
    }
}

impl std::error::Error for TypeMismatch {}

/// Fetch a node, checking its kind against what the caller's context
/// guarantees.
pub fn assert_kind(
    arena: &NodeArena,
    index: NodeIndex,
    expected: NodeKind,
) -> Result<&super::node::Node, TypeMismatch> {
    match arena.get(index) {
        Some(node) if node.kind == expected => Ok(node),
        Some(node) => Err(TypeMismatch {
            expected,
            actual: Some(node.kind),
        }),
        None => Err(TypeMismatch {
            expected,
            actual: None,
        }),
    }
}

pub fn ident(arena: &mut NodeArena, name: impl Into<String>) -> NodeIndex {
    arena.add(NodeData::Identifier { name: name.into() }, Span::SYNTHETIC)
}

pub fn string_lit(arena: &mut NodeArena, value: impl Into<String>) -> NodeIndex {
    arena.add(
        NodeData::StringLiteral {
            value: value.into(),
        },
        Span::SYNTHETIC,
    )
}

pub fn number_lit(arena: &mut NodeArena, text: impl Into<String>) -> NodeIndex {
    arena.add(NodeData::NumericLiteral { text: text.into() }, Span::SYNTHETIC)
}

pub fn bool_lit(arena: &mut NodeArena, value: bool) -> NodeIndex {
    arena.add(NodeData::BooleanLiteral { value }, Span::SYNTHETIC)
}

pub fn null_lit(arena: &mut NodeArena) -> NodeIndex {
    arena.add(NodeData::NullLiteral, Span::SYNTHETIC)
}

/// `object.property` / `object?.property`.
pub fn member(
    arena: &mut NodeArena,
    object: NodeIndex,
    property: impl Into<String>,
    optional: bool,
) -> NodeIndex {
    let property = ident(arena, property);
    arena.add(
        NodeData::MemberExpression {
            object,
            property,
            optional,
        },
        Span::SYNTHETIC,
    )
}

/// `object[index]` / `object?.[index]`.
pub fn computed_member(
    arena: &mut NodeArena,
    object: NodeIndex,
    index: NodeIndex,
    optional: bool,
) -> NodeIndex {
    arena.add(
        NodeData::ComputedMemberExpression {
            object,
            index,
            optional,
        },
        Span::SYNTHETIC,
    )
}

pub fn call(arena: &mut NodeArena, callee: NodeIndex, arguments: NodeList) -> NodeIndex {
    arena.add(
        NodeData::CallExpression {
            callee,
            arguments,
            optional: false,
        },
        Span::SYNTHETIC,
    )
}

pub fn binary(
    arena: &mut NodeArena,
    operator: SyntaxKind,
    left: NodeIndex,
    right: NodeIndex,
) -> NodeIndex {
    arena.add(
        NodeData::BinaryExpression {
            operator,
            left,
            right,
        },
        Span::SYNTHETIC,
    )
}

pub fn unary(arena: &mut NodeArena, operator: SyntaxKind, argument: NodeIndex) -> NodeIndex {
    arena.add(NodeData::UnaryExpression { operator, argument }, Span::SYNTHETIC)
}

pub fn expression_statement(arena: &mut NodeArena, expression: NodeIndex) -> NodeIndex {
    arena.add(NodeData::ExpressionStatement { expression }, Span::SYNTHETIC)
}

pub fn block(arena: &mut NodeArena, statements: NodeList) -> NodeIndex {
    arena.add(NodeData::Block { statements }, Span::SYNTHETIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assert_kind_reports_the_mismatch() {
        let mut arena = NodeArena::new();
        let idx = ident(&mut arena, "x");
        assert!(assert_kind(&arena, idx, NodeKind::Identifier).is_ok());

        let err = assert_kind(&arena, idx, NodeKind::CallExpression).unwrap_err();
        assert_eq!(err.expected, NodeKind::CallExpression);
        assert_eq!(err.actual, Some(NodeKind::Identifier));

        let err = assert_kind(&arena, NodeIndex::NONE, NodeKind::Identifier).unwrap_err();
        assert_eq!(err.actual, None);
    }

    #[test]
    fn factories_stamp_synthetic_spans() {
        let mut arena = NodeArena::new();
        let obj = ident(&mut arena, "foo");
        let m = member(&mut arena, obj, "bar", true);
        let node = arena.get(m).unwrap();
        assert!(node.span.is_synthetic());
        assert_eq!(node.kind, NodeKind::MemberExpression);
    }
}
