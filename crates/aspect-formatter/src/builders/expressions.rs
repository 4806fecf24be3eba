//! Builders for expressions and binding patterns.
//!
//! Parenthesization is decided here from the shared precedence table: a
//! child whose precedence is below what its position requires gets literal
//! parens. A handful of constructs need parens the numbers alone do not
//! capture (`||`/`&&` under `??`, a unary operand of `**`, `new` over a
//! call, literals that would be misread) and are special-cased.

use aspect_parser::syntax::precedence::{
    Assoc, binary_associativity, binary_precedence, PRECEDENCE_ASSIGNMENT,
    PRECEDENCE_CONDITIONAL, PRECEDENCE_MEMBER, PRECEDENCE_POSTFIX, PRECEDENCE_SEQUENCE,
    PRECEDENCE_UNARY,
};
use aspect_parser::{NodeData, NodeIndex, SyntaxKind};

use super::DocBuilder;
use crate::doc::{Doc, concat, group, indent, join, text};

/// Primary expressions sit above every operator.
const PRECEDENCE_PRIMARY: u8 = PRECEDENCE_MEMBER + 1;

impl DocBuilder<'_> {
    /// Render an expression, wrapping it in parens when its precedence is
    /// below what the surrounding position requires.
    pub(crate) fn expression(&self, index: NodeIndex, min_precedence: u8) -> Doc {
        let doc = self.node(index);
        if self.precedence_of(index) < min_precedence {
            concat(vec![text("("), doc, text(")")])
        } else {
            doc
        }
    }

    fn precedence_of(&self, index: NodeIndex) -> u8 {
        let Some(node) = self.arena.get(index) else {
            return PRECEDENCE_PRIMARY;
        };
        match &node.data {
            NodeData::SequenceExpression { .. } => PRECEDENCE_SEQUENCE,
            NodeData::AssignmentExpression { .. }
            | NodeData::ArrowFunction { .. }
            | NodeData::YieldExpression { .. } => PRECEDENCE_ASSIGNMENT,
            NodeData::ConditionalExpression { .. } => PRECEDENCE_CONDITIONAL,
            NodeData::BinaryExpression { operator, .. } => {
                binary_precedence(*operator).unwrap_or(PRECEDENCE_PRIMARY)
            }
            NodeData::UnaryExpression { .. } | NodeData::AwaitExpression { .. } => PRECEDENCE_UNARY,
            NodeData::UpdateExpression { prefix, .. } => {
                if *prefix {
                    PRECEDENCE_UNARY
                } else {
                    PRECEDENCE_POSTFIX
                }
            }
            NodeData::MemberExpression { .. }
            | NodeData::ComputedMemberExpression { .. }
            | NodeData::CallExpression { .. }
            | NodeData::NewExpression { .. }
            | NodeData::TaggedTemplateExpression { .. } => PRECEDENCE_MEMBER,
            _ => PRECEDENCE_PRIMARY,
        }
    }

    pub(crate) fn binary_expression(
        &self,
        operator: SyntaxKind,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Doc {
        let precedence = binary_precedence(operator).unwrap_or(PRECEDENCE_SEQUENCE);
        let (left_min, right_min) = match binary_associativity(operator) {
            Assoc::Left => (precedence, precedence + 1),
            Assoc::Right => (precedence + 1, precedence),
        };

        let mut left_doc = self.expression(left, left_min);
        let mut right_doc = self.expression(right, right_min);
        // `a || b ?? c` is a syntax error: mixing `??` with `||`/`&&`
        // requires explicit parens even though `||` binds tighter.
        if operator == SyntaxKind::QuestionQuestionToken {
            if self.is_plain_logical(left) {
                left_doc = concat(vec![text("("), self.node(left), text(")")]);
            }
            if self.is_plain_logical(right) {
                right_doc = concat(vec![text("("), self.node(right), text(")")]);
            }
        }
        // `-a ** b` is likewise a syntax error; the base needs parens.
        if operator == SyntaxKind::AsteriskAsteriskToken && self.is_unary_like(left) {
            left_doc = concat(vec![text("("), self.node(left), text(")")]);
        }

        let op = operator.text().unwrap_or("");
        group(concat(vec![
            left_doc,
            text(format!(" {op}")),
            indent(concat(vec![Doc::Line, right_doc])),
        ]))
    }

    fn is_plain_logical(&self, index: NodeIndex) -> bool {
        matches!(
            self.arena.get(index).map(|n| &n.data),
            Some(NodeData::BinaryExpression {
                operator: SyntaxKind::BarBarToken | SyntaxKind::AmpersandAmpersandToken,
                ..
            })
        )
    }

    fn is_unary_like(&self, index: NodeIndex) -> bool {
        matches!(
            self.arena.get(index).map(|n| &n.data),
            Some(
                NodeData::UnaryExpression { .. }
                    | NodeData::AwaitExpression { .. }
                    | NodeData::UpdateExpression { prefix: true, .. }
            )
        )
    }

    pub(crate) fn assignment_expression(
        &self,
        operator: SyntaxKind,
        left: NodeIndex,
        right: NodeIndex,
    ) -> Doc {
        let op = operator.text().unwrap_or("=");
        group(concat(vec![
            self.expression(left, PRECEDENCE_CONDITIONAL),
            text(format!(" {op} ")),
            self.expression(right, PRECEDENCE_ASSIGNMENT),
        ]))
    }

    pub(crate) fn conditional_expression(
        &self,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) -> Doc {
        group(concat(vec![
            self.expression(test, PRECEDENCE_CONDITIONAL + 1),
            indent(concat(vec![
                Doc::Line,
                text("? "),
                self.expression(consequent, PRECEDENCE_ASSIGNMENT),
                Doc::Line,
                text(": "),
                self.expression(alternate, PRECEDENCE_ASSIGNMENT),
            ])),
        ]))
    }

    pub(crate) fn unary_expression(&self, operator: SyntaxKind, argument: NodeIndex) -> Doc {
        let op = operator.text().unwrap_or("");
        let spacer = if matches!(
            operator,
            SyntaxKind::TypeOfKeyword | SyntaxKind::VoidKeyword | SyntaxKind::DeleteKeyword
        ) {
            " "
        } else {
            ""
        };
        concat(vec![
            text(format!("{op}{spacer}")),
            self.expression(argument, PRECEDENCE_UNARY),
        ])
    }

    pub(crate) fn update_expression(
        &self,
        operator: SyntaxKind,
        argument: NodeIndex,
        prefix: bool,
    ) -> Doc {
        let op = operator.text().unwrap_or("");
        if prefix {
            concat(vec![text(op), self.expression(argument, PRECEDENCE_UNARY)])
        } else {
            concat(vec![
                self.expression(argument, PRECEDENCE_POSTFIX),
                text(op),
            ])
        }
    }

    pub(crate) fn await_expression(&self, argument: NodeIndex) -> Doc {
        concat(vec![
            text("await "),
            self.expression(argument, PRECEDENCE_UNARY),
        ])
    }

    pub(crate) fn yield_expression(&self, argument: NodeIndex, delegate: bool) -> Doc {
        let keyword = if delegate { "yield*" } else { "yield" };
        if argument.is_none() {
            return text(keyword);
        }
        concat(vec![
            text(keyword),
            text(" "),
            self.expression(argument, PRECEDENCE_ASSIGNMENT),
        ])
    }

    pub(crate) fn member_expression(
        &self,
        object: NodeIndex,
        property: NodeIndex,
        optional: bool,
    ) -> Doc {
        let object_doc = if self.member_object_needs_parens(object) {
            concat(vec![text("("), self.node(object), text(")")])
        } else {
            self.expression(object, PRECEDENCE_MEMBER)
        };
        let sep = if optional { "?." } else { "." };
        concat(vec![object_doc, text(sep), self.node(property)])
    }

    fn member_object_needs_parens(&self, object: NodeIndex) -> bool {
        // `1.toString()` misparses; `(1).toString()` does not.
        matches!(
            self.arena.get(object).map(|n| &n.data),
            Some(NodeData::NumericLiteral { .. })
        )
    }

    pub(crate) fn computed_member_expression(
        &self,
        object: NodeIndex,
        key: NodeIndex,
        optional: bool,
    ) -> Doc {
        let open = if optional { "?.[" } else { "[" };
        concat(vec![
            self.expression(object, PRECEDENCE_MEMBER),
            text(open),
            self.expression(key, 0),
            text("]"),
        ])
    }

    pub(crate) fn call_expression(
        &self,
        callee: NodeIndex,
        arguments: &[NodeIndex],
        optional: bool,
    ) -> Doc {
        let mut parts = vec![self.expression(callee, PRECEDENCE_MEMBER)];
        if optional {
            parts.push(text("?."));
        }
        parts.push(self.argument_list(arguments));
        concat(parts)
    }

    pub(crate) fn new_expression(&self, callee: NodeIndex, arguments: &[NodeIndex]) -> Doc {
        // `new (f())` must keep its parens or the argument list rebinds.
        let callee_doc = if self.callee_contains_call(callee) {
            concat(vec![text("("), self.node(callee), text(")")])
        } else {
            self.expression(callee, PRECEDENCE_MEMBER)
        };
        concat(vec![text("new "), callee_doc, self.argument_list(arguments)])
    }

    fn callee_contains_call(&self, index: NodeIndex) -> bool {
        match self.arena.get(index).map(|n| &n.data) {
            Some(NodeData::CallExpression { .. }) => true,
            Some(
                NodeData::MemberExpression { object, .. }
                | NodeData::ComputedMemberExpression { object, .. },
            ) => self.callee_contains_call(*object),
            _ => false,
        }
    }

    pub(crate) fn argument_list(&self, arguments: &[NodeIndex]) -> Doc {
        self.delimited_list(
            "(",
            arguments
                .iter()
                .map(|a| self.expression(*a, PRECEDENCE_ASSIGNMENT))
                .collect(),
            ")",
        )
    }

    /// `open items... close` as one group: flat on one line, or one item per
    /// line indented.
    pub(crate) fn delimited_list(&self, open: &str, items: Vec<Doc>, close: &str) -> Doc {
        if items.is_empty() {
            return text(format!("{open}{close}"));
        }
        group(concat(vec![
            text(open),
            indent(concat(vec![
                Doc::SoftLine,
                join(concat(vec![text(","), Doc::Line]), items),
            ])),
            Doc::SoftLine,
            text(close),
        ]))
    }

    pub(crate) fn sequence_expression(&self, expressions: &[NodeIndex]) -> Doc {
        join(
            text(", "),
            expressions
                .iter()
                .map(|e| self.expression(*e, PRECEDENCE_ASSIGNMENT))
                .collect(),
        )
    }

    pub(crate) fn arrow_function(
        &self,
        params: &[NodeIndex],
        body: NodeIndex,
        is_async: bool,
    ) -> Doc {
        let mut parts = Vec::new();
        if is_async {
            parts.push(text("async "));
        }
        parts.push(self.param_list(params));
        parts.push(text(" => "));
        let body_is_object = matches!(
            self.arena.get(body).map(|n| &n.data),
            Some(NodeData::ObjectLiteral { .. })
        );
        if body_is_object {
            // An unparenthesized `{` would read as a block body.
            parts.push(concat(vec![text("("), self.node(body), text(")")]));
        } else if matches!(
            self.arena.get(body).map(|n| &n.data),
            Some(NodeData::Block { .. })
        ) {
            parts.push(self.node(body));
        } else {
            parts.push(self.expression(body, PRECEDENCE_ASSIGNMENT));
        }
        concat(parts)
    }

    /// Array literals pack with `fill`: as many elements per line as fit.
    pub(crate) fn array_literal(&self, elements: &[NodeIndex]) -> Doc {
        if elements.is_empty() {
            return text("[]");
        }
        let mut items = Vec::with_capacity(elements.len() * 2);
        for (i, element) in elements.iter().enumerate() {
            if i > 0 {
                items.push(concat(vec![text(","), Doc::Line]));
            }
            items.push(self.expression(*element, PRECEDENCE_ASSIGNMENT));
        }
        group(concat(vec![
            text("["),
            indent(concat(vec![Doc::SoftLine, Doc::Fill(items)])),
            Doc::SoftLine,
            text("]"),
        ]))
    }

    pub(crate) fn object_literal(&self, members: &[NodeIndex]) -> Doc {
        if members.is_empty() {
            return text("{}");
        }
        group(concat(vec![
            text("{"),
            indent(concat(vec![
                Doc::Line,
                join(
                    concat(vec![text(","), Doc::Line]),
                    members.iter().map(|m| self.node(*m)).collect(),
                ),
            ])),
            Doc::Line,
            text("}"),
        ]))
    }

    pub(crate) fn property_assignment(
        &self,
        name: NodeIndex,
        computed: bool,
        value: NodeIndex,
    ) -> Doc {
        concat(vec![
            self.property_name(name, computed),
            text(": "),
            self.expression(value, PRECEDENCE_ASSIGNMENT),
        ])
    }

    pub(crate) fn template_literal(
        &self,
        quasis: &[NodeIndex],
        expressions: &[NodeIndex],
    ) -> Doc {
        let mut parts = vec![text("`")];
        for (i, quasi) in quasis.iter().enumerate() {
            parts.push(self.node(*quasi));
            if let Some(expression) = expressions.get(i) {
                parts.push(text("${"));
                parts.push(self.expression(*expression, 0));
                parts.push(text("}"));
            }
        }
        parts.push(text("`"));
        concat(parts)
    }

    pub(crate) fn tagged_template(&self, tag: NodeIndex, quasi: NodeIndex) -> Doc {
        concat(vec![
            self.expression(tag, PRECEDENCE_MEMBER),
            self.node(quasi),
        ])
    }

    pub(crate) fn array_pattern(&self, elements: &[NodeIndex]) -> Doc {
        if elements.is_empty() {
            return text("[]");
        }
        // Holes print as nothing between commas.
        self.delimited_list(
            "[",
            elements.iter().map(|e| self.node(*e)).collect(),
            "]",
        )
    }

    pub(crate) fn object_pattern(&self, properties: &[NodeIndex]) -> Doc {
        if properties.is_empty() {
            return text("{}");
        }
        group(concat(vec![
            text("{"),
            indent(concat(vec![
                Doc::Line,
                join(
                    concat(vec![text(","), Doc::Line]),
                    properties.iter().map(|p| self.node(*p)).collect(),
                ),
            ])),
            Doc::Line,
            text("}"),
        ]))
    }

    pub(crate) fn property_pattern(
        &self,
        key: NodeIndex,
        computed: bool,
        value: NodeIndex,
    ) -> Doc {
        concat(vec![
            self.property_name(key, computed),
            text(": "),
            self.node(value),
        ])
    }

    pub(crate) fn shorthand_property_pattern(
        &self,
        name: NodeIndex,
        initializer: NodeIndex,
    ) -> Doc {
        if initializer.is_none() {
            return self.node(name);
        }
        concat(vec![
            self.node(name),
            text(" = "),
            self.expression(initializer, PRECEDENCE_ASSIGNMENT),
        ])
    }

    pub(crate) fn assignment_pattern(&self, target: NodeIndex, initializer: NodeIndex) -> Doc {
        concat(vec![
            self.node(target),
            text(" = "),
            self.expression(initializer, PRECEDENCE_ASSIGNMENT),
        ])
    }
}
