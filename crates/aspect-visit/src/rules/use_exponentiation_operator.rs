//! `useExponentiationOperator`: `Math.pow(x, y)` reads better as `x ** y`.

use aspect_parser::{NodeData, NodeIndex, SyntaxKind};

use crate::context::CompilerContext;
use crate::visitor::{VisitSignal, Visitor};

const RULE: &str = "js/useExponentiationOperator";

pub struct UseExponentiationOperator;

impl Visitor for UseExponentiationOperator {
    fn name(&self) -> &'static str {
        RULE
    }

    fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        let Some(NodeData::CallExpression {
            callee,
            arguments,
            optional: false,
        }) = ctx.arena.get(node).map(|n| &n.data)
        else {
            return VisitSignal::Retain;
        };
        if !is_math_pow(ctx, *callee) {
            return VisitSignal::Retain;
        }
        // Exactly two plain arguments; spreads change arity at runtime.
        if arguments.len() != 2
            || arguments.iter().any(|arg| {
                matches!(
                    ctx.arena.get(*arg).map(|n| &n.data),
                    Some(NodeData::SpreadElement { .. })
                )
            })
        {
            return VisitSignal::Retain;
        }
        let (base, exponent) = (arguments[0], arguments[1]);

        if ctx.is_suppressed(&CompilerContext::lint_category(RULE)) {
            return VisitSignal::Retain;
        }
        ctx.report_fixable(RULE, node, "use the exponentiation operator instead of `Math.pow`");

        let span = ctx.arena.span(node);
        VisitSignal::Replace(ctx.arena.add(
            NodeData::BinaryExpression {
                operator: SyntaxKind::AsteriskAsteriskToken,
                left: base,
                right: exponent,
            },
            span,
        ))
    }
}

fn is_math_pow(ctx: &CompilerContext, callee: NodeIndex) -> bool {
    let Some(NodeData::MemberExpression {
        object,
        property,
        optional: false,
    }) = ctx.arena.get(callee).map(|n| &n.data)
    else {
        return false;
    };
    let object_is_math = ctx
        .arena
        .get(*object)
        .and_then(|n| n.identifier_name())
        .is_some_and(|name| name == "Math");
    let property_is_pow = ctx
        .arena
        .get(*property)
        .and_then(|n| n.identifier_name())
        .is_some_and(|name| name == "pow");
    object_is_math && property_is_pow
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::run_visitors;
    use aspect_parser::{Parse, ParseOptions, parse};

    fn run(source: &str) -> Parse {
        let mut parsed = parse(source, "test.js", ParseOptions::default());
        run_visitors(&mut parsed, &mut [Box::new(UseExponentiationOperator)]);
        parsed
    }

    fn first_expression(parsed: &Parse) -> &NodeData {
        let NodeData::SourceFile { statements } = &parsed.arena.get(parsed.root).unwrap().data
        else {
            unreachable!()
        };
        let NodeData::ExpressionStatement { expression } =
            &parsed.arena.get(statements[0]).unwrap().data
        else {
            panic!("expected an expression statement");
        };
        &parsed.arena.get(*expression).unwrap().data
    }

    #[test]
    fn math_pow_becomes_the_operator() {
        let parsed = run("Math.pow(a, b + 1);");
        let NodeData::BinaryExpression {
            operator: SyntaxKind::AsteriskAsteriskToken,
            left,
            right,
        } = first_expression(&parsed)
        else {
            panic!("expected an exponentiation, got {:?}", first_expression(&parsed));
        };
        assert_eq!(parsed.arena.get(*left).unwrap().identifier_name(), Some("a"));
        assert!(matches!(
            parsed.arena.get(*right).unwrap().data,
            NodeData::BinaryExpression { .. }
        ));
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(
            parsed.diagnostics[0].category,
            "lint/js/useExponentiationOperator"
        );
    }

    #[test]
    fn wrong_arity_is_left_alone() {
        for source in ["Math.pow(a);", "Math.pow(a, b, c);", "Math.pow(...args);"] {
            let parsed = run(source);
            assert!(parsed.diagnostics.is_empty(), "{source}");
            assert!(matches!(
                first_expression(&parsed),
                NodeData::CallExpression { .. }
            ));
        }
    }

    #[test]
    fn other_math_members_are_left_alone() {
        let parsed = run("Math.max(a, b); other.pow(a, b);");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn nested_calls_rewrite_inside_out() {
        let parsed = run("Math.pow(Math.pow(a, b), c);");
        let NodeData::BinaryExpression { left, .. } = first_expression(&parsed) else {
            panic!("expected an exponentiation");
        };
        assert!(matches!(
            parsed.arena.get(*left).unwrap().data,
            NodeData::BinaryExpression {
                operator: SyntaxKind::AsteriskAsteriskToken,
                ..
            }
        ));
        assert_eq!(parsed.diagnostics.len(), 2);
    }
}
