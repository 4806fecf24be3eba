//! `useOptionalChain`: `a && a.b` reads better as `a?.b`.
//!
//! Fires on logical-and chains whose right side extends the left side's
//! member path, and rewrites them to optional chains. Runs on exit so that
//! nested chains fold bottom-up: `a && a.b && a.b.c` first becomes
//! `a?.b && a.b.c`, then `a?.b?.c`.

use aspect_parser::{NodeData, NodeIndex, SyntaxKind};

use crate::context::CompilerContext;
use crate::visitor::{VisitSignal, Visitor};

const RULE: &str = "js/useOptionalChain";

pub struct UseOptionalChain;

impl Visitor for UseOptionalChain {
    fn name(&self) -> &'static str {
        RULE
    }

    fn exit(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        let Some(NodeData::BinaryExpression {
            operator: SyntaxKind::AmpersandAmpersandToken,
            left,
            right,
        }) = ctx.arena.get(node).map(|n| &n.data)
        else {
            return VisitSignal::Retain;
        };
        let (left, right) = (*left, *right);

        let Some(left_path) = member_path(ctx, left) else {
            return VisitSignal::Retain;
        };
        let Some(right_path) = member_path(ctx, right) else {
            return VisitSignal::Retain;
        };
        if right_path.len() <= left_path.len() || !right_path.starts_with(&left_path) {
            return VisitSignal::Retain;
        }

        if ctx.is_suppressed(&CompilerContext::lint_category(RULE)) {
            return VisitSignal::Retain;
        }
        ctx.report_fixable(RULE, node, "change to an optional chain");

        // Graft the left expression in as the base of the right chain, so
        // optionality already folded into the left side survives.
        let (replacement, _) = graft(ctx, right, left, left_path.len());
        VisitSignal::Replace(replacement)
    }
}

/// The dotted path of a plain member chain (`a.b.c` is `["a", "b", "c"]`),
/// disregarding the accesses' own optionality. Computed members, calls, and
/// non-identifier bases disqualify the chain.
fn member_path(ctx: &CompilerContext, index: NodeIndex) -> Option<Vec<String>> {
    match &ctx.arena.get(index)?.data {
        NodeData::Identifier { name } => Some(vec![name.clone()]),
        NodeData::MemberExpression {
            object, property, ..
        } => {
            let mut path = member_path(ctx, *object)?;
            let property = ctx.arena.get(*property)?.identifier_name()?;
            path.push(property.to_string());
            Some(path)
        }
        _ => None,
    }
}

/// Rebuild the member chain at `index`, substituting `base` for the prefix
/// of `junction` path segments and making the access that leaves the prefix
/// optional. Answers the new index and the chain depth at that point.
fn graft(
    ctx: &mut CompilerContext,
    index: NodeIndex,
    base: NodeIndex,
    junction: usize,
) -> (NodeIndex, usize) {
    let Some(node) = ctx.arena.get(index).cloned() else {
        return (index, 0);
    };
    match node.data {
        NodeData::Identifier { .. } => {
            if junction == 1 {
                (base, 1)
            } else {
                (index, 1)
            }
        }
        NodeData::MemberExpression {
            object,
            property,
            optional,
        } => {
            let (new_object, depth) = graft(ctx, object, base, junction);
            if depth + 1 == junction {
                // This whole sub-chain is the shared prefix.
                return (base, junction);
            }
            let optional = optional || depth == junction;
            let idx = ctx.arena.add_with_comments(
                NodeData::MemberExpression {
                    object: new_object,
                    property,
                    optional,
                },
                node.span,
                node.leading_comments,
                node.trailing_comments,
            );
            (idx, depth + 1)
        }
        _ => (index, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::run_visitors;
    use aspect_parser::{Parse, ParseOptions, parse};

    fn run(source: &str) -> Parse {
        let mut parsed = parse(source, "test.js", ParseOptions::default());
        run_visitors(&mut parsed, &mut [Box::new(UseOptionalChain)]);
        parsed
    }

    fn root_expression(parsed: &Parse) -> NodeIndex {
        let NodeData::SourceFile { statements } = &parsed.arena.get(parsed.root).unwrap().data
        else {
            unreachable!()
        };
        let NodeData::ExpressionStatement { expression } =
            &parsed.arena.get(statements[0]).unwrap().data
        else {
            panic!("expected an expression statement");
        };
        *expression
    }

    fn chain_string(parsed: &Parse, index: NodeIndex) -> String {
        match &parsed.arena.get(index).unwrap().data {
            NodeData::Identifier { name } => name.clone(),
            NodeData::MemberExpression {
                object,
                property,
                optional,
            } => {
                let sep = if *optional { "?." } else { "." };
                let prop = parsed.arena.get(*property).unwrap().identifier_name().unwrap();
                format!("{}{sep}{prop}", chain_string(parsed, *object))
            }
            other => format!("<{other:?}>"),
        }
    }

    #[test]
    fn simple_guard_becomes_a_chain() {
        let parsed = run("a && a.b;");
        assert_eq!(chain_string(&parsed, root_expression(&parsed)), "a?.b");
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].category, "lint/js/useOptionalChain");
    }

    #[test]
    fn cascaded_guards_fold_into_one_chain() {
        let parsed = run("a && a.b && a.b.c;");
        assert_eq!(chain_string(&parsed, root_expression(&parsed)), "a?.b?.c");
        assert_eq!(parsed.diagnostics.len(), 2);
    }

    #[test]
    fn longer_extension_keeps_inner_dots() {
        let parsed = run("a.b && a.b.c.d;");
        assert_eq!(chain_string(&parsed, root_expression(&parsed)), "a.b?.c.d");
    }

    #[test]
    fn unrelated_operands_are_left_alone() {
        let parsed = run("a && b.c;");
        assert!(parsed.diagnostics.is_empty());
        assert!(matches!(
            parsed.arena.get(root_expression(&parsed)).unwrap().data,
            NodeData::BinaryExpression { .. }
        ));
    }

    #[test]
    fn computed_members_disqualify_the_chain() {
        let parsed = run("a[k] && a[k].b;");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn suppression_keeps_the_original_tree() {
        let parsed = run("// aspect-ignore lint/js/useOptionalChain\na && a.b;");
        assert!(parsed.diagnostics.is_empty());
        assert!(matches!(
            parsed.arena.get(root_expression(&parsed)).unwrap().data,
            NodeData::BinaryExpression { .. }
        ));
    }
}
