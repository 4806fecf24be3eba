//! `noDuplicateCase`: two `case` labels with the same literal test. The
//! second one is dead; only the first clause can match.

use aspect_parser::{NodeData, NodeIndex, SyntaxKind};
use rustc_hash::FxHashMap;

use crate::context::CompilerContext;
use crate::visitor::{VisitSignal, Visitor};

const RULE: &str = "noDuplicateCase";

pub struct NoDuplicateCase;

impl Visitor for NoDuplicateCase {
    fn name(&self) -> &'static str {
        RULE
    }

    fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        let Some(NodeData::SwitchStatement { cases, .. }) = ctx.arena.get(node).map(|n| &n.data)
        else {
            return VisitSignal::Retain;
        };

        let mut seen: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut duplicates = Vec::new();
        for case in cases {
            let Some(NodeData::CaseClause { test, .. }) = ctx.arena.get(*case).map(|n| &n.data)
            else {
                continue;
            };
            let Some(key) = case_key(ctx, *test) else {
                continue;
            };
            match seen.get(&key) {
                Some(_) => duplicates.push((*test, key.clone())),
                None => {
                    seen.insert(key, *test);
                }
            }
        }

        for (test, key) in duplicates {
            ctx.report_node(
                RULE,
                test,
                format!("duplicate case label: an earlier clause already tests {key}"),
            );
        }
        VisitSignal::Retain
    }
}

/// A comparison key for literal case tests. Non-literal tests (identifiers,
/// calls) are skipped: their values are not known statically.
fn case_key(ctx: &CompilerContext, test: NodeIndex) -> Option<String> {
    match &ctx.arena.get(test)?.data {
        NodeData::NumericLiteral { text } => Some(format!("`{text}`")),
        NodeData::StringLiteral { value } => Some(format!("\"{value}\"")),
        NodeData::BooleanLiteral { value } => Some(format!("`{value}`")),
        NodeData::NullLiteral => Some("`null`".to_string()),
        NodeData::UnaryExpression {
            operator: SyntaxKind::MinusToken,
            argument,
        } => match &ctx.arena.get(*argument)?.data {
            NodeData::NumericLiteral { text } => Some(format!("`-{text}`")),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::run_visitors;
    use aspect_parser::{Parse, ParseOptions, parse};

    fn run(source: &str) -> Parse {
        let mut parsed = parse(source, "test.js", ParseOptions::default());
        run_visitors(&mut parsed, &mut [Box::new(NoDuplicateCase)]);
        parsed
    }

    #[test]
    fn duplicate_literals_are_reported_once_per_repeat() {
        let parsed = run(
            "switch (x) { case 1: break; case 2: break; case 1: break; case 1: break; }",
        );
        let findings: Vec<_> = parsed
            .diagnostics
            .iter()
            .filter(|d| d.category == "lint/noDuplicateCase")
            .collect();
        assert_eq!(findings.len(), 2);
        assert!(findings[0].message.contains("`1`"));
    }

    #[test]
    fn strings_and_numbers_do_not_collide() {
        let parsed = run("switch (x) { case 1: break; case \"1\": break; }");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn negative_numbers_compare_by_value_text() {
        let parsed = run("switch (x) { case -1: break; case -1: break; }");
        assert_eq!(parsed.diagnostics.len(), 1);
    }

    #[test]
    fn non_literal_tests_are_skipped() {
        let parsed = run("switch (x) { case a: break; case a: break; case f(): break; }");
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn default_clause_is_not_a_case_label() {
        let parsed = run("switch (x) { default: break; case 1: break; }");
        assert!(parsed.diagnostics.is_empty());
    }
}
