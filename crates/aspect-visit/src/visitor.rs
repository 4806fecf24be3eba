//! The rewrite engine.
//!
//! Visitors run in registration order on the way down and reverse order on
//! the way up. A replacement subtree is re-walked so later visitors (and the
//! replacing visitor itself) see it; the re-walk count per position is
//! bounded, and exceeding the bound is reported as an internal error rather
//! than looping forever.

use aspect_parser::syntax::visit_keys::{ChildChange, map_children};
use aspect_parser::{NodeIndex, Parse};
use tracing::debug;

use crate::context::CompilerContext;
use crate::scope::ScopeTree;

/// A visitor's answer for one node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum VisitSignal {
    /// Keep the node and continue.
    #[default]
    Retain,
    /// Substitute a freshly allocated node.
    Replace(NodeIndex),
    /// Splice several nodes into the parent's list slot.
    ReplaceMany(Vec<NodeIndex>),
    /// Drop the node from its parent.
    Remove,
}

pub trait Visitor {
    fn name(&self) -> &'static str;

    fn enter(&mut self, _node: NodeIndex, _ctx: &mut CompilerContext) -> VisitSignal {
        VisitSignal::Retain
    }

    fn exit(&mut self, _node: NodeIndex, _ctx: &mut CompilerContext) -> VisitSignal {
        VisitSignal::Retain
    }
}

/// How many times one tree position may be replaced before the engine gives
/// up on it. Hitting this means a visitor keeps rewriting its own output.
const MAX_REWALK: u32 = 32;

enum Outcome {
    One(NodeIndex),
    Many(Vec<NodeIndex>),
    Remove,
}

/// Run visitors over a parse result, updating its tree, comments, and
/// diagnostics in place.
pub fn run_visitors(parse: &mut Parse, visitors: &mut [Box<dyn Visitor>]) {
    let arena = std::mem::take(&mut parse.arena);
    let comments = std::mem::take(&mut parse.comments);
    let scopes = ScopeTree::build(&arena, parse.root);
    debug!(
        path = %parse.path,
        visitors = visitors.len(),
        scopes = scopes.len(),
        "running visitors"
    );
    let mut ctx = CompilerContext::new(arena, comments, scopes, parse.path.clone());

    match visit(&mut ctx, visitors, parse.root, 0) {
        Outcome::One(root) => parse.root = root,
        Outcome::Many(_) | Outcome::Remove => {
            ctx.report_internal(parse.root, "the root node cannot be removed or split");
        }
    }

    parse.arena = ctx.arena;
    parse.comments = ctx.comments;
    parse.diagnostics.append(&mut ctx.diagnostics);
}

/// Carry the replaced node's comments over to its substitute.
fn transfer_comments(
    ctx: &mut CompilerContext,
    old: NodeIndex,
    replacement: NodeIndex,
) -> NodeIndex {
    let Some(old_node) = ctx.arena.get(old) else {
        return replacement;
    };
    if old_node.leading_comments.is_empty() && old_node.trailing_comments.is_empty() {
        return replacement;
    }
    let mut leading = old_node.leading_comments.clone();
    let mut trailing = old_node.trailing_comments.clone();
    if let Some(new_node) = ctx.arena.get(replacement) {
        leading.extend_from_slice(&new_node.leading_comments);
        let mut merged_trailing = new_node.trailing_comments.clone();
        merged_trailing.append(&mut trailing);
        trailing = merged_trailing;
    }
    ctx.arena.clone_with_comments(replacement, leading, trailing)
}

fn transfer_comments_to_many(
    ctx: &mut CompilerContext,
    old: NodeIndex,
    mut nodes: Vec<NodeIndex>,
) -> Vec<NodeIndex> {
    let Some(old_node) = ctx.arena.get(old) else {
        return nodes;
    };
    let leading = old_node.leading_comments.clone();
    let trailing = old_node.trailing_comments.clone();
    if let Some(first) = nodes.first().copied()
        && !leading.is_empty()
    {
        let existing = ctx
            .arena
            .get(first)
            .map(|n| n.trailing_comments.clone())
            .unwrap_or_default();
        let mut merged = leading;
        if let Some(node) = ctx.arena.get(first) {
            merged.extend_from_slice(&node.leading_comments);
        }
        nodes[0] = ctx.arena.clone_with_comments(first, merged, existing);
    }
    if let Some(last) = nodes.last().copied()
        && !trailing.is_empty()
    {
        let existing_leading = ctx
            .arena
            .get(last)
            .map(|n| n.leading_comments.clone())
            .unwrap_or_default();
        let mut merged = ctx
            .arena
            .get(last)
            .map(|n| n.trailing_comments.clone())
            .unwrap_or_default();
        merged.extend_from_slice(&trailing);
        let slot = nodes.len() - 1;
        nodes[slot] = ctx.arena.clone_with_comments(last, existing_leading, merged);
    }
    nodes
}

fn visit(
    ctx: &mut CompilerContext,
    visitors: &mut [Box<dyn Visitor>],
    index: NodeIndex,
    rewalks: u32,
) -> Outcome {
    if index.is_none() {
        return Outcome::One(index);
    }
    if rewalks > MAX_REWALK {
        ctx.report_internal(
            index,
            "rewrite did not settle: a visitor keeps replacing its own output",
        );
        return Outcome::One(index);
    }

    let mut current = index;
    ctx.push_suppression_frame(current);

    // Enter phase, registration order.
    for i in 0..visitors.len() {
        match visitors[i].enter(current, ctx) {
            VisitSignal::Retain => {}
            VisitSignal::Replace(replacement) => {
                let replacement = transfer_comments(ctx, current, replacement);
                ctx.pop_suppression_frame();
                return visit(ctx, visitors, replacement, rewalks + 1);
            }
            VisitSignal::ReplaceMany(nodes) => {
                let nodes = transfer_comments_to_many(ctx, current, nodes);
                ctx.pop_suppression_frame();
                return visit_spliced(ctx, visitors, nodes, rewalks + 1);
            }
            VisitSignal::Remove => {
                ctx.pop_suppression_frame();
                return Outcome::Remove;
            }
        }
    }

    // Children, through the exhaustive child map.
    current = visit_children(ctx, visitors, current);

    // Exit phase, reverse order.
    for i in (0..visitors.len()).rev() {
        match visitors[i].exit(current, ctx) {
            VisitSignal::Retain => {}
            VisitSignal::Replace(replacement) => {
                let replacement = transfer_comments(ctx, current, replacement);
                ctx.pop_suppression_frame();
                return visit(ctx, visitors, replacement, rewalks + 1);
            }
            VisitSignal::ReplaceMany(nodes) => {
                let nodes = transfer_comments_to_many(ctx, current, nodes);
                ctx.pop_suppression_frame();
                return visit_spliced(ctx, visitors, nodes, rewalks + 1);
            }
            VisitSignal::Remove => {
                ctx.pop_suppression_frame();
                return Outcome::Remove;
            }
        }
    }

    ctx.pop_suppression_frame();
    Outcome::One(current)
}

/// Walk each node of a multi-node replacement and flatten the results.
fn visit_spliced(
    ctx: &mut CompilerContext,
    visitors: &mut [Box<dyn Visitor>],
    nodes: Vec<NodeIndex>,
    rewalks: u32,
) -> Outcome {
    let mut flattened = Vec::with_capacity(nodes.len());
    for node in nodes {
        match visit(ctx, visitors, node, rewalks) {
            Outcome::One(idx) => flattened.push(idx),
            Outcome::Many(more) => flattened.extend(more),
            Outcome::Remove => {}
        }
    }
    match flattened.len() {
        0 => Outcome::Remove,
        1 => Outcome::One(flattened[0]),
        _ => Outcome::Many(flattened),
    }
}

fn visit_children(
    ctx: &mut CompilerContext,
    visitors: &mut [Box<dyn Visitor>],
    index: NodeIndex,
) -> NodeIndex {
    let Some(node) = ctx.arena.get(index) else {
        return index;
    };
    let node = node.clone();

    let rebuilt = map_children(&node.data, &mut |child| {
        match visit(ctx, visitors, child, 0) {
            Outcome::One(idx) if idx == child => ChildChange::Keep,
            Outcome::One(idx) => ChildChange::Replace(idx),
            Outcome::Many(nodes) => ChildChange::ReplaceMany(nodes),
            Outcome::Remove => ChildChange::Remove,
        }
    });

    if let Some(message) = rebuilt.structural_error {
        // An impossible edit, e.g. removing a required child. Keep the
        // original node; the tree stays well-formed.
        ctx.report_internal(index, message);
        return index;
    }
    if !rebuilt.changed {
        return index;
    }
    ctx.arena.add_with_comments(
        rebuilt.data,
        node.span,
        node.leading_comments,
        node.trailing_comments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_parser::syntax::make;
    use aspect_parser::{NodeData, ParseOptions, parse};

    fn parse_js(source: &str) -> Parse {
        parse(source, "test.js", ParseOptions::default())
    }

    fn statement_count(parse: &Parse) -> usize {
        match &parse.arena.get(parse.root).unwrap().data {
            NodeData::SourceFile { statements } => statements.len(),
            other => panic!("unexpected root: {other:?}"),
        }
    }

    /// Replaces every `debugger;` statement with `log()`.
    struct DebuggerToLog;

    impl Visitor for DebuggerToLog {
        fn name(&self) -> &'static str {
            "debuggerToLog"
        }

        fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
            if !matches!(
                ctx.arena.get(node).map(|n| &n.data),
                Some(NodeData::DebuggerStatement)
            ) {
                return VisitSignal::Retain;
            }
            let callee = make::ident(&mut ctx.arena, "log");
            let call = make::call(&mut ctx.arena, callee, Vec::new());
            VisitSignal::Replace(make::expression_statement(&mut ctx.arena, call))
        }
    }

    /// Removes every empty statement.
    struct DropEmptyStatements;

    impl Visitor for DropEmptyStatements {
        fn name(&self) -> &'static str {
            "dropEmptyStatements"
        }

        fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
            match ctx.arena.get(node).map(|n| &n.data) {
                Some(NodeData::EmptyStatement) => VisitSignal::Remove,
                _ => VisitSignal::Retain,
            }
        }
    }

    #[test]
    fn replacement_is_spliced_into_the_parent() {
        let mut parsed = parse_js("debugger;\nkeep();");
        let before_root = parsed.root;
        run_visitors(&mut parsed, &mut [Box::new(DebuggerToLog)]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_ne!(parsed.root, before_root);
        assert_eq!(statement_count(&parsed), 2);

        let NodeData::SourceFile { statements } = &parsed.arena.get(parsed.root).unwrap().data
        else {
            unreachable!()
        };
        let NodeData::ExpressionStatement { expression } =
            &parsed.arena.get(statements[0]).unwrap().data
        else {
            panic!("expected an expression statement");
        };
        let NodeData::CallExpression { callee, .. } = &parsed.arena.get(*expression).unwrap().data
        else {
            panic!("expected a call");
        };
        assert_eq!(
            parsed.arena.get(*callee).unwrap().identifier_name(),
            Some("log")
        );
    }

    #[test]
    fn removal_drops_the_node_from_its_list() {
        let mut parsed = parse_js("a();;b();;");
        assert_eq!(statement_count(&parsed), 4);
        run_visitors(&mut parsed, &mut [Box::new(DropEmptyStatements)]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_eq!(statement_count(&parsed), 2);
    }

    #[test]
    fn untouched_trees_keep_their_root() {
        let mut parsed = parse_js("a(); b();");
        let before_root = parsed.root;
        run_visitors(&mut parsed, &mut [Box::new(DropEmptyStatements)]);
        assert_eq!(parsed.root, before_root);
    }

    #[test]
    fn comments_ride_along_with_replacements() {
        let mut parsed = parse_js("// keep me\ndebugger;");
        run_visitors(&mut parsed, &mut [Box::new(DebuggerToLog)]);
        let NodeData::SourceFile { statements } = &parsed.arena.get(parsed.root).unwrap().data
        else {
            unreachable!()
        };
        let replacement = parsed.arena.get(statements[0]).unwrap();
        assert_eq!(replacement.leading_comments.len(), 1);
        let comment = parsed
            .comments
            .get(replacement.leading_comments[0])
            .unwrap();
        assert_eq!(comment.text, " keep me");
    }

    /// Always replaces a `debugger` with another `debugger`; never settles.
    struct InfiniteRewriter;

    impl Visitor for InfiniteRewriter {
        fn name(&self) -> &'static str {
            "infiniteRewriter"
        }

        fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
            if matches!(
                ctx.arena.get(node).map(|n| &n.data),
                Some(NodeData::DebuggerStatement)
            ) {
                let span = ctx.arena.span(node);
                VisitSignal::Replace(ctx.arena.add(NodeData::DebuggerStatement, span))
            } else {
                VisitSignal::Retain
            }
        }
    }

    #[test]
    fn runaway_rewrites_become_an_internal_error() {
        let mut parsed = parse_js("debugger;");
        run_visitors(&mut parsed, &mut [Box::new(InfiniteRewriter)]);
        assert_eq!(parsed.diagnostics.len(), 1);
        assert_eq!(parsed.diagnostics[0].category, "internalError");
    }

    /// Splits `debugger;` into two call statements.
    struct SplitDebugger;

    impl Visitor for SplitDebugger {
        fn name(&self) -> &'static str {
            "splitDebugger"
        }

        fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
            if !matches!(
                ctx.arena.get(node).map(|n| &n.data),
                Some(NodeData::DebuggerStatement)
            ) {
                return VisitSignal::Retain;
            }
            let mut stmts = Vec::new();
            for name in ["first", "second"] {
                let callee = make::ident(&mut ctx.arena, name);
                let call = make::call(&mut ctx.arena, callee, Vec::new());
                stmts.push(make::expression_statement(&mut ctx.arena, call));
            }
            VisitSignal::ReplaceMany(stmts)
        }
    }

    #[test]
    fn many_replacement_expands_the_list() {
        let mut parsed = parse_js("before();\ndebugger;\nafter();");
        run_visitors(&mut parsed, &mut [Box::new(SplitDebugger)]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        assert_eq!(statement_count(&parsed), 4);
    }

    /// Reports on every debugger statement.
    struct ReportDebugger;

    impl Visitor for ReportDebugger {
        fn name(&self) -> &'static str {
            "noDebugger"
        }

        fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
            if matches!(
                ctx.arena.get(node).map(|n| &n.data),
                Some(NodeData::DebuggerStatement)
            ) {
                ctx.report_node("noDebugger", node, "unexpected `debugger` statement");
            }
            VisitSignal::Retain
        }
    }

    #[test]
    fn suppression_comments_silence_matching_findings() {
        let source = "\
debugger;
// aspect-ignore lint/noDebugger
debugger;
// aspect-ignore lint/otherRule
debugger;
";
        let mut parsed = parse_js(source);
        run_visitors(&mut parsed, &mut [Box::new(ReportDebugger)]);
        let findings: Vec<_> = parsed
            .diagnostics
            .iter()
            .filter(|d| d.category == "lint/noDebugger")
            .collect();
        assert_eq!(findings.len(), 2);
    }

    #[test]
    fn bare_suppression_silences_everything() {
        let mut parsed = parse_js("// aspect-ignore\ndebugger;");
        run_visitors(&mut parsed, &mut [Box::new(ReportDebugger)]);
        assert!(parsed.diagnostics.is_empty());
    }

    #[test]
    fn suppression_covers_the_whole_subtree() {
        let source = "// aspect-ignore lint/noDebugger\nfunction f() { debugger; }";
        let mut parsed = parse_js(source);
        run_visitors(&mut parsed, &mut [Box::new(ReportDebugger)]);
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn enter_and_exit_order_is_symmetric() {
        struct Recorder {
            log: std::rc::Rc<std::cell::RefCell<Vec<String>>>,
            tag: &'static str,
        }

        impl Visitor for Recorder {
            fn name(&self) -> &'static str {
                "recorder"
            }

            fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
                if matches!(
                    ctx.arena.get(node).map(|n| &n.data),
                    Some(NodeData::DebuggerStatement)
                ) {
                    self.log.borrow_mut().push(format!("enter:{}", self.tag));
                }
                VisitSignal::Retain
            }

            fn exit(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
                if matches!(
                    ctx.arena.get(node).map(|n| &n.data),
                    Some(NodeData::DebuggerStatement)
                ) {
                    self.log.borrow_mut().push(format!("exit:{}", self.tag));
                }
                VisitSignal::Retain
            }
        }

        let log = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
        let mut parsed = parse_js("debugger;");
        run_visitors(
            &mut parsed,
            &mut [
                Box::new(Recorder {
                    log: log.clone(),
                    tag: "a",
                }),
                Box::new(Recorder {
                    log: log.clone(),
                    tag: "b",
                }),
            ],
        );
        assert_eq!(
            log.borrow().as_slice(),
            ["enter:a", "enter:b", "exit:b", "exit:a"]
        );
    }
}
