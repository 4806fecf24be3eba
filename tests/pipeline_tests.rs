//! End-to-end tests for the parse → visit → format pipeline.

use aspect::{
    CompilerContext, FormatOptions, NodeData, NodeIndex, Parse, ParseOptions, ScopeId, ScopeTree,
    VisitSignal, Visitor, compile, parse, rename_binding, run_default_visitors, run_visitors,
};
use aspect_visit::rules::NoUndeclaredVariables;

fn compile_js(source: &str) -> aspect::FormatResult {
    compile(
        source,
        "test.js",
        ParseOptions::default(),
        &FormatOptions::default(),
    )
}

fn compile_jsx(source: &str) -> aspect::FormatResult {
    compile(
        source,
        "test.jsx",
        ParseOptions::jsx(),
        &FormatOptions::default(),
    )
}

#[test]
fn logical_chains_collapse_to_optional_chains() {
    let result = compile_js("foo && foo.bar && foo.bar.baz;");
    assert_eq!(result.code, "foo?.bar?.baz;\n");
    assert!(
        result
            .diagnostics
            .iter()
            .any(|d| d.category == "lint/js/useOptionalChain" && d.is_fixable())
    );
}

#[test]
fn math_pow_becomes_the_exponentiation_operator() {
    let result = compile_js("Math.pow(a, b);");
    assert_eq!(result.code, "a ** b;\n");
}

#[test]
fn rewritten_pow_gets_parenthesized_when_nested() {
    // The replacement lands as the left operand of `**`, which is
    // right-associative, so the printer must add parens to keep the value.
    let result = compile_js("Math.pow(a, b) ** c;");
    assert_eq!(result.code, "(a ** b) ** c;\n");
}

#[test]
fn unterminated_strings_recover_with_one_diagnostic() {
    let parsed = parse("\"abc", "test.js", ParseOptions::default());
    let parse_errors: Vec<_> = parsed
        .diagnostics
        .iter()
        .filter(|d| d.category == "parse")
        .collect();
    assert_eq!(parse_errors.len(), 1);
    assert!(parse_errors[0].message.contains("unterminated string"));

    let NodeData::SourceFile { statements } = &parsed.arena.get(parsed.root).unwrap().data else {
        panic!("expected a source file root");
    };
    assert_eq!(statements.len(), 1);
}

#[test]
fn duplicate_case_points_at_the_second_label() {
    let source = "switch(a){case 1: break; case 1: break;}";
    let mut parsed = parse(source, "test.js", ParseOptions::default());
    run_default_visitors(&mut parsed);

    let findings: Vec<_> = parsed
        .diagnostics
        .iter()
        .filter(|d| d.category == "lint/noDuplicateCase")
        .collect();
    assert_eq!(findings.len(), 1);
    let second_label = source.rfind("1:").unwrap();
    assert_eq!(findings[0].span.start as usize, second_label);
}

#[test]
fn suppression_silences_one_category_at_one_node() {
    let source = "\
// aspect-ignore lint/noDuplicateCase
switch (a) {
  case 1: break;
  case 1: break;
}
switch (a) {
  case 2: break;
  case 2: break;
}
";
    let mut parsed = parse(source, "test.js", ParseOptions::default());
    run_default_visitors(&mut parsed);

    let duplicate_findings = parsed
        .diagnostics
        .iter()
        .filter(|d| d.category == "lint/noDuplicateCase")
        .count();
    assert_eq!(duplicate_findings, 1, "{:?}", parsed.diagnostics);

    // Other categories at the annotated node stay live.
    assert!(
        parsed
            .diagnostics
            .iter()
            .any(|d| d.category == "lint/noUndeclaredVariables")
    );
}

#[test]
fn suppressed_fixes_leave_the_tree_alone() {
    let result = compile_js("// aspect-ignore lint/js/useOptionalChain\nfoo && foo.bar;");
    assert!(result.code.contains("foo && foo.bar;"));
    assert!(
        !result
            .diagnostics
            .iter()
            .any(|d| d.category == "lint/js/useOptionalChain")
    );
}

#[test]
fn images_without_alt_text_are_reported() {
    let result = compile_jsx("<img src=\"x.png\" />;");
    let findings = result
        .diagnostics
        .iter()
        .filter(|d| d.category == "lint/a11y/useAltText")
        .count();
    assert_eq!(findings, 1);

    let quiet = compile_jsx("<img alt=\"\" />;");
    assert!(
        !quiet
            .diagnostics
            .iter()
            .any(|d| d.category == "lint/a11y/useAltText")
    );
}

/// Renames the module-level binding `foo` to `bar`, then refreshes the
/// scope analysis so later passes in the same run see the new names.
struct RenameFoo;

impl Visitor for RenameFoo {
    fn name(&self) -> &'static str {
        "renameFoo"
    }

    fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        if !matches!(
            ctx.arena.get(node).map(|n| &n.data),
            Some(NodeData::SourceFile { .. })
        ) {
            return VisitSignal::Retain;
        }
        let renamed = rename_binding(
            &mut ctx.arena,
            &ctx.scopes,
            node,
            ScopeId::MODULE,
            "foo",
            "bar",
        );
        if renamed == node {
            return VisitSignal::Retain;
        }
        ctx.scopes = ScopeTree::build(&ctx.arena, renamed);
        VisitSignal::Replace(renamed)
    }
}

#[test]
fn later_passes_see_earlier_replacements() {
    let mut parsed = parse("let foo = 1; foo();", "test.js", ParseOptions::default());
    let mut visitors: Vec<Box<dyn Visitor>> =
        vec![Box::new(RenameFoo), Box::new(NoUndeclaredVariables)];
    run_visitors(&mut parsed, &mut visitors);

    assert!(
        !parsed
            .diagnostics
            .iter()
            .any(|d| d.category == "lint/noUndeclaredVariables"),
        "{:?}",
        parsed.diagnostics
    );
    assert_eq!(identifier_names(&parsed), vec!["bar", "bar"]);
}

fn identifier_names(parsed: &Parse) -> Vec<String> {
    let mut names = Vec::new();
    collect_identifiers(parsed, parsed.root, &mut names);
    names
}

fn collect_identifiers(parsed: &Parse, index: NodeIndex, names: &mut Vec<String>) {
    let Some(node) = parsed.arena.get(index) else {
        return;
    };
    if let Some(name) = node.identifier_name() {
        names.push(name.to_string());
    }
    for child in aspect::syntax::visit_keys::children(&node.data) {
        collect_identifiers(parsed, child, names);
    }
}
