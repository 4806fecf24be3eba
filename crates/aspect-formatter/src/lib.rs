//! Tree-to-text formatting.
//!
//! Two halves: builders turn syntax nodes into a document of layout
//! primitives (`doc`), and the printer renders the document under a width
//! constraint (`printer`). Formatting is deterministic and idempotent;
//! trees with error-recovery placeholder nodes print their original source
//! slices, so broken input still round-trips.

pub mod builders;
pub mod doc;
pub mod printer;

pub use builders::build_doc;
pub use printer::{FormatOptions, IndentStyle, print};

use aspect_parser::Parse;
use tracing::debug;

/// Render a parse result back to canonical text.
pub fn format(parse: &Parse, options: &FormatOptions) -> String {
    debug!(path = %parse.path, width = options.print_width, "formatting");
    let doc = build_doc(&parse.arena, parse.root, &parse.comments, &parse.source);
    print(&doc, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_common::span::Span;
    use aspect_parser::syntax::make;
    use aspect_parser::{NodeArena, NodeData, ParseOptions, SyntaxKind, parse, parse_css};

    fn fmt(source: &str) -> String {
        format(&parse(source, "test.js", ParseOptions::default()), &FormatOptions::default())
    }

    fn fmt_jsx(source: &str) -> String {
        format(&parse(source, "test.jsx", ParseOptions::jsx()), &FormatOptions::default())
    }

    #[test]
    fn if_statement_gets_the_canonical_shape() {
        assert_eq!(fmt("if (foo) {bar;}"), "if (foo) {\n  bar;\n}\n");
    }

    #[test]
    fn narrow_width_breaks_argument_lists() {
        let options = FormatOptions {
            print_width: 20,
            ..FormatOptions::default()
        };
        let parsed = parse(
            "respond(firstValue, secondValue);",
            "test.js",
            ParseOptions::default(),
        );
        assert_eq!(
            format(&parsed, &options),
            "respond(\n  firstValue,\n  secondValue\n);\n"
        );
    }

    #[test]
    fn formatting_is_idempotent() {
        let corpus = [
            "let x = 1, y = [2, 3];",
            "if (a) b(); else { c(); }",
            "for (const item of items) use(item);",
            "function f(a, b = 2) { return a ** b ** 2; }",
            "class A extends B { static x = 1; get y() { return 2; } }",
            "const f = async (a) => ({ value: a });",
            "switch (x) { case 1: one(); break; default: rest(); }",
            "try { risky(); } catch (e) { report(e); } finally { done(); }",
            "import d, { a as b } from \"mod\";\nexport { b };",
            "label: while (true) break label;",
            "let t = `a${b}c`;",
            "new Map([[1, \"one\"]]);",
        ];
        for source in corpus {
            let once = fmt(source);
            assert_eq!(fmt(&once), once, "not idempotent for {source:?}");
        }
    }

    #[test]
    fn comments_ride_through() {
        assert_eq!(
            fmt("// lead\nlet x = 1; // trail"),
            "// lead\nlet x = 1; // trail\n"
        );
        assert_eq!(fmt("/* setup */ let x = 1;"), "/* setup */ let x = 1;\n");
    }

    #[test]
    fn end_of_file_comments_survive() {
        assert_eq!(fmt("let x = 1;\n// last word"), "let x = 1;\n// last word\n");
    }

    #[test]
    fn exponentiation_keeps_right_nesting_unparenthesized() {
        assert_eq!(fmt("a ** b ** c;"), "a ** b ** c;\n");
        assert_eq!(fmt("(a ** b) ** c;"), "(a ** b) ** c;\n");
    }

    #[test]
    fn programmatic_trees_get_their_parens_back() {
        let mut arena = NodeArena::new();
        let a = make::ident(&mut arena, "a");
        let b = make::ident(&mut arena, "b");
        let c = make::ident(&mut arena, "c");
        let sum = make::binary(&mut arena, SyntaxKind::PlusToken, a, b);
        let product = make::binary(&mut arena, SyntaxKind::AsteriskToken, sum, c);
        let statement = make::expression_statement(&mut arena, product);
        let root = arena.add(
            NodeData::SourceFile {
                statements: vec![statement],
            },
            Span::SYNTHETIC,
        );
        let doc = build_doc(&arena, root, &Default::default(), "");
        assert_eq!(print(&doc, &FormatOptions::default()), "(a + b) * c;\n");
    }

    #[test]
    fn nullish_operands_keep_explicit_parens() {
        let mut arena = NodeArena::new();
        let a = make::ident(&mut arena, "a");
        let b = make::ident(&mut arena, "b");
        let c = make::ident(&mut arena, "c");
        let or = make::binary(&mut arena, SyntaxKind::BarBarToken, a, b);
        let nullish = make::binary(&mut arena, SyntaxKind::QuestionQuestionToken, or, c);
        let statement = make::expression_statement(&mut arena, nullish);
        let root = arena.add(
            NodeData::SourceFile {
                statements: vec![statement],
            },
            Span::SYNTHETIC,
        );
        let doc = build_doc(&arena, root, &Default::default(), "");
        assert_eq!(print(&doc, &FormatOptions::default()), "(a || b) ?? c;\n");
    }

    #[test]
    fn statement_leading_object_is_parenthesized() {
        assert_eq!(fmt("({ a: 1 }).a;"), "({ a: 1 }).a;\n");
    }

    #[test]
    fn conditional_with_logical_alternate_needs_no_parens() {
        assert_eq!(fmt("a ? b : c || d;"), "a ? b : c || d;\n");
    }

    #[test]
    fn jsx_renders_with_indented_children() {
        assert_eq!(
            fmt_jsx("<div className={x}>hi</div>;"),
            "<div className={x}>\n  hi\n</div>;\n"
        );
        assert_eq!(fmt_jsx("<br />;"), "<br />;\n");
    }

    #[test]
    fn css_renders_structurally() {
        let parsed = parse_css("a{color:red;margin:0}", "test.css");
        assert_eq!(
            format(&parsed, &FormatOptions::default()),
            "a {\n  color: red;\n  margin: 0;\n}\n"
        );
    }

    #[test]
    fn broken_input_still_formats() {
        let parsed = parse("let = 5; ok();", "test.js", ParseOptions::default());
        assert!(!parsed.diagnostics.is_empty());
        let out = format(&parsed, &FormatOptions::default());
        assert!(out.contains("ok();"));
    }
}
