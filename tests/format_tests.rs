//! End-to-end formatting properties: exact layout, idempotence,
//! determinism, comment round-trips, and totality on broken input.

use aspect::{FormatOptions, IndentStyle, ParseOptions, format_source};

fn fmt(source: &str) -> String {
    format_source(
        source,
        "test.js",
        ParseOptions::default(),
        &FormatOptions::default(),
    )
    .code
}

fn fmt_jsx(source: &str) -> String {
    format_source(
        source,
        "test.jsx",
        ParseOptions::jsx(),
        &FormatOptions::default(),
    )
    .code
}

#[test]
fn block_bodies_get_two_space_indentation() {
    let options = FormatOptions {
        indent_style: IndentStyle::Space,
        indent_width: 2,
        ..FormatOptions::default()
    };
    let result = format_source("if (foo) {bar;}", "test.js", ParseOptions::default(), &options);
    assert_eq!(result.code, "if (foo) {\n  bar;\n}\n");
}

#[test]
fn tab_indentation_is_available() {
    let options = FormatOptions {
        indent_style: IndentStyle::Tab,
        ..FormatOptions::default()
    };
    let result = format_source("if (foo) {bar;}", "test.js", ParseOptions::default(), &options);
    assert_eq!(result.code, "if (foo) {\n\tbar;\n}\n");
}

#[test]
fn formatting_a_formatted_file_changes_nothing() {
    let corpus = [
        "let a = 1;\nconst b = [a, 2, 3];",
        "function add(a, b) { return a + b; }",
        "if (x) { y(); } else if (z) { w(); } else { v(); }",
        "for (let i = 0; i < 10; i++) { total += i; }",
        "const o = { a: 1, [key]: 2, method() { return 3; } };",
        "class Point { constructor(x, y) { this.x = x; this.y = y; } }",
        "async function load() { const data = await fetch(url); return data; }",
        "export default function main() { run(); }",
        "const big = `sum is ${a + b}!`;",
        "do { step(); } while (more);",
        "try { go(); } catch { stop(); }",
        "a?.b?.[c]?.(d);",
    ];
    for source in corpus {
        let once = fmt(source);
        assert_eq!(fmt(&once), once, "not idempotent for {source:?}");
    }
}

#[test]
fn jsx_formatting_is_idempotent() {
    let corpus = [
        "const el = <div className=\"wide\">text <b>bold</b></div>;",
        "const frag = <>{items.map(render)}</>;",
        "const leaf = <input type=\"text\" disabled />;",
    ];
    for source in corpus {
        let once = fmt_jsx(source);
        assert_eq!(fmt_jsx(&once), once, "not idempotent for {source:?}");
    }
}

#[test]
fn css_formatting_is_idempotent() {
    let source = "@media (min-width: 600px){.card,.panel{color:red;margin:0 auto}}";
    let format = |s: &str| {
        format_source(s, "x.css", ParseOptions::default(), &FormatOptions::default()).code
    };
    let once = format(source);
    assert_eq!(format(&once), once);
}

#[test]
fn output_is_deterministic() {
    let source = "const values = [alpha, beta, gamma, delta, epsilon, zeta, eta, theta];";
    let first = fmt(source);
    for _ in 0..3 {
        assert_eq!(fmt(source), first);
    }
}

#[test]
fn comments_round_trip_in_order() {
    let source = "\
// first
let a = 1; // second
/* third */
let b = 2;
";
    let out = fmt(source);
    for text in ["// first", "// second", "/* third */"] {
        assert_eq!(out.matches(text).count(), 1, "{text} in {out:?}");
    }
    let first = out.find("// first").unwrap();
    let second = out.find("// second").unwrap();
    let third = out.find("/* third */").unwrap();
    assert!(first < second && second < third);
}

#[test]
fn garbage_input_still_produces_a_tree_and_output() {
    let samples = ["§§§ ü\u{0} {{{", ")))]]}}", "let = = 5", "<<<>>>"];
    for source in samples {
        let result = format_source(
            source,
            "test.js",
            ParseOptions::default(),
            &FormatOptions::default(),
        );
        assert!(!result.diagnostics.is_empty(), "{source:?}");
        assert!(result.code.ends_with('\n'), "{source:?}");
    }
}

#[test]
fn exponentiation_is_right_associative() {
    assert_eq!(fmt("a ** b ** c;"), "a ** b ** c;\n");
    assert_eq!(fmt("(a ** b) ** c;"), "(a ** b) ** c;\n");
}

#[test]
fn conditional_alternates_keep_minimal_parens() {
    assert_eq!(fmt("a ? b : c || d;"), "a ? b : c || d;\n");
    assert_eq!(fmt("(a ? b : c) || d;"), "(a ? b : c) || d;\n");
}

#[test]
fn wide_expressions_break_at_group_boundaries() {
    let options = FormatOptions {
        print_width: 30,
        ..FormatOptions::default()
    };
    let result = format_source(
        "combine(firstOperand, secondOperand, thirdOperand);",
        "test.js",
        ParseOptions::default(),
        &options,
    );
    assert_eq!(
        result.code,
        "combine(\n  firstOperand,\n  secondOperand,\n  thirdOperand\n);\n"
    );
}
