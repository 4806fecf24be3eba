//! Aspect: parser, rewrite engine, and formatter for JavaScript, JSX, and CSS.
//!
//! The pipeline crates do the work; this facade strings them together and
//! re-exports the request/response surface callers need:
//!
//! - [`parse`] / [`parse_css`] build an arena tree from source text, always
//!   producing a tree (broken input yields placeholder nodes plus
//!   diagnostics, never a failure).
//! - [`run_visitors`] / [`run_default_visitors`] rewrite the tree in place
//!   and append lint diagnostics.
//! - [`format`] / [`format_source`] render a tree back to canonical text.
//! - [`compile`] is the guarded parse→visit→format pipeline: a panic in any
//!   stage becomes an `internalError` diagnostic instead of taking down the
//!   batch.

use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use tracing::error;

pub mod tracing_config;

pub use aspect_common::{Comment, CommentKind, Diagnostic, Severity, Span};
pub use aspect_formatter::{FormatOptions, IndentStyle};
pub use aspect_parser::{
    DialectFlags, NodeArena, NodeData, NodeIndex, Parse, ParseOptions, SourceType, SyntaxKind,
    parse, parse_css, syntax,
};
pub use aspect_visit::{
    CompilerContext, ScopeId, ScopeTree, VisitSignal, Visitor, default_rules, rename_binding,
    run_visitors,
};

/// Formatted output plus everything reported along the way.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatResult {
    pub code: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Run the built-in rule set over a parse result.
pub fn run_default_visitors(parse: &mut Parse) {
    let mut rules = default_rules();
    run_visitors(parse, &mut rules);
}

/// Render a parse result, bundling the diagnostics accumulated so far.
pub fn format(parse: &Parse, options: &FormatOptions) -> FormatResult {
    FormatResult {
        code: aspect_formatter::format(parse, options),
        diagnostics: parse.diagnostics.clone(),
    }
}

/// Format source text without running any rewrites.
pub fn format_source(
    source: &str,
    path: &str,
    parse_options: ParseOptions,
    format_options: &FormatOptions,
) -> FormatResult {
    let parsed = parse_by_path(source, path, parse_options);
    format(&parsed, format_options)
}

/// The full pipeline with the default rule set. See [`compile_with`].
pub fn compile(
    source: &str,
    path: &str,
    parse_options: ParseOptions,
    format_options: &FormatOptions,
) -> FormatResult {
    compile_with(source, path, parse_options, default_rules(), format_options)
}

/// Parse, rewrite, and format under a panic guard.
///
/// A panic anywhere in the pipeline returns the input unchanged with a
/// single `internalError` diagnostic, so one bad file cannot abort a batch.
pub fn compile_with(
    source: &str,
    path: &str,
    parse_options: ParseOptions,
    mut visitors: Vec<Box<dyn Visitor>>,
    format_options: &FormatOptions,
) -> FormatResult {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let mut parsed = parse_by_path(source, path, parse_options);
        run_visitors(&mut parsed, &mut visitors);
        format(&parsed, format_options)
    }));
    match outcome {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected panic".to_string());
            error!(path = %path, message = %message, "pipeline panicked");
            FormatResult {
                code: source.to_string(),
                diagnostics: vec![Diagnostic::internal_error(
                    Span::SYNTHETIC,
                    format!("the pipeline panicked: {message}"),
                )],
            }
        }
    }
}

fn parse_by_path(source: &str, path: &str, options: ParseOptions) -> Parse {
    if path.ends_with(".css") {
        parse_css(source, path)
    } else {
        parse(source, path, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_parser::NodeIndex;

    #[test]
    fn format_source_dispatches_on_extension() {
        let css = format_source(
            "a{color:red}",
            "styles.css",
            ParseOptions::default(),
            &FormatOptions::default(),
        );
        assert_eq!(css.code, "a {\n  color: red;\n}\n");

        let js = format_source(
            "let a=1;",
            "index.js",
            ParseOptions::default(),
            &FormatOptions::default(),
        );
        assert_eq!(js.code, "let a = 1;\n");
    }

    #[test]
    fn compile_runs_the_default_rules() {
        let result = compile(
            "switch (x) { case 1: a(); case 1: b(); }",
            "dup.js",
            ParseOptions::default(),
            &FormatOptions::default(),
        );
        assert!(
            result
                .diagnostics
                .iter()
                .any(|d| d.category == "lint/noDuplicateCase")
        );
    }

    struct Exploder;

    impl Visitor for Exploder {
        fn name(&self) -> &'static str {
            "exploder"
        }

        fn enter(&mut self, _node: NodeIndex, _ctx: &mut CompilerContext) -> VisitSignal {
            panic!("boom");
        }
    }

    #[test]
    fn a_panicking_visitor_becomes_a_diagnostic() {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(|_| {}));
        let result = compile_with(
            "let keep = 1;",
            "guarded.js",
            ParseOptions::default(),
            vec![Box::new(Exploder)],
            &FormatOptions::default(),
        );
        std::panic::set_hook(previous);

        assert_eq!(result.code, "let keep = 1;");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].category, "internalError");
        assert!(result.diagnostics[0].message.contains("boom"));
    }

    #[test]
    fn results_serialize_for_embedders() {
        let result = format_source(
            "let a = 1;",
            "index.js",
            ParseOptions::default(),
            &FormatOptions::default(),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], "let a = 1;\n");
        assert!(json["diagnostics"].as_array().unwrap().is_empty());
    }
}
