//! `noUndeclaredVariables`: a value-position identifier that neither the
//! scope analysis nor the global allowlist can account for.
//!
//! The rule walks the tree itself rather than relying on per-node enter
//! callbacks: whether an identifier is a reference depends on where it sits
//! (member property names, labels, and declaration patterns are not
//! references), and only the parent knows that.

use aspect_parser::syntax::visit_keys::children;
use aspect_parser::{NodeData, NodeIndex};

use crate::context::CompilerContext;
use crate::scope::ScopeId;
use crate::suppressions::suppresses;
use crate::visitor::{VisitSignal, Visitor};

const RULE: &str = "noUndeclaredVariables";

/// Names that exist without a declaration in any realistic host.
const GLOBALS: &[&str] = &[
    "undefined", "NaN", "Infinity", "globalThis", "arguments",
    // Fundamental objects and constructors.
    "Object", "Array", "String", "Number", "Boolean", "Symbol", "BigInt",
    "Function", "Date", "RegExp", "Error", "TypeError", "RangeError",
    "SyntaxError", "ReferenceError", "EvalError", "AggregateError",
    "Promise", "Proxy", "Reflect", "Intl", "Math", "JSON",
    // Collections and binary data.
    "Map", "Set", "WeakMap", "WeakSet", "WeakRef", "ArrayBuffer",
    "SharedArrayBuffer", "DataView", "Int8Array", "Uint8Array",
    "Uint8ClampedArray", "Int16Array", "Uint16Array", "Int32Array",
    "Uint32Array", "Float32Array", "Float64Array", "BigInt64Array",
    "BigUint64Array",
    // Free functions.
    "parseInt", "parseFloat", "isNaN", "isFinite", "eval",
    "encodeURI", "decodeURI", "encodeURIComponent", "decodeURIComponent",
    "setTimeout", "clearTimeout", "setInterval", "clearInterval",
    "queueMicrotask", "structuredClone", "fetch", "atob", "btoa",
    // Common host objects.
    "console", "window", "document", "navigator", "location", "history",
    "performance", "crypto", "URL", "URLSearchParams", "TextEncoder",
    "TextDecoder", "AbortController", "AbortSignal", "Blob", "File",
    "FormData", "Headers", "Request", "Response", "Event", "CustomEvent",
    "localStorage", "sessionStorage",
    // CommonJS / Node.
    "require", "module", "exports", "process", "Buffer", "__dirname",
    "__filename", "global",
];

pub struct NoUndeclaredVariables;

impl Visitor for NoUndeclaredVariables {
    fn name(&self) -> &'static str {
        RULE
    }

    fn enter(&mut self, node: NodeIndex, ctx: &mut CompilerContext) -> VisitSignal {
        if !matches!(
            ctx.arena.get(node).map(|n| &n.data),
            Some(NodeData::SourceFile { .. })
        ) {
            return VisitSignal::Retain;
        }
        let mut walker = Walker {
            ctx,
            suppressions: Vec::new(),
            findings: Vec::new(),
        };
        walker.walk(node);
        let findings = walker.findings;
        for (reference, name) in findings {
            ctx.report_node(RULE, reference, format!("`{name}` is not defined"));
        }
        VisitSignal::Retain
    }
}

struct Walker<'a> {
    ctx: &'a CompilerContext,
    /// Suppression prefixes gathered on the way down; mirrors what the
    /// engine would stack up if this rule ran per node.
    suppressions: Vec<Vec<String>>,
    findings: Vec<(NodeIndex, String)>,
}

impl Walker<'_> {
    fn walk(&mut self, index: NodeIndex) {
        let Some(node) = self.ctx.arena.get(index) else {
            return;
        };
        self.suppressions.push(self.ctx.node_suppressions(index));

        match &node.data {
            NodeData::Identifier { name } => self.check_reference(index, name),

            // The property side of a dot access is a name, not a reference.
            NodeData::MemberExpression { object, .. } => self.walk(*object),

            // Non-computed keys are names; computed keys are expressions.
            NodeData::PropertyAssignment {
                name,
                computed,
                value,
            } => {
                if *computed {
                    self.walk(*name);
                }
                self.walk(*value);
            }
            NodeData::ObjectMethod {
                name,
                computed,
                params,
                body,
                ..
            }
            | NodeData::ClassMethod {
                name,
                computed,
                params,
                body,
                ..
            } => {
                if *computed {
                    self.walk(*name);
                }
                self.walk_params(params);
                self.walk(*body);
            }
            NodeData::ClassProperty {
                name,
                computed,
                value,
                ..
            } => {
                if *computed {
                    self.walk(*name);
                }
                self.walk(*value);
            }

            // Declared names are bindings, not references.
            NodeData::FunctionDeclaration { params, body, .. }
            | NodeData::FunctionExpression { params, body, .. } => {
                self.walk_params(params);
                self.walk(*body);
            }
            NodeData::ArrowFunction { params, body, .. } => {
                self.walk_params(params);
                self.walk(*body);
            }
            NodeData::ClassDeclaration {
                extends, members, ..
            }
            | NodeData::ClassExpression {
                extends, members, ..
            } => {
                self.walk(*extends);
                for member in members {
                    self.walk(*member);
                }
            }
            NodeData::VariableDeclaration { name, initializer } => {
                self.walk_pattern(*name);
                self.walk(*initializer);
            }
            NodeData::CatchClause { param, body } => {
                self.walk_pattern(*param);
                self.walk(*body);
            }

            // Import bindings declare; the source is a string.
            NodeData::ImportDeclaration { .. } | NodeData::ImportSpecifier { .. } => {}

            // `export { local as exported }`: the local side reads a binding.
            NodeData::ExportSpecifier { local, .. } => self.walk(*local),

            // Labels are their own namespace.
            NodeData::BreakStatement { .. } | NodeData::ContinueStatement { .. } => {}
            NodeData::LabeledStatement { body, .. } => self.walk(*body),

            _ => {
                for child in children(&node.data) {
                    self.walk(child);
                }
            }
        }

        self.suppressions.pop();
    }

    /// A parameter list or destructuring pattern: the bound names are
    /// declarations, but defaults and computed keys hold expressions.
    fn walk_pattern(&mut self, index: NodeIndex) {
        let Some(node) = self.ctx.arena.get(index) else {
            return;
        };
        match &node.data {
            NodeData::Identifier { .. } => {}
            NodeData::ArrayPattern { elements } => {
                for element in elements {
                    self.walk_pattern(*element);
                }
            }
            NodeData::ObjectPattern { properties } => {
                for property in properties {
                    self.walk_pattern(*property);
                }
            }
            NodeData::PropertyPattern {
                key,
                computed,
                value,
            } => {
                if *computed {
                    self.walk(*key);
                }
                self.walk_pattern(*value);
            }
            NodeData::ShorthandPropertyPattern { initializer, .. } => self.walk(*initializer),
            NodeData::RestElement { argument } => self.walk_pattern(*argument),
            NodeData::AssignmentPattern {
                target,
                initializer,
            } => {
                self.walk_pattern(*target);
                self.walk(*initializer);
            }
            _ => self.walk(index),
        }
    }

    fn walk_params(&mut self, params: &[NodeIndex]) {
        for param in params {
            self.walk_pattern(*param);
        }
    }

    fn check_reference(&mut self, index: NodeIndex, name: &str) {
        if GLOBALS.contains(&name) {
            return;
        }
        let scope = self
            .ctx
            .scopes
            .enclosing_scope(index)
            .unwrap_or(ScopeId::MODULE);
        if self.ctx.scopes.is_declared(scope, name) {
            return;
        }
        let category = CompilerContext::lint_category(RULE);
        let locally_suppressed = self
            .suppressions
            .iter()
            .flatten()
            .any(|prefix| suppresses(prefix, &category));
        if !locally_suppressed {
            self.findings.push((index, name.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::run_visitors;
    use aspect_parser::{Parse, ParseOptions, parse};

    fn run(source: &str) -> Parse {
        let mut parsed = parse(source, "test.js", ParseOptions::default());
        run_visitors(&mut parsed, &mut [Box::new(NoUndeclaredVariables)]);
        parsed
    }

    fn undefined_names(parsed: &Parse) -> Vec<String> {
        parsed
            .diagnostics
            .iter()
            .filter(|d| d.category == "lint/noUndeclaredVariables")
            .map(|d| d.message.clone())
            .collect()
    }

    #[test]
    fn reads_of_unknown_names_are_reported() {
        let parsed = run("let a = 1; use(a, b);");
        let names = undefined_names(&parsed);
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|m| m.contains("`use`")));
        assert!(names.iter().any(|m| m.contains("`b`")));
    }

    #[test]
    fn declarations_and_globals_pass() {
        let parsed = run(
            "import helper from \"m\";\n\
             const x = Math.max(1, 2);\n\
             function f(y) { return helper(x, y, console); }\n\
             f(x);",
        );
        assert!(undefined_names(&parsed).is_empty(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn property_names_are_not_references() {
        let parsed = run("let o = {}; o.missing; ({ key: o }); o?.deep.chain;");
        assert!(undefined_names(&parsed).is_empty(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn shorthand_properties_are_references() {
        let parsed = run("let obj = { missing };");
        assert_eq!(undefined_names(&parsed).len(), 1);
    }

    #[test]
    fn computed_keys_and_defaults_are_expressions() {
        let parsed = run("function f(a = fallback, { [key]: b }) {} ");
        let names = undefined_names(&parsed);
        assert_eq!(names.len(), 2);
        assert!(names.iter().any(|m| m.contains("`fallback`")));
        assert!(names.iter().any(|m| m.contains("`key`")));
    }

    #[test]
    fn labels_are_not_references() {
        let parsed = run("outer: for (const x of []) { break outer; }");
        assert!(undefined_names(&parsed).is_empty(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn hoisted_functions_are_visible_before_their_declaration() {
        let parsed = run("later(); function later() {}");
        assert!(undefined_names(&parsed).is_empty(), "{:?}", parsed.diagnostics);
    }

    #[test]
    fn catch_parameters_are_in_scope() {
        let parsed = run("try {} catch (e) { report(e); }");
        let names = undefined_names(&parsed);
        assert_eq!(names.len(), 1);
        assert!(names[0].contains("`report`"));
    }

    #[test]
    fn suppression_comment_covers_the_statement() {
        let parsed = run("// aspect-ignore lint/noUndeclaredVariables\nmystery();");
        assert!(undefined_names(&parsed).is_empty(), "{:?}", parsed.diagnostics);
    }
}
