//! Node-to-document builders.
//!
//! One builder per node kind, dispatched by payload variant. Builders decide
//! parenthesization themselves from the shared precedence table; the printer
//! never inserts parens. Comments resolved through the side table are
//! spliced in here: leading comments as plain text ahead of the node,
//! trailing comments as line suffixes so they ride at the end of whatever
//! line the node lands on.

mod css;
mod expressions;
mod jsx;
mod statements;

use aspect_common::comments::{CommentKind, CommentsConsumer};
use aspect_parser::{Node, NodeArena, NodeData, NodeIndex};

use crate::doc::{Doc, concat, line_suffix, text};

/// Build the document for a tree rooted at `root`.
pub fn build_doc(
    arena: &NodeArena,
    root: NodeIndex,
    comments: &CommentsConsumer,
    source: &str,
) -> Doc {
    DocBuilder {
        arena,
        comments,
        source,
    }
    .node(root)
}

pub(crate) struct DocBuilder<'a> {
    pub(crate) arena: &'a NodeArena,
    pub(crate) comments: &'a CommentsConsumer,
    pub(crate) source: &'a str,
}

impl DocBuilder<'_> {
    /// The full rendering of a node: leading comments, the node itself, and
    /// trailing comments as line suffixes.
    pub(crate) fn node(&self, index: NodeIndex) -> Doc {
        let Some(node) = self.arena.get(index) else {
            return Doc::nil();
        };
        let body = self.dispatch(index, node);
        // The source-file builder renders its own (end-of-file) comments.
        if matches!(node.data, NodeData::SourceFile { .. }) {
            return body;
        }
        if node.leading_comments.is_empty() && node.trailing_comments.is_empty() {
            return body;
        }
        let mut parts = Vec::new();
        self.push_leading_comments(node, &mut parts);
        parts.push(body);
        self.push_trailing_comments(node, &mut parts);
        concat(parts)
    }

    fn dispatch(&self, index: NodeIndex, node: &Node) -> Doc {
        use NodeData as D;
        match &node.data {
            D::SourceFile { statements } => self.source_file(node, statements),

            D::Block { statements } => self.block(statements),
            D::EmptyStatement => text(";"),
            D::ExpressionStatement { expression } => self.expression_statement(*expression),
            D::VariableStatement {
                decl_kind,
                declarations,
            } => self.variable_statement(*decl_kind, declarations),
            D::VariableDeclaration { name, initializer } => {
                self.variable_declaration(*name, *initializer)
            }
            D::IfStatement {
                test,
                consequent,
                alternate,
            } => self.if_statement(*test, *consequent, *alternate),
            D::ForStatement {
                initializer,
                test,
                update,
                body,
            } => self.for_statement(*initializer, *test, *update, *body),
            D::ForInStatement { left, right, body } => {
                self.for_in_of_statement("in", *left, *right, *body)
            }
            D::ForOfStatement { left, right, body } => {
                self.for_in_of_statement("of", *left, *right, *body)
            }
            D::WhileStatement { test, body } => self.while_statement(*test, *body),
            D::DoWhileStatement { body, test } => self.do_while_statement(*body, *test),
            D::SwitchStatement {
                discriminant,
                cases,
            } => self.switch_statement(*discriminant, cases),
            D::CaseClause { test, consequent } => self.case_clause(*test, consequent),
            D::TryStatement {
                block,
                handler,
                finalizer,
            } => self.try_statement(*block, *handler, *finalizer),
            D::CatchClause { param, body } => self.catch_clause(*param, *body),
            D::ReturnStatement { argument } => self.keyword_argument_statement("return", *argument),
            D::ThrowStatement { argument } => self.keyword_argument_statement("throw", *argument),
            D::BreakStatement { label } => self.keyword_label_statement("break", *label),
            D::ContinueStatement { label } => self.keyword_label_statement("continue", *label),
            D::LabeledStatement { label, body } => self.labeled_statement(*label, *body),
            D::DebuggerStatement => text("debugger;"),
            D::FunctionDeclaration {
                name,
                params,
                body,
                is_async,
                is_generator,
            } => self.function(*name, params, *body, *is_async, *is_generator),
            D::ClassDeclaration {
                name,
                extends,
                members,
            }
            | D::ClassExpression {
                name,
                extends,
                members,
            } => self.class(*name, *extends, members),
            D::ClassMethod {
                name,
                computed,
                method_kind,
                is_static,
                params,
                body,
                is_async,
                is_generator,
            } => self.class_method(
                *name,
                *computed,
                *method_kind,
                *is_static,
                params,
                *body,
                *is_async,
                *is_generator,
            ),
            D::ClassProperty {
                name,
                computed,
                is_static,
                value,
            } => self.class_property(*name, *computed, *is_static, *value),
            D::ImportDeclaration {
                default_binding,
                namespace_binding,
                named,
                source,
            } => self.import_declaration(*default_binding, *namespace_binding, named, *source),
            D::ImportSpecifier { imported, local } => {
                self.aliased_specifier(*imported, *local)
            }
            D::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => self.export_named_declaration(*declaration, specifiers, *source),
            D::ExportSpecifier { local, exported } => self.aliased_specifier(*local, *exported),
            D::ExportDefaultDeclaration { declaration } => {
                self.export_default_declaration(*declaration)
            }
            D::BogusStatement | D::BogusExpression => self.raw_source(node),

            D::Identifier { name } => text(name.clone()),
            D::NumericLiteral { text: value } => text(value.clone()),
            D::StringLiteral { value } => text(quote_string(value)),
            D::BooleanLiteral { value } => text(if *value { "true" } else { "false" }),
            D::NullLiteral => text("null"),
            D::RegexLiteral { text: value } => text(value.clone()),
            D::TemplateLiteral {
                quasis,
                expressions,
            } => self.template_literal(quasis, expressions),
            D::TemplateElement { raw, .. } => text(raw.clone()),
            D::TaggedTemplateExpression { tag, quasi } => self.tagged_template(*tag, *quasi),
            D::ThisExpression => text("this"),
            D::SuperExpression => text("super"),
            D::ArrayLiteral { elements } => self.array_literal(elements),
            D::Elision => Doc::nil(),
            D::ObjectLiteral { members } => self.object_literal(members),
            D::PropertyAssignment {
                name,
                computed,
                value,
            } => self.property_assignment(*name, *computed, *value),
            D::ShorthandProperty { name } => self.node(*name),
            D::ObjectMethod {
                name,
                computed,
                method_kind,
                params,
                body,
                is_async,
                is_generator,
            } => self.object_method(
                *name,
                *computed,
                *method_kind,
                params,
                *body,
                *is_async,
                *is_generator,
            ),
            D::SpreadElement { argument } | D::RestElement { argument } => {
                concat(vec![text("..."), self.node(*argument)])
            }
            D::FunctionExpression {
                name,
                params,
                body,
                is_async,
                is_generator,
            } => self.function(*name, params, *body, *is_async, *is_generator),
            D::ArrowFunction {
                params,
                body,
                is_async,
            } => self.arrow_function(params, *body, *is_async),
            D::BinaryExpression {
                operator,
                left,
                right,
            } => self.binary_expression(*operator, *left, *right),
            D::AssignmentExpression {
                operator,
                left,
                right,
            } => self.assignment_expression(*operator, *left, *right),
            D::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => self.conditional_expression(*test, *consequent, *alternate),
            D::UnaryExpression { operator, argument } => {
                self.unary_expression(*operator, *argument)
            }
            D::UpdateExpression {
                operator,
                argument,
                prefix,
            } => self.update_expression(*operator, *argument, *prefix),
            D::MemberExpression {
                object,
                property,
                optional,
            } => self.member_expression(*object, *property, *optional),
            D::ComputedMemberExpression {
                object,
                index: key,
                optional,
            } => self.computed_member_expression(*object, *key, *optional),
            D::CallExpression {
                callee,
                arguments,
                optional,
            } => self.call_expression(*callee, arguments, *optional),
            D::NewExpression { callee, arguments } => self.new_expression(*callee, arguments),
            D::SequenceExpression { expressions } => self.sequence_expression(expressions),
            D::YieldExpression { argument, delegate } => {
                self.yield_expression(*argument, *delegate)
            }
            D::AwaitExpression { argument } => self.await_expression(*argument),

            D::ArrayPattern { elements } => self.array_pattern(elements),
            D::ObjectPattern { properties } => self.object_pattern(properties),
            D::PropertyPattern {
                key,
                computed,
                value,
            } => self.property_pattern(*key, *computed, *value),
            D::ShorthandPropertyPattern { name, initializer } => {
                self.shorthand_property_pattern(*name, *initializer)
            }
            D::AssignmentPattern {
                target,
                initializer,
            } => self.assignment_pattern(*target, *initializer),

            D::JsxElement {
                name,
                attributes,
                children,
                self_closing,
            } => self.jsx_element(*name, attributes, children, *self_closing),
            D::JsxFragment { children } => self.jsx_fragment(children),
            D::JsxAttribute { name, value } => self.jsx_attribute(*name, *value),
            D::JsxSpreadAttribute { argument } => self.jsx_spread_attribute(*argument),
            D::JsxExpression { expression } => self.jsx_expression(*expression),
            D::JsxText { value } => self.jsx_text(value),
            D::JsxName { name } => text(name.clone()),

            D::CssStylesheet { items } => self.css_stylesheet(items),
            D::CssRule {
                selectors,
                declarations,
            } => self.css_rule(selectors, declarations),
            D::CssAtRule {
                name,
                prelude,
                body,
                has_block,
            } => self.css_at_rule(name, prelude, body, *has_block),
            D::CssSelector { text: value } => text(value.clone()),
            D::CssDeclaration {
                property,
                value,
                important,
            } => self.css_declaration(property, value, *important),
        }
    }

    /// Error-recovery placeholders have no structure; print their source
    /// slice verbatim so nothing is lost.
    fn raw_source(&self, node: &Node) -> Doc {
        let start = (node.span.start as usize).min(self.source.len());
        let end = (node.span.end as usize).min(self.source.len()).max(start);
        text(self.source[start..end].trim().to_string())
    }

    pub(crate) fn push_leading_comments(&self, node: &Node, parts: &mut Vec<Doc>) {
        for id in &node.leading_comments {
            let Some(comment) = self.comments.get(*id) else {
                continue;
            };
            match comment.kind {
                CommentKind::Line => {
                    parts.push(text(format!("//{}", comment.text)));
                    parts.push(Doc::HardLine);
                }
                CommentKind::Block => {
                    parts.push(text(format!("/*{}*/", comment.text)));
                    if comment.has_trailing_newline {
                        parts.push(Doc::HardLine);
                    } else {
                        parts.push(text(" "));
                    }
                }
            }
        }
    }

    pub(crate) fn push_trailing_comments(&self, node: &Node, parts: &mut Vec<Doc>) {
        for id in &node.trailing_comments {
            let Some(comment) = self.comments.get(*id) else {
                continue;
            };
            match comment.kind {
                CommentKind::Line => {
                    parts.push(line_suffix(text(format!(" //{}", comment.text))));
                    // A line comment swallows the rest of its line; nothing
                    // may be laid out flat after it.
                    parts.push(Doc::BreakParent);
                }
                CommentKind::Block => {
                    parts.push(line_suffix(text(format!(" /*{}*/", comment.text))));
                }
            }
        }
    }
}

/// Canonical double-quoted string rendering from the cooked value.
pub(crate) fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{0}' => out.push_str("\\0"),
            ch if ch.is_control() => {
                out.push_str(&format!("\\u{{{:x}}}", ch as u32));
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_requote_canonically() {
        assert_eq!(quote_string("plain"), "\"plain\"");
        assert_eq!(quote_string("it's"), "\"it's\"");
        assert_eq!(quote_string("say \"hi\"\n"), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(quote_string("tab\there"), "\"tab\\there\"");
    }
}
