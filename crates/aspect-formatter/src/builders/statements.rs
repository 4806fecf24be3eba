//! Builders for statements, declarations, and module items.

use aspect_parser::syntax::precedence::PRECEDENCE_ASSIGNMENT;
use aspect_parser::{DeclKind, MethodKind, NodeData, NodeIndex};

use super::DocBuilder;
use crate::doc::{Doc, concat, group, indent, join, text};

impl DocBuilder<'_> {
    pub(crate) fn source_file(
        &self,
        node: &aspect_parser::Node,
        statements: &[NodeIndex],
    ) -> Doc {
        let mut parts = vec![self.statement_sequence(statements)];
        // Leftover comments at end of file, attached as root trailing.
        if !node.trailing_comments.is_empty() {
            let mut tail = Vec::new();
            self.push_leading_comments(
                &aspect_parser::Node {
                    leading_comments: node.trailing_comments.clone(),
                    trailing_comments: Vec::new(),
                    ..node.clone()
                },
                &mut tail,
            );
            if !parts[0].is_nil() {
                parts.push(Doc::HardLine);
            }
            // The comment helper appends its own separator; drop the last
            // hard line so the printer's final-newline pass owns it.
            if matches!(tail.last(), Some(Doc::HardLine)) {
                tail.pop();
            }
            parts.push(concat(tail));
        }
        concat(parts)
    }

    pub(crate) fn statement_sequence(&self, statements: &[NodeIndex]) -> Doc {
        join(
            Doc::HardLine,
            statements.iter().map(|s| self.node(*s)).collect(),
        )
    }

    pub(crate) fn block(&self, statements: &[NodeIndex]) -> Doc {
        if statements.is_empty() {
            return text("{}");
        }
        concat(vec![
            text("{"),
            indent(concat(vec![Doc::HardLine, self.statement_sequence(statements)])),
            Doc::HardLine,
            text("}"),
        ])
    }

    pub(crate) fn expression_statement(&self, expression: NodeIndex) -> Doc {
        let needs_parens = self.starts_ambiguously(expression);
        let expr = self.expression(expression, 0);
        if needs_parens {
            concat(vec![text("("), expr, text(");")])
        } else {
            concat(vec![expr, text(";")])
        }
    }

    /// Whether the leftmost token of the expression would be misread at
    /// statement start (`{` as a block, `function`/`class` as declarations).
    fn starts_ambiguously(&self, index: NodeIndex) -> bool {
        let Some(node) = self.arena.get(index) else {
            return false;
        };
        match &node.data {
            NodeData::ObjectLiteral { .. }
            | NodeData::FunctionExpression { .. }
            | NodeData::ClassExpression { .. } => true,
            NodeData::BinaryExpression { left, .. }
            | NodeData::AssignmentExpression { left, .. } => self.starts_ambiguously(*left),
            NodeData::ConditionalExpression { test, .. } => self.starts_ambiguously(*test),
            NodeData::MemberExpression { object, .. }
            | NodeData::ComputedMemberExpression { object, .. } => self.starts_ambiguously(*object),
            NodeData::CallExpression { callee, .. }
            | NodeData::TaggedTemplateExpression { tag: callee, .. } => {
                self.starts_ambiguously(*callee)
            }
            NodeData::SequenceExpression { expressions } => expressions
                .first()
                .is_some_and(|first| self.starts_ambiguously(*first)),
            NodeData::UpdateExpression {
                argument,
                prefix: false,
                ..
            } => self.starts_ambiguously(*argument),
            _ => false,
        }
    }

    pub(crate) fn variable_statement(
        &self,
        decl_kind: DeclKind,
        declarations: &[NodeIndex],
    ) -> Doc {
        let declarations = declarations.iter().map(|d| self.node(*d)).collect();
        group(concat(vec![
            text(decl_kind.text()),
            text(" "),
            indent(join(concat(vec![text(","), Doc::Line]), declarations)),
            text(";"),
        ]))
    }

    pub(crate) fn variable_declaration(&self, name: NodeIndex, initializer: NodeIndex) -> Doc {
        let mut parts = vec![self.node(name)];
        if initializer.is_some() {
            parts.push(text(" = "));
            parts.push(self.expression(initializer, PRECEDENCE_ASSIGNMENT));
        }
        concat(parts)
    }

    pub(crate) fn if_statement(
        &self,
        test: NodeIndex,
        consequent: NodeIndex,
        alternate: NodeIndex,
    ) -> Doc {
        let mut parts = vec![
            text("if ("),
            group(self.expression(test, 0)),
            text(")"),
            self.embedded_statement(consequent),
        ];
        if alternate.is_some() {
            if self.is_block(consequent) {
                parts.push(text(" else"));
            } else {
                parts.push(Doc::HardLine);
                parts.push(text("else"));
            }
            if matches!(
                self.arena.get(alternate).map(|n| &n.data),
                Some(NodeData::IfStatement { .. })
            ) {
                parts.push(text(" "));
                parts.push(self.node(alternate));
            } else {
                parts.push(self.embedded_statement(alternate));
            }
        }
        concat(parts)
    }

    fn is_block(&self, index: NodeIndex) -> bool {
        matches!(
            self.arena.get(index).map(|n| &n.data),
            Some(NodeData::Block { .. })
        )
    }

    /// A loop or conditional body: blocks stay on the same line, bare
    /// statements move to an indented line.
    fn embedded_statement(&self, body: NodeIndex) -> Doc {
        if self.is_block(body) {
            concat(vec![text(" "), self.node(body)])
        } else {
            indent(concat(vec![Doc::HardLine, self.node(body)]))
        }
    }

    pub(crate) fn for_statement(
        &self,
        initializer: NodeIndex,
        test: NodeIndex,
        update: NodeIndex,
        body: NodeIndex,
    ) -> Doc {
        // The init slot is either a full variable statement (with its own
        // semicolon) or a bare expression that needs one.
        let init = match self.arena.get(initializer).map(|n| &n.data) {
            Some(NodeData::VariableStatement { .. }) => self.node(initializer),
            Some(_) => concat(vec![self.expression(initializer, 0), text(";")]),
            None => text(";"),
        };
        let mut parts = vec![text("for ("), init];
        if test.is_some() {
            parts.push(text(" "));
            parts.push(self.expression(test, 0));
        }
        parts.push(text(";"));
        if update.is_some() {
            parts.push(text(" "));
            parts.push(self.expression(update, 0));
        }
        parts.push(text(")"));
        parts.push(self.embedded_statement(body));
        concat(parts)
    }

    pub(crate) fn for_in_of_statement(
        &self,
        keyword: &str,
        left: NodeIndex,
        right: NodeIndex,
        body: NodeIndex,
    ) -> Doc {
        // The left slot is a declaration list or an assignment target; a
        // declaration prints without its trailing semicolon here.
        let left_doc = match self.arena.get(left).map(|n| &n.data) {
            Some(NodeData::VariableStatement {
                decl_kind,
                declarations,
            }) => {
                let declarations = declarations.iter().map(|d| self.node(*d)).collect();
                concat(vec![
                    text(decl_kind.text()),
                    text(" "),
                    join(text(", "), declarations),
                ])
            }
            _ => self.node(left),
        };
        concat(vec![
            text("for ("),
            left_doc,
            text(format!(" {keyword} ")),
            self.expression(right, PRECEDENCE_ASSIGNMENT),
            text(")"),
            self.embedded_statement(body),
        ])
    }

    pub(crate) fn while_statement(&self, test: NodeIndex, body: NodeIndex) -> Doc {
        concat(vec![
            text("while ("),
            group(self.expression(test, 0)),
            text(")"),
            self.embedded_statement(body),
        ])
    }

    pub(crate) fn do_while_statement(&self, body: NodeIndex, test: NodeIndex) -> Doc {
        let mut parts = vec![text("do")];
        if self.is_block(body) {
            parts.push(text(" "));
            parts.push(self.node(body));
            parts.push(text(" "));
        } else {
            parts.push(indent(concat(vec![Doc::HardLine, self.node(body)])));
            parts.push(Doc::HardLine);
        }
        parts.push(text("while ("));
        parts.push(group(self.expression(test, 0)));
        parts.push(text(");"));
        concat(parts)
    }

    pub(crate) fn switch_statement(&self, discriminant: NodeIndex, cases: &[NodeIndex]) -> Doc {
        if cases.is_empty() {
            return concat(vec![
                text("switch ("),
                self.expression(discriminant, 0),
                text(") {}"),
            ]);
        }
        let cases = join(Doc::HardLine, cases.iter().map(|c| self.node(*c)).collect());
        concat(vec![
            text("switch ("),
            group(self.expression(discriminant, 0)),
            text(") {"),
            indent(concat(vec![Doc::HardLine, cases])),
            Doc::HardLine,
            text("}"),
        ])
    }

    pub(crate) fn case_clause(&self, test: NodeIndex, consequent: &[NodeIndex]) -> Doc {
        let label = if test.is_some() {
            concat(vec![text("case "), self.expression(test, 0), text(":")])
        } else {
            text("default:")
        };
        if consequent.is_empty() {
            return label;
        }
        // `case x: { ... }` keeps the block inline.
        if consequent.len() == 1 && self.is_block(consequent[0]) {
            return concat(vec![label, text(" "), self.node(consequent[0])]);
        }
        concat(vec![
            label,
            indent(concat(vec![Doc::HardLine, self.statement_sequence(consequent)])),
        ])
    }

    pub(crate) fn try_statement(
        &self,
        block: NodeIndex,
        handler: NodeIndex,
        finalizer: NodeIndex,
    ) -> Doc {
        let mut parts = vec![text("try "), self.node(block)];
        if handler.is_some() {
            parts.push(text(" "));
            parts.push(self.node(handler));
        }
        if finalizer.is_some() {
            parts.push(text(" finally "));
            parts.push(self.node(finalizer));
        }
        concat(parts)
    }

    pub(crate) fn catch_clause(&self, param: NodeIndex, body: NodeIndex) -> Doc {
        let mut parts = vec![text("catch ")];
        if param.is_some() {
            parts.push(text("("));
            parts.push(self.node(param));
            parts.push(text(") "));
        }
        parts.push(self.node(body));
        concat(parts)
    }

    pub(crate) fn keyword_argument_statement(&self, keyword: &str, argument: NodeIndex) -> Doc {
        if argument.is_none() {
            return text(format!("{keyword};"));
        }
        concat(vec![
            text(keyword),
            text(" "),
            group(self.expression(argument, 0)),
            text(";"),
        ])
    }

    pub(crate) fn keyword_label_statement(&self, keyword: &str, label: NodeIndex) -> Doc {
        if label.is_none() {
            return text(format!("{keyword};"));
        }
        concat(vec![text(keyword), text(" "), self.node(label), text(";")])
    }

    pub(crate) fn labeled_statement(&self, label: NodeIndex, body: NodeIndex) -> Doc {
        concat(vec![self.node(label), text(": "), self.node(body)])
    }

    pub(crate) fn function(
        &self,
        name: NodeIndex,
        params: &[NodeIndex],
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    ) -> Doc {
        let mut parts = Vec::new();
        if is_async {
            parts.push(text("async "));
        }
        parts.push(text("function"));
        if is_generator {
            parts.push(text("*"));
        }
        if name.is_some() {
            parts.push(text(" "));
            parts.push(self.node(name));
        }
        parts.push(self.param_list(params));
        parts.push(text(" "));
        parts.push(self.node(body));
        concat(parts)
    }

    pub(crate) fn param_list(&self, params: &[NodeIndex]) -> Doc {
        self.delimited_list("(", params.iter().map(|p| self.node(*p)).collect(), ")")
    }

    pub(crate) fn class(&self, name: NodeIndex, extends: NodeIndex, members: &[NodeIndex]) -> Doc {
        let mut parts = vec![text("class")];
        if name.is_some() {
            parts.push(text(" "));
            parts.push(self.node(name));
        }
        if extends.is_some() {
            parts.push(text(" extends "));
            // `extends` takes a left-hand-side expression; anything looser
            // keeps explicit parens.
            parts.push(self.expression(extends, aspect_parser::syntax::precedence::PRECEDENCE_MEMBER));
        }
        if members.is_empty() {
            parts.push(text(" {}"));
            return concat(parts);
        }
        let members = join(Doc::HardLine, members.iter().map(|m| self.node(*m)).collect());
        parts.push(text(" {"));
        parts.push(indent(concat(vec![Doc::HardLine, members])));
        parts.push(Doc::HardLine);
        parts.push(text("}"));
        concat(parts)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn class_method(
        &self,
        name: NodeIndex,
        computed: bool,
        method_kind: MethodKind,
        is_static: bool,
        params: &[NodeIndex],
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    ) -> Doc {
        let mut parts = Vec::new();
        if is_static {
            parts.push(text("static "));
        }
        parts.push(self.method_tail(
            name,
            computed,
            method_kind,
            params,
            body,
            is_async,
            is_generator,
        ));
        concat(parts)
    }

    pub(crate) fn object_method(
        &self,
        name: NodeIndex,
        computed: bool,
        method_kind: MethodKind,
        params: &[NodeIndex],
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    ) -> Doc {
        self.method_tail(name, computed, method_kind, params, body, is_async, is_generator)
    }

    #[allow(clippy::too_many_arguments)]
    fn method_tail(
        &self,
        name: NodeIndex,
        computed: bool,
        method_kind: MethodKind,
        params: &[NodeIndex],
        body: NodeIndex,
        is_async: bool,
        is_generator: bool,
    ) -> Doc {
        let mut parts = Vec::new();
        if is_async {
            parts.push(text("async "));
        }
        match method_kind {
            MethodKind::Get => parts.push(text("get ")),
            MethodKind::Set => parts.push(text("set ")),
            MethodKind::Method | MethodKind::Constructor => {}
        }
        if is_generator {
            parts.push(text("*"));
        }
        parts.push(self.property_name(name, computed));
        parts.push(self.param_list(params));
        parts.push(text(" "));
        parts.push(self.node(body));
        concat(parts)
    }

    pub(crate) fn property_name(&self, name: NodeIndex, computed: bool) -> Doc {
        if computed {
            concat(vec![text("["), self.expression(name, 0), text("]")])
        } else {
            self.node(name)
        }
    }

    pub(crate) fn class_property(
        &self,
        name: NodeIndex,
        computed: bool,
        is_static: bool,
        value: NodeIndex,
    ) -> Doc {
        let mut parts = Vec::new();
        if is_static {
            parts.push(text("static "));
        }
        parts.push(self.property_name(name, computed));
        if value.is_some() {
            parts.push(text(" = "));
            parts.push(self.expression(value, PRECEDENCE_ASSIGNMENT));
        }
        parts.push(text(";"));
        concat(parts)
    }

    pub(crate) fn import_declaration(
        &self,
        default_binding: NodeIndex,
        namespace_binding: NodeIndex,
        named: &[NodeIndex],
        source: NodeIndex,
    ) -> Doc {
        let mut clauses = Vec::new();
        if default_binding.is_some() {
            clauses.push(self.node(default_binding));
        }
        if namespace_binding.is_some() {
            clauses.push(concat(vec![text("* as "), self.node(namespace_binding)]));
        }
        if !named.is_empty() || (default_binding.is_none() && namespace_binding.is_none()) {
            clauses.push(self.named_specifier_list(named));
        }
        if clauses.is_empty() {
            // Side-effect import.
            return concat(vec![text("import "), self.node(source), text(";")]);
        }
        concat(vec![
            text("import "),
            join(text(", "), clauses),
            text(" from "),
            self.node(source),
            text(";"),
        ])
    }

    fn named_specifier_list(&self, specifiers: &[NodeIndex]) -> Doc {
        if specifiers.is_empty() {
            return text("{}");
        }
        group(concat(vec![
            text("{"),
            indent(concat(vec![
                Doc::Line,
                join(
                    concat(vec![text(","), Doc::Line]),
                    specifiers.iter().map(|s| self.node(*s)).collect(),
                ),
            ])),
            Doc::Line,
            text("}"),
        ]))
    }

    /// `a` or `a as b`, shared by import and export specifiers.
    pub(crate) fn aliased_specifier(&self, name: NodeIndex, alias: NodeIndex) -> Doc {
        if alias.is_none() || alias == name {
            return self.node(name);
        }
        concat(vec![self.node(name), text(" as "), self.node(alias)])
    }

    pub(crate) fn export_named_declaration(
        &self,
        declaration: NodeIndex,
        specifiers: &[NodeIndex],
        source: NodeIndex,
    ) -> Doc {
        if declaration.is_some() {
            return concat(vec![text("export "), self.node(declaration)]);
        }
        let mut parts = vec![text("export "), self.named_specifier_list(specifiers)];
        if source.is_some() {
            parts.push(text(" from "));
            parts.push(self.node(source));
        }
        parts.push(text(";"));
        concat(parts)
    }

    pub(crate) fn export_default_declaration(&self, declaration: NodeIndex) -> Doc {
        let is_declaration = matches!(
            self.arena.get(declaration).map(|n| &n.data),
            Some(
                NodeData::FunctionDeclaration { .. }
                    | NodeData::FunctionExpression { .. }
                    | NodeData::ClassDeclaration { .. }
                    | NodeData::ClassExpression { .. }
            )
        );
        if is_declaration {
            concat(vec![text("export default "), self.node(declaration)])
        } else {
            concat(vec![
                text("export default "),
                self.expression(declaration, PRECEDENCE_ASSIGNMENT),
                text(";"),
            ])
        }
    }
}
