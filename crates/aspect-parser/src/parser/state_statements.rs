//! Statement, declaration, and pattern productions.

use aspect_common::span::Span;
use aspect_scanner::SyntaxKind;

use crate::syntax::arena::{NodeIndex, NodeList};
use crate::syntax::node::{DeclKind, MethodKind, NodeData, NodeKind};

use super::{MAX_RECURSION_DEPTH, ParserState};

impl ParserState {
    pub(crate) fn parse_source_file_statements(&mut self) -> NodeList {
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::EndOfFileToken) {
            statements.push(self.parse_statement());
        }
        statements
    }

    /// Parse one statement, claiming pending comments for it. All statement
    /// parsing funnels through here so comment attachment and the recursion
    /// guard live in one place.
    pub(crate) fn parse_statement(&mut self) -> NodeIndex {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error_at_current("statement nesting is too deep");
            let span = Span::empty(self.token_start());
            self.next_token();
            return self.arena.add(NodeData::BogusStatement, span);
        }
        self.recursion_depth += 1;
        let leading = self.take_pending_leading();
        let statement = self.parse_statement_inner();
        self.recursion_depth -= 1;
        let trailing = self.take_pending_trailing();
        self.arena.attach_leading_comments(statement, &leading);
        self.arena.attach_trailing_comments(statement, &trailing);
        statement
    }

    fn parse_statement_inner(&mut self) -> NodeIndex {
        use SyntaxKind::*;
        match self.token() {
            OpenBraceToken => self.parse_block(),
            SemicolonToken => {
                let span = self.token_span();
                self.next_token();
                self.arena.add(NodeData::EmptyStatement, span)
            }
            VarKeyword => self.parse_variable_statement(DeclKind::Var),
            ConstKeyword => self.parse_variable_statement(DeclKind::Const),
            LetKeyword if self.lookahead_starts_binding() => {
                self.parse_variable_statement(DeclKind::Let)
            }
            IfKeyword => self.parse_if_statement(),
            ForKeyword => self.parse_for_statement(),
            WhileKeyword => self.parse_while_statement(),
            DoKeyword => self.parse_do_while_statement(),
            SwitchKeyword => self.parse_switch_statement(),
            TryKeyword => self.parse_try_statement(),
            ReturnKeyword => self.parse_return_statement(),
            BreakKeyword => self.parse_break_or_continue(true),
            ContinueKeyword => self.parse_break_or_continue(false),
            ThrowKeyword => self.parse_throw_statement(),
            DebuggerKeyword => {
                let start = self.token_start();
                self.next_token();
                self.parse_semicolon();
                self.arena
                    .add(NodeData::DebuggerStatement, self.finish_span(start))
            }
            FunctionKeyword => {
                let start = self.token_start();
                self.parse_function_declaration(start, false, true)
            }
            AsyncKeyword if self.lookahead_is_async_function() => {
                let start = self.token_start();
                self.next_token();
                self.parse_function_declaration(start, true, true)
            }
            ClassKeyword => {
                let start = self.token_start();
                self.parse_class_declaration(start, true)
            }
            ImportKeyword
                if !matches!(
                    self.lookahead_token(),
                    OpenParenToken | DotToken
                ) =>
            {
                self.parse_import_declaration()
            }
            ExportKeyword => self.parse_export_declaration(),
            WithKeyword => {
                self.error_at_current("`with` statements are not supported");
                self.resync_statement()
            }
            _ if self.is_identifier_like()
                && self.lookahead_token() == ColonToken =>
            {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_expression_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        let expression = self.parse_expression();
        if self.arena.kind(expression) == Some(NodeKind::BogusExpression)
            && self.token_start() == start
        {
            // Nothing consumed: skip to a statement boundary instead of
            // looping on the same token.
            return self.resync_statement();
        }
        self.parse_semicolon();
        self.arena.add(
            NodeData::ExpressionStatement { expression },
            self.finish_span(start),
        )
    }

    pub(crate) fn parse_block(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut statements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            statements.push(self.parse_statement());
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena
            .add(NodeData::Block { statements }, self.finish_span(start))
    }

    // =========================================================================
    // Variable declarations and binding patterns
    // =========================================================================

    /// Whether `let` here begins a declaration rather than being used as a
    /// plain identifier.
    fn lookahead_starts_binding(&mut self) -> bool {
        let next = self.lookahead_token();
        matches!(
            next,
            SyntaxKind::Identifier | SyntaxKind::OpenBracketToken | SyntaxKind::OpenBraceToken
        ) || next.is_contextual_keyword()
    }

    fn lookahead_is_async_function(&mut self) -> bool {
        let checkpoint = self.scanner.save_state();
        let next = self.scanner.next_token();
        let result = next == SyntaxKind::FunctionKeyword && !self.scanner.has_preceding_line_break();
        self.scanner.restore_state(checkpoint);
        result
    }

    fn parse_variable_statement(&mut self, decl_kind: DeclKind) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let declarations = self.parse_variable_declaration_list();
        self.parse_semicolon();
        self.arena.add(
            NodeData::VariableStatement {
                decl_kind,
                declarations,
            },
            self.finish_span(start),
        )
    }

    fn parse_variable_declaration_list(&mut self) -> NodeList {
        let mut declarations = vec![self.parse_variable_declaration()];
        while self.parse_optional(SyntaxKind::CommaToken) {
            declarations.push(self.parse_variable_declaration());
        }
        declarations
    }

    fn parse_variable_declaration(&mut self) -> NodeIndex {
        let start = self.token_start();
        let name = self.parse_binding_name();
        let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeData::VariableDeclaration { name, initializer },
            self.finish_span(start),
        )
    }

    /// Identifier, array pattern, or object pattern.
    pub(crate) fn parse_binding_name(&mut self) -> NodeIndex {
        match self.token() {
            SyntaxKind::OpenBracketToken => self.parse_array_pattern(),
            SyntaxKind::OpenBraceToken => self.parse_object_pattern(),
            _ => self.parse_identifier(),
        }
    }

    /// Binding name with optional default value: `x`, `x = 1`, `[a] = []`.
    pub(crate) fn parse_binding_element(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::DotDotDotToken) {
            let start = self.token_start();
            self.next_token();
            let argument = self.parse_binding_name();
            return self
                .arena
                .add(NodeData::RestElement { argument }, self.finish_span(start));
        }
        let start = self.token_start();
        let target = self.parse_binding_name();
        if self.parse_optional(SyntaxKind::EqualsToken) {
            let initializer = self.parse_assignment_expression();
            self.arena.add(
                NodeData::AssignmentPattern {
                    target,
                    initializer,
                },
                self.finish_span(start),
            )
        } else {
            target
        }
    }

    fn parse_array_pattern(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::CommaToken) {
                let span = self.token_span();
                elements.push(self.arena.add(NodeData::Elision, Span::empty(span.start)));
                self.next_token();
                continue;
            }
            elements.push(self.parse_binding_element());
            if !self.is_token(SyntaxKind::CloseBracketToken) {
                self.parse_expected(SyntaxKind::CommaToken);
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.arena
            .add(NodeData::ArrayPattern { elements }, self.finish_span(start))
    }

    fn parse_object_pattern(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut properties = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            properties.push(self.parse_object_pattern_property());
            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.parse_expected(SyntaxKind::CommaToken);
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena
            .add(NodeData::ObjectPattern { properties }, self.finish_span(start))
    }

    fn parse_object_pattern_property(&mut self) -> NodeIndex {
        let start = self.token_start();
        if self.is_token(SyntaxKind::DotDotDotToken) {
            self.next_token();
            let argument = self.parse_binding_name();
            return self
                .arena
                .add(NodeData::RestElement { argument }, self.finish_span(start));
        }
        // Shorthand: `{ a }` or `{ a = 1 }`.
        if self.is_identifier_like() && self.lookahead_token() != SyntaxKind::ColonToken {
            let name = self.parse_identifier();
            let initializer = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            return self.arena.add(
                NodeData::ShorthandPropertyPattern { name, initializer },
                self.finish_span(start),
            );
        }
        let (key, computed) = self.parse_property_name();
        self.parse_expected(SyntaxKind::ColonToken);
        let value = self.parse_binding_element();
        self.arena.add(
            NodeData::PropertyPattern {
                key,
                computed,
                value,
            },
            self.finish_span(start),
        )
    }

    /// Property name in objects, classes, and patterns. Reserved words are
    /// valid here (`{ default: 1 }`).
    pub(crate) fn parse_property_name(&mut self) -> (NodeIndex, bool) {
        match self.token() {
            SyntaxKind::OpenBracketToken => {
                self.next_token();
                let expression = self.parse_assignment_expression();
                self.parse_expected(SyntaxKind::CloseBracketToken);
                (expression, true)
            }
            SyntaxKind::StringLiteral => {
                let span = self.token_span();
                let value = self.scanner.token_value().to_string();
                self.next_token();
                (self.arena.add(NodeData::StringLiteral { value }, span), false)
            }
            SyntaxKind::NumericLiteral => {
                let span = self.token_span();
                let text = self.scanner.token_text().to_string();
                self.next_token();
                (self.arena.add(NodeData::NumericLiteral { text }, span), false)
            }
            token if token == SyntaxKind::Identifier || token.is_keyword() => {
                let span = self.token_span();
                let name = self.scanner.token_value().to_string();
                self.next_token();
                (self.arena.add(NodeData::Identifier { name }, span), false)
            }
            _ => {
                self.error_at_current("expected a property name");
                let bogus = self
                    .arena
                    .add(NodeData::BogusExpression, Span::empty(self.token_start()));
                (bogus, false)
            }
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    fn parse_if_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let test = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let consequent = self.parse_statement();
        let alternate = if self.parse_optional(SyntaxKind::ElseKeyword) {
            self.parse_statement()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeData::IfStatement {
                test,
                consequent,
                alternate,
            },
            self.finish_span(start),
        )
    }

    fn parse_while_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let test = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_statement();
        self.arena
            .add(NodeData::WhileStatement { test, body }, self.finish_span(start))
    }

    fn parse_do_while_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let body = self.parse_statement();
        self.parse_expected(SyntaxKind::WhileKeyword);
        self.parse_expected(SyntaxKind::OpenParenToken);
        let test = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        // The trailing semicolon after do/while is optional even without a
        // line break.
        self.parse_optional(SyntaxKind::SemicolonToken);
        self.arena.add(
            NodeData::DoWhileStatement { body, test },
            self.finish_span(start),
        )
    }

    fn parse_for_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);

        // The init clause parses with `in` disabled so `for (a in b)` is
        // recognized from the header rather than swallowed as a binary
        // expression.
        let saved_allow_in = std::mem::replace(&mut self.allow_in, false);
        let decl_kind = match self.token() {
            SyntaxKind::VarKeyword => Some(DeclKind::Var),
            SyntaxKind::ConstKeyword => Some(DeclKind::Const),
            SyntaxKind::LetKeyword if self.lookahead_starts_binding() => Some(DeclKind::Let),
            _ => None,
        };

        let left = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else if let Some(decl_kind) = decl_kind {
            let decl_start = self.token_start();
            self.next_token();
            let first = self.parse_variable_declaration();
            let mut declarations = vec![first];
            while self.parse_optional(SyntaxKind::CommaToken) {
                declarations.push(self.parse_variable_declaration());
            }
            self.arena.add(
                NodeData::VariableStatement {
                    decl_kind,
                    declarations,
                },
                self.finish_span(decl_start),
            )
        } else {
            self.parse_expression()
        };
        self.allow_in = saved_allow_in;

        if left.is_some() && self.is_token(SyntaxKind::InKeyword) {
            self.next_token();
            let right = self.parse_expression();
            self.parse_expected(SyntaxKind::CloseParenToken);
            let body = self.parse_statement();
            return self.arena.add(
                NodeData::ForInStatement { left, right, body },
                self.finish_span(start),
            );
        }
        if left.is_some() && self.is_token(SyntaxKind::OfKeyword) {
            self.next_token();
            let right = self.parse_assignment_expression();
            self.parse_expected(SyntaxKind::CloseParenToken);
            let body = self.parse_statement();
            return self.arena.add(
                NodeData::ForOfStatement { left, right, body },
                self.finish_span(start),
            );
        }

        self.parse_expected(SyntaxKind::SemicolonToken);
        let test = if self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::SemicolonToken);
        let update = if self.is_token(SyntaxKind::CloseParenToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_expected(SyntaxKind::CloseParenToken);
        let body = self.parse_statement();
        self.arena.add(
            NodeData::ForStatement {
                initializer: left,
                test,
                update,
                body,
            },
            self.finish_span(start),
        )
    }

    fn parse_switch_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        self.parse_expected(SyntaxKind::OpenParenToken);
        let discriminant = self.parse_expression();
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut cases = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            cases.push(self.parse_case_clause());
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.arena.add(
            NodeData::SwitchStatement { discriminant, cases },
            self.finish_span(start),
        )
    }

    fn parse_case_clause(&mut self) -> NodeIndex {
        let leading = self.take_pending_leading();
        let start = self.token_start();
        let test = if self.parse_optional(SyntaxKind::CaseKeyword) {
            self.parse_expression()
        } else {
            if !self.parse_expected(SyntaxKind::DefaultKeyword) {
                // Neither `case` nor `default`: skip the stray token so the
                // clause loop makes progress.
                self.next_token();
            }
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::ColonToken);
        let mut consequent = Vec::new();
        while !matches!(
            self.token(),
            SyntaxKind::CaseKeyword
                | SyntaxKind::DefaultKeyword
                | SyntaxKind::CloseBraceToken
                | SyntaxKind::EndOfFileToken
        ) {
            consequent.push(self.parse_statement());
        }
        let clause = self.arena.add(
            NodeData::CaseClause { test, consequent },
            self.finish_span(start),
        );
        self.arena.attach_leading_comments(clause, &leading);
        clause
    }

    fn parse_try_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let block = self.parse_block();
        let handler = if self.is_token(SyntaxKind::CatchKeyword) {
            let catch_start = self.token_start();
            self.next_token();
            let param = if self.parse_optional(SyntaxKind::OpenParenToken) {
                let param = self.parse_binding_name();
                self.parse_expected(SyntaxKind::CloseParenToken);
                param
            } else {
                NodeIndex::NONE
            };
            let body = self.parse_block();
            self.arena.add(
                NodeData::CatchClause { param, body },
                self.finish_span(catch_start),
            )
        } else {
            NodeIndex::NONE
        };
        let finalizer = if self.parse_optional(SyntaxKind::FinallyKeyword) {
            self.parse_block()
        } else {
            NodeIndex::NONE
        };
        if handler.is_none() && finalizer.is_none() {
            self.error_at_current("`try` requires a `catch` or `finally` clause");
        }
        self.arena.add(
            NodeData::TryStatement {
                block,
                handler,
                finalizer,
            },
            self.finish_span(start),
        )
    }

    fn parse_return_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let argument = if self.can_insert_semicolon() || self.is_token(SyntaxKind::SemicolonToken) {
            NodeIndex::NONE
        } else {
            self.parse_expression()
        };
        self.parse_semicolon();
        self.arena
            .add(NodeData::ReturnStatement { argument }, self.finish_span(start))
    }

    fn parse_break_or_continue(&mut self, is_break: bool) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        // A label must be on the same line; ASI kicks in otherwise.
        let label = if self.is_identifier_like() && !self.scanner.has_preceding_line_break() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        self.parse_semicolon();
        let data = if is_break {
            NodeData::BreakStatement { label }
        } else {
            NodeData::ContinueStatement { label }
        };
        self.arena.add(data, self.finish_span(start))
    }

    fn parse_throw_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        if self.scanner.has_preceding_line_break() {
            self.error_at_current("line break not allowed after `throw`");
        }
        let argument = self.parse_expression();
        self.parse_semicolon();
        self.arena
            .add(NodeData::ThrowStatement { argument }, self.finish_span(start))
    }

    fn parse_labeled_statement(&mut self) -> NodeIndex {
        let start = self.token_start();
        let label = self.parse_identifier();
        self.parse_expected(SyntaxKind::ColonToken);
        let body = self.parse_statement();
        self.arena.add(
            NodeData::LabeledStatement { label, body },
            self.finish_span(start),
        )
    }

    // =========================================================================
    // Functions and classes
    // =========================================================================

    /// `function` declaration; the caller has consumed a leading `async`.
    pub(crate) fn parse_function_declaration(
        &mut self,
        start: u32,
        is_async: bool,
        name_required: bool,
    ) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier_like() {
            self.parse_identifier()
        } else {
            if name_required {
                self.error_at_current("expected a function name");
            }
            NodeIndex::NONE
        };
        let params = self.parse_parameter_list();
        let body = self.parse_block();
        self.arena.add(
            NodeData::FunctionDeclaration {
                name,
                params,
                body,
                is_async,
                is_generator,
            },
            self.finish_span(start),
        )
    }

    pub(crate) fn parse_parameter_list(&mut self) -> NodeList {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let mut params = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            params.push(self.parse_binding_element());
            if !self.is_token(SyntaxKind::CloseParenToken)
                && !self.parse_expected(SyntaxKind::CommaToken)
            {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        params
    }

    pub(crate) fn parse_class_declaration(&mut self, start: u32, name_required: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::ClassKeyword);
        let (name, extends, members) = self.parse_class_tail(name_required);
        self.arena.add(
            NodeData::ClassDeclaration {
                name,
                extends,
                members,
            },
            self.finish_span(start),
        )
    }

    /// Shared by class declarations and class expressions: optional name,
    /// optional heritage, member list.
    pub(crate) fn parse_class_tail(
        &mut self,
        name_required: bool,
    ) -> (NodeIndex, NodeIndex, NodeList) {
        let name = if self.is_identifier_like() {
            self.parse_identifier()
        } else {
            if name_required {
                self.error_at_current("expected a class name");
            }
            NodeIndex::NONE
        };
        let extends = if self.parse_optional(SyntaxKind::ExtendsKeyword) {
            let expression = self.parse_assignment_expression();
            self.check_extends_clause(expression);
            expression
        } else {
            NodeIndex::NONE
        };
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.parse_optional(SyntaxKind::SemicolonToken) {
                continue;
            }
            members.push(self.parse_class_member());
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        (name, extends, members)
    }

    /// An `extends` clause that parses as an assignment is almost always a
    /// typo for a comparison. The short-circuit form `A &&= B` has a
    /// legitimate memoization reading, so it alone is accepted.
    fn check_extends_clause(&mut self, expression: NodeIndex) {
        if let Some(node) = self.arena.get(expression)
            && let NodeData::AssignmentExpression { operator, .. } = &node.data
            && *operator != SyntaxKind::AmpersandAmpersandEqualsToken
        {
            let span = node.span;
            self.error_at(span, "`extends` clause cannot contain an assignment");
        }
    }

    fn parse_class_member(&mut self) -> NodeIndex {
        let leading = self.take_pending_leading();
        let start = self.token_start();

        let is_static =
            self.is_token(SyntaxKind::StaticKeyword) && self.lookahead_is_member_name();
        if is_static {
            self.next_token();
        }
        let is_async = self.is_token(SyntaxKind::AsyncKeyword)
            && self.lookahead_is_member_name()
            && self.lookahead_token() != SyntaxKind::EqualsToken;
        if is_async {
            self.next_token();
        }
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let mut method_kind = MethodKind::Method;
        if !is_generator {
            if self.is_token(SyntaxKind::GetKeyword) && self.lookahead_is_member_name() {
                self.next_token();
                method_kind = MethodKind::Get;
            } else if self.is_token(SyntaxKind::SetKeyword) && self.lookahead_is_member_name() {
                self.next_token();
                method_kind = MethodKind::Set;
            }
        }

        let (name, computed) = self.parse_property_name();
        let member = if self.is_token(SyntaxKind::OpenParenToken) {
            if method_kind == MethodKind::Method
                && !computed
                && !is_static
                && self
                    .arena
                    .get(name)
                    .and_then(|n| n.identifier_name())
                    == Some("constructor")
            {
                method_kind = MethodKind::Constructor;
            }
            let params = self.parse_parameter_list();
            let body = self.parse_block();
            self.arena.add(
                NodeData::ClassMethod {
                    name,
                    computed,
                    method_kind,
                    is_static,
                    params,
                    body,
                    is_async,
                    is_generator,
                },
                self.finish_span(start),
            )
        } else {
            let value = if self.parse_optional(SyntaxKind::EqualsToken) {
                self.parse_assignment_expression()
            } else {
                NodeIndex::NONE
            };
            self.parse_semicolon();
            self.arena.add(
                NodeData::ClassProperty {
                    name,
                    computed,
                    is_static,
                    value,
                },
                self.finish_span(start),
            )
        };
        self.arena.attach_leading_comments(member, &leading);
        member
    }

    /// Whether the token after the current one can be a member name, so a
    /// contextual keyword here (`static`, `get`, `async`) is a modifier and
    /// not the member's own name.
    pub(crate) fn lookahead_is_member_name(&mut self) -> bool {
        let next = self.lookahead_token();
        next == SyntaxKind::Identifier
            || next.is_keyword()
            || matches!(
                next,
                SyntaxKind::StringLiteral
                    | SyntaxKind::NumericLiteral
                    | SyntaxKind::OpenBracketToken
                    | SyntaxKind::AsteriskToken
            )
    }

    // =========================================================================
    // Modules
    // =========================================================================

    fn parse_string_literal_node(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::StringLiteral) {
            let span = self.token_span();
            let value = self.scanner.token_value().to_string();
            self.next_token();
            self.arena.add(NodeData::StringLiteral { value }, span)
        } else {
            self.error_at_current("expected a module specifier string");
            self.arena
                .add(NodeData::BogusExpression, Span::empty(self.token_start()))
        }
    }

    fn check_module_context(&mut self, form: &str) {
        if self.options.source_type == super::SourceType::Script {
            let span = self.token_span();
            self.error_at(span, format!("`{form}` is only allowed in modules"));
        }
    }

    fn parse_import_declaration(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.check_module_context("import");
        self.next_token();

        let mut default_binding = NodeIndex::NONE;
        let mut namespace_binding = NodeIndex::NONE;
        let mut named = Vec::new();

        if self.is_token(SyntaxKind::StringLiteral) {
            // Side-effect import: `import "mod";`
            let source = self.parse_string_literal_node();
            self.parse_semicolon();
            return self.arena.add(
                NodeData::ImportDeclaration {
                    default_binding,
                    namespace_binding,
                    named,
                    source,
                },
                self.finish_span(start),
            );
        }

        if self.is_identifier_like() {
            default_binding = self.parse_identifier();
            if self.parse_optional(SyntaxKind::CommaToken) {
                self.parse_import_clause_rest(&mut namespace_binding, &mut named);
            }
        } else {
            self.parse_import_clause_rest(&mut namespace_binding, &mut named);
        }

        self.parse_expected(SyntaxKind::FromKeyword);
        let source = self.parse_string_literal_node();
        self.parse_semicolon();
        self.arena.add(
            NodeData::ImportDeclaration {
                default_binding,
                namespace_binding,
                named,
                source,
            },
            self.finish_span(start),
        )
    }

    fn parse_import_clause_rest(&mut self, namespace: &mut NodeIndex, named: &mut NodeList) {
        if self.parse_optional(SyntaxKind::AsteriskToken) {
            self.parse_expected(SyntaxKind::AsKeyword);
            *namespace = self.parse_identifier();
            return;
        }
        self.parse_expected(SyntaxKind::OpenBraceToken);
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            named.push(self.parse_import_specifier());
            if !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.parse_expected(SyntaxKind::CommaToken)
            {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
    }

    fn parse_import_specifier(&mut self) -> NodeIndex {
        let start = self.token_start();
        let imported = self.parse_identifier();
        let local = if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_identifier()
        } else {
            imported
        };
        self.arena.add(
            NodeData::ImportSpecifier { imported, local },
            self.finish_span(start),
        )
    }

    fn parse_export_declaration(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.check_module_context("export");
        self.next_token();

        if self.parse_optional(SyntaxKind::DefaultKeyword) {
            let declaration = match self.token() {
                SyntaxKind::FunctionKeyword => {
                    let fn_start = self.token_start();
                    self.parse_function_declaration(fn_start, false, false)
                }
                SyntaxKind::AsyncKeyword if self.lookahead_is_async_function() => {
                    let fn_start = self.token_start();
                    self.next_token();
                    self.parse_function_declaration(fn_start, true, false)
                }
                SyntaxKind::ClassKeyword => {
                    let class_start = self.token_start();
                    self.parse_class_declaration(class_start, false)
                }
                _ => {
                    let expression = self.parse_assignment_expression();
                    self.parse_semicolon();
                    expression
                }
            };
            return self.arena.add(
                NodeData::ExportDefaultDeclaration { declaration },
                self.finish_span(start),
            );
        }

        if self.is_token(SyntaxKind::OpenBraceToken) {
            self.next_token();
            let mut specifiers = Vec::new();
            while !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.is_token(SyntaxKind::EndOfFileToken)
            {
                specifiers.push(self.parse_export_specifier());
                if !self.is_token(SyntaxKind::CloseBraceToken)
                    && !self.parse_expected(SyntaxKind::CommaToken)
                {
                    break;
                }
            }
            self.parse_expected(SyntaxKind::CloseBraceToken);
            let source = if self.parse_optional(SyntaxKind::FromKeyword) {
                self.parse_string_literal_node()
            } else {
                NodeIndex::NONE
            };
            self.parse_semicolon();
            return self.arena.add(
                NodeData::ExportNamedDeclaration {
                    declaration: NodeIndex::NONE,
                    specifiers,
                    source,
                },
                self.finish_span(start),
            );
        }

        let declaration = match self.token() {
            SyntaxKind::VarKeyword => self.parse_variable_statement(DeclKind::Var),
            SyntaxKind::ConstKeyword => self.parse_variable_statement(DeclKind::Const),
            SyntaxKind::LetKeyword => self.parse_variable_statement(DeclKind::Let),
            SyntaxKind::FunctionKeyword => {
                let fn_start = self.token_start();
                self.parse_function_declaration(fn_start, false, true)
            }
            SyntaxKind::AsyncKeyword if self.lookahead_is_async_function() => {
                let fn_start = self.token_start();
                self.next_token();
                self.parse_function_declaration(fn_start, true, true)
            }
            SyntaxKind::ClassKeyword => {
                let class_start = self.token_start();
                self.parse_class_declaration(class_start, true)
            }
            _ => {
                self.error_at_current("expected a declaration or `{` after `export`");
                return self.resync_statement();
            }
        };
        self.arena.add(
            NodeData::ExportNamedDeclaration {
                declaration,
                specifiers: Vec::new(),
                source: NodeIndex::NONE,
            },
            self.finish_span(start),
        )
    }

    fn parse_export_specifier(&mut self) -> NodeIndex {
        let start = self.token_start();
        let local = self.parse_identifier();
        let exported = if self.parse_optional(SyntaxKind::AsKeyword) {
            self.parse_identifier()
        } else {
            local
        };
        self.arena.add(
            NodeData::ExportSpecifier { local, exported },
            self.finish_span(start),
        )
    }
}
