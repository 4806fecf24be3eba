//! Expression productions.
//!
//! Binary operators parse by precedence climbing against the shared table in
//! `syntax::precedence`. Parenthesized expressions are not materialized as
//! nodes: grouping is re-derived from precedence when printing, which keeps
//! rewritten and parsed trees uniform.

use aspect_common::span::Span;
use aspect_scanner::SyntaxKind;

use crate::syntax::arena::{NodeIndex, NodeList};
use crate::syntax::node::{MethodKind, NodeData, NodeKind};
use crate::syntax::precedence::{Assoc, binary_associativity, binary_precedence};

use super::{DialectFlags, MAX_RECURSION_DEPTH, ParserState};

impl ParserState {
    /// Expression including the comma operator.
    pub(crate) fn parse_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        let first = self.parse_assignment_expression();
        if !self.is_token(SyntaxKind::CommaToken) {
            return first;
        }
        let mut expressions = vec![first];
        while self.parse_optional(SyntaxKind::CommaToken) {
            expressions.push(self.parse_assignment_expression());
        }
        self.arena.add(
            NodeData::SequenceExpression { expressions },
            self.finish_span(start),
        )
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> NodeIndex {
        if self.recursion_depth >= MAX_RECURSION_DEPTH {
            self.error_at_current("expression nesting is too deep");
            let span = Span::empty(self.token_start());
            self.next_token();
            return self.arena.add(NodeData::BogusExpression, span);
        }
        self.recursion_depth += 1;
        let result = self.parse_assignment_expression_inner();
        self.recursion_depth -= 1;
        result
    }

    fn parse_assignment_expression_inner(&mut self) -> NodeIndex {
        if self.is_token(SyntaxKind::YieldKeyword) {
            return self.parse_yield_expression();
        }
        if let Some(is_async) = self.detect_arrow_function() {
            return self.parse_arrow_function(is_async);
        }

        let start = self.token_start();
        let expression = self.parse_conditional_expression();
        if self.token().is_assignment_operator() {
            let operator = self.token();
            self.check_assignment_target(expression);
            self.next_token();
            let right = self.parse_assignment_expression();
            return self.arena.add(
                NodeData::AssignmentExpression {
                    operator,
                    left: expression,
                    right,
                },
                self.finish_span(start),
            );
        }
        expression
    }

    fn check_assignment_target(&mut self, target: NodeIndex) {
        use NodeKind::*;
        let valid = matches!(
            self.arena.kind(target),
            Some(
                Identifier
                    | MemberExpression
                    | ComputedMemberExpression
                    | ArrayLiteral
                    | ObjectLiteral
                    | ArrayPattern
                    | ObjectPattern
                    | BogusExpression
            )
        );
        if !valid {
            let span = self.arena.span(target);
            self.error_at(span, "invalid assignment target");
        }
    }

    fn parse_yield_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let delegate = self.parse_optional(SyntaxKind::AsteriskToken);
        let argument = if delegate || self.can_start_expression() {
            self.parse_assignment_expression()
        } else {
            NodeIndex::NONE
        };
        self.arena.add(
            NodeData::YieldExpression { argument, delegate },
            self.finish_span(start),
        )
    }

    fn can_start_expression(&self) -> bool {
        use SyntaxKind::*;
        !self.can_insert_semicolon()
            && !matches!(
                self.token(),
                CloseParenToken
                    | CloseBracketToken
                    | CloseBraceToken
                    | CommaToken
                    | SemicolonToken
                    | ColonToken
                    | EndOfFileToken
            )
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    /// Decide via bounded lookahead whether the tokens ahead are an arrow
    /// function head. Returns the `is_async` flag when they are.
    fn detect_arrow_function(&mut self) -> Option<bool> {
        use SyntaxKind::*;
        let checkpoint = self.scanner.save_state();
        let mut is_async = false;
        if self.scanner.token() == AsyncKeyword {
            self.scanner.next_token();
            if self.scanner.has_preceding_line_break() {
                self.scanner.restore_state(checkpoint);
                return None;
            }
            if self.scanner.token() == EqualsGreaterThanToken {
                // `async => ...`: async is the parameter, not a modifier.
                self.scanner.restore_state(checkpoint);
                return Some(false);
            }
            is_async = true;
        }
        let token = self.scanner.token();
        let is_arrow = if token == Identifier || token.is_contextual_keyword() {
            self.scanner.next_token() == EqualsGreaterThanToken
        } else if token == OpenParenToken {
            self.scan_matching_paren_then_arrow()
        } else {
            false
        };
        self.scanner.restore_state(checkpoint);
        if is_arrow { Some(is_async) } else { None }
    }

    /// Scanner is positioned on `(`: skip to the matching `)` and report
    /// whether `=>` follows. Caller restores the checkpoint.
    fn scan_matching_paren_then_arrow(&mut self) -> bool {
        let mut depth = 0u32;
        loop {
            match self.scanner.token() {
                SyntaxKind::OpenParenToken => depth += 1,
                SyntaxKind::CloseParenToken => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                SyntaxKind::EndOfFileToken => return false,
                _ => {}
            }
            self.scanner.next_token();
        }
        self.scanner.next_token() == SyntaxKind::EqualsGreaterThanToken
    }

    fn parse_arrow_function(&mut self, is_async: bool) -> NodeIndex {
        let start = self.token_start();
        if is_async {
            self.next_token();
        }
        let params = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_parameter_list()
        } else {
            vec![self.parse_identifier()]
        };
        self.parse_expected(SyntaxKind::EqualsGreaterThanToken);
        let body = if self.is_token(SyntaxKind::OpenBraceToken) {
            self.parse_block()
        } else {
            self.parse_assignment_expression()
        };
        self.arena.add(
            NodeData::ArrowFunction {
                params,
                body,
                is_async,
            },
            self.finish_span(start),
        )
    }

    // =========================================================================
    // Conditional, binary, unary
    // =========================================================================

    fn parse_conditional_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        let test = self.parse_binary_expression(0);
        if !self.parse_optional(SyntaxKind::QuestionToken) {
            return test;
        }
        let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
        let consequent = self.parse_assignment_expression();
        self.allow_in = saved_allow_in;
        self.parse_expected(SyntaxKind::ColonToken);
        let alternate = self.parse_assignment_expression();
        self.arena.add(
            NodeData::ConditionalExpression {
                test,
                consequent,
                alternate,
            },
            self.finish_span(start),
        )
    }

    fn parse_binary_expression(&mut self, min_precedence: u8) -> NodeIndex {
        let start = self.token_start();
        let mut left = self.parse_unary_expression();
        loop {
            let operator = self.token();
            if operator == SyntaxKind::InKeyword && !self.allow_in {
                break;
            }
            let Some(precedence) = binary_precedence(operator) else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            if operator == SyntaxKind::AsteriskAsteriskToken
                && matches!(
                    self.arena.kind(left),
                    Some(NodeKind::UnaryExpression | NodeKind::AwaitExpression)
                )
            {
                let span = self.arena.span(left);
                self.error_at(span, "unary operand of `**` must be parenthesized");
            }
            self.next_token();
            let next_min = match binary_associativity(operator) {
                Assoc::Left => precedence + 1,
                Assoc::Right => precedence,
            };
            let right = self.parse_binary_expression(next_min);
            left = self.arena.add(
                NodeData::BinaryExpression {
                    operator,
                    left,
                    right,
                },
                self.finish_span(start),
            );
        }
        left
    }

    fn parse_unary_expression(&mut self) -> NodeIndex {
        use SyntaxKind::*;
        let start = self.token_start();
        match self.token() {
            PlusToken | MinusToken | TildeToken | ExclamationToken | TypeOfKeyword
            | VoidKeyword | DeleteKeyword => {
                let operator = self.token();
                self.next_token();
                let argument = self.parse_unary_expression();
                self.arena.add(
                    NodeData::UnaryExpression { operator, argument },
                    self.finish_span(start),
                )
            }
            AwaitKeyword => {
                self.next_token();
                let argument = self.parse_unary_expression();
                self.arena
                    .add(NodeData::AwaitExpression { argument }, self.finish_span(start))
            }
            PlusPlusToken | MinusMinusToken => {
                let operator = self.token();
                self.next_token();
                let argument = self.parse_unary_expression();
                self.arena.add(
                    NodeData::UpdateExpression {
                        operator,
                        argument,
                        prefix: true,
                    },
                    self.finish_span(start),
                )
            }
            _ => self.parse_postfix_expression(),
        }
    }

    fn parse_postfix_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        let expression = self.parse_left_hand_side_expression();
        if matches!(
            self.token(),
            SyntaxKind::PlusPlusToken | SyntaxKind::MinusMinusToken
        ) && !self.scanner.has_preceding_line_break()
        {
            let operator = self.token();
            self.next_token();
            return self.arena.add(
                NodeData::UpdateExpression {
                    operator,
                    argument: expression,
                    prefix: false,
                },
                self.finish_span(start),
            );
        }
        expression
    }

    // =========================================================================
    // Call and member chains
    // =========================================================================

    fn parse_left_hand_side_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        let expression = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        self.parse_call_and_member_chain(expression, start)
    }

    fn parse_new_expression(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.next_token();
        let callee_start = self.token_start();
        let mut callee = if self.is_token(SyntaxKind::NewKeyword) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };
        // Member accesses bind to the constructor; the first argument list
        // terminates the `new` target.
        callee = self.parse_member_chain_no_call(callee, callee_start);
        let arguments = if self.is_token(SyntaxKind::OpenParenToken) {
            self.parse_argument_list()
        } else {
            Vec::new()
        };
        self.arena.add(
            NodeData::NewExpression { callee, arguments },
            self.finish_span(start),
        )
    }

    fn parse_member_chain_no_call(&mut self, mut expression: NodeIndex, start: u32) -> NodeIndex {
        loop {
            match self.token() {
                SyntaxKind::DotToken => {
                    self.next_token();
                    let property = self.parse_member_name();
                    expression = self.arena.add(
                        NodeData::MemberExpression {
                            object: expression,
                            property,
                            optional: false,
                        },
                        self.finish_span(start),
                    );
                }
                SyntaxKind::OpenBracketToken => {
                    self.next_token();
                    let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
                    let index = self.parse_expression();
                    self.allow_in = saved_allow_in;
                    self.parse_expected(SyntaxKind::CloseBracketToken);
                    expression = self.arena.add(
                        NodeData::ComputedMemberExpression {
                            object: expression,
                            index,
                            optional: false,
                        },
                        self.finish_span(start),
                    );
                }
                _ => return expression,
            }
        }
    }

    fn parse_call_and_member_chain(&mut self, mut expression: NodeIndex, start: u32) -> NodeIndex {
        use SyntaxKind::*;
        loop {
            match self.token() {
                DotToken => {
                    self.next_token();
                    let property = self.parse_member_name();
                    expression = self.arena.add(
                        NodeData::MemberExpression {
                            object: expression,
                            property,
                            optional: false,
                        },
                        self.finish_span(start),
                    );
                }
                QuestionDotToken => {
                    self.next_token();
                    expression = match self.token() {
                        OpenBracketToken => {
                            self.next_token();
                            let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
                            let index = self.parse_expression();
                            self.allow_in = saved_allow_in;
                            self.parse_expected(CloseBracketToken);
                            self.arena.add(
                                NodeData::ComputedMemberExpression {
                                    object: expression,
                                    index,
                                    optional: true,
                                },
                                self.finish_span(start),
                            )
                        }
                        OpenParenToken => {
                            let arguments = self.parse_argument_list();
                            self.arena.add(
                                NodeData::CallExpression {
                                    callee: expression,
                                    arguments,
                                    optional: true,
                                },
                                self.finish_span(start),
                            )
                        }
                        _ => {
                            let property = self.parse_member_name();
                            self.arena.add(
                                NodeData::MemberExpression {
                                    object: expression,
                                    property,
                                    optional: true,
                                },
                                self.finish_span(start),
                            )
                        }
                    };
                }
                OpenBracketToken => {
                    self.next_token();
                    let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
                    let index = self.parse_expression();
                    self.allow_in = saved_allow_in;
                    self.parse_expected(CloseBracketToken);
                    expression = self.arena.add(
                        NodeData::ComputedMemberExpression {
                            object: expression,
                            index,
                            optional: false,
                        },
                        self.finish_span(start),
                    );
                }
                OpenParenToken => {
                    let arguments = self.parse_argument_list();
                    expression = self.arena.add(
                        NodeData::CallExpression {
                            callee: expression,
                            arguments,
                            optional: false,
                        },
                        self.finish_span(start),
                    );
                }
                NoSubstitutionTemplateLiteral | TemplateHead => {
                    let quasi = self.parse_template_literal();
                    expression = self.arena.add(
                        NodeData::TaggedTemplateExpression {
                            tag: expression,
                            quasi,
                        },
                        self.finish_span(start),
                    );
                }
                _ => return expression,
            }
        }
    }

    /// Member name after `.` / `?.`; reserved words are allowed
    /// (`promise.catch`).
    fn parse_member_name(&mut self) -> NodeIndex {
        let token = self.token();
        if token == SyntaxKind::Identifier || token.is_keyword() {
            let span = self.token_span();
            let name = self.scanner.token_value().to_string();
            self.next_token();
            self.arena.add(NodeData::Identifier { name }, span)
        } else {
            self.error_at_current("expected a property name");
            self.arena
                .add(NodeData::BogusExpression, Span::empty(self.token_start()))
        }
    }

    pub(crate) fn parse_argument_list(&mut self) -> NodeList {
        self.parse_expected(SyntaxKind::OpenParenToken);
        let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut arguments = Vec::new();
        while !self.is_token(SyntaxKind::CloseParenToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::DotDotDotToken) {
                let start = self.token_start();
                self.next_token();
                let argument = self.parse_assignment_expression();
                arguments.push(
                    self.arena
                        .add(NodeData::SpreadElement { argument }, self.finish_span(start)),
                );
            } else {
                arguments.push(self.parse_assignment_expression());
            }
            if !self.is_token(SyntaxKind::CloseParenToken)
                && !self.parse_expected(SyntaxKind::CommaToken)
            {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseParenToken);
        self.allow_in = saved_allow_in;
        arguments
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> NodeIndex {
        use SyntaxKind::*;
        let start = self.token_start();
        match self.token() {
            NumericLiteral => {
                let span = self.token_span();
                let text = self.scanner.token_text().to_string();
                self.next_token();
                self.arena.add(NodeData::NumericLiteral { text }, span)
            }
            StringLiteral => {
                let span = self.token_span();
                let value = self.scanner.token_value().to_string();
                self.next_token();
                self.arena.add(NodeData::StringLiteral { value }, span)
            }
            TrueKeyword | FalseKeyword => {
                let span = self.token_span();
                let value = self.is_token(TrueKeyword);
                self.next_token();
                self.arena.add(NodeData::BooleanLiteral { value }, span)
            }
            NullKeyword => {
                let span = self.token_span();
                self.next_token();
                self.arena.add(NodeData::NullLiteral, span)
            }
            ThisKeyword => {
                let span = self.token_span();
                self.next_token();
                self.arena.add(NodeData::ThisExpression, span)
            }
            SuperKeyword => {
                let span = self.token_span();
                self.next_token();
                self.arena.add(NodeData::SuperExpression, span)
            }
            SlashToken | SlashEqualsToken => {
                if self.scanner.rescan_slash_as_regex() == RegularExpressionLiteral {
                    let span = self.token_span();
                    let text = self.scanner.token_text().to_string();
                    self.next_token();
                    self.arena.add(NodeData::RegexLiteral { text }, span)
                } else {
                    self.error_at_current("expected an expression");
                    self.arena
                        .add(NodeData::BogusExpression, Span::empty(start))
                }
            }
            NoSubstitutionTemplateLiteral | TemplateHead => self.parse_template_literal(),
            OpenParenToken => {
                // Grouping only: arrow heads were claimed by lookahead.
                self.next_token();
                let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
                let expression = self.parse_expression();
                self.allow_in = saved_allow_in;
                self.parse_expected(CloseParenToken);
                expression
            }
            OpenBracketToken => self.parse_array_literal(),
            OpenBraceToken => self.parse_object_literal(),
            FunctionKeyword => self.parse_function_expression(start, false),
            AsyncKeyword if self.lookahead_is_async_function_keyword() => {
                self.next_token();
                self.parse_function_expression(start, true)
            }
            ClassKeyword => {
                self.parse_expected(ClassKeyword);
                let (name, extends, members) = self.parse_class_tail(false);
                self.arena.add(
                    NodeData::ClassExpression {
                        name,
                        extends,
                        members,
                    },
                    self.finish_span(start),
                )
            }
            LessThanToken if self.options.dialect.contains(DialectFlags::JSX) => {
                self.parse_jsx_element_or_fragment()
            }
            ImportKeyword => {
                // Callee of a dynamic `import(...)` or head of `import.meta`.
                let span = self.token_span();
                self.next_token();
                self.arena.add(
                    NodeData::Identifier {
                        name: "import".to_string(),
                    },
                    span,
                )
            }
            token if token == Identifier || token.is_contextual_keyword() => {
                self.parse_identifier()
            }
            _ => {
                self.error_at_current("expected an expression");
                self.arena
                    .add(NodeData::BogusExpression, Span::empty(start))
            }
        }
    }

    fn lookahead_is_async_function_keyword(&mut self) -> bool {
        let checkpoint = self.scanner.save_state();
        let next = self.scanner.next_token();
        let result = next == SyntaxKind::FunctionKeyword && !self.scanner.has_preceding_line_break();
        self.scanner.restore_state(checkpoint);
        result
    }

    fn parse_function_expression(&mut self, start: u32, is_async: bool) -> NodeIndex {
        self.parse_expected(SyntaxKind::FunctionKeyword);
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let name = if self.is_identifier_like() {
            self.parse_identifier()
        } else {
            NodeIndex::NONE
        };
        let params = self.parse_parameter_list();
        let body = self.parse_block();
        self.arena.add(
            NodeData::FunctionExpression {
                name,
                params,
                body,
                is_async,
                is_generator,
            },
            self.finish_span(start),
        )
    }

    fn parse_array_literal(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBracketToken);
        let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut elements = Vec::new();
        while !self.is_token(SyntaxKind::CloseBracketToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            if self.is_token(SyntaxKind::CommaToken) {
                let hole = self.token_start();
                elements.push(self.arena.add(NodeData::Elision, Span::empty(hole)));
                self.next_token();
                continue;
            }
            if self.is_token(SyntaxKind::DotDotDotToken) {
                let spread_start = self.token_start();
                self.next_token();
                let argument = self.parse_assignment_expression();
                elements.push(self.arena.add(
                    NodeData::SpreadElement { argument },
                    self.finish_span(spread_start),
                ));
            } else {
                elements.push(self.parse_assignment_expression());
            }
            if !self.is_token(SyntaxKind::CloseBracketToken)
                && !self.parse_expected(SyntaxKind::CommaToken)
            {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBracketToken);
        self.allow_in = saved_allow_in;
        self.arena
            .add(NodeData::ArrayLiteral { elements }, self.finish_span(start))
    }

    fn parse_object_literal(&mut self) -> NodeIndex {
        let start = self.token_start();
        self.parse_expected(SyntaxKind::OpenBraceToken);
        let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut members = Vec::new();
        while !self.is_token(SyntaxKind::CloseBraceToken)
            && !self.is_token(SyntaxKind::EndOfFileToken)
        {
            members.push(self.parse_object_member());
            if !self.is_token(SyntaxKind::CloseBraceToken)
                && !self.parse_expected(SyntaxKind::CommaToken)
            {
                break;
            }
        }
        self.parse_expected(SyntaxKind::CloseBraceToken);
        self.allow_in = saved_allow_in;
        self.arena
            .add(NodeData::ObjectLiteral { members }, self.finish_span(start))
    }

    fn parse_object_member(&mut self) -> NodeIndex {
        let start = self.token_start();
        if self.is_token(SyntaxKind::DotDotDotToken) {
            self.next_token();
            let argument = self.parse_assignment_expression();
            return self
                .arena
                .add(NodeData::SpreadElement { argument }, self.finish_span(start));
        }

        let is_async =
            self.is_token(SyntaxKind::AsyncKeyword) && self.lookahead_is_member_name();
        if is_async {
            self.next_token();
        }
        let is_generator = self.parse_optional(SyntaxKind::AsteriskToken);
        let mut method_kind = MethodKind::Method;
        if !is_generator && !is_async {
            if self.is_token(SyntaxKind::GetKeyword) && self.lookahead_is_member_name() {
                self.next_token();
                method_kind = MethodKind::Get;
            } else if self.is_token(SyntaxKind::SetKeyword) && self.lookahead_is_member_name() {
                self.next_token();
                method_kind = MethodKind::Set;
            }
        }

        // Shorthand before a general property name, so `{ a }` and `{ a, b }`
        // do not round-trip through parse_property_name.
        if method_kind == MethodKind::Method
            && !is_async
            && !is_generator
            && self.is_identifier_like()
            && matches!(
                self.lookahead_token(),
                SyntaxKind::CommaToken | SyntaxKind::CloseBraceToken
            )
        {
            let name = self.parse_identifier();
            return self
                .arena
                .add(NodeData::ShorthandProperty { name }, self.finish_span(start));
        }

        let (name, computed) = self.parse_property_name();
        if self.is_token(SyntaxKind::OpenParenToken) {
            let params = self.parse_parameter_list();
            let body = self.parse_block();
            return self.arena.add(
                NodeData::ObjectMethod {
                    name,
                    computed,
                    method_kind,
                    params,
                    body,
                    is_async,
                    is_generator,
                },
                self.finish_span(start),
            );
        }
        if self.parse_optional(SyntaxKind::ColonToken) {
            let value = self.parse_assignment_expression();
            return self.arena.add(
                NodeData::PropertyAssignment {
                    name,
                    computed,
                    value,
                },
                self.finish_span(start),
            );
        }
        self.error_at_current("expected `:`, `(`, `,` or `}` after property name");
        self.arena.add(
            NodeData::ShorthandProperty { name },
            self.finish_span(start),
        )
    }

    // =========================================================================
    // Template literals
    // =========================================================================

    /// Raw text of the current template token with its delimiters
    /// (backticks, `${`, `}`) stripped.
    fn template_raw(&self) -> String {
        let text = self.scanner.token_text();
        let text = text
            .strip_prefix('`')
            .or_else(|| text.strip_prefix('}'))
            .unwrap_or(text);
        let text = text
            .strip_suffix("${")
            .or_else(|| text.strip_suffix('`'))
            .unwrap_or(text);
        text.to_string()
    }

    pub(crate) fn parse_template_literal(&mut self) -> NodeIndex {
        let start = self.token_start();
        let mut quasis = Vec::new();
        let mut expressions = Vec::new();

        if self.is_token(SyntaxKind::NoSubstitutionTemplateLiteral) {
            let span = self.token_span();
            let cooked = self.scanner.token_value().to_string();
            let raw = self.template_raw();
            self.next_token();
            quasis.push(self.arena.add(
                NodeData::TemplateElement {
                    cooked,
                    raw,
                    tail: true,
                },
                span,
            ));
            return self.arena.add(
                NodeData::TemplateLiteral {
                    quasis,
                    expressions,
                },
                self.finish_span(start),
            );
        }

        // TemplateHead
        let head_span = self.token_span();
        let cooked = self.scanner.token_value().to_string();
        let raw = self.template_raw();
        quasis.push(self.arena.add(
            NodeData::TemplateElement {
                cooked,
                raw,
                tail: false,
            },
            head_span,
        ));
        self.next_token();

        loop {
            let saved_allow_in = std::mem::replace(&mut self.allow_in, true);
            expressions.push(self.parse_expression());
            self.allow_in = saved_allow_in;

            if !self.is_token(SyntaxKind::CloseBraceToken) {
                self.error_at_current("expected `}` to continue the template literal");
                break;
            }
            let kind = self.scanner.rescan_template_continuation();
            let span = self.token_span();
            let cooked = self.scanner.token_value().to_string();
            let raw = self.template_raw();
            let tail = kind == SyntaxKind::TemplateTail;
            quasis.push(self.arena.add(
                NodeData::TemplateElement { cooked, raw, tail },
                span,
            ));
            self.next_token();
            if tail {
                break;
            }
        }
        self.arena.add(
            NodeData::TemplateLiteral {
                quasis,
                expressions,
            },
            self.finish_span(start),
        )
    }
}
