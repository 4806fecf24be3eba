use super::*;
use crate::syntax::node::{DeclKind, NodeKind};

fn parse_module(source: &str) -> Parse {
    parse(source, "test.js", ParseOptions::default())
}

fn statements(parse: &Parse) -> Vec<NodeIndex> {
    match &parse.arena.get(parse.root).unwrap().data {
        NodeData::SourceFile { statements } => statements.clone(),
        other => panic!("root is not a source file: {other:?}"),
    }
}

#[test]
fn parses_variable_statement() {
    let parsed = parse_module("let x = 1;");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    assert_eq!(stmts.len(), 1);
    let NodeData::VariableStatement {
        decl_kind,
        declarations,
    } = &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected a variable statement");
    };
    assert_eq!(*decl_kind, DeclKind::Let);
    assert_eq!(declarations.len(), 1);
    let NodeData::VariableDeclaration { name, initializer } =
        &parsed.arena.get(declarations[0]).unwrap().data
    else {
        panic!("expected a declaration");
    };
    assert_eq!(
        parsed.arena.get(*name).unwrap().identifier_name(),
        Some("x")
    );
    assert_eq!(
        parsed.arena.kind(*initializer),
        Some(NodeKind::NumericLiteral)
    );
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let parsed = parse_module("a + b * c;");
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    let NodeData::BinaryExpression {
        operator,
        left,
        right,
    } = &parsed.arena.get(*expression).unwrap().data
    else {
        panic!("expected a binary expression");
    };
    assert_eq!(*operator, SyntaxKind::PlusToken);
    assert_eq!(parsed.arena.kind(*left), Some(NodeKind::Identifier));
    assert_eq!(parsed.arena.kind(*right), Some(NodeKind::BinaryExpression));
}

#[test]
fn exponentiation_is_right_associative() {
    let parsed = parse_module("a ** b ** c;");
    assert!(parsed.diagnostics.is_empty());
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    let NodeData::BinaryExpression { left, right, .. } =
        &parsed.arena.get(*expression).unwrap().data
    else {
        panic!("expected a binary expression");
    };
    assert_eq!(parsed.arena.kind(*left), Some(NodeKind::Identifier));
    assert_eq!(parsed.arena.kind(*right), Some(NodeKind::BinaryExpression));
}

#[test]
fn optional_chain_call() {
    let parsed = parse_module("a?.b?.(c);");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    let NodeData::CallExpression {
        callee, optional, ..
    } = &parsed.arena.get(*expression).unwrap().data
    else {
        panic!("expected a call");
    };
    assert!(*optional);
    let NodeData::MemberExpression { optional, .. } = &parsed.arena.get(*callee).unwrap().data
    else {
        panic!("expected a member access callee");
    };
    assert!(*optional);
}

#[test]
fn automatic_semicolon_insertion_across_lines() {
    let parsed = parse_module("a\nb");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(statements(&parsed).len(), 2);
}

#[test]
fn question_dot_number_is_a_conditional() {
    // `a?.5:b` must lex `?` and `.5` separately.
    let parsed = parse_module("a?.5:b;");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    assert_eq!(
        parsed.arena.kind(*expression),
        Some(NodeKind::ConditionalExpression)
    );
}

#[test]
fn recovers_after_a_broken_statement() {
    let parsed = parse_module("function () {}\nlet y = 2;");
    assert!(!parsed.diagnostics.is_empty());
    let stmts = statements(&parsed);
    assert_eq!(
        parsed.arena.kind(*stmts.last().unwrap()),
        Some(NodeKind::VariableStatement)
    );
}

#[test]
fn paren_head_resolves_to_arrow_or_sequence() {
    let parsed = parse_module("(a, b) => a + b;");
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    let NodeData::ArrowFunction { params, body, .. } =
        &parsed.arena.get(*expression).unwrap().data
    else {
        panic!("expected an arrow function");
    };
    assert_eq!(params.len(), 2);
    assert_eq!(parsed.arena.kind(*body), Some(NodeKind::BinaryExpression));

    let parsed = parse_module("(a, b);");
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    assert_eq!(
        parsed.arena.kind(*expression),
        Some(NodeKind::SequenceExpression)
    );
}

#[test]
fn template_literal_keeps_cooked_and_raw() {
    let parsed = parse_module("`a\\n${b}c`;");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ExpressionStatement { expression } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an expression statement");
    };
    let NodeData::TemplateLiteral {
        quasis,
        expressions,
    } = &parsed.arena.get(*expression).unwrap().data
    else {
        panic!("expected a template literal");
    };
    assert_eq!(quasis.len(), 2);
    assert_eq!(expressions.len(), 1);
    let NodeData::TemplateElement { cooked, raw, tail } =
        &parsed.arena.get(quasis[0]).unwrap().data
    else {
        panic!("expected a template element");
    };
    assert_eq!(cooked, "a\n");
    assert_eq!(raw, "a\\n");
    assert!(!tail);
}

#[test]
fn for_of_with_const_binding() {
    let parsed = parse_module("for (const x of xs) {}");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ForOfStatement { left, right, body } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected for-of");
    };
    assert_eq!(parsed.arena.kind(*left), Some(NodeKind::VariableStatement));
    assert_eq!(parsed.arena.kind(*right), Some(NodeKind::Identifier));
    assert_eq!(parsed.arena.kind(*body), Some(NodeKind::Block));
}

#[test]
fn extends_clause_rejects_plain_assignment() {
    let parsed = parse_module("class A extends B = C {}");
    assert!(
        parsed
            .diagnostics
            .iter()
            .any(|d| d.message.contains("extends"))
    );

    // The short-circuit memoizing form stays legal.
    let parsed = parse_module("class A extends (B &&= C) {}");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let parsed = parse_module("class A extends B &&= C {}");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
}

#[test]
fn unterminated_string_still_yields_a_tree() {
    let parsed = parse_module("let s = \"abc;\nlet t = 1;");
    assert!(!parsed.diagnostics.is_empty());
    let stmts = statements(&parsed);
    assert_eq!(
        parsed.arena.kind(stmts[0]),
        Some(NodeKind::VariableStatement)
    );
}

#[test]
fn import_in_script_mode_is_reported() {
    let options = ParseOptions {
        source_type: SourceType::Script,
        dialect: DialectFlags::empty(),
    };
    let parsed = parse("import x from \"y\";", "test.js", options);
    assert!(
        parsed
            .diagnostics
            .iter()
            .any(|d| d.message.contains("module"))
    );
    let stmts = statements(&parsed);
    assert_eq!(
        parsed.arena.kind(stmts[0]),
        Some(NodeKind::ImportDeclaration)
    );
}

#[test]
fn import_declaration_shapes() {
    let parsed = parse_module("import d, { a, b as c } from \"mod\";");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ImportDeclaration {
        default_binding,
        namespace_binding,
        named,
        source,
    } = &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected an import declaration");
    };
    assert!(default_binding.is_some());
    assert!(namespace_binding.is_none());
    assert_eq!(named.len(), 2);
    let NodeData::StringLiteral { value } = &parsed.arena.get(*source).unwrap().data else {
        panic!("expected a string source");
    };
    assert_eq!(value, "mod");
}

#[test]
fn comments_attach_to_the_enclosing_statement() {
    let parsed = parse_module("// lead\nlet x = 1; // trail\n");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    assert_eq!(parsed.comments.len(), 2);
    let stmts = statements(&parsed);
    let node = parsed.arena.get(stmts[0]).unwrap();
    assert_eq!(node.leading_comments.len(), 1);
    assert_eq!(node.trailing_comments.len(), 1);
    let lead = parsed.comments.get(node.leading_comments[0]).unwrap();
    assert_eq!(lead.text, " lead");
    let trail = parsed.comments.get(node.trailing_comments[0]).unwrap();
    assert_eq!(trail.text, " trail");
}

#[test]
fn jsx_element_with_attributes_and_children() {
    let parsed = parse(
        "let el = <div className=\"x\">hi {name}</div>;",
        "test.jsx",
        ParseOptions::jsx(),
    );
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::VariableStatement { declarations, .. } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected a variable statement");
    };
    let NodeData::VariableDeclaration { initializer, .. } =
        &parsed.arena.get(declarations[0]).unwrap().data
    else {
        panic!("expected a declaration");
    };
    let NodeData::JsxElement {
        name,
        attributes,
        children,
        self_closing,
    } = &parsed.arena.get(*initializer).unwrap().data
    else {
        panic!("expected a JSX element");
    };
    assert!(!self_closing);
    let NodeData::JsxName { name } = &parsed.arena.get(*name).unwrap().data else {
        panic!("expected a JSX name");
    };
    assert_eq!(name, "div");
    assert_eq!(attributes.len(), 1);
    assert_eq!(children.len(), 2);
    assert_eq!(parsed.arena.kind(children[0]), Some(NodeKind::JsxText));
    assert_eq!(
        parsed.arena.kind(children[1]),
        Some(NodeKind::JsxExpression)
    );
}

#[test]
fn jsx_is_rejected_without_the_dialect_flag() {
    // With JSX off, `<` is a comparison and the input produces diagnostics.
    let parsed = parse_module("let el = <div />;");
    assert!(!parsed.diagnostics.is_empty());
}

#[test]
fn diagnostics_are_sorted_by_position() {
    let parsed = parse_module("function () {}\nfunction () {}");
    assert!(parsed.diagnostics.len() >= 2);
    let positions: Vec<u32> = parsed.diagnostics.iter().map(|d| d.span.start).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);
}

#[test]
fn class_members_and_modifiers() {
    let parsed = parse_module(
        "class A extends Base {\n  static count = 0;\n  constructor(x) { this.x = x; }\n  get x() { return 1; }\n  async *stream() {}\n}",
    );
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::ClassDeclaration { members, .. } = &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected a class declaration");
    };
    assert_eq!(members.len(), 4);
    assert_eq!(parsed.arena.kind(members[0]), Some(NodeKind::ClassProperty));
    use crate::syntax::node::MethodKind;
    let NodeData::ClassMethod { method_kind, .. } = &parsed.arena.get(members[1]).unwrap().data
    else {
        panic!("expected a method");
    };
    assert_eq!(*method_kind, MethodKind::Constructor);
    let NodeData::ClassMethod { method_kind, .. } = &parsed.arena.get(members[2]).unwrap().data
    else {
        panic!("expected a getter");
    };
    assert_eq!(*method_kind, MethodKind::Get);
    let NodeData::ClassMethod {
        is_async,
        is_generator,
        ..
    } = &parsed.arena.get(members[3]).unwrap().data
    else {
        panic!("expected an async generator method");
    };
    assert!(is_async);
    assert!(is_generator);
}

#[test]
fn regex_in_expression_position() {
    let parsed = parse_module("let re = /ab+c/gi;");
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let stmts = statements(&parsed);
    let NodeData::VariableStatement { declarations, .. } =
        &parsed.arena.get(stmts[0]).unwrap().data
    else {
        panic!("expected a variable statement");
    };
    let NodeData::VariableDeclaration { initializer, .. } =
        &parsed.arena.get(declarations[0]).unwrap().data
    else {
        panic!("expected a declaration");
    };
    let NodeData::RegexLiteral { text } = &parsed.arena.get(*initializer).unwrap().data else {
        panic!("expected a regex literal");
    };
    assert_eq!(text, "/ab+c/gi");
}
