//! Declared child fields ("visitor keys") and binding fields per node kind.
//!
//! `children` and `map_children` are the two faces of the same declaration:
//! the former enumerates child indexes in field order for descending, the
//! latter rebuilds a payload with some children exchanged. Both are
//! exhaustive matches, so adding a node kind without declaring its keys does
//! not compile.

use smallvec::SmallVec;

use super::arena::{NodeIndex, NodeList};
use super::node::{NodeData, NodeKind};

pub type ChildVec = SmallVec<[NodeIndex; 8]>;

/// Child indexes of a payload, in declared field order, `NONE` entries
/// omitted. List fields contribute their elements in order.
pub fn children(data: &NodeData) -> ChildVec {
    use NodeData as D;
    let mut out = ChildVec::new();
    {
        let one = |out: &mut ChildVec, idx: NodeIndex| {
            if idx.is_some() {
                out.push(idx);
            }
        };
        let many = |out: &mut ChildVec, list: &NodeList| {
            out.extend(list.iter().copied().filter(|idx| idx.is_some()));
        };
        match data {
            D::SourceFile { statements } => many(&mut out, statements),
            D::Block { statements } => many(&mut out, statements),
            D::EmptyStatement | D::DebuggerStatement | D::BogusStatement => {}
            D::ExpressionStatement { expression } => one(&mut out, *expression),
            D::VariableStatement { declarations, .. } => many(&mut out, declarations),
            D::VariableDeclaration { name, initializer } => {
                one(&mut out, *name);
                one(&mut out, *initializer);
            }
            D::IfStatement {
                test,
                consequent,
                alternate,
            } => {
                one(&mut out, *test);
                one(&mut out, *consequent);
                one(&mut out, *alternate);
            }
            D::ForStatement {
                initializer,
                test,
                update,
                body,
            } => {
                one(&mut out, *initializer);
                one(&mut out, *test);
                one(&mut out, *update);
                one(&mut out, *body);
            }
            D::ForInStatement { left, right, body } | D::ForOfStatement { left, right, body } => {
                one(&mut out, *left);
                one(&mut out, *right);
                one(&mut out, *body);
            }
            D::WhileStatement { test, body } => {
                one(&mut out, *test);
                one(&mut out, *body);
            }
            D::DoWhileStatement { body, test } => {
                one(&mut out, *body);
                one(&mut out, *test);
            }
            D::SwitchStatement {
                discriminant,
                cases,
            } => {
                one(&mut out, *discriminant);
                many(&mut out, cases);
            }
            D::CaseClause { test, consequent } => {
                one(&mut out, *test);
                many(&mut out, consequent);
            }
            D::TryStatement {
                block,
                handler,
                finalizer,
            } => {
                one(&mut out, *block);
                one(&mut out, *handler);
                one(&mut out, *finalizer);
            }
            D::CatchClause { param, body } => {
                one(&mut out, *param);
                one(&mut out, *body);
            }
            D::ReturnStatement { argument }
            | D::ThrowStatement { argument }
            | D::SpreadElement { argument }
            | D::RestElement { argument }
            | D::JsxSpreadAttribute { argument } => one(&mut out, *argument),
            D::BreakStatement { label } | D::ContinueStatement { label } => one(&mut out, *label),
            D::LabeledStatement { label, body } => {
                one(&mut out, *label);
                one(&mut out, *body);
            }
            D::FunctionDeclaration {
                name, params, body, ..
            }
            | D::FunctionExpression {
                name, params, body, ..
            } => {
                one(&mut out, *name);
                many(&mut out, params);
                one(&mut out, *body);
            }
            D::ClassDeclaration {
                name,
                extends,
                members,
            }
            | D::ClassExpression {
                name,
                extends,
                members,
            } => {
                one(&mut out, *name);
                one(&mut out, *extends);
                many(&mut out, members);
            }
            D::ClassMethod {
                name, params, body, ..
            }
            | D::ObjectMethod {
                name, params, body, ..
            } => {
                one(&mut out, *name);
                many(&mut out, params);
                one(&mut out, *body);
            }
            D::ClassProperty { name, value, .. } => {
                one(&mut out, *name);
                one(&mut out, *value);
            }
            D::ImportDeclaration {
                default_binding,
                namespace_binding,
                named,
                source,
            } => {
                one(&mut out, *default_binding);
                one(&mut out, *namespace_binding);
                many(&mut out, named);
                one(&mut out, *source);
            }
            D::ImportSpecifier { imported, local } => {
                one(&mut out, *imported);
                one(&mut out, *local);
            }
            D::ExportNamedDeclaration {
                declaration,
                specifiers,
                source,
            } => {
                one(&mut out, *declaration);
                many(&mut out, specifiers);
                one(&mut out, *source);
            }
            D::ExportSpecifier { local, exported } => {
                one(&mut out, *local);
                one(&mut out, *exported);
            }
            D::ExportDefaultDeclaration { declaration } => one(&mut out, *declaration),
            D::Identifier { .. }
            | D::NumericLiteral { .. }
            | D::StringLiteral { .. }
            | D::BooleanLiteral { .. }
            | D::NullLiteral
            | D::RegexLiteral { .. }
            | D::TemplateElement { .. }
            | D::ThisExpression
            | D::SuperExpression
            | D::Elision
            | D::BogusExpression
            | D::JsxText { .. }
            | D::JsxName { .. } => {}
            D::TemplateLiteral {
                quasis,
                expressions,
            } => {
                many(&mut out, quasis);
                many(&mut out, expressions);
            }
            D::TaggedTemplateExpression { tag, quasi } => {
                one(&mut out, *tag);
                one(&mut out, *quasi);
            }
            D::ArrayLiteral { elements } | D::ArrayPattern { elements } => {
                many(&mut out, elements)
            }
            D::ObjectLiteral { members } => many(&mut out, members),
            D::ObjectPattern { properties } => many(&mut out, properties),
            D::PropertyAssignment { name, value, .. } | D::PropertyPattern { key: name, value, .. } => {
                one(&mut out, *name);
                one(&mut out, *value);
            }
            D::ShorthandProperty { name } => one(&mut out, *name),
            D::ShorthandPropertyPattern { name, initializer } => {
                one(&mut out, *name);
                one(&mut out, *initializer);
            }
            D::ArrowFunction { params, body, .. } => {
                many(&mut out, params);
                one(&mut out, *body);
            }
            D::BinaryExpression { left, right, .. }
            | D::AssignmentExpression { left, right, .. } => {
                one(&mut out, *left);
                one(&mut out, *right);
            }
            D::ConditionalExpression {
                test,
                consequent,
                alternate,
            } => {
                one(&mut out, *test);
                one(&mut out, *consequent);
                one(&mut out, *alternate);
            }
            D::UnaryExpression { argument, .. } | D::UpdateExpression { argument, .. } => {
                one(&mut out, *argument)
            }
            D::MemberExpression {
                object, property, ..
            } => {
                one(&mut out, *object);
                one(&mut out, *property);
            }
            D::ComputedMemberExpression { object, index, .. } => {
                one(&mut out, *object);
                one(&mut out, *index);
            }
            D::CallExpression {
                callee, arguments, ..
            } => {
                one(&mut out, *callee);
                many(&mut out, arguments);
            }
            D::NewExpression { callee, arguments } => {
                one(&mut out, *callee);
                many(&mut out, arguments);
            }
            D::SequenceExpression { expressions } => many(&mut out, expressions),
            D::YieldExpression { argument, .. } => one(&mut out, *argument),
            D::AwaitExpression { argument } => one(&mut out, *argument),
            D::AssignmentPattern {
                target,
                initializer,
            } => {
                one(&mut out, *target);
                one(&mut out, *initializer);
            }
            D::JsxElement {
                name,
                attributes,
                children,
                ..
            } => {
                one(&mut out, *name);
                many(&mut out, attributes);
                many(&mut out, children);
            }
            D::JsxFragment { children } => many(&mut out, children),
            D::JsxAttribute { name, value } => {
                one(&mut out, *name);
                one(&mut out, *value);
            }
            D::JsxExpression { expression } => one(&mut out, *expression),
            D::CssStylesheet { items } => many(&mut out, items),
            D::CssRule {
                selectors,
                declarations,
            } => {
                many(&mut out, selectors);
                many(&mut out, declarations);
            }
            D::CssAtRule { body, .. } => many(&mut out, body),
            D::CssSelector { .. } | D::CssDeclaration { .. } => {}
        }
    }
    out
}

/// How one child changed during a rewrite.
#[derive(Clone, Debug)]
pub enum ChildChange {
    Keep,
    Replace(NodeIndex),
    /// Only legal for children held in a list field.
    ReplaceMany(Vec<NodeIndex>),
    /// Only legal for children held in a list field.
    Remove,
}

/// Result of [`map_children`].
pub struct Rebuilt {
    pub data: NodeData,
    pub changed: bool,
    /// Set when a `Remove`/`ReplaceMany` was requested for a non-list child.
    pub structural_error: Option<String>,
}

struct Mapper<'a> {
    f: &'a mut dyn FnMut(NodeIndex) -> ChildChange,
    changed: bool,
    structural_error: Option<String>,
}

impl<'a> Mapper<'a> {
    fn one(&mut self, idx: NodeIndex) -> NodeIndex {
        if idx.is_none() {
            return idx;
        }
        match (self.f)(idx) {
            ChildChange::Keep => idx,
            ChildChange::Replace(new_idx) => {
                if new_idx != idx {
                    self.changed = true;
                }
                new_idx
            }
            ChildChange::ReplaceMany(_) | ChildChange::Remove => {
                self.structural_error.get_or_insert_with(|| {
                    "remove/replace-many signal for a child that is not part of a list".to_string()
                });
                idx
            }
        }
    }

    fn many(&mut self, list: &NodeList) -> NodeList {
        let mut out = NodeList::with_capacity(list.len());
        for &idx in list {
            if idx.is_none() {
                out.push(idx);
                continue;
            }
            match (self.f)(idx) {
                ChildChange::Keep => out.push(idx),
                ChildChange::Replace(new_idx) => {
                    if new_idx != idx {
                        self.changed = true;
                    }
                    out.push(new_idx);
                }
                ChildChange::ReplaceMany(new_indexes) => {
                    self.changed = true;
                    out.extend(new_indexes);
                }
                ChildChange::Remove => {
                    self.changed = true;
                }
            }
        }
        out
    }
}

/// Rebuild a payload, letting `f` exchange each child. Fields are visited in
/// the same order `children` declares.
pub fn map_children(data: &NodeData, f: &mut dyn FnMut(NodeIndex) -> ChildChange) -> Rebuilt {
    use NodeData as D;
    let mut m = Mapper {
        f,
        changed: false,
        structural_error: None,
    };
    let data = match data {
        D::SourceFile { statements } => D::SourceFile {
            statements: m.many(statements),
        },
        D::Block { statements } => D::Block {
            statements: m.many(statements),
        },
        D::EmptyStatement => D::EmptyStatement,
        D::DebuggerStatement => D::DebuggerStatement,
        D::BogusStatement => D::BogusStatement,
        D::ExpressionStatement { expression } => D::ExpressionStatement {
            expression: m.one(*expression),
        },
        D::VariableStatement {
            decl_kind,
            declarations,
        } => D::VariableStatement {
            decl_kind: *decl_kind,
            declarations: m.many(declarations),
        },
        D::VariableDeclaration { name, initializer } => D::VariableDeclaration {
            name: m.one(*name),
            initializer: m.one(*initializer),
        },
        D::IfStatement {
            test,
            consequent,
            alternate,
        } => D::IfStatement {
            test: m.one(*test),
            consequent: m.one(*consequent),
            alternate: m.one(*alternate),
        },
        D::ForStatement {
            initializer,
            test,
            update,
            body,
        } => D::ForStatement {
            initializer: m.one(*initializer),
            test: m.one(*test),
            update: m.one(*update),
            body: m.one(*body),
        },
        D::ForInStatement { left, right, body } => D::ForInStatement {
            left: m.one(*left),
            right: m.one(*right),
            body: m.one(*body),
        },
        D::ForOfStatement { left, right, body } => D::ForOfStatement {
            left: m.one(*left),
            right: m.one(*right),
            body: m.one(*body),
        },
        D::WhileStatement { test, body } => D::WhileStatement {
            test: m.one(*test),
            body: m.one(*body),
        },
        D::DoWhileStatement { body, test } => D::DoWhileStatement {
            body: m.one(*body),
            test: m.one(*test),
        },
        D::SwitchStatement {
            discriminant,
            cases,
        } => D::SwitchStatement {
            discriminant: m.one(*discriminant),
            cases: m.many(cases),
        },
        D::CaseClause { test, consequent } => D::CaseClause {
            test: m.one(*test),
            consequent: m.many(consequent),
        },
        D::TryStatement {
            block,
            handler,
            finalizer,
        } => D::TryStatement {
            block: m.one(*block),
            handler: m.one(*handler),
            finalizer: m.one(*finalizer),
        },
        D::CatchClause { param, body } => D::CatchClause {
            param: m.one(*param),
            body: m.one(*body),
        },
        D::ReturnStatement { argument } => D::ReturnStatement {
            argument: m.one(*argument),
        },
        D::BreakStatement { label } => D::BreakStatement {
            label: m.one(*label),
        },
        D::ContinueStatement { label } => D::ContinueStatement {
            label: m.one(*label),
        },
        D::ThrowStatement { argument } => D::ThrowStatement {
            argument: m.one(*argument),
        },
        D::LabeledStatement { label, body } => D::LabeledStatement {
            label: m.one(*label),
            body: m.one(*body),
        },
        D::FunctionDeclaration {
            name,
            params,
            body,
            is_async,
            is_generator,
        } => D::FunctionDeclaration {
            name: m.one(*name),
            params: m.many(params),
            body: m.one(*body),
            is_async: *is_async,
            is_generator: *is_generator,
        },
        D::ClassDeclaration {
            name,
            extends,
            members,
        } => D::ClassDeclaration {
            name: m.one(*name),
            extends: m.one(*extends),
            members: m.many(members),
        },
        D::ClassMethod {
            name,
            computed,
            method_kind,
            is_static,
            params,
            body,
            is_async,
            is_generator,
        } => D::ClassMethod {
            name: m.one(*name),
            computed: *computed,
            method_kind: *method_kind,
            is_static: *is_static,
            params: m.many(params),
            body: m.one(*body),
            is_async: *is_async,
            is_generator: *is_generator,
        },
        D::ClassProperty {
            name,
            computed,
            is_static,
            value,
        } => D::ClassProperty {
            name: m.one(*name),
            computed: *computed,
            is_static: *is_static,
            value: m.one(*value),
        },
        D::ImportDeclaration {
            default_binding,
            namespace_binding,
            named,
            source,
        } => D::ImportDeclaration {
            default_binding: m.one(*default_binding),
            namespace_binding: m.one(*namespace_binding),
            named: m.many(named),
            source: m.one(*source),
        },
        D::ImportSpecifier { imported, local } => D::ImportSpecifier {
            imported: m.one(*imported),
            local: m.one(*local),
        },
        D::ExportNamedDeclaration {
            declaration,
            specifiers,
            source,
        } => D::ExportNamedDeclaration {
            declaration: m.one(*declaration),
            specifiers: m.many(specifiers),
            source: m.one(*source),
        },
        D::ExportSpecifier { local, exported } => D::ExportSpecifier {
            local: m.one(*local),
            exported: m.one(*exported),
        },
        D::ExportDefaultDeclaration { declaration } => D::ExportDefaultDeclaration {
            declaration: m.one(*declaration),
        },
        D::TemplateLiteral {
            quasis,
            expressions,
        } => D::TemplateLiteral {
            quasis: m.many(quasis),
            expressions: m.many(expressions),
        },
        D::TaggedTemplateExpression { tag, quasi } => D::TaggedTemplateExpression {
            tag: m.one(*tag),
            quasi: m.one(*quasi),
        },
        D::ArrayLiteral { elements } => D::ArrayLiteral {
            elements: m.many(elements),
        },
        D::ObjectLiteral { members } => D::ObjectLiteral {
            members: m.many(members),
        },
        D::PropertyAssignment {
            name,
            computed,
            value,
        } => D::PropertyAssignment {
            name: m.one(*name),
            computed: *computed,
            value: m.one(*value),
        },
        D::ShorthandProperty { name } => D::ShorthandProperty { name: m.one(*name) },
        D::ObjectMethod {
            name,
            computed,
            method_kind,
            params,
            body,
            is_async,
            is_generator,
        } => D::ObjectMethod {
            name: m.one(*name),
            computed: *computed,
            method_kind: *method_kind,
            params: m.many(params),
            body: m.one(*body),
            is_async: *is_async,
            is_generator: *is_generator,
        },
        D::SpreadElement { argument } => D::SpreadElement {
            argument: m.one(*argument),
        },
        D::FunctionExpression {
            name,
            params,
            body,
            is_async,
            is_generator,
        } => D::FunctionExpression {
            name: m.one(*name),
            params: m.many(params),
            body: m.one(*body),
            is_async: *is_async,
            is_generator: *is_generator,
        },
        D::ArrowFunction {
            params,
            body,
            is_async,
        } => D::ArrowFunction {
            params: m.many(params),
            body: m.one(*body),
            is_async: *is_async,
        },
        D::ClassExpression {
            name,
            extends,
            members,
        } => D::ClassExpression {
            name: m.one(*name),
            extends: m.one(*extends),
            members: m.many(members),
        },
        D::BinaryExpression {
            operator,
            left,
            right,
        } => D::BinaryExpression {
            operator: *operator,
            left: m.one(*left),
            right: m.one(*right),
        },
        D::AssignmentExpression {
            operator,
            left,
            right,
        } => D::AssignmentExpression {
            operator: *operator,
            left: m.one(*left),
            right: m.one(*right),
        },
        D::ConditionalExpression {
            test,
            consequent,
            alternate,
        } => D::ConditionalExpression {
            test: m.one(*test),
            consequent: m.one(*consequent),
            alternate: m.one(*alternate),
        },
        D::UnaryExpression { operator, argument } => D::UnaryExpression {
            operator: *operator,
            argument: m.one(*argument),
        },
        D::UpdateExpression {
            operator,
            argument,
            prefix,
        } => D::UpdateExpression {
            operator: *operator,
            argument: m.one(*argument),
            prefix: *prefix,
        },
        D::MemberExpression {
            object,
            property,
            optional,
        } => D::MemberExpression {
            object: m.one(*object),
            property: m.one(*property),
            optional: *optional,
        },
        D::ComputedMemberExpression {
            object,
            index,
            optional,
        } => D::ComputedMemberExpression {
            object: m.one(*object),
            index: m.one(*index),
            optional: *optional,
        },
        D::CallExpression {
            callee,
            arguments,
            optional,
        } => D::CallExpression {
            callee: m.one(*callee),
            arguments: m.many(arguments),
            optional: *optional,
        },
        D::NewExpression { callee, arguments } => D::NewExpression {
            callee: m.one(*callee),
            arguments: m.many(arguments),
        },
        D::SequenceExpression { expressions } => D::SequenceExpression {
            expressions: m.many(expressions),
        },
        D::YieldExpression { argument, delegate } => D::YieldExpression {
            argument: m.one(*argument),
            delegate: *delegate,
        },
        D::AwaitExpression { argument } => D::AwaitExpression {
            argument: m.one(*argument),
        },
        D::ArrayPattern { elements } => D::ArrayPattern {
            elements: m.many(elements),
        },
        D::ObjectPattern { properties } => D::ObjectPattern {
            properties: m.many(properties),
        },
        D::PropertyPattern {
            key,
            computed,
            value,
        } => D::PropertyPattern {
            key: m.one(*key),
            computed: *computed,
            value: m.one(*value),
        },
        D::ShorthandPropertyPattern { name, initializer } => D::ShorthandPropertyPattern {
            name: m.one(*name),
            initializer: m.one(*initializer),
        },
        D::RestElement { argument } => D::RestElement {
            argument: m.one(*argument),
        },
        D::AssignmentPattern {
            target,
            initializer,
        } => D::AssignmentPattern {
            target: m.one(*target),
            initializer: m.one(*initializer),
        },
        D::JsxElement {
            name,
            attributes,
            children,
            self_closing,
        } => D::JsxElement {
            name: m.one(*name),
            attributes: m.many(attributes),
            children: m.many(children),
            self_closing: *self_closing,
        },
        D::JsxFragment { children } => D::JsxFragment {
            children: m.many(children),
        },
        D::JsxAttribute { name, value } => D::JsxAttribute {
            name: m.one(*name),
            value: m.one(*value),
        },
        D::JsxSpreadAttribute { argument } => D::JsxSpreadAttribute {
            argument: m.one(*argument),
        },
        D::JsxExpression { expression } => D::JsxExpression {
            expression: m.one(*expression),
        },
        D::CssStylesheet { items } => D::CssStylesheet {
            items: m.many(items),
        },
        D::CssRule {
            selectors,
            declarations,
        } => D::CssRule {
            selectors: m.many(selectors),
            declarations: m.many(declarations),
        },
        D::CssAtRule {
            name,
            prelude,
            body,
            has_block,
        } => D::CssAtRule {
            name: name.clone(),
            prelude: prelude.clone(),
            body: m.many(body),
            has_block: *has_block,
        },
        // Leaves: identifiers, literals, template chunks, JSX text/names,
        // CSS selectors/declarations, bogus and marker nodes.
        other => other.clone(),
    };
    Rebuilt {
        data,
        changed: m.changed,
        structural_error: m.structural_error,
    }
}

/// Fields that introduce a name binding, per kind. Consulted by the scope
/// resolver; kinds not listed introduce nothing.
pub fn binding_keys(kind: NodeKind) -> &'static [&'static str] {
    use NodeKind as K;
    match kind {
        K::VariableDeclaration => &["name"],
        K::FunctionDeclaration | K::FunctionExpression => &["name", "params"],
        K::ArrowFunction => &["params"],
        K::ClassDeclaration | K::ClassExpression => &["name"],
        K::ClassMethod | K::ObjectMethod => &["params"],
        K::CatchClause => &["param"],
        K::ImportDeclaration => &["default_binding", "namespace_binding"],
        K::ImportSpecifier => &["local"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_common::span::Span;
    use crate::syntax::arena::NodeArena;

    #[test]
    fn children_follow_declared_field_order() {
        let mut arena = NodeArena::new();
        let test = arena.add(
            NodeData::Identifier { name: "t".into() },
            Span::new(4, 5),
        );
        let cons = arena.add(NodeData::Block { statements: vec![] }, Span::new(7, 9));
        let data = NodeData::IfStatement {
            test,
            consequent: cons,
            alternate: NodeIndex::NONE,
        };
        let kids = children(&data);
        assert_eq!(kids.as_slice(), &[test, cons]);
    }

    #[test]
    fn map_children_flags_removal_outside_lists() {
        let mut arena = NodeArena::new();
        let arg = arena.add(NodeData::NullLiteral, Span::new(0, 4));
        let data = NodeData::ReturnStatement { argument: arg };
        let rebuilt = map_children(&data, &mut |_| ChildChange::Remove);
        assert!(rebuilt.structural_error.is_some());
        assert!(!rebuilt.changed);
    }

    #[test]
    fn map_children_splices_lists() {
        let mut arena = NodeArena::new();
        let a = arena.add(NodeData::EmptyStatement, Span::new(0, 1));
        let b = arena.add(NodeData::EmptyStatement, Span::new(1, 2));
        let c = arena.add(NodeData::DebuggerStatement, Span::new(2, 11));
        let data = NodeData::Block {
            statements: vec![a, b],
        };
        let rebuilt = map_children(&data, &mut |idx| {
            if idx == a {
                ChildChange::ReplaceMany(vec![c, c])
            } else {
                ChildChange::Remove
            }
        });
        assert!(rebuilt.changed);
        match rebuilt.data {
            NodeData::Block { statements } => assert_eq!(statements, vec![c, c]),
            _ => panic!("kind changed during rebuild"),
        }
    }

    #[test]
    fn binding_keys_cover_declaring_kinds() {
        assert_eq!(binding_keys(NodeKind::VariableDeclaration), &["name"]);
        assert!(binding_keys(NodeKind::IfStatement).is_empty());
    }
}
