//! Lexical scope analysis.
//!
//! Built once per visitor run from the input tree. `var` and function
//! declarations hoist to the nearest function or module scope; `let`,
//! `const`, classes, parameters, and catch bindings stay in the scope that
//! declares them. Every node is mapped to its innermost enclosing scope so
//! rules can resolve identifier references without parent pointers.

use aspect_parser::syntax::visit_keys::{ChildChange, children, map_children};
use aspect_parser::{DeclKind, NodeArena, NodeData, NodeIndex};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const MODULE: ScopeId = ScopeId(0);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Module,
    Function,
    Block,
    Class,
    Catch,
    Switch,
}

impl ScopeKind {
    /// Scopes that `var` and function declarations hoist to.
    fn is_hoist_boundary(self) -> bool {
        matches!(self, ScopeKind::Module | ScopeKind::Function)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingKind {
    Var,
    Let,
    Const,
    Function,
    Class,
    Parameter,
    CatchParameter,
    Import,
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub name: String,
    /// The identifier node inside the declaring construct.
    pub declaration: NodeIndex,
    pub kind: BindingKind,
}

#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// The node that introduced the scope.
    pub owner: NodeIndex,
    /// Declaration order preserved for deterministic iteration.
    pub bindings: IndexMap<String, Binding>,
}

#[derive(Debug, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    enclosing: FxHashMap<NodeIndex, ScopeId>,
}

impl ScopeTree {
    pub fn build(arena: &NodeArena, root: NodeIndex) -> ScopeTree {
        let mut tree = ScopeTree::default();
        let module = tree.new_scope(ScopeKind::Module, None, root);
        tree.walk(arena, root, module);
        tree
    }

    fn new_scope(&mut self, kind: ScopeKind, parent: Option<ScopeId>, owner: NodeIndex) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            parent,
            owner,
            bindings: IndexMap::new(),
        });
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes
            .iter()
            .enumerate()
            .map(|(i, s)| (ScopeId(i as u32), s))
    }

    /// Innermost scope containing the node, as recorded during the build.
    pub fn enclosing_scope(&self, node: NodeIndex) -> Option<ScopeId> {
        self.enclosing.get(&node).copied()
    }

    /// Resolve a name from a scope outward; answers the scope that declares
    /// it and the binding.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<(ScopeId, &Binding)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(binding) = scope.bindings.get(name) {
                return Some((id, binding));
            }
            current = scope.parent;
        }
        None
    }

    pub fn is_declared(&self, from: ScopeId, name: &str) -> bool {
        self.resolve(from, name).is_some()
    }

    fn hoist_target(&self, from: ScopeId) -> ScopeId {
        let mut current = from;
        loop {
            let scope = self.scope(current);
            if scope.kind.is_hoist_boundary() {
                return current;
            }
            match scope.parent {
                Some(parent) => current = parent,
                None => return current,
            }
        }
    }

    fn declare(&mut self, scope: ScopeId, name: &str, declaration: NodeIndex, kind: BindingKind) {
        // First declaration wins; redeclarations keep the original site.
        self.scopes[scope.0 as usize]
            .bindings
            .entry(name.to_string())
            .or_insert_with(|| Binding {
                name: name.to_string(),
                declaration,
                kind,
            });
    }

    fn bind_pattern(
        &mut self,
        arena: &NodeArena,
        pattern: NodeIndex,
        scope: ScopeId,
        kind: BindingKind,
    ) {
        let Some(node) = arena.get(pattern) else {
            return;
        };
        match &node.data {
            NodeData::Identifier { name } => self.declare(scope, name, pattern, kind),
            NodeData::ArrayPattern { elements } => {
                for element in elements {
                    self.bind_pattern(arena, *element, scope, kind);
                }
            }
            NodeData::ObjectPattern { properties } => {
                for property in properties {
                    self.bind_pattern(arena, *property, scope, kind);
                }
            }
            NodeData::PropertyPattern { value, .. } => self.bind_pattern(arena, *value, scope, kind),
            NodeData::ShorthandPropertyPattern { name, .. } => {
                self.bind_pattern(arena, *name, scope, kind);
            }
            NodeData::RestElement { argument } => self.bind_pattern(arena, *argument, scope, kind),
            NodeData::AssignmentPattern { target, .. } => {
                self.bind_pattern(arena, *target, scope, kind);
            }
            _ => {}
        }
    }

    fn walk_all_children(&mut self, arena: &NodeArena, index: NodeIndex, scope: ScopeId) {
        let Some(node) = arena.get(index) else {
            return;
        };
        for child in children(&node.data) {
            self.walk(arena, child, scope);
        }
    }

    fn walk(&mut self, arena: &NodeArena, index: NodeIndex, scope: ScopeId) {
        let Some(node) = arena.get(index) else {
            return;
        };
        self.enclosing.insert(index, scope);

        match &node.data {
            NodeData::VariableStatement {
                decl_kind,
                declarations,
            } => {
                let (target, kind) = match decl_kind {
                    DeclKind::Var => (self.hoist_target(scope), BindingKind::Var),
                    DeclKind::Let => (scope, BindingKind::Let),
                    DeclKind::Const => (scope, BindingKind::Const),
                };
                for declaration in declarations.clone() {
                    if let Some(NodeData::VariableDeclaration { name, .. }) =
                        arena.get(declaration).map(|n| &n.data)
                    {
                        self.bind_pattern(arena, *name, target, kind);
                    }
                    self.walk(arena, declaration, scope);
                }
            }
            NodeData::FunctionDeclaration {
                name, params, body, ..
            } => {
                if name.is_some() {
                    self.bind_pattern(arena, *name, self.hoist_target(scope), BindingKind::Function);
                    self.walk(arena, *name, scope);
                }
                let inner = self.new_scope(ScopeKind::Function, Some(scope), index);
                for param in params.clone() {
                    self.bind_pattern(arena, param, inner, BindingKind::Parameter);
                    self.walk(arena, param, inner);
                }
                self.walk(arena, *body, inner);
            }
            NodeData::FunctionExpression {
                name, params, body, ..
            } => {
                let inner = self.new_scope(ScopeKind::Function, Some(scope), index);
                if name.is_some() {
                    // Named function expressions can call themselves.
                    self.bind_pattern(arena, *name, inner, BindingKind::Function);
                    self.walk(arena, *name, inner);
                }
                for param in params.clone() {
                    self.bind_pattern(arena, param, inner, BindingKind::Parameter);
                    self.walk(arena, param, inner);
                }
                self.walk(arena, *body, inner);
            }
            NodeData::ArrowFunction { params, body, .. } => {
                let inner = self.new_scope(ScopeKind::Function, Some(scope), index);
                for param in params.clone() {
                    self.bind_pattern(arena, param, inner, BindingKind::Parameter);
                    self.walk(arena, param, inner);
                }
                self.walk(arena, *body, inner);
            }
            NodeData::ClassDeclaration {
                name,
                extends,
                members,
            } => {
                if name.is_some() {
                    self.bind_pattern(arena, *name, scope, BindingKind::Class);
                    self.walk(arena, *name, scope);
                }
                self.walk(arena, *extends, scope);
                let inner = self.new_scope(ScopeKind::Class, Some(scope), index);
                if name.is_some() {
                    self.bind_pattern(arena, *name, inner, BindingKind::Class);
                }
                for member in members.clone() {
                    self.walk(arena, member, inner);
                }
            }
            NodeData::ClassExpression {
                name,
                extends,
                members,
            } => {
                self.walk(arena, *extends, scope);
                let inner = self.new_scope(ScopeKind::Class, Some(scope), index);
                if name.is_some() {
                    self.bind_pattern(arena, *name, inner, BindingKind::Class);
                    self.walk(arena, *name, inner);
                }
                for member in members.clone() {
                    self.walk(arena, member, inner);
                }
            }
            NodeData::ClassMethod {
                name, params, body, ..
            }
            | NodeData::ObjectMethod {
                name, params, body, ..
            } => {
                // Computed keys evaluate in the outer scope.
                self.walk(arena, *name, scope);
                let inner = self.new_scope(ScopeKind::Function, Some(scope), index);
                for param in params.clone() {
                    self.bind_pattern(arena, param, inner, BindingKind::Parameter);
                    self.walk(arena, param, inner);
                }
                self.walk(arena, *body, inner);
            }
            NodeData::Block { statements } => {
                let inner = self.new_scope(ScopeKind::Block, Some(scope), index);
                for statement in statements.clone() {
                    self.walk(arena, statement, inner);
                }
            }
            NodeData::SwitchStatement {
                discriminant,
                cases,
            } => {
                self.walk(arena, *discriminant, scope);
                // One shared scope for all clauses, as `let` in one case is
                // visible (in the TDZ sense) to the others.
                let inner = self.new_scope(ScopeKind::Switch, Some(scope), index);
                for case in cases.clone() {
                    self.walk(arena, case, inner);
                }
            }
            NodeData::CatchClause { param, body } => {
                let inner = self.new_scope(ScopeKind::Catch, Some(scope), index);
                if param.is_some() {
                    self.bind_pattern(arena, *param, inner, BindingKind::CatchParameter);
                    self.walk(arena, *param, inner);
                }
                self.walk(arena, *body, inner);
            }
            NodeData::ForStatement { .. }
            | NodeData::ForInStatement { .. }
            | NodeData::ForOfStatement { .. } => {
                // The loop head's `let`/`const` lives in a scope wrapping
                // the body.
                let inner = self.new_scope(ScopeKind::Block, Some(scope), index);
                self.walk_all_children(arena, index, inner);
            }
            NodeData::ImportDeclaration {
                default_binding,
                namespace_binding,
                named,
                ..
            } => {
                if default_binding.is_some() {
                    self.bind_pattern(arena, *default_binding, ScopeId::MODULE, BindingKind::Import);
                }
                if namespace_binding.is_some() {
                    self.bind_pattern(
                        arena,
                        *namespace_binding,
                        ScopeId::MODULE,
                        BindingKind::Import,
                    );
                }
                for specifier in named.clone() {
                    if let Some(NodeData::ImportSpecifier { local, .. }) =
                        arena.get(specifier).map(|n| &n.data)
                    {
                        self.bind_pattern(arena, *local, ScopeId::MODULE, BindingKind::Import);
                    }
                }
                self.walk_all_children(arena, index, scope);
            }
            _ => self.walk_all_children(arena, index, scope),
        }
    }
}

/// Rename every reference that resolves to `old_name` declared in
/// `target_scope`, returning the (possibly new) root. Shadowing scopes are
/// left alone because their references resolve elsewhere.
pub fn rename_binding(
    arena: &mut NodeArena,
    scopes: &ScopeTree,
    root: NodeIndex,
    target_scope: ScopeId,
    old_name: &str,
    new_name: &str,
) -> NodeIndex {
    rename_walk(arena, scopes, root, target_scope, old_name, new_name).unwrap_or(root)
}

fn rename_walk(
    arena: &mut NodeArena,
    scopes: &ScopeTree,
    index: NodeIndex,
    target_scope: ScopeId,
    old_name: &str,
    new_name: &str,
) -> Option<NodeIndex> {
    let node = arena.get(index)?.clone();

    if let NodeData::Identifier { name } = &node.data {
        if name != old_name {
            return None;
        }
        let from = scopes.enclosing_scope(index)?;
        let (declared_in, _) = scopes.resolve(from, old_name)?;
        if declared_in != target_scope {
            return None;
        }
        return Some(arena.add_with_comments(
            NodeData::Identifier {
                name: new_name.to_string(),
            },
            node.span,
            node.leading_comments.clone(),
            node.trailing_comments.clone(),
        ));
    }

    let rebuilt = map_children(&node.data, &mut |child| {
        match rename_walk(arena, scopes, child, target_scope, old_name, new_name) {
            Some(replacement) => ChildChange::Replace(replacement),
            None => ChildChange::Keep,
        }
    });
    if rebuilt.changed {
        Some(arena.add_with_comments(
            rebuilt.data,
            node.span,
            node.leading_comments,
            node.trailing_comments,
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspect_parser::{ParseOptions, parse};

    fn build(source: &str) -> (aspect_parser::Parse, ScopeTree) {
        let parsed = parse(source, "test.js", ParseOptions::default());
        assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
        let scopes = ScopeTree::build(&parsed.arena, parsed.root);
        (parsed, scopes)
    }

    #[test]
    fn var_hoists_out_of_blocks() {
        let (_, scopes) = build("function f() { if (x) { var hoisted = 1; let scoped = 2; } }");
        let function_scope = scopes
            .iter()
            .find(|(_, s)| s.kind == ScopeKind::Function)
            .map(|(id, _)| id)
            .unwrap();
        assert!(scopes.scope(function_scope).bindings.contains_key("hoisted"));
        assert!(!scopes.scope(function_scope).bindings.contains_key("scoped"));
        let block = scopes
            .iter()
            .filter(|(_, s)| s.kind == ScopeKind::Block)
            .find(|(_, s)| s.bindings.contains_key("scoped"));
        assert!(block.is_some());
    }

    #[test]
    fn imports_bind_in_the_module_scope() {
        let (_, scopes) = build("import d, { a as b } from \"m\";");
        let module = scopes.scope(ScopeId::MODULE);
        assert_eq!(module.bindings.get("d").map(|b| b.kind), Some(BindingKind::Import));
        assert!(module.bindings.contains_key("b"));
        assert!(!module.bindings.contains_key("a"));
    }

    #[test]
    fn parameters_shadow_outer_bindings() {
        let (parsed, scopes) = build("let x = 1; function f(x) { return x; }");
        // Find the `x` reference inside the return statement and resolve it.
        let reference = (0..parsed.arena.len() as u32)
            .map(NodeIndex)
            .filter(|idx| {
                parsed
                    .arena
                    .get(*idx)
                    .and_then(|n| n.identifier_name())
                    == Some("x")
            })
            .last()
            .unwrap();
        let from = scopes.enclosing_scope(reference).unwrap();
        let (declared_in, binding) = scopes.resolve(from, "x").unwrap();
        assert_eq!(binding.kind, BindingKind::Parameter);
        assert_eq!(scopes.scope(declared_in).kind, ScopeKind::Function);
    }

    #[test]
    fn rename_skips_shadowing_scopes() {
        let source = "let a = 1; f(a); function g(a) { return a; }";
        let mut parsed = parse(source, "test.js", ParseOptions::default());
        let scopes = ScopeTree::build(&parsed.arena, parsed.root);
        let root = rename_binding(
            &mut parsed.arena,
            &scopes,
            parsed.root,
            ScopeId::MODULE,
            "a",
            "renamed",
        );
        assert_ne!(root, parsed.root);

        // Count identifiers reachable from the new root by name.
        fn collect(
            arena: &NodeArena,
            index: NodeIndex,
            out: &mut Vec<String>,
        ) {
            let Some(node) = arena.get(index) else { return };
            if let Some(name) = node.identifier_name() {
                out.push(name.to_string());
            }
            for child in children(&node.data) {
                collect(arena, child, out);
            }
        }
        let mut names = Vec::new();
        collect(&parsed.arena, root, &mut names);
        let renamed = names.iter().filter(|n| *n == "renamed").count();
        let shadowed = names.iter().filter(|n| *n == "a").count();
        // declaration + call argument renamed; the parameter and its use stay
        assert_eq!(renamed, 2);
        assert_eq!(shadowed, 2);
    }
}
