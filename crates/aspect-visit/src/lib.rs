//! Tree traversal and rewriting.
//!
//! A registered [`Visitor`] sees every node twice, on the way down (`enter`)
//! and on the way up (`exit`), and answers with a [`VisitSignal`]: keep the
//! node, replace it with one or several freshly allocated nodes, or remove
//! it. The engine rebuilds ancestors of changed children through the
//! exhaustive child maps in `aspect-parser`, so untouched subtrees keep
//! their indexes and comments ride along by id.

pub mod context;
pub mod rules;
pub mod scope;
pub mod suppressions;
pub mod visitor;

pub use context::CompilerContext;
pub use rules::default_rules;
pub use scope::{Binding, BindingKind, Scope, ScopeId, ScopeKind, ScopeTree, rename_binding};
pub use visitor::{VisitSignal, Visitor, run_visitors};
