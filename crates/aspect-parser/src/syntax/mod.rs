//! The shared syntax tree data model.
//!
//! Nodes are allocated once into a `NodeArena` and never mutated afterwards;
//! rewrites allocate replacement nodes and re-parent, sharing untouched
//! subtrees by index. Generic algorithms (traversal, rewrite, formatting)
//! work off the declared child enumeration in `visit_keys` instead of
//! per-kind special cases.

pub mod arena;
pub mod make;
pub mod node;
pub mod precedence;
pub mod visit_keys;
