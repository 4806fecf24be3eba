//! Syntax tree model and parsers for the aspect toolchain.
//!
//! The tree is an arena of immutable, tagged nodes (`syntax`). The JS/JSX
//! parser (`parser`) is hand-written recursive descent with
//! precedence-climbing expressions and local error recovery: it always
//! returns a tree, accumulating diagnostics instead of failing. The compact
//! CSS parser (`css`) produces stylesheet nodes into the same arena.

pub mod syntax;
pub use aspect_scanner::SyntaxKind;
pub use syntax::arena::{NodeArena, NodeIndex, NodeList};
pub use syntax::node::{DeclKind, MethodKind, Node, NodeData, NodeKind};

pub mod parser;
pub use parser::{DialectFlags, Parse, ParseOptions, SourceType, parse};

pub mod css;
pub use css::parse_css;
