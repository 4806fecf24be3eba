//! JavaScript/JSX scanner for the aspect toolchain.
//!
//! This crate provides the lexical analysis phase:
//! - `SyntaxKind` - Token types
//! - `ScannerState` - Tokenizer state machine
//! - `TokenFlags` - Per-token facts (preceding line break, unterminated)
//!
//! The scanner is context-free: the parser drives mode switches (regex,
//! template continuation, JSX text) through the `rescan_*`/`scan_jsx_*`
//! entry points based on grammatical context.

pub mod syntax_kind;
pub use syntax_kind::SyntaxKind;

pub mod scanner;
pub use scanner::{ScannerCheckpoint, ScannerState, TokenFlags};
