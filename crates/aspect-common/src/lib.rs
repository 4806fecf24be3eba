//! Common types and utilities for the aspect toolchain.
//!
//! This crate provides foundational types used across all aspect crates:
//! - Source spans (`Span`) in byte offsets
//! - Line/column positions (`Position`, `SourceLocation`, `LineMap`)
//! - Diagnostics (`Diagnostic`, `Severity`, `DiagnosticTags`, `Advice`)
//! - The comment side table (`CommentsConsumer`)

// Span - Source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Position/Range types for line/column source locations
pub mod position;
pub use position::{LineMap, OneIndexed, Position, SourceLocation, ZeroIndexed};

// Accumulated plain-data diagnostics
pub mod diagnostics;
pub use diagnostics::{Advice, Diagnostic, DiagnosticTags, Severity, category};

// Comment side table
pub mod comments;
pub use comments::{Comment, CommentId, CommentKind, CommentsConsumer};
