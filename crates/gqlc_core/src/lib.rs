//! Core utilities for gqlc.
//!
//! This crate provides foundational types used throughout gqlc:
//! - `span`: Source location tracking
//! - `source`: The set of files a run reads from
//! - `text`: String interning
//! - `diagnostics`: Error reporting

pub mod diagnostics;
pub mod source;
pub mod span;
pub mod text;

pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSeverity, Label};
pub use source::{LineCol, SourceFile, SourceMap};
pub use span::{FileId, Span};
pub use text::{Interner, Text};
