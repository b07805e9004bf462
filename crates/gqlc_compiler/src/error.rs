//! Compiler errors.

use gqlc_core::{diagnostics::codes, Diagnostic, DiagnosticBag, LineCol, SourceMap, Span};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The document failed validation. Carries every rule violation.
#[derive(Debug, Error)]
#[error("validation of GraphQL document failed with {} error(s)", .diagnostics.error_count())]
pub struct ValidationError {
    pub diagnostics: DiagnosticBag,
}

/// What went wrong during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileErrorKind {
    UnknownField,
    UnknownFragment,
    UnknownType,
    IncompatibleTypeCondition,
    MissingRootType,
    FieldConflict,
}

impl CompileErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::UnknownField => codes::UNKNOWN_FIELD,
            Self::UnknownFragment => codes::UNKNOWN_FRAGMENT,
            Self::UnknownType => codes::UNDEFINED_TYPE,
            Self::IncompatibleTypeCondition => codes::INVALID_FRAGMENT,
            Self::MissingRootType => codes::MISSING_ROOT_TYPE,
            Self::FieldConflict => codes::FIELD_CONFLICT,
        }
    }
}

/// A fatal compilation error. No partial output is produced.
#[derive(Debug, Error)]
pub struct CompileError {
    pub kind: CompileErrorKind,
    pub message: String,
    pub span: Span,
    /// Path of the file the error points into; absent for synthetic sources.
    pub path: Option<PathBuf>,
    pub location: Option<LineCol>,
}

impl CompileError {
    pub(crate) fn new(
        kind: CompileErrorKind,
        message: impl Into<String>,
        span: Span,
        sources: &SourceMap,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
            path: sources.path(span.file).map(|path| path.to_path_buf()),
            location: sources.line_col(span),
        }
    }

    /// Converts into a diagnostic for rendering with source context.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind.code(), self.message.clone()).with_span(self.span, "here")
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}:", path.display())?;
        }
        if let Some(location) = &self.location {
            write!(f, "{location}:")?;
        }
        if self.path.is_some() || self.location.is_some() {
            f.write_str(" ")?;
        }
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_path() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("queries/hero.graphql", "query Hero {\n  hero { nam }\n}");
        let err = CompileError::new(
            CompileErrorKind::UnknownField,
            "Cannot query field \"nam\" on type \"Character\"",
            Span::new(file, 22, 25),
            &sources,
        );
        assert_eq!(
            err.to_string(),
            "queries/hero.graphql:2:10: Cannot query field \"nam\" on type \"Character\""
        );
    }

    #[test]
    fn test_display_synthetic() {
        let mut sources = SourceMap::new();
        let file = sources.add_synthetic("GraphQL", "{ a }");
        let err = CompileError::new(
            CompileErrorKind::MissingRootType,
            "Schema is not configured for mutations",
            Span::new(file, 0, 1),
            &sources,
        );
        assert_eq!(err.to_string(), "1:1: Schema is not configured for mutations");
    }
}
