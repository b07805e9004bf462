//! Diagnostic reporting for gqlc.

use crate::source::SourceMap;
use crate::span::Span;
use std::fmt;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticSeverity {
    /// An error that prevents compilation.
    Error,
    /// A warning that doesn't prevent compilation.
    Warning,
}

/// A label attached to a diagnostic.
#[derive(Debug, Clone)]
pub struct Label {
    /// The span this label points to.
    pub span: Span,
    /// The label message.
    pub message: String,
}

impl Label {
    /// Creates a new label.
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

/// A diagnostic message.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: DiagnosticSeverity,
    /// Error code.
    pub code: String,
    /// Short title.
    pub title: String,
    /// Detailed message.
    pub message: Option<String>,
    /// Labels pointing to source locations.
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Creates a new error diagnostic.
    pub fn error(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Creates a new warning diagnostic.
    pub fn warning(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            title: title.into(),
            message: None,
            labels: Vec::new(),
        }
    }

    /// Adds a message to the diagnostic.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a primary label at a span.
    #[must_use]
    pub fn with_span(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Returns the primary span, if any.
    pub fn primary_span(&self) -> Option<Span> {
        self.labels.first().map(|l| l.span)
    }

    /// Renders a one-line `path:line:col: title` form.
    ///
    /// The path is left out when the primary span points into a synthetic
    /// source.
    pub fn render(&self, sources: &SourceMap) -> String {
        let mut out = String::new();
        if let Some(span) = self.primary_span() {
            if let Some(path) = sources.path(span.file) {
                out.push_str(&path.display().to_string());
                out.push(':');
            }
            if let Some(pos) = sources.line_col(span) {
                out.push_str(&pos.to_string());
                out.push(':');
            }
            if !out.is_empty() {
                out.push(' ');
            }
        }
        out.push_str(&self.title);
        if let Some(message) = &self.message {
            out.push_str(": ");
            out.push_str(message);
        }
        out
    }

    /// Converts into a `miette` report carrying the source snippet.
    pub fn to_report(&self, sources: &SourceMap) -> miette::Report {
        let severity = match self.severity {
            DiagnosticSeverity::Error => miette::Severity::Error,
            DiagnosticSeverity::Warning => miette::Severity::Warning,
        };
        let labels = self
            .labels
            .iter()
            .map(|label| miette::LabeledSpan::new_with_span(Some(label.message.clone()), label.span));
        let mut diagnostic = miette::MietteDiagnostic::new(self.title.clone())
            .with_code(self.code.clone())
            .with_severity(severity)
            .with_labels(labels);
        if let Some(message) = &self.message {
            diagnostic = diagnostic.with_help(message.clone());
        }

        let file = self.primary_span().and_then(|span| sources.get(span.file));
        let report = miette::Report::new(diagnostic);
        match file {
            Some(file) => report.with_source_code(miette::NamedSource::new(
                file.name.clone(),
                file.text.clone(),
            )),
            None => report,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.title, message),
            None => f.write_str(&self.title),
        }
    }
}

/// A collection of diagnostics.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticBag {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticBag {
    /// Creates a new empty diagnostic bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Adds an error diagnostic.
    pub fn error(
        &mut self,
        code: impl Into<String>,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::error(code, title).with_span(span, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(
        &mut self,
        code: impl Into<String>,
        title: impl Into<String>,
        span: Span,
        message: impl Into<String>,
    ) {
        self.add(Diagnostic::warning(code, title).with_span(span, message));
    }

    /// Moves every diagnostic of `other` into this bag.
    pub fn extend(&mut self, other: DiagnosticBag) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Returns true if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Returns an iterator over all diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Returns an iterator over errors.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if there are no diagnostics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Returns the number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for DiagnosticBag {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}

/// Diagnostic codes.
pub mod codes {
    // Syntax
    pub const UNEXPECTED_TOKEN: &str = "E0001";
    pub const UNEXPECTED_EOF: &str = "E0002";
    pub const INVALID_SYNTAX: &str = "E0003";
    pub const UNTERMINATED_TEMPLATE: &str = "E0004";

    // Schema
    pub const UNDEFINED_TYPE: &str = "E0010";
    pub const UNDEFINED_FIELD: &str = "E0011";
    pub const DUPLICATE_TYPE: &str = "E0012";
    pub const DUPLICATE_FIELD: &str = "E0013";
    pub const INVALID_SCHEMA: &str = "E0014";

    // Document validation
    pub const INVALID_OPERATION: &str = "E0100";
    pub const UNKNOWN_FIELD: &str = "E0101";
    pub const UNKNOWN_FRAGMENT: &str = "E0102";
    pub const UNKNOWN_ARGUMENT: &str = "E0103";
    pub const UNKNOWN_DIRECTIVE: &str = "E0104";
    pub const UNKNOWN_VARIABLE: &str = "E0105";
    pub const DUPLICATE_NAME: &str = "E0106";
    pub const UNUSED_DEFINITION: &str = "E0107";
    pub const INVALID_FRAGMENT: &str = "E0108";
    pub const FRAGMENT_CYCLE: &str = "E0109";
    pub const INVALID_SELECTION: &str = "E0110";
    pub const MISSING_ARGUMENT: &str = "E0111";
    pub const FIELD_CONFLICT: &str = "E0112";
    pub const INVALID_VARIABLE_TYPE: &str = "E0113";
    pub const ANONYMOUS_OPERATION: &str = "E0120";
    pub const TYPENAME_ALIAS: &str = "E0121";
    pub const EXPLICIT_TYPENAME: &str = "E0122";

    // Compilation
    pub const TYPE_MISMATCH: &str = "E0200";
    pub const MISSING_ROOT_TYPE: &str = "E0201";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::FileId;

    #[test]
    fn test_diagnostic_bag() {
        let mut bag = DiagnosticBag::new();
        bag.error("E001", "test error", Span::new(FileId::default(), 0, 10), "details");

        assert!(bag.has_errors());
        assert_eq!(bag.error_count(), 1);
    }

    #[test]
    fn test_diagnostic_creation() {
        let span = Span::new(FileId::default(), 0, 5);
        let diag = Diagnostic::error("E001", "Test")
            .with_message("Details")
            .with_span(span, "here");

        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert_eq!(diag.primary_span(), Some(span));
        assert_eq!(diag.to_string(), "Test: Details");
    }

    #[test]
    fn test_render_with_path() {
        let mut sources = SourceMap::new();
        let file = sources.add_file("ops/hero.graphql", "{\n  hero\n}");
        let diag = Diagnostic::error(codes::ANONYMOUS_OPERATION, "anonymous operation")
            .with_span(Span::new(file, 4, 8), "here");
        assert_eq!(diag.render(&sources), "ops/hero.graphql:2:3: anonymous operation");
    }

    #[test]
    fn test_render_synthetic_omits_path() {
        let mut sources = SourceMap::new();
        let file = sources.add_synthetic("<builtin>", "type Query");
        let diag = Diagnostic::error(codes::INVALID_SCHEMA, "bad")
            .with_span(Span::new(file, 5, 10), "here");
        assert_eq!(diag.render(&sources), "1:6: bad");
    }
}
