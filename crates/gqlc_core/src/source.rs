//! The set of source files read during one run.

use crate::span::{FileId, Span};
use std::path::{Path, PathBuf};

/// A single registered source.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name: the path for user files, a placeholder for synthetic ones.
    pub name: String,
    /// Path on disk. `None` for text that did not come from a user file.
    pub path: Option<PathBuf>,
    /// Full text of the file.
    pub text: String,
}

/// A 1-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCol {
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for LineCol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Owns every source text so spans can be resolved back to files.
#[derive(Debug, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file read from disk.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> FileId {
        let path = path.into();
        self.push(SourceFile {
            name: path.display().to_string(),
            path: Some(path),
            text: text.into(),
        })
    }

    /// Registers text that has no user-visible origin.
    pub fn add_synthetic(&mut self, name: impl Into<String>, text: impl Into<String>) -> FileId {
        self.push(SourceFile {
            name: name.into(),
            path: None,
            text: text.into(),
        })
    }

    fn push(&mut self, file: SourceFile) -> FileId {
        let id = FileId::from_raw(u32::try_from(self.files.len()).unwrap_or(u32::MAX));
        self.files.push(file);
        id
    }

    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.as_raw() as usize)
    }

    /// Returns the on-disk path of a file, or `None` for synthetic sources.
    #[must_use]
    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.get(id).and_then(|file| file.path.as_deref())
    }

    /// Returns the text a span covers. Empty if the span is out of range.
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        self.get(span.file)
            .and_then(|file| file.text.get(span.range()))
            .unwrap_or_default()
    }

    /// Converts the start of a span into a line and column.
    #[must_use]
    pub fn line_col(&self, span: Span) -> Option<LineCol> {
        let file = self.get(span.file)?;
        let offset = (span.start as usize).min(file.text.len());
        let before = &file.text[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Some(LineCol { line, column })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileId::from_raw(i as u32), file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let mut sources = SourceMap::new();
        let id = sources.add_file("a.graphql", "query A {\n  hero\n}\n");
        let span = Span::new(id, 12, 16);
        assert_eq!(sources.slice(span), "hero");
        assert_eq!(sources.line_col(span), Some(LineCol { line: 2, column: 3 }));
    }

    #[test]
    fn test_synthetic_has_no_path() {
        let mut sources = SourceMap::new();
        let user = sources.add_file("queries/a.graphql", "");
        let synthetic = sources.add_synthetic("<builtin>", "");
        assert_eq!(sources.path(user), Some(Path::new("queries/a.graphql")));
        assert_eq!(sources.path(synthetic), None);
        assert_eq!(sources.get(synthetic).map(|f| f.name.as_str()), Some("<builtin>"));
    }
}
