//! Loading executable documents from many input files.

use crate::ast::Document;
use crate::extract::extract_documents;
use crate::parser::{parse, parse_with_base};
use gqlc_core::{DiagnosticBag, Interner, SourceMap};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Options controlling how input files are read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Tag marking embedded GraphQL template literals in host files.
    pub tag_name: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            tag_name: "gql".to_string(),
        }
    }
}

/// Error reading an input file.
#[derive(Debug, Error)]
#[error("could not read {}: {source}", .path.display())]
pub struct LoadError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Every document found in a set of inputs, merged in input order.
#[derive(Debug)]
pub struct LoadedDocuments {
    pub document: Document,
    pub diagnostics: DiagnosticBag,
}

/// Returns true for files parsed whole as GraphQL.
pub fn is_graphql_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("graphql" | "gql")
    )
}

/// Reads, registers and parses every input path.
pub fn load_documents(
    paths: &[PathBuf],
    sources: &mut SourceMap,
    interner: &Interner,
    options: &LoadOptions,
) -> Result<LoadedDocuments, LoadError> {
    let mut documents = Vec::with_capacity(paths.len());
    let mut diagnostics = DiagnosticBag::new();

    for path in paths {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loading document");
        documents.push(load_source(
            sources,
            interner,
            path,
            text,
            options,
            &mut diagnostics,
        ));
    }

    Ok(LoadedDocuments {
        document: Document::merge(documents),
        diagnostics,
    })
}

/// Registers one input and parses the GraphQL it contains.
pub fn load_source(
    sources: &mut SourceMap,
    interner: &Interner,
    path: &Path,
    text: String,
    options: &LoadOptions,
    diagnostics: &mut DiagnosticBag,
) -> Document {
    let file = sources.add_file(path, text);
    let text = match sources.get(file) {
        Some(source) => source.text.as_str(),
        None => return Document::default(),
    };

    if is_graphql_file(path) {
        let result = parse(text, file, interner);
        diagnostics.extend(result.diagnostics);
        return result.document;
    }

    let embedded = extract_documents(text, file, &options.tag_name, diagnostics);
    tracing::trace!(path = %path.display(), count = embedded.len(), "extracted templates");
    let parsed = embedded.iter().map(|doc| {
        let result = parse_with_base(&doc.text, file, doc.base, interner);
        diagnostics.extend(result.diagnostics);
        result.document
    });
    Document::merge(parsed.collect::<Vec<_>>())
}
