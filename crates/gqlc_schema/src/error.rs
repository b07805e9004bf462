//! Schema loading errors.

use gqlc_core::DiagnosticBag;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("could not read schema {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema: {} error(s)", .0.error_count())]
    Invalid(DiagnosticBag),

    #[error("invalid introspection result: {0}")]
    Json(#[from] serde_json::Error),

    #[error("introspection result has no `__schema` field")]
    MissingSchema,

    #[error("introspection result references unknown type `{0}`")]
    UnknownType(String),

    #[error("malformed introspection type reference: missing {0}")]
    MalformedTypeRef(&'static str),
}

impl SchemaError {
    /// Diagnostics carrying source locations, if this error has any.
    pub fn diagnostics(&self) -> Option<&DiagnosticBag> {
        match self {
            Self::Invalid(diagnostics) => Some(diagnostics),
            _ => None,
        }
    }
}
