//! Type registry for gqlc.
//!
//! This crate provides:
//! - `types`: Type definitions and wrapped type references
//! - `schema`: The registry and its subtyping queries
//! - `builder`: Building a schema from SDL
//! - `introspection`: Reading and writing introspection JSON
//! - `printer`: SDL printing

pub mod builder;
pub mod error;
pub mod introspection;
pub mod printer;
pub mod schema;
pub mod types;

pub use builder::SchemaBuilder;
pub use error::SchemaError;
pub use introspection::{IntrospectionResponse, INTROSPECTION_QUERY};
pub use printer::print_schema;
pub use schema::Schema;
pub use types::*;

use gqlc_core::{Interner, SourceMap};
use std::path::Path;

/// Loads a schema file. `.json` files are read as introspection results,
/// anything else as SDL.
pub fn load_schema(
    path: &Path,
    sources: &mut SourceMap,
    interner: &Interner,
) -> Result<Schema, SchemaError> {
    let text = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let schema = if path.extension().is_some_and(|ext| ext == "json") {
        Schema::from_introspection_json(&text)?
    } else {
        let file = sources.add_file(path, text);
        let text = sources.get(file).map_or("", |source| source.text.as_str());
        Schema::from_sdl(text, file, interner)?
    };

    tracing::info!(
        path = %path.display(),
        types = schema.types().count(),
        "loaded schema"
    );
    Ok(schema)
}
