//! Code generation for compiled GraphQL documents.
//!
//! This crate turns a [`CompiledDocument`] into target source text:
//! - JSON (the IR itself)
//! - TypeScript and Flow type declarations
//! - Swift operation classes
//!
//! # Example
//!
//! ```ignore
//! use gqlc_codegen::CodeGenerator;
//!
//! let generator = CodeGenerator::new(&compiled, &options);
//! let code = generator.generate(Target::TypeScript)?;
//! ```

mod flow;
mod json;
pub mod printer;
mod swift;
mod typescript;

pub use flow::FlowGenerator;
pub use json::JsonGenerator;
pub use printer::CodePrinter;
pub use swift::SwiftGenerator;
pub use typescript::TypeScriptGenerator;

use gqlc_compiler::{CompiledDocument, CompilerOptions, Target};
use gqlc_schema::{TypeDef, TypeRef, WrappingType};
use rustc_hash::FxHashMap;

/// Errors raised while generating code.
#[derive(Debug, thiserror::Error)]
pub enum CodegenError {
    #[error("failed to serialize compiled document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Dispatches a compiled document to the emitter of a target.
pub struct CodeGenerator<'a> {
    document: &'a CompiledDocument,
    options: &'a CompilerOptions,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(document: &'a CompiledDocument, options: &'a CompilerOptions) -> Self {
        Self { document, options }
    }

    /// Generates the source text for `target`.
    pub fn generate(&self, target: Target) -> Result<String, CodegenError> {
        tracing::debug!(
            %target,
            operations = self.document.operations.len(),
            fragments = self.document.fragments.len(),
            "generating code"
        );
        let output = match target {
            Target::Json => JsonGenerator::new(self.document).generate()?,
            Target::TypeScript => TypeScriptGenerator::new(self.document, self.options).generate(),
            Target::Flow => FlowGenerator::new(self.document, self.options).generate(),
            Target::Swift => SwiftGenerator::new(self.document, self.options).generate(),
        };
        Ok(output)
    }
}

/// Generates the source text for `target`.
pub fn generate(
    target: Target,
    document: &CompiledDocument,
    options: &CompilerOptions,
) -> Result<String, CodegenError> {
    CodeGenerator::new(document, options).generate(target)
}

/// Mapping of GraphQL types to the types of a target language.
pub(crate) trait TypeConverter {
    /// Target type of a built-in scalar.
    fn convert_scalar(&self, name: &str) -> String;

    /// Target type used for custom scalars when they are not passed
    /// through by name.
    fn opaque_scalar(&self) -> String;

    fn list_of(&self, item: String) -> String;

    fn nullable(&self, inner: String) -> String;

    /// Applies the wrappers of `ty` around an already converted named type.
    fn wrap(&self, ty: &TypeRef, named: String) -> String {
        let mut out = named;
        let mut non_null = false;
        for wrapper in &ty.wrappers {
            match wrapper {
                WrappingType::NonNull => non_null = true,
                WrappingType::List => {
                    if !non_null {
                        out = self.nullable(out);
                    }
                    out = self.list_of(out);
                    non_null = false;
                }
            }
        }
        if non_null {
            out
        } else {
            self.nullable(out)
        }
    }

    /// Splits the wrapped form of `ty` around its named type, for callers
    /// that print the named type as a block.
    fn wrap_parts(&self, ty: &TypeRef) -> (String, String) {
        const HOLE: &str = "\u{0}";
        let wrapped = self.wrap(ty, HOLE.to_string());
        match wrapped.split_once(HOLE) {
            Some((before, after)) => (before.to_string(), after.to_string()),
            None => (wrapped, String::new()),
        }
    }
}

/// Lookup of the custom input and leaf types a document uses.
pub(crate) struct TypeIndex<'a> {
    types: FxHashMap<&'a str, &'a TypeDef>,
}

impl<'a> TypeIndex<'a> {
    pub(crate) fn new(document: &'a CompiledDocument) -> Self {
        let types = document
            .types_used
            .iter()
            .map(|ty| (ty.name(), ty))
            .collect();
        Self { types }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&'a TypeDef> {
        self.types.get(name).copied()
    }

    /// Converts the named leaf or input type `name`.
    pub(crate) fn convert_named(
        &self,
        converter: &impl TypeConverter,
        options: &CompilerOptions,
        name: &str,
    ) -> String {
        match self.get(name) {
            Some(TypeDef::Enum(_) | TypeDef::InputObject(_)) => name.to_string(),
            _ if gqlc_schema::BUILTIN_SCALARS.contains(&name) => converter.convert_scalar(name),
            _ if options.passthrough_custom_scalars() => {
                format!("{}{name}", options.custom_scalars_prefix)
            }
            _ => converter.opaque_scalar(),
        }
    }
}

/// Upper-cases the first character.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generated type name of an operation, e.g. `HeroQuery`.
pub(crate) fn operation_type_name(operation: &gqlc_compiler::CompiledOperation) -> String {
    format!("{}{}", operation.name, capitalize(operation.operation_type.as_str()))
}

#[cfg(test)]
pub(crate) mod test_support {
    use gqlc_compiler::{compile, validate, CompiledDocument, CompilerOptions, Target};
    use gqlc_core::{Interner, SourceMap};
    use gqlc_schema::Schema;
    use gqlc_syntax::parse;

    pub const SCHEMA: &str = r#"
        schema { query: Query mutation: Mutation }

        type Query {
          hero(episode: Episode): Character
          reviews(filter: ReviewFilter): [Review!]
        }

        type Mutation {
          createReview(episode: Episode!, review: ReviewInput!): Review
        }

        "The episodes in the Star Wars trilogy"
        enum Episode { NEWHOPE EMPIRE JEDI }

        scalar DateTime

        interface Character {
          id: ID!
          name: String!
          friends: [Character]
          appearsIn: [Episode]!
        }

        type Human implements Character {
          id: ID!
          name: String!
          friends: [Character]
          appearsIn: [Episode]!
          height: Float
        }

        type Droid implements Character {
          id: ID!
          name: String!
          friends: [Character]
          appearsIn: [Episode]!
          primaryFunction: String
        }

        type Review {
          "The number of stars"
          stars: Int!
          commentary: String
          createdAt: DateTime
        }

        input ReviewInput {
          stars: Int!
          commentary: String
        }

        input ReviewFilter {
          since: DateTime
        }
    "#;

    /// Validates and compiles `source` with the options of `target`.
    pub fn compile_for(source: &str, options: &CompilerOptions, target: Target) -> CompiledDocument {
        let interner = Interner::new();
        let mut sources = SourceMap::new();
        let schema_file = sources.add_synthetic("schema.graphql", SCHEMA);
        let schema = Schema::from_sdl(SCHEMA, schema_file, &interner).expect("schema");
        let file = sources.add_synthetic("operations.graphql", source);
        let document = parse(source, file, &interner).document;
        validate(&schema, &document, &interner, target).expect("valid document");
        compile(&schema, &document, &interner, &sources, options).expect("compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ts;

    impl TypeConverter for Ts {
        fn convert_scalar(&self, name: &str) -> String {
            name.to_lowercase()
        }

        fn opaque_scalar(&self) -> String {
            "any".to_string()
        }

        fn list_of(&self, item: String) -> String {
            format!("Array<{item}>")
        }

        fn nullable(&self, inner: String) -> String {
            format!("{inner} | null")
        }
    }

    #[test]
    fn test_wrap() {
        let ty = TypeRef::named("Episode").list();
        assert_eq!(Ts.wrap(&ty, "Episode".into()), "Array<Episode | null> | null");
        let ty = TypeRef::named("Episode").non_null().list().non_null();
        assert_eq!(Ts.wrap(&ty, "Episode".into()), "Array<Episode>");
    }

    #[test]
    fn test_wrap_parts() {
        let ty = TypeRef::named("Character").list().non_null();
        assert_eq!(
            Ts.wrap_parts(&ty),
            ("Array<".to_string(), " | null>".to_string())
        );
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("query"), "Query");
        assert_eq!(capitalize(""), "");
    }
}
