//! Command-line interface for gqlc.
//!
//! # Usage
//!
//! ```bash
//! # Download a schema from a running server
//! gqlc introspect-schema https://example.com/graphql --output schema.json
//!
//! # Turn a local SDL file into introspection JSON
//! gqlc introspect-schema schema.graphql --output schema.json
//!
//! # Print introspection JSON as SDL
//! gqlc print-schema schema.json --output schema.graphql
//!
//! # Generate Swift for every document under queries/
//! gqlc generate queries/*.graphql --schema schema.json --output API.swift
//!
//! # Generate TypeScript from tagged templates
//! gqlc generate src/*.ts --schema schema.json --target ts --tag-name graphql
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use gqlc_codegen::CodegenError;
use gqlc_compiler::{compile, validate, CompileError, CompilerOptions, Target, ValidationError};
use gqlc_core::{DiagnosticBag, Interner, SourceMap};
use gqlc_schema::{load_schema, print_schema, SchemaError, INTROSPECTION_QUERY};
use gqlc_syntax::{load_documents, LoadError, LoadOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "gqlc")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    Swift,
    Json,
    #[value(name = "typescript", alias = "ts")]
    TypeScript,
    Flow,
}

impl From<TargetArg> for Target {
    fn from(target: TargetArg) -> Self {
        match target {
            TargetArg::Swift => Target::Swift,
            TargetArg::Json => Target::Json,
            TargetArg::TypeScript => Target::TypeScript,
            TargetArg::Flow => Target::Flow,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate an introspection JSON from a local GraphQL file or from a
    /// remote GraphQL server
    #[command(alias = "download-schema")]
    IntrospectSchema {
        /// Server URL or path to an SDL file
        schema: String,

        /// Output path for the introspection result
        #[arg(short, long, default_value = "schema.json")]
        output: PathBuf,

        /// Additional header sent with the introspection request, as "Name: Value"
        #[arg(short = 'H', long)]
        header: Vec<String>,

        /// Allow insecure TLS connections to the server
        #[arg(short = 'K', long)]
        insecure: bool,
    },

    /// Print the provided schema in the GraphQL schema language format
    PrintSchema {
        /// Path to an introspection result
        #[arg(default_value = "schema.json")]
        schema: PathBuf,

        /// Output path for the SDL file
        #[arg(short, long, default_value = "schema.graphql")]
        output: PathBuf,
    },

    /// Generate code from a GraphQL schema and query documents
    Generate(GenerateArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct GenerateArgs {
    /// GraphQL documents, or host files containing tagged templates
    #[arg(required = true)]
    pub input: Vec<PathBuf>,

    /// Path to the schema (introspection JSON or SDL)
    #[arg(short, long, default_value = "schema.json")]
    pub schema: PathBuf,

    /// Output file; standard output when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Code generation target
    #[arg(short, long, value_enum, default_value = "swift")]
    pub target: TargetArg,

    /// Namespace for generated types (Swift only)
    #[arg(long)]
    pub namespace: Option<String>,

    /// Keep custom scalar names instead of mapping them to a generic type
    #[arg(long)]
    pub passthrough_custom_scalars: bool,

    /// Prefix for custom scalar names; implies --passthrough-custom-scalars
    #[arg(long, default_value = "")]
    pub custom_scalars_prefix: String,

    /// Always add `__typename` to nested selection sets
    #[arg(long)]
    pub add_typename: bool,

    /// Tag of template literals containing GraphQL in host files
    #[arg(long, default_value = "gql")]
    pub tag_name: String,
}

impl GenerateArgs {
    /// Lowers the flags into compiler options for the chosen target.
    pub fn compiler_options(&self) -> CompilerOptions {
        CompilerOptions {
            passthrough_custom_scalars: self.passthrough_custom_scalars,
            custom_scalars_prefix: self.custom_scalars_prefix.clone(),
            add_typename: self.add_typename,
            namespace: self.namespace.clone(),
            merge_in_fields_from_fragment_spreads: true,
        }
        .with_target(self.target.into())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    UserInput(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Codegen(#[from] CodegenError),

    #[error("error while fetching introspection query result: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Introspection(String),

    #[error("could not write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub async fn run(cli: Cli) -> Result<i32, Error> {
    match cli.command {
        Commands::IntrospectSchema {
            schema,
            output,
            header,
            insecure,
        } => {
            let json = if is_url(&schema) {
                download_schema(&schema, &header, insecure).await?
            } else {
                introspect_local_schema(Path::new(&schema))?
            };
            write_file(&output, &json)?;
            Ok(0)
        }
        Commands::PrintSchema { schema, output } => {
            let interner = Interner::new();
            let mut sources = SourceMap::new();
            let schema = read_schema(&schema, &mut sources, &interner)?;
            write_file(&output, &print_schema(&schema))?;
            Ok(0)
        }
        Commands::Generate(args) => generate(&args),
    }
}

/// Runs the whole pipeline: load, validate, compile, emit, write.
///
/// Nothing is written unless every step succeeds.
pub fn generate(args: &GenerateArgs) -> Result<i32, Error> {
    let mut inputs = args.input.clone();
    inputs.sort();

    let interner = Interner::new();
    let mut sources = SourceMap::new();
    let schema = read_schema(&args.schema, &mut sources, &interner)?;

    let load_options = LoadOptions {
        tag_name: args.tag_name.clone(),
    };
    let loaded = load_documents(&inputs, &mut sources, &interner, &load_options)?;
    tracing::info!(inputs = inputs.len(), "loaded documents");
    if loaded.diagnostics.has_errors() {
        report(&loaded.diagnostics, &sources);
        return Err(Error::UserInput(format!(
            "could not parse GraphQL documents: {} error(s)",
            loaded.diagnostics.error_count()
        )));
    }

    let target = Target::from(args.target);
    let options = args.compiler_options();
    if let Err(err) = validate(&schema, &loaded.document, &interner, target) {
        report(&err.diagnostics, &sources);
        return Err(err.into());
    }

    let compiled = compile(&schema, &loaded.document, &interner, &sources, &options)?;
    let output = gqlc_codegen::generate(target, &compiled, &options)?;

    match &args.output {
        Some(path) => write_file(path, &output)?,
        None => print!("{output}"),
    }
    Ok(0)
}

/// Loads a schema, reporting its diagnostics if it is invalid.
fn read_schema(
    path: &Path,
    sources: &mut SourceMap,
    interner: &Interner,
) -> Result<gqlc_schema::Schema, Error> {
    load_schema(path, sources, interner).map_err(|err| {
        if let Some(diagnostics) = err.diagnostics() {
            report(diagnostics, sources);
        }
        Error::Schema(err)
    })
}

/// Converts a local schema into introspection JSON.
fn introspect_local_schema(path: &Path) -> Result<String, Error> {
    let interner = Interner::new();
    let mut sources = SourceMap::new();
    let schema = read_schema(path, &mut sources, &interner)?;
    Ok(schema.to_introspection_json()?)
}

/// Posts the introspection query to `url` and returns the response as
/// pretty-printed JSON.
pub async fn download_schema(url: &str, headers: &[String], insecure: bool) -> Result<String, Error> {
    let headers = headers
        .iter()
        .map(|header| parse_header(header))
        .collect::<Result<Vec<_>, _>>()?;

    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(insecure)
        .build()?;
    let mut request = client
        .post(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .json(&serde_json::json!({ "query": INTROSPECTION_QUERY }));
    for (name, value) in headers {
        request = request.header(name, value);
    }

    tracing::info!(url, "fetching schema");
    let result: serde_json::Value = request.send().await?.json().await?;

    if let Some(errors) = result.get("errors") {
        return Err(Error::Introspection(format!(
            "errors in introspection query result: {errors}"
        )));
    }
    if result.get("data").is_none() {
        return Err(Error::Introspection(format!(
            "no introspection query result data found, server responded with: {result}"
        )));
    }
    serde_json::to_string_pretty(&result).map_err(|err| Error::Introspection(err.to_string()))
}

/// Splits a `Name: Value` header argument.
pub fn parse_header(header: &str) -> Result<(String, String), Error> {
    let invalid = || Error::UserInput("Headers should be specified as \"Name: Value\"".to_string());
    let (name, value) = header.split_once(':').ok_or_else(invalid)?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() || value.is_empty() {
        return Err(invalid());
    }
    Ok((name.to_string(), value.to_string()))
}

fn is_url(schema: &str) -> bool {
    let lower = schema.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    std::fs::write(path, contents).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote output");
    eprintln!("{} {}", "Generated".green(), path.display());
    Ok(())
}

fn report(diagnostics: &DiagnosticBag, sources: &SourceMap) {
    for diagnostic in diagnostics.iter() {
        tracing::debug!(code = %diagnostic.code, "{}", diagnostic.render(sources));
        eprintln!("{:?}", diagnostic.to_report(sources));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use indoc::indoc;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "gqlc",
            "generate",
            "b.graphql",
            "a.graphql",
            "--schema",
            "schema.graphql",
            "--target",
            "ts",
            "--custom-scalars-prefix",
            "GQL",
        ])
        .expect("parse");

        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.target, TargetArg::TypeScript);
        assert_eq!(args.tag_name, "gql");
        let options = args.compiler_options();
        assert!(options.passthrough_custom_scalars());
        assert!(!options.add_typename);
    }

    #[test]
    fn test_swift_is_default_target() {
        let cli = Cli::try_parse_from(["gqlc", "generate", "a.graphql"]).expect("parse");
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.target, TargetArg::Swift);
        assert_eq!(args.schema, PathBuf::from("schema.json"));
        assert!(args.compiler_options().add_typename);
    }

    #[test]
    fn test_download_schema_alias() {
        let cli = Cli::try_parse_from([
            "gqlc",
            "download-schema",
            "https://example.com/graphql",
            "-H",
            "Authorization: Bearer token",
            "-K",
        ])
        .expect("parse");

        let Commands::IntrospectSchema {
            schema,
            output,
            header,
            insecure,
        } = cli.command
        else {
            panic!("expected introspect-schema");
        };
        assert!(is_url(&schema));
        assert_eq!(output, PathBuf::from("schema.json"));
        assert_eq!(header, ["Authorization: Bearer token"]);
        assert!(insecure);
    }

    #[test]
    fn test_parse_header() {
        let (name, value) = parse_header("Authorization: Bearer a:b").expect("header");
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer a:b");
        assert!(parse_header("Authorization").is_err());
        assert!(parse_header(": value").is_err());
    }

    #[test]
    fn test_is_url() {
        assert!(is_url("HTTPS://example.com"));
        assert!(!is_url("schema.graphql"));
    }

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let dir = std::env::temp_dir().join(format!("gqlc-{name}-{}", std::process::id()));
            std::fs::create_dir_all(&dir).expect("temp dir");
            Self(dir)
        }

        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.0.join(name);
            std::fs::write(&path, contents).expect("write");
            path
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    const SCHEMA: &str = indoc! {"
        type Query {
          hero: Character
        }

        interface Character {
          name: String!
        }

        type Droid implements Character {
          name: String!
          primaryFunction: String
        }
    "};

    fn args(dir: &TempDir, input: Vec<PathBuf>, target: TargetArg) -> GenerateArgs {
        GenerateArgs {
            input,
            schema: dir.write("schema.graphql", SCHEMA),
            output: Some(dir.0.join("out.txt")),
            target,
            namespace: None,
            passthrough_custom_scalars: false,
            custom_scalars_prefix: String::new(),
            add_typename: false,
            tag_name: "gql".to_string(),
        }
    }

    #[test]
    fn test_generate_writes_output() {
        let dir = TempDir::new("generate");
        let input = dir.write(
            "hero.ts",
            "const q = gql`query Hero { hero { name ... on Droid { primaryFunction } } }`;",
        );
        let args = args(&dir, vec![input], TargetArg::TypeScript);

        assert_eq!(generate(&args).expect("generate"), 0);
        let output = std::fs::read_to_string(dir.0.join("out.txt")).expect("output");
        assert!(output.contains("export type HeroQuery = {"), "{output}");
        assert!(output.contains("primaryFunction?: string | null,"), "{output}");
    }

    #[test]
    fn test_invalid_document_writes_nothing() {
        let dir = TempDir::new("invalid");
        let input = dir.write("hero.graphql", "query Hero { hero { height } }");
        let args = args(&dir, vec![input], TargetArg::Json);

        let err = generate(&args).unwrap_err();
        assert!(matches!(err, Error::Validation(_)), "{err}");
        assert!(!dir.0.join("out.txt").exists());
    }

    #[test]
    fn test_missing_schema_is_reported() {
        let dir = TempDir::new("missing");
        let input = dir.write("hero.graphql", "query Hero { hero { name } }");
        let mut args = args(&dir, vec![input], TargetArg::Json);
        args.schema = dir.0.join("nope.json");

        let err = generate(&args).unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::Io { .. })), "{err}");
    }
}
