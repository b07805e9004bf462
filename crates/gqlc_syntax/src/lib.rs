//! Syntax layer for gqlc.
//!
//! This crate provides:
//! - `token`: Token kinds and token structures
//! - `lexer`: Tokenization
//! - `ast`: Abstract syntax tree types
//! - `parser`: Recursive descent parser
//! - `printer`: Normalized printing of operations and fragments
//! - `extract`: GraphQL embedded in host-language template literals
//! - `loader`: Multi-file document loading

pub mod ast;
pub mod extract;
pub mod lexer;
pub mod loader;
pub mod parser;
pub mod printer;
pub mod token;

pub use ast::*;
pub use extract::{extract_documents, EmbeddedDocument};
pub use lexer::Lexer;
pub use loader::{load_documents, load_source, LoadError, LoadOptions, LoadedDocuments};
pub use parser::{parse, parse_with_base, ParseResult};
pub use printer::{
    print, print_fragment, print_operation, print_type, print_value, PrintOptions, Printer,
};
pub use token::{DirectiveLocation, Token, TokenKind};
