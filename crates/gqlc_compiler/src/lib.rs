//! Query compiler for gqlc.
//!
//! This crate provides:
//! - `validation`: Document rules, chosen per target
//! - `compile`: The selection compiler producing the IR
//! - `collect`: The custom types a compiled document uses
//! - `value`: Decoding of literal values
//! - `ir`: The compiled document handed to emitters

pub mod collect;
pub mod compile;
pub mod error;
pub mod ir;
pub mod options;
pub mod validation;
pub mod value;

pub use collect::TypeCollector;
pub use compile::compile;
pub use error::{CompileError, CompileErrorKind, ValidationError};
pub use ir::*;
pub use options::{CompilerOptions, Target};
pub use validation::{rules_for_target, validate, validate_with_rules, Rule};
pub use value::{decode_value, Value};
