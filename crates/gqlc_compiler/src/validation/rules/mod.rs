mod arguments;
mod codegen;
mod fields;
mod fragments;
mod operations;
mod overlapping;
mod types;
mod variables;

pub use arguments::{
    KnownArgumentNames, KnownDirectives, ProvidedRequiredArguments, UniqueArgumentNames,
    UniqueInputFieldNames,
};
pub use codegen::{NoAnonymousQueries, NoExplicitTypename, NoTypenameAlias};
pub use fields::{FieldsOnCorrectType, ScalarLeafs};
pub use fragments::{
    KnownFragmentNames, NoFragmentCycles, NoUnusedFragments, PossibleFragmentSpreads,
    UniqueFragmentNames,
};
pub use operations::{ExecutableDefinitions, LoneAnonymousOperation, UniqueOperationNames};
pub use overlapping::OverlappingFieldsCanBeMerged;
pub use types::{FragmentsOnCompositeTypes, KnownTypeNames, VariablesAreInputTypes};
pub use variables::{NoUndefinedVariables, NoUnusedVariables, UniqueVariableNames};
