//! Document validation.
//!
//! Rules are visitors driven by a single walk over the document. The set
//! of rules applied depends on the target: see [`rules_for_target`].

mod rules;
#[cfg(test)]
pub(crate) mod test_harness;
mod visitor;

pub use visitor::{visit, Visitor, VisitorContext, VisitorList};

use crate::error::ValidationError;
use crate::options::Target;
use gqlc_core::Interner;
use gqlc_schema::Schema;
use gqlc_syntax::Document;

/// A validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    ExecutableDefinitions,
    UniqueOperationNames,
    LoneAnonymousOperation,
    KnownTypeNames,
    FragmentsOnCompositeTypes,
    VariablesAreInputTypes,
    ScalarLeafs,
    FieldsOnCorrectType,
    UniqueFragmentNames,
    KnownFragmentNames,
    NoUnusedFragments,
    PossibleFragmentSpreads,
    NoFragmentCycles,
    UniqueVariableNames,
    NoUndefinedVariables,
    NoUnusedVariables,
    KnownDirectives,
    KnownArgumentNames,
    UniqueArgumentNames,
    ProvidedRequiredArguments,
    UniqueInputFieldNames,
    OverlappingFieldsCanBeMerged,
    NoAnonymousQueries,
    NoTypenameAlias,
    NoExplicitTypename,
}

impl Rule {
    /// The standard document rules, in the order they run.
    pub const STANDARD: [Rule; 22] = [
        Rule::ExecutableDefinitions,
        Rule::UniqueOperationNames,
        Rule::LoneAnonymousOperation,
        Rule::KnownTypeNames,
        Rule::FragmentsOnCompositeTypes,
        Rule::VariablesAreInputTypes,
        Rule::ScalarLeafs,
        Rule::FieldsOnCorrectType,
        Rule::UniqueFragmentNames,
        Rule::KnownFragmentNames,
        Rule::NoUnusedFragments,
        Rule::PossibleFragmentSpreads,
        Rule::NoFragmentCycles,
        Rule::UniqueVariableNames,
        Rule::NoUndefinedVariables,
        Rule::NoUnusedVariables,
        Rule::KnownDirectives,
        Rule::KnownArgumentNames,
        Rule::UniqueArgumentNames,
        Rule::ProvidedRequiredArguments,
        Rule::UniqueInputFieldNames,
        Rule::OverlappingFieldsCanBeMerged,
    ];

    /// Builds a fresh visitor for this rule.
    pub fn visitor<'a>(self) -> Box<dyn Visitor<'a> + 'a> {
        use rules::*;

        match self {
            Self::ExecutableDefinitions => Box::new(ExecutableDefinitions),
            Self::UniqueOperationNames => Box::<UniqueOperationNames>::default(),
            Self::LoneAnonymousOperation => Box::<LoneAnonymousOperation>::default(),
            Self::KnownTypeNames => Box::new(KnownTypeNames),
            Self::FragmentsOnCompositeTypes => Box::new(FragmentsOnCompositeTypes),
            Self::VariablesAreInputTypes => Box::new(VariablesAreInputTypes),
            Self::ScalarLeafs => Box::new(ScalarLeafs),
            Self::FieldsOnCorrectType => Box::new(FieldsOnCorrectType),
            Self::UniqueFragmentNames => Box::<UniqueFragmentNames>::default(),
            Self::KnownFragmentNames => Box::new(KnownFragmentNames),
            Self::NoUnusedFragments => Box::new(NoUnusedFragments),
            Self::PossibleFragmentSpreads => Box::new(PossibleFragmentSpreads),
            Self::NoFragmentCycles => Box::new(NoFragmentCycles),
            Self::UniqueVariableNames => Box::<UniqueVariableNames>::default(),
            Self::NoUndefinedVariables => Box::new(NoUndefinedVariables),
            Self::NoUnusedVariables => Box::new(NoUnusedVariables),
            Self::KnownDirectives => Box::new(KnownDirectives),
            Self::KnownArgumentNames => Box::new(KnownArgumentNames),
            Self::UniqueArgumentNames => Box::new(UniqueArgumentNames),
            Self::ProvidedRequiredArguments => Box::new(ProvidedRequiredArguments),
            Self::UniqueInputFieldNames => Box::new(UniqueInputFieldNames),
            Self::OverlappingFieldsCanBeMerged => Box::new(OverlappingFieldsCanBeMerged),
            Self::NoAnonymousQueries => Box::new(NoAnonymousQueries),
            Self::NoTypenameAlias => Box::new(NoTypenameAlias),
            Self::NoExplicitTypename => Box::new(NoExplicitTypename),
        }
    }
}

/// The rules a document must pass before compiling for `target`.
///
/// All standard rules except [`Rule::NoUnusedFragments`], since documents
/// are often fragment libraries, plus the rules code generation relies on.
pub fn rules_for_target(target: Target) -> Vec<Rule> {
    let mut rules = vec![Rule::NoAnonymousQueries, Rule::NoTypenameAlias];
    if target == Target::Swift {
        rules.push(Rule::NoExplicitTypename);
    }
    rules.extend(
        Rule::STANDARD
            .into_iter()
            .filter(|rule| *rule != Rule::NoUnusedFragments),
    );
    rules
}

/// Validates a document with the rules for `target`.
pub fn validate(
    schema: &Schema,
    document: &Document,
    interner: &Interner,
    target: Target,
) -> Result<(), ValidationError> {
    validate_with_rules(schema, document, interner, &rules_for_target(target))
}

/// Validates a document with an explicit rule list. Every violation is
/// collected before failing.
pub fn validate_with_rules(
    schema: &Schema,
    document: &Document,
    interner: &Interner,
    rules: &[Rule],
) -> Result<(), ValidationError> {
    let mut ctx = VisitorContext::new(schema, document, interner);
    let mut visitors = VisitorList(rules.iter().map(|rule| rule.visitor()).collect());
    visit(&mut visitors, &mut ctx, document);

    if ctx.diagnostics.has_errors() {
        tracing::debug!(errors = ctx.diagnostics.error_count(), "validation failed");
        return Err(ValidationError {
            diagnostics: ctx.diagnostics,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::test_harness::{messages_for, SCHEMA};

    #[test]
    fn test_rules_exclude_unused_fragments() {
        for target in [Target::Json, Target::Swift, Target::TypeScript, Target::Flow] {
            let rules = rules_for_target(target);
            assert!(!rules.contains(&Rule::NoUnusedFragments));
            assert!(rules.contains(&Rule::NoAnonymousQueries));
            assert!(rules.contains(&Rule::NoTypenameAlias));
            assert_eq!(rules.contains(&Rule::NoExplicitTypename), target == Target::Swift);
        }
    }

    #[test]
    fn test_unused_fragment_passes_default_rules() {
        let interner = Interner::new();
        let schema = Schema::from_sdl(SCHEMA, Default::default(), &interner).expect("schema");
        let result = gqlc_syntax::parse(
            "query Q { dog { name } } fragment Unused on Dog { name }",
            Default::default(),
            &interner,
        );
        assert!(validate(&schema, &result.document, &interner, Target::Json).is_ok());
    }

    #[test]
    fn test_anonymous_fails_every_target() {
        let interner = Interner::new();
        let schema = Schema::from_sdl(SCHEMA, Default::default(), &interner).expect("schema");
        let result = gqlc_syntax::parse("{ dog { name } }", Default::default(), &interner);
        for target in [Target::Json, Target::Swift, Target::TypeScript, Target::Flow] {
            let err = validate(&schema, &result.document, &interner, target).unwrap_err();
            assert_eq!(err.diagnostics.error_count(), 1);
        }
    }

    #[test]
    fn test_all_violations_are_collected() {
        let messages = messages_for(
            &rules_for_target(Target::Json),
            "query Q($unused: Int) { dog { nam ...Missing } }",
        );
        assert_eq!(
            messages,
            [
                "Cannot query field \"nam\" on type \"Dog\".",
                "Unknown fragment \"Missing\".",
                "Variable \"$unused\" is never used in operation \"Q\".",
            ]
        );
    }
}
