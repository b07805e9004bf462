//! Rules that guard assumptions made by the code generators.

use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_syntax::ast::{FieldSelection, OperationDefinition};

/// Generated types are named after their operation.
pub struct NoAnonymousQueries;

impl<'a> Visitor<'a> for NoAnonymousQueries {
    fn enter_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        if operation.name.is_none() {
            ctx.report(
                codes::ANONYMOUS_OPERATION,
                operation.span,
                "Anonymous operations are not supported; every operation needs a name.",
            );
        }
    }
}

/// `__typename` is inserted when needed, so no field may claim it as a
/// response key or hide it behind an alias.
pub struct NoTypenameAlias;

impl<'a> Visitor<'a> for NoTypenameAlias {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        let Some(alias) = field.alias else {
            return;
        };
        if alias.value == Text::TYPENAME {
            ctx.report(
                codes::TYPENAME_ALIAS,
                alias.span,
                "\"__typename\" cannot be used as an alias; it is inserted automatically when needed.",
            );
        } else if field.name.value == Text::TYPENAME {
            ctx.report(
                codes::TYPENAME_ALIAS,
                alias.span,
                "\"__typename\" cannot be aliased; it is inserted automatically when needed.",
            );
        }
    }
}

/// Targets that always insert `__typename` reject explicit selections.
pub struct NoExplicitTypename;

impl<'a> Visitor<'a> for NoExplicitTypename {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        if field.name.value == Text::TYPENAME {
            ctx.report(
                codes::EXPLICIT_TYPENAME,
                field.span,
                "\"__typename\" is inserted automatically when needed; do not select it explicitly.",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::validation::test_harness::{expect_fails, expect_passes, messages_for};
    use crate::validation::{rules_for_target, Rule};
    use crate::Target;

    #[test]
    fn test_anonymous_operations() {
        expect_passes(Rule::NoAnonymousQueries, "query Named { dog { name } }");
        let messages = expect_fails(Rule::NoAnonymousQueries, "{ dog { name } }");
        assert_eq!(messages, ["Anonymous operations are not supported; every operation needs a name."]);
        expect_fails(Rule::NoAnonymousQueries, "mutation { dog { name } }");
    }

    #[test]
    fn test_typename_alias() {
        expect_passes(Rule::NoTypenameAlias, "query Q { dog { __typename name } }");
        let messages = expect_fails(
            Rule::NoTypenameAlias,
            "query Q { dog { __typename: name kind: __typename } }",
        );
        assert_eq!(
            messages,
            [
                "\"__typename\" cannot be used as an alias; it is inserted automatically when needed.",
                "\"__typename\" cannot be aliased; it is inserted automatically when needed.",
            ]
        );
    }

    #[test]
    fn test_typename_alias_in_inline_fragment_for_every_target() {
        let source = "query Q { pet { name ... on Dog { kind: __typename } } }";
        for target in [Target::Json, Target::Swift, Target::TypeScript, Target::Flow] {
            let messages = messages_for(&rules_for_target(target), source);
            assert!(messages.iter().any(|m| m.contains("cannot be aliased")), "{target}: {messages:?}");
        }
    }

    #[test]
    fn test_explicit_typename() {
        expect_passes(Rule::NoExplicitTypename, "query Q { dog { name } }");
        let messages = expect_fails(Rule::NoExplicitTypename, "query Q { dog { __typename name } }");
        assert_eq!(
            messages,
            ["\"__typename\" is inserted automatically when needed; do not select it explicitly."]
        );
    }
}
