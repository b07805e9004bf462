use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_schema::InputValueDef;
use gqlc_syntax::ast::{Argument, Directive, FieldSelection, Value, VariableDefinition};
use gqlc_syntax::DirectiveLocation;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

pub struct KnownDirectives;

impl<'a> Visitor<'a> for KnownDirectives {
    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Directive, location: DirectiveLocation) {
        let name = ctx.name(directive.name.value);
        match ctx.schema.directive(&name) {
            None => ctx.report(
                codes::UNKNOWN_DIRECTIVE,
                directive.name.span,
                format!("Unknown directive \"@{name}\"."),
            ),
            Some(def) if !def.locations.iter().any(|l| l == location.as_str()) => ctx.report(
                codes::UNKNOWN_DIRECTIVE,
                directive.span,
                format!("Directive \"@{name}\" may not be used on {}.", location.as_str()),
            ),
            Some(_) => {}
        }
    }
}

pub struct KnownArgumentNames;

impl<'a> Visitor<'a> for KnownArgumentNames {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        let (Some(def), Some(parent)) = (ctx.field_def(field), ctx.parent_type()) else {
            return;
        };
        for argument in &field.arguments {
            let name = ctx.name(argument.name.value);
            if !def.arguments.contains_key(&name) {
                let message = format!(
                    "Unknown argument \"{name}\" on field \"{}.{}\".",
                    parent.name(),
                    def.name
                );
                ctx.report(codes::UNKNOWN_ARGUMENT, argument.name.span, message);
            }
        }
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Directive, _location: DirectiveLocation) {
        let Some(def) = ctx.schema.directive(&ctx.name(directive.name.value)) else {
            return;
        };
        for argument in &directive.arguments {
            let name = ctx.name(argument.name.value);
            if !def.arguments.contains_key(&name) {
                let message = format!("Unknown argument \"{name}\" on directive \"@{}\".", def.name);
                ctx.report(codes::UNKNOWN_ARGUMENT, argument.name.span, message);
            }
        }
    }
}

pub struct UniqueArgumentNames;

impl UniqueArgumentNames {
    fn check(ctx: &mut VisitorContext<'_>, arguments: &[Argument]) {
        let mut seen = FxHashSet::default();
        for argument in arguments {
            if !seen.insert(argument.name.value) {
                let message = format!(
                    "There can be only one argument named \"{}\".",
                    ctx.name(argument.name.value)
                );
                ctx.report(codes::DUPLICATE_NAME, argument.name.span, message);
            }
        }
    }
}

impl<'a> Visitor<'a> for UniqueArgumentNames {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        Self::check(ctx, &field.arguments);
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Directive, _location: DirectiveLocation) {
        Self::check(ctx, &directive.arguments);
    }
}

/// Non-null arguments without a default value must be given.
pub struct ProvidedRequiredArguments;

impl ProvidedRequiredArguments {
    fn missing<'d>(
        ctx: &VisitorContext<'_>,
        definitions: &'d IndexMap<String, InputValueDef>,
        arguments: &[Argument],
    ) -> Vec<&'d InputValueDef> {
        let provided: FxHashSet<String> = arguments.iter().map(|arg| ctx.name(arg.name.value)).collect();
        definitions
            .values()
            .filter(|def| def.ty.is_non_null() && def.default_value.is_none() && !provided.contains(&def.name))
            .collect()
    }
}

impl<'a> Visitor<'a> for ProvidedRequiredArguments {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        let Some(def) = ctx.field_def(field) else {
            return;
        };
        for argument in Self::missing(ctx, &def.arguments, &field.arguments) {
            let message = format!(
                "Field \"{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                def.name, argument.name, argument.ty
            );
            ctx.report(codes::MISSING_ARGUMENT, field.span, message);
        }
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Directive, _location: DirectiveLocation) {
        let Some(def) = ctx.schema.directive(&ctx.name(directive.name.value)) else {
            return;
        };
        for argument in Self::missing(ctx, &def.arguments, &directive.arguments) {
            let message = format!(
                "Directive \"@{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                def.name, argument.name, argument.ty
            );
            ctx.report(codes::MISSING_ARGUMENT, directive.span, message);
        }
    }
}

/// Input object literals must not repeat a field.
pub struct UniqueInputFieldNames;

impl UniqueInputFieldNames {
    fn check_value(ctx: &mut VisitorContext<'_>, value: &Value) {
        match value {
            Value::List(items, _) => {
                for item in items {
                    Self::check_value(ctx, item);
                }
            }
            Value::Object(fields, _) => {
                let mut seen: FxHashSet<Text> = FxHashSet::default();
                for (name, value) in fields {
                    if !seen.insert(name.value) {
                        let message = format!("There can be only one input field named \"{}\".", ctx.name(name.value));
                        ctx.report(codes::DUPLICATE_NAME, name.span, message);
                    }
                    Self::check_value(ctx, value);
                }
            }
            _ => {}
        }
    }

    fn check_arguments(ctx: &mut VisitorContext<'_>, arguments: &[Argument]) {
        for argument in arguments {
            Self::check_value(ctx, &argument.value);
        }
    }
}

impl<'a> Visitor<'a> for UniqueInputFieldNames {
    fn enter_variable_definition(&mut self, ctx: &mut VisitorContext<'a>, variable: &'a VariableDefinition) {
        if let Some(value) = &variable.default_value {
            Self::check_value(ctx, value);
        }
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        Self::check_arguments(ctx, &field.arguments);
    }

    fn enter_directive(&mut self, ctx: &mut VisitorContext<'a>, directive: &'a Directive, _location: DirectiveLocation) {
        Self::check_arguments(ctx, &directive.arguments);
    }
}

#[cfg(test)]
mod tests {
    use crate::validation::test_harness::{expect_fails, expect_passes};
    use crate::validation::Rule;

    #[test]
    fn test_known_directives() {
        expect_passes(
            Rule::KnownDirectives,
            "query Q($v: Boolean!) { dog { name @skip(if: $v) @onField ... @include(if: $v) { barkVolume } } }",
        );
        let messages = expect_fails(
            Rule::KnownDirectives,
            "query Q @onField { dog { name @unknown } }",
        );
        assert_eq!(
            messages,
            [
                "Directive \"@onField\" may not be used on QUERY.",
                "Unknown directive \"@unknown\".",
            ]
        );
    }

    #[test]
    fn test_known_argument_names() {
        expect_passes(
            Rule::KnownArgumentNames,
            "query Q { dog { doesKnowCommand(dogCommand: SIT) name @skip(if: true) } }",
        );
        let messages = expect_fails(
            Rule::KnownArgumentNames,
            "query Q { dog { name(nickname: true) barkVolume @skip(iff: true) } }",
        );
        assert_eq!(
            messages,
            [
                "Unknown argument \"nickname\" on field \"Dog.name\".",
                "Unknown argument \"iff\" on directive \"@skip\".",
            ]
        );
    }

    #[test]
    fn test_unique_argument_names() {
        let messages = expect_fails(
            Rule::UniqueArgumentNames,
            "query Q { dog { name(surname: true, surname: false) } }",
        );
        assert_eq!(messages, ["There can be only one argument named \"surname\"."]);
    }

    #[test]
    fn test_provided_required_arguments() {
        expect_passes(
            Rule::ProvidedRequiredArguments,
            "query Q { multiple(req1: 1, req2: 2) dog { isHousetrained } }",
        );
        let messages = expect_fails(
            Rule::ProvidedRequiredArguments,
            "query Q { multiple(req2: 2) dog { name @include } }",
        );
        assert_eq!(
            messages,
            [
                "Field \"multiple\" argument \"req1\" of type \"Int!\" is required, but it was not provided.",
                "Directive \"@include\" argument \"if\" of type \"Boolean!\" is required, but it was not provided.",
            ]
        );
    }

    #[test]
    fn test_unique_input_field_names() {
        expect_passes(
            Rule::UniqueInputFieldNames,
            "query Q { complex(input: {requiredField: true, intField: 1}) }",
        );
        let messages = expect_fails(
            Rule::UniqueInputFieldNames,
            "query Q($i: ComplexInput = {intField: 1, intField: 2}) { complex(input: {requiredField: true, requiredField: false}) }",
        );
        assert_eq!(
            messages,
            [
                "There can be only one input field named \"intField\".",
                "There can be only one input field named \"requiredField\".",
            ]
        );
    }
}
