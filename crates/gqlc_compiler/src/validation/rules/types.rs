use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_syntax::ast::{FragmentDefinition, InlineFragment, Name, VariableDefinition};

pub struct KnownTypeNames;

impl KnownTypeNames {
    fn check(ctx: &mut VisitorContext<'_>, name: Name) {
        let type_name = ctx.name(name.value);
        if ctx.schema.get_type(&type_name).is_none() {
            ctx.report(codes::UNDEFINED_TYPE, name.span, format!("Unknown type \"{type_name}\"."));
        }
    }
}

impl<'a> Visitor<'a> for KnownTypeNames {
    fn enter_variable_definition(&mut self, ctx: &mut VisitorContext<'a>, variable: &'a VariableDefinition) {
        let named = variable.ty.named();
        Self::check(ctx, Name::new(named.name, named.span));
    }

    fn enter_fragment_definition(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        Self::check(ctx, fragment.type_condition);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline: &'a InlineFragment) {
        if let Some(condition) = inline.type_condition {
            Self::check(ctx, condition);
        }
    }
}

/// Type conditions must name objects, interfaces or unions.
pub struct FragmentsOnCompositeTypes;

impl<'a> Visitor<'a> for FragmentsOnCompositeTypes {
    fn enter_fragment_definition(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        if let Some(ty) = ctx.current_type() {
            if !ty.is_composite() {
                let message = format!(
                    "Fragment \"{}\" cannot condition on non composite type \"{}\".",
                    ctx.name(fragment.name.value),
                    ty.name()
                );
                ctx.report(codes::INVALID_FRAGMENT, fragment.type_condition.span, message);
            }
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline: &'a InlineFragment) {
        let Some(condition) = inline.type_condition else {
            return;
        };
        if let Some(ty) = ctx.current_type() {
            if !ty.is_composite() {
                let message = format!("Fragment cannot condition on non composite type \"{}\".", ty.name());
                ctx.report(codes::INVALID_FRAGMENT, condition.span, message);
            }
        }
    }
}

pub struct VariablesAreInputTypes;

impl<'a> Visitor<'a> for VariablesAreInputTypes {
    fn enter_variable_definition(&mut self, ctx: &mut VisitorContext<'a>, variable: &'a VariableDefinition) {
        let type_name = ctx.name(variable.ty.named().name);
        if ctx.schema.get_type(&type_name).is_some_and(|ty| !ty.is_input()) {
            let message = format!(
                "Variable \"${}\" cannot be non-input type \"{}\".",
                ctx.name(variable.name.value),
                gqlc_syntax::print_type(&variable.ty, ctx.interner)
            );
            ctx.report(codes::INVALID_VARIABLE_TYPE, variable.ty.span(), message);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::validation::test_harness::{expect_fails, expect_passes};
    use crate::validation::Rule;

    #[test]
    fn test_known_type_names() {
        expect_passes(
            Rule::KnownTypeNames,
            "query Q($id: ID, $input: ComplexInput) { dog { ... on Pet { name } ...F } } fragment F on Dog { name }",
        );
        let messages = expect_fails(
            Rule::KnownTypeNames,
            "query Q($a: [Bad!]) { dog { ... on Badger { name } } } fragment F on Peat { name }",
        );
        assert_eq!(
            messages,
            [
                "Unknown type \"Bad\".",
                "Unknown type \"Badger\".",
                "Unknown type \"Peat\".",
            ]
        );
    }

    #[test]
    fn test_fragments_on_composite_types() {
        expect_passes(
            Rule::FragmentsOnCompositeTypes,
            "fragment F on Pet { ... on Dog { barkVolume } ... { name } } fragment G on CatOrDog { __typename }",
        );
        let messages = expect_fails(
            Rule::FragmentsOnCompositeTypes,
            "fragment F on Boolean { x } fragment G on Dog { ... on DogCommand { x } }",
        );
        assert_eq!(
            messages,
            [
                "Fragment \"F\" cannot condition on non composite type \"Boolean\".",
                "Fragment cannot condition on non composite type \"DogCommand\".",
            ]
        );
    }

    #[test]
    fn test_variables_are_input_types() {
        expect_passes(
            Rule::VariablesAreInputTypes,
            "query Q($a: String, $b: [Boolean!]!, $c: ComplexInput, $d: DogCommand) { dog { name } }",
        );
        let messages = expect_fails(Rule::VariablesAreInputTypes, "query Q($a: [Dog]!, $b: Pet) { dog { name } }");
        assert_eq!(
            messages,
            [
                "Variable \"$a\" cannot be non-input type \"[Dog]!\".",
                "Variable \"$b\" cannot be non-input type \"Pet\".",
            ]
        );
    }
}
