use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_syntax::ast::FieldSelection;

/// Leaf fields take no selection set; composite fields require one.
pub struct ScalarLeafs;

impl<'a> Visitor<'a> for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        let (Some(def), Some(ty)) = (ctx.field_def(field), ctx.current_type()) else {
            return;
        };
        let name = ctx.name(field.name.value);
        match (&field.selection_set, ty.is_leaf()) {
            (Some(set), true) => ctx.report(
                codes::INVALID_SELECTION,
                set.span,
                format!(
                    "Field \"{name}\" must not have a selection since type \"{}\" has no subfields.",
                    def.ty
                ),
            ),
            (None, false) => ctx.report(
                codes::INVALID_SELECTION,
                field.span,
                format!(
                    "Field \"{name}\" of type \"{}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?",
                    def.ty
                ),
            ),
            _ => {}
        }
    }
}

pub struct FieldsOnCorrectType;

impl<'a> Visitor<'a> for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        if ctx.field_def(field).is_none() {
            let message = format!(
                "Cannot query field \"{}\" on type \"{}\".",
                ctx.name(field.name.value),
                parent.name()
            );
            ctx.report(codes::UNKNOWN_FIELD, field.name.span, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::validation::test_harness::{expect_fails, expect_passes};
    use crate::validation::Rule;

    #[test]
    fn test_scalar_leafs() {
        expect_passes(Rule::ScalarLeafs, "query Q { dog { barkVolume owner { name } } }");
        let messages = expect_fails(
            Rule::ScalarLeafs,
            "query Q { dog human { name { length } } }",
        );
        assert_eq!(
            messages,
            [
                "Field \"dog\" of type \"Dog\" must have a selection of subfields. Did you mean \"dog { ... }\"?",
                "Field \"name\" must not have a selection since type \"String\" has no subfields.",
            ]
        );
    }

    #[test]
    fn test_fields_on_correct_type() {
        expect_passes(
            Rule::FieldsOnCorrectType,
            "query Q { __typename pet { __typename name ... on Dog { barkVolume } } catOrDog { __typename } }",
        );
        let messages = expect_fails(
            Rule::FieldsOnCorrectType,
            "query Q { pet { barkVolume } catOrDog { name } dog { meowVolume } }",
        );
        assert_eq!(
            messages,
            [
                "Cannot query field \"barkVolume\" on type \"Pet\".",
                "Cannot query field \"name\" on type \"CatOrDog\".",
                "Cannot query field \"meowVolume\" on type \"Dog\".",
            ]
        );
    }

    #[test]
    fn test_meta_fields_only_on_query_root() {
        expect_passes(Rule::FieldsOnCorrectType, "query Q { __schema { queryType { name } } }");
        let messages = expect_fails(Rule::FieldsOnCorrectType, "query Q { dog { __schema { types { name } } } }");
        assert_eq!(messages, ["Cannot query field \"__schema\" on type \"Dog\"."]);
    }
}
