use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_schema::TypeDef;
use gqlc_syntax::ast::{FieldSelection, Selection, SelectionSet};
use gqlc_syntax::print_value;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Fields sharing a response key in one selection set must be mergeable:
/// same field and arguments when their parents may be the same object,
/// and the same type in every case.
pub struct OverlappingFieldsCanBeMerged;

struct CollectedField<'a> {
    parent: Option<&'a TypeDef>,
    field: &'a FieldSelection,
}

impl<'a> Visitor<'a> for OverlappingFieldsCanBeMerged {
    fn enter_selection_set(&mut self, ctx: &mut VisitorContext<'a>, set: &'a SelectionSet) {
        let mut by_key: IndexMap<Text, Vec<CollectedField<'a>>> = IndexMap::new();
        let mut visited = FxHashSet::default();
        collect_fields(ctx, ctx.current_type(), set, &mut by_key, &mut visited);

        for (key, fields) in &by_key {
            let Some((first, rest)) = fields.split_first() else {
                continue;
            };
            for other in rest {
                if let Some(reason) = conflict(ctx, first, other) {
                    let message = format!(
                        "Fields \"{}\" conflict because {reason}. Use different aliases on the fields to fetch both if this was intentional.",
                        ctx.name(*key)
                    );
                    ctx.report(codes::FIELD_CONFLICT, other.field.span, message);
                    break;
                }
            }
        }
    }
}

fn collect_fields<'a>(
    ctx: &VisitorContext<'a>,
    parent: Option<&'a TypeDef>,
    set: &'a SelectionSet,
    out: &mut IndexMap<Text, Vec<CollectedField<'a>>>,
    visited: &mut FxHashSet<Text>,
) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => {
                out.entry(field.response_key().value)
                    .or_default()
                    .push(CollectedField { parent, field });
            }
            Selection::InlineFragment(inline) => {
                let condition = match inline.type_condition {
                    Some(name) => ctx.schema.get_type(&ctx.name(name.value)),
                    None => parent,
                };
                collect_fields(ctx, condition, &inline.selection_set, out, visited);
            }
            Selection::FragmentSpread(spread) => {
                if !visited.insert(spread.name.value) {
                    continue;
                }
                if let Some(fragment) = ctx.fragment(spread.name.value) {
                    let condition = ctx.schema.get_type(&ctx.name(fragment.type_condition.value));
                    collect_fields(ctx, condition, &fragment.selection_set, out, visited);
                }
            }
        }
    }
}

fn conflict(ctx: &VisitorContext<'_>, a: &CollectedField<'_>, b: &CollectedField<'_>) -> Option<String> {
    let exclusive = match (a.parent, b.parent) {
        (Some(TypeDef::Object(pa)), Some(TypeDef::Object(pb))) => pa.name != pb.name,
        _ => false,
    };
    let name_a = ctx.name(a.field.name.value);
    let name_b = ctx.name(b.field.name.value);

    if !exclusive {
        if name_a != name_b {
            return Some(format!("\"{name_a}\" and \"{name_b}\" are different fields"));
        }
        if arguments(ctx, a.field) != arguments(ctx, b.field) {
            return Some("they have differing arguments".to_string());
        }
    }

    let ty_a = a.parent.and_then(|p| ctx.schema.field(p.name(), &name_a)).map(|def| &def.ty);
    let ty_b = b.parent.and_then(|p| ctx.schema.field(p.name(), &name_b)).map(|def| &def.ty);
    match (ty_a, ty_b) {
        (Some(ty_a), Some(ty_b)) if ty_a != ty_b => Some(format!(
            "they return conflicting types \"{ty_a}\" and \"{ty_b}\""
        )),
        _ => None,
    }
}

fn arguments(ctx: &VisitorContext<'_>, field: &FieldSelection) -> Vec<(String, String)> {
    let mut args: Vec<_> = field
        .arguments
        .iter()
        .map(|arg| (ctx.name(arg.name.value), print_value(&arg.value, ctx.interner)))
        .collect();
    args.sort();
    args
}

#[cfg(test)]
mod tests {
    use crate::validation::test_harness::{expect_fails, expect_passes};
    use crate::validation::Rule;

    #[test]
    fn test_identical_fields_merge() {
        expect_passes(
            Rule::OverlappingFieldsCanBeMerged,
            "query Q { dog { name name ...F otherName: nickname } } fragment F on Dog { name }",
        );
    }

    #[test]
    fn test_different_fields_same_alias() {
        let messages = expect_fails(
            Rule::OverlappingFieldsCanBeMerged,
            "query Q { dog { name: nickname name } }",
        );
        assert_eq!(
            messages,
            ["Fields \"name\" conflict because \"nickname\" and \"name\" are different fields. Use different aliases on the fields to fetch both if this was intentional."]
        );
    }

    #[test]
    fn test_differing_arguments() {
        let messages = expect_fails(
            Rule::OverlappingFieldsCanBeMerged,
            "query Q { dog { name(surname: true) name(surname: false) } }",
        );
        assert_eq!(
            messages,
            ["Fields \"name\" conflict because they have differing arguments. Use different aliases on the fields to fetch both if this was intentional."]
        );
    }

    #[test]
    fn test_exclusive_parents_allow_different_fields() {
        expect_passes(
            Rule::OverlappingFieldsCanBeMerged,
            "query Q { pet { ... on Dog { volume: barkVolume } ... on Cat { volume: meowVolume } } }",
        );
    }

    #[test]
    fn test_conflicting_types_on_exclusive_parents() {
        let messages = expect_fails(
            Rule::OverlappingFieldsCanBeMerged,
            "query Q { pet { ... on Dog { x: barkVolume } ... on Cat { x: name } } }",
        );
        assert_eq!(
            messages,
            ["Fields \"x\" conflict because they return conflicting types \"Int\" and \"String\". Use different aliases on the fields to fetch both if this was intentional."]
        );
    }
}
