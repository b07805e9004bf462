use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_syntax::ast::{
    Document, FragmentDefinition, FragmentSpread, InlineFragment, Selection, SelectionSet,
};
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Default)]
pub struct UniqueFragmentNames {
    names: FxHashSet<Text>,
}

impl<'a> Visitor<'a> for UniqueFragmentNames {
    fn enter_fragment_definition(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        if !self.names.insert(fragment.name.value) {
            let message = format!(
                "There can be only one fragment named \"{}\".",
                ctx.name(fragment.name.value)
            );
            ctx.report(codes::DUPLICATE_NAME, fragment.name.span, message);
        }
    }
}

pub struct KnownFragmentNames;

impl<'a> Visitor<'a> for KnownFragmentNames {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a FragmentSpread) {
        if ctx.fragment(spread.name.value).is_none() {
            let message = format!("Unknown fragment \"{}\".", ctx.name(spread.name.value));
            ctx.report(codes::UNKNOWN_FRAGMENT, spread.name.span, message);
        }
    }
}

/// Every fragment must be reachable from some operation.
pub struct NoUnusedFragments;

impl<'a> Visitor<'a> for NoUnusedFragments {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        let mut used = FxHashSet::default();
        for operation in doc.operations() {
            used.extend(ctx.reachable_fragments(&operation.selection_set));
        }
        for fragment in doc.fragments() {
            if !used.contains(&fragment.name.value) {
                let message = format!("Fragment \"{}\" is never used.", ctx.name(fragment.name.value));
                ctx.report(codes::UNUSED_DEFINITION, fragment.span, message);
            }
        }
    }
}

/// A fragment may only be spread where its type condition can apply.
pub struct PossibleFragmentSpreads;

impl<'a> Visitor<'a> for PossibleFragmentSpreads {
    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a FragmentSpread) {
        let Some(fragment) = ctx.fragment(spread.name.value) else {
            return;
        };
        let (Some(parent), Some(condition)) = (
            ctx.current_type(),
            ctx.schema.get_type(&ctx.name(fragment.type_condition.value)),
        ) else {
            return;
        };
        if parent.is_composite()
            && condition.is_composite()
            && !ctx.schema.types_overlap(parent.name(), condition.name())
        {
            let message = format!(
                "Fragment \"{}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                ctx.name(spread.name.value),
                parent.name(),
                condition.name()
            );
            ctx.report(codes::INVALID_FRAGMENT, spread.span, message);
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline: &'a InlineFragment) {
        let (Some(parent), Some(condition)) = (ctx.parent_type(), ctx.current_type()) else {
            return;
        };
        if parent.is_composite()
            && condition.is_composite()
            && !ctx.schema.types_overlap(parent.name(), condition.name())
        {
            let message = format!(
                "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                parent.name(),
                condition.name()
            );
            ctx.report(codes::INVALID_FRAGMENT, inline.span, message);
        }
    }
}

/// Fragments must not spread themselves, directly or through others.
pub struct NoFragmentCycles;

impl<'a> Visitor<'a> for NoFragmentCycles {
    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        let mut detector = CycleDetector::default();
        for fragment in doc.fragments() {
            if !detector.visited.contains(&fragment.name.value) {
                detector.detect(ctx, fragment);
            }
        }
    }
}

#[derive(Default)]
struct CycleDetector {
    visited: FxHashSet<Text>,
    path: Vec<Text>,
    path_index: FxHashMap<Text, usize>,
}

impl CycleDetector {
    fn detect<'a>(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        let name = fragment.name.value;
        self.visited.insert(name);
        self.path_index.insert(name, self.path.len());
        self.path.push(name);

        let mut spreads = Vec::new();
        direct_spreads(&fragment.selection_set, &mut spreads);
        for spread in spreads {
            let target = spread.name.value;
            if let Some(&start) = self.path_index.get(&target) {
                let via: Vec<String> = self.path[start + 1..].iter().map(|name| ctx.name(*name)).collect();
                let message = if via.is_empty() {
                    format!("Cannot spread fragment \"{}\" within itself.", ctx.name(target))
                } else {
                    format!(
                        "Cannot spread fragment \"{}\" within itself via {}.",
                        ctx.name(target),
                        via.join(", ")
                    )
                };
                ctx.report(codes::FRAGMENT_CYCLE, spread.span, message);
            } else if !self.visited.contains(&target) {
                if let Some(next) = ctx.fragment(target) {
                    self.detect(ctx, next);
                }
            }
        }

        self.path.pop();
        self.path_index.remove(&name);
    }
}

fn direct_spreads<'a>(set: &'a SelectionSet, out: &mut Vec<&'a FragmentSpread>) {
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => {
                if let Some(nested) = &field.selection_set {
                    direct_spreads(nested, out);
                }
            }
            Selection::InlineFragment(inline) => direct_spreads(&inline.selection_set, out),
            Selection::FragmentSpread(spread) => out.push(spread),
        }
    }
}
