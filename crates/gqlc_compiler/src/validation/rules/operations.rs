use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_syntax::ast::{Definition, Document, OperationDefinition};
use rustc_hash::FxHashSet;

/// Only operations and fragments may appear in a document.
pub struct ExecutableDefinitions;

impl<'a> Visitor<'a> for ExecutableDefinitions {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for definition in &doc.definitions {
            let name = match definition {
                Definition::Operation(_) | Definition::Fragment(_) => continue,
                Definition::Schema(_) | Definition::SchemaExtension(_) => "schema".to_string(),
                Definition::Type(def) | Definition::TypeExtension(def) => {
                    format!("\"{}\"", ctx.name(def.name().value))
                }
                Definition::Directive(def) => format!("\"@{}\"", ctx.name(def.name.value)),
            };
            ctx.report(
                codes::INVALID_OPERATION,
                definition.span(),
                format!("The {name} definition is not executable."),
            );
        }
    }
}

#[derive(Default)]
pub struct UniqueOperationNames {
    names: FxHashSet<Text>,
}

impl<'a> Visitor<'a> for UniqueOperationNames {
    fn enter_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        let Some(name) = operation.name else {
            return;
        };
        if !self.names.insert(name.value) {
            ctx.report(
                codes::DUPLICATE_NAME,
                name.span,
                format!("There can be only one operation named \"{}\".", ctx.name(name.value)),
            );
        }
    }
}

#[derive(Default)]
pub struct LoneAnonymousOperation {
    operation_count: usize,
}

impl<'a> Visitor<'a> for LoneAnonymousOperation {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        self.operation_count = doc.operations().count();
    }

    fn enter_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        if operation.name.is_none() && self.operation_count > 1 {
            ctx.report(
                codes::INVALID_OPERATION,
                operation.span,
                "This anonymous operation must be the only defined operation.",
            );
        }
    }
}
