use crate::validation::{Visitor, VisitorContext};
use gqlc_core::diagnostics::codes;
use gqlc_core::Text;
use gqlc_syntax::ast::{OperationDefinition, VariableDefinition};
use rustc_hash::FxHashSet;

#[derive(Default)]
pub struct UniqueVariableNames {
    names: FxHashSet<Text>,
}

impl<'a> Visitor<'a> for UniqueVariableNames {
    fn enter_operation_definition(&mut self, _ctx: &mut VisitorContext<'a>, _operation: &'a OperationDefinition) {
        self.names.clear();
    }

    fn enter_variable_definition(&mut self, ctx: &mut VisitorContext<'a>, variable: &'a VariableDefinition) {
        if !self.names.insert(variable.name.value) {
            let message = format!(
                "There can be only one variable named \"${}\".",
                ctx.name(variable.name.value)
            );
            ctx.report(codes::DUPLICATE_NAME, variable.name.span, message);
        }
    }
}

fn operation_suffix(ctx: &VisitorContext<'_>, operation: &OperationDefinition) -> String {
    match operation.name {
        Some(name) => format!(" by operation \"{}\"", ctx.name(name.value)),
        None => String::new(),
    }
}

/// Every variable used, directly or through spread fragments, must be
/// declared by the operation.
pub struct NoUndefinedVariables;

impl<'a> Visitor<'a> for NoUndefinedVariables {
    fn exit_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        let defined: FxHashSet<Text> = operation.variables.iter().map(|v| v.name.value).collect();
        let suffix = operation_suffix(ctx, operation);
        for usage in ctx.variable_usages(operation) {
            if !defined.contains(&usage.value) {
                let message = format!("Variable \"${}\" is not defined{suffix}.", ctx.name(usage.value));
                ctx.report(codes::UNKNOWN_VARIABLE, usage.span, message);
            }
        }
    }
}

pub struct NoUnusedVariables;

impl<'a> Visitor<'a> for NoUnusedVariables {
    fn exit_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        let used: FxHashSet<Text> = ctx
            .variable_usages(operation)
            .into_iter()
            .map(|usage| usage.value)
            .collect();
        for variable in &operation.variables {
            if used.contains(&variable.name.value) {
                continue;
            }
            let message = match operation.name {
                Some(name) => format!(
                    "Variable \"${}\" is never used in operation \"{}\".",
                    ctx.name(variable.name.value),
                    ctx.name(name.value)
                ),
                None => format!("Variable \"${}\" is never used.", ctx.name(variable.name.value)),
            };
            ctx.report(codes::UNUSED_DEFINITION, variable.span, message);
        }
    }
}
