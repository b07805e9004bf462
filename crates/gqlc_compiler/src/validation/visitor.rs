//! Document walk shared by the validation rules.

use gqlc_core::{DiagnosticBag, Interner, Span, Text};
use gqlc_schema::{FieldDef, Schema, TypeDef};
use gqlc_syntax::ast::*;
use gqlc_syntax::DirectiveLocation;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

/// State available to every rule during the walk.
pub struct VisitorContext<'a> {
    pub schema: &'a Schema,
    pub document: &'a Document,
    pub interner: &'a Interner,
    pub(crate) diagnostics: DiagnosticBag,
    type_stack: Vec<Option<&'a TypeDef>>,
    fragments: FxHashMap<Text, &'a FragmentDefinition>,
}

impl<'a> VisitorContext<'a> {
    pub fn new(schema: &'a Schema, document: &'a Document, interner: &'a Interner) -> Self {
        let mut fragments = FxHashMap::default();
        for fragment in document.fragments() {
            fragments.entry(fragment.name.value).or_insert(fragment);
        }
        Self {
            schema,
            document,
            interner,
            diagnostics: DiagnosticBag::new(),
            type_stack: Vec::new(),
            fragments,
        }
    }

    pub fn report(&mut self, code: &str, span: Span, message: impl Into<String>) {
        let message = message.into();
        self.diagnostics.error(code, message, span, "here");
    }

    pub fn name(&self, text: Text) -> String {
        self.interner.get(text)
    }

    /// The type of the node being visited: the field's type inside a
    /// field, the condition inside a fragment.
    pub fn current_type(&self) -> Option<&'a TypeDef> {
        self.type_stack.last().copied().flatten()
    }

    /// The type enclosing the node being visited.
    pub fn parent_type(&self) -> Option<&'a TypeDef> {
        let len = self.type_stack.len();
        if len < 2 {
            return None;
        }
        self.type_stack[len - 2]
    }

    /// Resolves a field against the enclosing type. Only meaningful while
    /// inside `enter_field`/`exit_field`.
    pub fn field_def(&self, field: &FieldSelection) -> Option<&'a FieldDef> {
        let parent = self.parent_type()?;
        self.schema.field(parent.name(), &self.name(field.name.value))
    }

    pub fn fragment(&self, name: Text) -> Option<&'a FragmentDefinition> {
        self.fragments.get(&name).copied()
    }

    fn lookup_type(&self, name: Text) -> Option<&'a TypeDef> {
        self.schema.get_type(&self.name(name))
    }

    /// Names of every fragment reachable from `set`, in first-spread order.
    pub fn reachable_fragments(&self, set: &'a SelectionSet) -> IndexSet<Text> {
        let mut seen = IndexSet::new();
        self.collect_reachable(set, &mut seen);
        seen
    }

    fn collect_reachable(&self, set: &'a SelectionSet, seen: &mut IndexSet<Text>) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if let Some(nested) = &field.selection_set {
                        self.collect_reachable(nested, seen);
                    }
                }
                Selection::InlineFragment(inline) => self.collect_reachable(&inline.selection_set, seen),
                Selection::FragmentSpread(spread) => {
                    if seen.insert(spread.name.value) {
                        if let Some(fragment) = self.fragment(spread.name.value) {
                            self.collect_reachable(&fragment.selection_set, seen);
                        }
                    }
                }
            }
        }
    }

    /// Every variable referenced by an operation, including through the
    /// fragments it spreads.
    pub fn variable_usages(&self, operation: &'a OperationDefinition) -> Vec<Name> {
        let mut usages = Vec::new();
        collect_directive_variables(&operation.directives, &mut usages);
        let mut visited = FxHashSet::default();
        self.collect_variables(&operation.selection_set, &mut usages, &mut visited);
        usages
    }

    fn collect_variables(&self, set: &'a SelectionSet, usages: &mut Vec<Name>, visited: &mut FxHashSet<Text>) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    for argument in &field.arguments {
                        collect_value_variables(&argument.value, usages);
                    }
                    collect_directive_variables(&field.directives, usages);
                    if let Some(nested) = &field.selection_set {
                        self.collect_variables(nested, usages, visited);
                    }
                }
                Selection::InlineFragment(inline) => {
                    collect_directive_variables(&inline.directives, usages);
                    self.collect_variables(&inline.selection_set, usages, visited);
                }
                Selection::FragmentSpread(spread) => {
                    collect_directive_variables(&spread.directives, usages);
                    if !visited.insert(spread.name.value) {
                        continue;
                    }
                    if let Some(fragment) = self.fragment(spread.name.value) {
                        collect_directive_variables(&fragment.directives, usages);
                        self.collect_variables(&fragment.selection_set, usages, visited);
                    }
                }
            }
        }
    }
}

fn collect_directive_variables(directives: &[Directive], usages: &mut Vec<Name>) {
    for directive in directives {
        for argument in &directive.arguments {
            collect_value_variables(&argument.value, usages);
        }
    }
}

fn collect_value_variables(value: &Value, usages: &mut Vec<Name>) {
    match value {
        Value::Variable(name) => usages.push(*name),
        Value::List(items, _) => {
            for item in items {
                collect_value_variables(item, usages);
            }
        }
        Value::Object(fields, _) => {
            for (_, value) in fields {
                collect_value_variables(value, usages);
            }
        }
        _ => {}
    }
}

/// Hooks called while walking an executable document. Every hook does
/// nothing by default.
pub trait Visitor<'a> {
    fn enter_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a Document) {}
    fn exit_document(&mut self, _ctx: &mut VisitorContext<'a>, _doc: &'a Document) {}

    fn enter_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a OperationDefinition,
    ) {
    }
    fn exit_operation_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _operation: &'a OperationDefinition,
    ) {
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a FragmentDefinition,
    ) {
    }
    fn exit_fragment_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _fragment: &'a FragmentDefinition,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _variable: &'a VariableDefinition,
    ) {
    }

    fn enter_directive(
        &mut self,
        _ctx: &mut VisitorContext<'a>,
        _directive: &'a Directive,
        _location: DirectiveLocation,
    ) {
    }

    fn enter_selection_set(&mut self, _ctx: &mut VisitorContext<'a>, _set: &'a SelectionSet) {}
    fn exit_selection_set(&mut self, _ctx: &mut VisitorContext<'a>, _set: &'a SelectionSet) {}

    fn enter_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a FieldSelection) {}
    fn exit_field(&mut self, _ctx: &mut VisitorContext<'a>, _field: &'a FieldSelection) {}

    fn enter_fragment_spread(&mut self, _ctx: &mut VisitorContext<'a>, _spread: &'a FragmentSpread) {}

    fn enter_inline_fragment(&mut self, _ctx: &mut VisitorContext<'a>, _inline: &'a InlineFragment) {}
    fn exit_inline_fragment(&mut self, _ctx: &mut VisitorContext<'a>, _inline: &'a InlineFragment) {}
}

/// Runs several visitors in one walk, in list order.
pub struct VisitorList<'a>(pub Vec<Box<dyn Visitor<'a> + 'a>>);

impl<'a> Visitor<'a> for VisitorList<'a> {
    fn enter_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for visitor in &mut self.0 {
            visitor.enter_document(ctx, doc);
        }
    }

    fn exit_document(&mut self, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
        for visitor in &mut self.0 {
            visitor.exit_document(ctx, doc);
        }
    }

    fn enter_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        for visitor in &mut self.0 {
            visitor.enter_operation_definition(ctx, operation);
        }
    }

    fn exit_operation_definition(&mut self, ctx: &mut VisitorContext<'a>, operation: &'a OperationDefinition) {
        for visitor in &mut self.0 {
            visitor.exit_operation_definition(ctx, operation);
        }
    }

    fn enter_fragment_definition(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        for visitor in &mut self.0 {
            visitor.enter_fragment_definition(ctx, fragment);
        }
    }

    fn exit_fragment_definition(&mut self, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
        for visitor in &mut self.0 {
            visitor.exit_fragment_definition(ctx, fragment);
        }
    }

    fn enter_variable_definition(&mut self, ctx: &mut VisitorContext<'a>, variable: &'a VariableDefinition) {
        for visitor in &mut self.0 {
            visitor.enter_variable_definition(ctx, variable);
        }
    }

    fn enter_directive(
        &mut self,
        ctx: &mut VisitorContext<'a>,
        directive: &'a Directive,
        location: DirectiveLocation,
    ) {
        for visitor in &mut self.0 {
            visitor.enter_directive(ctx, directive, location);
        }
    }

    fn enter_selection_set(&mut self, ctx: &mut VisitorContext<'a>, set: &'a SelectionSet) {
        for visitor in &mut self.0 {
            visitor.enter_selection_set(ctx, set);
        }
    }

    fn exit_selection_set(&mut self, ctx: &mut VisitorContext<'a>, set: &'a SelectionSet) {
        for visitor in &mut self.0 {
            visitor.exit_selection_set(ctx, set);
        }
    }

    fn enter_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        for visitor in &mut self.0 {
            visitor.enter_field(ctx, field);
        }
    }

    fn exit_field(&mut self, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
        for visitor in &mut self.0 {
            visitor.exit_field(ctx, field);
        }
    }

    fn enter_fragment_spread(&mut self, ctx: &mut VisitorContext<'a>, spread: &'a FragmentSpread) {
        for visitor in &mut self.0 {
            visitor.enter_fragment_spread(ctx, spread);
        }
    }

    fn enter_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline: &'a InlineFragment) {
        for visitor in &mut self.0 {
            visitor.enter_inline_fragment(ctx, inline);
        }
    }

    fn exit_inline_fragment(&mut self, ctx: &mut VisitorContext<'a>, inline: &'a InlineFragment) {
        for visitor in &mut self.0 {
            visitor.exit_inline_fragment(ctx, inline);
        }
    }
}

/// Walks every executable definition of `doc`, keeping the type stack of
/// `ctx` in step.
pub fn visit<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, doc: &'a Document) {
    v.enter_document(ctx, doc);
    for definition in &doc.definitions {
        match definition {
            Definition::Operation(operation) => visit_operation(v, ctx, operation),
            Definition::Fragment(fragment) => visit_fragment(v, ctx, fragment),
            _ => {}
        }
    }
    v.exit_document(ctx, doc);
}

fn visit_operation<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    operation: &'a OperationDefinition,
) {
    let root = ctx
        .schema
        .root_type_name(operation.operation)
        .and_then(|name| ctx.schema.get_type(name));
    ctx.type_stack.push(root);

    v.enter_operation_definition(ctx, operation);
    for variable in &operation.variables {
        v.enter_variable_definition(ctx, variable);
        visit_directives(v, ctx, &variable.directives, DirectiveLocation::VariableDefinition);
    }
    let location = match operation.operation {
        OperationType::Query => DirectiveLocation::Query,
        OperationType::Mutation => DirectiveLocation::Mutation,
        OperationType::Subscription => DirectiveLocation::Subscription,
    };
    visit_directives(v, ctx, &operation.directives, location);
    visit_selection_set(v, ctx, &operation.selection_set);
    v.exit_operation_definition(ctx, operation);

    ctx.type_stack.pop();
}

fn visit_fragment<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, fragment: &'a FragmentDefinition) {
    let condition = ctx.lookup_type(fragment.type_condition.value);
    ctx.type_stack.push(condition);

    v.enter_fragment_definition(ctx, fragment);
    visit_directives(v, ctx, &fragment.directives, DirectiveLocation::FragmentDefinition);
    visit_selection_set(v, ctx, &fragment.selection_set);
    v.exit_fragment_definition(ctx, fragment);

    ctx.type_stack.pop();
}

fn visit_directives<'a, V: Visitor<'a>>(
    v: &mut V,
    ctx: &mut VisitorContext<'a>,
    directives: &'a [Directive],
    location: DirectiveLocation,
) {
    for directive in directives {
        v.enter_directive(ctx, directive, location);
    }
}

fn visit_selection_set<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, set: &'a SelectionSet) {
    v.enter_selection_set(ctx, set);
    for selection in &set.selections {
        match selection {
            Selection::Field(field) => visit_field(v, ctx, field),
            Selection::FragmentSpread(spread) => {
                v.enter_fragment_spread(ctx, spread);
                visit_directives(v, ctx, &spread.directives, DirectiveLocation::FragmentSpread);
            }
            Selection::InlineFragment(inline) => {
                let condition = match inline.type_condition {
                    Some(name) => ctx.lookup_type(name.value),
                    None => ctx.current_type(),
                };
                ctx.type_stack.push(condition);
                v.enter_inline_fragment(ctx, inline);
                visit_directives(v, ctx, &inline.directives, DirectiveLocation::InlineFragment);
                visit_selection_set(v, ctx, &inline.selection_set);
                v.exit_inline_fragment(ctx, inline);
                ctx.type_stack.pop();
            }
        }
    }
    v.exit_selection_set(ctx, set);
}

fn visit_field<'a, V: Visitor<'a>>(v: &mut V, ctx: &mut VisitorContext<'a>, field: &'a FieldSelection) {
    let field_type = ctx.current_type().and_then(|parent| {
        let def = ctx.schema.field(parent.name(), &ctx.name(field.name.value))?;
        ctx.schema.get_type(&def.ty.name)
    });
    ctx.type_stack.push(field_type);

    v.enter_field(ctx, field);
    visit_directives(v, ctx, &field.directives, DirectiveLocation::Field);
    if let Some(set) = &field.selection_set {
        visit_selection_set(v, ctx, set);
    }
    v.exit_field(ctx, field);

    ctx.type_stack.pop();
}
