//! The selection compiler.
//!
//! Each operation and fragment is compiled against its parent type.
//! Fields are resolved through the schema and merged by response key.
//! Fragment spreads and inline fragments either merge into the
//! unconditional fields or, when their type condition narrows the parent,
//! open a variant. Once a selection set is complete every variant receives
//! the unconditional fields so it describes the full shape for its type.

use crate::collect::TypeCollector;
use crate::error::{CompileError, CompileErrorKind};
use crate::ir::*;
use crate::options::CompilerOptions;
use crate::value::decode_value;
use gqlc_core::{Interner, SourceMap, Span, Text};
use gqlc_schema::Schema;
use gqlc_syntax::ast::{self, Directive, OperationType};
use gqlc_syntax::{PrintOptions, Printer};
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use rustc_hash::{FxHashMap, FxHashSet};
use std::path::Path;

type CompileResult<T> = Result<T, CompileError>;

/// Types in effect while collecting one level of selections.
#[derive(Clone, Copy)]
struct Scope<'s> {
    /// Type of the selection set being built.
    parent: &'s str,
    /// `parent`, or the variant condition fields are recorded under.
    record: &'s str,
    /// Innermost type condition, as written in the document.
    current: &'s str,
}

/// Compiles every operation and fragment of a validated document.
///
/// The first error aborts compilation; no partial document is returned.
pub fn compile(
    schema: &Schema,
    document: &ast::Document,
    interner: &Interner,
    sources: &SourceMap,
    options: &CompilerOptions,
) -> CompileResult<CompiledDocument> {
    Compiler::new(schema, document, interner, sources, options).compile_document()
}

struct Compiler<'a> {
    schema: &'a Schema,
    interner: &'a Interner,
    sources: &'a SourceMap,
    options: &'a CompilerOptions,
    document: &'a ast::Document,
    fragments: FxHashMap<Text, &'a ast::FragmentDefinition>,
}

impl<'a> Compiler<'a> {
    fn new(
        schema: &'a Schema,
        document: &'a ast::Document,
        interner: &'a Interner,
        sources: &'a SourceMap,
        options: &'a CompilerOptions,
    ) -> Self {
        let mut fragments = FxHashMap::default();
        for fragment in document.fragments() {
            fragments.entry(fragment.name.value).or_insert(fragment);
        }
        Self {
            schema,
            interner,
            sources,
            options,
            document,
            fragments,
        }
    }

    fn compile_document(&self) -> CompileResult<CompiledDocument> {
        let mut compiled = CompiledDocument::default();

        for operation in self.document.operations() {
            let operation = self.compile_operation(operation)?;
            compiled.operations.insert(operation.name.clone(), operation);
        }
        for fragment in self.document.fragments() {
            let fragment = self.compile_fragment(fragment)?;
            compiled.fragments.insert(fragment.name.clone(), fragment);
        }

        let mut collector = TypeCollector::new(self.schema);
        collector.add_document(&compiled);
        compiled.types_used = collector.finish();

        Ok(compiled)
    }

    fn compile_operation(&self, operation: &ast::OperationDefinition) -> CompileResult<CompiledOperation> {
        let name = operation
            .name
            .map(|name| self.interner.get(name.value))
            .unwrap_or_default();

        let root_type = self
            .schema
            .root_type_name(operation.operation)
            .ok_or_else(|| {
                let kind = match operation.operation {
                    OperationType::Query => "queries",
                    OperationType::Mutation => "mutations",
                    OperationType::Subscription => "subscriptions",
                };
                self.error(
                    CompileErrorKind::MissingRootType,
                    format!("Schema is not configured for {kind}"),
                    operation.span,
                )
            })?
            .to_string();

        let variables = operation
            .variables
            .iter()
            .map(|variable| CompiledVariable {
                name: self.interner.get(variable.name.value),
                ty: gqlc_schema::TypeRef::from_ast(&variable.ty, self.interner),
                default_value: variable
                    .default_value
                    .as_ref()
                    .map(|value| decode_value(value, self.interner)),
            })
            .collect();

        let selection_set = self.compile_root(&root_type, &operation.selection_set, true, operation.span)?;
        tracing::debug!(operation = %name, root = %root_type, "compiled operation");

        Ok(CompiledOperation {
            name,
            operation_type: operation.operation,
            root_type,
            variables,
            source: self.printer().operation(operation),
            file_path: self.file_path(operation.span),
            selection_set,
            fragments_referenced: self.fragments_referenced(&operation.selection_set),
        })
    }

    fn compile_fragment(&self, fragment: &ast::FragmentDefinition) -> CompileResult<CompiledFragment> {
        let name = self.interner.get(fragment.name.value);
        let type_condition = self.interner.get(fragment.type_condition.value);
        if self.schema.get_type(&type_condition).is_none() {
            return Err(self.error(
                CompileErrorKind::UnknownType,
                format!("Unknown type \"{type_condition}\"."),
                fragment.type_condition.span,
            ));
        }

        let selection_set = self.compile_root(&type_condition, &fragment.selection_set, false, fragment.span)?;
        tracing::debug!(fragment = %name, on = %type_condition, "compiled fragment");

        Ok(CompiledFragment {
            name,
            possible_types: self.schema.possible_types(&type_condition).to_vec(),
            type_condition,
            source: self.printer().fragment(fragment),
            file_path: self.file_path(fragment.span),
            selection_set,
            fragments_referenced: self.fragments_referenced(&fragment.selection_set),
        })
    }

    /// Compiles the top selection set of an operation or fragment and
    /// completes its variants.
    fn compile_root(
        &self,
        parent: &str,
        set: &ast::SelectionSet,
        is_operation_root: bool,
        span: Span,
    ) -> CompileResult<SelectionSet> {
        let mut compiled = self.compile_selection_set(parent, set, is_operation_root)?;
        self.complete_variants(&mut compiled, span)?;
        Ok(compiled)
    }

    fn compile_selection_set(
        &self,
        parent: &str,
        set: &ast::SelectionSet,
        is_operation_root: bool,
    ) -> CompileResult<SelectionSet> {
        let mut compiled = SelectionSet::default();
        if self.options.add_typename && !is_operation_root {
            let typename = self.typename_field();
            compiled.fields.insert(typename.response_key.clone(), typename);
        }

        let mut spreading = FxHashSet::default();
        let scope = Scope {
            parent,
            record: parent,
            current: parent,
        };
        self.collect_selections(scope, set, false, &mut compiled, &mut spreading)?;
        Ok(compiled)
    }

    /// Adds the selections of `set` to the selection set of `scope.parent`.
    ///
    /// Fields are recorded against `scope.record` and looked up on it
    /// first, then on `scope.current`. A field recorded under a narrowed
    /// type is conditional.
    fn collect_selections(
        &self,
        scope: Scope<'_>,
        set: &ast::SelectionSet,
        conditional: bool,
        out: &mut SelectionSet,
        spreading: &mut FxHashSet<Text>,
    ) -> CompileResult<()> {
        for selection in &set.selections {
            match selection {
                ast::Selection::Field(field) => {
                    let narrowed = scope.record != scope.parent;
                    let conditional = conditional || narrowed || self.is_conditional(&field.directives);
                    let compiled = self.compile_field(scope, field, conditional)?;
                    let fields = if narrowed {
                        &mut self.variant_mut(out, scope.record).fields
                    } else {
                        &mut out.fields
                    };
                    self.merge_field(fields, compiled, field.span)?;
                }
                ast::Selection::InlineFragment(inline) => {
                    let condition = match inline.type_condition {
                        Some(name) => self.interner.get(name.value),
                        None => scope.current.to_string(),
                    };
                    let span = inline.type_condition.map_or(inline.span, |name| name.span);
                    let Some(record) = self.narrow(scope, &condition, span)? else {
                        continue;
                    };
                    let inner = Scope {
                        parent: scope.parent,
                        record: &record,
                        current: &condition,
                    };
                    let conditional = conditional || self.is_conditional(&inline.directives);
                    self.collect_selections(inner, &inline.selection_set, conditional, out, spreading)?;
                }
                ast::Selection::FragmentSpread(spread) => {
                    let fragment = self.fragments.get(&spread.name.value).ok_or_else(|| {
                        self.error(
                            CompileErrorKind::UnknownFragment,
                            format!("Unknown fragment \"{}\".", self.interner.get(spread.name.value)),
                            spread.name.span,
                        )
                    })?;
                    let condition = self.interner.get(fragment.type_condition.value);
                    let Some(record) = self.narrow(scope, &condition, spread.span)? else {
                        continue;
                    };

                    if !self.options.merge_in_fields_from_fragment_spreads
                        || !spreading.insert(spread.name.value)
                    {
                        continue;
                    }
                    let inner = Scope {
                        parent: scope.parent,
                        record: &record,
                        current: &condition,
                    };
                    let conditional = conditional || self.is_conditional(&spread.directives);
                    self.collect_selections(inner, &fragment.selection_set, conditional, out, spreading)?;
                    spreading.remove(&spread.name.value);
                }
            }
        }
        Ok(())
    }

    /// Returns the type fields under `condition` are recorded against, or
    /// `None` when no runtime type of the recording scope satisfies it.
    ///
    /// A condition the recording type already satisfies keeps it, including
    /// an abstract type with the same possible types. Any other overlapping
    /// condition opens a variant.
    fn narrow(&self, scope: Scope<'_>, condition: &str, span: Span) -> CompileResult<Option<String>> {
        if self.schema.get_type(condition).is_none() {
            return Err(self.error(
                CompileErrorKind::UnknownType,
                format!("Unknown type \"{condition}\"."),
                span,
            ));
        }
        let current = scope.current;
        if !self.schema.is_subtype(condition, current) && !self.schema.is_subtype(current, condition) {
            return Err(self.error(
                CompileErrorKind::IncompatibleTypeCondition,
                format!(
                    "Fragment cannot be spread here as objects of type \"{current}\" can never be of type \"{condition}\"."
                ),
                span,
            ));
        }

        let record = scope.record;
        if self.schema.is_subtype(record, condition) {
            Ok(Some(record.to_string()))
        } else if self.schema.types_overlap(condition, record) {
            Ok(Some(condition.to_string()))
        } else {
            tracing::trace!(condition, record, "skipped unreachable type condition");
            Ok(None)
        }
    }

    fn variant_mut<'s>(&self, set: &'s mut SelectionSet, condition: &str) -> &'s mut Variant {
        set.variants.entry(condition.to_string()).or_insert_with(|| {
            tracing::trace!(condition, "opened variant");
            Variant {
                type_condition: condition.to_string(),
                possible_types: self.schema.possible_types(condition).to_vec(),
                fields: IndexMap::new(),
            }
        })
    }

    fn compile_field(
        &self,
        scope: Scope<'_>,
        field: &ast::FieldSelection,
        is_conditional: bool,
    ) -> CompileResult<CompiledField> {
        let field_name = self.interner.get(field.name.value);
        let def = self
            .schema
            .field(scope.record, &field_name)
            .or_else(|| self.schema.field(scope.current, &field_name))
            .ok_or_else(|| {
                self.error(
                    CompileErrorKind::UnknownField,
                    format!("Cannot query field \"{field_name}\" on type \"{}\".", scope.current),
                    field.name.span,
                )
            })?;

        let arguments = field
            .arguments
            .iter()
            .map(|argument| {
                (
                    self.interner.get(argument.name.value),
                    decode_value(&argument.value, self.interner),
                )
            })
            .collect();

        let selection_set = if self.schema.is_composite(&def.ty.name) {
            field
                .selection_set
                .as_ref()
                .map(|set| self.compile_selection_set(&def.ty.name, set, false))
                .transpose()?
        } else {
            None
        };

        Ok(CompiledField {
            response_key: self.interner.get(field.response_key().value),
            field_name,
            ty: def.ty.clone(),
            arguments,
            is_conditional,
            description: def.description.clone(),
            is_deprecated: def.is_deprecated,
            deprecation_reason: def.deprecation_reason.clone(),
            selection_set,
        })
    }

    /// Printer for the source text embedded in generated code. The text
    /// selects `__typename` wherever the compiled selection sets do.
    fn printer(&self) -> Printer<'a> {
        let options = PrintOptions {
            add_typename: self.options.add_typename,
            ..PrintOptions::default()
        };
        Printer::new(self.interner, options)
    }

    fn typename_field(&self) -> CompiledField {
        let def = self.schema.typename_field();
        CompiledField {
            response_key: def.name.clone(),
            field_name: def.name.clone(),
            ty: def.ty.clone(),
            arguments: IndexMap::new(),
            is_conditional: false,
            description: None,
            is_deprecated: false,
            deprecation_reason: None,
            selection_set: None,
        }
    }

    /// Adds `field` under its response key, merging with a field already
    /// there.
    fn merge_field(
        &self,
        fields: &mut IndexMap<String, CompiledField>,
        field: CompiledField,
        span: Span,
    ) -> CompileResult<()> {
        let existing = match fields.entry(field.response_key.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(field);
                return Ok(());
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        if existing.field_name != field.field_name {
            return Err(self.error(
                CompileErrorKind::FieldConflict,
                format!(
                    "Fields \"{}\" conflict because \"{}\" and \"{}\" are different fields.",
                    field.response_key, existing.field_name, field.field_name
                ),
                span,
            ));
        }
        if existing.ty != field.ty {
            return Err(self.error(
                CompileErrorKind::FieldConflict,
                format!(
                    "Fields \"{}\" conflict because they return conflicting types \"{}\" and \"{}\".",
                    field.response_key, existing.ty, field.ty
                ),
                span,
            ));
        }

        tracing::trace!(key = %field.response_key, "merged field");
        existing.is_conditional &= field.is_conditional;
        if let Some(source) = field.selection_set {
            if let Some(target) = existing.selection_set.as_mut() {
                self.merge_selection_sets(target, source, span)?;
            } else {
                existing.selection_set = Some(source);
            }
        }
        Ok(())
    }

    fn merge_selection_sets(
        &self,
        target: &mut SelectionSet,
        source: SelectionSet,
        span: Span,
    ) -> CompileResult<()> {
        for field in source.fields.into_values() {
            self.merge_field(&mut target.fields, field, span)?;
        }
        for (condition, variant) in source.variants {
            match target.variants.entry(condition) {
                Entry::Vacant(entry) => {
                    entry.insert(variant);
                }
                Entry::Occupied(entry) => {
                    let existing = entry.into_mut();
                    for field in variant.fields.into_values() {
                        self.merge_field(&mut existing.fields, field, span)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Completes a selection set tree: each variant gets the unconditional
    /// fields first, then the fields of every broader variant, then its own.
    fn complete_variants(&self, set: &mut SelectionSet, span: Span) -> CompileResult<()> {
        let own_fields: Vec<(String, IndexMap<String, CompiledField>)> = set
            .variants
            .values_mut()
            .map(|variant| (variant.type_condition.clone(), std::mem::take(&mut variant.fields)))
            .collect();

        for (condition, variant) in &mut set.variants {
            let mut fields = set.fields.clone();
            for (broader, broader_fields) in &own_fields {
                if broader != condition && self.schema.is_subtype(condition, broader) {
                    for field in broader_fields.values() {
                        self.merge_field(&mut fields, field.clone(), span)?;
                    }
                }
            }
            if let Some((_, own)) = own_fields.iter().find(|(name, _)| name == condition) {
                for field in own.values() {
                    self.merge_field(&mut fields, field.clone(), span)?;
                }
            }
            for field in fields.values_mut() {
                if let Some(nested) = &mut field.selection_set {
                    self.complete_variants(nested, span)?;
                }
            }
            variant.fields = fields;
        }

        for field in set.fields.values_mut() {
            if let Some(nested) = &mut field.selection_set {
                self.complete_variants(nested, span)?;
            }
        }
        Ok(())
    }

    /// Names of every fragment spread from `set`, followed transitively,
    /// in first-spread order.
    fn fragments_referenced(&self, set: &ast::SelectionSet) -> Vec<String> {
        let mut seen = IndexSet::new();
        self.walk_spreads(set, &mut seen);
        seen.into_iter().map(|name| self.interner.get(name)).collect()
    }

    fn walk_spreads(&self, set: &ast::SelectionSet, seen: &mut IndexSet<Text>) {
        for selection in &set.selections {
            match selection {
                ast::Selection::Field(field) => {
                    if let Some(nested) = &field.selection_set {
                        self.walk_spreads(nested, seen);
                    }
                }
                ast::Selection::InlineFragment(inline) => self.walk_spreads(&inline.selection_set, seen),
                ast::Selection::FragmentSpread(spread) => {
                    if seen.insert(spread.name.value) {
                        if let Some(fragment) = self.fragments.get(&spread.name.value) {
                            self.walk_spreads(&fragment.selection_set, seen);
                        }
                    }
                }
            }
        }
    }

    fn is_conditional(&self, directives: &[Directive]) -> bool {
        directives.iter().any(|directive| {
            self.interner.is(directive.name.value, "skip") || self.interner.is(directive.name.value, "include")
        })
    }

    fn file_path(&self, span: Span) -> Option<std::path::PathBuf> {
        self.sources.path(span.file).map(Path::to_path_buf)
    }

    fn error(&self, kind: CompileErrorKind, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::new(kind, message, span, self.sources)
    }
}
