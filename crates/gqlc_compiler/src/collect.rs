//! Collection of the custom types a compiled document uses.

use crate::ir::{CompiledDocument, CompiledField, CompiledFragment, CompiledOperation, SelectionSet};
use gqlc_schema::{Schema, TypeDef, TypeRef};
use indexmap::IndexSet;

/// Accumulates the custom scalars, enums and input objects reachable from
/// compiled operations and fragments.
///
/// Each type is recorded once, at the position of its first occurrence.
/// Input objects pull in the types of their fields.
pub struct TypeCollector<'a> {
    schema: &'a Schema,
    names: IndexSet<String>,
}

impl<'a> TypeCollector<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            names: IndexSet::new(),
        }
    }

    /// Walks operations, then fragments, in document order.
    pub fn add_document(&mut self, document: &CompiledDocument) {
        for operation in document.operations.values() {
            self.add_operation(operation);
        }
        for fragment in document.fragments.values() {
            self.add_fragment(fragment);
        }
    }

    pub fn add_operation(&mut self, operation: &CompiledOperation) {
        for variable in &operation.variables {
            self.add_type_ref(&variable.ty);
        }
        self.add_selection_set(&operation.selection_set);
    }

    pub fn add_fragment(&mut self, fragment: &CompiledFragment) {
        self.add_selection_set(&fragment.selection_set);
    }

    pub fn add_type_ref(&mut self, ty: &TypeRef) {
        self.add_named(&ty.name);
    }

    fn add_selection_set(&mut self, set: &SelectionSet) {
        for field in set.fields.values() {
            self.add_field(field);
        }
        for variant in set.variants.values() {
            for field in variant.fields.values() {
                self.add_field(field);
            }
        }
    }

    fn add_field(&mut self, field: &CompiledField) {
        self.add_type_ref(&field.ty);
        if let Some(set) = &field.selection_set {
            self.add_selection_set(set);
        }
    }

    fn add_named(&mut self, name: &str) {
        if self.names.contains(name) {
            return;
        }
        let Some(def) = self.schema.get_type(name) else {
            return;
        };
        if def.is_builtin() {
            return;
        }
        match def {
            TypeDef::Scalar(_) | TypeDef::Enum(_) => {
                self.names.insert(name.to_string());
            }
            TypeDef::InputObject(input) => {
                self.names.insert(name.to_string());
                for field in input.fields.values() {
                    self.add_named(&field.ty.name);
                }
            }
            TypeDef::Object(_) | TypeDef::Interface(_) | TypeDef::Union(_) => {}
        }
    }

    /// Returns the collected definitions in first-encounter order.
    pub fn finish(self) -> Vec<TypeDef> {
        self.names
            .iter()
            .filter_map(|name| self.schema.get_type(name).cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlc_core::{FileId, Interner};

    fn schema() -> Schema {
        let interner = Interner::new();
        Schema::from_sdl(
            r#"
            type Query { a: Int }
            scalar Date
            enum Color { RED GREEN }
            input Filter { color: Color since: Date nested: Filter limit: Int }
            "#,
            FileId::default(),
            &interner,
        )
        .expect("schema")
    }

    fn names(types: &[TypeDef]) -> Vec<&str> {
        types.iter().map(TypeDef::name).collect()
    }

    #[test]
    fn test_skips_builtins_and_duplicates() {
        let schema = schema();
        let mut collector = TypeCollector::new(&schema);
        collector.add_type_ref(&TypeRef::named("Int").non_null());
        collector.add_type_ref(&TypeRef::named("Color"));
        collector.add_type_ref(&TypeRef::named("Color").list());
        collector.add_type_ref(&TypeRef::named("Query"));
        assert_eq!(names(&collector.finish()), ["Color"]);
    }

    #[test]
    fn test_input_objects_are_followed() {
        let schema = schema();
        let mut collector = TypeCollector::new(&schema);
        collector.add_type_ref(&TypeRef::named("Filter").non_null());
        assert_eq!(names(&collector.finish()), ["Filter", "Color", "Date"]);
    }
}
