//! The type registry.

use crate::types::*;
use gqlc_syntax::OperationType;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A complete, read-only GraphQL schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) description: Option<String>,
    pub(crate) types: IndexMap<String, TypeDef>,
    pub(crate) directives: IndexMap<String, DirectiveDef>,
    pub(crate) query_type: Option<String>,
    pub(crate) mutation_type: Option<String>,
    pub(crate) subscription_type: Option<String>,
    /// Concrete object types of each abstract type, in type order.
    pub(crate) possible_types: FxHashMap<String, Vec<String>>,
    pub(crate) meta_fields: MetaFields,
}

/// Fields every schema answers without declaring them.
#[derive(Debug, Clone)]
pub(crate) struct MetaFields {
    typename: FieldDef,
    schema: FieldDef,
    type_: FieldDef,
}

impl Default for MetaFields {
    fn default() -> Self {
        let mut type_ = FieldDef::new("__type", TypeRef::named("__Type"));
        type_.arguments.insert(
            "name".to_string(),
            InputValueDef {
                name: "name".to_string(),
                description: None,
                ty: TypeRef::named("String").non_null(),
                default_value: None,
            },
        );
        Self {
            typename: FieldDef::new("__typename", TypeRef::named("String").non_null()),
            schema: FieldDef::new("__schema", TypeRef::named("__Schema").non_null()),
            type_,
        }
    }
}

impl Schema {
    pub(crate) fn from_parts(
        description: Option<String>,
        types: IndexMap<String, TypeDef>,
        directives: IndexMap<String, DirectiveDef>,
        roots: [Option<String>; 3],
    ) -> Self {
        let [query_type, mutation_type, subscription_type] = roots;
        let possible_types = compute_possible_types(&types);
        Self {
            description,
            types,
            directives,
            query_type,
            mutation_type,
            subscription_type,
            possible_types,
            meta_fields: MetaFields::default(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Looks up a named type.
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Iterates over every type in definition order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    pub fn directives(&self) -> impl Iterator<Item = &DirectiveDef> {
        self.directives.values()
    }

    pub fn query_type_name(&self) -> Option<&str> {
        self.query_type.as_deref()
    }

    pub fn mutation_type_name(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type_name(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    /// Name of the root type for an operation kind, if the schema declares it.
    pub fn root_type_name(&self, operation: OperationType) -> Option<&str> {
        match operation {
            OperationType::Query => self.query_type_name(),
            OperationType::Mutation => self.mutation_type_name(),
            OperationType::Subscription => self.subscription_type_name(),
        }
    }

    /// Resolves a field selected on `parent`, including the meta fields:
    /// `__typename` on any composite type, `__schema` and `__type` on the
    /// query root only.
    pub fn field(&self, parent: &str, field: &str) -> Option<&FieldDef> {
        let parent_def = self.get_type(parent)?;
        match field {
            "__typename" if parent_def.is_composite() => Some(&self.meta_fields.typename),
            "__schema" if self.query_type_name() == Some(parent) => Some(&self.meta_fields.schema),
            "__type" if self.query_type_name() == Some(parent) => Some(&self.meta_fields.type_),
            _ => parent_def.fields()?.get(field),
        }
    }

    /// The synthetic `__typename` field definition.
    pub fn typename_field(&self) -> &FieldDef {
        &self.meta_fields.typename
    }

    /// Concrete object types of a composite type. An object type is its
    /// own only possible type.
    pub fn possible_types(&self, name: &str) -> &[String] {
        match self.get_type(name) {
            Some(TypeDef::Object(object)) => std::slice::from_ref(&object.name),
            Some(_) => self
                .possible_types
                .get(name)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            None => &[],
        }
    }

    /// Returns true if `object` is a possible type of `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &str, object: &str) -> bool {
        self.possible_types(abstract_type)
            .iter()
            .any(|name| name == object)
    }

    /// Returns true if every value of `sub` is also a value of `sup`.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        if !self.get_type(sup).is_some_and(TypeDef::is_abstract) {
            return false;
        }
        let sub_types = self.possible_types(sub);
        !sub_types.is_empty() && sub_types.iter().all(|name| self.is_possible_type(sup, name))
    }

    /// Returns true if `condition` narrows `parent` to strictly fewer
    /// concrete types.
    pub fn is_proper_subtype(&self, condition: &str, parent: &str) -> bool {
        condition != parent
            && self.is_subtype(condition, parent)
            && !self.is_subtype(parent, condition)
    }

    /// Returns true if the two composite types share a concrete type.
    pub fn types_overlap(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        let b_types = self.possible_types(b);
        self.possible_types(a)
            .iter()
            .any(|name| b_types.contains(name))
    }

    /// Returns true if the named type is an object, interface or union.
    pub fn is_composite(&self, name: &str) -> bool {
        self.get_type(name).is_some_and(TypeDef::is_composite)
    }
}

fn compute_possible_types(types: &IndexMap<String, TypeDef>) -> FxHashMap<String, Vec<String>> {
    let mut possible: FxHashMap<String, Vec<String>> = FxHashMap::default();
    for def in types.values() {
        match def {
            TypeDef::Interface(interface) => {
                possible.entry(interface.name.clone()).or_default();
            }
            TypeDef::Union(union) => {
                let members = union
                    .members
                    .iter()
                    .filter(|member| matches!(types.get(*member), Some(TypeDef::Object(_))))
                    .cloned()
                    .collect();
                possible.insert(union.name.clone(), members);
            }
            _ => {}
        }
    }
    for def in types.values() {
        if let TypeDef::Object(object) = def {
            for interface in &object.interfaces {
                if let Some(list) = possible.get_mut(interface) {
                    list.push(object.name.clone());
                }
            }
        }
    }
    possible
}
