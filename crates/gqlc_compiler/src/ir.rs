//! The intermediate representation handed to emitters.
//!
//! Serializing a [`CompiledDocument`] with serde produces the JSON target
//! output: maps keyed by name are written as arrays of their values and
//! type references as GraphQL notation strings.

use crate::value::Value;
use gqlc_schema::{TypeDef, TypeRef};
use gqlc_syntax::OperationType;
use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::Serialize;
use std::path::PathBuf;

/// Every compiled operation and fragment plus the custom types they use.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDocument {
    #[serde(serialize_with = "serialize_values")]
    pub operations: IndexMap<String, CompiledOperation>,
    #[serde(serialize_with = "serialize_values")]
    pub fragments: IndexMap<String, CompiledFragment>,
    #[serde(serialize_with = "serialize_types_used")]
    pub types_used: Vec<TypeDef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledOperation {
    #[serde(rename = "operationName")]
    pub name: String,
    #[serde(serialize_with = "serialize_operation_type")]
    pub operation_type: OperationType,
    pub root_type: String,
    pub variables: Vec<CompiledVariable>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub selection_set: SelectionSet,
    /// Fragments spread by the operation, directly or transitively, in
    /// first-spread order.
    pub fragments_referenced: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledFragment {
    #[serde(rename = "fragmentName")]
    pub name: String,
    pub type_condition: String,
    /// Concrete object types satisfying the type condition.
    pub possible_types: Vec<String>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub selection_set: SelectionSet,
    pub fragments_referenced: Vec<String>,
}

/// Fields keyed by response key, plus the extra fields of narrower
/// type conditions.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionSet {
    #[serde(serialize_with = "serialize_values")]
    pub fields: IndexMap<String, CompiledField>,
    #[serde(
        serialize_with = "serialize_values",
        skip_serializing_if = "IndexMap::is_empty"
    )]
    pub variants: IndexMap<String, Variant>,
}

impl SelectionSet {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.variants.is_empty()
    }

    /// Looks up a field by response key.
    pub fn field(&self, response_key: &str) -> Option<&CompiledField> {
        self.fields.get(response_key)
    }

    /// Looks up the variant for a type condition.
    pub fn variant(&self, type_condition: &str) -> Option<&Variant> {
        self.variants.get(type_condition)
    }
}

/// Fields that apply when the runtime type satisfies `type_condition`.
///
/// Once compilation finishes a variant holds the complete shape for its
/// condition: the unconditional fields come first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub type_condition: String,
    /// Concrete object types satisfying the condition.
    pub possible_types: Vec<String>,
    #[serde(serialize_with = "serialize_values")]
    pub fields: IndexMap<String, CompiledField>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledField {
    pub response_key: String,
    pub field_name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(rename = "args", skip_serializing_if = "IndexMap::is_empty")]
    pub arguments: IndexMap<String, Value>,
    /// Set when the field is only selected for some runtime types or under
    /// `@skip`/`@include`.
    pub is_conditional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecation_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_set: Option<SelectionSet>,
}

impl CompiledField {
    /// Returns true for the injected or selected `__typename` field.
    pub fn is_typename(&self) -> bool {
        self.field_name == "__typename"
    }
}

fn serialize_values<K, V, S>(map: &IndexMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    V: Serialize,
    S: Serializer,
{
    serializer.collect_seq(map.values())
}

fn serialize_operation_type<S: Serializer>(
    operation: &OperationType,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(operation.as_str())
}

fn serialize_types_used<S: Serializer>(types: &[TypeDef], serializer: S) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(types.len()))?;
    for ty in types {
        seq.serialize_element(&TypeUsed(ty))?;
    }
    seq.end()
}

/// A custom type as written in the `typesUsed` list.
struct TypeUsed<'a>(&'a TypeDef);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InputFieldJson<'a> {
    name: &'a str,
    #[serde(rename = "type")]
    ty: &'a TypeRef,
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<&'a str>,
}

impl Serialize for TypeUsed<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self.0 {
            TypeDef::Enum(def) => {
                map.serialize_entry("kind", "EnumType")?;
                map.serialize_entry("name", &def.name)?;
                map.serialize_entry("description", &def.description)?;
                map.serialize_entry("values", &def.values.values().collect::<Vec<_>>())?;
            }
            TypeDef::InputObject(def) => {
                map.serialize_entry("kind", "InputObjectType")?;
                map.serialize_entry("name", &def.name)?;
                map.serialize_entry("description", &def.description)?;
                let fields: Vec<_> = def
                    .fields
                    .values()
                    .map(|field| InputFieldJson {
                        name: &field.name,
                        ty: &field.ty,
                        description: field.description.as_deref(),
                        default_value: field.default_value.as_deref(),
                    })
                    .collect();
                map.serialize_entry("fields", &fields)?;
            }
            other => {
                map.serialize_entry("kind", "ScalarType")?;
                map.serialize_entry("name", other.name())?;
                map.serialize_entry("description", &other.description())?;
            }
        }
        map.end()
    }
}
