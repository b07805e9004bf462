//! Introspection JSON in both directions.
//!
//! Reading accepts a full response (`{"data": {"__schema": ...}}`) or the
//! bare `{"__schema": ...}` object. Writing always produces the full
//! response form.

use crate::builder::SchemaBuilder;
use crate::error::SchemaError;
use crate::schema::Schema;
use crate::types::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The standard introspection query.
pub const INTROSPECTION_QUERY: &str = r#"query IntrospectionQuery {
  __schema {
    queryType { name }
    mutationType { name }
    subscriptionType { name }
    types {
      ...FullType
    }
    directives {
      name
      description
      locations
      args {
        ...InputValue
      }
    }
  }
}

fragment FullType on __Type {
  kind
  name
  description
  fields(includeDeprecated: true) {
    name
    description
    args {
      ...InputValue
    }
    type {
      ...TypeRef
    }
    isDeprecated
    deprecationReason
  }
  inputFields {
    ...InputValue
  }
  interfaces {
    ...TypeRef
  }
  enumValues(includeDeprecated: true) {
    name
    description
    isDeprecated
    deprecationReason
  }
  possibleTypes {
    ...TypeRef
  }
}

fragment InputValue on __InputValue {
  name
  description
  type { ...TypeRef }
  defaultValue
}

fragment TypeRef on __Type {
  kind
  name
  ofType {
    kind
    name
    ofType {
      kind
      name
      ofType {
        kind
        name
        ofType {
          kind
          name
          ofType {
            kind
            name
            ofType {
              kind
              name
              ofType {
                kind
                name
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// `{"data": {"__schema": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionResponse {
    pub data: IntrospectionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrospectionData {
    #[serde(rename = "__schema")]
    pub schema: IntrospectionSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub query_type: Option<NamedRef>,
    #[serde(default)]
    pub mutation_type: Option<NamedRef>,
    #[serde(default)]
    pub subscription_type: Option<NamedRef>,
    pub types: Vec<FullType>,
    #[serde(default)]
    pub directives: Vec<IntrospectionDirective>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullType {
    pub kind: TypeKind,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<IntrospectionField>>,
    #[serde(default)]
    pub input_fields: Option<Vec<IntrospectionInputValue>>,
    #[serde(default)]
    pub interfaces: Option<Vec<IntrospectionTypeRef>>,
    #[serde(default)]
    pub enum_values: Option<Vec<IntrospectionEnumValue>>,
    #[serde(default)]
    pub possible_types: Option<Vec<IntrospectionTypeRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "specifiedByURL")]
    pub specified_by_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionField {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionInputValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: IntrospectionTypeRef,
    #[serde(default)]
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionEnumValue {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_deprecated: bool,
    #[serde(default)]
    pub deprecation_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionTypeRef {
    pub kind: TypeKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub of_type: Option<Box<IntrospectionTypeRef>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntrospectionDirective {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub locations: Vec<String>,
    #[serde(default)]
    pub args: Vec<IntrospectionInputValue>,
    #[serde(default)]
    pub is_repeatable: bool,
}

impl IntrospectionTypeRef {
    fn to_type_ref(&self) -> Result<TypeRef, SchemaError> {
        match self.kind {
            TypeKind::NonNull | TypeKind::List => {
                let inner = self
                    .of_type
                    .as_deref()
                    .ok_or(SchemaError::MalformedTypeRef("ofType"))?;
                let inner = inner.to_type_ref()?;
                Ok(if self.kind == TypeKind::List {
                    inner.list()
                } else {
                    inner.non_null()
                })
            }
            _ => self
                .name
                .clone()
                .map(TypeRef::named)
                .ok_or(SchemaError::MalformedTypeRef("name")),
        }
    }

    fn from_type_ref(ty: &TypeRef, schema: &Schema) -> Self {
        let mut current = Self {
            kind: schema
                .get_type(&ty.name)
                .map_or(TypeKind::Scalar, TypeDef::kind),
            name: Some(ty.name.clone()),
            of_type: None,
        };
        for wrapper in &ty.wrappers {
            current = Self {
                kind: match wrapper {
                    WrappingType::List => TypeKind::List,
                    WrappingType::NonNull => TypeKind::NonNull,
                },
                name: None,
                of_type: Some(Box::new(current)),
            };
        }
        current
    }
}

fn input_values(values: &[IntrospectionInputValue]) -> Result<IndexMap<String, InputValueDef>, SchemaError> {
    values
        .iter()
        .map(|value| {
            let def = InputValueDef {
                name: value.name.clone(),
                description: value.description.clone(),
                ty: value.ty.to_type_ref()?,
                default_value: value.default_value.clone(),
            };
            Ok((value.name.clone(), def))
        })
        .collect()
}

fn named_refs(refs: &Option<Vec<IntrospectionTypeRef>>) -> Vec<String> {
    refs.iter()
        .flatten()
        .filter_map(|r| r.name.clone())
        .collect()
}

impl FullType {
    fn to_type_def(&self) -> Result<TypeDef, SchemaError> {
        let name = self.name.clone();
        let description = self.description.clone();
        let fields = || -> Result<IndexMap<String, FieldDef>, SchemaError> {
            self.fields
                .iter()
                .flatten()
                .map(|field| {
                    let def = FieldDef {
                        name: field.name.clone(),
                        description: field.description.clone(),
                        arguments: input_values(&field.args)?,
                        ty: field.ty.to_type_ref()?,
                        is_deprecated: field.is_deprecated,
                        deprecation_reason: field.deprecation_reason.clone(),
                    };
                    Ok((field.name.clone(), def))
                })
                .collect()
        };

        Ok(match self.kind {
            TypeKind::Scalar => TypeDef::Scalar(ScalarType {
                name,
                description,
                specified_by_url: self.specified_by_url.clone(),
            }),
            TypeKind::Object => TypeDef::Object(ObjectType {
                name,
                description,
                fields: fields()?,
                interfaces: named_refs(&self.interfaces),
            }),
            TypeKind::Interface => TypeDef::Interface(InterfaceType {
                name,
                description,
                fields: fields()?,
                interfaces: named_refs(&self.interfaces),
            }),
            TypeKind::Union => TypeDef::Union(UnionType {
                name,
                description,
                members: named_refs(&self.possible_types),
            }),
            TypeKind::Enum => TypeDef::Enum(EnumType {
                name,
                description,
                values: self
                    .enum_values
                    .iter()
                    .flatten()
                    .map(|value| {
                        let def = EnumValueDef {
                            name: value.name.clone(),
                            description: value.description.clone(),
                            is_deprecated: value.is_deprecated,
                            deprecation_reason: value.deprecation_reason.clone(),
                        };
                        (value.name.clone(), def)
                    })
                    .collect(),
            }),
            TypeKind::InputObject => TypeDef::InputObject(InputObjectType {
                name,
                description,
                fields: input_values(self.input_fields.as_deref().unwrap_or_default())?,
            }),
            TypeKind::List | TypeKind::NonNull => {
                return Err(SchemaError::MalformedTypeRef("a named type kind"));
            }
        })
    }
}

impl Schema {
    /// Reads a schema from introspection JSON text.
    pub fn from_introspection_json(text: &str) -> Result<Self, SchemaError> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;
        let mut root = if value.get("data").is_some() {
            value["data"].take()
        } else {
            value
        };
        let schema = root
            .get_mut("__schema")
            .map(serde_json::Value::take)
            .ok_or(SchemaError::MissingSchema)?;
        let schema: IntrospectionSchema = serde_json::from_value(schema)?;
        Self::from_introspection(&schema)
    }

    /// Builds a schema from a decoded introspection result.
    pub fn from_introspection(introspection: &IntrospectionSchema) -> Result<Self, SchemaError> {
        let builtins = SchemaBuilder::new().finish()?;
        let mut types = builtins.types;
        for full_type in &introspection.types {
            types.insert(full_type.name.clone(), full_type.to_type_def()?);
        }

        let mut directives = builtins.directives;
        for directive in &introspection.directives {
            let def = DirectiveDef {
                name: directive.name.clone(),
                description: directive.description.clone(),
                arguments: input_values(&directive.args)?,
                locations: directive.locations.clone(),
                repeatable: directive.is_repeatable,
            };
            directives.insert(directive.name.clone(), def);
        }

        for def in types.values() {
            let referenced: Vec<&str> = match def {
                TypeDef::Object(ObjectType { fields, .. })
                | TypeDef::Interface(InterfaceType { fields, .. }) => fields
                    .values()
                    .flat_map(|field| {
                        std::iter::once(field.ty.name.as_str())
                            .chain(field.arguments.values().map(|arg| arg.ty.name.as_str()))
                    })
                    .collect(),
                TypeDef::InputObject(input) => {
                    input.fields.values().map(|f| f.ty.name.as_str()).collect()
                }
                TypeDef::Union(union) => union.members.iter().map(String::as_str).collect(),
                TypeDef::Scalar(_) | TypeDef::Enum(_) => Vec::new(),
            };
            if let Some(missing) = referenced.into_iter().find(|name| !types.contains_key(*name)) {
                return Err(SchemaError::UnknownType(missing.to_string()));
            }
        }

        let root = |r: &Option<NamedRef>| r.as_ref().map(|r| r.name.clone());
        Ok(Self::from_parts(
            introspection.description.clone(),
            types,
            directives,
            [
                root(&introspection.query_type),
                root(&introspection.mutation_type),
                root(&introspection.subscription_type),
            ],
        ))
    }

    /// Describes this schema as an introspection result.
    pub fn to_introspection(&self) -> IntrospectionResponse {
        let type_ref = |ty: &TypeRef| IntrospectionTypeRef::from_type_ref(ty, self);
        let input_values = |values: &IndexMap<String, InputValueDef>| {
            values
                .values()
                .map(|value| IntrospectionInputValue {
                    name: value.name.clone(),
                    description: value.description.clone(),
                    ty: type_ref(&value.ty),
                    default_value: value.default_value.clone(),
                })
                .collect::<Vec<_>>()
        };
        let named = |names: &[String]| {
            names
                .iter()
                .map(|name| IntrospectionTypeRef::from_type_ref(&TypeRef::named(name.clone()), self))
                .collect::<Vec<_>>()
        };
        let fields = |fields: &IndexMap<String, FieldDef>| {
            fields
                .values()
                .map(|field| IntrospectionField {
                    name: field.name.clone(),
                    description: field.description.clone(),
                    args: input_values(&field.arguments),
                    ty: type_ref(&field.ty),
                    is_deprecated: field.is_deprecated,
                    deprecation_reason: field.deprecation_reason.clone(),
                })
                .collect::<Vec<_>>()
        };

        let types = self
            .types()
            .map(|def| {
                let mut full = FullType {
                    kind: def.kind(),
                    name: def.name().to_string(),
                    description: def.description().map(str::to_string),
                    fields: None,
                    input_fields: None,
                    interfaces: None,
                    enum_values: None,
                    possible_types: None,
                    specified_by_url: None,
                };
                match def {
                    TypeDef::Scalar(scalar) => {
                        full.specified_by_url = scalar.specified_by_url.clone();
                    }
                    TypeDef::Object(object) => {
                        full.fields = Some(fields(&object.fields));
                        full.interfaces = Some(named(&object.interfaces));
                    }
                    TypeDef::Interface(interface) => {
                        full.fields = Some(fields(&interface.fields));
                        full.interfaces = Some(named(&interface.interfaces));
                        full.possible_types = Some(named(self.possible_types(&interface.name)));
                    }
                    TypeDef::Union(union) => {
                        full.possible_types = Some(named(&union.members));
                    }
                    TypeDef::Enum(enum_type) => {
                        full.enum_values = Some(
                            enum_type
                                .values
                                .values()
                                .map(|value| IntrospectionEnumValue {
                                    name: value.name.clone(),
                                    description: value.description.clone(),
                                    is_deprecated: value.is_deprecated,
                                    deprecation_reason: value.deprecation_reason.clone(),
                                })
                                .collect(),
                        );
                    }
                    TypeDef::InputObject(input) => {
                        full.input_fields = Some(input_values(&input.fields));
                    }
                }
                full
            })
            .collect();

        let directives = self
            .directives()
            .map(|directive| IntrospectionDirective {
                name: directive.name.clone(),
                description: directive.description.clone(),
                locations: directive.locations.clone(),
                args: input_values(&directive.arguments),
                is_repeatable: directive.repeatable,
            })
            .collect();

        let root = |name: Option<&str>| name.map(|name| NamedRef { name: name.to_string() });
        IntrospectionResponse {
            data: IntrospectionData {
                schema: IntrospectionSchema {
                    description: self.description.clone(),
                    query_type: root(self.query_type_name()),
                    mutation_type: root(self.mutation_type_name()),
                    subscription_type: root(self.subscription_type_name()),
                    types,
                    directives,
                },
            },
        }
    }

    /// Serializes this schema as pretty-printed introspection JSON.
    pub fn to_introspection_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(&self.to_introspection())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlc_core::{FileId, Interner};
    use indoc::indoc;

    const STAR_WARS: &str = indoc! {r#"
        schema { query: Query }
        type Query { hero(episode: Episode): Character }
        enum Episode { NEWHOPE EMPIRE JEDI }
        interface Character { id: ID! name: String friends: [Character] }
        type Droid implements Character { id: ID! name: String friends: [Character] primaryFunction: String }
        type Human implements Character { id: ID! name: String friends: [Character] homePlanet: String @deprecated }
    "#};

    fn sdl_schema() -> Schema {
        let interner = Interner::new();
        Schema::from_sdl(STAR_WARS, FileId::default(), &interner).expect("schema")
    }

    #[test]
    fn test_reads_wrapped_and_bare_forms() {
        let json = sdl_schema().to_introspection_json().expect("json");
        let wrapped = Schema::from_introspection_json(&json).expect("wrapped");
        assert_eq!(wrapped.possible_types("Character"), ["Droid", "Human"]);

        let value: serde_json::Value = serde_json::from_str(&json).expect("value");
        let bare = serde_json::to_string(&value["data"]).expect("bare");
        let bare = Schema::from_introspection_json(&bare).expect("bare schema");
        assert_eq!(bare.query_type_name(), Some("Query"));
    }

    #[test]
    fn test_type_refs_survive_round_trip() {
        let json = sdl_schema().to_introspection_json().expect("json");
        let schema = Schema::from_introspection_json(&json).expect("schema");
        let friends = schema.field("Droid", "friends").expect("friends");
        assert_eq!(friends.ty.to_string(), "[Character]");
        let id = schema.field("Droid", "id").expect("id");
        assert_eq!(id.ty.to_string(), "ID!");
        assert!(schema.field("Human", "homePlanet").expect("homePlanet").is_deprecated);
    }

    #[test]
    fn test_written_type_ref_shape() {
        let introspection = sdl_schema().to_introspection();
        let droid = introspection
            .data
            .schema
            .types
            .iter()
            .find(|t| t.name == "Droid")
            .expect("Droid");
        let id = &droid.fields.as_ref().expect("fields")[0];
        assert_eq!(id.ty.kind, TypeKind::NonNull);
        let inner = id.ty.of_type.as_deref().expect("ofType");
        assert_eq!(inner.kind, TypeKind::Scalar);
        assert_eq!(inner.name.as_deref(), Some("ID"));
    }

    #[test]
    fn test_missing_schema() {
        let err = Schema::from_introspection_json(r#"{"data": {}}"#).unwrap_err();
        assert!(matches!(err, SchemaError::MissingSchema));
    }

    #[test]
    fn test_unknown_type() {
        let json = r#"{"__schema": {
            "queryType": {"name": "Query"},
            "types": [{"kind": "OBJECT", "name": "Query", "fields": [
                {"name": "a", "args": [], "type": {"kind": "OBJECT", "name": "Missing"}}
            ], "interfaces": []}]
        }}"#;
        let err = Schema::from_introspection_json(json).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(name) if name == "Missing"));
    }
}
