//! Building a [`Schema`] from SDL.

use crate::error::SchemaError;
use crate::schema::Schema;
use crate::types::*;
use gqlc_core::{diagnostics::codes, DiagnosticBag, FileId, Interner, Span};
use gqlc_syntax::ast::{self, Definition};
use gqlc_syntax::printer::print_value;
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Built-in scalars, directives and introspection types.
pub(crate) const BUILTINS_SDL: &str = r#"
"The `Int` scalar type represents non-fractional signed whole numeric values."
scalar Int
"The `Float` scalar type represents signed double-precision fractional values."
scalar Float
"The `String` scalar type represents textual data, represented as UTF-8 character sequences."
scalar String
"The `Boolean` scalar type represents `true` or `false`."
scalar Boolean
"The `ID` scalar type represents a unique identifier."
scalar ID

"Directs the executor to include this field or fragment only when the `if` argument is true."
directive @include(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
"Directs the executor to skip this field or fragment when the `if` argument is true."
directive @skip(if: Boolean!) on FIELD | FRAGMENT_SPREAD | INLINE_FRAGMENT
"Marks an element of a GraphQL schema as no longer supported."
directive @deprecated(reason: String = "No longer supported") on FIELD_DEFINITION | ARGUMENT_DEFINITION | INPUT_FIELD_DEFINITION | ENUM_VALUE
"Exposes a URL that specifies the behavior of this scalar."
directive @specifiedBy(url: String!) on SCALAR

type __Schema {
  description: String
  types: [__Type!]!
  queryType: __Type!
  mutationType: __Type
  subscriptionType: __Type
  directives: [__Directive!]!
}

type __Type {
  kind: __TypeKind!
  name: String
  description: String
  specifiedByURL: String
  fields(includeDeprecated: Boolean = false): [__Field!]
  interfaces: [__Type!]
  possibleTypes: [__Type!]
  enumValues(includeDeprecated: Boolean = false): [__EnumValue!]
  inputFields(includeDeprecated: Boolean = false): [__InputValue!]
  ofType: __Type
}

enum __TypeKind { SCALAR OBJECT INTERFACE UNION ENUM INPUT_OBJECT LIST NON_NULL }

type __Field {
  name: String!
  description: String
  args(includeDeprecated: Boolean = false): [__InputValue!]!
  type: __Type!
  isDeprecated: Boolean!
  deprecationReason: String
}

type __InputValue {
  name: String!
  description: String
  type: __Type!
  defaultValue: String
  isDeprecated: Boolean!
  deprecationReason: String
}

type __EnumValue {
  name: String!
  description: String
  isDeprecated: Boolean!
  deprecationReason: String
}

type __Directive {
  name: String!
  description: String
  locations: [__DirectiveLocation!]!
  args(includeDeprecated: Boolean = false): [__InputValue!]!
  isRepeatable: Boolean!
}

enum __DirectiveLocation {
  QUERY MUTATION SUBSCRIPTION FIELD FRAGMENT_DEFINITION FRAGMENT_SPREAD
  INLINE_FRAGMENT VARIABLE_DEFINITION SCHEMA SCALAR OBJECT FIELD_DEFINITION
  ARGUMENT_DEFINITION INTERFACE UNION ENUM ENUM_VALUE INPUT_OBJECT
  INPUT_FIELD_DEFINITION
}
"#;

const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

/// What a referenced type name must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Output,
    Input,
    Object,
    Interface,
}

/// Accumulates type system definitions and checks them on `finish`.
pub struct SchemaBuilder {
    description: Option<String>,
    types: IndexMap<String, TypeDef>,
    directives: IndexMap<String, DirectiveDef>,
    roots: [Option<String>; 3],
    has_schema_definition: bool,
    /// Names defined by user documents, as opposed to built-ins.
    defined: FxHashSet<String>,
    references: Vec<(String, Expect, Span)>,
    diagnostics: DiagnosticBag,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaBuilder {
    /// Creates a builder holding only the built-in definitions.
    pub fn new() -> Self {
        let mut builder = Self::empty();
        let interner = Interner::new();
        let builtins = gqlc_syntax::parse(BUILTINS_SDL, FileId::default(), &interner);
        builder.add_document(&builtins.document, &interner);
        builder.defined.clear();
        builder.references.clear();
        builder
    }

    fn empty() -> Self {
        Self {
            description: None,
            types: IndexMap::new(),
            directives: IndexMap::new(),
            roots: [None, None, None],
            has_schema_definition: false,
            defined: FxHashSet::default(),
            references: Vec::new(),
            diagnostics: DiagnosticBag::new(),
        }
    }

    /// Adds every type system definition of a document. Executable
    /// definitions are ignored.
    pub fn add_document(&mut self, document: &ast::Document, interner: &Interner) {
        for def in &document.definitions {
            match def {
                Definition::Schema(schema) => self.add_schema_definition(schema, interner),
                Definition::SchemaExtension(schema) => {
                    self.add_root_operations(schema, interner);
                }
                Definition::Type(ty) => self.add_type(ty, interner),
                Definition::TypeExtension(ty) => self.extend_type(ty, interner),
                Definition::Directive(directive) => self.add_directive(directive, interner),
                Definition::Operation(_) | Definition::Fragment(_) => {}
            }
        }
    }

    fn add_schema_definition(&mut self, schema: &ast::SchemaDefinition, interner: &Interner) {
        if self.has_schema_definition {
            self.diagnostics.error(
                codes::INVALID_SCHEMA,
                "duplicate schema definition",
                schema.span,
                "a schema may only be defined once",
            );
        }
        self.has_schema_definition = true;
        self.description = schema.description.as_ref().map(|d| d.value.clone());
        self.add_root_operations(schema, interner);
    }

    fn add_root_operations(&mut self, schema: &ast::SchemaDefinition, interner: &Interner) {
        for operation in &schema.operations {
            let name = interner.get(operation.type_name.value);
            self.references
                .push((name.clone(), Expect::Object, operation.type_name.span));
            let slot = match operation.operation {
                ast::OperationType::Query => 0,
                ast::OperationType::Mutation => 1,
                ast::OperationType::Subscription => 2,
            };
            self.roots[slot] = Some(name);
        }
    }

    fn add_type(&mut self, ty: &ast::TypeDefinition, interner: &Interner) {
        let name = interner.get(ty.name().value);
        if !self.defined.insert(name.clone()) {
            self.diagnostics.error(
                codes::DUPLICATE_TYPE,
                "duplicate type definition",
                ty.name().span,
                format!("type `{name}` is defined more than once"),
            );
            return;
        }
        let def = self.convert_type(ty, interner);
        // Built-in scalars may be redeclared; the new definition replaces them.
        self.types.insert(name, def);
    }

    fn extend_type(&mut self, ty: &ast::TypeDefinition, interner: &Interner) {
        let name = interner.get(ty.name().value);
        let extension = self.convert_type(ty, interner);
        let Some(existing) = self.types.get_mut(&name) else {
            self.diagnostics.error(
                codes::UNDEFINED_TYPE,
                "extension of undefined type",
                ty.name().span,
                format!("type `{name}` is not defined"),
            );
            return;
        };

        match (existing, extension) {
            (TypeDef::Object(existing), TypeDef::Object(ext)) => {
                existing.fields.extend(ext.fields);
                existing.interfaces.extend(ext.interfaces);
            }
            (TypeDef::Interface(existing), TypeDef::Interface(ext)) => {
                existing.fields.extend(ext.fields);
                existing.interfaces.extend(ext.interfaces);
            }
            (TypeDef::Union(existing), TypeDef::Union(ext)) => {
                existing.members.extend(ext.members);
            }
            (TypeDef::Enum(existing), TypeDef::Enum(ext)) => {
                existing.values.extend(ext.values);
            }
            (TypeDef::InputObject(existing), TypeDef::InputObject(ext)) => {
                existing.fields.extend(ext.fields);
            }
            (TypeDef::Scalar(_), TypeDef::Scalar(_)) => {}
            (existing, _) => {
                let kind = existing.kind().as_str();
                self.diagnostics.error(
                    codes::INVALID_SCHEMA,
                    "extension kind mismatch",
                    ty.span(),
                    format!("type `{name}` is a {kind} type"),
                );
            }
        }
    }

    fn add_directive(&mut self, directive: &ast::DirectiveDefinition, interner: &Interner) {
        let name = interner.get(directive.name.value);
        let def = DirectiveDef {
            name: name.clone(),
            description: description(&directive.description),
            arguments: self.convert_input_values(&directive.arguments, interner),
            locations: directive
                .locations
                .iter()
                .map(|location| location.as_str().to_string())
                .collect(),
            repeatable: directive.repeatable,
        };
        self.directives.insert(name, def);
    }

    fn convert_type(&mut self, ty: &ast::TypeDefinition, interner: &Interner) -> TypeDef {
        match ty {
            ast::TypeDefinition::Object(object) => TypeDef::Object(ObjectType {
                name: interner.get(object.name.value),
                description: description(&object.description),
                fields: self.convert_fields(&object.fields, interner),
                interfaces: self.convert_names(&object.implements, Expect::Interface, interner),
            }),
            ast::TypeDefinition::Interface(interface) => TypeDef::Interface(InterfaceType {
                name: interner.get(interface.name.value),
                description: description(&interface.description),
                fields: self.convert_fields(&interface.fields, interner),
                interfaces: self.convert_names(&interface.implements, Expect::Interface, interner),
            }),
            ast::TypeDefinition::Union(union) => TypeDef::Union(UnionType {
                name: interner.get(union.name.value),
                description: description(&union.description),
                members: self.convert_names(&union.members, Expect::Object, interner),
            }),
            ast::TypeDefinition::Enum(enum_def) => TypeDef::Enum(EnumType {
                name: interner.get(enum_def.name.value),
                description: description(&enum_def.description),
                values: enum_def
                    .values
                    .iter()
                    .map(|value| {
                        let name = interner.get(value.name.value);
                        let (is_deprecated, deprecation_reason) =
                            deprecation(&value.directives, interner);
                        let def = EnumValueDef {
                            name: name.clone(),
                            description: description(&value.description),
                            is_deprecated,
                            deprecation_reason,
                        };
                        (name, def)
                    })
                    .collect(),
            }),
            ast::TypeDefinition::Input(input) => TypeDef::InputObject(InputObjectType {
                name: interner.get(input.name.value),
                description: description(&input.description),
                fields: self.convert_input_values(&input.fields, interner),
            }),
            ast::TypeDefinition::Scalar(scalar) => TypeDef::Scalar(ScalarType {
                name: interner.get(scalar.name.value),
                description: description(&scalar.description),
                specified_by_url: string_argument(&scalar.directives, "specifiedBy", "url", interner),
            }),
        }
    }

    fn convert_names(&mut self, names: &[ast::Name], expect: Expect, interner: &Interner) -> Vec<String> {
        names
            .iter()
            .map(|name| {
                let value = interner.get(name.value);
                self.references.push((value.clone(), expect, name.span));
                value
            })
            .collect()
    }

    fn convert_type_ref(&mut self, ty: &ast::Type, expect: Expect, interner: &Interner) -> TypeRef {
        let type_ref = TypeRef::from_ast(ty, interner);
        self.references
            .push((type_ref.name.clone(), expect, ty.named().span));
        type_ref
    }

    fn convert_fields(
        &mut self,
        fields: &[ast::FieldDefinition],
        interner: &Interner,
    ) -> IndexMap<String, FieldDef> {
        let mut converted = IndexMap::with_capacity(fields.len());
        for field in fields {
            let name = interner.get(field.name.value);
            if converted.contains_key(&name) {
                self.diagnostics.error(
                    codes::DUPLICATE_FIELD,
                    "duplicate field",
                    field.name.span,
                    format!("field `{name}` is defined more than once"),
                );
                continue;
            }
            let (is_deprecated, deprecation_reason) = deprecation(&field.directives, interner);
            let def = FieldDef {
                name: name.clone(),
                description: description(&field.description),
                arguments: self.convert_input_values(&field.arguments, interner),
                ty: self.convert_type_ref(&field.ty, Expect::Output, interner),
                is_deprecated,
                deprecation_reason,
            };
            converted.insert(name, def);
        }
        converted
    }

    fn convert_input_values(
        &mut self,
        values: &[ast::InputValueDefinition],
        interner: &Interner,
    ) -> IndexMap<String, InputValueDef> {
        let mut converted = IndexMap::with_capacity(values.len());
        for value in values {
            let name = interner.get(value.name.value);
            if converted.contains_key(&name) {
                self.diagnostics.error(
                    codes::DUPLICATE_FIELD,
                    "duplicate input value",
                    value.name.span,
                    format!("`{name}` is defined more than once"),
                );
                continue;
            }
            let def = InputValueDef {
                name: name.clone(),
                description: description(&value.description),
                ty: self.convert_type_ref(&value.ty, Expect::Input, interner),
                default_value: value
                    .default_value
                    .as_ref()
                    .map(|default| print_value(default, interner)),
            };
            converted.insert(name, def);
        }
        converted
    }

    /// Resolves references and root types, returning the schema or every
    /// problem found.
    pub fn finish(mut self) -> Result<Schema, SchemaError> {
        let references = std::mem::take(&mut self.references);
        for (name, expect, span) in references {
            let Some(def) = self.types.get(&name) else {
                self.diagnostics.error(
                    codes::UNDEFINED_TYPE,
                    "undefined type",
                    span,
                    format!("type `{name}` is not defined"),
                );
                continue;
            };
            let (ok, wanted) = match expect {
                Expect::Output => (def.is_output(), "an output type"),
                Expect::Input => (def.is_input(), "an input type"),
                Expect::Object => (matches!(def, TypeDef::Object(_)), "an object type"),
                Expect::Interface => (matches!(def, TypeDef::Interface(_)), "an interface type"),
            };
            if !ok {
                self.diagnostics.error(
                    codes::INVALID_SCHEMA,
                    "wrong kind of type",
                    span,
                    format!("`{name}` is not {wanted}"),
                );
            }
        }

        if !self.has_schema_definition {
            for (slot, default) in ["Query", "Mutation", "Subscription"].into_iter().enumerate() {
                if self.roots[slot].is_none()
                    && matches!(self.types.get(default), Some(TypeDef::Object(_)))
                {
                    self.roots[slot] = Some(default.to_string());
                }
            }
        }

        if self.diagnostics.has_errors() {
            return Err(SchemaError::Invalid(self.diagnostics));
        }

        Ok(Schema::from_parts(
            self.description,
            self.types,
            self.directives,
            self.roots,
        ))
    }
}

fn description(description: &Option<ast::Description>) -> Option<String> {
    description.as_ref().map(|d| d.value.clone())
}

/// Reads `@deprecated(reason:)` from a directive list.
fn deprecation(directives: &[ast::Directive], interner: &Interner) -> (bool, Option<String>) {
    let Some(directive) = directives
        .iter()
        .find(|directive| interner.is(directive.name.value, "deprecated"))
    else {
        return (false, None);
    };
    let reason = string_argument(std::slice::from_ref(directive), "deprecated", "reason", interner)
        .unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string());
    (true, Some(reason))
}

fn string_argument(
    directives: &[ast::Directive],
    directive: &str,
    argument: &str,
    interner: &Interner,
) -> Option<String> {
    directives
        .iter()
        .filter(|d| interner.is(d.name.value, directive))
        .flat_map(|d| d.arguments.iter())
        .find(|arg| interner.is(arg.name.value, argument))
        .and_then(|arg| match &arg.value {
            ast::Value::String(value, _) => Some(value.clone()),
            _ => None,
        })
}

impl Schema {
    /// Parses and builds a schema from SDL text.
    pub fn from_sdl(source: &str, file: FileId, interner: &Interner) -> Result<Self, SchemaError> {
        let result = gqlc_syntax::parse(source, file, interner);
        if result.diagnostics.has_errors() {
            return Err(SchemaError::Invalid(result.diagnostics));
        }
        Self::from_document(&result.document, interner)
    }

    /// Builds a schema from a parsed SDL document.
    pub fn from_document(document: &ast::Document, interner: &Interner) -> Result<Self, SchemaError> {
        let mut builder = SchemaBuilder::new();
        builder.add_document(document, interner);
        builder.finish()
    }
}
