//! Type model of a GraphQL schema.

use gqlc_core::Interner;
use gqlc_syntax::ast;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A wrapper applied to a named type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappingType {
    List,
    NonNull,
}

/// A type reference: a named type plus its wrappers, innermost first.
///
/// `[Episode!]!` is `Episode` wrapped by `NonNull`, `List`, `NonNull`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,
    pub wrappers: Vec<WrappingType>,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wrappers: Vec::new(),
        }
    }

    #[must_use]
    pub fn list(mut self) -> Self {
        self.wrappers.push(WrappingType::List);
        self
    }

    #[must_use]
    pub fn non_null(mut self) -> Self {
        if !self.is_non_null() {
            self.wrappers.push(WrappingType::NonNull);
        }
        self
    }

    /// Converts a syntax type.
    pub fn from_ast(ty: &ast::Type, interner: &Interner) -> Self {
        match ty {
            ast::Type::Named(named) => Self::named(interner.get(named.name)),
            ast::Type::List(inner, _) => Self::from_ast(inner, interner).list(),
            ast::Type::NonNull(inner, _) => Self::from_ast(inner, interner).non_null(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        self.wrappers.last() == Some(&WrappingType::NonNull)
    }

    /// Returns true if any list wrapper is present.
    pub fn is_list(&self) -> bool {
        self.wrappers.contains(&WrappingType::List)
    }

    /// Strips the outermost wrapper. `None` for a bare named type.
    pub fn of_type(&self) -> Option<TypeRef> {
        let (_, rest) = self.wrappers.split_last()?;
        Some(Self {
            name: self.name.clone(),
            wrappers: rest.to_vec(),
        })
    }

    /// Strips an outermost non-null wrapper, if any.
    pub fn nullable(&self) -> TypeRef {
        if self.is_non_null() {
            self.of_type().unwrap_or_else(|| self.clone())
        } else {
            self.clone()
        }
    }

    /// Returns true if a value of type `self` may be used where `expected`
    /// is wanted: wrappers must match, except that a non-null value may
    /// fill a nullable slot.
    pub fn is_assignable_to(&self, expected: &TypeRef) -> bool {
        if self.name != expected.name {
            return false;
        }
        let mut actual = self.wrappers.iter().rev().peekable();
        let mut wanted = expected.wrappers.iter().rev().peekable();
        loop {
            match (actual.peek(), wanted.peek()) {
                (None, None) => return true,
                (Some(WrappingType::NonNull), Some(WrappingType::NonNull))
                | (Some(WrappingType::List), Some(WrappingType::List)) => {
                    actual.next();
                    wanted.next();
                }
                (Some(WrappingType::NonNull), _) => {
                    actual.next();
                }
                _ => return false,
            }
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.name.clone();
        for wrapper in &self.wrappers {
            out = match wrapper {
                WrappingType::List => format!("[{out}]"),
                WrappingType::NonNull => format!("{out}!"),
            };
        }
        f.write_str(&out)
    }
}

impl Serialize for TypeRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The kind of a type, as named by introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

impl TypeKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Object => "OBJECT",
            Self::Interface => "INTERFACE",
            Self::Union => "UNION",
            Self::Enum => "ENUM",
            Self::InputObject => "INPUT_OBJECT",
            Self::List => "LIST",
            Self::NonNull => "NON_NULL",
        }
    }
}

/// Names of the scalars every schema provides.
pub const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// Returns true for built-in scalars and introspection types.
pub fn is_builtin_type(name: &str) -> bool {
    BUILTIN_SCALARS.contains(&name) || name.starts_with("__")
}

/// A named type definition. The set of kinds is closed.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl TypeDef {
    pub fn name(&self) -> &str {
        match self {
            Self::Scalar(def) => &def.name,
            Self::Object(def) => &def.name,
            Self::Interface(def) => &def.name,
            Self::Union(def) => &def.name,
            Self::Enum(def) => &def.name,
            Self::InputObject(def) => &def.name,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Self::Scalar(def) => def.description.as_deref(),
            Self::Object(def) => def.description.as_deref(),
            Self::Interface(def) => def.description.as_deref(),
            Self::Union(def) => def.description.as_deref(),
            Self::Enum(def) => def.description.as_deref(),
            Self::InputObject(def) => def.description.as_deref(),
        }
    }

    pub fn kind(&self) -> TypeKind {
        match self {
            Self::Scalar(_) => TypeKind::Scalar,
            Self::Object(_) => TypeKind::Object,
            Self::Interface(_) => TypeKind::Interface,
            Self::Union(_) => TypeKind::Union,
            Self::Enum(_) => TypeKind::Enum,
            Self::InputObject(_) => TypeKind::InputObject,
        }
    }

    /// Fields of object and interface types.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDef>> {
        match self {
            Self::Object(def) => Some(&def.fields),
            Self::Interface(def) => Some(&def.fields),
            _ => None,
        }
    }

    /// Object, interface or union.
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::Object(_) | Self::Interface(_) | Self::Union(_))
    }

    /// Interface or union.
    pub fn is_abstract(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Union(_))
    }

    /// Scalar or enum.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_))
    }

    /// Valid as a variable or argument type.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Enum(_) | Self::InputObject(_))
    }

    /// Valid as a field return type.
    pub fn is_output(&self) -> bool {
        !matches!(self, Self::InputObject(_))
    }

    pub fn is_builtin(&self) -> bool {
        is_builtin_type(self.name())
    }
}

/// A scalar type.
#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub specified_by_url: Option<String>,
}

/// An object type.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub interfaces: Vec<String>,
}

/// An interface type.
#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, FieldDef>,
    pub interfaces: Vec<String>,
}

/// A union type.
#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<String>,
}

/// An enum type.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub values: IndexMap<String, EnumValueDef>,
}

/// An input object type.
#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub fields: IndexMap<String, InputValueDef>,
}

/// A field of an object or interface.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputValueDef>,
    pub ty: TypeRef,
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            description: None,
            arguments: IndexMap::new(),
            ty,
            is_deprecated: false,
            deprecation_reason: None,
        }
    }
}

/// An argument or input object field.
#[derive(Debug, Clone)]
pub struct InputValueDef {
    pub name: String,
    pub description: Option<String>,
    pub ty: TypeRef,
    /// Default value in GraphQL literal syntax.
    pub default_value: Option<String>,
}

/// A value of an enum type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValueDef {
    pub name: String,
    pub description: Option<String>,
    pub is_deprecated: bool,
    pub deprecation_reason: Option<String>,
}

/// A directive definition.
#[derive(Debug, Clone)]
pub struct DirectiveDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: IndexMap<String, InputValueDef>,
    pub locations: Vec<String>,
    pub repeatable: bool,
}
