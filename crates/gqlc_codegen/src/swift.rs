//! Swift operation classes for the Apollo iOS runtime.
//!
//! Each operation becomes a `GraphQLQuery`/`GraphQLMutation` class holding
//! its document text, its variables and a `Data` struct decoded from the
//! response. Every selection set is a nested struct; variants become
//! `As<Type>` structs exposed through optional `as<Type>` properties.

use crate::printer::CodePrinter;
use crate::{capitalize, operation_type_name, TypeConverter, TypeIndex};
use gqlc_compiler::{
    CompiledDocument, CompiledField, CompiledFragment, CompiledOperation, CompilerOptions, Value, Variant,
};
use gqlc_schema::{EnumType, InputObjectType, TypeDef, TypeRef};
use indexmap::IndexMap;

const RESERVED_WORDS: &[&str] = &[
    "associatedtype", "case", "class", "default", "defer", "deinit", "do", "else", "enum", "extension",
    "fallthrough", "false", "for", "func", "guard", "if", "import", "in", "init", "inout", "internal",
    "is", "let", "nil", "operator", "private", "protocol", "public", "repeat", "return", "self", "static",
    "struct", "subscript", "super", "switch", "throw", "throws", "true", "try", "var", "where", "while",
];

/// Swift generator.
pub struct SwiftGenerator<'a> {
    document: &'a CompiledDocument,
    options: &'a CompilerOptions,
    types: TypeIndex<'a>,
}

impl<'a> SwiftGenerator<'a> {
    pub fn new(document: &'a CompiledDocument, options: &'a CompilerOptions) -> Self {
        Self {
            document,
            options,
            types: TypeIndex::new(document),
        }
    }

    pub fn generate(&self) -> String {
        let mut p = CodePrinter::new();
        p.print("//  This file was automatically generated and should not be edited.");
        p.print_newline();
        p.print_on_newline("import Apollo");

        match &self.options.namespace {
            Some(namespace) => {
                p.print_newline();
                p.print_on_newline(&format!("public enum {namespace} {{}}"));
                p.print_newline();
                p.print_on_newline(&format!("extension {namespace}"));
                p.within_braces(|p| self.print_declarations(p));
            }
            None => self.print_declarations(&mut p),
        }

        p.finish()
    }

    fn print_declarations(&self, p: &mut CodePrinter) {
        for ty in &self.document.types_used {
            match ty {
                TypeDef::Enum(def) => self.print_enum(p, def),
                TypeDef::InputObject(def) => self.print_input_object(p, def),
                _ => {}
            }
        }
        for operation in self.document.operations.values() {
            self.print_operation(p, operation);
        }
        for fragment in self.document.fragments.values() {
            self.print_fragment(p, fragment);
        }
    }

    fn print_enum(&self, p: &mut CodePrinter, def: &EnumType) {
        p.print_newline_if_needed();
        print_doc_comment(p, def.description.as_deref());
        p.print_on_newline(&format!(
            "public enum {}: String, RawRepresentable, Apollo.JSONDecodable, Apollo.JSONEncodable",
            def.name
        ));
        p.within_braces(|p| {
            for value in def.values.values() {
                print_doc_comment(p, value.description.as_deref());
                p.print_on_newline(&format!(
                    "case {} = {}",
                    escape_identifier(&enum_case_name(&value.name)),
                    string_literal(&value.name)
                ));
            }
        });
    }

    fn print_input_object(&self, p: &mut CodePrinter, def: &InputObjectType) {
        p.print_newline_if_needed();
        print_doc_comment(p, def.description.as_deref());
        p.print_on_newline(&format!("public struct {}: GraphQLMapConvertible", def.name));
        p.within_braces(|p| {
            p.print_on_newline("public var graphQLMap: GraphQLMap");
            p.print_newline();

            let parameters: Vec<String> = def
                .fields
                .values()
                .map(|field| self.parameter(&field.name, &field.ty))
                .collect();
            let entries: Vec<String> = def
                .fields
                .values()
                .map(|field| format!("{}: {}", string_literal(&field.name), escape_identifier(&field.name)))
                .collect();
            p.print_on_newline(&format!("public init({})", parameters.join(", ")));
            p.within_braces(|p| {
                p.print_on_newline(&format!("graphQLMap = {}", dictionary(&entries)));
            });
        });
    }

    fn print_operation(&self, p: &mut CodePrinter, operation: &CompiledOperation) {
        let class_name = operation_type_name(operation);
        let protocol = format!("GraphQL{}", capitalize(operation.operation_type.as_str()));

        p.print_newline_if_needed();
        p.print_on_newline(&format!("public final class {class_name}: {protocol}"));
        p.within_braces(|p| {
            print_document_string(p, "operationString", &operation.source);

            if !operation.fragments_referenced.is_empty() {
                let appended: String = operation
                    .fragments_referenced
                    .iter()
                    .map(|name| format!(".appending({name}.fragmentString)"))
                    .collect();
                p.print_newline();
                p.print_on_newline(&format!(
                    "public static var requestString: String {{ return operationString{appended} }}"
                ));
            }

            if !operation.variables.is_empty() {
                p.print_newline();
                for variable in &operation.variables {
                    p.print_on_newline(&format!(
                        "public let {}: {}",
                        escape_identifier(&variable.name),
                        self.convert_type(&variable.ty)
                    ));
                }

                let parameters: Vec<String> = operation
                    .variables
                    .iter()
                    .map(|variable| self.parameter(&variable.name, &variable.ty))
                    .collect();
                p.print_newline();
                p.print_on_newline(&format!("public init({})", parameters.join(", ")));
                p.within_braces(|p| {
                    for variable in &operation.variables {
                        p.print_on_newline(&format!(
                            "self.{} = {}",
                            variable.name,
                            escape_identifier(&variable.name)
                        ));
                    }
                });

                let entries: Vec<String> = operation
                    .variables
                    .iter()
                    .map(|variable| {
                        format!("{}: {}", string_literal(&variable.name), escape_identifier(&variable.name))
                    })
                    .collect();
                p.print_newline();
                p.print_on_newline("public var variables: GraphQLMap?");
                p.within_braces(|p| {
                    p.print_on_newline(&format!("return {}", dictionary(&entries)));
                });
            }

            let set = &operation.selection_set;
            self.print_struct(p, "Data", "GraphQLMappable", None, &set.fields, &set.variants);
        });
    }

    fn print_fragment(&self, p: &mut CodePrinter, fragment: &CompiledFragment) {
        p.print_newline_if_needed();
        p.print_on_newline(&format!("public struct {}: GraphQLFragment", fragment.name));
        p.within_braces(|p| {
            print_document_string(p, "fragmentString", &fragment.source);
            p.print_newline();
            self.print_struct_body(
                p,
                Some(&fragment.possible_types),
                &fragment.selection_set.fields,
                &fragment.selection_set.variants,
            );
        });
    }

    fn print_struct(
        &self,
        p: &mut CodePrinter,
        name: &str,
        protocol: &str,
        possible_types: Option<&[String]>,
        fields: &IndexMap<String, CompiledField>,
        variants: &IndexMap<String, Variant>,
    ) {
        p.print_newline_if_needed();
        p.print_on_newline(&format!("public struct {name}: {protocol}"));
        p.within_braces(|p| self.print_struct_body(p, possible_types, fields, variants));
    }

    fn print_struct_body(
        &self,
        p: &mut CodePrinter,
        possible_types: Option<&[String]>,
        fields: &IndexMap<String, CompiledField>,
        variants: &IndexMap<String, Variant>,
    ) {
        if let Some(types) = possible_types {
            let names: Vec<String> = types.iter().map(|name| string_literal(name)).collect();
            p.print_on_newline(&format!("public static let possibleTypes = [{}]", names.join(", ")));
            p.print_newline();
        }

        for field in fields.values() {
            print_doc_comment(p, field.description.as_deref());
            if field.is_deprecated {
                let reason = field.deprecation_reason.as_deref().unwrap_or("No longer supported");
                p.print_on_newline(&format!("@available(*, deprecated, message: {})", string_literal(reason)));
            }
            p.print_on_newline(&format!(
                "public let {}: {}",
                escape_identifier(&field.response_key),
                self.field_type(field)
            ));
        }
        if !variants.is_empty() {
            p.print_newline();
            for condition in variants.keys() {
                p.print_on_newline(&format!("public let as{condition}: As{condition}?"));
            }
        }

        p.print_newline();
        p.print_on_newline("public init(reader: GraphQLResultReader) throws");
        p.within_braces(|p| {
            for field in fields.values() {
                p.print_on_newline(&format!(
                    "{} = try reader.{}(for: {})",
                    escape_identifier(&field.response_key),
                    reader_method(&field.ty),
                    field_descriptor(field)
                ));
            }
            if !variants.is_empty() {
                let typename = if fields.contains_key("__typename") {
                    "__typename".to_string()
                } else {
                    "reader.value(for: Field(responseName: \"__typename\"))".to_string()
                };
                p.print_newline();
                for condition in variants.keys() {
                    p.print_on_newline(&format!(
                        "as{condition} = try As{condition}(reader: reader, ifTypeMatches: {typename})"
                    ));
                }
            }
        });

        for field in fields.values() {
            if let Some(set) = &field.selection_set {
                self.print_struct(
                    p,
                    &struct_name(field),
                    "GraphQLMappable",
                    None,
                    &set.fields,
                    &set.variants,
                );
            }
        }
        for (condition, variant) in variants {
            self.print_struct(
                p,
                &format!("As{condition}"),
                "GraphQLConditionalFragment",
                Some(&variant.possible_types),
                &variant.fields,
                &IndexMap::new(),
            );
        }
    }

    /// Initializer parameter; nullable inputs default to `nil`.
    fn parameter(&self, name: &str, ty: &TypeRef) -> String {
        let default = if ty.is_non_null() { "" } else { " = nil" };
        format!("{}: {}{default}", escape_identifier(name), self.convert_type(ty))
    }

    fn field_type(&self, field: &CompiledField) -> String {
        if field.selection_set.is_some() {
            self.wrap(&field.ty, struct_name(field))
        } else {
            self.convert_type(&field.ty)
        }
    }

    fn convert_type(&self, ty: &TypeRef) -> String {
        let named = self.types.convert_named(self, self.options, &ty.name);
        self.wrap(ty, named)
    }
}

impl TypeConverter for SwiftGenerator<'_> {
    fn convert_scalar(&self, name: &str) -> String {
        match name {
            "ID" => "GraphQLID",
            "Int" => "Int",
            "Float" => "Double",
            "Boolean" => "Bool",
            _ => "String",
        }
        .to_string()
    }

    fn opaque_scalar(&self) -> String {
        "String".to_string()
    }

    fn list_of(&self, item: String) -> String {
        format!("[{item}]")
    }

    fn nullable(&self, inner: String) -> String {
        format!("{inner}?")
    }
}

fn struct_name(field: &CompiledField) -> String {
    capitalize(&field.response_key)
}

fn reader_method(ty: &TypeRef) -> &'static str {
    let list = ty.nullable().is_list();
    match (ty.is_non_null(), list) {
        (true, false) => "value",
        (false, false) => "optionalValue",
        (true, true) => "list",
        (false, true) => "optionalList",
    }
}

fn field_descriptor(field: &CompiledField) -> String {
    let mut parts = vec![format!("responseName: {}", string_literal(&field.response_key))];
    if field.response_key != field.field_name {
        parts.push(format!("fieldName: {}", string_literal(&field.field_name)));
    }
    if !field.arguments.is_empty() {
        let entries: Vec<String> = field
            .arguments
            .iter()
            .map(|(name, value)| format!("{}: {}", string_literal(name), value_literal(value)))
            .collect();
        parts.push(format!("arguments: {}", dictionary(&entries)));
    }
    format!("Field({})", parts.join(", "))
}

fn value_literal(value: &Value) -> String {
    match value {
        Value::Null => "nil".to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::String(s) | Value::Enum(s) => string_literal(s),
        Value::Boolean(b) => b.to_string(),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(value_literal).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(fields) => {
            let entries: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{}: {}", string_literal(name), value_literal(value)))
                .collect();
            dictionary(&entries)
        }
        Value::Variable { name } => format!("reader.variables[{}]", string_literal(name)),
    }
}

fn dictionary(entries: &[String]) -> String {
    if entries.is_empty() {
        "[:]".to_string()
    } else {
        format!("[{}]", entries.join(", "))
    }
}

fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Prints a document as a multi-line string literal.
fn print_document_string(p: &mut CodePrinter, name: &str, source: &str) {
    p.print_on_newline(&format!("public static let {name} = \"\"\""));
    p.with_indent(|p| {
        for line in source.lines() {
            p.print_on_newline(&line.replace('\\', "\\\\").replace("\"\"\"", "\\\"\"\""));
        }
        p.print_on_newline("\"\"\"");
    });
}

fn print_doc_comment(p: &mut CodePrinter, text: Option<&str>) {
    for line in text.into_iter().flat_map(str::lines) {
        p.print_on_newline(&format!("/// {line}"));
    }
}

/// `NEW_HOPE` becomes `newHope`.
fn enum_case_name(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for (i, word) in value.split('_').filter(|word| !word.is_empty()).enumerate() {
        let lower = word.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            out.push_str(&capitalize(&lower));
        }
    }
    if out.is_empty() {
        value.to_string()
    } else {
        out
    }
}

fn escape_identifier(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile_for;
    use gqlc_compiler::Target;
    use indoc::indoc;

    fn generate(source: &str, options: &CompilerOptions) -> String {
        let document = compile_for(source, options, Target::Swift);
        SwiftGenerator::new(&document, options).generate()
    }

    #[test]
    fn test_query_with_variant() {
        let output = generate(
            indoc! {"
                query Hero($episode: Episode) {
                  hero(episode: $episode) {
                    name
                    ... on Droid { primaryFunction }
                  }
                }
            "},
            &CompilerOptions::for_target(Target::Swift),
        );

        insta::assert_snapshot!(output, @r###"
        //  This file was automatically generated and should not be edited.

        import Apollo

        /// The episodes in the Star Wars trilogy
        public enum Episode: String, RawRepresentable, Apollo.JSONDecodable, Apollo.JSONEncodable {
          case newhope = "NEWHOPE"
          case empire = "EMPIRE"
          case jedi = "JEDI"
        }

        public final class HeroQuery: GraphQLQuery {
          public static let operationString = """
            query Hero($episode: Episode) {
              hero(episode: $episode) {
                __typename
                name
                ... on Droid {
                  __typename
                  primaryFunction
                }
              }
            }
            """

          public let episode: Episode?

          public init(episode: Episode? = nil) {
            self.episode = episode
          }

          public var variables: GraphQLMap? {
            return ["episode": episode]
          }

          public struct Data: GraphQLMappable {
            public let hero: Hero?

            public init(reader: GraphQLResultReader) throws {
              hero = try reader.optionalValue(for: Field(responseName: "hero", arguments: ["episode": reader.variables["episode"]]))
            }

            public struct Hero: GraphQLMappable {
              public let __typename: String
              public let name: String

              public let asDroid: AsDroid?

              public init(reader: GraphQLResultReader) throws {
                __typename = try reader.value(for: Field(responseName: "__typename"))
                name = try reader.value(for: Field(responseName: "name"))

                asDroid = try AsDroid(reader: reader, ifTypeMatches: __typename)
              }

              public struct AsDroid: GraphQLConditionalFragment {
                public static let possibleTypes = ["Droid"]

                public let __typename: String
                public let name: String
                public let primaryFunction: String?

                public init(reader: GraphQLResultReader) throws {
                  __typename = try reader.value(for: Field(responseName: "__typename"))
                  name = try reader.value(for: Field(responseName: "name"))
                  primaryFunction = try reader.optionalValue(for: Field(responseName: "primaryFunction"))
                }
              }
            }
          }
        }
        "###);
    }

    #[test]
    fn test_mutation_with_input_struct() {
        let output = generate(
            "mutation Create($review: ReviewInput!) { createReview(episode: JEDI, review: $review) { stars } }",
            &CompilerOptions::for_target(Target::Swift),
        );

        assert!(output.contains(indoc! {r#"
            public struct ReviewInput: GraphQLMapConvertible {
              public var graphQLMap: GraphQLMap

              public init(stars: Int, commentary: String? = nil) {
                graphQLMap = ["stars": stars, "commentary": commentary]
              }
            }
        "#}), "{output}");
        assert!(output.contains("public final class CreateMutation: GraphQLMutation {"), "{output}");
        assert!(output.contains("public init(review: ReviewInput) {"), "{output}");
        assert!(
            output.contains(r#"Field(responseName: "createReview", arguments: ["episode": "JEDI", "review": reader.variables["review"]])"#),
            "{output}"
        );
    }

    #[test]
    fn test_namespace_wraps_declarations() {
        let options = CompilerOptions {
            namespace: Some("API".to_string()),
            ..CompilerOptions::for_target(Target::Swift)
        };
        let output = generate("query Reviews { reviews { createdAt } }", &options);

        assert!(output.contains("public enum API {}\n\nextension API {\n  public final class ReviewsQuery: GraphQLQuery {"), "{output}");
        assert!(output.ends_with("}\n"), "{output}");
        assert!(output.contains("public let reviews: [Review]?"), "{output}");
        assert!(output.contains("reviews = try reader.optionalList(for: Field(responseName: \"reviews\"))"), "{output}");
        assert!(output.contains("public let createdAt: String?"), "{output}");
    }

    #[test]
    fn test_fragment_struct() {
        let output = generate(
            "query Hero { hero { ...HeroName } } fragment HeroName on Character { name }",
            &CompilerOptions::for_target(Target::Swift),
        );

        assert!(output.contains("public static var requestString: String { return operationString.appending(HeroName.fragmentString) }"), "{output}");
        assert!(output.contains("public struct HeroName: GraphQLFragment {\n  public static let fragmentString = \"\"\"\n    fragment HeroName on Character {\n      __typename\n      name\n    }\n    \"\"\"\n\n  public static let possibleTypes = [\"Human\", \"Droid\"]\n"), "{output}");
    }

    #[test]
    fn test_case_names() {
        assert_eq!(enum_case_name("NEW_HOPE"), "newHope");
        assert_eq!(enum_case_name("JEDI"), "jedi");
        assert_eq!(escape_identifier("default"), "`default`");
        assert_eq!(escape_identifier("name"), "name");
    }
}
