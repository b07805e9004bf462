//! SDL printing of a [`Schema`].

use crate::schema::Schema;
use crate::types::*;
use gqlc_syntax::printer::quote;
use indexmap::IndexMap;

const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";
const BUILTIN_DIRECTIVES: [&str; 4] = ["skip", "include", "deprecated", "specifiedBy"];

/// Prints every user-defined type and directive as SDL.
///
/// Built-in scalars, introspection types and the standard directives are
/// left out. A `schema` block is printed only when the root types do not
/// use the conventional names.
pub fn print_schema(schema: &Schema) -> String {
    let mut blocks = Vec::new();

    if let Some(block) = print_schema_definition(schema) {
        blocks.push(block);
    }

    for directive in schema.directives() {
        if !BUILTIN_DIRECTIVES.contains(&directive.name.as_str()) {
            blocks.push(print_directive(directive));
        }
    }

    for def in schema.types() {
        if !def.is_builtin() {
            blocks.push(print_type(def));
        }
    }

    let mut out = blocks.join("\n\n");
    out.push('\n');
    out
}

fn print_schema_definition(schema: &Schema) -> Option<String> {
    let roots = [
        ("query", schema.query_type_name(), "Query"),
        ("mutation", schema.mutation_type_name(), "Mutation"),
        ("subscription", schema.subscription_type_name(), "Subscription"),
    ];
    let conventional = roots
        .iter()
        .all(|(_, name, default)| name.map_or(true, |name| name == *default));
    if conventional && schema.description().is_none() {
        return None;
    }

    let mut out = print_description(schema.description(), "");
    out.push_str("schema {\n");
    for (operation, name, _) in roots {
        if let Some(name) = name {
            out.push_str(&format!("  {operation}: {name}\n"));
        }
    }
    out.push('}');
    Some(out)
}

fn print_directive(directive: &DirectiveDef) -> String {
    let mut out = print_description(directive.description.as_deref(), "");
    out.push_str("directive @");
    out.push_str(&directive.name);
    out.push_str(&print_arguments(&directive.arguments, ""));
    if directive.repeatable {
        out.push_str(" repeatable");
    }
    out.push_str(" on ");
    out.push_str(&directive.locations.join(" | "));
    out
}

fn print_type(def: &TypeDef) -> String {
    let mut out = print_description(def.description(), "");
    match def {
        TypeDef::Scalar(scalar) => {
            out.push_str("scalar ");
            out.push_str(&scalar.name);
            if let Some(url) = &scalar.specified_by_url {
                out.push_str(&format!(" @specifiedBy(url: {})", quote(url)));
            }
        }
        TypeDef::Object(object) => {
            out.push_str("type ");
            out.push_str(&object.name);
            out.push_str(&print_implements(&object.interfaces));
            out.push_str(&print_fields(&object.fields));
        }
        TypeDef::Interface(interface) => {
            out.push_str("interface ");
            out.push_str(&interface.name);
            out.push_str(&print_implements(&interface.interfaces));
            out.push_str(&print_fields(&interface.fields));
        }
        TypeDef::Union(union) => {
            out.push_str("union ");
            out.push_str(&union.name);
            if !union.members.is_empty() {
                out.push_str(" = ");
                out.push_str(&union.members.join(" | "));
            }
        }
        TypeDef::Enum(enum_type) => {
            out.push_str("enum ");
            out.push_str(&enum_type.name);
            let lines = enum_type
                .values
                .values()
                .enumerate()
                .map(|(i, value)| {
                    let mut line = print_description_block(value.description.as_deref(), "  ", i == 0);
                    line.push_str("  ");
                    line.push_str(&value.name);
                    line.push_str(&print_deprecated(value.is_deprecated, value.deprecation_reason.as_deref()));
                    line
                })
                .collect::<Vec<_>>();
            out.push_str(&print_block(lines));
        }
        TypeDef::InputObject(input) => {
            out.push_str("input ");
            out.push_str(&input.name);
            let lines = input
                .fields
                .values()
                .enumerate()
                .map(|(i, field)| {
                    let mut line = print_description_block(field.description.as_deref(), "  ", i == 0);
                    line.push_str("  ");
                    line.push_str(&print_input_value(field));
                    line
                })
                .collect::<Vec<_>>();
            out.push_str(&print_block(lines));
        }
    }
    out
}

fn print_implements(interfaces: &[String]) -> String {
    if interfaces.is_empty() {
        String::new()
    } else {
        format!(" implements {}", interfaces.join(" & "))
    }
}

fn print_fields(fields: &IndexMap<String, FieldDef>) -> String {
    let lines = fields
        .values()
        .enumerate()
        .map(|(i, field)| {
            let mut line = print_description_block(field.description.as_deref(), "  ", i == 0);
            line.push_str("  ");
            line.push_str(&field.name);
            line.push_str(&print_arguments(&field.arguments, "  "));
            line.push_str(": ");
            line.push_str(&field.ty.to_string());
            line.push_str(&print_deprecated(field.is_deprecated, field.deprecation_reason.as_deref()));
            line
        })
        .collect();
    print_block(lines)
}

fn print_block(lines: Vec<String>) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!(" {{\n{}\n}}", lines.join("\n"))
    }
}

fn print_arguments(arguments: &IndexMap<String, InputValueDef>, indent: &str) -> String {
    if arguments.is_empty() {
        return String::new();
    }

    if arguments.values().all(|arg| arg.description.is_none()) {
        let args = arguments
            .values()
            .map(print_input_value)
            .collect::<Vec<_>>()
            .join(", ");
        return format!("({args})");
    }

    let inner = format!("{indent}  ");
    let lines = arguments
        .values()
        .enumerate()
        .map(|(i, arg)| {
            let mut line = print_description_block(arg.description.as_deref(), &inner, i == 0);
            line.push_str(&inner);
            line.push_str(&print_input_value(arg));
            line
        })
        .collect::<Vec<_>>();
    format!("(\n{}\n{indent})", lines.join("\n"))
}

fn print_input_value(value: &InputValueDef) -> String {
    let mut out = format!("{}: {}", value.name, value.ty);
    if let Some(default) = &value.default_value {
        out.push_str(" = ");
        out.push_str(default);
    }
    out
}

fn print_deprecated(is_deprecated: bool, reason: Option<&str>) -> String {
    match (is_deprecated, reason) {
        (false, _) => String::new(),
        (true, None) => " @deprecated".to_string(),
        (true, Some(reason)) if reason == DEFAULT_DEPRECATION_REASON => " @deprecated".to_string(),
        (true, Some(reason)) => format!(" @deprecated(reason: {})", quote(reason)),
    }
}

/// Description of a member inside a block; members after the first get
/// a blank line before their description.
fn print_description_block(description: Option<&str>, indent: &str, first: bool) -> String {
    match description {
        Some(_) if !first => format!("\n{}", print_description(description, indent)),
        _ => print_description(description, indent),
    }
}

fn print_description(description: Option<&str>, indent: &str) -> String {
    let Some(description) = description else {
        return String::new();
    };
    let escaped = description.replace("\"\"\"", "\\\"\"\"");
    if escaped.contains('\n') {
        let body = escaped
            .lines()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("{indent}\"\"\"\n{body}\n{indent}\"\"\"\n")
    } else {
        format!("{indent}\"\"\"{escaped}\"\"\"\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlc_core::{FileId, Interner};
    use indoc::indoc;

    fn print_sdl(sdl: &str) -> String {
        let interner = Interner::new();
        let schema = Schema::from_sdl(sdl, FileId::default(), &interner).expect("schema");
        print_schema(&schema)
    }

    #[test]
    fn test_print_schema() {
        let printed = print_sdl(indoc! {r#"
            type Query {
              "Find the hero."
              hero(episode: Episode = JEDI, first: Int): Character
              old: String @deprecated
            }
            "One of the films."
            enum Episode { NEWHOPE EMPIRE JEDI @deprecated(reason: "gone") }
            interface Character { name: String! }
            type Droid implements Character { name: String! friends: [Character!]! }
            union Search = Droid
            input Review { stars: Int! = 5 commentary: String }
            scalar Date
        "#});
        insta::assert_snapshot!(printed, @r###"
        type Query {
          """Find the hero."""
          hero(episode: Episode = JEDI, first: Int): Character
          old: String @deprecated
        }

        """One of the films."""
        enum Episode {
          NEWHOPE
          EMPIRE
          JEDI @deprecated(reason: "gone")
        }

        interface Character {
          name: String!
        }

        type Droid implements Character {
          name: String!
          friends: [Character!]!
        }

        union Search = Droid

        input Review {
          stars: Int! = 5
          commentary: String
        }

        scalar Date
        "###);
    }

    #[test]
    fn test_schema_block_for_custom_roots() {
        let printed = print_sdl("schema { query: Root } type Root { a: Int }");
        assert!(printed.starts_with("schema {\n  query: Root\n}\n\ntype Root"));
    }

    #[test]
    fn test_custom_directive() {
        let printed = print_sdl("directive @cached(ttl: Int) repeatable on FIELD type Query { a: Int }");
        assert!(printed.starts_with("directive @cached(ttl: Int) repeatable on FIELD\n\n"));
    }
}
