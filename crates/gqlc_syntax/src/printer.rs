//! Printing of executable definitions.
//!
//! Operations and fragments are printed in a normalized layout: two-space
//! indentation, one selection per line, comments and commas dropped. The
//! printed text is what generated code embeds as the operation document.

use crate::ast::*;
use gqlc_core::{Interner, Text};

/// Printing options.
#[derive(Debug, Clone)]
pub struct PrintOptions {
    /// Number of spaces for indentation.
    pub indent_size: usize,
    /// Use tabs instead of spaces.
    pub use_tabs: bool,
    /// Select `__typename` first in every selection set below the
    /// operation root that does not already select it.
    pub add_typename: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            indent_size: 2,
            use_tabs: false,
            add_typename: false,
        }
    }
}

/// Printer for executable definitions.
pub struct Printer<'a> {
    options: PrintOptions,
    interner: &'a Interner,
    output: String,
    indent: usize,
}

impl<'a> Printer<'a> {
    /// Creates a new printer.
    pub fn new(interner: &'a Interner, options: PrintOptions) -> Self {
        Self {
            options,
            interner,
            output: String::new(),
            indent: 0,
        }
    }

    /// Prints every executable definition of a document, separated by a
    /// blank line. Type system definitions are skipped.
    pub fn print_document(&mut self, document: &Document) -> String {
        self.output.clear();

        let mut first = true;
        for def in &document.definitions {
            match def {
                Definition::Operation(op) => {
                    self.separate(&mut first);
                    self.print_operation(op);
                }
                Definition::Fragment(fragment) => {
                    self.separate(&mut first);
                    self.print_fragment(fragment);
                }
                _ => {}
            }
        }

        std::mem::take(&mut self.output)
    }

    /// Prints one operation.
    pub fn operation(&mut self, op: &OperationDefinition) -> String {
        self.output.clear();
        self.print_operation(op);
        std::mem::take(&mut self.output)
    }

    /// Prints one fragment.
    pub fn fragment(&mut self, fragment: &FragmentDefinition) -> String {
        self.output.clear();
        self.print_fragment(fragment);
        std::mem::take(&mut self.output)
    }

    fn separate(&mut self, first: &mut bool) {
        if !*first {
            self.output.push_str("\n\n");
        }
        *first = false;
    }

    fn push_name(&mut self, name: &Name) {
        self.output.push_str(&self.interner.get(name.value));
    }

    fn print_operation(&mut self, op: &OperationDefinition) {
        let shorthand = op.operation == OperationType::Query
            && op.name.is_none()
            && op.variables.is_empty()
            && op.directives.is_empty();

        if !shorthand {
            self.output.push_str(op.operation.as_str());
            if let Some(name) = &op.name {
                self.output.push(' ');
                self.push_name(name);
            }
            if !op.variables.is_empty() {
                self.output.push('(');
                for (i, var) in op.variables.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_variable_definition(var);
                }
                self.output.push(')');
            }
            self.print_directives(&op.directives);
            self.output.push(' ');
        }

        self.print_selection_set(&op.selection_set, false);
    }

    fn print_variable_definition(&mut self, var: &VariableDefinition) {
        self.output.push('$');
        self.push_name(&var.name);
        self.output.push_str(": ");
        self.print_type(&var.ty);
        if let Some(default) = &var.default_value {
            self.output.push_str(" = ");
            self.print_value(default);
        }
        self.print_directives(&var.directives);
    }

    fn print_fragment(&mut self, fragment: &FragmentDefinition) {
        self.output.push_str("fragment ");
        self.push_name(&fragment.name);
        self.output.push_str(" on ");
        self.push_name(&fragment.type_condition);
        self.print_directives(&fragment.directives);
        self.output.push(' ');
        self.print_selection_set(&fragment.selection_set, self.options.add_typename);
    }

    fn print_selection_set(&mut self, set: &SelectionSet, add_typename: bool) {
        self.output.push_str("{\n");
        self.indent += 1;
        if add_typename && !selects_typename(set) {
            self.push_indent();
            self.output.push_str("__typename\n");
        }
        for selection in &set.selections {
            self.push_indent();
            self.print_selection(selection);
            self.output.push('\n');
        }
        self.indent -= 1;
        self.push_indent();
        self.output.push('}');
    }

    fn print_selection(&mut self, selection: &Selection) {
        match selection {
            Selection::Field(field) => {
                if let Some(alias) = &field.alias {
                    self.push_name(alias);
                    self.output.push_str(": ");
                }
                self.push_name(&field.name);
                self.print_arguments(&field.arguments);
                self.print_directives(&field.directives);
                if let Some(set) = &field.selection_set {
                    self.output.push(' ');
                    self.print_selection_set(set, self.options.add_typename);
                }
            }
            Selection::FragmentSpread(spread) => {
                self.output.push_str("...");
                self.push_name(&spread.name);
                self.print_directives(&spread.directives);
            }
            Selection::InlineFragment(inline) => {
                self.output.push_str("...");
                if let Some(condition) = &inline.type_condition {
                    self.output.push_str(" on ");
                    self.push_name(condition);
                }
                self.print_directives(&inline.directives);
                self.output.push(' ');
                self.print_selection_set(&inline.selection_set, self.options.add_typename);
            }
        }
    }

    fn print_type(&mut self, ty: &Type) {
        match ty {
            Type::Named(named) => {
                self.output.push_str(&self.interner.get(named.name));
            }
            Type::List(inner, _) => {
                self.output.push('[');
                self.print_type(inner);
                self.output.push(']');
            }
            Type::NonNull(inner, _) => {
                self.print_type(inner);
                self.output.push('!');
            }
        }
    }

    fn print_arguments(&mut self, arguments: &[Argument]) {
        if arguments.is_empty() {
            return;
        }
        self.output.push('(');
        for (i, arg) in arguments.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.push_name(&arg.name);
            self.output.push_str(": ");
            self.print_value(&arg.value);
        }
        self.output.push(')');
    }

    fn print_directives(&mut self, directives: &[Directive]) {
        for directive in directives {
            self.output.push_str(" @");
            self.push_name(&directive.name);
            self.print_arguments(&directive.arguments);
        }
    }

    fn print_value(&mut self, value: &Value) {
        match value {
            Value::Variable(name) => {
                self.output.push('$');
                self.push_name(name);
            }
            Value::Int(n, _) => {
                self.output.push_str(&n.to_string());
            }
            Value::Float(n, _) => {
                self.output.push_str(&format_float(*n));
            }
            Value::String(s, _) => {
                self.output.push_str(&quote(s));
            }
            Value::Boolean(b, _) => {
                self.output.push_str(if *b { "true" } else { "false" });
            }
            Value::Null(_) => {
                self.output.push_str("null");
            }
            Value::Enum(name) => {
                self.push_name(name);
            }
            Value::List(items, _) => {
                self.output.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_value(item);
                }
                self.output.push(']');
            }
            Value::Object(fields, _) => {
                self.output.push('{');
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.push_name(name);
                    self.output.push_str(": ");
                    self.print_value(value);
                }
                self.output.push('}');
            }
        }
    }

    fn push_indent(&mut self) {
        if self.options.use_tabs {
            for _ in 0..self.indent {
                self.output.push('\t');
            }
        } else {
            for _ in 0..(self.indent * self.options.indent_size) {
                self.output.push(' ');
            }
        }
    }
}

fn selects_typename(set: &SelectionSet) -> bool {
    set.selections.iter().any(|selection| {
        matches!(selection, Selection::Field(field) if field.alias.is_none() && field.name.value == Text::TYPENAME)
    })
}

/// Quotes a string as a GraphQL string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn format_float(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{n:.1}")
    } else {
        n.to_string()
    }
}

/// Prints one operation with default options.
pub fn print_operation(op: &OperationDefinition, interner: &Interner) -> String {
    Printer::new(interner, PrintOptions::default()).operation(op)
}

/// Prints one fragment with default options.
pub fn print_fragment(fragment: &FragmentDefinition, interner: &Interner) -> String {
    Printer::new(interner, PrintOptions::default()).fragment(fragment)
}

/// Prints a value literal.
pub fn print_value(value: &Value, interner: &Interner) -> String {
    let mut printer = Printer::new(interner, PrintOptions::default());
    printer.print_value(value);
    printer.output
}

/// Prints a type reference in GraphQL notation.
pub fn print_type(ty: &Type, interner: &Interner) -> String {
    let mut printer = Printer::new(interner, PrintOptions::default());
    printer.print_type(ty);
    printer.output
}

/// Prints every executable definition of a document with default options.
pub fn print(document: &Document, interner: &Interner) -> String {
    Printer::new(interner, PrintOptions::default()).print_document(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use gqlc_core::FileId;
    use indoc::indoc;

    fn reprint(source: &str) -> String {
        let interner = Interner::new();
        let result = parse(source, FileId::default(), &interner);
        assert!(!result.diagnostics.has_errors());
        print(&result.document, &interner)
    }

    #[test]
    fn test_print_operation() {
        let printed = reprint(
            "query Hero($episode: Episode = JEDI, $ids: [ID!]!) { hero(episode: $episode) { name, ...on Droid { primaryFunction } } }",
        );
        insta::assert_snapshot!(printed, @r###"
        query Hero($episode: Episode = JEDI, $ids: [ID!]!) {
          hero(episode: $episode) {
            name
            ... on Droid {
              primaryFunction
            }
          }
        }
        "###);
    }

    #[test]
    fn test_print_fragments_and_directives() {
        let printed = reprint(indoc! {r#"
            # leading comment
            query Q($skip: Boolean!) {
              a: field(arg: "x\"y", list: [1, 2.5], obj: {k: null}) @skip(if: $skip)
              ...F
            }
            fragment F on Query { b }
            type Ignored { a: Int }
        "#});
        insta::assert_snapshot!(printed, @r###"
        query Q($skip: Boolean!) {
          a: field(arg: "x\"y", list: [1, 2.5], obj: {k: null}) @skip(if: $skip)
          ...F
        }

        fragment F on Query {
          b
        }
        "###);
    }

    #[test]
    fn test_print_with_typename() {
        let interner = Interner::new();
        let source = "query Q { hero { __typename name ... on Droid { id } } } fragment F on Character { name }";
        let document = parse(source, FileId::default(), &interner).document;
        let options = PrintOptions {
            add_typename: true,
            ..PrintOptions::default()
        };
        let printed = Printer::new(&interner, options).print_document(&document);
        insta::assert_snapshot!(printed, @r###"
        query Q {
          hero {
            __typename
            name
            ... on Droid {
              __typename
              id
            }
          }
        }

        fragment F on Character {
          __typename
          name
        }
        "###);
    }

    #[test]
    fn test_print_shorthand_query() {
        assert_eq!(reprint("{ a }"), "{\n  a\n}");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a\tb\"c"), r#""a\tb\"c""#);
    }
}
