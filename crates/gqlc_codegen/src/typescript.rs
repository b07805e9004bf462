//! TypeScript type declarations.
//!
//! Flow output shares this generator; the two dialects differ only in
//! their header, object delimiters and nullable notation.

use crate::printer::CodePrinter;
use crate::{operation_type_name, TypeConverter, TypeIndex};
use gqlc_compiler::{
    CompiledDocument, CompiledField, CompiledFragment, CompiledOperation, CompilerOptions, SelectionSet,
};
use gqlc_schema::{EnumType, InputObjectType, TypeDef, TypeRef};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    TypeScript,
    Flow,
}

impl Dialect {
    fn header(self) -> &'static str {
        match self {
            Self::TypeScript => "/* tslint:disable */",
            Self::Flow => "/* @flow */",
        }
    }

    fn object_delimiters(self) -> (&'static str, &'static str) {
        match self {
            Self::TypeScript => ("{", "}"),
            Self::Flow => ("{|", "|}"),
        }
    }
}

/// TypeScript generator.
pub struct TypeScriptGenerator<'a> {
    document: &'a CompiledDocument,
    options: &'a CompilerOptions,
    types: TypeIndex<'a>,
    dialect: Dialect,
}

impl<'a> TypeScriptGenerator<'a> {
    pub fn new(document: &'a CompiledDocument, options: &'a CompilerOptions) -> Self {
        Self::with_dialect(document, options, Dialect::TypeScript)
    }

    pub(crate) fn with_dialect(
        document: &'a CompiledDocument,
        options: &'a CompilerOptions,
        dialect: Dialect,
    ) -> Self {
        Self {
            document,
            options,
            types: TypeIndex::new(document),
            dialect,
        }
    }

    /// Generates declarations for every used type, operation and fragment.
    pub fn generate(&self) -> String {
        let mut p = CodePrinter::new();
        p.print(self.dialect.header());
        p.print_on_newline("//  This file was automatically generated and should not be edited.");

        for ty in &self.document.types_used {
            match ty {
                TypeDef::Enum(def) => self.print_enum(&mut p, def),
                TypeDef::InputObject(def) => self.print_input_object(&mut p, def),
                // Custom scalars are inlined where they are used.
                _ => {}
            }
        }
        for operation in self.document.operations.values() {
            self.print_operation(&mut p, operation);
        }
        for fragment in self.document.fragments.values() {
            self.print_fragment(&mut p, fragment);
        }

        p.finish()
    }

    fn print_enum(&self, p: &mut CodePrinter, def: &EnumType) {
        p.print_newline();
        print_comment(p, def.description.as_deref());
        p.print_on_newline(&format!("export type {} =", def.name));
        let count = def.values.len();
        p.with_indent(|p| {
            for (i, value) in def.values.values().enumerate() {
                let separator = if i + 1 == count { ";" } else { " |" };
                let mut line = format!("\"{}\"{separator}", value.name);
                if let Some(description) = &value.description {
                    line.push_str(" // ");
                    line.push_str(description.lines().next().unwrap_or_default());
                }
                p.print_on_newline(&line);
            }
        });
    }

    fn print_input_object(&self, p: &mut CodePrinter, def: &InputObjectType) {
        p.print_newline();
        print_comment(p, def.description.as_deref());
        p.print_on_newline(&format!("export type {} = ", def.name));
        self.within_object(p, |p| {
            for field in def.fields.values() {
                print_comment(p, field.description.as_deref());
                self.print_input_value(p, &field.name, &field.ty);
            }
        });
        p.print(";");
    }

    fn print_operation(&self, p: &mut CodePrinter, operation: &CompiledOperation) {
        let type_name = operation_type_name(operation);

        if !operation.variables.is_empty() {
            p.print_newline();
            p.print_on_newline(&format!("export type {type_name}Variables = "));
            self.within_object(p, |p| {
                for variable in &operation.variables {
                    self.print_input_value(p, &variable.name, &variable.ty);
                }
            });
            p.print(";");
        }

        p.print_newline();
        p.print_on_newline(&format!("export type {type_name} = "));
        self.print_selection_set(p, &operation.selection_set, None);
        p.print(";");
    }

    fn print_fragment(&self, p: &mut CodePrinter, fragment: &CompiledFragment) {
        p.print_newline();
        p.print_on_newline(&format!("export type {}Fragment = ", fragment.name));
        self.print_selection_set(p, &fragment.selection_set, Some(&fragment.possible_types));
        p.print(";");
    }

    /// Nullable inputs may be omitted.
    fn print_input_value(&self, p: &mut CodePrinter, name: &str, ty: &TypeRef) {
        let optional = if ty.is_non_null() { "" } else { "?" };
        p.print_on_newline(&format!("{name}{optional}: {},", self.convert_type(ty)));
    }

    /// Prints the object type of a selection set at the current position.
    ///
    /// With variants the result is a union of every variant's shape and
    /// the unconditional shape, which covers the remaining runtime types.
    fn print_selection_set(&self, p: &mut CodePrinter, set: &SelectionSet, possible_types: Option<&[String]>) {
        if set.variants.is_empty() {
            self.print_object(p, &set.fields, possible_types);
            return;
        }
        p.print("(");
        for variant in set.variants.values() {
            self.print_object(p, &variant.fields, Some(&variant.possible_types));
            p.print(" | ");
        }
        self.print_object(p, &set.fields, possible_types);
        p.print(")");
    }

    fn print_object(
        &self,
        p: &mut CodePrinter,
        fields: &IndexMap<String, CompiledField>,
        possible_types: Option<&[String]>,
    ) {
        self.within_object(p, |p| {
            for field in fields.values() {
                self.print_field(p, field, possible_types);
            }
        });
    }

    fn print_field(&self, p: &mut CodePrinter, field: &CompiledField, possible_types: Option<&[String]>) {
        print_comment(p, field.description.as_deref());
        let optional = if field.is_conditional { "?" } else { "" };
        p.print_on_newline(&format!("{}{optional}: ", field.response_key));

        match (&field.selection_set, possible_types) {
            (Some(set), _) => {
                let (before, after) = self.wrap_parts(&field.ty);
                p.print(&before);
                self.print_selection_set(p, set, None);
                p.print(&after);
            }
            (None, Some(types)) if field.is_typename() && !types.is_empty() => {
                let literals: Vec<String> = types.iter().map(|name| format!("\"{name}\"")).collect();
                p.print(&literals.join(" | "));
            }
            (None, _) => p.print(&self.convert_type(&field.ty)),
        }
        p.print(",");
    }

    fn within_object(&self, p: &mut CodePrinter, f: impl FnOnce(&mut CodePrinter)) {
        let (open, close) = self.dialect.object_delimiters();
        p.within_block(open, close, f);
    }

    fn convert_type(&self, ty: &TypeRef) -> String {
        let named = self.types.convert_named(self, self.options, &ty.name);
        self.wrap(ty, named)
    }
}

impl TypeConverter for TypeScriptGenerator<'_> {
    fn convert_scalar(&self, name: &str) -> String {
        match name {
            "Int" | "Float" => "number",
            "Boolean" => "boolean",
            _ => "string",
        }
        .to_string()
    }

    fn opaque_scalar(&self) -> String {
        "any".to_string()
    }

    fn list_of(&self, item: String) -> String {
        format!("Array<{item}>")
    }

    fn nullable(&self, inner: String) -> String {
        match self.dialect {
            Dialect::TypeScript => format!("{inner} | null"),
            Dialect::Flow => format!("?{inner}"),
        }
    }
}

fn print_comment(p: &mut CodePrinter, text: Option<&str>) {
    for line in text.into_iter().flat_map(str::lines) {
        p.print_on_newline(&format!("// {line}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile_for;
    use gqlc_compiler::Target;
    use indoc::indoc;

    fn generate(source: &str, options: &CompilerOptions) -> String {
        let document = compile_for(source, options, Target::TypeScript);
        TypeScriptGenerator::new(&document, options).generate()
    }

    #[test]
    fn test_operation_with_variant() {
        let output = generate(
            indoc! {"
                query Hero($episode: Episode) {
                  hero(episode: $episode) {
                    name
                    ... on Droid { primaryFunction }
                  }
                }
            "},
            &CompilerOptions::for_target(Target::TypeScript),
        );

        insta::assert_snapshot!(output, @r###"
        /* tslint:disable */
        //  This file was automatically generated and should not be edited.

        // The episodes in the Star Wars trilogy
        export type Episode =
          "NEWHOPE" |
          "EMPIRE" |
          "JEDI";

        export type HeroQueryVariables = {
          episode?: Episode | null,
        };

        export type HeroQuery = {
          hero: ({
            name: string,
            primaryFunction?: string | null,
          } | {
            name: string,
          }) | null,
        };
        "###);
    }

    #[test]
    fn test_lists_and_custom_scalars() {
        let source = "query Reviews($filter: ReviewFilter) { reviews(filter: $filter) { stars createdAt } }";

        let output = generate(source, &CompilerOptions::for_target(Target::TypeScript));
        assert!(output.contains("export type ReviewFilter = {\n  since?: any | null,\n};"), "{output}");
        assert!(output.contains("  reviews: Array<{\n"), "{output}");
        assert!(output.contains("    createdAt: any | null,\n  }> | null,"), "{output}");

        let options = CompilerOptions {
            custom_scalars_prefix: "GQL".to_string(),
            ..CompilerOptions::for_target(Target::TypeScript)
        };
        let output = generate(source, &options);
        assert!(output.contains("since?: GQLDateTime | null,"), "{output}");
        assert!(output.contains("createdAt: GQLDateTime | null,"), "{output}");
    }

    #[test]
    fn test_typename_literals_in_variants() {
        let options = CompilerOptions {
            add_typename: true,
            ..CompilerOptions::for_target(Target::TypeScript)
        };
        let output = generate("query Hero { hero { ... on Droid { primaryFunction } } }", &options);

        assert!(output.contains("    __typename: \"Droid\",\n    primaryFunction?: string | null,"), "{output}");
        assert!(output.contains("__typename: string,"), "{output}");
    }

    #[test]
    fn test_fragment_typename_uses_possible_types() {
        let options = CompilerOptions {
            add_typename: true,
            ..CompilerOptions::for_target(Target::TypeScript)
        };
        let output = generate(
            "query Hero { hero { ...HeroName } } fragment HeroName on Character { name }",
            &options,
        );

        assert!(output.contains("export type HeroNameFragment = {\n  __typename: \"Human\" | \"Droid\",\n"), "{output}");
    }

    #[test]
    fn test_conditional_fields_are_optional() {
        let output = generate(
            "query Hero($full: Boolean!) { hero { name friends @include(if: $full) { name } } }",
            &CompilerOptions::for_target(Target::TypeScript),
        );
        assert!(output.contains("friends?: Array<{"), "{output}");
    }
}
