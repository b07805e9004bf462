//! Flow type declarations.

use crate::typescript::{Dialect, TypeScriptGenerator};
use gqlc_compiler::{CompiledDocument, CompilerOptions};

/// Flow generator: exact object types and `?T` for nullable types.
pub struct FlowGenerator<'a> {
    inner: TypeScriptGenerator<'a>,
}

impl<'a> FlowGenerator<'a> {
    pub fn new(document: &'a CompiledDocument, options: &'a CompilerOptions) -> Self {
        Self {
            inner: TypeScriptGenerator::with_dialect(document, options, Dialect::Flow),
        }
    }

    pub fn generate(&self) -> String {
        self.inner.generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile_for;
    use gqlc_compiler::Target;
    use indoc::indoc;

    fn generate(source: &str) -> String {
        let options = CompilerOptions::for_target(Target::Flow);
        let document = compile_for(source, &options, Target::Flow);
        FlowGenerator::new(&document, &options).generate()
    }

    #[test]
    fn test_mutation_with_input_object() {
        let output = generate(indoc! {"
            mutation CreateReview($episode: Episode!, $review: ReviewInput!) {
              createReview(episode: $episode, review: $review) {
                stars
                commentary
              }
            }
        "});

        insta::assert_snapshot!(output, @r###"
        /* @flow */
        //  This file was automatically generated and should not be edited.

        // The episodes in the Star Wars trilogy
        export type Episode =
          "NEWHOPE" |
          "EMPIRE" |
          "JEDI";

        export type ReviewInput = {|
          stars: number,
          commentary?: ?string,
        |};

        export type CreateReviewMutationVariables = {|
          episode: Episode,
          review: ReviewInput,
        |};

        export type CreateReviewMutation = {|
          createReview: ?{|
            // The number of stars
            stars: number,
            commentary: ?string,
          |},
        |};
        "###);
    }

    #[test]
    fn test_nullable_union_is_parenthesized() {
        let output = generate("query Hero { hero { name ... on Human { height } } }");
        assert!(output.contains("  hero: ?({|\n    name: string,\n    height?: ?number,\n  |} | {|\n    name: string,\n  |}),"), "{output}");
    }
}
