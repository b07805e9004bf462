use super::{validate_with_rules, Rule};
use gqlc_core::{FileId, Interner};
use gqlc_schema::Schema;
use gqlc_syntax::parse;

pub(crate) const SCHEMA: &str = r#"
    directive @onField on FIELD

    interface Pet {
      name(surname: Boolean): String
    }

    enum DogCommand { SIT HEEL DOWN }

    type Dog implements Pet {
      name(surname: Boolean): String
      nickname: String
      barkVolume: Int
      doesKnowCommand(dogCommand: DogCommand!): Boolean
      isHousetrained(atOtherHomes: Boolean = true): Boolean
      owner: Human
    }

    type Cat implements Pet {
      name(surname: Boolean): String
      meowVolume: Int
    }

    union CatOrDog = Cat | Dog

    type Human {
      name: String
      pets: [Pet]
      relatives: [Human]
    }

    input ComplexInput {
      requiredField: Boolean!
      intField: Int
      stringListField: [String]
    }

    type Query {
      dog: Dog
      human(id: ID): Human
      pet: Pet
      catOrDog: CatOrDog
      complex(input: ComplexInput): Boolean
      multiple(req1: Int!, req2: Int!, opt: Int = 0): String
    }
"#;

/// Runs `rules` over `source` and returns the messages reported.
pub(crate) fn messages_for(rules: &[Rule], source: &str) -> Vec<String> {
    let interner = Interner::new();
    let schema = Schema::from_sdl(SCHEMA, FileId::default(), &interner).expect("test schema");
    let result = parse(source, FileId::default(), &interner);
    assert!(
        !result.diagnostics.has_errors(),
        "test document does not parse: {:?}",
        result.diagnostics
    );
    match validate_with_rules(&schema, &result.document, &interner, rules) {
        Ok(()) => Vec::new(),
        Err(err) => err.diagnostics.iter().map(|d| d.title.clone()).collect(),
    }
}

pub(crate) fn expect_passes(rule: Rule, source: &str) {
    let messages = messages_for(&[rule], source);
    assert!(messages.is_empty(), "{rule:?} unexpectedly failed: {messages:?}");
}

pub(crate) fn expect_fails(rule: Rule, source: &str) -> Vec<String> {
    let messages = messages_for(&[rule], source);
    assert!(!messages.is_empty(), "{rule:?} unexpectedly passed");
    messages
}
