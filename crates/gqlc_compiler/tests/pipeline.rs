use gqlc_compiler::{
    compile, validate, CompileErrorKind, CompiledDocument, CompilerOptions, Target,
};
use gqlc_core::{Interner, SourceMap};
use gqlc_schema::Schema;
use gqlc_syntax::parse;
use indoc::indoc;

const STAR_WARS: &str = indoc! {r#"
    schema { query: Query }

    type Query {
      hero(episode: Episode): Character
      search(text: String!): [SearchResult]
      reviews(filter: ReviewFilter): [Review]
    }

    enum Episode { NEWHOPE EMPIRE JEDI }

    scalar DateTime

    interface Character {
      id: ID!
      name: String!
      friends: [Character]
      appearsIn: [Episode]!
    }

    type Human implements Character {
      id: ID!
      name: String!
      friends: [Character]
      appearsIn: [Episode]!
      height(unit: LengthUnit = METER): Float
    }

    type Droid implements Character {
      id: ID!
      name: String!
      friends: [Character]
      appearsIn: [Episode]!
      primaryFunction: String
    }

    enum LengthUnit { METER FOOT }

    union SearchResult = Human | Droid

    type Review {
      stars: Int!
      createdAt: DateTime
    }

    input ReviewFilter {
      episode: Episode
      since: DateTime
      minStars: Int
    }
"#};

struct Fixture {
    interner: Interner,
    sources: SourceMap,
    schema: Schema,
}

impl Fixture {
    fn new(schema_sdl: &str) -> Self {
        let interner = Interner::new();
        let mut sources = SourceMap::new();
        let file = sources.add_synthetic("schema.graphql", schema_sdl);
        let schema = Schema::from_sdl(schema_sdl, file, &interner).expect("schema");
        Self {
            interner,
            sources,
            schema,
        }
    }

    fn run(&mut self, source: &str, target: Target) -> Result<CompiledDocument, String> {
        let file = self.sources.add_file("queries/ops.graphql", source);
        let result = parse(source, file, &self.interner);
        assert!(!result.diagnostics.has_errors());

        validate(&self.schema, &result.document, &self.interner, target).map_err(|err| {
            err.diagnostics
                .iter()
                .map(|d| d.render(&self.sources))
                .collect::<Vec<_>>()
                .join("\n")
        })?;
        let options = CompilerOptions::for_target(target);
        compile(&self.schema, &result.document, &self.interner, &self.sources, &options)
            .map_err(|err| err.to_string())
    }
}

fn star_wars() -> Fixture {
    Fixture::new(STAR_WARS)
}

fn keys<V>(map: &indexmap::IndexMap<String, V>) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

#[test]
fn test_hero_with_droid_variant() {
    let compiled = star_wars()
        .run("query Hero { hero { name ... on Droid { primaryFunction } } }", Target::Swift)
        .expect("compile");

    let hero_query = &compiled.operations["Hero"];
    assert_eq!(hero_query.root_type, "Query");
    assert_eq!(keys(&hero_query.selection_set.fields), ["hero"]);

    let hero = hero_query.selection_set.field("hero").expect("hero");
    assert_eq!(hero.ty.to_string(), "Character");
    let set = hero.selection_set.as_ref().expect("selection set");
    assert_eq!(keys(&set.fields), ["__typename", "name"]);
    assert_eq!(keys(&set.variants), ["Droid"]);
    assert_eq!(
        keys(&set.variants["Droid"].fields),
        ["__typename", "name", "primaryFunction"]
    );
    assert!(set.variants["Droid"].fields["primaryFunction"].is_conditional);
    assert!(!set.variants["Droid"].fields["name"].is_conditional);
    assert_eq!(
        hero_query.file_path.as_deref(),
        Some(std::path::Path::new("queries/ops.graphql"))
    );
}

#[test]
fn test_spreads_merge_into_one_field() {
    let compiled = star_wars()
        .run(
            indoc! {"
                query Hero {
                  hero {
                    ...Names
                    ...Friends
                  }
                }
                fragment Names on Character { friends { name } }
                fragment Friends on Character { friends { id } }
            "},
            Target::Json,
        )
        .expect("compile");

    let hero = compiled.operations["Hero"].selection_set.field("hero").expect("hero");
    let set = hero.selection_set.as_ref().expect("set");
    assert_eq!(keys(&set.fields), ["friends"]);
    let friends = set.field("friends").and_then(|f| f.selection_set.as_ref()).expect("friends");
    assert_eq!(keys(&friends.fields), ["name", "id"]);
    assert_eq!(compiled.operations["Hero"].fragments_referenced, ["Names", "Friends"]);
}

#[test]
fn test_two_variants_carry_shared_fields() {
    let compiled = star_wars()
        .run(
            indoc! {"
                query Hero {
                  hero {
                    id
                    ... on Human { height }
                    ... on Droid { primaryFunction }
                  }
                }
            "},
            Target::Swift,
        )
        .expect("compile");

    let hero = compiled.operations["Hero"].selection_set.field("hero").expect("hero");
    let set = hero.selection_set.as_ref().expect("set");
    assert_eq!(set.variants.len(), 2);
    assert_eq!(keys(&set.variants["Human"].fields), ["__typename", "id", "height"]);
    assert_eq!(keys(&set.variants["Droid"].fields), ["__typename", "id", "primaryFunction"]);
}

#[test]
fn test_interfaces_with_same_implementors_merge() {
    let mut fixture = Fixture::new(indoc! {"
        type Query { node: Node }
        interface Node { id: ID! }
        interface Character { id: ID! name: String! }
        type Human implements Node & Character { id: ID! name: String! }
        type Droid implements Node & Character { id: ID! name: String! }
    "});
    let compiled = fixture
        .run("query N { node { id ... on Character { name } } }", Target::Json)
        .expect("compile");

    let node = compiled.operations["N"].selection_set.field("node").expect("node");
    let set = node.selection_set.as_ref().expect("selection set");
    assert!(set.variants.is_empty());
    assert_eq!(keys(&set.fields), ["id", "name"]);
    assert_eq!(set.field("name").expect("name").ty.to_string(), "String!");
}

#[test]
fn test_types_used_are_ordered_and_deduplicated() {
    let source = indoc! {"
        query Reviews($filter: ReviewFilter, $episode: Episode) {
          reviews(filter: $filter) { stars createdAt }
          hero(episode: $episode) { appearsIn ... on Human { height(unit: FOOT) } }
        }
    "};
    let mut fixture = star_wars();
    let first = fixture.run(source, Target::TypeScript).expect("compile");
    let second = fixture.run(source, Target::TypeScript).expect("compile");

    let names: Vec<&str> = first.types_used.iter().map(|ty| ty.name()).collect();
    assert_eq!(names, ["ReviewFilter", "Episode", "DateTime"]);

    let again: Vec<&str> = second.types_used.iter().map(|ty| ty.name()).collect();
    assert_eq!(names, again);
}

#[test]
fn test_anonymous_operation_fails_for_every_target() {
    for target in [Target::Json, Target::Swift, Target::TypeScript, Target::Flow] {
        let err = star_wars()
            .run("{ hero { name } }", target)
            .expect_err("anonymous operation");
        assert!(err.starts_with("queries/ops.graphql:1:1:"), "{err}");
    }
}

#[test]
fn test_typename_alias_fails_validation() {
    for target in [Target::Json, Target::Swift] {
        let err = star_wars()
            .run("query Hero { hero { ... on Droid { kind: __typename } } }", target)
            .expect_err("typename alias");
        assert!(err.contains("__typename"), "{err}");
    }
}

#[test]
fn test_explicit_typename_rejected_only_for_swift() {
    let source = "query Hero { hero { __typename name } }";
    assert!(star_wars().run(source, Target::Swift).is_err());

    let compiled = star_wars().run(source, Target::Json).expect("compile");
    let hero = compiled.operations["Hero"].selection_set.field("hero").expect("hero");
    assert_eq!(keys(&hero.selection_set.as_ref().expect("set").fields), ["__typename", "name"]);
}

#[test]
fn test_missing_mutation_root_is_a_compile_error() {
    let interner = Interner::new();
    let mut sources = SourceMap::new();
    let file = sources.add_synthetic("schema.graphql", STAR_WARS);
    let schema = Schema::from_sdl(STAR_WARS, file, &interner).expect("schema");
    let source = "mutation Like { hero { name } }";
    let file = sources.add_file("like.graphql", source);
    let document = parse(source, file, &interner).document;

    let err = compile(&schema, &document, &interner, &sources, &CompilerOptions::default()).unwrap_err();
    assert_eq!(err.kind, CompileErrorKind::MissingRootType);
    assert_eq!(err.to_string(), "like.graphql:1:1: Schema is not configured for mutations");
}

#[test]
fn test_json_output_shape() {
    let compiled = star_wars()
        .run(
            indoc! {"
                query Hero($episode: Episode = JEDI) {
                  hero(episode: $episode) { name }
                }
            "},
            Target::Json,
        )
        .expect("compile");

    let json = serde_json::to_value(&compiled).expect("json");
    let operation = &json["operations"][0];
    assert_eq!(operation["operationName"], "Hero");
    assert_eq!(operation["operationType"], "query");
    assert_eq!(operation["variables"][0]["type"], "Episode");
    assert_eq!(operation["variables"][0]["defaultValue"], "JEDI");

    let hero = &operation["selectionSet"]["fields"][0];
    assert_eq!(hero["responseKey"], "hero");
    assert_eq!(hero["args"]["episode"]["kind"], "Variable");
    assert_eq!(hero["args"]["episode"]["variableName"], "episode");

    assert_eq!(json["fragments"], serde_json::json!([]));
    assert_eq!(json["typesUsed"][0]["kind"], "EnumType");
    assert_eq!(json["typesUsed"][0]["name"], "Episode");
    assert_eq!(json["typesUsed"][0]["values"][2]["name"], "JEDI");
}
