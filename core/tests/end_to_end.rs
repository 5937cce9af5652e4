use oats_core::{generate, load_document, AppError, Config, GeneratedTypes, SectionName};
use pretty_assertions::assert_eq;

fn run(text: &str, config: &Config) -> GeneratedTypes {
    let doc = load_document(text).expect("document loads");
    generate(&doc, config).expect("document generates")
}

fn with_schemas(schemas: &str) -> String {
    format!(
        "openapi: 3.0.3\ninfo: {{title: Test, version: \"1\"}}\npaths: {{}}\ncomponents:\n  schemas:\n{}",
        schemas
    )
}

fn components(text: &str, config: &Config) -> String {
    run(text, config).sections[&SectionName::Components].clone()
}

const STORE: &str = r##"
openapi: 3.0.3
info: {title: Store, version: "1"}
paths:
  /pets/{petId}:
    get:
      operationId: getPet
      parameters:
        - {name: petId, in: path, required: true, schema: {type: integer}}
        - {name: verbose, in: query, schema: {type: boolean}}
      responses:
        "200":
          description: found
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Pet"}
        "404":
          description: missing
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Error"}
        default:
          description: failure
          content:
            application/json:
              schema: {$ref: "#/components/schemas/Error"}
components:
  schemas:
    Pet:
      type: object
      properties:
        id: {type: integer}
        name: {type: string}
      required: [id]
    Error:
      type: object
      properties:
        message: {type: string}
"##;

#[test]
fn test_output_is_deterministic() {
    for alphabetize in [false, true] {
        let config = Config {
            alphabetize,
            catalog: true,
            ..Config::default()
        };
        assert_eq!(run(STORE, &config), run(STORE, &config));
    }
}

#[test]
fn test_response_split() {
    let out = run(STORE, &Config::default());
    assert_eq!(
        out.sections[&SectionName::Operation("getPet".into())],
        r#"{
  parameters: {
    petId: number;
    verbose?: boolean;
  };
  content: void;
  responses: {
    /** found */
    "200": components["schemas"]["Pet"];
  };
  exceptions: {
    /** missing */
    "404": components["schemas"]["Error"];
    /** failure */
    default: components["schemas"]["Error"];
  };
}"#
    );
}

#[test]
fn test_paths_reference_operations() {
    let out = run(STORE, &Config::default());
    assert_eq!(
        out.sections[&SectionName::Paths],
        "{\n  \"/pets/{petId}\": {\n    get: operations[\"getPet\"];\n  };\n}"
    );

    let config = Config {
        path_params_as_types: true,
        ..Config::default()
    };
    let out = run(STORE, &config);
    assert!(out.sections[&SectionName::Paths].starts_with("{\n  [path: `/pets/${number}`]: {\n"));
}

#[test]
fn test_object_schema_end_to_end() {
    for alphabetize in [false, true] {
        let config = Config {
            alphabetize,
            ..Config::default()
        };
        let text = components(STORE, &config);
        assert!(
            text.contains("    Pet: {\n      id: number;\n      name?: string;\n    };\n"),
            "{}",
            text
        );
    }
}

#[test]
fn test_self_reference_stays_a_reference() {
    let text = with_schemas(
        r##"
    Node:
      type: object
      properties:
        value: {type: string}
        children:
          type: array
          items: {$ref: "#/components/schemas/Node"}
        parent: {$ref: "#/components/schemas/Node"}
"##,
    );
    let out = components(&text, &Config::default());
    assert!(out.contains(r#"      children?: components["schemas"]["Node"][];"#));
    assert!(out.contains(r#"      parent?: components["schemas"]["Node"];"#));
}

#[test]
fn test_nullable_and_default_non_nullable() {
    let text = with_schemas(
        r#"
    Plain: {type: string, nullable: true}
    Defaulted: {type: string, nullable: true, default: "x"}
"#,
    );
    let out = components(&text, &Config::default());
    assert!(out.contains("    Plain: string | null;\n"));
    assert!(out.contains("    Defaulted: string | null;\n"));

    let config = Config {
        default_non_nullable: true,
        ..Config::default()
    };
    let out = components(&text, &config);
    assert!(out.contains("    Plain: string | null;\n"));
    assert!(out.contains("    Defaulted: string;\n"));
}

#[test]
fn test_tuple_synthesis() {
    let text = with_schemas("    Pair: {type: array, items: {type: integer}, minItems: 2, maxItems: 2}\n");
    assert!(components(&text, &Config::default()).contains("    Pair: number[];\n"));

    let config = Config {
        support_array_length: true,
        ..Config::default()
    };
    assert!(components(&text, &config).contains("    Pair: [number, number];\n"));
}

#[test]
fn test_alphabetize_orders_components_not_properties() {
    let text = with_schemas(
        r#"
    B:
      type: object
      properties:
        z: {type: string}
        a: {type: string}
    A: {type: string}
"#,
    );
    let declared = components(&text, &Config::default());
    assert!(declared.find("    B: {").unwrap() < declared.find("    A: string;").unwrap());

    let config = Config {
        alphabetize: true,
        ..Config::default()
    };
    let sorted = components(&text, &config);
    assert!(sorted.find("    A: string;").unwrap() < sorted.find("    B: {").unwrap());
    assert!(sorted.find("z?: string").unwrap() < sorted.find("a?: string").unwrap());
}

#[test]
fn test_discriminator_mapping_orders_union() {
    let text = with_schemas(
        r##"
    Pet:
      oneOf:
        - $ref: "#/components/schemas/Cat"
        - $ref: "#/components/schemas/Dog"
      discriminator:
        propertyName: kind
        mapping:
          dog: "#/components/schemas/Dog"
          cat: "#/components/schemas/Cat"
    Cat: {type: object, properties: {kind: {type: string}}}
    Dog: {type: object, properties: {kind: {type: string}}}
"##,
    );
    let text = components(&text, &Config::default());
    let dog = text
        .find(r#"    Pet: components["schemas"]["Dog"] & {"#)
        .unwrap();
    let dog_tag = text.find(r#"kind: "dog";"#).unwrap();
    let cat = text.find(r#"} | components["schemas"]["Cat"] & {"#).unwrap();
    let cat_tag = text.find(r#"kind: "cat";"#).unwrap();
    assert!(dog < dog_tag && dog_tag < cat && cat < cat_tag);
}

#[test]
fn test_immutable_types() {
    let config = Config {
        immutable_types: true,
        ..Config::default()
    };
    let text = components(STORE, &config);
    assert!(text.contains("    readonly Pet: {\n      readonly id: number;\n"));
}

#[test]
fn test_unresolvable_reference_names_location() {
    let text = with_schemas("    Owner: {$ref: \"#/components/schemas/Missing\"}\n");
    let doc = load_document(&text).unwrap();
    let err = generate(&doc, &Config::default()).unwrap_err();
    assert!(matches!(err, AppError::UnresolvableReference { .. }));
    assert!(err.to_string().contains("#/components/schemas/Owner"));
}

#[test]
fn test_duplicate_operation_fails() {
    let text = r#"
openapi: 3.1.0
info: {title: Dup, version: "1"}
paths:
  /a:
    get: {operationId: same, responses: {"200": {description: ok}}}
  /b:
    get: {operationId: same, responses: {"200": {description: ok}}}
"#;
    let doc = load_document(text).unwrap();
    let err = generate(&doc, &Config::default()).unwrap_err();
    assert!(matches!(err, AppError::DuplicateOperation { .. }));
}

#[test]
fn test_module_layout() {
    let out = run(STORE, &Config::default());
    let module = out.module().unwrap();
    let order: Vec<usize> = [
        "export type WithHeaders",
        "export interface paths",
        "export type webhooks",
        "export interface components",
        "export type external",
        "export interface operations",
    ]
    .iter()
    .map(|needle| module.find(needle).unwrap())
    .collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}
