//! End-to-end properties of registration, assembly and document generation.

use apidoc_core::oas::models::{FieldDescriptor, TypeDescriptor, TypeRef};
use apidoc_core::oas::DocumentGenerator;
use apidoc_core::{assemble_controllers, ApiManifest, AppError, GeneratorConfig, SchemaRegistry};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

fn generate(yaml: &str) -> Value {
    let manifest = ApiManifest::from_yaml(yaml).unwrap();
    let doc = manifest.generate(&manifest.base_config()).unwrap();
    to_json(&doc)
}

#[test]
fn mutual_cycle_terminates_with_one_entry_per_type() {
    let mut registry = SchemaRegistry::new();
    registry.declare(TypeDescriptor::object(
        "Author",
        vec![FieldDescriptor::new("books", TypeRef::array(TypeRef::named("Book")))],
    ));
    registry.declare(TypeDescriptor::object(
        "Book",
        vec![FieldDescriptor::new("author", TypeRef::named("Author"))],
    ));

    let name = registry.register_name("Author", "test").unwrap();
    assert_eq!(name.as_deref(), Some("Author"));

    let names: Vec<&String> = registry.schemas().keys().collect();
    assert_eq!(names, vec!["Author", "Book"]);
    assert_eq!(
        to_json(registry.get("Book").unwrap()),
        json!({
            "type": "object",
            "properties": { "author": { "$ref": "#/components/schemas/Author" } },
            "required": ["author"]
        })
    );
}

#[test]
fn nullable_reference_is_wrapped_in_one_of() {
    let doc = generate(
        r#"
types:
  - name: Address
    kind: object
    fields:
      - name: city
        type: { scalar: String }
  - name: Customer
    kind: object
    fields:
      - name: billing
        type: { named: Address }
        nullable: true
      - name: shipping
        type: { named: Address }
        nullable: true
        description: Where parcels go
controllers:
  - name: CustomerController
    operations:
      - handler: CustomerController::show
        methods: [GET]
        path: /customer
        responses:
          - status: 200
            entity: Customer
"#,
    );

    let properties = &doc["components"]["schemas"]["Customer"]["properties"];
    assert_eq!(
        properties["billing"],
        json!({ "oneOf": [{ "$ref": "#/components/schemas/Address" }], "nullable": true })
    );
    let shipping = properties["shipping"].as_object().unwrap();
    assert!(shipping.get("$ref").is_none());
    assert_eq!(shipping["nullable"], json!(true));

    let rendered = serde_json::to_string(&doc).unwrap();
    assert!(!rendered.contains(r##""$ref":"#/components/schemas/Address","nullable""##));
}

#[test]
fn registering_twice_is_idempotent() {
    let mut registry = SchemaRegistry::new();
    let user = TypeDescriptor::object(
        "User",
        vec![FieldDescriptor::new("id", TypeRef::scalar("i64"))],
    );

    let first = registry.register(&user).unwrap();
    let snapshot = registry.schemas().clone();
    let second = registry.register(&user).unwrap();

    assert_eq!(first, Some("User".to_string()));
    assert_eq!(first, second);
    assert_eq!(registry.schemas(), &snapshot);
    assert_eq!(registry.schemas().len(), 1);
}

#[test]
fn missing_path_parameter_is_named() {
    let manifest = ApiManifest::from_yaml(
        r#"
controllers:
  - name: Things
    operations:
      - handler: Things::show
        methods: [GET]
        path: "/a/{x}/{y}"
        parameters:
          - name: x
            in: path
"#,
    )
    .unwrap();

    let err = manifest.generate(&manifest.base_config()).unwrap_err();
    assert!(err.is_configuration_error());
    match err {
        AppError::MissingPathParameter { name, mask, .. } => {
            assert_eq!(name, "y");
            assert_eq!(mask, "/a/{x}/{y}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn aliases_share_everything_but_the_path() {
    let manifest = ApiManifest::from_yaml(
        r#"
types:
  - name: Order
    kind: object
    fields:
      - name: id
        type: { scalar: i64 }
controllers:
  - name: Orders
    prefix: /api
    operations:
      - handler: Orders::show
        methods: [GET]
        path: "/orders/{id}"
        aliases: ["/purchases/{id}", "/o/{id}"]
        signature:
          - name: id
            type: { scalar: i64 }
        responses:
          - status: 200
            entity: Order
"#,
    )
    .unwrap();
    let config = manifest.base_config();
    let mut registry = manifest.registry(&config);
    let records = assemble_controllers(&manifest.controllers, &mut registry, &config).unwrap();

    assert_eq!(records.len(), 3);
    let masks: Vec<&str> = records.iter().map(|r| r.mask.as_str()).collect();
    assert_eq!(masks, vec!["/api/orders/{id}", "/api/purchases/{id}", "/api/o/{id}"]);

    let primary = &records[0];
    for alias in &records[1..] {
        assert_eq!(alias.handler, primary.handler);
        assert_eq!(alias.parameters, primary.parameters);
        assert_eq!(alias.responses, primary.responses);
        assert_eq!(alias.alias_of.as_deref(), Some(primary.mask.as_str()));
        assert_ne!(alias.pattern, primary.pattern);
    }
    assert!(records[1].pattern.is_match("/api/purchases/9"));
    assert!(!records[1].pattern.is_match("/api/orders/9"));
}

#[test]
fn multipart_required_set_lists_only_required_fields() {
    let doc = generate(
        r#"
types:
  - name: UploadForm
    kind: object
    fields:
      - name: file
        type: { scalar: String }
        upload: {}
      - name: note
        type: { scalar: String }
        nullable: true
controllers:
  - name: Files
    operations:
      - handler: Files::upload
        methods: [POST]
        path: /files
        signature:
          - name: form
            type: { named: UploadForm }
"#,
    );

    let body = &doc["paths"]["/files"]["post"]["requestBody"];
    assert_eq!(body["required"], json!(true));
    let schema = &body["content"]["multipart/form-data"]["schema"];
    assert_eq!(schema["required"], json!(["file"]));
    assert_eq!(
        schema["properties"]["file"],
        json!({ "type": "string", "format": "binary" })
    );
    assert!(schema["properties"]["note"].is_object());
}

#[test]
fn unreferenced_schemas_are_pruned() {
    let manifest = ApiManifest::from_yaml(
        r#"
types:
  - name: Visible
    kind: object
    fields:
      - name: id
        type: { scalar: i64 }
  - name: Secret
    kind: object
    fields:
      - name: token
        type: { scalar: String }
  - name: Orphan
    kind: object
    fields:
      - name: id
        type: { scalar: i64 }
controllers:
  - name: Public
    operations:
      - handler: Public::show
        methods: [GET]
        path: /visible
        responses:
          - status: 200
            entity: Visible
  - name: Internal
    hidden: true
    operations:
      - handler: Internal::secret
        methods: [GET]
        path: /secret
        responses:
          - status: 200
            entity: Secret
"#,
    )
    .unwrap();
    let config = manifest.base_config();
    let (records, mut registry) = manifest.records(&config).unwrap();
    registry.register_name("Orphan", "test").unwrap();
    assert_eq!(registry.schemas().len(), 3);

    let doc = DocumentGenerator::new(&config)
        .generate(&records, &registry)
        .unwrap();
    let names: Vec<&String> = doc.components.schemas.keys().collect();
    assert_eq!(names, vec!["Visible"]);
    assert!(doc.paths.get("/secret").is_none());
}

const ORDERED: &str = r#"
config:
  info: { title: Zoo, version: "1.0.0" }
types:
  - name: Animal
    kind: object
    fields:
      - name: keeper
        type: { named: Keeper }
        nullable: true
  - name: Keeper
    kind: object
    fields:
      - name: name
        type: { scalar: String }
controllers:
  - name: Animals
    prefix: /animals
    tags: [animals]
    operations:
      - handler: Animals::list
        methods: [GET]
        path: ""
        responses:
          - status: 200
            entity: Animal
            list: true
      - handler: Animals::create
        methods: [POST]
        path: ""
        signature:
          - name: body
            type: { named: Animal }
        responses:
          - status: 201
            entity: Animal
  - name: Keepers
    prefix: /keepers
    tags: [keepers]
    operations:
      - handler: Keepers::show
        methods: [GET, HEAD]
        path: "/{id}"
        signature:
          - name: id
            type: { scalar: i64 }
        responses:
          - status: 200
            entity: Keeper
"#;

const SHUFFLED: &str = r#"
config:
  info: { title: Zoo, version: "1.0.0" }
types:
  - name: Keeper
    kind: object
    fields:
      - name: name
        type: { scalar: String }
  - name: Animal
    kind: object
    fields:
      - name: keeper
        type: { named: Keeper }
        nullable: true
controllers:
  - name: Keepers
    prefix: /keepers
    tags: [keepers]
    operations:
      - handler: Keepers::show
        methods: [HEAD, GET]
        path: "/{id}"
        signature:
          - name: id
            type: { scalar: i64 }
        responses:
          - status: 200
            entity: Keeper
  - name: Animals
    prefix: /animals
    tags: [animals]
    operations:
      - handler: Animals::create
        methods: [POST]
        path: ""
        signature:
          - name: body
            type: { named: Animal }
        responses:
          - status: 201
            entity: Animal
      - handler: Animals::list
        methods: [GET]
        path: ""
        responses:
          - status: 200
            entity: Animal
            list: true
"#;

#[test]
fn output_is_byte_identical_across_input_orderings() {
    let render = |yaml: &str| {
        let manifest = ApiManifest::from_yaml(yaml).unwrap();
        let doc = manifest.generate(&manifest.base_config()).unwrap();
        (doc.to_json_pretty().unwrap(), doc.to_yaml().unwrap())
    };

    let (json_a, yaml_a) = render(ORDERED);
    let (json_b, yaml_b) = render(SHUFFLED);
    assert_eq!(json_a, json_b);
    assert_eq!(yaml_a, yaml_b);
    assert_eq!(render(ORDERED).0, json_a);

    let doc: Value = serde_json::from_str(&json_a).unwrap();
    let paths: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/animals", "/keepers/{id}"]);
    let methods: Vec<&String> = doc["paths"]["/animals"].as_object().unwrap().keys().collect();
    assert_eq!(methods, vec!["get", "post"]);
}

#[test]
fn default_config_generates_minimal_document() {
    let manifest = ApiManifest::default();
    let doc = manifest.generate(&GeneratorConfig::default()).unwrap();
    assert_eq!(
        to_json(&doc),
        json!({
            "openapi": "3.0.3",
            "info": { "title": "API", "version": "1.0.0" },
            "paths": {}
        })
    );
}

#[test]
fn excluded_types_never_reach_components() {
    let doc = generate(
        r##"
config:
  excluded_types: [Money]
types:
  - name: Money
    kind: object
    fields:
      - name: cents
        type: { scalar: i64 }
controllers:
  - name: Payments
    operations:
      - handler: Payments::create
        methods: [POST]
        path: /payments
        request_body:
          content:
            application/json:
              schema:
                inline:
                  type: object
                  properties:
                    amount: { $ref: "#/components/schemas/Money" }
                    at: { $ref: "#/components/schemas/DateTime" }
"##,
    );

    let schema = &doc["paths"]["/payments"]["post"]["requestBody"]["content"]["application/json"]
        ["schema"];
    assert_eq!(schema["properties"]["amount"], json!({ "type": "object" }));
    assert_eq!(
        schema["properties"]["at"],
        json!({ "type": "string", "format": "date-time" })
    );
    assert!(doc.get("components").is_none());
}
