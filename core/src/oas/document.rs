#![deny(missing_docs)]

//! # Document Generation
//!
//! Assembles the final OpenAPI 3.0.3 document from endpoint records and the
//! schema registry.
//!
//! Output is deterministic: paths are sorted by mask, methods follow the
//! path-item order, component schemas and tags are sorted by name. Component
//! schemas not reachable from any emitted operation are dropped.

use crate::config::GeneratorConfig;
use crate::error::{AppError, AppResult};
use crate::oas::endpoint::{EndpointRecord, MediaSpec, SecuritySetting};
use crate::oas::models::{
    ControllerDescriptor, HttpMethod, ParamLocation, ParamStyle, SecurityRequirement,
};
use crate::oas::ref_utils::schema_name_from_ref;
use crate::oas::registry::SchemaRegistry;
use crate::oas::routes::naming::unique_operation_id;
use crate::oas::schema::{PrimitiveType, SchemaNode};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use utoipa::openapi::security::SecurityScheme;
use utoipa::openapi::server::{Server, ServerBuilder};
use utoipa::openapi::tag::{Tag, TagBuilder};
use utoipa::openapi::{Info, InfoBuilder};

/// OpenAPI version emitted.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// The generated document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    /// OpenAPI version.
    pub openapi: String,
    /// Info block.
    pub info: Info,
    /// Servers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Operations by mask, then by lower-case method.
    pub paths: IndexMap<String, IndexMap<String, Operation>>,
    /// Components.
    #[serde(skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    /// Document-level security.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl Document {
    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> AppResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// YAML.
    pub fn to_yaml(&self) -> AppResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// The operation for `method` under `mask`.
    pub fn operation(&self, mask: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(mask)?.get(&method.as_key())
    }
}

/// `components` section.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schemas by name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, SchemaNode>,
    /// Security schemes by name.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

impl Components {
    fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.security_schemes.is_empty()
    }
}

/// One operation of a path item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation id, unique within the document.
    pub operation_id: String,
    /// Parameters.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    /// Request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyObject>,
    /// Responses by status code.
    pub responses: IndexMap<String, ResponseObject>,
    /// Deprecated.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Security; absent when the document default applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
}

/// Parameter object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterObject {
    /// Name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
    /// Deprecated.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Style.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ParamStyle>,
    /// Explode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    /// Schema.
    pub schema: SchemaNode,
    /// Example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Request body object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBodyObject {
    /// Description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Content by media type.
    pub content: IndexMap<String, MediaTypeObject>,
    /// Required.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

/// Media type object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaTypeObject {
    /// Schema.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
    /// Example.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

/// Response object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseObject {
    /// Description.
    pub description: String,
    /// Content by media type.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaTypeObject>,
}

/// Predicate deciding whether a record is emitted.
pub type EndpointFilter = Box<dyn Fn(&EndpointRecord) -> bool>;

/// Builds documents from endpoint records.
pub struct DocumentGenerator<'c> {
    config: &'c GeneratorConfig,
    filter: Option<EndpointFilter>,
    tag_descriptions: BTreeMap<String, String>,
}

impl<'c> DocumentGenerator<'c> {
    /// Creates a generator.
    pub fn new(config: &'c GeneratorConfig) -> Self {
        Self {
            config,
            filter: None,
            tag_descriptions: BTreeMap::new(),
        }
    }

    /// Excludes every record for which `filter` returns false.
    pub fn with_filter(mut self, filter: EndpointFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Attaches each controller's description to its tags. The first
    /// description offered for a tag wins.
    pub fn with_controllers(mut self, controllers: &[ControllerDescriptor]) -> Self {
        for controller in controllers {
            if let Some(description) = &controller.description {
                for tag in &controller.tags {
                    self.tag_descriptions
                        .entry(tag.clone())
                        .or_insert_with(|| description.clone());
                }
            }
        }
        self
    }

    /// Generates the document.
    pub fn generate(
        &self,
        records: &[EndpointRecord],
        registry: &SchemaRegistry,
    ) -> AppResult<Document> {
        self.config.validate()?;

        let mut emitted: Vec<&EndpointRecord> = records
            .iter()
            .filter(|r| self.config.include_hidden || !r.hidden)
            .filter(|r| self.filter.as_ref().is_none_or(|f| f(r)))
            .collect();
        emitted.sort_by(|a, b| {
            a.mask
                .cmp(&b.mask)
                .then_with(|| a.methods.cmp(&b.methods))
                .then_with(|| a.handler.cmp(&b.handler))
        });

        let mut items: BTreeMap<String, BTreeMap<HttpMethod, Operation>> = BTreeMap::new();
        let mut owners: HashMap<(HttpMethod, &str), &str> = HashMap::new();
        let mut used_ids = HashSet::new();
        let mut tag_names = BTreeSet::new();
        let mut operation_count = 0usize;

        for record in &emitted {
            for method in &record.methods {
                if let Some(first) = owners.insert((*method, record.mask.as_str()), &record.handler) {
                    return Err(AppError::DuplicateRoute {
                        method: method.to_string(),
                        mask: record.mask.clone(),
                        first: first.to_string(),
                        second: record.handler.clone(),
                    });
                }
                let operation_id = unique_operation_id(&record.operation_id, &mut used_ids);
                tag_names.extend(record.tags.iter().cloned());
                items
                    .entry(record.mask.clone())
                    .or_default()
                    .insert(*method, build_operation(record, operation_id));
                operation_count += 1;
            }
        }

        let paths: IndexMap<String, IndexMap<String, Operation>> = items
            .into_iter()
            .map(|(mask, ops)| {
                let ops = ops.into_iter().map(|(m, op)| (m.as_key(), op)).collect();
                (mask, ops)
            })
            .collect();

        let schemas = reachable_schemas(&paths, registry);
        tracing::info!(
            operations = operation_count,
            schemas = schemas.len(),
            pruned = registry.schemas().len().saturating_sub(schemas.len()),
            "Generated document"
        );

        let tags = tag_names
            .into_iter()
            .map(|name| {
                TagBuilder::new()
                    .description(self.tag_descriptions.get(&name).cloned())
                    .name(name)
                    .build()
            })
            .collect();

        Ok(Document {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info(),
            servers: self
                .config
                .servers
                .iter()
                .map(|s| {
                    ServerBuilder::new()
                        .url(s.url.clone())
                        .description(s.description.clone())
                        .build()
                })
                .collect(),
            paths,
            components: Components {
                schemas,
                security_schemes: self.config.security_schemes.clone(),
            },
            security: self.config.security.clone(),
            tags,
        })
    }

    fn info(&self) -> Info {
        InfoBuilder::new()
            .title(self.config.info.title.clone())
            .version(self.config.info.version.clone())
            .description(self.config.info.description.clone())
            .build()
    }
}

fn build_operation(record: &EndpointRecord, operation_id: String) -> Operation {
    let parameters = record
        .parameters
        .values()
        .map(|p| ParameterObject {
            name: p.name.clone(),
            location: p.location,
            description: p.description.clone(),
            required: p.required,
            deprecated: p.deprecated,
            style: p.style,
            explode: p.explode,
            schema: p
                .schema
                .clone()
                .unwrap_or_else(|| SchemaNode::primitive(PrimitiveType::String)),
            example: p.example.clone(),
        })
        .collect();

    let request_body = record.request_body.as_ref().map(|body| RequestBodyObject {
        description: body.description.clone(),
        content: media_objects(body.media()),
        required: body.required,
    });

    let responses = record
        .responses
        .iter()
        .map(|(status, spec)| {
            (
                status.to_string(),
                ResponseObject {
                    description: spec.description.clone(),
                    content: media_objects(spec.media()),
                },
            )
        })
        .collect();

    Operation {
        tags: record.tags.clone(),
        summary: record.summary.clone(),
        description: record.description.clone(),
        operation_id,
        parameters,
        request_body,
        responses,
        deprecated: record.deprecated,
        security: match &record.security {
            SecuritySetting::Inherit => None,
            SecuritySetting::Explicit(requirements) => Some(requirements.clone()),
        },
    }
}

fn media_objects(media: IndexMap<String, MediaSpec>) -> IndexMap<String, MediaTypeObject> {
    media
        .into_iter()
        .map(|(media_type, spec)| {
            (
                media_type,
                MediaTypeObject {
                    schema: spec.schema,
                    example: spec.example,
                },
            )
        })
        .collect()
}

fn collect_operation_refs(operation: &Operation, names: &mut VecDeque<String>) {
    let mut visit = |r: &str| {
        if let Some(name) = schema_name_from_ref(r) {
            names.push_back(name);
        }
    };
    for param in &operation.parameters {
        param.schema.walk_refs(&mut visit);
    }
    let bodies = operation.request_body.iter().map(|b| &b.content);
    let responses = operation.responses.values().map(|r| &r.content);
    for content in bodies.chain(responses) {
        for media in content.values() {
            if let Some(schema) = &media.schema {
                schema.walk_refs(&mut visit);
            }
        }
    }
}

/// Component schemas reachable from the operations, sorted by name.
fn reachable_schemas(
    paths: &IndexMap<String, IndexMap<String, Operation>>,
    registry: &SchemaRegistry,
) -> IndexMap<String, SchemaNode> {
    let mut queue = VecDeque::new();
    for operation in paths.values().flat_map(|ops| ops.values()) {
        collect_operation_refs(operation, &mut queue);
    }

    let mut reached: BTreeMap<String, SchemaNode> = BTreeMap::new();
    while let Some(name) = queue.pop_front() {
        if reached.contains_key(&name) {
            continue;
        }
        let Some(schema) = registry.get(&name) else {
            continue;
        };
        schema.walk_refs(&mut |r| {
            if let Some(next) = schema_name_from_ref(r) {
                queue.push_back(next);
            }
        });
        reached.insert(name, schema.clone());
    }
    reached.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oas::models::{
        FieldDescriptor, OperationDescriptor, ResponseDescriptor, TypeDescriptor, TypeRef,
    };
    use crate::oas::routes::assemble_controllers;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn controller(name: &str, operations: Vec<OperationDescriptor>) -> ControllerDescriptor {
        ControllerDescriptor {
            name: name.into(),
            tags: vec![name.to_lowercase()],
            description: Some(format!("{} endpoints", name)),
            operations,
            ..ControllerDescriptor::default()
        }
    }

    fn op(handler: &str, method: HttpMethod, path: &str, entity: Option<&str>) -> OperationDescriptor {
        OperationDescriptor {
            handler: handler.into(),
            methods: vec![method],
            path: path.into(),
            responses: entity
                .map(|e| {
                    vec![ResponseDescriptor {
                        status: 200,
                        entity: vec![e.into()],
                        ..ResponseDescriptor::default()
                    }]
                })
                .unwrap_or_default(),
            ..OperationDescriptor::default()
        }
    }

    #[test]
    fn test_methods_in_canonical_order_and_tags_sorted() {
        let mut registry = SchemaRegistry::new();
        let config = GeneratorConfig::default();
        let controllers = vec![
            controller("Zoo", vec![op("Zoo::create", HttpMethod::Post, "/items", None)]),
            controller("Alpha", vec![op("Alpha::list", HttpMethod::Get, "/items", None)]),
        ];
        let records = assemble_controllers(&controllers, &mut registry, &config).unwrap();
        let doc = DocumentGenerator::new(&config)
            .with_controllers(&controllers)
            .generate(&records, &registry)
            .unwrap();

        let methods: Vec<&String> = doc.paths["/items"].keys().collect();
        assert_eq!(methods, vec!["get", "post"]);
        let tags: Vec<Value> = doc.tags.iter().map(|t| serde_json::to_value(t).unwrap()).collect();
        assert_eq!(
            tags,
            vec![
                json!({"name": "alpha", "description": "Alpha endpoints"}),
                json!({"name": "zoo", "description": "Zoo endpoints"})
            ]
        );
    }

    #[test]
    fn test_duplicate_route() {
        let mut registry = SchemaRegistry::new();
        let config = GeneratorConfig::default();
        let controllers = vec![controller(
            "Users",
            vec![
                op("Users::a", HttpMethod::Get, "/users", None),
                op("Users::b", HttpMethod::Get, "/users/", None),
            ],
        )];
        let records = assemble_controllers(&controllers, &mut registry, &config).unwrap();
        let err = DocumentGenerator::new(&config)
            .generate(&records, &registry)
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateRoute { ref second, .. } if second == "Users::b"));
    }

    #[test]
    fn test_hidden_endpoints_and_their_schemas_are_dropped() {
        let mut registry = SchemaRegistry::new();
        registry.declare(TypeDescriptor::object(
            "Secret",
            vec![FieldDescriptor::new("token", TypeRef::scalar("String"))],
        ));
        registry.declare(TypeDescriptor::object("Public", vec![]));
        let mut hidden = op("Ops::secret", HttpMethod::Get, "/secret", Some("Secret"));
        hidden.hidden = true;
        let controllers = vec![controller(
            "Ops",
            vec![hidden, op("Ops::public", HttpMethod::Get, "/public", Some("Public"))],
        )];
        let mut config = GeneratorConfig::default();
        let records = assemble_controllers(&controllers, &mut registry, &config).unwrap();
        assert!(registry.get("Secret").is_some());

        let doc = DocumentGenerator::new(&config).generate(&records, &registry).unwrap();
        assert!(!doc.paths.contains_key("/secret"));
        assert_eq!(doc.components.schemas.keys().collect::<Vec<_>>(), vec!["Public"]);

        config.include_hidden = true;
        let doc = DocumentGenerator::new(&config).generate(&records, &registry).unwrap();
        assert_eq!(
            doc.components.schemas.keys().collect::<Vec<_>>(),
            vec!["Public", "Secret"]
        );
    }

    #[test]
    fn test_custom_filter_runs_before_pruning() {
        let mut registry = SchemaRegistry::new();
        registry.declare(TypeDescriptor::object("Report", vec![]));
        let controllers = vec![controller(
            "Admin",
            vec![op("Admin::report", HttpMethod::Get, "/admin/report", Some("Report"))],
        )];
        let config = GeneratorConfig::default();
        let records = assemble_controllers(&controllers, &mut registry, &config).unwrap();
        let doc = DocumentGenerator::new(&config)
            .with_filter(Box::new(|r| !r.mask.starts_with("/admin")))
            .generate(&records, &registry)
            .unwrap();
        assert!(doc.paths.is_empty());
        assert!(doc.components.schemas.is_empty());
    }

    #[test]
    fn test_transitive_schemas_kept() {
        let mut registry = SchemaRegistry::new();
        registry.declare(TypeDescriptor::object(
            "Order",
            vec![FieldDescriptor::new("lines", TypeRef::array(TypeRef::named("Line")))],
        ));
        registry.declare(TypeDescriptor::object(
            "Line",
            vec![FieldDescriptor::new("sku", TypeRef::scalar("String"))],
        ));
        let controllers = vec![controller(
            "Orders",
            vec![op("Orders::show", HttpMethod::Get, "/orders/{id}", Some("Order"))],
        )];
        let mut controllers = controllers;
        controllers[0].operations[0].parameters =
            vec![crate::oas::models::ParameterDescriptor::path("id")];
        let config = GeneratorConfig::default();
        let records = assemble_controllers(&controllers, &mut registry, &config).unwrap();
        let doc = DocumentGenerator::new(&config).generate(&records, &registry).unwrap();
        assert_eq!(
            doc.components.schemas.keys().collect::<Vec<_>>(),
            vec!["Line", "Order"]
        );

        let value: Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();
        assert_eq!(value["openapi"], json!("3.0.3"));
        assert_eq!(value["info"], json!({"title": "API", "version": "1.0.0"}));
        assert_eq!(
            value["paths"]["/orders/{id}"]["get"]["parameters"],
            json!([{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}])
        );
        assert_eq!(
            value["paths"]["/orders/{id}"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
            json!({"$ref": "#/components/schemas/Order"})
        );
    }
}
