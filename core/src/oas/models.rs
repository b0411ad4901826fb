#![deny(missing_docs)]

//! # Descriptor Models
//!
//! Input structures describing handlers and data-transfer types.
//!
//! These are produced by whatever introspection front-end discovered the
//! application's routes (or written by hand in a manifest) and are consumed
//! read-only by the resolvers. Every type mention is an explicit `TypeRef`;
//! nothing is inferred from the shape of a string.

use crate::oas::schema::SchemaNode;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Security requirement: scheme name -> required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// HTTP methods, declared in OpenAPI path-item order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    #[serde(alias = "get")]
    Get,
    /// PUT
    #[serde(alias = "put")]
    Put,
    /// POST
    #[serde(alias = "post")]
    Post,
    /// DELETE
    #[serde(alias = "delete")]
    Delete,
    /// OPTIONS
    #[serde(alias = "options")]
    Options,
    /// HEAD
    #[serde(alias = "head")]
    Head,
    /// PATCH
    #[serde(alias = "patch")]
    Patch,
    /// TRACE
    #[serde(alias = "trace")]
    Trace,
}

impl HttpMethod {
    /// Upper-case token, e.g. `GET`.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lower-case key used under an OpenAPI path item.
    pub fn as_key(&self) -> String {
        self.as_str().to_ascii_lowercase()
    }

    /// Whether a request body is meaningful for this method.
    pub fn permits_body(&self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head | HttpMethod::Options)
    }

    /// Parses a method token case-insensitively.
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "PUT" => Some(HttpMethod::Put),
            "POST" => Some(HttpMethod::Post),
            "DELETE" => Some(HttpMethod::Delete),
            "OPTIONS" => Some(HttpMethod::Options),
            "HEAD" => Some(HttpMethod::Head),
            "PATCH" => Some(HttpMethod::Patch),
            "TRACE" => Some(HttpMethod::Trace),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A type mention, tagged with what it refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeRef {
    /// A built-in scalar such as `i64`, `String` or `Uuid`.
    Scalar(String),
    /// A described type, looked up in the registry by name.
    Named(String),
    /// A list of the inner type.
    Array(Box<TypeRef>),
    /// A string-keyed map of the inner type.
    Map(Box<TypeRef>),
    /// `oneOf` over the members.
    OneOf(Vec<SchemaSource>),
    /// `anyOf` over the members.
    AnyOf(Vec<SchemaSource>),
    /// `allOf` over the members.
    AllOf(Vec<SchemaSource>),
    /// A schema written out by hand.
    Inline(SchemaNode),
}

impl TypeRef {
    /// Shorthand for `TypeRef::Scalar`.
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeRef::Scalar(name.into())
    }

    /// Shorthand for `TypeRef::Named`.
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    /// Shorthand for `TypeRef::Array`.
    pub fn array(inner: TypeRef) -> Self {
        TypeRef::Array(Box::new(inner))
    }

    /// The referenced type name for `Named`.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeRef::Named(name) => Some(name),
            _ => None,
        }
    }
}

/// One member of a composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaSource {
    /// An already built node.
    Node(SchemaNode),
    /// A type name, resolved to a reference.
    Type(String),
    /// A raw JSON schema map.
    Inline(Map<String, Value>),
}

/// Kind of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// Value type mapped through the scalar table.
    Scalar,
    /// Structured type with fields.
    Object,
    /// Enumeration with fixed case values.
    Enum,
    /// List type with an item type.
    Array,
}

/// Marks a field as a file upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UploadMarker {
    /// Several files under one field.
    #[serde(default)]
    pub multiple: bool,
}

/// Validation constraints copied onto the field schema.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Constraints {
    /// Inclusive lower bound.
    #[serde(default)]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default)]
    pub maximum: Option<f64>,
    /// Minimum string length.
    #[serde(default)]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default)]
    pub max_length: Option<u64>,
    /// Regular expression.
    #[serde(default)]
    pub pattern: Option<String>,
}

/// A field of an object type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDescriptor {
    /// Property name.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// The field accepts null.
    #[serde(default)]
    pub nullable: bool,
    /// The field has a default value (even if the value itself is unknown).
    #[serde(default)]
    pub has_default: bool,
    /// The default value, when known.
    #[serde(default)]
    pub default: Option<Value>,
    /// Explicit required flag; overrides nullability/default inference.
    #[serde(default)]
    pub required: Option<bool>,
    /// File upload marker.
    #[serde(default)]
    pub upload: Option<UploadMarker>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Example value.
    #[serde(default)]
    pub example: Option<Value>,
    /// Format override.
    #[serde(default)]
    pub format: Option<String>,
    /// Validation constraints.
    #[serde(default)]
    pub constraints: Constraints,
    /// Deprecated field.
    #[serde(default)]
    pub deprecated: bool,
}

impl FieldDescriptor {
    /// A plain, non-nullable field.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            has_default: false,
            default: None,
            required: None,
            upload: None,
            description: None,
            example: None,
            format: None,
            constraints: Constraints::default(),
            deprecated: false,
        }
    }

    /// Marks the field nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.has_default = true;
        self.default = Some(value);
        self
    }

    /// Sets the explicit required flag.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Marks the field as a file upload.
    pub fn upload(mut self, multiple: bool) -> Self {
        self.upload = Some(UploadMarker { multiple });
        self
    }

    /// Whether a default is present.
    pub fn defaulted(&self) -> bool {
        self.has_default || self.default.is_some()
    }

    /// Required inside an object schema or query string.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(!self.nullable && !self.defaulted())
    }

    /// Required inside a multipart form: every non-nullable field.
    pub fn is_required_in_form(&self) -> bool {
        self.required.unwrap_or(!self.nullable)
    }
}

/// A type supplied by the introspection front-end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeDescriptor {
    /// Unique type name; becomes the component schema name.
    pub name: String,
    /// Type kind.
    pub kind: TypeKind,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Ordered fields (objects).
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    /// Case values (enums).
    #[serde(default)]
    pub enum_values: Vec<Value>,
    /// Item type (arrays).
    #[serde(default)]
    pub items: Option<TypeRef>,
    /// `oneOf` alternatives (objects).
    #[serde(default)]
    pub one_of: Vec<SchemaSource>,
    /// `anyOf` alternatives (objects).
    #[serde(default)]
    pub any_of: Vec<SchemaSource>,
    /// `allOf` parents (objects).
    #[serde(default)]
    pub all_of: Vec<SchemaSource>,
    /// Deprecated type.
    #[serde(default)]
    pub deprecated: bool,
}

impl TypeDescriptor {
    fn empty(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            fields: Vec::new(),
            enum_values: Vec::new(),
            items: None,
            one_of: Vec::new(),
            any_of: Vec::new(),
            all_of: Vec::new(),
            deprecated: false,
        }
    }

    /// An object type with the given fields.
    pub fn object(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            fields,
            ..Self::empty(name, TypeKind::Object)
        }
    }

    /// An enumeration type.
    pub fn enumeration(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            enum_values: values,
            ..Self::empty(name, TypeKind::Enum)
        }
    }

    /// A scalar value type.
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::empty(name, TypeKind::Scalar)
    }

    /// A list type.
    pub fn array(name: impl Into<String>, items: TypeRef) -> Self {
        Self {
            items: Some(items),
            ..Self::empty(name, TypeKind::Array)
        }
    }

    /// Whether at least one field is a file upload.
    pub fn has_upload_fields(&self) -> bool {
        self.fields.iter().any(|f| f.upload.is_some())
    }
}

/// One parameter of a handler signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignatureParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    #[serde(rename = "type")]
    pub ty: TypeRef,
    /// Accepts null.
    #[serde(default)]
    pub nullable: bool,
    /// Has a default value.
    #[serde(default)]
    pub has_default: bool,
    /// The default value, when known.
    #[serde(default)]
    pub default: Option<Value>,
}

impl SignatureParam {
    /// A required, non-nullable parameter.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            nullable: false,
            has_default: false,
            default: None,
        }
    }

    /// Marks the parameter nullable.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Sets a default value.
    pub fn with_default(mut self, value: Value) -> Self {
        self.has_default = true;
        self.default = Some(value);
        self
    }

    /// Whether a default is present.
    pub fn defaulted(&self) -> bool {
        self.has_default || self.default.is_some()
    }
}

/// Ordered handler parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerSignature {
    /// Parameters in declaration order.
    pub params: Vec<SignatureParam>,
}

impl HandlerSignature {
    /// Builds a signature from parameters.
    pub fn new(params: Vec<SignatureParam>) -> Self {
        Self { params }
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Path.
    Path,
    /// Query.
    Query,
    /// Header.
    Header,
    /// Cookie.
    Cookie,
}

/// Parameter serialization style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamStyle {
    /// `matrix`
    Matrix,
    /// `label`
    Label,
    /// `form`
    Form,
    /// `simple`
    Simple,
    /// `spaceDelimited`
    SpaceDelimited,
    /// `pipeDelimited`
    PipeDelimited,
    /// `deepObject`
    DeepObject,
}

/// An operation parameter, explicit or inferred.
///
/// After resolution `schema` always holds the effective schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterDescriptor {
    /// Parameter name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Declared type, used when no schema override is given.
    #[serde(rename = "type", default)]
    pub ty: Option<TypeRef>,
    /// Required flag (always true for path parameters).
    #[serde(default)]
    pub required: bool,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Format override.
    #[serde(default)]
    pub format: Option<String>,
    /// Example value.
    #[serde(default)]
    pub example: Option<Value>,
    /// Serialization style.
    #[serde(default)]
    pub style: Option<ParamStyle>,
    /// Explode modifier.
    #[serde(default)]
    pub explode: Option<bool>,
    /// Schema override.
    #[serde(default)]
    pub schema: Option<SchemaNode>,
    /// Deprecated parameter.
    #[serde(default)]
    pub deprecated: bool,
}

impl ParameterDescriptor {
    /// A parameter with no type information yet.
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            required: location == ParamLocation::Path,
            location,
            ty: None,
            description: None,
            format: None,
            example: None,
            style: None,
            explode: None,
            schema: None,
            deprecated: false,
        }
    }

    /// Shorthand for a path parameter.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Path)
    }

    /// Shorthand for a query parameter.
    pub fn query(name: impl Into<String>, required: bool) -> Self {
        Self {
            required,
            ..Self::new(name, ParamLocation::Query)
        }
    }

    /// Sets the declared type.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }
}

/// Inline media-type entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediaDescriptor {
    /// Schema of the payload.
    #[serde(default)]
    pub schema: Option<SchemaSource>,
    /// Example payload.
    #[serde(default)]
    pub example: Option<Value>,
}

/// Explicit request body declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestBodyDescriptor {
    /// Entity type name; wins over `content`.
    #[serde(rename = "type", default)]
    pub entity: Option<String>,
    /// Inline content map.
    #[serde(default)]
    pub content: IndexMap<String, MediaDescriptor>,
    /// Required flag, defaults to true.
    #[serde(default)]
    pub required: Option<bool>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Media type for the entity, defaults to `application/json`.
    #[serde(default)]
    pub media_type: Option<String>,
}

/// A multipart form field declared directly on an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultipartFieldDescriptor {
    /// Form field name.
    pub name: String,
    /// Value type for non-upload fields (defaults to string).
    #[serde(rename = "type", default)]
    pub ty: Option<TypeRef>,
    /// The field carries a file.
    #[serde(default)]
    pub upload: bool,
    /// Several files under one field.
    #[serde(default)]
    pub multiple: bool,
    /// Required field.
    #[serde(default)]
    pub required: bool,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

/// List response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListWrapper {
    /// Bare array.
    #[default]
    #[serde(rename = "none")]
    None,
    /// `{data: [...]}`.
    #[serde(rename = "data-only")]
    DataOnly,
    /// `{data: [...], meta: {total, limit, offset}}`.
    #[serde(rename = "data+meta")]
    DataMeta,
}

/// Explicit response declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResponseDescriptor {
    /// Status code.
    pub status: u16,
    /// Description; falls back to the status table.
    #[serde(default)]
    pub description: Option<String>,
    /// Entity type(s). Several types form a `oneOf`.
    #[serde(default, deserialize_with = "one_or_many")]
    pub entity: Vec<String>,
    /// The entity is returned as a list.
    #[serde(default)]
    pub list: bool,
    /// Wrapper for list responses; defaults to the generator setting.
    #[serde(default)]
    pub wrapper: Option<ListWrapper>,
    /// Media type for entity responses, defaults to `application/json`.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Inline content map, ignored when an entity is present.
    #[serde(default)]
    pub content: IndexMap<String, MediaDescriptor>,
}

/// A response that streams a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileResponseDescriptor {
    /// Status code.
    #[serde(default = "default_file_status")]
    pub status: u16,
    /// Content type of the file.
    #[serde(default = "default_file_content_type")]
    pub content_type: String,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
}

fn default_file_status() -> u16 {
    200
}

fn default_file_content_type() -> String {
    "application/octet-stream".to_string()
}

/// One declared operation of a controller.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationDescriptor {
    /// Handler identity, e.g. `UserController::show`.
    pub handler: String,
    /// Method set.
    pub methods: Vec<HttpMethod>,
    /// Path mask relative to the controller prefix.
    pub path: String,
    /// Additional masks served by the same handler.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Explicit operation id.
    #[serde(default)]
    pub operation_id: Option<String>,
    /// Summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Description.
    #[serde(default)]
    pub description: Option<String>,
    /// Deprecated operation.
    #[serde(default)]
    pub deprecated: bool,
    /// Hidden from the generated document.
    #[serde(default)]
    pub hidden: bool,
    /// Method-level tags; replace the controller tags when present.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Method-level security; an empty list means public.
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Security written inline on the operation declaration.
    #[serde(default)]
    pub operation_security: Option<Vec<SecurityRequirement>>,
    /// Explicit parameters.
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Explicit request body.
    #[serde(default)]
    pub request_body: Option<RequestBodyDescriptor>,
    /// Explicit multipart form fields.
    #[serde(default)]
    pub multipart: Vec<MultipartFieldDescriptor>,
    /// Explicit responses.
    #[serde(default)]
    pub responses: Vec<ResponseDescriptor>,
    /// File download responses.
    #[serde(default)]
    pub file_responses: Vec<FileResponseDescriptor>,
    /// Handler signature.
    #[serde(default)]
    pub signature: HandlerSignature,
}

/// A controller: a group of operations sharing a prefix and defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ControllerDescriptor {
    /// Controller name.
    pub name: String,
    /// Path prefix prepended to every operation mask.
    #[serde(default)]
    pub prefix: String,
    /// Default tags.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Default security.
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,
    /// Description attached to the controller's tags.
    #[serde(default)]
    pub description: Option<String>,
    /// Hides every operation of the controller.
    #[serde(default)]
    pub hidden: bool,
    /// Operations.
    #[serde(default)]
    pub operations: Vec<OperationDescriptor>,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::parse_yaml;
    use serde_json::json;

    #[test]
    fn test_field_requiredness() {
        let plain = FieldDescriptor::new("id", TypeRef::scalar("i64"));
        assert!(plain.is_required());

        let nullable = FieldDescriptor::new("note", TypeRef::scalar("String")).nullable();
        assert!(!nullable.is_required());
        assert!(!nullable.is_required_in_form());

        let defaulted = FieldDescriptor::new("page", TypeRef::scalar("i32")).with_default(json!(1));
        assert!(!defaulted.is_required());
        assert!(defaulted.is_required_in_form());

        let forced = FieldDescriptor::new("note", TypeRef::scalar("String"))
            .nullable()
            .required(true);
        assert!(forced.is_required());
    }

    #[test]
    fn test_type_descriptor_from_yaml() {
        let yaml = r#"
name: Upload
kind: object
fields:
  - name: file
    type: { scalar: binary }
    upload: { multiple: true }
  - name: owner
    type: { named: User }
    nullable: true
"#;
        let desc: TypeDescriptor = parse_yaml(yaml).unwrap();
        assert_eq!(desc.kind, TypeKind::Object);
        assert!(desc.has_upload_fields());
        assert_eq!(desc.fields[1].ty, TypeRef::named("User"));
        assert_eq!(desc.fields[0].upload, Some(UploadMarker { multiple: true }));
    }

    #[test]
    fn test_nested_type_refs_as_single_key_maps() {
        let yaml = r#"
name: pets
type:
  array:
    one_of:
      - type: Cat
      - inline: { type: string }
"#;
        let field: FieldDescriptor = parse_yaml(yaml).unwrap();
        let inline = json!({ "type": "string" }).as_object().unwrap().clone();
        assert_eq!(
            field.ty,
            TypeRef::array(TypeRef::OneOf(vec![
                SchemaSource::Type("Cat".to_string()),
                SchemaSource::Inline(inline),
            ]))
        );
    }

    #[test]
    fn test_response_entity_one_or_many() {
        let one: ResponseDescriptor = parse_yaml("status: 200\nentity: User").unwrap();
        assert_eq!(one.entity, vec!["User".to_string()]);

        let many: ResponseDescriptor =
            parse_yaml("status: 200\nentity: [Cat, Dog]\nlist: true\nwrapper: data+meta")
                .unwrap();
        assert_eq!(many.entity.len(), 2);
        assert_eq!(many.wrapper, Some(ListWrapper::DataMeta));
    }

    #[test]
    fn test_http_method_parsing() {
        let methods: Vec<HttpMethod> = parse_yaml("[get, POST]").unwrap();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert!(!HttpMethod::Head.permits_body());
        assert!(HttpMethod::Delete.permits_body());
        assert_eq!(HttpMethod::Options.as_key(), "options");
    }

    #[test]
    fn test_unknown_descriptor_field_rejected() {
        let result: Result<FieldDescriptor, _> =
            parse_yaml("name: a\ntype: { scalar: i32 }\nnulable: true");
        assert!(result.is_err());
    }
}
