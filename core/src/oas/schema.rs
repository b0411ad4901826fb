#![deny(missing_docs)]

//! # Schema Nodes
//!
//! Normalized representation of one OpenAPI 3.0 schema fragment.
//!
//! A node is serialized exactly as it appears in the final document, so the
//! field order of `SchemaNode` is the key order of the emitted JSON/YAML.

use crate::oas::ref_utils::component_ref;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Primitive JSON types understood by OpenAPI 3.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// `string`
    String,
    /// `integer`
    Integer,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `object`
    Object,
    /// `array`
    Array,
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Object => "object",
            PrimitiveType::Array => "array",
        };
        f.write_str(s)
    }
}

/// Classification of a node, derived from which fields are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    /// Scalar value (string, integer, ...), possibly with an enumeration.
    Primitive,
    /// Object or array with structure.
    Object,
    /// `$ref` pointer to a component schema.
    Reference,
    /// `oneOf` / `anyOf` / `allOf` grouping.
    Composition,
}

/// The three composition keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositionKind {
    /// `oneOf`: exactly one member matches.
    OneOf,
    /// `anyOf`: at least one member matches.
    AnyOf,
    /// `allOf`: every member matches.
    AllOf,
}

/// A single OpenAPI schema fragment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    /// `$ref` target, e.g. `#/components/schemas/User`.
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Primitive type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<PrimitiveType>,
    /// Format hint (`int64`, `uuid`, `binary`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Regular expression the value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Enumeration cases.
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    /// Object properties in declaration order.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, SchemaNode>,
    /// Required property names.
    #[serde(default, skip_serializing_if = "IndexSet::is_empty")]
    pub required: IndexSet<String>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    /// Map value schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,
    /// `oneOf` members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaNode>,
    /// `anyOf` members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaNode>,
    /// `allOf` members.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaNode>,
    /// OpenAPI 3.0 nullability flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    /// Marks the schema as deprecated.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Example value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    /// Keywords this model does not interpret, kept verbatim.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SchemaNode {
    /// A bare primitive node.
    pub fn primitive(schema_type: PrimitiveType) -> Self {
        Self {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// A primitive node with a format.
    pub fn formatted(schema_type: PrimitiveType, format: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: Some(format.into()),
            ..Self::default()
        }
    }

    /// `{type: string, format: binary}`, the shape of an uploaded or downloaded file.
    pub fn binary() -> Self {
        Self::formatted(PrimitiveType::String, "binary")
    }

    /// An empty object node to which properties are added.
    pub fn object() -> Self {
        Self::primitive(PrimitiveType::Object)
    }

    /// `{type: array, items: <items>}`.
    pub fn array_of(items: SchemaNode) -> Self {
        Self {
            schema_type: Some(PrimitiveType::Array),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }

    /// `{type: object, additionalProperties: <values>}`.
    pub fn map_of(values: SchemaNode) -> Self {
        Self {
            schema_type: Some(PrimitiveType::Object),
            additional_properties: Some(Box::new(values)),
            ..Self::default()
        }
    }

    /// `{$ref: "#/components/schemas/<name>"}`.
    pub fn reference_to(name: &str) -> Self {
        Self {
            reference: Some(component_ref(name)),
            ..Self::default()
        }
    }

    /// A composition node of the given kind over `members`.
    pub fn composition(kind: CompositionKind, members: Vec<SchemaNode>) -> Self {
        let mut node = Self::default();
        *node.members_mut(kind) = members;
        node
    }

    /// The node's classification.
    pub fn kind(&self) -> SchemaKind {
        if self.reference.is_some() {
            SchemaKind::Reference
        } else if !self.one_of.is_empty() || !self.any_of.is_empty() || !self.all_of.is_empty() {
            SchemaKind::Composition
        } else if matches!(
            self.schema_type,
            Some(PrimitiveType::Object) | Some(PrimitiveType::Array)
        ) || !self.properties.is_empty()
        {
            SchemaKind::Object
        } else {
            SchemaKind::Primitive
        }
    }

    /// True for a node that is nothing but a `$ref`.
    pub fn is_bare_reference(&self) -> bool {
        self.reference.is_some()
            && *self
                == Self {
                    reference: self.reference.clone(),
                    ..Self::default()
                }
    }

    /// Members of the given composition keyword.
    pub fn members(&self, kind: CompositionKind) -> &[SchemaNode] {
        match kind {
            CompositionKind::OneOf => &self.one_of,
            CompositionKind::AnyOf => &self.any_of,
            CompositionKind::AllOf => &self.all_of,
        }
    }

    /// Mutable members of the given composition keyword.
    pub fn members_mut(&mut self, kind: CompositionKind) -> &mut Vec<SchemaNode> {
        match kind {
            CompositionKind::OneOf => &mut self.one_of,
            CompositionKind::AnyOf => &mut self.any_of,
            CompositionKind::AllOf => &mut self.all_of,
        }
    }

    /// Marks the node nullable.
    ///
    /// A `$ref` cannot carry sibling keywords in OpenAPI 3.0, so a reference is
    /// wrapped as `{oneOf: [<ref>], nullable: true}` instead of gaining a flag.
    pub fn into_nullable(self) -> Self {
        if self.kind() == SchemaKind::Reference {
            Self {
                one_of: vec![self],
                nullable: true,
                ..Self::default()
            }
        } else {
            Self {
                nullable: true,
                ..self
            }
        }
    }

    /// Attaches a description. A `$ref` is wrapped in `allOf` first.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        let mut node = if self.kind() == SchemaKind::Reference {
            Self::composition(CompositionKind::AllOf, vec![self])
        } else {
            self
        };
        node.description = Some(description.into());
        node
    }

    /// Adds a property, recording it as required when asked to.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode, required: bool) -> Self {
        let name = name.into();
        if required {
            self.required.insert(name.clone());
        }
        self.properties.insert(name, node);
        self
    }

    /// Calls `visit` with every `$ref` string reachable from this node.
    pub fn walk_refs<'a>(&'a self, visit: &mut dyn FnMut(&'a str)) {
        if let Some(r) = &self.reference {
            visit(r);
        }
        for prop in self.properties.values() {
            prop.walk_refs(visit);
        }
        if let Some(items) = &self.items {
            items.walk_refs(visit);
        }
        if let Some(values) = &self.additional_properties {
            values.walk_refs(visit);
        }
        for member in self.one_of.iter().chain(&self.any_of).chain(&self.all_of) {
            member.walk_refs(visit);
        }
        for value in self.extensions.values() {
            walk_value_refs(value, visit);
        }
    }

    /// Replaces every `$ref` for which `replace` returns a node.
    ///
    /// A bare reference is swapped for the replacement. A reference with
    /// sibling keywords keeps them and takes the replacement as its first
    /// `allOf` member.
    pub fn replace_refs(&mut self, replace: &mut dyn FnMut(&str) -> Option<SchemaNode>) {
        if let Some(replacement) = self.reference.as_deref().and_then(|r| replace(r)) {
            if self.is_bare_reference() {
                *self = replacement;
                return;
            }
            self.reference = None;
            self.all_of.insert(0, replacement);
        }
        for prop in self.properties.values_mut() {
            prop.replace_refs(replace);
        }
        if let Some(items) = &mut self.items {
            items.replace_refs(replace);
        }
        if let Some(values) = &mut self.additional_properties {
            values.replace_refs(replace);
        }
        for member in self
            .one_of
            .iter_mut()
            .chain(self.any_of.iter_mut())
            .chain(self.all_of.iter_mut())
        {
            member.replace_refs(replace);
        }
        for value in self.extensions.values_mut() {
            replace_value_refs(value, replace);
        }
    }
}

fn replace_value_refs(value: &mut Value, replace: &mut dyn FnMut(&str) -> Option<SchemaNode>) {
    let replacement = match value {
        Value::Object(map) => match map.get("$ref") {
            Some(Value::String(r)) => replace(r.as_str()),
            _ => None,
        },
        _ => None,
    };
    if let Some(node) = replacement {
        if let Ok(inline) = serde_json::to_value(node) {
            *value = inline;
            return;
        }
    }
    match value {
        Value::Object(map) => {
            for v in map.values_mut() {
                replace_value_refs(v, replace);
            }
        }
        Value::Array(items) => {
            for v in items {
                replace_value_refs(v, replace);
            }
        }
        _ => {}
    }
}

fn walk_value_refs<'a>(value: &'a Value, visit: &mut dyn FnMut(&'a str)) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("$ref", Value::String(r)) => visit(r),
                    _ => walk_value_refs(v, visit),
                }
            }
        }
        Value::Array(items) => {
            for v in items {
                walk_value_refs(v, visit);
            }
        }
        _ => {}
    }
}
