#![deny(missing_docs)]

//! # Schema Registry
//!
//! Turns `TypeDescriptor`s into normalized component schemas.
//!
//! Types are first *declared* (made known to the registry) and then *registered*
//! lazily the first time something references them. Registration inserts a
//! placeholder before building, so a type that is referenced again while it is
//! still being built (a cycle) resolves to a plain `$ref` and recursion stops.
//! The placeholder also fixes the entry's position: schemas keep the order in
//! which registration started.

use crate::error::{AppError, AppResult};
use crate::oas::models::{FieldDescriptor, SchemaSource, TypeDescriptor, TypeKind, TypeRef};
use crate::oas::normalization::{normalize_nullable_refs, normalize_raw_schema};
use crate::oas::ref_utils::schema_name_from_ref;
use crate::oas::resolver::types::{excluded_type_schema, scalar_schema, BUILTIN_VALUE_TYPES};
use crate::oas::schema::{CompositionKind, PrimitiveType, SchemaKind, SchemaNode};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

/// Predicate deciding whether a type name may become a component schema.
pub type TypeFilter = Box<dyn Fn(&str) -> bool>;

/// Registry of component schemas for one generation run.
pub struct SchemaRegistry {
    catalog: IndexMap<String, TypeDescriptor>,
    schemas: IndexMap<String, SchemaNode>,
    building: IndexSet<String>,
    filter: TypeFilter,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("catalog", &self.catalog.keys().collect::<Vec<_>>())
            .field("schemas", &self.schemas.keys().collect::<Vec<_>>())
            .field("building", &self.building)
            .finish()
    }
}

impl SchemaRegistry {
    /// Creates a registry that keeps the built-in value types out of the schema set.
    pub fn new() -> Self {
        Self::with_excluded(std::iter::empty::<String>())
    }

    /// Creates a registry rejecting the built-in value types plus `excluded`.
    pub fn with_excluded<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rejected: HashSet<String> = BUILTIN_VALUE_TYPES
            .iter()
            .map(|s| s.to_string())
            .chain(excluded.into_iter().map(Into::into))
            .collect();
        Self::with_filter(Box::new(move |name| !rejected.contains(name)))
    }

    /// Creates a registry with a custom filter. Names for which `filter`
    /// returns false are never registered.
    pub fn with_filter(filter: TypeFilter) -> Self {
        Self {
            catalog: IndexMap::new(),
            schemas: IndexMap::new(),
            building: IndexSet::new(),
            filter,
        }
    }

    /// Makes a type known without building it. The first descriptor under a
    /// name wins.
    pub fn declare(&mut self, descriptor: TypeDescriptor) {
        match self.catalog.get(&descriptor.name) {
            Some(existing) if *existing != descriptor => {
                tracing::warn!(
                    type_name = %descriptor.name,
                    "Ignoring a second, differing descriptor for an already declared type"
                );
            }
            Some(_) => {}
            None => {
                self.catalog.insert(descriptor.name.clone(), descriptor);
            }
        }
    }

    /// Declares every descriptor of `descriptors`.
    pub fn declare_all<I: IntoIterator<Item = TypeDescriptor>>(&mut self, descriptors: I) {
        for descriptor in descriptors {
            self.declare(descriptor);
        }
    }

    /// Registers a type and returns its schema name.
    ///
    /// Returns `Ok(None)` when the filter rejects the name. Registering an
    /// already built name returns it unchanged.
    pub fn register(&mut self, descriptor: &TypeDescriptor) -> AppResult<Option<String>> {
        if !self.accepts(&descriptor.name) {
            tracing::debug!(type_name = %descriptor.name, "Type excluded from schema set");
            return Ok(None);
        }
        self.declare(descriptor.clone());
        self.register_name(&descriptor.name, &descriptor.name)
    }

    /// Registers a declared type by name.
    ///
    /// Returns `Ok(None)` without touching the registry when the filter
    /// rejects the name.
    pub fn register_name(&mut self, name: &str, referenced_by: &str) -> AppResult<Option<String>> {
        if !self.accepts(name) {
            tracing::debug!(type_name = %name, "Type excluded from schema set");
            return Ok(None);
        }
        if self.building.contains(name) {
            tracing::debug!(type_name = %name, "Cycle detected, emitting reference");
            return Ok(Some(name.to_string()));
        }
        if self.schemas.contains_key(name) {
            return Ok(Some(name.to_string()));
        }

        let descriptor =
            self.catalog
                .get(name)
                .cloned()
                .ok_or_else(|| AppError::UnresolvedType {
                    name: name.to_string(),
                    referenced_by: referenced_by.to_string(),
                })?;

        self.building.insert(name.to_string());
        self.schemas.insert(name.to_string(), SchemaNode::default());

        let built = self.build(&descriptor);
        self.building.shift_remove(name);

        match built {
            Ok(node) => {
                tracing::debug!(type_name = %name, "Registered schema");
                self.schemas.insert(name.to_string(), node);
                Ok(Some(name.to_string()))
            }
            Err(e) => {
                self.schemas.shift_remove(name);
                Err(e)
            }
        }
    }

    /// Returns a `$ref` node for `name`, registering it on first use.
    ///
    /// Names the filter rejects are inlined through the scalar table instead.
    pub fn reference(&mut self, name: &str, referenced_by: &str) -> AppResult<SchemaNode> {
        if self.accepts(name) && !self.catalog.contains_key(name) && !self.schemas.contains_key(name) {
            if let Some(node) = scalar_schema(name) {
                return Ok(node);
            }
        }
        Ok(match self.register_name(name, referenced_by)? {
            Some(registered) => SchemaNode::reference_to(&registered),
            None => excluded_type_schema(name),
        })
    }

    /// All registered schemas in registration order.
    pub fn schemas(&self) -> &IndexMap<String, SchemaNode> {
        &self.schemas
    }

    /// A registered schema.
    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.schemas.get(name)
    }

    /// A declared descriptor.
    pub fn descriptor(&self, name: &str) -> Option<&TypeDescriptor> {
        self.catalog.get(name)
    }

    /// Whether the filter lets `name` into the schema set.
    pub fn accepts(&self, name: &str) -> bool {
        (self.filter)(name)
    }

    /// The object descriptor behind a `TypeRef::Named`, if any.
    pub fn object_descriptor(&self, ty: &TypeRef) -> Option<&TypeDescriptor> {
        ty.type_name()
            .filter(|name| self.accepts(name))
            .and_then(|name| self.catalog.get(name))
            .filter(|desc| desc.kind == TypeKind::Object)
    }

    /// Resolves any type mention into a schema node.
    pub fn schema_for(&mut self, ty: &TypeRef, referenced_by: &str) -> AppResult<SchemaNode> {
        match ty {
            TypeRef::Scalar(name) => scalar_schema(name).ok_or_else(|| AppError::UnresolvedType {
                name: name.clone(),
                referenced_by: referenced_by.to_string(),
            }),
            TypeRef::Named(name) => self.reference(name, referenced_by),
            TypeRef::Array(inner) => Ok(SchemaNode::array_of(
                self.schema_for(inner, referenced_by)?,
            )),
            TypeRef::Map(inner) => Ok(SchemaNode::map_of(self.schema_for(inner, referenced_by)?)),
            TypeRef::OneOf(sources) => self.compose(CompositionKind::OneOf, sources, referenced_by),
            TypeRef::AnyOf(sources) => self.compose(CompositionKind::AnyOf, sources, referenced_by),
            TypeRef::AllOf(sources) => self.compose(CompositionKind::AllOf, sources, referenced_by),
            TypeRef::Inline(node) => self.adopt(node.clone(), referenced_by),
        }
    }

    /// Builds a composition node from heterogeneous sources.
    ///
    /// Nested compositions of the same kind are flattened, repeated members
    /// dropped and a single remaining member returned as is.
    pub fn compose(
        &mut self,
        kind: CompositionKind,
        sources: &[SchemaSource],
        referenced_by: &str,
    ) -> AppResult<SchemaNode> {
        let members = self.resolve_members(kind, sources, referenced_by)?;
        Ok(collapse(kind, members))
    }

    /// Builds the composition node for already resolved members.
    pub fn compose_nodes(kind: CompositionKind, nodes: Vec<SchemaNode>) -> SchemaNode {
        let mut members = Vec::new();
        for node in nodes {
            push_member(kind, &mut members, node);
        }
        collapse(kind, members)
    }

    /// Resolves one field of an object type.
    pub fn field_schema(&mut self, field: &FieldDescriptor, owner: &str) -> AppResult<SchemaNode> {
        let base = match field.upload {
            Some(marker) if marker.multiple => SchemaNode::array_of(SchemaNode::binary()),
            Some(_) => SchemaNode::binary(),
            None => self.schema_for(&field.ty, owner)?,
        };

        let mut node = decorate(base, field);
        if let Some(default) = &field.default {
            node.default = Some(default.clone());
        }
        if field.nullable {
            node = node.into_nullable();
        }
        Ok(node)
    }

    /// Parses a raw schema map and makes every component it references known.
    pub fn inline_source(
        &mut self,
        raw: &serde_json::Map<String, Value>,
        referenced_by: &str,
    ) -> AppResult<SchemaNode> {
        let mut value = Value::Object(raw.clone());
        normalize_raw_schema(&mut value);
        let node: SchemaNode = serde_json::from_value(value)?;
        self.adopt(node, referenced_by)
    }

    /// Normalizes a caller-supplied node and registers the types it points to.
    ///
    /// References to names the filter rejects are replaced by the same inline
    /// schema `reference` would produce for them.
    pub fn adopt(&mut self, mut node: SchemaNode, referenced_by: &str) -> AppResult<SchemaNode> {
        normalize_nullable_refs(&mut node);

        let filter = &self.filter;
        node.replace_refs(&mut |r| {
            schema_name_from_ref(r)
                .filter(|name| !filter(name.as_str()))
                .map(|name| excluded_type_schema(&name))
        });

        let mut names = Vec::new();
        node.walk_refs(&mut |r| {
            if let Some(name) = schema_name_from_ref(r) {
                names.push(name);
            }
        });
        for name in names {
            self.register_name(&name, referenced_by)?;
        }
        Ok(node)
    }

    fn resolve_members(
        &mut self,
        kind: CompositionKind,
        sources: &[SchemaSource],
        referenced_by: &str,
    ) -> AppResult<Vec<SchemaNode>> {
        let mut members = Vec::new();
        for source in sources {
            let node = match source {
                SchemaSource::Node(node) => self.adopt(node.clone(), referenced_by)?,
                SchemaSource::Type(name) => self.reference(name, referenced_by)?,
                SchemaSource::Inline(raw) => self.inline_source(raw, referenced_by)?,
            };
            push_member(kind, &mut members, node);
        }
        Ok(members)
    }

    fn build(&mut self, descriptor: &TypeDescriptor) -> AppResult<SchemaNode> {
        let name = descriptor.name.as_str();
        let mut node = match descriptor.kind {
            TypeKind::Enum => enum_schema(&descriptor.enum_values),
            TypeKind::Scalar => {
                scalar_schema(name).unwrap_or_else(|| SchemaNode::primitive(PrimitiveType::String))
            }
            TypeKind::Array => {
                let items = match &descriptor.items {
                    Some(items) => self.schema_for(items, name)?,
                    None => SchemaNode::default(),
                };
                SchemaNode::array_of(items)
            }
            TypeKind::Object => self.build_object(descriptor)?,
        };

        if let Some(description) = &descriptor.description {
            node.description = Some(description.clone());
        }
        node.deprecated |= descriptor.deprecated;
        Ok(node)
    }

    fn build_object(&mut self, descriptor: &TypeDescriptor) -> AppResult<SchemaNode> {
        let name = descriptor.name.as_str();
        let mut own = SchemaNode::object();
        for field in &descriptor.fields {
            let prop = self.field_schema(field, name)?;
            own = own.with_property(field.name.clone(), prop, field.is_required());
        }

        let mut node = if descriptor.all_of.is_empty() {
            own
        } else {
            let mut parts = self.resolve_members(CompositionKind::AllOf, &descriptor.all_of, name)?;
            if !own.properties.is_empty() {
                push_member(CompositionKind::AllOf, &mut parts, own);
            }
            collapse(CompositionKind::AllOf, parts)
        };

        for (kind, sources) in [
            (CompositionKind::OneOf, &descriptor.one_of),
            (CompositionKind::AnyOf, &descriptor.any_of),
        ] {
            if sources.is_empty() {
                continue;
            }
            let members = self.resolve_members(kind, sources, name)?;
            if node == SchemaNode::object() {
                node = collapse(kind, members);
            } else {
                node.members_mut(kind).extend(members);
            }
        }
        Ok(node)
    }
}

/// Enumerations are `integer` when every case is an integer, otherwise `string`.
fn enum_schema(values: &[Value]) -> SchemaNode {
    let all_integers = !values.is_empty() && values.iter().all(|v| v.is_i64() || v.is_u64());
    let schema_type = if all_integers {
        PrimitiveType::Integer
    } else {
        PrimitiveType::String
    };
    SchemaNode {
        enum_values: values.to_vec(),
        ..SchemaNode::primitive(schema_type)
    }
}

/// Copies field-level annotations onto the node. A `$ref` cannot carry
/// siblings, so a referenced type with annotations is wrapped in `allOf`.
fn decorate(base: SchemaNode, field: &FieldDescriptor) -> SchemaNode {
    let c = &field.constraints;
    let annotated = field.description.is_some()
        || field.example.is_some()
        || field.format.is_some()
        || field.deprecated
        || field.default.is_some()
        || c.minimum.is_some()
        || c.maximum.is_some()
        || c.min_length.is_some()
        || c.max_length.is_some()
        || c.pattern.is_some();
    if !annotated {
        return base;
    }

    let mut node = if base.kind() == SchemaKind::Reference {
        SchemaNode::composition(CompositionKind::AllOf, vec![base])
    } else {
        base
    };
    if field.description.is_some() {
        node.description = field.description.clone();
    }
    if field.example.is_some() {
        node.example = field.example.clone();
    }
    if field.format.is_some() {
        node.format = field.format.clone();
    }
    node.deprecated |= field.deprecated;
    node.minimum = c.minimum.or(node.minimum);
    node.maximum = c.maximum.or(node.maximum);
    node.min_length = c.min_length.or(node.min_length);
    node.max_length = c.max_length.or(node.max_length);
    if c.pattern.is_some() {
        node.pattern = c.pattern.clone();
    }
    node
}

/// Appends `node`, splicing in the members of a same-kind composition that
/// carries nothing else, and skipping duplicates.
fn push_member(kind: CompositionKind, members: &mut Vec<SchemaNode>, node: SchemaNode) {
    let nested = node.members(kind);
    if !nested.is_empty() && node == SchemaNode::composition(kind, nested.to_vec()) {
        for inner in nested.to_vec() {
            push_member(kind, members, inner);
        }
        return;
    }
    if !members.contains(&node) {
        members.push(node);
    }
}

fn collapse(kind: CompositionKind, mut members: Vec<SchemaNode>) -> SchemaNode {
    match members.len() {
        0 => SchemaNode::default(),
        1 => members.remove(0),
        _ => SchemaNode::composition(kind, members),
    }
}
