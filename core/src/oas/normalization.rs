#![deny(missing_docs)]

//! # Schema Normalization
//!
//! Helpers that bring caller-supplied inline schemas into the OpenAPI 3.0 shape
//! the rest of the generator emits.
//!
//! - Raw maps: boolean schemas, `x-nullable`, `const` and 3.1 `type: [T, "null"]`
//!   unions are rewritten before deserializing into a `SchemaNode`.
//! - Nodes: a `$ref` marked nullable is rewritten into `{oneOf: [ref], nullable: true}`.

use crate::oas::schema::SchemaNode;
use serde_json::{Map, Value};

/// Rewrites a raw JSON schema into its OpenAPI 3.0 equivalent, in place.
pub(crate) fn normalize_raw_schema(value: &mut Value) {
    match value {
        Value::Bool(true) => *value = Value::Object(Map::new()),
        Value::Bool(false) => {
            *value = serde_json::json!({ "not": {} });
        }
        Value::Object(map) => {
            normalize_nullable_keywords(map);
            normalize_const(map);

            for (key, v) in map.iter_mut() {
                match key.as_str() {
                    "properties" => {
                        if let Value::Object(props) = v {
                            for prop in props.values_mut() {
                                normalize_raw_schema(prop);
                            }
                        }
                    }
                    "items" | "not" => normalize_raw_schema(v),
                    "additionalProperties" if !v.is_boolean() => normalize_raw_schema(v),
                    "oneOf" | "anyOf" | "allOf" => {
                        if let Value::Array(members) = v {
                            for member in members.iter_mut() {
                                normalize_raw_schema(member);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Rewrites every nullable `$ref` inside `node` into the `oneOf` wrapper form.
pub(crate) fn normalize_nullable_refs(node: &mut SchemaNode) {
    for prop in node.properties.values_mut() {
        normalize_nullable_refs(prop);
    }
    if let Some(items) = node.items.as_mut() {
        normalize_nullable_refs(items);
    }
    if let Some(values) = node.additional_properties.as_mut() {
        normalize_nullable_refs(values);
    }
    for member in node
        .one_of
        .iter_mut()
        .chain(node.any_of.iter_mut())
        .chain(node.all_of.iter_mut())
    {
        normalize_nullable_refs(member);
    }

    if node.nullable && node.reference.is_some() {
        let mut inner = std::mem::take(node);
        inner.nullable = false;
        *node = inner.into_nullable();
    }
}

fn normalize_nullable_keywords(map: &mut Map<String, Value>) {
    if let Some(flag) = map.remove("x-nullable") {
        if flag.as_bool() == Some(true) {
            map.insert("nullable".to_string(), Value::Bool(true));
        }
    }

    let Some(Value::Array(types)) = map.get("type") else {
        return;
    };
    let has_null = types.iter().any(|t| t.as_str() == Some("null"));
    let rest: Vec<Value> = types
        .iter()
        .filter(|t| t.as_str() != Some("null"))
        .cloned()
        .collect();

    match rest.as_slice() {
        [single] => {
            map.insert("type".to_string(), single.clone());
        }
        [] => {
            map.remove("type");
        }
        _ => {
            let members: Vec<Value> = rest
                .into_iter()
                .map(|t| serde_json::json!({ "type": t }))
                .collect();
            map.remove("type");
            map.insert("oneOf".to_string(), Value::Array(members));
        }
    }
    if has_null {
        map.insert("nullable".to_string(), Value::Bool(true));
    }
}

fn normalize_const(map: &mut Map<String, Value>) {
    if let Some(const_val) = map.remove("const") {
        if !map.contains_key("enum") {
            map.insert("enum".to_string(), Value::Array(vec![const_val.clone()]));
        }
        if !map.contains_key("type") {
            if let Some(type_name) = infer_schema_type(&const_val) {
                map.insert("type".to_string(), Value::String(type_name.to_string()));
            }
        }
    }
}

fn infer_schema_type(value: &Value) -> Option<&'static str> {
    match value {
        Value::String(_) => Some("string"),
        Value::Bool(_) => Some("boolean"),
        Value::Number(num) => {
            if num.is_i64() || num.is_u64() {
                Some("integer")
            } else {
                Some("number")
            }
        }
        Value::Array(_) => Some("array"),
        Value::Object(_) => Some("object"),
        Value::Null => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_null_union_becomes_nullable() {
        let mut value = json!({"type": ["string", "null"], "format": "email"});
        normalize_raw_schema(&mut value);
        assert_eq!(value, json!({"type": "string", "format": "email", "nullable": true}));
    }

    #[test]
    fn test_x_nullable_and_const() {
        let mut value = json!({"x-nullable": true, "const": 3});
        normalize_raw_schema(&mut value);
        assert_eq!(value["nullable"], json!(true));
        assert_eq!(value["enum"], json!([3]));
        assert_eq!(value["type"], json!("integer"));
    }

    #[test]
    fn test_boolean_schemas_in_properties() {
        let mut value = json!({"type": "object", "properties": {"any": true, "never": false}});
        normalize_raw_schema(&mut value);
        assert_eq!(value["properties"]["any"], json!({}));
        assert_eq!(value["properties"]["never"], json!({"not": {}}));
    }

    #[test]
    fn test_nested_nullable_ref_is_wrapped() {
        let raw = json!({
            "type": "object",
            "properties": {
                "owner": {"$ref": "#/components/schemas/User", "nullable": true}
            }
        });
        let mut node: SchemaNode = serde_json::from_value(raw).unwrap();
        normalize_nullable_refs(&mut node);

        let owner = &node.properties["owner"];
        assert!(owner.reference.is_none());
        assert!(owner.nullable);
        assert_eq!(owner.one_of, vec![SchemaNode::reference_to("User")]);
    }
}
