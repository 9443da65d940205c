//! Enum value lookup consumed by field resolution.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::json_type_name;

/// Read-only mapping from a type identifier to its enumerated values.
///
/// A missing entry is not an error; it means the type is not an enum.
pub trait EnumLookup: Send + Sync {
    fn enum_values(&self, type_name: &str) -> Option<&[Value]>;
}

/// The empty lookup: no type is an enum.
impl EnumLookup for () {
    fn enum_values(&self, _type_name: &str) -> Option<&[Value]> {
        None
    }
}

impl EnumLookup for HashMap<String, Vec<Value>> {
    fn enum_values(&self, type_name: &str) -> Option<&[Value]> {
        self.get(type_name).map(Vec::as_slice)
    }
}

impl EnumLookup for BTreeMap<String, Vec<Value>> {
    fn enum_values(&self, type_name: &str) -> Option<&[Value]> {
        self.get(type_name).map(Vec::as_slice)
    }
}

impl<T: EnumLookup + ?Sized> EnumLookup for &T {
    fn enum_values(&self, type_name: &str) -> Option<&[Value]> {
        (**self).enum_values(type_name)
    }
}

/// Map-backed enum lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumRegistry {
    values: BTreeMap<String, Vec<Value>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the values of an enum type, replacing any previous entry.
    pub fn insert<I, V>(&mut self, type_name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.values
            .insert(type_name.into(), values.into_iter().map(Into::into).collect());
    }

    pub fn with<I, V>(mut self, type_name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(type_name, values);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl EnumLookup for EnumRegistry {
    fn enum_values(&self, type_name: &str) -> Option<&[Value]> {
        self.values.get(type_name).map(Vec::as_slice)
    }
}

/// Build an inline enum schema, inferring `type` when all values agree.
pub fn enum_schema(values: &[Value]) -> Value {
    let mut schema = Map::new();
    if let Some(ty) = infer_enum_type(values) {
        schema.insert("type".to_string(), json!(ty));
    }
    schema.insert("enum".to_string(), Value::Array(values.to_vec()));
    Value::Object(schema)
}

fn infer_enum_type(values: &[Value]) -> Option<&'static str> {
    let first = values.first()?;
    if values.iter().all(|v| v.is_i64() || v.is_u64()) {
        return Some("integer");
    }
    if values.iter().all(Value::is_number) {
        return Some("number");
    }
    let ty = json_type_name(first);
    values
        .iter()
        .all(|v| json_type_name(v) == ty)
        .then_some(ty)
        .filter(|ty| matches!(*ty, "string" | "boolean"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_lookup_is_empty() {
        assert!(().enum_values("Status").is_none());
    }

    #[test]
    fn registry_lookup() {
        let registry = EnumRegistry::new().with("Status", ["active", "inactive"]);
        assert_eq!(
            registry.enum_values("Status"),
            Some(&[json!("active"), json!("inactive")][..])
        );
        assert!(registry.enum_values("Other").is_none());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Status"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn hash_map_lookup() {
        let mut map = HashMap::new();
        map.insert("Level".to_string(), vec![json!(1), json!(2)]);
        assert_eq!(map.enum_values("Level").map(<[Value]>::len), Some(2));
    }

    #[test]
    fn registry_deserializes_from_object() {
        let registry: EnumRegistry =
            serde_json::from_value(json!({ "Status": ["a", "b"] })).unwrap();
        assert!(registry.enum_values("Status").is_some());
    }

    #[test]
    fn enum_schema_infers_type() {
        assert_eq!(
            enum_schema(&[json!("a"), json!("b")]),
            json!({ "type": "string", "enum": ["a", "b"] })
        );
        assert_eq!(
            enum_schema(&[json!(1), json!(2)]),
            json!({ "type": "integer", "enum": [1, 2] })
        );
        assert_eq!(
            enum_schema(&[json!(1), json!(2.5)]),
            json!({ "type": "number", "enum": [1, 2.5] })
        );
        assert_eq!(
            enum_schema(&[json!(true), json!(false)]),
            json!({ "type": "boolean", "enum": [true, false] })
        );
    }

    #[test]
    fn enum_schema_mixed_values_has_no_type() {
        assert_eq!(
            enum_schema(&[json!("a"), json!(1)]),
            json!({ "enum": ["a", 1] })
        );
        assert_eq!(enum_schema(&[]), json!({ "enum": [] }));
    }
}
