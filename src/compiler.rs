//! Struct schema compilation - assembles field fragments into one object schema.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::EnumLookup;
use crate::error::StructCompilationError;
use crate::field::{DefaultFieldResolver, FieldResolution, FieldResolver};
use crate::types::{CompileOptions, FieldDescriptor, RequiredPolicy};

/// Object schema for one struct.
///
/// Serializes as `{"type": "object", "properties": {...}, "required": [...]}`;
/// `required` is left out when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaObject {
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Property fragments in first-insertion order.
    pub properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl SchemaObject {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Map::new(),
            required: Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        // Serializing a map of JSON values cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for SchemaObject {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of compiling one struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStruct {
    pub schema: SchemaObject,
    /// Referenced struct names, deduplicated and sorted.
    #[serde(rename = "nested")]
    pub nested_types: Vec<String>,
}

/// Compiles the fields of exactly one struct into a [`SchemaObject`].
///
/// # Example
///
/// ```
/// use struct_schema::{CompileOptions, FieldDescriptor, Primitive, StructSchemaCompiler};
///
/// let compiler = StructSchemaCompiler::new(vec![
///     FieldDescriptor::new("Name", Primitive::String),
///     FieldDescriptor::new("Age", Primitive::Int).omit_empty(true),
///     FieldDescriptor::new("internal", Primitive::String),
/// ]);
///
/// let compiled = compiler.compile(&CompileOptions::new().public_only(true), &()).unwrap();
/// assert_eq!(compiled.schema.required, vec!["Name"]);
/// assert!(compiled.schema.properties.get("internal").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructSchemaCompiler {
    fields: Vec<FieldDescriptor>,
}

impl StructSchemaCompiler {
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Compile with the [`DefaultFieldResolver`].
    ///
    /// # Errors
    ///
    /// Returns `StructCompilationError` naming the first field whose type cannot
    /// be converted. No partial schema is returned.
    pub fn compile(
        &self,
        options: &CompileOptions,
        enums: &dyn EnumLookup,
    ) -> Result<CompiledStruct, StructCompilationError> {
        self.compile_with(&DefaultFieldResolver, options, enums)
    }

    /// Compile with a caller-supplied resolver.
    pub fn compile_with<R: FieldResolver + ?Sized>(
        &self,
        resolver: &R,
        options: &CompileOptions,
        enums: &dyn EnumLookup,
    ) -> Result<CompiledStruct, StructCompilationError> {
        let mut schema = SchemaObject::new();
        let mut required: Vec<String> = Vec::new();
        let mut nested: BTreeSet<String> = BTreeSet::new();

        for field in &self.fields {
            let resolution = resolver.resolve(field, options, enums).map_err(|source| {
                tracing::debug!(field = %field.name, error = %source, "field resolution failed");
                StructCompilationError {
                    field: field.name.clone(),
                    source,
                }
            })?;

            let FieldResolution::Included {
                name,
                schema: property,
                required: field_required,
                nested_types,
            } = resolution
            else {
                continue;
            };

            tracing::trace!(field = %field.name, property = %name, "resolved field");

            // Last writer wins, including its required status.
            if schema.properties.insert(name.clone(), property).is_some() {
                tracing::debug!(property = %name, "property name collision, overwriting");
                required.retain(|r| r != &name);
            }

            if options.required == RequiredPolicy::ForceAllRequired || field_required {
                required.push(name);
            }

            nested.extend(nested_types);
        }

        schema.required = required;

        Ok(CompiledStruct {
            schema,
            nested_types: nested.into_iter().collect(),
        })
    }
}

impl From<Vec<FieldDescriptor>> for StructSchemaCompiler {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        Self::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FieldErrorKind, FieldResolutionError};
    use crate::types::{Primitive, TypeRef};
    use serde_json::json;

    fn sample() -> StructSchemaCompiler {
        StructSchemaCompiler::new(vec![
            FieldDescriptor::new("Name", Primitive::String).required(true),
            FieldDescriptor::new("Age", Primitive::Int).omit_empty(true),
            FieldDescriptor::new("internal", Primitive::String),
        ])
    }

    #[test]
    fn empty_struct() {
        let compiled = StructSchemaCompiler::default()
            .compile(&CompileOptions::new(), &())
            .unwrap();
        assert_eq!(compiled.schema.schema_type, "object");
        assert!(compiled.schema.properties.is_empty());
        assert!(compiled.schema.required.is_empty());
        assert!(compiled.nested_types.is_empty());
        assert_eq!(
            compiled.schema.to_value(),
            json!({ "type": "object", "properties": {} })
        );
    }

    #[test]
    fn respects_field_policy() {
        let options = CompileOptions::new().public_only(true);
        let compiled = sample().compile(&options, &()).unwrap();

        let names: Vec<&str> = compiled.schema.properties.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["Name", "Age"]);
        assert_eq!(compiled.schema.required, vec!["Name"]);
        assert!(compiled.nested_types.is_empty());
    }

    #[test]
    fn force_required_marks_all_included() {
        let options = CompileOptions::new().public_only(true).force_required(true);
        let compiled = sample().compile(&options, &()).unwrap();
        assert_eq!(compiled.schema.required, vec!["Name", "Age"]);
    }

    #[test]
    fn force_required_overrides_resolver() {
        // Resolver that never reports a field as required.
        let resolver = |field: &FieldDescriptor,
                        _: &CompileOptions,
                        _: &dyn EnumLookup|
         -> Result<FieldResolution, FieldResolutionError> {
            Ok(FieldResolution::Included {
                name: field.name.clone(),
                schema: json!({}),
                required: false,
                nested_types: vec![],
            })
        };
        let options = CompileOptions::new().force_required(true);
        let compiled = sample().compile_with(&resolver, &options, &()).unwrap();
        assert_eq!(compiled.schema.required, vec!["Name", "Age", "internal"]);
    }

    #[test]
    fn collision_last_writer_wins() {
        let compiler = StructSchemaCompiler::new(vec![
            FieldDescriptor::new("ID", Primitive::String).json_name("id"),
            FieldDescriptor::new("Other", Primitive::Int)
                .json_name("id")
                .omit_empty(true),
        ]);
        let compiled = compiler.compile(&CompileOptions::new(), &()).unwrap();
        assert_eq!(compiled.schema.properties.len(), 1);
        assert_eq!(compiled.schema.properties["id"], json!({ "type": "integer" }));
        assert!(compiled.schema.required.is_empty());
    }

    #[test]
    fn collision_required_appears_once() {
        let compiler = StructSchemaCompiler::new(vec![
            FieldDescriptor::new("A", Primitive::String).json_name("x"),
            FieldDescriptor::new("B", Primitive::String),
            FieldDescriptor::new("C", Primitive::Bool).json_name("x"),
        ]);
        let compiled = compiler.compile(&CompileOptions::new(), &()).unwrap();
        assert_eq!(compiled.schema.required, vec!["B", "x"]);
        assert_eq!(compiled.schema.properties["x"], json!({ "type": "boolean" }));
    }

    #[test]
    fn nested_types_deduplicated_and_sorted() {
        let compiler = StructSchemaCompiler::new(vec![
            FieldDescriptor::new("Owner", TypeRef::named("User")),
            FieldDescriptor::new("Tags", "[]Tag".parse::<TypeRef>().unwrap()),
            FieldDescriptor::new("Editors", "[]*User".parse::<TypeRef>().unwrap()),
            FieldDescriptor::new("Address", TypeRef::named("Address")),
        ]);
        let compiled = compiler.compile(&CompileOptions::new(), &()).unwrap();
        assert_eq!(compiled.nested_types, vec!["Address", "Tag", "User"]);
    }

    #[test]
    fn failure_names_field_and_discards_partial_schema() {
        let compiler = StructSchemaCompiler::new(vec![
            FieldDescriptor::new("Name", Primitive::String),
            FieldDescriptor::new("Handler", TypeRef::Unsupported("func()".into())),
            FieldDescriptor::new("Age", Primitive::Int),
        ]);
        let err = compiler.compile(&CompileOptions::new(), &()).unwrap_err();
        assert_eq!(err.field, "Handler");
        assert_eq!(
            err.source.kind,
            FieldErrorKind::UnsupportedType {
                ty: "func()".into()
            }
        );
    }

    #[test]
    fn filtered_fields_contribute_nothing() {
        let compiler = StructSchemaCompiler::new(vec![
            FieldDescriptor::new("secret", TypeRef::named("Vault")),
            FieldDescriptor::new("Hidden", TypeRef::named("Vault")).skip(true),
        ]);
        let compiled = compiler
            .compile(&CompileOptions::new().public_only(true), &())
            .unwrap();
        let empty = StructSchemaCompiler::default()
            .compile(&CompileOptions::new(), &())
            .unwrap();
        assert_eq!(compiled, empty);
    }

    #[test]
    fn schema_object_serialization() {
        let compiled = sample()
            .compile(&CompileOptions::new().public_only(true), &())
            .unwrap();
        assert_eq!(
            serde_json::to_string(&compiled.schema).unwrap(),
            r#"{"type":"object","properties":{"Name":{"type":"string"},"Age":{"type":"integer"}},"required":["Name"]}"#
        );
    }
}
