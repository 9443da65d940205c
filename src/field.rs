//! Field resolution - converts one field descriptor into a property schema.

use serde_json::{json, Map, Value};

use crate::enums::{enum_schema, EnumLookup};
use crate::error::{FieldErrorKind, FieldResolutionError};
use crate::types::{
    CompileOptions, FieldDescriptor, Primitive, RequiredPolicy, TypeRef, Visibility,
    VisibilityFilter,
};

/// JSON pointer prefix for references to other structs.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Outcome of resolving a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldResolution {
    /// The field takes part in the schema.
    Included {
        name: String,
        schema: Value,
        required: bool,
        nested_types: Vec<String>,
    },
    /// The field is dropped (hidden by visibility or never serialized).
    Filtered,
}

/// Converts field descriptors into property schemas.
///
/// Implementations must be pure: the same inputs give the same result.
pub trait FieldResolver {
    fn resolve(
        &self,
        field: &FieldDescriptor,
        options: &CompileOptions,
        enums: &dyn EnumLookup,
    ) -> Result<FieldResolution, FieldResolutionError>;
}

impl<F> FieldResolver for F
where
    F: Fn(
        &FieldDescriptor,
        &CompileOptions,
        &dyn EnumLookup,
    ) -> Result<FieldResolution, FieldResolutionError>,
{
    fn resolve(
        &self,
        field: &FieldDescriptor,
        options: &CompileOptions,
        enums: &dyn EnumLookup,
    ) -> Result<FieldResolution, FieldResolutionError> {
        self(field, options, enums)
    }
}

/// Standard resolver: Go-style visibility and `json` tag semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFieldResolver;

impl FieldResolver for DefaultFieldResolver {
    fn resolve(
        &self,
        field: &FieldDescriptor,
        options: &CompileOptions,
        enums: &dyn EnumLookup,
    ) -> Result<FieldResolution, FieldResolutionError> {
        if field.skip {
            tracing::trace!(field = %field.name, "skipped by tag");
            return Ok(FieldResolution::Filtered);
        }
        if options.visibility == VisibilityFilter::PublicOnly
            && field.visibility == Visibility::Private
        {
            tracing::trace!(field = %field.name, "filtered: not public");
            return Ok(FieldResolution::Filtered);
        }

        let mut nested_types = Vec::new();
        let schema = type_schema(&field.ty, enums, &mut nested_types)
            .map_err(|kind| FieldResolutionError::new(&field.name, kind))?;
        let schema = annotate(schema, field);

        let required = match options.required {
            RequiredPolicy::ForceAllRequired => true,
            RequiredPolicy::RespectFieldPolicy => field.required || !field.omit_empty,
        };

        Ok(FieldResolution::Included {
            name: field.property_name().to_string(),
            schema,
            required,
            nested_types,
        })
    }
}

/// Build the schema fragment for a type, collecting referenced struct names.
pub fn type_schema(
    ty: &TypeRef,
    enums: &dyn EnumLookup,
    nested: &mut Vec<String>,
) -> Result<Value, FieldErrorKind> {
    match ty {
        TypeRef::Primitive(p) => Ok(primitive_schema(*p)),
        TypeRef::Any => Ok(json!({})),
        TypeRef::Pointer(inner) => type_schema(inner, enums, nested),
        // encoding/json writes byte slices as base64 strings.
        TypeRef::Array(item)
            if matches!(**item, TypeRef::Primitive(Primitive::Byte | Primitive::Uint8)) =>
        {
            Ok(json!({ "type": "string", "format": "byte" }))
        }
        TypeRef::Array(item) => {
            let items = type_schema(item, enums, nested)?;
            Ok(json!({ "type": "array", "items": items }))
        }
        TypeRef::Map { key, value } => {
            let key_ok = match key.strip_pointers() {
                TypeRef::Primitive(p) => p.is_map_key(),
                // Named key types are assumed to be string or integer aliases.
                TypeRef::Named(_) => true,
                _ => false,
            };
            if !key_ok {
                return Err(FieldErrorKind::UnsupportedMapKey {
                    key: key.to_string(),
                });
            }
            let values = type_schema(value, enums, nested)?;
            Ok(json!({ "type": "object", "additionalProperties": values }))
        }
        TypeRef::Named(name) => {
            if name.is_empty() {
                return Err(FieldErrorKind::EmptyTypeName);
            }
            if let Some(values) = enums.enum_values(name) {
                return Ok(enum_schema(values));
            }
            nested.push(name.clone());
            Ok(json!({ "$ref": format!("{}{}", DEFINITIONS_PREFIX, name) }))
        }
        TypeRef::Unsupported(expr) => Err(FieldErrorKind::UnsupportedType { ty: expr.clone() }),
    }
}

fn primitive_schema(p: Primitive) -> Value {
    match p {
        Primitive::String => json!({ "type": "string" }),
        Primitive::Bool => json!({ "type": "boolean" }),
        Primitive::Int
        | Primitive::Int8
        | Primitive::Int16
        | Primitive::Uint
        | Primitive::Byte
        | Primitive::Uint8
        | Primitive::Uint16 => json!({ "type": "integer" }),
        Primitive::Int32 | Primitive::Rune | Primitive::Uint32 => {
            json!({ "type": "integer", "format": "int32" })
        }
        Primitive::Int64 | Primitive::Uint64 => json!({ "type": "integer", "format": "int64" }),
        Primitive::Float32 => json!({ "type": "number", "format": "float" }),
        Primitive::Float64 => json!({ "type": "number", "format": "double" }),
        Primitive::Time => json!({ "type": "string", "format": "date-time" }),
    }
}

/// Copy description/format/example onto a fragment.
///
/// A `$ref` ignores its siblings, so annotated references are wrapped in `allOf`.
fn annotate(schema: Value, field: &FieldDescriptor) -> Value {
    let mut annotations = Map::new();
    if let Some(description) = &field.description {
        annotations.insert("description".to_string(), json!(description));
    }
    if let Some(format) = &field.format {
        annotations.insert("format".to_string(), json!(format));
    }
    if let Some(example) = &field.example {
        annotations.insert("example".to_string(), example.clone());
    }
    if annotations.is_empty() {
        return schema;
    }

    let mut map = match schema {
        Value::Object(map) => map,
        other => return other,
    };
    if map.contains_key("$ref") {
        let mut wrapped = Map::new();
        wrapped.insert("allOf".to_string(), json!([Value::Object(map)]));
        wrapped.extend(annotations);
        return Value::Object(wrapped);
    }
    map.extend(annotations);
    Value::Object(map)
}
