//! Catalog loading from JSON files and strings.
//!
//! A catalog holds struct descriptors and enum value sets:
//!
//! ```json
//! {
//!   "structs": {
//!     "User": {
//!       "fields": [
//!         { "name": "Name", "type": "string" },
//!         { "name": "Age", "type": "*int", "omitempty": true },
//!         { "name": "Status", "type": "Status", "json": "status" }
//!       ]
//!     }
//!   },
//!   "enums": { "Status": ["active", "inactive"] }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::compiler::StructSchemaCompiler;
use crate::definitions::StructCatalog;
use crate::enums::EnumRegistry;
use crate::error::LoadError;
use crate::types::{FieldDescriptor, TypeRef, Visibility};

/// Struct descriptors plus the enum values they may refer to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub structs: StructCatalog,
    pub enums: EnumRegistry,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    #[serde(default)]
    structs: BTreeMap<String, RawStruct>,
    #[serde(default)]
    enums: EnumRegistry,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStruct {
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    ty: TypeRef,
    visibility: Option<Visibility>,
    json: Option<String>,
    #[serde(default)]
    omitempty: bool,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    skip: bool,
    description: Option<String>,
    format: Option<String>,
    example: Option<Value>,
}

impl From<RawField> for FieldDescriptor {
    fn from(raw: RawField) -> Self {
        let mut field = FieldDescriptor::new(raw.name, raw.ty)
            .omit_empty(raw.omitempty)
            .required(raw.required)
            .skip(raw.skip);
        if let Some(visibility) = raw.visibility {
            field.visibility = visibility;
        }
        field.json_name = raw.json;
        field.description = raw.description;
        field.format = raw.format;
        field.example = raw.example;
        field
    }
}

impl From<RawCatalog> for Catalog {
    fn from(raw: RawCatalog) -> Self {
        let structs = raw
            .structs
            .into_iter()
            .map(|(name, s)| {
                let fields = s.fields.into_iter().map(FieldDescriptor::from).collect();
                (name, StructSchemaCompiler::new(fields))
            })
            .collect();
        Catalog {
            structs,
            enums: raw.enums,
        }
    }
}

/// Load a catalog from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// or `LoadError::InvalidJson` if the file isn't a valid catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    let catalog = load_catalog_str(&content)?;
    tracing::debug!(
        path = %path.display(),
        structs = catalog.structs.len(),
        enums = catalog.enums.len(),
        "loaded catalog"
    );
    Ok(catalog)
}

/// Load a catalog from a JSON string.
///
/// # Errors
///
/// Returns `LoadError::InvalidJson` if the string isn't a valid catalog,
/// including malformed type expressions.
pub fn load_catalog_str(content: &str) -> Result<Catalog, LoadError> {
    let raw: RawCatalog =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;
    Ok(raw.into())
}
