//! Definitions assembly - compiles a root struct and every struct it reaches.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::Serialize;

use crate::compiler::{SchemaObject, StructSchemaCompiler};
use crate::enums::EnumLookup;
use crate::error::DefinitionsError;
use crate::types::CompileOptions;

/// Named struct descriptors available for compilation.
pub type StructCatalog = BTreeMap<String, StructSchemaCompiler>;

/// Compiled schemas keyed by struct name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Definitions {
    pub definitions: BTreeMap<String, SchemaObject>,
}

impl Definitions {
    pub fn get(&self, name: &str) -> Option<&SchemaObject> {
        self.definitions.get(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// Compile `root` and, transitively, every nested struct it references.
///
/// Each struct is compiled once, so reference cycles terminate.
///
/// # Errors
///
/// Returns `DefinitionsError::UnknownType` if `root` or a referenced struct is
/// missing from the catalog, or `DefinitionsError::Compile` if any struct fails.
pub fn build_definitions(
    root: &str,
    catalog: &StructCatalog,
    options: &CompileOptions,
    enums: &dyn EnumLookup,
) -> Result<Definitions, DefinitionsError> {
    let mut definitions = BTreeMap::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    // (type to compile, type that referenced it)
    let mut queue: VecDeque<(String, String)> = VecDeque::new();

    seen.insert(root.to_string());
    queue.push_back((root.to_string(), "<root>".to_string()));

    while let Some((name, referenced_by)) = queue.pop_front() {
        let compiler = catalog
            .get(&name)
            .ok_or_else(|| DefinitionsError::UnknownType {
                name: name.clone(),
                referenced_by,
            })?;

        let compiled = compiler
            .compile(options, enums)
            .map_err(|source| DefinitionsError::Compile {
                ty: name.clone(),
                source,
            })?;

        tracing::debug!(
            ty = %name,
            properties = compiled.schema.properties.len(),
            nested = compiled.nested_types.len(),
            "compiled struct"
        );

        for nested in compiled.nested_types {
            if seen.insert(nested.clone()) {
                queue.push_back((nested, name.clone()));
            }
        }
        definitions.insert(name, compiled.schema);
    }

    Ok(Definitions { definitions })
}
