//! Struct Schema Compiler
//!
//! Compiles struct field descriptors into JSON/OpenAPI object schemas.
//!
//! Each struct is compiled on its own: the compiler returns the struct's object
//! schema together with the names of the nested structs it references, and the
//! caller decides how to compile those (see [`build_definitions`]).
//!
//! # Example
//!
//! ```
//! use struct_schema::{CompileOptions, FieldDescriptor, Primitive, StructSchemaCompiler, TypeRef};
//! use serde_json::json;
//!
//! let compiler = StructSchemaCompiler::new(vec![
//!     FieldDescriptor::new("Name", Primitive::String),
//!     FieldDescriptor::new("Age", Primitive::Int).omit_empty(true),
//!     FieldDescriptor::new("Address", TypeRef::named("Address")),
//! ]);
//!
//! let options = CompileOptions::new().public_only(true);
//! let compiled = compiler.compile(&options, &()).unwrap();
//!
//! assert_eq!(compiled.schema.required, vec!["Name", "Address"]);
//! assert_eq!(compiled.nested_types, vec!["Address"]);
//! assert_eq!(
//!     compiled.schema.properties["Address"],
//!     json!({ "$ref": "#/definitions/Address" })
//! );
//! ```
//!
//! # Required Rules
//!
//! | Policy | Field | In `required` |
//! |--------|-------|---------------|
//! | `RespectFieldPolicy` | plain | yes |
//! | `RespectFieldPolicy` | `omitempty` | no |
//! | `RespectFieldPolicy` | `omitempty` + `required` | yes |
//! | `ForceAllRequired` | any included | yes |
//!
//! Filtered fields (private under `PublicOnly`, or `skip`) never appear.

mod compiler;
mod definitions;
mod enums;
mod error;
mod field;
mod loader;
mod types;

pub use compiler::{CompiledStruct, SchemaObject, StructSchemaCompiler};
pub use definitions::{build_definitions, Definitions, StructCatalog};
pub use enums::{enum_schema, EnumLookup, EnumRegistry};
pub use error::{
    DefinitionsError, FieldErrorKind, FieldResolutionError, LoadError, StructCompilationError,
    TypeParseError,
};
pub use field::{type_schema, DefaultFieldResolver, FieldResolution, FieldResolver, DEFINITIONS_PREFIX};
pub use loader::{load_catalog, load_catalog_str, Catalog};
pub use types::{
    json_type_name, CompileOptions, FieldDescriptor, Primitive, RequiredPolicy, TypeRef,
    Visibility, VisibilityFilter,
};
