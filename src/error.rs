//! Error types for struct schema compilation and catalog loading.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single field could not be converted to a schema fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    #[error("unsupported type {ty}")]
    UnsupportedType { ty: String },

    #[error("unsupported map key type {key}: JSON object keys must be strings or integers")]
    UnsupportedMapKey { key: String },

    #[error("empty type name")]
    EmptyTypeName,
}

/// A field's type could not be converted to a schema fragment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct FieldResolutionError {
    pub field: String,
    pub kind: FieldErrorKind,
}

impl FieldResolutionError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            field: field.into(),
            kind,
        }
    }
}

/// Compilation of a struct aborted on a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to build schema for field {field}: {source}")]
pub struct StructCompilationError {
    /// Declared name of the offending field.
    pub field: String,
    #[source]
    pub source: FieldResolutionError,
}

/// Invalid type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid type expression \"{input}\" at offset {position}: {message}")]
pub struct TypeParseError {
    pub input: String,
    pub position: usize,
    pub message: String,
}

/// Errors while loading a struct catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid catalog: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            LoadError::InvalidJson { .. } => 2,
        }
    }
}

/// Errors while assembling definitions for a root struct and its nested types.
#[derive(Debug, Error)]
pub enum DefinitionsError {
    #[error("unknown type {name} referenced by {referenced_by}")]
    UnknownType { name: String, referenced_by: String },

    #[error("cannot compile {ty}: {source}")]
    Compile {
        ty: String,
        #[source]
        source: StructCompilationError,
    },
}

impl DefinitionsError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compilation_error_names_field() {
        let err = StructCompilationError {
            field: "Callback".into(),
            source: FieldResolutionError::new(
                "Callback",
                FieldErrorKind::UnsupportedType {
                    ty: "func()".into(),
                },
            ),
        };
        assert_eq!(
            err.to_string(),
            "failed to build schema for field Callback: unsupported type func()"
        );

        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "unsupported type func()");
    }

    #[test]
    fn load_error_exit_codes() {
        let err = LoadError::FileNotFound {
            path: PathBuf::from("catalog.json"),
        };
        assert_eq!(err.exit_code(), 3);

        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = LoadError::InvalidJson { source };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn definitions_error_exit_code() {
        let err = DefinitionsError::UnknownType {
            name: "Address".into(),
            referenced_by: "User".into(),
        };
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "unknown type Address referenced by User");
    }

    #[test]
    fn type_parse_error_display() {
        let err = TypeParseError {
            input: "[x]int".into(),
            position: 1,
            message: "expected ']'".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid type expression \"[x]int\" at offset 1: expected ']'"
        );
    }
}
