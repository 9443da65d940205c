//! Core types for struct schema compilation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TypeParseError;

/// Returns the JSON type name for a value.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Visibility classification of a struct member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

impl Visibility {
    /// Derive visibility from a member name: an uppercase first letter is public.
    pub fn from_name(name: &str) -> Self {
        if name.chars().next().is_some_and(char::is_uppercase) {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }
}

/// Which fields take part in compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisibilityFilter {
    /// Every field, regardless of visibility.
    #[default]
    All,
    /// Private fields are filtered out.
    PublicOnly,
}

/// How the required list is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RequiredPolicy {
    /// A field is required only when its resolver says so.
    #[default]
    RespectFieldPolicy,
    /// Every included field is required, ignoring `omitempty`.
    ForceAllRequired,
}

/// Options for schema compilation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub visibility: VisibilityFilter,
    pub required: RequiredPolicy,
}

impl CompileOptions {
    /// Options that include every field and respect per-field required-ness.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict compilation to public fields.
    pub fn public_only(mut self, public_only: bool) -> Self {
        self.visibility = if public_only {
            VisibilityFilter::PublicOnly
        } else {
            VisibilityFilter::All
        };
        self
    }

    /// Mark every included field as required.
    pub fn force_required(mut self, force: bool) -> Self {
        self.required = if force {
            RequiredPolicy::ForceAllRequired
        } else {
            RequiredPolicy::RespectFieldPolicy
        };
        self
    }
}

/// Builtin scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    String,
    Bool,
    Byte,
    Rune,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Time,
}

impl Primitive {
    pub fn parse(s: &str) -> Option<Self> {
        let p = match s {
            "string" => Primitive::String,
            "bool" => Primitive::Bool,
            "byte" => Primitive::Byte,
            "rune" => Primitive::Rune,
            "int" => Primitive::Int,
            "int8" => Primitive::Int8,
            "int16" => Primitive::Int16,
            "int32" => Primitive::Int32,
            "int64" => Primitive::Int64,
            "uint" => Primitive::Uint,
            "uint8" => Primitive::Uint8,
            "uint16" => Primitive::Uint16,
            "uint32" => Primitive::Uint32,
            "uint64" => Primitive::Uint64,
            "float32" => Primitive::Float32,
            "float64" => Primitive::Float64,
            "time.Time" => Primitive::Time,
            _ => return None,
        };
        Some(p)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Bool => "bool",
            Primitive::Byte => "byte",
            Primitive::Rune => "rune",
            Primitive::Int => "int",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::Uint => "uint",
            Primitive::Uint8 => "uint8",
            Primitive::Uint16 => "uint16",
            Primitive::Uint32 => "uint32",
            Primitive::Uint64 => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::Time => "time.Time",
        }
    }

    /// True for types that can key a JSON object.
    pub fn is_map_key(&self) -> bool {
        !matches!(
            self,
            Primitive::Bool | Primitive::Float32 | Primitive::Float64 | Primitive::Time
        )
    }
}

/// Declared type of a struct member.
///
/// Parses from a Go-like type expression:
///
/// ```
/// use struct_schema::{Primitive, TypeRef};
///
/// let ty: TypeRef = "[]*model.Tag".parse().unwrap();
/// assert_eq!(
///     ty,
///     TypeRef::array(TypeRef::pointer(TypeRef::named("model.Tag")))
/// );
/// assert_eq!("map[string]int".parse::<TypeRef>().unwrap().to_string(), "map[string]int");
/// assert_eq!("float64".parse::<TypeRef>().unwrap(), TypeRef::Primitive(Primitive::Float64));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    Primitive(Primitive),
    /// A struct or enum type, possibly package-qualified.
    Named(String),
    Array(Box<TypeRef>),
    Map {
        key: Box<TypeRef>,
        value: Box<TypeRef>,
    },
    Pointer(Box<TypeRef>),
    /// `interface{}` / `any`.
    Any,
    /// Types with no JSON representation (functions, channels, complex numbers).
    Unsupported(String),
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named(name.into())
    }

    pub fn array(item: TypeRef) -> Self {
        TypeRef::Array(Box::new(item))
    }

    pub fn pointer(inner: TypeRef) -> Self {
        TypeRef::Pointer(Box::new(inner))
    }

    pub fn map(key: TypeRef, value: TypeRef) -> Self {
        TypeRef::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Strip any number of pointer indirections.
    pub fn strip_pointers(&self) -> &TypeRef {
        let mut ty = self;
        while let TypeRef::Pointer(inner) = ty {
            ty = inner;
        }
        ty
    }
}

impl From<Primitive> for TypeRef {
    fn from(p: Primitive) -> Self {
        TypeRef::Primitive(p)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Primitive(p) => f.write_str(p.as_str()),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Array(item) => write!(f, "[]{}", item),
            TypeRef::Map { key, value } => write!(f, "map[{}]{}", key, value),
            TypeRef::Pointer(inner) => write!(f, "*{}", inner),
            TypeRef::Any => f.write_str("interface{}"),
            TypeRef::Unsupported(expr) => f.write_str(expr),
        }
    }
}

impl FromStr for TypeRef {
    type Err = TypeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = TypeParser {
            input: s,
            pos: 0,
            depth: 0,
        };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos < s.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl TryFrom<String> for TypeRef {
    type Error = TypeParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<TypeRef> for String {
    fn from(ty: TypeRef) -> Self {
        ty.to_string()
    }
}

/// Scalars with no JSON counterpart.
const OPAQUE_BUILTINS: &[&str] = &["complex64", "complex128", "uintptr", "unsafe.Pointer"];

fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    s.strip_prefix(keyword)
        .is_some_and(|after| !after.starts_with(|c: char| c.is_alphanumeric() || c == '_'))
}

/// Nesting limit for `*`, `[]` and `map[..]`, matching serde_json's recursion limit.
const MAX_DEPTH: usize = 128;

struct TypeParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> TypeParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), TypeParseError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", token)))
        }
    }

    fn error(&self, message: &str) -> TypeParseError {
        TypeParseError {
            input: self.input.to_string(),
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn parse_type(&mut self) -> Result<TypeRef, TypeParseError> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error("type nested too deeply"));
        }
        self.depth += 1;
        let ty = self.parse_type_inner();
        self.depth -= 1;
        ty
    }

    fn parse_type_inner(&mut self) -> Result<TypeRef, TypeParseError> {
        self.skip_ws();

        if self.eat("*") {
            return Ok(TypeRef::pointer(self.parse_type()?));
        }

        if self.eat("[") {
            // Fixed-size arrays serialize the same as slices.
            self.skip_ws();
            let rest = self.rest();
            self.pos += rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
            self.skip_ws();
            self.expect("]")?;
            return Ok(TypeRef::array(self.parse_type()?));
        }

        let rest = self.rest();
        if starts_with_keyword(rest, "func")
            || starts_with_keyword(rest, "chan")
            || rest.starts_with("<-")
        {
            let expr = rest.trim_end().to_string();
            self.pos = self.input.len();
            return Ok(TypeRef::Unsupported(expr));
        }

        let ident = self.parse_ident()?;
        match ident {
            "map" => {
                self.skip_ws();
                self.expect("[")?;
                let key = self.parse_type()?;
                self.skip_ws();
                self.expect("]")?;
                let value = self.parse_type()?;
                Ok(TypeRef::map(key, value))
            }
            "interface" => {
                self.skip_ws();
                self.expect("{")?;
                self.skip_ws();
                self.expect("}")?;
                Ok(TypeRef::Any)
            }
            "any" => Ok(TypeRef::Any),
            _ if OPAQUE_BUILTINS.contains(&ident) => Ok(TypeRef::Unsupported(ident.to_string())),
            _ => Ok(Primitive::parse(ident)
                .map(TypeRef::Primitive)
                .unwrap_or_else(|| TypeRef::named(ident))),
        }
    }

    /// Identifier, optionally package-qualified (`pkg.Name`).
    fn parse_ident(&mut self) -> Result<&'a str, TypeParseError> {
        let start = self.pos;
        let is_ident = |c: char| c.is_alphanumeric() || c == '_';

        let mut segment_start = true;
        for (offset, c) in self.rest().char_indices() {
            if is_ident(c) && !(segment_start && c.is_ascii_digit()) {
                segment_start = false;
                continue;
            }
            if c == '.' && !segment_start {
                segment_start = true;
                continue;
            }
            self.pos = start + offset;
            return self.finish_ident(start, segment_start);
        }
        self.pos = self.input.len();
        self.finish_ident(start, segment_start)
    }

    fn finish_ident(&mut self, start: usize, dangling: bool) -> Result<&'a str, TypeParseError> {
        if self.pos == start {
            return Err(self.error("expected type name"));
        }
        if dangling {
            return Err(self.error("incomplete qualified name"));
        }
        Ok(&self.input[start..self.pos])
    }
}

/// Structural description of one struct member.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared member name.
    pub name: String,
    pub visibility: Visibility,
    /// Property name override (the `json` tag name).
    pub json_name: Option<String>,
    pub omit_empty: bool,
    /// Explicit required marker; wins over `omit_empty`.
    pub required: bool,
    /// Never serialized (`json:"-"`).
    pub skip: bool,
    pub ty: TypeRef,
    pub description: Option<String>,
    pub format: Option<String>,
    pub example: Option<Value>,
}

impl FieldDescriptor {
    /// Create a descriptor whose visibility is derived from `name`.
    pub fn new(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        let name = name.into();
        Self {
            visibility: Visibility::from_name(&name),
            name,
            json_name: None,
            omit_empty: false,
            required: false,
            skip: false,
            ty: ty.into(),
            description: None,
            format: None,
            example: None,
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.json_name = Some(name.into());
        self
    }

    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn example(mut self, example: Value) -> Self {
        self.example = Some(example);
        self
    }

    /// Name the property is emitted under.
    pub fn property_name(&self) -> &str {
        match self.json_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }
}
