use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Runtime value representation
///
/// Values are immutable scalars copied by value; operators always build new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// Nil value
    Nil,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer value
    Int(i64),
    /// String value
    String(String),
}

/// Tag distinguishing the four value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    /// Integer kind
    Integer,
    /// String kind
    String,
    /// Boolean kind
    Boolean,
    /// Nil kind
    Nil,
}

impl Kind {
    /// Returns the type name as used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            Kind::Integer => "int",
            Kind::String => "string",
            Kind::Boolean => "bool",
            Kind::Nil => "nil",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// Creates a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Returns the kind tag of this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Nil => Kind::Nil,
            Value::Bool(_) => Kind::Boolean,
            Value::Int(_) => Kind::Integer,
            Value::String(_) => Kind::String,
        }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns the boolean payload, or a type error for any other kind
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            _ => Err(Error::type_mismatch("bool", self.type_name())),
        }
    }

    /// Returns the integer payload, or a type error for any other kind
    pub fn as_int(&self) -> Result<i64> {
        match self {
            Value::Int(n) => Ok(*n),
            _ => Err(Error::type_mismatch("int", self.type_name())),
        }
    }

    /// Returns a reference to the string payload, or a type error for any other kind
    pub fn as_string(&self) -> Result<&str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(Error::type_mismatch("string", self.type_name())),
        }
    }
}

/// Canonical rendering used by `print`: raw string text, `true`/`false`, and `nil`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_type_names() {
        assert_eq!(Value::Nil.kind(), Kind::Nil);
        assert_eq!(Value::Bool(true).kind(), Kind::Boolean);
        assert_eq!(Value::Int(42).type_name(), "int");
        assert_eq!(Value::string("test").type_name(), "string");
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::string("hi there").to_string(), "hi there");
        assert_eq!(Value::Nil.to_string(), "nil");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::Int(42).as_int().unwrap(), 42);
        assert!(Value::Bool(true).as_bool().unwrap());
        assert_eq!(Value::string("s").as_string().unwrap(), "s");

        // No implicit coercion between kinds
        assert!(Value::Int(1).as_bool().is_err());
        assert!(Value::string("1").as_int().is_err());
        assert!(Value::Nil.as_bool().is_err());
    }

    #[test]
    fn test_kinds_are_distinct() {
        assert_eq!(Value::Nil.kind(), Kind::Nil);
        assert_ne!(Value::Int(0).kind(), Value::Bool(false).kind());
        assert_ne!(Value::string("1").kind(), Value::Int(1).kind());
        assert_eq!(Value::string("a"), Value::from("a"));
    }
}
