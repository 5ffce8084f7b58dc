// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Typed literal values used by query constraints and result tuples
//!
//! Supports the standard repository property types:
//! - Basic types: String, Long, Double, Boolean, Null
//! - Temporal types: Date
//! - Repository types: Path, Name, Reference, Uri, Uuid, Binary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Names of the standard property types
pub mod type_names {
    pub const STRING: &str = "STRING";
    pub const LONG: &str = "LONG";
    pub const DOUBLE: &str = "DOUBLE";
    pub const BOOLEAN: &str = "BOOLEAN";
    pub const DATE: &str = "DATE";
    pub const PATH: &str = "PATH";
    pub const NAME: &str = "NAME";
    pub const REFERENCE: &str = "REFERENCE";
    pub const URI: &str = "URI";
    pub const UUID: &str = "UUID";
    pub const BINARY: &str = "BINARY";
}

/// A single typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    String(String),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Path(String),
    Name(String),
    Reference(String),
    Uri(String),
    Uuid(Uuid),
    Binary(Vec<u8>),
}

impl Value {
    /// Name of the property type this value carries, or `None` for null
    pub fn type_name(&self) -> Option<&'static str> {
        match self {
            Value::Null => None,
            Value::String(_) => Some(type_names::STRING),
            Value::Long(_) => Some(type_names::LONG),
            Value::Double(_) => Some(type_names::DOUBLE),
            Value::Boolean(_) => Some(type_names::BOOLEAN),
            Value::Date(_) => Some(type_names::DATE),
            Value::Path(_) => Some(type_names::PATH),
            Value::Name(_) => Some(type_names::NAME),
            Value::Reference(_) => Some(type_names::REFERENCE),
            Value::Uri(_) => Some(type_names::URI),
            Value::Uuid(_) => Some(type_names::UUID),
            Value::Binary(_) => Some(type_names::BINARY),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Lexical form of the value, as it would be stored in a STRING property
    pub fn to_lexical(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s)
            | Value::Path(s)
            | Value::Name(s)
            | Value::Reference(s)
            | Value::Uri(s) => s.clone(),
            Value::Long(n) => n.to_string(),
            Value::Double(d) => d.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Date(dt) => dt.to_rfc3339(),
            Value::Uuid(id) => id.hyphenated().to_string(),
            Value::Binary(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Binary(bytes) => write!(f, "<{} bytes>", bytes.len()),
            other => write!(f, "{}", other.to_lexical()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Long(n as i64)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::Date(dt)
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Uuid(id)
    }
}
