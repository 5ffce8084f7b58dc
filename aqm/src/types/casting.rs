// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Value conversion rules used by the standard type factories
//!
//! Every standard type accepts its own values unchanged, and most types accept
//! the lexical (string) form of a value. Numeric types convert among each other,
//! and DATE accepts epoch milliseconds as a LONG.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::types::value::type_names;
use crate::types::{TypeError, TypeResult, Value};

/// Value caster for CAST operations
#[derive(Debug)]
pub struct TypeCaster;

impl TypeCaster {
    /// Check if a value of type `from` can ever be converted to type `to`
    pub fn can_cast(from: &str, to: &str) -> bool {
        if from == to || to == type_names::STRING || from == type_names::STRING {
            return true;
        }

        match (from, to) {
            (type_names::LONG | type_names::DOUBLE, type_names::LONG | type_names::DOUBLE) => true,
            (type_names::LONG | type_names::DOUBLE, type_names::DATE) => true,
            (type_names::DATE, type_names::LONG | type_names::DOUBLE) => true,
            (type_names::LONG, type_names::BOOLEAN) => true,
            (type_names::BOOLEAN, type_names::LONG) => true,
            (type_names::NAME, type_names::PATH) => true,
            (type_names::PATH | type_names::NAME | type_names::REFERENCE, type_names::URI) => true,
            (type_names::UUID, type_names::REFERENCE) => true,
            (type_names::REFERENCE, type_names::UUID) => true,
            (_, type_names::BINARY) => true,
            _ => false,
        }
    }

    /// Convert a value into the named standard type
    pub fn cast(value: &Value, to: &str) -> TypeResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let from = value.type_name().unwrap_or(type_names::STRING);
        if !Self::can_cast(from, to) {
            return Err(TypeError::InvalidCast(from.to_string(), to.to_string()));
        }

        match to {
            type_names::STRING => Ok(Value::String(value.to_lexical())),
            type_names::LONG => Self::to_long(value),
            type_names::DOUBLE => Self::to_double(value),
            type_names::BOOLEAN => Self::to_boolean(value),
            type_names::DATE => Self::to_date(value),
            type_names::PATH => Ok(Value::Path(value.to_lexical())),
            type_names::NAME => Self::to_name(value),
            type_names::REFERENCE => Ok(Value::Reference(value.to_lexical())),
            type_names::URI => Ok(Value::Uri(value.to_lexical())),
            type_names::UUID => Self::to_uuid(value),
            type_names::BINARY => match value {
                Value::Binary(bytes) => Ok(Value::Binary(bytes.clone())),
                other => Ok(Value::Binary(other.to_lexical().into_bytes())),
            },
            other => Err(TypeError::UnknownType(other.to_string())),
        }
    }

    fn to_long(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Long(n) => Ok(Value::Long(*n)),
            Value::Double(d) => Ok(Value::Long(d.trunc() as i64)),
            Value::Boolean(b) => Ok(Value::Long(i64::from(*b))),
            Value::Date(dt) => Ok(Value::Long(dt.timestamp_millis())),
            other => other
                .to_lexical()
                .trim()
                .parse::<i64>()
                .map(Value::Long)
                .map_err(|_| Self::value_error(other, type_names::LONG)),
        }
    }

    fn to_double(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Double(d) => Ok(Value::Double(*d)),
            Value::Long(n) => Ok(Value::Double(*n as f64)),
            Value::Date(dt) => Ok(Value::Double(dt.timestamp_millis() as f64)),
            other => other
                .to_lexical()
                .trim()
                .parse::<f64>()
                .map(Value::Double)
                .map_err(|_| Self::value_error(other, type_names::DOUBLE)),
        }
    }

    fn to_boolean(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Boolean(b) => Ok(Value::Boolean(*b)),
            Value::Long(n) => Ok(Value::Boolean(*n != 0)),
            other => match other.to_lexical().trim().to_ascii_lowercase().as_str() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(Self::value_error(other, type_names::BOOLEAN)),
            },
        }
    }

    fn to_date(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Date(dt) => Ok(Value::Date(*dt)),
            Value::Long(millis) => Utc
                .timestamp_millis_opt(*millis)
                .single()
                .map(Value::Date)
                .ok_or_else(|| Self::value_error(value, type_names::DATE)),
            Value::Double(d) => Self::to_date(&Value::Long(d.trunc() as i64)),
            other => DateTime::parse_from_rfc3339(other.to_lexical().trim())
                .map(|dt| Value::Date(dt.with_timezone(&Utc)))
                .map_err(|_| Self::value_error(other, type_names::DATE)),
        }
    }

    fn to_name(value: &Value) -> TypeResult<Value> {
        let lexical = value.to_lexical();
        if lexical.contains('/') {
            return Err(Self::value_error(value, type_names::NAME));
        }
        Ok(Value::Name(lexical))
    }

    fn to_uuid(value: &Value) -> TypeResult<Value> {
        match value {
            Value::Uuid(id) => Ok(Value::Uuid(*id)),
            other => Uuid::parse_str(other.to_lexical().trim())
                .map(Value::Uuid)
                .map_err(|_| Self::value_error(other, type_names::UUID)),
        }
    }

    fn value_error(value: &Value, to: &str) -> TypeError {
        TypeError::ValueFormat {
            value: value.to_lexical(),
            type_name: to.to_string(),
        }
    }
}
