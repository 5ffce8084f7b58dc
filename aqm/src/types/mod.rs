// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Type system services consumed by the builder, planner and result columns
//!
//! The core treats the type system as an opaque lookup service: it asks for a
//! factory by type name and uses that factory to convert literal values.

pub mod casting;
pub mod type_system;
pub mod value;

use std::fmt;

pub use self::casting::TypeCaster;
pub use self::type_system::{StandardTypeFactory, StandardTypeSystem, TypeFactory, TypeSystem};
pub use self::value::{type_names, Value};

/// Type error for type system operations
#[derive(Debug, Clone, PartialEq)]
pub enum TypeError {
    InvalidCast(String, String),
    ValueFormat { value: String, type_name: String },
    UnknownType(String),
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::InvalidCast(from, to) => {
                write!(f, "Cannot cast from {} to {}", from, to)
            }
            TypeError::ValueFormat { value, type_name } => {
                write!(f, "Value '{}' is not a valid {}", value, type_name)
            }
            TypeError::UnknownType(name) => {
                write!(f, "Unknown type: {}", name)
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// Result type for type system operations
pub type TypeResult<T> = Result<T, TypeError>;
