// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Type factories and the standard type system

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::types::value::type_names;
use crate::types::{TypeCaster, TypeResult, Value};

/// Creates values of one property type
pub trait TypeFactory: fmt::Debug + Send + Sync {
    /// Upper-case name of the type this factory produces
    fn type_name(&self) -> &str;

    /// Convert an arbitrary value into this factory's type
    fn create(&self, value: &Value) -> TypeResult<Value>;

    /// Lexical representation of a value of this type
    fn as_string(&self, value: &Value) -> String {
        value.to_lexical()
    }
}

/// Name/type resolution service used while building and planning queries
pub trait TypeSystem: fmt::Debug + Send + Sync {
    /// Look up the factory for a type name; names are matched case-insensitively
    fn type_factory(&self, type_name: &str) -> Option<&dyn TypeFactory>;

    /// Name of the type used when nothing more specific is known
    fn default_type(&self) -> &str;

    /// Names of every type this system knows about
    fn type_names(&self) -> Vec<String>;

    /// Name of the type of the supplied value
    fn compatible_type(&self, value: &Value) -> String {
        value
            .type_name()
            .map(str::to_string)
            .unwrap_or_else(|| self.default_type().to_string())
    }
}

/// Factory for one of the standard property types
#[derive(Debug, Clone)]
pub struct StandardTypeFactory {
    type_name: &'static str,
}

impl TypeFactory for StandardTypeFactory {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn create(&self, value: &Value) -> TypeResult<Value> {
        TypeCaster::cast(value, self.type_name)
    }
}

static STANDARD: Lazy<Arc<StandardTypeSystem>> = Lazy::new(|| Arc::new(StandardTypeSystem::new()));

/// The built-in repository type system
#[derive(Debug)]
pub struct StandardTypeSystem {
    factories: HashMap<&'static str, StandardTypeFactory>,
}

impl StandardTypeSystem {
    pub fn new() -> Self {
        let factories = [
            type_names::STRING,
            type_names::LONG,
            type_names::DOUBLE,
            type_names::BOOLEAN,
            type_names::DATE,
            type_names::PATH,
            type_names::NAME,
            type_names::REFERENCE,
            type_names::URI,
            type_names::UUID,
            type_names::BINARY,
        ]
        .into_iter()
        .map(|name| (name, StandardTypeFactory { type_name: name }))
        .collect();
        Self { factories }
    }

    /// Shared instance
    pub fn shared() -> Arc<StandardTypeSystem> {
        Arc::clone(&STANDARD)
    }
}

impl Default for StandardTypeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeSystem for StandardTypeSystem {
    fn type_factory(&self, type_name: &str) -> Option<&dyn TypeFactory> {
        let upper = type_name.trim().to_ascii_uppercase();
        self.factories
            .get(upper.as_str())
            .map(|factory| factory as &dyn TypeFactory)
    }

    fn default_type(&self) -> &str {
        type_names::STRING
    }

    fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().map(|k| k.to_string()).collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_lookup_is_case_insensitive() {
        let types = StandardTypeSystem::new();
        assert_eq!(types.type_factory("long").unwrap().type_name(), "LONG");
        assert_eq!(types.type_factory(" Date ").unwrap().type_name(), "DATE");
        assert!(types.type_factory("DECIMAL128").is_none());
    }

    #[test]
    fn test_standard_type_names() {
        let names = StandardTypeSystem::shared().type_names();
        assert_eq!(names.len(), 11);
        assert!(names.contains(&"REFERENCE".to_string()));
    }

    #[test]
    fn test_compatible_type_falls_back_to_default() {
        let types = StandardTypeSystem::new();
        assert_eq!(types.compatible_type(&Value::Long(1)), "LONG");
        assert_eq!(types.compatible_type(&Value::Null), "STRING");
    }
}
