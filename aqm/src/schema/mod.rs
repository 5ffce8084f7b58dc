// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Schema module - table definitions used to validate and plan queries
//
// The planner consumes schemata as an opaque lookup service through the
// `Schemata` trait. `ImmutableSchemata` is the stock implementation.

pub mod immutable_schemata;
pub mod types;

use std::fmt;

pub use immutable_schemata::{ImmutableSchemata, ImmutableSchemataBuilder};
pub use types::{SchemaColumn, Table};

use crate::ast::SelectorName;

// Schema module error type
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableAlreadyExists(String),

    #[error("Invalid schema definition: {0}")]
    InvalidDefinition(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Table lookup service
pub trait Schemata: fmt::Debug + Send + Sync {
    fn table(&self, name: &SelectorName) -> Option<&Table>;
}
