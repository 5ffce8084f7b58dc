// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution error types

use thiserror::Error;

/// Errors raised when addressing result columns or reading from a cursor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResultsError {
    #[error("No column named '{0}'")]
    NoSuchColumn(String),

    #[error("Column index {index} is out of bounds for {count} columns")]
    ColumnIndexOutOfBounds { index: usize, count: usize },

    #[error("No selector named '{0}'")]
    NoSuchSelector(String),

    #[error("Selector '{selector}' has no column for property '{property}'")]
    NoSuchProperty { selector: String, property: String },

    #[error("Cursor is not positioned on a row; call next() first")]
    NotPositioned,

    #[error("Cursor has no more rows")]
    Exhausted,
}

/// Failure reported by a processor while executing a plan
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProcessingError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Unsupported plan node: {0}")]
    UnsupportedPlan(String),

    #[error("Runtime error: {0}")]
    RuntimeError(String),

    #[error("Results error: {0}")]
    Results(#[from] ResultsError),
}

pub type ResultsResult<T> = Result<T, ResultsError>;
