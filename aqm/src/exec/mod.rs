// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query execution support
//!
//! This module holds what the engine hands to and receives from an execution
//! backend: the per-query context, the problem sink, result columns, tuples
//! and timing statistics.

pub mod columns;
pub mod context;
pub mod error;
pub mod problems;
pub mod processor;
pub mod result;
pub mod statistics;

// Re-export the main types for convenience
pub use columns::{Columns, DEFAULT_SELECTOR_NAME};
pub use context::QueryContext;
pub use error::{ProcessingError, ResultsError, ResultsResult};
pub use problems::{Problem, Problems, QueryProblem, Severity};
pub use processor::Processor;
pub use result::{Cursor, Location, QueryResults, Tuple};
pub use statistics::Statistics;
