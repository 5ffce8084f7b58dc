// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AQM - Abstract Query Model
//!
//! A query subsystem for hierarchical content repositories whose node types
//! are exposed as tables.
//!
//! # Features
//!
//! - **Abstract Query Model**: immutable query trees for selects, joins and set operations
//! - **Fluent Builder**: clause-by-clause construction with SQL operator precedence
//! - **Staged Engine**: planning, rule-based optimization, column resolution and processing
//! - **Problem Reporting**: every stage records problems instead of failing fast
//! - **Typed Results**: column addressing, a forward-only cursor and per-stage timings
//!
//! # Usage
//!
//! ```ignore
//! use aqm::prelude::*;
//!
//! let command = QueryBuilder::new(StandardTypeSystem::shared())
//!     .select(&["t.name"])
//!     .from("nt:file AS t")
//!     .where_()
//!     .property_value("t", "name")
//!     .is_like("%.txt")
//!     .end()
//!     .limit(10)
//!     .query()?;
//!
//! let engine = QueryEngine::new(processor);
//! let results = engine.execute(&context, &command);
//! ```

pub mod ast;
pub mod builder;
pub mod coordinator;
pub mod exec;
pub mod plan;
pub mod schema;
pub mod types;

// Re-export the public API
pub use ast::QueryCommand;
pub use builder::{BuildError, BuildResult, QueryBuilder};
pub use coordinator::{EngineConfig, QueryEngine};
pub use exec::{QueryContext, QueryResults};
pub use types::Value;

/// Everything needed to build and run queries, including the builder traits
pub mod prelude {
    pub use crate::ast::{
        Column, Constraint, DynamicOperand, JoinCondition, JoinType, Limit, Operator, Order,
        Ordering, Query, QueryCommand, SelectorName, SetOperation, SetQuery, Source,
        StaticOperand,
    };
    pub use crate::builder::{BuildError, BuildResult, CastTarget, OperandBuilder, QueryBuilder};
    pub use crate::coordinator::{EngineConfig, QueryEngine};
    pub use crate::exec::{
        Columns, Cursor, Location, ProcessingError, Problem, Problems, Processor, QueryContext,
        QueryProblem, QueryResults, Severity, Statistics, Tuple,
    };
    pub use crate::plan::{Optimizer, PlanHints, PlanNode, Planner};
    pub use crate::schema::{ImmutableSchemata, Schemata};
    pub use crate::types::{StandardTypeSystem, TypeSystem, Value};
}

/// AQM version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// AQM crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
