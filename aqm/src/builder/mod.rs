// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fluent query construction
//!
//! [`QueryBuilder`] assembles a [`QueryCommand`](crate::ast::QueryCommand)
//! clause by clause. Each step consumes the builder and returns the next
//! continuation type, so only the calls that make sense at a point in the
//! chain are available. Operand steps come from the [`OperandBuilder`]
//! trait, which must be in scope (see [`crate::prelude`]).

pub mod comparison;
pub mod constraint;
pub mod error;
pub mod join;
pub mod operand;
pub mod order_by;
pub mod query_builder;

pub use comparison::{
    ArithmeticBuilder, BetweenAnd, CastAs, CastTarget, ComparisonBuilder, LowerBoundary,
    RightHandSide, UpperBoundary,
};
pub use constraint::ConstraintBuilder;
pub use error::{BuildError, BuildResult};
pub use join::JoinClause;
pub use operand::{CaseOf, OperandBuilder};
pub use order_by::{OrderByBuilder, OrderByOperand};
pub use query_builder::QueryBuilder;
