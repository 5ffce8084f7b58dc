// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Execution backend contract

use std::sync::Arc;

use crate::ast::QueryCommand;
use crate::exec::columns::Columns;
use crate::exec::context::QueryContext;
use crate::exec::error::ProcessingError;
use crate::exec::result::QueryResults;
use crate::exec::statistics::Statistics;
use crate::plan::PlanNode;

/// Executes an optimized plan and produces results
///
/// Implementations receive the statistics gathered so far and the resolved
/// result columns; the engine stamps the final statistics on whatever is
/// returned. Query-level problems found while executing should be recorded
/// in `context.problems()`; an `Err` is reserved for failures that prevent
/// producing any results.
pub trait Processor: Send + Sync {
    fn execute(
        &self,
        context: &QueryContext,
        command: &QueryCommand,
        statistics: Statistics,
        plan: &PlanNode,
        columns: Arc<Columns>,
    ) -> Result<QueryResults, ProcessingError>;
}
