// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query engine - drives one query through planning, optimization, column
//! resolution and processing
//!
//! Every stage reports problems into the context's shared problem list. The
//! engine checks the list after each stage and stops at the first error,
//! returning empty results that carry the problems and the timings gathered
//! so far.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::ast::{pretty_print_query, QueryCommand};
use crate::coordinator::engine_config::EngineConfig;
use crate::exec::{Columns, Processor, QueryContext, QueryProblem, QueryResults, Statistics};
use crate::plan::{
    CanonicalPlanner, NodeKind, Optimizer, PlanNode, PlanNodeType, Planner, RuleBasedOptimizer,
};

/// Entry point for executing query commands
///
/// The planner and optimizer are replaceable; the processor that actually
/// evaluates plans against a repository must be supplied.
#[derive(Clone)]
pub struct QueryEngine {
    planner: Arc<dyn Planner>,
    optimizer: Arc<dyn Optimizer>,
    processor: Arc<dyn Processor>,
    config: EngineConfig,
}

impl QueryEngine {
    /// Engine with the canonical planner and the default optimizer rules
    pub fn new(processor: Arc<dyn Processor>) -> Self {
        Self {
            planner: Arc::new(CanonicalPlanner::new()),
            optimizer: Arc::new(RuleBasedOptimizer::new()),
            processor,
            config: EngineConfig::default(),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_optimizer(mut self, optimizer: Arc<dyn Optimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Execute a query command
    ///
    /// Never fails: problems found along the way are reported through the
    /// returned results, which hold no tuples when any stage produced an
    /// error.
    pub fn execute(&self, context: &QueryContext, command: &QueryCommand) -> QueryResults {
        let started = Instant::now();
        // Planner discoveries stay with this execution; the caller's hints are untouched
        let context = &context.with_hints(context.hints());
        context.update_hints(|hints| self.config.apply_to(hints));
        debug!("Executing query: {}", pretty_print_query(command));

        let problems = context.problems();
        let mut statistics = Statistics::default();

        // Planning
        let timer = Instant::now();
        let plan = self.planner.create_plan(context, command);
        statistics = statistics.with_planning_time(timer.elapsed());
        debug!("Canonical plan:\n{}", plan);
        if problems.has_errors() {
            return self.finish(
                context,
                QueryResults::empty(Arc::clone(problems), statistics),
                None,
                started,
            );
        }

        // Optimization
        let timer = Instant::now();
        let plan = self.optimizer.optimize(context, plan);
        statistics = statistics.with_optimization_time(timer.elapsed());
        debug!("Optimized plan:\n{}", plan);
        if problems.has_errors() {
            return self.finish(
                context,
                QueryResults::empty(Arc::clone(problems), statistics),
                Some(&plan),
                started,
            );
        }

        // Column resolution
        let timer = Instant::now();
        let columns = Arc::new(resolve_columns(context, &plan));
        statistics = statistics.with_result_formulation_time(timer.elapsed());
        if problems.has_errors() {
            return self.finish(
                context,
                QueryResults::empty(Arc::clone(problems), statistics),
                Some(&plan),
                started,
            );
        }

        if context.hints().plan_only {
            let results = QueryResults::new(columns, Vec::new(), Arc::clone(problems), statistics);
            return self.finish(context, results, Some(&plan), started);
        }

        // Processing
        let timer = Instant::now();
        let outcome = self.processor.execute(
            context,
            command,
            statistics,
            &plan,
            Arc::clone(&columns),
        );
        let execution_time = timer.elapsed();
        let results = match outcome {
            Ok(results) => {
                let statistics = results
                    .statistics()
                    .with_planning_time(statistics.planning_time())
                    .with_optimization_time(statistics.optimization_time())
                    .with_result_formulation_time(statistics.result_formulation_time())
                    .with_execution_time(execution_time);
                results.with_statistics(statistics)
            }
            Err(e) => {
                warn!("Query processing failed: {}", e);
                problems.add_error(QueryProblem::ProcessingFailed {
                    reason: e.to_string(),
                });
                QueryResults::empty(
                    Arc::clone(problems),
                    statistics.with_execution_time(execution_time),
                )
            }
        };
        self.finish(context, results, Some(&plan), started)
    }

    fn finish(
        &self,
        context: &QueryContext,
        results: QueryResults,
        plan: Option<&PlanNode>,
        started: Instant,
    ) -> QueryResults {
        let results = match plan {
            Some(plan) if context.hints().show_plan => results.with_plan(plan.to_string()),
            _ => results,
        };

        let elapsed = started.elapsed();
        if results.has_errors() {
            info!(
                "Query finished with {} error(s) in {:?}",
                context.problems().error_count(),
                elapsed
            );
        } else if self.is_slow(elapsed) {
            warn!(
                "Slow query: {:?} ({}) returned {} row(s)",
                elapsed,
                results.statistics(),
                results.row_count()
            );
        } else {
            debug!("Query returned {} row(s) in {:?}", results.row_count(), elapsed);
        }
        results
    }

    fn is_slow(&self, elapsed: Duration) -> bool {
        self.config
            .slow_query_threshold_ms
            .is_some_and(|threshold| elapsed >= Duration::from_millis(threshold))
    }
}

impl fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEngine")
            .field("planner", &self.planner)
            .field("optimizer", &self.optimizer)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build the result columns from the plan's top PROJECT
fn resolve_columns(context: &QueryContext, plan: &PlanNode) -> Columns {
    let scores = context.hints().has_full_text_search
        || plan
            .find_all_at_or_below(PlanNodeType::Select)
            .into_iter()
            .any(|node| match &node.kind {
                NodeKind::Select { criteria } => Columns::include_full_text_scores(criteria),
                _ => false,
            });
    match plan.result_project().map(|node| &node.kind) {
        Some(NodeKind::Project {
            columns,
            column_types,
        }) => Columns::new(columns.clone(), column_types.clone(), scores),
        _ => Columns::empty(),
    }
}
