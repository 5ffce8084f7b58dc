// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query planning and optimization
//!
//! This module converts query commands into plan trees, validates them
//! against the schemata and rewrites them with a rule-based optimizer.

pub mod hints;
pub mod optimizer;
pub mod plan_node;
pub mod planner;

pub use hints::PlanHints;
pub use optimizer::{AddAccessNodes, Optimizer, OptimizerRule, PushSelectCriteria, RuleBasedOptimizer};
pub use plan_node::{NodeKind, PlanNode, PlanNodeType};
pub use planner::{CanonicalPlanner, Planner, SUBQUERY_VARIABLE_PREFIX};
