// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query engine configuration

use serde::{Deserialize, Serialize};

use crate::plan::PlanHints;

/// Engine-wide settings applied to every execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Report references to columns a table does not declare
    pub validate_column_existence: bool,

    /// Attach the rendered plan to every result
    pub include_plan: bool,

    /// Executions slower than this are logged as warnings
    pub slow_query_threshold_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validate_column_existence: true,
            include_plan: false,
            slow_query_threshold_ms: Some(1000), // 1 second
        }
    }
}

impl EngineConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Configuration for debugging: plans attached, every query timed
    pub fn diagnostic() -> Self {
        Self {
            include_plan: true,
            slow_query_threshold_ms: Some(0),
            ..Self::default()
        }
    }

    /// Fold these settings into a context's hints
    ///
    /// Hints already requested by the caller are kept: `show_plan` is only
    /// ever switched on and column validation only ever switched off.
    pub fn apply_to(&self, hints: &mut PlanHints) {
        hints.show_plan |= self.include_plan;
        hints.validate_column_existence &= self.validate_column_existence;
    }
}
