// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Flags recorded while planning and consulted by later stages

use serde::{Deserialize, Serialize};

/// Planning hints
///
/// Most flags are set by the planner as it discovers features of the query.
/// `show_plan`, `validate_column_existence` and `plan_only` are requested by
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanHints {
    pub has_criteria: bool,
    pub has_join: bool,
    pub has_optional_join: bool,
    pub has_sort: bool,
    pub has_limit: bool,
    pub has_set_query: bool,
    pub has_full_text_search: bool,
    pub has_subqueries: bool,
    /// Attach the rendered plan to the results
    pub show_plan: bool,
    /// Report references to columns the schema does not declare
    pub validate_column_existence: bool,
    /// Stop after column resolution without invoking the processor
    pub plan_only: bool,
}

impl Default for PlanHints {
    fn default() -> Self {
        Self {
            has_criteria: false,
            has_join: false,
            has_optional_join: false,
            has_sort: false,
            has_limit: false,
            has_set_query: false,
            has_full_text_search: false,
            has_subqueries: false,
            show_plan: false,
            validate_column_existence: true,
            plan_only: false,
        }
    }
}
