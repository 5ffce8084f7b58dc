// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Table and column definitions seen by the planner

use serde::{Deserialize, Serialize};

use crate::ast::SelectorName;

/// A column of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub full_text_searchable: bool,
    #[serde(default = "default_true")]
    pub in_select_star: bool,
}

fn default_true() -> bool {
    true
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            full_text_searchable: false,
            in_select_star: true,
        }
    }
}

/// A queryable table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: SelectorName,
    pub columns: Vec<SchemaColumn>,
    /// Whether properties beyond the declared columns may be referenced
    #[serde(default)]
    pub extra_columns: bool,
}

impl Table {
    pub fn new(name: impl Into<SelectorName>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            extra_columns: false,
        }
    }

    pub fn column(&self, name: &str) -> Option<&SchemaColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub(crate) fn column_mut(&mut self, name: &str) -> Option<&mut SchemaColumn> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Columns returned by `SELECT *`, in declaration order
    pub fn select_star_columns(&self) -> impl Iterator<Item = &SchemaColumn> {
        self.columns.iter().filter(|c| c.in_select_star)
    }

    pub fn allows_extra_columns(&self) -> bool {
        self.extra_columns
    }
}
