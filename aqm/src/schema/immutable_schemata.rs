// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
// Immutable, builder-constructed schemata

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::types::{SchemaColumn, Table};
use super::{SchemaError, SchemaResult, Schemata};
use crate::ast::SelectorName;
use crate::types::type_names;

/// A fixed set of tables
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImmutableSchemata {
    tables: BTreeMap<SelectorName, Table>,
}

impl ImmutableSchemata {
    pub fn builder() -> ImmutableSchemataBuilder {
        ImmutableSchemataBuilder::default()
    }

    /// Load table definitions from their JSON form
    pub fn from_json(json: &str) -> SchemaResult<Self> {
        let tables: Vec<Table> = serde_json::from_str(json)?;
        let mut builder = Self::builder();
        for table in tables {
            builder = builder.add_table_definition(table);
        }
        builder.build()
    }

    pub fn to_json(&self) -> SchemaResult<String> {
        let tables: Vec<&Table> = self.tables.values().collect();
        Ok(serde_json::to_string_pretty(&tables)?)
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}

impl Schemata for ImmutableSchemata {
    fn table(&self, name: &SelectorName) -> Option<&Table> {
        self.tables.get(name)
    }
}

/// Accumulates table definitions; the first invalid call is reported by `build()`
#[derive(Debug, Default)]
pub struct ImmutableSchemataBuilder {
    tables: BTreeMap<SelectorName, Table>,
    error: Option<SchemaError>,
}

impl ImmutableSchemataBuilder {
    /// Add a table whose columns all have the default (STRING) type
    pub fn add_table(mut self, name: &str, columns: &[&str]) -> Self {
        let key = SelectorName::new(name);
        if self.tables.contains_key(&key) {
            return self.fail(SchemaError::TableAlreadyExists(name.to_string()));
        }
        let mut table = Table::new(key.clone());
        for column in columns {
            table.columns.push(SchemaColumn::new(*column, type_names::STRING));
        }
        self.tables.insert(key, table);
        self
    }

    fn add_table_definition(mut self, table: Table) -> Self {
        if self.tables.contains_key(&table.name) {
            let name = table.name.to_string();
            return self.fail(SchemaError::TableAlreadyExists(name));
        }
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Add (or retype) a column, creating the table if needed
    pub fn add_column(mut self, table: &str, column: &str, type_name: &str) -> Self {
        let entry = self
            .tables
            .entry(SelectorName::new(table))
            .or_insert_with(|| Table::new(table));
        match entry.column_mut(column) {
            Some(existing) => existing.type_name = type_name.to_string(),
            None => entry.columns.push(SchemaColumn::new(column, type_name)),
        }
        self
    }

    pub fn make_searchable(self, table: &str, column: &str) -> Self {
        self.update_column(table, column, |c| c.full_text_searchable = true)
    }

    pub fn exclude_from_select_star(self, table: &str, column: &str) -> Self {
        self.update_column(table, column, |c| c.in_select_star = false)
    }

    /// Allow the table to be queried on properties it does not declare
    pub fn mark_extra_columns(mut self, table: &str) -> Self {
        match self.tables.get_mut(&SelectorName::new(table)) {
            Some(t) => t.extra_columns = true,
            None => return self.fail(SchemaError::TableNotFound(table.to_string())),
        }
        self
    }

    pub fn build(self) -> SchemaResult<ImmutableSchemata> {
        if let Some(error) = self.error {
            return Err(error);
        }
        debug!("Built schemata with {} tables", self.tables.len());
        Ok(ImmutableSchemata {
            tables: self.tables,
        })
    }

    fn update_column(mut self, table: &str, column: &str, f: impl FnOnce(&mut SchemaColumn)) -> Self {
        let Some(t) = self.tables.get_mut(&SelectorName::new(table)) else {
            return self.fail(SchemaError::TableNotFound(table.to_string()));
        };
        match t.column_mut(column) {
            Some(c) => f(c),
            None => {
                return self.fail(SchemaError::InvalidDefinition(format!(
                    "column '{}' does not exist on table '{}'",
                    column, table
                )))
            }
        }
        self
    }

    fn fail(mut self, error: SchemaError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }
}
