// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result shape descriptor: column, selector and score-slot addressing
//!
//! A tuple carries one value per column, one node location per distinct
//! selector (in order of first appearance among the columns) and, when
//! full-text scores are included, one score per selector.

use std::collections::HashMap;
use std::fmt;

use crate::ast::{Column, Constraint, SelectorName};
use crate::exec::error::{ResultsError, ResultsResult};

/// Selector name used when a result has no columns at all
pub const DEFAULT_SELECTOR_NAME: &str = "Results";

#[derive(Debug, Clone)]
pub struct Columns {
    columns: Vec<Column>,
    column_types: Vec<String>,
    column_names: Vec<String>,
    selector_names: Vec<SelectorName>,
    /// Position of each column's value in the tuple's value list
    value_indexes: Vec<usize>,
    /// Location slot of each column's selector
    location_by_column: Vec<usize>,
    location_by_selector: HashMap<SelectorName, usize>,
    column_index_by_name: HashMap<String, usize>,
    column_index_by_property: HashMap<SelectorName, HashMap<String, usize>>,
    full_text_scores: bool,
    tuple_size: usize,
}

impl Columns {
    /// Describe tuples whose values follow `columns` exactly
    pub fn new(columns: Vec<Column>, column_types: Vec<String>, full_text_scores: bool) -> Self {
        let value_indexes = (0..columns.len()).collect();
        let mut result = Self::index(columns, column_types, value_indexes, full_text_scores);
        result.tuple_size = result.columns.len()
            + result.location_count()
            + if full_text_scores {
                result.location_count()
            } else {
                0
            };
        result
    }

    /// A result with no columns
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new(), false)
    }

    fn index(
        columns: Vec<Column>,
        column_types: Vec<String>,
        value_indexes: Vec<usize>,
        full_text_scores: bool,
    ) -> Self {
        let mut column_names = Vec::with_capacity(columns.len());
        let mut selector_names: Vec<SelectorName> = Vec::new();
        let mut location_by_selector = HashMap::new();
        let mut location_by_column = Vec::with_capacity(columns.len());
        let mut column_index_by_name = HashMap::new();
        let mut column_index_by_property: HashMap<SelectorName, HashMap<String, usize>> =
            HashMap::new();

        for (i, column) in columns.iter().enumerate() {
            let name = if column_names.contains(&column.column_name) {
                format!("{}.{}", column.selector, column.column_name)
            } else {
                column.column_name.clone()
            };
            column_index_by_name.insert(name.clone(), i);
            column_names.push(name);

            let location = *location_by_selector
                .entry(column.selector.clone())
                .or_insert_with(|| {
                    selector_names.push(column.selector.clone());
                    selector_names.len() - 1
                });
            location_by_column.push(location);
            column_index_by_property
                .entry(column.selector.clone())
                .or_default()
                .entry(column.property.clone())
                .or_insert(i);
        }

        if selector_names.is_empty() {
            let default = SelectorName::new(DEFAULT_SELECTOR_NAME);
            location_by_selector.insert(default.clone(), 0);
            selector_names.push(default);
        }

        Self {
            columns,
            column_types,
            column_names,
            selector_names,
            value_indexes,
            location_by_column,
            location_by_selector,
            column_index_by_name,
            column_index_by_property,
            full_text_scores,
            tuple_size: 0,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Output names; a name repeated by a later column is prefixed with its selector
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &[String] {
        &self.column_types
    }

    pub fn selector_names(&self) -> &[SelectorName] {
        &self.selector_names
    }

    /// Number of node locations in each tuple
    pub fn location_count(&self) -> usize {
        self.selector_names.len()
    }

    pub fn has_full_text_search_scores(&self) -> bool {
        self.full_text_scores
    }

    /// Total number of slots (values, locations and scores) in each tuple
    pub fn tuple_size(&self) -> usize {
        self.tuple_size
    }

    /// Names of the slots of a tuple, in order
    pub fn tuple_value_names(&self) -> Vec<String> {
        let mut names = self.column_names.clone();
        names.extend(self.selector_names.iter().map(|s| format!("Location({})", s)));
        if self.full_text_scores {
            names.extend(self.selector_names.iter().map(|s| format!("Score({})", s)));
        }
        names
    }

    /// Position of a column's value within the tuple's values
    pub fn value_index(&self, column_index: usize) -> ResultsResult<usize> {
        self.check_column_index(column_index)?;
        Ok(self.value_indexes[column_index])
    }

    pub fn location_index_for_column(&self, column_index: usize) -> ResultsResult<usize> {
        self.check_column_index(column_index)?;
        Ok(self.location_by_column[column_index])
    }

    pub fn location_index_for_column_name(&self, column_name: &str) -> ResultsResult<usize> {
        let index = self.column_index_for_name(column_name)?;
        self.location_index_for_column(index)
    }

    pub fn location_index(&self, selector: &str) -> ResultsResult<usize> {
        self.location_by_selector
            .get(&SelectorName::new(selector))
            .copied()
            .ok_or_else(|| ResultsError::NoSuchSelector(selector.to_string()))
    }

    pub fn has_selector(&self, selector: &str) -> bool {
        self.location_by_selector
            .contains_key(&SelectorName::new(selector))
    }

    pub fn property_name_for_column(&self, column_index: usize) -> ResultsResult<&str> {
        self.check_column_index(column_index)?;
        Ok(&self.columns[column_index].property)
    }

    pub fn column_index_for_name(&self, column_name: &str) -> ResultsResult<usize> {
        self.column_index_by_name
            .get(column_name)
            .copied()
            .ok_or_else(|| ResultsError::NoSuchColumn(column_name.to_string()))
    }

    pub fn column_index_for_property(&self, selector: &str, property: &str) -> ResultsResult<usize> {
        let by_property = self
            .column_index_by_property
            .get(&SelectorName::new(selector))
            .ok_or_else(|| ResultsError::NoSuchSelector(selector.to_string()))?;
        by_property
            .get(property)
            .copied()
            .ok_or_else(|| ResultsError::NoSuchProperty {
                selector: selector.to_string(),
                property: property.to_string(),
            })
    }

    /// Score slot for a selector; `Ok(None)` when this result carries no scores
    pub fn full_text_search_score_index_for(&self, selector: &str) -> ResultsResult<Option<usize>> {
        let location = self.location_index(selector)?;
        Ok(self.full_text_scores.then_some(location))
    }

    /// Whether every supplied column is one of these columns
    pub fn includes(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.columns.contains(c))
    }

    /// Exact match of column names and types, in order
    pub fn is_union_compatible(&self, other: &Columns) -> bool {
        self.column_names == other.column_names && self.column_types == other.column_types
    }

    /// Narrower view over the same tuples
    ///
    /// Every supplied column must be one of these columns.
    pub fn sub_select(&self, columns: &[Column]) -> ResultsResult<Columns> {
        let mut types = Vec::with_capacity(columns.len());
        let mut value_indexes = Vec::with_capacity(columns.len());
        for column in columns {
            let position = self
                .columns
                .iter()
                .position(|c| c == column)
                .ok_or_else(|| ResultsError::NoSuchColumn(column.to_string()))?;
            let type_name = self.column_types.get(position).ok_or(
                ResultsError::ColumnIndexOutOfBounds {
                    index: position,
                    count: self.column_types.len(),
                },
            )?;
            types.push(type_name.clone());
            value_indexes.push(self.value_indexes[position]);
        }
        let mut result = Self::index(columns.to_vec(), types, value_indexes, self.full_text_scores);
        // Location slots must keep pointing into the wrapped tuples
        for (i, column) in columns.iter().enumerate() {
            let wrapped = self.location_by_selector[&column.selector];
            result.location_by_column[i] = wrapped;
            result.location_by_selector.insert(column.selector.clone(), wrapped);
        }
        result.tuple_size = self.tuple_size;
        Ok(result)
    }

    /// Columns of tuples made by concatenating a tuple of these columns with one of `other`
    pub fn join_with(&self, other: &Columns) -> Columns {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        let mut types = self.column_types.clone();
        types.extend(other.column_types.iter().cloned());
        Columns::new(
            columns,
            types,
            self.full_text_scores || other.full_text_scores,
        )
    }

    /// Whether results filtered by this constraint carry full-text scores
    pub fn include_full_text_scores(constraint: &Constraint) -> bool {
        constraint.has_full_text_search()
    }

    fn check_column_index(&self, index: usize) -> ResultsResult<()> {
        if index >= self.columns.len() {
            return Err(ResultsError::ColumnIndexOutOfBounds {
                index,
                count: self.columns.len(),
            });
        }
        Ok(())
    }
}

impl PartialEq for Columns {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

impl Eq for Columns {}

impl fmt::Display for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, (name, type_name)) in self.column_names.iter().zip(&self.column_types).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}({})", name, type_name)?;
        }
        f.write_str("]")
    }
}
