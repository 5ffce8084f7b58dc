// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query results: typed tuples, a forward-only cursor and the problems and
//! statistics of the execution that produced them

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::exec::columns::Columns;
use crate::exec::error::{ResultsError, ResultsResult};
use crate::exec::problems::{Problem, Problems};
use crate::exec::statistics::Statistics;
use crate::types::Value;

/// Where a node lives in the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub id: Option<Uuid>,
}

impl Location {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            id: None,
        }
    }

    pub fn with_id(path: impl Into<String>, id: Uuid) -> Self {
        Self {
            path: path.into(),
            id: Some(id),
        }
    }
}

/// One result row
///
/// Values follow the column order of the [`Columns`] the tuple was produced
/// for; locations (and scores, if present) follow its selector order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    values: Vec<Value>,
    locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    scores: Vec<f64>,
}

impl Tuple {
    pub fn new(values: Vec<Value>, locations: Vec<Location>) -> Self {
        Self {
            values,
            locations,
            scores: Vec::new(),
        }
    }

    /// Attach one full-text score per location
    pub fn with_scores(mut self, scores: Vec<f64>) -> Self {
        self.scores = scores;
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Tuple over `Columns::join_with`; a side without scores contributes zeros
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = self.values.clone();
        values.extend(other.values.iter().cloned());
        let mut locations = self.locations.clone();
        locations.extend(other.locations.iter().cloned());
        let scores = if self.scores.is_empty() && other.scores.is_empty() {
            Vec::new()
        } else {
            let mut scores = padded_scores(self);
            scores.extend(padded_scores(other));
            scores
        };
        Tuple {
            values,
            locations,
            scores,
        }
    }
}

fn padded_scores(tuple: &Tuple) -> Vec<f64> {
    if tuple.scores.is_empty() {
        vec![0.0; tuple.locations.len()]
    } else {
        tuple.scores.clone()
    }
}

/// Results of executing one query
#[derive(Debug, Clone)]
pub struct QueryResults {
    columns: Arc<Columns>,
    tuples: Vec<Tuple>,
    problems: Arc<Problems>,
    statistics: Statistics,
    plan: Option<String>,
}

impl QueryResults {
    pub fn new(
        columns: Arc<Columns>,
        tuples: Vec<Tuple>,
        problems: Arc<Problems>,
        statistics: Statistics,
    ) -> Self {
        Self {
            columns,
            tuples,
            problems,
            statistics,
            plan: None,
        }
    }

    /// Results with no columns and no rows, carrying only problems
    pub fn empty(problems: Arc<Problems>, statistics: Statistics) -> Self {
        Self::new(Arc::new(Columns::empty()), Vec::new(), problems, statistics)
    }

    pub fn with_statistics(mut self, statistics: Statistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }

    pub fn columns(&self) -> &Arc<Columns> {
        &self.columns
    }

    pub fn cursor(&self) -> Cursor<'_> {
        Cursor {
            results: self,
            position: None,
        }
    }

    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    pub fn row_count(&self) -> usize {
        self.tuples.len()
    }

    /// Rendered plan, present only when requested through the plan hints
    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub fn problems(&self) -> Vec<Problem> {
        self.problems.snapshot()
    }

    pub fn has_errors(&self) -> bool {
        self.problems.has_errors()
    }

    pub fn has_warnings(&self) -> bool {
        self.problems.has_warnings()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// JSON view of the rows keyed by column name
    pub fn to_json(&self) -> serde_json::Value {
        let names = self.columns.column_names();
        let rows: Vec<serde_json::Value> = self
            .tuples
            .iter()
            .map(|tuple| {
                let mut row = serde_json::Map::new();
                for (i, name) in names.iter().enumerate() {
                    let value = self
                        .columns
                        .value_index(i)
                        .ok()
                        .and_then(|index| tuple.values.get(index))
                        .map_or(serde_json::Value::Null, value_to_json);
                    row.insert(name.clone(), value);
                }
                serde_json::Value::Object(row)
            })
            .collect();
        json!({
            "columns": names,
            "types": self.columns.column_types(),
            "rows": rows,
            "problems": self.problems().iter().map(|p| p.to_string()).collect::<Vec<_>>(),
        })
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Long(n) => json!(n),
        Value::Double(d) => json!(d),
        Value::Boolean(b) => json!(b),
        other => json!(other.to_lexical()),
    }
}

/// Forward-only, single-pass cursor over a result's tuples
pub struct Cursor<'a> {
    results: &'a QueryResults,
    position: Option<usize>,
}

impl<'a> Cursor<'a> {
    pub fn has_next(&self) -> bool {
        let next = self.position.map_or(0, |p| p + 1);
        next < self.results.tuples.len()
    }

    /// Advance to the next row
    pub fn next(&mut self) -> ResultsResult<()> {
        if !self.has_next() {
            return Err(ResultsError::Exhausted);
        }
        self.position = Some(self.position.map_or(0, |p| p + 1));
        Ok(())
    }

    /// Zero-based index of the current row
    pub fn row_index(&self) -> ResultsResult<usize> {
        self.position.ok_or(ResultsError::NotPositioned)
    }

    fn current(&self) -> ResultsResult<&'a Tuple> {
        let position = self.row_index()?;
        Ok(&self.results.tuples[position])
    }

    pub fn value(&self, column_index: usize) -> ResultsResult<&'a Value> {
        let tuple = self.current()?;
        let index = self.results.columns.value_index(column_index)?;
        tuple
            .values
            .get(index)
            .ok_or(ResultsError::ColumnIndexOutOfBounds {
                index,
                count: tuple.values.len(),
            })
    }

    pub fn value_by_name(&self, column_name: &str) -> ResultsResult<&'a Value> {
        let column_index = self.results.columns.column_index_for_name(column_name)?;
        self.value(column_index)
    }

    /// Location of the node that supplied the given column
    pub fn location(&self, column_index: usize) -> ResultsResult<&'a Location> {
        let tuple = self.current()?;
        let index = self.results.columns.location_index_for_column(column_index)?;
        Self::location_at(tuple, index)
    }

    pub fn location_for_selector(&self, selector: &str) -> ResultsResult<&'a Location> {
        let tuple = self.current()?;
        let index = self.results.columns.location_index(selector)?;
        Self::location_at(tuple, index)
    }

    /// Full-text score of the selector's node; `None` when the results carry no scores
    pub fn score(&self, selector: &str) -> ResultsResult<Option<f64>> {
        let tuple = self.current()?;
        let index = self.results.columns.full_text_search_score_index_for(selector)?;
        Ok(index.and_then(|i| tuple.scores.get(i).copied()))
    }

    fn location_at(tuple: &'a Tuple, index: usize) -> ResultsResult<&'a Location> {
        tuple
            .locations
            .get(index)
            .ok_or(ResultsError::ColumnIndexOutOfBounds {
                index,
                count: tuple.locations.len(),
            })
    }
}
