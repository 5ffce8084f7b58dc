// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Accumulating sink for query-level errors and warnings
//!
//! Planning, optimization and execution never fail a query by returning an
//! error; they record a [`Problem`] here and the engine decides whether to
//! continue.

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured problem kinds; the display string is the message template
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryProblem {
    #[error("Table '{table}' does not exist")]
    TableDoesNotExist { table: String },

    #[error("Column '{column}' does not exist on table '{table}'")]
    ColumnDoesNotExistOnTable { column: String, table: String },

    #[error("Selector '{selector}' is not used in the query")]
    SelectorNotInQuery { selector: String },

    #[error("The two sides of {operation} return {left} and {right} columns and are not union-compatible")]
    SetQueryNotUnionCompatible {
        operation: String,
        left: usize,
        right: usize,
    },

    #[error("Bind variable '{name}' has no value")]
    UnboundVariable { name: String },

    #[error("Invalid query: {reason}")]
    InvalidQuery { reason: String },

    #[error("Query processing failed: {reason}")]
    ProcessingFailed { reason: String },
}

/// One entry in the problem sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub severity: Severity,
    pub kind: QueryProblem,
    /// Rendered query fragment the problem relates to, if any
    pub fragment: Option<String>,
}

impl Problem {
    pub fn new(severity: Severity, kind: QueryProblem) -> Self {
        Self {
            severity,
            kind,
            fragment: None,
        }
    }

    pub fn with_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.fragment = Some(fragment.into());
        self
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.kind)?;
        if let Some(fragment) = &self.fragment {
            write!(f, " [{}]", fragment)?;
        }
        Ok(())
    }
}

/// Thread-safe problem accumulator shared by one execution
#[derive(Debug, Default)]
pub struct Problems {
    entries: Mutex<Vec<Problem>>,
}

impl Problems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, problem: Problem) {
        self.entries.lock().push(problem);
    }

    pub fn add_error(&self, kind: QueryProblem) {
        self.add(Problem::new(Severity::Error, kind));
    }

    pub fn add_warning(&self, kind: QueryProblem) {
        self.add(Problem::new(Severity::Warning, kind));
    }

    pub fn add_info(&self, kind: QueryProblem) {
        self.add(Problem::new(Severity::Info, kind));
    }

    pub fn has_errors(&self) -> bool {
        self.has_severity(Severity::Error)
    }

    pub fn has_warnings(&self) -> bool {
        self.has_severity(Severity::Warning)
    }

    fn has_severity(&self, severity: Severity) -> bool {
        self.entries.lock().iter().any(|p| p.severity == severity)
    }

    pub fn error_count(&self) -> usize {
        self.entries.lock().iter().filter(|p| p.is_error()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Copy of the entries recorded so far, in insertion order
    pub fn snapshot(&self) -> Vec<Problem> {
        self.entries.lock().clone()
    }
}

impl fmt::Display for Problems {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, problem) in self.entries.lock().iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", problem)?;
        }
        Ok(())
    }
}
