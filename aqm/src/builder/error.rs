// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query builder error types

use thiserror::Error;

use crate::exec::problems::{Problem, QueryProblem, Severity};

/// First error latched by a [`QueryBuilder`](super::QueryBuilder)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Column '{0}' must be qualified with a table name or alias when the source is a join")]
    AmbiguousColumn(String),

    #[error("'{0}' is not a valid table name or alias")]
    UnknownSelector(String),

    #[error("Expected a column of the form '[table.]column[ AS alias]', but found '{0}'")]
    InvalidColumn(String),

    #[error("Expected an equality expression between two columns, but found '{0}'")]
    InvalidJoinCondition(String),

    #[error("Unbalanced parenthesis: {0}")]
    UnbalancedParenthesis(&'static str),

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Cannot cast '{value}' to {type_name}: {reason}")]
    InvalidCast {
        value: String,
        type_name: String,
        reason: String,
    },
}

impl BuildError {
    /// Whether the error reflects misuse of the builder API rather than a
    /// problem with the query being described
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            BuildError::UnbalancedParenthesis(_)
                | BuildError::UnknownType(_)
                | BuildError::InvalidCast { .. }
        )
    }

    /// Problem entry for recording this error in a context's problem sink
    pub fn to_problem(&self) -> Problem {
        Problem::new(
            Severity::Error,
            QueryProblem::InvalidQuery {
                reason: self.to_string(),
            },
        )
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violations() {
        assert!(BuildError::UnknownType("FOO".into()).is_contract_violation());
        assert!(BuildError::UnbalancedParenthesis("unexpected closing parenthesis").is_contract_violation());
        assert!(!BuildError::UnknownSelector("x".into()).is_contract_violation());
        assert!(!BuildError::AmbiguousColumn("name".into()).is_contract_violation());
    }

    #[test]
    fn test_to_problem() {
        let problem = BuildError::UnknownSelector("x".into()).to_problem();
        assert!(problem.is_error());
        assert_eq!(problem.message(), "Invalid query: 'x' is not a valid table name or alias");
    }
}
