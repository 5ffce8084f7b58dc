// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Fluent construction of query commands
//!
//! The builder is an owned scratchpad moved through each step of the chain.
//! Errors are latched: the first one is kept, later steps still run, and
//! [`QueryBuilder::query`] reports it.

use std::sync::Arc;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ast::{
    Column, Constraint, JoinType, Limit, NamedSelector, Ordering, Query, QueryCommand,
    SelectorName, SetOperation, SetQuery, Source,
};
use crate::builder::constraint::{ConstraintBuilder, ConstraintFrame};
use crate::builder::error::{BuildError, BuildResult};
use crate::builder::join::JoinClause;
use crate::builder::order_by::OrderByBuilder;
use crate::types::TypeSystem;

/// `name AS alias`, case-insensitive on the keyword
static ALIAS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(?i)^\s*(.+?)\s+AS\s+(.+?)\s*$").unwrap()
});

/// `[selector.]property`; the property keeps any further dots
static COLUMN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"^\s*(?:([^.]+?)\s*\.)?\s*(.+?)\s*$").unwrap()
});

/// Builds a [`QueryCommand`] one clause at a time
///
/// ```ignore
/// let query = QueryBuilder::new(type_system)
///     .select(&["t.name"])
///     .from("nt:file AS t")
///     .where_()
///     .property_value("t", "jcr:mimeType")
///     .is_equal_to("text/plain")
///     .end()
///     .order_by()
///     .ascending()
///     .property_value("t", "name")
///     .end()
///     .limit(10)
///     .query()?;
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pub(crate) type_system: Arc<dyn TypeSystem>,
    pub(crate) source: Source,
    pub(crate) constraint: Option<Constraint>,
    pub(crate) columns: Vec<Column>,
    pub(crate) orderings: Vec<Ordering>,
    pub(crate) limit: Limit,
    pub(crate) distinct: bool,
    /// Left operand, operation and ALL flag of a pending set operation
    pending: Option<(QueryCommand, SetOperation, bool)>,
    /// Open constraint clauses; the last frame is the innermost parenthesis
    pub(crate) frames: Vec<ConstraintFrame>,
    error: Option<BuildError>,
}

impl QueryBuilder {
    pub fn new(type_system: Arc<dyn TypeSystem>) -> Self {
        Self {
            type_system,
            source: Source::AllNodes(None),
            constraint: None,
            columns: Vec::new(),
            orderings: Vec::new(),
            limit: Limit::NONE,
            distinct: false,
            pending: None,
            frames: Vec::new(),
            error: None,
        }
    }

    pub fn type_system(&self) -> &Arc<dyn TypeSystem> {
        &self.type_system
    }

    /// Reset the query being built; a pending set operation is kept
    pub fn clear(mut self) -> Self {
        self.reset();
        self
    }

    fn reset(&mut self) {
        self.source = Source::AllNodes(None);
        self.constraint = None;
        self.columns.clear();
        self.orderings.clear();
        self.limit = Limit::NONE;
        self.distinct = false;
        self.frames.clear();
    }

    /// Latch an error; only the first one is kept
    pub(crate) fn fail(&mut self, error: BuildError) {
        if self.error.is_none() {
            debug!("Query builder error: {}", error);
            self.error = Some(error);
        }
    }

    pub(crate) fn selector(name: &str) -> SelectorName {
        SelectorName::new(name.trim())
    }

    pub(crate) fn named_selector(expression: &str) -> NamedSelector {
        match ALIAS_PATTERN.captures(expression) {
            Some(caps) => NamedSelector::aliased(Self::selector(&caps[1]), Self::selector(&caps[2])),
            None => NamedSelector::new(Self::selector(expression)),
        }
    }

    /// Parse `[table.]column[ AS alias]`
    fn column(&mut self, expression: &str) -> Option<Column> {
        let (reference, column_name) = match ALIAS_PATTERN.captures(expression) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (expression.to_string(), None),
        };
        let caps = match COLUMN_PATTERN.captures(&reference) {
            Some(caps) if !caps[2].trim().is_empty() => caps,
            _ => {
                self.fail(BuildError::InvalidColumn(expression.to_string()));
                return None;
            }
        };
        let property = caps[2].to_string();
        let selector = match caps.get(1) {
            Some(table) => Self::selector(table.as_str()),
            None => match self.source.as_selector() {
                Some(named) => named.alias_or_name().clone(),
                None => {
                    self.fail(BuildError::AmbiguousColumn(property));
                    return None;
                }
            },
        };
        let column_name = column_name.unwrap_or_else(|| property.clone());
        Some(Column::named(selector, property, column_name))
    }

    /// Add columns to the result
    pub fn select(mut self, column_names: &[&str]) -> Self {
        for expression in column_names {
            if let Some(column) = self.column(expression) {
                self.columns.push(column);
            }
        }
        self
    }

    /// Return every column of every source
    pub fn select_star(mut self) -> Self {
        self.columns.clear();
        self
    }

    pub fn select_distinct(mut self, column_names: &[&str]) -> Self {
        self.distinct = true;
        self.select(column_names)
    }

    pub fn select_distinct_star(mut self) -> Self {
        self.distinct = true;
        self.select_star()
    }

    /// Replace the source with the named table, re-qualifying columns that
    /// referred to the previous source
    pub fn from(mut self, table_with_optional_alias: &str) -> Self {
        let named = Self::named_selector(table_with_optional_alias);
        self.replace_source(Source::Selector(named));
        self
    }

    pub fn from_all_nodes(mut self) -> Self {
        self.replace_source(Source::AllNodes(None));
        self
    }

    pub fn from_all_nodes_as(mut self, alias: &str) -> Self {
        self.replace_source(Source::AllNodes(Some(Self::selector(alias))));
        self
    }

    fn replace_source(&mut self, source: Source) {
        let old = self.source.as_selector().map(|s| s.alias_or_name().clone());
        if let (Some(old), Some(new)) = (old, source.as_selector()) {
            let new = new.alias_or_name().clone();
            for column in self.columns.iter_mut() {
                if column.selector == old {
                    *column = column.with_selector(new.clone());
                }
            }
        }
        self.source = source;
    }

    /// Inner join with the named table
    pub fn join(self, table_with_optional_alias: &str) -> JoinClause {
        self.inner_join(table_with_optional_alias)
    }

    pub fn inner_join(self, table_with_optional_alias: &str) -> JoinClause {
        self.join_table(table_with_optional_alias, JoinType::Inner)
    }

    pub fn left_outer_join(self, table_with_optional_alias: &str) -> JoinClause {
        self.join_table(table_with_optional_alias, JoinType::LeftOuter)
    }

    pub fn right_outer_join(self, table_with_optional_alias: &str) -> JoinClause {
        self.join_table(table_with_optional_alias, JoinType::RightOuter)
    }

    pub fn full_outer_join(self, table_with_optional_alias: &str) -> JoinClause {
        self.join_table(table_with_optional_alias, JoinType::FullOuter)
    }

    pub fn cross_join(self, table_with_optional_alias: &str) -> JoinClause {
        self.join_table(table_with_optional_alias, JoinType::Cross)
    }

    pub fn join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.inner_join_all_nodes_as(alias)
    }

    pub fn inner_join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.join_all_nodes(alias, JoinType::Inner)
    }

    pub fn left_outer_join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.join_all_nodes(alias, JoinType::LeftOuter)
    }

    pub fn right_outer_join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.join_all_nodes(alias, JoinType::RightOuter)
    }

    pub fn full_outer_join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.join_all_nodes(alias, JoinType::FullOuter)
    }

    pub fn cross_join_all_nodes_as(self, alias: &str) -> JoinClause {
        self.join_all_nodes(alias, JoinType::Cross)
    }

    fn join_table(self, table_with_optional_alias: &str, join_type: JoinType) -> JoinClause {
        let right = Source::Selector(Self::named_selector(table_with_optional_alias));
        JoinClause::new(self, right, join_type)
    }

    fn join_all_nodes(self, alias: &str, join_type: JoinType) -> JoinClause {
        let right = Source::AllNodes(Some(Self::selector(alias)));
        JoinClause::new(self, right, join_type)
    }

    /// Begin the WHERE clause; [`ConstraintBuilder::end`] returns here
    pub fn where_(mut self) -> ConstraintBuilder {
        self.frames = vec![ConstraintFrame::default()];
        ConstraintBuilder::new(self)
    }

    /// Begin the ORDER BY clause; orderings are appended in call order
    pub fn order_by(self) -> OrderByBuilder {
        OrderByBuilder::new(self)
    }

    pub fn limit(mut self, row_limit: usize) -> Self {
        self.limit = self.limit.with_row_limit(row_limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.limit = self.limit.with_offset(offset);
        self
    }

    pub fn union(self) -> Self {
        self.set_operation(SetOperation::Union, false)
    }

    pub fn union_all(self) -> Self {
        self.set_operation(SetOperation::Union, true)
    }

    pub fn intersect(self) -> Self {
        self.set_operation(SetOperation::Intersect, false)
    }

    pub fn intersect_all(self) -> Self {
        self.set_operation(SetOperation::Intersect, true)
    }

    pub fn except(self) -> Self {
        self.set_operation(SetOperation::Except, false)
    }

    pub fn except_all(self) -> Self {
        self.set_operation(SetOperation::Except, true)
    }

    fn set_operation(mut self, operation: SetOperation, all: bool) -> Self {
        let first = self.command();
        self.pending = Some((first, operation, all));
        self.reset();
        self
    }

    /// The query built so far, combined with any pending set operation
    fn command(&mut self) -> QueryCommand {
        let query = QueryCommand::Query(Query {
            source: self.source.clone(),
            constraint: self.constraint.clone(),
            orderings: self.orderings.clone(),
            columns: self.columns.clone(),
            limit: self.limit,
            distinct: self.distinct,
        });
        match self.pending.take() {
            None => query,
            Some((first, operation, all)) => match first {
                // EXCEPT binds tighter than UNION and INTERSECT
                QueryCommand::SetQuery(set)
                    if operation == SetOperation::Except
                        && set.operation != SetOperation::Except =>
                {
                    let SetQuery {
                        left,
                        operation: first_operation,
                        right,
                        all: first_all,
                    } = set;
                    let except = QueryCommand::set(*right, SetOperation::Except, query, all);
                    QueryCommand::set(*left, first_operation, except, first_all)
                }
                first => QueryCommand::set(first, operation, query, all),
            },
        }
    }

    /// Finish building, returning the first latched error if there was one
    pub fn query(mut self) -> BuildResult<QueryCommand> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        Ok(self.command())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::JoinCondition;
    use crate::types::StandardTypeSystem;

    fn builder() -> QueryBuilder {
        QueryBuilder::new(StandardTypeSystem::shared())
    }

    fn simple(table: &str) -> QueryCommand {
        let mut query = Query::new(Source::named(table));
        query.columns = vec![Column::new(table, "a")];
        query.into()
    }

    #[test]
    fn test_select_from() {
        let query = builder()
            .select(&["t.name", "size AS bytes"])
            .from("nt:file AS t")
            .query();
        // "size" was unqualified while the source was ALL NODES
        let query = query.unwrap();
        let query = query.as_query().unwrap();
        assert_eq!(query.source, Source::aliased("nt:file", "t"));
        assert_eq!(query.columns[0], Column::new("t", "name"));
        assert_eq!(query.columns[1], Column::named("t", "size", "bytes"));
    }

    #[test]
    fn test_alias_keyword_is_case_insensitive() {
        let named = QueryBuilder::named_selector("nt:file as f");
        assert_eq!(named, NamedSelector::aliased("nt:file", "f"));
        let named = QueryBuilder::named_selector("  nt:file ");
        assert_eq!(named, NamedSelector::new("nt:file"));
    }

    #[test]
    fn test_from_requalifies_columns() {
        let query = builder()
            .from("nt:file AS a")
            .select(&["name", "b.other"])
            .from("nt:folder AS b")
            .query()
            .unwrap();
        let columns = query.columns();
        assert_eq!(columns[0], Column::new("b", "name"));
        assert_eq!(columns[1], Column::new("b", "other"));
    }

    #[test]
    fn test_unqualified_column_needs_single_source() {
        let result = builder()
            .from("nt:file AS f")
            .join("nt:folder AS d")
            .on_child_node("d", "f")
            .select(&["name"])
            .query();
        assert_eq!(result, Err(BuildError::AmbiguousColumn("name".into())));
    }

    #[test]
    fn test_first_error_is_kept() {
        let result = builder()
            .from("nt:file AS f")
            .join("nt:folder AS d")
            .on_child_node("x", "f")
            .select(&["name"])
            .query();
        assert_eq!(result, Err(BuildError::UnknownSelector("x".into())));
    }

    #[test]
    fn test_blank_column_is_rejected() {
        let result = builder().select(&["t.name", ""]).from("nt:file AS t").query();
        assert_eq!(result, Err(BuildError::InvalidColumn(String::new())));

        let result = builder().select(&["   "]).from("nt:file").query();
        assert_eq!(result, Err(BuildError::InvalidColumn("   ".into())));
    }

    #[test]
    fn test_limit_and_offset() {
        let query = builder().from("t").limit(10).offset(5).query().unwrap();
        assert_eq!(query.as_query().unwrap().limit, Limit::new(10, 5));
        let query = builder().from("t").offset(5).query().unwrap();
        assert_eq!(query.as_query().unwrap().limit.row_limit, None);
    }

    #[test]
    fn test_distinct() {
        let query = builder().select_distinct_star().from("t").query().unwrap();
        let query = query.as_query().unwrap();
        assert!(query.distinct);
        assert!(query.columns.is_empty());
    }

    #[test]
    fn test_set_operations() {
        let query = builder()
            .select(&["a"])
            .from("t1")
            .union_all()
            .select(&["a"])
            .from("t2")
            .query()
            .unwrap();
        assert_eq!(
            query,
            QueryCommand::set(simple("t1"), SetOperation::Union, simple("t2"), true)
        );
    }

    #[test]
    fn test_except_binds_tighter_than_union() {
        let query = builder()
            .select(&["a"])
            .from("t1")
            .union()
            .select(&["a"])
            .from("t2")
            .except()
            .select(&["a"])
            .from("t3")
            .query()
            .unwrap();
        let expected = QueryCommand::set(
            simple("t1"),
            SetOperation::Union,
            QueryCommand::set(simple("t2"), SetOperation::Except, simple("t3"), false),
            false,
        );
        assert_eq!(query, expected);
    }

    #[test]
    fn test_except_after_except_is_left_associative() {
        let query = builder()
            .select(&["a"])
            .from("t1")
            .except()
            .select(&["a"])
            .from("t2")
            .except_all()
            .select(&["a"])
            .from("t3")
            .query()
            .unwrap();
        let expected = QueryCommand::set(
            QueryCommand::set(simple("t1"), SetOperation::Except, simple("t2"), false),
            SetOperation::Except,
            simple("t3"),
            true,
        );
        assert_eq!(query, expected);
    }

    #[test]
    fn test_clear_keeps_pending_set_operation() {
        let query = builder()
            .select(&["a"])
            .from("t1")
            .intersect()
            .select(&["zzz"])
            .from("ignored")
            .clear()
            .select(&["a"])
            .from("t2")
            .query()
            .unwrap();
        assert_eq!(
            query,
            QueryCommand::set(simple("t1"), SetOperation::Intersect, simple("t2"), false)
        );
    }

    #[test]
    fn test_cross_join_nests_on_the_right() {
        let query = builder()
            .from("a")
            .join("b")
            .on_same_node("a", "b")
            .cross_join("c")
            .on_same_node("b", "c")
            .query()
            .unwrap();
        let same = |s1: &str, s2: &str| JoinCondition::SameNode {
            selector1: s1.into(),
            selector2: s2.into(),
            selector2_path: None,
        };
        let expected = Source::join(
            Source::named("a"),
            JoinType::Inner,
            Source::join(Source::named("b"), JoinType::Cross, Source::named("c"), same("b", "c")),
            same("a", "b"),
        );
        assert_eq!(query.as_query().unwrap().source, expected);
    }
}
