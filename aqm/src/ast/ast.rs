// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Abstract Query Model (AQM) structures
//!
//! Every node is an immutable value. Queries are produced by the
//! [`QueryBuilder`](crate::builder::QueryBuilder) or by a textual front-end and
//! are never mutated afterwards.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Value;

/// Name of the pseudo-table that contains every node
pub const ALL_NODES_NAME: &str = "__ALLNODES__";

/// Name of a selector (a table-like source), used both for table names and aliases
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectorName(String);

impl SelectorName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn all_nodes() -> Self {
        Self(ALL_NODES_NAME.to_string())
    }

    pub fn is_all_nodes(&self) -> bool {
        self.0 == ALL_NODES_NAME
    }
}

impl fmt::Display for SelectorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SelectorName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SelectorName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl PartialEq<str> for SelectorName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SelectorName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A table reference with an optional alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamedSelector {
    pub name: SelectorName,
    pub alias: Option<SelectorName>,
}

impl NamedSelector {
    pub fn new(name: impl Into<SelectorName>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<SelectorName>, alias: impl Into<SelectorName>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    /// The alias if present, otherwise the table name
    pub fn alias_or_name(&self) -> &SelectorName {
        self.alias.as_ref().unwrap_or(&self.name)
    }

    /// Whether the supplied name matches either the alias or the table name
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.alias.as_ref().map_or(false, |a| a == name)
    }
}

/// Where tuples come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Source {
    /// Every node in the repository, optionally aliased
    AllNodes(Option<SelectorName>),
    Selector(NamedSelector),
    Join(Box<Join>),
}

impl Source {
    pub fn named(name: impl Into<SelectorName>) -> Self {
        Source::Selector(NamedSelector::new(name))
    }

    pub fn aliased(name: impl Into<SelectorName>, alias: impl Into<SelectorName>) -> Self {
        Source::Selector(NamedSelector::aliased(name, alias))
    }

    pub fn join(left: Source, join_type: JoinType, right: Source, condition: JoinCondition) -> Self {
        Source::Join(Box::new(Join {
            left,
            join_type,
            right,
            condition,
        }))
    }

    /// The leaf selector of a non-join source
    pub fn as_selector(&self) -> Option<NamedSelector> {
        match self {
            Source::AllNodes(alias) => Some(NamedSelector {
                name: SelectorName::all_nodes(),
                alias: alias.clone(),
            }),
            Source::Selector(selector) => Some(selector.clone()),
            Source::Join(_) => None,
        }
    }

    /// All leaf selectors, left to right
    pub fn selectors(&self) -> Vec<NamedSelector> {
        let mut selectors = Vec::new();
        self.collect_selectors(&mut selectors);
        selectors
    }

    fn collect_selectors(&self, out: &mut Vec<NamedSelector>) {
        match self {
            Source::Join(join) => {
                join.left.collect_selectors(out);
                join.right.collect_selectors(out);
            }
            leaf => out.extend(leaf.as_selector()),
        }
    }

    /// Resolve a name or alias to the selector name used to qualify columns
    pub fn resolve(&self, name: &str) -> Option<SelectorName> {
        self.selectors()
            .into_iter()
            .find(|selector| selector.matches(name))
            .map(|selector| selector.alias_or_name().clone())
    }
}

/// Kind of join between two sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
    Cross,
}

impl JoinType {
    pub fn symbol(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT OUTER JOIN",
            JoinType::RightOuter => "RIGHT OUTER JOIN",
            JoinType::FullOuter => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        }
    }

    pub fn is_outer(&self) -> bool {
        matches!(
            self,
            JoinType::LeftOuter | JoinType::RightOuter | JoinType::FullOuter
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub left: Source,
    pub join_type: JoinType,
    pub right: Source,
    pub condition: JoinCondition,
}

/// Criteria relating the two sides of a join
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinCondition {
    EquiJoin {
        selector1: SelectorName,
        property1: String,
        selector2: SelectorName,
        property2: String,
    },
    SameNode {
        selector1: SelectorName,
        selector2: SelectorName,
        selector2_path: Option<String>,
    },
    ChildNode {
        parent: SelectorName,
        child: SelectorName,
    },
    DescendantNode {
        ancestor: SelectorName,
        descendant: SelectorName,
    },
}

impl JoinCondition {
    pub fn selectors(&self) -> [&SelectorName; 2] {
        match self {
            JoinCondition::EquiJoin {
                selector1,
                selector2,
                ..
            }
            | JoinCondition::SameNode {
                selector1,
                selector2,
                ..
            } => [selector1, selector2],
            JoinCondition::ChildNode { parent, child } => [parent, child],
            JoinCondition::DescendantNode {
                ancestor,
                descendant,
            } => [ancestor, descendant],
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    Like,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::EqualTo => "=",
            Operator::NotEqualTo => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqualTo => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqualTo => ">=",
            Operator::Like => "LIKE",
        }
    }

    /// The operator that gives the same result when the operands are swapped
    pub fn reverse(&self) -> Operator {
        match self {
            Operator::LessThan => Operator::GreaterThan,
            Operator::LessThanOrEqualTo => Operator::GreaterThanOrEqualTo,
            Operator::GreaterThan => Operator::LessThan,
            Operator::GreaterThanOrEqualTo => Operator::LessThanOrEqualTo,
            other => *other,
        }
    }
}

/// Arithmetic operators usable between dynamic operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithmeticOperator {
    pub fn symbol(&self) -> char {
        match self {
            ArithmeticOperator::Add => '+',
            ArithmeticOperator::Subtract => '-',
            ArithmeticOperator::Multiply => '*',
            ArithmeticOperator::Divide => '/',
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            ArithmeticOperator::Add | ArithmeticOperator::Subtract => 1,
            ArithmeticOperator::Multiply | ArithmeticOperator::Divide => 2,
        }
    }

    /// Whether this operator binds more tightly than `other`
    pub fn precedes(&self, other: ArithmeticOperator) -> bool {
        self.precedence() > other.precedence()
    }
}

/// An operand whose value depends on the node being evaluated
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DynamicOperand {
    PropertyValue {
        selector: SelectorName,
        property: String,
    },
    ReferenceValue {
        selector: SelectorName,
        property: Option<String>,
        include_weak: bool,
    },
    Length {
        selector: SelectorName,
        property: String,
    },
    NodeDepth {
        selector: SelectorName,
    },
    NodePath {
        selector: SelectorName,
    },
    NodeName {
        selector: SelectorName,
    },
    NodeLocalName {
        selector: SelectorName,
    },
    FullTextSearchScore {
        selector: SelectorName,
    },
    UpperCase(Box<DynamicOperand>),
    LowerCase(Box<DynamicOperand>),
    Arithmetic {
        left: Box<DynamicOperand>,
        operator: ArithmeticOperator,
        right: Box<DynamicOperand>,
    },
}

impl DynamicOperand {
    pub fn arithmetic(
        left: DynamicOperand,
        operator: ArithmeticOperator,
        right: DynamicOperand,
    ) -> Self {
        DynamicOperand::Arithmetic {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// Names of the selectors this operand reads from
    pub fn selectors(&self) -> BTreeSet<SelectorName> {
        let mut out = BTreeSet::new();
        self.collect_selectors(&mut out);
        out
    }

    fn collect_selectors(&self, out: &mut BTreeSet<SelectorName>) {
        match self {
            DynamicOperand::PropertyValue { selector, .. }
            | DynamicOperand::ReferenceValue { selector, .. }
            | DynamicOperand::Length { selector, .. }
            | DynamicOperand::NodeDepth { selector }
            | DynamicOperand::NodePath { selector }
            | DynamicOperand::NodeName { selector }
            | DynamicOperand::NodeLocalName { selector }
            | DynamicOperand::FullTextSearchScore { selector } => {
                out.insert(selector.clone());
            }
            DynamicOperand::UpperCase(inner) | DynamicOperand::LowerCase(inner) => {
                inner.collect_selectors(out)
            }
            DynamicOperand::Arithmetic { left, right, .. } => {
                left.collect_selectors(out);
                right.collect_selectors(out);
            }
        }
    }

    /// Whether evaluating this operand needs a full-text score
    pub fn uses_full_text_score(&self) -> bool {
        match self {
            DynamicOperand::FullTextSearchScore { .. } => true,
            DynamicOperand::UpperCase(inner) | DynamicOperand::LowerCase(inner) => {
                inner.uses_full_text_score()
            }
            DynamicOperand::Arithmetic { left, right, .. } => {
                left.uses_full_text_score() || right.uses_full_text_score()
            }
            _ => false,
        }
    }
}

/// An operand whose value is fixed for the duration of the query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StaticOperand {
    Literal(Value),
    BindVariable(String),
    Subquery(Box<QueryCommand>),
}

impl StaticOperand {
    pub fn variable(name: impl Into<String>) -> Self {
        StaticOperand::BindVariable(name.into())
    }
}

impl From<Value> for StaticOperand {
    fn from(value: Value) -> Self {
        StaticOperand::Literal(value)
    }
}

impl From<&str> for StaticOperand {
    fn from(value: &str) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<String> for StaticOperand {
    fn from(value: String) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<i64> for StaticOperand {
    fn from(value: i64) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<i32> for StaticOperand {
    fn from(value: i32) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<f64> for StaticOperand {
    fn from(value: f64) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<bool> for StaticOperand {
    fn from(value: bool) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<DateTime<Utc>> for StaticOperand {
    fn from(value: DateTime<Utc>) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<Uuid> for StaticOperand {
    fn from(value: Uuid) -> Self {
        StaticOperand::Literal(value.into())
    }
}

impl From<QueryCommand> for StaticOperand {
    fn from(query: QueryCommand) -> Self {
        StaticOperand::Subquery(Box::new(query))
    }
}

/// Boolean criteria restricting the tuples of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    And(Box<Constraint>, Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
    Not(Box<Constraint>),
    Comparison {
        operand: DynamicOperand,
        operator: Operator,
        value: StaticOperand,
    },
    Between {
        operand: DynamicOperand,
        lower: StaticOperand,
        upper: StaticOperand,
        lower_inclusive: bool,
        upper_inclusive: bool,
    },
    SetCriteria {
        operand: DynamicOperand,
        values: Vec<StaticOperand>,
    },
    PropertyExistence {
        selector: SelectorName,
        property: String,
    },
    FullTextSearch {
        selector: SelectorName,
        property: Option<String>,
        expression: String,
    },
    SameNode {
        selector: SelectorName,
        path: String,
    },
    ChildNode {
        selector: SelectorName,
        parent_path: String,
    },
    DescendantNode {
        selector: SelectorName,
        ancestor_path: String,
    },
}

impl Constraint {
    pub fn and(left: Constraint, right: Constraint) -> Self {
        Constraint::And(Box::new(left), Box::new(right))
    }

    pub fn or(left: Constraint, right: Constraint) -> Self {
        Constraint::Or(Box::new(left), Box::new(right))
    }

    pub fn negate(constraint: Constraint) -> Self {
        Constraint::Not(Box::new(constraint))
    }

    /// Split a tree of ANDs into its conjuncts, left to right
    pub fn conjuncts(&self) -> Vec<&Constraint> {
        match self {
            Constraint::And(left, right) => {
                let mut out = left.conjuncts();
                out.extend(right.conjuncts());
                out
            }
            other => vec![other],
        }
    }

    /// Names of every selector referenced by this constraint
    pub fn selectors(&self) -> BTreeSet<SelectorName> {
        let mut out = BTreeSet::new();
        self.collect_selectors(&mut out);
        out
    }

    fn collect_selectors(&self, out: &mut BTreeSet<SelectorName>) {
        match self {
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                left.collect_selectors(out);
                right.collect_selectors(out);
            }
            Constraint::Not(inner) => inner.collect_selectors(out),
            Constraint::Comparison { operand, .. }
            | Constraint::Between { operand, .. }
            | Constraint::SetCriteria { operand, .. } => out.extend(operand.selectors()),
            Constraint::PropertyExistence { selector, .. }
            | Constraint::FullTextSearch { selector, .. }
            | Constraint::SameNode { selector, .. }
            | Constraint::ChildNode { selector, .. }
            | Constraint::DescendantNode { selector, .. } => {
                out.insert(selector.clone());
            }
        }
    }

    /// Whether this constraint (or a score operand inside it) needs full-text scores
    pub fn has_full_text_search(&self) -> bool {
        match self {
            Constraint::FullTextSearch { .. } => true,
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                left.has_full_text_search() || right.has_full_text_search()
            }
            Constraint::Not(inner) => inner.has_full_text_search(),
            Constraint::Comparison { operand, .. }
            | Constraint::Between { operand, .. }
            | Constraint::SetCriteria { operand, .. } => operand.uses_full_text_score(),
            _ => false,
        }
    }

    /// Every static operand in this constraint, depth first
    pub fn static_operands(&self) -> Vec<&StaticOperand> {
        match self {
            Constraint::And(left, right) | Constraint::Or(left, right) => {
                let mut out = left.static_operands();
                out.extend(right.static_operands());
                out
            }
            Constraint::Not(inner) => inner.static_operands(),
            Constraint::Comparison { value, .. } => vec![value],
            Constraint::Between { lower, upper, .. } => vec![lower, upper],
            Constraint::SetCriteria { values, .. } => values.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Rebuild this constraint with every static operand passed through `f`
    pub fn map_static_operands(&self, f: &mut dyn FnMut(&StaticOperand) -> StaticOperand) -> Self {
        match self {
            Constraint::And(left, right) => Constraint::and(
                left.map_static_operands(f),
                right.map_static_operands(f),
            ),
            Constraint::Or(left, right) => {
                Constraint::or(left.map_static_operands(f), right.map_static_operands(f))
            }
            Constraint::Not(inner) => Constraint::negate(inner.map_static_operands(f)),
            Constraint::Comparison {
                operand,
                operator,
                value,
            } => Constraint::Comparison {
                operand: operand.clone(),
                operator: *operator,
                value: f(value),
            },
            Constraint::Between {
                operand,
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => Constraint::Between {
                operand: operand.clone(),
                lower: f(lower),
                upper: f(upper),
                lower_inclusive: *lower_inclusive,
                upper_inclusive: *upper_inclusive,
            },
            Constraint::SetCriteria { operand, values } => Constraint::SetCriteria {
                operand: operand.clone(),
                values: values.iter().map(|v| f(v)).collect(),
            },
            other => other.clone(),
        }
    }
}

/// A projected column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    pub selector: SelectorName,
    pub property: String,
    pub column_name: String,
}

impl Column {
    pub fn new(selector: impl Into<SelectorName>, property: impl Into<String>) -> Self {
        let property = property.into();
        Self {
            selector: selector.into(),
            column_name: property.clone(),
            property,
        }
    }

    pub fn named(
        selector: impl Into<SelectorName>,
        property: impl Into<String>,
        column_name: impl Into<String>,
    ) -> Self {
        Self {
            selector: selector.into(),
            property: property.into(),
            column_name: column_name.into(),
        }
    }

    /// Same column, qualified by a different selector
    pub fn with_selector(&self, selector: SelectorName) -> Self {
        Self {
            selector,
            property: self.property.clone(),
            column_name: self.column_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Order {
    Ascending,
    Descending,
}

impl Order {
    pub fn symbol(&self) -> &'static str {
        match self {
            Order::Ascending => "ASC",
            Order::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ordering {
    pub operand: DynamicOperand,
    pub order: Order,
}

impl Ordering {
    pub fn ascending(operand: DynamicOperand) -> Self {
        Self {
            operand,
            order: Order::Ascending,
        }
    }

    pub fn descending(operand: DynamicOperand) -> Self {
        Self {
            operand,
            order: Order::Descending,
        }
    }
}

/// Row limit and offset of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Limit {
    pub row_limit: Option<usize>,
    pub offset: usize,
}

impl Limit {
    pub const NONE: Limit = Limit {
        row_limit: None,
        offset: 0,
    };

    pub fn new(row_limit: usize, offset: usize) -> Self {
        Self {
            row_limit: Some(row_limit),
            offset,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.row_limit.is_none()
    }

    pub fn is_offset(&self) -> bool {
        self.offset > 0
    }

    pub fn with_row_limit(self, row_limit: usize) -> Self {
        Self {
            row_limit: Some(row_limit),
            ..self
        }
    }

    pub fn with_offset(self, offset: usize) -> Self {
        Self { offset, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOperation {
    Union,
    Intersect,
    Except,
}

impl SetOperation {
    pub fn symbol(&self) -> &'static str {
        match self {
            SetOperation::Union => "UNION",
            SetOperation::Intersect => "INTERSECT",
            SetOperation::Except => "EXCEPT",
        }
    }
}

/// A single SELECT
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub source: Source,
    pub constraint: Option<Constraint>,
    pub orderings: Vec<Ordering>,
    pub columns: Vec<Column>,
    pub limit: Limit,
    pub distinct: bool,
}

impl Query {
    pub fn new(source: Source) -> Self {
        Self {
            source,
            constraint: None,
            orderings: Vec::new(),
            columns: Vec::new(),
            limit: Limit::NONE,
            distinct: false,
        }
    }
}

/// Two queries combined with a set operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetQuery {
    pub left: Box<QueryCommand>,
    pub operation: SetOperation,
    pub right: Box<QueryCommand>,
    pub all: bool,
}

impl SetQuery {
    pub fn new(left: QueryCommand, operation: SetOperation, right: QueryCommand, all: bool) -> Self {
        Self {
            left: Box::new(left),
            operation,
            right: Box::new(right),
            all,
        }
    }
}

/// A complete query: either a simple query or a set operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QueryCommand {
    Query(Query),
    SetQuery(SetQuery),
}

impl QueryCommand {
    pub fn set(left: QueryCommand, operation: SetOperation, right: QueryCommand, all: bool) -> Self {
        QueryCommand::SetQuery(SetQuery::new(left, operation, right, all))
    }

    /// Columns produced by this command; a set query produces its left side's columns
    pub fn columns(&self) -> &[Column] {
        match self {
            QueryCommand::Query(query) => &query.columns,
            QueryCommand::SetQuery(set) => set.left.columns(),
        }
    }

    pub fn as_query(&self) -> Option<&Query> {
        match self {
            QueryCommand::Query(query) => Some(query),
            QueryCommand::SetQuery(_) => None,
        }
    }

    pub fn as_set_query(&self) -> Option<&SetQuery> {
        match self {
            QueryCommand::SetQuery(set) => Some(set),
            QueryCommand::Query(_) => None,
        }
    }

    /// Subqueries used directly as static operands of this command's constraints
    pub fn subqueries(&self) -> Vec<&QueryCommand> {
        match self {
            QueryCommand::Query(query) => query
                .constraint
                .iter()
                .flat_map(|c| c.static_operands())
                .filter_map(|operand| match operand {
                    StaticOperand::Subquery(sub) => Some(sub.as_ref()),
                    _ => None,
                })
                .collect(),
            QueryCommand::SetQuery(set) => {
                let mut out = set.left.subqueries();
                out.extend(set.right.subqueries());
                out
            }
        }
    }
}

impl From<Query> for QueryCommand {
    fn from(query: Query) -> Self {
        QueryCommand::Query(query)
    }
}
