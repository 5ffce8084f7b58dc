// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Readable SQL-like rendering of AQM nodes
//!
//! The output is meant for logs, plans and test assertions. It is close to
//! JCR-SQL2 but is not guaranteed to be parseable.

use std::fmt;

use log::debug;

use crate::ast::ast::*;
use crate::types::Value;

/// Render a command and log it at debug level
pub fn pretty_print_query(command: &QueryCommand) -> String {
    let rendered = command.to_string();
    debug!("Query: {}", rendered);
    rendered
}

fn write_property(f: &mut fmt::Formatter<'_>, selector: &SelectorName, property: &str) -> fmt::Result {
    write!(f, "{}.{}", selector, property)
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for NamedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, " AS {}", alias)?;
        }
        Ok(())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::AllNodes(alias) => {
                write!(f, "{}", ALL_NODES_NAME)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
                Ok(())
            }
            Source::Selector(selector) => write!(f, "{}", selector),
            Source::Join(join) => write!(
                f,
                "{} {} {} ON {}",
                join.left,
                join.join_type.symbol(),
                join.right,
                join.condition
            ),
        }
    }
}

impl fmt::Display for JoinCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinCondition::EquiJoin {
                selector1,
                property1,
                selector2,
                property2,
            } => {
                write_property(f, selector1, property1)?;
                f.write_str(" = ")?;
                write_property(f, selector2, property2)
            }
            JoinCondition::SameNode {
                selector1,
                selector2,
                selector2_path,
            } => {
                write!(f, "ISSAMENODE({},{}", selector1, selector2)?;
                if let Some(path) = selector2_path {
                    write!(f, ",'{}'", path)?;
                }
                f.write_str(")")
            }
            JoinCondition::ChildNode { parent, child } => {
                write!(f, "ISCHILDNODE({},{})", child, parent)
            }
            JoinCondition::DescendantNode {
                ancestor,
                descendant,
            } => write!(f, "ISDESCENDANTNODE({},{})", descendant, ancestor),
        }
    }
}

impl fmt::Display for DynamicOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicOperand::PropertyValue { selector, property } => {
                write_property(f, selector, property)
            }
            DynamicOperand::ReferenceValue {
                selector, property, ..
            } => {
                write!(f, "REFERENCE({}", selector)?;
                if let Some(property) = property {
                    write!(f, ".{}", property)?;
                }
                f.write_str(")")
            }
            DynamicOperand::Length { selector, property } => {
                f.write_str("LENGTH(")?;
                write_property(f, selector, property)?;
                f.write_str(")")
            }
            DynamicOperand::NodeDepth { selector } => write!(f, "DEPTH({})", selector),
            DynamicOperand::NodePath { selector } => write!(f, "PATH({})", selector),
            DynamicOperand::NodeName { selector } => write!(f, "NAME({})", selector),
            DynamicOperand::NodeLocalName { selector } => write!(f, "LOCALNAME({})", selector),
            DynamicOperand::FullTextSearchScore { selector } => write!(f, "SCORE({})", selector),
            DynamicOperand::UpperCase(inner) => write!(f, "UPPER({})", inner),
            DynamicOperand::LowerCase(inner) => write!(f, "LOWER({})", inner),
            DynamicOperand::Arithmetic {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
        }
    }
}

fn write_literal(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("NULL"),
        Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        Value::Long(n) => write!(f, "{}", n),
        Value::Double(d) => write!(f, "{:?}", d),
        Value::Boolean(b) => write!(f, "{}", b),
        other => write!(
            f,
            "CAST('{}' AS {})",
            other.to_lexical().replace('\'', "''"),
            other.type_name().unwrap_or("STRING")
        ),
    }
}

impl fmt::Display for StaticOperand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticOperand::Literal(value) => write_literal(f, value),
            StaticOperand::BindVariable(name) => write!(f, "${}", name),
            StaticOperand::Subquery(query) => write!(f, "({})", query),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::And(left, right) => write!(f, "({} AND {})", left, right),
            Constraint::Or(left, right) => write!(f, "({} OR {})", left, right),
            Constraint::Not(inner) => write!(f, "NOT ({})", inner),
            Constraint::Comparison {
                operand,
                operator,
                value,
            } => write!(f, "{} {} {}", operand, operator.symbol(), value),
            Constraint::Between {
                operand,
                lower,
                upper,
                lower_inclusive,
                upper_inclusive,
            } => {
                write!(f, "{} BETWEEN {}", operand, lower)?;
                if !lower_inclusive {
                    f.write_str(" EXCLUSIVE")?;
                }
                write!(f, " AND {}", upper)?;
                if !upper_inclusive {
                    f.write_str(" EXCLUSIVE")?;
                }
                Ok(())
            }
            Constraint::SetCriteria { operand, values } => {
                write!(f, "{} IN (", operand)?;
                write_list(f, values, ",")?;
                f.write_str(")")
            }
            Constraint::PropertyExistence { selector, property } => {
                write_property(f, selector, property)?;
                f.write_str(" IS NOT NULL")
            }
            Constraint::FullTextSearch {
                selector,
                property,
                expression,
            } => {
                write!(f, "CONTAINS({}", selector)?;
                if let Some(property) = property {
                    write!(f, ".{}", property)?;
                }
                write!(f, ",'{}')", expression)
            }
            Constraint::SameNode { selector, path } => {
                write!(f, "ISSAMENODE({},'{}')", selector, path)
            }
            Constraint::ChildNode {
                selector,
                parent_path,
            } => write!(f, "ISCHILDNODE({},'{}')", selector, parent_path),
            Constraint::DescendantNode {
                selector,
                ancestor_path,
            } => write!(f, "ISDESCENDANTNODE({},'{}')", selector, ancestor_path),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_property(f, &self.selector, &self.property)?;
        if self.property != self.column_name {
            write!(f, " AS {}", self.column_name)?;
        }
        Ok(())
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.operand, self.order.symbol())
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row_limit {
            Some(rows) => {
                write!(f, "LIMIT {}", rows)?;
                if self.is_offset() {
                    write!(f, " OFFSET {}", self.offset)?;
                }
                Ok(())
            }
            None => write!(f, "OFFSET {}", self.offset),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        if self.distinct {
            f.write_str("DISTINCT ")?;
        }
        if self.columns.is_empty() {
            f.write_str("*")?;
        } else {
            write_list(f, &self.columns, ", ")?;
        }
        write!(f, " FROM {}", self.source)?;
        if let Some(constraint) = &self.constraint {
            write!(f, " WHERE {}", constraint)?;
        }
        if !self.orderings.is_empty() {
            f.write_str(" ORDER BY ")?;
            write_list(f, &self.orderings, ", ")?;
        }
        if !self.limit.is_unlimited() || self.limit.is_offset() {
            write!(f, " {}", self.limit)?;
        }
        Ok(())
    }
}

impl fmt::Display for SetQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.left, self.operation.symbol())?;
        if self.all {
            f.write_str("ALL ")?;
        }
        write!(f, "{}", self.right)
    }
}

impl fmt::Display for QueryCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryCommand::Query(query) => write!(f, "{}", query),
            QueryCommand::SetQuery(set) => write!(f, "{}", set),
        }
    }
}
