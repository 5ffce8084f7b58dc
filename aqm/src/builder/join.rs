// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JOIN clause construction

use crate::ast::{JoinCondition, JoinType, SelectorName, Source};
use crate::builder::error::BuildError;
use crate::builder::query_builder::QueryBuilder;

/// A join whose right-hand source is known, waiting for its condition
///
/// Table names in a condition must name (by name or alias) the new source
/// or a source already joined on the left.
#[derive(Debug, Clone)]
pub struct JoinClause {
    builder: QueryBuilder,
    right: Source,
    join_type: JoinType,
}

impl JoinClause {
    pub(crate) fn new(builder: QueryBuilder, right: Source, join_type: JoinType) -> Self {
        Self {
            builder,
            right,
            join_type,
        }
    }

    /// Equi-join on an expression of the form `a.x = b.y`
    pub fn on(mut self, column_equality: &str) -> QueryBuilder {
        let Some(((selector1, property1), (selector2, property2))) = parse_equality(column_equality)
        else {
            self.builder
                .fail(BuildError::InvalidJoinCondition(column_equality.to_string()));
            return self.builder;
        };
        let selector1 = self.name_of(&selector1);
        let selector2 = self.name_of(&selector2);
        self.create_join(JoinCondition::EquiJoin {
            selector1,
            property1,
            selector2,
            property2,
        })
    }

    pub fn on_same_node(mut self, table1: &str, table2: &str) -> QueryBuilder {
        let selector1 = self.name_of(table1);
        let selector2 = self.name_of(table2);
        self.create_join(JoinCondition::SameNode {
            selector1,
            selector2,
            selector2_path: None,
        })
    }

    /// Same node, where `table2`'s node is reached by `path` relative to `table1`'s
    pub fn on_same_node_path(mut self, table1: &str, table2: &str, path: &str) -> QueryBuilder {
        let selector1 = self.name_of(table1);
        let selector2 = self.name_of(table2);
        self.create_join(JoinCondition::SameNode {
            selector1,
            selector2,
            selector2_path: Some(path.to_string()),
        })
    }

    pub fn on_child_node(mut self, parent_table: &str, child_table: &str) -> QueryBuilder {
        let parent = self.name_of(parent_table);
        let child = self.name_of(child_table);
        self.create_join(JoinCondition::ChildNode { parent, child })
    }

    pub fn on_descendant(mut self, ancestor_table: &str, descendant_table: &str) -> QueryBuilder {
        let ancestor = self.name_of(ancestor_table);
        let descendant = self.name_of(descendant_table);
        self.create_join(JoinCondition::DescendantNode {
            ancestor,
            descendant,
        })
    }

    /// Resolve a table name or alias to the name that qualifies its columns
    fn name_of(&mut self, table: &str) -> SelectorName {
        let table = table.trim();
        if let Some(resolved) = self
            .right
            .resolve(table)
            .or_else(|| self.builder.source.resolve(table))
        {
            return resolved;
        }
        self.builder
            .fail(BuildError::UnknownSelector(table.to_string()));
        SelectorName::new(table)
    }

    fn create_join(self, condition: JoinCondition) -> QueryBuilder {
        let Self {
            mut builder,
            right,
            join_type,
        } = self;
        let left = std::mem::replace(&mut builder.source, Source::AllNodes(None));
        builder.source = match left {
            // CROSS binds tighter than the join it follows
            Source::Join(previous)
                if join_type == JoinType::Cross && previous.join_type != JoinType::Cross =>
            {
                let previous = *previous;
                let cross = Source::join(previous.right, join_type, right, condition);
                Source::join(previous.left, previous.join_type, cross, previous.condition)
            }
            left => Source::join(left, join_type, right, condition),
        };
        builder
    }
}

/// Split `a.x = b.y` into its two `(selector, property)` sides
fn parse_equality(expression: &str) -> Option<((String, String), (String, String))> {
    let mut sides = expression.split('=');
    let (Some(left), Some(right), None) = (sides.next(), sides.next(), sides.next()) else {
        return None;
    };
    Some((parse_column(left)?, parse_column(right)?))
}

fn parse_column(side: &str) -> Option<(String, String)> {
    let (selector, property) = side.trim().split_once('.')?;
    let (selector, property) = (selector.trim(), property.trim());
    if selector.is_empty() || property.is_empty() {
        return None;
    }
    Some((selector.to_string(), property.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StandardTypeSystem;

    fn from_file() -> QueryBuilder {
        QueryBuilder::new(StandardTypeSystem::shared()).from("nt:file AS f")
    }

    #[test]
    fn test_equi_join() {
        let query = from_file()
            .left_outer_join("nt:folder AS d")
            .on("f.parentId = d.id")
            .query()
            .unwrap();
        let expected = Source::join(
            Source::aliased("nt:file", "f"),
            JoinType::LeftOuter,
            Source::aliased("nt:folder", "d"),
            JoinCondition::EquiJoin {
                selector1: "f".into(),
                property1: "parentId".into(),
                selector2: "d".into(),
                property2: "id".into(),
            },
        );
        assert_eq!(query.as_query().unwrap().source, expected);
    }

    #[test]
    fn test_names_resolve_to_aliases() {
        let query = from_file()
            .join("nt:folder AS d")
            .on_descendant("nt:folder", "nt:file")
            .query()
            .unwrap();
        match &query.as_query().unwrap().source {
            Source::Join(join) => assert_eq!(
                join.condition,
                JoinCondition::DescendantNode {
                    ancestor: "d".into(),
                    descendant: "f".into(),
                }
            ),
            other => panic!("unexpected source {:?}", other),
        }
    }

    #[test]
    fn test_malformed_equality() {
        for expression in ["f.a", "f.a = d.b = c.d", "a = d.b", "f. = d.b"] {
            let result = from_file().join("nt:folder AS d").on(expression).query();
            assert_eq!(
                result,
                Err(BuildError::InvalidJoinCondition(expression.to_string())),
                "{}",
                expression
            );
        }
    }

    #[test]
    fn test_unknown_selector() {
        let result = from_file()
            .join("nt:folder AS d")
            .on_same_node_path("f", "x", "a/b")
            .query();
        assert_eq!(result, Err(BuildError::UnknownSelector("x".into())));
    }

    #[test]
    fn test_all_nodes_join() {
        let query = from_file()
            .cross_join_all_nodes_as("n")
            .on_child_node("n", "f")
            .query()
            .unwrap();
        match &query.as_query().unwrap().source {
            Source::Join(join) => {
                assert_eq!(join.join_type, JoinType::Cross);
                assert_eq!(join.right, Source::AllNodes(Some("n".into())));
            }
            other => panic!("unexpected source {:?}", other),
        }
    }
}
