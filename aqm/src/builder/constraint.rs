// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! WHERE clause construction
//!
//! Boolean structure is tracked with an explicit stack of frames owned by
//! the [`QueryBuilder`]. `open_paren` pushes a frame and `close_paren` pops
//! it, handing the parenthesized constraint to the enclosing frame.

use std::sync::Arc;

use log::trace;

use crate::ast::{Constraint, DynamicOperand};
use crate::builder::comparison::ComparisonBuilder;
use crate::builder::error::BuildError;
use crate::builder::operand::OperandBuilder;
use crate::builder::query_builder::QueryBuilder;
use crate::types::TypeSystem;

/// State of one (possibly parenthesized) constraint clause
#[derive(Debug, Clone, Default)]
pub(crate) struct ConstraintFrame {
    /// Most recently completed constraint
    constraint: Option<Constraint>,
    /// Whether `constraint` is exactly a closed parenthesized group
    constraint_grouped: bool,
    /// Left operand of a pending AND / OR
    left: Option<Constraint>,
    left_grouped: bool,
    and: bool,
    negate: bool,
}

impl ConstraintFrame {
    /// Fold the pending negation and connective into `constraint`
    fn build_logical(&mut self) {
        if self.negate {
            if let Some(constraint) = self.constraint.take() {
                self.constraint = Some(Constraint::negate(constraint));
                self.constraint_grouped = false;
                self.negate = false;
            }
        }
        if self.left.is_none() || self.constraint.is_none() {
            return;
        }
        let (Some(left), Some(right)) = (self.left.take(), self.constraint.take()) else {
            return;
        };
        let combined = if !self.and {
            Constraint::or(left, right)
        } else {
            match left {
                // AND binds tighter than an OR that was not explicitly parenthesized
                Constraint::Or(or_left, or_right) if !self.left_grouped => {
                    Constraint::Or(or_left, Box::new(Constraint::and(*or_right, right)))
                }
                left => Constraint::and(left, right),
            }
        };
        self.constraint = Some(combined);
        self.constraint_grouped = false;
        self.left_grouped = false;
    }

    fn connect(&mut self, and: bool) {
        self.build_logical();
        self.left = self.constraint.take();
        self.left_grouped = self.constraint_grouped;
        self.constraint_grouped = false;
        self.and = and;
    }

    fn set_constraint(&mut self, constraint: Constraint, grouped: bool) {
        // Two constraints without a connective between them are ANDed
        if self.constraint.is_some() && self.left.is_none() {
            // A pending NOT belongs to the incoming constraint
            let negate = std::mem::take(&mut self.negate);
            self.connect(true);
            self.negate = negate;
        }
        self.constraint = Some(constraint);
        self.constraint_grouped = grouped;
        self.build_logical();
    }
}

/// Continuation for the clauses of a WHERE clause
#[derive(Debug, Clone)]
pub struct ConstraintBuilder {
    builder: QueryBuilder,
}

impl ConstraintBuilder {
    pub(crate) fn new(builder: QueryBuilder) -> Self {
        Self { builder }
    }

    pub(crate) fn type_system(&self) -> Arc<dyn TypeSystem> {
        Arc::clone(self.builder.type_system())
    }

    /// Latch an error and carry on without adding a constraint
    pub(crate) fn fail(mut self, error: BuildError) -> Self {
        self.builder.fail(error);
        self
    }

    fn frame(&mut self) -> &mut ConstraintFrame {
        if self.builder.frames.is_empty() {
            self.builder.frames.push(ConstraintFrame::default());
        }
        let last = self.builder.frames.len() - 1;
        &mut self.builder.frames[last]
    }

    /// Complete the WHERE clause and return to the query builder
    pub fn end(mut self) -> QueryBuilder {
        if self.builder.frames.len() > 1 {
            self.builder
                .fail(BuildError::UnbalancedParenthesis("missing closing parenthesis"));
        }
        let mut frames = std::mem::take(&mut self.builder.frames);
        // Unclosed groups are folded into their parents so nothing is lost
        while let Some(mut frame) = frames.pop() {
            frame.build_logical();
            match frames.last_mut() {
                Some(parent) => {
                    if let Some(constraint) = frame.constraint {
                        parent.set_constraint(constraint, true);
                    }
                }
                None => self.builder.constraint = frame.constraint,
            }
        }
        self.builder
    }

    /// Start a parenthesized group, finished by [`close_paren`](Self::close_paren)
    pub fn open_paren(mut self) -> Self {
        self.builder.frames.push(ConstraintFrame::default());
        self
    }

    pub fn close_paren(mut self) -> Self {
        if self.builder.frames.len() < 2 {
            self.builder
                .fail(BuildError::UnbalancedParenthesis("unexpected closing parenthesis"));
            return self;
        }
        let mut group = match self.builder.frames.pop() {
            Some(frame) => frame,
            None => return self,
        };
        group.build_logical();
        if let Some(constraint) = group.constraint {
            trace!("Closed parenthesized constraint {}", constraint);
            self.frame().set_constraint(constraint, true);
        }
        self
    }

    /// AND the previous clause with the next one
    pub fn and(mut self) -> Self {
        self.frame().connect(true);
        self
    }

    /// OR the previous clause with the next one
    pub fn or(mut self) -> Self {
        self.frame().connect(false);
        self
    }

    /// Negate the next clause (or parenthesized group)
    pub fn not(mut self) -> Self {
        self.frame().negate = true;
        self
    }

    pub(crate) fn add(mut self, constraint: Constraint) -> Self {
        self.frame().set_constraint(constraint, false);
        self
    }

    /// The node of `table` is the node at `path`
    pub fn is_same_node(self, table: &str, path: &str) -> Self {
        self.add(Constraint::SameNode {
            selector: QueryBuilder::selector(table),
            path: path.to_string(),
        })
    }

    /// The node of `table` is a child of the node at `parent_path`
    pub fn is_child(self, table: &str, parent_path: &str) -> Self {
        self.add(Constraint::ChildNode {
            selector: QueryBuilder::selector(table),
            parent_path: parent_path.to_string(),
        })
    }

    /// The node of `table` is a descendant of the node at `ancestor_path`
    pub fn is_below_path(self, table: &str, ancestor_path: &str) -> Self {
        self.add(Constraint::DescendantNode {
            selector: QueryBuilder::selector(table),
            ancestor_path: ancestor_path.to_string(),
        })
    }

    pub fn has_property(self, table: &str, property: &str) -> Self {
        self.add(Constraint::PropertyExistence {
            selector: QueryBuilder::selector(table),
            property: property.to_string(),
        })
    }

    /// Full-text search over all of the node's properties
    pub fn search(self, table: &str, expression: &str) -> Self {
        self.add(Constraint::FullTextSearch {
            selector: QueryBuilder::selector(table),
            property: None,
            expression: expression.to_string(),
        })
    }

    /// Full-text search over one property
    pub fn search_property(self, table: &str, property: &str, expression: &str) -> Self {
        self.add(Constraint::FullTextSearch {
            selector: QueryBuilder::selector(table),
            property: Some(property.to_string()),
            expression: expression.to_string(),
        })
    }
}

impl OperandBuilder for ConstraintBuilder {
    type Output = ComparisonBuilder;

    fn with_operand(self, operand: DynamicOperand) -> ComparisonBuilder {
        ComparisonBuilder::new(self, operand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Operator, StaticOperand};
    use crate::types::StandardTypeSystem;

    fn builder() -> ConstraintBuilder {
        QueryBuilder::new(StandardTypeSystem::shared())
            .from("t")
            .where_()
    }

    fn c(name: &str) -> Constraint {
        Constraint::PropertyExistence {
            selector: "t".into(),
            property: name.into(),
        }
    }

    fn finish(builder: ConstraintBuilder) -> Constraint {
        let query = builder.end().query().unwrap();
        query.as_query().unwrap().constraint.clone().unwrap()
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let constraint = finish(
            builder()
                .has_property("t", "a")
                .or()
                .has_property("t", "b")
                .and()
                .has_property("t", "c"),
        );
        assert_eq!(constraint, Constraint::or(c("a"), Constraint::and(c("b"), c("c"))));
    }

    #[test]
    fn test_not_applies_to_next_constraint_under_implicit_and() {
        let constraint = finish(
            builder()
                .has_property("t", "a")
                .not()
                .has_property("t", "b"),
        );
        assert_eq!(constraint, Constraint::and(c("a"), Constraint::negate(c("b"))));

        let grouped = finish(
            builder()
                .has_property("t", "a")
                .not()
                .open_paren()
                .has_property("t", "b")
                .or()
                .has_property("t", "c")
                .close_paren(),
        );
        assert_eq!(
            grouped,
            Constraint::and(c("a"), Constraint::negate(Constraint::or(c("b"), c("c"))))
        );
    }

    #[test]
    fn test_parenthesized_or_is_not_rewritten() {
        let constraint = finish(
            builder()
                .open_paren()
                .has_property("t", "a")
                .or()
                .has_property("t", "b")
                .close_paren()
                .and()
                .has_property("t", "c"),
        );
        assert_eq!(constraint, Constraint::and(Constraint::or(c("a"), c("b")), c("c")));
    }

    #[test]
    fn test_earlier_group_does_not_disable_rewrite() {
        let constraint = finish(
            builder()
                .open_paren()
                .has_property("t", "x")
                .close_paren()
                .and()
                .has_property("t", "a")
                .or()
                .has_property("t", "b")
                .and()
                .has_property("t", "c"),
        );
        assert_eq!(
            constraint,
            Constraint::or(
                Constraint::and(c("x"), c("a")),
                Constraint::and(c("b"), c("c"))
            )
        );
    }

    #[test]
    fn test_and_then_or_is_left_associative() {
        let constraint = finish(
            builder()
                .has_property("t", "a")
                .and()
                .has_property("t", "b")
                .or()
                .has_property("t", "c"),
        );
        assert_eq!(constraint, Constraint::or(Constraint::and(c("a"), c("b")), c("c")));
    }

    #[test]
    fn test_implicit_and() {
        let constraint = finish(builder().has_property("t", "a").has_property("t", "b"));
        assert_eq!(constraint, Constraint::and(c("a"), c("b")));
    }

    #[test]
    fn test_not_wraps_next_constraint_only() {
        let constraint = finish(
            builder()
                .not()
                .has_property("t", "a")
                .and()
                .has_property("t", "b"),
        );
        assert_eq!(constraint, Constraint::and(Constraint::negate(c("a")), c("b")));

        let constraint = finish(
            builder()
                .not()
                .open_paren()
                .has_property("t", "a")
                .or()
                .has_property("t", "b")
                .close_paren(),
        );
        assert_eq!(constraint, Constraint::negate(Constraint::or(c("a"), c("b"))));
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        let result = builder().has_property("t", "a").close_paren().end().query();
        assert_eq!(
            result,
            Err(BuildError::UnbalancedParenthesis("unexpected closing parenthesis"))
        );
        let result = builder().open_paren().has_property("t", "a").end().query();
        assert!(matches!(result, Err(BuildError::UnbalancedParenthesis(_))));
    }

    #[test]
    fn test_structural_and_search_predicates() {
        let constraint = finish(
            builder()
                .is_child("t", "/a")
                .is_below_path("t", "/b")
                .is_same_node("t", "/b/c")
                .search_property("t", "title", "rust"),
        );
        let conjuncts = constraint.conjuncts();
        assert_eq!(conjuncts.len(), 4);
        assert!(constraint.has_full_text_search());
        assert_eq!(
            conjuncts[0],
            &Constraint::ChildNode {
                selector: "t".into(),
                parent_path: "/a".into()
            }
        );
    }

    #[test]
    fn test_comparison_round_trip_through_builder() {
        let constraint = finish(builder().depth("t").is_greater_than(2i64));
        assert_eq!(
            constraint,
            Constraint::Comparison {
                operand: DynamicOperand::NodeDepth {
                    selector: "t".into()
                },
                operator: Operator::GreaterThan,
                value: StaticOperand::from(2i64),
            }
        );
    }
}
