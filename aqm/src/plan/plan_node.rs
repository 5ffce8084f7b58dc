// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Plan tree representation
//!
//! A plan is a tree of relational operators. Each node carries the data for
//! its operator, the selectors it produces tuples for, and its inputs.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::{
    Column, Constraint, JoinCondition, JoinType, Limit, Ordering, SelectorName, SetOperation,
};
use crate::schema::SchemaColumn;

/// Operator type of a plan node, without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlanNodeType {
    Access,
    DupRemove,
    Join,
    Project,
    Select,
    Sort,
    Source,
    Limit,
    SetOperation,
    DependentQuery,
    Null,
}

/// Operator of a plan node with its data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Boundary below which the processor reads from a single source
    Access,
    DupRemove,
    Join {
        join_type: JoinType,
        condition: JoinCondition,
    },
    Project {
        columns: Vec<Column>,
        column_types: Vec<String>,
    },
    Select {
        criteria: Constraint,
    },
    Sort {
        orderings: Vec<Ordering>,
    },
    Source {
        name: SelectorName,
        alias: Option<SelectorName>,
        columns: Vec<SchemaColumn>,
    },
    Limit {
        limit: Limit,
    },
    SetOperation {
        operation: SetOperation,
        all: bool,
    },
    /// Evaluates its first child and binds the result to `variable_name`
    /// before evaluating its second child
    DependentQuery {
        variable_name: String,
    },
    /// Produces no tuples
    Null,
}

impl NodeKind {
    pub fn node_type(&self) -> PlanNodeType {
        match self {
            NodeKind::Access => PlanNodeType::Access,
            NodeKind::DupRemove => PlanNodeType::DupRemove,
            NodeKind::Join { .. } => PlanNodeType::Join,
            NodeKind::Project { .. } => PlanNodeType::Project,
            NodeKind::Select { .. } => PlanNodeType::Select,
            NodeKind::Sort { .. } => PlanNodeType::Sort,
            NodeKind::Source { .. } => PlanNodeType::Source,
            NodeKind::Limit { .. } => PlanNodeType::Limit,
            NodeKind::SetOperation { .. } => PlanNodeType::SetOperation,
            NodeKind::DependentQuery { .. } => PlanNodeType::DependentQuery,
            NodeKind::Null => PlanNodeType::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    pub kind: NodeKind,
    pub selectors: BTreeSet<SelectorName>,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            selectors: BTreeSet::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(kind: NodeKind, children: Vec<PlanNode>) -> Self {
        let selectors = children
            .iter()
            .flat_map(|c| c.selectors.iter().cloned())
            .collect();
        Self {
            kind,
            selectors,
            children,
        }
    }

    /// Place a new operator on top of this plan
    pub fn wrap(self, kind: NodeKind) -> Self {
        Self::with_children(kind, vec![self])
    }

    pub fn apply_select(self, criteria: Constraint) -> Self {
        self.wrap(NodeKind::Select { criteria })
    }

    pub fn apply_project(self, columns: Vec<Column>, column_types: Vec<String>) -> Self {
        self.wrap(NodeKind::Project {
            columns,
            column_types,
        })
    }

    pub fn apply_distinct(self) -> Self {
        self.wrap(NodeKind::DupRemove)
    }

    pub fn apply_sort(self, orderings: Vec<Ordering>) -> Self {
        self.wrap(NodeKind::Sort { orderings })
    }

    pub fn apply_limit(self, limit: Limit) -> Self {
        self.wrap(NodeKind::Limit { limit })
    }

    pub fn node_type(&self) -> PlanNodeType {
        self.kind.node_type()
    }

    pub fn is(&self, node_type: PlanNodeType) -> bool {
        self.node_type() == node_type
    }

    pub fn first_child(&self) -> Option<&PlanNode> {
        self.children.first()
    }

    /// First node of the given type in pre-order, starting with this node
    pub fn find_at_or_below(&self, node_type: PlanNodeType) -> Option<&PlanNode> {
        if self.is(node_type) {
            return Some(self);
        }
        self.children
            .iter()
            .find_map(|child| child.find_at_or_below(node_type))
    }

    /// Every node of the given type, in pre-order
    pub fn find_all_at_or_below(&self, node_type: PlanNodeType) -> Vec<&PlanNode> {
        let mut found = Vec::new();
        self.collect(node_type, &mut found);
        found
    }

    fn collect<'a>(&'a self, node_type: PlanNodeType, found: &mut Vec<&'a PlanNode>) {
        if self.is(node_type) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(node_type, found);
        }
    }

    /// The PROJECT node whose columns describe this plan's results
    ///
    /// Subquery plans under a DEPENDENT_QUERY are skipped, and for set
    /// operations the left side determines the columns.
    pub fn result_project(&self) -> Option<&PlanNode> {
        match &self.kind {
            NodeKind::Project { .. } => Some(self),
            NodeKind::DependentQuery { .. } => {
                self.children.last().and_then(PlanNode::result_project)
            }
            _ => self.children.iter().find_map(PlanNode::result_project),
        }
    }

    /// Number of nodes in this tree
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(PlanNode::size).sum::<usize>()
    }

    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{:?} [", "  ".repeat(depth), self.node_type())?;
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", selector)?;
        }
        f.write_str("]")?;
        match &self.kind {
            NodeKind::Join {
                join_type,
                condition,
            } => write!(f, " {} ON {}", join_type.symbol(), condition)?,
            NodeKind::Project { columns, .. } => {
                let rendered: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
                write!(f, " {}", rendered.join(", "))?
            }
            NodeKind::Select { criteria } => write!(f, " {}", criteria)?,
            NodeKind::Sort { orderings } => {
                let rendered: Vec<String> = orderings.iter().map(|o| o.to_string()).collect();
                write!(f, " {}", rendered.join(", "))?
            }
            NodeKind::Source { name, alias, .. } => {
                write!(f, " {}", name)?;
                if let Some(alias) = alias {
                    write!(f, " AS {}", alias)?;
                }
            }
            NodeKind::Limit { limit } => write!(f, " {}", limit)?,
            NodeKind::SetOperation { operation, all } => {
                write!(f, " {}{}", operation.symbol(), if *all { " ALL" } else { "" })?
            }
            NodeKind::DependentQuery { variable_name } => write!(f, " ${}", variable_name)?,
            NodeKind::Access | NodeKind::DupRemove | NodeKind::Null => {}
        }
        for child in &self.children {
            writeln!(f)?;
            child.fmt_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}
