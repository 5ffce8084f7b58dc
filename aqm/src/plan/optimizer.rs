// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Rule-based plan optimization
//!
//! The optimizer rewrites a canonical plan by applying an ordered list of
//! rules. Each rule takes ownership of the plan and returns the rewritten
//! tree; rules record nothing but trace logging.

use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::ast::{Constraint, JoinType, SelectorName};
use crate::exec::context::QueryContext;
use crate::plan::plan_node::{NodeKind, PlanNode, PlanNodeType};

/// Rewrites a plan into an equivalent, cheaper plan
pub trait Optimizer: fmt::Debug + Send + Sync {
    fn optimize(&self, context: &QueryContext, plan: PlanNode) -> PlanNode;
}

/// One rewrite step of a [`RuleBasedOptimizer`]
pub trait OptimizerRule: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, context: &QueryContext, plan: PlanNode) -> PlanNode;
}

/// Applies its rules in order, once each
#[derive(Debug, Clone)]
pub struct RuleBasedOptimizer {
    rules: Vec<Arc<dyn OptimizerRule>>,
}

impl RuleBasedOptimizer {
    /// Optimizer with the standard rule list
    pub fn new() -> Self {
        Self::with_rules(vec![Arc::new(AddAccessNodes), Arc::new(PushSelectCriteria)])
    }

    pub fn with_rules(rules: Vec<Arc<dyn OptimizerRule>>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.name())
    }
}

impl Default for RuleBasedOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for RuleBasedOptimizer {
    fn optimize(&self, context: &QueryContext, plan: PlanNode) -> PlanNode {
        let optimized = self.rules.iter().fold(plan, |plan, rule| {
            let before = plan.size();
            let plan = rule.apply(context, plan);
            trace!(
                "Rule {} applied ({} -> {} nodes)",
                rule.name(),
                before,
                plan.size()
            );
            plan
        });
        debug!("Optimized plan with {} rule(s)", self.rules.len());
        optimized
    }
}

/// Places an ACCESS node above every SOURCE node
#[derive(Debug, Clone, Copy, Default)]
pub struct AddAccessNodes;

impl OptimizerRule for AddAccessNodes {
    fn name(&self) -> &'static str {
        "AddAccessNodes"
    }

    fn apply(&self, _context: &QueryContext, plan: PlanNode) -> PlanNode {
        add_access_nodes(plan)
    }
}

fn add_access_nodes(mut plan: PlanNode) -> PlanNode {
    if plan.is(PlanNodeType::Source) {
        trace!("Adding ACCESS above source {:?}", plan.selectors);
        return plan.wrap(NodeKind::Access);
    }
    // Already-wrapped sources are left alone
    if plan.is(PlanNodeType::Access) {
        return plan;
    }
    plan.children = plan.children.into_iter().map(add_access_nodes).collect();
    plan
}

/// Moves SELECT nodes that reference a single selector down to sit directly
/// above that selector's ACCESS node
#[derive(Debug, Clone, Copy, Default)]
pub struct PushSelectCriteria;

impl OptimizerRule for PushSelectCriteria {
    fn name(&self) -> &'static str {
        "PushSelectCriteria"
    }

    fn apply(&self, _context: &QueryContext, plan: PlanNode) -> PlanNode {
        push_select_criteria(plan)
    }
}

fn push_select_criteria(plan: PlanNode) -> PlanNode {
    let PlanNode {
        kind,
        selectors,
        children,
    } = plan;
    let children: Vec<PlanNode> = children.into_iter().map(push_select_criteria).collect();

    let NodeKind::Select { criteria } = kind else {
        return PlanNode {
            kind,
            selectors,
            children,
        };
    };
    let referenced = criteria.selectors();
    let mut children = children;
    if referenced.len() == 1 && children.len() == 1 {
        if let Some(selector) = referenced.into_iter().next() {
            let mut child = children.remove(0);
            // Already directly above its ACCESS node
            if child.is(PlanNodeType::Access) && child.selectors.contains(&selector) {
                return child.apply_select(criteria);
            }
            return match insert_above_access(&mut child, &selector, criteria) {
                Ok(()) => {
                    trace!("Pushed criteria on {} down to its ACCESS node", selector);
                    child
                }
                Err(criteria) => child.apply_select(criteria),
            };
        }
    }
    PlanNode::with_children(NodeKind::Select { criteria }, children)
}

/// Insert a SELECT directly above the ACCESS node for `selector`, handing
/// the criteria back when there is no such node
fn insert_above_access(
    plan: &mut PlanNode,
    selector: &SelectorName,
    criteria: Constraint,
) -> Result<(), Constraint> {
    // Criteria are not pushed into dependent subquery plans or across set operations
    if plan.is(PlanNodeType::SetOperation) || plan.is(PlanNodeType::DependentQuery) {
        return Err(criteria);
    }
    let position = plan.children.iter().enumerate().position(|(index, child)| {
        child.is(PlanNodeType::Access)
            && child.selectors.contains(selector)
            && accepts_criteria(plan, index)
    });
    if let Some(position) = position {
        let access = plan.children.remove(position);
        plan.children.insert(position, access.apply_select(criteria));
        return Ok(());
    }
    let mut criteria = criteria;
    let join_type = join_type_of(plan);
    for (index, child) in plan.children.iter_mut().enumerate() {
        if !child.selectors.contains(selector) || !side_accepts_criteria(join_type, index) {
            continue;
        }
        match insert_above_access(child, selector, criteria) {
            Ok(()) => return Ok(()),
            Err(returned) => criteria = returned,
        }
    }
    Err(criteria)
}

fn join_type_of(plan: &PlanNode) -> Option<JoinType> {
    match &plan.kind {
        NodeKind::Join { join_type, .. } => Some(*join_type),
        _ => None,
    }
}

fn accepts_criteria(plan: &PlanNode, index: usize) -> bool {
    side_accepts_criteria(join_type_of(plan), index)
}

/// Criteria on the null-supplying side of an outer join must stay above the join
fn side_accepts_criteria(join_type: Option<JoinType>, index: usize) -> bool {
    match join_type {
        Some(JoinType::LeftOuter) => index == 0,
        Some(JoinType::RightOuter) => index == 1,
        Some(JoinType::FullOuter) => false,
        _ => true,
    }
}
