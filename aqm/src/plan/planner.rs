// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Canonical query planning
//!
//! Converts a query command into a canonical plan tree and validates it
//! against the schemata. Validation failures are recorded in the context's
//! problem sink; planning itself never fails.

use std::fmt;

use log::debug;

use crate::ast::{
    Column, Constraint, DynamicOperand, JoinCondition, Query, QueryCommand, SelectorName, SetQuery,
    Source, StaticOperand,
};
use crate::exec::context::QueryContext;
use crate::exec::problems::{Problem, QueryProblem, Severity};
use crate::plan::plan_node::{NodeKind, PlanNode};
use crate::schema::Table;

/// Prefix of the bind variables that stand in for subquery results
pub const SUBQUERY_VARIABLE_PREFIX: &str = "__subquery";

/// Produces a plan for a query command
pub trait Planner: fmt::Debug + Send + Sync {
    fn create_plan(&self, context: &QueryContext, query: &QueryCommand) -> PlanNode;
}

/// Planner producing the canonical (unoptimized) plan shape:
/// LIMIT / SORT / DUP_REMOVE / PROJECT / SELECT* / (SOURCE | JOIN)
#[derive(Debug, Clone, Default)]
pub struct CanonicalPlanner;

impl CanonicalPlanner {
    pub fn new() -> Self {
        Self
    }
}

impl Planner for CanonicalPlanner {
    fn create_plan(&self, context: &QueryContext, query: &QueryCommand) -> PlanNode {
        let mut planning = Planning {
            context,
            validate_columns: context.hints().validate_column_existence,
            subquery_count: 0,
        };
        let plan = planning.plan_command(query);
        debug!(
            "Planned query into {} node(s), {} problem(s) recorded",
            plan.size(),
            context.problems().len()
        );
        plan
    }
}

/// A selector visible to the query being planned
struct Scoped<'a> {
    selector: SelectorName,
    table_name: SelectorName,
    table: Option<&'a Table>,
}

struct Planning<'a> {
    context: &'a QueryContext,
    validate_columns: bool,
    subquery_count: usize,
}

impl<'a> Planning<'a> {
    fn plan_command(&mut self, command: &QueryCommand) -> PlanNode {
        match command {
            QueryCommand::Query(query) => self.plan_query(query),
            QueryCommand::SetQuery(set) => self.plan_set_query(set),
        }
    }

    fn plan_set_query(&mut self, set: &SetQuery) -> PlanNode {
        self.context.update_hints(|h| h.has_set_query = true);
        let left = self.plan_command(&set.left);
        let right = self.plan_command(&set.right);
        if let (Some(left_count), Some(right_count)) = (column_count(&left), column_count(&right)) {
            if left_count != right_count {
                self.record(
                    QueryProblem::SetQueryNotUnionCompatible {
                        operation: set.operation.symbol().to_string(),
                        left: left_count,
                        right: right_count,
                    },
                    &set.to_string(),
                );
            }
        }
        PlanNode::with_children(
            NodeKind::SetOperation {
                operation: set.operation,
                all: set.all,
            },
            vec![left, right],
        )
    }

    fn plan_query(&mut self, query: &Query) -> PlanNode {
        let fragment = query.to_string();

        // Subqueries become bind variables bound by DEPENDENT_QUERY nodes
        let mut dependents: Vec<(String, QueryCommand)> = Vec::new();
        let count = &mut self.subquery_count;
        let constraint = query.constraint.as_ref().map(|c| {
            c.map_static_operands(&mut |operand| match operand {
                StaticOperand::Subquery(subquery) => {
                    *count += 1;
                    let name = format!("{}{}", SUBQUERY_VARIABLE_PREFIX, count);
                    dependents.push((name.clone(), (**subquery).clone()));
                    StaticOperand::BindVariable(name)
                }
                other => other.clone(),
            })
        });

        let mut scope = Vec::new();
        let mut plan = self.plan_source(&query.source, &mut scope, &fragment);

        if let Some(constraint) = &constraint {
            self.context.update_hints(|h| h.has_criteria = true);
            self.check_variables(constraint, &dependents, &fragment);
            for conjunct in constraint.conjuncts() {
                for selector in conjunct.selectors() {
                    self.check_selector(&selector, &scope, &fragment);
                }
                if conjunct.has_full_text_search() {
                    self.context.update_hints(|h| h.has_full_text_search = true);
                }
                plan = plan.apply_select(conjunct.clone());
            }
        }

        let (columns, column_types) = self.project_columns(query, &scope, &fragment);
        plan = plan.apply_project(columns, column_types);

        if query.distinct {
            plan = plan.apply_distinct();
        }

        if !query.orderings.is_empty() {
            self.context.update_hints(|h| h.has_sort = true);
            for ordering in &query.orderings {
                let mut properties = Vec::new();
                collect_properties(&ordering.operand, &mut properties);
                for (selector, property) in &properties {
                    self.check_property(selector, property, &scope, &fragment);
                }
                for selector in ordering.operand.selectors() {
                    if !properties.iter().any(|(checked, _)| **checked == selector) {
                        self.check_selector(&selector, &scope, &fragment);
                    }
                }
            }
            plan = plan.apply_sort(query.orderings.clone());
        }

        if !query.limit.is_unlimited() || query.limit.is_offset() {
            self.context.update_hints(|h| h.has_limit = true);
            plan = plan.apply_limit(query.limit);
        }

        if !dependents.is_empty() {
            self.context.update_hints(|h| h.has_subqueries = true);
        }
        // The first subquery ends up outermost so it is evaluated first
        let mut subplans = Vec::with_capacity(dependents.len());
        for (variable_name, subquery) in dependents {
            subplans.push((variable_name, self.plan_command(&subquery)));
        }
        for (variable_name, subplan) in subplans.into_iter().rev() {
            plan = PlanNode::with_children(
                NodeKind::DependentQuery { variable_name },
                vec![subplan, plan],
            );
        }
        plan
    }

    fn plan_source(
        &mut self,
        source: &Source,
        scope: &mut Vec<Scoped<'a>>,
        fragment: &str,
    ) -> PlanNode {
        let named = match source {
            Source::Join(join) => {
                let left = self.plan_source(&join.left, scope, fragment);
                let right = self.plan_source(&join.right, scope, fragment);
                for selector in join.condition.selectors() {
                    self.check_selector(selector, scope, fragment);
                }
                if let JoinCondition::EquiJoin {
                    selector1,
                    property1,
                    selector2,
                    property2,
                } = &join.condition
                {
                    self.check_property(selector1, property1, scope, fragment);
                    self.check_property(selector2, property2, scope, fragment);
                }
                let outer = join.join_type.is_outer();
                self.context.update_hints(|h| {
                    h.has_join = true;
                    h.has_optional_join |= outer;
                });
                return PlanNode::with_children(
                    NodeKind::Join {
                        join_type: join.join_type,
                        condition: join.condition.clone(),
                    },
                    vec![left, right],
                );
            }
            Source::AllNodes(alias) => crate::ast::NamedSelector {
                name: SelectorName::all_nodes(),
                alias: alias.clone(),
            },
            Source::Selector(named) => named.clone(),
        };

        let schemata: &'a dyn crate::schema::Schemata = self.context.schemata().as_ref();
        let table = schemata.table(&named.name);
        if table.is_none() && !named.name.is_all_nodes() {
            self.record(
                QueryProblem::TableDoesNotExist {
                    table: named.name.to_string(),
                },
                fragment,
            );
        }
        let selector = named.alias_or_name().clone();
        let mut node = PlanNode::new(NodeKind::Source {
            name: named.name.clone(),
            alias: named.alias.clone(),
            columns: table.map(|t| t.columns.clone()).unwrap_or_default(),
        });
        node.selectors.insert(selector.clone());
        scope.push(Scoped {
            selector,
            table_name: named.name,
            table,
        });
        node
    }

    /// Columns and types of the PROJECT node; no columns means every
    /// select-star column of every source
    fn project_columns(
        &mut self,
        query: &Query,
        scope: &[Scoped<'a>],
        fragment: &str,
    ) -> (Vec<Column>, Vec<String>) {
        let default_type = self.context.type_system().default_type().to_string();
        if query.columns.is_empty() {
            return scope
                .iter()
                .filter_map(|scoped| scoped.table.map(|table| (scoped, table)))
                .flat_map(|(scoped, table)| {
                    table.select_star_columns().map(move |column| {
                        (
                            Column::new(scoped.selector.clone(), column.name.clone()),
                            column.type_name.clone(),
                        )
                    })
                })
                .unzip();
        }

        let mut types = Vec::with_capacity(query.columns.len());
        for column in &query.columns {
            self.check_property(&column.selector, &column.property, scope, fragment);
            let type_name = find(scope, &column.selector)
                .and_then(|scoped| scoped.table)
                .and_then(|table| table.column(&column.property))
                .map(|c| c.type_name.clone())
                .unwrap_or_else(|| default_type.clone());
            types.push(type_name);
        }
        (query.columns.clone(), types)
    }

    fn check_selector(&self, selector: &SelectorName, scope: &[Scoped<'a>], fragment: &str) -> bool {
        if find(scope, selector).is_some() {
            return true;
        }
        self.record(
            QueryProblem::SelectorNotInQuery {
                selector: selector.to_string(),
            },
            fragment,
        );
        false
    }

    fn check_property(
        &self,
        selector: &SelectorName,
        property: &str,
        scope: &[Scoped<'a>],
        fragment: &str,
    ) {
        if !self.check_selector(selector, scope, fragment) || !self.validate_columns {
            return;
        }
        let Some(scoped) = find(scope, selector) else {
            return;
        };
        if let Some(table) = scoped.table {
            if !table.allows_extra_columns() && table.column(property).is_none() {
                self.record(
                    QueryProblem::ColumnDoesNotExistOnTable {
                        column: property.to_string(),
                        table: scoped.table_name.to_string(),
                    },
                    fragment,
                );
            }
        }
    }

    fn check_variables(
        &self,
        constraint: &Constraint,
        dependents: &[(String, QueryCommand)],
        fragment: &str,
    ) {
        for operand in constraint.static_operands() {
            if let StaticOperand::BindVariable(name) = operand {
                let bound = self.context.variable(name).is_some()
                    || dependents.iter().any(|(dependent, _)| dependent == name);
                if !bound {
                    self.context.problems().add(
                        Problem::new(
                            Severity::Warning,
                            QueryProblem::UnboundVariable { name: name.clone() },
                        )
                        .with_fragment(fragment),
                    );
                }
            }
        }
    }

    fn record(&self, kind: QueryProblem, fragment: &str) {
        self.context
            .problems()
            .add(Problem::new(Severity::Error, kind).with_fragment(fragment));
    }
}

fn find<'s, 'a>(scope: &'s [Scoped<'a>], selector: &SelectorName) -> Option<&'s Scoped<'a>> {
    scope.iter().find(|scoped| &scoped.selector == selector)
}

fn column_count(plan: &PlanNode) -> Option<usize> {
    match &plan.result_project()?.kind {
        NodeKind::Project { columns, .. } => Some(columns.len()),
        _ => None,
    }
}

/// Every (selector, property) pair read by an operand
fn collect_properties<'o>(operand: &'o DynamicOperand, out: &mut Vec<(&'o SelectorName, &'o str)>) {
    match operand {
        DynamicOperand::PropertyValue { selector, property }
        | DynamicOperand::Length { selector, property } => out.push((selector, property)),
        DynamicOperand::UpperCase(inner) | DynamicOperand::LowerCase(inner) => {
            collect_properties(inner, out)
        }
        DynamicOperand::Arithmetic { left, right, .. } => {
            collect_properties(left, out);
            collect_properties(right, out);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{JoinType, Limit, Operator, Ordering, SetOperation};
    use crate::plan::plan_node::PlanNodeType;
    use crate::plan::PlanHints;
    use crate::schema::ImmutableSchemata;
    use crate::types::StandardTypeSystem;
    use std::sync::Arc;

    fn context() -> QueryContext {
        let schemata = ImmutableSchemata::builder()
            .add_table("nt:file", &["name", "mimeType"])
            .add_column("nt:file", "size", "LONG")
            .exclude_from_select_star("nt:file", "mimeType")
            .add_table("nt:folder", &["name", "path"])
            .add_table("nt:unstructured", &["title"])
            .mark_extra_columns("nt:unstructured")
            .build()
            .unwrap();
        QueryContext::new(StandardTypeSystem::shared(), Arc::new(schemata))
    }

    fn name_equals(selector: &str, value: &str) -> Constraint {
        Constraint::Comparison {
            operand: DynamicOperand::PropertyValue {
                selector: selector.into(),
                property: "name".into(),
            },
            operator: Operator::EqualTo,
            value: value.into(),
        }
    }

    fn node_types(plan: &PlanNode) -> Vec<PlanNodeType> {
        let mut types = vec![plan.node_type()];
        let mut current = plan;
        while let Some(child) = current.first_child() {
            types.push(child.node_type());
            current = child;
        }
        types
    }

    #[test]
    fn test_canonical_shape() {
        let ctx = context();
        let mut query = Query::new(Source::aliased("nt:file", "f"));
        query.columns = vec![Column::new("f", "name"), Column::new("f", "size")];
        query.constraint = Some(Constraint::and(
            name_equals("f", "a"),
            Constraint::PropertyExistence {
                selector: "f".into(),
                property: "size".into(),
            },
        ));
        query.orderings = vec![Ordering::ascending(DynamicOperand::PropertyValue {
            selector: "f".into(),
            property: "name".into(),
        })];
        query.limit = Limit::new(10, 0);
        query.distinct = true;

        let plan = CanonicalPlanner::new().create_plan(&ctx, &query.into());
        assert!(!ctx.problems().has_errors(), "{}", ctx.problems());
        assert_eq!(
            node_types(&plan),
            vec![
                PlanNodeType::Limit,
                PlanNodeType::Sort,
                PlanNodeType::DupRemove,
                PlanNodeType::Project,
                PlanNodeType::Select,
                PlanNodeType::Select,
                PlanNodeType::Source,
            ]
        );
        match &plan.result_project().unwrap().kind {
            NodeKind::Project { column_types, .. } => {
                assert_eq!(column_types, &vec!["STRING".to_string(), "LONG".to_string()])
            }
            other => panic!("unexpected node {:?}", other),
        }
        let hints = ctx.hints();
        assert!(hints.has_criteria && hints.has_sort && hints.has_limit);
        assert!(!hints.has_join);
    }

    #[test]
    fn test_select_star_uses_select_star_columns() {
        let ctx = context();
        let query = Query::new(Source::named("nt:file"));
        let plan = CanonicalPlanner::new().create_plan(&ctx, &query.into());
        match &plan.kind {
            NodeKind::Project { columns, .. } => {
                let names: Vec<&str> = columns.iter().map(|c| c.property.as_str()).collect();
                assert_eq!(names, vec!["name", "size"]);
            }
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_missing_table_and_column() {
        let ctx = context();
        let mut query = Query::new(Source::named("nt:missing"));
        query.columns = vec![Column::new("nt:missing", "x")];
        CanonicalPlanner::new().create_plan(&ctx, &query.into());
        let problems = ctx.problems().snapshot();
        assert_eq!(problems.len(), 1);
        assert_eq!(
            problems[0].kind,
            QueryProblem::TableDoesNotExist {
                table: "nt:missing".into()
            }
        );

        let ctx = context();
        let mut query = Query::new(Source::named("nt:file"));
        query.columns = vec![Column::new("nt:file", "owner")];
        CanonicalPlanner::new().create_plan(&ctx, &query.into());
        assert!(ctx.problems().has_errors());

        let lenient = context().with_hints(PlanHints {
            validate_column_existence: false,
            ..PlanHints::default()
        });
        let mut query = Query::new(Source::named("nt:file"));
        query.columns = vec![Column::new("nt:file", "owner")];
        CanonicalPlanner::new().create_plan(&lenient, &query.into());
        assert!(!lenient.problems().has_errors());
    }

    #[test]
    fn test_extra_columns_are_not_validated() {
        let ctx = context();
        let mut query = Query::new(Source::named("nt:unstructured"));
        query.columns = vec![Column::new("nt:unstructured", "anything")];
        let plan = CanonicalPlanner::new().create_plan(&ctx, &query.into());
        assert!(!ctx.problems().has_errors());
        match &plan.kind {
            NodeKind::Project { column_types, .. } => assert_eq!(column_types[0], "STRING"),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_unknown_selector_in_criteria() {
        let ctx = context();
        let mut query = Query::new(Source::named("nt:file"));
        query.constraint = Some(name_equals("x", "a"));
        CanonicalPlanner::new().create_plan(&ctx, &query.into());
        let problems = ctx.problems().snapshot();
        assert_eq!(
            problems[0].kind,
            QueryProblem::SelectorNotInQuery {
                selector: "x".into()
            }
        );
        assert!(problems[0].fragment.as_deref().unwrap().starts_with("SELECT"));
    }

    #[test]
    fn test_join_sets_hints() {
        let ctx = context();
        let source = Source::join(
            Source::aliased("nt:file", "f"),
            JoinType::LeftOuter,
            Source::aliased("nt:folder", "d"),
            JoinCondition::ChildNode {
                parent: "d".into(),
                child: "f".into(),
            },
        );
        let plan = CanonicalPlanner::new().create_plan(&ctx, &Query::new(source).into());
        let join = plan.find_at_or_below(PlanNodeType::Join).unwrap();
        assert_eq!(join.selectors.len(), 2);
        assert_eq!(join.children.len(), 2);
        let hints = ctx.hints();
        assert!(hints.has_join && hints.has_optional_join);
        match &plan.kind {
            NodeKind::Project { columns, .. } => assert_eq!(columns.len(), 4),
            other => panic!("unexpected node {:?}", other),
        }
    }

    #[test]
    fn test_subqueries_become_dependent_queries() {
        let ctx = context();
        let mut inner = Query::new(Source::named("nt:folder"));
        inner.columns = vec![Column::new("nt:folder", "name")];
        let mut outer = Query::new(Source::named("nt:file"));
        outer.columns = vec![Column::new("nt:file", "name")];
        outer.constraint = Some(Constraint::SetCriteria {
            operand: DynamicOperand::PropertyValue {
                selector: "nt:file".into(),
                property: "name".into(),
            },
            values: vec![QueryCommand::from(inner).into()],
        });

        let plan = CanonicalPlanner::new().create_plan(&ctx, &outer.into());
        match &plan.kind {
            NodeKind::DependentQuery { variable_name } => assert_eq!(variable_name, "__subquery1"),
            other => panic!("unexpected node {:?}", other),
        }
        let select = plan.children[1].find_at_or_below(PlanNodeType::Select).unwrap();
        match &select.kind {
            NodeKind::Select { criteria } => {
                assert_eq!(
                    criteria.static_operands(),
                    vec![&StaticOperand::variable("__subquery1")]
                );
            }
            other => panic!("unexpected node {:?}", other),
        }
        assert!(ctx.hints().has_subqueries);
        assert!(ctx.problems().is_empty());
    }

    #[test]
    fn test_unbound_variable_is_a_warning() {
        let ctx = context();
        let mut query = Query::new(Source::named("nt:file"));
        query.constraint = Some(Constraint::Comparison {
            operand: DynamicOperand::PropertyValue {
                selector: "nt:file".into(),
                property: "name".into(),
            },
            operator: Operator::EqualTo,
            value: StaticOperand::variable("name"),
        });
        CanonicalPlanner::new().create_plan(&ctx, &query.clone().into());
        assert!(ctx.problems().has_warnings());
        assert!(!ctx.problems().has_errors());

        let bound = context().with_variable("name", "a.txt");
        CanonicalPlanner::new().create_plan(&bound, &query.into());
        assert!(bound.problems().is_empty());
    }

    #[test]
    fn test_set_query_column_counts() {
        let ctx = context();
        let mut left = Query::new(Source::named("nt:file"));
        left.columns = vec![Column::new("nt:file", "name")];
        let right = Query::new(Source::named("nt:folder"));
        let command = QueryCommand::set(left.into(), SetOperation::Union, right.into(), false);
        let plan = CanonicalPlanner::new().create_plan(&ctx, &command);
        assert!(plan.is(PlanNodeType::SetOperation));
        assert!(ctx.hints().has_set_query);
        assert_eq!(
            ctx.problems().snapshot()[0].kind,
            QueryProblem::SetQueryNotUnionCompatible {
                operation: "UNION".into(),
                left: 1,
                right: 2,
            }
        );
    }
}
