//! Integration tests for the query engine
//!
//! These tests run commands through every stage and verify that problems
//! stop execution before the processor is reached, that plans and columns
//! are handed to the processor, and that timings are reported per stage.

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;
use std::time::Duration;

use aqm::prelude::*;
use proptest::prelude::*;
use testutils::test_fixture::{FailingPlanner, TestFixture};

fn select_names(fixture: &TestFixture, table: &str) -> QueryCommand {
    fixture
        .builder()
        .select(&["t.name"])
        .from(&format!("{} AS t", table))
        .query()
        .expect("query builds")
}

#[test]
fn test_rows_from_processor_are_returned() {
    let rows = vec![
        Tuple::new(vec![Value::from("a.txt")], vec![Location::new("/a.txt")]),
        Tuple::new(vec![Value::from("b.txt")], vec![Location::new("/b.txt")]),
    ];
    let fixture = TestFixture::with_rows(rows);
    let results = fixture.execute(&select_names(&fixture, "nt:file"));

    assert!(!results.has_errors());
    assert_eq!(results.row_count(), 2);
    assert_eq!(fixture.processor().calls().len(), 1);

    let mut cursor = results.cursor();
    cursor.next().unwrap();
    assert_eq!(cursor.value_by_name("name").unwrap(), &Value::from("a.txt"));
    assert_eq!(cursor.location_for_selector("t").unwrap().path, "/a.txt");
}

#[test]
fn test_missing_table_short_circuits() {
    let fixture = TestFixture::new();
    let results = fixture.execute(&select_names(&fixture, "nt:missing"));

    assert!(results.has_errors());
    assert_eq!(results.row_count(), 0);
    assert!(fixture.processor().calls().is_empty());
    assert!(results.problems().iter().any(|problem| matches!(
        &problem.kind,
        QueryProblem::TableDoesNotExist { table } if table == "nt:missing"
    )));
    assert_eq!(results.statistics().execution_time(), Duration::ZERO);
}

#[test]
fn test_planner_errors_skip_optimizer_and_processor() {
    let fixture = TestFixture::new().with_engine(|engine| {
        engine.with_planner(Arc::new(FailingPlanner))
    });
    let results = fixture.execute(&select_names(&fixture, "nt:file"));

    assert!(results.has_errors());
    assert_eq!(results.row_count(), 0);
    assert!(fixture.processor().calls().is_empty());
    assert_eq!(results.statistics().optimization_time(), Duration::ZERO);
    assert_eq!(results.columns().column_count(), 0);
}

#[test]
fn test_unknown_column_is_reported_unless_lenient() {
    let fixture = TestFixture::new();
    let command = fixture
        .builder()
        .select(&["t.colour"])
        .from("nt:file AS t")
        .query()
        .unwrap();

    let results = fixture.execute(&command);
    assert!(results.has_errors());
    assert!(fixture.processor().calls().is_empty());

    let lenient = fixture.context().with_hints(PlanHints {
        validate_column_existence: false,
        ..PlanHints::default()
    });
    let results = fixture.execute_in(&lenient, &command);
    assert!(!results.has_errors());
    assert_eq!(fixture.processor().calls().len(), 1);
}

#[test]
fn test_processor_sees_optimized_plan() {
    let fixture = TestFixture::new();
    let command = fixture
        .builder()
        .select(&["t.name"])
        .from("nt:file AS t")
        .where_()
        .property_value("t", "size")
        .is_greater_than(1024i64)
        .end()
        .order_by()
        .descending()
        .property_value("t", "size")
        .end()
        .limit(5)
        .query()
        .unwrap();
    fixture.execute(&command);

    let calls = fixture.processor().calls();
    let plan = calls.first().expect("processor called");
    let kinds: Vec<&str> = plan
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(
        kinds,
        vec!["Limit", "Sort", "Project", "Select", "Access", "Source"]
    );
}

#[test]
fn test_diagnostic_config_attaches_plan() {
    let fixture =
        TestFixture::new().with_engine(|engine| engine.with_config(EngineConfig::diagnostic()));
    let results = fixture.execute(&select_names(&fixture, "nt:file"));
    let plan = results.plan().expect("plan attached");
    assert!(plan.starts_with("Project"));
}

#[test]
fn test_set_query_with_mismatched_columns() {
    let fixture = TestFixture::new();
    let command = fixture
        .builder()
        .select(&["t.name"])
        .from("nt:file AS t")
        .union()
        .select(&["t.name", "t.path"])
        .from("nt:folder AS t")
        .query()
        .unwrap();
    let results = fixture.execute(&command);

    assert!(results.has_errors());
    assert!(results.problems().iter().any(|problem| matches!(
        problem.kind,
        QueryProblem::SetQueryNotUnionCompatible {
            left: 1,
            right: 2,
            ..
        }
    )));
}

#[test]
fn test_unbound_variable_warns_but_executes() {
    let fixture = TestFixture::new();
    let command = fixture
        .builder()
        .select(&["t.name"])
        .from("nt:file AS t")
        .where_()
        .property_value("t", "name")
        .is_equal_to_variable("wanted")
        .end()
        .query()
        .unwrap();

    let results = fixture.execute(&command);
    assert!(!results.has_errors());
    assert!(results.has_warnings());
    assert_eq!(fixture.processor().calls().len(), 1);

    let bound = fixture.context().with_variable("wanted", "a.txt");
    let results = fixture.execute_in(&bound, &command);
    assert!(!results.has_warnings());
}

proptest! {
    #[test]
    fn prop_total_time_is_sum_of_phases(
        planning in 0u64..1_000_000,
        optimization in 0u64..1_000_000,
        formulation in 0u64..1_000_000,
        execution in 0u64..1_000_000,
    ) {
        let statistics = Statistics::default()
            .with_planning_time(Duration::from_nanos(planning))
            .with_optimization_time(Duration::from_nanos(optimization))
            .with_result_formulation_time(Duration::from_nanos(formulation))
            .with_execution_time(Duration::from_nanos(execution));
        prop_assert_eq!(
            statistics.total_time(),
            Duration::from_nanos(planning + optimization + formulation + execution)
        );
    }

    #[test]
    fn prop_statistics_order_follows_total_time(
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
    ) {
        let first = Statistics::default().with_execution_time(Duration::from_nanos(a));
        let second = Statistics::default().with_planning_time(Duration::from_nanos(b));
        if a < b {
            prop_assert!(first < second);
        } else if a > b {
            prop_assert!(first > second);
        }
    }
}
