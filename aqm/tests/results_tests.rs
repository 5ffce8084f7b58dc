//! Integration tests for result columns and cursors

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;

use aqm::exec::ResultsError;
use aqm::prelude::*;
use proptest::prelude::*;

fn file_and_folder_columns() -> Columns {
    Columns::new(
        vec![
            Column::new("f", "name"),
            Column::new("f", "size"),
            Column::new("d", "name"),
        ],
        vec!["STRING".into(), "LONG".into(), "STRING".into()],
        false,
    )
}

fn row(file: &str, size: i64, folder: &str) -> Tuple {
    Tuple::new(
        vec![Value::from(file), Value::from(size), Value::from(folder)],
        vec![
            Location::new(format!("{}/{}", folder, file)),
            Location::new(folder),
        ],
    )
}

fn results(columns: Columns, tuples: Vec<Tuple>) -> QueryResults {
    QueryResults::new(
        Arc::new(columns),
        tuples,
        Arc::new(Problems::new()),
        Statistics::default(),
    )
}

#[test]
fn test_duplicate_column_names_are_qualified() {
    let columns = file_and_folder_columns();
    assert_eq!(
        columns.column_names(),
        &["name".to_string(), "size".to_string(), "d.name".to_string()]
    );
    assert_eq!(columns.location_count(), 2);
    assert_eq!(columns.column_index_for_property("d", "name"), Ok(2));
    assert!(matches!(
        columns.column_index_for_name("missing"),
        Err(ResultsError::NoSuchColumn(_))
    ));
}

#[test]
fn test_sub_select_of_all_columns_round_trips() {
    let columns = file_and_folder_columns();
    let same = columns.sub_select(columns.columns()).unwrap();
    assert_eq!(same, columns);
    assert_eq!(same.column_names(), columns.column_names());
    assert_eq!(same.selector_names(), columns.selector_names());
    assert_eq!(same.tuple_size(), columns.tuple_size());
    assert!(same.is_union_compatible(&columns));
}

#[test]
fn test_sub_select_reads_wrapped_tuples() {
    let columns = file_and_folder_columns();
    let narrowed = columns
        .sub_select(&[Column::new("d", "name"), Column::new("f", "size")])
        .unwrap();
    assert_eq!(narrowed.column_count(), 2);
    assert_eq!(narrowed.column_types(), &["STRING".to_string(), "LONG".to_string()]);
    assert!(columns.includes(narrowed.columns()));

    let results = results(narrowed, vec![row("a.txt", 12, "/docs")]);
    let mut cursor = results.cursor();
    cursor.next().unwrap();
    assert_eq!(cursor.value(0).unwrap(), &Value::from("/docs"));
    assert_eq!(cursor.value(1).unwrap(), &Value::from(12i64));
    assert_eq!(cursor.location(0).unwrap().path, "/docs");
    assert_eq!(cursor.location(1).unwrap().path, "/docs/a.txt");

    let unknown = columns.sub_select(&[Column::new("x", "name")]);
    assert!(matches!(unknown, Err(ResultsError::NoSuchColumn(_))));
}

#[test]
fn test_cursor_walks_rows_once() {
    let results = results(
        file_and_folder_columns(),
        vec![row("a.txt", 1, "/a"), row("b.txt", 2, "/b")],
    );
    let mut cursor = results.cursor();
    assert_eq!(cursor.value(0), Err(ResultsError::NotPositioned));

    let mut sizes = Vec::new();
    while cursor.has_next() {
        cursor.next().unwrap();
        sizes.push(cursor.value_by_name("size").unwrap().clone());
    }
    assert_eq!(sizes, vec![Value::from(1i64), Value::from(2i64)]);
    assert_eq!(cursor.row_index(), Ok(1));
    assert_eq!(cursor.next(), Err(ResultsError::Exhausted));
    assert_eq!(cursor.score("f"), Ok(None));
}

#[test]
fn test_scores_follow_selectors() {
    let columns = Columns::new(
        vec![Column::new("f", "name"), Column::new("d", "name")],
        vec!["STRING".into(), "STRING".into()],
        true,
    );
    assert!(columns.has_full_text_search_scores());
    let tuple = Tuple::new(
        vec![Value::from("a.txt"), Value::from("docs")],
        vec![Location::new("/docs/a.txt"), Location::new("/docs")],
    )
    .with_scores(vec![0.75, 0.25]);
    let results = results(columns, vec![tuple]);

    let mut cursor = results.cursor();
    cursor.next().unwrap();
    assert_eq!(cursor.score("f"), Ok(Some(0.75)));
    assert_eq!(cursor.score("d"), Ok(Some(0.25)));
    assert!(matches!(
        cursor.score("x"),
        Err(ResultsError::NoSuchSelector(_))
    ));
}

#[test]
fn test_empty_results_keep_problems() {
    let problems = Arc::new(Problems::new());
    problems.add_error(QueryProblem::TableDoesNotExist {
        table: "nt:gone".into(),
    });
    let results = QueryResults::empty(problems, Statistics::default());
    assert_eq!(results.row_count(), 0);
    assert!(results.has_errors());
    assert!(!results.cursor().has_next());
    assert_eq!(results.columns().column_count(), 0);
}

/// Columns with distinct property names, so no column name is qualified
fn arb_columns() -> impl Strategy<Value = Columns> {
    prop::collection::btree_map(
        "[a-z]{1,6}",
        (
            "[a-c]",
            prop_oneof![Just("STRING"), Just("LONG"), Just("DATE")],
        ),
        0..5,
    )
    .prop_map(|specs| {
        let (columns, types): (Vec<Column>, Vec<String>) = specs
            .into_iter()
            .map(|(property, (selector, type_name))| {
                (Column::new(selector, property), type_name.to_string())
            })
            .unzip();
        Columns::new(columns, types, false)
    })
}

proptest! {
    #[test]
    fn prop_union_compatibility_is_reflexive(columns in arb_columns()) {
        prop_assert!(columns.is_union_compatible(&columns));
    }

    #[test]
    fn prop_union_compatibility_is_symmetric(a in arb_columns(), b in arb_columns()) {
        prop_assert_eq!(a.is_union_compatible(&b), b.is_union_compatible(&a));
    }

    #[test]
    fn prop_union_compatibility_is_order_sensitive(columns in arb_columns()) {
        let mut reversed_columns = columns.columns().to_vec();
        reversed_columns.reverse();
        let mut reversed_types = columns.column_types().to_vec();
        reversed_types.reverse();
        let reversed = Columns::new(reversed_columns, reversed_types, false);

        prop_assert_eq!(
            columns.is_union_compatible(&reversed),
            columns.column_count() <= 1
        );
    }
}
