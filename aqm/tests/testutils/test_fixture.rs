//! Test fixture for AQM integration tests
//!
//! Uses only the public API: a fixture owns a schemata, builds fresh query
//! contexts over it and runs commands through a `QueryEngine` whose processor
//! returns scripted rows.

use std::sync::Arc;

use aqm::prelude::*;
use parking_lot::Mutex;

/// Initialize logging once per test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Tables shared by the integration tests
pub fn sample_schemata() -> ImmutableSchemata {
    ImmutableSchemata::builder()
        .add_table("nt:file", &["name", "mimeType"])
        .add_column("nt:file", "size", "LONG")
        .make_searchable("nt:file", "name")
        .add_table("nt:folder", &["name", "path"])
        .add_table("nt:unstructured", &["title"])
        .mark_extra_columns("nt:unstructured")
        .build()
        .expect("sample schemata are valid")
}

/// Processor that returns the same rows for every plan and records each call
#[derive(Default)]
pub struct RecordingProcessor {
    rows: Vec<Tuple>,
    calls: Mutex<Vec<String>>,
}

impl RecordingProcessor {
    pub fn with_rows(rows: Vec<Tuple>) -> Self {
        Self {
            rows,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Rendered plans this processor was asked to execute
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

impl Processor for RecordingProcessor {
    fn execute(
        &self,
        context: &QueryContext,
        _command: &QueryCommand,
        statistics: Statistics,
        plan: &PlanNode,
        columns: Arc<Columns>,
    ) -> Result<QueryResults, ProcessingError> {
        self.calls.lock().push(plan.to_string());
        Ok(QueryResults::new(
            columns,
            self.rows.clone(),
            Arc::clone(context.problems()),
            statistics,
        ))
    }
}

/// Planner that reports an error and returns an empty plan
#[derive(Debug, Default)]
pub struct FailingPlanner;

impl Planner for FailingPlanner {
    fn create_plan(&self, context: &QueryContext, _command: &QueryCommand) -> PlanNode {
        context.problems().add_error(QueryProblem::InvalidQuery {
            reason: "planner refused the query".into(),
        });
        PlanNode::new(aqm::plan::NodeKind::Null)
    }
}

/// Test fixture with a sample schemata and an engine over a recording processor
pub struct TestFixture {
    schemata: Arc<ImmutableSchemata>,
    processor: Arc<RecordingProcessor>,
    engine: QueryEngine,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Fixture whose processor returns `rows` for every query
    pub fn with_rows(rows: Vec<Tuple>) -> Self {
        init_logging();
        let processor = Arc::new(RecordingProcessor::with_rows(rows));
        let engine = QueryEngine::new(processor.clone());
        Self {
            schemata: Arc::new(sample_schemata()),
            processor,
            engine,
        }
    }

    pub fn with_engine(mut self, configure: impl FnOnce(QueryEngine) -> QueryEngine) -> Self {
        self.engine = configure(self.engine);
        self
    }

    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(StandardTypeSystem::shared())
    }

    /// A fresh context; problems are not shared between executions
    pub fn context(&self) -> QueryContext {
        QueryContext::new(StandardTypeSystem::shared(), self.schemata.clone())
    }

    pub fn execute(&self, command: &QueryCommand) -> QueryResults {
        self.engine.execute(&self.context(), command)
    }

    pub fn execute_in(&self, context: &QueryContext, command: &QueryCommand) -> QueryResults {
        self.engine.execute(context, command)
    }

    pub fn processor(&self) -> &RecordingProcessor {
        &self.processor
    }
}
