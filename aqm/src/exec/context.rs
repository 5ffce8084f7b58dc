// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Per-execution services shared by the planner, optimizer and processor

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::exec::problems::Problems;
use crate::plan::PlanHints;
use crate::schema::Schemata;
use crate::types::{TypeSystem, Value};

/// Immutable bundle of the services one query execution needs
///
/// Every `with_*` method returns a new context that replaces exactly one
/// field and shares the others. The hints and problem sink are shared
/// accumulators: a planner holding `&QueryContext` records into them.
#[derive(Debug, Clone)]
pub struct QueryContext {
    type_system: Arc<dyn TypeSystem>,
    schemata: Arc<dyn Schemata>,
    hints: Arc<RwLock<PlanHints>>,
    problems: Arc<Problems>,
    variables: Arc<HashMap<String, Value>>,
}

impl QueryContext {
    /// Create a context with fresh hints, an empty problem sink and no variables
    pub fn new(type_system: Arc<dyn TypeSystem>, schemata: Arc<dyn Schemata>) -> Self {
        Self {
            type_system,
            schemata,
            hints: Arc::new(RwLock::new(PlanHints::default())),
            problems: Arc::new(Problems::new()),
            variables: Arc::new(HashMap::new()),
        }
    }

    pub fn type_system(&self) -> &Arc<dyn TypeSystem> {
        &self.type_system
    }

    pub fn schemata(&self) -> &Arc<dyn Schemata> {
        &self.schemata
    }

    /// Snapshot of the current hints
    pub fn hints(&self) -> PlanHints {
        self.hints.read().clone()
    }

    /// Record planning discoveries into the shared hints
    pub fn update_hints(&self, f: impl FnOnce(&mut PlanHints)) {
        f(&mut *self.hints.write());
    }

    pub fn problems(&self) -> &Arc<Problems> {
        &self.problems
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn with_type_system(&self, type_system: Arc<dyn TypeSystem>) -> Self {
        Self {
            type_system,
            ..self.clone()
        }
    }

    pub fn with_schemata(&self, schemata: Arc<dyn Schemata>) -> Self {
        Self {
            schemata,
            ..self.clone()
        }
    }

    pub fn with_hints(&self, hints: PlanHints) -> Self {
        Self {
            hints: Arc::new(RwLock::new(hints)),
            ..self.clone()
        }
    }

    pub fn with_problems(&self, problems: Arc<Problems>) -> Self {
        Self {
            problems,
            ..self.clone()
        }
    }

    pub fn with_variables(&self, variables: HashMap<String, Value>) -> Self {
        Self {
            variables: Arc::new(variables),
            ..self.clone()
        }
    }

    /// Same context with one additional (or replaced) bind variable
    pub fn with_variable(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut variables = (*self.variables).clone();
        variables.insert(name.into(), value.into());
        self.with_variables(variables)
    }
}

impl PartialEq for QueryContext {
    /// Hints and problems are execution-scoped and do not take part in equality
    fn eq(&self, other: &Self) -> bool {
        same_service(&self.type_system, &other.type_system)
            && same_service(&self.schemata, &other.schemata)
            && self.variables == other.variables
    }
}

fn same_service<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}
