// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Timing statistics for the phases of one query execution

use std::cmp;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Immutable phase timings; durations are non-negative by construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statistics {
    planning: Duration,
    optimization: Duration,
    result_formulation: Duration,
    execution: Duration,
}

impl Statistics {
    pub fn new(
        planning: Duration,
        optimization: Duration,
        result_formulation: Duration,
        execution: Duration,
    ) -> Self {
        Self {
            planning,
            optimization,
            result_formulation,
            execution,
        }
    }

    pub fn planning_time(&self) -> Duration {
        self.planning
    }

    pub fn optimization_time(&self) -> Duration {
        self.optimization
    }

    pub fn result_formulation_time(&self) -> Duration {
        self.result_formulation
    }

    pub fn execution_time(&self) -> Duration {
        self.execution
    }

    pub fn total_time(&self) -> Duration {
        self.planning + self.optimization + self.result_formulation + self.execution
    }

    pub fn with_planning_time(self, planning: Duration) -> Self {
        Self { planning, ..self }
    }

    pub fn with_optimization_time(self, optimization: Duration) -> Self {
        Self {
            optimization,
            ..self
        }
    }

    pub fn with_result_formulation_time(self, result_formulation: Duration) -> Self {
        Self {
            result_formulation,
            ..self
        }
    }

    pub fn with_execution_time(self, execution: Duration) -> Self {
        Self { execution, ..self }
    }
}

impl PartialOrd for Statistics {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Statistics order by total time; ties are broken phase by phase so the
/// order stays consistent with equality
impl Ord for Statistics {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.total_time()
            .cmp(&other.total_time())
            .then(self.planning.cmp(&other.planning))
            .then(self.optimization.cmp(&other.optimization))
            .then(self.result_formulation.cmp(&other.result_formulation))
            .then(self.execution.cmp(&other.execution))
    }
}

/// Formats a duration in the largest unit that keeps the value at or above 1
pub(crate) struct Readable(pub Duration);

impl fmt::Display for Readable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        let (value, unit) = if nanos < 1_000 {
            return write!(f, "{} ns", nanos);
        } else if nanos < 1_000_000 {
            (nanos as f64 / 1_000.0, "usec")
        } else if nanos < 1_000_000_000 {
            (nanos as f64 / 1_000_000.0, "ms")
        } else {
            (nanos as f64 / 1_000_000_000.0, "sec")
        };
        let rendered = format!("{:.3}", value);
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{} {}", trimmed, unit)
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (plan={}, opt={}, res={}, exec={})",
            Readable(self.total_time()),
            Readable(self.planning),
            Readable(self.optimization),
            Readable(self.result_formulation),
            Readable(self.execution)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_sum_of_phases() {
        let stats = Statistics::new(
            Duration::from_micros(600),
            Duration::from_micros(700),
            Duration::from_nanos(50),
            Duration::from_millis(3),
        );
        assert_eq!(stats.total_time(), Duration::from_nanos(4_300_050));
    }

    #[test]
    fn test_with_replaces_one_phase() {
        let stats = Statistics::default().with_planning_time(Duration::from_millis(2));
        let stats = stats.with_execution_time(Duration::from_millis(5));
        assert_eq!(stats.planning_time(), Duration::from_millis(2));
        assert_eq!(stats.optimization_time(), Duration::ZERO);
        assert_eq!(stats.total_time(), Duration::from_millis(7));
    }

    #[test]
    fn test_ordering_by_total() {
        let fast = Statistics::default().with_execution_time(Duration::from_millis(1));
        let slow = Statistics::default().with_planning_time(Duration::from_millis(2));
        assert!(fast < slow);
        let same_total = Statistics::default().with_optimization_time(Duration::from_millis(1));
        assert_ne!(fast, same_total);
        assert_eq!(fast.total_time(), same_total.total_time());
    }

    #[test]
    fn test_display() {
        let stats = Statistics::new(
            Duration::from_micros(1500),
            Duration::from_nanos(250),
            Duration::from_micros(20),
            Duration::from_secs(2),
        );
        assert_eq!(
            stats.to_string(),
            "2.002 sec (plan=1.5 ms, opt=250 ns, res=20 usec, exec=2 sec)"
        );
    }
}
