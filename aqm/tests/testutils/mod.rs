#![allow(dead_code)]

//! Test utilities for AQM integration tests
//!
//! - TestFixture: schemata, context and engine wired to a scripted processor
//! - RecordingProcessor / FailingPlanner: stand-ins for the pluggable stages

pub mod test_fixture;
