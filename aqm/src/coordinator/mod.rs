// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Query coordination - the entry point that runs a query command through
//! every stage of execution

pub mod engine_config;
pub mod query_engine;

pub use engine_config::EngineConfig;
pub use query_engine::QueryEngine;
