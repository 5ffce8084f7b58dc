// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! AST subsystem: the Abstract Query Model nodes and their readable rendering

#[allow(clippy::module_inception)]
mod ast;
pub use ast::*;
pub mod pretty_printer;
pub use pretty_printer::pretty_print_query;
