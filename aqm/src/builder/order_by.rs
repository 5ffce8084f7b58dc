// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! ORDER BY clause construction

use crate::ast::{DynamicOperand, Order, Ordering};
use crate::builder::operand::OperandBuilder;
use crate::builder::query_builder::QueryBuilder;

/// Continuation for the ORDER BY clause
#[derive(Debug, Clone)]
pub struct OrderByBuilder {
    builder: QueryBuilder,
}

impl OrderByBuilder {
    pub(crate) fn new(builder: QueryBuilder) -> Self {
        Self { builder }
    }

    pub fn ascending(self) -> OrderByOperand {
        OrderByOperand {
            builder: self.builder,
            order: Order::Ascending,
        }
    }

    pub fn descending(self) -> OrderByOperand {
        OrderByOperand {
            builder: self.builder,
            order: Order::Descending,
        }
    }

    /// Continue with another ordering
    pub fn then(self) -> Self {
        self
    }

    pub fn end(self) -> QueryBuilder {
        self.builder
    }
}

/// The operand of one ordering
#[derive(Debug, Clone)]
pub struct OrderByOperand {
    builder: QueryBuilder,
    order: Order,
}

impl OperandBuilder for OrderByOperand {
    type Output = OrderByBuilder;

    fn with_operand(mut self, operand: DynamicOperand) -> OrderByBuilder {
        self.builder.orderings.push(Ordering {
            operand,
            order: self.order,
        });
        OrderByBuilder::new(self.builder)
    }
}
