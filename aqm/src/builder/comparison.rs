// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Comparison, range and arithmetic steps of the WHERE clause

use std::sync::Arc;

use crate::ast::{
    ArithmeticOperator, Constraint, DynamicOperand, Operator, QueryCommand, StaticOperand,
};
use crate::builder::constraint::ConstraintBuilder;
use crate::builder::error::BuildError;
use crate::builder::operand::OperandBuilder;
use crate::types::{type_names, TypeSystem, Value};

/// Completes a criterion on a dynamic operand
#[derive(Debug, Clone)]
pub struct ComparisonBuilder {
    constraint: ConstraintBuilder,
    operand: DynamicOperand,
}

impl ComparisonBuilder {
    pub(crate) fn new(constraint: ConstraintBuilder, operand: DynamicOperand) -> Self {
        Self {
            constraint,
            operand,
        }
    }

    fn compare(self, operator: Operator, value: StaticOperand) -> ConstraintBuilder {
        let Self {
            constraint,
            operand,
        } = self;
        constraint.add(Constraint::Comparison {
            operand,
            operator,
            value,
        })
    }

    /// Compare with a literal value or a subquery
    pub fn is_equal_to(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::EqualTo, value.into())
    }

    pub fn is_not_equal_to(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::NotEqualTo, value.into())
    }

    pub fn is_greater_than(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::GreaterThan, value.into())
    }

    pub fn is_greater_than_or_equal_to(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::GreaterThanOrEqualTo, value.into())
    }

    pub fn is_less_than(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::LessThan, value.into())
    }

    pub fn is_less_than_or_equal_to(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::LessThanOrEqualTo, value.into())
    }

    pub fn is_like(self, pattern: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.compare(Operator::Like, pattern.into())
    }

    /// Compare with the named bind variable
    pub fn is_equal_to_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::EqualTo, StaticOperand::variable(name))
    }

    pub fn is_not_equal_to_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::NotEqualTo, StaticOperand::variable(name))
    }

    pub fn is_greater_than_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::GreaterThan, StaticOperand::variable(name))
    }

    pub fn is_greater_than_or_equal_to_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::GreaterThanOrEqualTo, StaticOperand::variable(name))
    }

    pub fn is_less_than_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::LessThan, StaticOperand::variable(name))
    }

    pub fn is_less_than_or_equal_to_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::LessThanOrEqualTo, StaticOperand::variable(name))
    }

    pub fn is_like_variable(self, name: &str) -> ConstraintBuilder {
        self.compare(Operator::Like, StaticOperand::variable(name))
    }

    /// Choose the operator now and the right-hand side next
    pub fn is(self, operator: Operator) -> RightHandSide {
        RightHandSide {
            comparison: self,
            operator,
        }
    }

    pub fn is_in<I, V>(self, values: I) -> ConstraintBuilder
    where
        I: IntoIterator<Item = V>,
        V: Into<StaticOperand>,
    {
        let Self {
            constraint,
            operand,
        } = self;
        constraint.add(Constraint::SetCriteria {
            operand,
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn is_in_subquery(self, query: QueryCommand) -> ConstraintBuilder {
        self.is_in([StaticOperand::from(query)])
    }

    /// Inclusive range; boundaries default to inclusive
    pub fn is_between(self) -> LowerBoundary {
        LowerBoundary {
            comparison: self,
            inclusive: true,
        }
    }

    pub fn is_between_values(
        self,
        lower: impl Into<StaticOperand>,
        upper: impl Into<StaticOperand>,
    ) -> ConstraintBuilder {
        self.is_between().literal(lower).and().literal(upper)
    }

    pub fn plus(self) -> ArithmeticBuilder {
        self.arithmetic(ArithmeticOperator::Add)
    }

    pub fn minus(self) -> ArithmeticBuilder {
        self.arithmetic(ArithmeticOperator::Subtract)
    }

    pub fn times(self) -> ArithmeticBuilder {
        self.arithmetic(ArithmeticOperator::Multiply)
    }

    pub fn divided_by(self) -> ArithmeticBuilder {
        self.arithmetic(ArithmeticOperator::Divide)
    }

    fn arithmetic(self, operator: ArithmeticOperator) -> ArithmeticBuilder {
        ArithmeticBuilder {
            comparison: self,
            operator,
        }
    }
}

/// Right-hand side of a comparison whose operator is already known
#[derive(Debug, Clone)]
pub struct RightHandSide {
    comparison: ComparisonBuilder,
    operator: Operator,
}

impl RightHandSide {
    pub fn literal(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.with_value(value.into())
    }

    pub fn variable(self, name: &str) -> ConstraintBuilder {
        self.with_value(StaticOperand::variable(name))
    }

    pub fn subquery(self, query: QueryCommand) -> ConstraintBuilder {
        self.with_value(query.into())
    }

    pub fn cast(self, value: impl Into<Value>) -> CastAs<Self> {
        CastAs::new(self, value.into())
    }
}

impl CastTarget for RightHandSide {
    type Output = ConstraintBuilder;

    fn type_system(&self) -> Arc<dyn TypeSystem> {
        self.comparison.constraint.type_system()
    }

    fn with_value(self, value: StaticOperand) -> ConstraintBuilder {
        let operator = self.operator;
        self.comparison.compare(operator, value)
    }

    fn fail(self, error: BuildError) -> ConstraintBuilder {
        self.comparison.constraint.fail(error)
    }
}

/// Lower end of a BETWEEN
#[derive(Debug, Clone)]
pub struct LowerBoundary {
    comparison: ComparisonBuilder,
    inclusive: bool,
}

impl LowerBoundary {
    /// Exclude the lower boundary value from the range
    pub fn exclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    pub fn literal(self, value: impl Into<StaticOperand>) -> BetweenAnd {
        self.with_value(value.into())
    }

    pub fn variable(self, name: &str) -> BetweenAnd {
        self.with_value(StaticOperand::variable(name))
    }

    pub fn subquery(self, query: QueryCommand) -> BetweenAnd {
        self.with_value(query.into())
    }

    pub fn cast(self, value: impl Into<Value>) -> CastAs<Self> {
        CastAs::new(self, value.into())
    }
}

impl CastTarget for LowerBoundary {
    type Output = BetweenAnd;

    fn type_system(&self) -> Arc<dyn TypeSystem> {
        self.comparison.constraint.type_system()
    }

    fn with_value(self, value: StaticOperand) -> BetweenAnd {
        BetweenAnd {
            comparison: self.comparison,
            lower: value,
            lower_inclusive: self.inclusive,
        }
    }

    fn fail(self, error: BuildError) -> BetweenAnd {
        let Self {
            comparison,
            inclusive,
        } = self;
        let ComparisonBuilder {
            constraint,
            operand,
        } = comparison;
        // The latched error fails the query, so the placeholder is never seen
        BetweenAnd {
            comparison: ComparisonBuilder::new(constraint.fail(error), operand),
            lower: StaticOperand::Literal(Value::Null),
            lower_inclusive: inclusive,
        }
    }
}

/// Separates the two boundaries of a BETWEEN
#[derive(Debug, Clone)]
pub struct BetweenAnd {
    comparison: ComparisonBuilder,
    lower: StaticOperand,
    lower_inclusive: bool,
}

impl BetweenAnd {
    pub fn and(self) -> UpperBoundary {
        UpperBoundary {
            comparison: self.comparison,
            lower: self.lower,
            lower_inclusive: self.lower_inclusive,
            inclusive: true,
        }
    }
}

/// Upper end of a BETWEEN; completes the criterion
#[derive(Debug, Clone)]
pub struct UpperBoundary {
    comparison: ComparisonBuilder,
    lower: StaticOperand,
    lower_inclusive: bool,
    inclusive: bool,
}

impl UpperBoundary {
    /// Exclude the upper boundary value from the range
    pub fn exclusive(mut self) -> Self {
        self.inclusive = false;
        self
    }

    pub fn literal(self, value: impl Into<StaticOperand>) -> ConstraintBuilder {
        self.with_value(value.into())
    }

    pub fn variable(self, name: &str) -> ConstraintBuilder {
        self.with_value(StaticOperand::variable(name))
    }

    pub fn subquery(self, query: QueryCommand) -> ConstraintBuilder {
        self.with_value(query.into())
    }

    pub fn cast(self, value: impl Into<Value>) -> CastAs<Self> {
        CastAs::new(self, value.into())
    }
}

impl CastTarget for UpperBoundary {
    type Output = ConstraintBuilder;

    fn type_system(&self) -> Arc<dyn TypeSystem> {
        self.comparison.constraint.type_system()
    }

    fn with_value(self, value: StaticOperand) -> ConstraintBuilder {
        let ComparisonBuilder {
            constraint,
            operand,
        } = self.comparison;
        constraint.add(Constraint::Between {
            operand,
            lower: self.lower,
            upper: value,
            lower_inclusive: self.lower_inclusive,
            upper_inclusive: self.inclusive,
        })
    }

    fn fail(self, error: BuildError) -> ConstraintBuilder {
        self.comparison.constraint.fail(error)
    }
}

/// Right operand of an arithmetic expression
///
/// `a + b * c` groups as `a + (b * c)`: when the new operator binds tighter
/// than the operator of an arithmetic left operand, it takes that operand's
/// right side.
#[derive(Debug, Clone)]
pub struct ArithmeticBuilder {
    comparison: ComparisonBuilder,
    operator: ArithmeticOperator,
}

impl OperandBuilder for ArithmeticBuilder {
    type Output = ComparisonBuilder;

    fn with_operand(self, right: DynamicOperand) -> ComparisonBuilder {
        let Self {
            comparison,
            operator,
        } = self;
        let ComparisonBuilder {
            constraint,
            operand: left,
        } = comparison;
        let combined = match left {
            DynamicOperand::Arithmetic {
                left: inner_left,
                operator: inner_operator,
                right: inner_right,
            } if operator.precedes(inner_operator) => DynamicOperand::Arithmetic {
                left: inner_left,
                operator: inner_operator,
                right: Box::new(DynamicOperand::arithmetic(*inner_right, operator, right)),
            },
            left => DynamicOperand::arithmetic(left, operator, right),
        };
        ComparisonBuilder::new(constraint, combined)
    }
}

/// A step that accepts a static value, used as the target of [`CastAs`]
pub trait CastTarget: Sized {
    type Output;

    fn type_system(&self) -> Arc<dyn TypeSystem>;

    fn with_value(self, value: StaticOperand) -> Self::Output;

    /// Latch the error and continue
    fn fail(self, error: BuildError) -> Self::Output;
}

/// Converts a value to a named type before handing it to the next step
#[derive(Debug, Clone)]
pub struct CastAs<T> {
    target: T,
    value: Value,
}

impl<T: CastTarget> CastAs<T> {
    pub(crate) fn new(target: T, value: Value) -> Self {
        Self { target, value }
    }

    /// Cast through the type system's factory for `type_name`
    pub fn as_type(self, type_name: &str) -> T::Output {
        let type_system = self.target.type_system();
        let Some(factory) = type_system.type_factory(type_name) else {
            return self
                .target
                .fail(BuildError::UnknownType(type_name.to_string()));
        };
        match factory.create(&self.value) {
            Ok(value) => self.target.with_value(StaticOperand::Literal(value)),
            Err(e) => {
                let error = BuildError::InvalidCast {
                    value: self.value.to_lexical(),
                    type_name: factory.type_name().to_string(),
                    reason: e.to_string(),
                };
                self.target.fail(error)
            }
        }
    }

    pub fn as_string(self) -> T::Output {
        self.as_type(type_names::STRING)
    }

    pub fn as_boolean(self) -> T::Output {
        self.as_type(type_names::BOOLEAN)
    }

    pub fn as_long(self) -> T::Output {
        self.as_type(type_names::LONG)
    }

    pub fn as_double(self) -> T::Output {
        self.as_type(type_names::DOUBLE)
    }

    pub fn as_date(self) -> T::Output {
        self.as_type(type_names::DATE)
    }

    pub fn as_path(self) -> T::Output {
        self.as_type(type_names::PATH)
    }

    pub fn as_name(self) -> T::Output {
        self.as_type(type_names::NAME)
    }

    pub fn as_reference(self) -> T::Output {
        self.as_type(type_names::REFERENCE)
    }

    pub fn as_uri(self) -> T::Output {
        self.as_type(type_names::URI)
    }

    pub fn as_uuid(self) -> T::Output {
        self.as_type(type_names::UUID)
    }

    pub fn as_binary(self) -> T::Output {
        self.as_type(type_names::BINARY)
    }
}
