// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Shared entry points for dynamic operands

use crate::ast::DynamicOperand;
use crate::builder::query_builder::QueryBuilder;

/// A builder step that continues once a dynamic operand is known
///
/// Implementors provide [`with_operand`](Self::with_operand); every operand
/// kind is then available through the provided methods. Table arguments are
/// names or aliases of sources in the FROM clause.
pub trait OperandBuilder: Sized {
    type Output;

    fn with_operand(self, operand: DynamicOperand) -> Self::Output;

    fn property_value(self, table: &str, property: &str) -> Self::Output {
        self.with_operand(DynamicOperand::PropertyValue {
            selector: QueryBuilder::selector(table),
            property: property.to_string(),
        })
    }

    /// Any reference property of the node, weak references included
    fn reference_value(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::ReferenceValue {
            selector: QueryBuilder::selector(table),
            property: None,
            include_weak: true,
        })
    }

    fn reference_value_of(self, table: &str, property: &str) -> Self::Output {
        self.with_operand(DynamicOperand::ReferenceValue {
            selector: QueryBuilder::selector(table),
            property: Some(property.to_string()),
            include_weak: true,
        })
    }

    /// Any non-weak reference property of the node
    fn strong_reference_value(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::ReferenceValue {
            selector: QueryBuilder::selector(table),
            property: None,
            include_weak: false,
        })
    }

    fn length(self, table: &str, property: &str) -> Self::Output {
        self.with_operand(DynamicOperand::Length {
            selector: QueryBuilder::selector(table),
            property: property.to_string(),
        })
    }

    fn depth(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::NodeDepth {
            selector: QueryBuilder::selector(table),
        })
    }

    fn path(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::NodePath {
            selector: QueryBuilder::selector(table),
        })
    }

    fn node_name(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::NodeName {
            selector: QueryBuilder::selector(table),
        })
    }

    fn node_local_name(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::NodeLocalName {
            selector: QueryBuilder::selector(table),
        })
    }

    fn full_text_search_score(self, table: &str) -> Self::Output {
        self.with_operand(DynamicOperand::FullTextSearchScore {
            selector: QueryBuilder::selector(table),
        })
    }

    /// Wrap the operand that follows in UPPER(...)
    fn upper_case_of(self) -> CaseOf<Self> {
        CaseOf {
            inner: self,
            upper: true,
        }
    }

    /// Wrap the operand that follows in LOWER(...)
    fn lower_case_of(self) -> CaseOf<Self> {
        CaseOf {
            inner: self,
            upper: false,
        }
    }
}

/// Wraps the next operand in a case conversion before handing it on
#[derive(Debug, Clone)]
pub struct CaseOf<B> {
    inner: B,
    upper: bool,
}

impl<B: OperandBuilder> OperandBuilder for CaseOf<B> {
    type Output = B::Output;

    fn with_operand(self, operand: DynamicOperand) -> B::Output {
        let wrapped = if self.upper {
            DynamicOperand::UpperCase(Box::new(operand))
        } else {
            DynamicOperand::LowerCase(Box::new(operand))
        };
        self.inner.with_operand(wrapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects the operand it is given
    struct Capture;

    impl OperandBuilder for Capture {
        type Output = DynamicOperand;

        fn with_operand(self, operand: DynamicOperand) -> DynamicOperand {
            operand
        }
    }

    #[test]
    fn test_case_wrappers_nest() {
        let operand = Capture.upper_case_of().lower_case_of().node_name("t");
        assert_eq!(
            operand,
            DynamicOperand::UpperCase(Box::new(DynamicOperand::LowerCase(Box::new(
                DynamicOperand::NodeName {
                    selector: "t".into()
                }
            ))))
        );
    }

    #[test]
    fn test_reference_values() {
        assert_eq!(
            Capture.strong_reference_value("t"),
            DynamicOperand::ReferenceValue {
                selector: "t".into(),
                property: None,
                include_weak: false,
            }
        );
        assert_eq!(
            Capture.reference_value_of(" t ", "ref"),
            DynamicOperand::ReferenceValue {
                selector: "t".into(),
                property: Some("ref".into()),
                include_weak: true,
            }
        );
    }
}
