// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Result operators applied to the items produced by the select clause

use crate::error::{IrError, IrResult};
use crate::expr::{Expr, LambdaExpr};
use crate::streamed::StreamedDataInfo;
use crate::types::Type;
use crate::visitors::reverse_resolve;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator applied after projection (`Count`, `First`, `Take`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ResultOperator {
    Count,
    LongCount,
    First { return_default_when_empty: bool },
    Single { return_default_when_empty: bool },
    Last { return_default_when_empty: bool },
    Any,
    Distinct,
    Take { count: Expr },
    Skip { count: Expr },
    Contains { item: Expr },
    Sum,
    Min,
    Max,
    Average,
    Group(GroupResultOperator),
}

impl ResultOperator {
    /// Operator name as written in a query
    pub fn name(&self) -> &'static str {
        match self {
            ResultOperator::Count => "Count",
            ResultOperator::LongCount => "LongCount",
            ResultOperator::First {
                return_default_when_empty: false,
            } => "First",
            ResultOperator::First { .. } => "FirstOrDefault",
            ResultOperator::Single {
                return_default_when_empty: false,
            } => "Single",
            ResultOperator::Single { .. } => "SingleOrDefault",
            ResultOperator::Last {
                return_default_when_empty: false,
            } => "Last",
            ResultOperator::Last { .. } => "LastOrDefault",
            ResultOperator::Any => "Any",
            ResultOperator::Distinct => "Distinct",
            ResultOperator::Take { .. } => "Take",
            ResultOperator::Skip { .. } => "Skip",
            ResultOperator::Contains { .. } => "Contains",
            ResultOperator::Sum => "Sum",
            ResultOperator::Min => "Min",
            ResultOperator::Max => "Max",
            ResultOperator::Average => "Average",
            ResultOperator::Group(_) => "GroupBy",
        }
    }

    /// Expressions held by this operator
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            ResultOperator::Take { count } | ResultOperator::Skip { count } => vec![count],
            ResultOperator::Contains { item } => vec![item],
            ResultOperator::Group(group) => vec![&group.key_selector, &group.element_selector],
            _ => Vec::new(),
        }
    }

    /// Describe the data produced when this operator consumes `input`
    pub fn output_data_info(&self, input: &StreamedDataInfo) -> IrResult<StreamedDataInfo> {
        let StreamedDataInfo::Sequence { item_type } = input else {
            return Err(IrError::InvalidResultOperatorInput {
                operator: self.name().to_string(),
                input: input.to_string(),
            });
        };

        let info = match self {
            ResultOperator::Count => StreamedDataInfo::scalar(Type::Int32),
            ResultOperator::LongCount => StreamedDataInfo::scalar(Type::Int64),
            ResultOperator::Any | ResultOperator::Contains { .. } => {
                StreamedDataInfo::scalar(Type::Boolean)
            }
            ResultOperator::Average => StreamedDataInfo::scalar(Type::Double),
            ResultOperator::Sum | ResultOperator::Min | ResultOperator::Max => {
                StreamedDataInfo::scalar(item_type.clone())
            }
            ResultOperator::First {
                return_default_when_empty,
            }
            | ResultOperator::Single {
                return_default_when_empty,
            }
            | ResultOperator::Last {
                return_default_when_empty,
            } => StreamedDataInfo::single(item_type.clone(), *return_default_when_empty),
            ResultOperator::Distinct
            | ResultOperator::Take { .. }
            | ResultOperator::Skip { .. } => input.clone(),
            ResultOperator::Group(group) => StreamedDataInfo::sequence(group.grouping_type()),
        };
        Ok(info)
    }
}

impl fmt::Display for ResultOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultOperator::Take { count } | ResultOperator::Skip { count } => {
                write!(f, "{}({})", self.name(), count)
            }
            ResultOperator::Contains { item } => write!(f, "Contains({})", item),
            ResultOperator::Group(group) => write!(
                f,
                "GroupBy({}, {})",
                group.key_selector, group.element_selector
            ),
            _ => write!(f, "{}()", self.name()),
        }
    }
}

/// Grouping of the projected items by a key
///
/// Both selectors are stored in resolved form, i.e. they reference query
/// sources instead of lambda parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupResultOperator {
    /// Name of the grouping items
    pub item_name: String,
    pub key_selector: Expr,
    pub element_selector: Expr,
}

impl GroupResultOperator {
    pub fn new(item_name: impl Into<String>, key_selector: Expr, element_selector: Expr) -> Self {
        Self {
            item_name: item_name.into(),
            key_selector,
            element_selector,
        }
    }

    /// `IGrouping<TKey, TElement>` produced by this operator
    pub fn grouping_type(&self) -> Type {
        Type::grouping(self.key_selector.ty(), self.element_selector.ty())
    }

    /// Key selector as a lambda over the projected item
    ///
    /// `item_expression` is the select clause's selector; every query source
    /// reference in the key selector is replaced by its accessor on the item.
    pub fn key_selector_lambda(&self, item_expression: &Expr) -> IrResult<LambdaExpr> {
        reverse_resolve(item_expression, &self.key_selector)
    }

    /// Element selector as a lambda over the projected item
    pub fn element_selector_lambda(&self, item_expression: &Expr) -> IrResult<LambdaExpr> {
        reverse_resolve(item_expression, &self.element_selector)
    }
}
