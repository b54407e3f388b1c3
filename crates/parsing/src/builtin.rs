// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Builtin query operators
//!
//! Each entry is `(method name, parameter count including the source, builder)`.

use crate::error::ParseResult;
use crate::node::NodeKind;
use crate::registry::{MethodCallParseInfo, NodeBuilder};
use unified_query_ir::{OrderingDirection, ResultOperator};

/// All builtin operators
pub fn all_operators() -> Vec<(&'static str, usize, NodeBuilder)> {
    vec![
        // Body operators
        op("Where", 2, where_node),
        op("Select", 2, select_node),
        op("SelectMany", 2, select_many_node),
        op("SelectMany", 3, select_many_with_result_node),
        op("OrderBy", 2, order_by_node),
        op("OrderByDescending", 2, order_by_descending_node),
        op("ThenBy", 2, then_by_node),
        op("ThenByDescending", 2, then_by_descending_node),
        op("GroupBy", 2, group_by_node),
        op("GroupBy", 3, group_by_with_element_node),
        // Result operators
        op("Count", 1, |_| result(ResultOperator::Count)),
        op("LongCount", 1, |_| result(ResultOperator::LongCount)),
        op("First", 1, |_| {
            result(ResultOperator::First {
                return_default_when_empty: false,
            })
        }),
        op("FirstOrDefault", 1, |_| {
            result(ResultOperator::First {
                return_default_when_empty: true,
            })
        }),
        op("Single", 1, |_| {
            result(ResultOperator::Single {
                return_default_when_empty: false,
            })
        }),
        op("SingleOrDefault", 1, |_| {
            result(ResultOperator::Single {
                return_default_when_empty: true,
            })
        }),
        op("Last", 1, |_| {
            result(ResultOperator::Last {
                return_default_when_empty: false,
            })
        }),
        op("LastOrDefault", 1, |_| {
            result(ResultOperator::Last {
                return_default_when_empty: true,
            })
        }),
        op("Any", 1, |_| result(ResultOperator::Any)),
        op("Distinct", 1, |_| result(ResultOperator::Distinct)),
        op("Sum", 1, |_| result(ResultOperator::Sum)),
        op("Min", 1, |_| result(ResultOperator::Min)),
        op("Max", 1, |_| result(ResultOperator::Max)),
        op("Average", 1, |_| result(ResultOperator::Average)),
        op("Take", 2, take_node),
        op("Skip", 2, skip_node),
        op("Contains", 2, contains_node),
    ]
}

fn op(name: &'static str, parameter_count: usize, builder: NodeBuilder) -> (&'static str, usize, NodeBuilder) {
    (name, parameter_count, builder)
}

fn result(operator: ResultOperator) -> ParseResult<NodeKind> {
    Ok(NodeKind::ResultOperator(operator))
}

fn where_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::Where {
        predicate: info.lambda_argument(0, 1)?.clone(),
    })
}

fn select_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::Select {
        selector: info.lambda_argument(0, 1)?.clone(),
    })
}

fn select_many_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::SelectMany {
        collection_selector: info.lambda_argument(0, 1)?.clone(),
        result_selector: None,
    })
}

fn select_many_with_result_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::SelectMany {
        collection_selector: info.lambda_argument(0, 1)?.clone(),
        result_selector: Some(info.lambda_argument(1, 2)?.clone()),
    })
}

fn order_by_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::OrderBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        direction: OrderingDirection::Asc,
    })
}

fn order_by_descending_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::OrderBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        direction: OrderingDirection::Desc,
    })
}

fn then_by_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::ThenBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        direction: OrderingDirection::Asc,
    })
}

fn then_by_descending_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::ThenBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        direction: OrderingDirection::Desc,
    })
}

fn group_by_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::GroupBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        element_selector: None,
    })
}

fn group_by_with_element_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    Ok(NodeKind::GroupBy {
        key_selector: info.lambda_argument(0, 1)?.clone(),
        element_selector: Some(info.lambda_argument(1, 1)?.clone()),
    })
}

fn take_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    result(ResultOperator::Take {
        count: info.argument(0)?.clone(),
    })
}

fn skip_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    result(ResultOperator::Skip {
        count: info.argument(0)?.clone(),
    })
}

fn contains_node(info: &MethodCallParseInfo<'_>) -> ParseResult<NodeKind> {
    result(ResultOperator::Contains {
        item: info.argument(0)?.clone(),
    })
}
