// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Expression and query model assertions

use unified_query_ir::visitors::{collect_query_source_references, contains_expression};
use unified_query_ir::{Expr, LambdaExpr, ParameterExpr, QueryModel, QuerySourceHandle};

/// Custom assertion helpers for expression trees
pub struct TreeAssertions;

impl TreeAssertions {
    /// Assert that an expression is a reference to the given query source
    pub fn assert_query_source_reference(expr: &Expr, source: &QuerySourceHandle) {
        match expr {
            Expr::QuerySourceReference(handle) => {
                assert_eq!(
                    handle, source,
                    "Expected reference to '{}', found reference to '{}'",
                    source.item_name, handle.item_name
                );
            }
            _ => panic!("Expected QuerySourceReference expression, found {:?}", expr),
        }
    }

    /// Assert the textual form of an expression
    pub fn assert_expr_text(expr: &Expr, expected: &str) {
        assert_eq!(expr.to_string(), expected, "Expression text mismatch");
    }

    /// Assert the textual form of a lambda
    pub fn assert_lambda_text(lambda: &LambdaExpr, expected: &str) {
        assert_eq!(lambda.to_string(), expected, "Lambda text mismatch");
    }

    /// Assert that a lambda is the identity over its single parameter
    pub fn assert_identity_lambda(lambda: &LambdaExpr, parameter: &ParameterExpr) {
        assert_eq!(lambda.parameters, vec![parameter.clone()], "Lambda parameter mismatch");
        assert_eq!(*lambda.body, parameter.to_expr(), "Lambda body is not the parameter");
    }

    /// Assert that `parameter` does not occur in `expr`
    pub fn assert_no_parameter(expr: &Expr, parameter: &ParameterExpr) {
        assert!(
            !contains_expression(expr, &parameter.to_expr()),
            "Parameter '{}' still occurs in '{}'",
            parameter.name,
            expr
        );
    }

    /// Assert that every query source referenced by `expr` is one of `sources`
    pub fn assert_references_only(expr: &Expr, sources: &[&QuerySourceHandle]) {
        for handle in collect_query_source_references(expr) {
            assert!(
                sources.contains(&handle),
                "Unexpected reference to '{}' in '{}'",
                handle.item_name,
                expr
            );
        }
    }

    /// Assert the textual form of a query model
    pub fn assert_model_text(model: &QueryModel, expected: &str) {
        assert_eq!(model.to_string(), expected, "Query model text mismatch");
    }
}
