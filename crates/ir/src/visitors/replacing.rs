// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use super::{ExprRewriter, rewrite_infallible, walk_expr};
use crate::expr::Expr;
use std::convert::Infallible;

/// Replaces every occurrence of one expression with another
pub struct ReplacingRewriter<'a> {
    search: &'a Expr,
    replacement: &'a Expr,
}

impl<'a> ReplacingRewriter<'a> {
    pub fn new(search: &'a Expr, replacement: &'a Expr) -> Self {
        Self {
            search,
            replacement,
        }
    }
}

impl ExprRewriter for ReplacingRewriter<'_> {
    type Error = Infallible;

    fn rewrite_expr(&mut self, expr: &Expr) -> Result<Expr, Infallible> {
        if expr == self.search {
            return Ok(self.replacement.clone());
        }
        match (expr, self.search) {
            // A lambda re-declaring the searched parameter binds its own variable
            (Expr::Lambda(lambda), Expr::Parameter(parameter))
                if lambda.parameters.contains(parameter) =>
            {
                Ok(expr.clone())
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Replace every occurrence of `search` in `source` with `replacement`
///
/// Occurrences are matched by structural equality. Replaced sub-trees are not
/// searched again. When `search` is a parameter, lambdas declaring a parameter
/// of the same name and type shadow it and are left untouched.
pub fn replace(search: &Expr, replacement: &Expr, source: &Expr) -> Expr {
    rewrite_infallible(&mut ReplacingRewriter::new(search, replacement), source)
}
