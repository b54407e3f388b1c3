// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use super::{ExprRewriter, find_accessor_lambda, walk_expr};
use crate::error::{IrError, IrResult};
use crate::expr::{Expr, LambdaExpr, ParameterExpr};

struct ReverseResolvingRewriter<'a> {
    item_expression: &'a Expr,
    input: &'a ParameterExpr,
}

impl ExprRewriter for ReverseResolvingRewriter<'_> {
    type Error = IrError;

    fn rewrite_expr(&mut self, expr: &Expr) -> IrResult<Expr> {
        match expr {
            Expr::QuerySourceReference(_) => {
                let accessor = find_accessor_lambda(expr, self.item_expression, self.input)?;
                Ok(*accessor.body)
            }
            _ => walk_expr(self, expr),
        }
    }
}

/// Turn a resolved expression back into a lambda over the item produced by
/// `item_expression`
///
/// Each query source reference in `resolved_expression` is replaced with the
/// accessor that recovers it from the item. Fails with
/// [`IrError::AccessorNotFound`] if a referenced source is not part of the
/// item.
pub fn reverse_resolve(item_expression: &Expr, resolved_expression: &Expr) -> IrResult<LambdaExpr> {
    let input = ParameterExpr::new("input", item_expression.ty());
    let mut rewriter = ReverseResolvingRewriter {
        item_expression,
        input: &input,
    };
    let body = rewriter.rewrite_expr(resolved_expression)?;
    Ok(LambdaExpr::new(body, vec![input]))
}
