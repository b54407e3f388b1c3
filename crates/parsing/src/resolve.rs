// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expression Resolution
//!
//! A lambda passed to an operator is written against the items flowing out
//! of the operator's source node. Resolution rewrites its body so that it
//! refers to query model clauses instead:
//!
//! ```text
//! value(Cooks).Select(c => new { c, n = c.Name }).Where(x => x.n != "")
//!
//! Where predicate body:       (x.n != "")
//! resolved through Select:    (new AnonymousType(c = [c], n = [c].Name).n != "")
//! transparent ids removed:    ([c].Name != "")
//! ```
//!
//! Query sources (constants, sub-queries and `SelectMany`) substitute the
//! input parameter with a reference to their clause. `Select` substitutes it
//! with its own selector, resolved further down the chain. Every other node
//! passes the items of its source through unchanged and delegates.

use crate::context::ClauseGenerationContext;
use crate::error::{ParseError, ParseResult};
use crate::node::{ExpressionNode, NodeChain, NodeKind};
use tracing::trace;
use unified_query_ir::visitors::{remove_transparent_identifiers, replace};
use unified_query_ir::{Expr, LambdaExpr, ParameterExpr};

impl ExpressionNode {
    /// Rewrite `expr`, written against `input` standing for this node's
    /// items, into an expression over query model clauses
    ///
    /// Fails with [`ParseError::UnresolvedQuerySource`] if a query source on
    /// the way has no clause registered in `context` yet.
    pub fn resolve(
        &self,
        chain: &NodeChain,
        input: &ParameterExpr,
        expr: &Expr,
        context: &ClauseGenerationContext,
    ) -> ParseResult<Expr> {
        trace!(
            "Resolving '{}' for parameter '{}' at {} node {}",
            expr,
            input.name,
            self.node_type(),
            self.id.index()
        );

        match &self.kind {
            NodeKind::Constant(_) | NodeKind::SubQuery(_) => {
                let reference = Expr::query_source_reference(context.get_clause(self)?.clone());
                Ok(replace(&input.to_expr(), &reference, expr))
            }
            NodeKind::Select { selector } => {
                let projection = self.resolve_lambda_through_source(chain, selector, context)?;
                Ok(substitute(input, &projection, expr))
            }
            NodeKind::SelectMany {
                result_selector, ..
            } => {
                let inner = Expr::query_source_reference(context.get_clause(self)?.clone());
                let projection = match result_selector {
                    Some(result_selector) => {
                        let (outer_parameter, inner_parameter) =
                            match result_selector.parameters.as_slice() {
                                [outer, inner] => (outer, inner),
                                _ => {
                                    return Err(ParseError::unsupported(
                                        result_selector,
                                        chain.position_of(self.id),
                                        "result selector must take two parameters",
                                    ));
                                }
                            };
                        let with_inner =
                            replace(&inner_parameter.to_expr(), &inner, &result_selector.body);
                        self.source(chain)?
                            .resolve(chain, outer_parameter, &with_inner, context)?
                    }
                    None => inner,
                };
                Ok(substitute(input, &projection, expr))
            }
            NodeKind::GroupBy { .. } => Err(ParseError::unsupported(
                expr,
                chain.position_of(self.id),
                "items produced by GroupBy cannot be consumed by further operators",
            )),
            _ => self.source(chain)?.resolve(chain, input, expr, context),
        }
    }

    /// Resolve the body of a single-parameter lambda through this node's
    /// source
    pub fn resolve_lambda_through_source(
        &self,
        chain: &NodeChain,
        lambda: &LambdaExpr,
        context: &ClauseGenerationContext,
    ) -> ParseResult<Expr> {
        let parameter = lambda.parameter(0).ok_or_else(|| {
            ParseError::unsupported(lambda, chain.position_of(self.id), "lambda takes no parameter")
        })?;
        self.source(chain)?
            .resolve(chain, parameter, &lambda.body, context)
    }
}

/// Replace `input` with an already resolved projection and collapse the
/// transparent identifiers this exposes
fn substitute(input: &ParameterExpr, projection: &Expr, expr: &Expr) -> Expr {
    remove_transparent_identifiers(&replace(&input.to_expr(), projection, expr))
}
