// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Expression Tree Visitors
//!
//! Two traversal traits cover every tree walk in the workspace:
//!
//! - [`ExprRewriter`] rebuilds a tree, letting an implementation replace any
//!   sub-tree. The default method walks into the children and reconstructs
//!   the node around the rewritten children; untouched parts come out
//!   structurally identical.
//! - [`ExprVisitor`] walks a tree read-only and may stop early through
//!   [`ControlFlow::Break`].
//!
//! Sub-query models are opaque to both: their clauses are never entered.
//!
//! Implementations override the trait method, handle the node kinds they care
//! about, and call the matching `walk_*` function for everything else.

mod accessor_finding;
mod references;
mod replacing;
mod reverse_resolving;
mod transparent_identifier;

pub use accessor_finding::{find_accessor_lambda, find_accessor_lambda_strict};
pub use references::{collect_query_source_references, contains_expression};
pub use replacing::{ReplacingRewriter, replace};
pub use reverse_resolving::reverse_resolve;
pub use transparent_identifier::remove_transparent_identifiers;

use crate::expr::{ElementInit, Expr, LambdaExpr, MemberBinding, NewExpr};
use std::convert::Infallible;
use std::ops::ControlFlow;

/// Tree-rebuilding visitor
pub trait ExprRewriter {
    type Error;

    fn rewrite_expr(&mut self, expr: &Expr) -> Result<Expr, Self::Error> {
        walk_expr(self, expr)
    }
}

/// Rebuild `expr` around its rewritten children
pub fn walk_expr<R: ExprRewriter + ?Sized>(
    rewriter: &mut R,
    expr: &Expr,
) -> Result<Expr, R::Error> {
    let rewritten = match expr {
        Expr::Constant { .. }
        | Expr::Parameter(_)
        | Expr::QuerySourceReference(_)
        | Expr::SubQuery(_) => expr.clone(),
        Expr::MemberAccess { target, member } => Expr::MemberAccess {
            target: rewrite_optional(rewriter, target.as_deref())?,
            member: member.clone(),
        },
        Expr::Unary { op, operand, ty } => Expr::Unary {
            op: *op,
            operand: Box::new(rewriter.rewrite_expr(operand)?),
            ty: ty.clone(),
        },
        Expr::Binary {
            op,
            left,
            right,
            ty,
        } => Expr::Binary {
            op: *op,
            left: Box::new(rewriter.rewrite_expr(left)?),
            right: Box::new(rewriter.rewrite_expr(right)?),
            ty: ty.clone(),
        },
        Expr::MethodCall {
            target,
            method,
            arguments,
        } => Expr::MethodCall {
            target: rewrite_optional(rewriter, target.as_deref())?,
            method: method.clone(),
            arguments: rewrite_all(rewriter, arguments)?,
        },
        Expr::New(new_expr) => Expr::New(walk_new(rewriter, new_expr)?),
        Expr::MemberInit { new_expr, bindings } => Expr::MemberInit {
            new_expr: walk_new(rewriter, new_expr)?,
            bindings: walk_bindings(rewriter, bindings)?,
        },
        Expr::Lambda(lambda) => Expr::Lambda(LambdaExpr {
            parameters: lambda.parameters.clone(),
            body: Box::new(rewriter.rewrite_expr(&lambda.body)?),
        }),
        Expr::Conditional {
            test,
            if_true,
            if_false,
            ty,
        } => Expr::Conditional {
            test: Box::new(rewriter.rewrite_expr(test)?),
            if_true: Box::new(rewriter.rewrite_expr(if_true)?),
            if_false: Box::new(rewriter.rewrite_expr(if_false)?),
            ty: ty.clone(),
        },
    };
    Ok(rewritten)
}

pub fn walk_new<R: ExprRewriter + ?Sized>(
    rewriter: &mut R,
    new_expr: &NewExpr,
) -> Result<NewExpr, R::Error> {
    Ok(NewExpr {
        constructor: new_expr.constructor.clone(),
        arguments: rewrite_all(rewriter, &new_expr.arguments)?,
        members: new_expr.members.clone(),
    })
}

pub fn walk_bindings<R: ExprRewriter + ?Sized>(
    rewriter: &mut R,
    bindings: &[MemberBinding],
) -> Result<Vec<MemberBinding>, R::Error> {
    bindings
        .iter()
        .map(|binding| {
            Ok(match binding {
                MemberBinding::Assignment { member, expression } => MemberBinding::Assignment {
                    member: member.clone(),
                    expression: rewriter.rewrite_expr(expression)?,
                },
                MemberBinding::List {
                    member,
                    initializers,
                } => MemberBinding::List {
                    member: member.clone(),
                    initializers: initializers
                        .iter()
                        .map(|init| {
                            Ok(ElementInit {
                                add_method: init.add_method.clone(),
                                arguments: rewrite_all(rewriter, &init.arguments)?,
                            })
                        })
                        .collect::<Result<_, _>>()?,
                },
                MemberBinding::Member { member, bindings } => MemberBinding::Member {
                    member: member.clone(),
                    bindings: walk_bindings(rewriter, bindings)?,
                },
            })
        })
        .collect()
}

fn rewrite_optional<R: ExprRewriter + ?Sized>(
    rewriter: &mut R,
    expr: Option<&Expr>,
) -> Result<Option<Box<Expr>>, R::Error> {
    expr.map(|e| rewriter.rewrite_expr(e).map(Box::new))
        .transpose()
}

fn rewrite_all<R: ExprRewriter + ?Sized>(
    rewriter: &mut R,
    exprs: &[Expr],
) -> Result<Vec<Expr>, R::Error> {
    exprs.iter().map(|e| rewriter.rewrite_expr(e)).collect()
}

/// Run a rewriter that cannot fail
pub(crate) fn rewrite_infallible<R: ExprRewriter<Error = Infallible>>(
    rewriter: &mut R,
    expr: &Expr,
) -> Expr {
    match rewriter.rewrite_expr(expr) {
        Ok(rewritten) => rewritten,
        Err(never) => match never {},
    }
}

/// Read-only visitor
pub trait ExprVisitor<'a> {
    type Break;

    fn visit_expr(&mut self, expr: &'a Expr) -> ControlFlow<Self::Break> {
        walk_children(self, expr)
    }
}

/// Visit the direct children of `expr`
pub fn walk_children<'a, V: ExprVisitor<'a> + ?Sized>(
    visitor: &mut V,
    expr: &'a Expr,
) -> ControlFlow<V::Break> {
    for child in expr.children() {
        visitor.visit_expr(child)?;
    }
    ControlFlow::Continue(())
}
