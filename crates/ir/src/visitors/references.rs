// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use super::{ExprVisitor, walk_children};
use crate::clause::QuerySourceHandle;
use crate::expr::Expr;
use std::convert::Infallible;
use std::ops::ControlFlow;

struct ReferenceCollector<'a> {
    references: Vec<&'a QuerySourceHandle>,
}

impl<'a> ExprVisitor<'a> for ReferenceCollector<'a> {
    type Break = Infallible;

    fn visit_expr(&mut self, expr: &'a Expr) -> ControlFlow<Infallible> {
        if let Expr::QuerySourceReference(handle) = expr {
            self.references.push(handle);
        }
        walk_children(self, expr)
    }
}

/// All query sources referenced from `expr`, in traversal order
pub fn collect_query_source_references(expr: &Expr) -> Vec<&QuerySourceHandle> {
    let mut collector = ReferenceCollector {
        references: Vec::new(),
    };
    let _ = collector.visit_expr(expr);
    collector.references
}

struct Containment<'n> {
    needle: &'n Expr,
}

impl<'a> ExprVisitor<'a> for Containment<'_> {
    type Break = ();

    fn visit_expr(&mut self, expr: &'a Expr) -> ControlFlow<()> {
        if expr == self.needle {
            return ControlFlow::Break(());
        }
        walk_children(self, expr)
    }
}

/// Check whether `needle` occurs anywhere in `haystack`
pub fn contains_expression(haystack: &Expr, needle: &Expr) -> bool {
    Containment { needle }.visit_expr(haystack).is_break()
}
