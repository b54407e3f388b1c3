// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Accessor Finding
//!
//! Given a *full* expression that constructs an item (typically a chain of
//! anonymous-type constructions) and a *searched* expression somewhere inside
//! it, build the lambda `input => input.m1.m2...` that recovers the searched
//! value from an instance of the item.
//!
//! The search only tunnels through three node kinds:
//!
//! - `New` with a member mapping: argument `i` is reached through `members[i]`
//! - `MemberInit`: assignment bindings are reached through their member
//! - `Convert` / `ConvertChecked`: the accessor is wrapped in a conversion to
//!   the operand type
//!
//! Every other node kind is opaque. `New` without a member mapping and list
//! bindings carry no member path, so matches below them are not found.
//!
//! ```text
//! full:     new AnonymousType(a = 1, b = new AnonymousType(a = [c], b = 2))
//! searched: [c]
//! result:   input => input.b.a
//! ```
//!
//! When the searched expression occurs at several tunnelable positions,
//! [`find_accessor_lambda`] returns the accessor of the first occurrence in
//! argument/binding order; [`find_accessor_lambda_strict`] rejects the input.

use crate::error::{IrError, IrResult};
use crate::expr::{Expr, LambdaExpr, MemberBinding, NewExpr, ParameterExpr};

#[derive(Clone, Copy, PartialEq, Eq)]
enum SearchMode {
    FirstMatch,
    AllMatches,
}

struct AccessorFinder<'a> {
    searched: &'a Expr,
    mode: SearchMode,
    found: Vec<Expr>,
}

impl<'a> AccessorFinder<'a> {
    fn new(searched: &'a Expr, mode: SearchMode) -> Self {
        Self {
            searched,
            mode,
            found: Vec::new(),
        }
    }

    fn is_done(&self) -> bool {
        self.mode == SearchMode::FirstMatch && !self.found.is_empty()
    }

    /// Search `expr`, where `accessor` is the expression producing `expr`'s
    /// value from the input parameter
    fn search(&mut self, expr: &Expr, accessor: Expr) -> IrResult<()> {
        if expr == self.searched {
            self.found.push(accessor);
            return Ok(());
        }

        match expr {
            Expr::Unary { op, operand, .. } if op.is_conversion() => {
                let converted = Expr::convert(accessor, operand.ty());
                self.search(operand, converted)
            }
            Expr::New(new_expr) => self.search_new(new_expr, &accessor),
            Expr::MemberInit { bindings, .. } => self.search_bindings(bindings, &accessor),
            _ => Ok(()),
        }
    }

    fn search_new(&mut self, new_expr: &NewExpr, accessor: &Expr) -> IrResult<()> {
        for (index, argument) in new_expr.arguments.iter().enumerate() {
            let Some(member) = new_expr.member_for_argument(index) else {
                continue;
            };
            let member_accessor = Expr::member_access(accessor.clone(), member.clone())?;
            self.search(argument, member_accessor)?;
            if self.is_done() {
                break;
            }
        }
        Ok(())
    }

    fn search_bindings(&mut self, bindings: &[MemberBinding], accessor: &Expr) -> IrResult<()> {
        for binding in bindings {
            let MemberBinding::Assignment { member, expression } = binding else {
                continue;
            };
            let member_accessor = Expr::member_access(accessor.clone(), member.clone())?;
            self.search(expression, member_accessor)?;
            if self.is_done() {
                break;
            }
        }
        Ok(())
    }
}

fn not_found(searched: &Expr, full: &Expr) -> IrError {
    IrError::AccessorNotFound {
        full: full.to_string(),
        searched: searched.to_string(),
    }
}

/// Build the lambda recovering `searched` from an item constructed by `full`
///
/// `input` is the parameter of the returned lambda and must have the type
/// of `full`.
pub fn find_accessor_lambda(
    searched: &Expr,
    full: &Expr,
    input: &ParameterExpr,
) -> IrResult<LambdaExpr> {
    let mut finder = AccessorFinder::new(searched, SearchMode::FirstMatch);
    finder.search(full, input.to_expr())?;

    let body = finder
        .found
        .into_iter()
        .next()
        .ok_or_else(|| not_found(searched, full))?;
    Ok(LambdaExpr::new(body, vec![input.clone()]))
}

/// Like [`find_accessor_lambda`], but fails if `searched` is reachable
/// through more than one member path
pub fn find_accessor_lambda_strict(
    searched: &Expr,
    full: &Expr,
    input: &ParameterExpr,
) -> IrResult<LambdaExpr> {
    let mut finder = AccessorFinder::new(searched, SearchMode::AllMatches);
    finder.search(full, input.to_expr())?;

    let mut found = finder.found.into_iter();
    let body = found.next().ok_or_else(|| not_found(searched, full))?;
    if found.next().is_some() {
        return Err(IrError::AmbiguousAccessor {
            full: full.to_string(),
            searched: searched.to_string(),
        });
    }
    Ok(LambdaExpr::new(body, vec![input.clone()]))
}
