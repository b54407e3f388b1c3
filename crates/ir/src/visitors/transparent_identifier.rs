// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Transparent identifier removal
//!
//! Operators that introduce a second range variable (`SelectMany` with a
//! result selector) pack both variables into an anonymous type, and later
//! lambdas read them back through member accesses:
//!
//! ```text
//! new AnonymousType(c = [c], a = [a]).a   =>   [a]
//! ```
//!
//! After resolution the packing and the access meet in the same tree. This
//! rewrite collapses such pairs bottom-up, so nested packings vanish too.

use super::{ExprRewriter, rewrite_infallible, walk_expr};
use crate::expr::{Expr, MemberBinding};
use crate::types::MemberInfo;
use std::convert::Infallible;

struct TransparentIdentifierRemover;

impl ExprRewriter for TransparentIdentifierRemover {
    type Error = Infallible;

    fn rewrite_expr(&mut self, expr: &Expr) -> Result<Expr, Infallible> {
        let rewritten = walk_expr(self, expr)?;
        if let Expr::MemberAccess {
            target: Some(target),
            member,
        } = &rewritten
        {
            if let Some(value) = initialized_value(target, member) {
                return Ok(value.clone());
            }
        }
        Ok(rewritten)
    }
}

/// Value `target` assigns to `member`, if `target` is a construction that
/// initializes it
fn initialized_value<'a>(target: &'a Expr, member: &MemberInfo) -> Option<&'a Expr> {
    match target {
        Expr::New(new_expr) => new_expr
            .members
            .as_ref()?
            .iter()
            .position(|m| m.refers_to_same(member))
            .and_then(|index| new_expr.arguments.get(index)),
        Expr::MemberInit { bindings, .. } => bindings.iter().find_map(|binding| match binding {
            MemberBinding::Assignment {
                member: bound,
                expression,
            } if bound.refers_to_same(member) => Some(expression),
            _ => None,
        }),
        _ => None,
    }
}

/// Collapse member accesses on anonymous-type constructions
pub fn remove_transparent_identifiers(expr: &Expr) -> Expr {
    rewrite_infallible(&mut TransparentIdentifierRemover, expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::NewExpr;
    use crate::types::{ClassType, ConstructorInfo, Type};

    fn pair_type() -> Type {
        Type::class(
            ClassType::new("AnonymousType")
                .with_property("a", Type::Int32)
                .with_property("b", Type::Int32),
        )
    }

    fn pair(a: Expr, b: Expr) -> Expr {
        Expr::new_object(
            NewExpr::with_members(
                ConstructorInfo::new(pair_type(), vec![Type::Int32, Type::Int32]),
                vec![a, b],
                vec![
                    MemberInfo::getter("AnonymousType", "a", Type::Int32),
                    MemberInfo::getter("AnonymousType", "b", Type::Int32),
                ],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_collapses_member_on_new() {
        let x = Expr::parameter("x", Type::Int32);
        let access = Expr::member_access(
            pair(Expr::constant(0, Type::Int32), x.clone()),
            MemberInfo::property("AnonymousType", "b", Type::Int32),
        )
        .unwrap();

        assert_eq!(remove_transparent_identifiers(&access), x);
    }

    #[test]
    fn test_collapses_member_on_member_init() {
        let x = Expr::parameter("x", Type::Int32);
        let a = MemberInfo::property("AnonymousType", "a", Type::Int32);
        let init = Expr::member_init(
            NewExpr::new(ConstructorInfo::default_for(pair_type()), vec![]).unwrap(),
            vec![MemberBinding::bind(a.clone(), x.clone()).unwrap()],
        );
        let access = Expr::member_access(init, a).unwrap();

        assert_eq!(remove_transparent_identifiers(&access), x);
    }

    #[test]
    fn test_leaves_other_accesses_alone() {
        let input = Expr::parameter("input", pair_type());
        let access = Expr::member_access(
            input,
            MemberInfo::property("AnonymousType", "a", Type::Int32),
        )
        .unwrap();

        assert_eq!(remove_transparent_identifiers(&access), access);
    }
}
