// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Textual form of expressions used in diagnostics
//!
//! ```text
//! new AnonymousType() {a = 3, b = 1}
//! new AnonymousType(a = [c], b = 1)
//! (0 + 0)
//! input => input.b.a
//! value(Cooks).Where(c => ([c].Age > 18))
//! ```

use crate::expr::{ElementInit, Expr, LambdaExpr, MemberBinding, NewExpr, ParameterExpr, UnaryOp};
use crate::value::Value;
use std::fmt;

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant { value, ty } => match value {
                Value::Sequence(_) => write!(f, "value({})", ty),
                Value::Source(name) => write!(f, "value({})", name),
                _ => write!(f, "{}", value),
            },
            Expr::Parameter(parameter) => write!(f, "{}", parameter),
            Expr::MemberAccess { target, member } => match target {
                Some(target) => write!(f, "{}.{}", target, member.name),
                None => write!(f, "{}.{}", member.declaring_type, member.name),
            },
            Expr::Unary { op, operand, .. } => match op {
                UnaryOp::Convert | UnaryOp::ConvertChecked => write!(f, "Convert({})", operand),
                UnaryOp::Negate => write!(f, "-{}", operand),
                UnaryOp::UnaryPlus => write!(f, "+{}", operand),
                UnaryOp::Not => write!(f, "Not({})", operand),
                UnaryOp::Quote => write!(f, "{}", operand),
            },
            Expr::Binary {
                op, left, right, ..
            } => write!(f, "({} {} {})", left, op.symbol(), right),
            Expr::MethodCall {
                target,
                method,
                arguments,
            } => match target {
                Some(target) => write!(f, "{}.{}({})", target, method.name, join(arguments)),
                None if method.is_extension && !arguments.is_empty() => write!(
                    f,
                    "{}.{}({})",
                    arguments[0],
                    method.name,
                    join(&arguments[1..])
                ),
                None => write!(
                    f,
                    "{}.{}({})",
                    method.declaring_type,
                    method.name,
                    join(arguments)
                ),
            },
            Expr::New(new_expr) => write!(f, "{}", new_expr),
            Expr::MemberInit { new_expr, bindings } => {
                write!(f, "{} {{{}}}", new_expr, join(bindings))
            }
            Expr::Lambda(lambda) => write!(f, "{}", lambda),
            Expr::Conditional {
                test,
                if_true,
                if_false,
                ..
            } => write!(f, "IIF({}, {}, {})", test, if_true, if_false),
            Expr::QuerySourceReference(handle) => write!(f, "[{}]", handle.item_name),
            Expr::SubQuery(sub_query) => write!(f, "{{{}}}", sub_query.model),
        }
    }
}

impl fmt::Display for ParameterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for LambdaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parameters.as_slice() {
            [single] => write!(f, "{} => {}", single, self.body),
            parameters => write!(f, "({}) => {}", join(parameters), self.body),
        }
    }
}

impl fmt::Display for NewExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}(", self.constructor.declaring_type)?;
        match &self.members {
            Some(members) => {
                let assignments = members
                    .iter()
                    .zip(&self.arguments)
                    .map(|(member, argument)| format!("{} = {}", member.name, argument))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{}", assignments)?;
            }
            None => write!(f, "{}", join(&self.arguments))?,
        }
        write!(f, ")")
    }
}

impl fmt::Display for MemberBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberBinding::Assignment { member, expression } => {
                write!(f, "{} = {}", member.name, expression)
            }
            MemberBinding::List {
                member,
                initializers,
            } => write!(f, "{} = {{{}}}", member.name, join(initializers)),
            MemberBinding::Member { member, bindings } => {
                write!(f, "{} = {{{}}}", member.name, join(bindings))
            }
        }
    }
}

impl fmt::Display for ElementInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.add_method, join(&self.arguments))
    }
}
