// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for expression construction and query model operations

use serde::Serialize;

/// Result type alias for IR operations
pub type IrResult<T> = Result<T, IrError>;

/// Errors raised while building or inspecting expression trees and query models
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum IrError {
    /// Wrong number of arguments for a constructor or method
    #[error("Argument count mismatch for '{target}': expected {expected}, found {found}")]
    ArgumentCountMismatch {
        target: String,
        expected: usize,
        found: usize,
    },

    /// Argument type does not fit the parameter type
    #[error(
        "Argument type mismatch for '{target}' at position {position}: expected '{expected}', found '{found}'"
    )]
    ArgumentTypeMismatch {
        target: String,
        position: usize,
        expected: String,
        found: String,
    },

    /// Value bound to a member does not fit the member type
    #[error("Member '{member}' of type '{member_type}' cannot be bound to a value of type '{found}'")]
    MemberTypeMismatch {
        member: String,
        member_type: String,
        found: String,
    },

    /// Member is not declared on the target type
    #[error("Member '{member}' is not declared on type '{type_name}'")]
    MemberNotFound { member: String, type_name: String },

    /// Operand types of a binary operator are incompatible
    #[error("Operator '{op}' is not defined for operands of type '{left}' and '{right}'")]
    OperandTypeMismatch {
        op: String,
        left: String,
        right: String,
    },

    /// The searched expression is not reachable through member accesses
    #[error(
        "The given expression '{full}' does not contain the searched expression '{searched}' in a nested NewExpression with member assignments or a MemberBindingExpression."
    )]
    AccessorNotFound { full: String, searched: String },

    /// More than one member path reaches the searched expression
    #[error("The searched expression '{searched}' is reachable through more than one path in '{full}'")]
    AmbiguousAccessor { full: String, searched: String },

    /// A clause references a query source declared after it
    #[error("Clause '{clause}' references query source '{source_name}' which is not declared before it")]
    ForwardReference { clause: String, source_name: String },

    /// Result operator cannot consume the data streamed into it
    #[error("Result operator '{operator}' cannot be applied to {input}")]
    InvalidResultOperatorInput { operator: String, input: String },

    /// Query executor failure
    #[error("Query execution failed: {0}")]
    Execution(String),
}
