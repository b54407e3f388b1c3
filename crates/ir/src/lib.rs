// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query - Intermediate Representation
//!
//! This crate provides the typed expression trees and the query model that
//! query-operator call chains are parsed into.
//! The IR is designed to:
//! - Carry a static type on every expression node
//! - Reject ill-typed trees at construction time
//! - Reference query sources by identity from anywhere in a query
//! - Support tree rewriting without mutating shared nodes

pub mod clause;
pub mod display;
pub mod error;
pub mod expr;
pub mod query;
pub mod result_operator;
pub mod streamed;
pub mod types;
pub mod value;
pub mod visitors;

// Re-export commonly used types
pub use clause::{
    AdditionalFromClause, BodyClause, MainFromClause, OrderByClause, Ordering, OrderingDirection,
    QuerySourceHandle, QuerySourceId, SelectClause, WhereClause,
};
pub use error::{IrError, IrResult};
pub use expr::{
    BinaryOp, ElementInit, Expr, LambdaExpr, MemberBinding, NewExpr, ParameterExpr, SubQueryExpr,
    UnaryOp,
};
pub use query::QueryModel;
pub use result_operator::{GroupResultOperator, ResultOperator};
pub use streamed::{QueryExecutor, StreamedData, StreamedDataInfo, StreamedValue};
pub use types::{
    ClassType, ConstructorInfo, MemberInfo, MemberKind, MethodInfo, MethodKey, SequenceKind, Type,
};
pub use value::Value;
