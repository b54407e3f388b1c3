// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Error types for query parsing
//!
//! Every error is fatal to the parse it occurs in; nothing is recovered or
//! downgraded internally.

use serde::Serialize;
use unified_query_ir::IrError;

/// Result type alias for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors that can occur while turning a call tree into a query model
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq, Serialize)]
pub enum ParseError {
    /// A query source does not implement `IEnumerable<T>`
    #[error("Query source type '{found}' does not implement IEnumerable<T>")]
    TypeMismatch { found: String },

    /// A sub-tree of the call chain is neither an operator call nor a source
    #[error("Unsupported expression '{expression}' at chain position {position}: {reason}")]
    UnsupportedExpression {
        expression: String,
        position: usize,
        reason: String,
    },

    /// Resolution reached a node for which no clause was registered
    #[error(
        "Cannot resolve with a {node_type} for which no clause was created. Be sure to call create_clause before calling resolve, and pass in the same clause generation context to both methods."
    )]
    UnresolvedQuerySource { node_type: String },

    /// A clause cannot be attached where it was produced
    #[error("Invalid clause chaining at {node_type}: {message}")]
    InvalidClauseChaining { node_type: String, message: String },

    /// A non-terminal node has no source node
    #[error("{node_type} node has no source node")]
    MissingSource { node_type: String },

    /// A node handle does not belong to the chain it was used with
    #[error("Node {id} does not exist in this chain")]
    UnknownNode { id: usize },

    /// A clause was registered twice for the same node
    #[error("A clause is already registered for {node_type} node {id}")]
    DuplicateMapping { node_type: String, id: usize },

    /// The node chain is empty
    #[error("Cannot create a query model from an empty node chain")]
    EmptyChain,

    /// Operator chain nested deeper than configured
    #[error("Recursion limit exceeded while building the node chain (depth: {depth}, limit: {limit})")]
    RecursionLimitExceeded { depth: usize, limit: usize },

    /// Expression construction or query model error
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl ParseError {
    pub(crate) fn unsupported(
        expression: &impl std::fmt::Display,
        position: usize,
        reason: impl Into<String>,
    ) -> Self {
        ParseError::UnsupportedExpression {
            expression: expression.to_string(),
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn chaining(node_type: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::InvalidClauseChaining {
            node_type: node_type.into(),
            message: message.into(),
        }
    }
}
