// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified Query Parsing
//!
//! Turns a call tree of query operators (`Where`, `Select`, `SelectMany`,
//! `OrderBy`, `GroupBy`, `Count`, ...) into a [`QueryModel`].
//!
//! ## Pipeline
//!
//! ```text
//! Expr (operator call tree)
//!   -> ExpressionTreeParser   NodeChain, one ExpressionNode per call
//!   -> create_clause          clauses, query sources registered in a
//!                             ClauseGenerationContext
//!   -> resolve                lambdas rewritten into clause references
//!   -> QueryModel
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use unified_query_parsing::QueryParser;
//!
//! let model = QueryParser::default().get_parsed_query(&call_tree)?;
//! println!("{}", model);
//! // from Cook c in value(Cooks) where [c].IsStarredCook select [c].Name => Count()
//! ```
//!
//! Operators are looked up in a [`NodeTypeRegistry`] keyed by declaring type,
//! name and parameter count. Custom operators can be registered with
//! [`NodeTypeRegistry::register`].

pub mod builtin;
pub mod clauses;
pub mod config;
pub mod context;
pub mod error;
pub mod node;
pub mod query_parser;
pub mod registry;
pub mod resolve;
pub mod tree_parser;

pub use clauses::Clause;
pub use config::ParserConfig;
pub use context::{ClauseGenerationContext, QuerySourceClauseMapping};
pub use error::{ParseError, ParseResult};
pub use node::{ConstantSource, ExpressionNode, NodeChain, NodeId, NodeKind, SubQuerySource};
pub use query_parser::QueryParser;
pub use registry::{MethodCallParseInfo, NodeBuilder, NodeTypeRegistry};
pub use tree_parser::ExpressionTreeParser;

pub use unified_query_ir::QueryModel;
