// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use crate::builtin;
use crate::error::{ParseError, ParseResult};
use crate::node::NodeKind;
use std::collections::HashMap;
use unified_query_ir::{Expr, LambdaExpr, MethodInfo, MethodKey};

/// Declaring types whose operators are registered by default
pub const DEFAULT_DECLARING_TYPES: [&str; 2] = ["Queryable", "Enumerable"];

/// Builds the payload of a node from a recognized operator call
pub type NodeBuilder = fn(&MethodCallParseInfo<'_>) -> ParseResult<NodeKind>;

/// An operator call being turned into a node
#[derive(Debug, Clone, Copy)]
pub struct MethodCallParseInfo<'a> {
    /// The whole call expression
    pub expression: &'a Expr,
    pub method: &'a MethodInfo,
    /// Arguments after the source argument
    pub arguments: &'a [Expr],
    /// Distance from the outermost call of the chain
    pub position: usize,
}

impl<'a> MethodCallParseInfo<'a> {
    /// Argument at `index`, not counting the source
    pub fn argument(&self, index: usize) -> ParseResult<&'a Expr> {
        self.arguments.get(index).ok_or_else(|| {
            ParseError::unsupported(
                self.expression,
                self.position,
                format!("'{}' is missing argument {}", self.method.name, index + 1),
            )
        })
    }

    /// Lambda argument at `index` taking exactly `parameter_count` parameters
    ///
    /// Quoted lambdas are unwrapped.
    pub fn lambda_argument(&self, index: usize, parameter_count: usize) -> ParseResult<&'a LambdaExpr> {
        let argument = self.argument(index)?;
        let lambda = argument.as_lambda().ok_or_else(|| {
            ParseError::unsupported(
                self.expression,
                self.position,
                format!(
                    "argument {} of '{}' is not a lambda expression",
                    index + 1,
                    self.method.name
                ),
            )
        })?;
        if lambda.parameters.len() != parameter_count {
            return Err(ParseError::unsupported(
                self.expression,
                self.position,
                format!(
                    "'{}' expects a lambda with {} parameter(s), found '{}'",
                    self.method.name, parameter_count, lambda
                ),
            ));
        }
        Ok(lambda)
    }
}

/// Registry mapping operator methods to node builders
///
/// Methods are identified by declaring type, name and parameter count, so
/// overloads differing in arity map to different builders.
#[derive(Debug, Clone)]
pub struct NodeTypeRegistry {
    builders: HashMap<MethodKey, NodeBuilder>,
}

impl NodeTypeRegistry {
    /// Create a registry with every builtin operator registered for
    /// `Queryable` and `Enumerable`
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for declaring_type in DEFAULT_DECLARING_TYPES {
            for (name, parameter_count, builder) in builtin::all_operators() {
                registry.register(MethodKey::new(declaring_type, name, parameter_count), builder);
            }
        }
        registry
    }

    /// Create a registry without any operators
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register (or replace) the builder for a method
    pub fn register(&mut self, key: MethodKey, builder: NodeBuilder) {
        self.builders.insert(key, builder);
    }

    /// Lookup the builder for a method
    pub fn get(&self, method: &MethodInfo) -> Option<NodeBuilder> {
        self.builders.get(&method.key()).copied()
    }

    /// Check if a method is a registered operator
    pub fn is_registered(&self, method: &MethodInfo) -> bool {
        self.builders.contains_key(&method.key())
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl Default for NodeTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
