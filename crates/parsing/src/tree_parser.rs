// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Call Tree Parsing
//!
//! Turns a call tree of registered query operators into a [`NodeChain`].
//!
//! The outermost call is visited first; its source argument is parsed
//! recursively before the node itself is pushed, so the chain ends up in
//! source-first order. The identifier of a node is taken from the first
//! lambda parameter of the operator consuming it:
//!
//! ```text
//! value(Cooks).Where(c => c.IsStarredCook).Select(c => c.Name)
//!                    ^ identifier of the source
//!                                          ^ identifier of Where
//! ```
//!
//! Nodes whose consumer has no lambda (or that are not consumed at all) get a
//! generated identifier.

use crate::config::ParserConfig;
use crate::error::{ParseError, ParseResult};
use crate::node::{ConstantSource, NodeChain, NodeId, NodeKind, SubQuerySource};
use crate::registry::{MethodCallParseInfo, NodeTypeRegistry};
use tracing::{debug, trace};
use unified_query_ir::Expr;

/// Parses operator call trees into node chains
#[derive(Debug, Clone, Default)]
pub struct ExpressionTreeParser {
    registry: NodeTypeRegistry,
    config: ParserConfig,
}

/// Mutable state of one parse
struct ParseState {
    chain: NodeChain,
    generated_identifiers: usize,
    depth: usize,
    max_depth: usize,
}

impl ParseState {
    fn enter(&mut self) -> ParseResult<()> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ParseError::RecursionLimitExceeded {
                depth: self.depth,
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn exit(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl ExpressionTreeParser {
    /// Create a parser recognizing the builtin operators
    pub fn new(config: ParserConfig) -> Self {
        Self::with_registry(config, NodeTypeRegistry::new())
    }

    pub fn with_registry(config: ParserConfig, registry: NodeTypeRegistry) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &NodeTypeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a call tree into a node chain
    pub fn parse_tree(&self, expr: &Expr) -> ParseResult<NodeChain> {
        let mut state = ParseState {
            chain: NodeChain::new(),
            generated_identifiers: 0,
            depth: 0,
            max_depth: self.config.max_chain_depth,
        };
        self.parse_node(&mut state, expr, None, 0)?;
        debug!("Parsed call tree into {} nodes", state.chain.len());
        Ok(state.chain)
    }

    fn parse_node(
        &self,
        state: &mut ParseState,
        expr: &Expr,
        identifier: Option<&str>,
        position: usize,
    ) -> ParseResult<NodeId> {
        state.enter()?;
        let result = self.parse_node_inner(state, expr, identifier, position);
        state.exit();
        result
    }

    fn parse_node_inner(
        &self,
        state: &mut ParseState,
        expr: &Expr,
        identifier: Option<&str>,
        position: usize,
    ) -> ParseResult<NodeId> {
        match expr {
            Expr::MethodCall {
                target: None,
                method,
                arguments,
            } => {
                let builder = self.registry.get(method).ok_or_else(|| {
                    ParseError::unsupported(
                        expr,
                        position,
                        format!("method '{}' is not a registered query operator", method.key()),
                    )
                })?;
                let (source, rest) = arguments.split_first().ok_or_else(|| {
                    ParseError::unsupported(expr, position, "operator call has no source argument")
                })?;

                let info = MethodCallParseInfo {
                    expression: expr,
                    method,
                    arguments: rest,
                    position,
                };
                let kind = builder(&info)?;
                trace!("Recognized operator '{}' at position {}", method.key(), position);

                let source_identifier = rest
                    .iter()
                    .filter_map(Expr::as_lambda)
                    .find_map(|lambda| lambda.parameter(0))
                    .map(|parameter| parameter.name.as_str());
                let source_id = self.parse_node(state, source, source_identifier, position + 1)?;

                Ok(self.push(state, Some(source_id), identifier, kind))
            }
            Expr::Constant { value, ty } => {
                let source = ConstantSource::new(value.clone(), ty.clone())?;
                Ok(self.push(state, None, identifier, NodeKind::Constant(source)))
            }
            Expr::SubQuery(sub_query) => {
                let source = SubQuerySource::new(sub_query.clone())?;
                Ok(self.push(state, None, identifier, NodeKind::SubQuery(source)))
            }
            other => Err(ParseError::unsupported(
                other,
                position,
                format!(
                    "{} is neither a query operator call nor a query source",
                    other.kind_name()
                ),
            )),
        }
    }

    fn push(
        &self,
        state: &mut ParseState,
        source: Option<NodeId>,
        identifier: Option<&str>,
        kind: NodeKind,
    ) -> NodeId {
        let identifier = match identifier {
            Some(identifier) => identifier.to_string(),
            None => {
                let generated = self.config.generated_identifier(state.generated_identifiers);
                state.generated_identifiers += 1;
                generated
            }
        };
        state.chain.push(source, identifier, kind)
    }
}
