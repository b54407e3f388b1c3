// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Clause generation state shared by the nodes of one chain

use crate::error::{ParseError, ParseResult};
use crate::node::{ExpressionNode, NodeId};
use std::collections::HashMap;
use tracing::trace;
use unified_query_ir::QuerySourceHandle;

/// Mapping from nodes to the query source clauses created for them
///
/// Filled in chain order while clauses are created and read during
/// resolution. Entries are never replaced or removed.
#[derive(Debug, Clone, Default)]
pub struct QuerySourceClauseMapping {
    clauses: HashMap<NodeId, QuerySourceHandle>,
}

impl QuerySourceClauseMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the clause created for `node`
    pub fn add_mapping(&mut self, node: &ExpressionNode, clause: QuerySourceHandle) -> ParseResult<()> {
        if self.clauses.contains_key(&node.id) {
            return Err(ParseError::DuplicateMapping {
                node_type: node.node_type().to_string(),
                id: node.id.index(),
            });
        }
        trace!(
            "Registered query source '{}' for {} node {}",
            clause.item_name,
            node.node_type(),
            node.id.index()
        );
        self.clauses.insert(node.id, clause);
        Ok(())
    }

    /// Clause created for `node`
    pub fn get_clause(&self, node: &ExpressionNode) -> ParseResult<&QuerySourceHandle> {
        self.clauses
            .get(&node.id)
            .ok_or_else(|| ParseError::UnresolvedQuerySource {
                node_type: node.node_type().to_string(),
            })
    }

    pub fn contains(&self, node: &ExpressionNode) -> bool {
        self.clauses.contains_key(&node.id)
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Context passed to every clause creation and resolution of one model
/// build
#[derive(Debug, Clone, Default)]
pub struct ClauseGenerationContext {
    mapping: QuerySourceClauseMapping,
}

impl ClauseGenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mapping(&self) -> &QuerySourceClauseMapping {
        &self.mapping
    }

    pub fn add_mapping(&mut self, node: &ExpressionNode, clause: QuerySourceHandle) -> ParseResult<()> {
        self.mapping.add_mapping(node, clause)
    }

    pub fn get_clause(&self, node: &ExpressionNode) -> ParseResult<&QuerySourceHandle> {
        self.mapping.get_clause(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ConstantSource, NodeChain, NodeKind};
    use unified_query_ir::{Type, Value};

    fn chain_with_source() -> (NodeChain, NodeId) {
        let mut chain = NodeChain::new();
        let source = ConstantSource::new(Value::Sequence(vec![]), Type::array(Type::Int32)).unwrap();
        let id = chain.push(None, "n", NodeKind::Constant(source));
        (chain, id)
    }

    #[test]
    fn test_add_and_get() {
        let (chain, id) = chain_with_source();
        let node = chain.node(id).unwrap();
        let handle = QuerySourceHandle::new("n", Type::Int32);

        let mut context = ClauseGenerationContext::new();
        context.add_mapping(node, handle.clone()).unwrap();
        assert_eq!(context.get_clause(node).unwrap(), &handle);
        assert_eq!(context.mapping().len(), 1);
    }

    #[test]
    fn test_missing_mapping() {
        let (chain, id) = chain_with_source();
        let node = chain.node(id).unwrap();

        let err = ClauseGenerationContext::new().get_clause(node).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnresolvedQuerySource {
                node_type: "ConstantSource".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_mapping() {
        let (chain, id) = chain_with_source();
        let node = chain.node(id).unwrap();

        let mut mapping = QuerySourceClauseMapping::new();
        mapping
            .add_mapping(node, QuerySourceHandle::new("n", Type::Int32))
            .unwrap();
        let err = mapping
            .add_mapping(node, QuerySourceHandle::new("n", Type::Int32))
            .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateMapping { id: 0, .. }));
    }
}
