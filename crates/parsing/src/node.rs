// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Intermediate Node Chain
//!
//! One [`ExpressionNode`] per operator application, linked to the node it
//! consumes. The chain is stored as an arena in source-first order: the query
//! source sits at index 0 and the outermost operator call is the last node.
//!
//! ```text
//! value(Cooks).Where(c => c.Age > 18).Select(c => c.Name).Count()
//!
//! [0] ConstantSource  c            source: -
//! [1] Where           c            source: 0
//! [2] Select          <generated>_0 source: 1
//! [3] Count           <generated>_1 source: 2
//! ```
//!
//! Nodes are addressed by [`NodeId`], which stays valid for the lifetime of
//! the chain and keys the clause mapping used during model assembly.

use crate::error::{ParseError, ParseResult};
use serde::Serialize;
use unified_query_ir::{
    Expr, LambdaExpr, OrderingDirection, ParameterExpr, ResultOperator, SubQueryExpr, Type, Value,
};

/// Stable handle of a node within its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// A constant collection the chain starts from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstantSource {
    pub value: Value,
    /// Declared type of the collection
    pub query_source_type: Type,
    /// `T` of the `IEnumerable<T>` implemented by `query_source_type`
    pub element_type: Type,
}

impl ConstantSource {
    /// Create a constant source, deriving its element type
    pub fn new(value: Value, query_source_type: Type) -> ParseResult<Self> {
        let element_type = query_source_type
            .sequence_element_type()
            .ok_or_else(|| ParseError::TypeMismatch {
                found: query_source_type.to_string(),
            })?;
        Ok(Self {
            value,
            query_source_type,
            element_type,
        })
    }

    /// Expression of the main from clause created for this source
    pub fn from_expression(&self) -> Expr {
        Expr::constant(self.value.clone(), self.query_source_type.clone())
    }
}

/// A previously built query model the chain starts from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubQuerySource {
    pub sub_query: SubQueryExpr,
    pub element_type: Type,
}

impl SubQuerySource {
    pub fn new(sub_query: SubQueryExpr) -> ParseResult<Self> {
        let element_type = sub_query
            .ty
            .sequence_element_type()
            .ok_or_else(|| ParseError::TypeMismatch {
                found: sub_query.ty.to_string(),
            })?;
        Ok(Self {
            sub_query,
            element_type,
        })
    }
}

/// Operator-specific payload of a node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub enum NodeKind {
    Constant(ConstantSource),
    SubQuery(SubQuerySource),
    Where {
        predicate: LambdaExpr,
    },
    Select {
        selector: LambdaExpr,
    },
    SelectMany {
        collection_selector: LambdaExpr,
        result_selector: Option<LambdaExpr>,
    },
    OrderBy {
        key_selector: LambdaExpr,
        direction: OrderingDirection,
    },
    ThenBy {
        key_selector: LambdaExpr,
        direction: OrderingDirection,
    },
    GroupBy {
        key_selector: LambdaExpr,
        element_selector: Option<LambdaExpr>,
    },
    ResultOperator(ResultOperator),
}

impl NodeKind {
    /// Name used in diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Constant(_) => "ConstantSource",
            NodeKind::SubQuery(_) => "SubQuerySource",
            NodeKind::Where { .. } => "Where",
            NodeKind::Select { .. } => "Select",
            NodeKind::SelectMany { .. } => "SelectMany",
            NodeKind::OrderBy { .. } => "OrderBy",
            NodeKind::ThenBy { .. } => "ThenBy",
            NodeKind::GroupBy { .. } => "GroupBy",
            NodeKind::ResultOperator(op) => op.name(),
        }
    }

    /// Lambdas held by this node, in argument order
    pub fn lambdas(&self) -> Vec<&LambdaExpr> {
        match self {
            NodeKind::Constant(_) | NodeKind::SubQuery(_) | NodeKind::ResultOperator(_) => {
                Vec::new()
            }
            NodeKind::Where { predicate } => vec![predicate],
            NodeKind::Select { selector } => vec![selector],
            NodeKind::SelectMany {
                collection_selector,
                result_selector,
            } => std::iter::once(collection_selector)
                .chain(result_selector.as_ref())
                .collect(),
            NodeKind::OrderBy { key_selector, .. } | NodeKind::ThenBy { key_selector, .. } => {
                vec![key_selector]
            }
            NodeKind::GroupBy {
                key_selector,
                element_selector,
            } => std::iter::once(key_selector)
                .chain(element_selector.as_ref())
                .collect(),
        }
    }
}

/// One operator application in the chain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpressionNode {
    pub id: NodeId,
    /// Node whose output this node consumes; `None` only for query sources
    pub source: Option<NodeId>,
    /// Name of the items flowing out of this node
    pub associated_identifier: String,
    pub kind: NodeKind,
}

impl ExpressionNode {
    /// Whether this node starts a chain
    pub fn is_query_source(&self) -> bool {
        matches!(self.kind, NodeKind::Constant(_) | NodeKind::SubQuery(_))
    }

    pub fn node_type(&self) -> &'static str {
        self.kind.name()
    }

    /// The node this node consumes
    pub fn source<'c>(&self, chain: &'c NodeChain) -> ParseResult<&'c ExpressionNode> {
        let id = self.source.ok_or_else(|| ParseError::MissingSource {
            node_type: self.node_type().to_string(),
        })?;
        chain.node(id)
    }

    /// Type of the items flowing out of this node
    pub fn output_item_type(&self, chain: &NodeChain) -> ParseResult<Type> {
        match &self.kind {
            NodeKind::Constant(source) => Ok(source.element_type.clone()),
            NodeKind::SubQuery(source) => Ok(source.element_type.clone()),
            NodeKind::Select { selector } => Ok(selector.body.ty()),
            NodeKind::SelectMany {
                collection_selector,
                result_selector,
            } => match result_selector {
                Some(result_selector) => Ok(result_selector.body.ty()),
                None => collection_element_type(collection_selector),
            },
            NodeKind::GroupBy {
                key_selector,
                element_selector,
            } => {
                let element = match element_selector {
                    Some(element_selector) => element_selector.body.ty(),
                    None => self.source(chain)?.output_item_type(chain)?,
                };
                Ok(Type::grouping(key_selector.body.ty(), element))
            }
            _ => self.source(chain)?.output_item_type(chain),
        }
    }

    /// Parameter standing for the items flowing out of this node
    pub fn output_parameter(&self, chain: &NodeChain) -> ParseResult<ParameterExpr> {
        Ok(ParameterExpr::new(
            self.associated_identifier.clone(),
            self.output_item_type(chain)?,
        ))
    }
}

/// Element type produced by a `SelectMany` collection selector
pub(crate) fn collection_element_type(collection_selector: &LambdaExpr) -> ParseResult<Type> {
    let collection = collection_selector.body.ty();
    collection
        .sequence_element_type()
        .ok_or_else(|| ParseError::TypeMismatch {
            found: collection.to_string(),
        })
}

/// Arena of nodes in source-first order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NodeChain {
    nodes: Vec<ExpressionNode>,
}

impl NodeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node consuming `source`
    pub fn push(
        &mut self,
        source: Option<NodeId>,
        associated_identifier: impl Into<String>,
        kind: NodeKind,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(ExpressionNode {
            id,
            source,
            associated_identifier: associated_identifier.into(),
            kind,
        });
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&ExpressionNode> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> ParseResult<&ExpressionNode> {
        self.get(id).ok_or(ParseError::UnknownNode { id: id.0 })
    }

    /// Distance of `id` from the outermost call, as reported in diagnostics
    pub fn position_of(&self, id: NodeId) -> usize {
        self.nodes.len().saturating_sub(id.0 + 1)
    }

    /// The outermost operator call
    pub fn last(&self) -> Option<&ExpressionNode> {
        self.nodes.last()
    }

    /// Nodes in source-first order
    pub fn iter(&self) -> impl Iterator<Item = &ExpressionNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
