// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Clause Creation
//!
//! Every node contributes at most one clause to the query model. Clauses are
//! created in source-first order; each node receives the clause produced
//! just before it so that it can check that it is attached in a valid place.
//!
//! | Node                    | Clause                               |
//! |-------------------------|--------------------------------------|
//! | ConstantSource/SubQuery | main from clause                     |
//! | Where                   | where clause                         |
//! | OrderBy(Descending)     | new orderby clause                   |
//! | ThenBy(Descending)      | ordering appended to the last orderby |
//! | SelectMany              | additional from clause               |
//! | Select                  | none, folded into the select clause  |
//! | GroupBy                 | group result operator                |
//! | result operators        | result operator                      |

use crate::context::ClauseGenerationContext;
use crate::error::{ParseError, ParseResult};
use crate::node::{ExpressionNode, NodeChain, NodeKind};
use tracing::trace;
use unified_query_ir::{
    AdditionalFromClause, BodyClause, Expr, GroupResultOperator, MainFromClause, OrderByClause,
    Ordering, QuerySourceHandle, ResultOperator, SelectClause, WhereClause,
};

/// A clause produced by a single node
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    MainFrom(MainFromClause),
    Body(BodyClause),
    /// An ordering extending the preceding orderby clause
    Ordering(Ordering),
    ResultOperator(ResultOperator),
}

impl Clause {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Clause::MainFrom(_) => "MainFromClause",
            Clause::Body(BodyClause::AdditionalFrom(_)) => "AdditionalFromClause",
            Clause::Body(BodyClause::Where(_)) => "WhereClause",
            Clause::Body(BodyClause::OrderBy(_)) => "OrderByClause",
            Clause::Body(_) => "BodyClause",
            Clause::Ordering(_) => "Ordering",
            Clause::ResultOperator(_) => "ResultOperator",
        }
    }
}

impl ExpressionNode {
    /// Create the clause this node contributes to the query model
    ///
    /// `previous` is the clause created by the preceding node, or `None` for
    /// the query source. Nodes that only shape the final projection return
    /// `Ok(None)`. Query sources register their clause in `context` so that
    /// later nodes can resolve references to them.
    pub fn create_clause(
        &self,
        chain: &NodeChain,
        previous: Option<&Clause>,
        context: &mut ClauseGenerationContext,
    ) -> ParseResult<Option<Clause>> {
        if self.is_query_source() {
            if previous.is_some() {
                return Err(ParseError::chaining(
                    self.node_type(),
                    format!(
                        "{} represents the end of a query call chain. Set previous to None.",
                        self.node_type()
                    ),
                ));
            }
            return self.create_main_from_clause(context).map(Some);
        }

        if previous.is_none() {
            return Err(ParseError::chaining(
                self.node_type(),
                "only a query source can start a clause sequence",
            ));
        }

        let clause = match &self.kind {
            NodeKind::Where { predicate } => {
                let predicate = self.resolve_lambda_through_source(chain, predicate, context)?;
                Some(Clause::Body(BodyClause::Where(WhereClause::new(predicate))))
            }
            NodeKind::Select { .. } => None,
            NodeKind::OrderBy {
                key_selector,
                direction,
            } => {
                let key = self.resolve_lambda_through_source(chain, key_selector, context)?;
                Some(Clause::Body(BodyClause::OrderBy(OrderByClause::new(vec![
                    Ordering::new(key, *direction),
                ]))))
            }
            NodeKind::ThenBy {
                key_selector,
                direction,
            } => {
                let key = self.resolve_lambda_through_source(chain, key_selector, context)?;
                Some(Clause::Ordering(Ordering::new(key, *direction)))
            }
            NodeKind::SelectMany {
                collection_selector,
                result_selector,
            } => {
                let from_expression =
                    self.resolve_lambda_through_source(chain, collection_selector, context)?;
                let collection_type = from_expression.ty();
                let item_type = collection_type.sequence_element_type().ok_or_else(|| {
                    ParseError::TypeMismatch {
                        found: collection_type.to_string(),
                    }
                })?;
                let item_name = result_selector
                    .as_ref()
                    .and_then(|selector| selector.parameter(1))
                    .map(|parameter| parameter.name.clone())
                    .unwrap_or_else(|| self.associated_identifier.clone());

                let handle = QuerySourceHandle::new(item_name, item_type);
                context.add_mapping(self, handle.clone())?;
                Some(Clause::Body(BodyClause::AdditionalFrom(
                    AdditionalFromClause::new(handle, from_expression),
                )))
            }
            NodeKind::GroupBy {
                key_selector,
                element_selector,
            } => {
                let key = self.resolve_lambda_through_source(chain, key_selector, context)?;
                let element = match element_selector {
                    Some(selector) => self.resolve_lambda_through_source(chain, selector, context)?,
                    None => {
                        let source = self.source(chain)?;
                        let input = source.output_parameter(chain)?;
                        source.resolve(chain, &input, &input.to_expr(), context)?
                    }
                };
                Some(Clause::ResultOperator(ResultOperator::Group(
                    GroupResultOperator::new(self.associated_identifier.clone(), key, element),
                )))
            }
            NodeKind::ResultOperator(operator) => Some(Clause::ResultOperator(operator.clone())),
            NodeKind::Constant(_) | NodeKind::SubQuery(_) => None,
        };

        trace!(
            "{} node {} produced {}",
            self.node_type(),
            self.id.index(),
            clause.as_ref().map_or("no clause", Clause::kind_name)
        );
        Ok(clause)
    }

    fn create_main_from_clause(&self, context: &mut ClauseGenerationContext) -> ParseResult<Clause> {
        let (element_type, from_expression) = match &self.kind {
            NodeKind::Constant(source) => (source.element_type.clone(), source.from_expression()),
            NodeKind::SubQuery(source) => (
                source.element_type.clone(),
                Expr::SubQuery(source.sub_query.clone()),
            ),
            _ => {
                return Err(ParseError::chaining(
                    self.node_type(),
                    "only a query source can create a main from clause",
                ));
            }
        };

        let handle = QuerySourceHandle::new(self.associated_identifier.clone(), element_type);
        context.add_mapping(self, handle.clone())?;
        Ok(Clause::MainFrom(MainFromClause::new(handle, from_expression)))
    }

    /// Create the select clause for a chain ending in this node
    ///
    /// The selector is the item flowing out of the last projecting node
    /// (`Select`, `SelectMany` or the query source), resolved against the
    /// clauses registered in `context`. `previous` is the last clause added
    /// to the model; it does not affect the selector.
    pub fn create_select_clause(
        &self,
        chain: &NodeChain,
        previous: Option<&Clause>,
        context: &ClauseGenerationContext,
    ) -> ParseResult<SelectClause> {
        trace!(
            "Creating select clause at {} node {} after {}",
            self.node_type(),
            self.id.index(),
            previous.map_or("no clause", Clause::kind_name)
        );
        match &self.kind {
            NodeKind::Select { selector } => Ok(SelectClause::new(
                self.resolve_lambda_through_source(chain, selector, context)?,
            )),
            NodeKind::Constant(_) | NodeKind::SubQuery(_) | NodeKind::SelectMany { .. } => {
                let output = self.output_parameter(chain)?;
                Ok(SelectClause::new(self.resolve(
                    chain,
                    &output,
                    &output.to_expr(),
                    context,
                )?))
            }
            _ => self.source(chain)?.create_select_clause(chain, previous, context),
        }
    }
}
