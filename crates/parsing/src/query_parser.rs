// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Parser
//!
//! Entry point turning an operator call tree into a [`QueryModel`]:
//!
//! 1. [`ExpressionTreeParser`] builds the node chain
//! 2. every node creates its clause in source-first order, registering query
//!    sources in a shared [`ClauseGenerationContext`]
//! 3. the last node creates the select clause
//! 4. the assembled model is checked for forward references and a valid
//!    result operator sequence
//!
//! ## Clause ordering rules
//!
//! - exactly one main from clause, produced by the first node
//! - body clauses and projections cannot follow a result operator
//! - an ordering from `ThenBy` must extend an orderby clause that is still the
//!   last body clause

use crate::clauses::Clause;
use crate::config::ParserConfig;
use crate::context::ClauseGenerationContext;
use crate::error::{ParseError, ParseResult};
use crate::node::{NodeChain, NodeKind};
use crate::registry::NodeTypeRegistry;
use crate::tree_parser::ExpressionTreeParser;
use tracing::{debug, instrument};
use unified_query_ir::{BodyClause, Expr, MainFromClause, QueryModel, ResultOperator, SelectClause};

/// Parser producing query models from operator call trees
#[derive(Debug, Clone, Default)]
pub struct QueryParser {
    tree_parser: ExpressionTreeParser,
}

impl QueryParser {
    pub fn new(config: ParserConfig) -> Self {
        Self {
            tree_parser: ExpressionTreeParser::new(config),
        }
    }

    /// Create a parser recognizing the operators of `registry`
    pub fn with_registry(config: ParserConfig, registry: NodeTypeRegistry) -> Self {
        Self {
            tree_parser: ExpressionTreeParser::with_registry(config, registry),
        }
    }

    pub fn tree_parser(&self) -> &ExpressionTreeParser {
        &self.tree_parser
    }

    /// Parse a call tree into a query model
    #[instrument(skip_all)]
    pub fn get_parsed_query(&self, expr: &Expr) -> ParseResult<QueryModel> {
        let chain = self.tree_parser.parse_tree(expr)?;
        let model = self.create_query_model(&chain)?;
        debug!("Parsed query model: {}", model);
        Ok(model)
    }

    /// Assemble the query model of an already parsed node chain
    pub fn create_query_model(&self, chain: &NodeChain) -> ParseResult<QueryModel> {
        let last = chain.last().ok_or(ParseError::EmptyChain)?;
        let mut context = ClauseGenerationContext::new();
        let mut builder = QueryModelBuilder::default();
        let mut previous: Option<Clause> = None;

        for node in chain.iter() {
            let clause = node.create_clause(chain, previous.as_ref(), &mut context)?;
            match clause {
                Some(clause) => {
                    builder.add(node.node_type(), clause.clone())?;
                    previous = Some(clause);
                }
                None => {
                    if matches!(node.kind, NodeKind::Select { .. }) {
                        builder.check_no_result_operators(node.node_type())?;
                    }
                }
            }
        }

        let select = last.create_select_clause(chain, previous.as_ref(), &context)?;
        builder.build(select)
    }
}

/// Collects clauses and enforces their ordering rules
#[derive(Debug, Default)]
struct QueryModelBuilder {
    main_from: Option<MainFromClause>,
    body_clauses: Vec<BodyClause>,
    result_operators: Vec<ResultOperator>,
}

impl QueryModelBuilder {
    fn add(&mut self, node_type: &str, clause: Clause) -> ParseResult<()> {
        match clause {
            Clause::MainFrom(from) => {
                if self.main_from.is_some() {
                    return Err(ParseError::chaining(
                        node_type,
                        "a query model has exactly one main from clause",
                    ));
                }
                self.main_from = Some(from);
            }
            Clause::Body(body) => {
                self.check_no_result_operators(node_type)?;
                self.body_clauses.push(body);
            }
            Clause::Ordering(ordering) => {
                self.check_no_result_operators(node_type)?;
                match self.body_clauses.last_mut() {
                    Some(BodyClause::OrderBy(order_by)) => order_by.add_ordering(ordering),
                    _ => {
                        return Err(ParseError::chaining(
                            node_type,
                            "ThenBy must directly follow OrderBy, OrderByDescending or another ThenBy",
                        ));
                    }
                }
            }
            Clause::ResultOperator(operator) => self.result_operators.push(operator),
        }
        Ok(())
    }

    fn check_no_result_operators(&self, node_type: &str) -> ParseResult<()> {
        match self.result_operators.last() {
            Some(operator) => Err(ParseError::chaining(
                node_type,
                format!(
                    "cannot be applied after the result operator '{}'",
                    operator.name()
                ),
            )),
            None => Ok(()),
        }
    }

    fn build(self, select: SelectClause) -> ParseResult<QueryModel> {
        let main_from = self
            .main_from
            .ok_or_else(|| ParseError::chaining("QueryModel", "no main from clause was created"))?;

        let mut model = QueryModel::new(main_from, select);
        for clause in self.body_clauses {
            model.add_body_clause(clause);
        }
        for operator in self.result_operators {
            model.add_result_operator(operator);
        }

        model.output_data_info()?;
        model.check_references()?;
        Ok(model)
    }
}
