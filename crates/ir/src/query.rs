// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Query Model
//!
//! The structured form of a query: one main from clause, a list of body
//! clauses, a select clause and a list of result operators.
//!
//! ```text
//! from Cook c in value(Cooks)
//! from Cook a in [c].Assistants
//! where ([a].Age > 18)
//! select [a]
//! => Count()
//! ```
//!
//! Clauses reference earlier query sources through
//! [`Expr::QuerySourceReference`]; [`QueryModel::check_references`] verifies
//! that no clause refers to a source declared after it.

use crate::clause::{BodyClause, MainFromClause, QuerySourceHandle, QuerySourceId, SelectClause};
use crate::error::{IrError, IrResult};
use crate::expr::Expr;
use crate::result_operator::ResultOperator;
use crate::streamed::{QueryExecutor, StreamedData, StreamedDataInfo};
use crate::visitors::collect_query_source_references;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A complete query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryModel {
    pub main_from_clause: MainFromClause,
    pub body_clauses: Vec<BodyClause>,
    pub select_clause: SelectClause,
    pub result_operators: Vec<ResultOperator>,
}

impl QueryModel {
    pub fn new(main_from_clause: MainFromClause, select_clause: SelectClause) -> Self {
        Self {
            main_from_clause,
            body_clauses: Vec::new(),
            select_clause,
            result_operators: Vec::new(),
        }
    }

    pub fn add_body_clause(&mut self, clause: BodyClause) {
        self.body_clauses.push(clause);
    }

    pub fn add_result_operator(&mut self, operator: ResultOperator) {
        self.result_operators.push(operator);
    }

    /// Query sources declared by this model, in declaration order
    pub fn query_sources(&self) -> Vec<&QuerySourceHandle> {
        std::iter::once(&self.main_from_clause.source)
            .chain(self.body_clauses.iter().filter_map(BodyClause::query_source))
            .collect()
    }

    /// Shape of the data this model produces
    ///
    /// Starts from the sequence of selected items and threads it through the
    /// result operators in order.
    pub fn output_data_info(&self) -> IrResult<StreamedDataInfo> {
        let selected = StreamedDataInfo::sequence(self.select_clause.selector.ty());
        self.result_operators
            .iter()
            .try_fold(selected, |info, operator| operator.output_data_info(&info))
    }

    /// Execute this model on `executor`
    pub fn execute(&self, executor: &dyn QueryExecutor) -> IrResult<StreamedData> {
        self.output_data_info()?
            .execute_query_model(self, executor)
    }

    /// Verify that every clause only references query sources declared
    /// before it
    pub fn check_references(&self) -> IrResult<()> {
        let mut declared = HashSet::new();

        check_clause(
            &declared,
            "main from clause",
            [&self.main_from_clause.from_expression],
        )?;
        declared.insert(self.main_from_clause.source.id);

        for clause in &self.body_clauses {
            check_clause(&declared, &clause.to_string(), clause.expressions())?;
            if let Some(source) = clause.query_source() {
                declared.insert(source.id);
            }
        }

        check_clause(
            &declared,
            &self.select_clause.to_string(),
            [&self.select_clause.selector],
        )?;
        for operator in &self.result_operators {
            check_clause(&declared, &operator.to_string(), operator.expressions())?;
        }
        Ok(())
    }
}

fn check_clause<'a>(
    declared: &HashSet<QuerySourceId>,
    clause: &str,
    expressions: impl IntoIterator<Item = &'a Expr>,
) -> IrResult<()> {
    for expr in expressions {
        if let Some(handle) = collect_query_source_references(expr)
            .into_iter()
            .find(|handle| !declared.contains(&handle.id))
        {
            return Err(IrError::ForwardReference {
                clause: clause.to_string(),
                source_name: handle.item_name.clone(),
            });
        }
    }
    Ok(())
}

impl fmt::Display for QueryModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.main_from_clause)?;
        for clause in &self.body_clauses {
            write!(f, " {}", clause)?;
        }
        write!(f, " {}", self.select_clause)?;
        for operator in &self.result_operators {
            write!(f, " => {}", operator)?;
        }
        Ok(())
    }
}
