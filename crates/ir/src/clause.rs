// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Clauses
//!
//! Clauses are the structural units of a [`QueryModel`](crate::QueryModel):
//!
//! - [`MainFromClause`]: the single data source every query starts from
//! - [`BodyClause`]: additional from clauses, filters and orderings, in
//!   operator application order
//! - [`SelectClause`]: the projection
//!
//! ## Query Sources
//!
//! From clauses are *query sources*: their items can be referenced from later
//! clauses through [`Expr::QuerySourceReference`]. A reference holds a
//! [`QuerySourceHandle`] whose [`QuerySourceId`] is unique per process, so two
//! references built independently for the same clause compare equal.

use crate::expr::Expr;
use crate::types::Type;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_QUERY_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique identity of a query source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuerySourceId(u64);

impl QuerySourceId {
    /// Allocate a fresh identity
    pub fn next() -> Self {
        QuerySourceId(NEXT_QUERY_SOURCE_ID.fetch_add(1, AtomicOrdering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Identity, item name and item type of a query source
///
/// Equality only considers the identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySourceHandle {
    pub id: QuerySourceId,
    /// Name of the items (the range variable, e.g. `c` in `from c in cooks`)
    pub item_name: String,
    /// Type of the items streamed out of the source
    pub item_type: Type,
}

impl QuerySourceHandle {
    /// Create a handle for a new query source
    pub fn new(item_name: impl Into<String>, item_type: Type) -> Self {
        Self {
            id: QuerySourceId::next(),
            item_name: item_name.into(),
            item_type,
        }
    }
}

impl PartialEq for QuerySourceHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for QuerySourceHandle {}

/// The first clause of every query model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainFromClause {
    pub source: QuerySourceHandle,
    /// Expression producing the items (constant collection or sub-query)
    pub from_expression: Expr,
}

impl MainFromClause {
    pub fn new(source: QuerySourceHandle, from_expression: Expr) -> Self {
        Self {
            source,
            from_expression,
        }
    }

    /// Expression referencing the items of this clause
    pub fn reference(&self) -> Expr {
        Expr::QuerySourceReference(self.source.clone())
    }
}

/// Additional from clause (`from a in c.Assistants`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdditionalFromClause {
    pub source: QuerySourceHandle,
    pub from_expression: Expr,
}

impl AdditionalFromClause {
    pub fn new(source: QuerySourceHandle, from_expression: Expr) -> Self {
        Self {
            source,
            from_expression,
        }
    }

    pub fn reference(&self) -> Expr {
        Expr::QuerySourceReference(self.source.clone())
    }
}

/// Filter clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub predicate: Expr,
}

impl WhereClause {
    pub fn new(predicate: Expr) -> Self {
        Self { predicate }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderingDirection {
    Asc,
    Desc,
}

/// A single sort key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub expression: Expr,
    pub direction: OrderingDirection,
}

impl Ordering {
    pub fn new(expression: Expr, direction: OrderingDirection) -> Self {
        Self {
            expression,
            direction,
        }
    }
}

/// Ordering clause; later orderings break ties of earlier ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByClause {
    pub orderings: Vec<Ordering>,
}

impl OrderByClause {
    pub fn new(orderings: Vec<Ordering>) -> Self {
        Self { orderings }
    }

    pub fn add_ordering(&mut self, ordering: Ordering) {
        self.orderings.push(ordering);
    }
}

/// Clauses between the main from clause and the select clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum BodyClause {
    AdditionalFrom(AdditionalFromClause),
    Where(WhereClause),
    OrderBy(OrderByClause),
}

impl BodyClause {
    /// Query source declared by this clause, if any
    pub fn query_source(&self) -> Option<&QuerySourceHandle> {
        match self {
            BodyClause::AdditionalFrom(clause) => Some(&clause.source),
            BodyClause::Where(_) | BodyClause::OrderBy(_) => None,
        }
    }

    /// Expressions held by this clause
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            BodyClause::AdditionalFrom(clause) => vec![&clause.from_expression],
            BodyClause::Where(clause) => vec![&clause.predicate],
            BodyClause::OrderBy(clause) => {
                clause.orderings.iter().map(|o| &o.expression).collect()
            }
        }
    }
}

/// Projection clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectClause {
    pub selector: Expr,
}

impl SelectClause {
    pub fn new(selector: Expr) -> Self {
        Self { selector }
    }
}

impl fmt::Display for MainFromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "from {} {} in {}",
            self.source.item_type, self.source.item_name, self.from_expression
        )
    }
}

impl fmt::Display for BodyClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyClause::AdditionalFrom(clause) => write!(
                f,
                "from {} {} in {}",
                clause.source.item_type, clause.source.item_name, clause.from_expression
            ),
            BodyClause::Where(clause) => write!(f, "where {}", clause.predicate),
            BodyClause::OrderBy(clause) => {
                let orderings = clause
                    .orderings
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "orderby {}", orderings)
            }
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            OrderingDirection::Asc => "asc",
            OrderingDirection::Desc => "desc",
        };
        write!(f, "{} {}", self.expression, direction)
    }
}

impl fmt::Display for SelectClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "select {}", self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_source_ids_are_unique() {
        let a = QuerySourceId::next();
        let b = QuerySourceId::next();
        assert_ne!(a, b);
        assert!(b > a);
    }

    #[test]
    fn test_handle_equality_by_identity() {
        let handle = QuerySourceHandle::new("c", Type::Int32);
        let copy = handle.clone();
        let other = QuerySourceHandle::new("c", Type::Int32);

        assert_eq!(handle, copy);
        assert_ne!(handle, other);
        assert_eq!(
            Expr::query_source_reference(handle.clone()),
            Expr::query_source_reference(copy)
        );
    }

    #[test]
    fn test_order_by_display() {
        let handle = QuerySourceHandle::new("c", Type::Int32);
        let mut clause = OrderByClause::new(vec![Ordering::new(
            Expr::query_source_reference(handle.clone()),
            OrderingDirection::Asc,
        )]);
        clause.add_ordering(Ordering::new(
            Expr::query_source_reference(handle),
            OrderingDirection::Desc,
        ));

        let body = BodyClause::OrderBy(clause);
        assert_eq!(body.to_string(), "orderby [c] asc, [c] desc");
        assert_eq!(body.expressions().len(), 2);
        assert!(body.query_source().is_none());
    }
}
