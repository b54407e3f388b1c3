// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Constant values carried by constant expressions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a constant expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Int32(i32),
    Int64(i64),
    Double(f64),
    String(String),

    /// In-memory collection
    Sequence(Vec<Value>),

    /// Named data source resolved by a query executor (e.g., a table)
    Source(String),
}

impl Value {
    /// Check whether this value stands for a collection rather than a scalar
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::Sequence(_) | Value::Source(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(true) => write!(f, "True"),
            Value::Boolean(false) => write!(f, "False"),
            Value::Char(c) => write!(f, "{}", c),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Sequence(items) => {
                let items = items
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", items)
            }
            Value::Source(name) => write!(f, "{}", name),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}
