// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Streamed Data
//!
//! Describes what a query model produces once executed, and dispatches the
//! model to the matching [`QueryExecutor`] entry point:
//!
//! - [`StreamedDataInfo::Sequence`]: a sequence of items → `execute_collection`
//! - [`StreamedDataInfo::SingleValue`]: one item (`First`, `Single`, ...) →
//!   `execute_single`
//! - [`StreamedDataInfo::ScalarValue`]: an aggregate (`Count`, `Any`, ...) →
//!   `execute_scalar`
//!
//! Executors themselves live outside this crate.

use crate::error::IrResult;
use crate::query::QueryModel;
use crate::types::Type;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend that runs finished query models
pub trait QueryExecutor {
    /// Execute a query producing an aggregate value
    fn execute_scalar(&self, model: &QueryModel) -> IrResult<Value>;

    /// Execute a query producing a single item
    fn execute_single(&self, model: &QueryModel, return_default_when_empty: bool)
    -> IrResult<Value>;

    /// Execute a query producing a sequence of items
    fn execute_collection(&self, model: &QueryModel) -> IrResult<Vec<Value>>;
}

/// Shape of the data produced by a query model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamedDataInfo {
    Sequence {
        item_type: Type,
    },
    SingleValue {
        data_type: Type,
        return_default_when_empty: bool,
    },
    ScalarValue {
        data_type: Type,
    },
}

impl StreamedDataInfo {
    pub fn sequence(item_type: Type) -> Self {
        StreamedDataInfo::Sequence { item_type }
    }

    pub fn single(data_type: Type, return_default_when_empty: bool) -> Self {
        StreamedDataInfo::SingleValue {
            data_type,
            return_default_when_empty,
        }
    }

    pub fn scalar(data_type: Type) -> Self {
        StreamedDataInfo::ScalarValue { data_type }
    }

    /// Static type of the produced data
    pub fn output_type(&self) -> Type {
        match self {
            StreamedDataInfo::Sequence { item_type } => Type::enumerable(item_type.clone()),
            StreamedDataInfo::SingleValue { data_type, .. }
            | StreamedDataInfo::ScalarValue { data_type } => data_type.clone(),
        }
    }

    /// Run `model` on `executor` using the entry point matching this shape
    pub fn execute_query_model(
        &self,
        model: &QueryModel,
        executor: &dyn QueryExecutor,
    ) -> IrResult<StreamedData> {
        let value = match self {
            StreamedDataInfo::Sequence { .. } => {
                StreamedValue::Sequence(executor.execute_collection(model)?)
            }
            StreamedDataInfo::SingleValue {
                return_default_when_empty,
                ..
            } => StreamedValue::Value(executor.execute_single(model, *return_default_when_empty)?),
            StreamedDataInfo::ScalarValue { .. } => {
                StreamedValue::Value(executor.execute_scalar(model)?)
            }
        };
        Ok(StreamedData {
            info: self.clone(),
            value,
        })
    }
}

impl fmt::Display for StreamedDataInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamedDataInfo::Sequence { item_type } => write!(f, "sequence of {}", item_type),
            StreamedDataInfo::SingleValue { data_type, .. } => {
                write!(f, "single value of {}", data_type)
            }
            StreamedDataInfo::ScalarValue { data_type } => {
                write!(f, "scalar value of {}", data_type)
            }
        }
    }
}

/// Data produced by executing a query model
#[derive(Debug, Clone, PartialEq)]
pub struct StreamedData {
    pub info: StreamedDataInfo,
    pub value: StreamedValue,
}

/// Executed value
#[derive(Debug, Clone, PartialEq)]
pub enum StreamedValue {
    Value(Value),
    Sequence(Vec<Value>),
}
