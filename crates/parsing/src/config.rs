// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Parser configuration

use serde::{Deserialize, Serialize};

/// Configuration for [`QueryParser`](crate::QueryParser)
///
/// ```json
/// { "max_chain_depth": 50, "generated_identifier_prefix": "<generated>" }
/// ```
///
/// Missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Maximum number of nested operator calls in one chain
    pub max_chain_depth: usize,

    /// Prefix of identifiers generated for nodes without a lambda parameter
    pub generated_identifier_prefix: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_chain_depth: 100,
            generated_identifier_prefix: "<generated>".to_string(),
        }
    }
}

impl ParserConfig {
    pub fn with_max_chain_depth(mut self, max_chain_depth: usize) -> Self {
        self.max_chain_depth = max_chain_depth;
        self
    }

    /// Load a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Identifier for the `counter`-th generated name
    pub fn generated_identifier(&self, counter: usize) -> String {
        format!("{}_{}", self.generated_identifier_prefix, counter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.max_chain_depth, 100);
        assert_eq!(config.generated_identifier(0), "<generated>_0");
    }

    #[test]
    fn test_from_json_partial() {
        let config = ParserConfig::from_json_str(r#"{ "max_chain_depth": 8 }"#).unwrap();
        assert_eq!(config.max_chain_depth, 8);
        assert_eq!(config.generated_identifier_prefix, "<generated>");
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(ParserConfig::from_json_str(r#"{ "max_chain_depth": "deep" }"#).is_err());
    }
}
