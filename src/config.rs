//! Tunables for searcher construction.
//!
//! These values are passed explicitly to the factories that consult them, so
//! independent query trees can be built with different limits.

use serde::{Deserialize, Serialize};

use crate::error::{PhalanxError, Result};

/// Fan-out above which disjunctions switch from the slice to the heap strategy.
pub const DEFAULT_DISJUNCTION_HEAP_TAKEOVER: usize = 10;

/// Configuration for building searcher trees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherConfig {
    /// Disjunctions with more children than this use the heap strategy.
    pub disjunction_heap_takeover: usize,

    /// Maximum number of clauses a single disjunction may combine.
    /// Zero means unlimited.
    pub disjunction_max_clause_count: usize,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            disjunction_heap_takeover: DEFAULT_DISJUNCTION_HEAP_TAKEOVER,
            disjunction_max_clause_count: 0,
        }
    }
}

impl SearcherConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SearcherConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the heap takeover threshold.
    pub fn with_disjunction_heap_takeover(mut self, takeover: usize) -> Self {
        self.disjunction_heap_takeover = takeover;
        self
    }

    /// Set the maximum clause count.
    pub fn with_disjunction_max_clause_count(mut self, max: usize) -> Self {
        self.disjunction_max_clause_count = max;
        self
    }

    /// Check the configuration for values no searcher can work with.
    pub fn validate(&self) -> Result<()> {
        if self.disjunction_heap_takeover == 0 {
            return Err(PhalanxError::invalid_config(
                "disjunction_heap_takeover must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Whether `count` clauses exceed the configured limit.
    pub fn too_many_clauses(&self, count: usize) -> bool {
        self.disjunction_max_clause_count != 0 && count > self.disjunction_max_clause_count
    }
}
