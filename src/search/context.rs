//! Per-query search state and options.

use serde::{Deserialize, Serialize};

use crate::search::pool::DocumentMatchPool;

/// How searchers compute scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreMode {
    /// Compute relevance scores.
    #[default]
    Default,
    /// Skip score computation; every match scores zero.
    None,
}

/// Options shared by the searchers of one query tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearcherOptions {
    /// Scoring mode.
    pub score: ScoreMode,
    /// Attach score explanations to matches.
    pub explain: bool,
    /// Record term locations on matches.
    pub include_term_vectors: bool,
}

impl SearcherOptions {
    /// Options with scoring enabled and no extras.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score mode.
    pub fn with_score(mut self, score: ScoreMode) -> Self {
        self.score = score;
        self
    }

    /// Enable or disable explanations.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }

    /// Enable or disable term vectors.
    pub fn with_term_vectors(mut self, include: bool) -> Self {
        self.include_term_vectors = include;
        self
    }

    /// Whether scores are computed.
    pub fn scoring(&self) -> bool {
        self.score != ScoreMode::None
    }
}

/// Mutable state threaded through every `next`/`advance` call.
#[derive(Debug, Default)]
pub struct SearchContext {
    /// Pool that every searcher in the tree borrows matches from.
    pub pool: DocumentMatchPool,
}

impl SearchContext {
    /// Create a context whose pool pre-allocates `pool_size` matches.
    pub fn new(pool_size: usize) -> Self {
        SearchContext {
            pool: DocumentMatchPool::new(pool_size),
        }
    }
}
