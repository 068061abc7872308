//! # Phalanx
//!
//! Composable searcher trees for full-text query execution.
//!
//! ## Features
//!
//! - Term, phrase and multi-term leaf searchers over pluggable index readers
//! - Conjunction, disjunction (slice and heap strategies) and boolean combinators
//! - Sloppy and multi-term phrase matching over term vectors
//! - Recycling document-match pool sized from the searcher tree
//! - Geo filters for refining approximate candidate sets
//! - Top-N hit collection with score explanations

pub mod config;
pub mod error;
pub mod index;
pub mod search;

pub mod prelude {
    pub use crate::config::SearcherConfig;
    pub use crate::error::{PhalanxError, Result};
    pub use crate::index::{IndexInternalId, IndexReader, MemoryDocument, MemoryIndex};
    pub use crate::search::searcher::{
        TermSearcher, new_boolean_searcher_from_clauses, new_conjunction_searcher,
        new_disjunction_searcher, new_phrase_searcher,
    };
    pub use crate::search::{
        DocumentMatch, ScoreMode, SearchContext, Searcher, SearcherOptions, TopNCollector,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
