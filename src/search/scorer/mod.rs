//! Scoring implementations for ranking search results.
//!
//! Scorers only turn reader output into [`DocumentMatch`] values and combine
//! constituent matches; the searchers decide which documents match.

pub mod composite;
pub mod constant;
pub mod term;

use std::fmt::Debug;

use crate::index::reader::TermFieldDoc;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;

pub use self::composite::{ConjunctionQueryScorer, DisjunctionQueryScorer};
pub use self::constant::ConstantScorer;
pub use self::term::TermQueryScorer;

/// Scorer used by term searchers to materialize matches.
pub trait TermScorer: Send + Debug {
    /// Sum of squared weights contributed to query normalization.
    fn weight(&self) -> f64;

    /// Apply the query norm computed by the root of the tree.
    fn set_query_norm(&mut self, norm: f64);

    /// Build a match for `doc` using a match borrowed from the context pool.
    fn score(&self, ctx: &mut SearchContext, doc: &TermFieldDoc) -> DocumentMatch;
}
