//! Searcher matching no documents.

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;
use crate::search::searcher::{Searcher, ensure_open};

/// A searcher that matches no documents.
///
/// Returned by the composite factories when they are given no children.
#[derive(Debug, Default)]
pub struct MatchNoneSearcher {
    closed: bool,
}

impl MatchNoneSearcher {
    /// Create a new match-none searcher.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Searcher for MatchNoneSearcher {
    fn next(&mut self, _ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        Ok(None)
    }

    fn advance(
        &mut self,
        _ctx: &mut SearchContext,
        _id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }

    fn weight(&self) -> f64 {
        0.0
    }

    fn set_query_norm(&mut self, _norm: f64) {}

    fn count(&self) -> u64 {
        0
    }

    fn document_match_pool_size(&self) -> usize {
        0
    }
}
