//! Searcher matching every document in the index.

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::{DocIdReader, IndexReader};
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::ConstantScorer;
use crate::search::searcher::{Searcher, ensure_open};

/// A searcher that matches all documents with a constant score.
#[derive(Debug)]
pub struct MatchAllSearcher {
    reader: Box<dyn DocIdReader>,
    scorer: ConstantScorer,
    count: u64,
    closed: bool,
}

impl MatchAllSearcher {
    /// Create a new match-all searcher.
    pub fn new(index: &dyn IndexReader, boost: f64, options: &SearcherOptions) -> Result<Self> {
        let reader = index.doc_id_reader_all()?;
        let count = index.doc_count()?;
        Ok(MatchAllSearcher {
            reader,
            scorer: ConstantScorer::new(1.0, boost, options.clone()),
            count,
            closed: false,
        })
    }
}

impl Searcher for MatchAllSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        Ok(self.reader.next()?.map(|id| self.scorer.score(ctx, &id)))
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        Ok(self.reader.advance(id)?.map(|id| self.scorer.score(ctx, &id)))
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.reader.close()
    }

    fn weight(&self) -> f64 {
        self.scorer.weight()
    }

    fn set_query_norm(&mut self, norm: f64) {
        self.scorer.set_query_norm(norm);
    }

    fn count(&self) -> u64 {
        self.count
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }
}
