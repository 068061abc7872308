//! Searcher over an explicit set of documents.

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::{DocIdReader, IndexReader};
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::ConstantScorer;
use crate::search::searcher::{Searcher, ensure_open};

/// Emits the given documents with a constant score.
#[derive(Debug)]
pub struct DocIdSearcher {
    reader: Box<dyn DocIdReader>,
    scorer: ConstantScorer,
    count: u64,
    min: usize,
    closed: bool,
}

impl DocIdSearcher {
    /// Search the documents whose external ids are in `ids`.
    ///
    /// Unknown ids are ignored.
    pub fn new(
        index: &dyn IndexReader,
        ids: &[String],
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        let reader = index.doc_id_reader_only(ids)?;
        Ok(Self::from_reader(reader, boost, options))
    }

    /// Search the ids produced by `reader`.
    pub fn from_reader(reader: Box<dyn DocIdReader>, boost: f64, options: &SearcherOptions) -> Self {
        DocIdSearcher {
            count: reader.count(),
            reader,
            scorer: ConstantScorer::new(1.0, boost, options.clone()),
            min: 0,
            closed: false,
        }
    }

    /// Report `min` from [`Searcher::min`].
    pub fn with_min(mut self, min: usize) -> Self {
        self.min = min;
        self
    }
}

impl Searcher for DocIdSearcher {
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

    fn min(&self) -> usize {
        self.min
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }
}
