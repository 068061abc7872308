//! Leaf searcher over a single term's posting list.

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::{IndexReader, TermFieldDoc, TermFieldReader};
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::{TermQueryScorer, TermScorer};
use crate::search::searcher::{Optimizable, Searcher, ensure_open};

/// Emits one scored match per posting of a term.
#[derive(Debug)]
pub struct TermSearcher {
    reader: Box<dyn TermFieldReader>,
    scorer: TermQueryScorer,
    tfd: TermFieldDoc,
    closed: bool,
}

impl TermSearcher {
    /// Open a term searcher for `term` in `field`.
    pub fn new(
        index: &dyn IndexReader,
        term: &str,
        field: &str,
        boost: f64,
        options: &SearcherOptions,
    ) -> Result<Self> {
        let reader =
            index.term_field_reader(term, field, true, true, options.include_term_vectors)?;
        let doc_total = index.doc_count()?;
        let scorer = TermQueryScorer::new(
            term,
            field,
            boost,
            doc_total,
            reader.count(),
            options.clone(),
        );
        Ok(Self::from_parts(reader, scorer))
    }

    /// Build a term searcher from an already opened reader and scorer.
    pub fn from_parts(reader: Box<dyn TermFieldReader>, scorer: TermQueryScorer) -> Self {
        TermSearcher {
            reader,
            scorer,
            tfd: TermFieldDoc::default(),
            closed: false,
        }
    }

    /// The scorer used for this term.
    pub fn scorer(&self) -> &TermQueryScorer {
        &self.scorer
    }
}

impl Searcher for TermSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.reader.next(&mut self.tfd)? {
            return Ok(None);
        }
        Ok(Some(self.scorer.score(ctx, &self.tfd)))
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.reader.advance(id, &mut self.tfd)? {
            return Ok(None);
        }
        Ok(Some(self.scorer.score(ctx, &self.tfd)))
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
        self.reader.count()
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }

    fn as_optimizable(&mut self) -> Option<&mut dyn Optimizable> {
        Some(self)
    }
}

impl Optimizable for TermSearcher {
    fn can_unadorn(&self) -> bool {
        !self.closed && self.reader.supports_unadorned()
    }

    fn unadorned_ids(&mut self) -> Result<Vec<IndexInternalId>> {
        ensure_open(self.closed);
        self.reader.remaining_ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::{MemoryDocument, MemoryIndex};

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        for (id, tokens) in [
            ("a", vec!["quick", "brown", "fox"]),
            ("b", vec!["lazy", "dog"]),
            ("c", vec!["quick", "quick", "dog"]),
            ("d", vec!["fox"]),
        ] {
            index
                .add_document(MemoryDocument::new(id).add_tokens("body", &tokens))
                .unwrap();
        }
        index
    }

    #[test]
    fn test_term_searcher_next() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "quick", "body", 1.0, &SearcherOptions::default()).unwrap();
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());

        assert_eq!(searcher.count(), 2);
        let first = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(first.index_internal_id.to_u64(), Some(0));
        let second = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(second.index_internal_id.to_u64(), Some(2));
        assert!(second.score > 0.0);
        assert!(first.locations.is_empty());
        assert!(searcher.next(&mut ctx).unwrap().is_none());
        assert!(searcher.next(&mut ctx).unwrap().is_none());
    }

    #[test]
    fn test_term_searcher_advance() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "fox", "body", 1.0, &SearcherOptions::default()).unwrap();
        let mut ctx = SearchContext::new(1);

        let m = searcher
            .advance(&mut ctx, &IndexInternalId::from_u64(1))
            .unwrap()
            .unwrap();
        assert_eq!(m.index_internal_id.to_u64(), Some(3));
        assert!(searcher.advance(&mut ctx, &IndexInternalId::from_u64(4)).unwrap().is_none());
    }

    #[test]
    fn test_term_searcher_records_locations() {
        let index = index();
        let options = SearcherOptions::default().with_term_vectors(true);
        let mut searcher = TermSearcher::new(&index, "quick", "body", 1.0, &options).unwrap();
        let mut ctx = SearchContext::new(1);

        searcher.next(&mut ctx).unwrap();
        let m = searcher.next(&mut ctx).unwrap().unwrap();
        let positions: Vec<u64> = m.locations["body"]["quick"].iter().map(|l| l.pos).collect();
        assert_eq!(positions, vec![0, 1]);
    }

    #[test]
    fn test_term_searcher_unadorned() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "dog", "body", 1.0, &SearcherOptions::default()).unwrap();

        let optimizable = searcher.as_optimizable().unwrap();
        assert!(optimizable.can_unadorn());
        let ids: Vec<u64> = optimizable
            .unadorned_ids()
            .unwrap()
            .iter()
            .filter_map(IndexInternalId::to_u64)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_close_is_idempotent() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "dog", "body", 1.0, &SearcherOptions::default()).unwrap();
        assert!(searcher.close().is_ok());
        assert!(searcher.close().is_ok());
    }

    #[test]
    #[should_panic(expected = "used after close")]
    fn test_next_after_close_panics() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "dog", "body", 1.0, &SearcherOptions::default()).unwrap();
        let mut ctx = SearchContext::new(1);
        searcher.close().unwrap();
        let _ = searcher.next(&mut ctx);
    }
}
