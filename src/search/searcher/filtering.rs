//! Decorator that re-checks every match of a child searcher.

use std::fmt;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;
use crate::search::searcher::{Searcher, ensure_open};

/// Predicate deciding whether a candidate match is kept.
pub type FilterFunc = Box<dyn FnMut(&DocumentMatch) -> Result<bool> + Send>;

/// Keeps only the child's matches accepted by a predicate.
///
/// Used to refine cheap approximate candidate sets with an exact check.
pub struct FilteringSearcher {
    child: Box<dyn Searcher>,
    accept: FilterFunc,
    closed: bool,
}

impl FilteringSearcher {
    /// Wrap `child`, keeping matches for which `accept` returns `true`.
    pub fn new(child: Box<dyn Searcher>, accept: FilterFunc) -> Self {
        FilteringSearcher {
            child,
            accept,
            closed: false,
        }
    }

    fn filter(
        &mut self,
        ctx: &mut SearchContext,
        mut candidate: Option<DocumentMatch>,
    ) -> Result<Option<DocumentMatch>> {
        while let Some(m) = candidate {
            if (self.accept)(&m)? {
                return Ok(Some(m));
            }
            ctx.pool.put(m);
            candidate = self.child.next(ctx)?;
        }
        Ok(None)
    }
}

impl fmt::Debug for FilteringSearcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilteringSearcher")
            .field("child", &self.child)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl Searcher for FilteringSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        let candidate = self.child.next(ctx)?;
        self.filter(ctx, candidate)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        let candidate = self.child.advance(ctx, id)?;
        self.filter(ctx, candidate)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close()
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        self.child.release(ctx);
    }

    fn weight(&self) -> f64 {
        self.child.weight()
    }

    fn set_query_norm(&mut self, norm: f64) {
        self.child.set_query_norm(norm);
    }

    fn count(&self) -> u64 {
        self.child.count()
    }

    fn min(&self) -> usize {
        self.child.min()
    }

    fn document_match_pool_size(&self) -> usize {
        self.child.document_match_pool_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhalanxError;
    use crate::search::searcher::testing::{ListSearcher, drain};

    fn even() -> FilterFunc {
        Box::new(|m: &DocumentMatch| -> Result<bool> {
            Ok(m.index_internal_id.to_u64().is_some_and(|id| id % 2 == 0))
        })
    }

    #[test]
    fn test_filters_matches() {
        let mut searcher = FilteringSearcher::new(ListSearcher::boxed(&[1, 2, 3, 4, 5, 6]), even());
        let mut ctx = SearchContext::new(2);
        assert_eq!(drain(&mut searcher, &mut ctx), vec![2, 4, 6]);
        assert_eq!(ctx.pool.outstanding(), 0);
    }

    #[test]
    fn test_advance_then_filter() {
        let mut searcher = FilteringSearcher::new(ListSearcher::boxed(&[1, 3, 5, 6, 7, 8]), even());
        let mut ctx = SearchContext::new(2);

        let m = searcher
            .advance(&mut ctx, &IndexInternalId::from_u64(2))
            .unwrap()
            .unwrap();
        assert_eq!(m.index_internal_id.to_u64(), Some(6));
    }

    #[test]
    fn test_predicate_error_propagates() {
        let failing: FilterFunc = Box::new(|_: &DocumentMatch| -> Result<bool> {
            Err(PhalanxError::other("doc values unavailable"))
        });
        let mut searcher = FilteringSearcher::new(ListSearcher::boxed(&[1]), failing);
        let mut ctx = SearchContext::new(1);
        assert!(searcher.next(&mut ctx).is_err());
    }

    #[test]
    fn test_forwards_min() {
        let mut child = ListSearcher::new(&[1]);
        child.min = 2;
        let searcher = FilteringSearcher::new(Box::new(child), even());
        assert_eq!(searcher.min(), 2);
        assert_eq!(searcher.count(), 1);
    }
}
