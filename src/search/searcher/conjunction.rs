//! Conjunction (AND) over any number of searchers.

use std::cmp::Ordering;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::ConjunctionQueryScorer;
use crate::search::searcher::optimize::{UnadornedMerge, optimize_unadorned};
use crate::search::searcher::{
    MatchNoneSearcher, Searcher, close_all, ensure_open, query_norm, release_all,
};

/// Build a conjunction over `searchers`.
///
/// No children yields a searcher that matches nothing. When scores and
/// term vectors are not needed the children may be collapsed into a single
/// id list.
pub fn new_conjunction_searcher(
    mut searchers: Vec<Box<dyn Searcher>>,
    options: &SearcherOptions,
) -> Result<Box<dyn Searcher>> {
    if searchers.is_empty() {
        return Ok(Box::new(MatchNoneSearcher::new()));
    }

    searchers.sort_by_key(|searcher| searcher.count());
    if searchers.len() > 1 && !options.scoring() && !options.include_term_vectors {
        if let Some(optimized) =
            optimize_unadorned(&mut searchers, UnadornedMerge::Intersection, options)?
        {
            return Ok(optimized);
        }
    }

    Ok(Box::new(ConjunctionSearcher::new(searchers, options)))
}

/// Matches documents present in every child.
#[derive(Debug)]
pub struct ConjunctionSearcher {
    searchers: Vec<Box<dyn Searcher>>,
    currs: Vec<Option<DocumentMatch>>,
    constituents: Vec<DocumentMatch>,
    max_id_idx: usize,
    scorer: ConjunctionQueryScorer,
    query_norm: f64,
    initialized: bool,
    closed: bool,
}

impl ConjunctionSearcher {
    /// Create a conjunction, ordering children by ascending count.
    ///
    /// The sort is stable, so children with equal counts keep their
    /// relative order.
    pub fn new(mut searchers: Vec<Box<dyn Searcher>>, options: &SearcherOptions) -> Self {
        searchers.sort_by_key(|searcher| searcher.count());
        let currs = searchers.iter().map(|_| None).collect();
        let mut searcher = ConjunctionSearcher {
            constituents: Vec::with_capacity(searchers.len()),
            searchers,
            currs,
            max_id_idx: 0,
            scorer: ConjunctionQueryScorer::new(options.clone()),
            query_norm: 1.0,
            initialized: false,
            closed: false,
        };
        searcher.compute_query_norm();
        searcher
    }

    /// Norm applied to the children at construction.
    pub fn query_norm(&self) -> f64 {
        self.query_norm
    }

    fn compute_query_norm(&mut self) {
        self.query_norm = query_norm(self.weight());
        self.set_query_norm(self.query_norm);
    }

    fn initialize(&mut self, ctx: &mut SearchContext) -> Result<()> {
        for (i, searcher) in self.searchers.iter_mut().enumerate() {
            self.currs[i] = searcher.next(ctx)?;
        }
        self.initialized = true;
        Ok(())
    }

    fn advance_child(
        &mut self,
        ctx: &mut SearchContext,
        i: usize,
        id: &IndexInternalId,
    ) -> Result<()> {
        if let Some(old) = self.currs[i].take() {
            ctx.pool.put(old);
        }
        self.currs[i] = self.searchers[i].advance(ctx, id)?;
        Ok(())
    }

    /// Drop out of the iteration, handing every held match back.
    fn exhaust(&mut self, ctx: &mut SearchContext) {
        for curr in &mut self.currs {
            if let Some(m) = curr.take() {
                ctx.pool.put(m);
            }
        }
        release_all(ctx, self.searchers.iter_mut());
        self.initialized = true;
    }

    fn current_id(&self, i: usize) -> Option<IndexInternalId> {
        self.currs[i]
            .as_ref()
            .map(|m| m.index_internal_id.clone())
    }
}

impl Searcher for ConjunctionSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.initialized {
            self.initialize(ctx)?;
        }
        if self.searchers.is_empty() {
            return Ok(None);
        }

        'outer: loop {
            let Some(mut max_id) = self.current_id(self.max_id_idx) else {
                self.exhaust(ctx);
                return Ok(None);
            };

            let mut i = 0;
            while i < self.currs.len() {
                let Some(curr_id) = self.current_id(i) else {
                    self.exhaust(ctx);
                    return Ok(None);
                };
                match curr_id.cmp(&max_id) {
                    Ordering::Equal => i += 1,
                    Ordering::Greater => {
                        // Children before `i` sat on the old max; catch them up.
                        self.max_id_idx = i;
                        max_id = curr_id;
                        for x in 0..i {
                            self.advance_child(ctx, x, &max_id)?;
                        }
                        continue 'outer;
                    }
                    Ordering::Less => {
                        // Re-examine the same child after advancing it.
                        self.advance_child(ctx, i, &max_id)?;
                    }
                }
            }

            break;
        }

        for curr in &mut self.currs {
            if let Some(m) = curr.take() {
                self.constituents.push(m);
            }
        }
        let rv = self.scorer.score(ctx, &mut self.constituents);

        for (i, searcher) in self.searchers.iter_mut().enumerate() {
            self.currs[i] = searcher.next(ctx)?;
        }

        Ok(Some(rv))
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.initialized {
            self.initialize(ctx)?;
        }

        for i in 0..self.searchers.len() {
            match &self.currs[i] {
                Some(curr) if curr.index_internal_id >= *id => continue,
                Some(_) => self.advance_child(ctx, i, id)?,
                None => {}
            }
        }

        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.currs.iter_mut().for_each(|curr| *curr = None);
        self.constituents.clear();
        close_all(self.searchers.iter_mut())
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        self.exhaust(ctx);
    }

    fn weight(&self) -> f64 {
        self.searchers.iter().map(|searcher| searcher.weight()).sum()
    }

    fn set_query_norm(&mut self, norm: f64) {
        for searcher in &mut self.searchers {
            searcher.set_query_norm(norm);
        }
    }

    fn count(&self) -> u64 {
        self.searchers.iter().map(|searcher| searcher.count()).sum()
    }

    fn document_match_pool_size(&self) -> usize {
        self.currs.len()
            + self
                .searchers
                .iter()
                .map(|searcher| searcher.document_match_pool_size())
                .sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::context::ScoreMode;
    use crate::search::searcher::DisjunctionSliceSearcher;
    use crate::search::searcher::testing::{ListSearcher, drain};

    fn conjunction(lists: &[&[u64]]) -> ConjunctionSearcher {
        let searchers = lists.iter().map(|ids| ListSearcher::boxed(ids)).collect();
        ConjunctionSearcher::new(searchers, &SearcherOptions::default())
    }

    #[test]
    fn test_intersection() {
        let mut searcher = conjunction(&[&[1, 3, 5], &[3, 5, 7]]);
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());
        assert_eq!(drain(&mut searcher, &mut ctx), vec![3, 5]);
        assert!(searcher.next(&mut ctx).unwrap().is_none());
        assert_eq!(ctx.pool.outstanding(), 0);
    }

    #[test]
    fn test_three_way_intersection_with_gaps() {
        let mut searcher = conjunction(&[&[0, 2, 4, 6, 8, 10, 12], &[3, 6, 9, 12], &[1, 6, 12, 13]]);
        let mut ctx = SearchContext::new(8);
        assert_eq!(drain(&mut searcher, &mut ctx), vec![6, 12]);
    }

    #[test]
    fn test_single_child_passes_through() {
        let mut searcher = conjunction(&[&[2, 4]]);
        let mut ctx = SearchContext::new(2);
        assert_eq!(drain(&mut searcher, &mut ctx), vec![2, 4]);
    }

    #[test]
    fn test_empty_child_exhausts() {
        let mut searcher = conjunction(&[&[1, 2, 3], &[]]);
        let mut ctx = SearchContext::new(2);
        assert!(drain(&mut searcher, &mut ctx).is_empty());
        assert_eq!(ctx.pool.outstanding(), 0);
    }

    #[test]
    fn test_scores_are_summed() {
        let mut searcher = conjunction(&[&[4], &[4], &[4]]);
        let mut ctx = SearchContext::new(4);
        let m = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(m.score, 3.0);
    }

    #[test]
    fn test_advance() {
        let mut searcher = conjunction(&[&[1, 3, 5, 7, 9], &[1, 5, 7, 9]]);
        let mut ctx = SearchContext::new(4);

        let m = searcher
            .advance(&mut ctx, &IndexInternalId::from_u64(6))
            .unwrap()
            .unwrap();
        assert_eq!(m.index_internal_id.to_u64(), Some(7));
        ctx.pool.put(m);
        assert_eq!(drain(&mut searcher, &mut ctx), vec![9]);
    }

    #[test]
    fn test_advance_to_current_does_not_skip() {
        let mut searcher = conjunction(&[&[2, 4], &[2, 4]]);
        let mut ctx = SearchContext::new(4);

        let first = searcher.next(&mut ctx).unwrap().unwrap();
        assert_eq!(first.index_internal_id.to_u64(), Some(2));
        let second = searcher
            .advance(&mut ctx, &IndexInternalId::from_u64(3))
            .unwrap()
            .unwrap();
        assert_eq!(second.index_internal_id.to_u64(), Some(4));
    }

    #[test]
    fn test_error_propagates() {
        let mut failing = ListSearcher::new(&[1, 5, 9, 11]);
        failing.fail_at = Some(11);
        let searchers: Vec<Box<dyn Searcher>> =
            vec![ListSearcher::boxed(&[1, 5, 9, 12]), Box::new(failing)];
        let mut searcher = ConjunctionSearcher::new(searchers, &SearcherOptions::default());
        let mut ctx = SearchContext::new(4);

        assert!(searcher.next(&mut ctx).unwrap().is_some());
        assert!(searcher.next(&mut ctx).unwrap().is_some());
        assert!(searcher.next(&mut ctx).is_err());
    }

    #[test]
    fn test_factory_empty_and_close() {
        let mut empty = new_conjunction_searcher(Vec::new(), &SearcherOptions::default()).unwrap();
        let mut ctx = SearchContext::new(1);
        assert!(empty.next(&mut ctx).unwrap().is_none());

        let options = SearcherOptions::default().with_score(ScoreMode::None);
        let mut searcher =
            new_conjunction_searcher(vec![ListSearcher::boxed(&[1, 2]), ListSearcher::boxed(&[2])], &options)
                .unwrap();
        assert_eq!(drain(searcher.as_mut(), &mut ctx), vec![2]);
        searcher.close().unwrap();
        searcher.close().unwrap();
    }

    #[test]
    fn test_exhaustion_releases_buffering_children() {
        let options = SearcherOptions::default();
        let disjunction: Box<dyn Searcher> = Box::new(DisjunctionSliceSearcher::new(
            vec![ListSearcher::boxed(&[2, 9]), ListSearcher::boxed(&[5, 8])],
            0,
            &options,
        ));
        let mut searcher = ConjunctionSearcher::new(vec![ListSearcher::boxed(&[2, 5]), disjunction], &options);
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());

        assert_eq!(drain(&mut searcher, &mut ctx), vec![2, 5]);
        assert_eq!(ctx.pool.outstanding(), 0);
    }
}
