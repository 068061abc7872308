//! Disjunction strategy that rescans every child on each step.
//!
//! Cheap for small fan-out: no heap maintenance, one linear pass per hit.

use std::cmp::Ordering;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::DisjunctionQueryScorer;
use crate::search::searcher::{Searcher, close_all, ensure_open, query_norm, release_all};

/// Matches documents present in at least `min` children.
#[derive(Debug)]
pub struct DisjunctionSliceSearcher {
    searchers: Vec<Box<dyn Searcher>>,
    currs: Vec<Option<DocumentMatch>>,
    /// Children whose current match has the smallest id.
    matching_idxs: Vec<usize>,
    constituents: Vec<DocumentMatch>,
    min: usize,
    scorer: DisjunctionQueryScorer,
    query_norm: f64,
    initialized: bool,
    closed: bool,
}

impl DisjunctionSliceSearcher {
    /// Create a slice disjunction over `searchers`.
    pub fn new(searchers: Vec<Box<dyn Searcher>>, min: usize, options: &SearcherOptions) -> Self {
        let currs = searchers.iter().map(|_| None).collect();
        let mut searcher = DisjunctionSliceSearcher {
            matching_idxs: Vec::with_capacity(searchers.len()),
            constituents: Vec::with_capacity(searchers.len()),
            searchers,
            currs,
            min,
            scorer: DisjunctionQueryScorer::new(options.clone()),
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
        self.update_matches();
        self.initialized = true;
        Ok(())
    }

    fn update_matches(&mut self) {
        self.matching_idxs.clear();
        let mut smallest: Option<&IndexInternalId> = None;
        for (i, curr) in self.currs.iter().enumerate() {
            let Some(curr) = curr else {
                continue;
            };
            if let Some(id) = smallest {
                match curr.index_internal_id.cmp(id) {
                    Ordering::Greater => continue,
                    Ordering::Less => self.matching_idxs.clear(),
                    Ordering::Equal => {}
                }
            }
            if self.matching_idxs.is_empty() {
                smallest = Some(&curr.index_internal_id);
            }
            self.matching_idxs.push(i);
        }
    }
}

impl Searcher for DisjunctionSliceSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.initialized {
            self.initialize(ctx)?;
        }

        while !self.matching_idxs.is_empty() {
            let matched = self.matching_idxs.len();
            let mut rv = None;
            if matched >= self.min {
                for &i in &self.matching_idxs {
                    if let Some(curr) = self.currs[i].take() {
                        self.constituents.push(curr);
                    }
                }
                rv = Some(self.scorer.score(
                    ctx,
                    &mut self.constituents,
                    matched,
                    self.searchers.len(),
                ));
            } else {
                for &i in &self.matching_idxs {
                    if let Some(curr) = self.currs[i].take() {
                        ctx.pool.put(curr);
                    }
                }
            }

            // A failing child drops out; the rest are still re-primed.
            let mut failure = None;
            for &i in &self.matching_idxs {
                match self.searchers[i].next(ctx) {
                    Ok(curr) => self.currs[i] = curr,
                    Err(e) if failure.is_none() => failure = Some(e),
                    Err(_) => {}
                }
            }
            self.update_matches();

            if let Some(e) = failure {
                if let Some(m) = rv {
                    ctx.pool.put(m);
                }
                return Err(e);
            }
            if rv.is_some() {
                return Ok(rv);
            }
        }

        Ok(None)
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
            match self.currs[i].take() {
                Some(curr) if curr.index_internal_id >= *id => self.currs[i] = Some(curr),
                Some(curr) => {
                    ctx.pool.put(curr);
                    self.currs[i] = self.searchers[i].advance(ctx, id)?;
                }
                None => {}
            }
        }
        self.update_matches();

        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.currs.iter_mut().for_each(|curr| *curr = None);
        self.matching_idxs.clear();
        close_all(self.searchers.iter_mut())
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        for curr in &mut self.currs {
            if let Some(m) = curr.take() {
                ctx.pool.put(m);
            }
        }
        self.matching_idxs.clear();
        release_all(ctx, self.searchers.iter_mut());
        self.initialized = true;
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

    fn min(&self) -> usize {
        self.min
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
