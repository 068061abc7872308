//! Disjunction strategy backed by a min-heap of child cursors.
//!
//! Each step touches only the children sitting on the smallest id, which
//! pays off once the fan-out is large.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::DisjunctionQueryScorer;
use crate::search::searcher::{Searcher, close_all, ensure_open, query_norm, release_all};

/// A child's current match together with the child index.
#[derive(Debug)]
struct HeapEntry {
    curr: DocumentMatch,
    idx: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap: lower ids first, then lower child index
        other
            .curr
            .index_internal_id
            .cmp(&self.curr.index_internal_id)
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

/// Matches documents present in at least `min` children.
#[derive(Debug)]
pub struct DisjunctionHeapSearcher {
    searchers: Vec<Box<dyn Searcher>>,
    heap: BinaryHeap<HeapEntry>,
    /// Entries popped off the heap that share the smallest id.
    matching: Vec<HeapEntry>,
    /// Scratch for child indexes and advanced entries.
    matching_idxs: Vec<usize>,
    advanced: Vec<HeapEntry>,
    constituents: Vec<DocumentMatch>,
    min: usize,
    scorer: DisjunctionQueryScorer,
    query_norm: f64,
    initialized: bool,
    closed: bool,
}

impl DisjunctionHeapSearcher {
    /// Create a heap disjunction over `searchers`.
    pub fn new(searchers: Vec<Box<dyn Searcher>>, min: usize, options: &SearcherOptions) -> Self {
        let fan_out = searchers.len();
        let mut searcher = DisjunctionHeapSearcher {
            searchers,
            heap: BinaryHeap::with_capacity(fan_out),
            matching: Vec::with_capacity(fan_out),
            matching_idxs: Vec::with_capacity(fan_out),
            advanced: Vec::with_capacity(fan_out),
            constituents: Vec::with_capacity(fan_out),
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
        for (idx, searcher) in self.searchers.iter_mut().enumerate() {
            if let Some(curr) = searcher.next(ctx)? {
                self.heap.push(HeapEntry { curr, idx });
            }
        }
        self.update_matches();
        self.initialized = true;
        Ok(())
    }

    fn update_matches(&mut self) {
        let Some(first) = self.heap.pop() else {
            return;
        };
        self.matching.push(first);
        while let Some(top) = self.heap.peek() {
            if top.curr.index_internal_id != self.matching[0].curr.index_internal_id {
                break;
            }
            if let Some(entry) = self.heap.pop() {
                self.matching.push(entry);
            }
        }
    }
}

impl Searcher for DisjunctionHeapSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if !self.initialized {
            self.initialize(ctx)?;
        }

        while !self.matching.is_empty() {
            let matched = self.matching.len();
            let found = matched >= self.min;

            self.matching_idxs.clear();
            for entry in self.matching.drain(..) {
                self.matching_idxs.push(entry.idx);
                if found {
                    self.constituents.push(entry.curr);
                } else {
                    ctx.pool.put(entry.curr);
                }
            }
            let rv = if found {
                Some(self.scorer.score(
                    ctx,
                    &mut self.constituents,
                    matched,
                    self.searchers.len(),
                ))
            } else {
                None
            };

            // A failing child drops out; the rest are still re-primed.
            let mut failure = None;
            for &idx in &self.matching_idxs {
                match self.searchers[idx].next(ctx) {
                    Ok(Some(curr)) => self.heap.push(HeapEntry { curr, idx }),
                    Ok(None) => {}
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

        self.heap.extend(self.matching.drain(..));

        while self
            .heap
            .peek()
            .is_some_and(|top| top.curr.index_internal_id < *id)
        {
            let Some(entry) = self.heap.pop() else {
                break;
            };
            ctx.pool.put(entry.curr);
            if let Some(curr) = self.searchers[entry.idx].advance(ctx, id)? {
                self.advanced.push(HeapEntry {
                    curr,
                    idx: entry.idx,
                });
            }
        }
        self.heap.extend(self.advanced.drain(..));
        self.update_matches();

        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.heap.clear();
        self.matching.clear();
        self.advanced.clear();
        close_all(self.searchers.iter_mut())
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        let held = self
            .heap
            .drain()
            .chain(self.matching.drain(..))
            .chain(self.advanced.drain(..));
        for entry in held {
            ctx.pool.put(entry.curr);
        }
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
        self.searchers.len()
            + self
                .searchers
                .iter()
                .map(|searcher| searcher.document_match_pool_size())
                .sum::<usize>()
    }
}
