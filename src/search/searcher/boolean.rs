//! Boolean combination of must, should and must-not clauses.
//!
//! The driving clause is `must` when present, `should` otherwise. A `should`
//! hit on the driver's current document adds its score. Documents found in
//! `must_not` are skipped. The `must_not` searcher is only ever advanced to
//! the driver's candidate, never iterated on its own.

use std::cmp::Ordering;
use std::mem;

use tracing::debug;

use crate::config::SearcherConfig;
use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::IndexReader;
use crate::search::context::{ScoreMode, SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::scorer::ConjunctionQueryScorer;
use crate::search::searcher::{
    MatchAllSearcher, MatchNoneSearcher, Searcher, close_all, ensure_open,
    new_conjunction_searcher, new_disjunction_searcher, query_norm, release_all,
};

/// Position of the `should` clause relative to the driver.
#[derive(Debug, Default)]
enum ShouldCursor {
    /// Holding a match that has not been used yet.
    Current(DocumentMatch),
    /// Its last match went into a result; behind the driver until advanced.
    Consumed,
    /// Exhausted or absent.
    #[default]
    Exhausted,
}

impl ShouldCursor {
    fn from_match(m: Option<DocumentMatch>) -> Self {
        match m {
            Some(m) => ShouldCursor::Current(m),
            None => ShouldCursor::Exhausted,
        }
    }
}

/// Build a boolean searcher from clause lists.
///
/// `must` clauses are combined with a conjunction, `should` clauses with a
/// disjunction requiring `min_should` hits and `must_not` clauses with an
/// unscored disjunction. A query made only of `must_not` clauses excludes
/// from every document in the index.
pub fn new_boolean_searcher_from_clauses(
    index: &dyn IndexReader,
    must: Vec<Box<dyn Searcher>>,
    should: Vec<Box<dyn Searcher>>,
    min_should: usize,
    must_not: Vec<Box<dyn Searcher>>,
    options: &SearcherOptions,
    config: &SearcherConfig,
) -> Result<Box<dyn Searcher>> {
    let mut must = if must.is_empty() {
        None
    } else {
        Some(new_conjunction_searcher(must, options)?)
    };
    let should = if should.is_empty() {
        None
    } else {
        Some(new_disjunction_searcher(should, min_should, options, config)?)
    };
    let must_not = if must_not.is_empty() {
        None
    } else {
        let exclusion_options = SearcherOptions::default().with_score(ScoreMode::None);
        Some(new_disjunction_searcher(must_not, 0, &exclusion_options, config)?)
    };

    if must.is_none() && should.is_none() {
        if must_not.is_none() {
            return Ok(Box::new(MatchNoneSearcher::new()));
        }
        debug!("boolean query has only must_not clauses, matching all documents");
        must = Some(Box::new(MatchAllSearcher::new(index, 1.0, options)?));
    }

    Ok(Box::new(BooleanSearcher::new(must, should, must_not, options)))
}

/// Searcher combining required, optional and excluded clauses.
#[derive(Debug)]
pub struct BooleanSearcher {
    must: Option<Box<dyn Searcher>>,
    should: Option<Box<dyn Searcher>>,
    must_not: Option<Box<dyn Searcher>>,
    curr_must: Option<DocumentMatch>,
    curr_should: ShouldCursor,
    curr_must_not: Option<DocumentMatch>,
    must_not_exhausted: bool,
    current_id: Option<IndexInternalId>,
    constituents: Vec<DocumentMatch>,
    scorer: ConjunctionQueryScorer,
    query_norm: f64,
    initialized: bool,
    done: bool,
    closed: bool,
}

impl BooleanSearcher {
    /// Create a boolean searcher from already combined clauses.
    pub fn new(
        must: Option<Box<dyn Searcher>>,
        should: Option<Box<dyn Searcher>>,
        must_not: Option<Box<dyn Searcher>>,
        options: &SearcherOptions,
    ) -> Self {
        let mut searcher = BooleanSearcher {
            must,
            should,
            must_not,
            curr_must: None,
            curr_should: ShouldCursor::Exhausted,
            curr_must_not: None,
            must_not_exhausted: false,
            current_id: None,
            constituents: Vec::with_capacity(2),
            scorer: ConjunctionQueryScorer::new(options.clone()),
            query_norm: 1.0,
            initialized: false,
            done: false,
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
        if let Some(must) = self.must.as_mut() {
            self.curr_must = must.next(ctx)?;
        }
        if let Some(should) = self.should.as_mut() {
            self.curr_should = ShouldCursor::from_match(should.next(ctx)?);
        }
        self.update_current_id();
        self.initialized = true;
        Ok(())
    }

    fn update_current_id(&mut self) {
        self.current_id = if self.must.is_some() {
            self.curr_must.as_ref().map(|m| m.index_internal_id.clone())
        } else {
            match &self.curr_should {
                ShouldCursor::Current(m) => Some(m.index_internal_id.clone()),
                _ => None,
            }
        };
    }

    /// Move the driving clause to its next match.
    fn advance_driver(&mut self, ctx: &mut SearchContext) -> Result<()> {
        if let Some(must) = self.must.as_mut() {
            if let Some(old) = self.curr_must.take() {
                ctx.pool.put(old);
            }
            self.curr_must = must.next(ctx)?;
        } else if let Some(should) = self.should.as_mut() {
            if let ShouldCursor::Current(old) = mem::take(&mut self.curr_should) {
                ctx.pool.put(old);
            }
            self.curr_should = ShouldCursor::from_match(should.next(ctx)?);
        }
        self.update_current_id();
        Ok(())
    }

    /// Whether `must_not` contains `id`, advancing it there if it is behind.
    fn excluded(&mut self, ctx: &mut SearchContext, id: &IndexInternalId) -> Result<bool> {
        let Some(must_not) = self.must_not.as_mut() else {
            return Ok(false);
        };
        if self.must_not_exhausted {
            return Ok(false);
        }

        let behind = self
            .curr_must_not
            .as_ref()
            .is_none_or(|m| m.index_internal_id < *id);
        if behind {
            if let Some(old) = self.curr_must_not.take() {
                ctx.pool.put(old);
            }
            self.curr_must_not = must_not.advance(ctx, id)?;
            self.must_not_exhausted = self.curr_must_not.is_none();
        }

        Ok(self
            .curr_must_not
            .as_ref()
            .is_some_and(|m| m.index_internal_id == *id))
    }

    fn score_current(&mut self, ctx: &mut SearchContext, with_should: bool) -> DocumentMatch {
        if let Some(m) = self.curr_must.take() {
            self.constituents.push(m);
        }
        if with_should {
            if let ShouldCursor::Current(m) = mem::replace(&mut self.curr_should, ShouldCursor::Consumed) {
                self.constituents.push(m);
            }
        }
        self.scorer.score(ctx, &mut self.constituents)
    }
}

impl Searcher for BooleanSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if self.done {
            return Ok(None);
        }
        if !self.initialized {
            self.initialize(ctx)?;
        }

        let should_min = self.should.as_ref().map_or(0, |should| should.min());
        let mut rv = None;

        while let Some(current_id) = self.current_id.clone() {
            if self.excluded(ctx, &current_id)? {
                self.advance_driver(ctx)?;
                continue;
            }

            let should_cmp = match &self.curr_should {
                ShouldCursor::Current(m) => m.index_internal_id.cmp(&current_id),
                ShouldCursor::Consumed => Ordering::Less,
                ShouldCursor::Exhausted => Ordering::Greater,
            };

            match should_cmp {
                Ordering::Less => {
                    if let ShouldCursor::Current(old) =
                        mem::replace(&mut self.curr_should, ShouldCursor::Consumed)
                    {
                        ctx.pool.put(old);
                    }
                    if let Some(should) = self.should.as_mut() {
                        self.curr_should = ShouldCursor::from_match(should.advance(ctx, &current_id)?);
                    }
                    let hit = matches!(
                        &self.curr_should,
                        ShouldCursor::Current(m) if m.index_internal_id == current_id
                    );
                    if hit || should_min == 0 {
                        rv = Some(self.score_current(ctx, hit));
                        self.advance_driver(ctx)?;
                        break;
                    }
                }
                Ordering::Equal => {
                    rv = Some(self.score_current(ctx, true));
                    self.advance_driver(ctx)?;
                    break;
                }
                Ordering::Greater => {
                    if self.should.is_none() || should_min == 0 {
                        rv = Some(self.score_current(ctx, false));
                        self.advance_driver(ctx)?;
                        break;
                    }
                }
            }

            self.advance_driver(ctx)?;
        }

        if rv.is_none() {
            // The driver ran out; `should` and `must_not` may still hold matches.
            self.release(ctx);
        }
        Ok(rv)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        if self.done {
            return Ok(None);
        }
        if !self.initialized {
            self.initialize(ctx)?;
        }

        if self.current_id.as_ref().is_some_and(|current| current < id) {
            if let Some(must) = self.must.as_mut() {
                if let Some(old) = self.curr_must.take_if(|m| m.index_internal_id < *id) {
                    ctx.pool.put(old);
                    self.curr_must = must.advance(ctx, id)?;
                }
            }
            if let Some(should) = self.should.as_mut() {
                let behind = match &self.curr_should {
                    ShouldCursor::Current(m) => m.index_internal_id < *id,
                    ShouldCursor::Consumed => true,
                    ShouldCursor::Exhausted => false,
                };
                if behind {
                    if let ShouldCursor::Current(old) = mem::take(&mut self.curr_should) {
                        ctx.pool.put(old);
                    }
                    self.curr_should = ShouldCursor::from_match(should.advance(ctx, id)?);
                }
            }
            self.update_current_id();
        }

        self.next(ctx)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.curr_must = None;
        self.curr_should = ShouldCursor::Exhausted;
        self.curr_must_not = None;
        close_all(
            self.must
                .iter_mut()
                .chain(self.should.iter_mut())
                .chain(self.must_not.iter_mut()),
        )
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        if let Some(m) = self.curr_must.take() {
            ctx.pool.put(m);
        }
        if let ShouldCursor::Current(m) = mem::take(&mut self.curr_should) {
            ctx.pool.put(m);
        }
        if let Some(m) = self.curr_must_not.take() {
            ctx.pool.put(m);
        }
        for m in self.constituents.drain(..) {
            ctx.pool.put(m);
        }
        release_all(
            ctx,
            self.must
                .iter_mut()
                .chain(self.should.iter_mut())
                .chain(self.must_not.iter_mut()),
        );
        self.current_id = None;
        self.initialized = true;
        self.done = true;
    }

    fn weight(&self) -> f64 {
        self.must.iter().chain(self.should.iter()).map(|s| s.weight()).sum()
    }

    fn set_query_norm(&mut self, norm: f64) {
        for searcher in self.must.iter_mut().chain(self.should.iter_mut()) {
            searcher.set_query_norm(norm);
        }
    }

    fn count(&self) -> u64 {
        self.must.iter().chain(self.should.iter()).map(|s| s.count()).sum()
    }

    fn document_match_pool_size(&self) -> usize {
        3 + self
            .must
            .iter()
            .chain(self.should.iter())
            .chain(self.must_not.iter())
            .map(|s| s.document_match_pool_size())
            .sum::<usize>()
    }
}
