//! Searcher implementations for query execution.
//!
//! A searcher tree is pulled from the root: every call to
//! [`Searcher::next`] or [`Searcher::advance`] returns the next match in
//! strictly increasing [`IndexInternalId`] order, or `None` once the searcher
//! is exhausted. Exhaustion is absorbing.

use std::fmt::Debug;

use tracing::warn;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;

pub mod boolean;
pub mod conjunction;
pub mod disjunction;
pub mod disjunction_heap;
pub mod disjunction_slice;
pub mod docid;
pub mod filtering;
pub mod match_all;
pub mod match_none;
pub mod multi_term;
pub mod optimize;
pub mod phrase;
pub mod term;

pub use self::boolean::{BooleanSearcher, new_boolean_searcher_from_clauses};
pub use self::conjunction::{ConjunctionSearcher, new_conjunction_searcher};
pub use self::disjunction::{
    DisjunctionStrategy, new_disjunction_searcher, new_disjunction_searcher_limited,
    select_disjunction_strategy,
};
pub use self::disjunction_heap::DisjunctionHeapSearcher;
pub use self::disjunction_slice::DisjunctionSliceSearcher;
pub use self::docid::DocIdSearcher;
pub use self::filtering::{FilterFunc, FilteringSearcher};
pub use self::match_all::MatchAllSearcher;
pub use self::match_none::MatchNoneSearcher;
pub use self::multi_term::new_multi_term_searcher;
pub use self::phrase::{
    PhrasePart, PhrasePath, PhraseSearcher, find_phrase_paths, new_multi_phrase_searcher,
    new_phrase_searcher,
};
pub use self::term::TermSearcher;

/// Trait for composable document searchers.
pub trait Searcher: Send + Debug {
    /// Move to the next matching document.
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>>;

    /// Move to the first matching document at or after `id`.
    ///
    /// Equivalent to calling [`next`](Self::next) until a match with an id of
    /// at least `id` appears, discarding the skipped matches.
    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>>;

    /// Release this searcher and all of its children.
    ///
    /// Calling `close` more than once is a no-op. Any other call after
    /// `close` panics.
    fn close(&mut self) -> Result<()>;

    /// Return every match this searcher and its children still hold to the
    /// pool.
    ///
    /// A parent calls this on a child it will not pull from again, so the
    /// child's buffered matches do not stay outstanding. Searchers that hold
    /// nothing between calls keep the default.
    fn release(&mut self, _ctx: &mut SearchContext) {}

    /// Sum of squared weights used for query normalization.
    fn weight(&self) -> f64;

    /// Propagate the query norm to scorers.
    fn set_query_norm(&mut self, norm: f64);

    /// Upper bound on the number of matches.
    fn count(&self) -> u64;

    /// Minimum number of sub-clauses a document must match.
    fn min(&self) -> usize {
        0
    }

    /// Number of matches this searcher may hold at once.
    fn document_match_pool_size(&self) -> usize;

    /// Optional fast path for id-only iteration.
    fn as_optimizable(&mut self) -> Option<&mut dyn Optimizable> {
        None
    }
}

/// Capability of searchers that can hand over their remaining ids without
/// scores, frequencies or locations.
pub trait Optimizable {
    /// Whether [`unadorned_ids`](Self::unadorned_ids) is available right now.
    fn can_unadorn(&self) -> bool;

    /// Drain the remaining ids. The searcher is exhausted afterwards.
    fn unadorned_ids(&mut self) -> Result<Vec<IndexInternalId>>;
}

/// Close every searcher, returning the first error.
pub(crate) fn close_all<'a, I>(searchers: I) -> Result<()>
where
    I: IntoIterator<Item = &'a mut Box<dyn Searcher>>,
{
    let mut first = None;
    for searcher in searchers {
        if let Err(e) = searcher.close() {
            warn!(error = %e, "failed to close child searcher");
            if first.is_none() {
                first = Some(e);
            }
        }
    }
    match first {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

/// Release every searcher.
pub(crate) fn release_all<'a, I>(ctx: &mut SearchContext, searchers: I)
where
    I: IntoIterator<Item = &'a mut Box<dyn Searcher>>,
{
    for searcher in searchers {
        searcher.release(ctx);
    }
}

/// Panic when a closed searcher is used.
#[track_caller]
pub(crate) fn ensure_open(closed: bool) {
    assert!(!closed, "searcher used after close");
}

/// Query norm for a sum of squared weights.
pub(crate) fn query_norm(sum_of_squared_weights: f64) -> f64 {
    if sum_of_squared_weights > 0.0 {
        1.0 / sum_of_squared_weights.sqrt()
    } else {
        1.0
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ListSearcher;
    use super::*;

    #[test]
    fn test_query_norm() {
        assert_eq!(query_norm(4.0), 0.5);
        assert_eq!(query_norm(0.0), 1.0);
    }

    #[test]
    fn test_close_all_attempts_every_child() {
        let mut failing = ListSearcher::new(&[1]);
        failing.fail_close = true;
        let mut searchers: Vec<Box<dyn Searcher>> =
            vec![Box::new(failing), ListSearcher::boxed(&[2]), ListSearcher::boxed(&[3])];

        let result = close_all(searchers.iter_mut());
        assert!(result.is_err());
        let debug = format!("{searchers:?}");
        assert_eq!(debug.matches("closes: 1").count(), 3);
    }

    #[test]
    #[should_panic(expected = "used after close")]
    fn test_ensure_open_panics() {
        ensure_open(true);
    }
}
