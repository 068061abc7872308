//! Disjunction (OR) factory.
//!
//! Callers never pick a strategy themselves: [`new_disjunction_searcher`]
//! chooses between the slice and heap implementations from the fan-out.

use tracing::debug;

use crate::config::SearcherConfig;
use crate::error::{PhalanxError, Result};
use crate::search::context::SearcherOptions;
use crate::search::searcher::optimize::{UnadornedMerge, optimize_unadorned};
use crate::search::searcher::{
    DisjunctionHeapSearcher, DisjunctionSliceSearcher, MatchNoneSearcher, Searcher,
};

/// Implementation used for a disjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisjunctionStrategy {
    /// Linear rescan of every child.
    Slice,
    /// Min-heap keyed by each child's current id.
    Heap,
}

/// Pick the strategy for `fan_out` children.
///
/// # Panics
///
/// Panics if `config.disjunction_heap_takeover` is zero.
pub fn select_disjunction_strategy(fan_out: usize, config: &SearcherConfig) -> DisjunctionStrategy {
    assert!(
        config.disjunction_heap_takeover > 0,
        "disjunction heap takeover must be greater than zero"
    );
    if fan_out > config.disjunction_heap_takeover {
        DisjunctionStrategy::Heap
    } else {
        DisjunctionStrategy::Slice
    }
}

/// Build a disjunction requiring at least `min` children to match.
pub fn new_disjunction_searcher(
    searchers: Vec<Box<dyn Searcher>>,
    min: usize,
    options: &SearcherOptions,
    config: &SearcherConfig,
) -> Result<Box<dyn Searcher>> {
    new_disjunction_searcher_limited(searchers, min, options, config, false)
}

/// Build a disjunction, rejecting more clauses than the configured maximum
/// when `limit` is set.
pub fn new_disjunction_searcher_limited(
    mut searchers: Vec<Box<dyn Searcher>>,
    min: usize,
    options: &SearcherOptions,
    config: &SearcherConfig,
    limit: bool,
) -> Result<Box<dyn Searcher>> {
    if searchers.is_empty() {
        return Ok(Box::new(MatchNoneSearcher::new()));
    }

    if limit && config.too_many_clauses(searchers.len()) {
        debug!(
            clauses = searchers.len(),
            max = config.disjunction_max_clause_count,
            "rejecting disjunction over clause limit"
        );
        return Err(PhalanxError::too_many_clauses(
            "",
            searchers.len(),
            config.disjunction_max_clause_count,
        ));
    }

    if searchers.len() > 1 && min <= 1 && !options.scoring() && !options.include_term_vectors {
        if let Some(optimized) =
            optimize_unadorned(&mut searchers, UnadornedMerge::Union { min }, options)?
        {
            return Ok(optimized);
        }
    }

    let strategy = select_disjunction_strategy(searchers.len(), config);
    debug!(fan_out = searchers.len(), min, ?strategy, "building disjunction searcher");
    Ok(match strategy {
        DisjunctionStrategy::Heap => Box::new(DisjunctionHeapSearcher::new(searchers, min, options)),
        DisjunctionStrategy::Slice => {
            Box::new(DisjunctionSliceSearcher::new(searchers, min, options))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::context::SearchContext;
    use crate::search::searcher::testing::{ListSearcher, drain};

    #[test]
    fn test_strategy_selection() {
        let config = SearcherConfig::default();
        assert_eq!(select_disjunction_strategy(1, &config), DisjunctionStrategy::Slice);
        assert_eq!(select_disjunction_strategy(10, &config), DisjunctionStrategy::Slice);
        assert_eq!(select_disjunction_strategy(11, &config), DisjunctionStrategy::Heap);

        let config = config.with_disjunction_heap_takeover(2);
        assert_eq!(select_disjunction_strategy(3, &config), DisjunctionStrategy::Heap);
    }

    #[test]
    #[should_panic(expected = "heap takeover")]
    fn test_zero_takeover_panics() {
        let config = SearcherConfig::default().with_disjunction_heap_takeover(0);
        select_disjunction_strategy(1, &config);
    }

    #[test]
    fn test_clause_limit() {
        let config = SearcherConfig::default().with_disjunction_max_clause_count(2);
        let searchers = (0..3).map(|i| ListSearcher::boxed(&[i])).collect();
        let result = new_disjunction_searcher_limited(
            searchers,
            0,
            &SearcherOptions::default(),
            &config,
            true,
        );
        assert!(matches!(
            result,
            Err(PhalanxError::TooManyClauses { count: 3, max: 2, .. })
        ));

        let searchers = (0..3).map(|i| ListSearcher::boxed(&[i])).collect();
        let mut searcher =
            new_disjunction_searcher(searchers, 0, &SearcherOptions::default(), &config).unwrap();
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());
        assert_eq!(drain(searcher.as_mut(), &mut ctx), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_matches_nothing() {
        let mut searcher = new_disjunction_searcher(
            Vec::new(),
            0,
            &SearcherOptions::default(),
            &SearcherConfig::default(),
        )
        .unwrap();
        let mut ctx = SearchContext::new(1);
        assert!(searcher.next(&mut ctx).unwrap().is_none());
    }

    #[test]
    fn test_unadorned_union_keeps_min() {
        use crate::index::memory::{MemoryDocument, MemoryIndex};
        use crate::search::context::ScoreMode;
        use crate::search::searcher::TermSearcher;

        let mut index = MemoryIndex::new();
        for (id, tokens) in [("a", vec!["x"]), ("b", vec!["y"]), ("c", vec!["x", "y"])] {
            index
                .add_document(MemoryDocument::new(id).add_tokens("f", &tokens))
                .unwrap();
        }
        let options = SearcherOptions::default().with_score(ScoreMode::None);
        let searchers: Vec<Box<dyn Searcher>> = ["x", "y"]
            .iter()
            .map(|term| {
                Box::new(TermSearcher::new(&index, term, "f", 1.0, &options).unwrap())
                    as Box<dyn Searcher>
            })
            .collect();

        let mut searcher =
            new_disjunction_searcher(searchers, 1, &options, &SearcherConfig::default()).unwrap();
        assert_eq!(searcher.min(), 1);
        let mut ctx = SearchContext::new(searcher.document_match_pool_size());
        assert_eq!(drain(searcher.as_mut(), &mut ctx), vec![0, 1, 2]);
    }
}
