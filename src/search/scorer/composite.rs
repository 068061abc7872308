//! Scorers that combine the matches of several child searchers.
//!
//! Both scorers drain the constituent list: the first match is reused as
//! the result and every other constituent goes back to the pool once its
//! locations have been merged.

use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;

/// Sums the scores of all constituents.
#[derive(Debug, Clone, Default)]
pub struct ConjunctionQueryScorer {
    options: SearcherOptions,
}

impl ConjunctionQueryScorer {
    /// Create a new conjunction scorer.
    pub fn new(options: SearcherOptions) -> Self {
        ConjunctionQueryScorer { options }
    }

    /// Combine `constituents` into one match.
    ///
    /// # Panics
    ///
    /// Panics if `constituents` is empty.
    pub fn score(&self, ctx: &mut SearchContext, constituents: &mut Vec<DocumentMatch>) -> DocumentMatch {
        let (mut rv, sum, children) = merge_constituents(ctx, constituents, self.options.explain);
        rv.score = sum;
        if self.options.explain {
            rv.expl = Some(Explanation::with_children(sum, "sum of:", children));
        }
        rv
    }
}

/// Sums the scores of the matching constituents and scales by the fraction
/// of children that matched.
#[derive(Debug, Clone, Default)]
pub struct DisjunctionQueryScorer {
    options: SearcherOptions,
}

impl DisjunctionQueryScorer {
    /// Create a new disjunction scorer.
    pub fn new(options: SearcherOptions) -> Self {
        DisjunctionQueryScorer { options }
    }

    /// Combine `constituents`, `count_match` of `count_total` children matched.
    ///
    /// # Panics
    ///
    /// Panics if `constituents` is empty.
    pub fn score(
        &self,
        ctx: &mut SearchContext,
        constituents: &mut Vec<DocumentMatch>,
        count_match: usize,
        count_total: usize,
    ) -> DocumentMatch {
        let (mut rv, sum, children) = merge_constituents(ctx, constituents, self.options.explain);
        let coord = if count_total == 0 {
            0.0
        } else {
            count_match as f64 / count_total as f64
        };
        let score = sum * coord;
        rv.score = score;

        if self.options.explain {
            rv.expl = Some(Explanation::with_children(
                score,
                "product of:",
                vec![
                    Explanation::with_children(sum, "sum of:", children),
                    Explanation::new(coord, format!("coord({count_match}/{count_total})")),
                ],
            ));
        }
        rv
    }
}

fn merge_constituents(
    ctx: &mut SearchContext,
    constituents: &mut Vec<DocumentMatch>,
    explain: bool,
) -> (DocumentMatch, f64, Vec<Explanation>) {
    let mut drain = constituents.drain(..);
    let Some(mut rv) = drain.next() else {
        panic!("scoring requires at least one constituent");
    };
    let mut sum = rv.score;
    let mut children = Vec::new();
    if explain {
        if let Some(expl) = rv.expl.take() {
            children.push(expl);
        }
    }

    for mut other in drain {
        sum += other.score;
        if explain {
            if let Some(expl) = other.expl.take() {
                children.push(expl);
            }
        }
        rv.merge_locations_from(&mut other);
        ctx.pool.put(other);
    }

    (rv, sum, children)
}
