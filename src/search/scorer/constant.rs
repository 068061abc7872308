//! Constant scorer for match-all and id-list searchers.

use crate::index::id::IndexInternalId;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::DocumentMatch;
use crate::search::explanation::Explanation;

/// A scorer that gives every document the same score.
#[derive(Debug, Clone)]
pub struct ConstantScorer {
    constant: f64,
    boost: f64,
    options: SearcherOptions,
    query_norm: f64,
    query_weight: f64,
    query_weight_explanation: Option<Explanation>,
}

impl ConstantScorer {
    /// Create a new constant scorer.
    pub fn new(constant: f64, boost: f64, options: SearcherOptions) -> Self {
        ConstantScorer {
            constant,
            boost,
            options,
            query_norm: 1.0,
            query_weight: 1.0,
            query_weight_explanation: None,
        }
    }

    /// Sum of squared weights contributed to query normalization.
    pub fn weight(&self) -> f64 {
        self.boost * self.boost
    }

    /// Apply the query norm.
    pub fn set_query_norm(&mut self, norm: f64) {
        self.query_norm = norm;
        self.query_weight = self.boost * self.query_norm;

        if self.options.explain {
            self.query_weight_explanation = Some(Explanation::with_children(
                self.query_weight,
                "ConstantScore()^boost, product of:",
                vec![
                    Explanation::new(self.boost, "boost"),
                    Explanation::new(self.query_norm, "queryNorm"),
                ],
            ));
        }
    }

    /// Build a match for `id`.
    pub fn score(&self, ctx: &mut SearchContext, id: &IndexInternalId) -> DocumentMatch {
        let mut rv = ctx.pool.get();
        rv.index_internal_id.set_from(id);

        if self.options.scoring() {
            let mut score = self.constant;
            if self.query_weight != 1.0 {
                score *= self.query_weight;
            }
            rv.score = score;

            if self.options.explain {
                let base = Explanation::new(self.constant, format!("ConstantScore({id:?})"));
                rv.expl = Some(match &self.query_weight_explanation {
                    Some(query_expl) if self.query_weight != 1.0 => Explanation::with_children(
                        score,
                        format!("weight(^{}), product of:", self.boost),
                        vec![query_expl.clone(), base],
                    ),
                    _ => base,
                });
            }
        }

        rv
    }
}
