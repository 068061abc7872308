//! TF-IDF style scorer for a single term.

use crate::index::reader::TermFieldDoc;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::{DocumentMatch, Location};
use crate::search::explanation::Explanation;
use crate::search::scorer::TermScorer;

/// Scores term matches as `sqrt(freq) * norm * idf * query_weight`.
#[derive(Debug, Clone)]
pub struct TermQueryScorer {
    /// Term being scored.
    query_term: String,
    /// Field the term belongs to.
    query_field: String,
    /// Boost applied to this clause.
    query_boost: f64,
    /// Number of documents containing the term.
    doc_term: u64,
    /// Number of documents in the index.
    doc_total: u64,
    idf: f64,
    options: SearcherOptions,
    query_norm: f64,
    query_weight: f64,
    idf_explanation: Option<Explanation>,
    query_weight_explanation: Option<Explanation>,
}

impl TermQueryScorer {
    /// Create a scorer for `term` in `field`.
    pub fn new(
        term: &str,
        field: &str,
        boost: f64,
        doc_total: u64,
        doc_term: u64,
        options: SearcherOptions,
    ) -> Self {
        let idf = 1.0 + (doc_total as f64 / (doc_term as f64 + 1.0)).ln();
        let idf_explanation = options.explain.then(|| {
            Explanation::new(
                idf,
                format!("idf(docFreq={doc_term}, maxDocs={doc_total})"),
            )
        });

        TermQueryScorer {
            query_term: term.to_string(),
            query_field: field.to_string(),
            query_boost: boost,
            doc_term,
            doc_total,
            idf,
            options,
            query_norm: 1.0,
            query_weight: 1.0,
            idf_explanation,
            query_weight_explanation: None,
        }
    }

    /// Inverse document frequency of the term.
    pub fn idf(&self) -> f64 {
        self.idf
    }

    /// Current query weight (boost * idf * query norm once normalized).
    pub fn query_weight(&self) -> f64 {
        self.query_weight
    }

    /// Number of documents containing the term.
    pub fn doc_term(&self) -> u64 {
        self.doc_term
    }

    /// Number of documents in the index when the scorer was built.
    pub fn doc_total(&self) -> u64 {
        self.doc_total
    }

    fn explain_score(&self, doc: &TermFieldDoc, tf: f64, field_weight: f64, score: f64) -> Explanation {
        let term_desc = format!("{}:{}", self.query_field, self.query_term);
        let mut children = vec![
            Explanation::new(tf, format!("tf(termFreq({term_desc})={})", doc.freq)),
            Explanation::new(doc.norm, format!("fieldNorm(field={}, doc={:?})", self.query_field, doc.id)),
        ];
        if let Some(idf) = &self.idf_explanation {
            children.push(idf.clone());
        }
        let field_expl = Explanation::with_children(
            field_weight,
            format!("fieldWeight({term_desc} in {:?}), product of:", doc.id),
            children,
        );

        match &self.query_weight_explanation {
            Some(query_expl) if self.query_weight != 1.0 => Explanation::with_children(
                score,
                format!("weight({term_desc}^{} in {:?}), product of:", self.query_boost, doc.id),
                vec![query_expl.clone(), field_expl],
            ),
            _ => field_expl,
        }
    }
}

impl TermScorer for TermQueryScorer {
    fn weight(&self) -> f64 {
        let sum = self.query_boost * self.idf;
        sum * sum
    }

    fn set_query_norm(&mut self, norm: f64) {
        self.query_norm = norm;
        self.query_weight = self.query_boost * self.idf * self.query_norm;

        if self.options.explain {
            let mut children = vec![Explanation::new(self.query_boost, "boost")];
            if let Some(idf) = &self.idf_explanation {
                children.push(idf.clone());
            }
            children.push(Explanation::new(self.query_norm, "queryNorm"));
            self.query_weight_explanation = Some(Explanation::with_children(
                self.query_weight,
                format!(
                    "queryWeight({}:{}^{}), product of:",
                    self.query_field, self.query_term, self.query_boost
                ),
                children,
            ));
        }
    }

    fn score(&self, ctx: &mut SearchContext, doc: &TermFieldDoc) -> DocumentMatch {
        let mut rv = ctx.pool.get();
        rv.index_internal_id.set_from(&doc.id);

        if self.options.scoring() {
            let tf = (doc.freq as f64).sqrt();
            let field_weight = tf * doc.norm * self.idf;
            let score = if self.query_weight != 1.0 {
                field_weight * self.query_weight
            } else {
                field_weight
            };
            rv.score = score;
            if self.options.explain {
                rv.expl = Some(self.explain_score(doc, tf, field_weight, score));
            }
        }

        for vector in &doc.vectors {
            rv.add_location(
                &vector.field,
                &doc.term,
                Location {
                    pos: vector.pos,
                    start: vector.start,
                    end: vector.end,
                    array_positions: vector.array_positions.clone(),
                },
            );
        }

        rv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::id::IndexInternalId;
    use crate::index::reader::TermFieldVector;
    use crate::search::context::ScoreMode;

    fn term_doc(freq: u64) -> TermFieldDoc {
        TermFieldDoc {
            term: "fox".to_string(),
            id: IndexInternalId::from_u64(1),
            freq,
            norm: 1.0,
            vectors: vec![TermFieldVector {
                field: "body".to_string(),
                pos: 2,
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_higher_frequency_scores_higher() {
        let scorer = TermQueryScorer::new("fox", "body", 1.0, 100, 10, SearcherOptions::default());
        let mut ctx = SearchContext::new(2);

        let one = scorer.score(&mut ctx, &term_doc(1));
        let four = scorer.score(&mut ctx, &term_doc(4));
        assert!(four.score > one.score);
        assert_eq!(four.score, 2.0 * one.score);
    }

    #[test]
    fn test_rare_terms_have_higher_idf() {
        let rare = TermQueryScorer::new("fox", "body", 1.0, 100, 1, SearcherOptions::default());
        let common = TermQueryScorer::new("the", "body", 1.0, 100, 90, SearcherOptions::default());
        assert!(rare.idf() > common.idf());
        assert!(rare.weight() > common.weight());
    }

    #[test]
    fn test_query_norm_scales_score() {
        let mut scorer = TermQueryScorer::new("fox", "body", 2.0, 100, 10, SearcherOptions::default());
        let mut ctx = SearchContext::new(2);
        let before = scorer.score(&mut ctx, &term_doc(1)).score;

        scorer.set_query_norm(0.5);
        let after = scorer.score(&mut ctx, &term_doc(1)).score;
        assert!((after - before * scorer.query_weight()).abs() < 1e-12);
    }

    #[test]
    fn test_score_none_mode_skips_scoring_but_keeps_locations() {
        let options = SearcherOptions::default().with_score(ScoreMode::None);
        let scorer = TermQueryScorer::new("fox", "body", 1.0, 100, 10, options);
        let mut ctx = SearchContext::new(1);

        let m = scorer.score(&mut ctx, &term_doc(3));
        assert_eq!(m.score, 0.0);
        assert_eq!(m.locations["body"]["fox"][0].pos, 2);
    }

    #[test]
    fn test_explanation_attached() {
        let options = SearcherOptions::default().with_explain(true);
        let mut scorer = TermQueryScorer::new("fox", "body", 1.0, 100, 10, options);
        scorer.set_query_norm(0.25);
        let mut ctx = SearchContext::new(1);

        let m = scorer.score(&mut ctx, &term_doc(1));
        let expl = m.expl.expect("explanation requested");
        assert!((expl.value - m.score).abs() < 1e-12);
        assert_eq!(expl.children.len(), 2);
    }
}
