//! Collector that drives a searcher tree and keeps the best hits.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::Serialize;
use tracing::debug;

use crate::error::{PhalanxError, Result};
use crate::index::reader::IndexReader;
use crate::search::context::SearchContext;
use crate::search::document_match::DocumentMatch;
use crate::search::searcher::Searcher;

/// Hits returned by a [`TopNCollector`].
#[derive(Debug, Default)]
pub struct SearchResult {
    /// Best hits after skipping, best first, with external ids resolved.
    pub hits: Vec<DocumentMatch>,
    /// Number of matches the searcher produced.
    pub total_hits: u64,
    /// Highest score seen, zero when nothing matched.
    pub max_score: f64,
}

/// Summary of a search, without the hits themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStats {
    /// Number of matches the searcher produced.
    pub total_hits: u64,
    /// Highest score seen, zero when nothing matched.
    pub max_score: f64,
    /// Hits actually returned after `skip` and `size` were applied.
    pub returned: usize,
}

impl SearchResult {
    /// Counters describing this result.
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            total_hits: self.total_hits,
            max_score: self.max_score,
            returned: self.hits.len(),
        }
    }
}

/// Heap entry ordering worse hits as greater, so the heap top is the hit to evict.
#[derive(Debug)]
struct Ranked(DocumentMatch);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower scores are worse; on ties the later document is worse.
        other
            .0
            .score
            .partial_cmp(&self.0.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| self.0.index_internal_id.cmp(&other.0.index_internal_id))
    }
}

/// Keeps the `size` best hits after skipping the first `skip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopNCollector {
    size: usize,
    skip: usize,
}

impl TopNCollector {
    /// Create a collector returning `size` hits after skipping `skip`.
    pub fn new(size: usize, skip: usize) -> Self {
        TopNCollector { size, skip }
    }

    /// Number of hits returned.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of best hits skipped.
    pub fn skip(&self) -> usize {
        self.skip
    }

    /// Run `searcher` to exhaustion and gather the best hits.
    ///
    /// The searcher is not closed; that stays with the caller.
    pub fn collect(
        &self,
        searcher: &mut dyn Searcher,
        reader: &dyn IndexReader,
    ) -> Result<SearchResult> {
        let keep = self.size + self.skip;
        let mut ctx = SearchContext::new(keep + searcher.document_match_pool_size());
        let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(keep + 1);
        let mut total_hits = 0u64;
        let mut max_score = 0.0f64;

        while let Some(mut m) = searcher.next(&mut ctx)? {
            m.hit_number = total_hits;
            total_hits += 1;
            if total_hits == 1 || m.score > max_score {
                max_score = m.score;
            }

            let candidate = Ranked(m);
            if heap.len() < keep {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                if let Some(Ranked(evicted)) = heap.pop() {
                    ctx.pool.put(evicted);
                }
                heap.push(candidate);
            } else {
                ctx.pool.put(candidate.0);
            }
        }

        let mut hits = Vec::with_capacity(self.size);
        for (rank, Ranked(mut m)) in heap.into_sorted_vec().into_iter().enumerate() {
            if rank < self.skip {
                ctx.pool.put(m);
                continue;
            }
            m.id = reader.external_id(&m.index_internal_id)?.ok_or_else(|| {
                PhalanxError::index(format!(
                    "no external id for internal id {:?}",
                    m.index_internal_id
                ))
            })?;
            hits.push(m);
        }

        debug!(
            total_hits,
            returned = hits.len(),
            allocated = ctx.pool.allocated(),
            "collected top hits"
        );

        Ok(SearchResult {
            hits,
            total_hits,
            max_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::id::IndexInternalId;
    use crate::index::memory::{MemoryDocument, MemoryIndex};
    use crate::search::context::SearcherOptions;
    use crate::search::searcher::TermSearcher;
    use crate::search::searcher::testing::ListSearcher;

    fn index() -> MemoryIndex {
        let mut index = MemoryIndex::new();
        for (id, tokens) in [
            ("a", vec!["rust", "x", "y", "z"]),
            ("b", vec!["rust", "rust", "rust", "x"]),
            ("c", vec!["go"]),
            ("d", vec!["rust", "rust", "x"]),
            ("e", vec!["rust", "go", "java", "c", "zig", "nim"]),
        ] {
            index
                .add_document(MemoryDocument::new(id).add_tokens("body", &tokens))
                .unwrap();
        }
        index
    }

    #[test]
    fn test_ranked_ordering() {
        let ranked = |id: u64, score: f64| {
            Ranked(DocumentMatch {
                index_internal_id: IndexInternalId::from_u64(id),
                score,
                ..Default::default()
            })
        };
        assert!(ranked(1, 0.5) > ranked(2, 0.9));
        assert!(ranked(3, 0.5) > ranked(1, 0.5));
    }

    #[test]
    fn test_top_hits_by_score() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "rust", "body", 1.0, &SearcherOptions::default()).unwrap();

        let result = TopNCollector::new(2, 0).collect(&mut searcher, &index).unwrap();
        assert_eq!(result.total_hits, 4);
        let ids: Vec<&str> = result.hits.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "d"]);
        assert_eq!(result.max_score, result.hits[0].score);
        assert!(result.hits[0].score >= result.hits[1].score);
    }

    #[test]
    fn test_skip() {
        let index = index();
        let mut searcher =
            TermSearcher::new(&index, "rust", "body", 1.0, &SearcherOptions::default()).unwrap();

        let result = TopNCollector::new(10, 2).collect(&mut searcher, &index).unwrap();
        assert_eq!(result.total_hits, 4);
        let ids: Vec<&str> = result.hits.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
        assert_eq!(result.stats().returned, 2);
    }

    #[test]
    fn test_ties_keep_document_order() {
        let index = index();
        let mut searcher = ListSearcher::new(&[0, 1, 2, 3, 4]);

        let result = TopNCollector::new(3, 0).collect(&mut searcher, &index).unwrap();
        let ids: Vec<&str> = result.hits.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let numbers: Vec<u64> = result.hits.iter().map(|m| m.hit_number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }

    #[test]
    fn test_no_hits() {
        let index = index();
        let mut searcher = ListSearcher::new(&[]);
        let result = TopNCollector::new(5, 0).collect(&mut searcher, &index).unwrap();
        assert!(result.hits.is_empty());
        assert_eq!(result.total_hits, 0);
        assert_eq!(result.max_score, 0.0);
    }

    #[test]
    fn test_unknown_internal_id() {
        let index = index();
        let mut searcher = ListSearcher::new(&[42]);
        assert!(TopNCollector::new(1, 0).collect(&mut searcher, &index).is_err());
    }
}
