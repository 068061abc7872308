//! Helpers shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use phalanx::error::{PhalanxError, Result};
use phalanx::index::{IndexInternalId, MemoryDocument, MemoryIndex};
use phalanx::search::{DocumentMatch, SearchContext, Searcher};

/// Searcher over a fixed sorted id list with a fixed score per match.
#[derive(Debug)]
pub struct VecSearcher {
    ids: Vec<u64>,
    cursor: usize,
    score: f64,
    pub fail_at: Option<u64>,
    pub fail_close: bool,
    pub closes: usize,
}

impl VecSearcher {
    pub fn new(ids: &[u64]) -> Self {
        Self::scored(ids, 1.0)
    }

    pub fn scored(ids: &[u64], score: f64) -> Self {
        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        VecSearcher {
            ids,
            cursor: 0,
            score,
            fail_at: None,
            fail_close: false,
            closes: 0,
        }
    }

    pub fn boxed(ids: &[u64]) -> Box<dyn Searcher> {
        Box::new(Self::new(ids))
    }

    fn emit(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        let Some(&id) = self.ids.get(self.cursor) else {
            return Ok(None);
        };
        if self.fail_at == Some(id) {
            return Err(PhalanxError::index(format!("posting read failed at {id}")));
        }
        self.cursor += 1;
        let mut m = ctx.pool.get();
        m.index_internal_id = IndexInternalId::from_u64(id);
        m.score = self.score;
        Ok(Some(m))
    }
}

impl Searcher for VecSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        self.emit(ctx)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        let target = id.to_u64().unwrap_or(0);
        while self.ids.get(self.cursor).is_some_and(|&candidate| candidate < target) {
            self.cursor += 1;
        }
        self.emit(ctx)
    }

    fn close(&mut self) -> Result<()> {
        self.closes += 1;
        if self.fail_close {
            return Err(PhalanxError::index("close failed"));
        }
        Ok(())
    }

    fn weight(&self) -> f64 {
        self.score * self.score
    }

    fn set_query_norm(&mut self, _norm: f64) {}

    fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    fn document_match_pool_size(&self) -> usize {
        1
    }
}

/// Boxed [`VecSearcher`]s, one per list.
pub fn searchers(lists: &[Vec<u64>]) -> Vec<Box<dyn Searcher>> {
    lists.iter().map(|ids| VecSearcher::boxed(ids)).collect()
}

/// Pull every match, returning `(id, score)` pairs and recycling the matches.
pub fn collect_scored(searcher: &mut dyn Searcher, ctx: &mut SearchContext) -> Vec<(u64, f64)> {
    let mut out = Vec::new();
    while let Some(m) = searcher.next(ctx).unwrap() {
        out.push((m.index_internal_id.to_u64().unwrap(), m.score));
        ctx.pool.put(m);
    }
    out
}

/// Pull every match id, recycling the matches.
pub fn collect_ids(searcher: &mut dyn Searcher, ctx: &mut SearchContext) -> Vec<u64> {
    collect_scored(searcher, ctx)
        .into_iter()
        .map(|(id, _)| id)
        .collect()
}

/// Naive intersection of sorted lists.
pub fn intersection(lists: &[Vec<u64>]) -> Vec<u64> {
    let Some((first, rest)) = lists.split_first() else {
        return Vec::new();
    };
    first
        .iter()
        .copied()
        .filter(|id| rest.iter().all(|list| list.contains(id)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Ids contained in at least `max(min, 1)` lists.
pub fn at_least(lists: &[Vec<u64>], min: usize) -> Vec<u64> {
    let all: BTreeSet<u64> = lists.iter().flatten().copied().collect();
    all.into_iter()
        .filter(|id| lists.iter().filter(|list| list.contains(id)).count() >= min.max(1))
        .collect()
}

/// Index whose document `i` holds the terms listed in `docs[i]`, in field `body`.
pub fn index_from_terms(docs: &[Vec<&str>]) -> MemoryIndex {
    let mut index = MemoryIndex::new();
    for (i, terms) in docs.iter().enumerate() {
        index
            .add_document(MemoryDocument::new(format!("doc{i}")).add_tokens("body", terms))
            .unwrap();
    }
    index
}
