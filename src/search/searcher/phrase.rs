//! Exact and sloppy phrase matching.
//!
//! A phrase searcher drives a conjunction of per-slot searchers that records
//! term locations, then keeps only documents where the locations line up.
//! Each slot is one term, a set of alternative terms, or a placeholder
//! (empty slot or only empty strings) that occupies one position without
//! consuming a location.

use std::fmt;
use std::mem;

use tracing::trace;

use crate::config::SearcherConfig;
use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::IndexReader;
use crate::search::context::{SearchContext, SearcherOptions};
use crate::search::document_match::{DocumentMatch, Location, TermLocationMap};
use crate::search::searcher::{
    Searcher, TermSearcher, close_all, ensure_open, new_conjunction_searcher,
    new_disjunction_searcher,
};

/// One term occurrence on a phrase path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhrasePart {
    /// The matched term.
    pub term: String,
    /// Where it occurred.
    pub location: Location,
}

impl fmt::Display for PhrasePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}]", self.term, self.location.pos)
    }
}

/// A complete assignment of locations to the non-placeholder slots.
pub type PhrasePath = Vec<PhrasePart>;

type BorrowedPath<'a> = Vec<(&'a str, &'a Location)>;

/// Find every way the phrase `terms` can be laid over `tlm`.
///
/// Consecutive slots must sit at consecutive positions; `slop` is the total
/// positional deviation allowed across the phrase. All locations on a path
/// share the array positions of its first location and no occurrence is
/// used twice.
pub fn find_phrase_paths(terms: &[Vec<String>], tlm: &TermLocationMap, slop: usize) -> Vec<PhrasePath> {
    collect_paths(terms, tlm, slop)
        .into_iter()
        .map(|path| {
            path.into_iter()
                .map(|(term, location)| PhrasePart {
                    term: term.to_string(),
                    location: location.clone(),
                })
                .collect()
        })
        .collect()
}

fn collect_paths<'a>(terms: &[Vec<String>], tlm: &'a TermLocationMap, slop: usize) -> Vec<BorrowedPath<'a>> {
    let mut rv = Vec::new();
    let mut path = Vec::with_capacity(terms.len());
    let budget = i64::try_from(slop).unwrap_or(i64::MAX);
    find_paths(None, terms, tlm, &mut path, budget, &mut rv);
    rv
}

fn is_placeholder(slot: &[String]) -> bool {
    slot.iter().all(String::is_empty)
}

fn find_paths<'a>(
    prev: Option<(u64, &'a [u64])>,
    terms: &[Vec<String>],
    tlm: &'a TermLocationMap,
    path: &mut BorrowedPath<'a>,
    remaining_slop: i64,
    rv: &mut Vec<BorrowedPath<'a>>,
) {
    let Some((slot, rest)) = terms.split_first() else {
        rv.push(path.clone());
        return;
    };

    if is_placeholder(slot) {
        let next = prev.map(|(pos, array_positions)| (pos + 1, array_positions));
        find_paths(next, rest, tlm, path, remaining_slop, rv);
        return;
    }

    for term in slot {
        let Some((term, locations)) = tlm.get_key_value(term.as_str()) else {
            continue;
        };
        for location in locations {
            let dist = match prev {
                Some((pos, array_positions)) => {
                    if location.array_positions != array_positions {
                        continue;
                    }
                    (pos as i64 + 1 - location.pos as i64).abs()
                }
                None => 0,
            };
            if remaining_slop - dist < 0 {
                continue;
            }
            if path
                .iter()
                .any(|(used_term, used)| *used_term == term.as_str() && *used == location)
            {
                continue;
            }

            path.push((term.as_str(), location));
            find_paths(
                Some((location.pos, &location.array_positions)),
                rest,
                tlm,
                path,
                remaining_slop - dist,
                rv,
            );
            path.pop();
        }
    }
}

/// Build a phrase searcher over a flat term list; `""` marks a placeholder.
pub fn new_phrase_searcher(
    index: &dyn IndexReader,
    terms: &[&str],
    field: &str,
    slop: usize,
    boost: f64,
    options: &SearcherOptions,
    config: &SearcherConfig,
) -> Result<Box<dyn Searcher>> {
    let terms = terms.iter().map(|term| vec![term.to_string()]).collect();
    new_multi_phrase_searcher(index, terms, field, slop, boost, options, config)
}

/// Build a phrase searcher where each slot lists alternative terms.
pub fn new_multi_phrase_searcher(
    index: &dyn IndexReader,
    terms: Vec<Vec<String>>,
    field: &str,
    slop: usize,
    boost: f64,
    options: &SearcherOptions,
    config: &SearcherConfig,
) -> Result<Box<dyn Searcher>> {
    Ok(Box::new(PhraseSearcher::new(
        index, terms, field, slop, boost, options, config,
    )?))
}

/// Matches documents containing the phrase.
#[derive(Debug)]
pub struct PhraseSearcher {
    must: Box<dyn Searcher>,
    terms: Vec<Vec<String>>,
    slop: usize,
    closed: bool,
}

impl PhraseSearcher {
    /// Create a phrase searcher over `field`.
    ///
    /// A phrase made only of placeholders matches nothing.
    pub fn new(
        index: &dyn IndexReader,
        terms: Vec<Vec<String>>,
        field: &str,
        slop: usize,
        boost: f64,
        options: &SearcherOptions,
        config: &SearcherConfig,
    ) -> Result<Self> {
        let child_options = SearcherOptions::new()
            .with_score(options.score)
            .with_explain(options.explain)
            .with_term_vectors(true);

        let mut slots: Vec<Box<dyn Searcher>> = Vec::with_capacity(terms.len());
        for slot in &terms {
            match slot_searcher(index, slot, field, boost, &child_options, config) {
                Ok(Some(searcher)) => slots.push(searcher),
                Ok(None) => {}
                Err(e) => {
                    // Release what was opened so far; the open error wins.
                    let _ = close_all(slots.iter_mut());
                    return Err(e);
                }
            }
        }

        let must = new_conjunction_searcher(slots, &child_options)?;
        Ok(PhraseSearcher {
            must,
            terms,
            slop,
            closed: false,
        })
    }

    /// Keep the locations on valid phrase paths, returning whether any exist.
    fn check_match(&self, m: &mut DocumentMatch) -> bool {
        let locations = mem::take(&mut m.locations);
        for (field, tlm) in &locations {
            let paths = collect_paths(&self.terms, tlm, self.slop);
            trace!(field = field.as_str(), paths = paths.len(), id = ?m.index_internal_id, "phrase paths");
            for path in &paths {
                for (term, location) in path {
                    m.add_unique_location(field, term, location);
                }
            }
        }
        !m.locations.is_empty()
    }

    fn first_match(
        &mut self,
        ctx: &mut SearchContext,
        mut candidate: Option<DocumentMatch>,
    ) -> Result<Option<DocumentMatch>> {
        while let Some(mut m) = candidate {
            if self.check_match(&mut m) {
                return Ok(Some(m));
            }
            ctx.pool.put(m);
            candidate = self.must.next(ctx)?;
        }
        Ok(None)
    }
}

fn slot_searcher(
    index: &dyn IndexReader,
    slot: &[String],
    field: &str,
    boost: f64,
    options: &SearcherOptions,
    config: &SearcherConfig,
) -> Result<Option<Box<dyn Searcher>>> {
    let terms: Vec<&String> = slot.iter().filter(|term| !term.is_empty()).collect();
    match terms.as_slice() {
        [] => Ok(None),
        [term] => Ok(Some(Box::new(TermSearcher::new(index, term, field, boost, options)?))),
        _ => {
            let mut alternatives: Vec<Box<dyn Searcher>> = Vec::with_capacity(terms.len());
            for term in terms {
                match TermSearcher::new(index, term, field, boost, options) {
                    Ok(searcher) => alternatives.push(Box::new(searcher)),
                    Err(e) => {
                        // Release what was opened so far; the open error wins.
                        let _ = close_all(alternatives.iter_mut());
                        return Err(e);
                    }
                }
            }
            Ok(Some(new_disjunction_searcher(alternatives, 1, options, config)?))
        }
    }
}

impl Searcher for PhraseSearcher {
    fn next(&mut self, ctx: &mut SearchContext) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        let candidate = self.must.next(ctx)?;
        self.first_match(ctx, candidate)
    }

    fn advance(
        &mut self,
        ctx: &mut SearchContext,
        id: &IndexInternalId,
    ) -> Result<Option<DocumentMatch>> {
        ensure_open(self.closed);
        let candidate = self.must.advance(ctx, id)?;
        self.first_match(ctx, candidate)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.must.close()
    }

    fn release(&mut self, ctx: &mut SearchContext) {
        self.must.release(ctx);
    }

    fn weight(&self) -> f64 {
        self.must.weight()
    }

    fn set_query_norm(&mut self, norm: f64) {
        self.must.set_query_norm(norm);
    }

    fn count(&self) -> u64 {
        self.must.count()
    }

    fn document_match_pool_size(&self) -> usize {
        self.must.document_match_pool_size() + 1
    }
}
