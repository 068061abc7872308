//! Disjunction over many terms of one field.
//!
//! Used for expansions such as prefix, fuzzy or synonym sets once the
//! candidate terms are known.

use tracing::debug;

use crate::config::SearcherConfig;
use crate::error::{PhalanxError, Result};
use crate::index::reader::IndexReader;
use crate::search::context::SearcherOptions;
use crate::search::searcher::{Searcher, TermSearcher, close_all, new_disjunction_searcher};

/// Build a searcher matching any of `terms` in `field`.
///
/// When `limit` is set and more terms are given than
/// `config.disjunction_max_clause_count` allows, the construction fails with
/// [`PhalanxError::TooManyClauses`] before any reader is opened.
pub fn new_multi_term_searcher(
    index: &dyn IndexReader,
    terms: &[String],
    field: &str,
    boost: f64,
    options: &SearcherOptions,
    config: &SearcherConfig,
    limit: bool,
) -> Result<Box<dyn Searcher>> {
    if limit && config.too_many_clauses(terms.len()) {
        debug!(field, terms = terms.len(), "multi-term expansion over clause limit");
        return Err(PhalanxError::too_many_clauses(
            field,
            terms.len(),
            config.disjunction_max_clause_count,
        ));
    }

    let mut searchers: Vec<Box<dyn Searcher>> = Vec::with_capacity(terms.len());
    for term in terms {
        match TermSearcher::new(index, term, field, boost, options) {
            Ok(searcher) => searchers.push(Box::new(searcher)),
            Err(e) => {
                // Release what was opened so far; the open error wins.
                let _ = close_all(searchers.iter_mut());
                return Err(e);
            }
        }
    }

    new_disjunction_searcher(searchers, 0, options, config)
}
