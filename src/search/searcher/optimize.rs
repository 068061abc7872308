//! Id-only fast paths for composite searchers.
//!
//! When scores and locations are not needed, a conjunction or disjunction
//! whose children can all hand over their raw ids is replaced by a plain
//! id list searcher over the intersection or union.

use std::cmp::Ordering;

use tracing::debug;

use crate::error::Result;
use crate::index::id::IndexInternalId;
use crate::index::reader::SortedDocIdReader;
use crate::search::context::SearcherOptions;
use crate::search::searcher::{DocIdSearcher, Searcher, close_all};

/// Set operation applied to the children's id lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnadornedMerge {
    /// Ids present in every child.
    Intersection,
    /// Ids present in any child. The replacement keeps reporting `min`
    /// so enclosing searchers still treat the clause as required.
    Union { min: usize },
}

/// Try to replace `searchers` by a single id list searcher.
///
/// Returns `Ok(None)` without touching the children when any of them lacks
/// the capability. On success the children are closed.
pub fn optimize_unadorned(
    searchers: &mut [Box<dyn Searcher>],
    merge: UnadornedMerge,
    options: &SearcherOptions,
) -> Result<Option<Box<dyn Searcher>>> {
    let capable = searchers.iter_mut().all(|searcher| {
        searcher
            .as_optimizable()
            .is_some_and(|optimizable| optimizable.can_unadorn())
    });
    if !capable {
        return Ok(None);
    }

    let mut lists = Vec::with_capacity(searchers.len());
    for searcher in searchers.iter_mut() {
        if let Some(optimizable) = searcher.as_optimizable() {
            lists.push(optimizable.unadorned_ids()?);
        }
    }
    close_all(searchers.iter_mut())?;

    let (ids, min) = match merge {
        UnadornedMerge::Intersection => (intersect(lists), 0),
        UnadornedMerge::Union { min } => (lists.into_iter().flatten().collect(), min),
    };
    debug!(
        children = searchers.len(),
        ?merge,
        ids = ids.len(),
        "replaced composite searcher by unadorned id list"
    );

    let reader = SortedDocIdReader::new(ids);
    Ok(Some(Box::new(
        DocIdSearcher::from_reader(Box::new(reader), 1.0, options).with_min(min),
    )))
}

fn intersect(mut lists: Vec<Vec<IndexInternalId>>) -> Vec<IndexInternalId> {
    lists.sort_by_key(Vec::len);
    let mut iter = lists.into_iter();
    let Some(mut acc) = iter.next() else {
        return Vec::new();
    };
    for list in iter {
        let mut kept = Vec::with_capacity(acc.len().min(list.len()));
        let (mut i, mut j) = (0, 0);
        while i < acc.len() && j < list.len() {
            match acc[i].cmp(&list[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    kept.push(acc[i].clone());
                    i += 1;
                    j += 1;
                }
            }
        }
        acc = kept;
    }
    acc
}
