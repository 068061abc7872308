//! Document match records produced by searchers.

use ahash::AHashMap;

use crate::index::id::IndexInternalId;
use crate::search::explanation::Explanation;

/// One recorded occurrence of a term in a matched document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Token position.
    pub pos: u64,
    /// Byte offset of the token start.
    pub start: u64,
    /// Byte offset of the token end.
    pub end: u64,
    /// Array positions of the field instance, empty for non-array fields.
    pub array_positions: Vec<u64>,
}

/// Term to ordered occurrences, for one field.
pub type TermLocationMap = AHashMap<String, Vec<Location>>;

/// Field to [`TermLocationMap`].
pub type FieldTermLocationMap = AHashMap<String, TermLocationMap>;

/// A scored match for one document.
///
/// Instances are recycled through a
/// [`DocumentMatchPool`](crate::search::pool::DocumentMatchPool). A match is
/// owned by exactly one holder at a time: the searcher that produced it, the
/// combinator that forwards it, the caller, or the pool.
#[derive(Debug, Clone, Default)]
pub struct DocumentMatch {
    /// External document id, filled by the collector.
    pub id: String,
    /// Internal id used for merging.
    pub index_internal_id: IndexInternalId,
    /// Relevance score.
    pub score: f64,
    /// Score explanation, only when requested.
    pub expl: Option<Explanation>,
    /// Matched term locations, only when term vectors are requested.
    pub locations: FieldTermLocationMap,
    /// Order in which the collector saw this match.
    pub hit_number: u64,
}

impl DocumentMatch {
    /// Clear the match for reuse, keeping the id buffer.
    pub fn reset(&mut self) {
        self.id.clear();
        self.index_internal_id.clear();
        self.score = 0.0;
        self.expl = None;
        self.locations.clear();
        self.hit_number = 0;
    }

    /// Record an occurrence of `term` in `field`.
    pub fn add_location(&mut self, field: &str, term: &str, location: Location) {
        self.locations
            .entry(field.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default()
            .push(location);
    }

    /// Record an occurrence unless the same one is already present.
    pub fn add_unique_location(&mut self, field: &str, term: &str, location: &Location) {
        let locations = self
            .locations
            .entry(field.to_string())
            .or_default()
            .entry(term.to_string())
            .or_default();
        if !locations.contains(location) {
            locations.push(location.clone());
        }
    }

    /// Move every location recorded on `other` into this match.
    pub fn merge_locations_from(&mut self, other: &mut DocumentMatch) {
        for (field, terms) in other.locations.drain() {
            let target = self.locations.entry(field).or_default();
            for (term, mut locations) in terms {
                target.entry(term).or_default().append(&mut locations);
            }
        }
    }

    /// Total number of recorded locations.
    pub fn location_count(&self) -> usize {
        self.locations
            .values()
            .flat_map(|terms| terms.values())
            .map(Vec::len)
            .sum()
    }
}
