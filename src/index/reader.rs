//! Reader interfaces consumed by searchers.
//!
//! Storage formats and posting-list compression live behind these traits.
//! Searchers only need ordered iteration over document ids, per-document
//! frequency/norm data, and optional term vectors.

use std::fmt::Debug;

use crate::error::{PhalanxError, Result};
use crate::index::id::IndexInternalId;
use crate::search::filter::geo::GeoPoint;

/// One occurrence of a term inside a document field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermFieldVector {
    /// Field the occurrence belongs to.
    pub field: String,
    /// Array positions of the field instance, empty for non-array fields.
    pub array_positions: Vec<u64>,
    /// Token position.
    pub pos: u64,
    /// Byte offset of the token start.
    pub start: u64,
    /// Byte offset of the token end.
    pub end: u64,
}

/// Per-document data produced by a [`TermFieldReader`].
///
/// Readers fill a caller-provided instance so allocations can be reused
/// across calls.
#[derive(Debug, Clone, Default)]
pub struct TermFieldDoc {
    /// The term this posting belongs to.
    pub term: String,
    /// The document.
    pub id: IndexInternalId,
    /// Term frequency in the document.
    pub freq: u64,
    /// Field length norm.
    pub norm: f64,
    /// Term vectors, only filled when requested.
    pub vectors: Vec<TermFieldVector>,
}

impl TermFieldDoc {
    /// Clear the document for reuse, keeping allocations.
    pub fn reset(&mut self) -> &mut Self {
        self.term.clear();
        self.id.clear();
        self.freq = 0;
        self.norm = 0.0;
        self.vectors.clear();
        self
    }
}

/// Posting-list reader for one term in one field.
pub trait TermFieldReader: Send + Debug {
    /// Move to the next document, filling `doc`. Returns `false` when exhausted.
    fn next(&mut self, doc: &mut TermFieldDoc) -> Result<bool>;

    /// Move to the first document at or after `id`, never backwards.
    fn advance(&mut self, id: &IndexInternalId, doc: &mut TermFieldDoc) -> Result<bool>;

    /// Upper bound on the number of documents this reader yields.
    fn count(&self) -> u64;

    /// Release the reader.
    fn close(&mut self) -> Result<()>;

    /// Whether [`remaining_ids`](Self::remaining_ids) is supported.
    fn supports_unadorned(&self) -> bool {
        false
    }

    /// Drain every remaining document id without frequency or vector data.
    fn remaining_ids(&mut self) -> Result<Vec<IndexInternalId>> {
        Err(PhalanxError::index(
            "term field reader does not support unadorned iteration",
        ))
    }
}

/// Reader over document ids only.
pub trait DocIdReader: Send + Debug {
    /// Next document id, or `None` when exhausted.
    fn next(&mut self) -> Result<Option<IndexInternalId>>;

    /// First document id at or after `id`, never backwards.
    fn advance(&mut self, id: &IndexInternalId) -> Result<Option<IndexInternalId>>;

    /// Upper bound on the number of ids this reader yields.
    fn count(&self) -> u64;

    /// Release the reader.
    fn close(&mut self) -> Result<()>;
}

/// Document id reader over an in-memory id list.
///
/// The list is sorted and deduplicated on construction.
#[derive(Debug, Clone)]
pub struct SortedDocIdReader {
    ids: Vec<IndexInternalId>,
    cursor: usize,
}

impl SortedDocIdReader {
    /// Create a reader over `ids`.
    pub fn new(mut ids: Vec<IndexInternalId>) -> Self {
        ids.sort();
        ids.dedup();
        SortedDocIdReader { ids, cursor: 0 }
    }
}

impl DocIdReader for SortedDocIdReader {
    fn next(&mut self) -> Result<Option<IndexInternalId>> {
        let id = self.ids.get(self.cursor).cloned();
        if id.is_some() {
            self.cursor += 1;
        }
        Ok(id)
    }

    fn advance(&mut self, id: &IndexInternalId) -> Result<Option<IndexInternalId>> {
        if self.cursor < self.ids.len() {
            self.cursor += self.ids[self.cursor..].partition_point(|candidate| candidate < id);
        }
        self.next()
    }

    fn count(&self) -> u64 {
        self.ids.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.cursor = self.ids.len();
        Ok(())
    }
}

/// Entry point for building leaf readers over one index snapshot.
pub trait IndexReader: Send + Sync + Debug {
    /// Open a posting-list reader for `term` in `field`.
    ///
    /// Unknown terms produce an empty reader rather than an error.
    fn term_field_reader(
        &self,
        term: &str,
        field: &str,
        include_freq: bool,
        include_norm: bool,
        include_term_vectors: bool,
    ) -> Result<Box<dyn TermFieldReader>>;

    /// Reader over every live document.
    fn doc_id_reader_all(&self) -> Result<Box<dyn DocIdReader>>;

    /// Reader over the given external ids that exist in the index.
    fn doc_id_reader_only(&self, ids: &[String]) -> Result<Box<dyn DocIdReader>>;

    /// Number of live documents.
    fn doc_count(&self) -> Result<u64>;

    /// Resolve an internal id to the external document id.
    fn external_id(&self, id: &IndexInternalId) -> Result<Option<String>>;
}

/// Stored per-document values used by exact re-check filters.
pub trait DocValueReader: Send + Sync + Debug {
    /// Geo points stored for `field` in document `id`.
    fn geo_points(&self, field: &str, id: &IndexInternalId) -> Result<Vec<GeoPoint>>;
}
