//! In-memory index over pre-analyzed tokens.
//!
//! Analysis is out of scope for this crate, so documents are supplied as
//! field tokens with explicit or implicit positions. The index is intended
//! for tests, benchmarks and embedders that already hold analyzed text.

use std::sync::Arc;

use ahash::AHashMap;

use crate::error::{PhalanxError, Result};
use crate::index::id::IndexInternalId;
use crate::index::reader::{
    DocIdReader, DocValueReader, IndexReader, SortedDocIdReader, TermFieldDoc, TermFieldReader,
    TermFieldVector,
};
use crate::search::filter::geo::GeoPoint;

/// A single token occurrence supplied to [`MemoryDocument`].
#[derive(Debug, Clone)]
struct TokenOccurrence {
    field: String,
    term: String,
    array_positions: Vec<u64>,
    pos: u64,
    start: u64,
    end: u64,
}

/// Builder for a document added to a [`MemoryIndex`].
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    id: String,
    tokens: Vec<TokenOccurrence>,
    geo_points: Vec<(String, GeoPoint)>,
}

impl MemoryDocument {
    /// Start a document with the given external id.
    pub fn new<S: Into<String>>(id: S) -> Self {
        MemoryDocument {
            id: id.into(),
            tokens: Vec::new(),
            geo_points: Vec::new(),
        }
    }

    /// Add tokens at consecutive positions starting from 0.
    pub fn add_tokens(self, field: &str, terms: &[&str]) -> Self {
        self.add_array_tokens(field, &[], terms)
    }

    /// Add tokens for one instance of an array field.
    pub fn add_array_tokens(self, field: &str, array_positions: &[u64], terms: &[&str]) -> Self {
        let positioned: Vec<(&str, u64)> = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (*term, i as u64))
            .collect();
        self.add_positioned_tokens(field, array_positions, &positioned)
    }

    /// Add tokens with explicit positions.
    pub fn add_positioned_tokens(
        mut self,
        field: &str,
        array_positions: &[u64],
        terms: &[(&str, u64)],
    ) -> Self {
        let mut offset = 0u64;
        for (term, pos) in terms {
            let start = offset;
            let end = start + term.len() as u64;
            offset = end + 1;
            self.tokens.push(TokenOccurrence {
                field: field.to_string(),
                term: term.to_string(),
                array_positions: array_positions.to_vec(),
                pos: *pos,
                start,
                end,
            });
        }
        self
    }

    /// Attach a geo point to `field`.
    pub fn add_geo_point(mut self, field: &str, point: GeoPoint) -> Self {
        self.geo_points.push((field.to_string(), point));
        self
    }
}

/// Posting entry for one document.
#[derive(Debug, Clone)]
struct MemoryPosting {
    id: IndexInternalId,
    freq: u64,
    norm: f64,
    vectors: Vec<TermFieldVector>,
}

/// An in-memory inverted index.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    external_ids: Vec<String>,
    internal_ids: AHashMap<String, u64>,
    postings: AHashMap<String, AHashMap<String, Arc<Vec<MemoryPosting>>>>,
    geo_points: AHashMap<String, AHashMap<u64, Vec<GeoPoint>>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, returning its internal id.
    pub fn add_document(&mut self, doc: MemoryDocument) -> Result<IndexInternalId> {
        if self.internal_ids.contains_key(&doc.id) {
            return Err(PhalanxError::index(format!(
                "document '{}' already exists",
                doc.id
            )));
        }

        let number = self.external_ids.len() as u64;
        let id = IndexInternalId::from_u64(number);

        let mut field_lengths: AHashMap<&str, u64> = AHashMap::new();
        for token in &doc.tokens {
            *field_lengths.entry(token.field.as_str()).or_insert(0) += 1;
        }

        let mut grouped: AHashMap<(&str, &str), Vec<TermFieldVector>> = AHashMap::new();
        for token in &doc.tokens {
            grouped
                .entry((token.field.as_str(), token.term.as_str()))
                .or_default()
                .push(TermFieldVector {
                    field: token.field.clone(),
                    array_positions: token.array_positions.clone(),
                    pos: token.pos,
                    start: token.start,
                    end: token.end,
                });
        }

        for ((field, term), mut vectors) in grouped {
            vectors.sort_by(|a, b| {
                a.array_positions
                    .cmp(&b.array_positions)
                    .then(a.pos.cmp(&b.pos))
            });
            let length = field_lengths.get(field).copied().unwrap_or(1).max(1);
            let posting = MemoryPosting {
                id: id.clone(),
                freq: vectors.len() as u64,
                norm: 1.0 / (length as f64).sqrt(),
                vectors,
            };
            let list = self
                .postings
                .entry(field.to_string())
                .or_default()
                .entry(term.to_string())
                .or_default();
            Arc::make_mut(list).push(posting);
        }

        for (field, point) in doc.geo_points {
            self.geo_points
                .entry(field)
                .or_default()
                .entry(number)
                .or_default()
                .push(point);
        }

        self.internal_ids.insert(doc.id.clone(), number);
        self.external_ids.push(doc.id);
        Ok(id)
    }

    /// Number of documents containing `term` in `field`.
    pub fn doc_freq(&self, field: &str, term: &str) -> u64 {
        self.postings
            .get(field)
            .and_then(|terms| terms.get(term))
            .map(|list| list.len() as u64)
            .unwrap_or(0)
    }

    /// Terms indexed for `field`, sorted.
    pub fn terms(&self, field: &str) -> Vec<String> {
        let mut terms: Vec<String> = self
            .postings
            .get(field)
            .map(|terms| terms.keys().cloned().collect())
            .unwrap_or_default();
        terms.sort();
        terms
    }
}

impl IndexReader for MemoryIndex {
    fn term_field_reader(
        &self,
        term: &str,
        field: &str,
        include_freq: bool,
        include_norm: bool,
        include_term_vectors: bool,
    ) -> Result<Box<dyn TermFieldReader>> {
        let postings = self
            .postings
            .get(field)
            .and_then(|terms| terms.get(term))
            .cloned()
            .unwrap_or_default();

        Ok(Box::new(MemoryTermFieldReader {
            term: term.to_string(),
            postings,
            cursor: 0,
            include_freq,
            include_norm,
            include_term_vectors,
        }))
    }

    fn doc_id_reader_all(&self) -> Result<Box<dyn DocIdReader>> {
        let ids = (0..self.external_ids.len() as u64)
            .map(IndexInternalId::from_u64)
            .collect();
        Ok(Box::new(SortedDocIdReader::new(ids)))
    }

    fn doc_id_reader_only(&self, ids: &[String]) -> Result<Box<dyn DocIdReader>> {
        let ids = ids
            .iter()
            .filter_map(|external| self.internal_ids.get(external))
            .map(|number| IndexInternalId::from_u64(*number))
            .collect();
        Ok(Box::new(SortedDocIdReader::new(ids)))
    }

    fn doc_count(&self) -> Result<u64> {
        Ok(self.external_ids.len() as u64)
    }

    fn external_id(&self, id: &IndexInternalId) -> Result<Option<String>> {
        Ok(id
            .to_u64()
            .and_then(|number| self.external_ids.get(number as usize))
            .cloned())
    }
}

impl DocValueReader for MemoryIndex {
    fn geo_points(&self, field: &str, id: &IndexInternalId) -> Result<Vec<GeoPoint>> {
        let number = id
            .to_u64()
            .ok_or_else(|| PhalanxError::index(format!("malformed internal id {id:?}")))?;
        Ok(self
            .geo_points
            .get(field)
            .and_then(|docs| docs.get(&number))
            .cloned()
            .unwrap_or_default())
    }
}

/// Posting-list reader over a [`MemoryIndex`] term.
#[derive(Debug)]
pub struct MemoryTermFieldReader {
    term: String,
    postings: Arc<Vec<MemoryPosting>>,
    cursor: usize,
    include_freq: bool,
    include_norm: bool,
    include_term_vectors: bool,
}

impl MemoryTermFieldReader {
    fn fill(&self, posting: &MemoryPosting, doc: &mut TermFieldDoc) {
        doc.reset();
        doc.term.push_str(&self.term);
        doc.id.set_from(&posting.id);
        if self.include_freq {
            doc.freq = posting.freq;
        }
        if self.include_norm {
            doc.norm = posting.norm;
        }
        if self.include_term_vectors {
            doc.vectors.extend(posting.vectors.iter().cloned());
        }
    }
}

impl TermFieldReader for MemoryTermFieldReader {
    fn next(&mut self, doc: &mut TermFieldDoc) -> Result<bool> {
        match self.postings.get(self.cursor) {
            Some(posting) => {
                self.fill(posting, doc);
                self.cursor += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn advance(&mut self, id: &IndexInternalId, doc: &mut TermFieldDoc) -> Result<bool> {
        if self.cursor < self.postings.len() {
            let skip = self.postings[self.cursor..].partition_point(|posting| posting.id < *id);
            self.cursor += skip;
        }
        self.next(doc)
    }

    fn count(&self) -> u64 {
        self.postings.len() as u64
    }

    fn close(&mut self) -> Result<()> {
        self.cursor = self.postings.len();
        Ok(())
    }

    fn supports_unadorned(&self) -> bool {
        true
    }

    fn remaining_ids(&mut self) -> Result<Vec<IndexInternalId>> {
        let ids = self.postings[self.cursor.min(self.postings.len())..]
            .iter()
            .map(|posting| posting.id.clone())
            .collect();
        self.cursor = self.postings.len();
        Ok(ids)
    }
}
