//! Recycling pool for [`DocumentMatch`] instances.
//!
//! A pool is created per query and sized from
//! [`Searcher::document_match_pool_size`](crate::search::searcher::Searcher::document_match_pool_size).
//! Ownership moves in and out by value: a match handed to the caller cannot
//! also be sitting in the pool.

use tracing::trace;

use crate::search::document_match::DocumentMatch;

/// A query-scoped pool of reusable matches.
#[derive(Debug, Default)]
pub struct DocumentMatchPool {
    free: Vec<DocumentMatch>,
    capacity: usize,
    allocated: u64,
    recycled: u64,
    outstanding: usize,
}

impl DocumentMatchPool {
    /// Create a pool with `capacity` pre-allocated matches.
    pub fn new(capacity: usize) -> Self {
        let free = (0..capacity).map(|_| DocumentMatch::default()).collect();
        DocumentMatchPool {
            free,
            capacity,
            allocated: capacity as u64,
            recycled: 0,
            outstanding: 0,
        }
    }

    /// Borrow a cleared match.
    pub fn get(&mut self) -> DocumentMatch {
        self.outstanding += 1;
        match self.free.pop() {
            Some(m) => m,
            None => {
                self.allocated += 1;
                if self.allocated == self.capacity as u64 + 1 {
                    trace!(capacity = self.capacity, "document match pool grew past its pre-sized capacity");
                }
                DocumentMatch::default()
            }
        }
    }

    /// Return a match to the pool.
    ///
    /// # Panics
    ///
    /// Panics when more matches are returned than were handed out.
    pub fn put(&mut self, mut m: DocumentMatch) {
        assert!(
            self.outstanding > 0,
            "document match returned to a pool that has none outstanding"
        );
        self.outstanding -= 1;
        self.recycled += 1;
        m.reset();
        self.free.push(m);
    }

    /// Number of matches handed out and not yet returned.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Total number of matches this pool ever created.
    pub fn allocated(&self) -> u64 {
        self.allocated
    }

    /// Number of returns accepted so far.
    pub fn recycled(&self) -> u64 {
        self.recycled
    }

    /// Matches currently available without allocating.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Pre-sized capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::id::IndexInternalId;

    #[test]
    fn test_get_put_accounting() {
        let mut pool = DocumentMatchPool::new(2);
        assert_eq!(pool.available(), 2);

        let mut a = pool.get();
        let b = pool.get();
        let c = pool.get();
        assert_eq!(pool.outstanding(), 3);
        assert_eq!(pool.allocated(), 3);

        a.index_internal_id = IndexInternalId::from_u64(9);
        a.score = 1.0;
        pool.put(a);
        pool.put(b);
        pool.put(c);
        assert_eq!(pool.outstanding(), 0);
        assert_eq!(pool.recycled(), 3);

        let reused = pool.get();
        assert!(reused.index_internal_id.is_empty());
        assert_eq!(reused.score, 0.0);
    }

    #[test]
    #[should_panic(expected = "none outstanding")]
    fn test_over_release_panics() {
        let mut pool = DocumentMatchPool::new(1);
        pool.put(DocumentMatch::default());
    }
}
