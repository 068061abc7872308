//! Index-side collaborators: identifiers, reader interfaces and an in-memory index.

pub mod id;
pub mod memory;
pub mod reader;

pub use self::id::IndexInternalId;
pub use self::memory::{MemoryDocument, MemoryIndex, MemoryTermFieldReader};
pub use self::reader::{
    DocIdReader, DocValueReader, IndexReader, SortedDocIdReader, TermFieldDoc, TermFieldReader,
    TermFieldVector,
};
