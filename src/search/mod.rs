//! Query execution: searcher trees, scoring and hit collection.

pub mod collector;
pub mod context;
pub mod document_match;
pub mod explanation;
pub mod filter;
pub mod pool;
pub mod scorer;
pub mod searcher;

pub use self::collector::{SearchResult, SearchStats, TopNCollector};
pub use self::context::{ScoreMode, SearchContext, SearcherOptions};
pub use self::document_match::{DocumentMatch, FieldTermLocationMap, Location, TermLocationMap};
pub use self::explanation::Explanation;
pub use self::pool::DocumentMatchPool;
pub use self::searcher::{Optimizable, Searcher};
