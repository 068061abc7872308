//! Exact-match predicates for refining approximate candidate sets.
//!
//! Each constructor returns a [`FilterFunc`] meant to be wrapped around a
//! cheap candidate searcher with
//! [`FilteringSearcher`](crate::search::searcher::FilteringSearcher).

pub mod geo;

pub use self::geo::{
    GeoBoundingBox, GeoPoint, GeoPolygon, geo_bounding_box_filter, geo_distance_filter,
    geo_polygon_filter,
};

pub use crate::search::searcher::FilterFunc;
