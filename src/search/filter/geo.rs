//! Geographic points, shapes and the predicates built on them.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PhalanxError, Result};
use crate::index::reader::DocValueReader;
use crate::search::document_match::DocumentMatch;
use crate::search::searcher::FilterFunc;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographical point with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPointFields")]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    pub lat: f64,
    /// Longitude in degrees (-180 to 180)
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographical point.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(PhalanxError::query(format!(
                "Invalid latitude: {lat} (must be between -90 and 90)"
            )));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(PhalanxError::query(format!(
                "Invalid longitude: {lon} (must be between -180 and 180)"
            )));
        }

        Ok(GeoPoint { lat, lon })
    }

    /// Haversine distance to another point in kilometers.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lon = (other.lon - self.lon).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

/// A latitude/longitude rectangle.
///
/// A box whose left edge lies east of its right edge wraps across the
/// antimeridian.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoBoundingBoxFields")]
pub struct GeoBoundingBox {
    /// North-west corner.
    pub top_left: GeoPoint,
    /// South-east corner.
    pub bottom_right: GeoPoint,
}

impl GeoBoundingBox {
    /// Create a new bounding box.
    pub fn new(top_left: GeoPoint, bottom_right: GeoPoint) -> Result<Self> {
        if top_left.lat < bottom_right.lat {
            return Err(PhalanxError::query(
                "Top-left latitude must be greater than bottom-right latitude",
            ));
        }

        Ok(GeoBoundingBox {
            top_left,
            bottom_right,
        })
    }

    /// Whether the box crosses the antimeridian.
    pub fn crosses_dateline(&self) -> bool {
        self.top_left.lon > self.bottom_right.lon
    }

    /// Check if a point is within this bounding box, edges included.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        if point.lat > self.top_left.lat || point.lat < self.bottom_right.lat {
            return false;
        }
        if self.crosses_dateline() {
            point.lon >= self.top_left.lon || point.lon <= self.bottom_right.lon
        } else {
            point.lon >= self.top_left.lon && point.lon <= self.bottom_right.lon
        }
    }
}

/// A closed polygon in the latitude/longitude plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GeoPolygonFields")]
pub struct GeoPolygon {
    vertices: Vec<GeoPoint>,
}

impl GeoPolygon {
    /// Create a polygon from its vertices; the last edge closes back to the first.
    pub fn new(vertices: Vec<GeoPoint>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhalanxError::query(format!(
                "A polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        Ok(GeoPolygon { vertices })
    }

    /// The polygon's vertices.
    pub fn vertices(&self) -> &[GeoPoint] {
        &self.vertices
    }

    /// Ray-casting point-in-polygon test.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let mut inside = false;
        let mut j = self.vertices.len() - 1;
        for (i, vi) in self.vertices.iter().enumerate() {
            let vj = &self.vertices[j];
            if (vi.lat > point.lat) != (vj.lat > point.lat) {
                let crossing_lon =
                    vi.lon + (point.lat - vi.lat) * (vj.lon - vi.lon) / (vj.lat - vi.lat);
                if point.lon < crossing_lon {
                    inside = !inside;
                }
            }
            j = i;
        }
        inside
    }
}

// Deserialized shapes go through the validating constructors.

#[derive(Deserialize)]
struct GeoPointFields {
    lat: f64,
    lon: f64,
}

impl TryFrom<GeoPointFields> for GeoPoint {
    type Error = PhalanxError;

    fn try_from(fields: GeoPointFields) -> Result<Self> {
        GeoPoint::new(fields.lat, fields.lon)
    }
}

#[derive(Deserialize)]
struct GeoBoundingBoxFields {
    top_left: GeoPoint,
    bottom_right: GeoPoint,
}

impl TryFrom<GeoBoundingBoxFields> for GeoBoundingBox {
    type Error = PhalanxError;

    fn try_from(fields: GeoBoundingBoxFields) -> Result<Self> {
        GeoBoundingBox::new(fields.top_left, fields.bottom_right)
    }
}

#[derive(Deserialize)]
struct GeoPolygonFields {
    vertices: Vec<GeoPoint>,
}

impl TryFrom<GeoPolygonFields> for GeoPolygon {
    type Error = PhalanxError;

    fn try_from(fields: GeoPolygonFields) -> Result<Self> {
        GeoPolygon::new(fields.vertices)
    }
}

fn any_point<F>(doc_values: Arc<dyn DocValueReader>, field: String, mut accept: F) -> FilterFunc
where
    F: FnMut(&GeoPoint) -> bool + Send + 'static,
{
    Box::new(move |m: &DocumentMatch| -> Result<bool> {
        let points = doc_values.geo_points(&field, &m.index_internal_id)?;
        Ok(points.iter().any(&mut accept))
    })
}

/// Accept documents with at least one point of `field` inside `bbox`.
pub fn geo_bounding_box_filter<S: Into<String>>(
    doc_values: Arc<dyn DocValueReader>,
    field: S,
    bbox: GeoBoundingBox,
) -> FilterFunc {
    any_point(doc_values, field.into(), move |point| bbox.contains(point))
}

/// Accept documents with at least one point of `field` within `radius_km`
/// of `center`.
pub fn geo_distance_filter<S: Into<String>>(
    doc_values: Arc<dyn DocValueReader>,
    field: S,
    center: GeoPoint,
    radius_km: f64,
) -> Result<FilterFunc> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(PhalanxError::query(format!(
            "Invalid distance: {radius_km} (must be a non-negative number of kilometers)"
        )));
    }
    Ok(any_point(doc_values, field.into(), move |point| {
        center.distance_to(point) <= radius_km
    }))
}

/// Accept documents with at least one point of `field` inside `polygon`.
pub fn geo_polygon_filter<S: Into<String>>(
    doc_values: Arc<dyn DocValueReader>,
    field: S,
    polygon: GeoPolygon,
) -> FilterFunc {
    any_point(doc_values, field.into(), move |point| polygon.contains(point))
}
