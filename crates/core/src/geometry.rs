//! GeoJSON polygon geometry and planar area estimation.
//!
//! Farm boundaries travel over the wire as GeoJSON `Polygon` objects.
//! The area helpers here are a display-only approximation: shoelace
//! area over the outer ring in degree space, scaled by a fixed
//! degrees-to-meters constant with the longitude axis corrected by the
//! cosine of the ring's mean latitude. Authoritative areas come from
//! the backend (`area_sqm` on the farm record).

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Meters per degree of latitude (WGS84 mean).
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Square meters per hectare.
pub const SQ_M_PER_HECTARE: f64 = 10_000.0;

/// Minimum number of positions in a closed ring (triangle + closing point).
pub const MIN_RING_POSITIONS: usize = 4;

// ---------------------------------------------------------------------------
// Polygon type
// ---------------------------------------------------------------------------

/// A GeoJSON `Polygon` geometry.
///
/// `coordinates[0]` is the outer boundary ring as `[longitude, latitude]`
/// pairs; subsequent rings (holes) are carried through untouched but
/// ignored by the area helpers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    #[serde(rename = "type")]
    pub geometry_type: String,
    pub coordinates: Vec<Vec<[f64; 2]>>,
}

impl GeoPolygon {
    /// Build a polygon from a single outer ring.
    pub fn from_ring(ring: Vec<[f64; 2]>) -> Self {
        Self {
            geometry_type: "Polygon".to_string(),
            coordinates: vec![ring],
        }
    }

    /// The outer boundary ring, if present.
    pub fn outer_ring(&self) -> Option<&[[f64; 2]]> {
        self.coordinates.first().map(|r| r.as_slice())
    }

    /// Validate that this is a usable closed polygon.
    ///
    /// Requirements: `type` is `"Polygon"`, an outer ring exists with at
    /// least [`MIN_RING_POSITIONS`] positions, and the ring is closed
    /// (first position equals last).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.geometry_type != "Polygon" {
            return Err(CoreError::Validation(format!(
                "Unsupported geometry type: {}",
                self.geometry_type
            )));
        }

        let ring = self
            .outer_ring()
            .ok_or_else(|| CoreError::Validation("Polygon has no outer ring".to_string()))?;

        if ring.len() < MIN_RING_POSITIONS {
            return Err(CoreError::Validation(format!(
                "Outer ring has {} positions, need at least {MIN_RING_POSITIONS}",
                ring.len()
            )));
        }

        if ring.first() != ring.last() {
            return Err(CoreError::Validation(
                "Outer ring is not closed (first position != last)".to_string(),
            ));
        }

        Ok(())
    }

    /// Approximate planar area of the outer ring in square meters.
    pub fn area_sq_m(&self) -> f64 {
        self.outer_ring().map(ring_area_sq_m).unwrap_or(0.0)
    }

    /// Approximate planar area of the outer ring in hectares.
    pub fn area_hectares(&self) -> f64 {
        self.area_sq_m() / SQ_M_PER_HECTARE
    }

    /// Centroid of the outer ring vertices as `[longitude, latitude]`.
    ///
    /// Vertex average (the closing point is skipped), good enough for
    /// focusing a map viewport on the farm.
    pub fn centroid(&self) -> Option<[f64; 2]> {
        let ring = self.outer_ring()?;
        if ring.len() < 2 {
            return None;
        }
        // Drop the closing point so it is not double-counted.
        let open = &ring[..ring.len() - 1];
        let n = open.len() as f64;
        let (sum_lon, sum_lat) = open
            .iter()
            .fold((0.0, 0.0), |(lon, lat), p| (lon + p[0], lat + p[1]));
        Some([sum_lon / n, sum_lat / n])
    }
}

// ---------------------------------------------------------------------------
// Area computation
// ---------------------------------------------------------------------------

/// Shoelace area of a closed ring of `[longitude, latitude]` positions,
/// in square meters.
///
/// Positions are projected to a local planar frame: one degree of
/// latitude is [`METERS_PER_DEGREE`] meters, one degree of longitude is
/// that scaled by `cos(mean latitude)`. The result is independent of
/// winding order.
pub fn ring_area_sq_m(ring: &[[f64; 2]]) -> f64 {
    if ring.len() < MIN_RING_POSITIONS {
        return 0.0;
    }

    let mean_lat_rad = ring.iter().map(|p| p[1]).sum::<f64>() / ring.len() as f64;
    let lon_scale = METERS_PER_DEGREE * mean_lat_rad.to_radians().cos();

    let mut twice_area = 0.0;
    for window in ring.windows(2) {
        let [lon1, lat1] = window[0];
        let [lon2, lat2] = window[1];
        let x1 = lon1 * lon_scale;
        let y1 = lat1 * METERS_PER_DEGREE;
        let x2 = lon2 * lon_scale;
        let y2 = lat2 * METERS_PER_DEGREE;
        twice_area += x1 * y2 - x2 * y1;
    }

    (twice_area / 2.0).abs()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_ring_at(lat: f64) -> Vec<[f64; 2]> {
        vec![
            [0.0, lat],
            [0.0, lat + 1.0],
            [1.0, lat + 1.0],
            [1.0, lat],
            [0.0, lat],
        ]
    }

    #[test]
    fn unit_square_area_matches_shoelace_scaling() {
        let ring = unit_ring_at(20.0);
        let area = ring_area_sq_m(&ring);

        // Mean latitude of the five ring positions: (20*3 + 21*2)/5 = 20.4.
        let expected = METERS_PER_DEGREE * METERS_PER_DEGREE * 20.4_f64.to_radians().cos();
        assert!(area > 0.0);
        assert!((area - expected).abs() < 1.0);
    }

    #[test]
    fn area_is_deterministic() {
        let ring = unit_ring_at(20.0);
        assert_eq!(ring_area_sq_m(&ring), ring_area_sq_m(&ring));
    }

    #[test]
    fn winding_order_does_not_change_area() {
        let ring = unit_ring_at(31.0);
        let mut reversed = ring.clone();
        reversed.reverse();
        assert!((ring_area_sq_m(&ring) - ring_area_sq_m(&reversed)).abs() < 1e-6);
    }

    #[test]
    fn hectares_scale_from_square_meters() {
        let poly = GeoPolygon::from_ring(unit_ring_at(0.0));
        let sq_m = poly.area_sq_m();
        assert!((poly.area_hectares() - sq_m / SQ_M_PER_HECTARE).abs() < 1e-9);
    }

    #[test]
    fn degenerate_ring_has_zero_area() {
        let ring = vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]];
        assert_eq!(ring_area_sq_m(&ring), 0.0);
    }

    #[test]
    fn validate_accepts_closed_ring() {
        let poly = GeoPolygon::from_ring(unit_ring_at(20.0));
        assert!(poly.validate().is_ok());
    }

    #[test]
    fn validate_rejects_open_ring() {
        let poly = GeoPolygon::from_ring(vec![[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]);
        assert!(poly.validate().is_err());
    }

    #[test]
    fn validate_rejects_too_few_positions() {
        let poly = GeoPolygon::from_ring(vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]);
        assert!(poly.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_polygon_type() {
        let mut poly = GeoPolygon::from_ring(unit_ring_at(0.0));
        poly.geometry_type = "Point".to_string();
        assert!(poly.validate().is_err());
    }

    #[test]
    fn centroid_of_unit_square() {
        let poly = GeoPolygon::from_ring(unit_ring_at(20.0));
        let c = poly.centroid().unwrap();
        assert!((c[0] - 0.5).abs() < 1e-9);
        assert!((c[1] - 20.5).abs() < 1e-9);
    }

    #[test]
    fn serde_round_trips_geojson_shape() {
        let poly = GeoPolygon::from_ring(unit_ring_at(20.0));
        let json = serde_json::to_value(&poly).unwrap();
        assert_eq!(json["type"], "Polygon");
        let back: GeoPolygon = serde_json::from_value(json).unwrap();
        assert_eq!(back, poly);
    }
}
