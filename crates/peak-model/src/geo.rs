//! Short-range planar geometry over (longitude, latitude) pairs.
//!
//! Everything here uses small-angle approximations that are accurate for
//! separations of a few kilometres. Do not use these helpers for long-range
//! geodesy.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{ModelError, Result};

/// Mean Earth radius used for distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Equatorial radius used to derive the degrees-per-metre factor for offsets.
const EQUATORIAL_RADIUS_M: f64 = 6_378_137.0;

/// Radius of the search box precomputed around every record.
pub const SEARCH_BOX_RADIUS_M: f64 = 1000.0;

/// A WGS84 position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lon: f64, lat: f64) -> Result<Self> {
        if !lon.is_finite()
            || !lat.is_finite()
            || !(-180.0..=180.0).contains(&lon)
            || !(-90.0..=90.0).contains(&lat)
        {
            return Err(ModelError::InvalidCoordinate { lon, lat });
        }
        Ok(Self { lon, lat })
    }
}

/// Axis-aligned box used as a cheap pre-filter before exact distance checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchBox {
    pub min: Point,
    pub max: Point,
}

impl SearchBox {
    /// True when `point` lies strictly inside the box on both axes.
    pub fn contains(&self, point: Point) -> bool {
        self.min.lon < point.lon
            && point.lon < self.max.lon
            && self.min.lat < point.lat
            && point.lat < self.max.lat
    }
}

/// Equirectangular distance in metres.
pub fn distance(p1: Point, p2: Point) -> f64 {
    let (lon1, lat1) = (p1.lon.to_radians(), p1.lat.to_radians());
    let (lon2, lat2) = (p2.lon.to_radians(), p2.lat.to_radians());
    let x = (lon2 - lon1) * (0.5 * (lat2 + lat1)).cos();
    let y = lat2 - lat1;
    EARTH_RADIUS_M * (x * x + y * y).sqrt()
}

/// Moves `point` by `meters` along both axes.
pub fn coordinate_offset(point: Point, meters: f64) -> Point {
    let degrees_per_meter = 1.0 / ((PI / 180.0) * EQUATORIAL_RADIUS_M);
    let lat = point.lat + meters * degrees_per_meter;
    let lon = point.lon + (meters * degrees_per_meter) / point.lat.to_radians().cos();
    Point { lon, lat }
}

pub fn create_search_box(point: Point, radius_meters: f64) -> SearchBox {
    SearchBox {
        min: coordinate_offset(point, -radius_meters),
        max: coordinate_offset(point, radius_meters),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(lon: f64, lat: f64) -> Point {
        Point { lon, lat }
    }

    #[test]
    fn one_arc_minute_of_latitude_is_about_a_nautical_mile() {
        let d = distance(p(10.0, 60.0), p(10.0, 60.0 + 1.0 / 60.0));
        assert!((d - 1853.25).abs() < 1.0, "got {d}");
    }

    #[test]
    fn longitude_shrinks_with_latitude() {
        let at_equator = distance(p(0.0, 0.0), p(0.01, 0.0));
        let in_norway = distance(p(0.0, 60.0), p(0.01, 60.0));
        assert!((in_norway / at_equator - 0.5).abs() < 1e-3);
    }

    #[test]
    fn search_box_is_symmetric_and_strict() {
        let center = p(10.5, 61.2);
        let bbox = create_search_box(center, SEARCH_BOX_RADIUS_M);
        assert!(bbox.contains(center));
        assert!((center.lat - bbox.min.lat - (bbox.max.lat - center.lat)).abs() < 1e-12);
        assert!(!bbox.contains(bbox.min));
        assert!(!bbox.contains(bbox.max));
    }

    #[test]
    fn search_box_covers_its_radius() {
        let center = p(10.5, 61.2);
        let bbox = create_search_box(center, 1000.0);
        let north = p(center.lon, bbox.max.lat);
        let east = p(bbox.max.lon, center.lat);
        assert!(distance(center, north) > 990.0);
        assert!(distance(center, east) > 990.0);
    }

    #[test]
    fn rejects_out_of_range_points() {
        assert!(Point::new(10.0, 91.0).is_err());
        assert!(Point::new(f64::NAN, 60.0).is_err());
        assert!(Point::new(-181.0, 0.0).is_err());
        assert!(Point::new(10.0, 60.0).is_ok());
    }

    proptest! {
        #[test]
        fn distance_to_self_is_zero(lon in -180.0f64..180.0, lat in -85.0f64..85.0) {
            prop_assert_eq!(distance(p(lon, lat), p(lon, lat)), 0.0);
        }

        #[test]
        fn distance_is_symmetric(
            lon1 in -20.0f64..40.0, lat1 in 50.0f64..72.0,
            dlon in -0.05f64..0.05, dlat in -0.05f64..0.05,
        ) {
            let a = p(lon1, lat1);
            let b = p(lon1 + dlon, lat1 + dlat);
            prop_assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
        }
    }
}
