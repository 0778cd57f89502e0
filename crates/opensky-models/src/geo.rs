//! Geographic query area.
//!
//! A [`BoundingBox`] restricts a states query to a WGS-84 rectangle. It can
//! be given explicitly or derived from a centre point and a radius with
//! [`BoundingBox::around`].

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Mean earth radius used for the radius helpers, in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Rectangle in decimal degrees used to filter state vectors.
///
/// # Examples
///
/// ```
/// use opensky_models::BoundingBox;
///
/// let bbox = BoundingBox::new(45.8389, 47.8229, 5.9962, 10.5226);
/// assert!(bbox.validate().is_ok());
///
/// let bad = BoundingBox::new(-91.0, 0.0, 0.0, 0.0);
/// assert!(bad.validate().is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Lower latitude bound.
    pub min_latitude: f64,
    /// Upper latitude bound.
    pub max_latitude: f64,
    /// Lower longitude bound.
    pub min_longitude: f64,
    /// Upper longitude bound.
    pub max_longitude: f64,
}

impl BoundingBox {
    /// Create a bounding box. No validation happens here, see
    /// [`validate`](Self::validate).
    pub fn new(
        min_latitude: f64,
        max_latitude: f64,
        min_longitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            max_latitude,
            min_longitude,
            max_longitude,
        }
    }

    /// Check that every bound is a valid coordinate and that the box is
    /// not inverted.
    pub fn validate(&self) -> Result<(), ModelError> {
        check_latitude(self.min_latitude)?;
        check_latitude(self.max_latitude)?;
        check_longitude(self.min_longitude)?;
        check_longitude(self.max_longitude)?;
        if self.min_latitude > self.max_latitude {
            return Err(ModelError::InvertedBounds {
                axis: "latitude",
                min: self.min_latitude,
                max: self.max_latitude,
            });
        }
        if self.min_longitude > self.max_longitude {
            return Err(ModelError::InvertedBounds {
                axis: "longitude",
                min: self.min_longitude,
                max: self.max_longitude,
            });
        }
        Ok(())
    }

    /// Square box centred on a point, with half side `radius` meters.
    ///
    /// The south-west and north-east corners are the great-circle
    /// destinations at bearings 225° and 45°, `√2 · radius` away from the
    /// centre.
    pub fn around(latitude: f64, longitude: f64, radius: f64) -> Self {
        let half_side_km = radius.abs() / 1000.0;
        let diagonal_km = (2.0 * half_side_km.powi(2)).sqrt();
        let angular = diagonal_km / EARTH_RADIUS_KM;

        let lat = latitude.to_radians();
        let lon = longitude.to_radians();

        let (min_lat, min_lon) = destination(lat, lon, angular, 225f64.to_radians());
        let (max_lat, max_lon) = destination(lat, lon, angular, 45f64.to_radians());

        Self {
            min_latitude: min_lat.to_degrees(),
            max_latitude: max_lat.to_degrees(),
            min_longitude: min_lon.to_degrees(),
            max_longitude: max_lon.to_degrees(),
        }
    }

    /// Covered area in square degrees.
    pub fn area(&self) -> f64 {
        (self.max_latitude - self.min_latitude) * (self.max_longitude - self.min_longitude)
    }
}

/// Destination point from `(lat, lon)` after travelling `angular` radians
/// along `bearing`. All angles in radians.
fn destination(lat: f64, lon: f64, angular: f64, bearing: f64) -> (f64, f64) {
    let dest_lat =
        (lat.sin() * angular.cos() + lat.cos() * angular.sin() * bearing.cos()).asin();
    let dest_lon = lon
        + (bearing.sin() * angular.sin() * lat.cos())
            .atan2(angular.cos() - lat.sin() * dest_lat.sin());
    (dest_lat, dest_lon)
}

fn check_latitude(degrees: f64) -> Result<(), ModelError> {
    if (-90.0..=90.0).contains(&degrees) {
        Ok(())
    } else {
        Err(ModelError::InvalidLatitude(degrees))
    }
}

fn check_longitude(degrees: f64) -> Result<(), ModelError> {
    if (-180.0..=180.0).contains(&degrees) {
        Ok(())
    } else {
        Err(ModelError::InvalidLongitude(degrees))
    }
}
