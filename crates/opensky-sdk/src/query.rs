//! Filters for the states endpoint.

use opensky_models::{BoundingBox, Icao24, ModelError};

use crate::endpoints::params;

/// Optional filters for [`OpenSky::get_states`](crate::OpenSky::get_states).
///
/// Only the filters that are set end up in the query string; an empty
/// query asks for every aircraft at the most recent time.
///
/// # Examples
///
/// ```
/// use opensky_sdk::{BoundingBox, Icao24, StatesQuery};
///
/// let query = StatesQuery::new()
///     .icao24(Icao24::new("3C6444").unwrap())
///     .bounding_box(BoundingBox::new(45.0, 46.0, 5.0, 6.0));
///
/// let params = query.to_params().unwrap();
/// assert_eq!(params[0], ("icao24", "3c6444".to_string()));
/// assert_eq!(params.len(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatesQuery {
    /// Unix time of the snapshot; the API uses the current time if unset.
    pub time: Option<i64>,
    /// Restrict to these transponders.
    pub icao24: Vec<Icao24>,
    /// Restrict to this area.
    pub bounding_box: Option<BoundingBox>,
    /// Ask for the aircraft category column.
    pub extended: bool,
}

impl StatesQuery {
    /// A query without any filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the snapshot at `time` (seconds since epoch).
    pub fn at(mut self, time: i64) -> Self {
        self.time = Some(time);
        self
    }

    /// Add one transponder address to the filter.
    pub fn icao24(mut self, icao24: Icao24) -> Self {
        self.icao24.push(icao24);
        self
    }

    /// Restrict the query to an area.
    pub fn bounding_box(mut self, bounding_box: BoundingBox) -> Self {
        self.bounding_box = Some(bounding_box);
        self
    }

    /// Ask for the aircraft category column.
    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Query parameters for the filters actually supplied.
    ///
    /// Fails if the bounding box is invalid.
    pub fn to_params(&self) -> Result<Vec<(&'static str, String)>, ModelError> {
        let mut out = Vec::new();
        if let Some(time) = self.time {
            out.push((params::TIME, time.to_string()));
        }
        for icao24 in &self.icao24 {
            out.push((params::ICAO24, icao24.as_str().to_ascii_lowercase()));
        }
        if let Some(bbox) = &self.bounding_box {
            bbox.validate()?;
            out.push((params::MIN_LATITUDE, bbox.min_latitude.to_string()));
            out.push((params::MAX_LATITUDE, bbox.max_latitude.to_string()));
            out.push((params::MIN_LONGITUDE, bbox.min_longitude.to_string()));
            out.push((params::MAX_LONGITUDE, bbox.max_longitude.to_string()));
        }
        if self.extended {
            out.push((params::EXTENDED, "1".to_string()));
        }
        Ok(out)
    }
}
