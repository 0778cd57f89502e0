//! Canonical OpenSky REST endpoint paths and query keys.
//!
//! Every URL the SDK requests is built from the constants in this module,
//! relative to the API base URL.
//!
//! ```text
//! https://opensky-network.org/api/states/all?lamin=..&lamax=..&lomin=..&lomax=..
//! https://opensky-network.org/api/states/own?time=..
//! ```

/// Default base URL of the public API. The trailing slash matters: paths
/// are joined relative to it.
pub const DEFAULT_API_URL: &str = "https://opensky-network.org/api/";

/// `Accept` header sent with every request.
pub const ACCEPT: &str = "application/json, text/plain, */*";

/// An API endpoint, relative to the base URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// All state vectors, optionally filtered.
    StatesAll,
    /// State vectors seen by the authenticated user's own sensors.
    StatesOwn,
}

impl Endpoint {
    /// Path relative to the base URL.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::StatesAll => "states/all",
            Endpoint::StatesOwn => "states/own",
        }
    }
}

/// Query parameter names.
pub mod params {
    /// Unix time of the requested snapshot.
    pub const TIME: &str = "time";
    /// ICAO24 address filter, may be repeated.
    pub const ICAO24: &str = "icao24";
    /// Lower latitude bound.
    pub const MIN_LATITUDE: &str = "lamin";
    /// Upper latitude bound.
    pub const MAX_LATITUDE: &str = "lamax";
    /// Lower longitude bound.
    pub const MIN_LONGITUDE: &str = "lomin";
    /// Upper longitude bound.
    pub const MAX_LONGITUDE: &str = "lomax";
    /// Request the aircraft category column.
    pub const EXTENDED: &str = "extended";
}
