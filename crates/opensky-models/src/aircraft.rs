//! Aircraft identity and classification types.
//!
//! An aircraft is identified on the OpenSky network by its [`Icao24`]
//! transponder address. Each reported state additionally carries the
//! [`PositionSource`] the position was derived from and, when requested,
//! the emitter [`AircraftCategory`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// Icao24
// ---------------------------------------------------------------------------

/// 24-bit ICAO transponder address in hex string representation.
///
/// The address is the identity of a state vector, so it can never be
/// empty. The value is kept exactly as received.
///
/// # Examples
///
/// ```
/// use opensky_models::Icao24;
///
/// let addr = Icao24::new("ab1644").unwrap();
/// assert_eq!(addr.to_string(), "ab1644");
///
/// assert!(Icao24::new("  ").is_err());
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Icao24(String);

impl Icao24 {
    /// Create a new `Icao24`, rejecting empty or blank values.
    pub fn new(addr: impl Into<String>) -> Result<Self, ModelError> {
        let addr = addr.into();
        if addr.trim().is_empty() {
            return Err(ModelError::InvalidIcao24 {
                value: addr,
                reason: "must not be empty".into(),
            });
        }
        Ok(Self(addr))
    }

    /// Return the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Icao24 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Icao24 {
    type Error = ModelError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<String> for Icao24 {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Icao24> for String {
    fn from(addr: Icao24) -> Self {
        addr.0
    }
}

impl FromStr for Icao24 {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

// ---------------------------------------------------------------------------
// PositionSource
// ---------------------------------------------------------------------------

/// Origin of a state's position.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::FromRepr,
)]
#[repr(i8)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PositionSource {
    /// Code not known to this client.
    Unknown = -1,
    /// ADS-B.
    Adsb = 0,
    /// ASTERIX.
    Asterix = 1,
    /// Multilateration.
    Mlat = 2,
    /// FLARM.
    Flarm = 3,
}

impl PositionSource {
    /// Map an API code, falling back to [`PositionSource::Unknown`].
    pub fn from_code(code: i64) -> Self {
        i8::try_from(code)
            .ok()
            .and_then(Self::from_repr)
            .unwrap_or_else(|| {
                tracing::warn!(code, "unsupported position source code");
                Self::Unknown
            })
    }

    /// The integer code used on the wire.
    pub fn code(self) -> i64 {
        i64::from(self as i8)
    }
}

// ---------------------------------------------------------------------------
// AircraftCategory
// ---------------------------------------------------------------------------

/// Emitter category of an aircraft, only reported by extended queries.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, strum::FromRepr,
)]
#[repr(u8)]
#[strum(serialize_all = "snake_case")]
pub enum AircraftCategory {
    /// No information at all.
    NoInformation = 0,
    /// No ADS-B emitter category information.
    NoAdsInformation = 1,
    /// Light (< 15500 lbs).
    Light = 2,
    /// Small (15500 to 75000 lbs).
    Small = 3,
    /// Large (75000 to 300000 lbs).
    Large = 4,
    /// High vortex large (aircraft such as B-757).
    HighVortexLarge = 5,
    /// Heavy (> 300000 lbs).
    Heavy = 6,
    /// High performance (> 5g acceleration and 400 kts).
    HighPerformance = 7,
    /// Rotorcraft.
    Rotorcraft = 8,
    /// Glider / sailplane.
    Glider = 9,
    /// Lighter-than-air.
    LighterThanAir = 10,
    /// Parachutist / skydiver.
    Parachutist = 11,
    /// Ultralight / hang-glider / paraglider.
    Ultralight = 12,
    /// Reserved.
    Reserved = 13,
    /// Unmanned aerial vehicle.
    UnmannedAerialVehicle = 14,
    /// Space / trans-atmospheric vehicle.
    SpaceVehicle = 15,
    /// Surface vehicle, emergency.
    EmergencyVehicle = 16,
    /// Surface vehicle, service.
    ServiceVehicle = 17,
    /// Point obstacle (includes tethered balloons).
    PointObstacle = 18,
    /// Cluster obstacle.
    ClusterObstacle = 19,
    /// Line obstacle.
    LineObstacle = 20,
}

impl AircraftCategory {
    /// Map an API code, falling back to [`AircraftCategory::NoInformation`].
    pub fn from_code(code: i64) -> Self {
        u8::try_from(code)
            .ok()
            .and_then(Self::from_repr)
            .unwrap_or_else(|| {
                tracing::warn!(code, "unsupported aircraft category code");
                Self::NoInformation
            })
    }

    /// The integer code used on the wire.
    pub fn code(self) -> i64 {
        i64::from(self as u8)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
