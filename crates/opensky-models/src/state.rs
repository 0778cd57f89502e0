//! State vectors and the `/states` response.
//!
//! The REST API encodes each aircraft state as a JSON array whose meaning
//! depends only on position. [`StateField`] is the single table mapping
//! those positions to named fields; [`StateVector`] converts rows through
//! it in both directions, so serde round-trips keep the wire shape.
//!
//! ```text
//! ["ab1644", "UAL421  ", "United States", 1683488743, ..., 0, 4]
//!     0          1              2              3             16 17
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::aircraft::{AircraftCategory, Icao24, PositionSource};
use crate::error::ModelError;

// ---------------------------------------------------------------------------
// StateField
// ---------------------------------------------------------------------------

/// Positional column of a state row, with its index as discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StateField {
    /// ICAO24 address, hex string.
    Icao24 = 0,
    /// Callsign, 8 characters, space padded.
    Callsign = 1,
    /// Country inferred from the ICAO24 address.
    OriginCountry = 2,
    /// Seconds since epoch of the last position update.
    TimePosition = 3,
    /// Seconds since epoch of the last message from the transponder.
    LastContact = 4,
    /// WGS-84 longitude in degrees.
    Longitude = 5,
    /// WGS-84 latitude in degrees.
    Latitude = 6,
    /// Barometric altitude in meters.
    BaroAltitude = 7,
    /// Surface position report.
    OnGround = 8,
    /// Velocity over ground in m/s.
    Velocity = 9,
    /// True track in decimal degrees clockwise from north.
    TrueTrack = 10,
    /// Vertical rate in m/s, positive when climbing.
    VerticalRate = 11,
    /// Serial numbers of the receiving sensors.
    Sensors = 12,
    /// Geometric altitude in meters.
    GeoAltitude = 13,
    /// Transponder code (squawk).
    Squawk = 14,
    /// Special purpose indicator.
    Spi = 15,
    /// Origin of the position, see [`PositionSource`].
    PositionSource = 16,
    /// Aircraft category, extended queries only.
    Category = 17,
}

impl StateField {
    /// All columns in wire order.
    pub const COLUMNS: [StateField; 18] = [
        Self::Icao24,
        Self::Callsign,
        Self::OriginCountry,
        Self::TimePosition,
        Self::LastContact,
        Self::Longitude,
        Self::Latitude,
        Self::BaroAltitude,
        Self::OnGround,
        Self::Velocity,
        Self::TrueTrack,
        Self::VerticalRate,
        Self::Sensors,
        Self::GeoAltitude,
        Self::Squawk,
        Self::Spi,
        Self::PositionSource,
        Self::Category,
    ];

    /// Column count of a basic (non-extended) row.
    pub const BASIC_LEN: usize = 17;

    /// Column count of an extended row.
    pub const EXTENDED_LEN: usize = 18;

    /// Position of this column in a row.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name of this column in the OpenSky documentation.
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// StateVector
// ---------------------------------------------------------------------------

/// One aircraft's reported state at a given time.
///
/// Everything but the [`Icao24`] address may be missing from a report;
/// a missing value is `None`, never a zero.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(try_from = "Vec<Value>", into = "Vec<Value>")]
pub struct StateVector {
    /// Transponder address.
    pub icao24: Icao24,
    /// Callsign exactly as broadcast (padding kept).
    pub callsign: Option<String>,
    /// Country inferred from the ICAO24 address.
    pub origin_country: Option<String>,
    /// Seconds since epoch of the last position report.
    pub time_position: Option<i64>,
    /// Seconds since epoch of the last received message.
    pub last_contact: Option<i64>,
    /// WGS-84 longitude in degrees.
    pub longitude: Option<f64>,
    /// WGS-84 latitude in degrees.
    pub latitude: Option<f64>,
    /// Barometric altitude in meters.
    pub barometric_altitude: Option<f64>,
    /// Whether the aircraft sends surface position reports.
    pub on_ground: Option<bool>,
    /// Velocity over ground in m/s.
    pub velocity: Option<f64>,
    /// True track in decimal degrees (0 is north).
    pub true_track: Option<f64>,
    /// Vertical rate in m/s.
    pub vertical_rate: Option<f64>,
    /// Sensors which received messages for this state.
    pub sensors: Option<Vec<i64>>,
    /// Geometric altitude in meters.
    pub geo_altitude: Option<f64>,
    /// Transponder code (squawk).
    pub transponder_code: Option<String>,
    /// Special purpose indicator.
    pub special_purpose_indicator: Option<bool>,
    /// Origin of this state's position.
    pub position_source: Option<PositionSource>,
    /// Aircraft category.
    pub category: Option<AircraftCategory>,
}

impl StateVector {
    /// Callsign without the trailing padding, `None` if absent or blank.
    pub fn callsign_trimmed(&self) -> Option<&str> {
        self.callsign
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Convert the vector back into its positional wire form.
    pub fn to_row(&self) -> Vec<Value> {
        let mut row = vec![
            Value::from(self.icao24.as_str()),
            opt(self.callsign.clone()),
            opt(self.origin_country.clone()),
            opt(self.time_position),
            opt(self.last_contact),
            opt(self.longitude),
            opt(self.latitude),
            opt(self.barometric_altitude),
            opt(self.on_ground),
            opt(self.velocity),
            opt(self.true_track),
            opt(self.vertical_rate),
            opt(self.sensors.clone()),
            opt(self.geo_altitude),
            opt(self.transponder_code.clone()),
            opt(self.special_purpose_indicator),
            opt(self.position_source.map(PositionSource::code)),
        ];
        if let Some(category) = self.category {
            row.push(Value::from(category.code()));
        }
        row
    }
}

fn opt<T: Into<Value>>(value: Option<T>) -> Value {
    value.map_or(Value::Null, Into::into)
}

/// Typed, null-tolerant access to one row.
struct Row<'a>(&'a [Value]);

impl Row<'_> {
    fn get(&self, field: StateField) -> Option<&Value> {
        self.0.get(field.index()).filter(|v| !v.is_null())
    }

    fn mismatch(field: StateField, expected: &'static str, found: &Value) -> ModelError {
        ModelError::FieldType {
            index: field.index(),
            field: field.name(),
            expected,
            found: found.to_string(),
        }
    }

    fn string(&self, field: StateField) -> Result<Option<String>, ModelError> {
        self.get(field)
            .map(|v| {
                v.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| Self::mismatch(field, "a string", v))
            })
            .transpose()
    }

    fn int(&self, field: StateField) -> Result<Option<i64>, ModelError> {
        self.get(field)
            .map(|v| {
                v.as_i64()
                    .ok_or_else(|| Self::mismatch(field, "an integer", v))
            })
            .transpose()
    }

    fn float(&self, field: StateField) -> Result<Option<f64>, ModelError> {
        self.get(field)
            .map(|v| v.as_f64().ok_or_else(|| Self::mismatch(field, "a number", v)))
            .transpose()
    }

    fn boolean(&self, field: StateField) -> Result<Option<bool>, ModelError> {
        self.get(field)
            .map(|v| {
                v.as_bool()
                    .ok_or_else(|| Self::mismatch(field, "a boolean", v))
            })
            .transpose()
    }

    fn ints(&self, field: StateField) -> Result<Option<Vec<i64>>, ModelError> {
        let Some(v) = self.get(field) else {
            return Ok(None);
        };
        let items = v
            .as_array()
            .ok_or_else(|| Self::mismatch(field, "an array of integers", v))?;
        items
            .iter()
            .map(|item| {
                item.as_i64()
                    .ok_or_else(|| Self::mismatch(field, "an array of integers", v))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

impl TryFrom<Vec<Value>> for StateVector {
    type Error = ModelError;

    fn try_from(row: Vec<Value>) -> Result<Self, Self::Error> {
        if row.len() != StateField::BASIC_LEN && row.len() != StateField::EXTENDED_LEN {
            return Err(ModelError::RowLength { len: row.len() });
        }
        let row = Row(&row);

        let icao24 = match row.get(StateField::Icao24) {
            Some(Value::String(s)) => Icao24::new(s.as_str())?,
            Some(other) => return Err(Row::mismatch(StateField::Icao24, "a string", other)),
            None => {
                return Err(ModelError::InvalidIcao24 {
                    value: String::new(),
                    reason: "missing".into(),
                })
            }
        };

        Ok(Self {
            icao24,
            callsign: row.string(StateField::Callsign)?,
            origin_country: row.string(StateField::OriginCountry)?,
            time_position: row.int(StateField::TimePosition)?,
            last_contact: row.int(StateField::LastContact)?,
            longitude: row.float(StateField::Longitude)?,
            latitude: row.float(StateField::Latitude)?,
            barometric_altitude: row.float(StateField::BaroAltitude)?,
            on_ground: row.boolean(StateField::OnGround)?,
            velocity: row.float(StateField::Velocity)?,
            true_track: row.float(StateField::TrueTrack)?,
            vertical_rate: row.float(StateField::VerticalRate)?,
            sensors: row.ints(StateField::Sensors)?,
            geo_altitude: row.float(StateField::GeoAltitude)?,
            transponder_code: row.string(StateField::Squawk)?,
            special_purpose_indicator: row.boolean(StateField::Spi)?,
            position_source: row
                .int(StateField::PositionSource)?
                .map(PositionSource::from_code),
            category: row
                .int(StateField::Category)?
                .map(AircraftCategory::from_code),
        })
    }
}

impl From<StateVector> for Vec<Value> {
    fn from(state: StateVector) -> Self {
        state.to_row()
    }
}

// ---------------------------------------------------------------------------
// StatesResponse
// ---------------------------------------------------------------------------

/// Snapshot of aircraft states at a server-reported time.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StatesResponse {
    /// Seconds since epoch the states are associated with.
    pub time: i64,
    /// Aircraft states; the API's `null` decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub states: Vec<StateVector>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<StateVector>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<StateVector>>::deserialize(deserializer)?.unwrap_or_default())
}

impl StatesResponse {
    /// Number of aircraft in the snapshot.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the snapshot holds no aircraft.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over the states in server order.
    pub fn iter(&self) -> std::slice::Iter<'_, StateVector> {
        self.states.iter()
    }

    /// Find the state of one aircraft (case-insensitive address match).
    pub fn find(&self, icao24: &str) -> Option<&StateVector> {
        self.states
            .iter()
            .find(|s| s.icao24.as_str().eq_ignore_ascii_case(icao24))
    }

    /// The snapshot time as a UTC timestamp.
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }
}

impl<'a> IntoIterator for &'a StatesResponse {
    type Item = &'a StateVector;
    type IntoIter = std::slice::Iter<'a, StateVector>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
