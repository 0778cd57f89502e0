//! Human-readable rendering of API responses.

use opensky_models::{StateVector, StatesResponse};

const MISSING: &str = "-";

/// Column header matching [`state_line`].
pub const HEADER: &str =
    "ICAO24  CALLSIGN  COUNTRY               LAT       LON        ALT(m)   GS(m/s)  TRK    GND";

fn number(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:.precision$}"))
}

/// One aligned line per aircraft.
pub fn state_line(state: &StateVector) -> String {
    let altitude = state.geo_altitude.or(state.barometric_altitude);
    let ground = match state.on_ground {
        Some(true) => "yes",
        Some(false) => "no",
        None => MISSING,
    };
    format!(
        "{:<7} {:<9} {:<20} {:>9} {:>10} {:>8} {:>8} {:>6} {}",
        state.icao24.as_str(),
        state.callsign_trimmed().unwrap_or(MISSING),
        state.origin_country.as_deref().unwrap_or(MISSING),
        number(state.latitude, 4),
        number(state.longitude, 4),
        number(altitude, 0),
        number(state.velocity, 1),
        number(state.true_track, 0),
        ground,
    )
}

/// Summary line for a whole snapshot.
pub fn summary(states: &StatesResponse) -> String {
    let at = states
        .time_utc()
        .map_or_else(|| states.time.to_string(), |t| t.to_rfc3339());
    format!("{} aircraft at {at}", states.len())
}
