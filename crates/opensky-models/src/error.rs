//! Error types for the `opensky-models` crate.
//!
//! All fallible constructors, row conversions and validations in this crate
//! return variants of [`ModelError`].

/// Errors produced when constructing or validating model types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// An ICAO24 transponder address was empty.
    #[error("invalid ICAO24 address \"{value}\": {reason}")]
    InvalidIcao24 {
        /// The value that failed validation.
        value: String,
        /// Human-readable explanation.
        reason: String,
    },

    /// A state row did not have the 17 (basic) or 18 (extended) columns.
    #[error("state row has {len} columns, expected 17 or 18")]
    RowLength {
        /// Number of columns actually received.
        len: usize,
    },

    /// A non-null column held a value of the wrong JSON type.
    #[error("column {index} ({field}) must be {expected}, got {found}")]
    FieldType {
        /// Column position in the row.
        index: usize,
        /// API name of the column.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
        /// The offending JSON value.
        found: String,
    },

    /// A latitude outside [-90, 90].
    #[error("invalid latitude {0}, must be in [-90, 90]")]
    InvalidLatitude(f64),

    /// A longitude outside [-180, 180].
    #[error("invalid longitude {0}, must be in [-180, 180]")]
    InvalidLongitude(f64),

    /// A bounding box whose minimum exceeds its maximum on one axis.
    #[error("inverted {axis} bounds: min {min} > max {max}")]
    InvertedBounds {
        /// `"latitude"` or `"longitude"`.
        axis: &'static str,
        /// The minimum bound.
        min: f64,
        /// The maximum bound.
        max: f64,
    },
}
