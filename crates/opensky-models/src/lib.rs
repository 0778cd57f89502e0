#![deny(missing_docs)]

//! # OpenSky Models
//!
//! Core data types returned by the OpenSky Network REST API.
//!
//! ## Response hierarchy
//!
//! ```text
//! StatesResponse
//! ├── time            (seconds since epoch)
//! └── states: Vec<StateVector>
//!     ├── icao24      (always present)
//!     └── 17 optional columns, see StateField
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`aircraft`] | `Icao24`, `PositionSource`, `AircraftCategory` |
//! | [`state`] | `StateField` column table, `StateVector`, `StatesResponse` |
//! | [`geo`] | `BoundingBox` validation and radius helpers |
//! | [`error`] | `ModelError` |

pub mod aircraft;
pub mod error;
pub mod geo;
pub mod state;

// Re-export all public types at crate root for convenience.
// Downstream crates can use `opensky_models::StateVector` directly.
pub use aircraft::*;
pub use error::*;
pub use geo::*;
pub use state::*;
