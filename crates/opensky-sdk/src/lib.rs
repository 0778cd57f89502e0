//! # OpenSky SDK
//!
//! Asynchronous client for the **OpenSky Network** flight-tracking REST API.
//!
//! The SDK provides:
//!
//! * [`OpenSky`]: the client facade, one method per endpoint.
//! * [`StatesQuery`]: optional filters for the states endpoint.
//! * [`HttpSession`]: shareable HTTP transport with an explicit close.
//! * [`Credentials`]: HTTP basic-auth username/password pair.
//! * [`OpenSkyError`]: unified error type for all SDK operations.
//!
//! Response models from [`opensky_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use opensky_sdk::{BoundingBox, OpenSky, StatesQuery};
//!
//! # async fn run() -> Result<(), opensky_sdk::OpenSkyError> {
//! let mut client = OpenSky::new()?;
//! {
//!     let sky = client.scoped()?;
//!     let query = StatesQuery::new().bounding_box(BoundingBox::new(45.8, 47.8, 5.9, 10.5));
//!     let states = sky.get_states(&query).await?;
//!     println!("{} aircraft at {}", states.len(), states.time);
//! } // the session created by the client is closed here
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod credentials;
pub mod credits;
pub mod endpoints;
pub mod error;
pub mod query;
pub mod session;

pub use client::{OpenSky, OpenSkyBuilder, SessionScope};
pub use credentials::Credentials;
pub use credits::{credit_cost, CreditLedger};
pub use error::OpenSkyError;
pub use query::StatesQuery;
pub use session::HttpSession;

// Re-export models from opensky-models for ergonomic usage.
pub use opensky_models::{
    AircraftCategory, BoundingBox, Icao24, ModelError, PositionSource, StateField, StateVector,
    StatesResponse,
};
