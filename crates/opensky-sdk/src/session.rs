//! Shareable HTTP transport.
//!
//! [`HttpSession`] wraps a [`reqwest::Client`] (which already pools
//! connections and is cheap to clone) and adds an explicit *closed* state,
//! so the owner of a session can release it and every holder observes it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::OpenSkyError;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = concat!("opensky-sdk/", env!("CARGO_PKG_VERSION"));

/// HTTP transport used by [`OpenSky`](crate::OpenSky).
///
/// Clones share the same connection pool and the same closed flag.
#[derive(Debug, Clone)]
pub struct HttpSession {
    client: reqwest::Client,
    closed: Arc<AtomicBool>,
}

impl HttpSession {
    /// Create a session with a fresh connection pool.
    pub fn new() -> Result<Self, OpenSkyError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| OpenSkyError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self::from_client(client))
    }

    /// Wrap an existing, caller-configured `reqwest` client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self {
            client,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The underlying client, or [`OpenSkyError::SessionClosed`].
    pub fn client(&self) -> Result<&reqwest::Client, OpenSkyError> {
        if self.is_closed() {
            return Err(OpenSkyError::SessionClosed);
        }
        Ok(&self.client)
    }

    /// Mark the session closed for every holder.
    ///
    /// Pooled connections are released once the last clone is dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
    }

    /// Whether [`close`](Self::close) was called on any clone.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}
