//! High-level client for the OpenSky REST API.
//!
//! [`OpenSky`] maps one async method to one endpoint, attaches basic auth
//! when credentials are configured and turns every answer into either a
//! typed response or an [`OpenSkyError`].
//!
//! # Typical usage
//!
//! ```rust,no_run
//! use opensky_sdk::{Credentials, OpenSky, StatesQuery};
//!
//! # async fn run() -> Result<(), opensky_sdk::OpenSkyError> {
//! let client = OpenSky::builder()
//!     .credentials(Credentials::new("user", "secret"))
//!     .build()?;
//!
//! let states = client.get_states(&StatesQuery::new().extended(true)).await?;
//! for state in &states {
//!     println!("{} {:?}", state.icao24, state.callsign_trimmed());
//! }
//! println!("~{} credits left today", client.remaining_credits());
//! # Ok(())
//! # }
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::OnceLock;
use std::time::Duration;

use opensky_models::{BoundingBox, StatesResponse};
use reqwest::header::{self, HeaderValue};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::credentials::Credentials;
use crate::credits::{
    credit_cost, CreditLedger, ANONYMOUS_CREDITS, AUTHENTICATED_CREDITS, CONTRIBUTING_CREDITS,
};
use crate::endpoints::{self, params, Endpoint};
use crate::error::OpenSkyError;
use crate::query::StatesQuery;
use crate::session::{HttpSession, USER_AGENT};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client facade for the OpenSky Network API.
///
/// All query methods take `&self`, so one client can serve concurrent
/// calls. Each call issues exactly one HTTP request and never retries.
///
/// The client either *owns* its [`HttpSession`] (created lazily on first
/// use) or *borrows* one supplied through [`OpenSkyBuilder::session`].
/// [`close`](Self::close) only ever closes an owned session.
#[derive(Debug)]
pub struct OpenSky {
    base_url: Url,
    request_timeout: Duration,
    credentials: Option<Credentials>,
    contributing_user: bool,
    session: OnceLock<HttpSession>,
    owns_session: bool,
    credits: CreditLedger,
}

impl OpenSky {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Anonymous client with default settings.
    pub fn new() -> Result<Self, OpenSkyError> {
        Self::builder().build()
    }

    /// Start configuring a client.
    pub fn builder() -> OpenSkyBuilder {
        OpenSkyBuilder::default()
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Make sure a session exists, creating one if needed.
    ///
    /// A session closed through one of its clones stays attached, and
    /// requests fail with [`OpenSkyError::SessionClosed`] until
    /// [`close`](Self::close) releases it. The next call after that
    /// creates a fresh owned session.
    pub fn open(&self) -> Result<&HttpSession, OpenSkyError> {
        if let Some(session) = self.session.get() {
            return Ok(session);
        }
        let created = HttpSession::new()?;
        debug!("HTTP session created");
        Ok(self.session.get_or_init(|| created))
    }

    /// Release the session if this client created it.
    ///
    /// A caller-supplied session is left open and stays attached.
    pub fn close(&mut self) {
        if !self.owns_session {
            return;
        }
        if let Some(session) = self.session.take() {
            session.close();
            debug!("HTTP session closed");
        }
    }

    /// Open the session and return a guard that closes it on drop.
    ///
    /// ```rust,no_run
    /// # async fn run() -> Result<(), opensky_sdk::OpenSkyError> {
    /// let mut client = opensky_sdk::OpenSky::new()?;
    /// {
    ///     let sky = client.scoped()?;
    ///     let _ = sky.get_all_states().await?;
    /// }
    /// assert!(client.session().is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn scoped(&mut self) -> Result<SessionScope<'_>, OpenSkyError> {
        self.open()?;
        Ok(SessionScope { client: self })
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Install credentials and check them with a one-credit probe query.
    ///
    /// On failure the client goes back to anonymous (no credentials, not
    /// contributing, anonymous budget) and the error is returned. On
    /// success the credit budget is raised to the authenticated (or
    /// contributing) level.
    pub async fn authenticate(
        &mut self,
        credentials: Credentials,
        contributing_user: bool,
    ) -> Result<(), OpenSkyError> {
        let username = credentials.username().to_owned();
        self.credentials = Some(credentials);

        let probe = StatesQuery::new().bounding_box(BoundingBox::new(0.0, 1.0, 0.0, 1.0));
        let probed = self.get_states(&probe).await;
        if let Err(err) = probed {
            warn!(%username, error = %err, "authentication probe failed");
            self.credentials = None;
            self.contributing_user = false;
            self.credits.set_budget(credit_budget(false, false));
            return Err(err);
        }

        self.contributing_user = contributing_user;
        self.credits.set_budget(credit_budget(true, contributing_user));
        info!(%username, contributing_user, "authenticated");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Endpoints
    // ------------------------------------------------------------------

    /// Retrieve state vectors, filtered by `query`.
    ///
    /// An invalid bounding box fails before any request is sent.
    pub async fn get_states(&self, query: &StatesQuery) -> Result<StatesResponse, OpenSkyError> {
        let query_params = query.to_params()?;
        let states: StatesResponse = self.request(Endpoint::StatesAll, &query_params).await?;

        let cost = credit_cost(query.bounding_box.as_ref());
        self.credits.register(cost);
        debug!(
            aircraft = states.len(),
            time = states.time,
            cost,
            "states received"
        );
        Ok(states)
    }

    /// Retrieve every state vector at the most recent time.
    pub async fn get_all_states(&self) -> Result<StatesResponse, OpenSkyError> {
        self.get_states(&StatesQuery::new()).await
    }

    /// Retrieve state vectors seen by the authenticated user's sensors.
    ///
    /// Requires credentials; without them no request is sent.
    pub async fn get_own_states(&self, time: Option<i64>) -> Result<StatesResponse, OpenSkyError> {
        if self.credentials.is_none() {
            return Err(OpenSkyError::Authentication {
                reason: "own states require credentials".into(),
            });
        }
        let query_params: Vec<_> = time
            .map(|t| (params::TIME, t.to_string()))
            .into_iter()
            .collect();
        self.request(Endpoint::StatesOwn, &query_params).await
    }

    /// Low-level: GET `endpoint` and decode the JSON body.
    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        query: &[(&str, String)],
    ) -> Result<T, OpenSkyError> {
        let url = self
            .base_url
            .join(endpoint.path())
            .map_err(|e| OpenSkyError::Config(format!("invalid endpoint URL: {e}")))?;
        let http = self.open()?.client()?;

        let mut request = http
            .get(url)
            .query(query)
            .header(header::ACCEPT, HeaderValue::from_static(endpoints::ACCEPT))
            .header(header::USER_AGENT, HeaderValue::from_static(USER_AGENT))
            .timeout(self.request_timeout);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(creds.username(), Some(creds.password()));
        }

        debug!(
            endpoint = endpoint.path(),
            authenticated = self.credentials.is_some(),
            "sending request"
        );
        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body).into_owned();
            if let Some(err) = OpenSkyError::from_status(status, &headers, text) {
                warn!(endpoint = endpoint.path(), %status, "request rejected");
                return Err(err);
            }
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !content_type.contains("application/json") {
            return Err(OpenSkyError::UnexpectedResponse {
                content_type: content_type.to_owned(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(serde_json::from_slice(&body)?)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Whether credentials are configured.
    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Whether the user was declared as contributing a receiver.
    pub fn is_contributing_user(&self) -> bool {
        self.contributing_user
    }

    /// Estimated credits left in the current 24 hour window.
    pub fn remaining_credits(&self) -> i64 {
        self.credits.remaining()
    }

    /// The credit ledger.
    pub fn credits(&self) -> &CreditLedger {
        &self.credits
    }

    /// The current session, if one exists yet.
    pub fn session(&self) -> Option<&HttpSession> {
        self.session.get()
    }

    /// Whether the current session was created by this client.
    pub fn owns_session(&self) -> bool {
        self.owns_session
    }

    /// Base URL endpoints are resolved against.
    pub fn api_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

fn credit_budget(authenticated: bool, contributing_user: bool) -> u32 {
    match (authenticated, contributing_user) {
        (false, _) => ANONYMOUS_CREDITS,
        (true, false) => AUTHENTICATED_CREDITS,
        (true, true) => CONTRIBUTING_CREDITS,
    }
}

// ---------------------------------------------------------------------------
// SessionScope
// ---------------------------------------------------------------------------

/// Scoped use of an [`OpenSky`] client.
///
/// Created by [`OpenSky::scoped`]; derefs to the client and calls
/// [`OpenSky::close`] when dropped.
pub struct SessionScope<'a> {
    client: &'a mut OpenSky,
}

impl Deref for SessionScope<'_> {
    type Target = OpenSky;

    fn deref(&self) -> &OpenSky {
        self.client
    }
}

impl DerefMut for SessionScope<'_> {
    fn deref_mut(&mut self) -> &mut OpenSky {
        self.client
    }
}

impl Drop for SessionScope<'_> {
    fn drop(&mut self) {
        self.client.close();
    }
}

// ---------------------------------------------------------------------------
// OpenSkyBuilder
// ---------------------------------------------------------------------------

/// Builder for [`OpenSky`].
#[derive(Debug, Default)]
pub struct OpenSkyBuilder {
    api_url: Option<String>,
    request_timeout: Option<Duration>,
    credentials: Option<Credentials>,
    session: Option<HttpSession>,
    contributing_user: bool,
}

impl OpenSkyBuilder {
    /// Attach basic auth to every request.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Reuse a caller-supplied session; the client will never close it.
    pub fn session(mut self, session: HttpSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Override the API base URL (default [`endpoints::DEFAULT_API_URL`]).
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Override the per-request timeout (default 10 seconds).
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Declare the account as contributing a receiver (larger budget).
    /// Only relevant together with credentials.
    pub fn contributing_user(mut self, contributing: bool) -> Self {
        self.contributing_user = contributing;
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<OpenSky, OpenSkyError> {
        let mut raw = self
            .api_url
            .unwrap_or_else(|| endpoints::DEFAULT_API_URL.to_string());
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw)
            .map_err(|e| OpenSkyError::Config(format!("invalid API URL `{raw}`: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(OpenSkyError::Config(format!(
                "unsupported URL scheme `{}`",
                base_url.scheme()
            )));
        }

        let authenticated = self.credentials.is_some();
        let contributing_user = authenticated && self.contributing_user;
        let owns_session = self.session.is_none();
        let session = OnceLock::new();
        if let Some(supplied) = self.session {
            let _ = session.set(supplied);
        }

        Ok(OpenSky {
            base_url,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            credentials: self.credentials,
            contributing_user,
            session,
            owns_session,
            credits: CreditLedger::new(credit_budget(authenticated, contributing_user)),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
