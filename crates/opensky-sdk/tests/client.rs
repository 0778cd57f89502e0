//! End-to-end tests of the client against a local mock of the API.

use std::time::Duration;

use mock_opensky::{fixtures, MockOpenSky, MockResponse, MockState, STATES_ALL, STATES_OWN};
use opensky_sdk::{
    AircraftCategory, BoundingBox, Credentials, HttpSession, Icao24, OpenSky, OpenSkyError,
    PositionSource, StatesQuery,
};

async fn mock() -> MockOpenSky {
    MockOpenSky::start_with(MockState::with_fixtures())
        .await
        .expect("start mock")
}

fn client_for(mock: &MockOpenSky) -> OpenSky {
    OpenSky::builder()
        .api_url(mock.api_url())
        .build()
        .expect("build client")
}

fn authenticated_client_for(mock: &MockOpenSky) -> OpenSky {
    OpenSky::builder()
        .api_url(mock.api_url())
        .credentials(Credentials::new("test", "test"))
        .build()
        .expect("build client")
}

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_states() {
    let mock = mock().await;
    let client = client_for(&mock);

    let response = client.get_all_states().await.expect("states");
    assert_eq!(response.len(), 4);
    assert_eq!(response.time, 1683488744);

    let first = &response.states[0];
    assert_eq!(first.icao24.as_str(), "ab1644");
    assert_eq!(first.callsign.as_deref(), Some("UAL421  "));
    assert_eq!(first.origin_country.as_deref(), Some("United States"));
    assert_eq!(first.time_position, Some(1683488743));
    assert_eq!(first.last_contact, Some(1683488743));
    assert_eq!(first.longitude, Some(-71.1656));
    assert_eq!(first.latitude, Some(42.5372));
    assert_eq!(first.barometric_altitude, Some(2217.42));
    assert_eq!(first.on_ground, Some(false));
    assert_eq!(first.velocity, Some(137.8));
    assert_eq!(first.true_track, Some(342.17));
    assert_eq!(first.vertical_rate, Some(13.0));
    assert_eq!(first.sensors, None);
    assert_eq!(first.geo_altitude, Some(2194.56));
    assert_eq!(first.transponder_code, None);
    assert_eq!(first.special_purpose_indicator, Some(false));
    assert_eq!(first.position_source, Some(PositionSource::Adsb));
    assert_eq!(first.category, Some(AircraftCategory::Large));

    let grounded = response.find("4b1815").expect("swiss vehicle");
    assert_eq!(grounded.callsign, None);
    assert_eq!(grounded.on_ground, Some(true));
    assert_eq!(grounded.latitude, None);
    assert_eq!(grounded.position_source, Some(PositionSource::Mlat));
    assert_eq!(grounded.category, Some(AircraftCategory::ServiceVehicle));
}

#[tokio::test]
async fn test_unavailable_states() {
    let mock = mock().await;
    mock.respond(STATES_ALL, MockResponse::json(fixtures::UNAVAILABLE_STATES));
    let client = client_for(&mock);

    let response = client.get_all_states().await.expect("states");
    assert!(response.is_empty());
    assert_eq!(response.time, 1683488744);
}

#[tokio::test]
async fn test_states_without_filters_sends_no_query() {
    let mock = mock().await;
    let client = client_for(&mock);

    client.get_all_states().await.expect("states");
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path, STATES_ALL);
    assert_eq!(requests[0].query, None);
}

#[tokio::test]
async fn test_states_with_bounding_box() {
    let mock = mock().await;
    let client = client_for(&mock);

    let query = StatesQuery::new().bounding_box(BoundingBox::new(0.0, 0.0, 0.0, 0.0));
    client.get_states(&query).await.expect("states");
    assert_eq!(
        mock.requests()[0].query.as_deref(),
        Some("lamin=0&lamax=0&lomin=0&lomax=0")
    );
}

#[tokio::test]
async fn test_states_with_icao24_filters() {
    let mock = mock().await;
    let client = client_for(&mock);

    let query = StatesQuery::new()
        .at(1683488744)
        .icao24(Icao24::new("AB1644").unwrap())
        .icao24(Icao24::new("3c6444").unwrap())
        .extended(true);
    client.get_states(&query).await.expect("states");
    assert_eq!(
        mock.requests()[0].query.as_deref(),
        Some("time=1683488744&icao24=ab1644&icao24=3c6444&extended=1")
    );
}

#[tokio::test]
async fn test_invalid_bounding_box_sends_nothing() {
    let mock = mock().await;
    let client = client_for(&mock);

    let query = StatesQuery::new().bounding_box(BoundingBox::new(-91.0, 0.0, 0.0, 0.0));
    let err = client.get_states(&query).await.unwrap_err();
    assert!(matches!(err, OpenSkyError::Model(_)));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_concurrent_calls_on_one_client() {
    let mock = mock().await;
    let client = client_for(&mock);

    let boxed = StatesQuery::new().bounding_box(BoundingBox::new(49.7, 50.5, 3.2, 4.6));
    let (a, b) = tokio::join!(client.get_all_states(), client.get_states(&boxed));
    assert_eq!(a.expect("first").len(), 4);
    assert_eq!(b.expect("second").len(), 4);
    assert_eq!(mock.requests().len(), 2);
    assert_eq!(client.remaining_credits(), 400 - 4 - 1);
}

// ---------------------------------------------------------------------------
// Own states & authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_own_states() {
    let mock = mock().await;
    let client = authenticated_client_for(&mock);

    let response = client.get_own_states(None).await.expect("own states");
    assert_eq!(response.len(), 4);
    assert_eq!(client.remaining_credits(), 4000);
    assert_eq!(mock.requests()[0].path, STATES_OWN);
}

#[tokio::test]
async fn test_unavailable_own_states() {
    let mock = mock().await;
    mock.respond(STATES_OWN, MockResponse::json(fixtures::UNAVAILABLE_STATES));
    let client = authenticated_client_for(&mock);

    let response = client.get_own_states(Some(1683488744)).await.expect("own states");
    assert!(response.is_empty());
    assert_eq!(
        mock.requests()[0].query.as_deref(),
        Some("time=1683488744")
    );
}

#[tokio::test]
async fn test_unauthenticated_own_states() {
    let mock = mock().await;
    let client = client_for(&mock);

    let err = client.get_own_states(None).await.unwrap_err();
    assert!(err.is_authentication());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_auth_header() {
    let mock = mock().await;
    let client = authenticated_client_for(&mock);

    client.get_all_states().await.expect("states");
    let request = &mock.requests()[0];
    assert_eq!(request.authorization.as_deref(), Some("Basic dGVzdDp0ZXN0"));
    assert_eq!(request.username.as_deref(), Some("test"));
}

#[tokio::test]
async fn test_no_auth_header_without_credentials() {
    let mock = mock().await;
    let client = client_for(&mock);

    client.get_all_states().await.expect("states");
    let request = &mock.requests()[0];
    assert_eq!(request.authorization, None);
    assert!(request
        .user_agent
        .as_deref()
        .is_some_and(|ua| ua.starts_with("opensky-sdk/")));
}

#[tokio::test]
async fn test_authenticate() {
    let mock = mock().await;
    let mut client = client_for(&mock);
    assert_eq!(client.credits().budget(), 400);

    client
        .authenticate(Credentials::new("test", "test"), false)
        .await
        .expect("authenticate");
    assert!(client.is_authenticated());
    assert!(!client.is_contributing_user());
    assert_eq!(client.credits().budget(), 4000);
    assert_eq!(client.remaining_credits(), 4000 - 1);

    client
        .authenticate(Credentials::new("test", "test"), true)
        .await
        .expect("authenticate");
    assert!(client.is_contributing_user());
    assert_eq!(client.credits().budget(), 8000);

    let probe = &mock.requests()[0];
    assert_eq!(probe.username.as_deref(), Some("test"));
    assert_eq!(
        probe.query.as_deref(),
        Some("lamin=0&lamax=1&lomin=0&lomax=1")
    );
}

#[tokio::test]
async fn test_authenticate_rejected() {
    let mock = mock().await;
    mock.respond(STATES_ALL, MockResponse::status(401));
    let mut client = client_for(&mock);

    let err = client
        .authenticate(Credentials::new("test", "wrong"), false)
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert!(!client.is_authenticated());
    assert_eq!(client.credits().budget(), 400);
}

#[tokio::test]
async fn test_authenticate_rejected_resets_contributing_user() {
    let mock = mock().await;
    let mut client = OpenSky::builder()
        .api_url(mock.api_url())
        .credentials(Credentials::new("test", "test"))
        .contributing_user(true)
        .build()
        .unwrap();
    assert!(client.is_contributing_user());
    assert_eq!(client.credits().budget(), 8000);

    mock.respond(STATES_ALL, MockResponse::status(401));
    let err = client
        .authenticate(Credentials::new("test", "wrong"), true)
        .await
        .unwrap_err();
    assert!(err.is_authentication());
    assert!(!client.is_authenticated());
    assert!(!client.is_contributing_user());
    assert_eq!(client.credits().budget(), 400);
    assert_eq!(client.remaining_credits(), 400);
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unauthorized_and_forbidden() {
    for status in [401, 403] {
        let mock = mock().await;
        mock.respond(STATES_ALL, MockResponse::status(status));
        let client = authenticated_client_for(&mock);

        let err = client.get_all_states().await.unwrap_err();
        assert!(err.is_authentication(), "{status} mapped to {err:?}");
    }
}

#[tokio::test]
async fn test_too_many_requests() {
    let mock = mock().await;
    mock.respond(
        STATES_ALL,
        MockResponse::status(429).with_header("X-Rate-Limit-Retry-After-Seconds", "120"),
    );
    let client = client_for(&mock);

    let err = client.get_all_states().await.unwrap_err();
    match err {
        OpenSkyError::TooManyRequests { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(120)));
        }
        other => panic!("expected TooManyRequests, got {other:?}"),
    }
    assert_eq!(client.remaining_credits(), 400);
}

#[tokio::test]
async fn test_other_status_is_generic() {
    for status in [400, 404, 500, 503] {
        let mock = mock().await;
        mock.respond(STATES_ALL, MockResponse::status(status));
        let client = client_for(&mock);

        let err = client.get_all_states().await.unwrap_err();
        assert!(
            matches!(err, OpenSkyError::Status { status: s, .. } if s.as_u16() == status),
            "{status} mapped to {err:?}"
        );
    }
}

#[tokio::test]
async fn test_unexpected_server_response() {
    let mock = mock().await;
    mock.respond(STATES_ALL, MockResponse::text("Yes"));
    let client = client_for(&mock);

    let err = client.get_all_states().await.unwrap_err();
    match err {
        OpenSkyError::UnexpectedResponse { content_type, body } => {
            assert_eq!(content_type, "text/plain");
            assert_eq!(body, "Yes");
        }
        other => panic!("expected UnexpectedResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_json() {
    let mock = mock().await;
    mock.respond(
        STATES_ALL,
        MockResponse::json(r#"{"time": 1, "states": [["abc123", null]]}"#),
    );
    let client = client_for(&mock);

    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, OpenSkyError::Decode(_)), "{err:?}");
    assert_eq!(client.remaining_credits(), 400);
}

#[tokio::test]
async fn test_unparsable_json() {
    for body in [r#"{"time": 1, "states": ["#, ""] {
        let mock = mock().await;
        mock.respond(STATES_ALL, MockResponse::json(body));
        let client = client_for(&mock);

        let err = client.get_all_states().await.unwrap_err();
        assert!(matches!(err, OpenSkyError::Decode(_)), "{body:?} mapped to {err:?}");
        assert_eq!(client.remaining_credits(), 400);
    }
}

#[tokio::test]
async fn test_timeout() {
    let mock = mock().await;
    mock.respond(
        STATES_ALL,
        MockResponse::json(fixtures::STATES).with_delay(Duration::from_secs(2)),
    );
    let client = OpenSky::builder()
        .api_url(mock.api_url())
        .request_timeout(Duration::from_millis(200))
        .build()
        .unwrap();

    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, OpenSkyError::Timeout), "{err:?}");
}

#[tokio::test]
async fn test_request_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = OpenSky::builder()
        .api_url(format!("http://127.0.0.1:{port}/api/"))
        .build()
        .unwrap();

    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, OpenSkyError::Connection(_)), "{err:?}");
}

// ---------------------------------------------------------------------------
// Session lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_new_session() {
    let mock = mock().await;
    let mut client = client_for(&mock);
    assert!(client.session().is_none());

    client.get_all_states().await.expect("states");
    let session = client.session().expect("session created").clone();
    assert!(client.owns_session());

    client.close();
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_scoped_session() {
    let mock = mock().await;
    let mut client = client_for(&mock);

    let session = {
        let sky = client.scoped().expect("scope");
        sky.get_all_states().await.expect("states");
        let session = sky.session().expect("session").clone();
        session
    };
    assert!(session.is_closed());
    assert!(client.session().is_none());
}

#[tokio::test]
async fn test_external_session_left_open() {
    let mock = mock().await;
    let external = HttpSession::new().unwrap();
    let mut client = OpenSky::builder()
        .api_url(mock.api_url())
        .session(external.clone())
        .build()
        .unwrap();

    {
        let sky = client.scoped().expect("scope");
        sky.get_all_states().await.expect("states");
    }
    assert!(!external.is_closed());

    let other = OpenSky::builder()
        .api_url(mock.api_url())
        .session(external)
        .build()
        .unwrap();
    other.get_all_states().await.expect("session still usable");
}

#[tokio::test]
async fn test_closed_external_session() {
    let mock = mock().await;
    let external = HttpSession::new().unwrap();
    let client = OpenSky::builder()
        .api_url(mock.api_url())
        .session(external.clone())
        .build()
        .unwrap();

    external.close();
    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, OpenSkyError::SessionClosed));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_owned_session_closed_through_clone() {
    let mock = mock().await;
    let mut client = client_for(&mock);

    client.get_all_states().await.expect("states");
    client.session().expect("session").clone().close();

    let err = client.get_all_states().await.unwrap_err();
    assert!(matches!(err, OpenSkyError::SessionClosed));
    assert_eq!(mock.requests().len(), 1);

    client.close();
    client.get_all_states().await.expect("fresh session after close");
    assert!(!client.session().expect("session").is_closed());
    assert_eq!(mock.requests().len(), 2);
}
