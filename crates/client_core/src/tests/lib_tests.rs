use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use super::*;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::{BookingReference, TableId};
use tokio::net::TcpListener;

#[derive(Clone, Copy)]
enum Reply {
    Ok,
    Status(StatusCode, &'static str),
    Garbage,
}

#[derive(Debug, Default)]
struct Recorded {
    query: HashMap<String, String>,
    content_type: Option<String>,
    body: Option<Value>,
}

#[derive(Clone)]
struct MockState {
    reply: Reply,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl MockState {
    fn record(&self, recorded: Recorded) {
        self.requests.lock().expect("requests lock").push(recorded);
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn available_tables(
    State(state): State<MockState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(Recorded {
        query,
        content_type: content_type(&headers),
        body: None,
    });
    match state.reply {
        Reply::Ok => Json(json!([
            { "id": 7, "tableNumber": 5, "capacity": 4 },
            { "id": 8, "tableNumber": 6, "capacity": 6 }
        ]))
        .into_response(),
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Garbage => "<html>maintenance</html>".into_response(),
    }
}

async fn create_booking(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record(Recorded {
        query: HashMap::new(),
        content_type: content_type(&headers),
        body: Some(body),
    });
    match state.reply {
        Reply::Ok => (StatusCode::CREATED, Json(json!({ "id": 1234, "tableId": 7 }))).into_response(),
        Reply::Status(status, body) => (status, body).into_response(),
        Reply::Garbage => "created".into_response(),
    }
}

async fn spawn_booking_server(reply: Reply) -> (String, MockState) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let state = MockState {
        reply,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/api/booking/available-tables", get(available_tables))
        .route("/api/booking", post(create_booking))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{addr}/api"), state)
}

/// An address nothing listens on.
fn unreachable_api_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

fn sample_request() -> CreateBookingRequest {
    CreateBookingRequest {
        table_id: TableId(7),
        booking_date_time: "2026-10-19T12:00:00Z".parse().expect("timestamp"),
        number_of_guests: 4,
        customer_name: "Anna Svensson".to_string(),
        phone_number: "070-123-4567".to_string(),
        email: "anna@example.se".to_string(),
        special_requests: "Window seat".to_string(),
    }
}

#[tokio::test]
async fn fetch_available_tables_sends_backend_query() {
    let (api_url, state) = spawn_booking_server(Reply::Ok).await;
    let client = BookingClient::new(api_url);

    let tables = client
        .fetch_available_tables("2026-10-19", "12:00", 4)
        .await
        .expect("tables");

    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].id, TableId(7));
    assert_eq!(tables[0].table_number, 5);
    assert_eq!(tables[1].capacity, 6);

    let requests = state.requests.lock().expect("requests");
    assert_eq!(requests.len(), 1);
    let query = &requests[0].query;
    assert_eq!(
        query.get("BookingDateTime").map(String::as_str),
        Some("2026-10-19T12:00:00.000Z")
    );
    assert_eq!(query.get("NumberOfGuests").map(String::as_str), Some("4"));
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );
}

#[tokio::test]
async fn create_booking_posts_camel_case_body() {
    let (api_url, state) = spawn_booking_server(Reply::Ok).await;
    let client = BookingClient::new(api_url);

    let created = client
        .create_booking(&sample_request())
        .await
        .expect("created");
    assert_eq!(created.id, Some(BookingReference::Number(1234)));
    assert_eq!(created.table_id, Some(TableId(7)));
    assert_eq!(created.number_of_guests, None);

    let requests = state.requests.lock().expect("requests");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].content_type.as_deref(),
        Some("application/json")
    );
    let body = requests[0].body.as_ref().expect("json body");
    assert_eq!(body["tableId"], 7);
    assert_eq!(body["numberOfGuests"], 4);
    assert_eq!(body["customerName"], "Anna Svensson");
    assert_eq!(body["phoneNumber"], "070-123-4567");
    assert_eq!(body["email"], "anna@example.se");
    assert_eq!(body["specialRequests"], "Window seat");
    assert!(body["bookingDateTime"]
        .as_str()
        .expect("timestamp string")
        .starts_with("2026-10-19T12:00:00"));
}

#[tokio::test]
async fn error_status_surfaces_status_and_body() {
    let (api_url, _state) =
        spawn_booking_server(Reply::Status(StatusCode::CONFLICT, "Table already booked")).await;
    let client = BookingClient::new(api_url);

    let err = client
        .create_booking(&sample_request())
        .await
        .expect_err("conflict");

    assert_eq!(err.status(), Some(409));
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "HTTP error 409: Table already booked");
}

#[tokio::test]
async fn problem_details_are_decoded_from_error_body() {
    let (api_url, _state) = spawn_booking_server(Reply::Status(
        StatusCode::BAD_REQUEST,
        r#"{"title":"One or more validation errors occurred.","status":400,"errors":{"NumberOfGuests":["Must be between 1 and 20."]}}"#,
    ))
    .await;
    let client = BookingClient::new(api_url);

    let err = client
        .fetch_available_tables("2026-10-19", "12:00", 4)
        .await
        .expect_err("bad request");

    let problem = err.problem().expect("problem details");
    assert_eq!(problem.status, Some(400));
    assert_eq!(
        problem.errors.get("NumberOfGuests"),
        Some(&vec!["Must be between 1 and 20.".to_string()])
    );
}

#[tokio::test]
async fn unreachable_server_is_a_connectivity_error() {
    let api_url = unreachable_api_url();
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let client = BookingClient::new(api_url.clone());

    let err = client
        .fetch_available_tables("2026-10-19", "12:00", 2)
        .await
        .expect_err("refused");

    assert!(matches!(err, GatewayError::Connectivity { .. }));
    let message = err.to_string();
    assert!(message.contains(&api_url));
    assert!(message.contains("Check that the API is running"));
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let (api_url, _state) = spawn_booking_server(Reply::Garbage).await;
    let client = BookingClient::new(api_url);

    let err = client
        .fetch_available_tables("2026-10-19", "12:00", 2)
        .await
        .expect_err("garbage");

    assert!(matches!(err, GatewayError::Decode(_)));
}

#[tokio::test]
async fn invalid_date_time_never_reaches_the_server() {
    let (api_url, state) = spawn_booking_server(Reply::Ok).await;
    let client = BookingClient::new(api_url);

    let err = client
        .fetch_available_tables("19/10/2026", "12:00", 2)
        .await
        .expect_err("invalid date");

    assert!(matches!(err, GatewayError::InvalidDateTime { .. }));
    assert!(!err.is_retryable());
    assert!(state.requests.lock().expect("requests").is_empty());
}

#[tokio::test]
async fn check_connection_reports_reachability() {
    let (api_url, state) = spawn_booking_server(Reply::Ok).await;
    assert!(BookingClient::new(api_url).check_connection().await);
    {
        let requests = state.requests.lock().expect("requests");
        assert_eq!(
            requests[0].query.get("BookingDateTime").map(String::as_str),
            Some("2024-12-15T12:00:00.000Z")
        );
        assert_eq!(
            requests[0].query.get("NumberOfGuests").map(String::as_str),
            Some("2")
        );
    }

    let (failing_url, _state) =
        spawn_booking_server(Reply::Status(StatusCode::INTERNAL_SERVER_ERROR, "down")).await;
    assert!(!BookingClient::new(failing_url).check_connection().await);

    assert!(!BookingClient::new(unreachable_api_url()).check_connection().await);
}

#[test]
fn api_url_drops_trailing_slash() {
    assert_eq!(
        BookingClient::new("http://localhost:5000/api/").api_url(),
        "http://localhost:5000/api"
    );
    assert_eq!(BookingClient::new(DEFAULT_API_URL).api_url(), DEFAULT_API_URL);
}

#[test]
fn booking_date_time_param_has_millisecond_utc_form() {
    assert_eq!(
        booking_date_time_param("2026-10-19", "18:30").expect("param"),
        "2026-10-19T18:30:00.000Z"
    );
    assert!(matches!(
        booking_date_time_param("2026-10-19", ""),
        Err(GatewayError::InvalidDateTime { .. })
    ));
}
