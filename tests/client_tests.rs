//! Gateway tests against an in-process mock Prometheus backend
//!
//! The mock records every request it sees, so these tests can assert both
//! what reaches the wire and - for the validation cases - that nothing does.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{RawQuery, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use mcp_prometheus::Error;
use mcp_prometheus::config::PrometheusConfig;
use mcp_prometheus::prometheus::{Params, PrometheusClient, endpoints};

/// What the mock backend observed
#[derive(Default)]
struct Recorded {
    hits: AtomicUsize,
    last_query: Mutex<Option<String>>,
    last_auth: Mutex<Option<String>>,
}

impl Recorded {
    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        let raw = self.last_query.lock().unwrap().clone().unwrap_or_default();
        serde_urlencoded::from_str(&raw).unwrap()
    }

    fn auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct MockState {
    recorded: Arc<Recorded>,
    body: Arc<Value>,
    status: StatusCode,
}

async fn mock_handler(
    State(state): State<MockState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.recorded.hits.fetch_add(1, Ordering::SeqCst);
    *state.recorded.last_query.lock().unwrap() = query;
    *state.recorded.last_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    (state.status, Json((*state.body).clone()))
}

/// Spawn a mock backend; returns its base URL and the request log
async fn spawn_backend(body: Value, status: StatusCode) -> (String, Arc<Recorded>) {
    let recorded = Arc::new(Recorded::default());
    let state = MockState {
        recorded: Arc::clone(&recorded),
        body: Arc::new(body),
        status,
    };

    let app = Router::new()
        .route("/{*path}", get(mock_handler))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), recorded)
}

fn client_config(url: &str) -> PrometheusConfig {
    PrometheusConfig {
        url: url.to_string(),
        timeout: Duration::from_secs(5),
        ..PrometheusConfig::default()
    }
}

fn client_for(url: &str, max_range_days: u32, max_samples: u64) -> PrometheusClient {
    let config = PrometheusConfig {
        max_range_days,
        max_samples,
        ..client_config(url)
    };
    PrometheusClient::new(&config).unwrap()
}

fn range_params(start: &str, end: &str, step: &str) -> Params {
    Params::new()
        .str("query", "up")
        .str("start", start)
        .str("end", end)
        .str("step", step)
}

#[tokio::test]
async fn forwards_query_requests_and_returns_body_verbatim() {
    let (url, recorded) = spawn_backend(json!({"status": "success", "data": {}}), StatusCode::OK).await;
    let client = client_for(&url, 31, 110_000);

    let body = client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap();

    assert_eq!(body, json!({"status": "success", "data": {}}));
    assert_eq!(recorded.hits(), 1);
    assert_eq!(
        recorded.query_pairs(),
        vec![("query".to_string(), "up".to_string())]
    );
}

#[tokio::test]
async fn range_over_day_limit_fails_without_network_call() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 31, 110_000);

    // 64 days
    let params = range_params("2020-01-01T00:00:00Z", "2020-03-05T00:00:00Z", "30");
    let err = client.get(endpoints::QUERY_RANGE, &params).await.unwrap_err();

    assert!(matches!(err, Error::RangeTooLarge { limit_days: 31 }));
    assert_eq!(recorded.hits(), 0);
}

#[tokio::test]
async fn sample_count_over_limit_fails_without_network_call() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 31, 100);

    // One hour at 1s resolution: 3600 samples
    let params = range_params("1577836800", "1577840400", "1");
    let err = client.get(endpoints::QUERY_RANGE, &params).await.unwrap_err();

    assert!(matches!(err, Error::TooManySamples { limit: 100 }));
    assert_eq!(recorded.hits(), 0);
}

#[tokio::test]
async fn in_limit_range_query_issues_exactly_one_request() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 31, 110_000);

    let params = range_params("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z", "60");
    client.get(endpoints::QUERY_RANGE, &params).await.unwrap();

    assert_eq!(recorded.hits(), 1);
    let pairs = recorded.query_pairs();
    assert!(pairs.contains(&("query".to_string(), "up".to_string())));
    assert!(pairs.contains(&("start".to_string(), "2020-01-01T00:00:00Z".to_string())));
    assert!(pairs.contains(&("end".to_string(), "2020-01-02T00:00:00Z".to_string())));
    assert!(pairs.contains(&("step".to_string(), "60".to_string())));
}

#[tokio::test]
async fn duration_shorthand_step_skips_sample_check() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    // max_samples of 1 would reject any numeric step over this range
    let client = client_for(&url, 31, 1);

    let params = range_params("2020-01-01T00:00:00Z", "2020-01-02T00:00:00Z", "30s");
    client.get(endpoints::QUERY_RANGE, &params).await.unwrap();

    assert_eq!(recorded.hits(), 1);
}

#[tokio::test]
async fn non_range_endpoints_skip_validation_entirely() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 1, 1);

    // A year of data at 1s steps would fail both checks on query_range
    let params = range_params("2020-01-01T00:00:00Z", "2021-01-01T00:00:00Z", "1");
    client.get(endpoints::QUERY, &params).await.unwrap();

    assert_eq!(recorded.hits(), 1);
}

#[tokio::test]
async fn match_arrays_serialize_as_repeated_bracket_params() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 31, 110_000);

    let params = Params::new().seq(
        "match",
        vec!["up".to_string(), "go_goroutines".to_string()],
    );
    client.get(endpoints::LABELS, &params).await.unwrap();

    let pairs = recorded.query_pairs();
    assert_eq!(
        pairs,
        vec![
            ("match[]".to_string(), "up".to_string()),
            ("match[]".to_string(), "go_goroutines".to_string()),
        ]
    );
}

#[tokio::test]
async fn absent_optional_params_never_reach_the_wire() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = client_for(&url, 31, 110_000);

    let params = Params::new()
        .str("query", "up")
        .str_opt("time", None)
        .str_opt("timeout", None)
        .int_opt("limit", None);
    client.get(endpoints::QUERY, &params).await.unwrap();

    let keys: Vec<_> = recorded.query_pairs().into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["query"]);
}

#[tokio::test]
async fn non_2xx_status_maps_to_backend_unavailable() {
    let (url, _recorded) =
        spawn_backend(json!({"status": "error"}), StatusCode::INTERNAL_SERVER_ERROR).await;
    let client = client_for(&url, 31, 110_000);

    let err = client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[tokio::test]
async fn connection_refused_maps_to_backend_unavailable() {
    // Nothing listens on the discard port
    let client = client_for("http://127.0.0.1:9", 31, 110_000);

    let err = client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::BackendUnavailable { .. }));
}

#[tokio::test]
async fn bearer_token_is_sent_as_authorization_header() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let config = PrometheusConfig {
        bearer_token: Some("s3cret".to_string()),
        ..client_config(&url)
    };
    let client = PrometheusClient::new(&config).unwrap();

    client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap();

    assert_eq!(recorded.auth().as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn bearer_token_wins_when_basic_credentials_also_configured() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let config = PrometheusConfig {
        bearer_token: Some("tok".to_string()),
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
        ..client_config(&url)
    };
    let client = PrometheusClient::new(&config).unwrap();

    client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap();

    assert_eq!(recorded.auth().as_deref(), Some("Bearer tok"));
}

#[tokio::test]
async fn basic_credentials_are_sent_when_no_bearer_token() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let config = PrometheusConfig {
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
        ..client_config(&url)
    };
    let client = PrometheusClient::new(&config).unwrap();

    client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap();

    // base64("user:pass")
    assert_eq!(recorded.auth().as_deref(), Some("Basic dXNlcjpwYXNz"));
}

#[tokio::test]
async fn no_credentials_means_no_authorization_header() {
    let (url, recorded) = spawn_backend(json!({"status": "success"}), StatusCode::OK).await;
    let client = PrometheusClient::new(&client_config(&url)).unwrap();

    client
        .get(endpoints::QUERY, &Params::new().str("query", "up"))
        .await
        .unwrap();

    assert_eq!(recorded.hits(), 1);
    assert!(recorded.auth().is_none());
}
