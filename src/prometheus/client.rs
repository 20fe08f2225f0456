//! Prometheus HTTP API client
//!
//! One `PrometheusClient` is constructed at startup from the immutable
//! configuration and shared across all tool invocations. It holds no
//! per-call state, so concurrent use needs no locking.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, header};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ParamValue, Params};
use crate::config::PrometheusConfig;
use crate::{Error, Result};

/// Client for a Prometheus-compatible HTTP API with range/sample guarding
pub struct PrometheusClient {
    /// HTTP client (carries timeout and the pre-built auth header)
    http: Client,
    /// Validated base URL
    base_url: Url,
    /// Maximum allowed `query_range` window in days
    max_range_days: u32,
    /// Maximum allowed computed sample count
    max_samples: u64,
}

impl PrometheusClient {
    /// Create a new client from configuration.
    ///
    /// The authentication header is resolved here, once: a bearer token
    /// takes precedence over basic credentials; neither means no header.
    pub fn new(config: &PrometheusConfig) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid Prometheus URL: {e}")))?;

        let mut headers = header::HeaderMap::new();
        if let Some(value) = auth_header(config) {
            let mut value = header::HeaderValue::from_str(&value)
                .map_err(|e| Error::Config(format!("Invalid credential bytes: {e}")))?;
            value.set_sensitive(true);
            headers.insert(header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            max_range_days: config.max_range_days,
            max_samples: config.max_samples,
        })
    }

    /// Generic GET wrapper with limit validation.
    ///
    /// Range-query calls are validated locally before any network traffic;
    /// a violation returns `RangeTooLarge` or `TooManySamples` and the
    /// backend is never contacted. Exactly one attempt is made; transport
    /// failures and non-2xx statuses map to `BackendUnavailable`.
    pub async fn get(&self, path: &str, params: &Params) -> Result<Value> {
        self.enforce_limits(path, params)?;

        let url = self.endpoint(path)?;
        debug!(%url, "GET");

        let response = self
            .http
            .get(url)
            .query(&params.to_query())
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    /// Resolve a logical API path against the base URL, preserving any
    /// path prefix the base URL carries.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| Error::Internal(format!("Invalid request URL: {e}")))
    }

    /// Reject range queries whose window or sample count exceeds the
    /// configured limits. Applies only to the range-query endpoint; calls
    /// missing any of `start`/`end`/`step` are left for the backend to
    /// reject.
    fn enforce_limits(&self, path: &str, params: &Params) -> Result<()> {
        if !path.ends_with("/query_range") {
            return Ok(());
        }

        let scalar = |key| params.get(key).and_then(ParamValue::to_text);
        let (Some(start), Some(end), Some(step)) =
            (scalar("start"), scalar("end"), scalar("step"))
        else {
            return Ok(());
        };

        let (Some(start), Some(end)) = (parse_time(&start), parse_time(&end)) else {
            // Unparseable timestamps are the backend's problem to reject.
            return Ok(());
        };

        let range_days = (end - start).num_days();
        if range_days > i64::from(self.max_range_days) {
            return Err(Error::RangeTooLarge {
                limit_days: self.max_range_days,
            });
        }

        // Only a plain number of seconds triggers the sample check;
        // duration shorthand like "30s" skips it.
        if let Ok(step_secs) = step.parse::<f64>() {
            #[allow(clippy::cast_precision_loss)]
            let span_secs = (end - start).num_milliseconds() as f64 / 1000.0;
            #[allow(clippy::cast_precision_loss)]
            let ceiling = self.max_samples as f64;
            let samples = (span_secs / step_secs).ceil();
            if samples > ceiling {
                return Err(Error::TooManySamples {
                    limit: self.max_samples,
                });
            }
        }

        Ok(())
    }
}

/// Authorization header value as a pure function of configuration
fn auth_header(config: &PrometheusConfig) -> Option<String> {
    if let Some(token) = config.resolve_bearer_token() {
        return Some(format!("Bearer {token}"));
    }

    match (config.resolve_username(), config.resolve_password()) {
        (Some(username), Some(password)) => {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{username}:{password}"));
            Some(format!("Basic {encoded}"))
        }
        _ => None,
    }
}

/// Parse an RFC3339 timestamp or a Unix-seconds number (integer or float)
fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let secs = value.parse::<f64>().ok()?;
    #[allow(clippy::cast_possible_truncation)]
    let millis = (secs * 1000.0) as i64;
    DateTime::from_timestamp_millis(millis)
}

/// Build the label-values path for a label name, percent-encoding the name
/// as a single path segment.
#[must_use]
pub fn label_values_path(name: &str) -> String {
    format!(
        "/api/v1/label/{}/values",
        utf8_percent_encode(name, PATH_SEGMENT)
    )
}

/// Characters escaped when a label name is embedded as a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'%')
    .add(b'/')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'\\')
    .add(b'^')
    .add(b'|');
