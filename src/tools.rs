//! Prometheus tool definitions and handlers
//!
//! Each handler maps one tool to one gateway call: forward present fields,
//! omit absent ones. The only shaping beyond that is the configured default
//! `limit` and the repeated `match[]` convention for selector arrays.

use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::rpc_codes;
use crate::prometheus::{Params, PrometheusClient, endpoints, label_values_path};
use crate::protocol::{Tool, ToolAnnotations};
use crate::{Error, Result};

/// All tool definitions advertised via `tools/list`
#[must_use]
pub fn definitions() -> Vec<Tool> {
    vec![
        query_tool(),
        query_range_tool(),
        series_tool(),
        labels_tool(),
        label_values_tool(),
        targets_tool(),
        metadata_tool(),
        health_tool(),
    ]
}

/// Dispatch a tool call by name, returning the text payload.
///
/// Unknown tools and malformed arguments surface as JSON-RPC errors;
/// gateway failures propagate for the dispatcher to render as an
/// `Error: <message>` tool result.
pub async fn call(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    name: &str,
    arguments: Value,
) -> Result<String> {
    match name {
        "query" => query(client, default_limit, arguments).await,
        "query_range" => query_range(client, default_limit, arguments).await,
        "series" => series(client, default_limit, arguments).await,
        "labels" => labels(client, default_limit, arguments).await,
        "label_values" => label_values(client, default_limit, arguments).await,
        "targets" => targets(client, arguments).await,
        "metadata" => metadata(client, default_limit, arguments).await,
        "health" => Ok("ok".to_string()),
        _ => Err(Error::json_rpc(
            rpc_codes::INVALID_PARAMS,
            format!("Unknown tool: {name}"),
        )),
    }
}

/// Deserialize tool arguments, mapping failures to invalid-params
fn parse_args<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::json_rpc(rpc_codes::INVALID_PARAMS, format!("Invalid arguments: {e}")))
}

/// Issue the gateway call and serialize the response body
async fn fetch(client: &PrometheusClient, path: &str, params: &Params) -> Result<String> {
    let data = client.get(path, params).await?;
    Ok(data.to_string())
}

// ============================================================================
// query
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryArgs {
    query: String,
    time: Option<String>,
    timeout: Option<String>,
    limit: Option<u64>,
}

async fn query(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: QueryArgs = parse_args(arguments)?;
    let params = Params::new()
        .str("query", args.query)
        .str_opt("time", args.time.as_deref())
        .str_opt("timeout", args.timeout.as_deref())
        .int_opt("limit", args.limit.or(default_limit));
    fetch(client, endpoints::QUERY, &params).await
}

fn query_tool() -> Tool {
    Tool {
        name: "query".to_string(),
        title: None,
        description: Some("Evaluate an instant PromQL query".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "PromQL expression string to evaluate"
                },
                "time": {
                    "type": "string",
                    "description": "Evaluation timestamp (RFC3339 or unix epoch)"
                },
                "timeout": {
                    "type": "string",
                    "description": "Evaluation timeout (duration format, e.g. 30s)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of returned series (0 = disabled)"
                }
            },
            "required": ["query"]
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// query_range
// ============================================================================

#[derive(Debug, Deserialize)]
struct QueryRangeArgs {
    query: String,
    start: String,
    end: String,
    step: String,
    timeout: Option<String>,
    limit: Option<u64>,
}

async fn query_range(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: QueryRangeArgs = parse_args(arguments)?;
    let params = Params::new()
        .str("query", args.query)
        .str("start", args.start)
        .str("end", args.end)
        .str("step", args.step)
        .str_opt("timeout", args.timeout.as_deref())
        .int_opt("limit", args.limit.or(default_limit));
    fetch(client, endpoints::QUERY_RANGE, &params).await
}

fn query_range_tool() -> Tool {
    Tool {
        name: "query_range".to_string(),
        title: None,
        description: Some("Evaluate a PromQL query over a time range".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "PromQL expression to execute over the range"
                },
                "start": {
                    "type": "string",
                    "description": "Range start time (RFC3339 or unix epoch)"
                },
                "end": {
                    "type": "string",
                    "description": "Range end time (RFC3339 or unix epoch)"
                },
                "step": {
                    "type": "string",
                    "description": "Query resolution step width (duration, e.g. 30s, or number of seconds)"
                },
                "timeout": {
                    "type": "string",
                    "description": "Maximum evaluation time before the query is aborted"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of returned series (0 = disabled)"
                }
            },
            "required": ["query", "start", "end", "step"]
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// series
// ============================================================================

#[derive(Debug, Deserialize)]
struct SeriesArgs {
    #[serde(rename = "match")]
    matchers: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    limit: Option<u64>,
}

async fn series(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: SeriesArgs = parse_args(arguments)?;
    if args.matchers.is_empty() {
        return Err(Error::json_rpc(
            rpc_codes::INVALID_PARAMS,
            "series requires at least one match selector",
        ));
    }
    let params = Params::new()
        .str_opt("start", args.start.as_deref())
        .str_opt("end", args.end.as_deref())
        .int_opt("limit", args.limit.or(default_limit))
        .seq("match", args.matchers);
    fetch(client, endpoints::SERIES, &params).await
}

fn series_tool() -> Tool {
    Tool {
        name: "series".to_string(),
        title: None,
        description: Some("Find series matching one or more selectors".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "match": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1,
                    "description": "One or more series selectors (e.g. up, {job=\"api\"})"
                },
                "start": {
                    "type": "string",
                    "description": "Optional range start time (RFC3339 or unix epoch)"
                },
                "end": {
                    "type": "string",
                    "description": "Optional range end time (RFC3339 or unix epoch)"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of series to return"
                }
            },
            "required": ["match"]
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// labels
// ============================================================================

#[derive(Debug, Deserialize)]
struct LabelsArgs {
    start: Option<String>,
    end: Option<String>,
    #[serde(rename = "match")]
    matchers: Option<Vec<String>>,
    limit: Option<u64>,
}

async fn labels(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: LabelsArgs = parse_args(arguments)?;
    let params = Params::new()
        .str_opt("start", args.start.as_deref())
        .str_opt("end", args.end.as_deref())
        .int_opt("limit", args.limit.or(default_limit))
        .seq_opt("match", args.matchers);
    fetch(client, endpoints::LABELS, &params).await
}

fn labels_tool() -> Tool {
    Tool {
        name: "labels".to_string(),
        title: None,
        description: Some("List label names".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "start": {
                    "type": "string",
                    "description": "Optional range start time used to filter labels"
                },
                "end": {
                    "type": "string",
                    "description": "Optional range end time used to filter labels"
                },
                "match": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Series selectors used to filter labels"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of label names to return"
                }
            }
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// label_values
// ============================================================================

#[derive(Debug, Deserialize)]
struct LabelValuesArgs {
    name: String,
    start: Option<String>,
    end: Option<String>,
    #[serde(rename = "match")]
    matchers: Option<Vec<String>>,
    limit: Option<u64>,
}

async fn label_values(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: LabelValuesArgs = parse_args(arguments)?;
    let params = Params::new()
        .str_opt("start", args.start.as_deref())
        .str_opt("end", args.end.as_deref())
        .int_opt("limit", args.limit.or(default_limit))
        .seq_opt("match", args.matchers);
    fetch(client, &label_values_path(&args.name), &params).await
}

fn label_values_tool() -> Tool {
    Tool {
        name: "label_values".to_string(),
        title: None,
        description: Some("List values for a label name".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Label name to fetch values for"
                },
                "start": {
                    "type": "string",
                    "description": "Optional range start time used to filter values"
                },
                "end": {
                    "type": "string",
                    "description": "Optional range end time used to filter values"
                },
                "match": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Series selectors used to filter label values"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of values to return"
                }
            },
            "required": ["name"]
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// targets
// ============================================================================

/// Scrape target state filter
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum TargetState {
    Active,
    Dropped,
    Any,
}

impl TargetState {
    fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dropped => "dropped",
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Deserialize)]
struct TargetsArgs {
    state: Option<TargetState>,
    #[serde(rename = "scrapePool")]
    scrape_pool: Option<String>,
}

async fn targets(client: &PrometheusClient, arguments: Value) -> Result<String> {
    let args: TargetsArgs = parse_args(arguments)?;
    let params = Params::new()
        .str_opt("state", args.state.map(TargetState::as_str))
        .str_opt("scrapePool", args.scrape_pool.as_deref());
    fetch(client, endpoints::TARGETS, &params).await
}

fn targets_tool() -> Tool {
    Tool {
        name: "targets".to_string(),
        title: None,
        description: Some("List scrape targets and their discovery state".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "state": {
                    "type": "string",
                    "enum": ["active", "dropped", "any"],
                    "description": "Filter by target state"
                },
                "scrapePool": {
                    "type": "string",
                    "description": "Filter by scrape pool name"
                }
            }
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// metadata
// ============================================================================

#[derive(Debug, Deserialize)]
struct MetadataArgs {
    metric: Option<String>,
    limit: Option<u64>,
    limit_per_metric: Option<u64>,
}

async fn metadata(
    client: &PrometheusClient,
    default_limit: Option<u64>,
    arguments: Value,
) -> Result<String> {
    let args: MetadataArgs = parse_args(arguments)?;
    let params = Params::new()
        .str_opt("metric", args.metric.as_deref())
        .int_opt("limit", args.limit.or(default_limit))
        .int_opt("limit_per_metric", args.limit_per_metric);
    fetch(client, endpoints::METADATA, &params).await
}

fn metadata_tool() -> Tool {
    Tool {
        name: "metadata".to_string(),
        title: None,
        description: Some("Retrieve metric metadata".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "metric": {
                    "type": "string",
                    "description": "Metric name to retrieve metadata for"
                },
                "limit": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum number of metrics to return"
                },
                "limit_per_metric": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Maximum metadata objects per metric"
                }
            }
        }),
        annotations: read_only(),
    }
}

// ============================================================================
// health
// ============================================================================

fn health_tool() -> Tool {
    Tool {
        name: "health".to_string(),
        title: None,
        description: Some("Server liveness check".to_string()),
        input_schema: json!({ "type": "object", "properties": {} }),
        annotations: read_only(),
    }
}

fn read_only() -> Option<ToolAnnotations> {
    Some(ToolAnnotations {
        title: None,
        read_only_hint: Some(true),
        open_world_hint: Some(true),
    })
}
