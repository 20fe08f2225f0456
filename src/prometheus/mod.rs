//! Prometheus HTTP API gateway

mod client;
mod params;

pub use client::{PrometheusClient, label_values_path};
pub use params::{ParamValue, Params};

/// Prometheus HTTP API paths
pub mod endpoints {
    /// Instant query
    pub const QUERY: &str = "/api/v1/query";
    /// Range query
    pub const QUERY_RANGE: &str = "/api/v1/query_range";
    /// Series matching selectors
    pub const SERIES: &str = "/api/v1/series";
    /// Label names
    pub const LABELS: &str = "/api/v1/labels";
    /// Scrape targets
    pub const TARGETS: &str = "/api/v1/targets";
    /// Metric metadata
    pub const METADATA: &str = "/api/v1/metadata";
}
