//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

use crate::http::request::ACCEPT_VERSION;

/// Root configuration for the version router service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Version extraction and route-set policy.
    pub version: VersionConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Versioned routes, in registration order.
    pub routes: Vec<RouteConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VersionConfig {
    /// Request header carrying the version token.
    pub header: String,

    /// Reject duplicate defaults and unparseable constraints at startup.
    /// When off, the first default route silently wins.
    pub strict: bool,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            header: ACCEPT_VERSION.to_string(),
            strict: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One versioned route serving a static JSON response.
///
/// Routes sharing a `path` form one version router; their relative order in
/// the file is their registration order.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging.
    #[serde(default)]
    pub name: Option<String>,

    /// Path the route is mounted on.
    #[serde(default = "default_path")]
    pub path: String,

    /// Version constraint expression.
    pub version: String,

    /// Fallback for unversioned or unmatched requests.
    #[serde(default)]
    pub default: bool,

    /// Response status code.
    #[serde(default = "default_status")]
    pub status: u16,

    /// Response body.
    #[serde(default)]
    pub body: serde_json::Value,
}

fn default_path() -> String {
    "/".to_string()
}

fn default_status() -> u16 {
    200
}
