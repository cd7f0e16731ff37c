//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every section is optional; missing fields take their defaults.

use serde::{Deserialize, Serialize};

use crate::forwarded::{Ordered, StrategyKind};

/// Root configuration for the echo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct EchoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Which headers to trust, and how to record the result.
    pub forwarded: ForwardedConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
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

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Forwarding header extraction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForwardedConfig {
    /// Extractors to try, highest priority first.
    pub strategy: Vec<StrategyKind>,

    /// Keep the case of `Forwarded` values instead of lower-casing them.
    pub preserve_case: bool,

    /// Record an empty remote address when no `for` value is found,
    /// instead of keeping the connection's peer address.
    pub overwrite_empty: bool,
}

impl ForwardedConfig {
    /// Build the configured composition.
    pub fn extractor(&self) -> Ordered {
        Ordered::from_kinds(&self.strategy, self.preserve_case)
    }
}

impl Default for ForwardedConfig {
    fn default() -> Self {
        Self {
            strategy: vec![StrategyKind::Standard, StrategyKind::Legacy],
            preserve_case: false,
            overwrite_empty: false,
        }
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
