use std::time::Duration;

/// HTTP Basic auth credentials, supplied by the operator and never persisted
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Configuration settings for discovery and command dispatch
#[derive(Debug, Clone)]
pub struct ControlConfig {
    /// Timeout in milliseconds for a single reachability probe
    pub probe_timeout_ms: u64,

    /// Timeout in milliseconds for one command strategy attempt
    pub command_timeout_ms: u64,

    /// Timeout in milliseconds for individual HTTP requests
    pub http_timeout_ms: u64,

    /// Delay in milliseconds between sequential per-zone commands
    pub zone_delay_ms: u64,

    /// Maximum number of concurrent reachability probes
    pub max_concurrent_probes: usize,

    /// Maximum number of controllers commanded concurrently
    pub max_concurrent_dispatch: usize,

    /// Optional HTTP Basic auth applied to every HTTP call
    pub credentials: Option<Credentials>,
}

impl ControlConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn zone_delay(&self) -> Duration {
        Duration::from_millis(self.zone_delay_ms)
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            probe_timeout_ms: 2_000,
            command_timeout_ms: 5_000,
            http_timeout_ms: 5_000,
            zone_delay_ms: 500,
            max_concurrent_probes: 64,
            max_concurrent_dispatch: 5,
            credentials: None,
        }
    }
}
