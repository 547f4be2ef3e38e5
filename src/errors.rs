use thiserror::Error;

/// Error types for controller discovery and command dispatch.
///
/// None of these abort a run: probe and strategy failures are converted
/// into "proceed to next candidate" signals at the point of occurrence,
/// and only show up here when a whole target or controller is exhausted.
#[derive(Error, Debug)]
pub enum LightsOutError {
    #[error("Probe unreachable: {0}")]
    ProbeUnreachable(String),

    #[error("Strategy '{strategy}' failed: {reason}")]
    StrategyFailed { strategy: String, reason: String },

    #[error("No protocol matched for target {0}")]
    DiscoveryExhausted(String),

    #[error("All strategies exhausted for {0}")]
    DispatchExhausted(String),

    #[error("Invalid target: {0}")]
    InvalidTarget(String),

    #[error("I/O Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Error: {0}")]
    Other(String),
}
