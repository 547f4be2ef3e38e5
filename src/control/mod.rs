use crate::config::ControlConfig;
use crate::errors::LightsOutError;
use crate::model::DiscoveredController;
use async_trait::async_trait;
use reqwest::RequestBuilder;

pub mod raw;
pub mod rest;
pub mod vendor;
pub mod zones;

/// HTTP status codes accepted as command success
pub const SUCCESS_STATUSES: &[u16] = &[200, 201, 202];

/// Shared state handed to every strategy invocation: the HTTP client
/// and the operator-supplied configuration. Raw strategies open their
/// own scoped sockets; nothing here is reused across strategies.
pub struct ControlContext {
    pub http: reqwest::Client,
    pub config: ControlConfig,
}

impl ControlContext {
    pub fn new(config: ControlConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Apply the per-request timeout and optional Basic auth
    pub(crate) fn prepare(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.timeout(self.config.http_timeout());
        match &self.config.credentials {
            Some(creds) => request.basic_auth(&creds.username, Some(&creds.password)),
            None => request,
        }
    }
}

/// One concrete way to attempt an "off" command against a controller.
///
/// Strategies are statically ordered per control family; the dispatcher
/// iterates them in that fixed order and treats the first `Ok(())` as
/// final. An `Err` advances the chain; the same strategy is never
/// re-attempted.
#[async_trait]
pub trait ControlStrategy: Send + Sync {
    /// Stable id recorded in attempt logs and results
    fn id(&self) -> &'static str;

    async fn execute(
        &self,
        ctx: &ControlContext,
        controller: &DiscoveredController,
    ) -> Result<(), LightsOutError>;
}

/// Shorthand for the strategy-failed error variant
pub(crate) fn strategy_failed(strategy: &str, reason: impl Into<String>) -> LightsOutError {
    LightsOutError::StrategyFailed {
        strategy: strategy.to_string(),
        reason: reason.into(),
    }
}
