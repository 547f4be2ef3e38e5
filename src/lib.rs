//! Lights-out - building lighting discovery and shutdown tool
//!
//! This library discovers building-automation and smart-home lighting
//! controllers whose control protocol is not known in advance, and
//! issues a best-effort "all lights off" command through a prioritized
//! chain of protocol-specific strategies:
//! - Reachability probing across a catalog of well-known protocol ports
//! - Ordered command-strategy dispatch per discovered controller
//! - Zone-by-zone sequential fallback when no bulk command works
//!
//! Success everywhere means transport-level acceptance of a command,
//! never a confirmed light-state change.

pub mod catalog;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod engine;
pub mod errors;
pub mod model;
pub mod probe;

// Re-export commonly used types for convenience
pub use config::{ControlConfig, Credentials};
pub use control::{ControlContext, ControlStrategy};
pub use dispatch::{CommandDispatcher, StrategyRegistry};
pub use engine::LightsOutEngine;
pub use errors::LightsOutError;
pub use model::{
    CommandResult, ControlFamily, DiscoveredController, DiscoveryMethod, ProtocolSpec, RunSummary,
    Target, Transport, Zone, ZoneSweepResult,
};
