use serde::Serialize;
use std::fmt;

/// A network address (IP or hostname) supplied by the operator.
/// Immutable once enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Target(pub String);

impl Target {
    pub fn host(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transport kind for a cataloged protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Transport {
    Tcp,
    Udp,
    Http,
}

/// The set of control strategies applicable to a discovered controller.
/// Used as the lookup key for the dispatch chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlFamily {
    /// Generic REST / HTTP building-management surface
    Rest,
    Modbus,
    Knx,
    Bacnet,
    Mqtt,
    /// Protocols with no native chain (DALI, OPC UA, LonWorks);
    /// dispatched through the generic REST-then-raw chain
    Generic,
    // Vendor smart-device families, selected by the device classifier
    TpLink,
    Yeelight,
    Wiz,
    Hue,
    HomeAssistant,
    Lifx,
    Tuya,
}

impl ControlFamily {
    pub fn label(&self) -> &'static str {
        match self {
            ControlFamily::Rest => "REST",
            ControlFamily::Modbus => "Modbus",
            ControlFamily::Knx => "KNX",
            ControlFamily::Bacnet => "BACnet",
            ControlFamily::Mqtt => "MQTT",
            ControlFamily::Generic => "Generic",
            ControlFamily::TpLink => "TP-Link",
            ControlFamily::Yeelight => "Yeelight",
            ControlFamily::Wiz => "WiZ",
            ControlFamily::Hue => "Philips Hue",
            ControlFamily::HomeAssistant => "Home Assistant",
            ControlFamily::Lifx => "LIFX",
            ControlFamily::Tuya => "Tuya",
        }
    }
}

/// One entry of the static protocol catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProtocolSpec {
    pub name: &'static str,
    pub port: u16,
    pub transport: Transport,
    pub family: ControlFamily,
}

/// How a controller was discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiscoveryMethod {
    /// Transport-level probe against a cataloged protocol port
    ProtocolProbe,
    /// A known REST path answered 200
    EndpointProbe,
    /// Open vendor device port found by a flat port scan
    PortScan,
}

impl DiscoveryMethod {
    pub fn label(&self) -> &'static str {
        match self {
            DiscoveryMethod::ProtocolProbe => "protocol-probe",
            DiscoveryMethod::EndpointProbe => "endpoint-probe",
            DiscoveryMethod::PortScan => "port-scan",
        }
    }
}

/// A network endpoint believed to control building lighting.
/// Associated with exactly one protocol spec: the first whose
/// probe or endpoint check succeeded for the target.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredController {
    pub target: Target,
    pub spec: ProtocolSpec,
    pub method: DiscoveryMethod,
}

impl DiscoveredController {
    /// Base URL for HTTP strategies. Controllers discovered over a
    /// non-HTTP transport fall back to the conventional web port.
    pub fn http_base(&self) -> String {
        let port = match self.spec.transport {
            Transport::Http => self.spec.port,
            _ => 80,
        };
        format!("http://{}:{}", self.target, port)
    }
}

/// A lighting sub-zone exposed by a controller. Discovered transiently
/// per dispatch attempt, never persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub id: String,
    pub name: Option<String>,
}

/// Outcome of a single strategy attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

/// Record of one strategy tried during dispatch, in chain order
#[derive(Debug, Clone, Serialize)]
pub struct StrategyAttempt {
    pub strategy_id: String,
    pub outcome: AttemptOutcome,
}

/// Per-zone result of the sequential fallback sweep
#[derive(Debug, Clone, Serialize)]
pub struct ZoneOutcome {
    pub zone_id: String,
    pub success: bool,
}

/// Aggregated result of the zone-by-zone fallback
#[derive(Debug, Clone, Default, Serialize)]
pub struct ZoneSweepResult {
    pub success_count: usize,
    pub failure_count: usize,
    pub outcomes: Vec<ZoneOutcome>,
}

impl ZoneSweepResult {
    /// Partial success counts as overall success: half a building dark
    /// beats none of it.
    pub fn success(&self) -> bool {
        self.success_count > 0
    }
}

/// Final result of one dispatch invocation against one controller
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub target: Target,
    pub success: bool,
    pub strategy_id: Option<String>,
    pub attempts: Vec<StrategyAttempt>,
    pub zone_sweep: Option<ZoneSweepResult>,
    pub error_summary: Option<String>,
}

/// Structured top-level summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub controllers_found: usize,
    pub commands_succeeded: usize,
    pub commands_failed: usize,
    pub unmatched_targets: Vec<Target>,
    pub results: Vec<CommandResult>,
}
