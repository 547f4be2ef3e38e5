use crate::model::{ControlFamily, ProtocolSpec, Transport};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Static catalog of building-automation protocols and their
/// conventional ports. Loaded once and injected into the discovery
/// engine; never consulted as ambient state.
pub static BUILDING_CATALOG: &[ProtocolSpec] = &[
    ProtocolSpec {
        name: "modbus",
        port: 502,
        transport: Transport::Tcp,
        family: ControlFamily::Modbus,
    },
    ProtocolSpec {
        name: "knx",
        port: 3671,
        transport: Transport::Udp,
        family: ControlFamily::Knx,
    },
    ProtocolSpec {
        name: "knx-alt",
        port: 3672,
        transport: Transport::Udp,
        family: ControlFamily::Knx,
    },
    ProtocolSpec {
        name: "bacnet",
        port: 47808,
        transport: Transport::Udp,
        family: ControlFamily::Bacnet,
    },
    ProtocolSpec {
        name: "dali",
        port: 50000,
        transport: Transport::Tcp,
        family: ControlFamily::Generic,
    },
    ProtocolSpec {
        name: "opcua",
        port: 4840,
        transport: Transport::Tcp,
        family: ControlFamily::Generic,
    },
    ProtocolSpec {
        name: "lonworks",
        port: 1628,
        transport: Transport::Tcp,
        family: ControlFamily::Generic,
    },
    ProtocolSpec {
        name: "mqtt",
        port: 1883,
        transport: Transport::Tcp,
        family: ControlFamily::Mqtt,
    },
    ProtocolSpec {
        name: "rest-api",
        port: 80,
        transport: Transport::Http,
        family: ControlFamily::Rest,
    },
    ProtocolSpec {
        name: "rest-api-alt",
        port: 8080,
        transport: Transport::Http,
        family: ControlFamily::Rest,
    },
];

/// Vendor smart-device catalog, used only by the flat port-scan path.
/// The flat scan probes every port here with a TCP connect regardless
/// of the listed transport; the transport describes how the device is
/// subsequently commanded.
pub static DEVICE_CATALOG: &[ProtocolSpec] = &[
    ProtocolSpec {
        name: "philips-hue",
        port: 80,
        transport: Transport::Http,
        family: ControlFamily::Hue,
    },
    ProtocolSpec {
        name: "tplink",
        port: 9999,
        transport: Transport::Tcp,
        family: ControlFamily::TpLink,
    },
    ProtocolSpec {
        name: "lifx",
        port: 56700,
        transport: Transport::Udp,
        family: ControlFamily::Lifx,
    },
    ProtocolSpec {
        name: "home-assistant",
        port: 8123,
        transport: Transport::Http,
        family: ControlFamily::HomeAssistant,
    },
    ProtocolSpec {
        name: "tuya",
        port: 6668,
        transport: Transport::Tcp,
        family: ControlFamily::Tuya,
    },
    ProtocolSpec {
        name: "yeelight",
        port: 55443,
        transport: Transport::Tcp,
        family: ControlFamily::Yeelight,
    },
    ProtocolSpec {
        name: "wiz",
        port: 38899,
        transport: Transport::Udp,
        family: ControlFamily::Wiz,
    },
];

static DEVICE_PORT_INDEX: Lazy<HashMap<u16, &'static ProtocolSpec>> =
    Lazy::new(|| DEVICE_CATALOG.iter().map(|s| (s.port, s)).collect());

/// Map an open port from a flat scan to a vendor device family.
/// Pure lookup; `None` means the port is not a known device port.
pub fn classify_device_port(port: u16) -> Option<ControlFamily> {
    DEVICE_PORT_INDEX.get(&port).map(|s| s.family)
}

/// Full catalog entry for a vendor device port
pub fn device_spec_for_port(port: u16) -> Option<&'static ProtocolSpec> {
    DEVICE_PORT_INDEX.get(&port).copied()
}

/// System status endpoints used by the HTTP reachability probe
pub const STATUS_PATHS: &[&str] = &["/api/status", "/status", "/system/status", "/bms/status"];

/// Well-known REST paths whose existence marks an HTTP lighting API.
/// Used by endpoint-existence discovery.
pub const REST_PROBE_PATHS: &[&str] = &[
    "/api/v1/lights",
    "/api/lights",
    "/rest/lighting",
    "/bms/api/control",
    "/lighting/zones",
    "/api/lighting",
];

/// Bulk all-off REST endpoints, tried in order. `true` means POST.
pub const REST_ALL_OFF_PATHS: &[(&str, bool)] = &[
    ("/api/lighting/all/off", true),
    ("/bms/lighting/off", true),
    ("/api/control/lighting/off", true),
    ("/lighting/off", true),
    ("/cmd/lightsoff", false),
];

/// Legacy CGI command candidates (GET)
pub const CGI_ALL_OFF_PATHS: &[&str] = &[
    "/lightoff.cgi?all=1",
    "/control.cgi?cmd=lightsoff",
    "/cmd.cgi?light=off",
    "/api.cgi?action=lightoff",
    "/switch.cgi?all=off",
];

/// Zone-listing endpoints, tried in order
pub const ZONE_LIST_PATHS: &[&str] = &[
    "/api/lighting/zones",
    "/bms/lighting",
    "/zones",
    "/api/zones",
    "/lighting",
];

/// Per-zone off endpoints; `{}` is replaced with the zone id
pub const ZONE_OFF_PATHS: &[&str] = &[
    "/api/lighting/zones/{}/off",
    "/bms/lighting/zone/{}/off",
    "/api/control/zone/{}",
    "/zone/{}/off",
];

/// SOAP endpoint and envelope for the TurnOffAllLights action
pub const SOAP_ENDPOINT: &str = "/WebService.asmx";

pub const SOAP_ALL_OFF_BODY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/">
    <soap:Body>
        <TurnOffAllLights xmlns="http://tempuri.org/"/>
    </soap:Body>
</soap:Envelope>"#;

// Raw best-effort command frames. These are opaque byte payloads, not
// validated against any protocol specification; transport-level send
// completion is the only success signal observed for them.

/// Modbus TCP write-single-coil broadcast frame (port 502)
pub const MODBUS_WRITE_COIL: &[u8] = &[
    0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x01, 0x05, 0x00, 0x00, 0xFF, 0x00,
];

/// KNXnet/IP group-write datagram (port 3671)
pub const KNX_GROUP_WRITE: &[u8] = &[
    0x06, 0x10, 0x02, 0x05, 0x00, 0x14, 0x08, 0x01, 0xc0, 0xa8, 0x01, 0x64, 0x04, 0xd2, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// BACnet/IP write-property datagram (port 47808)
pub const BACNET_WRITE_PROPERTY: &[u8] = &[
    0x81, 0x0b, 0x00, 0x0c, 0x01, 0x20, 0xff, 0xff, 0x00, 0xff, 0x10, 0x08, 0x0c, 0x02, 0x3e,
    0x00, 0x00, 0x00, 0x3f,
];

/// MQTT connect frame carrying the building/lighting/all/off topic (port 1883)
pub const MQTT_PUBLISH: &[u8] = &[
    0x10, 0x26, 0x00, 0x04, 0x4d, 0x51, 0x54, 0x54, 0x04, 0x02, 0x00, 0x3c, 0x00, 0x1a, 0x62,
    0x75, 0x69, 0x6c, 0x64, 0x69, 0x6e, 0x67, 0x2f, 0x6c, 0x69, 0x67, 0x68, 0x74, 0x69, 0x6e,
    0x67, 0x2f, 0x61, 0x6c, 0x6c, 0x2f, 0x6f, 0x66, 0x66,
];
