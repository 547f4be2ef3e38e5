use lightsout::catalog::{
    classify_device_port, device_spec_for_port, BUILDING_CATALOG, REST_ALL_OFF_PATHS,
};
use lightsout::{ControlFamily, Transport};

#[test]
fn classifier_maps_known_device_ports() {
    assert_eq!(classify_device_port(9999), Some(ControlFamily::TpLink));
    assert_eq!(classify_device_port(55443), Some(ControlFamily::Yeelight));
    assert_eq!(classify_device_port(38899), Some(ControlFamily::Wiz));
    assert_eq!(classify_device_port(8123), Some(ControlFamily::HomeAssistant));
    assert_eq!(classify_device_port(80), Some(ControlFamily::Hue));
    assert_eq!(classify_device_port(56700), Some(ControlFamily::Lifx));
    assert_eq!(classify_device_port(6668), Some(ControlFamily::Tuya));
}

#[test]
fn classifier_rejects_unknown_ports() {
    assert_eq!(classify_device_port(22), None);
    assert_eq!(classify_device_port(443), None);
    assert_eq!(classify_device_port(0), None);
}

#[test]
fn device_spec_matches_classifier() {
    let spec = device_spec_for_port(38899).unwrap();
    assert_eq!(spec.name, "wiz");
    assert_eq!(spec.family, ControlFamily::Wiz);
    assert_eq!(spec.transport, Transport::Udp);
}

#[test]
fn building_catalog_covers_the_conventional_ports() {
    let port_of = |name: &str| {
        BUILDING_CATALOG
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.port)
    };
    assert_eq!(port_of("modbus"), Some(502));
    assert_eq!(port_of("knx"), Some(3671));
    assert_eq!(port_of("bacnet"), Some(47808));
    assert_eq!(port_of("mqtt"), Some(1883));
    assert_eq!(port_of("opcua"), Some(4840));
    assert_eq!(port_of("lonworks"), Some(1628));
    assert_eq!(port_of("rest-api"), Some(80));
}

#[test]
fn bulk_off_chain_prefers_the_canonical_rest_path() {
    // The ordered path list is a priority; the canonical endpoint
    // must stay first.
    assert_eq!(REST_ALL_OFF_PATHS[0], ("/api/lighting/all/off", true));
}
