use lightsout::model::DiscoveryMethod;
use lightsout::{ControlFamily, LightsOutEngine, Target};
use std::collections::HashMap;
use std::time::Instant;
use test_utils::{http_spec, ok_json, spawn_http_stub, tcp_spec, test_config};
use tokio::net::TcpListener;


fn targets(hosts: &[&str]) -> Vec<Target> {
    hosts.iter().map(|h| Target(h.to_string())).collect()
}

#[tokio::test]
async fn discovery_returns_empty_for_closed_ports_within_bound() {
    // Bind-and-drop twice to get two closed loopback ports
    let mut ports = Vec::new();
    for _ in 0..2 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        ports.push(listener.local_addr().unwrap().port());
    }

    let engine = LightsOutEngine::new(test_config()).with_catalog(vec![
        tcp_spec("modbus", ports[0], ControlFamily::Modbus),
        tcp_spec("opcua", ports[1], ControlFamily::Generic),
    ]);

    let start = Instant::now();
    let found = engine
        .discover(&targets(&["127.0.0.1", "127.0.0.2"]))
        .await;
    assert!(found.is_empty());

    // 4 probes under a 16-wide pool must take about one timeout,
    // nowhere near the serial 4x bound.
    assert!(start.elapsed().as_millis() < 2 * 300);
}

#[tokio::test]
async fn discovery_finds_a_tcp_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let engine = LightsOutEngine::new(test_config())
        .with_catalog(vec![tcp_spec("modbus", port, ControlFamily::Modbus)]);
    let found = engine.discover(&targets(&["127.0.0.1"])).await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].spec.name, "modbus");
    assert_eq!(found[0].method, DiscoveryMethod::ProtocolProbe);
}

#[tokio::test]
async fn endpoint_probe_discovers_rest_surface_without_status_page() {
    // No status endpoint, but a known REST path exists: the endpoint
    // check must still yield a controller, marked endpoint-probe.
    let stub = spawn_http_stub(HashMap::from([(
        "GET /api/lighting".to_string(),
        ok_json("{}"),
    )]))
    .await;

    let engine =
        LightsOutEngine::new(test_config()).with_catalog(vec![http_spec(stub.port())]);
    let found = engine.discover(&targets(&["127.0.0.1"])).await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].method, DiscoveryMethod::EndpointProbe);
}

#[tokio::test]
async fn duplicate_discoveries_fold_keeping_the_first_method() {
    // Both the status probe and the endpoint check succeed; the
    // (target, protocol) pair must appear once, as protocol-probe.
    let stub = spawn_http_stub(HashMap::from([
        ("GET /status".to_string(), ok_json("{}")),
        ("GET /api/lighting".to_string(), ok_json("{}")),
    ]))
    .await;

    let engine =
        LightsOutEngine::new(test_config()).with_catalog(vec![http_spec(stub.port())]);
    let found = engine.discover(&targets(&["127.0.0.1"])).await;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].method, DiscoveryMethod::ProtocolProbe);
}

#[tokio::test]
async fn device_scan_classifies_open_ports() {
    // The flat scan only knows the fixed vendor ports, so this test
    // needs one of them free on loopback; skip quietly if it is taken.
    let Ok(_listener) = TcpListener::bind("127.0.0.1:55443").await else {
        return;
    };

    let engine = LightsOutEngine::new(test_config());
    let found = engine.discover_devices(&targets(&["127.0.0.1"])).await;

    let yeelight: Vec<_> = found.iter().filter(|c| c.spec.name == "yeelight").collect();
    assert_eq!(yeelight.len(), 1);
    assert_eq!(yeelight[0].spec.family, ControlFamily::Yeelight);
    assert_eq!(yeelight[0].method, DiscoveryMethod::PortScan);
}
