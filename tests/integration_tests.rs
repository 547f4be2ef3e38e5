use lightsout::{LightsOutEngine, Target};
use std::collections::HashMap;
use test_utils::{http_spec, ok_json, spawn_http_stub, tcp_spec, test_config};
use tokio::net::TcpListener;


fn loopback() -> Vec<Target> {
    vec![Target("127.0.0.1".to_string())]
}

#[tokio::test]
async fn full_run_discovers_and_commands_a_rest_controller() {
    let stub = spawn_http_stub(HashMap::from([
        ("GET /status".to_string(), ok_json("{\"status\":\"ok\"}")),
        (
            "POST /api/lighting/all/off".to_string(),
            ok_json("{\"state\":\"off\"}"),
        ),
    ]))
    .await;

    let engine =
        LightsOutEngine::new(test_config()).with_catalog(vec![http_spec(stub.port())]);
    let summary = engine.run(&loopback(), false, false).await;

    assert_eq!(summary.controllers_found, 1);
    assert_eq!(summary.commands_succeeded, 1);
    assert_eq!(summary.commands_failed, 0);
    assert!(summary.unmatched_targets.is_empty());
    assert_eq!(summary.results.len(), 1);
    assert_eq!(summary.results[0].strategy_id.as_deref(), Some("rest-all-off"));
}

#[tokio::test]
async fn full_run_falls_back_to_zones_when_no_bulk_command_works() {
    let stub = spawn_http_stub(HashMap::from([
        ("GET /status".to_string(), ok_json("{}")),
        (
            "GET /api/lighting/zones".to_string(),
            ok_json(r#"[{"id":"n1"},{"id":"n2"}]"#),
        ),
        ("POST /api/lighting/zones/n1/off".to_string(), ok_json("{}")),
        ("POST /api/lighting/zones/n2/off".to_string(), ok_json("{}")),
    ]))
    .await;

    let engine =
        LightsOutEngine::new(test_config()).with_catalog(vec![http_spec(stub.port())]);
    let summary = engine.run(&loopback(), false, false).await;

    assert_eq!(summary.commands_succeeded, 1);
    let result = &summary.results[0];
    assert_eq!(result.strategy_id.as_deref(), Some("zone-fallback"));
    let sweep = result.zone_sweep.as_ref().unwrap();
    assert_eq!(sweep.success_count, 2);
}

#[tokio::test]
async fn dry_run_discovers_but_sends_no_commands() {
    let stub = spawn_http_stub(HashMap::from([
        ("GET /status".to_string(), ok_json("{}")),
        ("POST /api/lighting/all/off".to_string(), ok_json("{}")),
    ]))
    .await;

    let engine =
        LightsOutEngine::new(test_config()).with_catalog(vec![http_spec(stub.port())]);
    let summary = engine.run(&loopback(), false, true).await;

    assert_eq!(summary.controllers_found, 1);
    assert_eq!(summary.commands_succeeded, 0);
    assert!(summary.results.is_empty());
    assert!(stub
        .requests()
        .iter()
        .all(|r| !r.contains("/api/lighting/all/off")));
}

#[tokio::test]
async fn targets_with_no_controller_are_reported_not_fatal() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let closed_port = listener.local_addr().unwrap().port();
    drop(listener);

    let engine = LightsOutEngine::new(test_config()).with_catalog(vec![tcp_spec(
        "modbus",
        closed_port,
        lightsout::ControlFamily::Modbus,
    )]);
    let summary = engine.run(&loopback(), false, false).await;

    assert_eq!(summary.controllers_found, 0);
    assert_eq!(summary.unmatched_targets, loopback());
    assert_eq!(summary.commands_succeeded, 0);
}
