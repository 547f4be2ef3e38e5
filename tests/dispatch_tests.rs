use async_trait::async_trait;
use lightsout::model::AttemptOutcome;
use lightsout::{
    CommandDispatcher, ControlContext, ControlFamily, ControlStrategy, DiscoveredController,
    LightsOutError, StrategyRegistry,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_utils::{controller_for, http_spec, ok_json, spawn_http_stub, tcp_spec, test_config};


/// Scripted strategy with a call counter, for pinning chain order
struct Scripted {
    id: &'static str,
    succeed: bool,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(id: &'static str, succeed: bool) -> (Arc<dyn ControlStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Self {
                id,
                succeed,
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl ControlStrategy for Scripted {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn execute(
        &self,
        _ctx: &ControlContext,
        _controller: &DiscoveredController,
    ) -> Result<(), LightsOutError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.succeed {
            Ok(())
        } else {
            Err(LightsOutError::Other("scripted failure".to_string()))
        }
    }
}

fn scripted_dispatcher(
    outcomes: &[(&'static str, bool)],
) -> (CommandDispatcher, Vec<Arc<AtomicUsize>>, DiscoveredController) {
    let mut chain = Vec::new();
    let mut counters = Vec::new();
    for (id, succeed) in outcomes {
        let (strategy, calls) = Scripted::new(id, *succeed);
        chain.push(strategy);
        counters.push(calls);
    }
    let mut registry = StrategyRegistry::empty();
    registry.register_chain(ControlFamily::Modbus, chain);

    let ctx = Arc::new(ControlContext::new(test_config()));
    let dispatcher = CommandDispatcher::with_registry(ctx, Arc::new(registry));
    let controller = controller_for("127.0.0.1", tcp_spec("modbus", 502, ControlFamily::Modbus));
    (dispatcher, counters, controller)
}

#[tokio::test]
async fn strategy_order_is_respected() {
    // Only the third of five succeeds: 1-2 attempted and failed,
    // 3 succeeded, 4-5 never invoked.
    let (dispatcher, counters, controller) = scripted_dispatcher(&[
        ("s1", false),
        ("s2", false),
        ("s3", true),
        ("s4", true),
        ("s5", true),
    ]);

    let result = dispatcher.dispatch(&controller).await;

    assert!(result.success);
    assert_eq!(result.strategy_id.as_deref(), Some("s3"));
    assert_eq!(result.attempts.len(), 3);
    assert_eq!(result.attempts[0].strategy_id, "s1");
    assert!(matches!(result.attempts[0].outcome, AttemptOutcome::Failed(_)));
    assert!(matches!(result.attempts[1].outcome, AttemptOutcome::Failed(_)));
    assert_eq!(result.attempts[2].outcome, AttemptOutcome::Succeeded);
    assert_eq!(counters[3].load(Ordering::SeqCst), 0);
    assert_eq!(counters[4].load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn first_success_short_circuits() {
    let (dispatcher, counters, controller) =
        scripted_dispatcher(&[("s1", true), ("s2", true)]);

    let result = dispatcher.dispatch(&controller).await;

    assert!(result.success);
    assert_eq!(result.attempts.len(), 1);
    assert_eq!(counters[1].load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn exhaustion_records_every_attempt() {
    let (dispatcher, counters, controller) =
        scripted_dispatcher(&[("s1", false), ("s2", false), ("s3", false)]);

    let result = dispatcher.dispatch(&controller).await;

    assert!(!result.success);
    assert!(result.strategy_id.is_none());
    assert_eq!(result.attempts.len(), 3);
    assert!(result.error_summary.is_some());
    for calls in &counters {
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn missing_chain_yields_structured_failure() {
    let ctx = Arc::new(ControlContext::new(test_config()));
    let dispatcher = CommandDispatcher::with_registry(ctx, Arc::new(StrategyRegistry::empty()));
    let controller = controller_for("127.0.0.1", tcp_spec("tuya", 6668, ControlFamily::Tuya));

    let result = dispatcher.dispatch(&controller).await;

    assert!(!result.success);
    assert!(result.attempts.is_empty());
    assert!(result
        .error_summary
        .as_deref()
        .unwrap()
        .contains("no control chain"));
}

#[tokio::test]
async fn rest_chain_records_earlier_strategies_as_failed_not_skipped() {
    // Only a CGI endpoint exists, so rest-all-off and soap-all-off
    // must show up as attempted-and-failed before simple-http-cgi wins.
    let stub = spawn_http_stub(HashMap::from([(
        "GET /lightoff.cgi?all=1".to_string(),
        ok_json("OK"),
    )]))
    .await;
    let ctx = Arc::new(ControlContext::new(test_config()));
    let dispatcher = CommandDispatcher::new(ctx);
    let controller = controller_for("127.0.0.1", http_spec(stub.port()));

    let result = dispatcher.dispatch(&controller).await;

    assert!(result.success);
    assert_eq!(result.strategy_id.as_deref(), Some("simple-http-cgi"));
    let ids: Vec<&str> = result
        .attempts
        .iter()
        .map(|a| a.strategy_id.as_str())
        .collect();
    assert_eq!(ids, vec!["rest-all-off", "soap-all-off", "simple-http-cgi"]);
    assert!(matches!(result.attempts[0].outcome, AttemptOutcome::Failed(_)));
    assert!(matches!(result.attempts[1].outcome, AttemptOutcome::Failed(_)));
}

#[tokio::test]
async fn dispatch_is_idempotent_against_an_already_off_controller() {
    // Command issuance defines success, not a state transition: the
    // same stub accepts the same off command twice.
    let stub = spawn_http_stub(HashMap::from([(
        "POST /api/lighting/all/off".to_string(),
        ok_json("{\"state\":\"off\"}"),
    )]))
    .await;
    let ctx = Arc::new(ControlContext::new(test_config()));
    let dispatcher = CommandDispatcher::new(ctx);
    let controller = controller_for("127.0.0.1", http_spec(stub.port()));

    let first = dispatcher.dispatch(&controller).await;
    let second = dispatcher.dispatch(&controller).await;

    assert!(first.success && second.success);
    assert_eq!(first.strategy_id.as_deref(), Some("rest-all-off"));
    assert_eq!(second.strategy_id.as_deref(), Some("rest-all-off"));
}

#[tokio::test]
async fn zone_fallback_runs_after_exhaustion_and_aggregates() {
    // No bulk endpoint works; three zones, the middle one refuses.
    let zones_body = r#"[{"id":"z1"},{"id":"z2"},{"id":"z3"}]"#;
    let stub = spawn_http_stub(HashMap::from([
        ("GET /api/lighting/zones".to_string(), ok_json(zones_body)),
        ("POST /api/lighting/zones/z1/off".to_string(), ok_json("{}")),
        (
            "POST /api/lighting/zones/z2/off".to_string(),
            (500, String::new()),
        ),
        ("POST /api/lighting/zones/z3/off".to_string(), ok_json("{}")),
        // Also refuse the remaining per-zone candidates for z2
        (
            "POST /bms/lighting/zone/z2/off".to_string(),
            (500, String::new()),
        ),
        ("POST /api/control/zone/z2".to_string(), (500, String::new())),
        ("POST /zone/z2/off".to_string(), (500, String::new())),
    ]))
    .await;
    let ctx = Arc::new(ControlContext::new(test_config()));
    let dispatcher = CommandDispatcher::new(ctx);
    let controller = controller_for("127.0.0.1", http_spec(stub.port()));

    let result = dispatcher.dispatch(&controller).await;

    assert!(result.success);
    assert_eq!(result.strategy_id.as_deref(), Some("zone-fallback"));
    let sweep = result.zone_sweep.expect("zone sweep should have run");
    assert_eq!(sweep.success_count, 2);
    assert_eq!(sweep.failure_count, 1);
    assert!(sweep.success());
    let order: Vec<&str> = sweep.outcomes.iter().map(|o| o.zone_id.as_str()).collect();
    assert_eq!(order, vec!["z1", "z2", "z3"]);
    assert!(!sweep.outcomes[1].success);
}
