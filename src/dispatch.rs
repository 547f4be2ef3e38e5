use crate::control::raw::RawCommand;
use crate::control::rest::{BacnetOverHttp, RestAllOff, SimpleHttpCgi, SoapAllOff};
use crate::control::vendor::{HueConfigCheck, TplinkRelayOff, WizSetPilot, YeelightSetPower};
use crate::control::{zones, ControlContext, ControlStrategy};
use crate::model::{
    AttemptOutcome, CommandResult, ControlFamily, DiscoveredController, StrategyAttempt,
};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::time::timeout;

/// Strategy id reported when the zone fallback produced the success
pub const ZONE_FALLBACK_ID: &str = "zone-fallback";

/// Ordered strategy chains per control family. Order is a priority,
/// not a preference: dispatch always tries entry i before i+1 and
/// never skips ahead.
pub struct StrategyRegistry {
    chains: HashMap<ControlFamily, Vec<Arc<dyn ControlStrategy>>>,
    zone_fallback: HashSet<ControlFamily>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            chains: HashMap::new(),
            zone_fallback: HashSet::new(),
        }
    }

    /// The standard chains for every known family.
    ///
    /// Home Assistant, LIFX and Tuya are classified but get no chain:
    /// commanding them needs tokens or pairing-level protocol support
    /// this crate does not fabricate.
    pub fn standard() -> Self {
        let mut registry = Self::empty();

        let rest_chain: Vec<Arc<dyn ControlStrategy>> = vec![
            Arc::new(RestAllOff),
            Arc::new(SoapAllOff),
            Arc::new(SimpleHttpCgi),
            Arc::new(BacnetOverHttp),
        ];
        registry.register_chain(ControlFamily::Rest, rest_chain.clone());
        registry.register_zone_fallback(ControlFamily::Rest);

        // Unknown building protocols: REST surface first, then the raw
        // building frames, matching the original discovery scripts.
        let mut generic_chain = rest_chain;
        generic_chain.push(Arc::new(RawCommand::modbus_write_coil()));
        generic_chain.push(Arc::new(RawCommand::knx_group_write()));
        registry.register_chain(ControlFamily::Generic, generic_chain);
        registry.register_zone_fallback(ControlFamily::Generic);

        registry.register_chain(
            ControlFamily::Modbus,
            vec![Arc::new(RawCommand::modbus_write_coil())],
        );
        registry.register_chain(
            ControlFamily::Knx,
            vec![Arc::new(RawCommand::knx_group_write())],
        );
        registry.register_chain(
            ControlFamily::Bacnet,
            vec![Arc::new(RawCommand::bacnet_write_property())],
        );
        registry.register_chain(
            ControlFamily::Mqtt,
            vec![Arc::new(RawCommand::mqtt_publish())],
        );

        registry.register_chain(ControlFamily::TpLink, vec![Arc::new(TplinkRelayOff)]);
        registry.register_chain(ControlFamily::Yeelight, vec![Arc::new(YeelightSetPower)]);
        registry.register_chain(ControlFamily::Wiz, vec![Arc::new(WizSetPilot)]);
        registry.register_chain(ControlFamily::Hue, vec![Arc::new(HueConfigCheck)]);

        registry
    }

    pub fn register_chain(
        &mut self,
        family: ControlFamily,
        chain: Vec<Arc<dyn ControlStrategy>>,
    ) {
        self.chains.insert(family, chain);
    }

    pub fn register_zone_fallback(&mut self, family: ControlFamily) {
        self.zone_fallback.insert(family);
    }

    pub fn chain(&self, family: ControlFamily) -> &[Arc<dyn ControlStrategy>] {
        self.chains.get(&family).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_zone_fallback(&self, family: ControlFamily) -> bool {
        self.zone_fallback.contains(&family)
    }
}

/// Tries the ordered strategy chain for one discovered controller
/// until a strategy reports success or the chain is exhausted, then
/// runs the zone fallback where one is registered.
pub struct CommandDispatcher {
    ctx: Arc<ControlContext>,
    registry: Arc<StrategyRegistry>,
}

impl CommandDispatcher {
    pub fn new(ctx: Arc<ControlContext>) -> Self {
        Self {
            ctx,
            registry: Arc::new(StrategyRegistry::standard()),
        }
    }

    pub fn with_registry(ctx: Arc<ControlContext>, registry: Arc<StrategyRegistry>) -> Self {
        Self { ctx, registry }
    }

    /// Issue the all-off command against one controller.
    ///
    /// Each strategy failure is swallowed into an attempt record and
    /// the next strategy runs; only total exhaustion surfaces as a
    /// failed result. The same strategy is never re-attempted.
    pub async fn dispatch(&self, controller: &DiscoveredController) -> CommandResult {
        let family = controller.spec.family;
        let chain = self.registry.chain(family);
        let mut attempts = Vec::with_capacity(chain.len());

        for strategy in chain {
            debug!(
                "trying {} against {} ({})",
                strategy.id(),
                controller.target,
                controller.spec.name
            );
            let outcome = match timeout(
                self.ctx.config.command_timeout(),
                strategy.execute(&self.ctx, controller),
            )
            .await
            {
                Ok(Ok(())) => AttemptOutcome::Succeeded,
                Ok(Err(e)) => AttemptOutcome::Failed(e.to_string()),
                Err(_) => AttemptOutcome::Failed("strategy timed out".to_string()),
            };

            let succeeded = outcome == AttemptOutcome::Succeeded;
            attempts.push(StrategyAttempt {
                strategy_id: strategy.id().to_string(),
                outcome,
            });

            if succeeded {
                info!(
                    "{}: all-off accepted via {}",
                    controller.target,
                    strategy.id()
                );
                return CommandResult {
                    target: controller.target.clone(),
                    success: true,
                    strategy_id: Some(strategy.id().to_string()),
                    attempts,
                    zone_sweep: None,
                    error_summary: None,
                };
            }
            debug!("{} did not succeed, moving on", strategy.id());
        }

        // Chain exhausted; the zone sweep is the terminal fallback.
        if self.registry.has_zone_fallback(family) {
            let found = zones::enumerate_zones(&self.ctx, controller).await;
            if found.is_empty() {
                warn!("{}: no zone data available for fallback", controller.target);
            } else {
                let sweep = zones::turn_off_sequentially(
                    &self.ctx,
                    controller,
                    &found,
                    self.ctx.config.zone_delay(),
                )
                .await;
                let success = sweep.success();
                let summary = format!(
                    "zone fallback: {}/{} zones off",
                    sweep.success_count,
                    found.len()
                );
                attempts.push(StrategyAttempt {
                    strategy_id: ZONE_FALLBACK_ID.to_string(),
                    outcome: if success {
                        AttemptOutcome::Succeeded
                    } else {
                        AttemptOutcome::Failed(summary.clone())
                    },
                });
                return CommandResult {
                    target: controller.target.clone(),
                    success,
                    strategy_id: success.then(|| ZONE_FALLBACK_ID.to_string()),
                    attempts,
                    zone_sweep: Some(sweep),
                    error_summary: (!success).then_some(summary),
                };
            }
        }

        let error_summary = if attempts.is_empty() {
            format!("no control chain registered for {}", family.label())
        } else {
            format!("all {} strategies exhausted", attempts.len())
        };
        warn!("{}: {}", controller.target, error_summary);
        CommandResult {
            target: controller.target.clone(),
            success: false,
            strategy_id: None,
            attempts,
            zone_sweep: None,
            error_summary: Some(error_summary),
        }
    }
}
