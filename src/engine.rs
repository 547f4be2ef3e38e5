use crate::catalog::{self, BUILDING_CATALOG, DEVICE_CATALOG, REST_PROBE_PATHS};
use crate::config::ControlConfig;
use crate::control::ControlContext;
use crate::dispatch::CommandDispatcher;
use crate::model::{
    CommandResult, DiscoveredController, DiscoveryMethod, ProtocolSpec, RunSummary, Target,
    Transport,
};
use crate::probe;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use futures::pin_mut;
use futures::stream::{self, StreamExt};
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Discovery and dispatch engine: probes the target × catalog
/// cross-product under a bounded worker pool, then commands every
/// discovered controller through its strategy chain.
pub struct LightsOutEngine {
    ctx: Arc<ControlContext>,
    dispatcher: CommandDispatcher,
    catalog: Vec<ProtocolSpec>,
}

impl LightsOutEngine {
    pub fn new(config: ControlConfig) -> Self {
        let ctx = Arc::new(ControlContext::new(config));
        let dispatcher = CommandDispatcher::new(ctx.clone());
        Self {
            ctx,
            dispatcher,
            catalog: BUILDING_CATALOG.to_vec(),
        }
    }

    /// Swap the protocol catalog (tests point this at loopback ports)
    pub fn with_catalog(mut self, catalog: Vec<ProtocolSpec>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(&self) -> &ControlConfig {
        &self.ctx.config
    }

    /// Probe the full cross-product of targets × catalog entries and
    /// collect every reachable pair. Duplicate (target, protocol)
    /// pairs fold into one controller keeping the first discovery
    /// method; the output is sorted so the result set is deterministic
    /// for deterministic probe outcomes.
    pub async fn discover(&self, targets: &[Target]) -> Vec<DiscoveredController> {
        let pairs: Vec<(Target, ProtocolSpec)> = targets
            .iter()
            .flat_map(|target| self.catalog.iter().map(move |spec| (target.clone(), *spec)))
            .collect();

        let probe_stream = stream::iter(pairs)
            .map(|(target, spec)| {
                let ctx = self.ctx.clone();
                async move {
                    probe::probe(&ctx.http, &target, &spec, &ctx.config)
                        .await
                        .then(|| DiscoveredController {
                            target,
                            spec,
                            method: DiscoveryMethod::ProtocolProbe,
                        })
                }
            })
            .buffer_unordered(self.ctx.config.max_concurrent_probes);

        let probed: Vec<DiscoveredController> = probe_stream
            .filter_map(|found| async move { found })
            .collect()
            .await;

        let mut folded: BTreeMap<(Target, &'static str), DiscoveredController> = BTreeMap::new();
        for controller in probed {
            let key = (controller.target.clone(), controller.spec.name);
            folded.entry(key).or_insert(controller);
        }
        for controller in self.discover_endpoints(targets).await {
            let key = (controller.target.clone(), controller.spec.name);
            folded.entry(key).or_insert(controller);
        }

        folded.into_values().collect()
    }

    /// Endpoint-existence discovery: a 200 from any known REST path
    /// marks the target as an HTTP lighting controller even when the
    /// generic status probe did not confirm it.
    async fn discover_endpoints(&self, targets: &[Target]) -> Vec<DiscoveredController> {
        let http_specs: Vec<ProtocolSpec> = self
            .catalog
            .iter()
            .filter(|spec| spec.transport == Transport::Http)
            .copied()
            .collect();

        let pairs: Vec<(Target, ProtocolSpec)> = targets
            .iter()
            .flat_map(|target| http_specs.iter().map(move |spec| (target.clone(), *spec)))
            .collect();

        stream::iter(pairs)
            .map(|(target, spec)| {
                let ctx = self.ctx.clone();
                async move {
                    let base = format!("http://{}:{}", target.host(), spec.port);
                    probe::probe_http(&ctx.http, &base, REST_PROBE_PATHS, &ctx.config)
                        .await
                        .then(|| DiscoveredController {
                            target,
                            spec,
                            method: DiscoveryMethod::EndpointProbe,
                        })
                }
            })
            .buffer_unordered(self.ctx.config.max_concurrent_probes)
            .filter_map(|found| async move { found })
            .collect()
            .await
    }

    /// Flat scan of the vendor smart-device ports. Every open port is
    /// run through the device classifier to pick the vendor chain.
    pub async fn discover_devices(&self, targets: &[Target]) -> Vec<DiscoveredController> {
        let pairs: Vec<(Target, u16)> = targets
            .iter()
            .flat_map(|target| {
                DEVICE_CATALOG
                    .iter()
                    .map(move |spec| (target.clone(), spec.port))
            })
            .collect();

        let scan_stream = stream::iter(pairs)
            .map(|(target, port)| {
                let ctx = self.ctx.clone();
                async move {
                    if !probe::probe_tcp(target.host(), port, ctx.config.probe_timeout()).await {
                        return None;
                    }
                    catalog::classify_device_port(port)?;
                    catalog::device_spec_for_port(port).map(|spec| DiscoveredController {
                        target,
                        spec: *spec,
                        method: DiscoveryMethod::PortScan,
                    })
                }
            })
            .buffer_unordered(self.ctx.config.max_concurrent_probes);

        let found: Vec<DiscoveredController> = scan_stream
            .filter_map(|found| async move { found })
            .collect()
            .await;

        let mut folded: BTreeMap<(Target, &'static str), DiscoveredController> = BTreeMap::new();
        for controller in found {
            let key = (controller.target.clone(), controller.spec.name);
            folded.entry(key).or_insert(controller);
        }
        folded.into_values().collect()
    }

    /// Full run: discovery, dispatch, structured summary. No failure
    /// anywhere aborts the run; everything lands in the summary.
    pub async fn run(&self, targets: &[Target], device_scan: bool, dry_run: bool) -> RunSummary {
        let run_start = Instant::now();
        println!(
            "Lights-out — scanning {} target(s) against {} cataloged port(s)",
            targets.len(),
            if device_scan {
                DEVICE_CATALOG.len()
            } else {
                self.catalog.len()
            }
        );

        // Phase 1: discovery
        let controllers = if device_scan {
            self.discover_devices(targets).await
        } else {
            self.discover(targets).await
        };
        println!("Found {} controller(s)", controllers.len());

        let unmatched_targets: Vec<Target> = targets
            .iter()
            .filter(|t| !controllers.iter().any(|c| &c.target == *t))
            .cloned()
            .collect();
        for target in &unmatched_targets {
            warn!("no controller found for target {}", target);
        }

        let mut summary = RunSummary {
            controllers_found: controllers.len(),
            unmatched_targets,
            ..RunSummary::default()
        };

        if dry_run || controllers.is_empty() {
            self.display_summary(&controllers, &summary, run_start.elapsed().as_secs_f64());
            return summary;
        }

        // Phase 2: dispatch, bounded across controllers; the chain
        // within each controller stays strictly ordered.
        let total = controllers.len();
        let mut completed = 0usize;
        let mut paired: Vec<(DiscoveredController, CommandResult)> = Vec::with_capacity(total);

        let dispatch_stream = stream::iter(controllers.iter().cloned())
            .map(|controller| {
                let dispatcher = &self.dispatcher;
                async move {
                    let result = dispatcher.dispatch(&controller).await;
                    (controller, result)
                }
            })
            .buffer_unordered(self.ctx.config.max_concurrent_dispatch);

        pin_mut!(dispatch_stream);
        use std::io::Write;
        while let Some((controller, result)) = dispatch_stream.next().await {
            completed += 1;
            print!("\rCommanding controllers: {}/{}", completed, total);
            std::io::stdout().flush().ok();
            paired.push((controller, result));
        }
        println!();

        paired.sort_by(|a, b| (&a.0.target, a.0.spec.name).cmp(&(&b.0.target, b.0.spec.name)));

        summary.commands_succeeded = paired.iter().filter(|(_, r)| r.success).count();
        summary.commands_failed = paired.len() - summary.commands_succeeded;
        let display_controllers: Vec<DiscoveredController> =
            paired.iter().map(|(c, _)| c.clone()).collect();
        summary.results = paired.into_iter().map(|(_, r)| r).collect();

        self.display_summary(
            &display_controllers,
            &summary,
            run_start.elapsed().as_secs_f64(),
        );
        summary
    }

    /// Render the per-controller table and the run totals
    fn display_summary(
        &self,
        controllers: &[DiscoveredController],
        summary: &RunSummary,
        secs: f64,
    ) {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
        table.set_header(vec![
            "Target", "Protocol", "Discovery", "Result", "Strategy", "Zones", "Detail",
        ]);

        for (i, controller) in controllers.iter().enumerate() {
            let result = summary.results.get(i);
            let (outcome, strategy, zones, detail) = match result {
                Some(r) => (
                    if r.success { "OFF SENT" } else { "FAILED" },
                    r.strategy_id.clone().unwrap_or_else(|| "—".to_string()),
                    r.zone_sweep
                        .as_ref()
                        .map(|s| format!("{}/{}", s.success_count, s.outcomes.len()))
                        .unwrap_or_else(|| "—".to_string()),
                    r.error_summary.clone().unwrap_or_default(),
                ),
                None => (
                    "discovered",
                    "—".to_string(),
                    "—".to_string(),
                    String::new(),
                ),
            };
            table.add_row(vec![
                Cell::new(controller.target.to_string()),
                Cell::new(format!(
                    "{} ({})",
                    controller.spec.name, controller.spec.port
                )),
                Cell::new(controller.method.label()),
                Cell::new(outcome),
                Cell::new(strategy),
                Cell::new(zones),
                Cell::new(detail),
            ]);
        }
        println!("{}", table);

        println!("\nRun Summary:");
        println!("============");
        println!("Completed in {:.2} seconds", secs);
        println!("Controllers found:  {}", summary.controllers_found);
        println!("Commands accepted:  {}", summary.commands_succeeded);
        println!("Commands failed:    {}", summary.commands_failed);
        if !summary.unmatched_targets.is_empty() {
            println!(
                "No controller found for: {}",
                summary
                    .unmatched_targets
                    .iter()
                    .map(|t| t.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}
