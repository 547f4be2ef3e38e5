//! Zone enumeration and the sequential zone-by-zone fallback.
//!
//! When no bulk command works, the dispatcher asks the controller for
//! its lighting zones and turns them off one at a time. The sweep is
//! strictly sequential with a pacing delay between commands to bound
//! load on the controller; it is never parallelized.

use super::{ControlContext, SUCCESS_STATUSES};
use crate::catalog::{ZONE_LIST_PATHS, ZONE_OFF_PATHS};
use crate::model::{DiscoveredController, Zone, ZoneOutcome, ZoneSweepResult};
use log::{debug, info, warn};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::sleep;

/// Fetch the controller's zone list.
///
/// Tries each zone-listing endpoint in order and returns the first
/// non-empty parseable list. An empty result means no zone data is
/// available, which is not an error.
pub async fn enumerate_zones(ctx: &ControlContext, controller: &DiscoveredController) -> Vec<Zone> {
    let base = controller.http_base();
    for path in ZONE_LIST_PATHS {
        let url = format!("{}{}", base, path);
        let response = match ctx.prepare(ctx.http.get(&url)).send().await {
            Ok(r) if r.status().as_u16() == 200 => r,
            Ok(_) | Err(_) => continue,
        };
        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                debug!("{} returned unparseable zone data: {}", url, e);
                continue;
            }
        };
        let zones = parse_zone_list(&body);
        if !zones.is_empty() {
            debug!("found {} zones via {}", zones.len(), url);
            return zones;
        }
    }
    Vec::new()
}

/// Accepts either a bare JSON array of zone objects or an object
/// wrapping one under "zones". Zone id preference: id, zoneId, name.
fn parse_zone_list(body: &Value) -> Vec<Zone> {
    let entries = match body {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(map) => match map.get("zones").and_then(Value::as_array) {
            Some(entries) => entries.as_slice(),
            None => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(|entry| {
            let obj = entry.as_object()?;
            let id = ["id", "zoneId", "name"]
                .iter()
                .find_map(|key| obj.get(*key))
                .map(field_as_string)?;
            let name = obj.get("name").map(field_as_string);
            Some(Zone { id, name })
        })
        .collect()
}

fn field_as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Issue an off-command for one zone through the per-zone endpoints
pub async fn turn_off_zone(
    ctx: &ControlContext,
    controller: &DiscoveredController,
    zone_id: &str,
) -> bool {
    let base = controller.http_base();
    for template in ZONE_OFF_PATHS {
        let url = format!("{}{}", base, template.replace("{}", zone_id));
        let request = ctx
            .prepare(ctx.http.post(&url))
            .json(&json!({"state": "off"}));
        match request.send().await {
            Ok(response) if SUCCESS_STATUSES.contains(&response.status().as_u16()) => {
                return true;
            }
            Ok(_) | Err(_) => continue,
        }
    }
    false
}

/// Turn zones off one at a time, in the given order, waiting
/// `inter_delay` after every zone regardless of its outcome.
pub async fn turn_off_sequentially(
    ctx: &ControlContext,
    controller: &DiscoveredController,
    zones: &[Zone],
    inter_delay: Duration,
) -> ZoneSweepResult {
    let mut result = ZoneSweepResult::default();
    for zone in zones {
        let success = turn_off_zone(ctx, controller, &zone.id).await;
        if success {
            info!("zone {} off ({})", zone.id, controller.target);
            result.success_count += 1;
        } else {
            warn!("zone {} did not accept the off command", zone.id);
            result.failure_count += 1;
        }
        result.outcomes.push(ZoneOutcome {
            zone_id: zone.id.clone(),
            success,
        });
        sleep(inter_delay).await;
    }
    result
}
