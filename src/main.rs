// ==========================================================
//  lightsout — building lighting discovery and shutdown tool
// ==========================================================

use lightsout::{ControlConfig, Credentials, LightsOutEngine, LightsOutError, Target};

fn print_usage() {
    println!("Usage: lightsout [OPTIONS] <TARGET[,TARGET,...]>");
    println!();
    println!("Targets are IP addresses or hostnames, comma separated.");
    println!();
    println!("Options:");
    println!("  -j, --jobs <N>              concurrent probe limit (default: 64)");
    println!("      --devices               scan vendor smart-device ports instead of");
    println!("                              the building-protocol catalog");
    println!("      --dry-run               discover controllers but send no commands");
    println!("      --json                  print the run summary as JSON on stdout");
    println!("      --username <USER>       HTTP Basic auth user");
    println!("      --password <PASS>       HTTP Basic auth password");
    println!("      --probe-timeout-ms <N>  per-probe timeout (default: 2000)");
    println!("      --command-timeout-ms <N> per-strategy timeout (default: 5000)");
    println!("      --zone-delay-ms <N>     delay between zone commands (default: 500)");
    println!("  -h, --help                  show this help message");
    println!();
    println!("Examples:");
    println!("  lightsout 192.168.1.100");
    println!("  lightsout --devices 192.168.1.50,192.168.1.51");
    println!("  lightsout --dry-run plc.local,building-ctrl.local");
}

#[tokio::main]
async fn main() -> Result<(), LightsOutError> {
    env_logger::init();

    let raw_args: Vec<String> = std::env::args().collect();
    let mut args = raw_args.iter().skip(1);

    let mut config = ControlConfig::default();
    let mut device_scan = false;
    let mut dry_run = false;
    let mut json_output = false;
    let mut username = None;
    let mut password = None;
    let mut positional = None;

    // Parse command line arguments
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--jobs" | "-j" => {
                if let Some(jobs) = args.next().and_then(|s| s.parse().ok()) {
                    config.max_concurrent_probes = std::cmp::max(jobs, 1);
                }
            }
            "--devices" => device_scan = true,
            "--dry-run" => dry_run = true,
            "--json" => json_output = true,
            "--username" => username = args.next().cloned(),
            "--password" => password = args.next().cloned(),
            "--probe-timeout-ms" => {
                if let Some(ms) = args.next().and_then(|s| s.parse().ok()) {
                    config.probe_timeout_ms = ms;
                }
            }
            "--command-timeout-ms" => {
                if let Some(ms) = args.next().and_then(|s| s.parse().ok()) {
                    config.command_timeout_ms = ms;
                    config.http_timeout_ms = ms;
                }
            }
            "--zone-delay-ms" => {
                if let Some(ms) = args.next().and_then(|s| s.parse().ok()) {
                    config.zone_delay_ms = ms;
                }
            }
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            _ => positional = Some(arg.clone()),
        }
    }

    if let (Some(user), Some(pass)) = (username, password) {
        config.credentials = Some(Credentials {
            username: user,
            password: pass,
        });
    }

    // Determine targets
    let targets: Vec<Target> = match positional {
        None => {
            print_usage();
            return Err(LightsOutError::Other("no targets specified".to_string()));
        }
        Some(list) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Target(s.to_string()))
            .collect(),
    };
    if targets.is_empty() {
        return Err(LightsOutError::InvalidTarget(
            "target list is empty".to_string(),
        ));
    }

    let engine = LightsOutEngine::new(config);
    let summary = engine.run(&targets, device_scan, dry_run).await;

    if json_output {
        match serde_json::to_string_pretty(&summary) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => eprintln!("could not render JSON summary: {}", e),
        }
    }

    // The run itself never aborts; the exit just reflects whether
    // anything was actually commanded off.
    if !dry_run && summary.controllers_found > 0 && summary.commands_succeeded == 0 {
        return Err(LightsOutError::Other(
            "no controller accepted an off command".to_string(),
        ));
    }
    Ok(())
}
