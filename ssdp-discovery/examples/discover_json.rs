//! Simple SSDP discovery that outputs JSON for scripting
//!
//! Usage: cargo run -p ssdp-discovery --example discover_json -- [timeout-secs] [target-type...]
//!
//! With no target types the example only listens for advertisements.
//! Set `SSDP_LOG_MODE=development` to see what the search is doing on stderr.

use ssdp_discovery::logging::init_logging_from_env;
use ssdp_discovery::{discover, SearchOptions};
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    if let Err(e) = init_logging_from_env() {
        eprintln!("{}", e);
    }

    let mut args = std::env::args().skip(1);
    let timeout = args.next().and_then(|s| s.parse().ok()).unwrap_or(5);
    let target_types: Vec<String> = args.collect();

    let options = SearchOptions::for_types(target_types)
        .with_timeout(Duration::from_secs(timeout))
        .with_tries(if timeout >= 3 { 3 } else { 1 })
        .lenient();

    let discoveries = match discover(options) {
        Ok(discoveries) => discoveries,
        Err(e) => {
            eprintln!("Discovery failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match serde_json::to_string_pretty(&discoveries) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize discoveries: {}", e);
            ExitCode::FAILURE
        }
    }
}
