//! GG-QUEUE command-line entry point.
//!
//! ## CLI Subcommands
//!
//! - `gg-queue-cli config show|defaults|validate` - Inspect configuration
//! - `gg-queue-cli simulate` - Run the producer/consumer workload

use std::process::ExitCode;

use gg_queue::cli::{config_cmd, run_simulation, SimulationReport};
use gg_queue::config;
use gg_queue::telemetry;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let json_output = args.iter().skip(2).any(|a| a == "--json");

    match command {
        "simulate" => {
            let env = config::load();
            if let Err(e) = telemetry::init_logging(&env.log) {
                eprintln!("Logging setup failed: {}", e);
                return ExitCode::from(2u8);
            }
            let report = run_simulation(&env.priority, &env.simulation);
            print_report(&report, json_output)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let code = config_cmd::run_show(json_output);
                    ExitCode::from(code as u8)
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = config_cmd::run_validate();
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("GG-QUEUE {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &SimulationReport, json_output: bool) -> ExitCode {
    if json_output {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize report: {}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!(
            "produced={} consumed={} elapsed_ms={}",
            report.produced, report.consumed, report.elapsed_ms
        );
        for (level, count) in &report.served {
            println!("level {:>3}: {}", level, count);
        }
    }

    if report.produced == report.consumed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "GG-QUEUE - thread-safe FIFO, bounded and fair priority queues v{}

USAGE:
    gg-queue-cli [COMMAND] [OPTIONS]

COMMANDS:
    simulate     Run producers and consumers over a configured priority queue
    config       Inspect configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

OPTIONS:
    --json         JSON output for `simulate` and `config show`

ENVIRONMENT:
    GG_QUEUE_MAX_PRIORITY        Highest priority level (default: 3)
    GG_QUEUE_WAIT_LIMIT          Starvation bound, 0 = strict (default: 0)
    GG_QUEUE_MAX_ITEMS           Bounded queue capacity (default: 256)
    GG_QUEUE_LIMIT_STRATEGY      reject | cycle (default: reject)
    GG_QUEUE_PRODUCERS           Simulation producers (default: 2)
    GG_QUEUE_CONSUMERS           Simulation consumers, 0 = CPU count (default: 0)
    GG_QUEUE_ITEMS_PER_PRODUCER  Simulation items per producer (default: 1000)
    GG_QUEUE_LOG_LEVEL           Log filter (default: info)
    GG_QUEUE_LOG_FORMAT          json | pretty (default: json)

EXIT CODES:
    0  Success
    1  Failure / configuration warnings
    2  Logging setup error
",
        version
    );
}
