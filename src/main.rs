use std::process::ExitCode;
use std::time::Duration;

use portprobe::types::{PortState, ScanOutcome, ScanRequest};
use portprobe::{logging, ports, scanner};

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

/// portprobe — bounded-concurrency TCP connect port scanner.
///
/// Only scan hosts you own or are explicitly authorized to test.
#[derive(Debug, Clone, Parser)]
#[command(name = "portprobe", version, about, long_about = None)]
struct Cli {
    /// IP address or hostname to scan.
    #[arg(short = 't', long)]
    target: String,

    /// First port of the range.
    #[arg(short = 's', long, default_value_t = 1)]
    start: u16,

    /// Last port of the range (inclusive).
    #[arg(short = 'e', long, default_value_t = 1024)]
    end: u16,

    /// Port range as START-END or a single port; overrides --start/--end.
    #[arg(short = 'p', long)]
    ports: Option<String>,

    /// Per-connection timeout in seconds.
    #[arg(long, default_value_t = 1.0)]
    timeout: f64,

    /// Max concurrent connect attempts (1-200).
    #[arg(long, default_value_t = 50)]
    workers: usize,

    /// Print the scan outcome as pretty JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Increase diagnostic logging (-v, -vv, -vvv). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let (start, end) = match cli.ports.as_deref() {
        Some(spec) => ports::parse_port_range(spec)?,
        None => {
            ports::check_range(cli.start, cli.end)?;
            (cli.start, cli.end)
        }
    };
    let timeout = Duration::try_from_secs_f64(cli.timeout)
        .with_context(|| format!("invalid timeout: {}", cli.timeout))?;
    let request = ScanRequest::new(cli.target.clone(), start, end, timeout, cli.workers)?;

    if !cli.json {
        println!("Scanning {} ports {}-{}", request.host, start, end);
        println!("Timeout: {}s, Workers: {}", cli.timeout, request.worker_count);
        println!("{}", "-".repeat(50));
    }

    // Ctrl-C stops dispatching new probes.
    let cancel = CancellationToken::new();
    let cancel_ctrlc = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => cancel_ctrlc.cancel(),
            Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C"),
        }
    });

    let outcome = scanner::scan_range_with_cancel(&request, cancel)
        .await
        .context("scan failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    Ok(ExitCode::from(exit_status(&outcome)))
}

/// 130 for an interrupted scan, 2 when any port errored, 0 otherwise.
fn exit_status(outcome: &ScanOutcome) -> u8 {
    if outcome.cancelled {
        130
    } else if outcome.has_errors() {
        2
    } else {
        0
    }
}

fn print_outcome(outcome: &ScanOutcome) {
    if outcome.open_ports.is_empty() {
        println!("No open ports found");
    } else {
        println!("Open ports found:");
        for port in &outcome.open_ports {
            println!("Port {port} {}", PortState::Open);
        }
    }

    for err in &outcome.errors {
        eprintln!("Error: {err}");
    }

    if outcome.cancelled {
        println!(
            "\nScan interrupted after {} of {} ports",
            outcome.scanned_done, outcome.scanned_total
        );
    }
    println!(
        "\nSummary: {} open ports out of {} scanned in {:.2}s",
        outcome.open_count(),
        outcome.scanned_total,
        outcome.duration.as_secs_f64()
    );
}
