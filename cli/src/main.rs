//! Command-line runner
//!
//! Reads a run config, executes the simulation, writes the run directory,
//! and prints final standings.
//!
//! ```text
//! agora-sim <config.json> [--output <dir>] [--no-log]
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use agora_simulator_core_rs::{RunConfig, RunLogger, RunSummary, Simulation};

struct CliArgs {
    config_path: PathBuf,
    output_root: PathBuf,
    write_logs: bool,
}

fn parse_args(mut args: std::env::Args) -> Result<CliArgs, String> {
    let program = args.next().unwrap_or_else(|| "agora-sim".to_string());
    let usage = format!("usage: {program} <config.json> [--output <dir>] [--no-log]");

    let mut config_path = None;
    let mut output_root = PathBuf::from("runs");
    let mut write_logs = true;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" => {
                output_root = args
                    .next()
                    .map(PathBuf::from)
                    .ok_or_else(|| format!("--output needs a directory\n{usage}"))?;
            }
            "--no-log" => write_logs = false,
            "--help" | "-h" => return Err(usage),
            other if config_path.is_none() => config_path = Some(PathBuf::from(other)),
            other => return Err(format!("unexpected argument: {other}\n{usage}")),
        }
    }

    Ok(CliArgs {
        config_path: config_path.ok_or(usage)?,
        output_root,
        write_logs,
    })
}

fn run(args: CliArgs) -> Result<RunSummary, String> {
    let raw = std::fs::read_to_string(&args.config_path)
        .map_err(|e| format!("cannot read {}: {e}", args.config_path.display()))?;
    let config: RunConfig =
        serde_json::from_str(&raw).map_err(|e| format!("invalid config: {e}"))?;
    config.validate().map_err(|e| e.to_string())?;

    let mut sim = Simulation::new(config.clone()).map_err(|e| e.to_string())?;
    if args.write_logs {
        let logger = RunLogger::create(&args.output_root, &config)
            .map_err(|e| format!("cannot create run directory: {e}"))?;
        eprintln!("logging to {}", logger.run_dir().display());
        sim.attach_logger(logger);
    }

    sim.run().map_err(|e| e.to_string())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "run {} ({}) finished after {} epochs",
        summary.name, summary.run_id, summary.epochs_completed
    );
    println!(
        "  gini {:.3} | trades {} | tax {} | treasury {} | leaks {} | supports {}",
        summary.stats.gini_energy,
        summary.stats.total_trades,
        summary.stats.total_tax_collected,
        summary.stats.treasury_balance,
        summary.stats.whisper_leaks,
        summary.stats.support_count
    );
    println!(
        "  turns {} | rejected {} | fallback {}",
        summary.stats.total_turns, summary.stats.rejected_turns, summary.stats.fallback_turns
    );
    println!("final standings:");
    for (id, snapshot) in &summary.standings {
        println!(
            "  {:<16} energy {:>4}  influence {:>3}  at {}",
            id, snapshot.energy, snapshot.influence, snapshot.location
        );
    }
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args()) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    match run(args) {
        Ok(summary) => {
            print_summary(&summary);
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
