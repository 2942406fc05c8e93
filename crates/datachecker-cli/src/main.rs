mod commands;
mod logging;
mod report;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use datachecker_core::{config, CheckKind, Engine, RunSummary, ScanConfig};
use report::TermReporter;
use std::path::{Path, PathBuf};
use std::process;
use tracing::error;

fn main() {
    let _guard = logging::init_logger();
    let args = Cli::parse();

    if let Some(Commands::Config) = args.command {
        match ScanConfig::write_default(Path::new(config::CONFIG_FILE)) {
            Ok(()) => {
                println!("wrote {}", config::CONFIG_FILE);
                return;
            }
            Err(err) => {
                error!("cannot write {}: {err}", config::CONFIG_FILE);
                process::exit(2);
            }
        }
    }

    let mut scan_config = ScanConfig::load_or_default(Path::new(config::CONFIG_FILE));

    let single = args.check.as_deref().map(|name| {
        CheckKind::from_name(name).unwrap_or_else(|| {
            eprintln!("unknown check '{name}'; valid names:");
            for kind in CheckKind::ALL {
                eprintln!("  {}", kind.name());
            }
            process::exit(2);
        })
    });
    if single.is_some() {
        // a one-check run never shares stats across checks
        scan_config.enable_cache = false;
    }

    let directory: PathBuf = match args
        .directory
        .or_else(|| scan_config.input_folder.clone().map(PathBuf::from))
    {
        Some(directory) => directory,
        None => {
            let _ = Cli::command().print_long_help();
            return;
        }
    };

    let reporter = TermReporter::new();
    let engine = match Engine::new(scan_config, &reporter) {
        Ok(engine) => engine,
        Err(err) => {
            error!("{err}");
            process::exit(err.exit_code());
        }
    };

    let result = match single {
        Some(kind) => engine.run_single(&directory, kind),
        None => engine.run(&directory),
    };

    match result {
        Ok(summary) => print_summary(&summary),
        Err(err) => {
            error!("{err}");
            process::exit(err.exit_code());
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!(
        "{} checks in {}, {} findings, {} bytes wasted",
        summary.checks_run,
        format!("{:.2}s", summary.duration.as_secs_f64()).green(),
        summary.findings.to_string().red(),
        summary.wasted_bytes.to_string().red(),
    );
}
