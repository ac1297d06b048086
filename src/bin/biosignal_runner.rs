//! Runs the configured experiment grid against the synthetic environment.

use biosignal_core::config::{ConfigLoader, ExperimentConfig, RunOverrides};
use biosignal_core::experiment::{ExperimentGrid, SyntheticEnvironment};
use biosignal_core::observe::{init_logging, LogConfig};
use biosignal_core::BioResult;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "biosignal-runner", version, about = "Record degraded biosignals across an experiment grid")]
struct Cli {
    /// Configuration files, later files override earlier ones
    #[arg(short, long = "config")]
    configs: Vec<PathBuf>,

    /// Output directory for CSV records, snapshots and the manifest
    #[arg(long)]
    result_dir: Option<PathBuf>,

    /// Master seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    max_steps: Option<u32>,

    /// Sleep one fixed time step per recorded tick
    #[arg(long)]
    realtime: bool,

    /// Debug-level logging with source locations
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Log errors only
    #[arg(short, long)]
    quiet: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

fn load_config(cli: &Cli) -> BioResult<ExperimentConfig> {
    let loader = if cli.configs.is_empty() {
        ConfigLoader::new()
    } else {
        ConfigLoader::with_paths(cli.configs.clone())
    };

    let logging = if cli.verbose {
        Some(LogConfig::development())
    } else if cli.quiet {
        Some(LogConfig::quiet())
    } else {
        None
    };
    let overrides = RunOverrides {
        result_dir: cli.result_dir.clone(),
        seed: cli.seed,
        max_steps: cli.max_steps,
        realtime: cli.realtime,
        logging,
    };

    Ok(overrides.apply(loader.load()?)?)
}

fn run(cli: Cli) -> BioResult<()> {
    let config = load_config(&cli)?;

    if cli.dump_config {
        let text = toml::to_string_pretty(&config)
            .map_err(|e| biosignal_core::BioError::configuration("dump_config", e.to_string()))?;
        println!("{}", text);
        return Ok(());
    }

    init_logging(&config.logging);

    let mut env = match config.experiment.seed {
        Some(seed) => SyntheticEnvironment::from_master_seed(seed, config.experiment.warmup_ticks),
        None => SyntheticEnvironment::new(config.experiment.warmup_ticks),
    };

    let grid = ExperimentGrid::new(config);
    let manifest = grid.run(&mut env)?;
    tracing::info!(
        completed = manifest.completed(),
        failed = manifest.failed(),
        "Run finished"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Experiment run failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
