//! CLI argument parsing and command dispatch

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use api_bench_core::{enumerate, ExperimentBuilder};
use api_bench_vendors::{build_clients, TOKEN_ENV_VAR};
use clap::{Parser, Subcommand};

use crate::config::BenchConfig;
use crate::logging::init_logging;
use crate::progress::ProgressReporter;

/// api-bench - Controlled REST vs GraphQL performance experiments
#[derive(Parser, Debug)]
#[command(name = "api-bench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full experiment and write the results log
    Run {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Seed for the treatment order
        #[arg(long)]
        seed: Option<u64>,

        /// Override the results directory
        #[arg(long)]
        results_dir: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,

        /// API token
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the treatment order without sending requests
    Plan {
        /// Path to configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Seed for the treatment order
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Cli {
    /// Dispatch the selected command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Run {
                config,
                seed,
                results_dir,
                no_progress,
                token,
            } => {
                let mut bench = BenchConfig::load(&config)?;
                if let Some(seed) = seed {
                    bench.experiment.seed = Some(seed);
                }
                if let Some(dir) = results_dir {
                    bench.output.results_dir = dir;
                }
                bench.api = bench.api.with_token(token);

                let _guard = init_logging(&bench.logging, self.verbose, true)?;
                run_experiment(bench, &config, !no_progress).await
            }
            Commands::Validate { config } => {
                let bench = BenchConfig::load(&config)?;
                init_logging(&bench.logging, self.verbose, false)?;
                validate(&bench, &config)
            }
            Commands::Plan { config, seed } => {
                let mut bench = BenchConfig::load(&config)?;
                if let Some(seed) = seed {
                    bench.experiment.seed = Some(seed);
                }
                init_logging(&bench.logging, self.verbose, false)?;
                plan(&bench)
            }
        }
    }
}

async fn run_experiment(bench: BenchConfig, config_path: &Path, show_progress: bool) -> Result<()> {
    bench.validate()?;

    tracing::info!(
        config = %config_path.display(),
        repetitions = bench.experiment.repetitions,
        warmup_requests = bench.experiment.warmup_requests,
        concurrency = ?bench.experiment.concurrent_clients,
        expected_records = bench.experiment.expected_records(),
        authenticated = bench.api.token.is_some(),
        "Starting api-bench"
    );
    if bench.api.token.is_none() {
        tracing::warn!("{TOKEN_ENV_VAR} is not set; requests are unauthenticated and rate limited");
    }

    let clients = build_clients(&bench.api, &bench.queries, bench.experiment.timeout())
        .context("Failed to build API clients")?;

    let progress = show_progress.then(|| Arc::new(ProgressReporter::new()));
    let mut builder = ExperimentBuilder::new()
        .config(bench.experiment)
        .output(bench.output)
        .clients(clients);
    if let Some(progress) = &progress {
        builder = builder.observer(progress.clone());
    }
    let experiment = builder.build()?;

    let result = experiment.run().await;
    if let Some(progress) = &progress {
        progress.finish();
    }
    let path = result.context("Experiment aborted")?;

    println!("{}", path.display());
    Ok(())
}

fn validate(bench: &BenchConfig, config_path: &Path) -> Result<()> {
    bench.validate()?;

    let treatments = bench.experiment.factors().treatment_count();
    println!("{}: OK", config_path.display());
    println!("  Treatments:       {treatments}");
    println!("  Expected records: {}", bench.experiment.expected_records());
    println!();
    print!("{}", bench.to_toml()?);
    Ok(())
}

fn plan(bench: &BenchConfig) -> Result<()> {
    bench.validate()?;

    let treatments = enumerate(&bench.experiment.factors(), bench.experiment.seed);
    let width = treatments.len().to_string().len();
    for (i, treatment) in treatments.iter().enumerate() {
        println!(
            "{:>width$}. {treatment}  [{} records]",
            i + 1,
            treatment.concurrency_level * bench.experiment.repetitions
        );
    }
    println!();
    println!("Expected records: {}", bench.experiment.expected_records());
    if bench.experiment.seed.is_none() {
        println!("No seed configured: each run draws a new order");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "api-bench",
            "run",
            "--config",
            "experiment.toml",
            "--seed",
            "42",
            "--results-dir",
            "out",
            "--no-progress",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                config,
                seed,
                results_dir,
                no_progress,
                ..
            } => {
                assert_eq!(config, PathBuf::from("experiment.toml"));
                assert_eq!(seed, Some(42));
                assert_eq!(results_dir, Some(PathBuf::from("out")));
                assert!(no_progress);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_plan_with_global_verbose() {
        let cli = Cli::try_parse_from(["api-bench", "plan", "-c", "x.toml", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Plan { seed: None, .. }));
    }

    #[test]
    fn test_config_is_required() {
        assert!(Cli::try_parse_from(["api-bench", "validate"]).is_err());
    }
}
