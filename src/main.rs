mod accolades;
mod api;
mod cache;
mod config;
mod error;
mod h2h;
mod history;
mod leaderboards;
mod league;
mod paths;
mod pipeline;
mod preview;
mod render;
mod report;
mod standings;
mod store;

use anyhow::Context as _;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "league-site")]
#[command(about = "Builds the fantasy league report and preview site, recomputing only what is stale", long_about = None)]
struct Cli {
    /// Re-fetch every completed week of the current season and rebuild all data
    #[arg(long)]
    force_refresh: bool,

    /// Config file path (defaults to league-site.yaml in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a sample configuration and exit
    #[arg(long)]
    sample_config: bool,

    /// Write the effective configuration (file plus defaults) to this path and exit
    #[arg(long, value_name = "PATH")]
    save_config: Option<PathBuf>,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = config::Config::load_or_default(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(path) = &cli.save_config {
        config
            .save_to_file(path)
            .with_context(|| format!("failed to save configuration to {}", path.display()))?;
        info!("Saved configuration to {}", path.display());
        return Ok(());
    }
    let source = api::source_from_config(&config).context("failed to set up the league source")?;
    let ctx = pipeline::Context::new(config, source);

    let summary = pipeline::run(&ctx, cli.force_refresh).context("site build failed")?;
    info!(
        "Done: {:?} via {:?}, {} files written, {} pages rendered",
        summary.state,
        summary.pass,
        summary.written.len(),
        summary.pages.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.sample_config {
        print!("{}", config::generate_sample_config());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            if e.downcast_ref::<error::PipelineError>().map_or(false, |pe| pe.is_transient()) {
                warn!("Existing artifacts were left untouched; re-run once the league source is reachable");
            }
            ExitCode::FAILURE
        }
    }
}
