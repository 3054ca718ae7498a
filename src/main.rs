//! commute-cache - offline cache proxy for the commute tracker
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use commute_cache::cli::{commands, Cli, Commands};
use commute_cache::config::{Config, ConfigManager};
use commute_cache::error::ProxyResult;
use commute_cache::ui;
use console::style;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ProxyResult<()> {
    let cli = Cli::parse();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(cli.verbose, &config);
    ui::init_theme();

    if let Commands::Config(args) = cli.command {
        return commands::config(args, &config_manager, &config).await;
    }

    ConfigManager::ensure_state_dirs().await?;

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Install => commands::install(&config).await,
        Commands::Activate => commands::activate(&config).await,
        Commands::Fetch(args) => commands::fetch(args, &config).await,
        Commands::Message(args) => commands::message(args, &config).await,
        Commands::ClearCache(args) => commands::clear_cache(args, &config).await,
        Commands::Push(args) => commands::push(args, &config).await,
        Commands::Click(args) => commands::click(args, &config).await,
        Commands::Sync(args) => commands::sync(args, &config).await,
        Commands::Buckets(args) => commands::buckets(args, &config).await,
        Commands::Status => commands::status(&config).await,
    }
}

/// 0 = warn (spinners only), 1 = info, 2+ = debug; `general.verbose` counts as one
fn init_logging(verbose: u8, config: &Config) {
    let level = verbose.max(u8::from(config.general.verbose));
    let filter = match level {
        0 => EnvFilter::new("commute_cache=warn"),
        1 => EnvFilter::new("commute_cache=info"),
        _ => EnvFilter::new("commute_cache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        builder.json().init();
    } else {
        builder.with_target(false).without_time().init();
    }
}
