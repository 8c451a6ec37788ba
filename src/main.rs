use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storywire::cli::{commands, Cli, Commands};
use storywire::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            pipeline,
            interval,
            startup_delay,
            cycles,
        } => {
            commands::apply_overrides(&mut config, &pipeline);
            commands::run_daemon(&config, interval.as_deref(), startup_delay.as_deref(), cycles)
                .await?;
        }
        Commands::Once { pipeline } => {
            commands::apply_overrides(&mut config, &pipeline);
            commands::run_once(&config).await?;
        }
        Commands::Sources { sources } => {
            if sources.is_some() {
                config.sources_file = sources;
            }
            commands::list_sources(&config)?;
        }
        Commands::Canonicalize { url, kind, source } => {
            commands::canonicalize_url(&config, &url, kind.as_deref(), source.as_deref())?;
        }
        Commands::Queue { queue, limit } => {
            if queue.is_some() {
                config.endpoints.queue = queue;
            }
            commands::show_queue(&config, limit)?;
        }
        Commands::Config => commands::print_default_config(),
    }

    Ok(())
}
