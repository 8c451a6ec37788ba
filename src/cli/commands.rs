use std::sync::Arc;
use std::time::Duration;

use crate::app::{AppContext, Result, StorywireError};
use crate::canonical::{canonicalize, SourceKind};
use crate::cli::PipelineArgs;
use crate::config::{load_sources, Config};
use crate::daemon::{Daemon, DaemonConfig};
use crate::store::SqliteQueue;

/// Layer command-line overrides onto the loaded config.
pub fn apply_overrides(config: &mut Config, args: &PipelineArgs) {
    if let Some(sources) = &args.sources {
        config.sources_file = Some(sources.clone());
    }
    if let Some(queue) = &args.queue {
        config.endpoints.queue = Some(queue.clone());
    }
    if let Some(cache) = &args.cache {
        config.endpoints.cache = Some(cache.clone());
    }
    if let Some(workers) = args.workers {
        config.pipeline.workers = workers;
    }
}

fn parse_duration(s: &str) -> Result<Duration> {
    DaemonConfig::parse_interval(s)
        .map(Duration::from_secs)
        .map_err(StorywireError::Config)
}

pub async fn run_daemon(
    config: &Config,
    interval: Option<&str>,
    startup_delay: Option<&str>,
    cycles: Option<u64>,
) -> Result<()> {
    let mut daemon_config = DaemonConfig::from_config(config);
    if let Some(interval) = interval {
        daemon_config.cycle_interval = parse_duration(interval)?;
    }
    if let Some(delay) = startup_delay {
        daemon_config.startup_delay = parse_duration(delay)?;
    }
    daemon_config.max_cycles = cycles;

    println!("Running. See the log for further information.");

    let ctx = Arc::new(AppContext::new(config)?);
    Daemon::new(ctx, daemon_config).run().await;
    Ok(())
}

pub async fn run_once(config: &Config) -> Result<()> {
    let ctx = Arc::new(AppContext::new(config)?);
    let daemon = Daemon::new(ctx, DaemonConfig::from_config(config));

    let report = daemon.run_cycle().await;
    println!(
        "{} sources: {} fetched, {} published, {} already seen, {} dropped, {} fetch errors, {} aborted",
        report.sources,
        report.fetched,
        report.published,
        report.already_seen,
        report.dropped,
        report.fetch_failures,
        report.aborted
    );
    Ok(())
}

pub fn list_sources(config: &Config) -> Result<()> {
    let sources = load_sources(config.sources_file.as_deref(), &config.kind_registry());

    if sources.is_empty() {
        println!("No sources");
        return Ok(());
    }

    for source in sources.iter() {
        println!(
            "{:<16} {:<4} {:<20} {}",
            source.name, source.lang, source.kind, source.address
        );
    }
    Ok(())
}

pub fn canonicalize_url(
    config: &Config,
    url: &str,
    kind: Option<&str>,
    source: Option<&str>,
) -> Result<()> {
    let kind = resolve_kind(config, kind, source)?;
    let canonical = canonicalize(url, kind)?;
    println!("{}", canonical);
    Ok(())
}

fn resolve_kind(config: &Config, kind: Option<&str>, source: Option<&str>) -> Result<SourceKind> {
    match (kind, source) {
        (Some(kind), _) => kind.parse(),
        (None, Some(name)) => Ok(config.kind_registry().kind_for(name)),
        (None, None) => Ok(SourceKind::Default),
    }
}

pub fn show_queue(config: &Config, limit: usize) -> Result<()> {
    let path = config
        .queue_path()
        .map_err(|e| StorywireError::Config(e.to_string()))?;
    let queue = SqliteQueue::new(&path, config.pipeline.queue_name.clone())?;

    println!("{}: {} messages", queue.name(), queue.depth()?);
    for message in queue.pending(limit)? {
        let when = message
            .enqueued_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default();
        println!("  #{} {} {}", message.id, when, message.body);
    }
    Ok(())
}

pub fn print_default_config() {
    print!("{}", Config::default_config_content());
}
