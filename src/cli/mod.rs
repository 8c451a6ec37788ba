pub mod commands;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "storywire")]
#[command(about = "Polls news feeds and queues new stories for scraping", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/storywire/config.toml)
    #[arg(short, long, global = true, env = "STORYWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides shared by commands that touch the pipeline.
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    /// Feed whitelist file (name,address,ignored,lang per line)
    #[arg(short, long, env = "STORYWIRE_SOURCES")]
    pub sources: Option<PathBuf>,

    /// Queue database
    #[arg(short, long, env = "STORYWIRE_QUEUE")]
    pub queue: Option<PathBuf>,

    /// Dedup cache database
    #[arg(long, env = "STORYWIRE_CACHE")]
    pub cache: Option<PathBuf>,

    /// Number of sources processed at once
    #[arg(short, long)]
    pub workers: Option<usize>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll all sources forever
    Run {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Pause between cycles (e.g., "30m", "1h", "90s")
        #[arg(short, long)]
        interval: Option<String>,

        /// Pause before the first cycle
        #[arg(long)]
        startup_delay: Option<String>,

        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Run a single cycle now and print a summary
    Once {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
    /// List configured sources and their canonicalization kinds
    Sources {
        /// Feed whitelist file
        #[arg(short, long, env = "STORYWIRE_SOURCES")]
        sources: Option<PathBuf>,
    },
    /// Show the canonical form of a URL
    Canonicalize {
        url: String,

        /// Canonicalization kind (default, strip_quotes_ascii, ascii, world_prefix)
        #[arg(short, long)]
        kind: Option<String>,

        /// Use the kind configured for this source name
        #[arg(long, conflicts_with = "kind")]
        source: Option<String>,
    },
    /// Show messages waiting in the scraper queue
    Queue {
        /// Queue database
        #[arg(short, long, env = "STORYWIRE_QUEUE")]
        queue: Option<PathBuf>,

        /// Maximum messages to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Print a commented default config file
    Config,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "storywire",
            "run",
            "--sources",
            "/src/whitelist_urls.csv",
            "--queue",
            "/tmp/q.db",
            "--interval",
            "45m",
            "--cycles",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                pipeline,
                interval,
                cycles,
                startup_delay,
            } => {
                assert_eq!(pipeline.sources, Some(PathBuf::from("/src/whitelist_urls.csv")));
                assert_eq!(pipeline.queue, Some(PathBuf::from("/tmp/q.db")));
                assert_eq!(interval.as_deref(), Some("45m"));
                assert_eq!(cycles, Some(2));
                assert!(startup_delay.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_canonicalize_kind_and_source_conflict() {
        let result = Cli::try_parse_from([
            "storywire",
            "canonicalize",
            "http://a.com/x",
            "--kind",
            "ascii",
            "--source",
            "upi",
        ]);
        assert!(result.is_err());
    }
}
