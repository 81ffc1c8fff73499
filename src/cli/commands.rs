//! CLI commands and argument parsing

use crate::types::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kline backfill CLI
#[derive(Parser, Debug)]
#[command(name = "kline-backfill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Pretty-print JSON summaries
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a kline range and write it out
    Fetch(FetchArgs),

    /// Show how an interval token maps to milliseconds
    Interval {
        /// Interval token, e.g. 15m, 4h, 1d
        token: String,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Arguments for `fetch`; each one overrides the config file
#[derive(clap::Args, Debug, Default, Clone)]
pub struct FetchArgs {
    /// Trading pair symbol [default: BTCUSDT]
    #[arg(short, long)]
    pub symbol: Option<String>,

    /// Kline interval [default: 1h]
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Range start: epoch ms, YYYY-MM-DD or RFC 3339 [default: 365 days before end]
    #[arg(long)]
    pub start: Option<String>,

    /// Range end (exclusive): epoch ms, YYYY-MM-DD or RFC 3339 [default: now]
    #[arg(long)]
    pub end: Option<String>,

    /// Output destination (local path or cloud URL)
    /// Supports: /path, s3://bucket/path, r2://bucket/path, gs://bucket/path, az://container/path
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output file format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Output file name [default: binance_{symbol}_{interval}_data.{ext}]
    #[arg(long)]
    pub file_name: Option<String>,

    /// Records requested per batch
    #[arg(long)]
    pub limit: Option<u32>,

    /// Pause between batches in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Extra attempts for a failed batch
    #[arg(long)]
    pub retries: Option<u32>,

    /// Exchange REST base URL
    #[arg(long)]
    pub base_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::parse_from([
            "kline-backfill",
            "fetch",
            "--symbol",
            "ETHUSDT",
            "-i",
            "15m",
            "--start",
            "2024-01-01",
            "--format",
            "parquet",
            "--delay-ms",
            "0",
            "--verbose",
        ]);

        assert!(cli.verbose);
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.symbol.as_deref(), Some("ETHUSDT"));
        assert_eq!(args.interval.as_deref(), Some("15m"));
        assert_eq!(args.start.as_deref(), Some("2024-01-01"));
        assert_eq!(args.format, Some(OutputFormat::Parquet));
        assert_eq!(args.delay_ms, Some(0));
        assert!(args.end.is_none());
    }

    #[test]
    fn test_parse_interval_and_global_config() {
        let cli = Cli::parse_from(["kline-backfill", "interval", "4h", "-C", "backfill.yaml"]);
        assert_eq!(cli.config, Some(PathBuf::from("backfill.yaml")));
        assert!(matches!(cli.command, Commands::Interval { ref token } if token == "4h"));
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
