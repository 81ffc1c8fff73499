//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, FetchArgs};
use crate::config::{BackfillConfig, FetchJob};
use crate::engine::{BatchFetch, PaginationEngine, RetryingFetch, Termination};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::interval::parse_interval;
use crate::output::{Destination, KlineWriter, WriteReport};
use crate::source::BinanceKlineSource;
use crate::types::EpochMillis;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

/// Summary of one backfill run
#[derive(Debug, Clone, Serialize)]
pub struct BackfillReport {
    pub symbol: String,
    pub interval: String,
    pub start_ms: EpochMillis,
    pub end_ms: EpochMillis,
    /// Records fetched
    pub records: usize,
    /// Requests that returned a batch
    pub batches: usize,
    pub failed_batches: usize,
    /// Why pagination stopped
    pub termination: Termination,
    pub first_open_time: Option<EpochMillis>,
    pub last_open_time: Option<EpochMillis>,
    pub duration_ms: u64,
    /// Where the file went, `None` when nothing was fetched
    pub written: Option<WriteReport>,
}

/// Run the full pipeline for one job: fetch every batch, then write the file.
///
/// An empty result writes nothing. A failed batch still writes whatever was
/// accumulated before it. A failed write is returned as the error, after the
/// fetch summary has been logged.
pub async fn backfill(config: &BackfillConfig, job: &FetchJob) -> Result<BackfillReport> {
    // Destination problems surface before any request is sent
    let destination = Destination::parse(&config.output.destination)?;
    let writer = KlineWriter::new(destination, config.output.format)
        .with_transform(config.transform_config())
        .with_parquet(config.parquet_writer_config());

    let client = HttpClient::with_config(config.http_client_config())?;
    let source = BinanceKlineSource::new(client).with_config(config.source_config());
    let fetcher: Box<dyn BatchFetch> = if config.pagination.retry_failed_batches > 0 {
        Box::new(RetryingFetch::new(
            source,
            config.pagination.retry_failed_batches,
            config.retry_pause(),
        ))
    } else {
        Box::new(source)
    };

    info!(
        symbol = %job.symbol,
        interval = %job.interval,
        start_ms = job.start_ms,
        end_ms = job.end_ms,
        "Starting backfill"
    );

    let engine = PaginationEngine::new().with_config(config.fetch_config());
    let outcome = engine
        .run(
            &job.symbol,
            &job.interval,
            job.start_ms,
            job.end_ms,
            fetcher.as_ref(),
        )
        .await?;

    if outcome.is_partial() {
        warn!(
            termination = %outcome.termination,
            records = outcome.records.len(),
            "Backfill stopped early, writing partial result"
        );
    }

    let written = if outcome.records.is_empty() {
        info!("No klines fetched, nothing written");
        None
    } else {
        let file_name = config.file_name(job);
        match writer.write_klines(&file_name, &outcome.records).await {
            Ok(report) => Some(report),
            Err(e) => {
                // The fetched rows are lost with the error; keep a trace of them
                error!(
                    symbol = %job.symbol,
                    interval = %job.interval,
                    file_name = %file_name,
                    records = outcome.records.len(),
                    batches = outcome.stats.batches_fetched,
                    failed_batches = outcome.stats.failed_batches,
                    termination = %outcome.termination,
                    first_open_time = ?outcome.first_open_time(),
                    last_open_time = ?outcome.last_open_time(),
                    error = %e,
                    "Fetched klines could not be written"
                );
                return Err(e);
            }
        }
    };

    Ok(BackfillReport {
        symbol: job.symbol.clone(),
        interval: job.interval.clone(),
        start_ms: job.start_ms,
        end_ms: job.end_ms,
        records: outcome.records.len(),
        batches: outcome.stats.batches_fetched,
        failed_batches: outcome.stats.failed_batches,
        termination: outcome.termination,
        first_open_time: outcome.first_open_time(),
        last_open_time: outcome.last_open_time(),
        duration_ms: outcome.stats.duration_ms,
        written,
    })
}

/// Apply `fetch` flags on top of a loaded config
pub fn apply_overrides(config: &mut BackfillConfig, args: &FetchArgs) {
    if let Some(base_url) = &args.base_url {
        config.source.base_url.clone_from(base_url);
    }
    if let Some(limit) = args.limit {
        config.source.limit = limit;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.pagination.batch_delay_ms = delay_ms;
    }
    if let Some(retries) = args.retries {
        config.pagination.retry_failed_batches = retries;
    }
    if let Some(output) = &args.output {
        config.output.destination.clone_from(output);
    }
    if let Some(format) = args.format {
        config.output.format = format;
    }
    if let Some(file_name) = &args.file_name {
        config.output.file_name = Some(file_name.clone());
    }
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Fetch(args) => self.fetch(args).await,
            Commands::Interval { token } => self.interval(token),
            Commands::Config => self.show_config(),
        }
    }

    /// Load the config file, or the defaults when none was given
    fn load_config(&self) -> Result<BackfillConfig> {
        match &self.cli.config {
            Some(path) => BackfillConfig::from_file(path),
            None => Ok(BackfillConfig::default()),
        }
    }

    async fn fetch(&self, args: &FetchArgs) -> Result<()> {
        let mut config = self.load_config()?;
        apply_overrides(&mut config, args);
        config.validate()?;

        let job = FetchJob::resolve(
            args.symbol.as_deref(),
            args.interval.as_deref(),
            args.start.as_deref(),
            args.end.as_deref(),
            Utc::now(),
        )?;

        let report = backfill(&config, &job).await?;
        self.output_message(&serde_json::to_value(&report)?);
        Ok(())
    }

    fn interval(&self, token: &str) -> Result<()> {
        let step = parse_interval(token)?;
        self.output_message(&json!({
            "interval": token,
            "millis": step.millis,
            "unit": step.unit.map(|unit| unit.to_string()),
            "fallback": step.is_fallback(),
        }));
        Ok(())
    }

    fn show_config(&self) -> Result<()> {
        let config = self.load_config()?;
        print!("{}", config.to_yaml()?);
        Ok(())
    }

    fn output_message(&self, msg: &Value) {
        let rendered = if self.cli.pretty {
            serde_json::to_string_pretty(msg)
        } else {
            serde_json::to_string(msg)
        };
        match rendered {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("{}", Error::from(e)),
        }
    }
}
