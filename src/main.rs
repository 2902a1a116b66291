//! CLI entry point for the S85 status service.
//!
//! `serve` polls the departures feed in the background and serves the status
//! page; `once` runs a single cycle and prints the result.

mod web;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use s85_status::aggregate::Aggregator;
use s85_status::config::{
    AggregationSettings, DEFAULT_CANCELLATION_CODES, FeedSettings, PollSettings, PublishPolicy,
};
use s85_status::feed::VbbClient;
use s85_status::fetch::BasicClient;
use s85_status::poller::Poller;
use s85_status::store::StatusStore;
use s85_status::translate::{LingvaBackend, TranslationGateway};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::web::AppState;

type LinePoller = Poller<VbbClient<BasicClient>, TranslationGateway<LingvaBackend<BasicClient>>>;

#[derive(Parser)]
#[command(name = "s85_status")]
#[command(about = "Tells whether the S85 is running", long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Settings {
    /// Line to report on
    #[arg(long, env = "S85_LINE", default_value = "S85", global = true)]
    line: String,

    /// Stop whose departures are polled
    #[arg(long, env = "S85_STOP_ID", default_value = "900191001", global = true)]
    stop_id: String,

    #[arg(long, env = "S85_FEED_BASE_URL", default_value = "https://v6.vbb.transport.rest", global = true)]
    feed_base_url: String,

    #[arg(long, env = "S85_TRANSLATE_BASE_URL", default_value = "https://lingva.ml", global = true)]
    translate_base_url: String,

    /// Language of the departure board
    #[arg(long, env = "S85_SOURCE_LANGUAGE", default_value = "de", global = true)]
    source_language: String,

    /// Language messages are translated into
    #[arg(long, env = "S85_TARGET_LANGUAGE", default_value = "en", global = true)]
    target_language: String,

    /// Status remark code marking a departure as cancelled (repeatable)
    #[arg(
        long = "cancellation-code",
        env = "S85_CANCELLATION_CODES",
        value_delimiter = ',',
        default_values = DEFAULT_CANCELLATION_CODES.iter().copied(),
        global = true
    )]
    cancellation_codes: Vec<String>,

    /// Share of running departures that must be exceeded to report the line as running
    #[arg(long, env = "S85_RUNNING_THRESHOLD", default_value_t = 0.5, global = true)]
    running_threshold: f64,

    /// Departure window in minutes
    #[arg(long, env = "S85_DURATION_MINUTES", default_value_t = 30, global = true)]
    duration_minutes: u32,

    /// Timeout for every upstream request, in seconds
    #[arg(long, env = "S85_TIMEOUT_SECS", default_value_t = 5, global = true)]
    timeout_secs: u64,

    /// Pause between poll cycles, in seconds
    #[arg(long, env = "S85_INTERVAL_SECS", default_value_t = 60, global = true)]
    interval_secs: u64,

    /// Directory for debug snapshots written when the line is not running
    #[arg(long, env = "S85_SNAPSHOT_DIR", default_value = ".", global = true)]
    snapshot_dir: PathBuf,

    /// Keep the last published result when a cycle cannot reach the feed
    #[arg(long, env = "S85_KEEP_LAST_KNOWN_GOOD", global = true)]
    keep_last_known_good: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll the feed in the background and serve the status page
    Serve {
        /// Address to listen on
        #[arg(long, env = "S85_BIND", default_value = "0.0.0.0:4269")]
        bind: String,
    },
    /// Run a single cycle and print the result as JSON
    Once,
}

impl Settings {
    fn aggregation(&self) -> AggregationSettings {
        AggregationSettings {
            line_name: self.line.clone(),
            source_language: self.source_language.clone(),
            target_language: self.target_language.clone(),
            cancellation_codes: self.cancellation_codes.clone(),
            running_threshold: self.running_threshold,
        }
    }

    fn feed(&self) -> FeedSettings {
        FeedSettings {
            base_url: self.feed_base_url.clone(),
            stop_id: self.stop_id.clone(),
            duration_minutes: self.duration_minutes,
            language: self.source_language.clone(),
        }
    }

    fn poll(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.interval_secs),
            snapshot_dir: self.snapshot_dir.clone(),
            publish_policy: if self.keep_last_known_good {
                PublishPolicy::KeepLastKnownGood
            } else {
                PublishPolicy::Overwrite
            },
        }
    }

    fn build_poller(&self, store: StatusStore) -> Result<LinePoller> {
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout must be non-zero");
        }
        let aggregation = self.aggregation();
        aggregation.validate()?;
        let poll = self.poll();
        poll.validate()?;

        let timeout = Duration::from_secs(self.timeout_secs);
        let feed = VbbClient::new(BasicClient::new(timeout)?, self.feed());
        let translator = TranslationGateway::new(LingvaBackend::new(
            BasicClient::new(timeout)?,
            self.translate_base_url.clone(),
        ));

        Ok(Poller::new(
            Aggregator::new(feed, translator, aggregation),
            store,
            poll,
        ))
    }
}

/// Flattens the join result of the poller task. The loop only ends on failure.
fn poller_outcome(joined: Result<Result<()>, JoinError>) -> Result<()> {
    joined.map_err(anyhow::Error::from).and_then(|r| r)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/s85_status.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("s85_status.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind } => {
            let store = StatusStore::default();
            let poller = cli.settings.build_poller(store.clone())?;
            let state = AppState {
                store,
                line_name: cli.settings.line.clone(),
                source_language: cli.settings.source_language.clone(),
            };

            let poll_task = tokio::spawn(poller.run());

            tokio::select! {
                joined = poll_task => {
                    if let Err(e) = poller_outcome(joined) {
                        error!(error = %e, "Poller stopped, shutting down");
                        return Err(e);
                    }
                }
                served = web::serve(&bind, state) => {
                    served?;
                    info!("HTTP server stopped");
                }
            }
        }
        Commands::Once => {
            let mut poller = cli.settings.build_poller(StatusStore::default())?;
            let information = poller.run_once().await?;
            println!("{}", serde_json::to_string_pretty(&information)?);
        }
    }

    Ok(())
}
