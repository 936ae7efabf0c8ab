use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use futures_util::StreamExt;
use log::{info, warn};
use movies_service::config::{
    DEFAULT_MOVIE_INFO_URL, DEFAULT_REVIEWS_URL, DEFAULT_TIMEOUT_SECS, GatewayConfig,
};
use movies_service::http::{MAX_RETRIES, RETRY_DELAY_MS, RetryPolicy};
use tokio_util::sync::CancellationToken;

/// movies-service - movie info and reviews in one response
///
/// Fetches a movie from the movie-info service together with its reviews
/// from the reviews service. Server errors from either service are retried
/// with a fixed delay.
///
/// Examples:
///   movies-service movie 1      # Print movie 1 with its reviews
///   movies-service stream       # Print every movie info as NDJSON
#[derive(Parser, Debug)]
#[command(author, version = env!("MOVIES_SERVICE_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the movie-info service
    #[arg(
        long = "movie-info-url",
        env = "MOVIE_INFO_URL",
        value_name = "URL",
        default_value = DEFAULT_MOVIE_INFO_URL,
        global = true
    )]
    pub movie_info_url: String,

    /// Base URL of the reviews service
    #[arg(
        long = "reviews-url",
        env = "REVIEWS_URL",
        value_name = "URL",
        default_value = DEFAULT_REVIEWS_URL,
        global = true
    )]
    pub reviews_url: String,

    /// Per-request timeout in seconds
    #[arg(
        long = "timeout-secs",
        env = "UPSTREAM_TIMEOUT_SECS",
        value_name = "SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        global = true
    )]
    pub timeout_secs: u64,

    /// Retries after a server error from an upstream service
    #[arg(
        long = "max-retries",
        env = "UPSTREAM_MAX_RETRIES",
        value_name = "N",
        default_value_t = MAX_RETRIES,
        global = true
    )]
    pub max_retries: usize,

    /// Delay between retries in milliseconds
    #[arg(
        long = "retry-delay-ms",
        env = "UPSTREAM_RETRY_DELAY_MS",
        value_name = "MS",
        default_value_t = RETRY_DELAY_MS,
        global = true
    )]
    pub retry_delay_ms: u64,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print a movie together with its reviews
    Movie(MovieArgs),

    /// Print movie infos from the movie-info stream as NDJSON
    Stream(StreamArgs),
}

#[derive(clap::Args, Debug)]
pub struct MovieArgs {
    /// Identifier of the movie in the movie-info service
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct StreamArgs {
    /// Stop after this many movie infos
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

impl Cli {
    fn config(&self) -> Result<GatewayConfig> {
        let retry = RetryPolicy::new(
            self.max_retries,
            Duration::from_millis(self.retry_delay_ms),
        );
        Ok(GatewayConfig::new(&self.movie_info_url, &self.reviews_url)?
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(retry))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let aggregator = cli.config()?.build_aggregator()?;

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            on_ctrl_c.cancel();
        }
    });

    match cli.command {
        Commands::Movie(args) => {
            let movie = aggregator
                .get_aggregated_movie_with_cancel(&args.id, &cancel)
                .await
                .map_err(|e| anyhow::anyhow!("[{}] {}", e.response_status(), e))?;
            let json = serde_json::to_string_pretty(&movie)
                .context("Failed to serialize aggregated movie")?;
            println!("{}", json);
        }
        Commands::Stream(args) => {
            let stream = aggregator
                .stream_movie_infos(&cancel)
                .await
                .map_err(|e| anyhow::anyhow!("[{}] {}", e.response_status(), e))?;
            let mut stream = std::pin::pin!(
                stream
                    .take(args.limit.unwrap_or(usize::MAX))
                    .take_until(cancel.cancelled())
            );

            let mut printed = 0usize;
            while let Some(item) = stream.next().await {
                match item {
                    Ok(movie_info) => {
                        println!("{}", serde_json::to_string(&movie_info)?);
                        printed += 1;
                    }
                    Err(e) => warn!("Skipping movie info: {}", e),
                }
            }
            info!("Printed {} movie infos", printed);
        }
    }
    Ok(())
}
