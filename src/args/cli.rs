use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult, ValidationError};
use crate::http::{ClientSettings, GatewayTarget};
use crate::replay::ReplayOptions;

use super::defaults::{
    DEFAULT_CONCURRENCY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MIN_SPACING, DEFAULT_PROGRESS_INTERVAL,
    DEFAULT_QUEUE_HIGH, DEFAULT_QUEUE_LOW, DEFAULT_REDIRECT_LIMIT, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_SPACING_PENALTY,
};
use super::parsers::{parse_duration_arg, parse_duration_or_zero, parse_positive_usize};
use super::types::{GatewayScheme, PositiveUsize, UrlStyle};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Replay a local CSV of recorded fetches against the gateway
    Start(StartArgs),
    /// Download a CSV from the gateway by CID and file name, then replay it
    #[command(name = "start-w3")]
    StartW3(StartW3Args),
    /// Fetch one CID over and over until the gateway answers with a non-2xx status
    Saturate(SaturateArgs),
    /// Randomly distribute the records of a CSV across several files
    Split(SplitArgs),
    /// Extract ts,cid,path records from a gateway access log
    Transform(TransformArgs),
}

#[derive(Debug, Args, Clone)]
pub struct StartArgs {
    /// CSV file with a ts,cid[,path] header
    pub input: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct StartW3Args {
    /// CID of the directory holding the input file
    #[arg(env = "CSV_DIR_CID")]
    pub cid: String,

    /// Name of the CSV file below that CID
    #[arg(env = "CSV_FILE_NAME")]
    pub file_name: String,
}

#[derive(Debug, Args, Clone)]
pub struct SaturateArgs {
    /// CID to fetch repeatedly
    pub cid: String,

    /// Path below the CID root
    #[arg(long = "path", default_value = "")]
    pub path: String,

    /// Stop after this many requests even if the gateway keeps answering 2xx
    #[arg(long = "max-requests", value_parser = parse_positive_usize)]
    pub max_requests: Option<PositiveUsize>,
}

#[derive(Debug, Args, Clone)]
pub struct SplitArgs {
    /// CSV file to split
    pub input: PathBuf,

    /// Number of output files
    #[arg(value_parser = parse_positive_usize)]
    pub count: PositiveUsize,

    /// Directory for 0.csv .. N-1.csv (defaults to a new temp directory)
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct TransformArgs {
    /// Access log to read
    pub input: PathBuf,

    /// Directory for the generated <unix-ms>.csv
    #[arg(long = "out-dir", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Replays recorded IPFS gateway fetches with their original timing, stops on the first rate-limit response, and reports latency."
)]
pub struct ReplayArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Gateway host, e.g. dweb.link (requests go to <cid>.ipfs.<host>)
    #[arg(long = "gateway-host", env = "IPFS_GATEWAY", global = true)]
    pub gateway_host: Option<String>,

    /// Scheme for gateway requests
    #[arg(long = "gateway-scheme", value_enum, default_value = "https", global = true)]
    pub gateway_scheme: GatewayScheme,

    /// Put the CID in the subdomain or in the /ipfs/ path
    #[arg(long = "url-style", value_enum, default_value = "subdomain", global = true)]
    pub url_style: UrlStyle,

    /// Maximum requests executing at once
    #[arg(
        long,
        short = 'c',
        default_value = DEFAULT_CONCURRENCY,
        value_parser = parse_positive_usize,
        global = true
    )]
    pub concurrency: PositiveUsize,

    /// Queued-but-not-completed depth at which reading pauses
    #[arg(
        long = "queue-high",
        default_value = DEFAULT_QUEUE_HIGH,
        value_parser = parse_positive_usize,
        global = true
    )]
    pub queue_high: PositiveUsize,

    /// Depth the queue must drain to before reading resumes
    #[arg(long = "queue-low", default_value = DEFAULT_QUEUE_LOW, global = true)]
    pub queue_low: usize,

    /// Minimum gap between two starts on one worker (0 disables; ms/s/m/h)
    #[arg(
        long = "min-spacing",
        default_value = DEFAULT_MIN_SPACING,
        value_parser = parse_duration_or_zero,
        global = true
    )]
    pub min_spacing: Duration,

    /// Extra wait for a worker that started again too soon (ms/s/m/h)
    #[arg(
        long = "spacing-penalty",
        default_value = DEFAULT_SPACING_PENALTY,
        value_parser = parse_duration_or_zero,
        global = true
    )]
    pub spacing_penalty: Duration,

    /// Per-request deadline (ms/s/m/h)
    #[arg(
        long = "timeout",
        default_value = DEFAULT_REQUEST_TIMEOUT,
        value_parser = parse_duration_arg,
        global = true
    )]
    pub request_timeout: Duration,

    /// TCP connect timeout (ms/s/m/h)
    #[arg(
        long = "connect-timeout",
        default_value = DEFAULT_CONNECT_TIMEOUT,
        value_parser = parse_duration_arg,
        global = true
    )]
    pub connect_timeout: Duration,

    /// Interval between progress log lines (0 disables; ms/s/m/h)
    #[arg(
        long = "progress-interval",
        default_value = DEFAULT_PROGRESS_INTERVAL,
        value_parser = parse_duration_or_zero,
        global = true
    )]
    pub progress_interval: Duration,

    /// Read response bodies to the end before completing a request
    #[arg(long = "drain-body", global = true)]
    pub drain_body: bool,

    /// Maximum redirects to follow (0 disables)
    #[arg(long = "redirect", default_value = DEFAULT_REDIRECT_LIMIT, global = true)]
    pub redirect_limit: u32,

    /// Close connections after each request
    #[arg(long = "disable-keepalive", global = true)]
    pub disable_keepalive: bool,

    /// Accept invalid TLS certificates
    #[arg(long = "insecure", global = true)]
    pub insecure: bool,

    /// Do not send the default User-Agent header
    #[arg(long = "no-ua", global = true)]
    pub no_ua: bool,

    /// Write the run summary as JSON to this path
    #[arg(long = "summary-json", global = true)]
    pub summary_json: Option<PathBuf>,

    /// Do not print the text summary
    #[arg(long = "quiet", short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging (set GATEWAY_REPLAY_LOG or RUST_LOG for custom filters)
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to config file (TOML or JSON). Defaults to ./gateway-replay.toml or ./gateway-replay.json if present.
    #[arg(long = "config", global = true)]
    pub config: Option<String>,
}

impl ReplayArgs {
    /// Engine options from the parsed arguments.
    ///
    /// # Errors
    ///
    /// Returns an error when the options fail cross-field validation.
    pub fn replay_options(&self) -> AppResult<ReplayOptions> {
        let options = ReplayOptions {
            concurrency: self.concurrency.get(),
            queue_high: self.queue_high.get(),
            queue_low: self.queue_low,
            min_spacing: self.min_spacing,
            spacing_penalty: self.spacing_penalty,
            request_timeout: self.request_timeout,
            progress_interval: (!self.progress_interval.is_zero())
                .then_some(self.progress_interval),
        };
        options.validate()?;
        Ok(options)
    }

    #[must_use]
    pub const fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            connect_timeout: self.connect_timeout,
            redirect_limit: self.redirect_limit,
            disable_keepalive: self.disable_keepalive,
            insecure: self.insecure,
            no_ua: self.no_ua,
        }
    }

    /// Gateway target from the host, scheme and URL style options.
    ///
    /// # Errors
    ///
    /// Returns an error when no gateway host is configured or it is invalid.
    pub fn gateway_target(&self) -> AppResult<GatewayTarget> {
        let host = self
            .gateway_host
            .as_deref()
            .ok_or_else(|| AppError::validation(ValidationError::MissingGatewayHost))?;
        GatewayTarget::new(self.gateway_scheme, host, self.url_style)
    }
}
