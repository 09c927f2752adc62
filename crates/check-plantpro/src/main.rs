//! check_plantpro — entry point.

use std::process::ExitCode;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use check_plantpro::config::{
    PASSWORD_ENV, DEFAULT_ATTEMPTS, DEFAULT_BACKOFF_SECS, DEFAULT_ENCODING, DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER,
};
use check_plantpro::{Credentials, HttpTransport, Probe, ProbeConfig, RetryPolicy};
use plantpro::{Report, ServiceState, ThresholdPolicy};

#[derive(Parser)]
#[command(
    name = "check_plantpro",
    about = "Check sensors and alarms of a PlantPro controller via its web interface",
    version
)]
struct Cli {
    /// Hostname or IP address of the controller.
    #[arg(short = 'H', long, required_unless_present = "completions")]
    host: Option<String>,

    /// HTTP port.
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// HTTP timeout per request, in seconds.
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Encoding of the web pages.
    #[arg(short, long, default_value = DEFAULT_ENCODING)]
    encoding: String,

    /// Login user.
    #[arg(short, long, default_value = DEFAULT_USER)]
    user: String,

    /// Login password.
    #[arg(short = 'P', long, env = PASSWORD_ENV, default_value = "", hide_env_values = true)]
    password: String,

    /// Enable debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// Warning threshold; a sensor above it is WARNING.
    #[arg(short, long, allow_negative_numbers = true)]
    warning: Option<f64>,

    /// Critical threshold; a sensor above it is CRITICAL.
    #[arg(short, long, allow_negative_numbers = true)]
    critical: Option<f64>,

    /// Only check sensors whose name contains this text,
    /// e.g. 'I/O-Modul 1.Kuehlung'.
    #[arg(short, long, default_value = "")]
    filter: String,

    /// Attempts before giving up with UNKNOWN.
    #[arg(short, long, default_value_t = DEFAULT_ATTEMPTS)]
    retries: u32,

    /// Pause between attempts, in seconds.
    #[arg(long, default_value_t = DEFAULT_BACKOFF_SECS)]
    retry_delay: u64,

    /// Give up when more than this many pages add new sensor names.
    #[arg(long)]
    max_pages: Option<u32>,

    /// Print scraped sensors and alarms as JSON instead of checking.
    #[arg(long)]
    list: bool,

    /// Generate shell completion scripts and exit.
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

impl Cli {
    fn config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::new(self.host.clone().unwrap_or_default());
        config.port = self.port;
        config.timeout = Duration::from_secs(self.timeout);
        config.encoding = self.encoding.clone();
        config.credentials = Credentials {
            user: self.user.clone(),
            password: self.password.clone(),
        };
        config.policy = ThresholdPolicy::new(self.warning, self.critical, self.filter.as_str());
        config.retry = RetryPolicy {
            attempts: self.retries,
            backoff: Duration::from_secs(self.retry_delay),
        };
        config.max_pages = self.max_pages;
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{e:#}");
            let report = Report::unknown(e.to_string());
            println!("{}", report.line());
            ExitCode::from(report.exit_code())
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "check_plantpro", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let config = cli.config();
    tracing::debug!(?config, "Configuration");
    config.validate()?;

    let transport = HttpTransport::new(&config)?;
    let probe = Probe::new(transport, config);

    if cli.list {
        let snapshot = probe.collect().await?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(ExitCode::SUCCESS);
    }

    let report = probe.check().await;
    if report.state == ServiceState::Unknown {
        tracing::error!("{}", report.message);
    }
    println!("{}", report.line());
    Ok(ExitCode::from(report.exit_code()))
}
