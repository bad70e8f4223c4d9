use clap::{ArgAction, Args, Parser, ValueEnum};
use std::convert::Infallible;
use std::time::Duration;

#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Config {
    #[command(flatten)]
    pub server: ServerConfig,

    #[command(flatten)]
    pub rate_limit: RateLimitConfig,

    #[command(flatten)]
    pub mail: MailConfig,

    #[command(flatten)]
    pub telemetry: TelemetryConfig,
}

#[derive(Clone, Debug, Args)]
pub struct ServerConfig {
    /// Host to listen on
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "GATEWAY_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Port for the management (health) server
    #[arg(long, env = "GATEWAY_MGMT_PORT", default_value_t = 9090)]
    pub mgmt_port: u16,

    /// Seconds to wait for background tasks during shutdown
    #[arg(long, env = "GATEWAY_SHUTDOWN_TIMEOUT_SECS", default_value_t = 5)]
    pub shutdown_timeout_secs: u64,

    /// Maximum accepted size of a submission body in bytes
    #[arg(long, env = "GATEWAY_MAX_BODY_BYTES", default_value_t = 65_536)]
    pub max_body_bytes: usize,
}

#[derive(Clone, Debug, Args)]
pub struct RateLimitConfig {
    /// Minimum time between accepted submissions from one client
    #[arg(long = "rate-limit-window-ms", env = "GATEWAY_RATE_LIMIT_WINDOW_MS", default_value_t = 30_000)]
    pub window_ms: u64,

    /// How often to drop rate limit entries older than the window
    #[arg(
        long = "rate-limit-sweep-interval-secs",
        env = "GATEWAY_RATE_LIMIT_SWEEP_INTERVAL_SECS",
        default_value_t = 60
    )]
    pub sweep_interval_secs: u64,
}

impl RateLimitConfig {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

#[derive(Clone, Debug, Args)]
pub struct MailConfig {
    /// SMTP server host
    #[arg(id = "smtp_host", long = "smtp-host", env = "SMTP_HOST")]
    pub host: Option<String>,

    /// SMTP server port
    #[arg(id = "smtp_port", long = "smtp-port", env = "SMTP_PORT")]
    pub port: Option<u16>,

    /// SMTP account name, also used as the sender address
    #[arg(long = "smtp-user", env = "SMTP_USER")]
    pub username: Option<String>,

    /// SMTP account password
    #[arg(long = "smtp-pass", env = "SMTP_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// Use implicit TLS instead of opportunistic STARTTLS. Only the exact value `true` enables it
    #[arg(
        long = "smtp-secure",
        env = "SMTP_SECURE",
        action = ArgAction::Set,
        default_value = "false",
        value_parser = parse_secure_flag
    )]
    pub secure: bool,

    /// Inbox that receives submissions
    #[arg(long = "contact-to", env = "CONTACT_TO")]
    pub recipient: Option<String>,

    /// Text prepended to every subject line
    #[arg(long = "contact-subject-prefix", env = "CONTACT_SUBJECT_PREFIX")]
    pub subject_prefix: Option<String>,

    /// Upper bound on a single SMTP delivery attempt
    #[arg(long = "smtp-timeout-secs", env = "SMTP_TIMEOUT_SECS", default_value_t = 15)]
    pub timeout_secs: u64,
}

// Anything other than the literal `true` means plain SMTP with STARTTLS, never a startup error.
fn parse_secure_flag(value: &str) -> Result<bool, Infallible> {
    Ok(value == "true")
}

/// A mail configuration with every required value present.
#[derive(Clone, Debug)]
pub struct MailSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub secure: bool,
    pub recipient: String,
    pub subject_prefix: Option<String>,
    pub timeout: Duration,
}

impl MailConfig {
    /// Returns the complete settings, or `None` when any required value is missing or empty.
    #[must_use]
    pub fn resolve(&self) -> Option<MailSettings> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);

        Some(MailSettings {
            host: present(&self.host)?,
            port: self.port?,
            username: present(&self.username)?,
            password: self.password.clone().filter(|p| !p.is_empty())?,
            secure: self.secure,
            recipient: present(&self.recipient)?,
            subject_prefix: present(&self.subject_prefix),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }

    /// True when some, but not all, required values are set.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        let set = [
            self.host.as_deref().is_some_and(|s| !s.trim().is_empty()),
            self.port.is_some(),
            self.username.as_deref().is_some_and(|s| !s.trim().is_empty()),
            self.password.as_deref().is_some_and(|s| !s.is_empty()),
            self.recipient.as_deref().is_some_and(|s| !s.trim().is_empty()),
        ];
        set.iter().any(|&s| s) && !set.iter().all(|&s| s)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Debug, Args)]
pub struct TelemetryConfig {
    /// Log output format
    #[arg(long, env = "GATEWAY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint; export is disabled when unset
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl Config {
    #[must_use]
    pub fn load() -> Self {
        Self::parse()
    }
}
