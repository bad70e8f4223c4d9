#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::todo)]
#![warn(clippy::panic)]
#![warn(clippy::dbg_macro)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::clone_on_ref_ptr)]
#![warn(unreachable_pub)]
#![warn(missing_debug_implementations)]
#![warn(unused_qualifications)]
#![deny(unused_must_use)]

pub mod adapters;
pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod services;
pub mod telemetry;
pub mod workers;

use crate::adapters::smtp::SmtpMailTransport;
use crate::api::{AppState, MgmtState};
use crate::config::Config;
use crate::services::mail::{MailDispatcher, MailError, MailTransport};
use crate::services::rate_limiter::RateLimiter;
use crate::services::submission_service::SubmissionService;
use crate::workers::RateLimitSweepWorker;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Wires configuration into the services behind both routers.
#[derive(Debug)]
pub struct AppBuilder {
    config: Config,
    mail_transport: Option<Arc<dyn MailTransport>>,
}

/// Everything `main` needs to serve traffic.
#[derive(Debug)]
pub struct App {
    pub state: AppState,
    pub mgmt_state: MgmtState,
    pub workers: Workers,
}

#[derive(Debug)]
pub struct Workers {
    pub rate_limit_sweep: RateLimitSweepWorker,
}

impl Workers {
    #[must_use]
    pub fn spawn_all(self, shutdown_rx: watch::Receiver<bool>) -> Vec<JoinHandle<()>> {
        vec![tokio::spawn(self.rate_limit_sweep.run(shutdown_rx))]
    }
}

impl AppBuilder {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config, mail_transport: None }
    }

    /// Replaces the SMTP transport. Whether mail is sent at all is still decided by the mail
    /// configuration.
    #[must_use]
    pub fn with_mail_transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.mail_transport = Some(transport);
        self
    }

    /// # Errors
    /// Returns an error if the SMTP transport cannot be constructed from a complete configuration.
    pub fn build(self) -> Result<App, MailError> {
        let dispatcher = match self.config.mail.resolve() {
            Some(settings) => {
                let transport = match self.mail_transport {
                    Some(transport) => transport,
                    None => Arc::new(SmtpMailTransport::new(&settings)?),
                };
                tracing::info!(
                    host = %settings.host,
                    port = settings.port,
                    secure = settings.secure,
                    "Mail delivery enabled"
                );
                MailDispatcher::new(&settings, transport)
            }
            None => {
                if self.config.mail.is_partial() {
                    tracing::warn!("Mail configuration is incomplete, treating it as absent");
                }
                tracing::info!("Mail delivery disabled, submissions will get the mailto fallback");
                MailDispatcher::unconfigured()
            }
        };

        let limiter = RateLimiter::new(self.config.rate_limit.window());
        let sweep_interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
        let submission_service = SubmissionService::new(limiter.clone(), dispatcher);

        Ok(App {
            mgmt_state: MgmtState { mail_configured: submission_service.mail_configured() },
            state: AppState { config: self.config, submission_service },
            workers: Workers { rate_limit_sweep: RateLimitSweepWorker::new(limiter, sweep_interval) },
        })
    }
}

/// Flips the shutdown channel on Ctrl-C or SIGTERM.
pub fn spawn_signal_handler(shutdown_tx: watch::Sender<bool>) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => {},
            () = terminate => {},
        }

        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });
}

/// Routes panics through `tracing` so they reach the configured log output.
pub fn setup_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let location = info.location().map(|l| format!("{}:{}", l.file(), l.line())).unwrap_or_default();
        let payload = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();

        tracing::error!(panic.location = %location, panic.message = %payload, "Panic occurred");
    }));
}
