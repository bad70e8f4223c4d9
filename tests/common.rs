#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::Client;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Once};
use submission_gateway::config::{Config, LogFormat, MailConfig, RateLimitConfig, ServerConfig, TelemetryConfig};
use submission_gateway::services::mail::{MailError, MailTransport, OutboundMessage};
use submission_gateway::{AppBuilder, api};
use tokio::net::TcpListener;
use tokio::sync::watch;

static INIT: Once = Once::new();

pub fn setup_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "warn".into())
            .add_directive("submission_gateway=debug".parse().unwrap())
            .add_directive("tower=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap());

        tracing_subscriber::fmt().with_env_filter(filter).init();
    });
}

/// Records every message instead of delivering it, optionally failing each attempt.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundMessage>>,
    fail_with: Option<String>,
}

impl RecordingTransport {
    pub fn failing(reason: &str) -> Self {
        Self { sent: Mutex::new(Vec::new()), fail_with: Some(reason.to_string()) }
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, message: &OutboundMessage) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(message.clone());
        match &self.fail_with {
            Some(reason) => Err(MailError::Transport(reason.clone())),
            None => Ok(()),
        }
    }
}

pub fn get_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            mgmt_port: 0,
            shutdown_timeout_secs: 1,
            max_body_bytes: 65_536,
        },
        rate_limit: RateLimitConfig { window_ms: 30_000, sweep_interval_secs: 60 },
        mail: MailConfig {
            host: Some("smtp.test.invalid".to_string()),
            port: Some(2525),
            username: Some("relay@test.invalid".to_string()),
            password: Some("password".to_string()),
            secure: false,
            recipient: Some("ir@test.invalid".to_string()),
            subject_prefix: None,
            timeout_secs: 1,
        },
        telemetry: TelemetryConfig { log_format: LogFormat::Text, otlp_endpoint: None },
    }
}

pub fn unconfigured_mail(mut config: Config) -> Config {
    config.mail.host = None;
    config.mail.port = None;
    config.mail.username = None;
    config.mail.password = None;
    config.mail.recipient = None;
    config
}

pub struct TestApp {
    pub server_url: String,
    pub mgmt_url: String,
    pub client: Client,
    pub transport: Arc<RecordingTransport>,
    pub shutdown_tx: watch::Sender<bool>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(get_test_config(), RecordingTransport::default()).await
    }

    pub async fn spawn_with(config: Config, transport: RecordingTransport) -> Self {
        setup_tracing();

        let transport = Arc::new(transport);
        let app = AppBuilder::new(config)
            .with_mail_transport(transport.clone())
            .build()
            .expect("Failed to build app");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let server_url = serve(api::app_router(app.state), shutdown_rx.clone()).await;
        let mgmt_url = serve(api::mgmt_router(app.mgmt_state), shutdown_rx.clone()).await;
        let _ = app.workers.spawn_all(shutdown_rx);

        Self { server_url, mgmt_url, client: Client::new(), transport, shutdown_tx }
    }

    pub async fn post(&self, path: &str, client_ip: &str, body: serde_json::Value) -> (u16, serde_json::Value) {
        let resp = self
            .client
            .post(format!("{}{}", self.server_url, path))
            .header("X-Forwarded-For", client_ip)
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = resp.status().as_u16();
        (status, resp.json().await.unwrap())
    }
}

async fn serve(router: axum::Router, mut shutdown_rx: watch::Receiver<bool>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.wait_for(|&s| s).await;
            })
            .await
            .unwrap();
    });

    format!("http://{addr}")
}

pub fn valid_submission() -> serde_json::Value {
    serde_json::json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "company": "Analytical Engines Ltd",
        "message": "We'd like to discuss the seed round.\nThursday works.",
        "honey": ""
    })
}
