//! Configuration management for the fanout dispatch service.

use std::{net::SocketAddr, time::Duration};

use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use fanout_sns::DispatcherConfig;
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.toml";

/// Service configuration with defaults, file, and environment
/// overrides.
///
/// Configuration is loaded in priority order:
/// 1. Environment variables (highest priority)
/// 2. Configuration file (`config.toml`)
/// 3. Built-in defaults (lowest priority)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server
    /// Server bind address.
    ///
    /// Environment variable: `HOST`
    #[serde(default = "default_host", alias = "HOST")]
    pub host: String,
    /// Server bind port.
    ///
    /// Environment variable: `PORT`
    #[serde(default = "default_port", alias = "PORT")]
    pub port: u16,
    /// HTTP request timeout in seconds.
    ///
    /// Environment variable: `REQUEST_TIMEOUT`
    #[serde(default = "default_request_timeout", alias = "REQUEST_TIMEOUT")]
    pub request_timeout: u64,

    // Webhook verification
    /// Whether inbound notifications must carry a valid provider
    /// signature.
    ///
    /// Environment variable: `VERIFY_SIGNATURES`
    #[serde(default = "default_verify_signatures", alias = "VERIFY_SIGNATURES")]
    pub verify_signatures: bool,
    /// Timeout in seconds for certificate and subscription-confirmation
    /// fetches.
    ///
    /// Environment variable: `UPSTREAM_TIMEOUT`
    #[serde(default = "default_upstream_timeout", alias = "UPSTREAM_TIMEOUT")]
    pub upstream_timeout: u64,

    // Debugging
    /// Comma-separated event names that get a payload-logging callback
    /// registered at startup. Useful when wiring new publishers.
    ///
    /// Environment variable: `ECHO_EVENTS`
    #[serde(default, alias = "ECHO_EVENTS")]
    pub echo_events: String,

    // Logging
    /// Log level configuration.
    ///
    /// Environment variable: `RUST_LOG`
    #[serde(default = "default_log_level", alias = "RUST_LOG")]
    pub rust_log: String,
}

impl Config {
    /// Loads configuration from defaults, config file, and environment
    /// variable overrides.
    ///
    /// # Errors
    ///
    /// Fails when a source cannot be parsed or validation rejects the
    /// merged result.
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(""));

        let config: Self = figment.extract().context("Failed to load configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Validates cross-field constraints.
    ///
    /// # Errors
    ///
    /// Fails on zero timeouts or an empty bind host.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.host.is_empty(), "HOST must not be empty");
        anyhow::ensure!(self.request_timeout > 0, "REQUEST_TIMEOUT must be positive");
        anyhow::ensure!(self.upstream_timeout > 0, "UPSTREAM_TIMEOUT must be positive");
        Ok(())
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Fails when host and port do not form a valid socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    /// Returns the request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Event names configured for echo logging.
    pub fn echo_event_names(&self) -> Vec<String> {
        self.echo_events
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect()
    }

    /// Converts to the dispatcher crate's configuration type.
    pub fn to_dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            verify_signatures: self.verify_signatures,
            upstream_timeout: Duration::from_secs(self.upstream_timeout),
            ..DispatcherConfig::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout: default_request_timeout(),
            verify_signatures: default_verify_signatures(),
            upstream_timeout: default_upstream_timeout(),
            echo_events: String::new(),
            rust_log: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout() -> u64 {
    30
}

fn default_verify_signatures() -> bool {
    true
}

fn default_upstream_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info,fanout=debug".to_string()
}
