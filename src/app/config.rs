use clap::Parser;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigError;
use crate::models::locale::Locale;
use crate::models::payment::PaymentMethod;

#[derive(Debug, Parser)]
#[command(name = "donate-flash", about = "Donation overlay server for streaming browser sources")]
pub struct Cli {
    /// TOML file with settings; environment variables override it.
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub token: String,
    pub public_base_url: Option<String>,
    pub tick_interval_ms: u64,
    pub event_buffer_size: usize,
    pub locale: Locale,
    pub payment_methods: Vec<PaymentMethod>,
}

/// Same keys as the environment, all optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub token: Option<String>,
    pub public_base_url: Option<String>,
    pub tick_interval_ms: Option<u64>,
    pub event_buffer_size: Option<usize>,
    pub locale: Option<Locale>,
    pub payment_methods: Option<Vec<PaymentMethod>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            token: String::new(),
            public_base_url: None,
            tick_interval_ms: 1000,
            event_buffer_size: 64,
            locale: Locale::En,
            payment_methods: PaymentMethod::ALL.to_vec(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = &cli.config {
            config.apply_file(FileConfig::read(path)?);
        }
        config.apply_env(|key| env::var(key).ok());
        if let Some(port) = cli.port {
            config.server_port = port;
        }
        Ok(config)
    }

    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(port) = file.port {
            self.server_port = port;
        }
        if let Some(token) = file.token {
            self.token = token;
        }
        if file.public_base_url.is_some() {
            self.public_base_url = file.public_base_url;
        }
        if let Some(ms) = file.tick_interval_ms {
            self.tick_interval_ms = ms;
        }
        if let Some(size) = file.event_buffer_size {
            self.event_buffer_size = size;
        }
        if let Some(locale) = file.locale {
            self.locale = locale;
        }
        if let Some(methods) = file.payment_methods {
            self.payment_methods = methods;
        }
    }

    /// Malformed values keep the current setting.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        self.server_port = parse_or(var("PORT"), self.server_port);
        if let Some(token) = var("TOKEN") {
            self.token = token;
        }
        if let Some(url) = var("PUBLIC_BASE_URL") {
            self.public_base_url = Some(url);
        }
        self.tick_interval_ms = parse_or(var("TICK_INTERVAL_MS"), self.tick_interval_ms);
        self.event_buffer_size = parse_or(var("EVENT_BUFFER_SIZE"), self.event_buffer_size);
        if let Some(raw) = var("LOCALE") {
            match raw.parse() {
                Ok(locale) => self.locale = locale,
                Err(e) => warn!("Ignoring LOCALE: {}", e),
            }
        }
        if let Some(raw) = var("PAYMENT_METHODS") {
            let methods: Vec<PaymentMethod> = raw
                .split(',')
                .filter(|name| !name.trim().is_empty())
                .filter_map(|name| match name.trim().parse() {
                    Ok(method) => Some(method),
                    Err(e) => {
                        warn!("Ignoring {}", e);
                        None
                    }
                })
                .collect();
            if methods.is_empty() {
                warn!("PAYMENT_METHODS accepted nothing, keeping {:?}", self.payment_methods);
            } else {
                self.payment_methods = methods;
            }
        }
    }

    pub fn base_url(&self) -> String {
        self.public_base_url
            .clone()
            .unwrap_or_else(|| format!("http://localhost:{}", self.server_port))
    }
}

impl FileConfig {
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, current: T) -> T {
    raw.and_then(|value| value.trim().parse().ok()).unwrap_or(current)
}
