use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// Number of intake events kept for the /logs page
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

/// A downstream webhook that receives a copy of every intake payload.
///
/// The URL frequently embeds an access token in its path, so it is never
/// logged as-is; use [`Destination::redacted_url`].
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Destination {
    pub name: String,
    pub url: String,
}

impl Destination {
    /// Scheme and host only, safe to print.
    pub fn redacted_url(&self) -> String {
        match reqwest::Url::parse(&self.url) {
            Ok(url) => format!("{}://{}/…", url.scheme(), url.host_str().unwrap_or("?")),
            Err(_) => "<invalid url>".to_string(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_capacity() -> usize {
    200
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            destinations: Vec::new(),
        }
    }
}

impl Config {
    /// Address the HTTP listener binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay.timeout_secs)
    }

    /// Load the config file (all defaults when it does not exist), then apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Config::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values looked up by environment variable name.
    ///
    /// `RELAY_DESTINATIONS` replaces the configured destinations entirely; it
    /// is a comma-separated list of `name=url` or bare `url` entries.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT: {}", port))?;
        }
        if let Some(capacity) = lookup("HISTORY_CAPACITY") {
            self.history.capacity = capacity
                .trim()
                .parse()
                .with_context(|| format!("Invalid HISTORY_CAPACITY: {}", capacity))?;
        }
        if let Some(timeout) = lookup("RELAY_TIMEOUT_SECS") {
            self.relay.timeout_secs = timeout
                .trim()
                .parse()
                .with_context(|| format!("Invalid RELAY_TIMEOUT_SECS: {}", timeout))?;
        }
        if let Some(list) = lookup("RELAY_DESTINATIONS") {
            self.relay.destinations = parse_destination_list(&list);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.history.capacity == 0 {
            bail!("history.capacity must be at least 1");
        }
        if self.relay.timeout_secs == 0 {
            bail!("relay.timeout_secs must be at least 1");
        }
        for dest in &self.relay.destinations {
            let url = reqwest::Url::parse(&dest.url)
                .with_context(|| format!("Invalid URL for relay destination '{}'", dest.name))?;
            if url.scheme() != "http" && url.scheme() != "https" {
                bail!(
                    "Relay destination '{}' must use http or https, got {}",
                    dest.name,
                    url.scheme()
                );
            }
        }
        Ok(())
    }
}

fn parse_destination_list(list: &str) -> Vec<Destination> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, entry)| match entry.split_once('=') {
            // A bare URL may itself contain '=' in its query string
            Some((name, url)) if !name.contains("://") => Destination {
                name: name.trim().to_string(),
                url: url.trim().to_string(),
            },
            _ => Destination {
                name: format!("relay-{}", i + 1),
                url: entry.to_string(),
            },
        })
        .collect()
}
