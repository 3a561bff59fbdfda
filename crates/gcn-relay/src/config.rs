// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Relay configuration.

use crate::backoff::DEFAULT_SCHEDULE_MS;
use gcn::transport::MulticastEndpoint;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A TCP listener packets are forwarded to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Destination {
    /// Host name or IP address.
    pub address: String,
    pub port: u16,
}

impl Destination {
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

impl FromStr for Destination {
    type Err = String;

    /// Parse `host:port`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, port) = s
            .rsplit_once(':')
            .ok_or_else(|| format!("invalid destination '{}' (expected host:port)", s))?;
        if address.is_empty() {
            return Err(format!("invalid destination '{}' (empty host)", s));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| format!("invalid port in '{}': {}", s, e))?;
        Ok(Self::new(address, port))
    }
}

/// Relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default = "default_multicast_group")]
    pub multicast_group: Ipv4Addr,

    #[serde(default = "default_multicast_port")]
    pub multicast_port: u16,

    #[serde(default = "default_interface")]
    pub interface: Ipv4Addr,

    /// Where packets are forwarded.
    #[serde(default)]
    pub destinations: Vec<Destination>,

    /// Reconnect delays in milliseconds; the last one repeats.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: Vec<u64>,

    /// Per-destination packet queue size.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Read-back timeout in seconds; none waits forever.
    #[serde(default)]
    pub ack_timeout_secs: Option<u64>,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_multicast_group() -> Ipv4Addr {
    gcn::DEFAULT_MULTICAST_GROUP
}

fn default_multicast_port() -> u16 {
    gcn::DEFAULT_MULTICAST_PORT
}

fn default_interface() -> Ipv4Addr {
    Ipv4Addr::UNSPECIFIED
}

fn default_backoff_ms() -> Vec<u64> {
    DEFAULT_SCHEDULE_MS.to_vec()
}

fn default_queue_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            multicast_group: default_multicast_group(),
            multicast_port: default_multicast_port(),
            interface: default_interface(),
            destinations: Vec::new(),
            backoff_ms: default_backoff_ms(),
            queue_capacity: default_queue_capacity(),
            ack_timeout_secs: None,
            log_level: default_log_level(),
        }
    }
}

impl RelayConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destinations.is_empty() {
            return Err(ConfigError::Invalid("No destinations configured".into()));
        }

        for dest in &self.destinations {
            if dest.address.is_empty() || dest.port == 0 {
                return Err(ConfigError::Invalid(format!(
                    "Invalid destination '{}'",
                    dest
                )));
            }
        }

        if !self.multicast_group.is_multicast() {
            return Err(ConfigError::Invalid(format!(
                "{} is not a multicast group address",
                self.multicast_group
            )));
        }

        if self.multicast_port == 0 {
            return Err(ConfigError::Invalid("Multicast port must be non-zero".into()));
        }

        if self.backoff_ms.is_empty() {
            return Err(ConfigError::Invalid("Backoff schedule is empty".into()));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("Queue capacity must be non-zero".into()));
        }

        Ok(())
    }

    pub fn multicast_endpoint(&self) -> MulticastEndpoint {
        MulticastEndpoint {
            group: self.multicast_group,
            port: self.multicast_port,
            interface: self.interface,
        }
    }

    pub fn backoff_schedule(&self) -> Vec<Duration> {
        self.backoff_ms
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_secs.map(Duration::from_secs)
    }

    /// Add a destination, ignoring duplicates.
    pub fn add_destination(&mut self, dest: Destination) {
        if !self.destinations.contains(&dest) {
            self.destinations.push(dest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RelayConfig {
        let mut config = RelayConfig::default();
        config.add_destination(Destination::new("localhost", 5000));
        config
    }

    #[test]
    fn test_destination_parse() {
        let dest: Destination = "gcn.example.org:5348".parse().unwrap();
        assert_eq!(dest, Destination::new("gcn.example.org", 5348));
        assert_eq!(dest.to_string(), "gcn.example.org:5348");

        assert!("no-port".parse::<Destination>().is_err());
        assert!(":5000".parse::<Destination>().is_err());
        assert!("host:99999".parse::<Destination>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(
            config.backoff_ms,
            vec![0, 60_000, 120_000, 240_000, 480_000, 960_000, 1_800_000]
        );
        assert_eq!(config.queue_capacity, 64);
        assert_eq!(config.ack_timeout(), None);
    }

    #[test]
    fn test_validate() {
        assert!(valid().validate().is_ok());
        assert!(RelayConfig::default().validate().is_err());

        let mut config = valid();
        config.backoff_ms.clear();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.queue_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.multicast_group = Ipv4Addr::LOCALHOST;
        assert!(config.validate().is_err());

        let mut config = valid();
        config.add_destination(Destination::new("host", 0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_toml() {
        let config: RelayConfig = toml::from_str(
            r#"
            backoff_ms = [0, 1000]
            ack_timeout_secs = 10

            [[destinations]]
            address = "10.0.0.5"
            port = 5348

            [[destinations]]
            address = "relay.example.org"
            port = 5349
            "#,
        )
        .unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.destinations.len(), 2);
        assert_eq!(
            config.backoff_schedule(),
            vec![Duration::ZERO, Duration::from_secs(1)]
        );
        assert_eq!(config.ack_timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_file_round_trip() {
        let config = valid();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relay.toml");
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();
        assert_eq!(RelayConfig::from_file(&path).unwrap(), config);
    }
}
