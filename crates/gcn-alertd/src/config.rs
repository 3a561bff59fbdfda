// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alert daemon configuration.
//!
//! Supports both programmatic and file-based configuration.

use chrono::Duration;
use gcn::transport::MulticastEndpoint;
use gcn::{Mission, MissionSet, Policy};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
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

/// Alert daemon configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertdConfig {
    /// Multicast group the notice feed arrives on.
    #[serde(default = "default_multicast_group")]
    pub multicast_group: Ipv4Addr,

    #[serde(default = "default_multicast_port")]
    pub multicast_port: u16,

    /// Interface to join the group on.
    #[serde(default = "default_interface")]
    pub interface: Ipv4Addr,

    /// Control socket bind address.
    #[serde(default = "default_control_bind")]
    pub control_bind: IpAddr,

    #[serde(default = "default_control_port")]
    pub control_port: u16,

    /// Script started for every accepted alert.
    #[serde(default)]
    pub script: PathBuf,

    /// Missions allowed to start the script.
    #[serde(default)]
    pub allowed_missions: Vec<Mission>,

    /// Largest accepted error radius (arc-seconds).
    #[serde(default = "default_max_error_box")]
    pub max_error_box_arcsec: f64,

    /// Longest accepted delay between burst and receipt (seconds).
    #[serde(default)]
    pub max_propagation_delay_secs: Option<u64>,

    #[serde(default)]
    pub swift_accept_mask: u32,

    #[serde(default)]
    pub swift_reject_mask: u32,

    /// Reject SWIFT alerts whose merit parameters say "not a GRB".
    #[serde(default)]
    pub swift_filter_on_merit: bool,

    #[serde(default = "default_true")]
    pub socket_alerts_enabled: bool,

    #[serde(default = "default_true")]
    pub manual_alerts_enabled: bool,

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

fn default_control_bind() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_control_port() -> u16 {
    2006
}

fn default_max_error_box() -> f64 {
    3600.0
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AlertdConfig {
    fn default() -> Self {
        Self {
            multicast_group: default_multicast_group(),
            multicast_port: default_multicast_port(),
            interface: default_interface(),
            control_bind: default_control_bind(),
            control_port: default_control_port(),
            script: PathBuf::new(),
            allowed_missions: Vec::new(),
            max_error_box_arcsec: default_max_error_box(),
            max_propagation_delay_secs: None,
            swift_accept_mask: 0,
            swift_reject_mask: 0,
            swift_filter_on_merit: false,
            socket_alerts_enabled: true,
            manual_alerts_enabled: true,
            log_level: default_log_level(),
        }
    }
}

impl AlertdConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.script.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("No script configured".into()));
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

        if self.control_port == 0 {
            return Err(ConfigError::Invalid("Control port must be non-zero".into()));
        }

        if !self.max_error_box_arcsec.is_finite() || self.max_error_box_arcsec < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "Max error box {} must be a non-negative number of arcseconds",
                self.max_error_box_arcsec
            )));
        }

        if self.allowed_missions.contains(&Mission::Unknown) {
            return Err(ConfigError::Invalid(
                "UNKNOWN cannot be an allowed mission".into(),
            ));
        }

        Ok(())
    }

    /// Filter policy described by this configuration.
    pub fn policy(&self) -> Policy {
        Policy {
            allowed_missions: self.allowed_missions.iter().copied().collect::<MissionSet>(),
            max_error_radius_arcsec: self.max_error_box_arcsec,
            max_propagation_delay: self
                .max_propagation_delay_secs
                .and_then(|secs| Duration::try_seconds(i64::try_from(secs).ok()?)),
            swift_accept_mask: self.swift_accept_mask,
            swift_reject_mask: self.swift_reject_mask,
            swift_filter_on_merit: self.swift_filter_on_merit,
            socket_alerts_enabled: self.socket_alerts_enabled,
            manual_alerts_enabled: self.manual_alerts_enabled,
        }
    }

    pub fn multicast_endpoint(&self) -> MulticastEndpoint {
        MulticastEndpoint {
            group: self.multicast_group,
            port: self.multicast_port,
            interface: self.interface,
        }
    }

    pub fn control_addr(&self) -> SocketAddr {
        SocketAddr::new(self.control_bind, self.control_port)
    }

    /// Allow a mission, ignoring duplicates.
    pub fn allow(&mut self, mission: Mission) {
        if mission.is_known() && !self.allowed_missions.contains(&mission) {
            self.allowed_missions.push(mission);
        }
    }
}

/// Parse a bit mask given as decimal or `0x` hexadecimal.
pub fn parse_mask(s: &str) -> Result<u32, String> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => trimmed.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid mask '{}': {}", s, e))
}
