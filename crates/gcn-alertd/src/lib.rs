// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GCN alert daemon
//!
//! Listens to the GCN multicast notice feed, filters each decoded notice
//! and starts a script for the ones that pass. A line-based TCP control
//! socket can enable or disable alerts and inject manual alerts.
//!
//! # Quick Start
//!
//! ```bash
//! # Run the script for SWIFT and INTEGRAL alerts
//! gcn-alertd --script /opt/grb/alert.sh --swift --integral
//!
//! # Using config file
//! gcn-alertd --config alertd.toml
//!
//! # Talk to the control socket
//! echo "disable status" | nc localhost 2006
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! script = "/opt/grb/alert.sh"
//! allowed_missions = ["SWIFT", "INTEGRAL"]
//! max_error_box_arcsec = 600.0
//! swift_accept_mask = 0x2
//! swift_reject_mask = 0x20
//! ```

pub mod config;
pub mod context;
pub mod control;
pub mod daemon;
pub mod launcher;
pub mod listener;
pub mod server;

pub use config::{AlertdConfig, ConfigError};
pub use context::{AlertContext, AlertState};
pub use control::{parse_command, AlertScope, ControlCommand, ControlError, ManualAlert};
pub use daemon::{AlertDaemon, DaemonError};
pub use gcn::shutdown::Shutdown;
pub use launcher::{DryRunLauncher, Launch, LaunchError, ScriptLauncher};
pub use listener::{ListenerError, ListenerState, NoticeListener, PacketOutcome};
pub use server::ControlServer;
