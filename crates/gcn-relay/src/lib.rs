// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GCN notice relay
//!
//! Receives raw GCN notice packets from the multicast feed and forwards
//! them unmodified to one or more TCP listeners. Every destination has its
//! own reconnect loop and queue; a slow or dead destination never delays
//! the others.
//!
//! # Quick Start
//!
//! ```bash
//! # Forward to two listeners
//! gcn-relay --forward 10.0.0.5:5348 --forward relay.example.org:5349
//!
//! # Using config file
//! gcn-relay --config relay.toml
//!
//! # Send one test alert to a listener
//! gcn-relay send --to 10.0.0.5:5348 --ra 10:00:00 --dec +20:00:00
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! backoff_ms = [0, 60000, 120000, 240000, 480000, 960000, 1800000]
//! queue_capacity = 64
//!
//! [[destinations]]
//! address = "10.0.0.5"
//! port = 5348
//! ```

pub mod backoff;
pub mod config;
pub mod forwarder;
pub mod relay;
pub mod sender;

pub use backoff::Backoff;
pub use config::{ConfigError, Destination, RelayConfig};
pub use forwarder::{
    forwarder, Connector, ForwardError, Forwarder, ForwarderHandle, ForwarderOptions,
    ForwarderStats, LinkState, Offer, Packet, TcpConnector,
};
pub use gcn::shutdown::Shutdown;
pub use relay::{FanOut, Relay, RelayError};
pub use sender::{imalive, send_notice, TestAlert};
