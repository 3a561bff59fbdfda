// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! GCN notice decoding and alert filtering.
//!
//! GCN (the GRB Coordinates Network) broadcasts fixed-size binary notices
//! describing gamma-ray burst detections. Each notice is 160 bytes: forty
//! big-endian 32-bit words, word 0 carrying the notice type code.
//!
//! This crate provides:
//!
//! - **Decoding**: [`decode`] turns a raw packet into a [`NoticeRecord`]
//!   using a declarative per-type [`layout`] table
//! - **Encoding**: [`NoticeBuilder`] and [`encode`] write packets over the
//!   same layout table, for test alerts
//! - **Filtering**: [`accept`] applies a [`Policy`] to a record
//! - **Transport**: [`transport::bind_multicast`] joins the notice feed
//!
//! # Example
//!
//! ```no_run
//! use gcn::{accept, decode_or_unknown, DecodeOptions, Policy};
//!
//! # fn packet() -> [u8; 160] { [0; 160] }
//! let policy = Policy::default();
//! let options = DecodeOptions::now(policy.swift_accept_mask);
//! let record = decode_or_unknown(&packet(), &options);
//! if accept(&record, &policy) {
//!     println!("would launch for trigger {}", record.trigger_number);
//! }
//! ```

pub mod angle;
pub mod decoder;
pub mod encoder;
pub mod filter;
pub mod layout;
pub mod notice_type;
pub mod policy;
pub mod record;
pub mod shutdown;
pub mod swift;
pub mod time;
pub mod transport;

pub use angle::{AngleParseError, Dec, Ra};
pub use decoder::{
    decode, decode_or_unknown, peek_notice_type, DecodeError, DecodeOptions, Words,
};
pub use encoder::{encode, NoticeBuilder};
pub use filter::{accept, evaluate, Rejection};
pub use notice_type::NoticeType;
pub use policy::Policy;
pub use record::{Mission, MissionSet, NoticeRecord, Position};

/// Size of one notice packet in bytes.
pub const PACKET_LEN: usize = 160;

/// Number of 32-bit words in one notice packet.
pub const PACKET_WORDS: usize = PACKET_LEN / 4;

/// Default multicast group the notice feed is rebroadcast on.
pub const DEFAULT_MULTICAST_GROUP: std::net::Ipv4Addr = std::net::Ipv4Addr::new(224, 103, 114, 98);

/// Default multicast port of the notice feed.
pub const DEFAULT_MULTICAST_PORT: u16 = 2005;
