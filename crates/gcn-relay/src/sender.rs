// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Hand-made notices sent straight to a TCP listener.
//!
//! Used to check a listener end to end: a SWIFT BAT position notice or an
//! IMALIVE is written once and the listener's read-back awaited.

use crate::config::Destination;
use crate::forwarder::{exchange, Connector, ForwardError};
use chrono::{DateTime, Utc};
use gcn::swift::soln;
use gcn::{NoticeBuilder, NoticeType, Position, Words};
use std::time::Duration;
use tracing::{debug, info};

/// A SWIFT BAT position notice.
#[derive(Debug, Clone, PartialEq)]
pub struct TestAlert {
    pub position: Position,
    pub error_arcmin: f64,
    pub burst_time: DateTime<Utc>,
    pub trigger_number: u32,
    pub sequence_number: u32,
}

impl TestAlert {
    /// Status bits of every test alert.
    pub const STATUS: u32 = soln::POINT_SOURCE | soln::GRB | soln::INTERESTING;

    pub fn new(position: Position, burst_time: DateTime<Utc>) -> Self {
        Self {
            position,
            error_arcmin: 3.0,
            burst_time,
            trigger_number: 1,
            sequence_number: 0,
        }
    }

    pub fn packet(&self, serial: u32, now: &DateTime<Utc>) -> Words {
        NoticeBuilder::new(NoticeType::SwiftBatGrbPosition)
            .serial(serial)
            .packet_time(now)
            .trigger(self.trigger_number, self.sequence_number)
            .burst_time(&self.burst_time)
            .position(self.position)
            .error_radius_arcmin(self.error_arcmin)
            .status(Self::STATUS)
            .merit(true)
            .build()
    }
}

/// An IMALIVE packet.
pub fn imalive(serial: u32, now: &DateTime<Utc>) -> Words {
    NoticeBuilder::new(NoticeType::Imalive)
        .serial(serial)
        .packet_time(now)
        .build()
}

/// Connect, write `packet` once and wait for the listener to echo it.
pub async fn send_notice<C: Connector>(
    connector: &C,
    destination: &Destination,
    packet: &Words,
    ack_timeout: Option<Duration>,
) -> Result<(), ForwardError> {
    let mut stream = connector.connect(destination).await?;
    debug!("Connected to {}", destination);

    let bytes = packet.to_bytes();
    let mut ack = Vec::with_capacity(bytes.len());
    exchange(&mut stream, &bytes, &mut ack, ack_timeout).await?;

    if ack != bytes {
        debug!("Read-back from {} differs from the packet sent", destination);
    }
    info!("Sent {} to {}", packet.notice_type(), destination);
    Ok(())
}
