// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alert propagation policy.

use crate::record::MissionSet;
use chrono::Duration;

/// Which alerts may trigger the script.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub allowed_missions: MissionSet,
    /// Largest error radius accepted, in arc-seconds.
    pub max_error_radius_arcsec: f64,
    /// Longest accepted burst-to-receipt delay; `None` disables the check.
    pub max_propagation_delay: Option<Duration>,
    /// SWIFT status bits that must all be set.
    pub swift_accept_mask: u32,
    /// SWIFT status bits that must all be clear.
    pub swift_reject_mask: u32,
    pub swift_filter_on_merit: bool,
    pub socket_alerts_enabled: bool,
    pub manual_alerts_enabled: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            allowed_missions: MissionSet::EMPTY,
            max_error_radius_arcsec: 3600.0,
            max_propagation_delay: None,
            swift_accept_mask: 0,
            swift_reject_mask: 0,
            swift_filter_on_merit: false,
            socket_alerts_enabled: true,
            manual_alerts_enabled: true,
        }
    }
}

impl Policy {
    /// Accept and reject masks share bits, so no SWIFT notice could pass.
    pub fn masks_degenerate(&self) -> bool {
        self.swift_accept_mask & self.swift_reject_mask != 0
    }

    /// `Socket alerts enable:X, Manual alerts enable:Y.`
    pub fn enable_status(&self) -> String {
        format!(
            "Socket alerts enable:{}, Manual alerts enable:{}.",
            self.socket_alerts_enabled, self.manual_alerts_enabled
        )
    }
}
