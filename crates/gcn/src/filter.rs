// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alert filter.
//!
//! Decides whether a feed-sourced record may trigger the script. Checks
//! short-circuit in a fixed order: mission, socket alerts enabled, error
//! radius, propagation delay, position, then SWIFT status masks and merit.
//!
//! The propagation delay is measured against the record's notice time, so
//! the decision depends on nothing but its two inputs.

use crate::policy::Policy;
use crate::record::{Mission, MissionSet, NoticeRecord};
use chrono::Duration;
use std::fmt;
use tracing::{info, warn};

/// Why a record was not propagated.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    MissionNotAllowed {
        mission: Mission,
        allowed: MissionSet,
    },
    SocketAlertsDisabled,
    ErrorBoxTooLarge {
        max_arcsec: f64,
        record_arcsec: f64,
    },
    TooLate {
        delay: Duration,
        max: Duration,
    },
    NoPosition,
    StatusRejected {
        status: u32,
        reject_mask: u32,
    },
    StatusMissingAccept {
        status: u32,
        accept_mask: u32,
    },
    NoMerit,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissionNotAllowed { mission, allowed } => write!(
                f,
                "allowed missions {} not compatible with alert mission {}",
                allowed, mission
            ),
            Self::SocketAlertsDisabled => {
                write!(f, "socket alerts have been disabled from the control socket")
            }
            Self::ErrorBoxTooLarge {
                max_arcsec,
                record_arcsec,
            } => write!(
                f,
                "max error box radius {} arcseconds smaller than alert error box radius {} arcseconds",
                max_arcsec, record_arcsec
            ),
            Self::TooLate { delay, max } => write!(
                f,
                "propagation delay {} s exceeds maximum {} s",
                delay.num_milliseconds() as f64 / 1000.0,
                max.num_milliseconds() as f64 / 1000.0
            ),
            Self::NoPosition => write!(f, "RA/Dec not set"),
            Self::StatusRejected {
                status,
                reject_mask,
            } => write!(
                f,
                "solnStatus {:#x} contains bits in reject mask {:#x}",
                status, reject_mask
            ),
            Self::StatusMissingAccept {
                status,
                accept_mask,
            } => write!(
                f,
                "solnStatus {:#x} does NOT contain bits in accept mask {:#x}",
                status, accept_mask
            ),
            Self::NoMerit => write!(f, "merit parameters say this is not a GRB"),
        }
    }
}

/// Evaluate `record` against `policy` without logging.
pub fn evaluate(record: &NoticeRecord, policy: &Policy) -> Result<(), Rejection> {
    if !policy.allowed_missions.contains(record.mission) {
        return Err(Rejection::MissionNotAllowed {
            mission: record.mission,
            allowed: policy.allowed_missions,
        });
    }

    if !policy.socket_alerts_enabled {
        return Err(Rejection::SocketAlertsDisabled);
    }

    let record_arcsec = record.error_radius_arcmin * 60.0;
    if record_arcsec > policy.max_error_radius_arcsec {
        return Err(Rejection::ErrorBoxTooLarge {
            max_arcsec: policy.max_error_radius_arcsec,
            record_arcsec,
        });
    }

    if let (Some(max), Some(burst_time)) = (policy.max_propagation_delay, record.burst_time) {
        let delay = record.notice_time - burst_time;
        if delay > max {
            return Err(Rejection::TooLate { delay, max });
        }
    }

    if record.position.is_none() {
        return Err(Rejection::NoPosition);
    }

    if record.mission == Mission::Swift && !policy.masks_degenerate() {
        if record.status_bits & policy.swift_reject_mask != 0 {
            return Err(Rejection::StatusRejected {
                status: record.status_bits,
                reject_mask: policy.swift_reject_mask,
            });
        }
        if record.status_bits & policy.swift_accept_mask != policy.swift_accept_mask {
            return Err(Rejection::StatusMissingAccept {
                status: record.status_bits,
                accept_mask: policy.swift_accept_mask,
            });
        }
    }

    if record.mission == Mission::Swift && policy.swift_filter_on_merit && !record.has_merit {
        return Err(Rejection::NoMerit);
    }

    Ok(())
}

/// Evaluate `record`, logging the reason for any rejection.
pub fn accept(record: &NoticeRecord, policy: &Policy) -> bool {
    if record.mission == Mission::Swift && policy.masks_degenerate() {
        warn!(
            "Alert filter detected overlapping solnStatus masks: accept {:#x} reject {:#x}",
            policy.swift_accept_mask, policy.swift_reject_mask
        );
    }

    match evaluate(record, policy) {
        Ok(()) => true,
        Err(rejection) => {
            info!("Alert filter stopped propagation of alert: {}", rejection);
            false
        }
    }
}
