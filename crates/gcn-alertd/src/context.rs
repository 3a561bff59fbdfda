// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alert context shared by the receive loop and the control server.
//!
//! A single async mutex guards the policy and the in-flight record. The
//! receive loop holds it for a whole decode, filter and launch cycle and the
//! control server holds it while changing the policy or launching a manual
//! alert, so the two never interleave.

use crate::launcher::{Launch, LaunchError};
use gcn::{accept, NoticeRecord, Policy};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// State guarded by the alert context lock.
#[derive(Debug)]
pub struct AlertState {
    pub policy: Policy,
    in_flight: Option<NoticeRecord>,
}

impl AlertState {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            in_flight: None,
        }
    }

    /// Make `record` the in-flight record, dropping any previous one.
    pub fn begin(&mut self, record: NoticeRecord) {
        self.in_flight = Some(record);
    }

    pub fn in_flight(&self) -> Option<&NoticeRecord> {
        self.in_flight.as_ref()
    }

    /// Run the alert filter on the in-flight record.
    pub fn filter(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|record| accept(record, &self.policy))
    }

    /// Hand the in-flight record to `launcher`, consuming it.
    pub fn launch(&mut self, launcher: &dyn Launch) -> Result<(), LaunchError> {
        let record = self.in_flight.take().ok_or(LaunchError::NothingInFlight)?;
        launcher.launch(&record)
    }

    /// Drop the in-flight record without launching it.
    pub fn discard(&mut self) -> Option<NoticeRecord> {
        self.in_flight.take()
    }
}

/// Cloneable handle on the shared alert state.
#[derive(Debug, Clone)]
pub struct AlertContext {
    state: Arc<Mutex<AlertState>>,
}

impl AlertContext {
    pub fn new(policy: Policy) -> Self {
        Self {
            state: Arc::new(Mutex::new(AlertState::new(policy))),
        }
    }

    pub async fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().await
    }

    /// Copy of the current policy.
    pub async fn policy(&self) -> Policy {
        self.state.lock().await.policy.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::DryRunLauncher;
    use chrono::Utc;
    use gcn::{Dec, Mission, MissionSet, Position, Ra};

    fn deliverable() -> NoticeRecord {
        let mut record = NoticeRecord::new(Utc::now());
        record.mission = Mission::Integral;
        record.position = Some(Position {
            ra: Ra::from_degrees(83.6),
            dec: Dec::from_degrees(22.0),
        });
        record
    }

    #[tokio::test]
    async fn test_filter_and_launch_consume_record() {
        let context = AlertContext::new(Policy {
            allowed_missions: MissionSet::all(),
            ..Default::default()
        });
        let launcher = DryRunLauncher::new();

        let mut state = context.lock().await;
        state.begin(deliverable());
        assert!(state.filter());
        state.launch(&launcher).unwrap();
        assert!(state.in_flight().is_none());
        assert!(matches!(
            state.launch(&launcher),
            Err(LaunchError::NothingInFlight)
        ));
        assert_eq!(launcher.launched().len(), 1);
    }

    #[tokio::test]
    async fn test_filter_without_record() {
        let context = AlertContext::new(Policy::default());
        let state = context.lock().await;
        assert!(!state.filter());
    }

    #[tokio::test]
    async fn test_policy_shared_between_clones() {
        let context = AlertContext::new(Policy::default());
        let other = context.clone();
        other.lock().await.policy.socket_alerts_enabled = false;
        assert!(!context.policy().await.socket_alerts_enabled);
    }
}
