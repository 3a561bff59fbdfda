// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reconnect backoff schedule.

use std::time::Duration;

/// Default reconnect delays (ms): immediately, then 1, 2, 4, 8, 16 and 30 minutes.
pub const DEFAULT_SCHEDULE_MS: [u64; 7] = [0, 60_000, 120_000, 240_000, 480_000, 960_000, 1_800_000];

/// Fixed reconnect schedule indexed by consecutive connection attempts.
///
/// Once the schedule is exhausted its last delay repeats.
#[derive(Debug, Clone)]
pub struct Backoff {
    schedule: Vec<Duration>,
    attempt: usize,
}

impl Backoff {
    /// An empty schedule behaves as a single zero delay.
    pub fn new(schedule: Vec<Duration>) -> Self {
        let schedule = if schedule.is_empty() {
            vec![Duration::ZERO]
        } else {
            schedule
        };
        Self {
            schedule,
            attempt: 0,
        }
    }

    pub fn from_millis(schedule_ms: &[u64]) -> Self {
        Self::new(schedule_ms.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    pub fn default_schedule() -> Vec<Duration> {
        DEFAULT_SCHEDULE_MS
            .iter()
            .map(|ms| Duration::from_millis(*ms))
            .collect()
    }

    /// Delay before the next attempt; counts the attempt.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.peek();
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Delay the next attempt would wait, without counting it.
    pub fn peek(&self) -> Duration {
        self.schedule
            .get(self.attempt)
            .or_else(|| self.schedule.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }

    /// Attempts made since the last reset.
    pub fn attempt(&self) -> usize {
        self.attempt
    }

    /// Forget previous failures after a successful connect.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Self::default_schedule())
    }
}
