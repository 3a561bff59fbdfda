// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Script launching.
//!
//! The script receives the alert as command-line flags:
//!
//! ```text
//! script -SWIFT -ra 10:00:00.00 -dec +20:00:00.00 -epoch 2000.0 -error_box 3.0 \
//!        -trigger_number 114299 -sequence_number 3 \
//!        [-grb_date 2005-05-09T01:00:00] [-notice_date 2005-05-09T01:00:30] [-test]
//! ```
//!
//! Launching never waits for the child. Its output is drained into the log
//! and its exit status logged by background tasks.

use gcn::time::format_timestamp;
use gcn::NoticeRecord;
use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Errors raised before or while spawning the script.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("alert has no known mission")]
    NoMission,

    #[error("alert has no position")]
    NoPosition,

    #[error("no alert in flight")]
    NothingInFlight,

    #[error("failed to start script {script}: {source}")]
    Spawn {
        script: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Format a number the way the script has always received it (`2.0`, `0.25`).
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

/// Build the script argument vector for a record.
pub fn script_args(record: &NoticeRecord) -> Result<Vec<String>, LaunchError> {
    if !record.mission.is_known() {
        return Err(LaunchError::NoMission);
    }
    let position = record.position.ok_or(LaunchError::NoPosition)?;

    let mut args = vec![
        format!("-{}", record.mission.name()),
        "-ra".to_string(),
        position.ra.to_string(),
        "-dec".to_string(),
        position.dec.to_string(),
        "-epoch".to_string(),
        format_number(record.epoch),
        "-error_box".to_string(),
        format_number(record.error_radius_arcmin),
        "-trigger_number".to_string(),
        record.trigger_number.to_string(),
        "-sequence_number".to_string(),
        record.sequence_number.to_string(),
    ];

    if let Some(burst_time) = &record.burst_time {
        args.push("-grb_date".to_string());
        args.push(format_timestamp(burst_time));
    }
    args.push("-notice_date".to_string());
    args.push(format_timestamp(&record.notice_time));

    if record.is_test {
        args.push("-test".to_string());
    }

    Ok(args)
}

/// Starts something for an accepted alert.
pub trait Launch: Send + Sync {
    /// Start the action for `record` and return without waiting for it.
    fn launch(&self, record: &NoticeRecord) -> Result<(), LaunchError>;
}

/// Spawns the configured script as a child process.
#[derive(Debug, Clone)]
pub struct ScriptLauncher {
    script: PathBuf,
}

impl ScriptLauncher {
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
        }
    }

    pub fn script(&self) -> &Path {
        &self.script
    }
}

impl Launch for ScriptLauncher {
    /// Must be called from within a tokio runtime.
    fn launch(&self, record: &NoticeRecord) -> Result<(), LaunchError> {
        let args = script_args(record)?;
        info!("Starting script: {} {}", self.script.display(), args.join(" "));

        let mut child = Command::new(&self.script)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                script: self.script.clone(),
                source,
            })?;

        debug!("Script started with pid {:?}", child.id());

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain_lines(stdout, "output"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain_lines(stderr, "error"));
        }

        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => match status.code() {
                    Some(code) => info!("spawned script returned:{}", code),
                    None => info!("spawned script terminated by signal: {}", status),
                },
                Err(e) => warn!("Waiting for spawned script failed: {}", e),
            }
        });

        Ok(())
    }
}

async fn drain_lines<R>(reader: R, label: &'static str)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => info!("{}:{}", label, line),
            Ok(None) => break,
            Err(e) => {
                warn!("Reading script {} failed: {}", label, e);
                break;
            }
        }
    }
}

/// Logs the command line instead of running it and keeps every argument
/// vector it was asked to launch.
#[derive(Debug, Default)]
pub struct DryRunLauncher {
    launched: Mutex<Vec<Vec<String>>>,
}

impl DryRunLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Argument vectors launched so far, oldest first.
    pub fn launched(&self) -> Vec<Vec<String>> {
        self.launched.lock().clone()
    }
}

impl Launch for DryRunLauncher {
    fn launch(&self, record: &NoticeRecord) -> Result<(), LaunchError> {
        let args = script_args(record)?;
        info!("Dry run, not starting script: {}", args.join(" "));
        self.launched.lock().push(args);
        Ok(())
    }
}
