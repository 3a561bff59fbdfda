// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Control command server.
//!
//! Each connection carries one command line and gets one response, then
//! the server closes it.

use crate::context::AlertContext;
use crate::control::{parse_command, AlertScope, ControlCommand, ManualAlert, HELP_TEXT};
use crate::launcher::Launch;
use chrono::Utc;
use gcn::shutdown::Shutdown;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{error, info, warn};

/// Longest accepted command line.
const MAX_LINE_LEN: u64 = 4096;

/// Control server.
#[derive(Clone)]
pub struct ControlServer {
    context: AlertContext,
    launcher: Arc<dyn Launch>,
    shutdown: Shutdown,
}

impl ControlServer {
    pub fn new(context: AlertContext, launcher: Arc<dyn Launch>, shutdown: Shutdown) -> Self {
        Self {
            context,
            launcher,
            shutdown,
        }
    }

    /// Accept connections on `listener` until shutdown.
    pub async fn run(&self, listener: TcpListener) {
        match listener.local_addr() {
            Ok(addr) => info!("Control server listening on {}", addr),
            Err(e) => warn!("Control server listening on unknown address: {}", e),
        }

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let server = self.clone();
                            tokio::spawn(async move {
                                if let Err(e) = server.handle_connection(stream, peer_addr).await {
                                    warn!("Connection error from {}: {}", peer_addr, e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = self.shutdown.wait() => {
                    info!("Control server shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_connection(
        &self,
        stream: TcpStream,
        peer_addr: SocketAddr,
    ) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut raw = Vec::new();
        BufReader::new(reader.take(MAX_LINE_LEN))
            .read_until(b'\n', &mut raw)
            .await?;
        let line = String::from_utf8_lossy(&raw);

        let parsed = parse_command(&line);
        let quit = matches!(parsed, Ok(ControlCommand::Quit));
        let response = match parsed {
            Ok(command) => self.execute(command).await,
            Err(e) => e.to_string(),
        };
        info!(
            "Control command from {}: '{}' -> {}",
            peer_addr,
            line.trim(),
            response.lines().next().unwrap_or_default()
        );

        let written = async {
            writer.write_all(response.as_bytes()).await?;
            writer.write_all(b"\n").await?;
            writer.flush().await?;
            writer.shutdown().await
        }
        .await;

        if quit {
            info!("Quit requested from {}", peer_addr);
            self.shutdown.trigger();
        }
        written
    }

    /// Execute a parsed command and return the response text.
    pub async fn execute(&self, command: ControlCommand) -> String {
        match command {
            ControlCommand::Disable(scope) => self.set_enabled(scope, false).await,
            ControlCommand::Enable(scope) => self.set_enabled(scope, true).await,
            ControlCommand::GammaRayBurstAlert(alert) => self.manual_alert(alert).await,
            ControlCommand::Help => HELP_TEXT.to_string(),
            ControlCommand::Quit => "Quiting.".to_string(),
            ControlCommand::Test => "Test command received.".to_string(),
        }
    }

    async fn set_enabled(&self, scope: AlertScope, enabled: bool) -> String {
        let mut state = self.context.lock().await;
        let verb = if enabled { "enabled" } else { "disabled" };
        match scope {
            AlertScope::All => {
                state.policy.socket_alerts_enabled = enabled;
                state.policy.manual_alerts_enabled = enabled;
                format!("All alerts {}.", verb)
            }
            AlertScope::Socket => {
                state.policy.socket_alerts_enabled = enabled;
                format!("Socket alerts {}.", verb)
            }
            AlertScope::Manual => {
                state.policy.manual_alerts_enabled = enabled;
                format!("Manual alerts {}.", verb)
            }
            AlertScope::Status => state.policy.enable_status(),
        }
    }

    async fn manual_alert(&self, alert: ManualAlert) -> String {
        let mut state = self.context.lock().await;
        if !state.policy.manual_alerts_enabled {
            return "Failed to start script. Manual alerts have been disabled from the control socket."
                .to_string();
        }

        let record = match alert.into_record(Utc::now()) {
            Ok(record) => record,
            Err(e) => return e.to_string(),
        };

        state.begin(record);
        match state.launch(self.launcher.as_ref()) {
            Ok(()) => "Script started.".to_string(),
            Err(e) => {
                error!("Failed to start script for manual alert: {}", e);
                format!("Failed to start script:{}.", e)
            }
        }
    }
}
