// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Daemon wiring: notice socket, control server and receive loop.

use crate::config::AlertdConfig;
use crate::context::AlertContext;
use crate::launcher::Launch;
use crate::listener::{ListenerError, NoticeListener};
use crate::server::ControlServer;
use gcn::shutdown::Shutdown;
use gcn::transport::bind_multicast;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::{TcpListener, UdpSocket};
use tracing::{info, warn};

/// Daemon errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("failed to open notice socket: {0}")]
    Multicast(#[source] io::Error),

    #[error("failed to bind control socket {addr}: {source}")]
    ControlBind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Listener(#[from] ListenerError),
}

/// GCN alert daemon.
pub struct AlertDaemon {
    config: AlertdConfig,
    context: AlertContext,
    launcher: Arc<dyn Launch>,
    shutdown: Shutdown,
}

impl AlertDaemon {
    pub fn new(config: AlertdConfig, launcher: Arc<dyn Launch>) -> Self {
        let context = AlertContext::new(config.policy());
        Self {
            config,
            context,
            launcher,
            shutdown: Shutdown::new(),
        }
    }

    pub fn config(&self) -> &AlertdConfig {
        &self.config
    }

    pub fn context(&self) -> AlertContext {
        self.context.clone()
    }

    /// Handle used to stop the daemon from outside.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Bind both sockets from the configuration and run until shutdown.
    pub async fn run(self) -> Result<(), DaemonError> {
        let socket = bind_multicast(&self.config.multicast_endpoint())
            .map_err(DaemonError::Multicast)?;

        let addr = self.config.control_addr();
        let control = TcpListener::bind(addr)
            .await
            .map_err(|source| DaemonError::ControlBind { addr, source })?;

        self.serve(socket, control).await
    }

    /// Run on already bound sockets until shutdown or a fatal socket error.
    pub async fn serve(self, socket: UdpSocket, control: TcpListener) -> Result<(), DaemonError> {
        let server = ControlServer::new(
            self.context.clone(),
            self.launcher.clone(),
            self.shutdown.clone(),
        );
        let server_task = tokio::spawn(async move { server.run(control).await });

        let mut listener = NoticeListener::new(
            socket,
            self.context.clone(),
            self.launcher.clone(),
            self.shutdown.clone(),
        );
        let result = listener.run().await;

        // A fatal receive error stops the control server too.
        self.shutdown.trigger();
        if let Err(e) = server_task.await {
            warn!("Control server task failed: {}", e);
        }

        info!("Alert daemon stopped");
        result.map_err(DaemonError::from)
    }
}
