// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Relay daemon: one receive loop fanning packets out to the forwarders.

use crate::config::RelayConfig;
use crate::forwarder::{
    forwarder, Connector, ForwarderHandle, ForwarderOptions, Offer, Packet, TcpConnector,
};
use gcn::peek_notice_type;
use gcn::shutdown::Shutdown;
use gcn::transport::{bind_multicast, is_transient};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{error, info, warn};

const RECV_BUFFER_LEN: usize = 2048;

/// Relay errors.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to open notice socket: {0}")]
    Multicast(#[source] io::Error),

    #[error("notice socket failed: {0}")]
    Socket(#[source] io::Error),
}

/// Offers each packet to every destination.
#[derive(Debug, Clone, Default)]
pub struct FanOut {
    handles: Vec<ForwarderHandle>,
}

impl FanOut {
    pub fn new(handles: Vec<ForwarderHandle>) -> Self {
        Self { handles }
    }

    pub fn handles(&self) -> &[ForwarderHandle] {
        &self.handles
    }

    /// Offer `packet` unmodified to every destination. Returns how many
    /// destinations queued it.
    pub fn forward(&self, packet: &[u8], peer: SocketAddr) -> usize {
        match peek_notice_type(packet) {
            Some(notice_type) => info!(
                "Relaying {} ({} bytes) from {}",
                notice_type,
                packet.len(),
                peer
            ),
            None => warn!("Relaying runt packet ({} bytes) from {}", packet.len(), peer),
        }

        let packet: Packet = Arc::from(packet);
        self.handles
            .iter()
            .filter(|handle| handle.offer(packet.clone()) == Offer::Queued)
            .count()
    }
}

/// GCN notice relay.
pub struct Relay<C: Connector = TcpConnector> {
    config: RelayConfig,
    connector: Arc<C>,
    shutdown: Shutdown,
}

impl Relay<TcpConnector> {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Relay<C> {
    pub fn with_connector(config: RelayConfig, connector: C) -> Self {
        Self {
            config,
            connector: Arc::new(connector),
            shutdown: Shutdown::new(),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Handle used to stop the relay from outside.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Join the configured multicast group and run until shutdown.
    pub async fn run(self) -> Result<(), RelayError> {
        let socket =
            bind_multicast(&self.config.multicast_endpoint()).map_err(RelayError::Multicast)?;
        self.serve(socket).await
    }

    /// Relay packets received on `socket` until shutdown or a fatal socket error.
    pub async fn serve(self, socket: UdpSocket) -> Result<(), RelayError> {
        let options = ForwarderOptions {
            backoff: self.config.backoff_schedule(),
            queue_capacity: self.config.queue_capacity,
            ack_timeout: self.config.ack_timeout(),
        };

        let mut handles = Vec::with_capacity(self.config.destinations.len());
        let mut tasks = Vec::with_capacity(self.config.destinations.len());
        for destination in &self.config.destinations {
            let (handle, forwarder) = forwarder(
                destination.clone(),
                self.connector.clone(),
                &options,
                self.shutdown.clone(),
            );
            handles.push(handle);
            tasks.push(tokio::spawn(forwarder.run()));
        }
        let fan_out = FanOut::new(handles);

        match socket.local_addr() {
            Ok(addr) => info!(
                "Relaying notices from {} to {} destinations",
                addr,
                fan_out.handles().len()
            ),
            Err(e) => warn!("Notice socket has no local address: {}", e),
        }

        let mut buf = [0u8; RECV_BUFFER_LEN];
        let result = loop {
            if self.shutdown.is_triggered() {
                break Ok(());
            }

            let received = tokio::select! {
                result = socket.recv_from(&mut buf) => result,
                _ = self.shutdown.wait() => break Ok(()),
            };

            match received {
                Ok((len, peer)) => {
                    fan_out.forward(&buf[..len], peer);
                }
                Err(e) if is_transient(&e) => {
                    warn!("Receive failed, continuing: {}", e);
                }
                Err(e) => {
                    error!("Notice socket failed: {}", e);
                    break Err(RelayError::Socket(e));
                }
            }
        };

        self.shutdown.trigger();
        drop(fan_out);
        for task in tasks {
            if let Err(e) = task.await {
                warn!("Forwarder task failed: {}", e);
            }
        }

        info!("Relay stopped");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Destination;
    use crate::forwarder::ForwarderOptions;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fan_out_while_disconnected() {
        let shutdown = Shutdown::new();
        let (handle, _forwarder) = forwarder(
            Destination::new("127.0.0.1", 1),
            Arc::new(TcpConnector),
            &ForwarderOptions::default(),
            shutdown,
        );
        let fan_out = FanOut::new(vec![handle.clone()]);
        let peer: SocketAddr = "127.0.0.1:2005".parse().unwrap();

        assert_eq!(fan_out.forward(&[0, 0, 0, 61], peer), 0);
        assert_eq!(fan_out.forward(&[], peer), 0);
        assert_eq!(
            handle
                .stats()
                .dropped
                .load(std::sync::atomic::Ordering::Relaxed),
            2
        );
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let mut config = RelayConfig::default();
        config.add_destination(Destination::new("127.0.0.1", 1));
        config.backoff_ms = vec![0, 3_600_000];

        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let relay = Relay::new(config);
        let shutdown = relay.shutdown_handle();
        let task = tokio::spawn(relay.serve(socket));

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}
