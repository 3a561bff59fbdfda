// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-destination forwarder.
//!
//! Each destination gets one task owning its TCP stream and a bounded
//! packet queue. The task cycles through
//! `Disconnected -> Connecting -> Connected -> Disconnected`, waiting out the
//! backoff schedule before every connect. Packets offered while the link is
//! not connected are dropped.
//!
//! Every forwarded packet is written, flushed and then answered by the
//! listener with the same number of bytes. A failed or short read-back is
//! a connection fault.

use crate::backoff::Backoff;
use crate::config::Destination;
use gcn::shutdown::Shutdown;
use std::future::Future;
use std::io;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A raw packet shared between all destinations.
pub type Packet = Arc<[u8]>;

/// Forwarding errors. All of them end the current connection.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no read-back within {0:?}")]
    AckTimeout(Duration),
}

/// Opens streams to destinations.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncRead + AsyncWrite + Unpin + Send + 'static;

    fn connect(
        &self,
        destination: &Destination,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(
        &self,
        destination: &Destination,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        let target = (destination.address.clone(), destination.port);
        async move {
            let stream = TcpStream::connect(target).await?;
            stream.set_nodelay(true)?;
            Ok(stream)
        }
    }
}

/// Link state of one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    Connecting = 1,
    Connected = 2,
}

impl LinkState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Connected,
            _ => Self::Disconnected,
        }
    }
}

/// Result of offering a packet to a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offer {
    Queued,
    NotConnected,
    QueueFull,
    Closed,
}

/// Forwarder counters.
#[derive(Debug, Default)]
pub struct ForwarderStats {
    pub forwarded: AtomicU64,
    pub dropped: AtomicU64,
    pub connects: AtomicU64,
    pub faults: AtomicU64,
}

/// Forwarder settings shared by every destination.
#[derive(Debug, Clone)]
pub struct ForwarderOptions {
    pub backoff: Vec<Duration>,
    pub queue_capacity: usize,
    pub ack_timeout: Option<Duration>,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            backoff: Backoff::default_schedule(),
            queue_capacity: 64,
            ack_timeout: None,
        }
    }
}

/// Sending side of a forwarder, used by the fan-out.
#[derive(Debug, Clone)]
pub struct ForwarderHandle {
    destination: Destination,
    state: Arc<AtomicU8>,
    tx: mpsc::Sender<Packet>,
    stats: Arc<ForwarderStats>,
}

impl ForwarderHandle {
    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn state(&self) -> LinkState {
        LinkState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn stats(&self) -> &ForwarderStats {
        &self.stats
    }

    /// Queue `packet` if the destination is connected, drop it otherwise.
    pub fn offer(&self, packet: Packet) -> Offer {
        if self.state() != LinkState::Connected {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            debug!("Dropping packet for {}: not connected", self.destination);
            return Offer::NotConnected;
        }

        match self.tx.try_send(packet) {
            Ok(()) => Offer::Queued,
            Err(TrySendError::Full(_)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!("Queue for {} full, dropping packet", self.destination);
                Offer::QueueFull
            }
            Err(TrySendError::Closed(_)) => Offer::Closed,
        }
    }
}

/// Receiving side of a forwarder; run it as its own task.
pub struct Forwarder<C: Connector> {
    destination: Destination,
    connector: Arc<C>,
    backoff: Backoff,
    ack_timeout: Option<Duration>,
    rx: mpsc::Receiver<Packet>,
    state: Arc<AtomicU8>,
    stats: Arc<ForwarderStats>,
    shutdown: Shutdown,
}

/// Create the two halves of a forwarder for `destination`.
pub fn forwarder<C: Connector>(
    destination: Destination,
    connector: Arc<C>,
    options: &ForwarderOptions,
    shutdown: Shutdown,
) -> (ForwarderHandle, Forwarder<C>) {
    let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
    let state = Arc::new(AtomicU8::new(LinkState::Disconnected as u8));
    let stats = Arc::new(ForwarderStats::default());

    let handle = ForwarderHandle {
        destination: destination.clone(),
        state: state.clone(),
        tx,
        stats: stats.clone(),
    };
    let forwarder = Forwarder {
        destination,
        connector,
        backoff: Backoff::new(options.backoff.clone()),
        ack_timeout: options.ack_timeout,
        rx,
        state,
        stats,
        shutdown,
    };
    (handle, forwarder)
}

impl<C: Connector> Forwarder<C> {
    fn set_state(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Connect, forward and reconnect until shutdown or until every handle
    /// has been dropped.
    pub async fn run(mut self) {
        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            let delay = self.backoff.next_delay();
            if !delay.is_zero() {
                info!(
                    "Reconnection attempt {} to {} (backoff: {:?})",
                    self.backoff.attempt(),
                    self.destination,
                    delay
                );
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = self.shutdown.wait() => break,
                }
            }

            self.set_state(LinkState::Connecting);
            let connected = tokio::select! {
                result = self.connector.connect(&self.destination) => result,
                _ = self.shutdown.wait() => break,
            };

            match connected {
                Ok(stream) => {
                    info!("Connected to {}", self.destination);
                    self.backoff.reset();
                    self.stats.connects.fetch_add(1, Ordering::Relaxed);
                    self.set_state(LinkState::Connected);

                    let result = self.pump(stream).await;
                    self.set_state(LinkState::Disconnected);
                    self.discard_queued();

                    match result {
                        Ok(()) => break,
                        Err(e) => {
                            self.stats.faults.fetch_add(1, Ordering::Relaxed);
                            warn!("Connection to {} lost: {}", self.destination, e);
                        }
                    }
                }
                Err(e) => {
                    self.set_state(LinkState::Disconnected);
                    warn!(
                        "Failed to connect to {} (attempt {}): {}",
                        self.destination,
                        self.backoff.attempt(),
                        e
                    );
                }
            }
        }

        self.set_state(LinkState::Disconnected);
        info!("Forwarder for {} stopped", self.destination);
    }

    /// Forward queued packets until the stream fails. `Ok` means shutdown
    /// or a closed queue.
    async fn pump(&mut self, mut stream: C::Stream) -> Result<(), ForwardError> {
        let mut ack = Vec::new();

        loop {
            let packet = tokio::select! {
                packet = self.rx.recv() => match packet {
                    Some(packet) => packet,
                    None => return Ok(()),
                },
                _ = self.shutdown.wait() => return Ok(()),
            };

            let started = Instant::now();
            let round_trip = exchange(&mut stream, &packet, &mut ack, self.ack_timeout);
            tokio::select! {
                result = round_trip => result?,
                _ = self.shutdown.wait() => return Ok(()),
            }

            self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
            info!(
                "Forwarded {} bytes to {} (round trip {} ms)",
                packet.len(),
                self.destination,
                started.elapsed().as_millis()
            );
        }
    }

    /// Packets queued for a connection that no longer exists are stale.
    fn discard_queued(&mut self) {
        let mut discarded = 0u64;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            self.stats.dropped.fetch_add(discarded, Ordering::Relaxed);
            debug!(
                "Discarded {} queued packets for {}",
                discarded, self.destination
            );
        }
    }
}

/// Write one packet and read back the same number of bytes.
pub(crate) async fn exchange<S>(
    stream: &mut S,
    packet: &[u8],
    ack: &mut Vec<u8>,
    ack_timeout: Option<Duration>,
) -> Result<(), ForwardError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    stream.write_all(packet).await?;
    stream.flush().await?;

    ack.resize(packet.len(), 0);
    let read_back = stream.read_exact(ack);
    match ack_timeout {
        Some(timeout) => {
            tokio::time::timeout(timeout, read_back)
                .await
                .map_err(|_| ForwardError::AckTimeout(timeout))??;
        }
        None => {
            read_back.await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn destination() -> Destination {
        Destination::new("127.0.0.1", 1)
    }

    #[test]
    fn test_link_state_round_trip() {
        for state in [
            LinkState::Disconnected,
            LinkState::Connecting,
            LinkState::Connected,
        ] {
            assert_eq!(LinkState::from_u8(state as u8), state);
        }
        assert_eq!(LinkState::from_u8(9), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn test_offer_drops_while_disconnected() {
        let (handle, _forwarder) = forwarder(
            destination(),
            Arc::new(TcpConnector),
            &ForwarderOptions::default(),
            Shutdown::new(),
        );
        let packet: Packet = Arc::from(vec![0u8; 160]);
        assert_eq!(handle.state(), LinkState::Disconnected);
        assert_eq!(handle.offer(packet), Offer::NotConnected);
        assert_eq!(handle.stats().dropped.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_offer_queue_full() {
        let options = ForwarderOptions {
            queue_capacity: 1,
            ..Default::default()
        };
        let (handle, forwarder) = forwarder(
            destination(),
            Arc::new(TcpConnector),
            &options,
            Shutdown::new(),
        );
        forwarder.set_state(LinkState::Connected);

        let packet: Packet = Arc::from(vec![0u8; 160]);
        assert_eq!(handle.offer(packet.clone()), Offer::Queued);
        assert_eq!(handle.offer(packet.clone()), Offer::QueueFull);

        drop(forwarder);
        assert_eq!(handle.offer(packet), Offer::Closed);
    }
}
