// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Notice receive loop.
//!
//! Packets are handled strictly in receipt order: the next datagram is not
//! read until the previous one has been decoded, filtered and (if accepted)
//! handed to the launcher.

use crate::context::AlertContext;
use crate::launcher::Launch;
use chrono::Utc;
use gcn::shutdown::Shutdown;
use gcn::transport::is_transient;
use gcn::{decode_or_unknown, DecodeOptions, NoticeType};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::UdpSocket;
use tracing::{debug, error, info, warn};

/// Larger than any notice so oversized datagrams are seen, then truncated.
const RECV_BUFFER_LEN: usize = 2048;

/// Receive loop errors. Only a failed socket ends the loop.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("notice socket failed: {0}")]
    Socket(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Init,
    Listening,
    Decoding,
    Filtering,
    Launching,
    Stopped,
}

/// What happened to one received packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    Filtered,
    Launched,
    LaunchFailed,
}

/// Receive loop over the notice socket.
pub struct NoticeListener {
    socket: UdpSocket,
    context: AlertContext,
    launcher: Arc<dyn Launch>,
    shutdown: Shutdown,
    state: ListenerState,
    packets: u64,
}

impl NoticeListener {
    pub fn new(
        socket: UdpSocket,
        context: AlertContext,
        launcher: Arc<dyn Launch>,
        shutdown: Shutdown,
    ) -> Self {
        Self {
            socket,
            context,
            launcher,
            shutdown,
            state: ListenerState::Init,
            packets: 0,
        }
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Packets received so far.
    pub fn packets(&self) -> u64 {
        self.packets
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn transition(&mut self, next: ListenerState) {
        debug!("Listener state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Receive and process packets until shutdown or a fatal socket error.
    pub async fn run(&mut self) -> Result<(), ListenerError> {
        self.transition(ListenerState::Listening);
        let mut buf = [0u8; RECV_BUFFER_LEN];

        loop {
            if self.shutdown.is_triggered() {
                break;
            }

            let received = tokio::select! {
                result = self.socket.recv_from(&mut buf) => result,
                _ = self.shutdown.wait() => break,
            };

            match received {
                Ok((len, peer)) => {
                    self.packets += 1;
                    debug!("Received {} bytes from {}", len, peer);
                    self.process(&buf[..len]).await;
                }
                Err(e) if is_transient(&e) => {
                    warn!("Receive failed, continuing: {}", e);
                }
                Err(e) => {
                    error!("Notice socket failed: {}", e);
                    self.transition(ListenerState::Stopped);
                    return Err(e.into());
                }
            }
        }

        info!("Notice listener stopped after {} packets", self.packets);
        self.transition(ListenerState::Stopped);
        Ok(())
    }

    /// Run one decode, filter and launch cycle under the context lock.
    pub async fn process(&mut self, packet: &[u8]) -> PacketOutcome {
        let context = self.context.clone();
        let mut state = context.lock().await;

        self.transition(ListenerState::Decoding);
        let options = DecodeOptions {
            swift_accept_mask: state.policy.swift_accept_mask,
            received_at: Utc::now(),
        };
        let record = decode_or_unknown(packet, &options);
        info!(
            "Received notice {} ({}) mission {}",
            NoticeType::from_code(record.notice_type),
            record.notice_type,
            record.mission
        );
        state.begin(record);

        self.transition(ListenerState::Filtering);
        let outcome = if state.filter() {
            self.transition(ListenerState::Launching);
            match state.launch(self.launcher.as_ref()) {
                Ok(()) => PacketOutcome::Launched,
                Err(e) => {
                    error!("Failed to start script: {}", e);
                    PacketOutcome::LaunchFailed
                }
            }
        } else {
            state.discard();
            PacketOutcome::Filtered
        };

        self.transition(ListenerState::Listening);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::DryRunLauncher;
    use gcn::{MissionSet, Policy, Words, PACKET_WORDS};

    fn integral_packet() -> Vec<u8> {
        let mut words = [0u32; PACKET_WORDS];
        words[0] = 54;
        words[4] = (1 << 16) | 77;
        words[7] = 836_000;
        words[8] = 220_000;
        words[11] = 120;
        Words::from_array(words).to_bytes().to_vec()
    }

    async fn listener(policy: Policy) -> (NoticeListener, Arc<DryRunLauncher>) {
        let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let launcher = Arc::new(DryRunLauncher::new());
        let listener = NoticeListener::new(
            socket,
            AlertContext::new(policy),
            launcher.clone(),
            Shutdown::new(),
        );
        (listener, launcher)
    }

    #[tokio::test]
    async fn test_accepted_packet_launches() {
        let (mut listener, launcher) = listener(Policy {
            allowed_missions: MissionSet::all(),
            ..Default::default()
        })
        .await;
        assert_eq!(listener.state(), ListenerState::Init);

        assert_eq!(
            listener.process(&integral_packet()).await,
            PacketOutcome::Launched
        );
        assert_eq!(listener.state(), ListenerState::Listening);

        let launched = launcher.launched();
        assert_eq!(launched.len(), 1);
        assert_eq!(launched[0][0], "-INTEGRAL");
        assert!(listener.context.lock().await.in_flight().is_none());
    }

    #[tokio::test]
    async fn test_disallowed_mission_filtered() {
        let (mut listener, launcher) = listener(Policy::default()).await;
        assert_eq!(
            listener.process(&integral_packet()).await,
            PacketOutcome::Filtered
        );
        assert!(launcher.launched().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_packet_is_filtered_not_fatal() {
        let (mut listener, launcher) = listener(Policy {
            allowed_missions: MissionSet::all(),
            ..Default::default()
        })
        .await;
        assert_eq!(listener.process(&[0u8; 12]).await, PacketOutcome::Filtered);
        assert!(launcher.launched().is_empty());
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (mut listener, _launcher) = listener(Policy::default()).await;
        let shutdown = listener.shutdown.clone();
        let handle = tokio::spawn(async move {
            listener.run().await.unwrap();
            listener.state()
        });
        tokio::task::yield_now().await;
        shutdown.trigger();
        let state = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, ListenerState::Stopped);
    }
}
