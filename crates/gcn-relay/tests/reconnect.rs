// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::unwrap_used)]

//! Reconnect schedule tests on a paused clock with a scripted connector.

use gcn_relay::{
    forwarder, Connector, Destination, ForwarderHandle, ForwarderOptions, LinkState, Offer,
    Packet, Shutdown,
};
use std::collections::VecDeque;
use std::future::Future;
use std::io;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Fails or succeeds connects following a fixed plan; fails once the plan
/// runs out.
struct ScriptedConnector {
    plan: Mutex<VecDeque<bool>>,
    attempts: mpsc::UnboundedSender<Instant>,
    peers: mpsc::UnboundedSender<DuplexStream>,
}

impl Connector for ScriptedConnector {
    type Stream = DuplexStream;

    fn connect(
        &self,
        _destination: &Destination,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send {
        let succeed = self.plan.lock().unwrap().pop_front().unwrap_or(false);
        self.attempts.send(Instant::now()).unwrap();
        let result = if succeed {
            let (client, server) = tokio::io::duplex(4096);
            self.peers.send(server).unwrap();
            Ok(client)
        } else {
            Err(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
        };
        async move { result }
    }
}

struct Scripted {
    handle: ForwarderHandle,
    attempts: mpsc::UnboundedReceiver<Instant>,
    peers: mpsc::UnboundedReceiver<DuplexStream>,
    shutdown: Shutdown,
    task: tokio::task::JoinHandle<()>,
}

fn start(plan: &[bool]) -> Scripted {
    let (attempts_tx, attempts) = mpsc::unbounded_channel();
    let (peers_tx, peers) = mpsc::unbounded_channel();
    let connector = Arc::new(ScriptedConnector {
        plan: Mutex::new(plan.iter().copied().collect()),
        attempts: attempts_tx,
        peers: peers_tx,
    });
    let shutdown = Shutdown::new();
    let (handle, forwarder) = forwarder(
        Destination::new("gcn.example.org", 5348),
        connector,
        &ForwarderOptions::default(),
        shutdown.clone(),
    );
    let task = tokio::spawn(forwarder.run());
    Scripted {
        handle,
        attempts,
        peers,
        shutdown,
        task,
    }
}

async fn wait_for_state(handle: &ForwarderHandle, state: LinkState) {
    for _ in 0..1000 {
        if handle.state() == state {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("link never reached {:?}", state);
}

fn packet() -> Packet {
    Arc::from((0..160u8).collect::<Vec<u8>>())
}

#[tokio::test(start_paused = true)]
async fn backoff_until_connected() {
    let started = Instant::now();
    let mut relay = start(&[false, false, false, true]);

    let mut attempts = Vec::new();
    for _ in 0..4 {
        attempts.push(relay.attempts.recv().await.unwrap());
    }

    assert_eq!((attempts[0] - started).as_secs(), 0);
    assert_eq!((attempts[1] - attempts[0]).as_secs(), 60);
    assert_eq!((attempts[2] - attempts[1]).as_secs(), 120);
    assert_eq!((attempts[3] - attempts[2]).as_secs(), 240);

    wait_for_state(&relay.handle, LinkState::Connected).await;
    assert_eq!(relay.handle.stats().connects.load(Ordering::Relaxed), 1);

    relay.shutdown.trigger();
    relay.task.await.unwrap();
    assert_eq!(relay.handle.state(), LinkState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn forward_and_read_back() {
    let mut relay = start(&[true]);
    let mut server = relay.peers.recv().await.unwrap();
    wait_for_state(&relay.handle, LinkState::Connected).await;

    let sent = packet();
    assert_eq!(relay.handle.offer(sent.clone()), Offer::Queued);

    let mut received = vec![0u8; sent.len()];
    server.read_exact(&mut received).await.unwrap();
    assert_eq!(&received[..], &sent[..]);
    server.write_all(&received).await.unwrap();

    for _ in 0..1000 {
        if relay.handle.stats().forwarded.load(Ordering::Relaxed) == 1 {
            break;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(relay.handle.stats().forwarded.load(Ordering::Relaxed), 1);
    assert_eq!(relay.handle.stats().faults.load(Ordering::Relaxed), 0);

    relay.shutdown.trigger();
    relay.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn successful_connect_resets_schedule() {
    let mut relay = start(&[false, true]);

    let first = relay.attempts.recv().await.unwrap();
    let second = relay.attempts.recv().await.unwrap();
    assert_eq!((second - first).as_secs(), 60);

    let server = relay.peers.recv().await.unwrap();
    wait_for_state(&relay.handle, LinkState::Connected).await;

    // Losing the listener makes the next forward fail.
    drop(server);
    assert_eq!(relay.handle.offer(packet()), Offer::Queued);

    let third = relay.attempts.recv().await.unwrap();
    assert_eq!(third - second, Duration::ZERO);
    assert_eq!(relay.handle.stats().faults.load(Ordering::Relaxed), 1);

    let fourth = relay.attempts.recv().await.unwrap();
    assert_eq!((fourth - third).as_secs(), 60);

    relay.shutdown.trigger();
    relay.task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn packets_dropped_while_disconnected() {
    let mut relay = start(&[]);
    relay.attempts.recv().await.unwrap();
    wait_for_state(&relay.handle, LinkState::Disconnected).await;

    assert_eq!(relay.handle.offer(packet()), Offer::NotConnected);
    assert_eq!(relay.handle.offer(packet()), Offer::NotConnected);
    assert_eq!(relay.handle.stats().dropped.load(Ordering::Relaxed), 2);

    relay.shutdown.trigger();
    relay.task.await.unwrap();
}
