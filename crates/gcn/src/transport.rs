// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Multicast socket for the notice feed.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

/// Where to receive the notice feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MulticastEndpoint {
    pub group: Ipv4Addr,
    pub port: u16,
    /// Interface to join on; `UNSPECIFIED` lets the kernel choose.
    pub interface: Ipv4Addr,
}

impl Default for MulticastEndpoint {
    fn default() -> Self {
        Self {
            group: crate::DEFAULT_MULTICAST_GROUP,
            port: crate::DEFAULT_MULTICAST_PORT,
            interface: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Create a reusable UDP socket bound to the endpoint port and join its group.
///
/// A failed join is logged and the socket still returned, so a unicast
/// sender can still reach it.
pub fn create_multicast_socket(endpoint: &MulticastEndpoint) -> io::Result<std::net::UdpSocket> {
    if !endpoint.group.is_multicast() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a multicast address", endpoint.group),
        ));
    }

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;

    let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, endpoint.port);
    socket.bind(&bind_addr.into())?;
    debug!("Notice socket bound to {}", bind_addr);

    match socket.join_multicast_v4(&endpoint.group, &endpoint.interface) {
        Ok(()) => info!(
            "Joined multicast group {} on {} (port {})",
            endpoint.group, endpoint.interface, endpoint.port
        ),
        Err(e) => warn!(
            "Failed to join multicast group {} on {}: {}",
            endpoint.group, endpoint.interface, e
        ),
    }

    Ok(socket.into())
}

/// Async version of [`create_multicast_socket`]. Must run inside a tokio runtime.
pub fn bind_multicast(endpoint: &MulticastEndpoint) -> io::Result<UdpSocket> {
    UdpSocket::from_std(create_multicast_socket(endpoint)?)
}

/// Receive errors after which the socket is still usable.
pub fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
    )
}
