//! UDP socket construction
//!
//! One bind helper shared by the beacons and unicast probes. `socket2`
//! gives us non-blocking mode and `SO_REUSEADDR` before the bind, which
//! tokio's own constructor cannot do.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// Bind a reusable, non-blocking UDP socket and hand it to tokio
pub fn bind_udp(addr: SocketAddr) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_nonblocking(true)?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    UdpSocket::from_std(socket.into())
}
