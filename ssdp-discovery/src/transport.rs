//! UDP multicast transport for SSDP traffic.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tracing::{debug, info};

use crate::error::{DiscoveryError, Result};
use crate::ssdp::{SSDP_MULTICAST_ADDR, SSDP_PORT};

/// Default bound on a single blocking receive.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(200);

/// Outcome of a single bounded receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// A datagram of the given length was written to the buffer
    Datagram(usize),
    /// The receive timeout elapsed without data
    WouldBlock,
}

/// A datagram endpoint the search loop sends requests through and polls for
/// responses.
pub trait Transport {
    /// Send a single datagram. Failure leaves the transport open.
    fn send_to(&mut self, datagram: &[u8], target: SocketAddrV4) -> io::Result<()>;

    /// Block for at most the transport's receive timeout waiting for one
    /// datagram. A timeout is `Ok(Received::WouldBlock)`, never an error.
    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<Received>;

    /// Release the underlying resource. Calling it again has no effect.
    fn close(&mut self);
}

/// UDP socket bound to the SSDP port and joined to the SSDP multicast group.
#[derive(Debug)]
pub struct MulticastTransport {
    socket: Option<UdpSocket>,
}

impl MulticastTransport {
    /// Open a transport with the default receive timeout.
    pub fn open() -> Result<Self> {
        Self::open_with_timeout(DEFAULT_RECEIVE_TIMEOUT)
    }

    /// Bind `0.0.0.0:1900` with address reuse, join `239.255.255.250` on the
    /// default interface and bound each receive by `receive_timeout`.
    pub fn open_with_timeout(receive_timeout: Duration) -> Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| DiscoveryError::transport("socket creation", e))?;

        socket
            .set_reuse_address(true)
            .map_err(|e| DiscoveryError::transport("enabling address reuse", e))?;

        let bind_addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, SSDP_PORT));
        socket
            .bind(&bind_addr.into())
            .map_err(|e| DiscoveryError::transport("bind", e))?;

        socket
            .join_multicast_v4(&SSDP_MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED)
            .map_err(|e| DiscoveryError::transport("multicast group join", e))?;

        let socket: UdpSocket = socket.into();
        socket
            .set_read_timeout(Some(receive_timeout))
            .map_err(|e| DiscoveryError::transport("setting receive timeout", e))?;

        info!(
            "SSDP transport bound to {} and joined {}",
            bind_addr, SSDP_MULTICAST_ADDR
        );

        Ok(Self {
            socket: Some(socket),
        })
    }

    pub fn is_closed(&self) -> bool {
        self.socket.is_none()
    }

    fn socket(&self) -> io::Result<&UdpSocket> {
        self.socket
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "transport is closed"))
    }
}

impl Transport for MulticastTransport {
    fn send_to(&mut self, datagram: &[u8], target: SocketAddrV4) -> io::Result<()> {
        self.socket()?.send_to(datagram, target)?;
        Ok(())
    }

    fn receive(&mut self, buffer: &mut [u8]) -> io::Result<Received> {
        match self.socket()?.recv_from(buffer) {
            Ok((size, from)) => {
                debug!("Received {} byte datagram from {}", size, from);
                Ok(Received::Datagram(size))
            }
            // Unix reports an elapsed read timeout as WouldBlock, Windows as TimedOut
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(Received::WouldBlock)
            }
            Err(e) => Err(e),
        }
    }

    fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            let _ = socket.leave_multicast_v4(&SSDP_MULTICAST_ADDR, &Ipv4Addr::UNSPECIFIED);
            drop(socket);
            info!("SSDP transport closed");
        }
    }
}

impl Drop for MulticastTransport {
    fn drop(&mut self) {
        self.close();
    }
}
