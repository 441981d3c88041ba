//! UDP transport: a single shared socket tuned with `socket2`, wrapped for
//! async send/receive with deadline enforcement.

use std::net::SocketAddr;
use std::time::Duration;

use socket2::{Domain, Socket, Type};
use tokio::net::UdpSocket;
use tracing::warn;

use crate::error::{Result, SnmpError};
use crate::snmp::ber::MAX_MESSAGE_SIZE;

/// Requested OS receive-buffer size; best-effort, never fatal if the
/// kernel grants less.
const RECV_BUFFER_BYTES: usize = 4 * 1024 * 1024;

pub struct Transport {
    socket: UdpSocket,
}

impl Transport {
    /// Bind an unconnected IPv4 UDP socket on an ephemeral port, shared by
    /// every outstanding request the engine correlates.
    pub async fn bind_v4() -> Result<Transport> {
        Self::bind(SocketAddr::from(([0, 0, 0, 0], 0))).await
    }

    pub async fn bind_v6() -> Result<Transport> {
        Self::bind(SocketAddr::from(([0u16; 8], 0))).await
    }

    pub async fn bind(addr: SocketAddr) -> Result<Transport> {
        let domain = if addr.is_ipv6() { Domain::IPV6 } else { Domain::IPV4 };
        let socket = Socket::new(domain, Type::DGRAM, None)
            .map_err(|e| SnmpError::SocketError(e.to_string()))?;
        socket
            .set_nonblocking(true)
            .map_err(|e| SnmpError::SocketError(e.to_string()))?;
        if let Err(e) = socket.set_recv_buffer_size(RECV_BUFFER_BYTES) {
            warn!(error = %e, "failed to set UDP receive buffer size, continuing with default");
        }
        socket
            .bind(&addr.into())
            .map_err(|e| SnmpError::SocketError(e.to_string()))?;
        let std_socket: std::net::UdpSocket = socket.into();
        let socket = UdpSocket::from_std(std_socket).map_err(SnmpError::Io)?;
        Ok(Transport { socket })
    }

    /// Send one already-encoded message to `target`. Rejects payloads
    /// larger than a single UDP datagram can carry.
    pub async fn send_to(&self, bytes: &[u8], target: SocketAddr) -> Result<()> {
        if bytes.len() > MAX_MESSAGE_SIZE {
            return Err(SnmpError::LengthTooLarge(bytes.len()));
        }
        self.socket.send_to(bytes, target).await.map_err(classify_send_error)?;
        Ok(())
    }

    /// Wait up to `timeout` for one datagram, returning its bytes and the
    /// address it arrived from.
    pub async fn recv_from(&self, timeout: Duration) -> Result<(Vec<u8>, SocketAddr)> {
        let mut buf = vec![0u8; MAX_MESSAGE_SIZE];
        let result = tokio::time::timeout(timeout, self.socket.recv_from(&mut buf)).await;
        match result {
            Err(_) => Err(SnmpError::Timeout(timeout)),
            Ok(Err(e)) => Err(SnmpError::Io(e)),
            Ok(Ok((len, from))) => {
                buf.truncate(len);
                Ok((buf, from))
            }
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr().map_err(SnmpError::Io)
    }
}

fn classify_send_error(e: std::io::Error) -> SnmpError {
    use std::io::ErrorKind::*;
    match e.kind() {
        ConnectionRefused => SnmpError::ConnectionRefused(e.to_string()),
        NetworkUnreachable => SnmpError::NetworkUnreachable(e.to_string()),
        HostUnreachable => SnmpError::HostUnreachable(e.to_string()),
        _ => SnmpError::Io(e),
    }
}
