//! Blocking transport to a Tarantool server.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::transfer::Transfer;

/// Size of the greeting a Tarantool server sends on connect.
pub const GREETING_SIZE: usize = 128;

/// Configuration for the connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Read timeout. `None` blocks forever.
    pub read_timeout: Option<Duration>,
    /// Write timeout. `None` blocks forever.
    pub write_timeout: Option<Duration>,
    /// Disable Nagle's algorithm.
    pub nodelay: bool,
    /// Read and discard the server greeting after connecting.
    pub read_greeting: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            read_timeout: None,
            write_timeout: None,
            nodelay: true,
            read_greeting: true,
        }
    }
}

impl ClientConfig {
    /// Sets both read and write timeouts.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }

    /// Sets whether `TCP_NODELAY` is enabled.
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    /// Sets whether the server greeting is consumed on connect.
    pub fn with_greeting(mut self, read_greeting: bool) -> Self {
        self.read_greeting = read_greeting;
        self
    }
}

/// The transport operations transfers need.
pub trait Connection {
    /// Sends `bytes`, returning how many were written.
    fn send(&mut self, bytes: &[u8]) -> ClientResult<usize>;

    /// Fills `buf` completely, blocking until it is full.
    fn recv_exact(&mut self, buf: &mut [u8]) -> ClientResult<()>;

    /// Sends a transfer's request batch and reads all of its responses.
    fn execute(&mut self, transfer: &mut Transfer<'_>) -> ClientResult<()> {
        let expected = transfer.requests().len();
        let sent = self.send(transfer.requests())?;
        if sent != expected {
            return Err(ClientError::ShortWrite { sent, expected });
        }
        self.recv_exact(transfer.response_buffer_mut())
    }
}

/// A TCP connection to a Tarantool server.
pub struct TcpConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    /// Connects to a server and consumes its greeting.
    pub fn connect(addr: impl ToSocketAddrs, config: &ClientConfig) -> ClientResult<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;
        stream.set_nodelay(config.nodelay)?;
        let peer = stream.peer_addr()?;

        let mut connection = Self { stream, peer };
        info!(%peer, "connected");

        if config.read_greeting {
            let mut greeting = [0u8; GREETING_SIZE];
            connection.recv_exact(&mut greeting)?;
            let banner = String::from_utf8_lossy(&greeting[..GREETING_SIZE / 2]);
            info!(banner = banner.trim_end(), "received greeting");
        }

        Ok(connection)
    }
}

impl Connection for TcpConnection {
    fn send(&mut self, bytes: &[u8]) -> ClientResult<usize> {
        self.stream.write_all(bytes)?;
        debug!(bytes = bytes.len(), "sent");
        Ok(bytes.len())
    }

    fn recv_exact(&mut self, buf: &mut [u8]) -> ClientResult<()> {
        let mut received = 0;
        while received < buf.len() {
            match self.stream.read(&mut buf[received..]) {
                Ok(0) => {
                    return Err(ClientError::ConnectionClosed {
                        received,
                        expected: buf.len(),
                    });
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TcpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TcpConnection")
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}
