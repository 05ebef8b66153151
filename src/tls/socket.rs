//! Socket capability traits
//!
//! The policy layer depends only on these traits: anything that can create
//! TLS-capable sockets and report its default cipher suites can be wrapped by
//! [`PrefSocketFactory`](super::PrefSocketFactory).

use std::io::{Read, Write};
use std::net::{IpAddr, TcpStream};

use super::Result;

/// A client socket whose enabled cipher suites can be set before the
/// handshake
pub trait TlsSocket: Read + Write {
    /// Cipher suites this socket will offer, most preferred first
    fn enabled_cipher_suites(&self) -> &[String];

    /// Replace the suites this socket will offer.
    ///
    /// Takes effect on the next handshake. The list is used verbatim; names
    /// the TLS engine does not know are reported at handshake time.
    fn set_enabled_cipher_suites(&mut self, suites: &[String]);

    /// Perform the handshake now instead of on first I/O
    fn start_handshake(&mut self) -> Result<()>;

    /// IANA name of the negotiated suite, performing the handshake if needed
    fn cipher_suite(&mut self) -> Result<String>;
}

/// Creates connected TLS client sockets
///
/// Every creation method returns the underlying failure unchanged, typically
/// `TlsError::Transport` for connect errors.
pub trait TlsSocketFactory {
    /// Socket type produced by this factory
    type Socket: TlsSocket;

    /// Suites enabled on new sockets when nothing narrows the list
    fn default_cipher_suites(&self) -> Vec<String>;

    /// Suites that could be enabled
    fn supported_cipher_suites(&self) -> Vec<String>;

    /// Connect to `host:port`
    fn create_socket(&self, host: &str, port: u16) -> Result<Self::Socket>;

    /// Connect to `addr:port`
    fn create_socket_addr(&self, addr: IpAddr, port: u16) -> Result<Self::Socket>;

    /// Connect to `host:port` from `local_addr:local_port`
    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<Self::Socket>;

    /// Connect to `addr:port` from `local_addr:local_port`
    fn create_socket_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<Self::Socket>;

    /// Layer TLS over an already connected stream, e.g. after a protocol
    /// upgrade.
    ///
    /// `host` and `port` name the peer for SNI and certificate checks. When
    /// `auto_close` is false, closing the TLS socket leaves the TCP
    /// connection open for other handles to it.
    fn create_layered_socket(
        &self,
        stream: TcpStream,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Result<Self::Socket>;
}
