//! Cipher policy enforcing socket factory
//!
//! [`PrefSocketFactory`] wraps any [`TlsSocketFactory`] and sets the enabled
//! cipher suites of every socket the delegate creates to the factory's
//! current list.
//!
//! The current list lives in an [`ArcSwap`]: policy changes store a fresh
//! snapshot, socket creation loads one snapshot and applies it whole, so a
//! socket never sees a half-updated list even when the factory is shared
//! between threads. Concurrent changes are last-writer-wins.

use arc_swap::ArcSwap;
use std::net::{IpAddr, TcpStream};
use std::sync::Arc;

use super::config::TlsContext;
use super::session::OpensslSocketFactory;
use super::socket::{TlsSocket, TlsSocketFactory};
use super::Result;
use crate::policy::{resolve, CipherPolicy, CipherSuites};

/// Socket factory restricting the cipher suites of the sockets it creates
pub struct PrefSocketFactory<F> {
    delegate: F,
    suites: ArcSwap<CipherSuites>,
}

impl PrefSocketFactory<OpensslSocketFactory> {
    /// Create a factory for `protocol` (e.g. "TLS", "TLSv1.2") using the
    /// default trust store.
    ///
    /// Fails with `UnsupportedProtocol` for an unknown identifier and with
    /// `ContextInit` if OpenSSL cannot be set up.
    pub fn new(protocol: &str) -> Result<Self> {
        let context = TlsContext::new(protocol)?;
        Ok(PrefSocketFactory::with_delegate(context.socket_factory()))
    }
}

impl<F: TlsSocketFactory> PrefSocketFactory<F> {
    /// Wrap an existing socket factory
    pub fn with_delegate(delegate: F) -> Self {
        let suites = ArcSwap::from_pointee(delegate.default_cipher_suites());
        PrefSocketFactory { delegate, suites }
    }

    /// Use ECDHE cipher suites only
    pub fn use_ecdhe_only(&self) {
        self.apply(CipherPolicy::EcdheOnly);
    }

    /// Don't use forward secrecy cipher suites.
    ///
    /// This is UNSAFE: recorded traffic can be decrypted by anyone who later
    /// obtains the server's private key.
    pub fn use_no_forward_secrecy(&self) {
        self.apply(CipherPolicy::NoForwardSecrecy);
    }

    /// Use forward secrecy (ECDHE or DHE) cipher suites only
    pub fn use_forward_secrecy(&self) {
        self.apply(CipherPolicy::ForwardSecrecyOnly);
    }

    /// Use exactly these cipher suites, in this order.
    ///
    /// The list is not validated. An empty list makes every handshake fail.
    pub fn set_cipher<S: AsRef<str>>(&self, ciphers: &[S]) {
        let list = ciphers.iter().map(|s| s.as_ref().to_string()).collect();
        self.apply(CipherPolicy::Explicit(list));
    }

    /// Replace the current cipher suites with `policy` applied to the
    /// delegate's default suites.
    ///
    /// Always starts from the delegate's defaults, never from the current
    /// list: the last call wins.
    pub fn apply(&self, policy: CipherPolicy) {
        let suites = resolve(&self.delegate.default_cipher_suites(), &policy);
        tracing::debug!(policy = %policy, suites = suites.len(), "cipher policy applied");
        self.suites.store(Arc::new(suites));
    }

    /// Snapshot of the current cipher suites
    pub fn cipher_suites(&self) -> Arc<CipherSuites> {
        self.suites.load_full()
    }

    /// The wrapped factory
    pub fn delegate(&self) -> &F {
        &self.delegate
    }

    fn enforce(&self, mut socket: F::Socket, target: &dyn std::fmt::Display) -> F::Socket {
        let suites = self.suites.load_full();
        socket.set_enabled_cipher_suites(&suites);
        tracing::trace!(target_addr = %target, suites = suites.len(), "cipher suites applied to socket");
        socket
    }
}

impl<F: TlsSocketFactory> TlsSocketFactory for PrefSocketFactory<F> {
    type Socket = F::Socket;

    /// The current cipher suites, not the delegate's defaults
    fn default_cipher_suites(&self) -> Vec<String> {
        self.suites.load_full().as_ref().clone()
    }

    /// The current cipher suites, not the delegate's supported set
    fn supported_cipher_suites(&self) -> Vec<String> {
        self.suites.load_full().as_ref().clone()
    }

    fn create_socket(&self, host: &str, port: u16) -> Result<F::Socket> {
        let socket = self.delegate.create_socket(host, port)?;
        Ok(self.enforce(socket, &format_args!("{}:{}", host, port)))
    }

    fn create_socket_addr(&self, addr: IpAddr, port: u16) -> Result<F::Socket> {
        let socket = self.delegate.create_socket_addr(addr, port)?;
        Ok(self.enforce(socket, &format_args!("{}:{}", addr, port)))
    }

    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<F::Socket> {
        let socket = self
            .delegate
            .create_socket_bound(host, port, local_addr, local_port)?;
        Ok(self.enforce(socket, &format_args!("{}:{}", host, port)))
    }

    fn create_socket_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<F::Socket> {
        let socket = self
            .delegate
            .create_socket_addr_bound(addr, port, local_addr, local_port)?;
        Ok(self.enforce(socket, &format_args!("{}:{}", addr, port)))
    }

    fn create_layered_socket(
        &self,
        stream: TcpStream,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Result<F::Socket> {
        let socket = self
            .delegate
            .create_layered_socket(stream, host, port, auto_close)?;
        Ok(self.enforce(socket, &format_args!("{}:{}", host, port)))
    }
}
