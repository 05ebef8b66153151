//! OpenSSL client sockets
//!
//! The TCP connection is made when a socket is created; the TLS handshake is
//! deferred until [`TlsSocket::start_handshake`], [`TlsSocket::cipher_suite`]
//! or the first read/write, so the enabled cipher suites can still be changed
//! in between.

use openssl::ssl::SslStream;
use std::fmt;
use std::io::{self, Read, Write};
use std::mem;
use std::net::{IpAddr, Shutdown, SocketAddr, TcpStream};

use super::config::{TlsContext, TlsError};
use super::handshake;
use super::socket::{TlsSocket, TlsSocketFactory};
use super::vars::TlsVars;
use super::Result;
use crate::net;
use crate::policy::CipherSuites;

enum State {
    Pending(TcpStream),
    Established(SslStream<TcpStream>),
    Failed,
    Closed,
}

/// TLS client socket backed by OpenSSL
pub struct OpensslSocket {
    state: State,
    context: TlsContext,
    host: String,
    port: u16,
    suites: CipherSuites,
    auto_close: bool,
    vars: TlsVars,
}

impl OpensslSocket {
    fn new(
        stream: TcpStream,
        context: TlsContext,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Self {
        let suites = context.default_suites.as_ref().clone();
        OpensslSocket {
            state: State::Pending(stream),
            context,
            host: host.to_string(),
            port,
            suites,
            auto_close,
            vars: TlsVars::default(),
        }
    }

    /// Peer host name (or address) used for SNI and certificate checks
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Peer port
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether the handshake has completed
    pub fn is_established(&self) -> bool {
        matches!(self.state, State::Established(_))
    }

    /// Session parameters; `<undef>` until the handshake completes
    pub fn vars(&self) -> &TlsVars {
        &self.vars
    }

    /// Get reference to underlying TCP stream
    pub fn get_ref(&self) -> Option<&TcpStream> {
        match &self.state {
            State::Pending(stream) => Some(stream),
            State::Established(stream) => Some(stream.get_ref()),
            State::Failed | State::Closed => None,
        }
    }

    /// Send close_notify, then shut the TCP connection down if this socket
    /// owns it (`auto_close`).
    pub fn close(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, State::Closed) {
            State::Established(mut stream) => {
                // close_notify is best effort; the peer may have closed first
                let _ = stream.shutdown();
                if self.auto_close {
                    shutdown_tcp(stream.get_ref())?;
                }
            }
            State::Pending(stream) => {
                if self.auto_close {
                    shutdown_tcp(&stream)?;
                }
            }
            State::Failed | State::Closed => {}
        }
        Ok(())
    }

    fn established(&mut self) -> Result<&mut SslStream<TcpStream>> {
        self.start_handshake()?;
        match &mut self.state {
            State::Established(stream) => Ok(stream),
            _ => Err(TlsError::HandshakeFailed("no established session".to_string())),
        }
    }
}

// The peer may already be gone; that is not a close failure
fn shutdown_tcp(stream: &TcpStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

impl TlsSocket for OpensslSocket {
    fn enabled_cipher_suites(&self) -> &[String] {
        &self.suites
    }

    fn set_enabled_cipher_suites(&mut self, suites: &[String]) {
        self.suites = suites.to_vec();
    }

    fn start_handshake(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, State::Failed) {
            State::Pending(stream) => {
                let stream = handshake::connect(&self.context, &self.host, &self.suites, stream)?;
                self.vars = TlsVars::from_ssl(stream.ssl());
                tracing::trace!(
                    host = %self.host,
                    port = self.port,
                    cipher = %self.vars.cipher,
                    version = %self.vars.version,
                    "TLS handshake complete"
                );
                self.state = State::Established(stream);
                Ok(())
            }
            State::Established(stream) => {
                self.state = State::Established(stream);
                Ok(())
            }
            State::Failed => Err(TlsError::HandshakeFailed(
                "an earlier handshake on this socket failed".to_string(),
            )),
            State::Closed => {
                self.state = State::Closed;
                Err(TlsError::Transport(io::Error::new(
                    io::ErrorKind::NotConnected,
                    "socket is closed",
                )))
            }
        }
    }

    fn cipher_suite(&mut self) -> Result<String> {
        self.start_handshake()?;
        Ok(self.vars.cipher.clone())
    }
}

impl Read for OpensslSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.established()?.read(buf)
    }
}

impl Write for OpensslSocket {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.established()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.state {
            State::Established(stream) => stream.flush(),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for OpensslSocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpensslSocket")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("established", &self.is_established())
            .field("suites", &self.suites.len())
            .finish()
    }
}

/// Socket factory derived from a [`TlsContext`]
#[derive(Debug, Clone)]
pub struct OpensslSocketFactory {
    context: TlsContext,
}

impl OpensslSocketFactory {
    pub(crate) fn new(context: TlsContext) -> Self {
        OpensslSocketFactory { context }
    }

    /// Context sockets are created from
    pub fn context(&self) -> &TlsContext {
        &self.context
    }

    fn open(
        &self,
        host: &str,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<OpensslSocket> {
        let stream = net::connect(host, port, local, self.context.connect_timeout)?;
        Ok(OpensslSocket::new(stream, self.context.clone(), host, port, true))
    }

    fn open_addr(
        &self,
        addr: IpAddr,
        port: u16,
        local: Option<SocketAddr>,
    ) -> Result<OpensslSocket> {
        let stream = net::connect_addr(
            SocketAddr::new(addr, port),
            local,
            self.context.connect_timeout,
        )?;
        Ok(OpensslSocket::new(
            stream,
            self.context.clone(),
            &addr.to_string(),
            port,
            true,
        ))
    }
}

impl TlsSocketFactory for OpensslSocketFactory {
    type Socket = OpensslSocket;

    fn default_cipher_suites(&self) -> Vec<String> {
        self.context.default_suites.as_ref().clone()
    }

    fn supported_cipher_suites(&self) -> Vec<String> {
        self.context.supported_suites.as_ref().clone()
    }

    fn create_socket(&self, host: &str, port: u16) -> Result<OpensslSocket> {
        self.open(host, port, None)
    }

    fn create_socket_addr(&self, addr: IpAddr, port: u16) -> Result<OpensslSocket> {
        self.open_addr(addr, port, None)
    }

    fn create_socket_bound(
        &self,
        host: &str,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<OpensslSocket> {
        self.open(host, port, Some(SocketAddr::new(local_addr, local_port)))
    }

    fn create_socket_addr_bound(
        &self,
        addr: IpAddr,
        port: u16,
        local_addr: IpAddr,
        local_port: u16,
    ) -> Result<OpensslSocket> {
        self.open_addr(addr, port, Some(SocketAddr::new(local_addr, local_port)))
    }

    fn create_layered_socket(
        &self,
        stream: TcpStream,
        host: &str,
        port: u16,
        auto_close: bool,
    ) -> Result<OpensslSocket> {
        Ok(OpensslSocket::new(
            stream,
            self.context.clone(),
            host,
            port,
            auto_close,
        ))
    }
}
