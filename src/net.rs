//! TCP connection helpers
//!
//! Connects with an optional local bind address and connect timeout, trying
//! every address a host name resolves to.

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

/// Connect to `host:port`.
///
/// When `local` is set, addresses of the other IP family are skipped. The
/// error from the last attempted address is returned if none connects.
pub fn connect(
    host: &str,
    port: u16,
    local: Option<SocketAddr>,
    timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let mut last_err = None;

    for addr in (host, port).to_socket_addrs()? {
        if let Some(local) = local {
            if local.is_ipv4() != addr.is_ipv4() {
                continue;
            }
        }

        match connect_addr(addr, local, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no usable address for {}:{}", host, port),
        )
    }))
}

/// Connect to a single socket address
pub fn connect_addr(
    addr: SocketAddr,
    local: Option<SocketAddr>,
    timeout: Option<Duration>,
) -> io::Result<TcpStream> {
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;

    if let Some(local) = local {
        socket.bind(&SockAddr::from(local))?;
    }

    let target = SockAddr::from(addr);
    match timeout {
        Some(timeout) => socket.connect_timeout(&target, timeout)?,
        None => socket.connect(&target)?,
    }

    Ok(socket.into())
}
