//! cipherpref - cipher suite preferences for TLS client sockets
//!
//! This crate wraps a TLS socket factory and restricts the cipher suites every
//! socket it creates may negotiate: ECDHE only, forward secrecy only, no
//! forward secrecy, or an explicit list. The handshake itself is left to
//! OpenSSL.
//!
//! ```no_run
//! use cipherpref::{PrefSocketFactory, TlsSocket, TlsSocketFactory};
//!
//! let factory = PrefSocketFactory::new("TLS").unwrap();
//! factory.use_ecdhe_only();
//!
//! let mut socket = factory.create_socket("www.google.com", 443).unwrap();
//! let cipher = socket.cipher_suite().unwrap();
//! assert!(cipher.contains("_ECDHE_"));
//! ```

pub mod net;
pub mod policy;
pub mod tls;

pub use policy::{resolve, CipherPolicy, CipherSuites};
pub use tls::{PrefSocketFactory, TlsError, TlsSocket, TlsSocketFactory};
