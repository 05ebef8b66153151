//! TLS client sockets with cipher suite policies
//!
//! This module restricts the cipher suites TLS client connections may
//! negotiate. The handshake, certificate checks and record layer are left to
//! OpenSSL.
//!
//! # Architecture
//!
//! The policy layer is a decorator over a socket factory:
//!
//! 1. `TlsSocketFactory` and `TlsSocket` describe what any TLS provider offers
//! 2. `OpensslSocketFactory` implements them on top of a `TlsContext`
//! 3. `PrefSocketFactory` wraps any `TlsSocketFactory` and sets the enabled
//!    suites on every socket it hands out
//!
//! Suite names are IANA names (`TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256`); the
//! `suites` catalogue translates them to OpenSSL names at handshake time.
//!
//! # Examples
//!
//! ## Forward secrecy only
//!
//! ```no_run
//! use cipherpref::tls::{PrefSocketFactory, TlsSocket, TlsSocketFactory};
//!
//! let factory = PrefSocketFactory::new("TLSv1.2").unwrap();
//! factory.use_forward_secrecy();
//!
//! let mut socket = factory.create_socket("example.com", 443).unwrap();
//! println!("negotiated {}", socket.cipher_suite().unwrap());
//! ```
//!
//! ## Explicit list over a custom context
//!
//! ```no_run
//! use cipherpref::tls::{PrefSocketFactory, TlsContext, TlsSocket, TlsSocketFactory};
//! use std::time::Duration;
//!
//! let context = TlsContext::builder("TLS")
//!     .unwrap()
//!     .ca_file("ca.pem")
//!     .connect_timeout(Duration::from_secs(5))
//!     .build()
//!     .unwrap();
//!
//! let factory = PrefSocketFactory::with_delegate(context.socket_factory());
//! factory.set_cipher(&["TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256"]);
//!
//! let mut socket = factory.create_socket("localhost", 8443).unwrap();
//! socket.start_handshake().unwrap();
//! ```

pub mod config;
pub mod factory;
pub mod handshake;
pub mod session;
pub mod socket;
pub mod suites;
pub mod vars;

pub use config::{TlsContext, TlsContextBuilder, TlsError, TlsProtocol, TlsVersion};
pub use factory::PrefSocketFactory;
pub use session::{OpensslSocket, OpensslSocketFactory};
pub use socket::{TlsSocket, TlsSocketFactory};
pub use vars::TlsVars;

/// Result type for TLS operations
pub type Result<T> = std::result::Result<T, TlsError>;
