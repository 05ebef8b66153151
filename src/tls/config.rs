//! TLS context configuration
//!
//! This module maps protocol identifiers such as `"TLS"` or `"TLSv1.2"` to
//! OpenSSL version bounds and provides the builder for [`TlsContext`], the
//! object socket factories are derived from.

use openssl::x509::X509;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::session::OpensslSocketFactory;
use super::{handshake, suites};
use crate::policy::CipherSuites;

/// TLS version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TlsVersion {
    /// SSL 3.0 (deprecated, rarely compiled into OpenSSL)
    Ssl3,
    /// TLS 1.0
    Tls10,
    /// TLS 1.1
    Tls11,
    /// TLS 1.2
    Tls12,
    /// TLS 1.3
    Tls13,
}

impl TlsVersion {
    /// Get OpenSSL protocol version constant
    pub fn to_openssl_version(&self) -> openssl::ssl::SslVersion {
        use openssl::ssl::SslVersion;
        match self {
            TlsVersion::Ssl3 => SslVersion::SSL3,
            TlsVersion::Tls10 => SslVersion::TLS1,
            TlsVersion::Tls11 => SslVersion::TLS1_1,
            TlsVersion::Tls12 => SslVersion::TLS1_2,
            TlsVersion::Tls13 => SslVersion::TLS1_3,
        }
    }

    /// Get version as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsVersion::Ssl3 => "SSLv3",
            TlsVersion::Tls10 => "TLSv1",
            TlsVersion::Tls11 => "TLSv1.1",
            TlsVersion::Tls12 => "TLSv1.2",
            TlsVersion::Tls13 => "TLSv1.3",
        }
    }
}

/// Protocol identifier a context is requested for
///
/// `Ssl` and `Tls` leave the version range to OpenSSL. A versioned identifier
/// caps the highest version the context will offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsProtocol {
    /// "SSL": any version the library enables
    Ssl,
    /// "TLS": any version the library enables
    Tls,
    /// A specific version, e.g. "TLSv1.2"
    UpTo(TlsVersion),
}

impl TlsProtocol {
    /// Highest version this protocol allows, if capped
    pub fn max_version(&self) -> Option<TlsVersion> {
        match self {
            TlsProtocol::Ssl | TlsProtocol::Tls => None,
            TlsProtocol::UpTo(version) => Some(*version),
        }
    }

    /// Get protocol as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TlsProtocol::Ssl => "SSL",
            TlsProtocol::Tls => "TLS",
            TlsProtocol::UpTo(version) => version.as_str(),
        }
    }
}

impl FromStr for TlsProtocol {
    type Err = TlsError;

    /// Parse a protocol identifier (case-insensitive)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SSL" => Ok(TlsProtocol::Ssl),
            "TLS" => Ok(TlsProtocol::Tls),
            "SSLV3" | "SSL3" => Ok(TlsProtocol::UpTo(TlsVersion::Ssl3)),
            "TLSV1" | "TLSV1.0" | "TLS1" | "TLS1.0" => Ok(TlsProtocol::UpTo(TlsVersion::Tls10)),
            "TLSV1.1" | "TLS1.1" => Ok(TlsProtocol::UpTo(TlsVersion::Tls11)),
            "TLSV1.2" | "TLS1.2" => Ok(TlsProtocol::UpTo(TlsVersion::Tls12)),
            "TLSV1.3" | "TLS1.3" => Ok(TlsProtocol::UpTo(TlsVersion::Tls13)),
            _ => Err(TlsError::UnsupportedProtocol(s.to_string())),
        }
    }
}

/// TLS errors
#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Unsupported protocol: {0}")]
    UnsupportedProtocol(String),

    #[error("TLS context initialization failed: {0}")]
    ContextInit(String),

    #[error("Cipher suite negotiation failed: {0}")]
    NegotiationFailure(String),

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("Handshake failed: {0}")]
    HandshakeFailed(String),

    #[error("OpenSSL error: {0}")]
    OpenSsl(#[from] openssl::error::ErrorStack),

    #[error("Invalid cipher policy: {0}")]
    InvalidPolicy(String),
}

impl From<TlsError> for io::Error {
    fn from(err: TlsError) -> Self {
        match err {
            TlsError::Transport(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// TLS client context (immutable after building)
///
/// Cloning is cheap; the probed cipher suite lists are shared.
#[derive(Debug, Clone)]
pub struct TlsContext {
    pub(crate) protocol: TlsProtocol,
    pub(crate) verify_peer: bool,
    pub(crate) ca_certs: Arc<Vec<X509>>,
    pub(crate) connect_timeout: Option<Duration>,
    pub(crate) default_suites: Arc<CipherSuites>,
    pub(crate) supported_suites: Arc<CipherSuites>,
}

impl TlsContext {
    /// Create a context for `protocol` with the default trust store
    pub fn new(protocol: &str) -> Result<Self, TlsError> {
        TlsContext::builder(protocol)?.build()
    }

    /// Create a context builder for `protocol`
    pub fn builder(protocol: &str) -> Result<TlsContextBuilder, TlsError> {
        Ok(TlsContextBuilder::new(protocol.parse()?))
    }

    /// Protocol this context was created for
    pub fn protocol(&self) -> TlsProtocol {
        self.protocol
    }

    /// Whether peer certificates and host names are verified
    pub fn verify_peer(&self) -> bool {
        self.verify_peer
    }

    /// Socket factory producing connections from this context
    pub fn socket_factory(&self) -> OpensslSocketFactory {
        OpensslSocketFactory::new(self.clone())
    }
}

/// Context configuration builder
pub struct TlsContextBuilder {
    protocol: TlsProtocol,
    verify_peer: bool,
    ca_file: Option<PathBuf>,
    connect_timeout: Option<Duration>,
}

impl TlsContextBuilder {
    fn new(protocol: TlsProtocol) -> Self {
        TlsContextBuilder {
            protocol,
            verify_peer: true,
            ca_file: None,
            connect_timeout: None,
        }
    }

    /// Enable/disable peer certificate and host name verification
    pub fn verify_peer(mut self, verify: bool) -> Self {
        self.verify_peer = verify;
        self
    }

    /// Trust the certificates in this PEM file in addition to the system store
    pub fn ca_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.ca_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Bound the TCP connect of every socket created from this context
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Build the context.
    ///
    /// Trust material is loaded here, so a bad CA file or a broken OpenSSL
    /// install surfaces as `ContextInit` rather than on first connect.
    pub fn build(self) -> Result<TlsContext, TlsError> {
        let ca_certs = match self.ca_file {
            Some(ref path) => load_ca_file(path)?,
            None => Vec::new(),
        };

        let mut ctx = TlsContext {
            protocol: self.protocol,
            verify_peer: self.verify_peer,
            ca_certs: Arc::new(ca_certs),
            connect_timeout: self.connect_timeout,
            default_suites: Arc::default(),
            supported_suites: Arc::default(),
        };

        handshake::connector_builder(&ctx).map_err(|e| TlsError::ContextInit(e.to_string()))?;

        let supported = suites::probe_supported()
            .map_err(|e| TlsError::ContextInit(e.to_string()))?;
        ctx.default_suites = Arc::new(suites::defaults_of(&supported));
        ctx.supported_suites = Arc::new(supported);

        Ok(ctx)
    }
}

fn load_ca_file(path: &Path) -> Result<Vec<X509>, TlsError> {
    let pem = fs::read(path).map_err(|e| {
        TlsError::ContextInit(format!("Failed to read CA file {}: {}", path.display(), e))
    })?;

    let certs = X509::stack_from_pem(&pem).map_err(|e| {
        TlsError::ContextInit(format!("Failed to load CA file {}: {}", path.display(), e))
    })?;

    if certs.is_empty() {
        return Err(TlsError::ContextInit(format!(
            "No certificates in CA file {}",
            path.display()
        )));
    }

    Ok(certs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_parsing() {
        assert_eq!("TLS".parse::<TlsProtocol>().unwrap(), TlsProtocol::Tls);
        assert_eq!("ssl".parse::<TlsProtocol>().unwrap(), TlsProtocol::Ssl);
        assert_eq!(
            "TLSv1.2".parse::<TlsProtocol>().unwrap(),
            TlsProtocol::UpTo(TlsVersion::Tls12)
        );
        assert_eq!(
            "tlsv1".parse::<TlsProtocol>().unwrap(),
            TlsProtocol::UpTo(TlsVersion::Tls10)
        );
        assert_eq!(
            "SSLv3".parse::<TlsProtocol>().unwrap(),
            TlsProtocol::UpTo(TlsVersion::Ssl3)
        );
    }

    #[test]
    fn test_unsupported_protocol() {
        assert!(matches!(
            "QUIC".parse::<TlsProtocol>(),
            Err(TlsError::UnsupportedProtocol(_))
        ));
        assert!(matches!(
            TlsContext::new("DTLSv1.2"),
            Err(TlsError::UnsupportedProtocol(_))
        ));
    }

    #[test]
    fn test_max_version() {
        assert_eq!(TlsProtocol::Tls.max_version(), None);
        assert_eq!(
            TlsProtocol::UpTo(TlsVersion::Tls11).max_version(),
            Some(TlsVersion::Tls11)
        );
        assert!(TlsVersion::Tls12 < TlsVersion::Tls13);
    }

    #[test]
    fn test_context_builder() {
        let ctx = TlsContext::builder("TLSv1.2")
            .unwrap()
            .verify_peer(false)
            .connect_timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(ctx.protocol(), TlsProtocol::UpTo(TlsVersion::Tls12));
        assert!(!ctx.verify_peer());
        assert_eq!(ctx.connect_timeout, Some(Duration::from_secs(3)));
        assert!(!ctx.default_suites.is_empty());
        assert!(ctx
            .default_suites
            .iter()
            .all(|s| ctx.supported_suites.contains(s)));
    }

    #[test]
    fn test_missing_ca_file_is_context_error() {
        let result = TlsContext::builder("TLS")
            .unwrap()
            .ca_file("/nonexistent/cipherpref/ca.pem")
            .build();

        assert!(matches!(result, Err(TlsError::ContextInit(_))));
    }

    #[test]
    fn test_error_into_io() {
        let io_err: io::Error =
            TlsError::Transport(io::Error::new(io::ErrorKind::ConnectionRefused, "refused")).into();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);

        let io_err: io::Error = TlsError::NegotiationFailure("none".into()).into();
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
    }
}
