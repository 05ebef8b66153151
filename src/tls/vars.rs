//! Negotiated session parameters
//!
//! Populated once after a successful handshake so callers can inspect what
//! the policy actually produced.

use openssl::nid::Nid;
use openssl::ssl::{NameType, SslRef};

use super::suites;

/// Session parameters available after handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsVars {
    /// Negotiated TLS version (e.g., "TLSv1.3")
    pub version: String,

    /// Negotiated cipher suite, IANA name
    pub cipher: String,

    /// Negotiated cipher suite, OpenSSL name
    pub openssl_cipher: String,

    /// SNI servername sent to the peer
    pub servername: Option<String>,

    /// Common Name of the peer certificate
    pub peer_subject: Option<String>,
}

impl TlsVars {
    /// Collect parameters from an established SSL connection
    pub fn from_ssl(ssl: &SslRef) -> Self {
        let (cipher, openssl_cipher) = match ssl.current_cipher() {
            Some(c) => {
                let iana = c
                    .standard_name()
                    .map(str::to_string)
                    .or_else(|| suites::by_openssl_name(c.name()).map(|s| s.name.to_string()))
                    .unwrap_or_else(|| c.name().to_string());
                (iana, c.name().to_string())
            }
            None => ("<undef>".to_string(), "<undef>".to_string()),
        };

        let peer_subject = ssl.peer_certificate().and_then(|cert| {
            cert.subject_name()
                .entries_by_nid(Nid::COMMONNAME)
                .next()
                .and_then(|entry| entry.data().as_utf8().ok())
                .map(|s| s.to_string())
        });

        TlsVars {
            version: ssl.version_str().to_string(),
            cipher,
            openssl_cipher,
            servername: ssl.servername(NameType::HOST_NAME).map(|s| s.to_string()),
            peer_subject,
        }
    }
}

impl Default for TlsVars {
    fn default() -> Self {
        TlsVars {
            version: "<undef>".to_string(),
            cipher: "<undef>".to_string(),
            openssl_cipher: "<undef>".to_string(),
            servername: None,
            peer_subject: None,
        }
    }
}
