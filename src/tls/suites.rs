//! Cipher suite catalogue
//!
//! OpenSSL names its suites differently from the IANA registry
//! (`ECDHE-RSA-AES128-GCM-SHA256` vs `TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256`).
//! Policies classify IANA names, so sockets report and accept IANA names and
//! this table translates at the OpenSSL boundary.

use openssl::error::ErrorStack;
use openssl::ssl::{SslContextBuilder, SslMethod};

use crate::policy::CipherSuites;

/// Cipher suite catalogue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteInfo {
    /// IANA registry name
    pub name: &'static str,
    /// OpenSSL name
    pub openssl_name: &'static str,
    /// Whether this is a TLS 1.3 suite (configured through `set_ciphersuites`)
    pub is_tls13: bool,
    /// Whether the suite is enabled when no policy narrows the list
    pub default: bool,
}

const fn suite(name: &'static str, openssl_name: &'static str, default: bool) -> SuiteInfo {
    SuiteInfo { name, openssl_name, is_tls13: false, default }
}

const fn tls13(name: &'static str, default: bool) -> SuiteInfo {
    SuiteInfo { name, openssl_name: name, is_tls13: true, default }
}

/// Known suites, most preferred first
pub const CATALOGUE: &[SuiteInfo] = &[
    tls13("TLS_AES_256_GCM_SHA384", true),
    tls13("TLS_AES_128_GCM_SHA256", true),
    tls13("TLS_CHACHA20_POLY1305_SHA256", true),
    tls13("TLS_AES_128_CCM_SHA256", false),
    tls13("TLS_AES_128_CCM_8_SHA256", false),
    // AEAD with ephemeral key exchange
    suite("TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384", "ECDHE-ECDSA-AES256-GCM-SHA384", true),
    suite("TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256", "ECDHE-ECDSA-AES128-GCM-SHA256", true),
    suite("TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256", "ECDHE-ECDSA-CHACHA20-POLY1305", true),
    suite("TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384", "ECDHE-RSA-AES256-GCM-SHA384", true),
    suite("TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256", "ECDHE-RSA-CHACHA20-POLY1305", true),
    suite("TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256", "ECDHE-RSA-AES128-GCM-SHA256", true),
    suite("TLS_DHE_RSA_WITH_AES_256_GCM_SHA384", "DHE-RSA-AES256-GCM-SHA384", true),
    suite("TLS_DHE_RSA_WITH_CHACHA20_POLY1305_SHA256", "DHE-RSA-CHACHA20-POLY1305", true),
    suite("TLS_DHE_RSA_WITH_AES_128_GCM_SHA256", "DHE-RSA-AES128-GCM-SHA256", true),
    // CBC with ephemeral key exchange
    suite("TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384", "ECDHE-ECDSA-AES256-SHA384", true),
    suite("TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384", "ECDHE-RSA-AES256-SHA384", true),
    suite("TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256", "ECDHE-ECDSA-AES128-SHA256", true),
    suite("TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256", "ECDHE-RSA-AES128-SHA256", true),
    suite("TLS_DHE_RSA_WITH_AES_256_CBC_SHA256", "DHE-RSA-AES256-SHA256", true),
    suite("TLS_DHE_RSA_WITH_AES_128_CBC_SHA256", "DHE-RSA-AES128-SHA256", true),
    suite("TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA", "ECDHE-ECDSA-AES256-SHA", true),
    suite("TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA", "ECDHE-RSA-AES256-SHA", true),
    suite("TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA", "ECDHE-ECDSA-AES128-SHA", true),
    suite("TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA", "ECDHE-RSA-AES128-SHA", true),
    suite("TLS_DHE_RSA_WITH_AES_256_CBC_SHA", "DHE-RSA-AES256-SHA", true),
    suite("TLS_DHE_RSA_WITH_AES_128_CBC_SHA", "DHE-RSA-AES128-SHA", true),
    // RSA key exchange
    suite("TLS_RSA_WITH_AES_256_GCM_SHA384", "AES256-GCM-SHA384", true),
    suite("TLS_RSA_WITH_AES_128_GCM_SHA256", "AES128-GCM-SHA256", true),
    suite("TLS_RSA_WITH_AES_256_CBC_SHA256", "AES256-SHA256", true),
    suite("TLS_RSA_WITH_AES_128_CBC_SHA256", "AES128-SHA256", true),
    suite("TLS_RSA_WITH_AES_256_CBC_SHA", "AES256-SHA", true),
    suite("TLS_RSA_WITH_AES_128_CBC_SHA", "AES128-SHA", true),
    // Legacy, only when asked for explicitly
    suite("TLS_ECDH_RSA_WITH_AES_128_CBC_SHA256", "ECDH-RSA-AES128-SHA256", false),
    suite("TLS_ECDH_ECDSA_WITH_AES_128_CBC_SHA256", "ECDH-ECDSA-AES128-SHA256", false),
    suite("TLS_RSA_WITH_3DES_EDE_CBC_SHA", "DES-CBC3-SHA", false),
    suite("TLS_ECDHE_RSA_WITH_RC4_128_SHA", "ECDHE-RSA-RC4-SHA", false),
    suite("TLS_ECDHE_ECDSA_WITH_RC4_128_SHA", "ECDHE-ECDSA-RC4-SHA", false),
    suite("TLS_RSA_WITH_RC4_128_SHA", "RC4-SHA", false),
];

/// Look up a suite by IANA name
pub fn by_name(name: &str) -> Option<&'static SuiteInfo> {
    CATALOGUE.iter().find(|s| s.name == name)
}

/// Look up a suite by OpenSSL name
pub fn by_openssl_name(openssl_name: &str) -> Option<&'static SuiteInfo> {
    CATALOGUE.iter().find(|s| s.openssl_name == openssl_name)
}

/// Enabled suites split the way OpenSSL configures them
#[derive(Debug, Default, PartialEq, Eq)]
pub struct OpensslSuites {
    /// Entries for `set_cipher_list` (TLS 1.2 and below)
    pub cipher_list: Vec<String>,
    /// Entries for `set_ciphersuites` (TLS 1.3)
    pub ciphersuites: Vec<String>,
    /// Enabled names the linked OpenSSL cannot offer
    pub dropped: Vec<String>,
}

impl OpensslSuites {
    /// Translate enabled suite names, keeping their order.
    ///
    /// Catalogue names are kept if they appear in `supported`. Other entries
    /// are kept only if they are a single exact OpenSSL cipher name the
    /// library accepts. Everything else ends up in `dropped`, so an entry can
    /// only narrow what is offered, never widen it.
    pub fn split(suites: &[String], supported: &[String]) -> Self {
        let mut out = OpensslSuites::default();
        for name in suites {
            let info = by_name(name).or_else(|| by_openssl_name(name));
            match info {
                Some(info) if !supported.iter().any(|s| s == info.name) => {
                    out.dropped.push(name.clone())
                }
                Some(info) if info.is_tls13 => out.ciphersuites.push(info.openssl_name.to_string()),
                Some(info) => out.cipher_list.push(info.openssl_name.to_string()),
                None if is_openssl_cipher(name) => out.cipher_list.push(name.clone()),
                None => out.dropped.push(name.clone()),
            }
        }
        out
    }

    /// True if neither list has an entry
    pub fn is_empty(&self) -> bool {
        self.cipher_list.is_empty() && self.ciphersuites.is_empty()
    }
}

/// Whether `name` names exactly one cipher the linked OpenSSL knows.
///
/// Cipher-string keywords (`HIGH`, `DEFAULT`, `kRSA`) have no `-` and
/// operators (`:`, `!`, `+`, `@`) are not name characters, so neither passes
/// the shape check and neither can reach `set_cipher_list`.
pub fn is_openssl_cipher(name: &str) -> bool {
    let shaped = name.contains('-')
        && name.split('-').all(|part| {
            !part.is_empty() && part.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        });
    if !shaped {
        return false;
    }

    SslContextBuilder::new(SslMethod::tls_client())
        .and_then(|mut builder| builder.set_cipher_list(name))
        .is_ok()
}

/// Catalogue suites the linked OpenSSL accepts, in catalogue order
pub fn probe_supported() -> Result<CipherSuites, ErrorStack> {
    let mut builder = SslContextBuilder::new(SslMethod::tls_client())?;

    let supported = CATALOGUE
        .iter()
        .filter(|info| {
            if info.is_tls13 {
                builder.set_ciphersuites(info.openssl_name).is_ok()
            } else {
                builder.set_cipher_list(info.openssl_name).is_ok()
            }
        })
        .map(|info| info.name.to_string())
        .collect();

    Ok(supported)
}

/// The subset of `supported` enabled by default
pub fn defaults_of(supported: &[String]) -> CipherSuites {
    supported
        .iter()
        .filter(|name| by_name(name).map_or(false, |info| info.default))
        .cloned()
        .collect()
}
