//! Cipher suite policies
//!
//! This module derives an enabled cipher suite list from a base list and a
//! [`CipherPolicy`]. Suite names are opaque strings; the only structure
//! inspected is the key exchange marker (`_ECDHE_` or `_DHE_`) in IANA-style
//! names such as `TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256`.
//!
//! Nothing here touches a socket, so every rule can be tested without a TLS
//! provider.

use std::fmt;
use std::str::FromStr;

use crate::tls::TlsError;

/// Ordered list of cipher suite names, most preferred first.
///
/// Duplicates are kept. An empty list is legal and disables negotiation.
pub type CipherSuites = Vec<String>;

/// Marker for elliptic-curve ephemeral Diffie-Hellman suites
pub const ECDHE_MARKER: &str = "_ECDHE_";

/// Marker for finite-field ephemeral Diffie-Hellman suites
pub const DHE_MARKER: &str = "_DHE_";

/// Cipher suite selection policy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CipherPolicy {
    /// Keep the base list as is
    #[default]
    AllDefault,
    /// Keep only ECDHE suites
    EcdheOnly,
    /// Keep only ECDHE and DHE suites
    ForwardSecrecyOnly,
    /// Drop every ECDHE and DHE suite.
    ///
    /// Sessions negotiated this way can be decrypted later by anyone who
    /// obtains the server's private key. Only use it when that is the point.
    NoForwardSecrecy,
    /// Use exactly this list, ignoring the base list
    Explicit(CipherSuites),
}

impl CipherPolicy {
    /// Name of the policy, as accepted by [`CipherPolicy::from_str`]
    pub fn as_str(&self) -> &'static str {
        match self {
            CipherPolicy::AllDefault => "default",
            CipherPolicy::EcdheOnly => "ecdhe-only",
            CipherPolicy::ForwardSecrecyOnly => "forward-secrecy",
            CipherPolicy::NoForwardSecrecy => "no-forward-secrecy",
            CipherPolicy::Explicit(_) => "explicit",
        }
    }

    /// Whether a suite passes this policy's filter.
    ///
    /// `Explicit` does not filter; it replaces the list, so every name passes.
    pub fn admits(&self, suite: &str) -> bool {
        match self {
            CipherPolicy::AllDefault | CipherPolicy::Explicit(_) => true,
            CipherPolicy::EcdheOnly => is_ecdhe(suite),
            CipherPolicy::ForwardSecrecyOnly => has_forward_secrecy(suite),
            CipherPolicy::NoForwardSecrecy => !has_forward_secrecy(suite),
        }
    }
}

impl fmt::Display for CipherPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CipherPolicy {
    type Err = TlsError;

    /// Parse a preset policy name (case-insensitive).
    ///
    /// Explicit lists have no textual form; build them with
    /// `CipherPolicy::Explicit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "all-default" | "all" => Ok(CipherPolicy::AllDefault),
            "ecdhe-only" | "ecdhe" => Ok(CipherPolicy::EcdheOnly),
            "forward-secrecy" | "fs" => Ok(CipherPolicy::ForwardSecrecyOnly),
            "no-forward-secrecy" | "no-fs" => Ok(CipherPolicy::NoForwardSecrecy),
            _ => Err(TlsError::InvalidPolicy(s.to_string())),
        }
    }
}

/// True if the suite name carries the `_ECDHE_` marker
pub fn is_ecdhe(suite: &str) -> bool {
    suite.contains(ECDHE_MARKER)
}

/// True if the suite name carries the `_DHE_` marker
pub fn is_dhe(suite: &str) -> bool {
    suite.contains(DHE_MARKER)
}

/// True if the suite uses an ephemeral key exchange (ECDHE or DHE)
pub fn has_forward_secrecy(suite: &str) -> bool {
    is_ecdhe(suite) || is_dhe(suite)
}

/// Apply `policy` to `base`.
///
/// Filtering policies return the matching subsequence of `base` in its
/// original order; an empty result is not an error. `Explicit` returns its
/// own list verbatim and never consults `base`.
pub fn resolve<S: AsRef<str>>(base: &[S], policy: &CipherPolicy) -> CipherSuites {
    if let CipherPolicy::Explicit(list) = policy {
        return list.clone();
    }

    base.iter()
        .map(AsRef::as_ref)
        .filter(|suite| policy.admits(suite))
        .map(str::to_string)
        .collect()
}
