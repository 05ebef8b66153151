//! TLS handshake logic
//!
//! Builds a per-connection OpenSSL connector carrying the socket's enabled
//! cipher suites, runs the client handshake and sorts OpenSSL's failures into
//! [`TlsError`] kinds.

use openssl::error::ErrorStack;
use openssl::ssl::{HandshakeError, SslConnector, SslConnectorBuilder, SslMethod, SslStream, SslVerifyMode};
use std::net::TcpStream;

use super::config::{TlsContext, TlsError, TlsVersion};
use super::suites::OpensslSuites;

/// OpenSSL reasons that mean no cipher suite or version could be agreed on
const NEGOTIATION_REASONS: &[&str] = &[
    "no shared cipher",
    "handshake failure",
    "no ciphers available",
    "no cipher match",
    "no protocols available",
];

/// Connector builder with the context's protocol bounds and trust settings
pub(crate) fn connector_builder(ctx: &TlsContext) -> Result<SslConnectorBuilder, ErrorStack> {
    let mut builder = SslConnector::builder(SslMethod::tls_client())?;

    if let Some(max) = ctx.protocol.max_version() {
        builder.set_max_proto_version(Some(max.to_openssl_version()))?;
    }

    for cert in ctx.ca_certs.iter() {
        builder.cert_store_mut().add_cert(cert.clone())?;
    }

    if ctx.verify_peer {
        builder.set_verify(SslVerifyMode::PEER);
    } else {
        builder.set_verify(SslVerifyMode::NONE);
    }

    Ok(builder)
}

/// Version bounds that keep OpenSSL from offering a version with no enabled
/// suite. An empty TLS 1.3 list caps at TLS 1.2, an empty TLS 1.2 list floors
/// at TLS 1.3.
pub(crate) fn version_bounds(
    max: Option<TlsVersion>,
    suites: &OpensslSuites,
) -> (Option<TlsVersion>, Option<TlsVersion>) {
    let min = if suites.cipher_list.is_empty() {
        Some(TlsVersion::Tls13)
    } else {
        None
    };

    let max = if suites.ciphersuites.is_empty() {
        Some(max.map_or(TlsVersion::Tls12, |m| m.min(TlsVersion::Tls12)))
    } else {
        max
    };

    (min, max)
}

/// Apply the enabled suites to a connector builder
pub(crate) fn apply_suites(
    builder: &mut SslConnectorBuilder,
    ctx: &TlsContext,
    enabled: &[String],
) -> Result<(), TlsError> {
    let suites = OpensslSuites::split(enabled, &ctx.supported_suites);
    if suites.is_empty() {
        return Err(TlsError::NegotiationFailure(if enabled.is_empty() {
            "no cipher suites enabled".to_string()
        } else {
            format!("no usable cipher suite in [{}]", enabled.join(", "))
        }));
    }
    if !suites.dropped.is_empty() {
        tracing::debug!(dropped = ?suites.dropped, "enabled cipher suites not offered");
    }

    let (min, max) = version_bounds(ctx.protocol.max_version(), &suites);
    if let Some(min) = min {
        builder.set_min_proto_version(Some(min.to_openssl_version()))?;
    }
    if let Some(max) = max {
        builder.set_max_proto_version(Some(max.to_openssl_version()))?;
    }

    if !suites.cipher_list.is_empty() {
        builder
            .set_cipher_list(&suites.cipher_list.join(":"))
            .map_err(|e| negotiation_error(&suites.cipher_list, e))?;
    }
    builder
        .set_ciphersuites(&suites.ciphersuites.join(":"))
        .map_err(|e| negotiation_error(&suites.ciphersuites, e))?;

    Ok(())
}

fn negotiation_error(names: &[String], err: ErrorStack) -> TlsError {
    TlsError::NegotiationFailure(format!(
        "no usable cipher suite in [{}]: {}",
        names.join(", "),
        err
    ))
}

/// Run the client handshake over `stream`
pub(crate) fn connect(
    ctx: &TlsContext,
    host: &str,
    enabled: &[String],
    stream: TcpStream,
) -> Result<SslStream<TcpStream>, TlsError> {
    let mut builder = connector_builder(ctx).map_err(|e| TlsError::ContextInit(e.to_string()))?;
    apply_suites(&mut builder, ctx, enabled)?;

    let config = builder
        .build()
        .configure()?
        .verify_hostname(ctx.verify_peer);

    config.connect(host, stream).map_err(classify)
}

/// Sort a handshake failure into a [`TlsError`] kind
pub(crate) fn classify(err: HandshakeError<TcpStream>) -> TlsError {
    match err {
        HandshakeError::SetupFailure(stack) => TlsError::OpenSsl(stack),
        HandshakeError::Failure(mid) | HandshakeError::WouldBlock(mid) => {
            let err = mid.into_error();

            if let Some(stack) = err.ssl_error() {
                return if is_negotiation_failure(stack) {
                    TlsError::NegotiationFailure(stack.to_string())
                } else {
                    TlsError::HandshakeFailed(stack.to_string())
                };
            }

            match err.into_io_error() {
                Ok(io) => TlsError::Transport(io),
                Err(e) => TlsError::HandshakeFailed(e.to_string()),
            }
        }
    }
}

fn is_negotiation_failure(stack: &ErrorStack) -> bool {
    stack.errors().iter().any(|e| {
        e.reason()
            .map_or(false, |r| NEGOTIATION_REASONS.iter().any(|n| r.contains(n)))
    })
}
