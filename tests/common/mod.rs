//! Shared test server
//!
//! A one-shot OpenSSL server on 127.0.0.1 with a freshly generated
//! self-signed RSA certificate for "localhost" and 127.0.0.1. It answers one
//! HTTP request with `200 OK` and reports the suite it negotiated.

#![allow(dead_code)]

use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::ssl::{Ssl, SslContextBuilder, SslMethod, SslVersion};
use openssl::x509::extension::SubjectAlternativeName;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use cipherpref::tls::{TlsContext, TlsSocket};

/// Generate a self-signed certificate for localhost
pub fn self_signed() -> (X509, PKey<Private>) {
    let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_nid(Nid::COMMONNAME, "localhost").unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&key).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(7).unwrap()).unwrap();

    let san = SubjectAlternativeName::new()
        .dns("localhost")
        .ip("127.0.0.1")
        .build(&builder.x509v3_context(None, None))
        .unwrap();
    builder.append_extension(san).unwrap();
    builder.sign(&key, MessageDigest::sha256()).unwrap();

    (builder.build(), key)
}

/// Server accepting one TLS connection
pub struct TestServer {
    pub port: u16,
    pub cert: X509,
    handle: JoinHandle<Option<String>>,
}

impl TestServer {
    /// Start a server offering `cipher_list`, up to `max` if set
    pub fn start(cipher_list: &str, max: Option<SslVersion>) -> TestServer {
        let (cert, key) = self_signed();

        let mut builder = SslContextBuilder::new(SslMethod::tls_server()).unwrap();
        builder.set_certificate(&cert).unwrap();
        builder.set_private_key(&key).unwrap();
        builder.set_cipher_list(cipher_list).unwrap();
        if max.is_some() {
            builder.set_max_proto_version(max).unwrap();
        }
        let ctx = builder.build();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = thread::spawn(move || {
            let (tcp_stream, _) = listener.accept().unwrap();
            let ssl = Ssl::new(&ctx).unwrap();
            let mut stream = ssl.accept(tcp_stream).ok()?;

            let cipher = stream
                .ssl()
                .current_cipher()
                .and_then(|c| c.standard_name())
                .map(str::to_string);

            let mut buf = [0u8; 1024];
            let _ = stream.read(&mut buf);
            let _ = stream.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            let _ = stream.shutdown();

            cipher
        });

        TestServer { port, cert, handle }
    }

    /// Server with OpenSSL's full cipher list
    pub fn permissive() -> TestServer {
        TestServer::start("ALL", None)
    }

    /// Context trusting this server's certificate
    pub fn trusting_context(&self, protocol: &str) -> TlsContext {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ca.pem");
        std::fs::write(&path, self.cert.to_pem().unwrap()).unwrap();

        TlsContext::builder(protocol)
            .unwrap()
            .ca_file(&path)
            .build()
            .unwrap()
    }

    /// Wait for the server; the suite it negotiated, if the handshake worked
    pub fn finish(self) -> Option<String> {
        self.handle.join().unwrap()
    }
}

/// Send a request over `socket` and return the status line
pub fn http_get<S: TlsSocket>(socket: &mut S) -> String {
    socket
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .unwrap();

    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = socket.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        response.extend_from_slice(&buf[..n]);
        if response.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }

    String::from_utf8_lossy(&response)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string()
}
