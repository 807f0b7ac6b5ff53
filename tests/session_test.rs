//! Chain capture against a local TLS server presenting the test PKI.

mod common;

use openssl::pkey::PKey;
use openssl::ssl::{SslAcceptor, SslMethod};
use std::io::Read;
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use common::{cert, fixture};
use ocspchecker::config::CheckConfig;
use ocspchecker::session::{ChainSource, TlsSession};
use ocspchecker::{Certificate, OCSPCheckError};

/// Accepts one TLS connection presenting leaf + CA, then waits for the client
/// to close it.
fn tls_server() -> (u16, JoinHandle<()>) {
    let mut acceptor = SslAcceptor::mozilla_intermediate_v5(SslMethod::tls()).unwrap();
    acceptor
        .set_private_key(&PKey::private_key_from_pem(&fixture("leaf_key.pem")).unwrap())
        .unwrap();
    acceptor.set_certificate(&cert("leaf.pem")).unwrap();
    acceptor.add_extra_chain_cert(cert("ca.pem")).unwrap();
    let acceptor = acceptor.build();

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (tcp, _) = listener.accept().unwrap();
        // A failed handshake is what some tests expect.
        if let Ok(mut stream) = acceptor.accept(tcp) {
            let mut buf = [0u8; 1];
            let _ = stream.read(&mut buf);
        }
    });

    (port, handle)
}

#[test]
fn test_captures_full_chain_leaf_first() {
    let (port, server) = tls_server();
    let config = CheckConfig {
        skip_host_verify: true,
        ..CheckConfig::new("127.0.0.1", port)
    };

    let chain = TlsSession.fetch_chain(&config).unwrap();
    // Returning means the session was closed, so the server sees EOF.
    server.join().unwrap();

    let names: Vec<String> = chain
        .iter()
        .map(|c| Certificate::from_x509(c).unwrap().common_name)
        .collect();
    assert_eq!(
        names,
        vec![
            "good.example.test".to_string(),
            "OCSP Checker Test CA".to_string()
        ]
    );
}

#[test]
fn test_untrusted_chain_fails_when_verifying() {
    let (port, server) = tls_server();

    let err = TlsSession
        .fetch_chain(&CheckConfig::new("127.0.0.1", port))
        .unwrap_err();
    server.join().unwrap();

    match err {
        OCSPCheckError::Connection { address, reason } => {
            assert_eq!(address, format!("127.0.0.1:{}", port));
            assert!(reason.contains("handshake"));
        }
        other => panic!("Expected Connection, got {:?}", other),
    }
}

#[test]
fn test_refused_connection() {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let err = TlsSession
        .fetch_chain(&CheckConfig::new("127.0.0.1", port))
        .unwrap_err();
    assert!(matches!(err, OCSPCheckError::Connection { .. }));
}
