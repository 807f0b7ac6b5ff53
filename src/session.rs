//! Captures the certificate chain a TLS server presents.

use openssl::ssl::{SslConnector, SslMethod, SslVerifyMode};
use openssl::x509::{X509Ref, X509};
use std::net::TcpStream;
use tracing::debug;

use crate::config::CheckConfig;
use crate::OCSPCheckError;

/// Source of the peer certificate chain for a target.
pub trait ChainSource {
    /// Returns the chain presented by the target, leaf first.
    fn fetch_chain(&self, config: &CheckConfig) -> Result<Vec<X509>, OCSPCheckError>;
}

/// Performs a real TLS handshake with OpenSSL.
///
/// The connection only lives for the duration of [`ChainSource::fetch_chain`]:
/// it is shut down once the chain is copied out, and dropped on every error
/// path, so nothing stays open while the responder is queried.
#[derive(Debug, Default, Clone, Copy)]
pub struct TlsSession;

impl ChainSource for TlsSession {
    fn fetch_chain(&self, config: &CheckConfig) -> Result<Vec<X509>, OCSPCheckError> {
        let address = format!("{}:{}", config.host, config.port);
        let connection_error = |reason: String| OCSPCheckError::Connection {
            address: address.clone(),
            reason,
        };

        let tcp_stream = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|e| connection_error(e.to_string()))?;
        debug!(address = %address, "TCP connection established");

        let mut builder = SslConnector::builder(SslMethod::tls())
            .map_err(|e| connection_error(e.to_string()))?;
        if config.skip_host_verify {
            builder.set_verify(SslVerifyMode::NONE);
        }
        let mut connect_config = builder
            .build()
            .configure()
            .map_err(|e| connection_error(e.to_string()))?;
        connect_config.set_verify_hostname(!config.skip_host_verify);

        let mut stream = connect_config
            .connect(&config.host, tcp_stream)
            .map_err(|e| connection_error(format!("TLS handshake failed: {}", e)))?;

        let chain: Vec<X509> = stream
            .ssl()
            .peer_cert_chain()
            .map(|certs| certs.iter().map(X509Ref::to_owned).collect())
            .unwrap_or_default();
        debug!(certificates = chain.len(), "captured peer certificate chain");

        if let Err(e) = stream.shutdown() {
            debug!(error = %e, "TLS shutdown was not clean");
        }

        Ok(chain)
    }
}
