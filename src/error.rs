//! Error types for OCSP revocation checking.
//!
//! Every stage of the pipeline fails with an [`OCSPCheckError`]. None of them
//! are recovered locally: the binary reports the error and exits non-zero.

use thiserror::Error;

use crate::response::ResponderStatus;

/// Error type for revocation check failures.
#[derive(Debug, Error)]
pub enum OCSPCheckError {
    /// TCP dial or TLS handshake with the target failed
    #[error("Connection failed to: {address}. {reason}")]
    Connection {
        /// The address (host:port) that connection failed to
        address: String,
        /// Why the connection or handshake failed
        reason: String,
    },

    /// The handshake produced no usable certificate chain
    #[error("Certificate chain error: {reason}")]
    Chain {
        /// Description of what went wrong
        reason: String,
    },

    /// The OCSP request could not be built from the certificates
    #[error("Failed to build OCSP request: {reason}")]
    RequestConstruction {
        /// The underlying failure
        reason: String,
    },

    /// HTTP exchange with the responder failed
    #[error("OCSP transport to {url} failed: {reason}")]
    Transport {
        /// Responder URL that was queried
        url: String,
        /// Why the exchange failed
        reason: String,
    },

    /// The responder answered with a non-successful OCSP response status
    #[error("OCSP responder returned status '{status}'")]
    Responder {
        /// The status reported by the responder
        status: ResponderStatus,
    },

    /// The response signature or the signer's authority could not be verified
    #[error("OCSP response signature verification failed: {reason}")]
    SignatureVerification {
        /// The underlying verification failure
        reason: String,
    },

    /// The response carries no status for the certificate that was queried
    #[error("OCSP response does not cover certificate with serial {serial}")]
    ResponseMismatch {
        /// Serial number (hex) of the queried certificate
        serial: String,
    },

    /// Malformed bytes at a decode step
    #[error("Failed to parse {what}: {reason}")]
    Parse {
        /// Which structure was being decoded
        what: &'static str,
        /// The decoder's complaint
        reason: String,
    },

    /// The response is outside its validity window and stale responses are
    /// rejected
    #[error(
        "OCSP response is stale (this update {}, next update {})",
        .this_update,
        .next_update.as_deref().unwrap_or("absent")
    )]
    StaleResponse {
        /// The thisUpdate time carried by the response
        this_update: String,
        /// The nextUpdate time, if the response carries one
        next_update: Option<String>,
    },

    /// OpenSSL error occurred outside of a specific pipeline step
    #[error("OpenSSL error: {details}")]
    OpenSSL {
        /// The underlying OpenSSL error
        details: String,
    },
}

impl From<openssl::error::ErrorStack> for OCSPCheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSL {
            details: e.to_string(),
        }
    }
}
