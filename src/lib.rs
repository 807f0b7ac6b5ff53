//! OCSP revocation checking for TLS server certificates.
//!
//! A check connects to a host over TLS, captures the presented certificate
//! chain, asks the OCSP responder advertised by the leaf certificate about it
//! and validates the signed answer against the issuer.
//!
//! ```no_run
//! use ocspchecker::config::CheckConfig;
//! use ocspchecker::{Outcome, Verdict};
//!
//! let report = ocspchecker::check(&CheckConfig::new("example.com", 443))?;
//! match &report.outcome {
//!     Outcome::Checked(response) => println!("{}", Verdict::from(&response.status)),
//!     Outcome::Skipped(reason) => println!("skipped: {}", reason),
//! }
//! # Ok::<(), ocspchecker::OCSPCheckError>(())
//! ```

use openssl::nid::Nid;
use openssl::x509::{X509Ref, X509};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

pub mod checker;
pub mod client;
pub mod config;
pub mod error;
pub mod locator;
pub mod report;
pub mod request;
pub mod response;
pub mod session;

pub use checker::{check, Outcome, Report, RevocationChecker, SkipReason};
pub use error::OCSPCheckError;
pub use report::{OutputFormat, Verdict};
pub use response::{FreshnessPolicy, OcspResponse, ResponderStatus, RevocationStatus};

/// Summary of one certificate presented in the handshake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub common_name: String,
    pub serial: String,
    pub valid_from: String,
    pub valid_to: String,
    /// OCSP responder URLs from the Authority Information Access extension,
    /// in the order the certificate lists them.
    pub ocsp_urls: Vec<String>,
}

impl Certificate {
    pub fn from_x509(cert: &X509Ref) -> Result<Certificate, OCSPCheckError> {
        let common_name = cert
            .subject_name()
            .entries_by_nid(Nid::COMMONNAME)
            .next()
            .and_then(|entry| entry.data().to_string().ok())
            .unwrap_or_else(|| String::from("None"));

        let serial = cert
            .serial_number()
            .to_bn()
            .and_then(|bn| bn.to_hex_str().map(|hex| hex.to_string()))
            .map_err(|e| OCSPCheckError::Parse {
                what: "certificate serial number",
                reason: e.to_string(),
            })?;

        Ok(Certificate {
            common_name,
            serial,
            valid_from: cert.not_before().to_string(),
            valid_to: cert.not_after().to_string(),
            ocsp_urls: get_ocsp_urls(cert),
        })
    }
}

fn get_ocsp_urls(cert: &X509Ref) -> Vec<String> {
    // OpenSSL reports a missing AIA extension as an error with an empty stack.
    match cert.ocsp_responders() {
        Ok(urls) => urls.iter().map(|url| url.to_string()).collect(),
        Err(_) => Vec::new(),
    }
}

/// Certificate chain captured from a TLS handshake, leaf first.
#[derive(Debug, Clone)]
pub struct CertificateChain {
    certs: Vec<X509>,
}

impl CertificateChain {
    /// Wraps the certificates returned by the handshake.
    ///
    /// An empty chain has no leaf to check and is rejected with
    /// [`OCSPCheckError::Chain`].
    pub fn new(certs: Vec<X509>) -> Result<CertificateChain, OCSPCheckError> {
        if certs.is_empty() {
            return Err(OCSPCheckError::Chain {
                reason: "server presented no certificates".to_string(),
            });
        }
        Ok(CertificateChain { certs })
    }

    pub fn leaf(&self) -> &X509Ref {
        &self.certs[0]
    }

    /// The certificate that signed the leaf, if the server sent one.
    pub fn issuer(&self) -> Option<&X509Ref> {
        self.certs.get(1).map(Deref::deref)
    }

    pub fn len(&self) -> usize {
        self.certs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.certs.is_empty()
    }

    pub fn summaries(&self) -> Result<Vec<Certificate>, OCSPCheckError> {
        self.certs
            .iter()
            .map(|cert| Certificate::from_x509(cert))
            .collect()
    }
}
