//! Builds the OCSP request for a (subject, issuer) pair.

use openssl::error::ErrorStack;
use openssl::hash::MessageDigest;
use openssl::ocsp::{OcspCertId, OcspRequest};
use openssl::x509::X509Ref;

use crate::OCSPCheckError;

/// DER-encoded OCSP request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcspQuery {
    der: Vec<u8>,
}

impl OcspQuery {
    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

/// CertID for `subject` as issued by `issuer`.
///
/// SHA-1 is what responders are required to understand (RFC 5019), and the
/// validator looks responses up with the same digest.
pub(crate) fn cert_id(subject: &X509Ref, issuer: &X509Ref) -> Result<OcspCertId, ErrorStack> {
    OcspCertId::from_cert(MessageDigest::sha1(), subject, issuer)
}

/// Builds an unsigned request for a single certificate, without a nonce or
/// any other extension.
pub fn build_request(subject: &X509Ref, issuer: &X509Ref) -> Result<OcspQuery, OCSPCheckError> {
    let id = cert_id(subject, issuer).map_err(|e| OCSPCheckError::RequestConstruction {
        reason: format!("cannot derive certificate ID: {}", e),
    })?;

    let mut request = OcspRequest::new().map_err(construction_error)?;
    request.add_id(id).map_err(construction_error)?;
    let der = request.to_der().map_err(construction_error)?;

    Ok(OcspQuery { der })
}

fn construction_error(e: ErrorStack) -> OCSPCheckError {
    OCSPCheckError::RequestConstruction {
        reason: e.to_string(),
    }
}
