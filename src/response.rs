//! Validation of OCSP responses.
//!
//! A raw responder answer only becomes an [`OcspResponse`] after the
//! envelope status, the signature, the signer's authority and the CertID all
//! check out. Anything else is an error, never a status.

use openssl::ocsp::{
    OcspCertStatus, OcspFlag, OcspResponse as RawOcspResponse, OcspResponseStatus,
    OcspRevokedStatus,
};
use openssl::error::ErrorStack;
use openssl::stack::Stack;
use openssl::x509::store::{X509Store, X509StoreBuilder};
use openssl::x509::verify::X509VerifyFlags;
use openssl::x509::{X509Ref, X509};
use std::ffi::c_int;
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, warn};

use crate::request::cert_id;
use crate::OCSPCheckError;

/// Clock skew tolerated on thisUpdate/nextUpdate, in seconds.
const MAX_CLOCK_SKEW: u32 = 300;

// CRLReason values with no named constant in the openssl crate.
const PRIVILEGE_WITHDRAWN: c_int = 9;
const AA_COMPROMISE: c_int = 10;

/// Non-successful OCSP response statuses (RFC 6960 section 4.2.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ResponderStatus {
    #[strum(serialize = "malformedRequest")]
    MalformedRequest,
    #[strum(serialize = "internalError")]
    InternalError,
    #[strum(serialize = "tryLater")]
    TryLater,
    #[strum(serialize = "sigRequired")]
    SigRequired,
    #[strum(serialize = "unauthorized")]
    Unauthorized,
}

/// Revocation status of the queried certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevocationStatus {
    Valid,
    Revoked {
        revoked_at: String,
        reason: String,
    },
    Unknown,
}

/// What to do with a response whose validity window has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreshnessPolicy {
    /// Accept it and only surface the status.
    #[default]
    Lenient,
    /// Fail with [`OCSPCheckError::StaleResponse`].
    Strict,
}

/// A validated OCSP answer for one certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcspResponse {
    pub status: RevocationStatus,
    pub this_update: String,
    /// Absent when the responder does not say when newer information will
    /// be available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_update: Option<String>,
    /// Set when the response was outside its validity window and the
    /// lenient policy accepted it anyway.
    pub stale: bool,
}

impl TryFrom<OcspResponseStatus> for ResponderStatus {
    type Error = OCSPCheckError;

    fn try_from(status: OcspResponseStatus) -> Result<Self, Self::Error> {
        match status {
            OcspResponseStatus::MALFORMED_REQUEST => Ok(ResponderStatus::MalformedRequest),
            OcspResponseStatus::INTERNAL_ERROR => Ok(ResponderStatus::InternalError),
            OcspResponseStatus::TRY_LATER => Ok(ResponderStatus::TryLater),
            OcspResponseStatus::SIG_REQUIRED => Ok(ResponderStatus::SigRequired),
            OcspResponseStatus::UNAUTHORIZED => Ok(ResponderStatus::Unauthorized),
            other => Err(OCSPCheckError::Parse {
                what: "OCSP response status",
                reason: format!("unrecognized status {}", other.as_raw()),
            }),
        }
    }
}

/// Validates `raw` as the responder's answer about `subject`, issued by
/// `issuer`.
///
/// The response must be signed either by `issuer` itself or by a delegated
/// responder whose certificate is embedded in the response, was issued by
/// `issuer` and carries the OCSP-signing extended key usage.
pub fn validate_response(
    raw: &[u8],
    subject: &X509Ref,
    issuer: &X509Ref,
    freshness: FreshnessPolicy,
) -> Result<OcspResponse, OCSPCheckError> {
    let response = RawOcspResponse::from_der(raw).map_err(|e| OCSPCheckError::Parse {
        what: "OCSP response",
        reason: e.to_string(),
    })?;

    let response_status = response.status();
    if response_status != OcspResponseStatus::SUCCESSFUL {
        return Err(OCSPCheckError::Responder {
            status: ResponderStatus::try_from(response_status)?,
        });
    }

    let basic = response.basic().map_err(|e| OCSPCheckError::Parse {
        what: "OCSP basic response",
        reason: e.to_string(),
    })?;

    let (trusted, store) = trust_issuer(issuer).map_err(trust_setup_error)?;

    basic
        .verify(&trusted, &store, OcspFlag::TRUST_OTHER)
        .map_err(|e| OCSPCheckError::SignatureVerification {
            reason: e.to_string(),
        })?;
    debug!("OCSP response signature verified");

    let id = cert_id(subject, issuer).map_err(lookup_id_error)?;
    let single = basic.find_status(&id).ok_or_else(|| {
        let serial = subject
            .serial_number()
            .to_bn()
            .and_then(|bn| bn.to_hex_str().map(|hex| hex.to_string()))
            .unwrap_or_else(|_| String::from("<unreadable>"));
        OCSPCheckError::ResponseMismatch { serial }
    })?;

    let status = match single.status {
        OcspCertStatus::GOOD => RevocationStatus::Valid,
        OcspCertStatus::REVOKED => {
            let revoked_at = single.revocation_time.ok_or_else(|| OCSPCheckError::Parse {
                what: "OCSP single response",
                reason: "revoked status without a revocation time".to_string(),
            })?;
            RevocationStatus::Revoked {
                revoked_at: revoked_at.to_string(),
                reason: revocation_reason(single.reason).to_string(),
            }
        }
        OcspCertStatus::UNKNOWN => RevocationStatus::Unknown,
        other => {
            return Err(OCSPCheckError::Parse {
                what: "OCSP certificate status",
                reason: format!("unrecognized status {}", other.as_raw()),
            })
        }
    };

    let this_update = single.this_update.to_string();
    let next_update = single.next_update().map(|t| t.to_string());

    let stale = match single.check_validity(MAX_CLOCK_SKEW, None) {
        Ok(()) => false,
        Err(e) => match freshness {
            FreshnessPolicy::Strict => {
                return Err(OCSPCheckError::StaleResponse {
                    this_update,
                    next_update,
                });
            }
            FreshnessPolicy::Lenient => {
                warn!(
                    this_update = %this_update,
                    next_update = next_update.as_deref().unwrap_or("absent"),
                    error = %e,
                    "accepting OCSP response outside its validity window"
                );
                true
            }
        },
    };

    Ok(OcspResponse {
        status,
        this_update,
        next_update,
        stale,
    })
}

/// The issuer is both a directly trusted signer and the anchor a delegated
/// responder certificate has to chain to. It is usually an intermediate,
/// hence the partial chain flag.
fn trust_issuer(issuer: &X509Ref) -> Result<(Stack<X509>, X509Store), ErrorStack> {
    let mut trusted = Stack::new()?;
    trusted.push(issuer.to_owned())?;
    let mut store = X509StoreBuilder::new()?;
    store.add_cert(issuer.to_owned())?;
    store.set_flags(X509VerifyFlags::PARTIAL_CHAIN)?;
    Ok((trusted, store.build()))
}

fn trust_setup_error(e: ErrorStack) -> OCSPCheckError {
    OCSPCheckError::SignatureVerification {
        reason: format!("cannot set up issuer trust: {}", e),
    }
}

fn lookup_id_error(e: ErrorStack) -> OCSPCheckError {
    OCSPCheckError::Parse {
        what: "certificate ID for response lookup",
        reason: e.to_string(),
    }
}

fn revocation_reason(reason: OcspRevokedStatus) -> &'static str {
    match reason {
        OcspRevokedStatus::UNSPECIFIED => "unspecified",
        OcspRevokedStatus::KEY_COMPROMISE => "keyCompromise",
        OcspRevokedStatus::CA_COMPROMISE => "cACompromise",
        OcspRevokedStatus::AFFILIATION_CHANGED => "affiliationChanged",
        OcspRevokedStatus::STATUS_SUPERSEDED => "superseded",
        OcspRevokedStatus::STATUS_CESSATION_OF_OPERATION => "cessationOfOperation",
        OcspRevokedStatus::STATUS_CERTIFICATE_HOLD => "certificateHold",
        OcspRevokedStatus::REMOVE_FROM_CRL => "removeFromCRL",
        OcspRevokedStatus::NO_STATUS => "no reason given",
        other => match other.as_raw() {
            PRIVILEGE_WITHDRAWN => "privilegeWithdrawn",
            AA_COMPROMISE => "aACompromise",
            _ => "unrecognized reason",
        },
    }
}
