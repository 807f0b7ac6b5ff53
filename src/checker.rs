//! The revocation check pipeline.
//!
//! Chain capture, responder lookup, request, transport and validation run
//! once each, in that order. The first failure ends the check.

use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{debug, info};

use crate::client::{HttpResponderClient, ResponderTransport};
use crate::config::CheckConfig;
use crate::locator::locate_responder;
use crate::report::Verdict;
use crate::request::build_request;
use crate::response::{validate_response, OcspResponse};
use crate::session::{ChainSource, TlsSession};
use crate::{Certificate, CertificateChain, OCSPCheckError};

/// Why no OCSP request was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum SkipReason {
    #[strum(serialize = "leaf certificate advertises no OCSP responder")]
    NoResponderUrl,
    #[strum(serialize = "server sent no issuer certificate")]
    NoIssuer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Checked(OcspResponse),
    Skipped(SkipReason),
}

/// Result of one revocation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub host: String,
    pub port: u16,
    /// Presented chain, leaf first.
    pub chain: Vec<Certificate>,
    pub responder_url: Option<String>,
    pub outcome: Outcome,
}

impl Report {
    /// The verdict, or `None` if the check was skipped.
    pub fn verdict(&self) -> Option<Verdict> {
        match &self.outcome {
            Outcome::Checked(response) => Some(Verdict::from(&response.status)),
            Outcome::Skipped(_) => None,
        }
    }
}

/// Runs revocation checks with a given chain source and responder transport.
#[derive(Debug, Clone)]
pub struct RevocationChecker<S, T> {
    source: S,
    transport: T,
}

impl<S: ChainSource, T: ResponderTransport> RevocationChecker<S, T> {
    pub fn new(source: S, transport: T) -> Self {
        RevocationChecker { source, transport }
    }

    pub fn check(&self, config: &CheckConfig) -> Result<Report, OCSPCheckError> {
        // The TLS session is closed by the time fetch_chain returns.
        let chain = CertificateChain::new(self.source.fetch_chain(config)?)?;
        let summaries = chain.summaries()?;
        debug!(certificates = chain.len(), host = %config.host, "certificate chain received");

        let responder_url = locate_responder(&summaries[0]);
        let skipped = |reason: SkipReason, responder_url: Option<String>| {
            info!(host = %config.host, %reason, "revocation check skipped");
            Report {
                host: config.host.clone(),
                port: config.port,
                chain: summaries.clone(),
                responder_url,
                outcome: Outcome::Skipped(reason),
            }
        };

        let Some(url) = responder_url else {
            return Ok(skipped(SkipReason::NoResponderUrl, None));
        };
        let Some(issuer) = chain.issuer() else {
            return Ok(skipped(SkipReason::NoIssuer, Some(url)));
        };

        let query = build_request(chain.leaf(), issuer)?;
        let raw = self.transport.fetch(&url, &query)?;
        let response = validate_response(&raw, chain.leaf(), issuer, config.freshness)?;
        info!(
            host = %config.host,
            verdict = %Verdict::from(&response.status),
            "revocation status determined"
        );

        Ok(Report {
            host: config.host.clone(),
            port: config.port,
            chain: summaries,
            responder_url: Some(url),
            outcome: Outcome::Checked(response),
        })
    }
}

/// Checks `config.host` over a real TLS connection and HTTP responder client.
pub fn check(config: &CheckConfig) -> Result<Report, OCSPCheckError> {
    RevocationChecker::new(TlsSession, HttpResponderClient::new()?).check(config)
}
