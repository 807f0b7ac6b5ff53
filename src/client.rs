//! HTTP transport to the OCSP responder.
//!
//! Requests go out as GET using the encoding from RFC 6960 Appendix A.1:
//! `{url}/{url-encoding of base-64 encoding of the DER request}`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info};
use url::{form_urlencoded, Url};

use crate::request::OcspQuery;
use crate::OCSPCheckError;

const OCSP_RESPONSE_MEDIA_TYPE: &str = "application/ocsp-response";

/// Sends an OCSP request to a responder and returns the raw response body.
pub trait ResponderTransport {
    fn fetch(&self, responder_url: &str, query: &OcspQuery) -> Result<Vec<u8>, OCSPCheckError>;
}

/// Builds the GET URL for `der` against the responder base URL.
pub fn get_url(responder_url: &str, der: &[u8]) -> Result<Url, OCSPCheckError> {
    let mut base = Url::parse(responder_url).map_err(|e| OCSPCheckError::Transport {
        url: responder_url.to_string(),
        reason: format!("invalid responder URL: {}", e),
    })?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let encoded: String = form_urlencoded::byte_serialize(STANDARD.encode(der).as_bytes()).collect();
    base.join(&encoded).map_err(|e| OCSPCheckError::Transport {
        url: responder_url.to_string(),
        reason: format!("cannot append request to responder URL: {}", e),
    })
}

/// Blocking HTTP client for OCSP responders.
///
/// One attempt per request, with reqwest's default timeout.
#[derive(Debug, Clone)]
pub struct HttpResponderClient {
    http: reqwest::blocking::Client,
}

impl HttpResponderClient {
    pub fn new() -> Result<Self, OCSPCheckError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("ocspchecker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OCSPCheckError::Transport {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self::from_client(http))
    }

    /// Uses an already configured reqwest client.
    pub fn from_client(http: reqwest::blocking::Client) -> Self {
        Self { http }
    }
}

impl ResponderTransport for HttpResponderClient {
    fn fetch(&self, responder_url: &str, query: &OcspQuery) -> Result<Vec<u8>, OCSPCheckError> {
        let url = get_url(responder_url, query.as_der())?;
        info!(responder = %responder_url, "querying OCSP responder");
        debug!(url = %url, "OCSP GET");

        let transport_error = |reason: String| OCSPCheckError::Transport {
            url: responder_url.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, OCSP_RESPONSE_MEDIA_TYPE)
            .send()
            .map_err(|e| transport_error(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| transport_error(format!("failed to read response body: {}", e)))?;
        debug!(bytes = body.len(), "received OCSP response");

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_url_appends_separator() {
        let url = get_url("http://ocsp.example.test", &[0x30, 0x03, 0x02, 0x01, 0x01]).unwrap();
        assert_eq!(url.as_str(), "http://ocsp.example.test/MAMCAQE%3D");
    }

    #[test]
    fn test_get_url_keeps_base_path() {
        let url = get_url("http://ocsp.example.test/ocsp", &[0x30, 0x00]).unwrap();
        assert_eq!(url.as_str(), "http://ocsp.example.test/ocsp/MAA%3D");

        let url = get_url("http://ocsp.example.test/ocsp/", &[0x30, 0x00]).unwrap();
        assert_eq!(url.as_str(), "http://ocsp.example.test/ocsp/MAA%3D");
    }

    #[test]
    fn test_get_url_escapes_base64_alphabet() {
        // base64 "+/+/"
        let url = get_url("http://ocsp.example.test/", &[0xfb, 0xff, 0xbf]).unwrap();
        assert_eq!(url.as_str(), "http://ocsp.example.test/%2B%2F%2B%2F");
    }

    #[test]
    fn test_get_url_rejects_invalid_base() {
        let err = get_url("not a url", &[0x30, 0x00]).unwrap_err();
        assert!(matches!(err, OCSPCheckError::Transport { .. }));
    }
}
