//! Locates the OCSP responder advertised by a certificate.

use tracing::debug;

use crate::Certificate;

/// Returns the responder to query for `leaf`, or `None` when the certificate
/// advertises no OCSP URL.
///
/// Only the first advertised URL is used. Later URLs are never tried, even
/// when the first one fails.
pub fn locate_responder(leaf: &Certificate) -> Option<String> {
    let url = leaf.ocsp_urls.first().cloned();
    match &url {
        Some(url) => debug!(
            responder = %url,
            advertised = leaf.ocsp_urls.len(),
            "selected OCSP responder"
        ),
        None => debug!(subject = %leaf.common_name, "no OCSP responder advertised"),
    }
    url
}
