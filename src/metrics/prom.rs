use lazy_static::lazy_static;
use prometheus::{labels, register_gauge, Gauge};

use ocspchecker::{Report, Verdict};

lazy_static! {
    static ref OCSPCHECKER_REVOCATION_STATUS: Gauge = register_gauge!(
        "ocspchecker_revocation_status",
        "certificate revocation status"
    )
    .unwrap();
}

/// Gauge value for a check result.
/// 0 = Not checked, 1 = Valid, 2 = Unknown, 3 = Revoked
pub fn revocation_value(verdict: Option<Verdict>) -> f64 {
    match verdict {
        None => 0.0,
        Some(Verdict::Valid) => 1.0,
        Some(Verdict::Unknown) => 2.0,
        Some(Verdict::Revoked) => 3.0,
    }
}

/// Function to push metrics to prometheus
/// # Arguments
/// * `report` - Result of the revocation check
/// * `prometheus_address` - Push gateway address
pub fn prometheus_metrics(report: &Report, prometheus_address: &str) {
    let verdict = report.verdict();
    OCSPCHECKER_REVOCATION_STATUS.set(revocation_value(verdict));

    let verdict_label = verdict
        .map(|v| v.to_string())
        .unwrap_or_else(|| "NotChecked".to_string());
    let metric_families = prometheus::gather();
    let prometheus_client = prometheus::push_metrics(
        "ocspchecker",
        labels! {
            "instance".to_owned() => "ocspchecker".to_owned(),
            "host".to_owned() => report.host.to_owned(),
            "port".to_owned() => report.port.to_string(),
            "verdict".to_owned() => verdict_label,
        },
        prometheus_address,
        metric_families,
        None,
    );

    if let Err(e) = prometheus_client {
        tracing::warn!(address = %prometheus_address, error = %e, "failed to push metrics to prometheus");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revocation_value() {
        assert_eq!(revocation_value(None), 0.0);
        assert_eq!(revocation_value(Some(Verdict::Valid)), 1.0);
        assert_eq!(revocation_value(Some(Verdict::Unknown)), 2.0);
        assert_eq!(revocation_value(Some(Verdict::Revoked)), 3.0);
    }
}
