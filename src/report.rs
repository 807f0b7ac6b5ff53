//! Console rendering of revocation check results.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::checker::{Outcome, Report};
use crate::response::RevocationStatus;

/// Final answer shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize, Deserialize)]
pub enum Verdict {
    Valid,
    Revoked,
    Unknown,
}

impl From<&RevocationStatus> for Verdict {
    fn from(status: &RevocationStatus) -> Self {
        match status {
            RevocationStatus::Valid => Verdict::Valid,
            RevocationStatus::Revoked { .. } => Verdict::Revoked,
            RevocationStatus::Unknown => Verdict::Unknown,
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one verdict line
    #[default]
    Text,
    /// The whole report as JSON
    Json,
    /// Table of the certificate chain followed by the verdict
    Summary,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a Report,
    verdict: Option<Verdict>,
}

/// Renders `report` in the requested format.
pub fn render(report: &Report, format: OutputFormat, verbose: bool) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report, verbose)),
        OutputFormat::Json => render_json(report),
        OutputFormat::Summary => Ok(render_summary(report)),
    }
}

pub fn render_text(report: &Report, verbose: bool) -> String {
    let mut lines = Vec::new();

    if verbose {
        lines.push("Got these certs:".to_string());
        for cert in &report.chain {
            lines.push(format!("Cert Subject: {}", cert.common_name));
            lines.push(format!("\tNot Before: {}", cert.valid_from));
            lines.push(format!("\tNot After: {}", cert.valid_to));
        }
        match &report.responder_url {
            Some(url) => lines.push(format!("Using: '{}' for OCSP URL", url)),
            None => lines.push("No OCSP URL found in the leaf certificate".to_string()),
        }
        if let Outcome::Checked(response) = &report.outcome {
            lines.push(format!("Response this update: {}", response.this_update));
            if let Some(next_update) = &response.next_update {
                lines.push(format!("Response next update: {}", next_update));
            }
            if response.stale {
                lines.push("Warning: response is past its next update".to_string());
            }
            if let RevocationStatus::Revoked { revoked_at, reason } = &response.status {
                lines.push(format!("Revoked at: {} ({})", revoked_at, reason));
            }
        }
    }

    lines.push(verdict_line(report));
    lines.join("\n")
}

pub fn render_json(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&JsonReport {
        report,
        verdict: report.verdict(),
    })
}

pub fn render_summary(report: &Report) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Subject", "Not Before", "Not After", "OCSP URLs"]);

    for (i, cert) in report.chain.iter().enumerate() {
        table.add_row(vec![
            i.to_string(),
            cert.common_name.clone(),
            cert.valid_from.clone(),
            cert.valid_to.clone(),
            cert.ocsp_urls.join("\n"),
        ]);
    }

    let responder = report.responder_url.as_deref().unwrap_or("none");
    format!(
        "{}:{}\n{}\nResponder: {}\n{}",
        report.host,
        report.port,
        table,
        responder,
        verdict_line(report)
    )
}

fn verdict_line(report: &Report) -> String {
    match &report.outcome {
        Outcome::Checked(response) => {
            format!("Certificate is: {}", Verdict::from(&response.status))
        }
        Outcome::Skipped(reason) => format!("Revocation check skipped: {}", reason),
    }
}
