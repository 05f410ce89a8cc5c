//! Report formatting for human and JSON output.

use crate::scenarios::Report;

/// Output mode selected by flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Aligned, human-readable text
    Human,
    /// One JSON object per report
    Json,
}

/// Render one report.
pub fn format_report(report: &Report, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => serde_json::to_string(report)
            .unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {}\"}}", e)),
        OutputMode::Human => {
            let outcome = match (&report.error_code, &report.error) {
                (Some(code), Some(message)) => format!("FAILED ({}): {}", code, message),
                _ => "OK".to_string(),
            };
            let visible = if report.visible.is_empty() {
                "(none)".to_string()
            } else {
                report.visible.join(", ")
            };
            format!(
                "{} - {}\n  outcome:   {}\n  visible:   {}\n  physical:  {} commit(s), {} rollback(s)",
                report.name,
                report.description,
                outcome,
                visible,
                report.physical_commits,
                report.physical_rollbacks
            )
        }
    }
}
