use colored::*;
use crowscout_common::finding::{Finding, Severity};
use crowscout_core::events::{Stage, StageResult};

use crate::terminal::colors;

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => colors::SEVERITY_INFO,
        Severity::Low => colors::SEVERITY_LOW,
        Severity::Medium => colors::SEVERITY_MEDIUM,
        Severity::High => colors::SEVERITY_HIGH,
        Severity::Critical => colors::SEVERITY_CRITICAL,
    }
}

pub fn severity_badge(severity: Severity) -> ColoredString {
    format!("[{severity}]").color(severity_color(severity)).bold()
}

pub fn finding_line(finding: &Finding) -> String {
    format!(
        "{} {}",
        severity_badge(finding.severity()),
        finding.description().color(colors::TEXT_DEFAULT)
    )
}

/// Title and body lines describing how `stage` ended for `host`.
///
/// Skips and failures return nothing: they are already logged where they
/// happen.
pub fn stage_lines(host: &str, stage: Stage, result: &StageResult) -> Option<(String, Vec<String>)> {
    let alert = |title: String| format!("{} {}", "[!]".red().bold(), title.bold());
    let quiet = |title: String| format!("{} {}", "[-]".color(colors::SEPARATOR), title.color(colors::SEPARATOR));

    match (stage, result) {
        (_, StageResult::Skipped(_)) | (_, StageResult::Failed(_)) => None,
        (_, StageResult::Findings(findings)) => Some((
            alert(format!("{} FINDINGS FOR {host}:", stage.label().to_uppercase())),
            findings.iter().map(finding_line).collect(),
        )),
        (Stage::Parameters, StageResult::Raw(text)) => Some((
            alert(format!("ARJUN FOUND HIDDEN PARAMETERS FOR {host}:")),
            text.lines().map(str::to_string).collect(),
        )),
        (_, StageResult::Raw(text)) => Some((
            alert(format!("JS SECRETS FOUND FOR {host}:")),
            text.lines().filter(|l| !l.trim().is_empty()).map(str::to_string).collect(),
        )),
        (_, StageResult::Links(0)) => Some((quiet(format!("No JavaScript files found for {host}")), Vec::new())),
        (_, StageResult::Links(count)) => Some((
            format!("{} Found {count} JavaScript files on {host}", "[JS]".color(colors::ACCENT)),
            Vec::new(),
        )),
        (Stage::PortScan, StageResult::Nothing) => {
            Some((quiet(format!("No critical ports open on {host}")), Vec::new()))
        }
        (Stage::Parameters, StageResult::Nothing) => {
            Some((quiet(format!("No hidden parameters found for {host}")), Vec::new()))
        }
        (Stage::TemplateScan, StageResult::Nothing) => Some((
            quiet(format!("No critical vulnerabilities found by Nuclei for {host}")),
            Vec::new(),
        )),
        (_, StageResult::Nothing) => Some((
            quiet(format!("No exposed secrets found in JS files for {host}")),
            Vec::new(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_and_skips_print_nothing() {
        assert!(stage_lines("a", Stage::PortScan, &StageResult::Skipped("WAF".into())).is_none());
        assert!(stage_lines("a", Stage::JsLinks, &StageResult::Failed("boom".into())).is_none());
    }

    #[test]
    fn findings_get_one_line_each() {
        let findings = vec![
            Finding::new("Nmap", "Critical Port Open: 22 - SSH", Severity::High).unwrap(),
            Finding::new("Nmap", "Critical Port Open: 3306 - MySQL", Severity::High).unwrap(),
        ];
        let (title, body) = stage_lines("a.example.com", Stage::PortScan, &StageResult::Findings(findings)).unwrap();
        assert!(title.contains("NMAP FINDINGS FOR a.example.com"));
        assert_eq!(body.len(), 2);
        assert!(body[0].contains("22 - SSH"));
    }

    #[test]
    fn parameters_are_printed_verbatim() {
        let (title, body) =
            stage_lines("a", Stage::Parameters, &StageResult::Raw("id\ndebug".into())).unwrap();
        assert!(title.contains("HIDDEN PARAMETERS"));
        assert_eq!(body, vec!["id", "debug"]);
    }
}
