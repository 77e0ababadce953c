//! # Finding Classifier
//!
//! Best-effort, line-based extraction of [`Finding`]s from raw tool reports.
//! Both functions are pure and never fail: lines that do not qualify are
//! dropped.

use std::collections::HashMap;

use crowscout_common::finding::{Finding, Severity};

pub const PORT_SCAN_SOURCE: &str = "Nmap";
pub const TEMPLATE_SCAN_SOURCE: &str = "Nuclei";

/// Reports open TCP ports that appear in `critical_ports`.
///
/// A line qualifies only when it carries both the `/tcp` marker and the
/// `open` state, e.g. `22/tcp open ssh`. Open ports missing from the mapping
/// are ignored.
pub fn port_scan(report: &str, critical_ports: &HashMap<String, String>) -> Vec<Finding> {
    report
        .lines()
        .filter(|line| line.contains("/tcp") && line.contains("open"))
        .filter_map(|line| {
            let port = line.split('/').next()?.trim();
            let desc = critical_ports.get(port)?;
            Finding::new(
                PORT_SCAN_SOURCE,
                format!("Critical Port Open: {port} - {desc}"),
                Severity::High,
            )
        })
        .collect()
}

/// Reports lines tagged with one of `severities` (e.g. `[critical]`).
///
/// Severities are tried in configured order and a line yields at most one
/// finding, labelled with the first tag that matched.
pub fn template_scan(report: &str, severities: &[String]) -> Vec<Finding> {
    report
        .lines()
        .filter_map(|line| {
            let severity = severities
                .iter()
                .find(|sev| line.contains(&format!("[{sev}]")))
                .and_then(|sev| Severity::from_tag(sev))?;
            Finding::new(TEMPLATE_SCAN_SOURCE, line.trim(), severity)
        })
        .collect()
}
