//! # Scan Pipeline
//!
//! The per-host stage sequence, run once the host's fingerprint is known:
//!
//! 1. Port scan, unless the host sits behind a WAF/CDN (the exposed address
//!    is not the origin).
//! 2. Parameter discovery, reported verbatim.
//! 3. A fixed pacing pause, then the adaptive template scan.
//! 4. JS link extraction, then a secret scan over the links when there are
//!    any.
//!
//! A failing stage is logged and the next one runs anyway. [`ScanPipeline::run`]
//! has no error path: it always returns a (possibly empty) [`HostReport`].

use std::sync::Arc;
use std::time::Duration;

use crowscout_common::config::{Config, ScanPolicy, ToolTimeouts};
use crowscout_common::finding::Finding;
use crowscout_common::fingerprint::TargetFingerprint;
use crowscout_common::network::target::{bare_hostname, target_url};
use tracing::{error, info, warn};

use crate::classify;
use crate::error::ToolError;
use crate::events::{EventSink, ScanEvent, Stage, StageResult};
use crate::process::ProcessRunner;
use crate::tools::{javascript, parameters, port_scanner, templates};

/// Everything one pipeline produced for its host.
#[derive(Debug, Clone, Default)]
pub struct HostReport {
    pub host: String,
    pub url: String,
    pub is_waf: bool,
    /// Classified findings in stage order.
    pub findings: Vec<Finding>,
    pub parameters: Option<String>,
    pub js_links: Vec<String>,
    pub js_secrets: Option<String>,
    pub skipped: Vec<Stage>,
    pub failed: Vec<Stage>,
}

#[derive(Clone)]
pub struct ScanPipeline {
    runner: Arc<dyn ProcessRunner>,
    policy: Arc<ScanPolicy>,
    timeouts: ToolTimeouts,
    pacing: Duration,
    events: EventSink,
}

impl ScanPipeline {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        policy: Arc<ScanPolicy>,
        cfg: &Config,
        events: EventSink,
    ) -> Self {
        Self {
            runner,
            policy,
            timeouts: cfg.timeouts,
            pacing: cfg.pacing,
            events,
        }
    }

    pub async fn run(&self, fingerprint: &TargetFingerprint) -> HostReport {
        let url = target_url(fingerprint.url());
        let mut report = HostReport {
            host: bare_hostname(&url),
            url,
            is_waf: fingerprint.is_waf(),
            ..HostReport::default()
        };

        info!(host = %report.host, waf = report.is_waf, "Scanning {} (WAF: {})", report.host, report.is_waf);
        self.events.emit(ScanEvent::HostStarted {
            host: report.host.clone(),
            url: report.url.clone(),
            is_waf: report.is_waf,
        });

        self.port_scan(&mut report).await;
        self.discover_parameters(&mut report).await;

        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }

        self.template_scan(fingerprint, &mut report).await;
        self.javascript(&mut report).await;

        self.events.emit(ScanEvent::HostFinished {
            host: report.host.clone(),
            findings: report.findings.len(),
        });
        report
    }

    async fn port_scan(&self, report: &mut HostReport) {
        if report.is_waf {
            warn!(host = %report.host, "Skipping Nmap for {} (WAF/CDN detected)", report.host);
            report.skipped.push(Stage::PortScan);
            self.events.stage(
                &report.host,
                Stage::PortScan,
                StageResult::Skipped("WAF/CDN detected".to_string()),
            );
            return;
        }

        match port_scanner::scan(&*self.runner, &report.host, self.timeouts.port_scan).await {
            Ok(raw) => {
                let findings = classify::port_scan(&raw, &self.policy.critical_ports);
                self.record_findings(report, Stage::PortScan, findings);
            }
            Err(e) => self.record_failure(report, Stage::PortScan, e),
        }
    }

    async fn discover_parameters(&self, report: &mut HostReport) {
        match parameters::discover(&*self.runner, &report.url, self.timeouts.parameters).await {
            Ok(found) if !found.is_empty() => {
                self.events.stage(&report.host, Stage::Parameters, StageResult::Raw(found.clone()));
                report.parameters = Some(found);
            }
            Ok(_) => self.events.stage(&report.host, Stage::Parameters, StageResult::Nothing),
            Err(e) => self.record_failure(report, Stage::Parameters, e),
        }
    }

    async fn template_scan(&self, fingerprint: &TargetFingerprint, report: &mut HostReport) {
        let scanned = templates::scan(
            &*self.runner,
            &report.url,
            fingerprint.is_waf(),
            fingerprint.tech_stack(),
            self.timeouts.template_scan,
        )
        .await;

        match scanned {
            Ok(raw) => {
                let findings = classify::template_scan(&raw, &self.policy.nuclei_severities);
                self.record_findings(report, Stage::TemplateScan, findings);
            }
            Err(e) => self.record_failure(report, Stage::TemplateScan, e),
        }
    }

    async fn javascript(&self, report: &mut HostReport) {
        let links = match javascript::extract_links(&*self.runner, &report.url, self.timeouts.js_links).await {
            Ok(links) => links,
            Err(e) => {
                self.record_failure(report, Stage::JsLinks, e);
                return;
            }
        };

        self.events.stage(&report.host, Stage::JsLinks, StageResult::Links(links.len()));
        if links.is_empty() {
            return;
        }
        report.js_links = links;

        match javascript::scan_secrets(&*self.runner, &report.js_links, self.timeouts.js_secrets).await {
            Ok(secrets) if !secrets.trim().is_empty() => {
                self.events.stage(&report.host, Stage::JsSecrets, StageResult::Raw(secrets.clone()));
                report.js_secrets = Some(secrets);
            }
            Ok(_) => self.events.stage(&report.host, Stage::JsSecrets, StageResult::Nothing),
            Err(e) => self.record_failure(report, Stage::JsSecrets, e),
        }
    }

    fn record_findings(&self, report: &mut HostReport, stage: Stage, findings: Vec<Finding>) {
        let result = if findings.is_empty() {
            StageResult::Nothing
        } else {
            StageResult::Findings(findings.clone())
        };
        self.events.stage(&report.host, stage, result);
        report.findings.extend(findings);
    }

    fn record_failure(&self, report: &mut HostReport, stage: Stage, e: ToolError) {
        error!(host = %report.host, stage = %stage, "{stage} failed for {}: {e}", report.host);
        report.failed.push(stage);
        self.events.stage(&report.host, stage, StageResult::Failed(e.to_string()));
    }
}
