#![cfg(test)]
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crowscout_common::config::{Config, ScanPolicy, ToolTimeouts};
use crowscout_common::finding::Severity;
use crowscout_core::events::{EventSink, ScanEvent, Stage, StageResult};
use crowscout_core::fleet::{FleetOrchestrator, FleetOutcome, FleetState};
use crowscout_core::process::ToolOutput;
use crowscout_core::testing::ScriptedRunner;
use tokio::sync::mpsc;

const PROBES: &str = concat!(
    r#"{"url":"https://shop.example.com","tech":["Cloudflare","WordPress","PHP"]}"#,
    "\n",
    r#"{"url":"https://api.example.com:8443","tech":["Nginx","PostgreSQL"]}"#,
    "\n",
    "not json at all\n",
);

fn test_config() -> Config {
    Config {
        pacing: Duration::ZERO,
        timeouts: ToolTimeouts::uniform(Duration::from_secs(1)),
        ..Config::default()
    }
}

fn policy() -> Arc<ScanPolicy> {
    Arc::new(ScanPolicy {
        critical_ports: HashMap::from([
            ("22".to_string(), "SSH".to_string()),
            ("5432".to_string(), "PostgreSQL".to_string()),
        ]),
        nuclei_severities: vec!["critical".to_string(), "high".to_string()],
    })
}

fn scripted() -> ScriptedRunner {
    ScriptedRunner::new()
        .on("subfinder", ToolOutput::success("shop.example.com\napi.example.com\nshop.example.com\n"))
        .on("httpx", ToolOutput::failed(Some(1), PROBES))
        .on("nmap", ToolOutput::success("PORT     STATE SERVICE\n22/tcp   open  ssh\n443/tcp  open  https\n5432/tcp open  postgresql\n"))
        .on("arjun", ToolOutput::success("[+] Parameters found: id, debug\n"))
        .on_args("nuclei", "https://api.example.com:8443", ToolOutput::success(
            "[CVE-2023-1234] [http] [critical] https://api.example.com:8443/ [high]\n[tech-detect] [http] [info] https://api.example.com:8443/\n",
        ))
        .on("subjs", ToolOutput::success("https://shop.example.com/main.js\n"))
        .on_args("nuclei", "exposure,token,key", ToolOutput::success("[google-api-key] [info] https://shop.example.com/main.js\n"))
}

#[tokio::test]
async fn full_run_adapts_each_host() {
    let runner = Arc::new(scripted());
    let fleet = FleetOrchestrator::new(runner.clone(), policy(), &test_config(), EventSink::disabled());

    let summary = fleet.run("example.com").await;

    assert_eq!(summary.outcome, FleetOutcome::Completed);
    assert_eq!(summary.candidates, vec!["shop.example.com", "api.example.com"]);
    assert_eq!(summary.alive, 2);
    assert_eq!(summary.reports.len(), 2);

    // Only the non-WAF host reaches the port scanner, by bare hostname.
    let nmap = runner.calls_to("nmap");
    assert_eq!(nmap.len(), 1);
    assert_eq!(nmap[0].args, vec!["-T4", "-F", "api.example.com"]);

    let shop = summary.reports.iter().find(|r| r.host == "shop.example.com").unwrap();
    assert!(shop.is_waf);
    assert_eq!(shop.skipped, vec![Stage::PortScan]);

    let api = summary.reports.iter().find(|r| r.host == "api.example.com").unwrap();
    assert!(!api.is_waf);
    let severities: Vec<Severity> = api.findings.iter().map(|f| f.severity()).collect();
    assert_eq!(severities, vec![Severity::High, Severity::High, Severity::Critical]);
    assert_eq!(api.parameters.as_deref(), Some("[+] Parameters found: id, debug"));
    assert!(api.js_secrets.as_deref().unwrap_or_default().contains("google-api-key"));
}

#[tokio::test]
async fn waf_and_plain_hosts_get_different_template_plans() {
    let runner = Arc::new(scripted());
    let fleet = FleetOrchestrator::new(runner.clone(), policy(), &test_config(), EventSink::disabled());
    fleet.run("example.com").await;

    let template_calls: Vec<_> = runner
        .calls_to("nuclei")
        .into_iter()
        .filter(|inv| inv.value_of("-u").is_some())
        .collect();
    assert_eq!(template_calls.len(), 2);

    for inv in template_calls {
        match inv.value_of("-u") {
            Some("https://shop.example.com") => {
                assert_eq!(inv.value_of("-tags"), Some("cve,misconfig,exposure"));
                assert_eq!(inv.value_of("-rl"), Some("10"));
            }
            Some("https://api.example.com:8443") => {
                assert_eq!(inv.value_of("-tags"), Some("sqli,cve,misconfig,exposure"));
                assert_eq!(inv.value_of("-rl"), Some("50"));
            }
            other => panic!("unexpected template target {other:?}"),
        }
    }
}

#[tokio::test]
async fn events_follow_phase_and_stage_order() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = Arc::new(scripted());
    let fleet = FleetOrchestrator::new(runner, policy(), &test_config(), EventSink::new(tx));

    fleet.run("example.com").await;
    drop(fleet);

    let mut phases = Vec::new();
    let mut api_stages = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::Phase(state) => phases.push(state),
            ScanEvent::Stage { host, stage, result } if host == "api.example.com" => {
                if !matches!(result, StageResult::Failed(_)) {
                    api_stages.push(stage);
                }
            }
            _ => {}
        }
    }

    assert_eq!(
        phases,
        vec![FleetState::Enumerating, FleetState::Probing, FleetState::Scanning, FleetState::Done]
    );
    assert_eq!(
        api_stages,
        vec![Stage::PortScan, Stage::Parameters, Stage::TemplateScan, Stage::JsLinks, Stage::JsSecrets]
    );
}

#[tokio::test]
async fn broken_toolchain_still_completes() {
    let runner = Arc::new(
        ScriptedRunner::new()
            .missing("subfinder")
            .missing("httpx")
            .missing("nmap")
            .missing("arjun")
            .missing("nuclei")
            .missing("subjs"),
    );
    let fleet = FleetOrchestrator::new(runner.clone(), policy(), &test_config(), EventSink::disabled());

    let summary = fleet.run("example.com").await;

    assert_eq!(summary.outcome, FleetOutcome::Completed);
    assert_eq!(summary.candidates, vec!["example.com"]);
    let report = &summary.reports[0];
    assert!(report.findings.is_empty());
    assert_eq!(
        report.failed,
        vec![Stage::PortScan, Stage::Parameters, Stage::TemplateScan, Stage::JsLinks]
    );
    // No links were extracted, so the secret scanner never ran.
    assert_eq!(runner.calls_to("nuclei").len(), 1);
}

#[tokio::test]
async fn slow_tools_respect_the_admission_gate() {
    let probes: String = (0..12)
        .map(|i| format!("{{\"url\":\"https://h{i}.example.com\",\"tech\":[\"Nginx\"]}}\n"))
        .collect();
    let runner = Arc::new(
        ScriptedRunner::new()
            .on("subfinder", ToolOutput::success("h.example.com\n"))
            .on("httpx", ToolOutput::success(probes))
            .with_delay(Duration::from_millis(15)),
    );
    let cfg = Config {
        concurrency: 4,
        ..test_config()
    };
    let fleet = FleetOrchestrator::new(runner.clone(), policy(), &cfg, EventSink::disabled());

    let summary = fleet.run("example.com").await;

    assert_eq!(summary.reports.len(), 12);
    assert!(runner.peak() <= 4, "peak was {}", runner.peak());
    assert!(runner.peak() > 1, "pipelines never overlapped");
}

#[test]
fn shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/config.json");
    let policy = ScanPolicy::load(&path).unwrap();
    assert_eq!(policy.critical_ports.get("22").map(String::as_str), Some("SSH"));
    assert!(policy.nuclei_severities.contains(&"critical".to_string()));
}
