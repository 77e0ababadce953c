//! # Fleet Orchestrator
//!
//! Drives a whole run through `Enumerating → Probing → Scanning → Done`.
//!
//! Both discovery phases degrade instead of failing: a broken enumerator
//! leaves the literal target as the only candidate, and a broken prober marks
//! every candidate alive with an empty, non-WAF fingerprint. Scanning fans out
//! one [`ScanPipeline`] per alive host behind a counting gate and waits for
//! all of them; there is no fleet-wide deadline.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crowscout_common::config::{Config, ScanPolicy, ToolTimeouts};
use crowscout_common::finding::Severity;
use crowscout_common::fingerprint::TargetFingerprint;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::events::{EventSink, ScanEvent};
use crate::pipeline::{HostReport, ScanPipeline};
use crate::process::ProcessRunner;
use crate::tools::{enumerator, prober};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetState {
    Enumerating,
    Probing,
    Scanning,
    Done,
}

impl fmt::Display for FleetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FleetState::Enumerating => "Enumerating",
            FleetState::Probing => "Probing",
            FleetState::Scanning => "Scanning",
            FleetState::Done => "Done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetOutcome {
    Completed,
    /// Probing left no alive host; this is a successful run.
    NothingToScan,
}

#[derive(Debug)]
pub struct FleetSummary {
    pub candidates: Vec<String>,
    pub alive: usize,
    /// One report per scanned host, in completion order.
    pub reports: Vec<HostReport>,
    pub outcome: FleetOutcome,
}

impl FleetSummary {
    pub fn total_findings(&self) -> usize {
        self.reports.iter().map(|r| r.findings.len()).sum()
    }

    pub fn findings_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for finding in self.reports.iter().flat_map(|r| r.findings.iter()) {
            *counts.entry(finding.severity()).or_insert(0) += 1;
        }
        counts
    }
}

pub struct FleetOrchestrator {
    runner: Arc<dyn ProcessRunner>,
    pipeline: ScanPipeline,
    timeouts: ToolTimeouts,
    concurrency: usize,
    no_subs: bool,
    events: EventSink,
}

impl FleetOrchestrator {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        policy: Arc<ScanPolicy>,
        cfg: &Config,
        events: EventSink,
    ) -> Self {
        Self {
            pipeline: ScanPipeline::new(runner.clone(), policy, cfg, events.clone()),
            runner,
            timeouts: cfg.timeouts,
            concurrency: cfg.concurrency.max(1),
            no_subs: cfg.no_subs,
            events,
        }
    }

    pub async fn run(&self, target: &str) -> FleetSummary {
        let candidates = if self.no_subs {
            vec![target.to_string()]
        } else {
            self.enter(FleetState::Enumerating);
            self.enumerate(target).await
        };

        self.enter(FleetState::Probing);
        let alive = self.probe(&candidates).await;

        if alive.is_empty() {
            warn!("No alive targets found. Nothing to scan.");
            self.enter(FleetState::Done);
            return FleetSummary {
                candidates,
                alive: 0,
                reports: Vec::new(),
                outcome: FleetOutcome::NothingToScan,
            };
        }

        self.enter(FleetState::Scanning);
        let alive_count = alive.len();
        let reports = self.scan(alive).await;

        self.enter(FleetState::Done);
        FleetSummary {
            candidates,
            alive: alive_count,
            reports,
            outcome: FleetOutcome::Completed,
        }
    }

    fn enter(&self, state: FleetState) {
        info!(phase = %state, "Phase: {state}");
        self.events.emit(ScanEvent::Phase(state));
    }

    /// Candidate hosts, or just `target` when enumeration fails. An empty but
    /// successful run yields no candidates.
    async fn enumerate(&self, target: &str) -> Vec<String> {
        let (candidates, fallback) =
            match enumerator::enumerate(&*self.runner, target, self.timeouts.enumeration).await {
                Ok(subs) => {
                    info!("Found {} unique subdomains", subs.len());
                    (subs, false)
                }
                Err(e) => {
                    error!("Subfinder failed: {e}");
                    (vec![target.to_string()], true)
                }
            };

        self.events.emit(ScanEvent::Enumerated {
            candidates: candidates.len(),
            fallback,
        });
        candidates
    }

    async fn probe(&self, candidates: &[String]) -> Vec<TargetFingerprint> {
        let (alive, fallback) =
            match prober::probe(&*self.runner, candidates, self.timeouts.probing).await {
                Ok(alive) => (alive, false),
                Err(e) => {
                    error!("Httpx failed: {e}");
                    let unprobed = candidates
                        .iter()
                        .map(|host| TargetFingerprint::unprobed(host.as_str()))
                        .collect();
                    (unprobed, true)
                }
            };

        info!(
            "Found {} alive subdomains out of {}",
            alive.len(),
            candidates.len()
        );
        self.events.emit(ScanEvent::Probed {
            alive: alive.len(),
            candidates: candidates.len(),
            fallback,
        });
        alive
    }

    async fn scan(&self, alive: Vec<TargetFingerprint>) -> Vec<HostReport> {
        info!(
            hosts = alive.len(),
            concurrency = self.concurrency,
            "Launching concurrent scans"
        );

        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut join_set: JoinSet<HostReport> = JoinSet::new();

        for fingerprint in alive {
            // Admission happens before spawning; the permit lives as long as
            // the task, so it is returned even if the pipeline panics.
            let Ok(permit) = gate.clone().acquire_owned().await else {
                error!("admission gate closed, {} not scanned", fingerprint.url());
                continue;
            };
            let pipeline = self.pipeline.clone();
            join_set.spawn(async move {
                let _permit = permit;
                pipeline.run(&fingerprint).await
            });
        }

        let mut reports = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(report) => reports.push(report),
                Err(e) => error!("scan task aborted: {e}"),
            }
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ToolOutput;
    use crate::testing::ScriptedRunner;
    use std::time::Duration;

    fn config() -> Config {
        Config {
            pacing: Duration::ZERO,
            timeouts: ToolTimeouts::uniform(Duration::from_secs(1)),
            ..Config::default()
        }
    }

    fn fleet(runner: Arc<ScriptedRunner>, cfg: &Config) -> FleetOrchestrator {
        FleetOrchestrator::new(runner, Arc::new(ScanPolicy::default()), cfg, EventSink::disabled())
    }

    #[tokio::test]
    async fn enumeration_failure_falls_back_to_target() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("subfinder", ToolOutput::timed_out())
                .on("httpx", ToolOutput::failed(Some(1), "")),
        );
        let summary = fleet(runner.clone(), &config()).run("example.com").await;

        assert_eq!(summary.candidates, vec!["example.com"]);
        assert_eq!(summary.alive, 1);
        assert_eq!(summary.reports[0].host, "example.com");
        assert!(!summary.reports[0].is_waf);
        let httpx = runner.calls_to("httpx");
        assert_eq!(httpx[0].stdin.as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn empty_enumeration_leaves_nothing_to_scan() {
        let runner = Arc::new(ScriptedRunner::new().on("subfinder", ToolOutput::success("")));
        let summary = fleet(runner.clone(), &config()).run("example.com").await;

        assert!(summary.candidates.is_empty());
        assert_eq!(summary.alive, 0);
        assert_eq!(summary.outcome, FleetOutcome::NothingToScan);
        let httpx = runner.calls_to("httpx");
        assert_eq!(httpx[0].stdin.as_deref(), Some(""));
        assert!(runner.calls_to("nmap").is_empty());
        assert!(runner.calls_to("nuclei").is_empty());
    }

    #[tokio::test]
    async fn probe_failure_marks_every_candidate_alive() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("subfinder", ToolOutput::success("a.example.com\nb.example.com\na.example.com\n"))
                .missing("httpx"),
        );
        let summary = fleet(runner.clone(), &config()).run("example.com").await;

        assert_eq!(summary.candidates, vec!["a.example.com", "b.example.com"]);
        assert_eq!(summary.alive, 2);
        assert_eq!(summary.outcome, FleetOutcome::Completed);
        // Fallback fingerprints are never WAF, so both hosts get port scanned.
        assert_eq!(runner.calls_to("nmap").len(), 2);
    }

    #[tokio::test]
    async fn no_alive_hosts_is_a_clean_finish() {
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("subfinder", ToolOutput::success("a.example.com\n"))
                .on("httpx", ToolOutput::success("")),
        );
        let summary = fleet(runner.clone(), &config()).run("example.com").await;

        assert_eq!(summary.outcome, FleetOutcome::NothingToScan);
        assert!(summary.reports.is_empty());
        assert!(runner.calls_to("nuclei").is_empty());
    }

    #[tokio::test]
    async fn no_subs_skips_enumeration() {
        let runner = Arc::new(ScriptedRunner::new());
        let cfg = Config {
            no_subs: true,
            ..config()
        };
        let summary = fleet(runner.clone(), &cfg).run("example.com").await;

        assert!(runner.calls_to("subfinder").is_empty());
        assert_eq!(summary.candidates, vec!["example.com"]);
    }

    #[tokio::test]
    async fn gate_bounds_running_pipelines() {
        let hosts: String = (0..8)
            .map(|i| format!("{{\"url\":\"https://h{i}.example.com\",\"tech\":[]}}\n"))
            .collect();
        let runner = Arc::new(
            ScriptedRunner::new()
                .on("subfinder", ToolOutput::success("x.example.com\n"))
                .on("httpx", ToolOutput::success(hosts))
                .with_delay(Duration::from_millis(20)),
        );
        let cfg = Config {
            concurrency: 3,
            ..config()
        };
        let summary = fleet(runner.clone(), &cfg).run("example.com").await;

        assert_eq!(summary.reports.len(), 8);
        assert!(runner.peak() <= 3, "peak was {}", runner.peak());
        assert!(runner.peak() > 1, "pipelines never overlapped");
    }

    #[test]
    fn summary_counts_findings_by_severity() {
        use crowscout_common::finding::Finding;

        let report = HostReport {
            findings: vec![
                Finding::new("Nmap", "Critical Port Open: 22 - SSH", Severity::High).unwrap(),
                Finding::new("Nuclei", "[x] [high] u", Severity::High).unwrap(),
                Finding::new("Nuclei", "[y] [critical] u", Severity::Critical).unwrap(),
            ],
            ..HostReport::default()
        };
        let summary = FleetSummary {
            candidates: vec![],
            alive: 1,
            reports: vec![report],
            outcome: FleetOutcome::Completed,
        };

        assert_eq!(summary.total_findings(), 3);
        assert_eq!(summary.findings_by_severity().get(&Severity::High), Some(&2));
        assert_eq!(summary.findings_by_severity().get(&Severity::Critical), Some(&1));
    }
}
