use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use colored::*;
use crowscout_common::config::{Config, ScanPolicy};
use crowscout_common::finding::Severity;
use crowscout_core::events::{EventSink, ScanEvent};
use crowscout_core::fleet::{FleetOrchestrator, FleetOutcome, FleetState, FleetSummary};
use crowscout_core::process::SystemRunner;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{Instrument, Span, info_span};

use crate::commands::ScanArgs;
use crate::mprint;
use crate::terminal::{colors, format, print, spinner};

const KEY_WIDTH: usize = 12;

pub async fn scan(args: ScanArgs, quiet: u8) -> anyhow::Result<()> {
    let policy: ScanPolicy = ScanPolicy::load(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    let cfg = Config {
        no_subs: args.no_subs,
        concurrency: args.concurrency.max(1),
        quiet,
        no_banner: args.no_banner,
        ..Config::default()
    };

    print::banner(cfg.no_banner, cfg.quiet);
    print::header("starting scanner", cfg.quiet);
    print_setup(&args, &policy, &cfg);

    let (tx, rx) = mpsc::unbounded_channel::<ScanEvent>();
    let fleet = FleetOrchestrator::new(
        Arc::new(SystemRunner),
        Arc::new(policy),
        &cfg,
        EventSink::new(tx),
    );

    let span = info_span!("scan", indicatif.pb_show = true);
    spinner::attach(&span);

    let start_time: Instant = Instant::now();
    let renderer = tokio::spawn(render_events(rx, span.clone(), cfg.quiet));
    let summary: FleetSummary = fleet.run(args.target.as_str()).instrument(span.clone()).await;

    // Dropping the orchestrator closes the channel and lets the renderer drain.
    drop(fleet);
    let _ = renderer.await;
    drop(span);

    scan_ends(&summary, start_time.elapsed(), &cfg);
    Ok(())
}

fn print_setup(args: &ScanArgs, policy: &ScanPolicy, cfg: &Config) {
    if cfg.quiet > 0 {
        return;
    }
    let subdomains: ColoredString = if cfg.no_subs {
        "skipped".yellow()
    } else {
        "enabled".green()
    };
    print::aligned_line("Target", args.target.to_string(), KEY_WIDTH);
    print::aligned_line("Config", args.config.display().to_string(), KEY_WIDTH);
    print::aligned_line("Subdomains", subdomains, KEY_WIDTH);
    print::aligned_line("Concurrency", cfg.concurrency.to_string(), KEY_WIDTH);
    print::aligned_line("Ports", policy.critical_ports.len().to_string(), KEY_WIDTH);
    print::aligned_line("Severities", policy.nuclei_severities.join(", "), KEY_WIDTH);
}

async fn render_events(mut rx: UnboundedReceiver<ScanEvent>, span: Span, quiet: u8) {
    while let Some(event) = rx.recv().await {
        match event {
            ScanEvent::Phase(state) => render_phase(state, &span, quiet),
            ScanEvent::Enumerated { candidates, fallback } => {
                if fallback {
                    print::print_status(format!("Falling back to the target itself ({candidates} host)"));
                } else {
                    print::print_status(format!("{} unique subdomains", candidates.to_string().green().bold()));
                }
            }
            ScanEvent::Probed { alive, candidates, fallback } => {
                let note: &str = if fallback { " (probe failed, assuming alive)" } else { "" };
                print::print_status(format!(
                    "{} alive out of {candidates}{note}",
                    alive.to_string().green().bold()
                ));
                spinner::start_scanning(&span, alive);
            }
            ScanEvent::HostStarted { host, is_waf, .. } => {
                mprint!();
                print::host_head(&host, is_waf);
            }
            ScanEvent::Stage { host, stage, result } => {
                if let Some((title, body)) = format::stage_lines(&host, stage, &result) {
                    print::print(&format!("  {title}"));
                    print::as_tree_one_level(&body);
                }
            }
            ScanEvent::HostFinished { .. } => spinner::report_host_done(&span),
        }
    }
}

fn render_phase(state: FleetState, span: &Span, quiet: u8) {
    let title: &str = match state {
        FleetState::Enumerating => "phase 1: recon",
        FleetState::Probing => "phase 1.5: probing alive targets",
        FleetState::Scanning => "phase 2: concurrent scans",
        FleetState::Done => return,
    };
    spinner::report_phase(span, &format!("{state}..."));
    print::header(title, quiet);
}

fn scan_ends(summary: &FleetSummary, total_time: Duration, cfg: &Config) {
    if summary.outcome == FleetOutcome::NothingToScan {
        print::header("zero alive targets", cfg.quiet);
        print::no_results(cfg.quiet);
        return;
    }

    mprint!();
    print::header("scan summary", cfg.quiet);
    let counts = summary.findings_by_severity();
    for severity in Severity::ALL.iter().rev() {
        let count: usize = counts.get(severity).copied().unwrap_or(0);
        let value: ColoredString = if count > 0 {
            count.to_string().color(format::severity_color(*severity)).bold()
        } else {
            count.to_string().color(colors::SEPARATOR)
        };
        print::aligned_line(severity.label(), value, KEY_WIDTH);
    }

    let failed: usize = summary.reports.iter().map(|r| r.failed.len()).sum();
    if failed > 0 {
        print::aligned_line("Failed", failed.to_string().yellow(), KEY_WIDTH);
    }

    let hosts: ColoredString = format!("{} hosts", summary.reports.len()).bold().green();
    let findings: ColoredString = format!("{} findings", summary.total_findings()).bold().red();
    let total_time: ColoredString = format!("{:.2}s", total_time.as_secs_f64()).bold().yellow();
    let output: String = format!("Scan Complete: {hosts}, {findings} in {total_time}");

    print::fat_separator();
    print::centerln(&output);
    print::end_of_program();
}
