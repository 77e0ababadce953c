//! Progress events streamed from the orchestrator to whoever renders them.
//!
//! Events for one host arrive in stage order. Events of different hosts
//! interleave freely.

use std::fmt;

use crowscout_common::finding::Finding;
use tokio::sync::mpsc::UnboundedSender;

use crate::fleet::FleetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PortScan,
    Parameters,
    TemplateScan,
    JsLinks,
    JsSecrets,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::PortScan => "Nmap",
            Stage::Parameters => "Arjun",
            Stage::TemplateScan => "Nuclei",
            Stage::JsLinks => "JS",
            Stage::JsSecrets => "JS Secrets",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a single stage ended for a host.
#[derive(Debug, Clone)]
pub enum StageResult {
    Skipped(String),
    Failed(String),
    Findings(Vec<Finding>),
    /// Unclassified text reported verbatim (parameters, JS secrets).
    Raw(String),
    /// Number of JS links extracted.
    Links(usize),
    /// The stage ran and had nothing to report.
    Nothing,
}

#[derive(Debug, Clone)]
pub enum ScanEvent {
    Phase(FleetState),
    Enumerated { candidates: usize, fallback: bool },
    Probed { alive: usize, candidates: usize, fallback: bool },
    HostStarted { host: String, url: String, is_waf: bool },
    Stage { host: String, stage: Stage, result: StageResult },
    HostFinished { host: String, findings: usize },
}

/// Optional event channel. Sending never blocks and a dropped receiver is
/// ignored, so the scan keeps running when nobody listens.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<UnboundedSender<ScanEvent>>,
}

impl EventSink {
    pub fn new(tx: UnboundedSender<ScanEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: ScanEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn stage(&self, host: &str, stage: Stage, result: StageResult) {
        self.emit(ScanEvent::Stage {
            host: host.to_string(),
            stage,
            result,
        });
    }
}
