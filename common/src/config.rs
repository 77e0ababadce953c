//! # Run Configuration
//!
//! Two kinds of settings live here:
//! * [`Config`]: runtime flags chosen on the command line.
//! * [`ScanPolicy`]: the JSON policy document (critical ports, severities of
//!   interest). It is loaded once before any scanning starts and shared
//!   read-only by every pipeline.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::finding::Severity;

pub const DEFAULT_CONCURRENCY: usize = 10;
pub const DEFAULT_PACING: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct Config {
    /// Skip subdomain enumeration and scan only the literal target.
    pub no_subs: bool,
    /// Maximum number of host pipelines running at the same time.
    pub concurrency: usize,
    /// Pause inserted before every template scan.
    pub pacing: Duration,
    pub timeouts: ToolTimeouts,
    pub quiet: u8,
    pub no_banner: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            no_subs: false,
            concurrency: DEFAULT_CONCURRENCY,
            pacing: DEFAULT_PACING,
            timeouts: ToolTimeouts::default(),
            quiet: 0,
            no_banner: false,
        }
    }
}

/// Per-tool deadlines. Each external invocation carries its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTimeouts {
    pub enumeration: Duration,
    pub probing: Duration,
    pub port_scan: Duration,
    pub parameters: Duration,
    pub template_scan: Duration,
    pub js_links: Duration,
    pub js_secrets: Duration,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        const FIVE_MINUTES: Duration = Duration::from_secs(5 * 60);
        const TEN_MINUTES: Duration = Duration::from_secs(10 * 60);

        Self {
            enumeration: FIVE_MINUTES,
            probing: FIVE_MINUTES,
            port_scan: FIVE_MINUTES,
            parameters: TEN_MINUTES,
            template_scan: TEN_MINUTES,
            js_links: FIVE_MINUTES,
            js_secrets: TEN_MINUTES,
        }
    }
}

impl ToolTimeouts {
    /// Applies the same deadline to every tool.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            enumeration: timeout,
            probing: timeout,
            port_scan: timeout,
            parameters: timeout,
            template_scan: timeout,
            js_links: timeout,
            js_secrets: timeout,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to open config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Policy deciding which raw tool output is worth reporting.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanPolicy {
    /// Port number (as written by the port scanner) to human description.
    #[serde(default)]
    pub critical_ports: HashMap<String, String>,
    /// Severity tags of interest, in priority order.
    #[serde(default)]
    pub nuclei_severities: Vec<String>,
}

impl ScanPolicy {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parses and validates a policy document.
    ///
    /// Port keys must be valid port numbers and severity names must belong to
    /// the closed [`Severity`] set. Severity names are lowercased since the
    /// template scanner prints them that way.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let mut policy: ScanPolicy = serde_json::from_str(raw)?;

        policy.critical_ports = policy
            .critical_ports
            .into_iter()
            .map(|(port, desc)| {
                let port = port.trim().to_string();
                port.parse::<u16>()
                    .map_err(|_| ConfigError::Invalid(format!("'{port}' is not a port number")))?;
                Ok((port, desc))
            })
            .collect::<Result<_, ConfigError>>()?;

        for severity in policy.nuclei_severities.iter_mut() {
            let lowered = severity.trim().to_ascii_lowercase();
            if Severity::from_tag(&lowered).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "unknown severity '{severity}'"
                )));
            }
            *severity = lowered;
        }

        Ok(policy)
    }
}
