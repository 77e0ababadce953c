//! # Target Fingerprint
//!
//! The per-host record produced right after probing. It is derived once and
//! never changes afterwards, so every stage of a pipeline sees the same WAF
//! verdict.

use serde::Deserialize;

/// Vendor names whose presence in the tech stack marks a host as fronted by a
/// WAF or CDN.
pub const WAF_VENDORS: &[&str] = &["cloudflare", "akamai", "incapsula", "sucuri"];

/// One JSON line emitted by the prober.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFingerprint {
    url: String,
    tech_stack: Vec<String>,
    is_waf: bool,
}

impl TargetFingerprint {
    pub fn new(url: impl Into<String>, tech_stack: Vec<String>) -> Self {
        let is_waf = detect_waf(&tech_stack);
        Self {
            url: url.into(),
            tech_stack,
            is_waf,
        }
    }

    /// Fingerprint used when probing failed: alive, nothing known, not WAF.
    pub fn unprobed(host: impl Into<String>) -> Self {
        Self {
            url: host.into(),
            tech_stack: Vec::new(),
            is_waf: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tech_stack(&self) -> &[String] {
        &self.tech_stack
    }

    pub fn is_waf(&self) -> bool {
        self.is_waf
    }
}

impl From<ProbeRecord> for TargetFingerprint {
    fn from(record: ProbeRecord) -> Self {
        Self::new(record.url, record.tech)
    }
}

/// Case-insensitive substring match of [`WAF_VENDORS`] against the stack.
pub fn detect_waf(tech_stack: &[String]) -> bool {
    tech_stack.iter().any(|tech| {
        let tech = tech.to_ascii_lowercase();
        WAF_VENDORS.iter().any(|vendor| tech.contains(vendor))
    })
}
