//! Adaptive template scanning through `nuclei`.
//!
//! The tag set is derived from the host's tech stack, and the rate limit from
//! its WAF verdict. A WAF-fronted host always gets exactly
//! [`BASELINE_TAGS`] at [`WAF_RATE_LIMIT`]: tech-derived tags are discarded,
//! never merged.

use std::time::Duration;

use tracing::{info, warn};

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::Tool;

/// Tags requested for every host.
pub const BASELINE_TAGS: [&str; 3] = ["cve", "misconfig", "exposure"];

/// Requests per second against WAF/CDN-fronted hosts.
pub const WAF_RATE_LIMIT: u32 = 10;
pub const DEFAULT_RATE_LIMIT: u32 = 50;

/// Tech keyword groups and the tags they unlock, checked in order. A tech
/// entry contributes the tags of the first group it matches.
const TECH_TAGS: &[(&[&str], &[&str])] = &[
    (&["wordpress"], &["wordpress"]),
    (&["php"], &["php"]),
    (&["react", "vue", "angular"], &["xss", "exposure"]),
    (&["mysql", "postgresql"], &["sqli"]),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanPlan {
    pub tags: Vec<&'static str>,
    pub rate_limit: u32,
}

impl ScanPlan {
    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| *t == tag)
    }
}

/// Tags unlocked by `tech_stack`, in derivation order, without duplicates.
pub fn tech_tags(tech_stack: &[String]) -> Vec<&'static str> {
    let mut tags: Vec<&'static str> = Vec::new();
    for tech in tech_stack {
        let tech = tech.to_ascii_lowercase();
        let matched = TECH_TAGS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| tech.contains(k)));
        if let Some((_, unlocked)) = matched {
            for tag in unlocked.iter().copied() {
                if !tags.contains(&tag) {
                    tags.push(tag);
                }
            }
        }
    }
    tags
}

pub fn plan(is_waf: bool, tech_stack: &[String]) -> ScanPlan {
    if is_waf {
        return ScanPlan {
            tags: BASELINE_TAGS.to_vec(),
            rate_limit: WAF_RATE_LIMIT,
        };
    }

    let mut tags = tech_tags(tech_stack);
    for tag in BASELINE_TAGS {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    ScanPlan {
        tags,
        rate_limit: DEFAULT_RATE_LIMIT,
    }
}

pub fn invocation(url: &str, plan: &ScanPlan, timeout: Duration) -> Invocation {
    Invocation::new(Tool::Nuclei.binary(), timeout)
        .args(["-u", url, "-silent"])
        .args(["-rl".to_string(), plan.rate_limit.to_string()])
        .args(["-tags".to_string(), plan.tags.join(",")])
}

pub async fn scan(
    runner: &dyn ProcessRunner,
    url: &str,
    is_waf: bool,
    tech_stack: &[String],
    timeout: Duration,
) -> Result<String, ToolError> {
    info!("Running Smart Nuclei on {url}...");
    let plan = plan(is_waf, tech_stack);
    if is_waf {
        warn!("WAF detected for {url} - Throttling Nuclei to {} req/s", plan.rate_limit);
    }
    let invocation = invocation(url, &plan, timeout);
    runner.run(&invocation).await?.into_usable(&invocation)
}
