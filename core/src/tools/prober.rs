//! Liveness probing and tech fingerprinting through `httpx`.
//!
//! Hosts are fed on stdin; every alive host comes back as one JSON object per
//! line. Lines that do not parse are skipped so that one malformed record can
//! never sink the batch.

use std::time::Duration;

use crowscout_common::fingerprint::{ProbeRecord, TargetFingerprint};
use tracing::{debug, info};

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::Tool;

pub fn invocation(hosts: &[String], timeout: Duration) -> Invocation {
    Invocation::new(Tool::Httpx.binary(), timeout)
        .args(["-silent", "-json", "-tech-detect"])
        .stdin(hosts.join("\n"))
}

pub fn parse(raw: &str) -> Vec<TargetFingerprint> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<ProbeRecord>(line) {
            Ok(record) => Some(TargetFingerprint::from(record)),
            Err(e) => {
                debug!("skipping unparsable probe line: {e}");
                None
            }
        })
        .collect()
}

pub async fn probe(
    runner: &dyn ProcessRunner,
    hosts: &[String],
    timeout: Duration,
) -> Result<Vec<TargetFingerprint>, ToolError> {
    info!(
        "Running httpx on {} domains to find alive targets and fingerprint WAF...",
        hosts.len()
    );
    let invocation = invocation(hosts, timeout);
    let raw = runner.run(&invocation).await?.into_usable(&invocation)?;
    Ok(parse(&raw))
}
