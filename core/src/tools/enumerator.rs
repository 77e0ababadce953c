//! Subdomain enumeration through `subfinder`.

use std::time::Duration;

use tracing::info;

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::{Tool, unique_lines};

pub fn invocation(domain: &str, timeout: Duration) -> Invocation {
    Invocation::new(Tool::Subfinder.binary(), timeout).args(["-d", domain, "-silent", "-all"])
}

/// Discovered hostnames, deduplicated in first-seen order.
pub fn parse(raw: &str) -> Vec<String> {
    unique_lines(raw)
}

pub async fn enumerate(
    runner: &dyn ProcessRunner,
    domain: &str,
    timeout: Duration,
) -> Result<Vec<String>, ToolError> {
    info!("Running Subfinder on {domain}...");
    let invocation = invocation(domain, timeout);
    let raw = runner.run(&invocation).await?.into_usable(&invocation)?;
    Ok(parse(&raw))
}
