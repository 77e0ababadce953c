//! Fast port scan through `nmap`. The report is returned raw and classified
//! later by [`crate::classify::port_scan`].

use std::time::Duration;

use tracing::info;

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::Tool;

pub fn invocation(hostname: &str, timeout: Duration) -> Invocation {
    Invocation::new(Tool::Nmap.binary(), timeout).args(["-T4", "-F", hostname])
}

pub async fn scan(
    runner: &dyn ProcessRunner,
    hostname: &str,
    timeout: Duration,
) -> Result<String, ToolError> {
    info!("Running Nmap on {hostname}...");
    let invocation = invocation(hostname, timeout);
    runner.run(&invocation).await?.into_usable(&invocation)
}
