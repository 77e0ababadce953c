//! Hidden parameter discovery through `arjun`.

use std::time::Duration;

use tracing::info;

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::Tool;

pub fn invocation(url: &str, timeout: Duration) -> Invocation {
    Invocation::new(Tool::Arjun.binary(), timeout).args(["-u", url, "-q", "-t", "5"])
}

/// Trimmed discovery text. Empty means nothing was found.
pub async fn discover(
    runner: &dyn ProcessRunner,
    url: &str,
    timeout: Duration,
) -> Result<String, ToolError> {
    info!("Running Arjun parameter discovery on {url}...");
    let invocation = invocation(url, timeout);
    let raw = runner.run(&invocation).await?.into_usable(&invocation)?;
    Ok(raw.trim().to_string())
}
