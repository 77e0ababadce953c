//! JavaScript extraction (`subjs`) and secret scanning (`nuclei` exposure
//! templates fed with the extracted links).

use std::time::Duration;

use tracing::info;

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner};
use crate::tools::{Tool, unique_lines};

pub const SECRET_TAGS: &str = "exposure,token,key";

pub fn links_invocation(url: &str, timeout: Duration) -> Invocation {
    Invocation::new(Tool::Subjs.binary(), timeout).args(["-i", url])
}

/// `None` when there is nothing to scan: the secret scanner must never run
/// with zero targets.
pub fn secrets_invocation(js_urls: &[String], timeout: Duration) -> Option<Invocation> {
    if js_urls.is_empty() {
        return None;
    }
    Some(
        Invocation::new(Tool::Nuclei.binary(), timeout)
            .args(["-silent", "-tags", SECRET_TAGS])
            .stdin(js_urls.join("\n")),
    )
}

/// JS resource URLs, deduplicated in first-seen order. Empty is a valid
/// answer.
pub async fn extract_links(
    runner: &dyn ProcessRunner,
    url: &str,
    timeout: Duration,
) -> Result<Vec<String>, ToolError> {
    info!("Extracting JS links from {url}...");
    let invocation = links_invocation(url, timeout);
    let raw = runner.run(&invocation).await?.into_usable(&invocation)?;
    Ok(unique_lines(&raw))
}

/// Raw secret-scan report. An empty link list returns an empty report
/// without invoking anything.
pub async fn scan_secrets(
    runner: &dyn ProcessRunner,
    js_urls: &[String],
    timeout: Duration,
) -> Result<String, ToolError> {
    let Some(invocation) = secrets_invocation(js_urls, timeout) else {
        return Ok(String::new());
    };
    info!(
        "Analyzing {} JavaScript files for secrets and endpoints...",
        js_urls.len()
    );
    runner.run(&invocation).await?.into_usable(&invocation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ToolOutput;
    use crate::testing::ScriptedRunner;

    #[test]
    fn no_links_means_no_invocation() {
        assert!(secrets_invocation(&[], Duration::from_secs(1)).is_none());
    }

    #[test]
    fn links_are_fed_on_stdin() {
        let links = vec!["https://a.example.com/app.js".to_string(), "https://a.example.com/vendor.js".to_string()];
        let inv = secrets_invocation(&links, Duration::from_secs(600)).unwrap();
        assert_eq!(inv.args, vec!["-silent", "-tags", "exposure,token,key"]);
        assert_eq!(
            inv.stdin.as_deref(),
            Some("https://a.example.com/app.js\nhttps://a.example.com/vendor.js")
        );
    }

    #[tokio::test]
    async fn extracted_links_are_deduplicated() {
        let runner = ScriptedRunner::new().on(
            "subjs",
            ToolOutput::success("https://a.example.com/app.js\nhttps://a.example.com/app.js\nhttps://cdn.example.com/lib.js\n"),
        );
        let links = extract_links(&runner, "https://a.example.com", Duration::from_secs(1)).await.unwrap();
        assert_eq!(links, vec!["https://a.example.com/app.js", "https://cdn.example.com/lib.js"]);
    }

    #[tokio::test]
    async fn empty_link_list_skips_the_scanner() {
        let runner = ScriptedRunner::new();
        let report = scan_secrets(&runner, &[], Duration::from_secs(1)).await.unwrap();
        assert!(report.is_empty());
        assert!(runner.calls().is_empty());
    }
}
