//! # Scan Target Model
//!
//! Defines the root domain handed to the tool and the helpers that turn a
//! discovered host into the two shapes the external tools expect:
//! * A URL with a scheme (`http://` is assumed when none is given).
//! * A bare hostname without scheme or port, for the port scanner.

use std::fmt;
use std::str::FromStr;

use url::Url;

/// The root domain a run starts from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target(String);

impl Target {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Target {
    type Err = String;

    /// Accepts a domain such as `example.com`.
    ///
    /// Surrounding whitespace is dropped. Whitespace inside the value is
    /// rejected since every tool receives it as a single argument.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("target cannot be empty".to_string());
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(format!("invalid target: {trimmed}"));
        }
        Ok(Target(trimmed.to_string()))
    }
}

/// Returns `host` as a URL, prepending `http://` when it has no http(s) scheme.
pub fn target_url(host: &str) -> String {
    if host.starts_with("http") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}

/// Strips scheme, path and port from `host`.
pub fn bare_hostname(host: &str) -> String {
    if let Ok(parsed) = Url::parse(&target_url(host)) {
        if let Some(name) = parsed.host_str() {
            if !name.is_empty() {
                return name.trim_matches(|c| c == '[' || c == ']').to_string();
            }
        }
    }

    let stripped = host
        .trim_start_matches("http://")
        .trim_start_matches("https://");
    stripped
        .split(['/', ':'])
        .next()
        .unwrap_or(stripped)
        .to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_domain() {
        let target: Target = " example.com ".parse().unwrap();
        assert_eq!(target.as_str(), "example.com");
    }

    #[test]
    fn rejects_empty_and_spaced_targets() {
        assert!("".parse::<Target>().is_err());
        assert!("exa mple.com".parse::<Target>().is_err());
    }

    #[test]
    fn target_url_keeps_existing_scheme() {
        assert_eq!(target_url("https://a.example.com"), "https://a.example.com");
        assert_eq!(target_url("a.example.com"), "http://a.example.com");
    }

    #[test]
    fn bare_hostname_drops_scheme_port_and_path() {
        assert_eq!(bare_hostname("https://a.example.com:8443/login"), "a.example.com");
        assert_eq!(bare_hostname("b.example.com:8080"), "b.example.com");
        assert_eq!(bare_hostname("c.example.com"), "c.example.com");
    }
}
