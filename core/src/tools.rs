//! # Tool Adapters
//!
//! One submodule per external tool. Each adapter is a set of free functions:
//! an `invocation` builder (binary, fixed arguments, deadline), a parser for
//! the tool's stdout, and an async entry point that glues both to a
//! [`ProcessRunner`](crate::process::ProcessRunner).
//!
//! Adapters hold no state. The builders and parsers are pure, which keeps
//! argument construction testable without spawning anything.

use std::path::PathBuf;

pub mod enumerator;
pub mod javascript;
pub mod parameters;
pub mod port_scanner;
pub mod prober;
pub mod templates;

/// External binaries the pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Subfinder,
    Httpx,
    Nmap,
    Arjun,
    Nuclei,
    Subjs,
}

impl Tool {
    pub const ALL: [Tool; 6] = [
        Tool::Subfinder,
        Tool::Httpx,
        Tool::Nmap,
        Tool::Arjun,
        Tool::Nuclei,
        Tool::Subjs,
    ];

    pub fn binary(&self) -> &'static str {
        match self {
            Tool::Subfinder => "subfinder",
            Tool::Httpx => "httpx",
            Tool::Nmap => "nmap",
            Tool::Arjun => "arjun",
            Tool::Nuclei => "nuclei",
            Tool::Subjs => "subjs",
        }
    }

    /// What the pipeline uses the tool for.
    pub fn purpose(&self) -> &'static str {
        match self {
            Tool::Subfinder => "subdomain enumeration",
            Tool::Httpx => "probing and tech fingerprinting",
            Tool::Nmap => "port scanning",
            Tool::Arjun => "parameter discovery",
            Tool::Nuclei => "template and JS secret scanning",
            Tool::Subjs => "JavaScript link extraction",
        }
    }

    /// Searches `PATH` for the tool's binary.
    pub fn locate(&self) -> Option<PathBuf> {
        let path = std::env::var_os("PATH")?;
        std::env::split_paths(&path)
            .map(|dir| dir.join(self.binary()))
            .find(|candidate| candidate.is_file())
    }
}

/// Splits tool output into trimmed, non-blank lines, dropping exact duplicates
/// while keeping first-seen order.
pub(crate) fn unique_lines(raw: &str) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(*line))
        .map(str::to_string)
        .collect()
}
