use std::fmt;

/// Closed severity scale shared by every classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Maps a tool tag such as `critical` or `High` onto the scale.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Severity::Info),
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A classified result pulled out of raw tool output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    source: String,
    description: String,
    severity: Severity,
}

impl Finding {
    /// Returns `None` when either the source or the description is blank.
    pub fn new(
        source: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
    ) -> Option<Self> {
        let source = source.into();
        let description = description.into();
        if source.trim().is_empty() || description.trim().is_empty() {
            return None;
        }
        Some(Self {
            source,
            description,
            severity,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }
}
