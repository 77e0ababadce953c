use std::time::Duration;

use thiserror::Error;

/// Failures at the process/adapter boundary.
///
/// None of these abort a pipeline: callers log them and move on to the next
/// stage. Partial output from a failed process is not an error at all, see
/// [`crate::process::Outcome::FailedWithPartialOutput`].
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while running {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} failed without output (exit code {code:?})")]
    FailedNoOutput { program: String, code: Option<i32> },
}
