//! Scripted [`ProcessRunner`] for exercising the pipeline without the real
//! tools installed.

use std::io;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::ToolError;
use crate::process::{Invocation, ProcessRunner, ToolOutput};

enum Reply {
    Output(ToolOutput),
    Missing,
}

struct Rule {
    program: String,
    needle: Option<String>,
    reply: Reply,
}

impl Rule {
    fn matches(&self, invocation: &Invocation) -> bool {
        self.program == invocation.program
            && self
                .needle
                .as_ref()
                .is_none_or(|needle| invocation.args.iter().any(|arg| arg == needle))
    }
}

/// Replies to invocations from a list of canned rules and records every call.
///
/// Rules with an argument needle take precedence over plain per-program
/// rules. Unmatched invocations succeed with empty output.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<Rule>,
    delay: Duration,
    calls: Mutex<Vec<Invocation>>,
    started: Mutex<Vec<(String, Instant)>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, program: &str, output: ToolOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            needle: None,
            reply: Reply::Output(output),
        });
        self
    }

    /// Replies only when one of the arguments equals `needle`.
    pub fn on_args(mut self, program: &str, needle: &str, output: ToolOutput) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            needle: Some(needle.to_string()),
            reply: Reply::Output(output),
        });
        self
    }

    /// Makes `program` fail to spawn, as if it were not installed.
    pub fn missing(mut self, program: &str) -> Self {
        self.rules.push(Rule {
            program: program.to_string(),
            needle: None,
            reply: Reply::Missing,
        });
        self
    }

    /// Holds every invocation open for `delay` before replying.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|inv| inv.program == program)
            .collect()
    }

    /// When each call to `program` started, in call order.
    pub fn started_at(&self, program: &str) -> Vec<Instant> {
        self.started
            .lock()
            .map(|started| {
                started
                    .iter()
                    .filter(|(name, _)| name == program)
                    .map(|(_, at)| *at)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Highest number of invocations observed running at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn reply_for(&self, invocation: &Invocation) -> Option<&Reply> {
        self.rules
            .iter()
            .filter(|rule| rule.needle.is_some())
            .chain(self.rules.iter().filter(|rule| rule.needle.is_none()))
            .find(|rule| rule.matches(invocation))
            .map(|rule| &rule.reply)
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        if let Ok(mut started) = self.started.lock() {
            started.push((invocation.program.clone(), Instant::now()));
        }

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(running, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.reply_for(invocation) {
            Some(Reply::Output(output)) => Ok(output.clone()),
            Some(Reply::Missing) => Err(ToolError::Spawn {
                program: invocation.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "not installed"),
            }),
            None => Ok(ToolOutput::success("")),
        }
    }
}
