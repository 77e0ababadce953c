//! # CrowScout Core
//!
//! The scan orchestration pipeline: one input domain becomes N per-host scan
//! pipelines, each chaining external recon tools with adaptive parameters.
//!
//! * **[`process`]**: bounded-lifetime execution of one external command.
//! * **[`tools`]**: one adapter per external tool.
//! * **[`classify`]**: raw report text to [`Finding`](crowscout_common::finding::Finding)s.
//! * **[`pipeline`]**: the per-host stage sequence.
//! * **[`fleet`]**: discovery, probing and the bounded fan-out of pipelines.
//!
//! High-level code should depend on the [`process::ProcessRunner`] seam rather
//! than on [`process::SystemRunner`] directly, so runs can be scripted in tests.

pub mod classify;
pub mod error;
pub mod events;
pub mod fleet;
pub mod pipeline;
pub mod process;
pub mod tools;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;
