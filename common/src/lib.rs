//! Shared models for the `crowscout` workspace.
//!
//! Everything in here is plain data: the scan policy loaded from disk, the
//! per-host fingerprint produced by probing, and the findings surfaced to the
//! user. No module in this crate spawns processes or touches the terminal.

pub mod config;
pub mod finding;
pub mod fingerprint;
pub mod network;
