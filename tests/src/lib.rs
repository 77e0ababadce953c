//! End-to-end runs of the orchestrator against scripted tools.

#[cfg(test)]
mod fleet;
