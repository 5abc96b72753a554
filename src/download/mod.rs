//! Download orchestration.
//!
//! This module provides:
//! - The command boundary that starts a run
//! - The orchestrator that walks a payload category by category
//! - Transfer sinks that store downloaded and synthesized content
//! - Run statistics

pub mod command;
pub mod orchestrator;
pub mod state;
pub mod transfer;

#[cfg(test)]
mod tests;

pub use command::{dispatch, Command};
pub use orchestrator::Orchestrator;
pub use state::RunStats;
pub use transfer::{FsTransferSink, TransferSink, TransferSource, DEFAULT_CONCURRENT_TRANSFERS};
