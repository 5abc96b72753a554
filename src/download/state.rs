//! Download run statistics.

/// Outcome counters for one download run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Transfers handed to the sink.
    pub issued: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Listings and detail fetches that failed without aborting the run.
    pub fetch_failures: u64,
    /// Items that were selected but have nothing to transfer.
    pub skipped: u64,
}

impl RunStats {
    pub fn record_issued(&mut self) {
        self.issued += 1;
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Whether anything went wrong along the way.
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.fetch_failures > 0
    }
}
