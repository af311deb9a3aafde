use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Counters for one reconciliation run.
pub struct RunStats {
    pub processed: usize,
    pub updated: usize,
    pub commented: usize,
}

impl RunStats {
    pub(crate) fn record_processed(&mut self) {
        self.processed = self.processed.saturating_add(1);
    }

    pub(crate) fn record_updated(&mut self) {
        self.updated = self.updated.saturating_add(1);
    }

    pub(crate) fn record_commented(&mut self) {
        self.commented = self.commented.saturating_add(1);
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} updated={} commented={}",
            self.processed, self.updated, self.commented
        )
    }
}
