/// Bytes transferred so far out of the total for one upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    pub total: u64,
}

impl TransferProgress {
    pub fn new(loaded: u64, total: u64) -> Self {
        Self { loaded, total }
    }

    /// Completed fraction in `[0, 1]`. An empty transfer counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.loaded.min(self.total) as f64) / (self.total as f64)
    }

    /// Whole percent, rounded.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round() as u8
    }
}
