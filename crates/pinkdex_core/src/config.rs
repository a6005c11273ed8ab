//! Collection configuration.

/// Lines written between progress callbacks during save.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 1000;

/// Configuration for a [`Dex`](crate::Dex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexConfig {
    /// Keep entries whose counts are zero or negative.
    ///
    /// A zerok collection holds pending deltas ("these copies are leaving,
    /// these are arriving") rather than current holdings.
    pub zerok: bool,

    /// Number of lines written between save progress callbacks.
    pub progress_interval: usize,
}

impl Default for DexConfig {
    fn default() -> Self {
        Self {
            zerok: false,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl DexConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether zero and negative counts are retained.
    #[must_use]
    pub const fn zerok(mut self, value: bool) -> Self {
        self.zerok = value;
        self
    }

    /// Sets the save progress interval. Zero disables callbacks.
    #[must_use]
    pub const fn progress_interval(mut self, lines: usize) -> Self {
        self.progress_interval = lines;
        self
    }
}
