use std::time::Duration;

/// Timing of the line protocol.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// Longest wait for a single byte from the transceiver.
    pub read_timeout: Duration,
    /// Sleep between checks for available data while waiting.
    pub poll_interval: Duration,
    /// Quiet time after every acknowledge and every transmitted frame.
    pub settle_delay: Duration,
}

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

impl Default for Config {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

impl Config {
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }
}
