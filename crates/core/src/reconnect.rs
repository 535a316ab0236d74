//! Reconnect delay policy.

use std::time::Duration;

/// Delay used between a close and the next connection attempt unless configured otherwise.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(3000);

/// Upper bound for the exponential variant unless configured otherwise.
pub const DEFAULT_MAX_RECONNECT_DELAY: Duration = Duration::from_secs(30);

/// How long to wait before reconnecting after the connection closes.
///
/// Both variants retry forever. `attempt` counts consecutive closes since the
/// last successful open, starting at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// The same delay every time.
    Fixed { delay: Duration },
    /// Doubles the delay per consecutive failure, capped at `max`.
    ExponentialBackoff { initial: Duration, max: Duration },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::Fixed {
            delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match *self {
            Self::Fixed { delay } => delay,
            Self::ExponentialBackoff { initial, max } => {
                let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
                initial.saturating_mul(multiplier).min(max)
            }
        }
    }
}
