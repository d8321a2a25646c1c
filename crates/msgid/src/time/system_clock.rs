use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{CUSTOM_EPOCH, Error, Result, TimeSource};

/// A wall-clock time source reading [`SystemTime`] on every call.
///
/// Unlike [`MonotonicClock`], this clock follows external adjustments and
/// can therefore move backward. Generators report that as
/// [`Error::ClockRegression`] instead of issuing an out-of-order ID.
///
/// Readings earlier than the epoch are clamped to zero.
///
/// [`MonotonicClock`]: crate::MonotonicClock
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    epoch: Duration,
}

impl SystemClock {
    /// Constructs a wall clock aligned to [`CUSTOM_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if the system time is earlier than the
    /// epoch.
    pub fn new() -> Result<Self> {
        Self::with_epoch(CUSTOM_EPOCH)
    }

    /// Constructs a wall clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if the system time is earlier than the
    /// epoch.
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let clock = Self { epoch };
        match clock.since_unix() {
            Some(now) if now >= epoch => Ok(clock),
            _ => Err(Error::EpochInFuture),
        }
    }

    /// The configured epoch, as a [`Duration`] since 1970-01-01 UTC.
    pub const fn epoch(&self) -> Duration {
        self.epoch
    }

    fn since_unix(&self) -> Option<Duration> {
        SystemTime::now().duration_since(UNIX_EPOCH).ok()
    }
}

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        self.since_unix()
            .and_then(|now| now.checked_sub(self.epoch))
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_elapsed_millis_since_epoch() {
        let clock = SystemClock::new().unwrap();
        let wall = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let expected = (wall - CUSTOM_EPOCH).as_millis() as u64;
        assert!(clock.current_millis().abs_diff(expected) < 1_000);
    }

    #[test]
    fn unix_epoch_gives_unix_millis() {
        let clock = SystemClock::with_epoch(Duration::ZERO).unwrap();
        let wall = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        assert!(clock.current_millis().abs_diff(wall.as_millis() as u64) < 1_000);
    }

    #[test]
    fn future_epoch_is_rejected() {
        let wall = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
        let err = SystemClock::with_epoch(wall + Duration::from_secs(60)).unwrap_err();
        assert_eq!(err, Error::EpochInFuture);
    }
}
