use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

use crate::{CUSTOM_EPOCH, Error, Result, TimeSource};

/// Shared ticker thread that updates every millisecond.
#[derive(Debug)]
struct SharedTickerInner {
    current: AtomicU64,
    _handle: OnceLock<JoinHandle<()>>,
}

/// A monotonic time source that returns elapsed time since construction,
/// offset from a user-defined epoch.
///
/// The wall clock is read exactly once, at construction, to align the origin.
/// After that a background thread advances a shared counter from
/// [`Instant`], so NTP steps or VM migrations never make this clock go
/// backward within the process.
///
/// Clones share the same ticker thread. The thread exits once the last clone
/// is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    inner: Arc<SharedTickerInner>,
    epoch_offset: u64, // in milliseconds
}

impl MonotonicClock {
    /// Constructs a monotonic clock aligned to [`CUSTOM_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if the system time is earlier than the
    /// epoch.
    pub fn new() -> Result<Self> {
        Self::with_epoch(CUSTOM_EPOCH)
    }

    /// Constructs a monotonic clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin (t = 0).
    ///
    /// # Errors
    ///
    /// Returns [`Error::EpochInFuture`] if the system time is earlier than the
    /// epoch.
    ///
    /// # Example
    ///
    /// ```
    /// use msgid::{MonotonicClock, TimeSource, CUSTOM_EPOCH};
    ///
    /// let clock = MonotonicClock::with_epoch(CUSTOM_EPOCH).unwrap();
    /// let before = clock.current_millis();
    /// std::thread::sleep(std::time::Duration::from_millis(5));
    ///
    /// // Sleep accuracy varies, but the value never goes backward.
    /// assert!(clock.current_millis() >= before);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Result<Self> {
        let start = Instant::now();
        let system_now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| Error::EpochInFuture)?;
        let offset = system_now
            .checked_sub(epoch)
            .ok_or(Error::EpochInFuture)?
            .as_millis() as u64;

        let inner = Arc::new(SharedTickerInner {
            current: AtomicU64::new(0),
            _handle: OnceLock::new(),
        });

        let weak_inner = Arc::downgrade(&inner);
        let handle = thread::spawn(move || {
            let mut tick = 0;

            loop {
                let Some(inner_ref) = weak_inner.upgrade() else {
                    break;
                };

                // Absolute target time of the next tick
                let target = start + Duration::from_millis(tick);

                let now = Instant::now();
                if now < target {
                    thread::sleep(target - now);
                }

                let now_ms = start.elapsed().as_millis() as u64;
                inner_ref.current.store(now_ms, Ordering::Relaxed);

                // Align to the next tick after the actual time
                tick = now_ms + 1;
            }
        });

        let _ = inner._handle.set(handle);

        Ok(Self {
            inner,
            epoch_offset: offset,
        })
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the number of milliseconds since the configured epoch, based on
    /// the elapsed monotonic time since construction.
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.inner.current.load(Ordering::Relaxed)
    }
}
