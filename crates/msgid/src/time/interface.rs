use core::time::Duration;

/// Custom epoch: Wednesday, January 1, 2025 00:00:00 UTC
pub const CUSTOM_EPOCH: Duration = Duration::from_millis(1_735_689_600_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
///
/// ```
/// use msgid::{CUSTOM_EPOCH, SystemClock, TWITTER_EPOCH, TimeSource};
///
/// let custom = SystemClock::with_epoch(CUSTOM_EPOCH)?.current_millis();
/// let twitter = SystemClock::with_epoch(TWITTER_EPOCH)?.current_millis();
///
/// let gap = (CUSTOM_EPOCH - TWITTER_EPOCH).as_millis() as u64;
/// assert!(twitter >= custom + gap);
/// # Ok::<(), msgid::Error>(())
/// ```
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
///
/// ```
/// use msgid::{CUSTOM_EPOCH, DISCORD_EPOCH, MonotonicClock, TimeSource};
///
/// let clock = MonotonicClock::with_epoch(DISCORD_EPOCH)?;
/// let gap = (CUSTOM_EPOCH - DISCORD_EPOCH).as_millis() as u64;
/// assert!(clock.current_millis() > gap);
/// # Ok::<(), msgid::Error>(())
/// ```
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A trait for time sources that return a monotonic or wall-clock timestamp.
///
/// This abstraction allows you to plug in a real system clock, a monotonic
/// timer, or a mocked time source in tests. The unit is **milliseconds**
/// relative to the source's epoch.
///
/// # Example
///
/// ```
/// use msgid::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the configured epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
