use core::cmp::Ordering;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, GeneratorConfig, Poll, Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    generator::{Mutex, block_on_poll},
};

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last issued ID lives behind a single [`Mutex`], and the whole
/// read-clock / compare / update step happens while holding it, so concurrent
/// callers can never observe a partial update.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Fair access across threads
/// - ✅ Works with any [`SnowflakeId`] layout
///
/// ## See Also
/// - [`AtomicSnowflakeGenerator`]
///
/// [`AtomicSnowflakeGenerator`]: crate::AtomicSnowflakeGenerator
pub struct LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    // `None` until the first ID is issued.
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<Option<ID>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<Option<ID>>,
    node_id: u64,
    config: GeneratorConfig,
    time: T,
}

impl<ID, T> LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for `node_id` with the
    /// default [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` does not fit in the
    /// layout's node field.
    ///
    /// # Example
    /// ```
    /// use msgid::{LockSnowflakeGenerator, MessageId, MonotonicClock};
    ///
    /// let generator = LockSnowflakeGenerator::<MessageId, _>::new(1, MonotonicClock::new()?)?;
    /// let id = generator.next_id()?;
    /// assert_eq!(id.node_id(), 1);
    /// # Ok::<(), msgid::Error>(())
    /// ```
    pub fn new(node_id: u64, time: T) -> Result<Self> {
        Self::with_config(node_id, time, GeneratorConfig::default())
    }

    /// Creates a new [`LockSnowflakeGenerator`] with explicit wait bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` does not fit in the
    /// layout's node field.
    pub fn with_config(node_id: u64, time: T, config: GeneratorConfig) -> Result<Self> {
        let max = ID::max_node_id();
        if node_id > max {
            return Err(Error::InvalidNodeId { node_id, max });
        }
        Ok(Self::from_state(None, node_id, config, time))
    }

    /// Creates a generator that behaves as if `last` was the most recently
    /// issued ID, e.g. to resume from a persisted high-water mark.
    ///
    /// The node ID is taken from `last`.
    pub fn from_last_id(last: ID, time: T, config: GeneratorConfig) -> Self {
        Self::from_state(Some(last), last.node_id(), config, time)
    }

    fn from_state(last: Option<ID>, node_id: u64, config: GeneratorConfig, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(Mutex::new(last)),
            #[cfg(not(feature = "cache-padded"))]
            state: Mutex::new(last),
            node_id,
            config,
            time,
        }
    }

    /// Generates the next ID, blocking within the configured bounds.
    ///
    /// See [`SnowflakeGenerator::next_id`].
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::next_id`].
    pub fn next_id(&self) -> Result<ID> {
        block_on_poll(&self.config, || self.try_poll_id())
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: a new ID is available
    /// - `Ok(Poll::Pending { yield_for })`: the sequence is exhausted for this
    ///   millisecond
    /// - `Err(e)`: the clock regressed or overflowed, or the lock was poisoned
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        let mut state = {
            #[cfg(feature = "parking-lot")]
            {
                self.state.lock()
            }
            #[cfg(not(feature = "parking-lot"))]
            {
                self.state.lock()?
            }
        };

        // Sampled under the lock so a caller that queued behind a newer
        // timestamp never mistakes its stale reading for a regression.
        let now = self.time.current_millis();
        if now > ID::max_timestamp() {
            return Err(cold_timestamp_overflow::<ID>(now));
        }

        let next = match *state {
            None => ID::from_components(now, self.node_id, 0),
            Some(last) => match now.cmp(&last.timestamp()) {
                Ordering::Equal => {
                    if last.has_sequence_room() {
                        last.increment_sequence()
                    } else {
                        return Ok(Poll::Pending { yield_for: 1 });
                    }
                }
                Ordering::Greater => last.rollover_to_timestamp(now),
                Ordering::Less => return Err(cold_clock_behind(last.timestamp(), now)),
            },
        };

        *state = Some(next);
        Ok(Poll::Ready { id: next })
    }
}

impl<ID, T> SnowflakeGenerator<ID, T> for LockSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    fn with_config(node_id: u64, time: T, config: GeneratorConfig) -> Result<Self> {
        Self::with_config(node_id, time, config)
    }

    fn node_id(&self) -> u64 {
        self.node_id
    }

    fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn try_poll_id(&self) -> Result<Poll<ID>> {
        self.try_poll_id()
    }

    fn next_id(&self) -> Result<ID> {
        self.next_id()
    }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_clock_behind(last: u64, now: u64) -> Error {
    debug_assert!(now < last);
    Error::ClockRegression { last, now }
}

#[cold]
#[inline(never)]
pub(crate) fn cold_timestamp_overflow<ID: SnowflakeId>(now: u64) -> Error {
    Error::TimestampOverflow {
        now,
        max: ID::max_timestamp(),
    }
}
