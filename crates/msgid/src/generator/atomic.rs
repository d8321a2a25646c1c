use core::{cmp, marker::PhantomData};

use portable_atomic::{AtomicU64, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, GeneratorConfig, Poll, Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    generator::{block_on_poll, cold_clock_behind, cold_timestamp_overflow},
};

/// Marks "no ID issued yet". Every layout reserves the sign bit, so this value
/// is never a valid ID.
const UNSET: u64 = u64::MAX;

/// A lock-free Snowflake ID generator suitable for multi-threaded environments.
///
/// The last issued ID is stored in an [`AtomicU64`] and advanced with a single
/// compare-and-swap, so timestamp and sequence always change together.
///
/// ## Features
/// - ✅ Thread-safe
/// - ❌ Fair access (a caller may lose several races in a row)
///
/// ## Recommended When
/// - You're in a multi-threaded environment
/// - Fair access is sacrificed for higher throughput
///
/// ## See Also
/// - [`LockSnowflakeGenerator`]
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub struct AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<AtomicU64>,
    #[cfg(not(feature = "cache-padded"))]
    state: AtomicU64,
    node_id: u64,
    config: GeneratorConfig,
    time: T,
    _id: PhantomData<ID>,
}

impl<ID, T> AtomicSnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new [`AtomicSnowflakeGenerator`] for `node_id` with the
    /// default [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` does not fit in the
    /// layout's node field.
    ///
    /// # Example
    /// ```
    /// use msgid::{AtomicSnowflakeGenerator, MessageId, MonotonicClock};
    ///
    /// let generator = AtomicSnowflakeGenerator::<MessageId, _>::new(7, MonotonicClock::new()?)?;
    /// let a = generator.next_id()?;
    /// let b = generator.next_id()?;
    /// assert!(a < b);
    /// # Ok::<(), msgid::Error>(())
    /// ```
    pub fn new(node_id: u64, time: T) -> Result<Self> {
        Self::with_config(node_id, time, GeneratorConfig::default())
    }

    /// Creates a new [`AtomicSnowflakeGenerator`] with explicit wait bounds.
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
        Ok(Self::from_state(UNSET, node_id, config, time))
    }

    /// Creates a generator that behaves as if `last` was the most recently
    /// issued ID. The node ID is taken from `last`.
    pub fn from_last_id(last: ID, time: T, config: GeneratorConfig) -> Self {
        Self::from_state(last.to_raw(), last.node_id(), config, time)
    }

    fn from_state(raw: u64, node_id: u64, config: GeneratorConfig, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(AtomicU64::new(raw)),
            #[cfg(not(feature = "cache-padded"))]
            state: AtomicU64::new(raw),
            node_id,
            config,
            time,
            _id: PhantomData,
        }
    }

    /// Generates the next ID, blocking within the configured bounds.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::next_id`].
    pub fn next_id(&self) -> Result<ID> {
        block_on_poll(&self.config, || self.try_poll_id())
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Losing the compare-and-swap to a concurrent caller yields
    /// `Poll::Pending { yield_for: 0 }`, i.e. retry immediately.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::try_poll_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<ID>> {
        // Acquire pairs with the AcqRel swap below: the clock read that
        // produced `current_raw` happens-before ours, so a monotonic source
        // cannot read lower here.
        let current_raw = self.state.load(Ordering::Acquire);
        let now = self.time.current_millis();
        if now > ID::max_timestamp() {
            return Err(cold_timestamp_overflow::<ID>(now));
        }

        let next_id = if current_raw == UNSET {
            ID::from_components(now, self.node_id, 0)
        } else {
            let current_id = ID::from_raw(current_raw);
            let current_ts = current_id.timestamp();
            match now.cmp(&current_ts) {
                cmp::Ordering::Equal => {
                    if current_id.has_sequence_room() {
                        current_id.increment_sequence()
                    } else {
                        return Ok(Poll::Pending { yield_for: 1 });
                    }
                }
                cmp::Ordering::Greater => current_id.rollover_to_timestamp(now),
                cmp::Ordering::Less => return Err(cold_clock_behind(current_ts, now)),
            }
        };

        if self
            .state
            .compare_exchange(
                current_raw,
                next_id.to_raw(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
        {
            Ok(Poll::Ready { id: next_id })
        } else {
            // Another thread won the race
            Ok(Poll::Pending { yield_for: 0 })
        }
    }
}

impl<ID, T> SnowflakeGenerator<ID, T> for AtomicSnowflakeGenerator<ID, T>
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
