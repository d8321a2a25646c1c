use crate::{GeneratorConfig, Poll, Result, SnowflakeId, TimeSource, generator::block_on_poll};

/// A minimal interface for generating Snowflake IDs.
///
/// Implementors own their state exclusively, so every instance can be
/// constructed and tested in isolation with an injected [`TimeSource`].
pub trait SnowflakeGenerator<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Creates a new generator with the default [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` exceeds
    /// [`SnowflakeId::max_node_id`].
    ///
    /// [`Error::InvalidNodeId`]: crate::Error::InvalidNodeId
    fn new(node_id: u64, time: T) -> Result<Self>
    where
        Self: Sized,
    {
        Self::with_config(node_id, time, GeneratorConfig::default())
    }

    /// Creates a new generator with an explicit [`GeneratorConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNodeId`] if `node_id` exceeds
    /// [`SnowflakeId::max_node_id`].
    ///
    /// [`Error::InvalidNodeId`]: crate::Error::InvalidNodeId
    fn with_config(node_id: u64, time: T, config: GeneratorConfig) -> Result<Self>
    where
        Self: Sized;

    /// The node identifier encoded into every ID.
    fn node_id(&self) -> u64;

    /// The wait bounds applied by [`SnowflakeGenerator::next_id`].
    fn config(&self) -> &GeneratorConfig;

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   issued timestamp.
    /// - [`Error::TimestampOverflow`] if the clock is past the layout's range.
    /// - [`Error::LockPoisoned`] if a lock-based implementation's mutex is
    ///   poisoned.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::TimestampOverflow`]: crate::Error::TimestampOverflow
    /// [`Error::LockPoisoned`]: crate::Error::LockPoisoned
    fn try_poll_id(&self) -> Result<Poll<ID>>;

    /// Generates the next ID, waiting within the bounds of
    /// [`SnowflakeGenerator::config`].
    ///
    /// The returned ID is strictly greater than every ID previously returned
    /// by this instance.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockRegression`] under
    ///   [`ClockRegressionPolicy::FailFast`], or when the wait budget is
    ///   exceeded.
    /// - [`Error::SequenceExhausted`] if the clock does not advance within
    ///   [`GeneratorConfig::exhaustion_timeout`].
    /// - Anything [`SnowflakeGenerator::try_poll_id`] returns.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    /// [`Error::SequenceExhausted`]: crate::Error::SequenceExhausted
    /// [`ClockRegressionPolicy::FailFast`]: crate::ClockRegressionPolicy::FailFast
    fn next_id(&self) -> Result<ID> {
        block_on_poll(self.config(), || self.try_poll_id())
    }
}
