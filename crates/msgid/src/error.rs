use core::time::Duration;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `msgid` can emit.
///
/// Every variant is returned to the immediate caller. Nothing inside the
/// generators logs an error and carries on.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node identifier does not fit in the layout's node field.
    ///
    /// Only raised at construction. A process must not serve traffic with an
    /// invalid node identifier, so this is never retried.
    #[error("invalid node id {node_id}: must be in [0, {max}]")]
    InvalidNodeId { node_id: u64, max: u64 },

    /// The clock reported a time earlier than the last issued timestamp
    /// (NTP step, VM migration, ...).
    #[error("clock moved backwards: last issued at {last}ms, clock reads {now}ms")]
    ClockRegression { last: u64, now: u64 },

    /// Every sequence value for the current millisecond was used and the
    /// clock did not advance within the configured bound.
    #[error("sequence exhausted: clock did not advance within {timeout:?}")]
    SequenceExhausted { timeout: Duration },

    /// The clock is past the largest timestamp the layout can encode.
    #[error("timestamp {now}ms exceeds the layout maximum of {max}ms")]
    TimestampOverflow { now: u64, max: u64 },

    /// A clock was constructed with an epoch later than the current time.
    #[error("epoch is in the future")]
    EpochInFuture,

    /// The operation failed because the lock was **poisoned**.
    ///
    /// This occurs when a thread panics while holding the lock. When the
    /// `parking-lot` feature is enabled, mutexes do **not** poison, so this
    /// variant is never produced.
    #[error("generator lock poisoned")]
    LockPoisoned,

    /// A string could not be parsed as an ID.
    #[error("invalid id: {0}")]
    InvalidId(core::num::ParseIntError),
}

impl Error {
    /// Returns `true` when the failure resolves itself as time advances.
    ///
    /// Callers should back off before retrying a [`Error::ClockRegression`];
    /// a [`Error::SequenceExhausted`] can be retried after a short delay.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ClockRegression { .. } | Self::SequenceExhausted { .. }
        )
    }
}

#[cfg(not(feature = "parking-lot"))]
use std::sync::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
