use crate::SnowflakeId;

/// The outcome of a single, non-blocking generation attempt.
///
/// - [`Poll::Ready`] indicates a new ID was successfully generated.
/// - [`Poll::Pending`] means the generator cannot produce an ID right now and
///   the caller should back off for `yield_for` milliseconds (zero means
///   "retry immediately", e.g. after losing a compare-and-swap race).
///
/// Clock regressions are not a `Pending` state; they surface as
/// [`Error::ClockRegression`] so the caller's policy decides what happens.
///
/// [`Error::ClockRegression`]: crate::Error::ClockRegression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<ID: SnowflakeId> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: ID,
    },
    /// The sequence for the current tick is exhausted (or a concurrent caller
    /// won the race).
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
    },
}
