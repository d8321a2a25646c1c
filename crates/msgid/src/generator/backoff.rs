use core::time::Duration;
use std::time::Instant;

use crate::{ClockRegressionPolicy, Error, GeneratorConfig, Poll, Result, SnowflakeId};

/// Tracks the time budget of one blocking generation call.
///
/// Shared by the blocking driver ([`block_on_poll`]) and the async extension so
/// both apply the same [`GeneratorConfig`].
pub(crate) struct Backoff<'a> {
    config: &'a GeneratorConfig,
    /// Start of the call; bounds the regression wait.
    started: Instant,
    /// Start of the current exhaustion spin; bounds `exhaustion_timeout`.
    exhausted_since: Option<Instant>,
}

impl<'a> Backoff<'a> {
    pub(crate) fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            started: Instant::now(),
            exhausted_since: None,
        }
    }

    /// Handles [`Poll::Pending`]: how long to back off, or
    /// [`Error::SequenceExhausted`] once the exhaustion spin has lasted
    /// `exhaustion_timeout`.
    ///
    /// `yield_for == 0` is a lost race against another caller, not
    /// exhaustion, and is never charged to the exhaustion budget.
    pub(crate) fn on_pending(&mut self, yield_for: u64) -> Result<Duration> {
        if yield_for == 0 {
            return Ok(Duration::ZERO);
        }

        let timeout = self.config.exhaustion_timeout;
        let since = *self.exhausted_since.get_or_insert_with(Instant::now);
        if since.elapsed() >= timeout {
            #[cfg(feature = "tracing")]
            tracing::warn!(?timeout, "sequence exhausted and clock did not advance");
            return Err(Error::SequenceExhausted { timeout });
        }
        Ok(Duration::from_millis(yield_for))
    }

    /// Handles an error from a poll: how long to sleep before retrying, or the
    /// error to hand back to the caller.
    pub(crate) fn on_error(&mut self, err: Error) -> Result<Duration> {
        let Error::ClockRegression { last, now } = err else {
            return Err(err);
        };
        self.exhausted_since = None;

        #[cfg(feature = "tracing")]
        tracing::warn!(last, now, policy = ?self.config.regression_policy, "clock regression");

        match self.config.regression_policy {
            ClockRegressionPolicy::FailFast => Err(err),
            ClockRegressionPolicy::Wait { max } => {
                let behind = Duration::from_millis(last - now);
                let remaining = max.saturating_sub(self.started.elapsed());
                if behind > remaining {
                    Err(err)
                } else {
                    Ok(behind)
                }
            }
        }
    }
}

/// Repeatedly polls until an ID is ready, spinning through sequence exhaustion
/// and sleeping through tolerated clock regressions.
pub(crate) fn block_on_poll<ID>(
    config: &GeneratorConfig,
    mut poll: impl FnMut() -> Result<Poll<ID>>,
) -> Result<ID>
where
    ID: SnowflakeId,
{
    let mut backoff = Backoff::new(config);
    loop {
        match poll() {
            Ok(Poll::Ready { id }) => return Ok(id),
            Ok(Poll::Pending { yield_for }) => {
                if backoff.on_pending(yield_for)?.is_zero() {
                    core::hint::spin_loop();
                } else {
                    std::thread::yield_now();
                }
            }
            Err(err) => std::thread::sleep(backoff.on_error(err)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_fast_returns_regression_immediately() {
        let config = GeneratorConfig::default();
        let mut backoff = Backoff::new(&config);
        let err = Error::ClockRegression { last: 10, now: 9 };
        assert_eq!(backoff.on_error(err.clone()), Err(err));
    }

    #[test]
    fn wait_sleeps_for_the_regression_distance() {
        let config = GeneratorConfig::default().with_regression_policy(
            ClockRegressionPolicy::Wait {
                max: Duration::from_secs(10),
            },
        );
        let mut backoff = Backoff::new(&config);
        let err = Error::ClockRegression { last: 10, now: 7 };
        assert_eq!(backoff.on_error(err), Ok(Duration::from_millis(3)));
    }

    #[test]
    fn wait_gives_up_when_the_gap_exceeds_the_budget() {
        let config = GeneratorConfig::default().with_regression_policy(
            ClockRegressionPolicy::Wait {
                max: Duration::from_millis(5),
            },
        );
        let mut backoff = Backoff::new(&config);
        let err = Error::ClockRegression {
            last: 60_000,
            now: 0,
        };
        assert_eq!(backoff.on_error(err.clone()), Err(err));
    }

    #[test]
    fn other_errors_pass_through() {
        let config = GeneratorConfig::default();
        let mut backoff = Backoff::new(&config);
        assert_eq!(
            backoff.on_error(Error::LockPoisoned),
            Err(Error::LockPoisoned)
        );
    }

    #[test]
    fn pending_times_out_into_sequence_exhausted() {
        let timeout = Duration::from_millis(2);
        let config = GeneratorConfig::default().with_exhaustion_timeout(timeout);
        let mut backoff = Backoff::new(&config);
        assert_eq!(backoff.on_pending(1), Ok(Duration::from_millis(1)));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            backoff.on_pending(1),
            Err(Error::SequenceExhausted { timeout })
        );
    }

    #[test]
    fn regression_wait_does_not_count_toward_exhaustion() {
        let timeout = Duration::from_millis(5);
        let config = GeneratorConfig::default()
            .with_exhaustion_timeout(timeout)
            .with_regression_policy(ClockRegressionPolicy::Wait {
                max: Duration::from_secs(1),
            });
        let mut backoff = Backoff::new(&config);

        let wait = backoff
            .on_error(Error::ClockRegression { last: 10, now: 0 })
            .unwrap();
        std::thread::sleep(wait);

        assert_eq!(backoff.on_pending(1), Ok(Duration::from_millis(1)));
    }

    #[test]
    fn lost_races_never_exhaust() {
        let config = GeneratorConfig::default().with_exhaustion_timeout(Duration::ZERO);
        let mut backoff = Backoff::new(&config);
        for _ in 0..100 {
            assert_eq!(backoff.on_pending(0), Ok(Duration::ZERO));
        }
    }
}
