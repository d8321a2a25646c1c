use core::{future::Future, pin::Pin, time::Duration};

use crate::futures::SleepProvider;

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for services built on Tokio.
pub struct TokioSleep;
impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// Yields to the scheduler instead of arming a timer. Under low concurrency
/// this reacts faster. Under heavy load the extra rescheduling usually costs
/// more CPU than [`TokioSleep`].
///
/// Tolerated clock regressions still need real time to pass, so this provider
/// effectively busy-polls through them.
pub struct TokioYield;
impl SleepProvider for TokioYield {
    /// `yield_now()` returns a private future type.
    type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn sleep_for(_dur: Duration) -> Self::Sleep {
        Box::pin(tokio::task::yield_now())
    }
}
