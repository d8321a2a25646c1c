use core::{future::Future, time::Duration};

/// Abstracts over how to sleep for a given [`Duration`] in async contexts.
///
/// Lets the async extension stay generic over the runtime.
pub trait SleepProvider {
    /// Required to be `Send` so generation futures can move across threads.
    type Sleep: Future<Output = ()> + Send;

    fn sleep_for(dur: Duration) -> Self::Sleep;
}
