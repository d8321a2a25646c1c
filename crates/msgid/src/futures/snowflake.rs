use core::future::Future;

use super::SleepProvider;
use crate::{Poll, Result, SnowflakeGenerator, SnowflakeId, TimeSource, generator::Backoff};

/// Extension trait for asynchronously generating Snowflake IDs.
///
/// Applies the generator's [`GeneratorConfig`] exactly as the blocking
/// [`SnowflakeGenerator::next_id`] does, but awaits a [`SleepProvider`]
/// instead of blocking the thread.
///
/// [`GeneratorConfig`]: crate::GeneratorConfig
pub trait SnowflakeGeneratorAsyncExt<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Returns a future that resolves to the next available Snowflake ID.
    ///
    /// If the generator is not ready to issue a new ID immediately, the future
    /// sleeps for the amount of time indicated by the generator and retries.
    ///
    /// # Errors
    ///
    /// The same errors as [`SnowflakeGenerator::next_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>> + Send
    where
        S: SleepProvider;
}

impl<G, ID, T> SnowflakeGeneratorAsyncExt<ID, T> for G
where
    G: SnowflakeGenerator<ID, T> + Sync,
    ID: SnowflakeId + Send,
    T: TimeSource,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<ID>> + Send
    where
        S: SleepProvider,
    {
        async move {
            let mut backoff = Backoff::new(self.config());
            loop {
                let dur = match self.try_poll_id() {
                    Ok(Poll::Ready { id }) => return Ok(id),
                    Ok(Poll::Pending { yield_for }) => backoff.on_pending(yield_for)?,
                    Err(err) => backoff.on_error(err)?,
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
