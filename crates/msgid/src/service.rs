use core::marker::PhantomData;

use crate::{Result, SnowflakeGenerator, SnowflakeId, TimeSource};

/// Message ID service: one generator, IDs rendered as base-10 strings.
///
/// This is the boundary transports talk to. It adds no retries; every
/// generator error reaches the caller unchanged.
///
/// # Example
///
/// ```
/// use msgid::{IdService, LockSnowflakeGenerator, MessageId, MonotonicClock};
///
/// let generator = LockSnowflakeGenerator::<MessageId, _>::new(1, MonotonicClock::new()?)?;
/// let service = IdService::new(generator);
///
/// let id: MessageId = service.get_id()?.parse()?;
/// assert_eq!(id.node_id(), 1);
/// # Ok::<(), msgid::Error>(())
/// ```
pub struct IdService<G, ID, T>
where
    G: SnowflakeGenerator<ID, T>,
    ID: SnowflakeId,
    T: TimeSource,
{
    generator: G,
    _marker: PhantomData<fn() -> (ID, T)>,
}

impl<G, ID, T> IdService<G, ID, T>
where
    G: SnowflakeGenerator<ID, T>,
    ID: SnowflakeId,
    T: TimeSource,
{
    pub const fn new(generator: G) -> Self {
        Self {
            generator,
            _marker: PhantomData,
        }
    }

    pub const fn generator(&self) -> &G {
        &self.generator
    }

    /// Returns the next ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Anything [`SnowflakeGenerator::next_id`] returns.
    pub fn get_id(&self) -> Result<String> {
        self.generator.next_id().map(|id| id.to_string())
    }

    /// Async counterpart of [`IdService::get_id`], sleeping on the Tokio
    /// timer instead of blocking the worker thread.
    ///
    /// # Errors
    ///
    /// Anything [`SnowflakeGenerator::next_id`] returns.
    #[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
    #[cfg(feature = "async-tokio")]
    pub async fn get_id_async(&self) -> Result<String>
    where
        G: Sync,
        ID: Send,
    {
        use crate::SnowflakeGeneratorAsyncTokioExt;

        self.generator
            .next_id_async()
            .await
            .map(|id| id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, LockSnowflakeGenerator, MessageId};

    struct FixedTime(u64);

    impl TimeSource for FixedTime {
        fn current_millis(&self) -> u64 {
            self.0
        }
    }

    struct BackwardsTime(std::sync::atomic::AtomicU64);

    impl TimeSource for BackwardsTime {
        fn current_millis(&self) -> u64 {
            self.0.fetch_sub(1, std::sync::atomic::Ordering::Relaxed)
        }
    }

    #[test]
    fn get_id_renders_decimal() {
        let generator: LockSnowflakeGenerator<MessageId, _> =
            LockSnowflakeGenerator::new(1, FixedTime(5)).unwrap();
        let service = IdService::new(generator);

        let first = service.get_id().unwrap();
        let second = service.get_id().unwrap();

        assert_eq!(first, ((5u64 << 22) | (1 << 12)).to_string());
        assert!(first.bytes().all(|b| b.is_ascii_digit()));

        let first: MessageId = first.parse().unwrap();
        let second: MessageId = second.parse().unwrap();
        assert_eq!(first.node_id(), 1);
        assert_eq!(second.sequence(), 1);
        assert!(second > first);
    }

    #[test]
    fn get_id_propagates_errors_unchanged() {
        let generator: LockSnowflakeGenerator<MessageId, _> =
            LockSnowflakeGenerator::new(1, BackwardsTime(100.into())).unwrap();
        let service = IdService::new(generator);

        service.get_id().unwrap();
        assert_eq!(
            service.get_id().unwrap_err(),
            Error::ClockRegression { last: 100, now: 99 }
        );
        assert_eq!(service.generator().node_id(), 1);
    }

    #[cfg(feature = "async-tokio")]
    #[tokio::test]
    async fn get_id_async_matches_blocking_format() {
        let generator: LockSnowflakeGenerator<MessageId, _> =
            LockSnowflakeGenerator::new(2, FixedTime(9)).unwrap();
        let service = IdService::new(generator);

        let id: MessageId = service.get_id_async().await.unwrap().parse().unwrap();
        assert_eq!(id.timestamp(), 9);
        assert_eq!(id.node_id(), 2);

        let next = service.get_id().unwrap().parse::<MessageId>().unwrap();
        assert!(next > id);
    }
}
