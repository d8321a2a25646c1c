use core::future::Future;

use crate::{
    Result, SnowflakeGenerator, SnowflakeId, TimeSource,
    futures::{SnowflakeGeneratorAsyncExt, TokioSleep},
};

/// Extension trait for asynchronously generating Snowflake IDs on the
/// [`tokio`](https://docs.rs/tokio) runtime.
///
/// Uses [`TokioSleep`] as the sleep provider so callers don't have to name
/// one.
pub trait SnowflakeGeneratorAsyncTokioExt<ID, T>
where
    ID: SnowflakeId,
    T: TimeSource,
{
    /// Returns a future that resolves to the next available Snowflake ID
    /// using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// The same errors as [`SnowflakeGenerator::next_id`].
    fn next_id_async(&self) -> impl Future<Output = Result<ID>> + Send;
}

impl<G, ID, T> SnowflakeGeneratorAsyncTokioExt<ID, T> for G
where
    G: SnowflakeGenerator<ID, T> + Sync,
    ID: SnowflakeId + Send,
    T: TimeSource,
{
    fn next_id_async(&self) -> impl Future<Output = Result<ID>> + Send {
        <Self as SnowflakeGeneratorAsyncExt<ID, T>>::try_next_id_async::<TokioSleep>(self)
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, vec::Vec};

    use futures::future::try_join_all;

    use super::*;
    use crate::{
        AtomicSnowflakeGenerator, LockSnowflakeGenerator, MessageId, MonotonicClock,
        futures::{SleepProvider, TokioYield},
    };

    const TOTAL_IDS: usize = 4096;
    const NUM_GENERATORS: u64 = 8;
    // Enough to hit several Pending cycles per generator.
    const IDS_PER_GENERATOR: usize = TOTAL_IDS * 8;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn atomic_can_call_next_id_async() {
        let generator: AtomicSnowflakeGenerator<MessageId, _> =
            AtomicSnowflakeGenerator::new(0, MonotonicClock::new().unwrap()).unwrap();
        let a = generator.next_id_async().await.unwrap();
        let b = SnowflakeGeneratorAsyncTokioExt::next_id_async(&generator)
            .await
            .unwrap();
        assert!(a < b);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn lock_can_call_next_id_async() {
        let generator: LockSnowflakeGenerator<MessageId, _> =
            LockSnowflakeGenerator::new(3, MonotonicClock::new().unwrap()).unwrap();
        let id = generator.next_id_async().await.unwrap();
        assert_eq!(id.node_id(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_lock_sleep() {
        many_unique_ids_explicit::<_, TokioSleep>(new_lock).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_lock_yield() {
        many_unique_ids_explicit::<_, TokioYield>(new_lock).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_atomic_sleep() {
        many_unique_ids_explicit::<_, TokioSleep>(new_atomic).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_atomic_yield() {
        many_unique_ids_explicit::<_, TokioYield>(new_atomic).await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn generates_many_unique_ids_atomic_shared() {
        // One generator behind an Arc, hammered from every task.
        let generator = std::sync::Arc::new(new_atomic(9, MonotonicClock::new().unwrap()));
        let tasks: Vec<_> = (0..NUM_GENERATORS)
            .map(|_| {
                let generator = std::sync::Arc::clone(&generator);
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(TOTAL_IDS);
                    for _ in 0..TOTAL_IDS {
                        ids.push(generator.next_id_async().await.unwrap());
                    }
                    ids
                })
            })
            .collect();

        validate_unique_ids(tasks, NUM_GENERATORS as usize * TOTAL_IDS).await;
    }

    fn new_lock(
        node_id: u64,
        clock: MonotonicClock,
    ) -> LockSnowflakeGenerator<MessageId, MonotonicClock> {
        LockSnowflakeGenerator::with_config(node_id, clock, generous()).unwrap()
    }

    fn new_atomic(
        node_id: u64,
        clock: MonotonicClock,
    ) -> AtomicSnowflakeGenerator<MessageId, MonotonicClock> {
        AtomicSnowflakeGenerator::with_config(node_id, clock, generous()).unwrap()
    }

    fn generous() -> crate::GeneratorConfig {
        crate::GeneratorConfig::default()
            .with_exhaustion_timeout(core::time::Duration::from_secs(5))
    }

    async fn many_unique_ids_explicit<G, S>(generator_fn: impl Fn(u64, MonotonicClock) -> G)
    where
        G: SnowflakeGenerator<MessageId, MonotonicClock> + Send + Sync + 'static,
        S: SleepProvider,
    {
        let clock = MonotonicClock::new().unwrap();
        let tasks: Vec<_> = (0..NUM_GENERATORS)
            .map(|node_id| generator_fn(node_id, clock.clone()))
            .map(|g| {
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(IDS_PER_GENERATOR);
                    for _ in 0..IDS_PER_GENERATOR {
                        let id = g.try_next_id_async::<S>().await.unwrap();
                        ids.push(id);
                    }
                    ids
                })
            })
            .collect();

        validate_unique_ids(tasks, NUM_GENERATORS as usize * IDS_PER_GENERATOR).await;
    }

    async fn validate_unique_ids(
        tasks: Vec<tokio::task::JoinHandle<Vec<MessageId>>>,
        expected_total: usize,
    ) {
        let all_ids: Vec<_> = try_join_all(tasks)
            .await
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(all_ids.len(), expected_total);

        let mut seen = HashSet::with_capacity(all_ids.len());
        for id in &all_ids {
            assert!(seen.insert(id), "duplicate id: {id:?}");
        }
    }
}
