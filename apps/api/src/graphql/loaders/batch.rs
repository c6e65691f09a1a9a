//! Request-scoped batching loader
//!
//! A [`BatchLoader`] coalesces single-key lookups issued from many resolver
//! branches into as few calls to a [`BatchFn`] as possible:
//!
//! - The first key on an empty loader opens a batch and starts its window.
//!   Keys arriving before the window fires join that batch.
//! - A batch that reaches `max_batch` distinct keys flushes at once and the
//!   next key opens a fresh batch.
//! - A key that is already pending or in flight never opens a second fetch.
//!   Its caller just waits on the running one.
//! - Resolved keys are cached for the lifetime of the loader. Per-key errors
//!   are cached too; whole-batch failures are not, so a later load retries.
//!
//! All mutable state sits behind one mutex that is never held across an
//! `.await`. Fetches run on spawned tasks, so a caller that goes away does not
//! strand the other callers sharing its batch.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use tokio::sync::oneshot;
use tracing::Instrument;

use crate::error::{ApiError, ApiResult};

/// Outcome for one key of a batch
pub type KeyResult<V> = ApiResult<V>;

/// A batched fetch over distinct keys
///
/// The returned vector must have exactly one entry per key, in key order.
/// Returning `Err` marks the whole batch as failed.
pub trait BatchFn: Send + Sync + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    type Value: Clone + Send + Sync + 'static;

    fn fetch(
        &self,
        keys: &[Self::Key],
    ) -> impl Future<Output = ApiResult<Vec<KeyResult<Self::Value>>>> + Send;
}

/// Batch window and size for one loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// How long the first key of a batch waits for company
    pub wait: Duration,
    /// Distinct keys that force an immediate flush
    pub max_batch: usize,
}

impl BatchConfig {
    pub fn new(wait: Duration, max_batch: usize) -> Self {
        Self {
            wait,
            max_batch: max_batch.max(1),
        }
    }
}

type Waiter<V> = oneshot::Sender<KeyResult<V>>;

struct PendingBatch<K> {
    id: u64,
    keys: Vec<K>,
}

struct LoaderState<K, V> {
    cache: HashMap<K, KeyResult<V>>,
    /// Callers of every key that is pending or in flight
    waiters: HashMap<K, Vec<Waiter<V>>>,
    pending: Option<PendingBatch<K>>,
    next_batch_id: u64,
}

impl<K, V> LoaderState<K, V> {
    fn new() -> Self {
        Self {
            cache: HashMap::new(),
            waiters: HashMap::new(),
            pending: None,
            next_batch_id: 0,
        }
    }
}

struct Inner<F: BatchFn> {
    key_space: &'static str,
    fetcher: F,
    config: BatchConfig,
    state: Mutex<LoaderState<F::Key, F::Value>>,
}

impl<F: BatchFn> Inner<F> {
    fn lock(&self) -> MutexGuard<'_, LoaderState<F::Key, F::Value>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

enum Enqueued<V> {
    Ready(KeyResult<V>),
    Waiting(oneshot::Receiver<KeyResult<V>>),
}

/// Releases the waiters of a batch whose flush never completed
struct AbandonGuard<'a, F: BatchFn> {
    inner: &'a Inner<F>,
    keys: &'a [F::Key],
    armed: bool,
}

impl<F: BatchFn> AbandonGuard<'_, F> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<F: BatchFn> Drop for AbandonGuard<'_, F> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!(
            key_space = self.inner.key_space,
            batch_size = self.keys.len(),
            "Loader batch abandoned before completion"
        );
        let mut state = self.inner.lock();
        for key in self.keys {
            state.waiters.remove(key);
        }
    }
}

/// Coalescing, caching loader for one key space
pub struct BatchLoader<F: BatchFn> {
    inner: Arc<Inner<F>>,
}

impl<F: BatchFn> Clone for BatchLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BatchFn> BatchLoader<F> {
    /// Create a loader named `key_space` over `fetcher`
    pub fn new(key_space: &'static str, fetcher: F, config: BatchConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                key_space,
                fetcher,
                config,
                state: Mutex::new(LoaderState::new()),
            }),
        }
    }

    /// Name used in logs
    pub fn key_space(&self) -> &'static str {
        self.inner.key_space
    }

    /// Batch window and size
    pub fn config(&self) -> BatchConfig {
        self.inner.config
    }

    /// Load one key, joining the current batch when possible
    pub async fn load(&self, key: F::Key) -> KeyResult<F::Value> {
        let receiver = match self.enqueue(key.clone()) {
            Enqueued::Ready(result) => return result,
            Enqueued::Waiting(receiver) => receiver,
        };

        receiver.await.unwrap_or_else(|_| {
            Err(ApiError::Internal(format!(
                "{} loader dropped key {:?} before it resolved",
                self.inner.key_space, key
            )))
        })
    }

    /// Load several keys; results come back in the order given
    pub async fn load_many<I>(&self, keys: I) -> Vec<KeyResult<F::Value>>
    where
        I: IntoIterator<Item = F::Key>,
    {
        join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Seed the cache with a known value
    ///
    /// Returns `false` and leaves the loader untouched when the key is already
    /// cached, pending or in flight.
    pub fn prime(&self, key: F::Key, value: F::Value) -> bool {
        let mut state = self.inner.lock();
        if state.cache.contains_key(&key) || state.waiters.contains_key(&key) {
            return false;
        }
        state.cache.insert(key, Ok(value));
        true
    }

    /// Drop a cached entry so the next load fetches it again
    pub fn clear(&self, key: &F::Key) -> bool {
        self.inner.lock().cache.remove(key).is_some()
    }

    /// Whether a result for `key` is cached
    pub fn is_cached(&self, key: &F::Key) -> bool {
        self.inner.lock().cache.contains_key(key)
    }

    fn enqueue(&self, key: F::Key) -> Enqueued<F::Value> {
        let mut guard = self.inner.lock();
        let state = &mut *guard;

        if let Some(hit) = state.cache.get(&key) {
            return Enqueued::Ready(hit.clone());
        }

        let (sender, receiver) = oneshot::channel();
        if let Some(waiters) = state.waiters.get_mut(&key) {
            waiters.push(sender);
            return Enqueued::Waiting(receiver);
        }
        state.waiters.insert(key.clone(), vec![sender]);

        // Open batches always carry an id below `next_batch_id`.
        let next_id = state.next_batch_id;
        let pending = state.pending.get_or_insert_with(|| PendingBatch {
            id: next_id,
            keys: Vec::new(),
        });
        let opened = pending.id == next_id;
        pending.keys.push(key);
        let full = pending.keys.len() >= self.inner.config.max_batch;

        if opened {
            state.next_batch_id += 1;
            self.spawn_window(next_id);
        }

        if full {
            if let Some(batch) = state.pending.take() {
                drop(guard);
                tracing::trace!(
                    key_space = self.inner.key_space,
                    batch_id = batch.id,
                    "Loader batch full, flushing early"
                );
                self.spawn_flush(batch);
            }
        }

        Enqueued::Waiting(receiver)
    }

    fn spawn_window(&self, batch_id: u64) {
        let loader = self.clone();
        tokio::spawn(
            async move {
                tokio::time::sleep(loader.inner.config.wait).await;
                let expired = {
                    let mut state = loader.inner.lock();
                    match state.pending.as_ref() {
                        Some(pending) if pending.id == batch_id => state.pending.take(),
                        _ => None,
                    }
                };
                if let Some(batch) = expired {
                    loader.flush(batch).await;
                }
            }
            .in_current_span(),
        );
    }

    fn spawn_flush(&self, batch: PendingBatch<F::Key>) {
        let loader = self.clone();
        tokio::spawn(async move { loader.flush(batch).await }.in_current_span());
    }

    async fn flush(&self, batch: PendingBatch<F::Key>) {
        let PendingBatch { id, keys } = batch;
        let key_space = self.inner.key_space;
        let batch_size = keys.len();
        let started = Instant::now();

        tracing::debug!(key_space, batch_id = id, batch_size, "Flushing loader batch");

        let guard = AbandonGuard {
            inner: &*self.inner,
            keys: &keys,
            armed: true,
        };
        let outcome = self.inner.fetcher.fetch(&keys).await;
        guard.disarm();

        let elapsed_ms = started.elapsed().as_millis() as u64;
        let (results, cacheable) = match outcome {
            Ok(values) if values.len() == batch_size => {
                tracing::debug!(key_space, batch_id = id, batch_size, elapsed_ms, "Loader batch resolved");
                (values, true)
            }
            Ok(values) => {
                let returned = values.len();
                tracing::error!(
                    key_space,
                    batch_id = id,
                    batch_size,
                    returned,
                    "Loader fetch returned a result count that does not match its keys"
                );
                let err = ApiError::Internal(format!(
                    "{} fetch returned {} results for {} keys",
                    key_space, returned, batch_size
                ));
                (vec![Err(err); batch_size], false)
            }
            Err(err) => {
                tracing::error!(
                    key_space,
                    batch_id = id,
                    batch_size,
                    elapsed_ms,
                    error = %err,
                    "Loader batch fetch failed"
                );
                (vec![Err(err); batch_size], false)
            }
        };

        let deliveries: Vec<_> = {
            let mut state = self.inner.lock();
            keys.into_iter()
                .zip(results)
                .map(|(key, result)| {
                    let waiters = state.waiters.remove(&key).unwrap_or_default();
                    if cacheable {
                        state.cache.insert(key, result.clone());
                    }
                    (waiters, result)
                })
                .collect()
        };

        for (waiters, result) in deliveries {
            for waiter in waiters {
                // A caller that stopped waiting is not an error.
                let _ = waiter.send(result.clone());
            }
        }
    }
}

impl<F: BatchFn> Debug for BatchLoader<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader")
            .field("key_space", &self.inner.key_space)
            .field("config", &self.inner.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_test::traced_test;

    /// Records each batch and answers `key * 10`, with key 0 absent
    #[derive(Clone, Default)]
    struct Recording {
        calls: Arc<Mutex<Vec<Vec<u64>>>>,
        delay: Duration,
    }

    impl Recording {
        fn slow(delay: Duration) -> Self {
            Self {
                delay,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Vec<u64>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl BatchFn for Recording {
        type Key = u64;
        type Value = Option<u64>;

        async fn fetch(&self, keys: &[u64]) -> ApiResult<Vec<KeyResult<Option<u64>>>> {
            self.calls.lock().unwrap().push(keys.to_vec());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(keys
                .iter()
                .map(|&k| Ok(if k == 0 { None } else { Some(k * 10) }))
                .collect())
        }
    }

    /// Fails the first call for the whole batch, then succeeds
    #[derive(Clone, Default)]
    struct FailsOnce {
        calls: Arc<AtomicUsize>,
    }

    impl BatchFn for FailsOnce {
        type Key = u64;
        type Value = u64;

        async fn fetch(&self, keys: &[u64]) -> ApiResult<Vec<KeyResult<u64>>> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                return Err(ApiError::Upstream("connection reset".to_string()));
            }
            Ok(keys.iter().map(|&k| Ok(k + 1)).collect())
        }
    }

    /// Returns one result too few
    struct ShortAnswer;

    impl BatchFn for ShortAnswer {
        type Key = u64;
        type Value = u64;

        async fn fetch(&self, keys: &[u64]) -> ApiResult<Vec<KeyResult<u64>>> {
            Ok(keys.iter().skip(1).map(|&k| Ok(k)).collect())
        }
    }

    /// Per-key error for odd keys
    #[derive(Clone, Default)]
    struct OddKeysMissing {
        calls: Arc<AtomicUsize>,
    }

    impl BatchFn for OddKeysMissing {
        type Key = u64;
        type Value = u64;

        async fn fetch(&self, keys: &[u64]) -> ApiResult<Vec<KeyResult<u64>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(keys
                .iter()
                .map(|&k| {
                    if k % 2 == 1 {
                        Err(ApiError::not_found("thing", k))
                    } else {
                        Ok(k)
                    }
                })
                .collect())
        }
    }

    fn config(wait_ms: u64, max_batch: usize) -> BatchConfig {
        BatchConfig::new(Duration::from_millis(wait_ms), max_batch)
    }

    #[tokio::test]
    async fn test_concurrent_loads_share_one_fetch() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(5, 100));

        let (a, b, c, d) = tokio::join!(
            loader.load(1),
            loader.load(2),
            loader.load(1),
            loader.load(3)
        );

        assert_eq!(fetcher.calls(), vec![vec![1, 2, 3]]);
        assert_eq!(a.unwrap(), Some(10));
        assert_eq!(b.unwrap(), Some(20));
        assert_eq!(c.unwrap(), Some(10));
        assert_eq!(d.unwrap(), Some(30));
    }

    #[tokio::test]
    async fn test_resolved_key_is_served_from_cache() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(1, 100));

        assert_eq!(loader.load(4).await.unwrap(), Some(40));
        assert!(loader.is_cached(&4));
        assert_eq!(loader.load(4).await.unwrap(), Some(40));

        assert_eq!(fetcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_absent_key_is_not_an_error() {
        let loader = BatchLoader::new("test", Recording::default(), config(1, 100));
        assert_eq!(loader.load(0).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_full_batch_flushes_without_waiting_for_window() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(60_000, 2));

        let both = tokio::time::timeout(Duration::from_secs(2), async {
            tokio::join!(loader.load(1), loader.load(2))
        })
        .await
        .expect("full batch should not wait out the window");

        assert_eq!(both.0.unwrap(), Some(10));
        assert_eq!(both.1.unwrap(), Some(20));
        assert_eq!(fetcher.calls(), vec![vec![1, 2]]);
    }

    #[tokio::test]
    async fn test_overflow_starts_a_new_batch() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(10, 2));

        let results = loader.load_many(vec![1, 2, 3]).await;

        assert_eq!(
            results.into_iter().map(Result::unwrap).collect::<Vec<_>>(),
            vec![Some(10), Some(20), Some(30)]
        );
        assert_eq!(fetcher.calls(), vec![vec![1, 2], vec![3]]);
    }

    #[tokio::test]
    async fn test_duplicate_keys_do_not_count_toward_batch_size() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(10, 2));

        let results = loader.load_many(vec![7, 7, 7, 8]).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(fetcher.calls(), vec![vec![7, 8]]);
    }

    #[tokio::test]
    async fn test_keys_after_window_fired_open_new_batch() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(1, 100));

        loader.load(1).await.unwrap();
        loader.load(2).await.unwrap();

        assert_eq!(fetcher.calls(), vec![vec![1], vec![2]]);
    }

    #[tokio::test]
    async fn test_in_flight_key_is_not_fetched_twice() {
        let fetcher = Recording::slow(Duration::from_millis(100));
        let loader = BatchLoader::new("test", fetcher.clone(), config(1, 100));

        let first = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load(5).await }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        let second = loader.load(5).await;

        assert_eq!(first.await.unwrap().unwrap(), Some(50));
        assert_eq!(second.unwrap(), Some(50));
        assert_eq!(fetcher.calls(), vec![vec![5]]);
    }

    #[tokio::test]
    async fn test_batch_failure_is_broadcast_and_not_cached() {
        let fetcher = FailsOnce::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(5, 100));

        let (a, b) = tokio::join!(loader.load(1), loader.load(2));
        assert_matches!(a, Err(ApiError::Upstream(ref msg)) if msg == "connection reset");
        assert_matches!(b, Err(ApiError::Upstream(_)));
        assert!(!loader.is_cached(&1));

        assert_eq!(loader.load(1).await.unwrap(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_result_count_mismatch_is_internal_error() {
        let loader = BatchLoader::new("test", ShortAnswer, config(5, 100));

        let (a, b) = tokio::join!(loader.load(1), loader.load(2));

        assert_matches!(a, Err(ApiError::Internal(_)));
        assert_matches!(b, Err(ApiError::Internal(_)));
        assert!(!loader.is_cached(&1));
    }

    #[tokio::test]
    async fn test_per_key_errors_are_cached() {
        let fetcher = OddKeysMissing::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(1, 100));

        let (odd, even) = tokio::join!(loader.load(3), loader.load(4));
        assert_matches!(odd, Err(ApiError::NotFound { .. }));
        assert_eq!(even.unwrap(), 4);

        assert_matches!(loader.load(3).await, Err(ApiError::NotFound { .. }));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancelled_caller_does_not_cancel_flush() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(20, 100));

        let abandoned = tokio::time::timeout(Duration::from_millis(1), loader.load(9)).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(loader.is_cached(&9));
        assert_eq!(loader.load(9).await.unwrap(), Some(90));
        assert_eq!(fetcher.calls(), vec![vec![9]]);
    }

    #[tokio::test]
    async fn test_prime_and_clear() {
        let fetcher = Recording::default();
        let loader = BatchLoader::new("test", fetcher.clone(), config(1, 100));

        assert!(loader.prime(1, Some(111)));
        assert!(!loader.prime(1, Some(222)));
        assert_eq!(loader.load(1).await.unwrap(), Some(111));
        assert!(fetcher.calls().is_empty());

        assert!(loader.clear(&1));
        assert_eq!(loader.load(1).await.unwrap(), Some(10));
        assert_eq!(fetcher.calls(), vec![vec![1]]);
    }

    #[tokio::test]
    async fn test_max_batch_is_at_least_one() {
        assert_eq!(config(1, 0).max_batch, 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_batch_failure_logs_key_space_and_size() {
        let loader = BatchLoader::new("users", FailsOnce::default(), config(1, 100));

        let (a, b) = tokio::join!(loader.load(1), loader.load(2));
        assert!(a.is_err() && b.is_err());

        assert!(logs_contain("Loader batch fetch failed"));
        assert!(logs_contain("key_space=\"users\""));
        assert!(logs_contain("batch_size=2"));
    }
}
