use crate::result::RawLogListResult;
use std::sync::{Mutex, PoisonError, RwLock};

/// A source of values that may be cached, fetched or composed out of other sources
pub trait DataSource {
    type Value;

    fn get(&self) -> impl Future<Output = Self::Value>;
}

/// A single slot held in memory
///
/// Reads hand out a clone under a read lock, so a concurrent update can never be
/// observed half-written.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    value: RwLock<Option<RawLogListResult>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get(&self) -> Option<RawLogListResult> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, value: RawLogListResult) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }
}

/// Wraps an inner [`DataSource`] and deduplicates concurrent `get`s
///
/// The first caller runs the real fetch; everyone arriving while it is in flight gets
/// the same value over a oneshot channel. The wrapped source must be idempotent: when
/// the leading call is cancelled the deduplication dissolves and each waiter retries
/// on its own, so the same fetch may run twice.
pub struct ReuseInflight<D: DataSource> {
    inner: D,
    waiters: Mutex<Option<Vec<async_oneshot::Sender<D::Value>>>>,
}

impl<D: DataSource> ReuseInflight<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            waiters: Mutex::new(None),
        }
    }
}

/// Clears the in-flight slot when the leading call settles or is cancelled
///
/// Dropping the slot drops the senders in it, which wakes every waiter with `Closed`.
struct InflightGuard<'a, T> {
    waiters: &'a Mutex<Option<Vec<async_oneshot::Sender<T>>>>,
}

impl<T> Drop for InflightGuard<'_, T> {
    fn drop(&mut self) {
        let _ = self
            .waiters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

impl<D: DataSource> DataSource for ReuseInflight<D>
where
    D::Value: Clone,
{
    type Value = D::Value;

    async fn get(&self) -> D::Value {
        loop {
            // The lock is only held to join or open the in-flight slot, never across
            // the fetch itself
            let receiver = {
                let mut slot = self.waiters.lock().unwrap_or_else(PoisonError::into_inner);
                match slot.as_mut() {
                    Some(waiters) => {
                        let (sender, receiver) = async_oneshot::oneshot();
                        waiters.push(sender);
                        Some(receiver)
                    }
                    None => {
                        *slot = Some(vec![]);
                        None
                    }
                }
            };

            let Some(receiver) = receiver else {
                let guard = InflightGuard {
                    waiters: &self.waiters,
                };

                let value = self.inner.get().await;

                let waiters = self
                    .waiters
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                for mut sender in waiters.into_iter().flatten() {
                    let _ = sender.send(value.clone());
                }

                drop(guard);
                return value;
            };

            match receiver.await {
                Ok(value) => return value,
                // The leading call was cancelled before settling; retry, racing to
                // become the new leader
                Err(_closed) => continue,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::poll;
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        task::Poll,
        time::Duration,
    };

    struct CountingSource {
        fetches: AtomicUsize,
    }

    impl CountingSource {
        fn new() -> ReuseInflight<Self> {
            ReuseInflight::new(Self {
                fetches: AtomicUsize::new(0),
            })
        }
    }

    impl DataSource for CountingSource {
        type Value = usize;

        async fn get(&self) -> usize {
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.fetches.fetch_add(1, Ordering::SeqCst) + 1
        }
    }

    #[tokio::test]
    async fn concurrent_gets_share_one_fetch() {
        let source = CountingSource::new();

        let values = futures::join!(
            source.get(),
            source.get(),
            source.get(),
            source.get(),
            source.get()
        );

        assert_eq!(values, (1, 1, 1, 1, 1));
        assert_eq!(source.inner.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn settled_calls_do_not_linger() {
        let source = CountingSource::new();

        assert_eq!(source.get().await, 1);
        // A get after settlement runs its own fetch instead of reusing the old value
        assert_eq!(source.get().await, 2);
    }

    #[tokio::test]
    async fn cancelled_leader_does_not_strand_waiters() {
        let source = CountingSource::new();

        let mut leader = Box::pin(source.get());
        assert_eq!(poll!(leader.as_mut()), Poll::Pending);

        let mut waiter = Box::pin(source.get());
        assert_eq!(poll!(waiter.as_mut()), Poll::Pending);

        drop(leader);

        // The waiter notices the closed channel and fetches on its own
        assert_eq!(waiter.await, 1);
    }
}
