//! Single-flight, observable fetching.
//!
//! [`ReloadableSource`] turns a cold async fetch into a warm
//! [`LoadState`] published on a [`watch`] channel.  Fetches run as tokio
//! tasks on the runtime handed to [`ReloadableSource::new`]; subscribers only
//! ever see the latest state, in publication order.
//!
//! ```text
//!            load()/reload()            fetch resolves
//!   Loading ───────────────► Loading ─────────────────► Done | Failed
//!   (idle)                   (in flight)                      │
//!      ▲                         ▲  load()/reload(): ignored  │
//!      │                         └────────────────────────────┘
//!                                         reload()
//! ```
//!
//! ## For contributors
//!
//! The in-flight flag and the terminal publish share one lock.  Clearing the
//! flag before publishing would let a reload squeeze in between and have its
//! `Loading` overwritten by the previous attempt's result.
//!
//! Every admitted load is owned by an [`Attempt`] from the moment the flag is
//! set.  If the fetch closure or its future panics, or the task is dropped by a
//! shutting-down runtime, the attempt settles itself as a network failure on
//! drop, so the source never stays in flight.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::{ApiError, UserError};
use crate::load_state::LoadState;

type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;
type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// Bookkeeping guarded by [`Shared::inner`].
struct Inner {
    in_flight: bool,
    /// Bumped on every admitted load; lets a finished task check it is current.
    attempt: u64,
    loaded_at: Option<DateTime<Utc>>,
    closed: bool,
}

/// State shared with the spawned fetch task.
struct Shared<T> {
    state: watch::Sender<LoadState<T>>,
    inner: Mutex<Inner>,
}

/// An observable, reloadable wrapper around a repeatable fetch.
pub struct ReloadableSource<T> {
    label: String,
    fetch: FetchFn<T>,
    runtime: Handle,
    shared: Arc<Shared<T>>,
}

impl<T> ReloadableSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wrap `fetch`.  Nothing is fetched until [`load`](Self::load).
    ///
    /// `runtime` is where the fetch task runs and from where state updates
    /// are published.
    pub fn new<F, Fut>(label: impl Into<String>, runtime: Handle, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            label: label.into(),
            fetch: Arc::new(move || Box::pin(fetch()) as FetchFuture<T>),
            runtime,
            shared: Arc::new(Shared {
                state,
                inner: Mutex::new(Inner {
                    in_flight: false,
                    attempt: 0,
                    loaded_at: None,
                    closed: false,
                }),
            }),
        }
    }

    /// Start a fetch unless one is already running.
    ///
    /// Returns `true` if a fetch was started.  While in flight this is a
    /// no-op and publishes nothing.
    pub fn load(&self) -> bool {
        let attempt = {
            let mut inner = self.shared.inner.lock();
            if inner.in_flight {
                debug!(source = %self.label, "fetch already in flight, ignoring");
                return false;
            }
            inner.in_flight = true;
            inner.attempt += 1;
            self.shared.state.send_if_modified(|state| {
                if state.is_loading() {
                    false
                } else {
                    *state = LoadState::Loading;
                    true
                }
            });
            inner.attempt
        };

        debug!(source = %self.label, attempt, "fetch started");
        let attempt = Attempt {
            shared: Arc::clone(&self.shared),
            label: self.label.clone(),
            attempt,
            settled: false,
        };
        let fut = (self.fetch)();
        self.runtime.spawn(async move {
            let result = fut.await;
            attempt.settle(result);
        });
        true
    }

    /// Re-run the fetch.  Same admission rule as [`load`](Self::load), which
    /// makes it safe to wire to a retry control that may be hit repeatedly.
    pub fn reload(&self) -> bool {
        self.load()
    }

    /// Name this source logs under.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// A receiver that always holds the latest state.
    pub fn subscribe(&self) -> watch::Receiver<LoadState<T>> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> LoadState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.inner.lock().in_flight
    }

    /// When the most recent fetch finished, successfully or not.
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.shared.inner.lock().loaded_at
    }
}

impl<T> Shared<T> {
    fn finish(&self, label: &str, attempt: u64, result: Result<T, ApiError>) {
        let mut inner = self.inner.lock();
        if inner.closed || inner.attempt != attempt {
            debug!(source = %label, attempt, "discarding result of detached fetch");
            return;
        }

        let next = match result {
            Ok(value) => {
                info!(source = %label, attempt, "fetch done");
                LoadState::Done(value)
            }
            Err(err) => {
                warn!(source = %label, attempt, error = %err, "fetch failed");
                LoadState::Failed(UserError::from(err))
            }
        };
        self.state.send_replace(next);
        inner.in_flight = false;
        inner.loaded_at = Some(Utc::now());
    }
}

/// One admitted fetch.  Publishes its terminal state exactly once.
struct Attempt<T> {
    shared: Arc<Shared<T>>,
    label: String,
    attempt: u64,
    settled: bool,
}

impl<T> Attempt<T> {
    fn settle(mut self, result: Result<T, ApiError>) {
        self.settled = true;
        self.shared.finish(&self.label, self.attempt, result);
    }
}

impl<T> Drop for Attempt<T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        warn!(source = %self.label, attempt = self.attempt, "fetch abandoned before resolving");
        let err = ApiError::Network("fetch abandoned".into());
        self.shared.finish(&self.label, self.attempt, Err(err));
    }
}

impl<T> Drop for ReloadableSource<T> {
    fn drop(&mut self) {
        let mut inner = self.shared.inner.lock();
        if inner.in_flight {
            debug!(source = %self.label, "dropped with fetch in flight, detaching");
        }
        inner.closed = true;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::oneshot;

    use super::*;

    /// A fetch whose every call blocks until the test resolves it.
    #[derive(Clone, Default)]
    struct Gate {
        calls: Arc<AtomicUsize>,
        pending: Arc<Mutex<VecDeque<oneshot::Sender<Result<u32, ApiError>>>>>,
    }

    impl Gate {
        fn source(&self) -> ReloadableSource<u32> {
            let gate = self.clone();
            ReloadableSource::new("test", Handle::current(), move || {
                gate.calls.fetch_add(1, Ordering::SeqCst);
                let (tx, rx) = oneshot::channel();
                gate.pending.lock().push_back(tx);
                async move {
                    rx.await
                        .unwrap_or_else(|_| Err(ApiError::Network("gate dropped".into())))
                }
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn resolve(&self, result: Result<u32, ApiError>) {
            let tx = self.pending.lock().pop_front().expect("no fetch pending");
            let _ = tx.send(result);
        }
    }

    /// Let spawned tasks run to their next await point.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn starts_loading_without_fetching() {
        let gate = Gate::default();
        let source = gate.source();
        assert!(source.state().is_loading());
        assert!(!source.is_in_flight());
        assert_eq!(gate.calls(), 0);
    }

    #[tokio::test]
    async fn load_then_done() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        assert!(source.load());
        assert!(source.is_in_flight());
        assert!(!rx.has_changed().unwrap(), "already Loading, nothing new to see");

        gate.resolve(Ok(42));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LoadState::Done(42));
        assert!(!source.is_in_flight());
        assert!(source.loaded_at().is_some());
    }

    #[tokio::test]
    async fn failure_is_mapped_to_user_error() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        source.load();
        gate.resolve(Err(ApiError::InvalidUrl("bad".into())));
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            LoadState::Failed(UserError::new("Invalid URL"))
        );
    }

    #[tokio::test]
    async fn load_while_in_flight_is_ignored() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        assert!(source.load());
        assert!(!source.load());
        assert!(!source.reload());
        assert_eq!(gate.calls(), 1, "no second concurrent fetch");
        assert!(!rx.has_changed().unwrap());

        gate.resolve(Ok(1));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LoadState::Done(1));
    }

    #[tokio::test]
    async fn reload_after_failure_goes_back_to_loading() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        source.load();
        gate.resolve(Err(ApiError::Network("down".into())));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_failed());

        assert!(source.reload());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_loading());

        gate.resolve(Ok(7));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), LoadState::Done(7));
        assert_eq!(gate.calls(), 2);
    }

    #[tokio::test]
    async fn exactly_one_terminal_state_per_attempt() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        source.load();
        gate.resolve(Ok(3));
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_done());

        settle().await;
        assert!(!rx.has_changed().unwrap(), "no second terminal state");
    }

    #[tokio::test]
    async fn reload_after_done_refetches() {
        let gate = Gate::default();
        let source = gate.source();

        source.load();
        gate.resolve(Ok(1));
        let mut rx = source.subscribe();
        rx.wait_for(LoadState::is_done).await.unwrap();

        assert!(source.reload());
        assert!(source.state().is_loading());
        gate.resolve(Ok(2));
        let state = rx.wait_for(LoadState::is_done).await.unwrap().clone();
        assert_eq!(state, LoadState::Done(2));
    }

    // -- abandoned attempts -------------------------------------------------

    #[tokio::test]
    async fn panicking_fetch_settles_as_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = ReloadableSource::new("test", Handle::current(), move || {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if call == 0 {
                    panic!("fetch blew up");
                }
                Ok(5u32)
            }
        });
        let mut rx = source.subscribe();

        assert!(source.load());
        let state = rx.wait_for(|s| !s.is_loading()).await.unwrap().clone();
        assert_eq!(state, LoadState::Failed(UserError::new("Network Error")));
        assert!(!source.is_in_flight());
        assert!(source.loaded_at().is_some());

        assert!(source.reload(), "retry is admitted after a panic");
        let state = rx.wait_for(LoadState::is_done).await.unwrap().clone();
        assert_eq!(state, LoadState::Done(5));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn panicking_fetch_closure_settles_as_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = ReloadableSource::new("test", Handle::current(), move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("could not build request");
            }
            async { Ok(6u32) }
        });

        let unwound = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| source.load()));
        assert!(unwound.is_err());
        assert!(!source.is_in_flight());
        assert_eq!(
            source.state(),
            LoadState::Failed(UserError::new("Network Error"))
        );

        assert!(source.reload());
        let mut rx = source.subscribe();
        let state = rx.wait_for(LoadState::is_done).await.unwrap().clone();
        assert_eq!(state, LoadState::Done(6));
    }

    #[tokio::test]
    async fn dropping_detaches_in_flight_fetch() {
        let gate = Gate::default();
        let source = gate.source();
        let mut rx = source.subscribe();

        source.load();
        drop(source);
        gate.resolve(Ok(9));
        settle().await;

        assert!(rx.borrow_and_update().is_loading(), "late result discarded");
        // Once the detached task has finished nothing holds the sender.
        assert!(rx.changed().await.is_err());
    }
}
