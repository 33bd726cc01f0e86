use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use parking_lot::{ReentrantMutex, RwLock};

use super::listeners::{Listener, ListenerSet, Pass, Unsubscribe};
use crate::config::StoreConfig;
use crate::error::{panic_message, Result, StoreError};
use crate::sync::{ExternalSource, SnapshotFn, SubscribeFn};
use crate::types::Reducer;

/// Outcome of a successful [`SyncStore::try_dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The reducer returned the same `Arc`; nothing was committed.
    Unchanged,
    /// A new state was committed and `notified` listeners ran.
    Committed { notified: usize },
}

impl Transition {
    pub fn is_committed(&self) -> bool {
        matches!(self, Transition::Committed { .. })
    }
}

/// A synchronized, reducer-driven state container.
///
/// The store owns one current state, the reducer that advances it, the initial
/// state (kept verbatim for [`get_server_state`](Self::get_server_state) and
/// [`reset`](Self::reset)) and an ordered set of listeners. Cloning the store
/// clones the handle: clones share one instance, while separately constructed
/// stores share nothing.
///
/// State identity is `Arc` identity. A reducer that returns `Arc::clone(state)`
/// makes the dispatch a no-op; any other `Arc` is committed and every listener
/// is called before `dispatch` returns.
///
/// # Examples
///
/// ```
/// use std::sync::{Arc, OnceLock};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use syncstore::SyncStore;
///
/// #[derive(Debug, PartialEq)]
/// struct Counter {
///     count: i32,
/// }
///
/// enum Action {
///     Increment,
///     Decrement,
///     Unknown,
/// }
///
/// let store = SyncStore::new(
///     |state: &Arc<Counter>, action: Action| match action {
///         Action::Increment => Arc::new(Counter { count: state.count + 1 }),
///         Action::Decrement => Arc::new(Counter { count: state.count - 1 }),
///         Action::Unknown => Arc::clone(state),
///     },
///     Counter { count: 0 },
/// );
///
/// let calls = Arc::new(AtomicUsize::new(0));
/// let calls_clone = calls.clone();
/// store.subscribe_fn(move || {
///     calls_clone.fetch_add(1, Ordering::SeqCst);
/// });
///
/// store.dispatch(Action::Increment);
/// store.dispatch(Action::Decrement);
/// store.dispatch(Action::Decrement);
/// store.dispatch(Action::Unknown);
///
/// assert_eq!(*store.get_state(), Counter { count: -1 });
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// ```
pub struct SyncStore<S, A> {
    pub(crate) inner: Arc<StoreInner<S, A>>,
}

pub(crate) struct StoreInner<S, A> {
    reducer: Reducer<S, A>,
    initial: Arc<S>,
    state: Arc<RwLock<Arc<S>>>,
    listeners: Arc<ListenerSet>,
    // Serializes read-compute-commit-notify across threads. Re-entrant so a
    // listener may dispatch on the same thread.
    transition: ReentrantMutex<()>,
    config: StoreConfig,
    // Built on first use. The closures share the state cell and listener set,
    // never the inner itself, so there is no cycle.
    source: OnceLock<ExternalSource<S>>,
}

fn subscribe_to(listeners: &Arc<ListenerSet>, label: &str, listener: Listener) -> Unsubscribe {
    if listeners.insert(Arc::clone(&listener)) {
        log::trace!("{}: listener subscribed", label);
    }
    Unsubscribe::new(listeners, listener)
}

/// Type-erased access to a store's dispatch, used by [`Dispatch`](crate::Dispatch).
pub(crate) trait Dispatcher<A>: Send + Sync {
    fn dispatch(&self, action: A) -> Result<Transition>;
}

impl<S, A> StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    fn label(&self) -> &str {
        self.config.display_label()
    }

    fn get_state(&self) -> Arc<S> {
        Arc::clone(&self.state.read())
    }

    /// The same `subscribe`, `get_snapshot` and `get_server_snapshot` on
    /// every call.
    pub(crate) fn external_source(&self) -> ExternalSource<S> {
        self.source
            .get_or_init(|| {
                let subscribe: SubscribeFn = {
                    let listeners = Arc::clone(&self.listeners);
                    let label = self.label().to_string();
                    Arc::new(move |listener: Listener| subscribe_to(&listeners, &label, listener))
                };
                let get_snapshot: SnapshotFn<S> = {
                    let state = Arc::clone(&self.state);
                    Arc::new(move || Arc::clone(&state.read()))
                };
                let get_server_snapshot: SnapshotFn<S> = {
                    let initial = Arc::clone(&self.initial);
                    Arc::new(move || Arc::clone(&initial))
                };
                ExternalSource {
                    subscribe,
                    get_snapshot,
                    get_server_snapshot,
                }
            })
            .clone()
    }

    fn try_dispatch(&self, action: A) -> Result<Transition> {
        let _transition = self.transition.lock();
        let current = self.get_state();

        let next = match panic::catch_unwind(AssertUnwindSafe(|| (self.reducer)(&current, action))) {
            Ok(next) => next,
            Err(payload) => {
                let message = panic_message(&*payload);
                log::error!(
                    "{}: transition function panicked, action dropped: {}",
                    self.label(),
                    message
                );
                return Err(StoreError::TransitionPanicked { message });
            }
        };

        if Arc::ptr_eq(&current, &next) {
            log::trace!("{}: dispatch left state unchanged", self.label());
            return Ok(Transition::Unchanged);
        }

        *self.state.write() = next;
        self.notify()
    }

    /// Runs one notification pass over the live listener set. No lock other
    /// than the transition lock is held while listeners run.
    fn notify(&self) -> Result<Transition> {
        log::debug!(
            "{}: state committed, notifying {} listener(s)",
            self.label(),
            self.listeners.len()
        );

        let mut pass = Pass::default();
        let mut notified = 0;
        while let Some(listener) = self.listeners.next(&mut pass) {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| listener())) {
                let message = panic_message(&*payload);
                log::error!(
                    "{}: listener panicked, remaining listeners skipped: {}",
                    self.label(),
                    message
                );
                return Err(StoreError::ListenerPanicked { message });
            }
            notified += 1;
        }
        Ok(Transition::Committed { notified })
    }

    fn reset(&self) {
        let _transition = self.transition.lock();
        *self.state.write() = Arc::clone(&self.initial);
        self.listeners.clear();
        if !self.config.environment.is_production() {
            log::warn!(
                "{}: store reset. Ensure this is intended, resets are usually a testing affordance.",
                self.label()
            );
        }
    }
}

impl<S, A> Dispatcher<A> for StoreInner<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    fn dispatch(&self, action: A) -> Result<Transition> {
        self.try_dispatch(action)
    }
}

impl<S, A> SyncStore<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// Create a store from a reducer and an initial state.
    ///
    /// Passing an `Arc<S>` keeps its identity: the same `Arc` is returned by
    /// [`get_server_state`](Self::get_server_state).
    pub fn new<F>(reducer: F, initial_state: impl Into<Arc<S>>) -> Self
    where
        F: Fn(&Arc<S>, A) -> Arc<S> + Send + Sync + 'static,
    {
        Self::with_config(reducer, initial_state, StoreConfig::default())
    }

    /// Create a store with an explicit [`StoreConfig`].
    pub fn with_config<F>(reducer: F, initial_state: impl Into<Arc<S>>, config: StoreConfig) -> Self
    where
        F: Fn(&Arc<S>, A) -> Arc<S> + Send + Sync + 'static,
    {
        let initial = initial_state.into();
        Self {
            inner: Arc::new(StoreInner {
                reducer: Box::new(reducer),
                state: Arc::new(RwLock::new(Arc::clone(&initial))),
                initial,
                listeners: ListenerSet::new(),
                transition: ReentrantMutex::new(()),
                config,
                source: OnceLock::new(),
            }),
        }
    }

    /// The most recently committed state.
    pub fn get_state(&self) -> Arc<S> {
        self.inner.get_state()
    }

    /// Read the current state without cloning the `Arc`.
    ///
    /// The state cell stays read-locked while `f` runs, so `f` must not
    /// dispatch on or reset this store.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let state = self.inner.state.read();
        f(&state)
    }

    /// Apply `action` and notify listeners if the state changed.
    ///
    /// A panicking reducer or listener never reaches the caller: it is logged
    /// and swallowed. Use [`try_dispatch`](Self::try_dispatch) to observe it.
    pub fn dispatch(&self, action: A) {
        let _ = self.inner.try_dispatch(action);
    }

    /// Like [`dispatch`](Self::dispatch), but hands back the contained failure.
    ///
    /// Side effects are identical: on `TransitionPanicked` the state is
    /// unchanged and no listener ran; on `ListenerPanicked` the new state is
    /// committed and the rest of the pass was skipped.
    pub fn try_dispatch(&self, action: A) -> Result<Transition> {
        self.inner.try_dispatch(action)
    }

    /// Register `listener`. Registering the same `Arc` again is a no-op.
    pub fn subscribe(&self, listener: Listener) -> Unsubscribe {
        subscribe_to(&self.inner.listeners, self.inner.label(), listener)
    }

    /// Register a closure as a new listener.
    pub fn subscribe_fn<F>(&self, f: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(f))
    }

    /// The initial state, untouched by dispatches and resets.
    pub fn get_server_state(&self) -> Arc<S> {
        Arc::clone(&self.inner.initial)
    }

    /// Restore the initial state and drop every listener without notifying.
    pub fn reset(&self) {
        self.inner.reset();
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Whether both handles refer to the same store instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Create a new store. Shorthand for [`SyncStore::new`].
pub fn create_sync_store<S, A, F>(reducer: F, initial_state: impl Into<Arc<S>>) -> SyncStore<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
    F: Fn(&Arc<S>, A) -> Arc<S> + Send + Sync + 'static,
{
    SyncStore::new(reducer, initial_state)
}

impl<S, A> Clone for SyncStore<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for SyncStore<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncStore")
            .field("label", &self.inner.config.label)
            .field("environment", &self.inner.config.environment)
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}
