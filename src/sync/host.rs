use std::sync::Arc;

use parking_lot::Mutex;

use super::selector::with_selector;
use crate::store::{Listener, SyncStore, Unsubscribe};
use crate::types::{EqualityFn, Selector};

/// `subscribe(on_change) -> unsubscribe`, as handed to the host.
pub type SubscribeFn = Arc<dyn Fn(Listener) -> Unsubscribe + Send + Sync>;

/// `get_snapshot()` / `get_server_snapshot()`, as handed to the host.
pub type SnapshotFn<T> = Arc<dyn Fn() -> Arc<T> + Send + Sync>;

/// Calling contract of a rendering framework's tear-free external-store
/// subscription primitive.
///
/// syncstore does not schedule renders. A host implements this trait once per
/// component instance and is responsible for subscribing, reading a consistent
/// snapshot for each render pass, and deciding when to re-render. Snapshots are
/// `Arc`s: a host must treat a snapshot as changed exactly when it is not
/// [`Arc::ptr_eq`] to the one it rendered last.
pub trait SyncExternalStore {
    /// Subscribe to an external source and return the snapshot for this pass.
    ///
    /// `get_server_snapshot` must be used instead of `get_snapshot` during
    /// initial or hydration passes, where dispatched state must not yet be
    /// observed.
    fn use_sync_external_store<T>(
        &mut self,
        subscribe: SubscribeFn,
        get_snapshot: SnapshotFn<T>,
        get_server_snapshot: SnapshotFn<T>,
    ) -> Arc<T>
    where
        T: Send + Sync + 'static;

    /// Per-consumer memory that survives across render passes.
    ///
    /// `init` runs on the first pass only; later passes at the same position
    /// return the same slot.
    fn use_slot<M, F>(&mut self, init: F) -> Arc<Mutex<M>>
    where
        M: Send + 'static,
        F: FnOnce() -> M;

    /// Five-function variant: subscribe and return `selector(snapshot)`,
    /// reusing the previously delivered selection while `is_equal` holds.
    ///
    /// The provided implementation keeps its bookkeeping in
    /// [`use_slot`](Self::use_slot) and delegates to
    /// [`use_sync_external_store`](Self::use_sync_external_store).
    fn use_sync_external_store_with_selector<S, T>(
        &mut self,
        subscribe: SubscribeFn,
        get_snapshot: SnapshotFn<S>,
        get_server_snapshot: SnapshotFn<S>,
        selector: Selector<S, T>,
        is_equal: EqualityFn<T>,
    ) -> Arc<T>
    where
        Self: Sized,
        S: Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        with_selector(
            self,
            subscribe,
            get_snapshot,
            get_server_snapshot,
            selector,
            is_equal,
        )
    }
}

/// The three functions a store exposes to a host.
pub struct ExternalSource<S> {
    pub subscribe: SubscribeFn,
    pub get_snapshot: SnapshotFn<S>,
    pub get_server_snapshot: SnapshotFn<S>,
}

impl<S> Clone for ExternalSource<S> {
    fn clone(&self) -> Self {
        Self {
            subscribe: Arc::clone(&self.subscribe),
            get_snapshot: Arc::clone(&self.get_snapshot),
            get_server_snapshot: Arc::clone(&self.get_server_snapshot),
        }
    }
}

impl<S, A> SyncStore<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// This store's `subscribe`, `get_state` and `get_server_state`, packaged
    /// for a [`SyncExternalStore`] host.
    ///
    /// Built once per store: every call, from any clone of the handle, returns
    /// the same three `Arc`s, so a host that compares `subscribe` by identity
    /// never resubscribes.
    pub fn external_source(&self) -> ExternalSource<S> {
        self.inner.external_source()
    }
}
