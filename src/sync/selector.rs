use std::sync::Arc;

use parking_lot::Mutex;

use super::host::{SnapshotFn, SubscribeFn, SyncExternalStore};
use crate::store::SyncStore;
use crate::types::{EqualityFn, Selector};

/// Ready-made equality functions for the selector adapter.
pub mod equality {
    use std::sync::Arc;

    /// Value equality. The default for
    /// [`use_sync_selector`](crate::SyncStore::use_sync_selector).
    pub fn default_eq<T: PartialEq>(a: &T, b: &T) -> bool {
        a == b
    }

    /// Identity of `Arc` selections.
    ///
    /// A selector that allocates a fresh `Arc` on every call is never equal
    /// under this comparison, so its consumer re-renders on every state
    /// change. That is expected; select an `Arc` held by the state instead.
    pub fn ptr_eq<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
        Arc::ptr_eq(a, b)
    }

    /// Element-wise identity of a list of `Arc`s.
    ///
    /// Suited to selectors that filter or slice shared items into a new `Vec`
    /// on every call.
    pub fn shallow_eq<V, T>(a: &V, b: &V) -> bool
    where
        V: AsRef<[Arc<T>]>,
    {
        let (a, b) = (a.as_ref(), b.as_ref());
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Arc::ptr_eq(x, y))
    }

    /// Same length and element-wise `PartialEq`.
    ///
    /// For selectors that build a new list of plain values on every call.
    pub fn shallow_slice_eq<V, T>(a: &V, b: &V) -> bool
    where
        V: AsRef<[T]>,
        T: PartialEq,
    {
        let (a, b) = (a.as_ref(), b.as_ref());
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
    }
}

/// Per-consumer record of the last selection handed to the host.
pub(crate) struct SelectionSlot<T> {
    delivered: Option<Arc<T>>,
}

impl<T> Default for SelectionSlot<T> {
    fn default() -> Self {
        Self { delivered: None }
    }
}

/// Selection memo for one render pass.
///
/// Skips the selector while the snapshot `Arc` is unchanged, and returns the
/// previously delivered selection whenever `is_equal` reports equality.
struct MemoizedSelector<S, T> {
    slot: Arc<Mutex<SelectionSlot<T>>>,
    selector: Selector<S, T>,
    is_equal: EqualityFn<T>,
    last: Mutex<Option<(Arc<S>, Arc<T>)>>,
}

impl<S, T> MemoizedSelector<S, T> {
    fn new(slot: Arc<Mutex<SelectionSlot<T>>>, selector: Selector<S, T>, is_equal: EqualityFn<T>) -> Self {
        Self {
            slot,
            selector,
            is_equal,
            last: Mutex::new(None),
        }
    }

    fn select(&self, snapshot: Arc<S>) -> Arc<T> {
        if let Some((seen, selected)) = self.last.lock().as_ref() {
            if Arc::ptr_eq(seen, &snapshot) {
                return Arc::clone(selected);
            }
        }

        let next = (self.selector)(&snapshot);
        let chosen = {
            let mut slot = self.slot.lock();
            match &slot.delivered {
                Some(prev) if (self.is_equal)(prev, &next) => Arc::clone(prev),
                _ => {
                    let next = Arc::new(next);
                    slot.delivered = Some(Arc::clone(&next));
                    next
                }
            }
        };

        *self.last.lock() = Some((snapshot, Arc::clone(&chosen)));
        chosen
    }
}

/// Provided body of
/// [`SyncExternalStore::use_sync_external_store_with_selector`].
///
/// A fresh memo is built on every pass so that per-render `selector` and
/// `is_equal` closures are always the ones applied; only the delivered value
/// persists in the host slot.
pub(crate) fn with_selector<H, S, T>(
    host: &mut H,
    subscribe: SubscribeFn,
    get_snapshot: SnapshotFn<S>,
    get_server_snapshot: SnapshotFn<S>,
    selector: Selector<S, T>,
    is_equal: EqualityFn<T>,
) -> Arc<T>
where
    H: SyncExternalStore,
    S: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    let slot = host.use_slot(SelectionSlot::<T>::default);

    let client = MemoizedSelector::new(Arc::clone(&slot), Arc::clone(&selector), Arc::clone(&is_equal));
    let server = MemoizedSelector::new(slot, selector, is_equal);

    let select_snapshot: SnapshotFn<T> = Arc::new(move || client.select(get_snapshot()));
    let select_server_snapshot: SnapshotFn<T> = Arc::new(move || server.select(get_server_snapshot()));

    host.use_sync_external_store(subscribe, select_snapshot, select_server_snapshot)
}

impl<S, A> SyncStore<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// Subscribe the calling component to `selector(state)`.
    ///
    /// The selector runs on every committed state change, but the host only
    /// sees a new value when it differs from the previous one by `==`.
    ///
    /// A selector that builds a new value on every call (for example a
    /// freshly collected `Vec`) still compares by value here. Use
    /// [`use_sync_selector_with`](Self::use_sync_selector_with) with
    /// [`equality::ptr_eq`] or [`equality::shallow_eq`] for identity-based
    /// gating, or [`equality::shallow_slice_eq`] to compare a list element by
    /// element.
    pub fn use_sync_selector<H, T, F>(&self, host: &mut H, selector: F) -> T
    where
        H: SyncExternalStore,
        T: PartialEq + Clone + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.use_sync_selector_with(host, selector, equality::default_eq::<T>)
    }

    /// Like [`use_sync_selector`](Self::use_sync_selector) with a custom
    /// equality function.
    ///
    /// Neither `selector` nor `equality` needs to be the same closure on every
    /// render; only their results matter.
    pub fn use_sync_selector_with<H, T, F, E>(&self, host: &mut H, selector: F, equality: E) -> T
    where
        H: SyncExternalStore,
        T: Clone + Send + Sync + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
    {
        let source = self.external_source();
        let selected = host.use_sync_external_store_with_selector(
            source.subscribe,
            source.get_snapshot,
            source.get_server_snapshot,
            Arc::new(selector),
            Arc::new(equality),
        );
        T::clone(&selected)
    }
}
