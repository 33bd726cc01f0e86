//! A minimal rendering host for exercising the adapters from outside the crate.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use syncstore::sync::{SnapshotFn, SubscribeFn};
use syncstore::{Listener, SyncExternalStore, Unsubscribe};

struct Hook<T> {
    get_snapshot: Mutex<Option<SnapshotFn<T>>>,
    rendered: Mutex<Option<Arc<T>>>,
    changes: Arc<AtomicUsize>,
}

impl<T> Hook<T> {
    fn on_store_change(&self) {
        let Some(get_snapshot) = self.get_snapshot.lock().clone() else {
            return;
        };
        let next = get_snapshot();
        let mut rendered = self.rendered.lock();
        if rendered.as_ref().map_or(true, |prev| !Arc::ptr_eq(prev, &next)) {
            *rendered = Some(next);
            self.changes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Records how many store notifications would have re-rendered one component.
pub struct RecordingHost {
    slots: Vec<Box<dyn Any + Send>>,
    cursor: usize,
    hydrating: bool,
    changes: Arc<AtomicUsize>,
    subscriptions: Vec<Unsubscribe>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            hydrating: false,
            changes: Arc::new(AtomicUsize::new(0)),
            subscriptions: Vec::new(),
        }
    }

    /// A host whose first pass renders server snapshots.
    pub fn hydrating() -> Self {
        Self {
            hydrating: true,
            ..Self::new()
        }
    }

    pub fn begin_render(&mut self) {
        self.cursor = 0;
        self.hydrating = false;
    }

    pub fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }

    /// Drop every subscription and all hook state.
    pub fn unmount(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.slots.clear();
        self.cursor = 0;
    }

    fn slot<V: Clone + Send + 'static>(&mut self, init: impl FnOnce() -> V) -> (V, bool) {
        let index = self.cursor;
        self.cursor += 1;
        let fresh = index == self.slots.len();
        if fresh {
            self.slots.push(Box::new(init()));
        }
        let value = self.slots[index]
            .downcast_ref::<V>()
            .cloned()
            .expect("hook order changed between renders");
        (value, fresh)
    }
}

impl SyncExternalStore for RecordingHost {
    fn use_sync_external_store<T>(
        &mut self,
        subscribe: SubscribeFn,
        get_snapshot: SnapshotFn<T>,
        get_server_snapshot: SnapshotFn<T>,
    ) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let changes = Arc::clone(&self.changes);
        let (hook, fresh) = self.slot(|| {
            Arc::new(Hook::<T> {
                get_snapshot: Mutex::new(None),
                rendered: Mutex::new(None),
                changes,
            })
        });

        *hook.get_snapshot.lock() = Some(Arc::clone(&get_snapshot));
        let value = if self.hydrating {
            get_server_snapshot()
        } else {
            get_snapshot()
        };
        *hook.rendered.lock() = Some(Arc::clone(&value));

        if fresh {
            let weak = Arc::downgrade(&hook);
            let listener: Listener = Arc::new(move || {
                if let Some(hook) = weak.upgrade() {
                    hook.on_store_change();
                }
            });
            self.subscriptions.push(subscribe(listener));
        }
        value
    }

    fn use_slot<M, F>(&mut self, init: F) -> Arc<Mutex<M>>
    where
        M: Send + 'static,
        F: FnOnce() -> M,
    {
        self.slot(|| Arc::new(Mutex::new(init()))).0
    }
}
