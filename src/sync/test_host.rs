//! Headless host used by the adapter tests.
//!
//! Keeps hook state in ordered slots, subscribes once per hook position and
//! counts a propagated change whenever a notification yields a snapshot that is
//! not the `Arc` it last rendered.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::host::{SnapshotFn, SubscribeFn, SyncExternalStore};
use crate::store::{Listener, Unsubscribe};

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
        let changed = rendered.as_ref().map_or(true, |prev| !Arc::ptr_eq(prev, &next));
        if changed {
            *rendered = Some(next);
            self.changes.fetch_add(1, Ordering::SeqCst);
        }
    }
}

pub(crate) struct TestHost {
    slots: Vec<Box<dyn Any + Send>>,
    cursor: usize,
    hydrating: bool,
    changes: Arc<AtomicUsize>,
    subscriptions: Vec<Unsubscribe>,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            cursor: 0,
            hydrating: false,
            changes: Arc::new(AtomicUsize::new(0)),
            subscriptions: Vec::new(),
        }
    }

    /// First pass reads server snapshots.
    pub(crate) fn hydrating() -> Self {
        Self {
            hydrating: true,
            ..Self::new()
        }
    }

    pub(crate) fn begin_render(&mut self) {
        self.cursor = 0;
        self.hydrating = false;
    }

    /// Notifications that would have re-rendered this component.
    pub(crate) fn changes(&self) -> usize {
        self.changes.load(Ordering::SeqCst)
    }

    pub(crate) fn unmount(&mut self) {
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
        self.slots.clear();
        self.cursor = 0;
    }

    fn slot<V, F>(&mut self, init: F) -> V
    where
        V: Clone + Send + 'static,
        F: FnOnce() -> V,
    {
        let index = self.cursor;
        self.cursor += 1;
        if index == self.slots.len() {
            self.slots.push(Box::new(init()));
        }
        self.slots[index]
            .downcast_ref::<V>()
            .cloned()
            .expect("hook order changed between renders")
    }
}

impl SyncExternalStore for TestHost {
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
        let mut first_pass = false;
        let hook = self.slot(|| {
            first_pass = true;
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

        if first_pass {
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
        self.slot(|| Arc::new(Mutex::new(init())))
    }
}
