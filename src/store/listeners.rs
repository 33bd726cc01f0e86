use std::fmt;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::Mutex;

/// A zero-argument callback invoked after a committed state change.
///
/// Listeners are identified by their `Arc` allocation: subscribing the same
/// `Arc` twice registers it once.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

type ListenerKey = usize;

/// Registration stamp. Strictly increasing along the map, and never reused,
/// not even after `clear`.
type Sequence = u64;

fn key_of(listener: &Listener) -> ListenerKey {
    Arc::as_ptr(listener) as *const () as usize
}

#[derive(Default)]
struct Entries {
    map: IndexMap<ListenerKey, (Sequence, Listener)>,
    last_seq: Sequence,
}

/// Insertion-ordered set of listeners keyed by identity.
#[derive(Default)]
pub(crate) struct ListenerSet {
    entries: Mutex<Entries>,
}

/// Position of one notification pass over a live [`ListenerSet`].
///
/// A pass visits every listener registered after the last one it visited.
/// Listeners added mid-pass are therefore called in the same pass. A listener
/// removed and added again runs at its new position.
#[derive(Debug, Default)]
pub(crate) struct Pass {
    visited: Sequence,
    index: usize,
}

impl ListenerSet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Returns `false` if the listener was already registered.
    pub(crate) fn insert(&self, listener: Listener) -> bool {
        let mut entries = self.entries.lock();
        let key = key_of(&listener);
        if entries.map.contains_key(&key) {
            return false;
        }
        entries.last_seq += 1;
        let seq = entries.last_seq;
        entries.map.insert(key, (seq, listener));
        true
    }

    pub(crate) fn remove(&self, listener: &Listener) -> bool {
        self.entries.lock().map.shift_remove(&key_of(listener)).is_some()
    }

    /// The next listener `pass` has not visited yet, in insertion order.
    ///
    /// The lock is released before returning, so the caller may run the
    /// listener while it subscribes or unsubscribes.
    pub(crate) fn next(&self, pass: &mut Pass) -> Option<Listener> {
        let entries = self.entries.lock();
        let seq_at = |index: usize| entries.map.get_index(index).map(|(_, (seq, _))| *seq);

        // Removals shift later entries left; sequences stay sorted, so step
        // back over anything newer than the last visit, then forward past the
        // rest.
        let mut index = pass.index.min(entries.map.len());
        while index > 0 && seq_at(index - 1).is_some_and(|seq| seq > pass.visited) {
            index -= 1;
        }
        while seq_at(index).is_some_and(|seq| seq <= pass.visited) {
            index += 1;
        }

        let (_, (seq, listener)) = entries.map.get_index(index)?;
        pass.visited = *seq;
        pass.index = index + 1;
        Some(Arc::clone(listener))
    }

    pub(crate) fn clear(&self) {
        self.entries.lock().map.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().map.len()
    }
}

/// Disposer returned by [`SyncStore::subscribe`](crate::SyncStore::subscribe).
///
/// Removes exactly the registration it was created for. Calling
/// [`unsubscribe`](Self::unsubscribe) more than once is harmless, and dropping
/// the handle does *not* unsubscribe.
#[derive(Clone)]
pub struct Unsubscribe {
    set: Weak<ListenerSet>,
    // Holding the listener keeps its address from being reused while this
    // disposer is alive.
    listener: Arc<Mutex<Option<Listener>>>,
}

impl Unsubscribe {
    pub(crate) fn new(set: &Arc<ListenerSet>, listener: Listener) -> Self {
        Self {
            set: Arc::downgrade(set),
            listener: Arc::new(Mutex::new(Some(listener))),
        }
    }

    /// Remove the registration. Runs at most once.
    pub fn unsubscribe(&self) {
        let Some(listener) = self.listener.lock().take() else {
            return;
        };
        if let Some(set) = self.set.upgrade() {
            if set.remove(&listener) {
                log::trace!("listener unsubscribed");
            }
        }
    }

    /// Whether [`unsubscribe`](Self::unsubscribe) has already run.
    pub fn is_disposed(&self) -> bool {
        self.listener.lock().is_none()
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("disposed", &self.is_disposed())
            .field("store_alive", &(self.set.strong_count() > 0))
            .finish()
    }
}
