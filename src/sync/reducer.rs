use std::fmt;
use std::sync::Arc;

use super::host::SyncExternalStore;
use crate::error::Result;
use crate::store::{Dispatcher, SyncStore, Transition};

/// A store's dispatch function with stable identity.
///
/// Every `Dispatch` obtained from the same store compares equal, so handing it
/// to child components never looks like a new callback.
pub struct Dispatch<A> {
    target: Arc<dyn Dispatcher<A>>,
}

impl<A> Dispatch<A> {
    /// Dispatch `action`; failures are logged and swallowed.
    pub fn call(&self, action: A) {
        let _ = self.target.dispatch(action);
    }

    /// Dispatch `action` and return the contained failure, if any.
    pub fn try_call(&self, action: A) -> Result<Transition> {
        self.target.dispatch(action)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::as_ptr(&self.target) as *const () == Arc::as_ptr(&other.target) as *const ()
    }
}

impl<A> Clone for Dispatch<A> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
        }
    }
}

impl<A> PartialEq for Dispatch<A> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<A> Eq for Dispatch<A> {}

impl<A> fmt::Debug for Dispatch<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Dispatch")
            .field(&(Arc::as_ptr(&self.target) as *const ()))
            .finish()
    }
}

impl<S, A> SyncStore<S, A>
where
    S: Send + Sync + 'static,
    A: 'static,
{
    /// The stable [`Dispatch`] handle for this store.
    pub fn dispatcher(&self) -> Dispatch<A> {
        let target: Arc<dyn Dispatcher<A>> = self.inner.clone();
        Dispatch { target }
    }

    /// Subscribe the calling component to the whole state.
    ///
    /// Returns the snapshot for this render pass and the store's stable
    /// dispatch handle. Every committed change is reported to the host.
    pub fn use_sync_reducer<H>(&self, host: &mut H) -> (Arc<S>, Dispatch<A>)
    where
        H: SyncExternalStore,
    {
        let source = self.external_source();
        let state = host.use_sync_external_store(
            source.subscribe,
            source.get_snapshot,
            source.get_server_snapshot,
        );
        (state, self.dispatcher())
    }
}
