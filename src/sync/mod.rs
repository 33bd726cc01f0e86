//! Adapters between a store and a rendering host.
//!
//! A rendering framework exposes a tear-free external-store primitive, modelled
//! here as [`SyncExternalStore`]. The adapters hand it the store's
//! `subscribe`/`get_state`/`get_server_state` so the host decides when a
//! component re-renders:
//!
//! - [`SyncStore::use_sync_reducer`](crate::SyncStore::use_sync_reducer): the
//!   whole state plus a stable [`Dispatch`].
//! - [`SyncStore::use_sync_selector`](crate::SyncStore::use_sync_selector): a
//!   derived value, propagated only when it changes under an equality function.

mod host;
mod reducer;
mod selector;

#[cfg(test)]
pub(crate) mod test_host;

pub use host::{ExternalSource, SnapshotFn, SubscribeFn, SyncExternalStore};
pub use reducer::Dispatch;
pub use selector::equality;
