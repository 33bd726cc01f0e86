//! The store core.
//!
//! A [`SyncStore`] owns a single state cell, the reducer that advances it, and
//! the listeners notified after each committed change. It has no dependency on
//! any rendering framework; see [`crate::sync`] for the adapters.

mod listeners;
mod store;

pub use listeners::{Listener, Unsubscribe};
pub(crate) use store::Dispatcher;
pub use store::{create_sync_store, SyncStore, Transition};
