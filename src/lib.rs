//! # Syncstore
//!
//! A synchronized, reducer-driven state container for component-based
//! renderers that must never observe a torn view of state.
//!
//! Syncstore provides two layers:
//!
//! ## Store core
//!
//! [`SyncStore<S, A>`] holds one state cell advanced by a reducer:
//! - `get_state` / `dispatch` are fully synchronous and usable outside any renderer
//! - Listeners run after each committed change, never for identity no-ops
//! - A panicking reducer is logged and contained; state is left untouched
//! - `get_server_state` / `reset` expose and restore the initial state
//!
//! ## Synchronization adapters
//!
//! Bridges to a renderer's external-store primitive ([`SyncExternalStore`]):
//! - `use_sync_reducer` - the whole state and a stable [`Dispatch`]
//! - `use_sync_selector` - a derived value, re-rendering only when it changes
//!
//! ```
//! use std::sync::Arc;
//! use syncstore::create_sync_store;
//!
//! enum Action {
//!     Rename(&'static str),
//! }
//!
//! let store = create_sync_store(
//!     |_state: &Arc<String>, action: Action| match action {
//!         Action::Rename(name) => Arc::new(name.to_string()),
//!     },
//!     String::from("draft"),
//! );
//!
//! store.dispatch(Action::Rename("final"));
//! assert_eq!(*store.get_state(), "final");
//! assert_eq!(*store.get_server_state(), "draft");
//! ```

pub mod config;
pub mod error;
pub mod store;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use config::{Environment, StoreConfig};
pub use error::{Result, StoreError};
pub use store::{create_sync_store, Listener, SyncStore, Transition, Unsubscribe};
pub use sync::{equality, Dispatch, ExternalSource, SyncExternalStore};
pub use types::{EqualityFn, Reducer, Selector};
