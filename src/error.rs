//! Error types for syncstore.

use std::any::Any;

use thiserror::Error;

/// Failures contained at the dispatch boundary.
///
/// [`SyncStore::dispatch`](crate::SyncStore::dispatch) logs and swallows these;
/// [`SyncStore::try_dispatch`](crate::SyncStore::try_dispatch) also hands them back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The reducer panicked. State was left untouched and no listener ran.
    #[error("transition function panicked: {message}")]
    TransitionPanicked { message: String },

    /// A listener panicked after the state was committed. The rest of that
    /// notification pass was skipped.
    #[error("listener panicked during notification: {message}")]
    ListenerPanicked { message: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
