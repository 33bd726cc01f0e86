//! Function contracts shared by the store and its adapters.

use std::sync::Arc;

pub use crate::store::Listener;

/// Transition function: `(current state, action) -> next state`.
///
/// Return `Arc::clone(state)` to signal "no change"; any other `Arc` is
/// committed and notified. Panicking is treated as a transition failure.
pub type Reducer<S, A> = Box<dyn Fn(&Arc<S>, A) -> Arc<S> + Send + Sync>;

/// Projects a slice or computed value from the state.
pub type Selector<S, T> = Arc<dyn Fn(&S) -> T + Send + Sync>;

/// Decides whether two selections should be treated as unchanged.
pub type EqualityFn<T> = Arc<dyn Fn(&T, &T) -> bool + Send + Sync>;
