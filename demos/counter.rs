//! Counter store driven by a reducer, with a listener and a contained failure.
//!
//! Run with `RUST_LOG=debug cargo run --example counter` to see the store's
//! diagnostics.

use std::sync::Arc;

use syncstore::{StoreConfig, SyncStore};

#[derive(Debug, Clone, PartialEq)]
struct Counter {
    count: i32,
    step: i32,
}

#[derive(Debug)]
enum Action {
    Increment,
    Decrement,
    SetStep(i32),
    Divide(i32),
    Unknown,
}

fn reducer(state: &Arc<Counter>, action: Action) -> Arc<Counter> {
    match action {
        Action::Increment => Arc::new(Counter {
            count: state.count + state.step,
            ..Counter::clone(state)
        }),
        Action::Decrement => Arc::new(Counter {
            count: state.count - state.step,
            ..Counter::clone(state)
        }),
        Action::SetStep(step) if step == state.step => Arc::clone(state),
        Action::SetStep(step) => Arc::new(Counter {
            step,
            ..Counter::clone(state)
        }),
        // Panics on zero; the store contains it.
        Action::Divide(by) => Arc::new(Counter {
            count: state.count / by,
            ..Counter::clone(state)
        }),
        Action::Unknown => Arc::clone(state),
    }
}

fn main() {
    env_logger::init();

    println!("=== Counter Store Example ===\n");

    let store = SyncStore::with_config(
        reducer,
        Counter { count: 0, step: 1 },
        StoreConfig::default().with_label("counter"),
    );

    let watcher = store.clone();
    let unsubscribe = store.subscribe_fn(move || {
        let state = watcher.get_state();
        println!("  -> count = {}, step = {}", state.count, state.step);
    });

    println!("Increment twice:");
    store.dispatch(Action::Increment);
    store.dispatch(Action::Increment);

    println!("\nStep 5, then decrement:");
    store.dispatch(Action::SetStep(5));
    store.dispatch(Action::Decrement);

    println!("\nUnknown action and repeated step (no notification expected):");
    store.dispatch(Action::Unknown);
    store.dispatch(Action::SetStep(5));

    println!("\nDivide by zero:");
    match store.try_dispatch(Action::Divide(0)) {
        Ok(outcome) => println!("  unexpected: {:?}", outcome),
        Err(err) => println!("  contained: {}", err),
    }
    println!("  state is still {:?}", store.get_state());

    unsubscribe.unsubscribe();
    store.dispatch(Action::Increment);
    println!("\nAfter unsubscribing, count = {}", store.get_state().count);

    store.reset();
    println!("After reset: {:?}", store.get_state());
    println!("Server state: {:?}", store.get_server_state());
}
