//! Two "components" reading one store through the adapters.
//!
//! `PrintHost` is a toy rendering host: it re-renders its component whenever a
//! notification produces a snapshot that is not the one it rendered last.

use std::any::Any;
use std::sync::Arc;

use parking_lot::Mutex;
use syncstore::sync::{SnapshotFn, SubscribeFn};
use syncstore::{Listener, SyncExternalStore, SyncStore};

#[derive(Debug, Clone)]
struct Settings {
    theme: String,
    clicks: u32,
}

enum Action {
    Click,
    ToggleTheme,
}

fn reducer(state: &Arc<Settings>, action: Action) -> Arc<Settings> {
    let mut next = Settings::clone(state);
    match action {
        Action::Click => next.clicks += 1,
        Action::ToggleTheme => {
            let theme = if next.theme == "light" { "dark" } else { "light" };
            next.theme = theme.to_string();
        }
    }
    Arc::new(next)
}

struct PrintHost {
    name: &'static str,
    slots: Vec<Box<dyn Any + Send>>,
    cursor: usize,
}

impl PrintHost {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: Vec::new(),
            cursor: 0,
        }
    }

    fn begin_render(&mut self) {
        self.cursor = 0;
    }

    fn slot<V: Clone + Send + 'static>(&mut self, init: impl FnOnce() -> V) -> (V, bool) {
        let index = self.cursor;
        self.cursor += 1;
        let fresh = index == self.slots.len();
        if fresh {
            self.slots.push(Box::new(init()));
        }
        match self.slots[index].downcast_ref::<V>() {
            Some(value) => (value.clone(), fresh),
            None => panic!("{}: hook order changed between renders", self.name),
        }
    }
}

type Rendered<T> = Arc<Mutex<(Option<SnapshotFn<T>>, Option<Arc<T>>)>>;

impl SyncExternalStore for PrintHost {
    fn use_sync_external_store<T>(
        &mut self,
        subscribe: SubscribeFn,
        get_snapshot: SnapshotFn<T>,
        _get_server_snapshot: SnapshotFn<T>,
    ) -> Arc<T>
    where
        T: Send + Sync + 'static,
    {
        let (rendered, fresh): (Rendered<T>, bool) = self.slot(|| Arc::new(Mutex::new((None, None))));
        let value = get_snapshot();
        *rendered.lock() = (Some(get_snapshot), Some(Arc::clone(&value)));

        if fresh {
            let name = self.name;
            let listener: Listener = Arc::new(move || {
                let mut rendered = rendered.lock();
                let Some(get_snapshot) = rendered.0.clone() else { return };
                let next = get_snapshot();
                if rendered.1.as_ref().map_or(true, |prev| !Arc::ptr_eq(prev, &next)) {
                    println!("  [{}] needs re-render", name);
                    rendered.1 = Some(next);
                }
            });
            let _ = subscribe(listener);
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

fn render_header(store: &SyncStore<Settings, Action>, host: &mut PrintHost) {
    host.begin_render();
    let theme = store.use_sync_selector(host, |s: &Settings| s.theme.clone());
    println!("  header renders with theme {:?}", theme);
}

fn render_counter(store: &SyncStore<Settings, Action>, host: &mut PrintHost) {
    host.begin_render();
    let (state, _dispatch) = store.use_sync_reducer(host);
    println!("  counter renders with {} click(s)", state.clicks);
}

fn main() {
    env_logger::init();

    let store = SyncStore::new(
        reducer,
        Settings {
            theme: "light".to_string(),
            clicks: 0,
        },
    );
    let mut header = PrintHost::new("header");
    let mut counter = PrintHost::new("counter");

    println!("Initial render:");
    render_header(&store, &mut header);
    render_counter(&store, &mut counter);

    println!("\nClick (only the counter should re-render):");
    store.dispatch(Action::Click);
    render_counter(&store, &mut counter);

    println!("\nToggle theme (both re-render):");
    store.dispatch(Action::ToggleTheme);
    render_header(&store, &mut header);
    render_counter(&store, &mut counter);
}
