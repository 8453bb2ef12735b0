use std::cell::RefCell;
use std::env;
use std::ffi::{OsStr, OsString};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

static ENV_LOCK: Mutex<()> = Mutex::new(());
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static OVERRIDES: RefCell<Option<Overrides>> = const { RefCell::new(None) };
}

// Held by a thread while any of its scopes is live.
struct Overrides {
    _lock: MutexGuard<'static, ()>,
    live: usize,
    vars: Vec<Layered>,
}

// The value a variable had before any scope touched it, and one layer per
// scope that has set or removed it since. The environment always shows the
// top layer.
struct Layered {
    key: String,
    original: Option<OsString>,
    layers: Vec<(u64, Option<OsString>)>,
}

/// Environment overrides undone on drop. Scopes on one thread share a
/// process-wide lock until the last of them is gone.
pub struct EnvScope {
    id: u64,
    keys: Vec<String>,
    _thread_bound: PhantomData<MutexGuard<'static, ()>>,
}

impl EnvScope {
    pub fn new() -> Self {
        OVERRIDES.with(|cell| {
            let mut state = cell.borrow_mut();
            match state.as_mut() {
                Some(overrides) => overrides.live += 1,
                // A test that panicked while holding the lock has already
                // restored its variables during unwinding.
                None => {
                    *state = Some(Overrides {
                        _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
                        live: 1,
                        vars: Vec::new(),
                    })
                }
            }
        });
        Self {
            id: NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed),
            keys: Vec::new(),
            _thread_bound: PhantomData,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> &mut Self {
        debug!(key = %key, value = %value, "Overriding environment variable");
        self.apply(key, Some(OsString::from(value)));
        self
    }

    pub fn remove(&mut self, key: &str) -> &mut Self {
        debug!(key = %key, "Removing environment variable");
        self.apply(key, None);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn restore(&mut self) {
        let keys = std::mem::take(&mut self.keys);
        if keys.is_empty() {
            return;
        }
        let id = self.id;
        let _ = OVERRIDES.try_with(|cell| {
            if let Some(overrides) = cell.borrow_mut().as_mut() {
                for var in overrides.vars.iter_mut().filter(|v| keys.contains(&v.key)) {
                    var.layers.retain(|(owner, _)| *owner != id);
                    let visible = var.layers.last().map_or(&var.original, |(_, value)| value);
                    write_var(&var.key, visible.as_deref());
                    debug!(key = %var.key, "Restored environment variable");
                }
                overrides.vars.retain(|v| !v.layers.is_empty());
            }
        });
    }

    fn apply(&mut self, key: &str, value: Option<OsString>) {
        let id = self.id;
        OVERRIDES.with(|cell| {
            if let Some(overrides) = cell.borrow_mut().as_mut() {
                let index = match overrides.vars.iter().position(|v| v.key == key) {
                    Some(index) => index,
                    None => {
                        overrides.vars.push(Layered {
                            key: key.to_string(),
                            original: env::var_os(key),
                            layers: Vec::new(),
                        });
                        overrides.vars.len() - 1
                    }
                };
                let var = &mut overrides.vars[index];
                var.layers.retain(|(owner, _)| *owner != id);
                var.layers.push((id, value.clone()));
            }
        });
        write_var(key, value.as_deref());
        if !self.keys.iter().any(|k| k == key) {
            self.keys.push(key.to_string());
        }
    }
}

fn write_var(key: &str, value: Option<&OsStr>) {
    match value {
        Some(value) => env::set_var(key, value),
        None => env::remove_var(key),
    }
}

impl Default for EnvScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        self.restore();
        let _ = OVERRIDES.try_with(|cell| {
            let mut state = cell.borrow_mut();
            let last = match state.as_mut() {
                Some(overrides) => {
                    overrides.live = overrides.live.saturating_sub(1);
                    overrides.live == 0
                }
                None => false,
            };
            if last {
                *state = None;
            }
        });
    }
}

pub fn override_environment(key: &str, value: &str) -> EnvScope {
    let mut scope = EnvScope::new();
    scope.set(key, value);
    scope
}

pub fn remove_environment(key: &str) -> EnvScope {
    let mut scope = EnvScope::new();
    scope.remove(key);
    scope
}
