use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

pub type Replacement<A, R, E> = Arc<dyn Fn(A) -> Result<R, E> + Send + Sync>;

pub enum Behavior<A, R, E> {
    Return(R),
    Raise(E),
    Call(Replacement<A, R, E>),
}

impl<A, R, E> Behavior<A, R, E> {
    pub fn returns(value: R) -> Self {
        Behavior::Return(value)
    }

    pub fn raises(error: E) -> Self {
        Behavior::Raise(error)
    }

    pub fn calls<F>(f: F) -> Self
    where
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        Behavior::Call(Arc::new(f))
    }
}

impl<A, R, E> Behavior<A, R, E>
where
    A: 'static,
    R: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn into_replacement(self) -> Replacement<A, R, E> {
        match self {
            Behavior::Return(value) => Arc::new(move |_| Ok(value.clone())),
            Behavior::Raise(error) => Arc::new(move |_| Err(error.clone())),
            Behavior::Call(f) => f,
        }
    }
}

/// A replaceable operation on a test double.
///
/// Calls are recorded whether or not a substitution is active. The
/// harness never asserts on them; tests may.
pub struct Slot<A, R, E> {
    name: &'static str,
    next_id: AtomicU64,
    active: Mutex<Vec<(u64, Replacement<A, R, E>)>>,
    calls: Mutex<Vec<A>>,
}

impl<A, R, E> Slot<A, R, E> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            next_id: AtomicU64::new(0),
            active: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_substituted(&self) -> bool {
        !lock(&self.active).is_empty()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    fn install(&self, replacement: Replacement<A, R, E>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.active).push((id, replacement));
        debug!(operation = self.name, substitution = id, "Installed substitution");
        id
    }

    fn revert(&self, id: u64) {
        let mut active = lock(&self.active);
        if let Some(pos) = active.iter().position(|(i, _)| *i == id) {
            active.remove(pos);
            debug!(operation = self.name, substitution = id, "Reverted substitution");
        }
    }
}

impl<A: Clone, R, E> Slot<A, R, E> {
    pub fn calls(&self) -> Vec<A> {
        lock(&self.calls).clone()
    }

    /// Records the call and runs the innermost active substitution.
    /// `None` means nothing is substituted and the real operation should run.
    pub fn intercept(&self, args: &A) -> Option<Result<R, E>> {
        lock(&self.calls).push(args.clone());
        // Clone out of the lock so a replacement may call back into the slot.
        let current = lock(&self.active).last().map(|(_, f)| f.clone());
        current.map(|f| f(args.clone()))
    }
}

impl<A, R, E> fmt::Debug for Slot<A, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("name", &self.name)
            .field("substitutions", &lock(&self.active).len())
            .field("calls", &lock(&self.calls).len())
            .finish()
    }
}

#[must_use = "the substitution is reverted as soon as the guard is dropped"]
pub struct Substitution<'a, A, R, E> {
    slot: &'a Slot<A, R, E>,
    id: u64,
}

impl<A, R, E> Substitution<'_, A, R, E> {
    pub fn operation(&self) -> &'static str {
        self.slot.name
    }

    pub fn revert(self) {}
}

impl<A, R, E> Drop for Substitution<'_, A, R, E> {
    fn drop(&mut self) {
        self.slot.revert(self.id);
    }
}

pub fn substitute_call<'a, A, R, E>(
    target: &'a Slot<A, R, E>,
    behavior: Behavior<A, R, E>,
) -> Substitution<'a, A, R, E>
where
    A: 'static,
    R: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    let id = target.install(behavior.into_replacement());
    Substitution { slot: target, id }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Fetch = Slot<String, Option<String>, String>;

    fn fetch(slot: &Fetch, key: &str) -> Result<Option<String>, String> {
        let key = key.to_string();
        slot.intercept(&key)
            .unwrap_or_else(|| Ok(Some(format!("real:{key}"))))
    }

    #[test]
    fn unsubstituted_slot_falls_through() {
        let slot = Fetch::new("fetch");
        assert_eq!(fetch(&slot, "a"), Ok(Some("real:a".into())));
        assert!(!slot.is_substituted());
        assert_eq!(slot.call_count(), 1);
    }

    #[test]
    fn returns_fixed_value_until_reverted() {
        let slot = Fetch::new("fetch");
        {
            let _guard = substitute_call(&slot, Behavior::returns(None));
            assert_eq!(fetch(&slot, "missing.txt"), Ok(None));
        }
        assert_eq!(fetch(&slot, "missing.txt"), Ok(Some("real:missing.txt".into())));
    }

    #[test]
    fn raises_configured_error() {
        let slot = Fetch::new("fetch");
        let _guard = substitute_call(&slot, Behavior::raises("Resource unavailable".to_string()));
        assert_eq!(fetch(&slot, "a"), Err("Resource unavailable".into()));
    }

    #[test]
    fn replacement_receives_arguments() {
        let slot = Fetch::new("fetch");
        let _guard = substitute_call(
            &slot,
            Behavior::calls(|key: String| Ok(Some(key.to_uppercase()))),
        );
        assert_eq!(fetch(&slot, "abc"), Ok(Some("ABC".into())));
        assert_eq!(slot.calls(), vec!["abc".to_string()]);
    }

    #[test]
    fn nested_substitutions_shadow_and_unwind() {
        let slot = Fetch::new("fetch");
        let outer = substitute_call(&slot, Behavior::returns(Some("outer".into())));
        {
            let _inner = substitute_call(&slot, Behavior::returns(Some("inner".into())));
            assert_eq!(fetch(&slot, "k"), Ok(Some("inner".into())));
        }
        assert_eq!(fetch(&slot, "k"), Ok(Some("outer".into())));
        outer.revert();
        assert!(!slot.is_substituted());
    }

    #[test]
    fn out_of_order_revert_keeps_newest_active() {
        let slot = Fetch::new("fetch");
        let first = substitute_call(&slot, Behavior::returns(Some("first".into())));
        let _second = substitute_call(&slot, Behavior::returns(Some("second".into())));
        drop(first);
        assert_eq!(fetch(&slot, "k"), Ok(Some("second".into())));
    }

    #[test]
    fn unreached_substitution_is_not_an_error() {
        let slot = Fetch::new("fetch");
        let guard = substitute_call(&slot, Behavior::raises("never".to_string()));
        assert_eq!(guard.operation(), "fetch");
        drop(guard);
        assert_eq!(slot.call_count(), 0);
    }
}
