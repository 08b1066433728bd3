use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Process environment edits recorded for one test. Every variable touched is
/// remembered with its value from before the first edit and put back when the
/// scope ends.
pub(super) struct EnvScope {
    saved: HashMap<&'static str, Option<String>>,
}

impl EnvScope {
    fn remember(&mut self, key: &'static str) {
        self.saved
            .entry(key)
            .or_insert_with(|| std::env::var(key).ok());
    }

    pub(super) fn set(&mut self, key: &'static str, value: &str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_MUTEX is held for the lifetime of every EnvScope.
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub(super) fn unset(&mut self, key: &'static str) -> &mut Self {
        self.remember(key);
        // SAFETY: ENV_MUTEX is held for the lifetime of every EnvScope.
        unsafe { std::env::remove_var(key) };
        self
    }
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain() {
            // SAFETY: runs before `with_env` releases ENV_MUTEX.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}

/// Run `body` with exclusive access to the process environment. Edits made
/// through the scope are reverted afterwards, also when `body` panics.
pub(super) fn with_env<T>(body: impl FnOnce(&mut EnvScope) -> T) -> T {
    let _held = ENV_MUTEX.lock().unwrap_or_else(PoisonError::into_inner);
    let mut scope = EnvScope {
        saved: HashMap::new(),
    };
    body(&mut scope)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_restores_unset_variables() {
        with_env(|env| {
            env.set("VOXPLAN_TEST_SCOPE", "before");
        });
        assert!(std::env::var("VOXPLAN_TEST_SCOPE").is_err());

        with_env(|env| {
            env.unset("VOXPLAN_TEST_SCOPE").set("VOXPLAN_TEST_SCOPE", "a");
            env.set("VOXPLAN_TEST_SCOPE", "b");
            assert_eq!(std::env::var("VOXPLAN_TEST_SCOPE").as_deref(), Ok("b"));
        });
        assert!(std::env::var("VOXPLAN_TEST_SCOPE").is_err());
    }

    #[test]
    fn scope_restores_after_panic() {
        let result = std::panic::catch_unwind(|| {
            with_env(|env| {
                env.set("VOXPLAN_TEST_PANIC", "set");
                panic!("test body failed");
            })
        });
        assert!(result.is_err());
        assert!(std::env::var("VOXPLAN_TEST_PANIC").is_err());

        // A panicked scope poisons the mutex; later scopes still run.
        with_env(|env| {
            env.set("VOXPLAN_TEST_PANIC", "again");
        });
    }
}
