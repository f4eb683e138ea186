use std::sync::{LazyLock, Mutex};

/// Serializes tests that touch process environment variables.
pub(crate) static ENV_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Every `KHEALTH_*` variable read by `Config::apply_env_overrides`.
pub(crate) const OVERRIDE_VARS: [&str; 7] = [
    "KHEALTH_URL",
    "KHEALTH_API_TOKEN",
    "KHEALTH_NOTIFY_DEVICE",
    "KHEALTH_HA_URL",
    "KHEALTH_HA_TOKEN",
    "KHEALTH_GATEWAY_HOST",
    "KHEALTH_GATEWAY_PORT",
];

/// Restores the captured variables to their previous values on drop.
pub(crate) struct EnvVarGuard {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvVarGuard {
    /// Start from a clean slate: every override variable removed.
    pub(crate) fn clean() -> Self {
        let mut guard = Self { saved: Vec::new() };
        for key in OVERRIDE_VARS {
            guard.remove(key);
        }
        guard
    }

    pub(crate) fn set(mut self, key: &'static str, value: &str) -> Self {
        self.capture(key);
        // SAFETY: Test-only helper. Callers hold ENV_LOCK, serializing
        // concurrent env-var access.
        unsafe {
            std::env::set_var(key, value);
        }
        self
    }

    fn remove(&mut self, key: &'static str) {
        self.capture(key);
        // SAFETY: Test-only helper. Callers hold ENV_LOCK.
        unsafe {
            std::env::remove_var(key);
        }
    }

    fn capture(&mut self, key: &'static str) {
        if !self.saved.iter().any(|(saved, _)| *saved == key) {
            self.saved.push((key, std::env::var(key).ok()));
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, previous) in self.saved.drain(..).rev() {
            // SAFETY: Test-only restoration. ENV_LOCK is still held by
            // the enclosing test, so no concurrent env mutation.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
