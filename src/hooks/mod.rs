// src/hooks/mod.rs

//! Observer sink for run events.
//!
//! The supervisor reports everything it has to say through an
//! [`OutputSink`]: informational messages, errors, the final success line and
//! the child's output lines. [`HookRegistry`] is the standard implementation;
//! it fans each message out to the hooks registered for its category.
//!
//! When a category has no hook, the registry falls back according to its
//! [`MissingHookPolicy`]:
//! - `Print` (default): `Error` goes to stderr, `ProcessOutput` to stdout,
//!   `Info` and `Success` are dropped with a warning.
//! - `Warn`: every category is dropped with a warning.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

pub use crate::types::MissingHookPolicy;

/// Event category reported to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Info,
    Error,
    Success,
    ProcessOutput,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Info => "info",
            Category::Error => "error",
            Category::Success => "success",
            Category::ProcessOutput => "process-output",
        };
        f.write_str(name)
    }
}

/// Anything that can receive categorized run events.
pub trait OutputSink: Send + Sync {
    fn emit(&self, category: Category, message: &str);
}

/// A registered observer callback.
pub type Hook = Arc<dyn Fn(&str) + Send + Sync>;

/// Append-only registry of hooks keyed by category.
pub struct HookRegistry {
    hooks: RwLock<HashMap<Category, Vec<Hook>>>,
    missing: MissingHookPolicy,
}

impl HookRegistry {
    pub fn new(missing: MissingHookPolicy) -> Self {
        Self {
            hooks: RwLock::new(HashMap::new()),
            missing,
        }
    }

    pub fn missing_policy(&self) -> MissingHookPolicy {
        self.missing
    }

    /// Append a hook for `category`. Existing hooks are kept.
    pub fn register<F>(&self, category: Category, hook: F)
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.register_many(category, [Arc::new(hook) as Hook]);
    }

    /// Append several hooks for `category`, in order.
    pub fn register_many(&self, category: Category, hooks: impl IntoIterator<Item = Hook>) {
        let mut guard = match self.hooks.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.entry(category).or_default().extend(hooks);
    }

    /// Number of hooks currently registered for `category`.
    pub fn hook_count(&self, category: Category) -> usize {
        self.snapshot(category).len()
    }

    fn snapshot(&self, category: Category) -> Vec<Hook> {
        let guard = match self.hooks.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.get(&category).cloned().unwrap_or_default()
    }

    fn fallback(&self, category: Category, message: &str) {
        match (self.missing, category) {
            (MissingHookPolicy::Print, Category::Error) => eprintln!("{message}"),
            (MissingHookPolicy::Print, Category::ProcessOutput) => println!("{message}"),
            _ => warn!(%category, msg = %message, "no hook registered; message dropped"),
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new(MissingHookPolicy::default())
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(Category, usize)> = [
            Category::Info,
            Category::Error,
            Category::Success,
            Category::ProcessOutput,
        ]
        .into_iter()
        .map(|c| (c, self.hook_count(c)))
        .collect();

        f.debug_struct("HookRegistry")
            .field("hooks", &counts)
            .field("missing", &self.missing)
            .finish()
    }
}

impl OutputSink for HookRegistry {
    fn emit(&self, category: Category, message: &str) {
        debug!(target: "procrun::process", %category, "{}", message);

        // Hooks run outside the lock so they may register further hooks.
        let hooks = self.snapshot(category);
        if hooks.is_empty() {
            self.fallback(category, message);
            return;
        }
        for hook in hooks {
            hook(message);
        }
    }
}

/// Register plain console hooks: errors to stderr, everything else to stdout.
pub fn register_console_hooks(registry: &HookRegistry) {
    registry.register(Category::Info, |msg| println!("{msg}"));
    registry.register(Category::Success, |msg| println!("{msg}"));
    registry.register(Category::ProcessOutput, |msg| println!("{msg}"));
    registry.register(Category::Error, |msg| eprintln!("{msg}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn register_appends_and_emit_fans_out() {
        let registry = HookRegistry::default();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            registry.register(Category::Info, move |msg| {
                seen.lock().unwrap().push(format!("{tag}:{msg}"));
            });
        }

        registry.emit(Category::Info, "hello");
        registry.emit(Category::Error, "ignored by info hooks");

        assert_eq!(registry.hook_count(Category::Info), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["first:hello".to_string(), "second:hello".to_string()]
        );
    }

    #[test]
    fn hook_registered_during_emission_is_not_called_for_it() {
        let registry = Arc::new(HookRegistry::new(MissingHookPolicy::Warn));
        let calls = Arc::new(Mutex::new(0usize));

        let inner_registry = Arc::clone(&registry);
        let inner_calls = Arc::clone(&calls);
        registry.register(Category::Info, move |_| {
            *inner_calls.lock().unwrap() += 1;
            let late_calls = Arc::clone(&inner_calls);
            inner_registry.register(Category::Info, move |_| {
                *late_calls.lock().unwrap() += 100;
            });
        });

        registry.emit(Category::Info, "once");
        assert_eq!(*calls.lock().unwrap(), 1);
        assert_eq!(registry.hook_count(Category::Info), 2);
    }
}
