//! Process-wide command factory.
//!
//! Production code installs the provider factory once at startup; the
//! acceptance harness swaps in a mock-backed one for the duration of a test
//! and the [`FactoryGuard`] restores the previous one on drop.

use std::sync::{Arc, RwLock};

use crate::command::Command;

/// Builds a fresh command instance, with its provider handle bound, for a
/// canonical command key such as `createinstance`.
pub trait CommandFactory: Send + Sync {
    fn build(&self, key: &str) -> Option<Box<dyn Command>>;

    /// Every key this factory can build, sorted.
    fn keys(&self) -> Vec<String>;
}

static FACTORY: RwLock<Option<Arc<dyn CommandFactory>>> = RwLock::new(None);

/// Install `factory`, returning the previously installed one.
pub fn set_factory(factory: Arc<dyn CommandFactory>) -> Option<Arc<dyn CommandFactory>> {
    let mut slot = FACTORY.write().unwrap_or_else(|e| e.into_inner());
    slot.replace(factory)
}

pub fn current_factory() -> Option<Arc<dyn CommandFactory>> {
    FACTORY.read().unwrap_or_else(|e| e.into_inner()).clone()
}

fn restore(previous: Option<Arc<dyn CommandFactory>>) {
    let mut slot = FACTORY.write().unwrap_or_else(|e| e.into_inner());
    *slot = previous;
}

/// Install `factory` until the returned guard is dropped.
pub fn swap_factory(factory: Arc<dyn CommandFactory>) -> FactoryGuard {
    FactoryGuard {
        previous: set_factory(factory),
    }
}

#[must_use = "the previous factory is restored when the guard is dropped"]
pub struct FactoryGuard {
    previous: Option<Arc<dyn CommandFactory>>,
}

impl Drop for FactoryGuard {
    fn drop(&mut self) {
        restore(self.previous.take());
    }
}
