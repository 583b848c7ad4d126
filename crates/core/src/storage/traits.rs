//! Storage traits
//!
//! The engine never talks to storage directly; adapters hold a
//! `BundleStore` and decide when to load and save.

use std::sync::Mutex;

use tracing::warn;

use crate::models::PersistedBundle;

/// Load/save contract for the persisted bundle.
///
/// Neither operation reports failure: a missing or unreadable value loads as
/// the default bundle, and a failed save only costs reload survival, so
/// implementations log and carry on.
pub trait BundleStore {
    fn load(&self) -> PersistedBundle;

    fn save(&self, bundle: &PersistedBundle);
}

/// Drop a stored running match that breaks the scoring rules. History and
/// settings are kept.
pub(crate) fn checked(mut bundle: PersistedBundle) -> PersistedBundle {
    if let Some(Err(e)) = bundle.current_match.as_ref().map(|m| m.validate()) {
        warn!(error = %e, "Stored match is inconsistent, discarding it");
        bundle.current_match = None;
    }
    bundle
}

/// In-process store, used in tests and when no database can be opened
#[derive(Debug, Default)]
pub struct MemoryStore {
    bundle: Mutex<Option<PersistedBundle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing bundle
    pub fn with_bundle(bundle: PersistedBundle) -> Self {
        Self {
            bundle: Mutex::new(Some(bundle)),
        }
    }

    /// Whatever was saved last, if anything
    pub fn saved(&self) -> Option<PersistedBundle> {
        self.bundle.lock().ok().and_then(|b| b.clone())
    }
}

impl BundleStore for MemoryStore {
    fn load(&self) -> PersistedBundle {
        self.saved().map(checked).unwrap_or_default()
    }

    fn save(&self, bundle: &PersistedBundle) {
        match self.bundle.lock() {
            Ok(mut slot) => *slot = Some(bundle.clone()),
            Err(_) => warn!("Memory store lock poisoned, save dropped"),
        }
    }
}
