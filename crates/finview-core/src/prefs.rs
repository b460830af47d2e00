//! Persisted per-page preference store

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Opaque key-value store for filter and exclusion preferences that survive
/// navigation within a session.
///
/// Always injected, never ambient: a fake store makes the session
/// deterministic under test. An absent key is meaningful (the tri-state
/// exclusion preference reads it as "unset"), so implementations must not
/// invent defaults.
pub trait PreferenceStore: Send + Sync {
    /// Read a stored value, if any
    fn get(&self, key: &str) -> Option<serde_json::Value>;

    /// Store a value, replacing any previous one
    fn set(&self, key: &str, value: serde_json::Value);

    /// Remove a stored value
    fn remove(&self, key: &str);
}

/// Preference store reference type
pub type PrefsRef = Arc<dyn PreferenceStore>;

/// Preference key for a report page field, e.g. `reports.expenses.filter`
pub fn page_key(page: &str, field: &str) -> String {
    format!("reports.{}.{}", page, field)
}

/// In-memory store for tests and single-process use
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: serde_json::Value) {
        self.values.write().unwrap().insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.values.write().unwrap().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(store.get("reports.expenses.filter"), None);

        store.set("reports.expenses.filter", serde_json::json!({"account_id": 3}));
        assert_eq!(
            store.get("reports.expenses.filter"),
            Some(serde_json::json!({"account_id": 3}))
        );

        store.remove("reports.expenses.filter");
        assert_eq!(store.get("reports.expenses.filter"), None);
    }

    #[test]
    fn test_page_key_format() {
        assert_eq!(page_key("monthly", "exclusions"), "reports.monthly.exclusions");
    }
}
