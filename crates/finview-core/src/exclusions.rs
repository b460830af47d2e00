//! Excluded-group configuration and the tri-state persisted preference

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One server-configured excludable group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub group_id: i64,
    pub label: String,
    pub default_active: bool,
}

impl ExclusionEntry {
    pub fn new(group_id: i64, label: impl Into<String>, default_active: bool) -> Self {
        Self { group_id, label: label.into(), default_active }
    }
}

/// The persisted exclusion preference.
///
/// `Unset` (no preference ever stored) and `Selected` with an empty set
/// (the user intentionally cleared every exclusion) are different states:
/// only the former falls back to the server defaults. Never model this
/// with a plain possibly-empty collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionPreference {
    Unset,
    Selected(BTreeSet<i64>),
}

impl ExclusionPreference {
    /// Decode from a stored preference value; an absent value is `Unset`
    pub fn from_stored(value: Option<serde_json::Value>) -> Self {
        match value {
            None => ExclusionPreference::Unset,
            Some(value) => {
                let ids = value
                    .as_array()
                    .map(|items| items.iter().filter_map(|v| v.as_i64()).collect())
                    .unwrap_or_default();
                ExclusionPreference::Selected(ids)
            }
        }
    }

    /// Encode for the preference store; `Unset` stores nothing
    pub fn to_stored(&self) -> Option<serde_json::Value> {
        match self {
            ExclusionPreference::Unset => None,
            ExclusionPreference::Selected(ids) => {
                Some(serde_json::Value::from(ids.iter().copied().collect::<Vec<_>>()))
            }
        }
    }
}

/// The cached exclusion configuration, fetched once per session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionDefaults {
    entries: Vec<ExclusionEntry>,
}

impl ExclusionDefaults {
    pub fn new(entries: Vec<ExclusionEntry>) -> Self {
        Self { entries }
    }

    /// All configured entries, for rendering as togglable checkboxes
    pub fn entries(&self) -> &[ExclusionEntry] {
        &self.entries
    }

    /// The set excluded by default
    pub fn default_set(&self) -> BTreeSet<i64> {
        self.entries
            .iter()
            .filter(|e| e.default_active)
            .map(|e| e.group_id)
            .collect()
    }

    /// Resolve the active exclusion set from the persisted preference
    pub fn resolve(&self, preference: &ExclusionPreference) -> BTreeSet<i64> {
        match preference {
            ExclusionPreference::Unset => self.default_set(),
            ExclusionPreference::Selected(ids) => ids.clone(),
        }
    }

    /// Label of an excludable group, if configured
    pub fn label_of(&self, group_id: i64) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.group_id == group_id)
            .map(|e| e.label.as_str())
    }
}

// ==================== Tests ====================
