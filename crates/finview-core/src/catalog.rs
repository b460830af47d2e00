//! Read-only classification catalogs and name-to-id resolution

use serde::{Deserialize, Serialize};

use crate::types::Dimension;

/// A catalog item: account, payee, or group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: i64,
    pub name: String,
}

impl CatalogEntry {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// A concept item, which belongs to exactly one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptEntry {
    pub id: i64,
    pub name: String,
    pub group_id: i64,
}

impl ConceptEntry {
    pub fn new(id: i64, name: impl Into<String>, group_id: i64) -> Self {
        Self { id, name: name.into(), group_id }
    }
}

/// Client-side classification catalogs, assumed fully loaded before any
/// drill-down resolution is attempted.
///
/// Resolution is an exact, case-sensitive match on the provider's returned
/// row name. Two entries sharing a display name are indistinguishable here
/// (the first match wins); rows carry no id to disambiguate them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalogs {
    pub accounts: Vec<CatalogEntry>,
    pub payees: Vec<CatalogEntry>,
    pub groups: Vec<CatalogEntry>,
    pub concepts: Vec<ConceptEntry>,
}

impl Catalogs {
    /// Resolve a row name to its catalog id for a classification dimension.
    ///
    /// `Month` rows are not catalog-backed and always return None.
    pub fn resolve(&self, dimension: Dimension, name: &str) -> Option<i64> {
        match dimension {
            Dimension::Month => None,
            Dimension::Payee => Self::find(&self.payees, name),
            Dimension::Group => Self::find(&self.groups, name),
            Dimension::Concept => self.concepts.iter().find(|c| c.name == name).map(|c| c.id),
        }
    }

    fn find(entries: &[CatalogEntry], name: &str) -> Option<i64> {
        entries.iter().find(|e| e.name == name).map(|e| e.id)
    }

    /// The group a concept belongs to
    pub fn group_of_concept(&self, concept_id: i64) -> Option<i64> {
        self.concepts.iter().find(|c| c.id == concept_id).map(|c| c.group_id)
    }

    /// Whether a concept belongs to the given group
    pub fn concept_belongs_to(&self, concept_id: i64, group_id: i64) -> bool {
        self.group_of_concept(concept_id) == Some(group_id)
    }

    /// Display name of a group, if known
    pub fn group_name(&self, group_id: i64) -> Option<&str> {
        self.groups.iter().find(|g| g.id == group_id).map(|g| g.name.as_str())
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalogs {
        Catalogs {
            accounts: vec![CatalogEntry::new(1, "Checking")],
            payees: vec![CatalogEntry::new(11, "Acme"), CatalogEntry::new(12, "Beta")],
            groups: vec![CatalogEntry::new(5, "Housing"), CatalogEntry::new(7, "Transfers")],
            concepts: vec![
                ConceptEntry::new(31, "Rent", 5),
                ConceptEntry::new(32, "Repairs", 5),
                ConceptEntry::new(41, "Internal", 7),
            ],
        }
    }

    #[test]
    fn test_resolve_is_exact_and_case_sensitive() {
        let catalogs = sample();
        assert_eq!(catalogs.resolve(Dimension::Payee, "Acme"), Some(11));
        assert_eq!(catalogs.resolve(Dimension::Payee, "acme"), None);
        assert_eq!(catalogs.resolve(Dimension::Group, "Housing"), Some(5));
        assert_eq!(catalogs.resolve(Dimension::Concept, "Rent"), Some(31));
        assert_eq!(catalogs.resolve(Dimension::Payee, "Unknown"), None);
    }

    #[test]
    fn test_month_rows_are_not_catalog_backed() {
        assert_eq!(sample().resolve(Dimension::Month, "2025-01"), None);
    }

    #[test]
    fn test_concept_group_membership() {
        let catalogs = sample();
        assert_eq!(catalogs.group_of_concept(31), Some(5));
        assert!(catalogs.concept_belongs_to(31, 5));
        assert!(!catalogs.concept_belongs_to(31, 7));
        assert!(!catalogs.concept_belongs_to(99, 5));
    }
}
