//! Shared sort engine for aggregate tables
//!
//! One reusable function serves the top-level table and every drill level;
//! the source duplicated this logic per screen and the copies drifted.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::AggregateRow;

/// Sortable column of an aggregate table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    Name,
    Income,
    Expense,
    Balance,
}

impl std::str::FromStr for SortField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(SortField::Name),
            "income" => Ok(SortField::Income),
            "expense" => Ok(SortField::Expense),
            "balance" => Ok(SortField::Balance),
            _ => Err(format!("Invalid sort field: {}", s)),
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortField::Name => write!(f, "name"),
            SortField::Income => write!(f, "income"),
            SortField::Expense => write!(f, "expense"),
            SortField::Balance => write!(f, "balance"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// The opposite direction
    pub fn flipped(&self) -> SortDirection {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Per-table sort selection with click-toggle semantics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Name,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortState {
    /// Apply a header click: the current field flips direction, a new
    /// field is selected ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Stable sort of aggregate rows by one field.
///
/// Names compare case-insensitively; numeric fields compare by value.
/// Rows whose sorted field is absent go last regardless of direction.
pub fn sort_rows(rows: &mut [AggregateRow], field: SortField, direction: SortDirection) {
    rows.sort_by(|a, b| compare_rows(a, b, field, direction));
}

fn compare_rows(a: &AggregateRow, b: &AggregateRow, field: SortField, direction: SortDirection) -> Ordering {
    let ordering = match field {
        SortField::Name => directed(
            a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            direction,
        ),
        SortField::Income => compare_optional(a.income, b.income, direction),
        SortField::Expense => compare_optional(a.expense, b.expense, direction),
        SortField::Balance => compare_optional(a.balance(), b.balance(), direction),
    };
    ordering
}

/// Compare optional numbers: absent values stay last in either direction
fn compare_optional(a: Option<f64>, b: Option<f64>, direction: SortDirection) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => directed(x.total_cmp(&y), direction),
    }
}

fn directed(ordering: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

// ==================== Tests ====================
