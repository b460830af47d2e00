//! Immutable filter state and its wire-parameter mapping

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalogs;
use crate::types::{Dimension, MovementKind};

/// The active query: date range, account, classification selections,
/// excluded groups, and income/expense visibility.
///
/// Every mutator returns a new value so that in-flight queries keep
/// referencing the snapshot they were issued with. Date ordering is
/// enforced upstream by [`crate::period::ReportPeriod`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub account_id: Option<i64>,
    pub payee_id: Option<i64>,
    pub group_id: Option<i64>,
    pub concept_id: Option<i64>,
    pub excluded_group_ids: BTreeSet<i64>,
    pub show_income: bool,
    pub show_expense: bool,
}

impl FilterState {
    /// A fresh filter over the given inclusive date range
    pub fn new(date_from: NaiveDate, date_to: NaiveDate) -> Self {
        Self {
            date_from,
            date_to,
            account_id: None,
            payee_id: None,
            group_id: None,
            concept_id: None,
            excluded_group_ids: BTreeSet::new(),
            show_income: true,
            show_expense: true,
        }
    }

    /// New state with a different date range
    #[must_use]
    pub fn with_date_range(&self, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        let mut next = self.clone();
        next.date_from = date_from;
        next.date_to = date_to;
        next
    }

    /// New state with a different account selection
    #[must_use]
    pub fn with_account(&self, account_id: Option<i64>) -> Self {
        let mut next = self.clone();
        next.account_id = account_id;
        next
    }

    /// New state with a classification selection on one dimension.
    ///
    /// Setting a group clears the selected concept when that concept does
    /// not belong to the new group; leaving it in place would produce a
    /// filter that silently returns empty results. Selecting a concept
    /// aligns the group to the concept's owner. `Month` is not a
    /// classification and leaves the state unchanged.
    #[must_use]
    pub fn with_classification(&self, dimension: Dimension, id: i64, catalogs: &Catalogs) -> Self {
        let mut next = self.clone();
        match dimension {
            Dimension::Month => {}
            Dimension::Payee => next.payee_id = Some(id),
            Dimension::Group => {
                next.group_id = Some(id);
                if let Some(concept_id) = next.concept_id {
                    if !catalogs.concept_belongs_to(concept_id, id) {
                        next.concept_id = None;
                    }
                }
            }
            Dimension::Concept => {
                next.concept_id = Some(id);
                if let Some(group_id) = catalogs.group_of_concept(id) {
                    next.group_id = Some(group_id);
                }
            }
        }
        next
    }

    /// New state with one classification dimension cleared.
    ///
    /// Clearing the group also clears the concept beneath it.
    #[must_use]
    pub fn without_classification(&self, dimension: Dimension) -> Self {
        let mut next = self.clone();
        match dimension {
            Dimension::Month => {}
            Dimension::Payee => next.payee_id = None,
            Dimension::Group => {
                next.group_id = None;
                next.concept_id = None;
            }
            Dimension::Concept => next.concept_id = None,
        }
        next
    }

    /// New state with a different excluded-group set
    #[must_use]
    pub fn with_exclusions(&self, excluded_group_ids: BTreeSet<i64>) -> Self {
        let mut next = self.clone();
        next.excluded_group_ids = excluded_group_ids;
        next
    }

    /// New state with different income/expense visibility toggles
    #[must_use]
    pub fn with_visibility(&self, show_income: bool, show_expense: bool) -> Self {
        let mut next = self.clone();
        next.show_income = show_income;
        next.show_expense = show_expense;
        next
    }

    /// A fresh filter keeping only the supplied date range
    #[must_use]
    pub fn reset(&self, date_from: NaiveDate, date_to: NaiveDate) -> Self {
        FilterState::new(date_from, date_to)
    }

    /// The wire restriction derived from the visibility pair
    pub fn movement_kind(&self) -> Option<MovementKind> {
        MovementKind::from_visibility(self.show_income, self.show_expense)
    }

    /// Map to the aggregation provider's query parameters
    pub fn to_query_params(&self) -> QueryParams {
        QueryParams {
            fecha_inicio: self.date_from.format("%Y-%m-%d").to_string(),
            fecha_fin: self.date_to.format("%Y-%m-%d").to_string(),
            cuenta_id: self.account_id,
            tercero_id: self.payee_id,
            grupo_id: self.group_id,
            concepto_id: self.concept_id,
            grupos_excluidos: if self.excluded_group_ids.is_empty() {
                None
            } else {
                Some(self.excluded_group_ids.iter().copied().collect())
            },
            tipo_movimiento: self.movement_kind(),
        }
    }
}

/// Query parameters as the aggregation provider expects them.
///
/// `grupos_excluidos` is omitted entirely when empty; omission, not an
/// empty array, signals "no exclusion". `tipo_movimiento` is omitted when
/// both or neither visibility toggle is active.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryParams {
    pub fecha_inicio: String,
    pub fecha_fin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cuenta_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tercero_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concepto_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grupos_excluidos: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo_movimiento: Option<MovementKind>,
}

// ==================== Tests ====================
