//! Totals fold and parent/child reconciliation

use serde::{Deserialize, Serialize};

use crate::types::AggregateRow;

/// Tolerance, in currency units, below which independently fetched
/// aggregates are considered equal
pub const CURRENCY_TOLERANCE: f64 = 1.0;

/// Income/expense totals with the derived net balance
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
    pub balance: f64,
}

impl Totals {
    pub fn new(income: f64, expense: f64) -> Self {
        Self { income, expense, balance: income - expense }
    }

    /// Fold a result set into its grand total.
    ///
    /// Recompute whenever the rows change; a cached total drifts silently
    /// across re-queries.
    pub fn of_rows(rows: &[AggregateRow]) -> Totals {
        let income = rows.iter().map(|r| r.income_or_zero()).sum();
        let expense = rows.iter().map(|r| r.expense_or_zero()).sum();
        Totals::new(income, expense)
    }

    /// The totals a single row contributes
    pub fn of_row(row: &AggregateRow) -> Totals {
        Totals::new(row.income_or_zero(), row.expense_or_zero())
    }
}

impl std::fmt::Display for Totals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "income {:.2}, expense {:.2}, balance {:.2}",
            self.income, self.expense, self.balance
        )
    }
}

/// Drift between a parent row's totals and the fold of its children,
/// signed as child minus parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcileDrift {
    pub income: f64,
    pub expense: f64,
}

/// Check that child rows sum back to the parent totals within tolerance.
///
/// The two sides come from independently issued provider queries, so a
/// mismatch means the aggregates have drifted (or a filter field was lost
/// on the way down).
pub fn reconcile(parent: &Totals, rows: &[AggregateRow], tolerance: f64) -> Result<(), ReconcileDrift> {
    let child = Totals::of_rows(rows);
    let drift = ReconcileDrift {
        income: child.income - parent.income,
        expense: child.expense - parent.expense,
    };
    if drift.income.abs() > tolerance || drift.expense.abs() > tolerance {
        Err(drift)
    } else {
        Ok(())
    }
}

// ==================== Tests ====================
