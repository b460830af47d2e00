//! Core value types for the aggregation engine

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

// ==================== Dimensions ====================

/// Classification axis used to aggregate rows.
///
/// The drill-down chain is a single transition table: each dimension knows
/// its successor and how a selected row refines the filter. `Month` only
/// appears as the root of the monthly report and narrows the date range
/// instead of setting a classification id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    /// Calendar month (monthly report root only)
    Month,
    /// Counterparty of a transaction
    Payee,
    /// Top-level spending/income category
    Group,
    /// Sub-category belonging to exactly one group
    Concept,
}

impl Dimension {
    /// The dimension one drill step deeper, if any
    pub fn next(&self) -> Option<Dimension> {
        match self {
            Dimension::Month => Some(Dimension::Payee),
            Dimension::Payee => Some(Dimension::Group),
            Dimension::Group => Some(Dimension::Concept),
            Dimension::Concept => None,
        }
    }

    /// Human-readable label for drill titles
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Month => "Month",
            Dimension::Payee => "Payee",
            Dimension::Group => "Group",
            Dimension::Concept => "Concept",
        }
    }

    /// Query parameter name carrying this dimension's identity, if any
    pub fn query_field(&self) -> Option<&'static str> {
        match self {
            Dimension::Month => None,
            Dimension::Payee => Some("tercero_id"),
            Dimension::Group => Some("grupo_id"),
            Dimension::Concept => Some("concepto_id"),
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "month" => Ok(Dimension::Month),
            "payee" => Ok(Dimension::Payee),
            "group" => Ok(Dimension::Group),
            "concept" => Ok(Dimension::Concept),
            _ => Err(format!("Invalid dimension: {}", s)),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::Month => write!(f, "month"),
            Dimension::Payee => write!(f, "payee"),
            Dimension::Group => write!(f, "group"),
            Dimension::Concept => write!(f, "concept"),
        }
    }
}

// ==================== Movement Kind ====================

/// Income/expense restriction on the wire (`tipo_movimiento`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "ingresos")]
    Income,
    #[serde(rename = "egresos")]
    Expense,
}

impl MovementKind {
    /// Derive the wire restriction from the visibility toggle pair.
    ///
    /// Both toggles off means "show all", not "show nothing", so both-on and
    /// both-off map to no restriction.
    pub fn from_visibility(show_income: bool, show_expense: bool) -> Option<MovementKind> {
        match (show_income, show_expense) {
            (true, false) => Some(MovementKind::Income),
            (false, true) => Some(MovementKind::Expense),
            _ => None,
        }
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovementKind::Income => write!(f, "ingresos"),
            MovementKind::Expense => write!(f, "egresos"),
        }
    }
}

// ==================== Aggregate Rows ====================

/// One pre-aggregated row for a dimension and filter.
///
/// Rows carry no id; drill-down identity is recovered by exact name-match
/// against the catalogs. The numeric fields are optional because the
/// provider may omit a component it did not compute; absent values sort
/// last and count as zero in totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Display name within the dimension (unique per query result)
    pub name: String,
    /// Total income for this node, if reported
    #[serde(default)]
    pub income: Option<f64>,
    /// Total expense for this node, if reported
    #[serde(default)]
    pub expense: Option<f64>,
}

impl AggregateRow {
    /// Create a row with both components present
    pub fn new(name: impl Into<String>, income: f64, expense: f64) -> Self {
        Self {
            name: name.into(),
            income: Some(income),
            expense: Some(expense),
        }
    }

    /// Income component, treating an absent value as zero
    pub fn income_or_zero(&self) -> f64 {
        self.income.unwrap_or(0.0)
    }

    /// Expense component, treating an absent value as zero
    pub fn expense_or_zero(&self) -> f64 {
        self.expense.unwrap_or(0.0)
    }

    /// Net balance, None when neither component was reported
    pub fn balance(&self) -> Option<f64> {
        match (self.income, self.expense) {
            (None, None) => None,
            _ => Some(self.income_or_zero() - self.expense_or_zero()),
        }
    }
}

// ==================== Transactions ====================

/// A classified bank transaction as stored by the CRUD collaborator.
///
/// Read-only from the engine's perspective; the aggregation provider folds
/// these into [`AggregateRow`]s server-side. Invariant: `concept_id` set
/// implies `group_id` set (a concept belongs to exactly one group).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDate,
    /// Signed amount: positive is income, negative is expense
    pub amount: f64,
    pub account_id: i64,
    pub payee_id: Option<i64>,
    pub group_id: Option<i64>,
    pub concept_id: Option<i64>,
}

impl Transaction {
    /// Whether the signed amount counts as income
    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }

    /// Whether the signed amount counts as expense
    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// Expense magnitude (zero for income rows)
    pub fn expense_amount(&self) -> f64 {
        if self.is_expense() { -self.amount } else { 0.0 }
    }

    /// Income magnitude (zero for expense rows)
    pub fn income_amount(&self) -> f64 {
        if self.is_income() { self.amount } else { 0.0 }
    }

    /// Check the concept-implies-group classification invariant
    pub fn classification_consistent(&self) -> bool {
        self.concept_id.is_none() || self.group_id.is_some()
    }
}

// ==================== Tests ====================
