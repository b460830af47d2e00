//! Shared test fixtures: a transaction-backed aggregation provider and
//! catalogs mirroring a small classified ledger
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use finview::engine::period::month_key;
use finview::{
    AggregateRow, AggregationProvider, CatalogEntry, Catalogs, ConceptEntry, Dimension,
    ExclusionEntry, FilterState, MovementKind, ProviderError, QueryParams, Transaction,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn catalogs() -> Catalogs {
    Catalogs {
        accounts: vec![CatalogEntry::new(1, "Checking"), CatalogEntry::new(2, "Savings")],
        payees: vec![
            CatalogEntry::new(11, "Acme"),
            CatalogEntry::new(12, "Beta"),
            CatalogEntry::new(13, "Cafe Luna"),
        ],
        groups: vec![
            CatalogEntry::new(5, "Housing"),
            CatalogEntry::new(6, "Salary"),
            CatalogEntry::new(7, "Transfers"),
            CatalogEntry::new(8, "Dining"),
        ],
        concepts: vec![
            ConceptEntry::new(51, "Rent", 5),
            ConceptEntry::new(52, "Repairs", 5),
            ConceptEntry::new(61, "Wages", 6),
            ConceptEntry::new(71, "Internal Move", 7),
            ConceptEntry::new(81, "Restaurants", 8),
        ],
    }
}

pub fn exclusion_entries() -> Vec<ExclusionEntry> {
    vec![
        ExclusionEntry::new(7, "Transfers", true),
        ExclusionEntry::new(8, "Dining", false),
    ]
}

fn txn(
    id: i64,
    date: NaiveDate,
    amount: f64,
    account_id: i64,
    payee_id: Option<i64>,
    group_id: Option<i64>,
    concept_id: Option<i64>,
) -> Transaction {
    Transaction { id, date, amount, account_id, payee_id, group_id, concept_id }
}

/// Two classified months of activity plus one unclassified movement
pub fn ledger() -> Vec<Transaction> {
    vec![
        txn(1, d(2025, 1, 5), -500_000.0, 1, Some(11), Some(5), Some(51)),
        txn(2, d(2025, 1, 10), 200_000.0, 1, Some(12), Some(6), Some(61)),
        txn(3, d(2025, 1, 15), -30_000.0, 1, Some(13), Some(8), Some(81)),
        txn(4, d(2025, 1, 20), -100_000.0, 1, Some(11), Some(7), Some(71)),
        txn(5, d(2025, 1, 25), -5_000.0, 1, None, None, None),
        txn(6, d(2025, 2, 3), -450_000.0, 1, Some(11), Some(5), Some(51)),
        txn(7, d(2025, 2, 12), 200_000.0, 2, Some(12), Some(6), Some(61)),
    ]
}

/// Exactly the two-payee scenario: one expense payee, one income payee,
/// and one transfer that the default exclusion set removes
pub fn scenario_ledger() -> Vec<Transaction> {
    vec![
        txn(1, d(2025, 1, 5), -500_000.0, 1, Some(11), Some(5), Some(51)),
        txn(2, d(2025, 1, 10), 200_000.0, 1, Some(12), Some(6), Some(61)),
        txn(3, d(2025, 1, 20), -100_000.0, 1, Some(11), Some(7), Some(71)),
    ]
}

/// Aggregation provider folding raw transactions per dimension, the way the
/// real query service does server-side. Records every query's wire
/// parameters and can be told to fail the next call.
pub struct LedgerProvider {
    transactions: Vec<Transaction>,
    catalogs: Catalogs,
    exclusions: Vec<ExclusionEntry>,
    queries: Mutex<Vec<(Dimension, QueryParams)>>,
    fail_next: AtomicBool,
}

impl LedgerProvider {
    pub fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            catalogs: catalogs(),
            exclusions: exclusion_entries(),
            queries: Mutex::new(Vec::new()),
            fail_next: AtomicBool::new(false),
        }
    }

    /// Every query issued so far, as (dimension, wire parameters)
    pub fn queries(&self) -> Vec<(Dimension, QueryParams)> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    /// Make the next query fail with a request error
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn matches(transaction: &Transaction, filter: &FilterState) -> bool {
        if transaction.date < filter.date_from || transaction.date > filter.date_to {
            return false;
        }
        if let Some(account_id) = filter.account_id {
            if transaction.account_id != account_id {
                return false;
            }
        }
        if let Some(payee_id) = filter.payee_id {
            if transaction.payee_id != Some(payee_id) {
                return false;
            }
        }
        if let Some(group_id) = filter.group_id {
            if transaction.group_id != Some(group_id) {
                return false;
            }
        }
        if let Some(concept_id) = filter.concept_id {
            if transaction.concept_id != Some(concept_id) {
                return false;
            }
        }
        if let Some(group_id) = transaction.group_id {
            if filter.excluded_group_ids.contains(&group_id) {
                return false;
            }
        }
        match filter.movement_kind() {
            Some(MovementKind::Income) => transaction.is_income(),
            Some(MovementKind::Expense) => transaction.is_expense(),
            None => true,
        }
    }

    fn name_of(entries: &[CatalogEntry], id: Option<i64>) -> String {
        id.and_then(|id| entries.iter().find(|e| e.id == id))
            .map(|e| e.name.clone())
            .unwrap_or_else(|| "Unclassified".to_string())
    }

    fn row_key(&self, transaction: &Transaction, dimension: Dimension) -> String {
        match dimension {
            Dimension::Month => month_key(&transaction.date),
            Dimension::Payee => Self::name_of(&self.catalogs.payees, transaction.payee_id),
            Dimension::Group => Self::name_of(&self.catalogs.groups, transaction.group_id),
            Dimension::Concept => transaction
                .concept_id
                .and_then(|id| self.catalogs.concepts.iter().find(|c| c.id == id))
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Unclassified".to_string()),
        }
    }
}

#[async_trait]
impl AggregationProvider for LedgerProvider {
    async fn query(
        &self,
        dimension: Dimension,
        filter: &FilterState,
    ) -> Result<Vec<AggregateRow>, ProviderError> {
        self.queries.lock().unwrap().push((dimension, filter.to_query_params()));

        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProviderError::Request { message: "injected failure".to_string() });
        }

        let mut rows: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for transaction in self.transactions.iter().filter(|t| Self::matches(t, filter)) {
            let entry = rows.entry(self.row_key(transaction, dimension)).or_insert((0.0, 0.0));
            entry.0 += transaction.income_amount();
            entry.1 += transaction.expense_amount();
        }

        Ok(rows
            .into_iter()
            .map(|(name, (income, expense))| AggregateRow::new(name, income, expense))
            .collect())
    }

    async fn exclusion_config(&self) -> Result<Vec<ExclusionEntry>, ProviderError> {
        Ok(self.exclusions.clone())
    }
}
