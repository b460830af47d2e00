//! Hierarchical aggregation and drill-down engine
//!
//! Computes per-node income/expense totals for classified bank transactions
//! and drives progressive drill-down (Payee → Group → Concept, or Month →
//! Payee → Group → Concept) against an external aggregation provider,
//! keeping filter state, sort state, and drill-down state consistent.

pub mod catalog;
pub mod drilldown;
pub mod error;
pub mod exclusions;
pub mod filter;
pub mod period;
pub mod prefs;
pub mod provider;
pub mod sort;
pub mod totals;
pub mod types;

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use finview_config::Config;

pub use catalog::{CatalogEntry, Catalogs, ConceptEntry};
pub use drilldown::{DrillDownController, DrillLevel, DrillOutcome, MAX_DEPTH};
pub use error::{EngineError, EngineResult, ErrorCode, ErrorSeverity};
pub use exclusions::{ExclusionDefaults, ExclusionEntry, ExclusionPreference};
pub use filter::{FilterState, QueryParams};
pub use period::ReportPeriod;
pub use prefs::{page_key, MemoryPreferenceStore, PreferenceStore, PrefsRef};
pub use provider::{AggregationProvider, ProviderError, ProviderRef};
pub use sort::{sort_rows, SortDirection, SortField, SortState};
pub use totals::{reconcile, ReconcileDrift, Totals, CURRENCY_TOLERANCE};
pub use types::{AggregateRow, Dimension, MovementKind, Transaction};

// ==================== Top-Level Table ====================

/// The top-level aggregate table of a report page
#[derive(Debug, Clone)]
pub struct TableState {
    /// Dimension the table aggregates by (the drill root)
    pub dimension: Dimension,
    pub data: Vec<AggregateRow>,
    pub loading: bool,
    pub sort: SortState,
}

struct SessionState {
    filter: FilterState,
    table: TableState,
    exclusions: Option<ExclusionDefaults>,
    generation: u64,
}

// ==================== Report Session ====================

/// One report page's engine state: the current filter, the top-level table,
/// the cached exclusion configuration, and the drill-down controller.
///
/// All collaborators are injected: the aggregation provider, the preference
/// store, and the fully loaded classification catalogs. Every filter
/// mutation closes any open drill levels and re-queries the table; the
/// drill levels' filters are snapshots, so a changed base filter would
/// otherwise leave them showing answers to a question no longer asked.
pub struct ReportSession {
    provider: ProviderRef,
    prefs: PrefsRef,
    catalogs: Arc<Catalogs>,
    config: Config,
    page: String,
    drill: DrillDownController,
    state: RwLock<SessionState>,
}

impl ReportSession {
    /// Create a session for a report page aggregating by `dimension`.
    ///
    /// The initial filter covers the configured default time range, or the
    /// persisted filter for this page when `features.remember_filters` is on.
    pub fn new(
        provider: ProviderRef,
        prefs: PrefsRef,
        catalogs: Arc<Catalogs>,
        config: Config,
        page: impl Into<String>,
        dimension: Dimension,
    ) -> Self {
        let page = page.into();
        let (from, to) = ReportPeriod::new(config.report.default_range).bounds();
        let mut filter = FilterState::new(from, to);

        if config.features.remember_filters {
            if let Some(stored) = prefs.get(&page_key(&page, "filter")) {
                match serde_json::from_value::<FilterState>(stored) {
                    Ok(restored) => filter = restored,
                    Err(_) => log::debug!(
                        target: "finview::session",
                        "ignoring unreadable stored filter for page '{}'",
                        page
                    ),
                }
            }
        }

        let drill = DrillDownController::new(
            provider.clone(),
            catalogs.clone(),
            config.report.reconcile_tolerance,
        );

        Self {
            provider,
            prefs,
            catalogs,
            config,
            page,
            drill,
            state: RwLock::new(SessionState {
                filter,
                table: TableState {
                    dimension,
                    data: Vec::new(),
                    loading: false,
                    sort: SortState::default(),
                },
                exclusions: None,
                generation: 0,
            }),
        }
    }

    fn filter_key(&self) -> String {
        page_key(&self.page, "filter")
    }

    fn exclusions_key(&self) -> String {
        page_key(&self.page, "exclusions")
    }

    /// Fetch and cache the exclusion configuration, seed the active
    /// exclusion set from the persisted tri-state preference, and run the
    /// first table query.
    pub async fn load(&self) -> EngineResult<DrillOutcome> {
        let needs_fetch = self.state.read().unwrap().exclusions.is_none();
        if needs_fetch {
            let entries = self.provider.exclusion_config().await?;
            let mut state = self.state.write().unwrap();
            state.exclusions = Some(ExclusionDefaults::new(entries));
        }

        {
            let mut state = self.state.write().unwrap();
            let preference = ExclusionPreference::from_stored(self.prefs.get(&self.exclusions_key()));
            let active = match &preference {
                ExclusionPreference::Unset => self.seeded_exclusions(&state),
                ExclusionPreference::Selected(ids) => ids.clone(),
            };
            state.filter = state.filter.with_exclusions(active);
        }

        self.refresh().await
    }

    /// The default exclusion set, honoring the `exclusion_defaults` feature
    fn seeded_exclusions(&self, state: &SessionState) -> BTreeSet<i64> {
        if !self.config.features.exclusion_defaults {
            return BTreeSet::new();
        }
        state
            .exclusions
            .as_ref()
            .map(|defaults| defaults.default_set())
            .unwrap_or_default()
    }

    /// Re-query the top-level table with the current filter.
    ///
    /// Last-writer-wins: a refresh superseded by a newer one (or by a filter
    /// mutation) drops its response on arrival. A failed query stops the
    /// loading flag and keeps the previously displayed rows.
    pub async fn refresh(&self) -> EngineResult<DrillOutcome> {
        let (filter, dimension, generation) = {
            let mut state = self.state.write().unwrap();
            state.generation += 1;
            state.table.loading = true;
            (state.filter.clone(), state.table.dimension, state.generation)
        };

        let result = self.provider.query(dimension, &filter).await;

        let mut state = self.state.write().unwrap();
        if state.generation != generation {
            log::debug!(
                target: "finview::session",
                "discarding stale table response for page '{}'",
                self.page
            );
            return Ok(DrillOutcome::Superseded);
        }

        match result {
            Ok(mut rows) => {
                let SortState { field, direction } = state.table.sort;
                sort_rows(&mut rows, field, direction);
                state.table.data = rows;
                state.table.loading = false;
                Ok(DrillOutcome::Applied)
            }
            Err(error) => {
                state.table.loading = false;
                log::warn!(
                    target: "finview::session",
                    "[{}] table query failed for page '{}': {}",
                    ErrorCode::ProviderFailed,
                    self.page,
                    error
                );
                Err(error.into())
            }
        }
    }

    // ==================== Filter Mutations ====================

    async fn apply_filter<F>(&self, mutate: F) -> EngineResult<DrillOutcome>
    where
        F: FnOnce(&FilterState, &Catalogs) -> FilterState,
    {
        let snapshot = {
            let mut state = self.state.write().unwrap();
            state.filter = mutate(&state.filter, &self.catalogs);
            state.filter.clone()
        };

        if self.config.features.remember_filters {
            if let Ok(value) = serde_json::to_value(&snapshot) {
                self.prefs.set(&self.filter_key(), value);
            }
        }

        // A changed base filter invalidates every open drill level
        self.drill.close_all();
        self.refresh().await
    }

    /// Change the report period
    pub async fn set_period(&self, period: ReportPeriod) -> EngineResult<DrillOutcome> {
        let (from, to) = period.bounds();
        self.apply_filter(|filter, _| filter.with_date_range(from, to)).await
    }

    /// Change the account selection
    pub async fn set_account(&self, account_id: Option<i64>) -> EngineResult<DrillOutcome> {
        self.apply_filter(|filter, _| filter.with_account(account_id)).await
    }

    /// Select a classification value on one dimension
    pub async fn set_classification(&self, dimension: Dimension, id: i64) -> EngineResult<DrillOutcome> {
        self.apply_filter(|filter, catalogs| filter.with_classification(dimension, id, catalogs))
            .await
    }

    /// Clear one classification dimension
    pub async fn clear_classification(&self, dimension: Dimension) -> EngineResult<DrillOutcome> {
        self.apply_filter(|filter, _| filter.without_classification(dimension)).await
    }

    /// Change the income/expense visibility toggles
    pub async fn set_visibility(&self, show_income: bool, show_expense: bool) -> EngineResult<DrillOutcome> {
        self.apply_filter(|filter, _| filter.with_visibility(show_income, show_expense)).await
    }

    /// Replace the excluded-group set and persist it as an explicit
    /// preference (an empty set is remembered as "none", not as "unset")
    pub async fn set_exclusions(&self, excluded: BTreeSet<i64>) -> EngineResult<DrillOutcome> {
        let preference = ExclusionPreference::Selected(excluded.clone());
        if let Some(value) = preference.to_stored() {
            self.prefs.set(&self.exclusions_key(), value);
        }
        self.apply_filter(move |filter, _| filter.with_exclusions(excluded)).await
    }

    /// Toggle one group's membership in the excluded set
    pub async fn toggle_exclusion(&self, group_id: i64) -> EngineResult<DrillOutcome> {
        let mut excluded = self.state.read().unwrap().filter.excluded_group_ids.clone();
        if !excluded.remove(&group_id) {
            excluded.insert(group_id);
        }
        self.set_exclusions(excluded).await
    }

    /// Drop every selection and persisted preference for this page and
    /// return to the configured default period with default exclusions
    pub async fn reset_filters(&self) -> EngineResult<DrillOutcome> {
        self.prefs.remove(&self.filter_key());
        self.prefs.remove(&self.exclusions_key());

        let (from, to) = ReportPeriod::new(self.config.report.default_range).bounds();
        {
            let mut state = self.state.write().unwrap();
            let seeded = self.seeded_exclusions(&state);
            state.filter = state.filter.reset(from, to).with_exclusions(seeded);
        }

        self.drill.close_all();
        self.refresh().await
    }

    // ==================== Table Access ====================

    /// Snapshot of the current filter
    pub fn filter(&self) -> FilterState {
        self.state.read().unwrap().filter.clone()
    }

    /// Snapshot of the top-level table
    pub fn table(&self) -> TableState {
        self.state.read().unwrap().table.clone()
    }

    /// Grand total of the visible table, recomputed from the current rows
    pub fn grand_total(&self) -> Totals {
        Totals::of_rows(&self.state.read().unwrap().table.data)
    }

    /// Apply a header click to the table's sort state and reorder the rows
    pub fn sort_table(&self, field: SortField) {
        let mut state = self.state.write().unwrap();
        state.table.sort.toggle(field);
        let SortState { field, direction } = state.table.sort;
        sort_rows(&mut state.table.data, field, direction);
    }

    /// The configured excludable groups, for rendering as checkboxes
    pub fn exclusion_entries(&self) -> Vec<ExclusionEntry> {
        self.state
            .read()
            .unwrap()
            .exclusions
            .as_ref()
            .map(|defaults| defaults.entries().to_vec())
            .unwrap_or_default()
    }

    // ==================== Drill-Down ====================

    /// The drill-down controller for this page
    pub fn drill(&self) -> &DrillDownController {
        &self.drill
    }

    /// Open the first drill level from a top-level table row
    pub async fn open_drill(&self, row_name: &str) -> EngineResult<DrillOutcome> {
        let (dimension, filter, row) = {
            let state = self.state.read().unwrap();
            let row = state
                .table
                .data
                .iter()
                .find(|r| r.name == row_name)
                .ok_or_else(|| EngineError::Resolution {
                    dimension: state.table.dimension,
                    name: row_name.to_string(),
                })?
                .clone();
            (state.table.dimension, state.filter.clone(), row)
        };
        self.drill.open_root(dimension, &filter, &row).await
    }

    /// Open the next drill level from a row of an already open level
    pub async fn open_drill_from(&self, depth: usize, row_name: &str) -> EngineResult<DrillOutcome> {
        self.drill.open_child(depth, row_name).await
    }

    /// Close one drill level and every level beneath it
    pub fn close_drill(&self, depth: usize) -> EngineResult<()> {
        self.drill.close(depth)
    }
}

// ==================== Tests ====================
