//! Drill-down state machine
//!
//! One controller serves every report page, parameterized by the dimension
//! transition table in [`Dimension`]; the source carried three near-identical
//! copies of this logic and they disagreed in the details.

use std::sync::{Arc, RwLock};

use crate::catalog::Catalogs;
use crate::error::{EngineError, EngineResult};
use crate::filter::FilterState;
use crate::period::month_bounds;
use crate::provider::ProviderRef;
use crate::sort::{sort_rows, SortField, SortState};
use crate::totals::{reconcile, ReconcileDrift, Totals};
use crate::types::{AggregateRow, Dimension};

/// Maximum number of nested drill levels
pub const MAX_DEPTH: usize = 3;

/// One open drill level: pure data, rendering is someone else's concern.
///
/// The level owns its data, loading flag, and sort state. Its filter is the
/// snapshot the level's query was issued with: the base filter's date range,
/// account, exclusions and visibility plus every ancestor selection.
#[derive(Debug, Clone)]
pub struct DrillLevel {
    /// 1-based nesting depth
    pub depth: usize,
    /// Dimension of the rows shown at this level
    pub dimension: Dimension,
    /// Display title, e.g. "Groups for Acme"
    pub title: String,
    /// Name of the parent row this level was opened from
    pub parent_name: String,
    /// Totals of the parent row, for reconciliation against this level
    pub parent_totals: Totals,
    pub data: Vec<AggregateRow>,
    pub loading: bool,
    pub sort: SortState,
    /// Filter snapshot this level's query was issued with
    pub filter: FilterState,
    /// Drift against the parent row after the last applied result
    pub drift: Option<ReconcileDrift>,
    generation: u64,
}

impl DrillLevel {
    /// Totals of the currently displayed rows
    pub fn totals(&self) -> Totals {
        Totals::of_rows(&self.data)
    }
}

/// What happened to an open request once its response arrived
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrillOutcome {
    /// The response was applied to the level
    Applied,
    /// A newer request or a close superseded this one; the response was
    /// discarded on arrival
    Superseded,
}

struct DrillState {
    levels: Vec<DrillLevel>,
    generations: [u64; MAX_DEPTH],
}

impl DrillState {
    fn bump(&mut self, depth: usize) -> u64 {
        self.generations[depth - 1] += 1;
        self.generations[depth - 1]
    }
}

/// State machine governing navigation from an aggregate row down through up
/// to three nested levels.
///
/// Only the most recently issued query per level is ever applied; superseded
/// responses are dropped on arrival, which is the engine's only form of
/// cancellation. Closing a level discards everything beneath it, and
/// re-opening re-queries from scratch.
pub struct DrillDownController {
    provider: ProviderRef,
    catalogs: Arc<Catalogs>,
    tolerance: f64,
    state: RwLock<DrillState>,
}

impl DrillDownController {
    pub fn new(provider: ProviderRef, catalogs: Arc<Catalogs>, tolerance: f64) -> Self {
        Self {
            provider,
            catalogs,
            tolerance,
            state: RwLock::new(DrillState {
                levels: Vec::new(),
                generations: [0; MAX_DEPTH],
            }),
        }
    }

    /// Number of currently open levels
    pub fn depth(&self) -> usize {
        self.state.read().unwrap().levels.len()
    }

    /// Whether any level is open
    pub fn is_open(&self) -> bool {
        self.depth() > 0
    }

    /// Snapshot of all open levels, shallowest first
    pub fn levels(&self) -> Vec<DrillLevel> {
        self.state.read().unwrap().levels.clone()
    }

    /// Snapshot of one level
    pub fn level(&self, depth: usize) -> Option<DrillLevel> {
        self.state.read().unwrap().levels.get(depth.wrapping_sub(1)).cloned()
    }

    /// Open the first level from a top-level table row.
    ///
    /// `dimension` is the table's dimension and `row` the clicked row; the
    /// next dimension down is queried with the row's identity merged into
    /// the filter.
    pub async fn open_root(
        &self,
        dimension: Dimension,
        filter: &FilterState,
        row: &AggregateRow,
    ) -> EngineResult<DrillOutcome> {
        self.open_level(1, dimension, row, filter).await
    }

    /// Open the next level from a row of an already open level.
    pub async fn open_child(&self, parent_depth: usize, row_name: &str) -> EngineResult<DrillOutcome> {
        let (dimension, filter, row) = {
            let state = self.state.read().unwrap();
            let parent = state
                .levels
                .get(parent_depth.wrapping_sub(1))
                .ok_or(EngineError::LevelNotOpen { depth: parent_depth })?;
            let row = parent
                .data
                .iter()
                .find(|r| r.name == row_name)
                .ok_or_else(|| EngineError::Resolution {
                    dimension: parent.dimension,
                    name: row_name.to_string(),
                })?
                .clone();
            (parent.dimension, parent.filter.clone(), row)
        };
        self.open_level(parent_depth + 1, dimension, &row, &filter).await
    }

    /// Close one level and every level beneath it.
    ///
    /// The parent keeps its data untouched; its filter never changed, so it
    /// is not re-queried.
    pub fn close(&self, depth: usize) -> EngineResult<()> {
        let mut state = self.state.write().unwrap();
        if depth == 0 || depth > state.levels.len() {
            return Err(EngineError::LevelNotOpen { depth });
        }
        state.levels.truncate(depth - 1);
        Ok(())
    }

    /// Close every open level
    pub fn close_all(&self) {
        self.state.write().unwrap().levels.clear();
    }

    /// Apply a header click to one level's sort state and reorder its rows
    pub fn sort(&self, depth: usize, field: SortField) -> EngineResult<()> {
        let mut state = self.state.write().unwrap();
        let level = state
            .levels
            .get_mut(depth.wrapping_sub(1))
            .ok_or(EngineError::LevelNotOpen { depth })?;
        level.sort.toggle(field);
        let SortState { field, direction } = level.sort;
        sort_rows(&mut level.data, field, direction);
        Ok(())
    }

    /// Resolve the clicked row, refine the filter, and run the query for a
    /// level with a stale-response guard.
    async fn open_level(
        &self,
        depth: usize,
        parent_dimension: Dimension,
        row: &AggregateRow,
        base_filter: &FilterState,
    ) -> EngineResult<DrillOutcome> {
        let child_dimension = parent_dimension
            .next()
            .ok_or(EngineError::AtLeaf { dimension: parent_dimension })?;

        // Resolve identity before touching any state: an unresolvable name
        // aborts the transition and no query is issued.
        let refined = match parent_dimension {
            Dimension::Month => {
                let (from, to) = month_bounds(&row.name).ok_or_else(|| EngineError::Resolution {
                    dimension: parent_dimension,
                    name: row.name.clone(),
                })?;
                base_filter.with_date_range(from, to)
            }
            _ => {
                let id = self
                    .catalogs
                    .resolve(parent_dimension, &row.name)
                    .ok_or_else(|| EngineError::Resolution {
                        dimension: parent_dimension,
                        name: row.name.clone(),
                    })?;
                base_filter.with_classification(parent_dimension, id, &self.catalogs)
            }
        };

        let generation = {
            let mut state = self.state.write().unwrap();
            state.levels.truncate(depth - 1);
            let generation = state.bump(depth);
            state.levels.push(DrillLevel {
                depth,
                dimension: child_dimension,
                title: format!("{}s for {}", child_dimension.label(), row.name),
                parent_name: row.name.clone(),
                parent_totals: Totals::of_row(row),
                data: Vec::new(),
                loading: true,
                sort: SortState::default(),
                filter: refined.clone(),
                drift: None,
                generation,
            });
            generation
        };

        log::debug!(
            target: "finview::drill",
            "opening depth {} ({}) under '{}'",
            depth,
            child_dimension,
            row.name
        );

        let result = self.provider.query(child_dimension, &refined).await;

        let mut state = self.state.write().unwrap();
        let level = match state.levels.get_mut(depth - 1) {
            Some(level) if level.generation == generation => level,
            _ => {
                log::debug!(
                    target: "finview::drill",
                    "discarding stale response for depth {} under '{}'",
                    depth,
                    row.name
                );
                return Ok(DrillOutcome::Superseded);
            }
        };

        match result {
            Ok(mut rows) => {
                let SortState { field, direction } = level.sort;
                sort_rows(&mut rows, field, direction);
                level.data = rows;
                level.loading = false;
                level.drift = reconcile(&level.parent_totals, &level.data, self.tolerance).err();
                if let Some(drift) = level.drift {
                    log::warn!(
                        target: "finview::drill",
                        "totals drift at depth {} under '{}': income {:+.2}, expense {:+.2}",
                        depth,
                        level.parent_name,
                        drift.income,
                        drift.expense
                    );
                }
                Ok(DrillOutcome::Applied)
            }
            Err(error) => {
                // Stop the spinner, keep whatever was displayed; no retry.
                level.loading = false;
                log::warn!(
                    target: "finview::drill",
                    "[{}] query failed at depth {} under '{}': {}",
                    crate::error::ErrorCode::ProviderFailed,
                    depth,
                    level.parent_name,
                    error
                );
                Err(error.into())
            }
        }
    }
}

// ==================== Tests ====================
