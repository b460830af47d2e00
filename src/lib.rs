//! finview: hierarchical income/expense aggregation and drill-down
//!
//! Facade over the engine crates. Most callers want [`ReportSession`] with
//! an [`AggregationProvider`] implementation, a [`PreferenceStore`], and
//! fully loaded [`Catalogs`].

pub use finview_config as config;
pub use finview_core as engine;

pub use finview_config::{Config, TimeRange};
pub use finview_core::{
    page_key, reconcile, sort_rows, AggregateRow, AggregationProvider, CatalogEntry, Catalogs,
    ConceptEntry, Dimension, DrillDownController, DrillLevel, DrillOutcome, EngineError,
    EngineResult, ErrorCode, ErrorSeverity, ExclusionDefaults, ExclusionEntry,
    ExclusionPreference, FilterState, MemoryPreferenceStore, MovementKind, PreferenceStore,
    PrefsRef, ProviderError, ProviderRef, QueryParams, ReconcileDrift, ReportPeriod,
    ReportSession, SortDirection, SortField, SortState, TableState, Totals, Transaction,
    CURRENCY_TOLERANCE,
};
