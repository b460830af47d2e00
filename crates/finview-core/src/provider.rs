//! Aggregation provider boundary
//!
//! The engine's sole data-fetch contract. Implementations translate a
//! [`FilterState`] into whatever transport the query service speaks; the
//! wire parameter names are fixed by [`FilterState::to_query_params`].

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::exclusions::ExclusionEntry;
use crate::filter::FilterState;
use crate::types::{AggregateRow, Dimension};

/// Errors surfaced by an aggregation provider
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Aggregation request failed: {message}")]
    Request { message: String },

    #[error("Aggregation service unavailable")]
    Unavailable,
}

/// Provider reference type
pub type ProviderRef = Arc<dyn AggregationProvider>;

/// Query service computing aggregate sums from raw transaction rows.
///
/// Contract expected by the engine: rows are pre-aggregated per distinct
/// name within the dimension, carry no duplicates, and are exhaustive for
/// the filter (no pagination), so summing all rows yields the filtered
/// grand total. `Month` rows are named `YYYY-MM`.
#[async_trait]
pub trait AggregationProvider: Send + Sync {
    /// Aggregate rows for one dimension under the given filter
    async fn query(
        &self,
        dimension: Dimension,
        filter: &FilterState,
    ) -> Result<Vec<AggregateRow>, ProviderError>;

    /// The server-configured excludable groups; fetched once per session
    /// and treated as static thereafter
    async fn exclusion_config(&self) -> Result<Vec<ExclusionEntry>, ProviderError>;
}
