//! Error types for finview-core
//!
//! This module provides error handling for the aggregation and drill-down
//! engine, including error codes and severity classification.

use thiserror::Error;
use serde::{Deserialize, Serialize};

use crate::types::Dimension;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Drill target name not found in a catalog
    ResolutionFailed,
    /// Aggregation provider rejected a query
    ProviderFailed,
    /// Date range with inverted bounds
    InvalidDateRange,
    /// Attempted to drill past the deepest dimension
    AtLeaf,
    /// No drill level open at the addressed depth
    LevelNotOpen,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ResolutionFailed => write!(f, "RESOLUTION_FAILED"),
            ErrorCode::ProviderFailed => write!(f, "PROVIDER_FAILED"),
            ErrorCode::InvalidDateRange => write!(f, "INVALID_DATE_RANGE"),
            ErrorCode::AtLeaf => write!(f, "AT_LEAF"),
            ErrorCode::LevelNotOpen => write!(f, "LEVEL_NOT_OPEN"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for finview-core
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Name not found in {dimension} catalog: {name}")]
    Resolution { dimension: Dimension, name: String },

    #[error("Aggregation query failed: {message}")]
    Provider { message: String },

    #[error("Invalid date range: {from} is after {to}")]
    InvalidDateRange {
        from: chrono::NaiveDate,
        to: chrono::NaiveDate,
    },

    #[error("Cannot drill deeper than {dimension}")]
    AtLeaf { dimension: Dimension },

    #[error("No drill level open at depth {depth}")]
    LevelNotOpen { depth: usize },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl EngineError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            EngineError::Resolution { .. } => ErrorCode::ResolutionFailed,
            EngineError::Provider { .. } => ErrorCode::ProviderFailed,
            EngineError::InvalidDateRange { .. } => ErrorCode::InvalidDateRange,
            EngineError::AtLeaf { .. } => ErrorCode::AtLeaf,
            EngineError::LevelNotOpen { .. } => ErrorCode::LevelNotOpen,
            EngineError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EngineError::Resolution { .. } => ErrorSeverity::Warning,
            EngineError::Provider { .. } => ErrorSeverity::Error,
            EngineError::InvalidDateRange { .. } => ErrorSeverity::Warning,
            EngineError::AtLeaf { .. } => ErrorSeverity::Info,
            EngineError::LevelNotOpen { .. } => ErrorSeverity::Warning,
            EngineError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }
}

/// Result type with EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl From<crate::provider::ProviderError> for EngineError {
    fn from(error: crate::provider::ProviderError) -> Self {
        EngineError::Provider {
            message: error.to_string(),
        }
    }
}

// ==================== Tests ====================
