//! Error types for the grid engine.
//!
//! Indexing and clipboard failures are local and recoverable; callers get a
//! `Result` and nothing else happens. Structural invariant violations (a row
//! whose cell count drifts from the column count) are programming errors and
//! are asserted, never tolerated.

use thiserror::Error;

/// Errors surfaced by recoverable grid operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// Row index outside the current body-row bounds.
    #[error("row {0} is out of bounds")]
    InvalidRow(usize),

    /// Column index outside the current column bounds.
    #[error("column {0} is out of bounds")]
    InvalidColumn(usize),

    /// Sort was requested on a column not declared sortable.
    #[error("column {0} is not sortable")]
    NotSortable(usize),

    /// The cell has no text representation to copy.
    #[error("cell has no text representation")]
    NoCellText,

    /// The OS clipboard write failed.
    #[error("clipboard write failed: {0}")]
    Clipboard(String),
}

/// A specialized Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;
