//! Unified error types for FlatDB
//!
//! Every fallible engine operation returns [`FlatDbError`]. Validation errors
//! are raised before any mutation, so a rejected batch leaves the index
//! untouched.

/// Main error type for FlatDB operations
#[derive(Debug, thiserror::Error)]
pub enum FlatDbError {
    /// Vector or query length differs from the configured dimension.
    /// `id` is set for upsert items and empty for search queries.
    #[error("{}", dimension_message(.id, .expected, .actual))]
    DimensionMismatch {
        id: Option<String>,
        expected: usize,
        actual: usize,
    },

    /// Input vector contains NaN or an infinity
    #[error("{}", non_finite_message(.id))]
    NonFiniteComponent { id: Option<String> },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for FlatDB operations
pub type Result<T> = std::result::Result<T, FlatDbError>;

fn dimension_message(id: &Option<String>, expected: &usize, actual: &usize) -> String {
    match id {
        Some(id) => format!(
            "Dimension mismatch for id '{}': expected {}, got {}",
            id, expected, actual
        ),
        None => format!("Dimension mismatch: expected {}, got {}", expected, actual),
    }
}

fn non_finite_message(id: &Option<String>) -> String {
    match id {
        Some(id) => format!("Vector for id '{}' contains a non-finite component", id),
        None => "Query vector contains a non-finite component".to_string(),
    }
}

impl FlatDbError {
    /// Create a dimension mismatch error for an upsert item
    pub fn dimension_mismatch(id: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            id: Some(id.into()),
            expected,
            actual,
        }
    }

    /// Create a dimension mismatch error for a search query
    pub fn query_dimension_mismatch(expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            id: None,
            expected,
            actual,
        }
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::DimensionMismatch { .. } | Self::NonFiniteComponent { .. } | Self::InvalidInput(_)
        )
    }
}
