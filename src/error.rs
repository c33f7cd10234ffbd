use crate::schema::{Category, Scenario};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("Invalid series length for {context}: expected {expected}, got {actual}")]
    InvalidSeriesLength {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("Non-finite value {value} in {context} at month {index}")]
    NonFiniteValue {
        context: String,
        index: usize,
        value: f64,
    },

    #[error("Invalid month index {0}: must be between 0 and 11")]
    MonthOutOfRange(usize),

    #[error("Growth rate {field} must be a finite fraction, got {value}")]
    InvalidGrowthRate { field: String, value: f64 },

    #[error("More than one manual override layer for {target} / {scenario}")]
    DuplicateOverride { target: String, scenario: Scenario },

    #[error("Duplicate display order {order} in {category} list")]
    DuplicateItemOrder { category: Category, order: u32 },

    #[error("Duplicate item id '{id}' in {category} list")]
    DuplicateItemId { category: Category, id: String },

    #[error("Unknown {category} item '{id}'")]
    UnknownItem { category: Category, id: String },

    #[error("{0} is a single series and has no item list")]
    NotItemized(Category),

    #[error("{category} item '{id}' referenced by {origin} is not present in the configuration")]
    ConfigurationMismatch {
        category: Category,
        id: String,
        origin: String,
    },

    #[error("No growth-rate mapping configured for {0}")]
    MissingRateMapping(Category),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProjectionError {
    /// True for the ValidationError family: malformed shapes, non-finite
    /// numbers, out-of-range month indices and duplicated keys.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSeriesLength { .. }
                | Self::NonFiniteValue { .. }
                | Self::MonthOutOfRange(_)
                | Self::InvalidGrowthRate { .. }
                | Self::DuplicateOverride { .. }
                | Self::DuplicateItemOrder { .. }
                | Self::DuplicateItemId { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
