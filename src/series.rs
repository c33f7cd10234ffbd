use crate::error::{ProjectionError, Result};
use crate::utils::validate_month_index;
use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const MONTHS_PER_YEAR: usize = 12;

/// Twelve monthly cells, index 0 = January.
///
/// A cell is either a finite number or unset (`None`). The length invariant is
/// enforced on every construction path, including deserialization, so a
/// `MonthSeries` in hand always covers a full year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<f64>>", into = "Vec<Option<f64>>")]
pub struct MonthSeries {
    cells: Vec<Option<f64>>,
}

impl MonthSeries {
    /// A series with every month unset.
    pub fn unset() -> Self {
        Self {
            cells: vec![None; MONTHS_PER_YEAR],
        }
    }

    /// A series with every month set to zero.
    pub fn zeros() -> Self {
        Self::filled(0.0)
    }

    pub fn filled(value: f64) -> Self {
        Self {
            cells: vec![Some(value); MONTHS_PER_YEAR],
        }
    }

    pub fn from_cells(cells: Vec<Option<f64>>, context: &str) -> Result<Self> {
        validate_cells(&cells, context)?;
        Ok(Self { cells })
    }

    pub fn from_values(values: &[f64], context: &str) -> Result<Self> {
        Self::from_cells(values.iter().copied().map(Some).collect(), context)
    }

    pub fn get(&self, month: usize) -> Result<Option<f64>> {
        validate_month_index(month)?;
        Ok(self.cells[month])
    }

    /// Sets (or clears, with `None`) a single month.
    pub fn set(&mut self, month: usize, value: Option<f64>) -> Result<()> {
        validate_month_index(month)?;
        if let Some(v) = value {
            validate_finite(v, "series cell", month)?;
        }
        self.cells[month] = value;
        Ok(())
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    /// Numeric view with unset months read as zero.
    pub fn values(&self) -> Vec<f64> {
        self.cells.iter().map(|c| c.unwrap_or(0.0)).collect()
    }

    pub fn value_or_zero(&self, month: usize) -> f64 {
        self.cells.get(month).copied().flatten().unwrap_or(0.0)
    }

    pub fn is_unset(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    pub fn total(&self) -> f64 {
        self.cells.iter().flatten().sum()
    }

    pub(crate) fn from_fn(f: impl FnMut(usize) -> Option<f64>) -> Self {
        Self {
            cells: (0..MONTHS_PER_YEAR).map(f).collect(),
        }
    }
}

impl Default for MonthSeries {
    fn default() -> Self {
        Self::unset()
    }
}

impl TryFrom<Vec<Option<f64>>> for MonthSeries {
    type Error = ProjectionError;

    fn try_from(cells: Vec<Option<f64>>) -> Result<Self> {
        Self::from_cells(cells, "month series")
    }
}

impl From<MonthSeries> for Vec<Option<f64>> {
    fn from(series: MonthSeries) -> Self {
        series.cells
    }
}

impl JsonSchema for MonthSeries {
    fn schema_name() -> String {
        "MonthSeries".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = <Vec<Option<f64>>>::json_schema(gen).into_object();
        schema.metadata().description = Some(
            "Exactly 12 monthly values (index 0 = January); null marks an unset month.".to_string(),
        );
        let array = schema.array();
        array.min_items = Some(MONTHS_PER_YEAR as u32);
        array.max_items = Some(MONTHS_PER_YEAR as u32);
        Schema::Object(schema)
    }
}

pub fn validate_len(actual: usize, context: &str) -> Result<()> {
    if actual != MONTHS_PER_YEAR {
        return Err(ProjectionError::InvalidSeriesLength {
            context: context.to_string(),
            expected: MONTHS_PER_YEAR,
            actual,
        });
    }
    Ok(())
}

pub fn validate_finite(value: f64, context: &str, index: usize) -> Result<()> {
    if !value.is_finite() {
        return Err(ProjectionError::NonFiniteValue {
            context: context.to_string(),
            index,
            value,
        });
    }
    Ok(())
}

fn validate_cells(cells: &[Option<f64>], context: &str) -> Result<()> {
    validate_len(cells.len(), context)?;
    for (idx, cell) in cells.iter().enumerate() {
        if let Some(v) = cell {
            validate_finite(*v, context, idx)?;
        }
    }
    Ok(())
}
