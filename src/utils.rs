use crate::error::{ProjectionError, Result};
use crate::series::{validate_len, MONTHS_PER_YEAR};

/// Localized three-letter month abbreviations used by the dashboard charts.
pub const MONTH_LABELS_PT: [&str; MONTHS_PER_YEAR] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn validate_month_index(month: usize) -> Result<()> {
    if month >= MONTHS_PER_YEAR {
        return Err(ProjectionError::MonthOutOfRange(month));
    }
    Ok(())
}

pub fn default_month_labels() -> Vec<String> {
    MONTH_LABELS_PT.iter().map(|s| s.to_string()).collect()
}

pub fn validate_month_labels(labels: &[String]) -> Result<()> {
    validate_len(labels.len(), "month labels")
}

/// Returns the 0-based month index for a 1-based calendar month.
pub fn month_index(calendar_month: u32) -> Result<usize> {
    let idx = (calendar_month as usize).wrapping_sub(1);
    validate_month_index(idx)?;
    Ok(idx)
}
