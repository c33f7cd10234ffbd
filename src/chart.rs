//! Point sequences for the dashboard charts.
//!
//! These builders are a rendering convenience: unset values read as `0.0`
//! and mismatched lengths truncate to the shorter input instead of failing.
//! Nothing here feeds back into the stored series.

use crate::schema::ScenarioSeries;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioPoint {
    pub month: String,
    pub previsto: f64,
    pub medio: f64,
    pub maximo: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuePoint {
    pub month: String,
    pub value: f64,
}

fn cell(values: &[Option<f64>], idx: usize) -> f64 {
    values.get(idx).copied().flatten().unwrap_or(0.0)
}

pub fn build_scenario_points<S: AsRef<str>>(
    months: &[S],
    previsto: &[Option<f64>],
    medio: &[Option<f64>],
    maximo: &[Option<f64>],
) -> Vec<ScenarioPoint> {
    let len = months
        .len()
        .min(previsto.len())
        .min(medio.len())
        .min(maximo.len());

    months[..len]
        .iter()
        .enumerate()
        .map(|(idx, month)| ScenarioPoint {
            month: month.as_ref().to_string(),
            previsto: cell(previsto, idx),
            medio: cell(medio, idx),
            maximo: cell(maximo, idx),
        })
        .collect()
}

pub fn build_value_points<S: AsRef<str>>(months: &[S], values: &[Option<f64>]) -> Vec<ValuePoint> {
    months
        .iter()
        .zip(values)
        .map(|(month, value)| ValuePoint {
            month: month.as_ref().to_string(),
            value: value.unwrap_or(0.0),
        })
        .collect()
}

pub fn scenario_chart<S: AsRef<str>>(months: &[S], series: &ScenarioSeries) -> Vec<ScenarioPoint> {
    build_scenario_points(
        months,
        series.previsto.cells(),
        series.medio.cells(),
        series.maximo.cells(),
    )
}
