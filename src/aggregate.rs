use crate::error::Result;
use crate::schema::{Category, ProjectionConfig, Scenario, ScenarioSeries};
use crate::series::{MonthSeries, MONTHS_PER_YEAR};
use log::debug;
use std::collections::BTreeMap;

/// Sums series month by month. Unset months count as zero.
pub fn sum_series<'s>(series: impl IntoIterator<Item = &'s MonthSeries>) -> Result<MonthSeries> {
    let mut totals = vec![0.0; MONTHS_PER_YEAR];
    for s in series {
        for (total, cell) in totals.iter_mut().zip(s.cells()) {
            *total += cell.unwrap_or(0.0);
        }
    }
    MonthSeries::from_values(&totals, "aggregated series")
}

/// `revenue - fixed - variable - investments`, month by month with no carry-over.
pub fn budget_series(
    revenue: &MonthSeries,
    fixed: &MonthSeries,
    variable: &MonthSeries,
    investments: &MonthSeries,
) -> Result<MonthSeries> {
    let values: Vec<f64> = (0..MONTHS_PER_YEAR)
        .map(|idx| {
            revenue.value_or_zero(idx)
                - fixed.value_or_zero(idx)
                - variable.value_or_zero(idx)
                - investments.value_or_zero(idx)
        })
        .collect();
    MonthSeries::from_values(&values, "budget")
}

pub struct Aggregator<'a> {
    config: &'a ProjectionConfig,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a ProjectionConfig) -> Self {
        Self { config }
    }

    /// Totals the per-item series of an itemized category over its active
    /// items. Series for inactive or unconfigured ids never contribute; an
    /// active item without a series contributes zero.
    pub fn sum_active(
        &self,
        category: Category,
        per_item: &BTreeMap<String, ScenarioSeries>,
    ) -> Result<ScenarioSeries> {
        let active: Vec<&ScenarioSeries> = self
            .config
            .items(category)
            .iter()
            .filter(|item| item.is_active)
            .filter_map(|item| {
                let series = per_item.get(&item.id);
                if series.is_none() {
                    debug!("Active {} item '{}' has no series", category, item.id);
                }
                series
            })
            .collect();

        debug!("Aggregating {} active {} series", active.len(), category);

        let mut total = ScenarioSeries::default();
        for scenario in Scenario::ALL {
            *total.get_mut(scenario) = sum_series(active.iter().map(|s| s.get(scenario)))?;
        }
        Ok(total)
    }

    /// Budget for every scenario, each computed independently.
    pub fn budget(
        &self,
        revenue_total: &ScenarioSeries,
        fixed: &ScenarioSeries,
        variable: &ScenarioSeries,
        investments: &ScenarioSeries,
    ) -> Result<ScenarioSeries> {
        let mut budget = ScenarioSeries::default();
        for scenario in Scenario::ALL {
            *budget.get_mut(scenario) = budget_series(
                revenue_total.get(scenario),
                fixed.get(scenario),
                variable.get(scenario),
                investments.get(scenario),
            )?;
        }
        Ok(budget)
    }
}
