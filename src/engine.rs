use crate::aggregate::Aggregator;
use crate::chart::{build_value_points, scenario_chart, ScenarioPoint, ValuePoint};
use crate::error::Result;
use crate::growth::GrowthProjector;
use crate::overrides::OverrideResolver;
use crate::schema::*;
use crate::series::MonthSeries;
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every derived series for one projection year.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub computed_at: DateTime<Utc>,
    pub fixed_expenses: ScenarioSeries,
    pub variable_expenses: ScenarioSeries,
    pub investments: ScenarioSeries,
    /// One entry per configured stream, active or not.
    pub revenue_streams: BTreeMap<String, ScenarioSeries>,
    pub mkt_components: BTreeMap<String, ScenarioSeries>,
    pub revenue_total: ScenarioSeries,
    pub mkt_total: ScenarioSeries,
    pub budget: ScenarioSeries,
    pub resultado: ScenarioSeries,
}

impl ProjectionReport {
    pub fn series(&self, target: &SeriesTarget) -> Option<&ScenarioSeries> {
        match target {
            SeriesTarget::FixedExpenses => Some(&self.fixed_expenses),
            SeriesTarget::VariableExpenses => Some(&self.variable_expenses),
            SeriesTarget::Investments => Some(&self.investments),
            SeriesTarget::RevenueStream(id) => self.revenue_streams.get(id),
            SeriesTarget::MktComponent(id) => self.mkt_components.get(id),
        }
    }

    pub fn chart_points<S: AsRef<str>>(
        &self,
        target: &SeriesTarget,
        months: &[S],
    ) -> Option<Vec<ScenarioPoint>> {
        self.series(target).map(|s| scenario_chart(months, s))
    }

    pub fn budget_chart<S: AsRef<str>>(&self, months: &[S]) -> Vec<ScenarioPoint> {
        scenario_chart(months, &self.budget)
    }

    pub fn resultado_points<S: AsRef<str>>(
        &self,
        scenario: Scenario,
        months: &[S],
    ) -> Vec<ValuePoint> {
        build_value_points(months, self.resultado.get(scenario).cells())
    }
}

pub struct ProjectionEngine<'a> {
    rate_table: &'a RateTable,
}

impl<'a> ProjectionEngine<'a> {
    pub fn new(rate_table: &'a RateTable) -> Self {
        Self { rate_table }
    }

    /// Baseline -> growth -> overrides -> item totals -> budget.
    pub fn compute(
        &self,
        config: &ProjectionConfig,
        base: &ProjectionBase,
    ) -> Result<ProjectionReport> {
        let projector = GrowthProjector::new(&base.growth, self.rate_table);
        let resolver = OverrideResolver::new(base);
        let unset = MonthSeries::unset();

        let category_series = |target: SeriesTarget| -> Result<ScenarioSeries> {
            let prev = base.prev_year.series(&target).unwrap_or(&unset);
            let projected = projector.project_scenarios(target.category(), prev)?;
            resolver.resolve_scenarios(&target, &projected)
        };

        let fixed_expenses = category_series(SeriesTarget::FixedExpenses)?;
        let variable_expenses = category_series(SeriesTarget::VariableExpenses)?;
        let investments = category_series(SeriesTarget::Investments)?;

        let itemized = |category: Category| -> Result<BTreeMap<String, ScenarioSeries>> {
            let mut out = BTreeMap::new();
            for item in config.items(category) {
                if let Some(target) = SeriesTarget::item(category, item.id.clone()) {
                    out.insert(item.id.clone(), category_series(target)?);
                }
            }
            debug!("Projected {} {} series", out.len(), category);
            Ok(out)
        };

        let revenue_streams = itemized(Category::RevenueStreams)?;
        let mkt_components = itemized(Category::MktComponents)?;

        let aggregator = Aggregator::new(config);
        let revenue_total = aggregator.sum_active(Category::RevenueStreams, &revenue_streams)?;
        let mkt_total = aggregator.sum_active(Category::MktComponents, &mkt_components)?;
        let budget = aggregator.budget(
            &revenue_total,
            &fixed_expenses,
            &variable_expenses,
            &investments,
        )?;
        let resultado = budget.clone();

        Ok(ProjectionReport {
            computed_at: Utc::now(),
            fixed_expenses,
            variable_expenses,
            investments,
            revenue_streams,
            mkt_components,
            revenue_total,
            mkt_total,
            budget,
            resultado,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RateTable {
        RateTable::uniform(ScenarioRateMap::direct())
    }

    #[test]
    fn test_fixed_expenses_growth_and_override() {
        let mut base = ProjectionBase {
            growth: GrowthRates::new(0.0, 0.1, 0.2),
            ..Default::default()
        };
        base.prev_year.fixed_expenses = MonthSeries::filled(1000.0);

        let rates = table();
        let engine = ProjectionEngine::new(&rates);
        let config = ProjectionConfig::default();

        let report = engine.compute(&config, &base).unwrap();
        for v in report.fixed_expenses.medio.values() {
            assert!((v - 1100.0).abs() < 1e-9);
        }

        base.override_entry_mut(&SeriesTarget::FixedExpenses, Scenario::Medio)
            .values[0] = Some(1500.0);
        let report = engine.compute(&config, &base).unwrap();
        let medio = report.fixed_expenses.medio.values();
        assert_eq!(medio[0], 1500.0);
        assert!((medio[1] - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_items_without_baseline_project_to_zero() {
        let config = ProjectionConfig {
            revenue_streams: vec![ProjectionItem::new("novo", "Novo canal", 1)],
            mkt_components: vec![],
        };
        let rates = table();
        let report = ProjectionEngine::new(&rates)
            .compute(&config, &ProjectionBase::default())
            .unwrap();
        assert_eq!(report.revenue_streams["novo"], ScenarioSeries::zeros());
        assert_eq!(report.revenue_total, ScenarioSeries::zeros());
    }

    #[test]
    fn test_resultado_matches_budget() {
        let config = ProjectionConfig {
            revenue_streams: vec![ProjectionItem::new("loja", "Loja", 1)],
            mkt_components: vec![],
        };
        let mut base = ProjectionBase::default();
        base.prev_year
            .revenue_streams
            .insert("loja".to_string(), MonthSeries::filled(500.0));
        base.prev_year.fixed_expenses = MonthSeries::filled(200.0);
        base.prev_year.variable_expenses = MonthSeries::filled(100.0);
        base.prev_year.investments = MonthSeries::filled(50.0);

        let rates = table();
        let report = ProjectionEngine::new(&rates).compute(&config, &base).unwrap();
        assert_eq!(report.budget.previsto.values(), vec![150.0; 12]);
        assert_eq!(report.resultado, report.budget);

        let points = report.resultado_points(Scenario::Maximo, &crate::utils::MONTH_LABELS_PT);
        assert_eq!(points.len(), 12);
        assert_eq!(points[6].value, 150.0);
    }
}
