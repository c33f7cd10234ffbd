use crate::error::Result;
use crate::schema::{validate_rate, Category, GrowthRates, RateTable, Scenario, ScenarioSeries};
use crate::series::MonthSeries;
use log::debug;

/// Grows a prior-year series by a flat rate: `result[i] = prev[i] * (1 + rate)`.
///
/// Months are independent (no compounding along the year). An unset baseline
/// month projects to zero whatever the rate. Negative and zero rates are kept
/// as given.
pub fn project(prev_year: &MonthSeries, rate: f64) -> Result<MonthSeries> {
    validate_rate(rate, "rate")?;
    let factor = 1.0 + rate;
    let cells = prev_year
        .cells()
        .iter()
        .map(|cell| Some(cell.map_or(0.0, |v| v * factor)))
        .collect();
    MonthSeries::from_cells(cells, "projected series")
}

pub struct GrowthProjector<'a> {
    rates: &'a GrowthRates,
    table: &'a RateTable,
}

impl<'a> GrowthProjector<'a> {
    pub fn new(rates: &'a GrowthRates, table: &'a RateTable) -> Self {
        Self { rates, table }
    }

    pub fn rate_for(&self, category: Category, scenario: Scenario) -> Result<f64> {
        let field = self.table.mapping_for(category)?.field_for(scenario);
        Ok(self.rates.rate(field))
    }

    /// Produces the previsto/medio/maximo series for one baseline, each grown
    /// at the rate the table assigns to that scenario of `category`.
    pub fn project_scenarios(
        &self,
        category: Category,
        prev_year: &MonthSeries,
    ) -> Result<ScenarioSeries> {
        let mut projected = ScenarioSeries::default();
        for scenario in Scenario::ALL {
            let rate = self.rate_for(category, scenario)?;
            debug!("Projecting {} / {} at rate {}", category, scenario, rate);
            *projected.get_mut(scenario) = project(prev_year, rate)?;
        }
        Ok(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;
    use crate::schema::{GrowthField, ScenarioRateMap};

    #[test]
    fn test_flat_growth_per_month() {
        let prev = MonthSeries::filled(1000.0);
        let projected = project(&prev, 0.1).unwrap();
        for v in projected.values() {
            assert!((v - 1100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_no_compounding_across_months() {
        let prev = MonthSeries::from_values(
            &[100.0, 200.0, 0.0, 50.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0],
            "prev",
        )
        .unwrap();
        let projected = project(&prev, 0.5).unwrap();
        assert_eq!(projected.get(0).unwrap(), Some(150.0));
        assert_eq!(projected.get(1).unwrap(), Some(300.0));
        assert_eq!(projected.get(2).unwrap(), Some(0.0));
        assert_eq!(projected.get(11).unwrap(), Some(150.0));
    }

    #[test]
    fn test_zero_rate_carries_forward() {
        let prev = MonthSeries::from_values(&[12.5; 12], "prev").unwrap();
        assert_eq!(project(&prev, 0.0).unwrap(), prev);
    }

    #[test]
    fn test_negative_rate_not_clamped() {
        let prev = MonthSeries::filled(200.0);
        let projected = project(&prev, -0.25).unwrap();
        assert_eq!(projected.get(5).unwrap(), Some(150.0));

        let collapsed = project(&prev, -1.5).unwrap();
        assert_eq!(collapsed.get(0).unwrap(), Some(-100.0));
    }

    #[test]
    fn test_unset_baseline_projects_to_zero() {
        let mut prev = MonthSeries::unset();
        prev.set(3, Some(10.0)).unwrap();
        let projected = project(&prev, 3.0).unwrap();
        assert_eq!(projected.get(0).unwrap(), Some(0.0));
        assert_eq!(projected.get(3).unwrap(), Some(40.0));

        let zeros = project(&MonthSeries::zeros(), 0.7).unwrap();
        assert_eq!(zeros, MonthSeries::zeros());
    }

    #[test]
    fn test_non_finite_rate_rejected() {
        let prev = MonthSeries::filled(1.0);
        assert!(matches!(
            project(&prev, f64::NAN),
            Err(ProjectionError::InvalidGrowthRate { .. })
        ));
    }

    #[test]
    fn test_projector_follows_rate_table() {
        let rates = GrowthRates::new(0.0, 0.1, 0.2);
        let table = RateTable::uniform(ScenarioRateMap::direct()).with(
            Category::RevenueStreams,
            ScenarioRateMap::new(GrowthField::Minimo, GrowthField::Medio, GrowthField::Maximo),
        );
        let projector = GrowthProjector::new(&rates, &table);
        let prev = MonthSeries::filled(100.0);

        let fixed = projector
            .project_scenarios(Category::FixedExpenses, &prev)
            .unwrap();
        assert!((fixed.previsto.value_or_zero(0) - 110.0).abs() < 1e-9);
        assert!((fixed.medio.value_or_zero(0) - 110.0).abs() < 1e-9);
        assert!((fixed.maximo.value_or_zero(0) - 120.0).abs() < 1e-9);

        let revenue = projector
            .project_scenarios(Category::RevenueStreams, &prev)
            .unwrap();
        assert!((revenue.previsto.value_or_zero(0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_projector_reports_missing_mapping() {
        let rates = GrowthRates::new(0.0, 0.1, 0.2);
        let table = RateTable::empty();
        let projector = GrowthProjector::new(&rates, &table);
        assert!(matches!(
            projector.project_scenarios(Category::Investments, &MonthSeries::zeros()),
            Err(ProjectionError::MissingRateMapping(Category::Investments))
        ));
    }
}
