use crate::error::Result;
use crate::schema::{ProjectionBase, Scenario, ScenarioSeries, SeriesTarget};
use crate::series::{validate_finite, validate_len, MonthSeries, MONTHS_PER_YEAR};
use log::debug;

/// Overlays a manual-override layer on a computed series.
///
/// For every month the override wins when set; otherwise the base value is
/// kept. An absent layer, or one shorter than a year, leaves the uncovered
/// months untouched. A layer longer than a year or holding a non-finite value
/// is rejected.
pub fn resolve(base: &MonthSeries, overrides: Option<&[Option<f64>]>) -> Result<MonthSeries> {
    let Some(layer) = overrides else {
        return Ok(base.clone());
    };

    if layer.len() > MONTHS_PER_YEAR {
        validate_len(layer.len(), "manual override")?;
    }
    for (idx, cell) in layer.iter().enumerate() {
        if let Some(v) = cell {
            validate_finite(*v, "manual override", idx)?;
        }
    }

    Ok(MonthSeries::from_fn(|idx| {
        layer
            .get(idx)
            .copied()
            .flatten()
            .or(base.cells()[idx])
    }))
}

/// Applies the manual-override layers stored in a [`ProjectionBase`] to
/// freshly projected scenario series.
pub struct OverrideResolver<'a> {
    base: &'a ProjectionBase,
}

impl<'a> OverrideResolver<'a> {
    pub fn new(base: &'a ProjectionBase) -> Self {
        Self { base }
    }

    pub fn resolve_scenarios(
        &self,
        target: &SeriesTarget,
        projected: &ScenarioSeries,
    ) -> Result<ScenarioSeries> {
        let mut resolved = ScenarioSeries::default();
        for scenario in Scenario::ALL {
            let layer = self.base.override_values(target, scenario);
            if layer.is_some() {
                debug!("Applying manual overrides to {} / {}", target, scenario);
            }
            *resolved.get_mut(scenario) = resolve(projected.get(scenario), layer)?;
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProjectionError;

    fn base_series() -> MonthSeries {
        MonthSeries::from_values(
            &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0],
            "base",
        )
        .unwrap()
    }

    #[test]
    fn test_override_wins_when_set() {
        let base = base_series();
        let mut layer = vec![None; 12];
        layer[0] = Some(100.0);
        layer[7] = Some(0.0);

        let resolved = resolve(&base, Some(layer.as_slice())).unwrap();
        for idx in 0..12 {
            let expected = match idx {
                0 => 100.0,
                7 => 0.0,
                _ => (idx + 1) as f64,
            };
            assert_eq!(resolved.get(idx).unwrap(), Some(expected));
        }
    }

    #[test]
    fn test_absent_layer_is_identity() {
        let base = base_series();
        assert_eq!(resolve(&base, None).unwrap(), base);
        assert_eq!(resolve(&base, Some(&[][..])).unwrap(), base);
    }

    #[test]
    fn test_short_layer_covers_leading_months_only() {
        let base = base_series();
        let resolved = resolve(&base, Some(&[Some(50.0), None, Some(70.0)][..])).unwrap();
        assert_eq!(resolved.get(0).unwrap(), Some(50.0));
        assert_eq!(resolved.get(1).unwrap(), Some(2.0));
        assert_eq!(resolved.get(2).unwrap(), Some(70.0));
        assert_eq!(resolved.get(11).unwrap(), Some(12.0));
    }

    #[test]
    fn test_unset_base_stays_unset_without_override() {
        let base = MonthSeries::unset();
        let resolved = resolve(&base, Some(&[None, Some(5.0)][..])).unwrap();
        assert_eq!(resolved.get(0).unwrap(), None);
        assert_eq!(resolved.get(1).unwrap(), Some(5.0));
    }

    #[test]
    fn test_malformed_layer_rejected() {
        let base = base_series();
        let long = vec![Some(1.0); 13];
        assert!(matches!(
            resolve(&base, Some(long.as_slice())),
            Err(ProjectionError::InvalidSeriesLength { actual: 13, .. })
        ));
        assert!(matches!(
            resolve(&base, Some(&[Some(f64::NAN)][..])),
            Err(ProjectionError::NonFiniteValue { index: 0, .. })
        ));
    }

    #[test]
    fn test_resolver_only_touches_matching_scenario() {
        let mut base = ProjectionBase::default();
        base.override_entry_mut(&SeriesTarget::FixedExpenses, Scenario::Medio)
            .values[0] = Some(1500.0);

        let projected = ScenarioSeries {
            previsto: MonthSeries::filled(1100.0),
            medio: MonthSeries::filled(1100.0),
            maximo: MonthSeries::filled(1200.0),
        };

        let resolved = OverrideResolver::new(&base)
            .resolve_scenarios(&SeriesTarget::FixedExpenses, &projected)
            .unwrap();
        assert_eq!(resolved.medio.get(0).unwrap(), Some(1500.0));
        assert_eq!(resolved.medio.get(1).unwrap(), Some(1100.0));
        assert_eq!(resolved.previsto, projected.previsto);
        assert_eq!(resolved.maximo, projected.maximo);
    }
}
