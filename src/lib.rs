//! # Alya Projection
//!
//! Annual revenue/expense planning for small businesses: turns a prior-year
//! baseline, growth assumptions and manual per-month edits into twelve months
//! of previsto / médio / máximo figures per category, plus budget and result.
//!
//! ## Core Concepts
//!
//! - **MonthSeries**: exactly 12 cells (January first), each a finite number or unset
//! - **Growth**: `prev[i] * (1 + rate)` per month, no compounding; the rate feeding
//!   each scenario comes from an explicit [`RateTable`]
//! - **Overrides**: a manual value, when set, always wins over the computed one
//! - **Items**: revenue streams and marketing components; only active items count
//!   towards totals, inactive ones keep their history
//! - **Budget / Resultado**: revenue − fixed − variable − investments, month by month
//!
//! ## Example
//!
//! ```rust
//! use alya_projection::*;
//!
//! let config = ProjectionConfig {
//!     revenue_streams: vec![ProjectionItem::new("loja", "Loja física", 1)],
//!     mkt_components: vec![],
//! };
//!
//! let mut base = ProjectionBase {
//!     growth: GrowthRates::new(0.02, 0.10, 0.20),
//!     ..Default::default()
//! };
//! base.prev_year.fixed_expenses = MonthSeries::filled(1000.0);
//! base.prev_year
//!     .revenue_streams
//!     .insert("loja".to_string(), MonthSeries::filled(5000.0));
//!
//! let rates = RateTable::uniform(ScenarioRateMap::direct());
//! let report = process_projection(&config, &base, &rates).unwrap();
//! assert_eq!(report.budget.medio.values().len(), 12);
//! ```

pub mod aggregate;
pub mod chart;
pub mod engine;
pub mod error;
pub mod growth;
pub mod overrides;
pub mod schema;
pub mod series;
pub mod settings;
pub mod store;
pub mod utils;

pub use aggregate::{budget_series, sum_series, Aggregator};
pub use chart::{
    build_scenario_points, build_value_points, scenario_chart, ScenarioPoint, ValuePoint,
};
pub use engine::{ProjectionEngine, ProjectionReport};
pub use error::{ProjectionError, Result};
pub use growth::{project, GrowthProjector};
pub use overrides::{resolve, OverrideResolver};
pub use schema::*;
pub use series::{MonthSeries, MONTHS_PER_YEAR};
pub use settings::{load_optional_settings, load_settings, EngineSettings};
pub use store::{InMemoryRepository, JsonFileRepository, Projection, ProjectionRepository};
pub use utils::*;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrphanOrigin {
    PrevYear,
    ManualOverride(Scenario),
}

impl std::fmt::Display for OrphanOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrphanOrigin::PrevYear => write!(f, "prev-year baseline"),
            OrphanOrigin::ManualOverride(s) => write!(f, "{} manual override", s),
        }
    }
}

/// A stored series whose item id is no longer in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanedSeries {
    pub category: Category,
    pub item_id: String,
    pub origin: OrphanOrigin,
}

impl From<OrphanedSeries> for ProjectionError {
    fn from(orphan: OrphanedSeries) -> Self {
        ProjectionError::ConfigurationMismatch {
            category: orphan.category,
            id: orphan.item_id,
            origin: orphan.origin.to_string(),
        }
    }
}

/// Lists baseline and override entries that reference items missing from
/// `config`. Computation ignores them; this is for data-hygiene reporting.
pub fn audit_projection(config: &ProjectionConfig, base: &ProjectionBase) -> Vec<OrphanedSeries> {
    let mut orphans = Vec::new();

    for category in [Category::RevenueStreams, Category::MktComponents] {
        for id in base.prev_year.item_ids(category) {
            if config.find_item(category, id).is_none() {
                orphans.push(OrphanedSeries {
                    category,
                    item_id: id.to_string(),
                    origin: OrphanOrigin::PrevYear,
                });
            }
        }
    }

    for entry in &base.manual_overrides {
        if !config.contains(&entry.target) {
            if let Some(id) = entry.target.item_id() {
                orphans.push(OrphanedSeries {
                    category: entry.target.category(),
                    item_id: id.to_string(),
                    origin: OrphanOrigin::ManualOverride(entry.scenario),
                });
            }
        }
    }

    orphans
}

pub struct ProjectionProcessor;

impl ProjectionProcessor {
    /// Validates the inputs, reports orphaned series and computes every
    /// derived series. Orphans are logged and skipped.
    pub fn process(
        config: &ProjectionConfig,
        base: &ProjectionBase,
        rate_table: &RateTable,
    ) -> Result<ProjectionReport> {
        validate_inputs(config, base, rate_table)?;

        info!(
            "Computing projection for {} revenue streams and {} marketing components",
            config.revenue_streams.len(),
            config.mkt_components.len()
        );
        debug!(
            "Growth rates: minimo={} medio={} maximo={}, {} override layers",
            base.growth.minimo,
            base.growth.medio,
            base.growth.maximo,
            base.manual_overrides.len()
        );

        for orphan in audit_projection(config, base) {
            warn!(
                "Ignoring {} series for unknown {} item '{}'",
                orphan.origin, orphan.category, orphan.item_id
            );
        }

        ProjectionEngine::new(rate_table).compute(config, base)
    }

    /// Like [`process`](Self::process) but refuses inputs that carry orphaned
    /// series.
    pub fn process_strict(
        config: &ProjectionConfig,
        base: &ProjectionBase,
        rate_table: &RateTable,
    ) -> Result<ProjectionReport> {
        if let Some(orphan) = audit_projection(config, base).into_iter().next() {
            return Err(orphan.into());
        }
        Self::process(config, base, rate_table)
    }

    pub fn process_stored(
        projection: &Projection,
        settings: &EngineSettings,
    ) -> Result<ProjectionReport> {
        settings.validate()?;
        Self::process(&projection.config, &projection.base, &settings.rate_table)
    }
}

pub fn process_projection(
    config: &ProjectionConfig,
    base: &ProjectionBase,
    rate_table: &RateTable,
) -> Result<ProjectionReport> {
    ProjectionProcessor::process(config, base, rate_table)
}

fn validate_inputs(
    config: &ProjectionConfig,
    base: &ProjectionBase,
    rate_table: &RateTable,
) -> Result<()> {
    config.validate()?;
    base.validate()?;
    rate_table.validate()?;
    Ok(())
}
