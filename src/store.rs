use crate::error::{ProjectionError, Result};
use crate::schema::*;
use crate::series::{validate_finite, MONTHS_PER_YEAR};
use crate::utils::validate_month_index;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// The per-tenant projection aggregate: item configuration plus the
/// authoritative baseline and manual edits. Every mutation bumps `updated_at`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub tenant_id: String,
    pub config: ProjectionConfig,
    pub base: ProjectionBase,
    pub updated_at: DateTime<Utc>,
}

impl Projection {
    pub fn new(
        tenant_id: impl Into<String>,
        config: ProjectionConfig,
        base: ProjectionBase,
    ) -> Result<Self> {
        config.validate()?;
        base.validate()?;
        Ok(Self {
            tenant_id: tenant_id.into(),
            config,
            base,
            updated_at: Utc::now(),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.base.validate()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn ensure_known(&self, target: &SeriesTarget) -> Result<()> {
        match target.item_id() {
            Some(id) if !self.config.contains(target) => Err(ProjectionError::UnknownItem {
                category: target.category(),
                id: id.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Reads a manual-override cell; `None` when the month was never edited.
    pub fn get(
        &self,
        target: &SeriesTarget,
        scenario: Scenario,
        month: usize,
    ) -> Result<Option<f64>> {
        validate_month_index(month)?;
        Ok(self
            .base
            .override_values(target, scenario)
            .and_then(|values| values.get(month).copied().flatten()))
    }

    /// Writes (or clears, with `None`) a manual-override cell.
    pub fn set(
        &mut self,
        target: &SeriesTarget,
        scenario: Scenario,
        month: usize,
        value: Option<f64>,
    ) -> Result<()> {
        validate_month_index(month)?;
        if let Some(v) = value {
            validate_finite(v, "manual override", month)?;
        }
        self.ensure_known(target)?;

        let entry = self.base.override_entry_mut(target, scenario);
        if entry.values.len() < MONTHS_PER_YEAR {
            entry.values.resize(MONTHS_PER_YEAR, None);
        }
        entry.values[month] = value;
        debug!("Override {} / {} month {} = {:?}", target, scenario, month, value);

        self.touch();
        Ok(())
    }

    pub fn get_prev_year(&self, target: &SeriesTarget, month: usize) -> Result<Option<f64>> {
        validate_month_index(month)?;
        match self.base.prev_year.series(target) {
            Some(series) => series.get(month),
            None => Ok(None),
        }
    }

    pub fn set_prev_year(
        &mut self,
        target: &SeriesTarget,
        month: usize,
        value: Option<f64>,
    ) -> Result<()> {
        validate_month_index(month)?;
        if let Some(v) = value {
            validate_finite(v, "prev-year baseline", month)?;
        }
        self.ensure_known(target)?;
        self.base.prev_year.series_mut(target).set(month, value)?;
        self.touch();
        Ok(())
    }

    pub fn set_growth(&mut self, growth: GrowthRates) -> Result<()> {
        growth.validate()?;
        self.base.growth = growth;
        self.touch();
        Ok(())
    }

    pub fn add_item(&mut self, category: Category, item: ProjectionItem) -> Result<()> {
        let id = item.id.clone();
        let items = self
            .config
            .items_mut(category)
            .ok_or(ProjectionError::NotItemized(category))?;
        items.push(item);

        if let Err(e) = self.config.validate() {
            if let Some(items) = self.config.items_mut(category) {
                items.pop();
            }
            return Err(e);
        }

        info!("Added {} item '{}' to projection {}", category, id, self.tenant_id);
        self.touch();
        Ok(())
    }

    /// Soft (de)activation. The item's stored series are never touched.
    pub fn set_item_active(&mut self, category: Category, id: &str, active: bool) -> Result<()> {
        let item = self
            .config
            .items_mut(category)
            .and_then(|items| items.iter_mut().find(|i| i.id == id))
            .ok_or_else(|| ProjectionError::UnknownItem {
                category,
                id: id.to_string(),
            })?;
        item.is_active = active;
        self.touch();
        Ok(())
    }

    pub fn deactivate_item(&mut self, category: Category, id: &str) -> Result<()> {
        self.set_item_active(category, id, false)
    }

    pub fn reactivate_item(&mut self, category: Category, id: &str) -> Result<()> {
        self.set_item_active(category, id, true)
    }
}

/// Persistence boundary owned by the calling context. The engine itself never
/// loads or saves.
pub trait ProjectionRepository {
    fn load(&self) -> Result<Option<Projection>>;
    fn save(&mut self, snapshot: &Projection) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    snapshot: Option<Projection>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Projection) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }
}

impl ProjectionRepository for InMemoryRepository {
    fn load(&self) -> Result<Option<Projection>> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &Projection) -> Result<()> {
        self.snapshot = Some(snapshot.clone());
        Ok(())
    }
}

/// Stores the projection as a single pretty-printed JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProjectionRepository for JsonFileRepository {
    fn load(&self) -> Result<Option<Projection>> {
        if !self.path.exists() {
            debug!("No projection document at {}", self.path.display());
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let projection: Projection = serde_json::from_str(&raw)?;
        projection.validate()?;
        info!(
            "Loaded projection {} from {}",
            projection.tenant_id,
            self.path.display()
        );
        Ok(Some(projection))
    }

    fn save(&mut self, snapshot: &Projection) -> Result<()> {
        let json = serde_json::to_string_pretty(snapshot)?;
        fs::write(&self.path, json)?;
        info!(
            "Saved projection {} to {}",
            snapshot.tenant_id,
            self.path.display()
        );
        Ok(())
    }
}
