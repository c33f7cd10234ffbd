use crate::error::{ProjectionError, Result};
use crate::series::{validate_finite, validate_len, MonthSeries, MONTHS_PER_YEAR};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    #[schemars(description = "Forecast scenario, the primary projection")]
    Previsto,

    #[schemars(description = "Average-case scenario")]
    Medio,

    #[schemars(description = "Best-case / upper-bound scenario")]
    Maximo,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Previsto, Scenario::Medio, Scenario::Maximo];
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::Previsto => "previsto",
            Scenario::Medio => "medio",
            Scenario::Maximo => "maximo",
        };
        f.write_str(name)
    }
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    FixedExpenses,
    VariableExpenses,
    Investments,
    #[schemars(description = "Per-stream revenue series, keyed by stream id")]
    RevenueStreams,
    #[schemars(description = "Per-component marketing series, keyed by component id")]
    MktComponents,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::FixedExpenses,
        Category::VariableExpenses,
        Category::Investments,
        Category::RevenueStreams,
        Category::MktComponents,
    ];

    /// Itemized categories hold one series per configured item.
    pub fn is_itemized(&self) -> bool {
        matches!(self, Category::RevenueStreams | Category::MktComponents)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::FixedExpenses => "fixedExpenses",
            Category::VariableExpenses => "variableExpenses",
            Category::Investments => "investments",
            Category::RevenueStreams => "revenueStreams",
            Category::MktComponents => "mktComponents",
        };
        f.write_str(name)
    }
}

/// Addresses one tracked series: a flat category or a single item of an
/// itemized category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, JsonSchema)]
#[serde(tag = "category", content = "id", rename_all = "camelCase")]
pub enum SeriesTarget {
    FixedExpenses,
    VariableExpenses,
    Investments,
    RevenueStream(String),
    MktComponent(String),
}

impl SeriesTarget {
    pub fn category(&self) -> Category {
        match self {
            SeriesTarget::FixedExpenses => Category::FixedExpenses,
            SeriesTarget::VariableExpenses => Category::VariableExpenses,
            SeriesTarget::Investments => Category::Investments,
            SeriesTarget::RevenueStream(_) => Category::RevenueStreams,
            SeriesTarget::MktComponent(_) => Category::MktComponents,
        }
    }

    pub fn item_id(&self) -> Option<&str> {
        match self {
            SeriesTarget::RevenueStream(id) | SeriesTarget::MktComponent(id) => Some(id),
            _ => None,
        }
    }

    pub fn item(category: Category, id: impl Into<String>) -> Option<Self> {
        match category {
            Category::RevenueStreams => Some(SeriesTarget::RevenueStream(id.into())),
            Category::MktComponents => Some(SeriesTarget::MktComponent(id.into())),
            _ => None,
        }
    }
}

impl fmt::Display for SeriesTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_id() {
            Some(id) => write!(f, "{}[{}]", self.category(), id),
            None => write!(f, "{}", self.category()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GrowthField {
    Minimo,
    Medio,
    Maximo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
pub struct GrowthRates {
    #[schemars(description = "Minimum growth rate as a fraction (0.05 = 5%). May be negative.")]
    pub minimo: f64,

    #[schemars(description = "Average growth rate as a fraction.")]
    pub medio: f64,

    #[schemars(description = "Maximum growth rate as a fraction.")]
    pub maximo: f64,
}

impl GrowthRates {
    pub fn new(minimo: f64, medio: f64, maximo: f64) -> Self {
        Self {
            minimo,
            medio,
            maximo,
        }
    }

    pub fn rate(&self, field: GrowthField) -> f64 {
        match field {
            GrowthField::Minimo => self.minimo,
            GrowthField::Medio => self.medio,
            GrowthField::Maximo => self.maximo,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_rate(self.minimo, "minimo")?;
        validate_rate(self.medio, "medio")?;
        validate_rate(self.maximo, "maximo")?;
        Ok(())
    }
}

pub(crate) fn validate_rate(rate: f64, field: &str) -> Result<()> {
    if !rate.is_finite() {
        return Err(ProjectionError::InvalidGrowthRate {
            field: field.to_string(),
            value: rate,
        });
    }
    Ok(())
}

/// Which growth-rate field feeds each scenario of one category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
pub struct ScenarioRateMap {
    pub previsto: GrowthField,
    pub medio: GrowthField,
    pub maximo: GrowthField,
}

impl ScenarioRateMap {
    pub fn new(previsto: GrowthField, medio: GrowthField, maximo: GrowthField) -> Self {
        Self {
            previsto,
            medio,
            maximo,
        }
    }

    /// previsto and medio both grow at the average rate, maximo at the maximum.
    pub fn direct() -> Self {
        Self::new(GrowthField::Medio, GrowthField::Medio, GrowthField::Maximo)
    }

    pub fn field_for(&self, scenario: Scenario) -> GrowthField {
        match scenario {
            Scenario::Previsto => self.previsto,
            Scenario::Medio => self.medio,
            Scenario::Maximo => self.maximo,
        }
    }
}

/// Explicit category -> scenario -> growth-field table.
///
/// There is deliberately no `Default`: every category that gets projected must
/// be mapped by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RateTable(BTreeMap<Category, ScenarioRateMap>);

impl RateTable {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn uniform(map: ScenarioRateMap) -> Self {
        Self(Category::ALL.iter().map(|c| (*c, map)).collect())
    }

    #[must_use]
    pub fn with(mut self, category: Category, map: ScenarioRateMap) -> Self {
        self.0.insert(category, map);
        self
    }

    pub fn mapping_for(&self, category: Category) -> Result<&ScenarioRateMap> {
        self.0
            .get(&category)
            .ok_or(ProjectionError::MissingRateMapping(category))
    }

    pub fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            self.mapping_for(category)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionItem {
    pub id: String,
    pub name: String,

    #[schemars(description = "Display rank, unique within its list")]
    pub order: u32,

    #[schemars(
        description = "Inactive items keep their historical series but are excluded from totals"
    )]
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ProjectionItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionConfig {
    #[serde(default)]
    pub revenue_streams: Vec<ProjectionItem>,

    #[serde(default)]
    pub mkt_components: Vec<ProjectionItem>,
}

impl ProjectionConfig {
    pub fn items(&self, category: Category) -> &[ProjectionItem] {
        match category {
            Category::RevenueStreams => &self.revenue_streams,
            Category::MktComponents => &self.mkt_components,
            _ => &[],
        }
    }

    pub fn items_mut(&mut self, category: Category) -> Option<&mut Vec<ProjectionItem>> {
        match category {
            Category::RevenueStreams => Some(&mut self.revenue_streams),
            Category::MktComponents => Some(&mut self.mkt_components),
            _ => None,
        }
    }

    pub fn find_item(&self, category: Category, id: &str) -> Option<&ProjectionItem> {
        self.items(category).iter().find(|i| i.id == id)
    }

    pub fn contains(&self, target: &SeriesTarget) -> bool {
        match target.item_id() {
            Some(id) => self.find_item(target.category(), id).is_some(),
            None => true,
        }
    }

    pub fn items_in_display_order(&self, category: Category) -> Vec<&ProjectionItem> {
        let mut items: Vec<&ProjectionItem> = self.items(category).iter().collect();
        items.sort_by_key(|i| i.order);
        items
    }

    pub fn validate(&self) -> Result<()> {
        for category in [Category::RevenueStreams, Category::MktComponents] {
            let mut ids = HashSet::new();
            let mut orders = HashSet::new();
            for item in self.items(category) {
                if !ids.insert(item.id.as_str()) {
                    return Err(ProjectionError::DuplicateItemId {
                        category,
                        id: item.id.clone(),
                    });
                }
                if !orders.insert(item.order) {
                    return Err(ProjectionError::DuplicateItemOrder {
                        category,
                        order: item.order,
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrevYear {
    #[serde(default)]
    pub fixed_expenses: MonthSeries,

    #[serde(default)]
    pub variable_expenses: MonthSeries,

    #[serde(default)]
    pub investments: MonthSeries,

    #[serde(default)]
    pub revenue_streams: BTreeMap<String, MonthSeries>,

    #[serde(default)]
    pub mkt_components: BTreeMap<String, MonthSeries>,
}

impl PrevYear {
    pub fn series(&self, target: &SeriesTarget) -> Option<&MonthSeries> {
        match target {
            SeriesTarget::FixedExpenses => Some(&self.fixed_expenses),
            SeriesTarget::VariableExpenses => Some(&self.variable_expenses),
            SeriesTarget::Investments => Some(&self.investments),
            SeriesTarget::RevenueStream(id) => self.revenue_streams.get(id),
            SeriesTarget::MktComponent(id) => self.mkt_components.get(id),
        }
    }

    /// Mutable access, creating an unset series for an item seen for the first time.
    pub fn series_mut(&mut self, target: &SeriesTarget) -> &mut MonthSeries {
        match target {
            SeriesTarget::FixedExpenses => &mut self.fixed_expenses,
            SeriesTarget::VariableExpenses => &mut self.variable_expenses,
            SeriesTarget::Investments => &mut self.investments,
            SeriesTarget::RevenueStream(id) => {
                self.revenue_streams.entry(id.clone()).or_default()
            }
            SeriesTarget::MktComponent(id) => self.mkt_components.entry(id.clone()).or_default(),
        }
    }

    pub fn item_ids(&self, category: Category) -> Vec<&str> {
        let map = match category {
            Category::RevenueStreams => &self.revenue_streams,
            Category::MktComponents => &self.mkt_components,
            _ => return Vec::new(),
        };
        map.keys().map(String::as_str).collect()
    }
}

/// A manual edit layer for one (series, scenario) pair. `values` may be
/// shorter than a year when only the leading months were ever edited.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualOverride {
    pub target: SeriesTarget,
    pub scenario: Scenario,

    #[schemars(description = "Up to 12 values; null keeps the computed value for that month")]
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionBase {
    pub growth: GrowthRates,

    #[serde(default)]
    pub prev_year: PrevYear,

    #[serde(default)]
    pub manual_overrides: Vec<ManualOverride>,
}

impl ProjectionBase {
    pub fn override_values(
        &self,
        target: &SeriesTarget,
        scenario: Scenario,
    ) -> Option<&[Option<f64>]> {
        self.manual_overrides
            .iter()
            .find(|o| &o.target == target && o.scenario == scenario)
            .map(|o| o.values.as_slice())
    }

    /// Returns the override layer for `(target, scenario)`, creating an empty
    /// full-year layer if none exists yet.
    pub fn override_entry_mut(
        &mut self,
        target: &SeriesTarget,
        scenario: Scenario,
    ) -> &mut ManualOverride {
        let pos = self
            .manual_overrides
            .iter()
            .position(|o| &o.target == target && o.scenario == scenario);
        let idx = match pos {
            Some(idx) => idx,
            None => {
                self.manual_overrides.push(ManualOverride {
                    target: target.clone(),
                    scenario,
                    values: vec![None; MONTHS_PER_YEAR],
                });
                self.manual_overrides.len() - 1
            }
        };
        &mut self.manual_overrides[idx]
    }

    pub fn clear_override(&mut self, target: &SeriesTarget, scenario: Scenario) -> bool {
        let before = self.manual_overrides.len();
        self.manual_overrides
            .retain(|o| !(&o.target == target && o.scenario == scenario));
        before != self.manual_overrides.len()
    }

    /// Checks growth rates and override layers. Each `(target, scenario)` pair
    /// may own at most one layer.
    pub fn validate(&self) -> Result<()> {
        self.growth.validate()?;
        for (pos, entry) in self.manual_overrides.iter().enumerate() {
            if self.manual_overrides[..pos]
                .iter()
                .any(|o| o.target == entry.target && o.scenario == entry.scenario)
            {
                return Err(ProjectionError::DuplicateOverride {
                    target: entry.target.to_string(),
                    scenario: entry.scenario,
                });
            }
            let context = format!("override {} / {}", entry.target, entry.scenario);
            if entry.values.len() > MONTHS_PER_YEAR {
                validate_len(entry.values.len(), &context)?;
            }
            for (idx, cell) in entry.values.iter().enumerate() {
                if let Some(v) = cell {
                    validate_finite(*v, &context, idx)?;
                }
            }
        }
        Ok(())
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ProjectionBase)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ScenarioTotals {
    pub previsto: f64,
    pub medio: f64,
    pub maximo: f64,
}

/// The three parallel projections of one category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScenarioSeries {
    pub previsto: MonthSeries,
    pub medio: MonthSeries,
    pub maximo: MonthSeries,
}

impl ScenarioSeries {
    pub fn zeros() -> Self {
        Self {
            previsto: MonthSeries::zeros(),
            medio: MonthSeries::zeros(),
            maximo: MonthSeries::zeros(),
        }
    }

    pub fn get(&self, scenario: Scenario) -> &MonthSeries {
        match scenario {
            Scenario::Previsto => &self.previsto,
            Scenario::Medio => &self.medio,
            Scenario::Maximo => &self.maximo,
        }
    }

    pub fn get_mut(&mut self, scenario: Scenario) -> &mut MonthSeries {
        match scenario {
            Scenario::Previsto => &mut self.previsto,
            Scenario::Medio => &mut self.medio,
            Scenario::Maximo => &mut self.maximo,
        }
    }

    pub fn annual_totals(&self) -> ScenarioTotals {
        ScenarioTotals {
            previsto: self.previsto.total(),
            medio: self.medio.total(),
            maximo: self.maximo.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = ProjectionBase::schema_as_json().unwrap();
        assert!(schema_json.contains("growth"));
        assert!(schema_json.contains("prevYear"));
        assert!(schema_json.contains("manualOverrides"));
    }

    #[test]
    fn test_config_rejects_duplicate_order() {
        let config = ProjectionConfig {
            revenue_streams: vec![
                ProjectionItem::new("a", "Produtos", 1),
                ProjectionItem::new("b", "Serviços", 1),
            ],
            mkt_components: vec![],
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::DuplicateItemOrder { order: 1, .. })
        ));
    }

    #[test]
    fn test_config_rejects_duplicate_id() {
        let config = ProjectionConfig {
            revenue_streams: vec![],
            mkt_components: vec![
                ProjectionItem::new("ads", "Google Ads", 1),
                ProjectionItem::new("ads", "Meta Ads", 2),
            ],
        };
        assert!(matches!(
            config.validate(),
            Err(ProjectionError::DuplicateItemId { .. })
        ));
    }

    #[test]
    fn test_display_order() {
        let config = ProjectionConfig {
            revenue_streams: vec![
                ProjectionItem::new("c", "C", 3),
                ProjectionItem::new("a", "A", 1),
                ProjectionItem::new("b", "B", 2),
            ],
            mkt_components: vec![],
        };
        let ids: Vec<&str> = config
            .items_in_display_order(Category::RevenueStreams)
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_rate_table_requires_every_category() {
        let partial = RateTable::empty().with(Category::FixedExpenses, ScenarioRateMap::direct());
        assert!(matches!(
            partial.validate(),
            Err(ProjectionError::MissingRateMapping(Category::VariableExpenses))
        ));
        assert!(RateTable::uniform(ScenarioRateMap::direct()).validate().is_ok());
    }

    #[test]
    fn test_override_entry_created_once() {
        let mut base = ProjectionBase::default();
        let target = SeriesTarget::RevenueStream("loja".to_string());
        base.override_entry_mut(&target, Scenario::Previsto).values[0] = Some(10.0);
        base.override_entry_mut(&target, Scenario::Previsto).values[1] = Some(20.0);
        assert_eq!(base.manual_overrides.len(), 1);
        assert_eq!(
            base.override_values(&target, Scenario::Previsto).unwrap()[..2],
            [Some(10.0), Some(20.0)]
        );
        assert!(base.override_values(&target, Scenario::Maximo).is_none());
        assert!(base.clear_override(&target, Scenario::Previsto));
        assert!(base.manual_overrides.is_empty());
    }

    #[test]
    fn test_base_wire_format() {
        let json = r#"{
            "growth": {"minimo": 0.02, "medio": 0.1, "maximo": 0.2},
            "prevYear": {
                "fixedExpenses": [1000,1000,1000,1000,1000,1000,1000,1000,1000,1000,1000,1000],
                "revenueStreams": {"loja": [null,null,null,null,null,null,null,null,null,null,null,500]}
            },
            "manualOverrides": [
                {"target": {"category": "fixedExpenses"}, "scenario": "medio", "values": [1500]}
            ]
        }"#;
        let base: ProjectionBase = serde_json::from_str(json).unwrap();
        assert_eq!(base.growth.medio, 0.1);
        assert_eq!(base.prev_year.fixed_expenses.total(), 12_000.0);
        assert!(base.prev_year.investments.is_unset());
        assert_eq!(
            base.override_values(&SeriesTarget::FixedExpenses, Scenario::Medio),
            Some(&[Some(1500.0)][..])
        );
        assert!(base.validate().is_ok());
    }

    #[test]
    fn test_base_rejects_long_override() {
        let mut base = ProjectionBase::default();
        base.manual_overrides.push(ManualOverride {
            target: SeriesTarget::Investments,
            scenario: Scenario::Maximo,
            values: vec![None; 13],
        });
        assert!(matches!(
            base.validate(),
            Err(ProjectionError::InvalidSeriesLength { actual: 13, .. })
        ));
    }

    #[test]
    fn test_base_rejects_repeated_override_layer() {
        let json = r#"{
            "growth": {"minimo": 0.0, "medio": 0.1, "maximo": 0.2},
            "manualOverrides": [
                {"target": {"category": "fixedExpenses"}, "scenario": "medio", "values": [1500]},
                {"target": {"category": "fixedExpenses"}, "scenario": "maximo", "values": [1800]},
                {"target": {"category": "fixedExpenses"}, "scenario": "medio", "values": [null, 2500]}
            ]
        }"#;
        let base: ProjectionBase = serde_json::from_str(json).unwrap();
        let err = base.validate().unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::DuplicateOverride {
                scenario: Scenario::Medio,
                ..
            }
        ));
        assert!(err.is_validation());
    }

    #[test]
    fn test_growth_rates_name_the_bad_field() {
        let err = GrowthRates::new(0.0, 0.1, f64::NAN).validate().unwrap_err();
        match err {
            ProjectionError::InvalidGrowthRate { field, value } => {
                assert_eq!(field, "maximo");
                assert!(value.is_nan());
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
