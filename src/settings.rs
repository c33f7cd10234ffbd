//! Engine settings loaded from a JSON file.
//!
//! ```json
//! {
//!   "rateTable": {
//!     "fixedExpenses":    { "previsto": "medio",  "medio": "medio", "maximo": "maximo" },
//!     "variableExpenses": { "previsto": "medio",  "medio": "medio", "maximo": "maximo" },
//!     "investments":      { "previsto": "medio",  "medio": "medio", "maximo": "maximo" },
//!     "revenueStreams":   { "previsto": "minimo", "medio": "medio", "maximo": "maximo" },
//!     "mktComponents":    { "previsto": "minimo", "medio": "medio", "maximo": "maximo" }
//!   },
//!   "monthLabels": ["Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez"]
//! }
//! ```

use crate::error::Result;
use crate::schema::RateTable;
use crate::utils::{default_month_labels, validate_month_labels};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineSettings {
    pub rate_table: RateTable,

    #[serde(default = "default_month_labels")]
    pub month_labels: Vec<String>,
}

impl EngineSettings {
    pub fn new(rate_table: RateTable) -> Self {
        Self {
            rate_table,
            month_labels: default_month_labels(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.rate_table.validate()?;
        validate_month_labels(&self.month_labels)
    }
}

pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<EngineSettings> {
    let path = path.as_ref();
    debug!("Reading engine settings from {}", path.display());
    let raw = fs::read_to_string(path)?;
    let settings: EngineSettings = serde_json::from_str(&raw)?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_optional_settings(path: Option<&PathBuf>) -> Result<Option<EngineSettings>> {
    match path {
        Some(settings_path) => Ok(Some(load_settings(settings_path)?)),
        None => Ok(None),
    }
}
