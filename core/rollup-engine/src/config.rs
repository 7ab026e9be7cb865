//! FILENAME: core/rollup-engine/src/config.rs
//! PURPOSE: Dashboard configuration: where to read from, how to page, and
//! per-dataset definition overrides.
//! CONTEXT: Loaded from JSON; connection settings may be overridden from the
//! environment so keys stay out of checked-in files.

use std::fs;
use std::path::Path;

use fiscal::log_info;
use serde::{Deserialize, Serialize};
use table_source::{HttpSourceConfig, LoaderConfig};
use crate::datasets::{CapitalDataset, DiscretionaryDataset, RevenueDataset};
use crate::definition::DatasetDefinition;
use crate::error::ConfigError;

pub const ENV_SOURCE_URL: &str = "FISCAL_SOURCE_URL";
pub const ENV_SOURCE_KEY: &str = "FISCAL_SOURCE_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub source: Option<HttpSourceConfig>,
    pub loader: LoaderConfig,
    /// Replaces the built-in definition with the same `id`.
    pub datasets: Vec<DatasetDefinition>,
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        log_info!("CFG", "loaded {} with {} dataset override(s)", path.display(), config.datasets.len());
        Ok(config)
    }

    /// Applies `FISCAL_SOURCE_URL` / `FISCAL_SOURCE_KEY` when set.
    pub fn apply_env(&mut self) {
        let url = std::env::var(ENV_SOURCE_URL).ok();
        let key = std::env::var(ENV_SOURCE_KEY).ok();
        self.apply_source_overrides(url, key);
    }

    pub fn apply_source_overrides(&mut self, url: Option<String>, key: Option<String>) {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            match &mut self.source {
                Some(source) => source.base_url = url,
                None => self.source = Some(HttpSourceConfig::new(&url)),
            }
        }
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            if let Some(source) = &mut self.source {
                source.api_key = Some(key);
            }
        }
    }

    pub fn source_config(&self) -> Result<&HttpSourceConfig, ConfigError> {
        self.source
            .as_ref()
            .ok_or_else(|| ConfigError::Missing(format!("source.baseUrl (or {})", ENV_SOURCE_URL)))
    }

    /// Override for `id`, if configured.
    pub fn definition(&self, id: &str) -> Option<&DatasetDefinition> {
        self.datasets.iter().find(|d| d.id == id)
    }

    fn definition_or(&self, id: &str, default: DatasetDefinition) -> DatasetDefinition {
        self.definition(id).cloned().unwrap_or(default)
    }

    pub fn capital_dataset(&self) -> CapitalDataset {
        CapitalDataset::with_definition(
            self.definition_or(CapitalDataset::ID, CapitalDataset::default_definition()),
        )
    }

    pub fn discretionary_dataset(&self) -> DiscretionaryDataset {
        DiscretionaryDataset::with_definition(
            self.definition_or(DiscretionaryDataset::ID, DiscretionaryDataset::default_definition()),
        )
    }

    pub fn revenue_dataset(&self) -> RevenueDataset {
        RevenueDataset::with_definition(
            self.definition_or(RevenueDataset::ID, RevenueDataset::default_definition()),
        )
    }
}
