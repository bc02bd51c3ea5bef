//! Configuration loading and parsing
//!
//! The config file is optional. It can add or override provider codes and
//! move the stop table columns for manifests exported with a different layout.

use anyhow::{Context, Result};
use manifest_reader::{ProviderTable, SheetLayout};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Provider short name -> DSP code, merged over the built-in table
    #[serde(default)]
    pub providers: BTreeMap<String, String>,
    #[serde(default)]
    pub layout: SheetLayout,
}

impl AppConfig {
    /// Built-in providers with the configured ones applied on top
    pub fn provider_table(&self) -> Result<ProviderTable> {
        let mut table = ProviderTable::new();
        for (name, code) in &self.providers {
            table
                .insert(name.as_str(), code.as_str())
                .with_context(|| format!("Invalid provider entry {:?}", name))?;
        }
        Ok(table)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .layout
        .validate()
        .with_context(|| format!("Invalid layout in config file: {:?}", path))?;

    Ok(config)
}
