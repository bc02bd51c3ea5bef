//! Dispatch service provider (DSP) codes
//!
//! Route headers carry the preferred DSP as an opaque code. Users refer to
//! providers by short name; this table maps one to the other.

use crate::types::{ManifestError, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Selector value meaning "do not filter by provider"
pub const ALL_PROVIDERS: &str = "all";

pub const SBS_DSP_CODE: &str = "8b6c9223-3e5f-421b-bd34-ca3926bd0cd3-PREFERRED";
pub const MARUWA_DSP_CODE: &str = "c2bb1e2b-d818-4246-baab-72cb9e1d5ba8-PREFERRED";
/// Flex routes carry no preferred DSP
pub const AMFLEX_DSP_CODE: &str = "";

/// Provider short name -> DSP code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderTable {
    codes: BTreeMap<String, String>,
}

impl Default for ProviderTable {
    fn default() -> Self {
        let mut codes = BTreeMap::new();
        codes.insert("sbs".to_string(), SBS_DSP_CODE.to_string());
        codes.insert("maruwa".to_string(), MARUWA_DSP_CODE.to_string());
        codes.insert("amflex".to_string(), AMFLEX_DSP_CODE.to_string());
        Self { codes }
    }
}

impl ProviderTable {
    /// Table with the built-in providers
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a provider
    ///
    /// `all` is reserved for the no-filter selector.
    pub fn insert(&mut self, name: impl Into<String>, code: impl Into<String>) -> Result<()> {
        let name = name.into();
        if name == ALL_PROVIDERS {
            return Err(ManifestError::Config(format!(
                "provider name {:?} is reserved",
                ALL_PROVIDERS
            )));
        }
        self.codes.insert(name, code.into());
        Ok(())
    }

    /// DSP code for a short name
    pub fn resolve(&self, name: &str) -> Result<&str> {
        self.codes
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ManifestError::UnknownProvider(name.to_string()))
    }

    /// Known short names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }
}

/// Which routes to consider by provider
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProviderSelector {
    /// Every route regardless of DSP
    #[default]
    All,
    /// Routes whose DSP code matches the named provider
    Named(String),
}

impl ProviderSelector {
    /// `all` selects every route, anything else names a provider
    pub fn from_name(name: &str) -> Self {
        if name == ALL_PROVIDERS {
            ProviderSelector::All
        } else {
            ProviderSelector::Named(name.to_string())
        }
    }
}

impl FromStr for ProviderSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for ProviderSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderSelector::All => write!(f, "{}", ALL_PROVIDERS),
            ProviderSelector::Named(name) => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_providers() {
        let table = ProviderTable::new();
        assert_eq!(table.resolve("sbs").unwrap(), SBS_DSP_CODE);
        assert_eq!(table.resolve("maruwa").unwrap(), MARUWA_DSP_CODE);
        assert_eq!(table.resolve("amflex").unwrap(), "");
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["amflex", "maruwa", "sbs"]);
    }

    #[test]
    fn test_unknown_provider() {
        let table = ProviderTable::new();
        assert!(matches!(
            table.resolve("acme"),
            Err(ManifestError::UnknownProvider(name)) if name == "acme"
        ));
    }

    #[test]
    fn test_insert_override_and_reserved_name() {
        let mut table = ProviderTable::new();
        table.insert("sbs", "NEW").unwrap();
        table.insert("acme", "ACME-PREFERRED").unwrap();
        assert_eq!(table.resolve("sbs").unwrap(), "NEW");
        assert_eq!(table.resolve("acme").unwrap(), "ACME-PREFERRED");
        assert!(table.insert("all", "x").is_err());
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!("all".parse::<ProviderSelector>().unwrap(), ProviderSelector::All);
        assert_eq!(
            "sbs".parse::<ProviderSelector>().unwrap(),
            ProviderSelector::Named("sbs".into())
        );
        assert_eq!(ProviderSelector::Named("maruwa".into()).to_string(), "maruwa");
    }
}
