//! Loader configuration
//!
//! Sources, lowest to highest precedence:
//! - built-in defaults
//! - a TOML file (`from_file`)
//! - `PLUGIN_LOADER_*` environment variables (`merge_env`)

use crate::error::{Error, Result};
use crate::plugin::FactorySymbols;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// When the OS loader resolves the library's own undefined symbols
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolBinding {
    /// On first use (`RTLD_LAZY`)
    #[default]
    Lazy,
    /// While opening (`RTLD_NOW`)
    Now,
}

impl FromStr for SymbolBinding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lazy" => Ok(Self::Lazy),
            "now" => Ok(Self::Now),
            other => Err(Error::Config(format!(
                "Unknown symbol binding '{}' (expected 'lazy' or 'now')",
                other
            ))),
        }
    }
}

/// Plugin loader configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Factory symbol names
    pub symbols: FactorySymbols,
    /// Symbol binding mode used when opening libraries
    pub binding: SymbolBinding,
}

impl LoaderConfig {
    /// Load from environment variables on top of the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Read a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.as_ref().display(), e)))
    }

    /// Override fields with any `PLUGIN_LOADER_*` variables that are set
    pub fn merge_env(self) -> Result<Self> {
        self.merge_vars(|key| std::env::var(key).ok())
    }

    fn merge_vars(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(create) = var("PLUGIN_LOADER_CREATE_SYMBOL") {
            self.symbols.create = create;
        }
        if let Some(destroy) = var("PLUGIN_LOADER_DESTROY_SYMBOL") {
            self.symbols.destroy = destroy;
        }
        if let Some(binding) = var("PLUGIN_LOADER_BINDING") {
            self.binding = binding.parse()?;
        }
        Ok(self)
    }
}
