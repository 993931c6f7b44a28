//! Power catalog loading

use super::ConfigError;
use crate::spell::{PowerCatalog, Spell};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Container for power definitions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowersConfig {
    #[serde(default)]
    pub powers: Vec<Spell>,
}

fn into_catalog(config: PowersConfig) -> Result<PowerCatalog, ConfigError> {
    let mut catalog = PowerCatalog::new();
    for spell in config.powers {
        let id = spell.id.clone();
        let level = spell.level;
        if !catalog.register(spell) {
            return Err(ConfigError::ValidationError(format!(
                "power '{}' has level {} (expected 0-9)",
                id, level
            )));
        }
    }
    Ok(catalog)
}

/// Load the power catalog from a TOML file
pub fn load_power_catalog(path: &Path) -> Result<PowerCatalog, ConfigError> {
    let config: PowersConfig = super::load_toml(path)?;
    into_catalog(config)
}

/// Load the power catalog from a TOML string
pub fn parse_power_catalog(content: &str) -> Result<PowerCatalog, ConfigError> {
    let config: PowersConfig = super::parse_toml(content)?;
    into_catalog(config)
}

/// Get the built-in power catalog
pub fn default_powers() -> PowerCatalog {
    let toml = include_str!("../../config/powers.toml");
    parse_power_catalog(toml).unwrap_or_else(|err| {
        warn!(%err, "built-in power catalog failed to load, starting empty");
        PowerCatalog::new()
    })
}
