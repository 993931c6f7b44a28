//! Class catalog loading

use super::ConfigError;
use crate::character::{ClassCatalog, ClassProfile};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Container for class profiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassesConfig {
    #[serde(rename = "classes")]
    pub classes: Vec<ClassProfile>,
}

fn into_catalog(config: ClassesConfig) -> Result<ClassCatalog, ConfigError> {
    for profile in &config.classes {
        if profile.hit_die < 2 {
            return Err(ConfigError::ValidationError(format!(
                "class '{}' has hit die d{}",
                profile.id, profile.hit_die
            )));
        }
    }
    Ok(config.classes.into_iter().collect())
}

/// Load the class catalog from a TOML file
pub fn load_class_catalog(path: &Path) -> Result<ClassCatalog, ConfigError> {
    let config: ClassesConfig = super::load_toml(path)?;
    into_catalog(config)
}

/// Load the class catalog from a TOML string
pub fn parse_class_catalog(content: &str) -> Result<ClassCatalog, ConfigError> {
    let config: ClassesConfig = super::parse_toml(content)?;
    into_catalog(config)
}

/// Get the built-in class catalog
pub fn default_classes() -> ClassCatalog {
    let toml = include_str!("../../config/classes.toml");
    parse_class_catalog(toml).unwrap_or_else(|err| {
        warn!(%err, "built-in class catalog failed to load, using fallback");
        std::iter::once(ClassProfile::fallback("fighter")).collect()
    })
}
