//! Game constants configuration

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Tunable rules constants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConstants {
    #[serde(default)]
    pub combat: CombatConstants,
    #[serde(default)]
    pub creation: CreationConstants,
    #[serde(default)]
    pub progression: ProgressionConstants,
}

impl GameConstants {
    /// Parse constants from TOML and check they are usable
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let constants: GameConstants = super::parse_toml(content)?;
        constants.validate()?;
        Ok(constants)
    }

    /// Reject combinations the resolvers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=20).contains(&self.combat.critical_threshold) {
            return Err(ConfigError::ValidationError(format!(
                "critical_threshold must be 2-20, got {}",
                self.combat.critical_threshold
            )));
        }
        if self.creation.ability_total_min > self.creation.ability_total_max {
            return Err(ConfigError::ValidationError(
                "ability_total_min exceeds ability_total_max".to_string(),
            ));
        }
        if self.progression.max_level == 0 {
            return Err(ConfigError::ValidationError(
                "max_level must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatConstants {
    /// Natural d20 result at or above which an attack is a critical hit
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u32,
    /// Threat reach for opportunity attacks, in feet
    #[serde(default = "default_reach_feet")]
    pub reach_feet: u32,
}

impl Default for CombatConstants {
    fn default() -> Self {
        CombatConstants {
            critical_threshold: default_critical_threshold(),
            reach_feet: default_reach_feet(),
        }
    }
}

fn default_critical_threshold() -> u32 {
    20
}
fn default_reach_feet() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreationConstants {
    /// Comfort band for the ability score total (inclusive)
    #[serde(default = "default_ability_total_min")]
    pub ability_total_min: i32,
    #[serde(default = "default_ability_total_max")]
    pub ability_total_max: i32,
    /// A class should have at least one primary ability at this score
    #[serde(default = "default_primary_threshold")]
    pub primary_ability_threshold: i32,
    /// Skill proficiencies beyond this count draw a warning at level 1
    #[serde(default = "default_skill_soft_cap")]
    pub skill_soft_cap: usize,
}

impl Default for CreationConstants {
    fn default() -> Self {
        CreationConstants {
            ability_total_min: default_ability_total_min(),
            ability_total_max: default_ability_total_max(),
            primary_ability_threshold: default_primary_threshold(),
            skill_soft_cap: default_skill_soft_cap(),
        }
    }
}

fn default_ability_total_min() -> i32 {
    70
}
fn default_ability_total_max() -> i32 {
    80
}
fn default_primary_threshold() -> i32 {
    13
}
fn default_skill_soft_cap() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionConstants {
    #[serde(default = "default_max_level")]
    pub max_level: u32,
    /// Walking speed in feet when a class does not set one
    #[serde(default = "default_speed")]
    pub default_speed: u32,
}

impl Default for ProgressionConstants {
    fn default() -> Self {
        ProgressionConstants {
            max_level: default_max_level(),
            default_speed: default_speed(),
        }
    }
}

fn default_max_level() -> u32 {
    20
}
fn default_speed() -> u32 {
    30
}
