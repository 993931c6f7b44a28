//! Class profiles - static starting packages keyed by class id

use crate::types::{Ability, CasterKind, Skill};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which half of the hybrid ruleset a class comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSystem {
    #[default]
    Ascendant,
    Classic,
}

/// Starting package for a class
/// Loaded from TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Unique class identifier
    pub id: String,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub system: RuleSystem,
    /// Faces of the hit die
    pub hit_die: u32,
    /// Abilities the class leans on; creation warns if none reaches 13
    #[serde(default)]
    pub primary_abilities: Vec<Ability>,
    #[serde(default)]
    pub saving_throws: Vec<Ability>,
    /// Skills offered at creation
    #[serde(default)]
    pub skill_options: Vec<Skill>,
    #[serde(default)]
    pub starting_features: Vec<String>,
    #[serde(default)]
    pub caster: CasterKind,
    #[serde(default)]
    pub spellcasting_ability: Option<Ability>,
    /// Whether characters of this class may take monarch power
    #[serde(default)]
    pub allows_monarch: bool,
    /// Walking speed override in feet
    #[serde(default)]
    pub speed: Option<u32>,
}

impl ClassProfile {
    /// Neutral profile used when a class id cannot be resolved
    pub fn fallback(id: impl Into<String>) -> Self {
        let id = id.into();
        ClassProfile {
            name: if id.is_empty() { "Unclassed".to_string() } else { id.clone() },
            id,
            system: RuleSystem::Classic,
            hit_die: 8,
            primary_abilities: Vec::new(),
            saving_throws: Vec::new(),
            skill_options: Vec::new(),
            starting_features: Vec::new(),
            caster: CasterKind::None,
            spellcasting_ability: None,
            allows_monarch: false,
            speed: None,
        }
    }
}

/// Immutable lookup of class profiles
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: HashMap<String, ClassProfile>,
}

impl ClassCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        ClassCatalog {
            classes: HashMap::new(),
        }
    }

    /// Register a class profile, replacing any with the same id
    pub fn register(&mut self, profile: ClassProfile) {
        self.classes.insert(profile.id.clone(), profile);
    }

    /// Get a class profile by id
    pub fn get(&self, id: &str) -> Option<&ClassProfile> {
        self.classes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.classes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Class ids in sorted order
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl FromIterator<ClassProfile> for ClassCatalog {
    fn from_iter<I: IntoIterator<Item = ClassProfile>>(iter: I) -> Self {
        let mut catalog = ClassCatalog::new();
        for profile in iter {
            catalog.register(profile);
        }
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = ClassCatalog::new();
        catalog.register(ClassProfile::fallback("squire"));
        assert!(catalog.contains("squire"));
        assert_eq!(catalog.get("squire").map(|c| c.hit_die), Some(8));
        assert!(catalog.get("knight").is_none());
    }

    #[test]
    fn test_ids_sorted() {
        let catalog: ClassCatalog = ["b", "a", "c"].into_iter().map(ClassProfile::fallback).collect();
        assert_eq!(catalog.ids(), vec!["a", "b", "c"]);
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn test_fallback_is_neutral() {
        let profile = ClassProfile::fallback("");
        assert_eq!(profile.name, "Unclassed");
        assert!(!profile.allows_monarch);
        assert_eq!(profile.caster, CasterKind::None);
    }
}
