//! Powers and spells - definitions, legality and casting
//!
//! A `Spell` is static data loaded from the power catalog. Casting is
//! stateless: `cast` takes a character snapshot and returns a new one with
//! the spent resources removed, plus a record of what happened.

mod cast;

pub use cast::{can_cast, can_cast_at, cast, cast_slot_level, CastFailure, CastResult, EffectOutcome};

use crate::ability::SPELL_LEVELS;
use crate::dice::DiceExpr;
use crate::types::{Ability, DamageType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpellSchool {
    Abjuration,
    Conjuration,
    Divination,
    Enchantment,
    #[default]
    Evocation,
    Illusion,
    Necromancy,
    Transmutation,
    /// Monarch and system powers
    Shadow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastingTime {
    #[default]
    Action,
    BonusAction,
    Reaction,
    Minute,
    Hour,
}

/// What casting a power costs beyond its slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub verbal: bool,
    #[serde(default)]
    pub somatic: bool,
    #[serde(default)]
    pub material: Option<String>,
    /// Favor spent from the shared counter
    #[serde(default)]
    pub favor_cost: Option<u32>,
    /// Monarch power spent from the shared counter; needs the monarch gate
    #[serde(default)]
    pub monarch_cost: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage(DamageType),
    Healing,
}

/// Saving throw a target makes against the effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOverride {
    pub ability: Ability,
    /// Successful save takes half damage instead of none
    #[serde(default)]
    pub half_on_success: bool,
}

/// Damage or healing rolled when the power resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellEffect {
    pub kind: EffectKind,
    pub formula: DiceExpr,
    /// Add the casting ability modifier to the roll
    #[serde(default)]
    pub add_ability_modifier: bool,
    #[serde(default)]
    pub save: Option<SaveOverride>,
}

/// Extra dice granted per slot level above the base level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcastScaling {
    #[serde(default = "default_dice_per_level")]
    pub dice_per_level: u32,
}

impl Default for UpcastScaling {
    fn default() -> Self {
        UpcastScaling {
            dice_per_level: default_dice_per_level(),
        }
    }
}

fn default_dice_per_level() -> u32 {
    1
}

/// A castable power
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spell {
    pub id: String,
    pub name: String,
    /// 0 for at-will powers
    pub level: u8,
    #[serde(default)]
    pub school: SpellSchool,
    #[serde(default)]
    pub casting_time: CastingTime,
    #[serde(default = "default_range")]
    pub range: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default)]
    pub concentration: bool,
    #[serde(default)]
    pub ritual: bool,
    #[serde(default)]
    pub components: Components,
    /// Minimum character level; derived from spell level when absent
    #[serde(default)]
    pub required_level: Option<u32>,
    /// Classes allowed to cast; empty means any class
    #[serde(default)]
    pub classes: Vec<String>,
    /// Monarch unlock key the caster must hold
    #[serde(default)]
    pub required_unlock: Option<String>,
    #[serde(default)]
    pub effect: Option<SpellEffect>,
    #[serde(default)]
    pub upcast: UpcastScaling,
}

fn default_range() -> String {
    "self".to_string()
}

fn default_duration() -> String {
    "instantaneous".to_string()
}

impl Spell {
    /// Character level needed to cast; full casters reach spell level N at 2N-1
    pub fn minimum_character_level(&self) -> u32 {
        self.required_level
            .unwrap_or_else(|| (2 * self.level as u32).saturating_sub(1).max(1))
    }

    pub fn is_cantrip(&self) -> bool {
        self.level == 0
    }

    pub fn allows_class(&self, class_id: &str) -> bool {
        self.classes.is_empty() || self.classes.iter().any(|c| c == class_id)
    }

    pub fn favor_cost(&self) -> u32 {
        self.components.favor_cost.unwrap_or(0)
    }

    pub fn monarch_cost(&self) -> Option<u32> {
        self.components.monarch_cost
    }

    fn is_valid(&self) -> bool {
        (self.level as usize) < SPELL_LEVELS
    }
}

/// Known powers keyed by id
#[derive(Debug, Clone, Default)]
pub struct PowerCatalog {
    powers: HashMap<String, Spell>,
}

impl PowerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a power, replacing any with the same id. Returns false for a
    /// level outside 0-9.
    pub fn register(&mut self, spell: Spell) -> bool {
        if !spell.is_valid() {
            return false;
        }
        self.powers.insert(spell.id.clone(), spell);
        true
    }

    pub fn get(&self, id: &str) -> Option<&Spell> {
        self.powers.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.powers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.powers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.powers.is_empty()
    }

    /// Powers a class can cast, sorted by level then id
    pub fn for_class(&self, class_id: &str) -> Vec<&Spell> {
        let mut spells: Vec<&Spell> = self.powers.values().filter(|s| s.allows_class(class_id)).collect();
        spells.sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.id.cmp(&b.id)));
        spells
    }
}
