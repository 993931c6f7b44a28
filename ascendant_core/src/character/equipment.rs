//! Equipment, creatures, shadow soldiers and runes
//!
//! Read-only descriptors consumed by the combat math. The core never
//! mutates them on its own; a character only swaps whole items in and out.

use crate::dice::DiceExpr;
use crate::types::{AbilityScores, ArmorCategory, AttackKind, DamageType, Defenses};
use serde::{Deserialize, Serialize};

/// A carried item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub id: String,
    pub name: String,
    pub kind: EquipmentKind,
    #[serde(default)]
    pub equipped: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EquipmentKind {
    Weapon(WeaponProfile),
    Armor { category: ArmorCategory },
    Shield,
    Gear,
}

impl Equipment {
    pub fn weapon(id: impl Into<String>, name: impl Into<String>, profile: WeaponProfile) -> Self {
        Equipment {
            id: id.into(),
            name: name.into(),
            kind: EquipmentKind::Weapon(profile),
            equipped: false,
        }
    }

    pub fn armor(id: impl Into<String>, name: impl Into<String>, category: ArmorCategory) -> Self {
        Equipment {
            id: id.into(),
            name: name.into(),
            kind: EquipmentKind::Armor { category },
            equipped: false,
        }
    }

    pub fn shield(id: impl Into<String>, name: impl Into<String>) -> Self {
        Equipment {
            id: id.into(),
            name: name.into(),
            kind: EquipmentKind::Shield,
            equipped: false,
        }
    }

    /// Mark as worn or wielded
    pub fn equipped(mut self) -> Self {
        self.equipped = true;
        self
    }

    pub fn weapon_profile(&self) -> Option<&WeaponProfile> {
        match &self.kind {
            EquipmentKind::Weapon(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Attack profile of a weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    #[serde(default)]
    pub kind: AttackKind,
    /// Reach in feet for melee weapons
    #[serde(default = "default_reach")]
    pub reach_feet: u32,
}

fn default_reach() -> u32 {
    5
}

/// Attack carried by a creature stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackProfile {
    pub name: String,
    /// Total to-hit bonus, already including ability and proficiency
    pub attack_bonus: i32,
    pub damage: DiceExpr,
    pub damage_type: DamageType,
    /// Flat bonus added to damage
    #[serde(default)]
    pub damage_bonus: i32,
    #[serde(default = "default_reach")]
    pub reach_feet: u32,
}

/// Monster or ally stat block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub id: String,
    pub name: String,
    pub armor_class: i32,
    pub max_hit_points: i32,
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub attack: Option<AttackProfile>,
    #[serde(default)]
    pub defenses: Defenses,
    #[serde(default)]
    pub traits: Vec<String>,
    #[serde(default = "default_creature_speed")]
    pub speed: u32,
}

fn default_creature_speed() -> u32 {
    30
}

impl Creature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, armor_class: i32, max_hit_points: i32) -> Self {
        Creature {
            id: id.into(),
            name: name.into(),
            armor_class,
            max_hit_points,
            abilities: AbilityScores::default(),
            attack: None,
            defenses: Defenses::default(),
            traits: Vec::new(),
            speed: default_creature_speed(),
        }
    }

    pub fn with_attack(mut self, attack: AttackProfile) -> Self {
        self.attack = Some(attack);
        self
    }

    pub fn with_defenses(mut self, defenses: Defenses) -> Self {
        self.defenses = defenses;
        self
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.eq_ignore_ascii_case(name))
    }
}

/// Rank of an extracted shadow soldier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoldierRank {
    #[default]
    Normal,
    Elite,
    Knight,
    General,
    Marshal,
}

/// A summoned ally bound to a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowSoldier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rank: SoldierRank,
    pub creature: Creature,
}

/// An inscription granting flat bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rune {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub armor_class_bonus: i32,
    #[serde(default)]
    pub damage_bonus: i32,
    #[serde(default)]
    pub description: String,
}
