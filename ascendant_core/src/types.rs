//! Core value types shared by every rules module

use serde::{Deserialize, Serialize};

/// The six ability scores of the hybrid ruleset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Strength,
    Agility,
    Vitality,
    Intelligence,
    Perception,
    Presence,
}

impl Ability {
    /// Get all abilities in sheet order
    pub fn all() -> &'static [Ability] {
        &[
            Ability::Strength,
            Ability::Agility,
            Ability::Vitality,
            Ability::Intelligence,
            Ability::Perception,
            Ability::Presence,
        ]
    }

    /// Three letter abbreviation used on character sheets
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Agility => "AGI",
            Ability::Vitality => "VIT",
            Ability::Intelligence => "INT",
            Ability::Perception => "PER",
            Ability::Presence => "PRE",
        }
    }
}

/// Raw ability scores for a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub agility: i32,
    pub vitality: i32,
    pub intelligence: i32,
    pub perception: i32,
    pub presence: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        AbilityScores::uniform(10)
    }
}

impl AbilityScores {
    /// Every score set to the same value
    pub fn uniform(score: i32) -> Self {
        AbilityScores {
            strength: score,
            agility: score,
            vitality: score,
            intelligence: score,
            perception: score,
            presence: score,
        }
    }

    /// Get the raw score for an ability
    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Agility => self.agility,
            Ability::Vitality => self.vitality,
            Ability::Intelligence => self.intelligence,
            Ability::Perception => self.perception,
            Ability::Presence => self.presence,
        }
    }

    /// Copy with one score replaced
    pub fn with(mut self, ability: Ability, score: i32) -> Self {
        match ability {
            Ability::Strength => self.strength = score,
            Ability::Agility => self.agility = score,
            Ability::Vitality => self.vitality = score,
            Ability::Intelligence => self.intelligence = score,
            Ability::Perception => self.perception = score,
            Ability::Presence => self.presence = score,
        }
        self
    }

    /// Sum of all six scores
    pub fn total(&self) -> i32 {
        Ability::all().iter().map(|a| self.get(*a)).sum()
    }

    /// Modifier for an ability
    pub fn modifier(&self, ability: Ability) -> i32 {
        crate::ability::modifier(self.get(ability))
    }
}

/// Skills and the ability that governs each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Athletics,
    Acrobatics,
    SleightOfHand,
    Stealth,
    Arcana,
    History,
    Investigation,
    Nature,
    Religion,
    AnimalHandling,
    Insight,
    Medicine,
    Awareness,
    Survival,
    Deception,
    Intimidation,
    Performance,
    Persuasion,
}

impl Skill {
    /// The ability whose modifier a check with this skill uses
    pub fn ability(&self) -> Ability {
        match self {
            Skill::Athletics => Ability::Strength,
            Skill::Acrobatics | Skill::SleightOfHand | Skill::Stealth => Ability::Agility,
            Skill::Arcana
            | Skill::History
            | Skill::Investigation
            | Skill::Nature
            | Skill::Religion => Ability::Intelligence,
            Skill::AnimalHandling
            | Skill::Insight
            | Skill::Medicine
            | Skill::Awareness
            | Skill::Survival => Ability::Perception,
            Skill::Deception | Skill::Intimidation | Skill::Performance | Skill::Persuasion => {
                Ability::Presence
            }
        }
    }
}

/// Damage types recognised by mitigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Slashing,
    Piercing,
    Bludgeoning,
    Fire,
    Cold,
    Lightning,
    Thunder,
    Acid,
    Poison,
    Necrotic,
    Radiant,
    Force,
    Psychic,
    Shadow,
}

/// Armor weight class, decides how much agility counts toward AC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArmorCategory {
    #[default]
    None,
    Light,
    Medium,
    Heavy,
}

/// Delivery of an attack, decides the default ability used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    #[default]
    Melee,
    Ranged,
    Spell,
}

impl AttackKind {
    /// Ability used when the attack does not override it
    pub fn default_ability(&self) -> Ability {
        match self {
            AttackKind::Melee => Ability::Strength,
            AttackKind::Ranged => Ability::Agility,
            AttackKind::Spell => Ability::Intelligence,
        }
    }
}

/// Spell slot progression followed by a class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CasterKind {
    #[default]
    None,
    Full,
    Half,
    /// Small slot pool refreshed on a short rest
    Pact,
}

/// Damage types a creature or character shrugs off
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defenses {
    #[serde(default)]
    pub resistances: Vec<DamageType>,
    #[serde(default)]
    pub immunities: Vec<DamageType>,
}

impl Defenses {
    pub fn is_immune(&self, damage_type: DamageType) -> bool {
        self.immunities.contains(&damage_type)
    }

    pub fn resists(&self, damage_type: DamageType) -> bool {
        self.resistances.contains(&damage_type)
    }
}
