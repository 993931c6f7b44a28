//! Character - immutable snapshot of a player character
//!
//! Every mutation builds a new `Character`; nothing is changed in place.
//! Proficiency bonus, favor maximum and spell slot maxima are derived from
//! level whenever they are asked for.

mod class;
mod equipment;
pub mod factory;
mod resources;
mod snapshot;

pub use class::{ClassCatalog, ClassProfile, RuleSystem};
pub use equipment::{
    AttackProfile, Creature, Equipment, EquipmentKind, Rune, ShadowSoldier, SoldierRank,
    WeaponProfile,
};
pub use factory::{CharacterFactory, CharacterOptions, ValidationIssue, ValidationReport};
pub use resources::{DamageAbsorption, HitPoints, ResourceFailure, ResourceLedger};
pub use snapshot::{CharacterTemplate, SnapshotError};

use crate::ability::{self, SPELL_LEVELS};
use crate::types::{Ability, AbilityScores, ArmorCategory, CasterKind, Defenses, Skill};
use serde::{Deserialize, Serialize};

/// Proficiency in a single skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillProficiency {
    pub skill: Skill,
    pub proficient: bool,
    #[serde(default)]
    pub expertise: bool,
}

/// Complete state of a character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    // === Identity ===
    pub name: String,
    pub level: u32,
    pub class_id: String,
    /// Subclass
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub background: Option<String>,

    // === Abilities ===
    pub abilities: AbilityScores,
    #[serde(default)]
    pub skills: Vec<SkillProficiency>,
    #[serde(default)]
    pub saving_throws: Vec<Ability>,

    // === Combat ===
    pub hit_points: HitPoints,
    /// Faces of the class hit die, used for level-up hit points
    pub hit_die: u32,
    pub armor_class: i32,
    pub speed: u32,
    #[serde(default)]
    pub defenses: Defenses,

    // === Casting ===
    #[serde(default)]
    pub caster: CasterKind,
    #[serde(default)]
    pub spellcasting_ability: Option<Ability>,
    pub resources: ResourceLedger,
    #[serde(default)]
    pub known_powers: Vec<String>,

    // === Possessions ===
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    #[serde(default)]
    pub allies: Vec<ShadowSoldier>,
    #[serde(default)]
    pub runes: Vec<Rune>,

    #[serde(default)]
    pub narrative: Option<String>,
}

impl Character {
    // === Derived values ===

    pub fn proficiency_bonus(&self) -> i32 {
        ability::proficiency_bonus(self.level)
    }

    pub fn favor_max(&self) -> u32 {
        ability::favor_pool_max(self.level)
    }

    pub fn modifier(&self, ability: Ability) -> i32 {
        self.abilities.modifier(ability)
    }

    /// Spell slot maxima for the current level and caster kind
    pub fn slot_maxima(&self) -> [u32; SPELL_LEVELS] {
        ability::spell_slot_maxima(self.caster, self.level)
    }

    pub fn skill(&self, skill: Skill) -> Option<&SkillProficiency> {
        self.skills.iter().find(|s| s.skill == skill)
    }

    pub fn is_proficient(&self, skill: Skill) -> bool {
        self.skill(skill).is_some_and(|s| s.proficient)
    }

    /// Expertise only counts on top of proficiency
    pub fn has_expertise(&self, skill: Skill) -> bool {
        self.skill(skill).is_some_and(|s| s.proficient && s.expertise)
    }

    pub fn is_save_proficient(&self, ability: Ability) -> bool {
        self.saving_throws.contains(&ability)
    }

    pub fn is_conscious(&self) -> bool {
        !self.hit_points.is_down()
    }

    /// The first equipped weapon, if any
    pub fn equipped_weapon(&self) -> Option<&WeaponProfile> {
        self.equipment
            .iter()
            .filter(|e| e.equipped)
            .find_map(Equipment::weapon_profile)
    }

    /// Flat damage bonus from inscribed runes
    pub fn rune_damage_bonus(&self) -> i32 {
        self.runes.iter().map(|r| r.damage_bonus).sum()
    }

    /// Armor class from agility, worn armor, shield and runes
    pub fn computed_armor_class(&self) -> i32 {
        let worn = self.equipment.iter().filter(|e| e.equipped);
        let mut category = ArmorCategory::None;
        let mut has_shield = false;
        for item in worn {
            match item.kind {
                EquipmentKind::Armor { category: c } => category = c,
                EquipmentKind::Shield => has_shield = true,
                _ => {}
            }
        }
        let runes: i32 = self.runes.iter().map(|r| r.armor_class_bonus).sum();
        ability::armor_class(self.modifier(Ability::Agility), category, has_shield) + runes
    }

    // === Snapshot transitions ===

    /// Copy with armor class recomputed from equipment and runes
    pub fn with_recomputed_armor_class(&self) -> Character {
        Character {
            armor_class: self.computed_armor_class(),
            ..self.clone()
        }
    }

    /// Add an item; equipping armor or a shield updates armor class
    pub fn with_item(&self, item: Equipment) -> Character {
        let mut next = self.clone();
        next.equipment.push(item);
        next.with_recomputed_armor_class()
    }

    /// Equip or unequip an item by id
    pub fn with_item_equipped(&self, item_id: &str, equipped: bool) -> Character {
        let mut next = self.clone();
        let is_armor = |kind: &EquipmentKind| matches!(kind, EquipmentKind::Armor { .. });
        let target_is_armor = next
            .equipment
            .iter()
            .find(|e| e.id == item_id)
            .is_some_and(|e| is_armor(&e.kind));
        for item in &mut next.equipment {
            if item.id == item_id {
                item.equipped = equipped;
            } else if equipped && target_is_armor && is_armor(&item.kind) {
                // One suit of armor at a time
                item.equipped = false;
            }
        }
        next.with_recomputed_armor_class()
    }

    pub fn with_rune(&self, rune: Rune) -> Character {
        let mut next = self.clone();
        next.runes.push(rune);
        next.with_recomputed_armor_class()
    }

    pub fn with_ally(&self, soldier: ShadowSoldier) -> Character {
        let mut next = self.clone();
        next.allies.push(soldier);
        next
    }

    pub fn without_ally(&self, soldier_id: &str) -> Character {
        let mut next = self.clone();
        next.allies.retain(|s| s.id != soldier_id);
        next
    }

    /// Learn a power by id; already known powers are left alone
    pub fn with_power(&self, power_id: impl Into<String>) -> Character {
        let power_id = power_id.into();
        let mut next = self.clone();
        if !next.known_powers.contains(&power_id) {
            next.known_powers.push(power_id);
        }
        next
    }

    pub fn with_monarch_unlock(&self, key: impl Into<String>) -> Character {
        let key = key.into();
        let mut next = self.clone();
        if !next.resources.has_unlock(&key) {
            next.resources.monarch_unlocks.push(key);
        }
        next
    }

    pub fn with_resources(&self, resources: ResourceLedger) -> Character {
        Character {
            resources,
            ..self.clone()
        }
    }

    pub fn with_hit_points(&self, hit_points: HitPoints) -> Character {
        Character {
            hit_points,
            ..self.clone()
        }
    }

    /// Spend system favor; the character is unchanged on failure
    pub fn spend_favor(&self, amount: u32) -> Result<Character, ResourceFailure> {
        Ok(self.with_resources(self.resources.spend_favor(amount)?))
    }

    /// Spend monarch power from the shared counter
    pub fn spend_monarch_power(&self, cost: u32) -> Result<Character, ResourceFailure> {
        Ok(self.with_resources(self.resources.spend_monarch_power(cost)?))
    }

    /// Apply damage already reduced by defenses
    pub fn damaged(&self, amount: i32) -> (Character, DamageAbsorption) {
        let (hit_points, absorption) = self.hit_points.damaged(amount);
        (self.with_hit_points(hit_points), absorption)
    }

    pub fn healed(&self, amount: i32) -> Character {
        self.with_hit_points(self.hit_points.healed(amount))
    }

    pub fn with_temporary_hp(&self, amount: i32) -> Character {
        self.with_hit_points(self.hit_points.with_temporary(amount))
    }

    /// Half the favor pool back (rounded up), temp HP gone, pact slots refreshed
    pub fn short_rested(&self) -> Character {
        let max = self.favor_max();
        let mut resources = self.resources.with_favor_restored(max.div_ceil(2), max);
        if self.caster == CasterKind::Pact {
            resources.spell_slots = self.slot_maxima();
        }
        Character {
            resources,
            hit_points: self.hit_points.without_temporary(),
            ..self.clone()
        }
    }

    /// Everything back to full
    pub fn long_rested(&self) -> Character {
        let mut resources = self.resources.clone();
        resources.favor = self.favor_max();
        resources.spell_slots = self.slot_maxima();
        Character {
            resources,
            hit_points: HitPoints::full(self.hit_points.max),
            ..self.clone()
        }
    }

    /// One level up: average hit point step, newly granted slots, full favor
    pub fn leveled_up(&self) -> Character {
        let old_slots = self.slot_maxima();
        let mut next = self.clone();
        next.level = self.level + 1;

        let step = ability::hit_points_per_level(self.hit_die, self.modifier(Ability::Vitality));
        let hit_points = self.hit_points.with_max(self.hit_points.max + step);
        next.hit_points = hit_points.healed(step);

        let new_slots = next.slot_maxima();
        for level in 1..SPELL_LEVELS {
            let gained = new_slots[level].saturating_sub(old_slots[level]);
            next.resources.spell_slots[level] =
                (self.resources.spell_slots[level] + gained).min(new_slots[level]);
        }
        next.resources.favor = next.favor_max();
        next
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::character;
    use super::*;
    use crate::dice::DiceExpr;
    use crate::types::{AttackKind, DamageType};

    fn fighter() -> Character {
        character("fighter", AbilityScores::uniform(12).with(Ability::Agility, 16))
    }

    #[test]
    fn test_derived_values_follow_level() {
        let mut c = fighter();
        assert_eq!(c.proficiency_bonus(), 2);
        assert_eq!(c.favor_max(), 3);
        c.level = 5;
        assert_eq!(c.proficiency_bonus(), 3);
        assert_eq!(c.favor_max(), 4);
    }

    #[test]
    fn test_armor_class_from_equipment() {
        let c = fighter();
        assert_eq!(c.armor_class, 13);

        let c = c
            .with_item(Equipment::armor("chain", "Chain Shirt", ArmorCategory::Medium).equipped())
            .with_item(Equipment::shield("shield", "Shield").equipped());
        // 10 + min(3, 2) + 2
        assert_eq!(c.armor_class, 14);

        let c = c.with_item(Equipment::armor("plate", "Plate", ArmorCategory::Heavy));
        let c = c.with_item_equipped("plate", true);
        assert_eq!(c.armor_class, 12);
        assert!(!c.equipment.iter().find(|e| e.id == "chain").unwrap().equipped);
    }

    #[test]
    fn test_runes_add_armor_and_damage() {
        let rune = Rune {
            id: "ward".to_string(),
            name: "Ward".to_string(),
            armor_class_bonus: 1,
            damage_bonus: 2,
            description: String::new(),
        };
        let c = fighter().with_rune(rune);
        assert_eq!(c.armor_class, 14);
        assert_eq!(c.rune_damage_bonus(), 2);
    }

    #[test]
    fn test_equipped_weapon() {
        let profile = WeaponProfile {
            damage: DiceExpr::parse("1d8").unwrap(),
            damage_type: DamageType::Slashing,
            kind: AttackKind::Melee,
            reach_feet: 5,
        };
        let c = fighter().with_item(Equipment::weapon("sword", "Sword", profile.clone()));
        assert!(c.equipped_weapon().is_none());
        let c = c.with_item_equipped("sword", true);
        assert_eq!(c.equipped_weapon(), Some(&profile));
    }

    #[test]
    fn test_spend_favor_leaves_original_untouched() {
        let c = fighter();
        let spent = c.spend_favor(2).unwrap();
        assert_eq!(c.resources.favor, 3);
        assert_eq!(spent.resources.favor, 1);

        let refused = spent.spend_favor(2);
        assert!(refused.is_err());
        assert_eq!(spent.resources.favor, 1);
    }

    #[test]
    fn test_short_rest_restores_half_rounded_up() {
        let c = fighter().spend_favor(3).unwrap().with_temporary_hp(4);
        let rested = c.short_rested();
        assert_eq!(rested.resources.favor, 2);
        assert_eq!(rested.hit_points.temporary, 0);
        assert_eq!(rested.short_rested().resources.favor, 3);
    }

    #[test]
    fn test_short_rest_refills_pact_slots_only() {
        let warlock = character("warlock", AbilityScores::uniform(12));
        assert_eq!(warlock.caster, CasterKind::Pact);
        let spent = warlock.with_resources(warlock.resources.spend_slot(1).unwrap());
        assert_eq!(spent.resources.slots_at(1), 0);
        assert_eq!(spent.short_rested().resources.slots_at(1), 1);

        let wizard = character("wizard", AbilityScores::uniform(12));
        let spent = wizard.with_resources(wizard.resources.spend_slot(1).unwrap());
        assert_eq!(spent.short_rested().resources.slots_at(1), 1);
        assert_eq!(spent.long_rested().resources.slots_at(1), 2);
    }

    #[test]
    fn test_long_rest_is_idempotent() {
        let (c, _) = fighter().spend_favor(1).unwrap().damaged(5);
        let once = c.long_rested();
        assert_eq!(once.hit_points.current, once.hit_points.max);
        assert_eq!(once.resources.favor, 3);
        assert_eq!(once.long_rested(), once);
    }

    #[test]
    fn test_level_up_grows_hit_points_and_refills_favor() {
        let c = fighter().spend_favor(3).unwrap();
        let before_max = c.hit_points.max;
        let next = c.leveled_up();
        assert_eq!(next.level, 2);
        // d10 fighter, +1 vitality: 5 + 1 + 1
        assert_eq!(next.hit_points.max, before_max + 7);
        assert_eq!(next.resources.favor, 3);
    }

    #[test]
    fn test_level_up_adds_new_slots_only() {
        let wizard = character("wizard", AbilityScores::uniform(12));
        let wizard = wizard.with_resources(wizard.resources.spend_slot(1).unwrap());
        assert_eq!(wizard.resources.slots_at(1), 1);
        let next = wizard.leveled_up();
        // Level 2 full caster has 3 first-level slots, one was spent
        assert_eq!(next.resources.slots_at(1), 2);
        let next = next.leveled_up();
        assert_eq!(next.resources.slots_at(2), 2);
    }

    #[test]
    fn test_allies_and_powers() {
        let soldier = ShadowSoldier {
            id: "igris".to_string(),
            name: "Igris".to_string(),
            rank: SoldierRank::Knight,
            creature: Creature::new("igris", "Igris", 18, 60),
        };
        let c = fighter().with_ally(soldier).with_power("fire_bolt").with_power("fire_bolt");
        assert_eq!(c.allies.len(), 1);
        assert_eq!(c.known_powers, vec!["fire_bolt".to_string()]);
        assert!(c.without_ally("igris").allies.is_empty());
    }
}
