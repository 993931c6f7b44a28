//! Casting legality and execution

use super::{EffectKind, SaveOverride, Spell};
use crate::character::{Character, ResourceFailure, ResourceLedger};
use crate::combat::{roll_damage, DamageRoll};
use crate::dice::DieRoller;
use crate::types::{Ability, DamageType};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Why a power cannot be cast. Checked in declaration order; the message is
/// shown to players as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CastFailure {
    #[error("requires character level {required} (currently {current})")]
    LevelTooLow { required: u32, current: u32 },
    #[error("the {class_id} class cannot cast this power")]
    ClassIneligible { class_id: String },
    #[error("no level {level} spell slots remaining")]
    NoSlotAvailable { level: usize },
    #[error("{0}")]
    InsufficientMonarchPower(ResourceFailure),
    #[error("{0}")]
    InsufficientFavor(ResourceFailure),
    #[error("requires the '{unlock}' monarch unlock")]
    MonarchUnlockMissing { unlock: String },
}

/// Numeric result of the power's effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectOutcome {
    /// Rolled damage, not yet applied to any target
    Damage {
        damage_type: DamageType,
        roll: DamageRoll,
        save: Option<SaveOverride>,
    },
    /// Healing applied to the caster
    Healing {
        roll: DamageRoll,
        hit_points_before: i32,
        hit_points_after: i32,
    },
}

/// Everything a cast consumed and produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastResult {
    pub spell_id: String,
    /// Slot level the power was cast at; 0 for at-will powers
    pub slot_level: usize,
    pub slot_consumed: bool,
    pub favor_spent: u32,
    pub monarch_spent: u32,
    pub ability: Ability,
    /// 8 + proficiency + ability modifier, when the effect allows a save
    pub save_dc: Option<i32>,
    pub concentration: bool,
    pub effect: Option<EffectOutcome>,
}

/// Slot a cast would consume: the requested upcast, never below the power's
/// own level. At-will powers never use a slot.
pub fn cast_slot_level(spell: &Spell, upcast: Option<u8>) -> usize {
    if spell.is_cantrip() {
        0
    } else {
        upcast.unwrap_or(spell.level).max(spell.level) as usize
    }
}

/// Check whether a power could be cast at its own level
pub fn can_cast(character: &Character, spell: &Spell) -> Result<(), CastFailure> {
    can_cast_at(character, spell, None)
}

/// Check whether a power could be cast with the given upcast level
pub fn can_cast_at(character: &Character, spell: &Spell, upcast: Option<u8>) -> Result<(), CastFailure> {
    check(character, spell, cast_slot_level(spell, upcast)).map(|_| ())
}

/// Run every legality check and return the ledger after paying for the cast
fn check(character: &Character, spell: &Spell, slot_level: usize) -> Result<ResourceLedger, CastFailure> {
    let required = spell.minimum_character_level();
    if character.level < required {
        return Err(CastFailure::LevelTooLow {
            required,
            current: character.level,
        });
    }
    if !spell.allows_class(&character.class_id) {
        return Err(CastFailure::ClassIneligible {
            class_id: character.class_id.clone(),
        });
    }

    let mut ledger = character
        .resources
        .spend_slot(slot_level)
        .map_err(|_| CastFailure::NoSlotAvailable { level: slot_level })?;
    if let Some(cost) = spell.monarch_cost() {
        ledger = ledger
            .spend_monarch_power(cost)
            .map_err(CastFailure::InsufficientMonarchPower)?;
    }
    ledger = ledger
        .spend_favor(spell.favor_cost())
        .map_err(CastFailure::InsufficientFavor)?;

    if let Some(unlock) = &spell.required_unlock {
        if !character.resources.has_unlock(unlock) {
            return Err(CastFailure::MonarchUnlockMissing { unlock: unlock.clone() });
        }
    }
    Ok(ledger)
}

/// Cast a power
///
/// Legality is checked again here. On success the returned character has
/// the slot, favor and monarch power removed and any healing applied; the
/// input snapshot is never touched.
pub fn cast(
    character: &Character,
    spell: &Spell,
    ability: Ability,
    upcast: Option<u8>,
    roller: &mut impl DieRoller,
) -> Result<(Character, CastResult), CastFailure> {
    let slot_level = cast_slot_level(spell, upcast);
    let resources = check(character, spell, slot_level)?;
    let mut next = character.with_resources(resources);

    let ability_modifier = character.modifier(ability);
    let extra_dice = (slot_level.saturating_sub(spell.level as usize) as u32) * spell.upcast.dice_per_level;

    let effect = match &spell.effect {
        Some(effect) => {
            let formula = effect.formula.with_extra_dice(extra_dice);
            let modifier = if effect.add_ability_modifier { ability_modifier } else { 0 };
            let roll = roll_damage(&formula, modifier, 0, false, roller);
            Some(match effect.kind {
                EffectKind::Damage(damage_type) => EffectOutcome::Damage {
                    damage_type,
                    roll,
                    save: effect.save,
                },
                EffectKind::Healing => {
                    let hit_points_before = next.hit_points.current;
                    next = next.healed(roll.total);
                    EffectOutcome::Healing {
                        roll,
                        hit_points_before,
                        hit_points_after: next.hit_points.current,
                    }
                }
            })
        }
        None => None,
    };

    let save_dc = spell
        .effect
        .as_ref()
        .and_then(|e| e.save)
        .map(|_| 8 + character.proficiency_bonus() + ability_modifier);

    let result = CastResult {
        spell_id: spell.id.clone(),
        slot_level,
        slot_consumed: slot_level > 0,
        favor_spent: spell.favor_cost(),
        monarch_spent: spell.monarch_cost().unwrap_or(0),
        ability,
        save_dc,
        concentration: spell.concentration,
        effect,
    };

    debug!(
        caster = %character.name,
        spell = %spell.id,
        slot_level,
        favor_spent = result.favor_spent,
        monarch_spent = result.monarch_spent,
        "power cast"
    );

    Ok((next, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_support::character;
    use crate::dice::{DiceExpr, ScriptedRoller};
    use crate::spell::test_support::bolt;
    use crate::spell::SpellEffect;
    use crate::types::AbilityScores;

    fn wizard(level: u32) -> Character {
        let mut c = character("wizard", AbilityScores::uniform(10).with(Ability::Intelligence, 16));
        c.level = level;
        c.long_rested()
    }

    fn with_slots(c: &Character, slots: &[(usize, u32)]) -> Character {
        let mut resources = c.resources.clone();
        resources.spell_slots = [0; crate::ability::SPELL_LEVELS];
        for (level, count) in slots {
            resources.spell_slots[*level] = *count;
        }
        c.with_resources(resources)
    }

    #[test]
    fn test_no_slot_at_spell_level_even_when_upcast_lower() {
        let c = with_slots(&wizard(3), &[(1, 1)]);
        let spell = bolt(2, "3d8");
        let mut roller = ScriptedRoller::default();

        let err = cast(&c, &spell, Ability::Intelligence, Some(1), &mut roller).unwrap_err();
        assert_eq!(err, CastFailure::NoSlotAvailable { level: 2 });
        assert_eq!(err.to_string(), "no level 2 spell slots remaining");
        assert_eq!(roller.drawn(), 0);
    }

    #[test]
    fn test_cast_spends_slot_and_rolls() {
        let c = with_slots(&wizard(3), &[(1, 2)]);
        let mut roller = ScriptedRoller::new([4]);
        let (next, result) = cast(&c, &bolt(1, "1d10+1"), Ability::Intelligence, None, &mut roller).unwrap();

        assert_eq!(next.resources.slots_at(1), 1);
        assert_eq!(c.resources.slots_at(1), 2);
        assert!(result.slot_consumed);
        match result.effect {
            Some(EffectOutcome::Damage { roll, .. }) => assert_eq!(roll.total, 5),
            other => panic!("expected damage, got {:?}", other),
        }
    }

    #[test]
    fn test_cantrip_is_free() {
        let c = with_slots(&wizard(1), &[]);
        let mut roller = ScriptedRoller::new([7]);
        let (next, result) = cast(&c, &bolt(0, "1d10"), Ability::Intelligence, Some(3), &mut roller).unwrap();
        assert_eq!(result.slot_level, 0);
        assert!(!result.slot_consumed);
        assert_eq!(next.resources, c.resources);
    }

    #[test]
    fn test_upcast_adds_dice() {
        let c = with_slots(&wizard(5), &[(1, 1), (3, 1)]);
        let mut roller = ScriptedRoller::new([1, 2, 3, 4, 1]);
        let (next, result) = cast(&c, &bolt(1, "3d4"), Ability::Intelligence, Some(3), &mut roller).unwrap();

        assert_eq!(result.slot_level, 3);
        assert_eq!(next.resources.slots_at(3), 0);
        assert_eq!(next.resources.slots_at(1), 1);
        match result.effect {
            Some(EffectOutcome::Damage { roll, .. }) => {
                assert_eq!(roll.dice.len(), 5);
                assert_eq!(roll.total, 11);
            }
            other => panic!("expected damage, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_order() {
        let mut spell = bolt(3, "8d6");
        spell.classes = vec!["cleric".to_string()];
        let c = with_slots(&wizard(1), &[]);

        assert!(matches!(can_cast(&c, &spell), Err(CastFailure::LevelTooLow { required: 5, .. })));
        let c = wizard(5);
        assert!(matches!(can_cast(&c, &spell), Err(CastFailure::ClassIneligible { .. })));
        spell.classes.clear();
        let c = with_slots(&c, &[]);
        assert_eq!(can_cast(&c, &spell), Err(CastFailure::NoSlotAvailable { level: 3 }));
    }

    #[test]
    fn test_monarch_cost_needs_gate() {
        let mut spell = bolt(0, "2d8");
        spell.components.monarch_cost = Some(2);
        let c = wizard(1);
        assert_eq!(
            can_cast(&c, &spell),
            Err(CastFailure::InsufficientMonarchPower(ResourceFailure::MonarchInactive))
        );

        let mut resources = c.resources.clone();
        resources.monarch_active = true;
        let open = c.with_resources(resources);
        assert!(can_cast(&open, &spell).is_ok());

        let drained = open.spend_favor(2).unwrap();
        assert!(matches!(
            can_cast(&drained, &spell),
            Err(CastFailure::InsufficientMonarchPower(ResourceFailure::InsufficientMonarchPower { .. }))
        ));
    }

    #[test]
    fn test_favor_and_monarch_share_counter() {
        let mut spell = bolt(0, "2d8");
        spell.components.monarch_cost = Some(2);
        spell.components.favor_cost = Some(2);
        let c = wizard(1);
        let mut resources = c.resources.clone();
        resources.monarch_active = true;
        let c = c.with_resources(resources);

        // 3 favor covers the monarch cost but leaves only 1 for the favor cost
        let err = can_cast(&c, &spell).unwrap_err();
        assert_eq!(
            err,
            CastFailure::InsufficientFavor(ResourceFailure::InsufficientFavor { needed: 2, available: 1 })
        );
        assert_eq!(err.to_string(), "not enough favor: need 2, have 1");

        spell.components.favor_cost = Some(1);
        let mut roller = ScriptedRoller::new([3, 3]);
        let (next, result) = cast(&c, &spell, Ability::Intelligence, None, &mut roller).unwrap();
        assert_eq!(next.resources.favor, 0);
        assert_eq!(result.favor_spent, 1);
        assert_eq!(result.monarch_spent, 2);
    }

    #[test]
    fn test_unlock_checked_last() {
        let mut spell = bolt(0, "1d6");
        spell.required_unlock = Some("arise".to_string());
        let c = wizard(1);
        assert_eq!(
            can_cast(&c, &spell),
            Err(CastFailure::MonarchUnlockMissing { unlock: "arise".to_string() })
        );
        assert!(can_cast(&c.with_monarch_unlock("arise"), &spell).is_ok());
    }

    #[test]
    fn test_failed_cast_leaves_character_unchanged() {
        let mut spell = bolt(1, "1d6");
        spell.components.favor_cost = Some(5);
        let c = wizard(1);
        let before = c.clone();
        assert!(cast(&c, &spell, Ability::Intelligence, None, &mut ScriptedRoller::default()).is_err());
        assert_eq!(c, before);
    }

    #[test]
    fn test_healing_clamps_to_max() {
        let mut spell = bolt(1, "2d8");
        spell.effect = Some(SpellEffect {
            kind: EffectKind::Healing,
            formula: DiceExpr::parse("2d8").unwrap(),
            add_ability_modifier: true,
            save: None,
        });
        let (hurt, _) = wizard(1).damaged(3);
        let mut roller = ScriptedRoller::new([8, 8]);
        let (next, result) = cast(&hurt, &spell, Ability::Intelligence, None, &mut roller).unwrap();

        assert_eq!(next.hit_points.current, next.hit_points.max);
        match result.effect {
            Some(EffectOutcome::Healing {
                roll,
                hit_points_before,
                hit_points_after,
            }) => {
                assert_eq!(roll.total, 19);
                assert_eq!(hit_points_after - hit_points_before, 3);
            }
            other => panic!("expected healing, got {:?}", other),
        }
    }

    #[test]
    fn test_save_dc() {
        let mut spell = bolt(1, "3d6");
        if let Some(effect) = spell.effect.as_mut() {
            effect.save = Some(SaveOverride {
                ability: Ability::Agility,
                half_on_success: true,
            });
        }
        let mut roller = ScriptedRoller::new([1, 1, 1]);
        let (_, result) = cast(&wizard(1), &spell, Ability::Intelligence, None, &mut roller).unwrap();
        // 8 + 2 + 3
        assert_eq!(result.save_dc, Some(13));
    }
}
