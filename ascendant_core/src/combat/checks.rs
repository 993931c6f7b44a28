//! Saving throws, ability and skill checks, initiative

use crate::character::Character;
use crate::dice::{roll_d20, D20Roll, DieRoller, RollMode};
use crate::types::{Ability, Skill};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A d20 test against a difficulty class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub d20: D20Roll,
    pub ability: Ability,
    pub ability_modifier: i32,
    pub proficiency_bonus: i32,
    pub total: i32,
    pub dc: i32,
    pub success: bool,
}

/// d20 + modifier + bonus, success iff total >= dc
pub fn roll_check(
    ability: Ability,
    ability_modifier: i32,
    proficiency_bonus: i32,
    dc: i32,
    mode: RollMode,
    roller: &mut impl DieRoller,
) -> CheckResult {
    let d20 = roll_d20(mode, roller);
    let total = d20.natural as i32 + ability_modifier + proficiency_bonus;
    CheckResult {
        d20,
        ability,
        ability_modifier,
        proficiency_bonus,
        total,
        dc,
        success: total >= dc,
    }
}

/// Saving throw; proficiency applies if the character is proficient in it
pub fn saving_throw(
    character: &Character,
    ability: Ability,
    dc: i32,
    mode: RollMode,
    roller: &mut impl DieRoller,
) -> CheckResult {
    let proficiency = if character.is_save_proficient(ability) {
        character.proficiency_bonus()
    } else {
        0
    };
    let result = roll_check(ability, character.modifier(ability), proficiency, dc, mode, roller);
    debug!(name = %character.name, ?ability, total = result.total, dc, success = result.success, "saving throw");
    result
}

/// Raw ability check with no proficiency
pub fn ability_check(
    character: &Character,
    ability: Ability,
    dc: i32,
    mode: RollMode,
    roller: &mut impl DieRoller,
) -> CheckResult {
    roll_check(ability, character.modifier(ability), 0, dc, mode, roller)
}

/// Skill check; expertise doubles the proficiency bonus
pub fn skill_check(
    character: &Character,
    skill: Skill,
    dc: i32,
    mode: RollMode,
    roller: &mut impl DieRoller,
) -> CheckResult {
    let ability = skill.ability();
    let proficiency = match (character.is_proficient(skill), character.has_expertise(skill)) {
        (true, true) => character.proficiency_bonus() * 2,
        (true, false) => character.proficiency_bonus(),
        _ => 0,
    };
    let result = roll_check(ability, character.modifier(ability), proficiency, dc, mode, roller);
    debug!(name = %character.name, ?skill, total = result.total, dc, success = result.success, "skill check");
    result
}

/// Initiative draw
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitiativeRoll {
    pub d20: D20Roll,
    pub modifier: i32,
    pub total: i32,
}

/// d20 (best of two with advantage) + agility modifier
pub fn roll_initiative(agility_modifier: i32, advantage: bool, roller: &mut impl DieRoller) -> InitiativeRoll {
    let mode = if advantage { RollMode::Advantage } else { RollMode::Normal };
    let d20 = roll_d20(mode, roller);
    InitiativeRoll {
        total: d20.natural as i32 + agility_modifier,
        d20,
        modifier: agility_modifier,
    }
}

pub fn character_initiative(character: &Character, advantage: bool, roller: &mut impl DieRoller) -> InitiativeRoll {
    roll_initiative(character.modifier(Ability::Agility), advantage, roller)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_support::character;
    use crate::dice::ScriptedRoller;
    use crate::types::AbilityScores;

    #[test]
    fn test_save_below_dc_fails() {
        // PER 18 (+4), fighters have no perception save proficiency
        let c = character("fighter", AbilityScores::uniform(10).with(Ability::Perception, 18));
        let mut roller = ScriptedRoller::new([10]);
        let result = saving_throw(&c, Ability::Perception, 15, RollMode::Normal, &mut roller);
        assert_eq!(result.total, 14);
        assert!(!result.success);
    }

    #[test]
    fn test_save_meets_dc() {
        let c = character("fighter", AbilityScores::uniform(10).with(Ability::Perception, 18));
        let mut roller = ScriptedRoller::new([11]);
        assert!(saving_throw(&c, Ability::Perception, 15, RollMode::Normal, &mut roller).success);
    }

    #[test]
    fn test_proficient_save_adds_bonus() {
        // Fighters are proficient in strength saves
        let c = character("fighter", AbilityScores::uniform(14));
        let mut roller = ScriptedRoller::new([10]);
        let result = saving_throw(&c, Ability::Strength, 20, RollMode::Normal, &mut roller);
        assert_eq!(result.proficiency_bonus, 2);
        assert_eq!(result.total, 14);
    }

    #[test]
    fn test_save_with_advantage() {
        let c = character("fighter", AbilityScores::uniform(10));
        let mut roller = ScriptedRoller::new([2, 15]);
        let result = saving_throw(&c, Ability::Presence, 15, RollMode::Advantage, &mut roller);
        assert!(result.success);
        assert_eq!(result.d20.rolls.len(), 2);
    }

    #[test]
    fn test_skill_check_expertise() {
        use crate::character::CharacterOptions;
        use crate::character::CharacterFactory;
        use crate::config::default_classes;

        let catalog = default_classes();
        let c = CharacterFactory::new(&catalog).build(
            &CharacterOptions::new("Jinho", "rogue")
                .with_abilities(AbilityScores::uniform(14))
                .with_skills([Skill::Stealth, Skill::Awareness])
                .with_expertise([Skill::Stealth]),
        );
        let mut roller = ScriptedRoller::new([10, 10, 10]);
        assert_eq!(skill_check(&c, Skill::Stealth, 10, RollMode::Normal, &mut roller).total, 10 + 2 + 4);
        assert_eq!(skill_check(&c, Skill::Awareness, 10, RollMode::Normal, &mut roller).total, 10 + 2 + 2);
        assert_eq!(skill_check(&c, Skill::Arcana, 10, RollMode::Normal, &mut roller).total, 12);
    }

    #[test]
    fn test_initiative() {
        let mut roller = ScriptedRoller::new([7, 16]);
        let plain = roll_initiative(3, false, &mut roller);
        assert_eq!(plain.total, 10);

        let mut roller = ScriptedRoller::new([7, 16]);
        let advantaged = roll_initiative(3, true, &mut roller);
        assert_eq!(advantaged.total, 19);
    }
}
