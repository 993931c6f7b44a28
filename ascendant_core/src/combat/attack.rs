//! Attack rolls - d20 + ability + proficiency against armor class

use crate::character::{AttackProfile, Character, Creature};
use crate::dice::{roll_d20, D20Roll, DieRoller, RollMode};
use crate::types::{Ability, AttackKind};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Natural result that always misses
const NATURAL_FAIL: u32 = 1;

/// Default natural result for a critical hit
pub const DEFAULT_CRITICAL_THRESHOLD: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackOutcome {
    CriticalHit,
    Hit,
    Miss,
    CriticalFail,
}

/// Parameters of a single attack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRequest {
    pub kind: AttackKind,
    /// Overrides the ability picked by `kind`
    #[serde(default)]
    pub ability: Option<Ability>,
    #[serde(default)]
    pub proficient: bool,
    /// Adds proficiency a second time when also proficient
    #[serde(default)]
    pub expertise: bool,
    #[serde(default)]
    pub advantage: bool,
    #[serde(default)]
    pub disadvantage: bool,
    pub target_ac: i32,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u32,
    /// Extra to-hit from gear or effects
    #[serde(default)]
    pub flat_bonus: i32,
}

fn default_critical_threshold() -> u32 {
    DEFAULT_CRITICAL_THRESHOLD
}

impl AttackRequest {
    pub fn new(kind: AttackKind, target_ac: i32) -> Self {
        AttackRequest {
            kind,
            ability: None,
            proficient: false,
            expertise: false,
            advantage: false,
            disadvantage: false,
            target_ac,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            flat_bonus: 0,
        }
    }

    pub fn melee(target_ac: i32) -> Self {
        Self::new(AttackKind::Melee, target_ac)
    }

    pub fn ranged(target_ac: i32) -> Self {
        Self::new(AttackKind::Ranged, target_ac)
    }

    pub fn spell(target_ac: i32) -> Self {
        Self::new(AttackKind::Spell, target_ac)
    }

    pub fn proficient(mut self) -> Self {
        self.proficient = true;
        self
    }

    pub fn with_expertise(mut self) -> Self {
        self.expertise = true;
        self
    }

    pub fn with_advantage(mut self) -> Self {
        self.advantage = true;
        self
    }

    pub fn with_disadvantage(mut self) -> Self {
        self.disadvantage = true;
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.ability = Some(ability);
        self
    }

    pub fn with_critical_threshold(mut self, threshold: u32) -> Self {
        self.critical_threshold = threshold;
        self
    }

    pub fn with_flat_bonus(mut self, bonus: i32) -> Self {
        self.flat_bonus = bonus;
        self
    }

    pub fn with_target_ac(mut self, target_ac: i32) -> Self {
        self.target_ac = target_ac;
        self
    }

    /// Ability whose modifier applies
    pub fn ability(&self) -> Ability {
        self.ability.unwrap_or_else(|| self.kind.default_ability())
    }

    pub fn mode(&self) -> RollMode {
        RollMode::from_flags(self.advantage, self.disadvantage)
    }
}

/// Outcome of an attack roll with its full breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackResult {
    pub d20: D20Roll,
    /// Ability used, `None` for creature stat blocks
    pub ability: Option<Ability>,
    pub ability_modifier: i32,
    pub proficiency_bonus: i32,
    pub expertise_bonus: i32,
    pub flat_bonus: i32,
    pub total: i32,
    pub target_ac: i32,
    pub outcome: AttackOutcome,
}

impl AttackResult {
    pub fn is_hit(&self) -> bool {
        matches!(self.outcome, AttackOutcome::Hit | AttackOutcome::CriticalHit)
    }

    pub fn is_critical(&self) -> bool {
        self.outcome == AttackOutcome::CriticalHit
    }

    pub fn natural(&self) -> u32 {
        self.d20.natural
    }
}

/// Decide the outcome from the kept die and the total
pub fn classify_attack(natural: u32, total: i32, target_ac: i32, critical_threshold: u32) -> AttackOutcome {
    if natural == NATURAL_FAIL {
        AttackOutcome::CriticalFail
    } else if natural >= critical_threshold {
        AttackOutcome::CriticalHit
    } else if total >= target_ac {
        AttackOutcome::Hit
    } else {
        AttackOutcome::Miss
    }
}

/// Roll an attack for a character
pub fn attack_roll(attacker: &Character, request: &AttackRequest, roller: &mut impl DieRoller) -> AttackResult {
    let ability = request.ability();
    let ability_modifier = attacker.modifier(ability);
    let proficiency_bonus = if request.proficient {
        attacker.proficiency_bonus()
    } else {
        0
    };
    let expertise_bonus = if request.proficient && request.expertise {
        attacker.proficiency_bonus()
    } else {
        0
    };

    let d20 = roll_d20(request.mode(), roller);
    let total = d20.natural as i32 + ability_modifier + proficiency_bonus + expertise_bonus + request.flat_bonus;
    let outcome = classify_attack(d20.natural, total, request.target_ac, request.critical_threshold);

    debug!(
        attacker = %attacker.name,
        natural = d20.natural,
        total,
        target_ac = request.target_ac,
        ?outcome,
        "attack roll"
    );

    AttackResult {
        d20,
        ability: Some(ability),
        ability_modifier,
        proficiency_bonus,
        expertise_bonus,
        flat_bonus: request.flat_bonus,
        total,
        target_ac: request.target_ac,
        outcome,
    }
}

/// Opportunity attack: a melee attack with forced disadvantage
pub fn opportunity_attack(attacker: &Character, request: &AttackRequest, roller: &mut impl DieRoller) -> AttackResult {
    let forced = AttackRequest {
        kind: AttackKind::Melee,
        advantage: false,
        disadvantage: true,
        ..request.clone()
    };
    attack_roll(attacker, &forced, roller)
}

/// Roll a creature's attack profile; `None` if it has no attack
pub fn creature_attack(
    creature: &Creature,
    target_ac: i32,
    mode: RollMode,
    critical_threshold: u32,
    roller: &mut impl DieRoller,
) -> Option<AttackResult> {
    let profile = creature.attack.as_ref()?;
    Some(profile_attack(&creature.name, profile, target_ac, mode, critical_threshold, roller))
}

/// Roll a stat-block attack profile against an armor class
pub fn profile_attack(
    attacker: &str,
    profile: &AttackProfile,
    target_ac: i32,
    mode: RollMode,
    critical_threshold: u32,
    roller: &mut impl DieRoller,
) -> AttackResult {
    let d20 = roll_d20(mode, roller);
    let total = d20.natural as i32 + profile.attack_bonus;
    let outcome = classify_attack(d20.natural, total, target_ac, critical_threshold);

    debug!(attacker, attack = %profile.name, total, target_ac, ?outcome, "stat block attack");

    AttackResult {
        d20,
        ability: None,
        ability_modifier: 0,
        proficiency_bonus: 0,
        expertise_bonus: 0,
        flat_bonus: profile.attack_bonus,
        total,
        target_ac,
        outcome,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::test_support::character;
    use crate::character::AttackProfile;
    use crate::dice::{DiceExpr, ScriptedRoller};
    use crate::types::{AbilityScores, DamageType};

    fn brawler() -> Character {
        // STR 16 (+3), AGI 12 (+1), INT 8 (-1)
        character(
            "fighter",
            AbilityScores::uniform(12)
                .with(Ability::Strength, 16)
                .with(Ability::Intelligence, 8),
        )
    }

    #[test]
    fn test_natural_twenty_always_hits() {
        let mut roller = ScriptedRoller::new([20]);
        let request = AttackRequest::melee(99).proficient();
        let result = attack_roll(&brawler(), &request, &mut roller);
        assert_eq!(result.total, 20 + 3 + 2);
        assert_eq!(result.outcome, AttackOutcome::CriticalHit);
        assert!(result.is_hit());
    }

    #[test]
    fn test_natural_one_always_fails() {
        let mut roller = ScriptedRoller::new([1]);
        let request = AttackRequest::melee(2).proficient().with_flat_bonus(10);
        let result = attack_roll(&brawler(), &request, &mut roller);
        assert!(result.total >= 2);
        assert_eq!(result.outcome, AttackOutcome::CriticalFail);
        assert!(!result.is_hit());
    }

    #[test]
    fn test_hit_on_equal_armor_class() {
        let mut roller = ScriptedRoller::new([10]);
        // 10 + 3 + 2 = 15
        let result = attack_roll(&brawler(), &AttackRequest::melee(15).proficient(), &mut roller);
        assert_eq!(result.outcome, AttackOutcome::Hit);

        let mut roller = ScriptedRoller::new([10]);
        let result = attack_roll(&brawler(), &AttackRequest::melee(16).proficient(), &mut roller);
        assert_eq!(result.outcome, AttackOutcome::Miss);
    }

    #[test]
    fn test_ability_by_attack_kind() {
        let c = brawler();
        let mut roller = ScriptedRoller::new([10, 10, 10, 10]);
        assert_eq!(attack_roll(&c, &AttackRequest::melee(10), &mut roller).ability_modifier, 3);
        assert_eq!(attack_roll(&c, &AttackRequest::ranged(10), &mut roller).ability_modifier, 1);
        assert_eq!(attack_roll(&c, &AttackRequest::spell(10), &mut roller).ability_modifier, -1);
        let overridden = AttackRequest::melee(10).with_ability(Ability::Agility);
        assert_eq!(attack_roll(&c, &overridden, &mut roller).ability_modifier, 1);
    }

    #[test]
    fn test_expertise_needs_proficiency() {
        let c = brawler();
        let mut roller = ScriptedRoller::new([10, 10]);
        let expert = attack_roll(&c, &AttackRequest::melee(10).proficient().with_expertise(), &mut roller);
        assert_eq!(expert.total, 10 + 3 + 2 + 2);
        let not_proficient = attack_roll(&c, &AttackRequest::melee(10).with_expertise(), &mut roller);
        assert_eq!(not_proficient.total, 13);
        assert_eq!(not_proficient.expertise_bonus, 0);
    }

    #[test]
    fn test_advantage_and_disadvantage() {
        let c = brawler();
        let mut roller = ScriptedRoller::new([3, 18]);
        let adv = attack_roll(&c, &AttackRequest::melee(10).with_advantage(), &mut roller);
        assert_eq!(adv.natural(), 18);

        let mut roller = ScriptedRoller::new([3, 18]);
        let dis = attack_roll(&c, &AttackRequest::melee(10).with_disadvantage(), &mut roller);
        assert_eq!(dis.natural(), 3);
    }

    #[test]
    fn test_advantage_and_disadvantage_cancel() {
        let c = brawler();
        let mut roller = ScriptedRoller::new([3, 18]);
        let both = AttackRequest::melee(10).with_advantage().with_disadvantage();
        let result = attack_roll(&c, &both, &mut roller);
        assert_eq!(result.d20.rolls, vec![3]);
        assert_eq!(result.natural(), 3);
        assert_eq!(roller.remaining(), 1);
    }

    #[test]
    fn test_lowered_critical_threshold() {
        let mut roller = ScriptedRoller::new([19]);
        let request = AttackRequest::melee(50).with_critical_threshold(19);
        assert!(attack_roll(&brawler(), &request, &mut roller).is_critical());
    }

    #[test]
    fn test_opportunity_attack_forces_disadvantage() {
        let mut roller = ScriptedRoller::new([17, 4]);
        let request = AttackRequest::ranged(10).with_advantage();
        let result = opportunity_attack(&brawler(), &request, &mut roller);
        assert_eq!(result.d20.mode, RollMode::Disadvantage);
        assert_eq!(result.natural(), 4);
        // Always a melee attack
        assert_eq!(result.ability, Some(Ability::Strength));
    }

    #[test]
    fn test_creature_attack() {
        let wolf = Creature::new("wolf", "Wolf", 13, 11).with_attack(AttackProfile {
            name: "Bite".to_string(),
            attack_bonus: 4,
            damage: DiceExpr::parse("2d4+2").unwrap(),
            damage_type: DamageType::Piercing,
            damage_bonus: 0,
            reach_feet: 5,
        });
        let mut roller = ScriptedRoller::new([11]);
        let result = creature_attack(&wolf, 15, RollMode::Normal, 20, &mut roller).unwrap();
        assert_eq!(result.total, 15);
        assert!(result.is_hit());

        let mouse = Creature::new("mouse", "Mouse", 10, 1);
        assert!(creature_attack(&mouse, 10, RollMode::Normal, 20, &mut roller).is_none());
    }
}
