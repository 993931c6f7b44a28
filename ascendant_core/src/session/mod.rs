//! Session controller - the stateful owner of one character
//!
//! The controller holds the current `Character` snapshot and, while a fight
//! is running, the encounter and the player's turn state. Numeric work is
//! delegated to the stateless `combat` and `spell` resolvers; every result
//! that changes the character is folded back in as a new snapshot.
//!
//! Distances are tracked per participant, measured from the player.

mod state;

pub use state::{
    ActionFailure, CombatState, FavorUse, Phase, TurnResource, ACTIONS_PER_TURN, BONUS_ACTIONS_PER_TURN,
    REACTIONS_PER_ROUND,
};

use crate::character::{AttackProfile, Character, DamageAbsorption, HitPoints};
use crate::combat::{
    attack_roll, character_initiative, mitigate, movement_allowance, opportunity_attack, profile_attack,
    provokes_opportunity_attack, roll_check, roll_damage, roll_initiative, AttackRequest, AttackResult,
    CheckResult, CombatEncounter, DamageRoll, Lighting, MitigatedDamage, Participant, Side, Terrain,
};
use crate::config::{default_powers, GameConstants};
use crate::dice::{DieRoller, RollMode};
use crate::spell::{cast, CastResult, CastingTime, EffectOutcome, PowerCatalog};
use crate::types::{Ability, AttackKind, DamageType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Damage taken by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageReport {
    pub mitigated: MitigatedDamage,
    pub absorption: DamageAbsorption,
    pub hit_points: HitPoints,
}

/// A weapon attack made by the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackReport {
    pub target_id: String,
    pub attack: AttackResult,
    pub damage: Option<DamageRoll>,
    pub mitigated: Option<MitigatedDamage>,
    pub target_hit_points: i32,
    pub target_down: bool,
}

/// A power cast by the player, with its effect on the target if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpellReport {
    pub cast: CastResult,
    pub target_id: Option<String>,
    /// Spell attack roll, for damage powers without a saving throw
    pub attack: Option<AttackResult>,
    /// Target's saving throw, for damage powers that allow one
    pub save: Option<CheckResult>,
    pub mitigated: Option<MitigatedDamage>,
    pub target_hit_points: Option<i32>,
}

/// One non-player turn, or an opportunity attack against the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyAction {
    pub participant_id: String,
    pub moved_feet: u32,
    pub attack: Option<AttackResult>,
    pub damage: Option<DamageReport>,
    pub opportunity: bool,
}

/// Result of the player moving relative to a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveReport {
    pub target_id: String,
    pub from_feet: u32,
    pub to_feet: u32,
    pub movement_remaining: u32,
    pub opportunity_attack: Option<EnemyAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavorReceipt {
    pub favor_use: FavorUse,
    pub remaining: u32,
}

#[derive(Debug, Clone)]
struct ActiveCombat {
    encounter: CombatEncounter,
    state: CombatState,
}

/// Owns one character across rests, level ups and fights
#[derive(Debug, Clone)]
pub struct SessionController {
    character: Character,
    constants: GameConstants,
    powers: PowerCatalog,
    combat: Option<ActiveCombat>,
}

impl SessionController {
    pub fn new(character: Character) -> Self {
        SessionController {
            character,
            constants: GameConstants::default(),
            powers: default_powers(),
            combat: None,
        }
    }

    pub fn with_constants(mut self, constants: GameConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_powers(mut self, powers: PowerCatalog) -> Self {
        self.powers = powers;
        self
    }

    // === Accessors ===

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn into_character(self) -> Character {
        self.character
    }

    pub fn constants(&self) -> &GameConstants {
        &self.constants
    }

    pub fn powers(&self) -> &PowerCatalog {
        &self.powers
    }

    pub fn phase(&self) -> Phase {
        if self.combat.is_some() {
            Phase::InCombat
        } else {
            Phase::Idle
        }
    }

    pub fn combat_state(&self) -> Option<&CombatState> {
        self.combat.as_ref().map(|c| &c.state)
    }

    pub fn encounter(&self) -> Option<&CombatEncounter> {
        self.combat.as_ref().map(|c| &c.encounter)
    }

    /// Replace the character with a loaded snapshot; refused mid-fight
    pub fn load_character(&mut self, character: Character) -> Result<(), ActionFailure> {
        if self.combat.is_some() {
            return Err(ActionFailure::AlreadyInCombat);
        }
        self.character = character;
        Ok(())
    }

    // === Combat lifecycle ===

    /// Roll initiative for everyone, order the encounter and play out any
    /// turns that come before the player's first turn
    pub fn start_combat(
        &mut self,
        mut encounter: CombatEncounter,
        roller: &mut impl DieRoller,
    ) -> Result<Vec<EnemyAction>, ActionFailure> {
        if self.combat.is_some() {
            return Err(ActionFailure::AlreadyInCombat);
        }
        if encounter.player().is_none() {
            encounter.participants.push(Participant::player(&self.character));
        }
        encounter.assign_unique_ids();

        let mut player_initiative = 0;
        for participant in &mut encounter.participants {
            let roll = if participant.side == Side::Player {
                character_initiative(&self.character, false, roller)
            } else {
                roll_initiative(participant.initiative_modifier, false, roller)
            };
            participant.initiative = Some(roll.total);
            if participant.side == Side::Player {
                player_initiative = roll.total;
            }
        }
        encounter.order_by_initiative();

        info!(
            name = %self.character.name,
            participants = encounter.participants.len(),
            initiative = player_initiative,
            "combat started"
        );

        self.combat = Some(ActiveCombat {
            encounter,
            state: CombatState::new(player_initiative),
        });
        self.sync_player();
        Ok(self.run_until_player_turn(roller))
    }

    /// Leave combat, returning the final state of the encounter
    pub fn end_combat(&mut self) -> Result<CombatEncounter, ActionFailure> {
        let combat = self.combat.take().ok_or(ActionFailure::NotInCombat)?;
        info!(
            name = %self.character.name,
            rounds = combat.encounter.round,
            enemies_remaining = combat.encounter.enemies_remaining(),
            "combat ended"
        );
        Ok(combat.encounter)
    }

    /// End the player's turn and play out everyone else until it comes round
    /// again (or the player drops, or no enemy is left)
    pub fn next_turn(&mut self, roller: &mut impl DieRoller) -> Result<Vec<EnemyAction>, ActionFailure> {
        let combat = self.combat.as_mut().ok_or(ActionFailure::NotInCombat)?;
        combat.state.end_turn();
        if combat.encounter.advance() {
            debug!(round = combat.encounter.round, "new round");
        }
        Ok(self.run_until_player_turn(roller))
    }

    // === Action economy ===

    /// Spend an action, bonus action or reaction without doing anything else
    pub fn use_action(&mut self, resource: TurnResource) -> Result<(), ActionFailure> {
        self.player_guard(resource)?;
        self.state_mut()?.spend(resource)
    }

    pub fn use_reaction(&mut self) -> Result<(), ActionFailure> {
        self.use_action(TurnResource::Reaction)
    }

    /// Double this turn's movement
    pub fn dash(&mut self) -> Result<u32, ActionFailure> {
        self.player_guard(TurnResource::Action)?;
        let speed = self.character.speed;
        let difficult = self.difficult_terrain();
        let extra = movement_allowance(speed, true, difficult) - movement_allowance(speed, false, difficult);
        let state = self.state_mut()?;
        state.spend(TurnResource::Action)?;
        state.dashed = true;
        state.movement_remaining += extra;
        Ok(state.movement_remaining)
    }

    /// Move away this turn without provoking opportunity attacks
    pub fn disengage(&mut self) -> Result<(), ActionFailure> {
        self.player_guard(TurnResource::Action)?;
        let state = self.state_mut()?;
        state.spend(TurnResource::Action)?;
        state.disengaged = true;
        Ok(())
    }

    // === Player actions ===

    /// Attack a participant with the equipped weapon
    pub fn attack(&mut self, target_id: &str, roller: &mut impl DieRoller) -> Result<AttackReport, ActionFailure> {
        self.player_guard(TurnResource::Action)?;
        let report = self.weapon_strike(target_id, false, roller)?;
        self.state_mut()?.spend(TurnResource::Action)?;
        Ok(report)
    }

    /// Spend the reaction on a melee attack with forced disadvantage
    pub fn opportunity_attack(
        &mut self,
        target_id: &str,
        roller: &mut impl DieRoller,
    ) -> Result<AttackReport, ActionFailure> {
        self.player_guard(TurnResource::Reaction)?;
        let report = self.weapon_strike(target_id, true, roller)?;
        self.state_mut()?.spend(TurnResource::Reaction)?;
        Ok(report)
    }

    /// Whether moving to `new_distance` from a participant would draw an
    /// opportunity attack from it
    pub fn check_opportunity_attack(&self, participant_id: &str, new_distance: u32) -> Result<bool, ActionFailure> {
        let combat = self.combat.as_ref().ok_or(ActionFailure::NotInCombat)?;
        let participant = combat
            .encounter
            .participant(participant_id)
            .ok_or_else(|| ActionFailure::UnknownTarget(participant_id.to_string()))?;
        let reach = participant.reach_feet(self.constants.combat.reach_feet);
        Ok(participant.is_hostile()
            && participant.is_active()
            && participant.attack.is_some()
            && provokes_opportunity_attack(participant.distance_feet, new_distance, reach, combat.state.disengaged))
    }

    /// Move toward (negative) or away from (positive) a participant
    pub fn move_distance(
        &mut self,
        target_id: &str,
        delta_feet: i32,
        roller: &mut impl DieRoller,
    ) -> Result<MoveReport, ActionFailure> {
        self.turn_guard()?;
        let combat = self.combat.as_ref().ok_or(ActionFailure::NotInCombat)?;
        let from_feet = combat
            .encounter
            .participant(target_id)
            .filter(|p| p.side != Side::Player)
            .map(|p| p.distance_feet)
            .ok_or_else(|| ActionFailure::UnknownTarget(target_id.to_string()))?;
        let to_feet = (from_feet as i64 + delta_feet as i64).max(0) as u32;
        let needed = from_feet.abs_diff(to_feet);
        let remaining = combat.state.movement_remaining;
        if needed > remaining {
            return Err(ActionFailure::InsufficientMovement { needed, remaining });
        }
        let provokes = self.check_opportunity_attack(target_id, to_feet)?;

        let combat = self.combat.as_mut().ok_or(ActionFailure::NotInCombat)?;
        if let Some(participant) = combat.encounter.participant_mut(target_id) {
            participant.distance_feet = to_feet;
        }
        combat.state.movement_remaining -= needed;
        let movement_remaining = combat.state.movement_remaining;

        let opportunity_attack = if provokes {
            self.enemy_opportunity_attack(target_id, roller)
        } else {
            None
        };
        debug!(target = target_id, from_feet, to_feet, provoked = provokes, "player moved");

        Ok(MoveReport {
            target_id: target_id.to_string(),
            from_feet,
            to_feet,
            movement_remaining,
            opportunity_attack,
        })
    }

    /// Cast a known power, optionally at a participant
    ///
    /// In combat the casting time decides which slot of the action economy
    /// is used. Damage powers resolve against the target with its saving
    /// throw if the power allows one, or a spell attack roll otherwise.
    pub fn cast_spell(
        &mut self,
        spell_id: &str,
        target_id: Option<&str>,
        upcast: Option<u8>,
        roller: &mut impl DieRoller,
    ) -> Result<SpellReport, ActionFailure> {
        let spell = self
            .powers
            .get(spell_id)
            .cloned()
            .ok_or_else(|| ActionFailure::UnknownPower(spell_id.to_string()))?;
        if !self.character.known_powers.contains(&spell.id) {
            return Err(ActionFailure::PowerNotKnown(spell.name));
        }

        let resource = if self.combat.is_some() {
            let resource = match spell.casting_time {
                CastingTime::Action => TurnResource::Action,
                CastingTime::BonusAction => TurnResource::BonusAction,
                CastingTime::Reaction => TurnResource::Reaction,
                CastingTime::Minute | CastingTime::Hour => {
                    return Err(ActionFailure::CastingTimeTooLong(spell.name));
                }
            };
            self.player_guard(resource)?;
            Some(resource)
        } else {
            if !self.character.is_conscious() {
                return Err(ActionFailure::Unconscious);
            }
            None
        };

        let target = match (target_id, self.combat.is_some()) {
            (Some(id), true) => {
                self.target(id)?;
                Some(id.to_string())
            }
            _ => None,
        };

        let ability = self.character.spellcasting_ability.unwrap_or(Ability::Intelligence);
        let (next, result) = cast(&self.character, &spell, ability, upcast, roller)?;
        self.set_character(next);

        let mut report = SpellReport {
            cast: result,
            target_id: target.clone(),
            attack: None,
            save: None,
            mitigated: None,
            target_hit_points: None,
        };

        if let (Some(target_id), Some(EffectOutcome::Damage { damage_type, roll, save })) =
            (target.as_deref(), report.cast.effect.clone())
        {
            let (armor_class, save_modifier) = {
                let participant = self.target(target_id)?;
                let save_modifier = save.map_or(0, |s| participant.abilities.modifier(s.ability));
                (participant.armor_class + self.cover_bonus(), save_modifier)
            };
            let amount = match save {
                Some(save) => {
                    let dc = report
                        .cast
                        .save_dc
                        .unwrap_or(8 + self.character.proficiency_bonus() + self.character.modifier(ability));
                    let check = roll_check(save.ability, save_modifier, 0, dc, RollMode::Normal, roller);
                    let amount = if !check.success {
                        roll.total
                    } else if save.half_on_success {
                        roll.total / 2
                    } else {
                        0
                    };
                    report.save = Some(check);
                    amount
                }
                None => {
                    let mut request = AttackRequest::spell(armor_class)
                        .with_ability(ability)
                        .proficient()
                        .with_critical_threshold(self.constants.combat.critical_threshold);
                    if self.in_darkness() {
                        request = request.with_disadvantage();
                    }
                    let attack = attack_roll(&self.character, &request, roller);
                    let amount = if attack.is_hit() { roll.total } else { 0 };
                    report.attack = Some(attack);
                    amount
                }
            };
            let (mitigated, hit_points) = self.damage_participant(target_id, amount, damage_type)?;
            report.mitigated = Some(mitigated);
            report.target_hit_points = Some(hit_points.current);
        }

        if let Some(combat) = self.combat.as_mut() {
            if let Some(resource) = resource {
                combat.state.spend(resource)?;
            }
            if spell.concentration {
                combat.state.concentration = Some(spell.id.clone());
            }
            if report.cast.favor_spent > 0 {
                combat.state.favor_used_this_turn = true;
            }
            if report.cast.monarch_spent > 0 {
                combat.state.monarch_used_this_turn = true;
            }
        }
        Ok(report)
    }

    // === Resources ===

    /// Spend one favor on a narrative effect
    pub fn apply_system_favor(&mut self, favor_use: FavorUse) -> Result<FavorReceipt, ActionFailure> {
        let next = self.character.spend_favor(1)?;
        self.set_character(next);
        if let Some(combat) = self.combat.as_mut() {
            combat.state.favor_used_this_turn = true;
        }
        let remaining = self.character.resources.favor;
        debug!(name = %self.character.name, ?favor_use, remaining, "favor spent");
        Ok(FavorReceipt { favor_use, remaining })
    }

    /// Spend monarch power from the shared counter; returns what is left
    pub fn apply_monarch_power(&mut self, cost: u32) -> Result<u32, ActionFailure> {
        let next = self.character.spend_monarch_power(cost)?;
        self.set_character(next);
        if let Some(combat) = self.combat.as_mut() {
            combat.state.monarch_used_this_turn = true;
        }
        let remaining = self.character.resources.favor;
        debug!(name = %self.character.name, cost, remaining, "monarch power spent");
        Ok(remaining)
    }

    /// Learn a power from the catalog
    pub fn learn_power(&mut self, power_id: &str) -> Result<(), ActionFailure> {
        if !self.powers.contains(power_id) {
            return Err(ActionFailure::UnknownPower(power_id.to_string()));
        }
        let next = self.character.with_power(power_id);
        self.set_character(next);
        Ok(())
    }

    // === Hit points ===

    /// Damage after the character's own resistances and immunities
    pub fn take_damage(&mut self, amount: i32, damage_type: DamageType) -> DamageReport {
        let mitigated = mitigate(amount, damage_type, &self.character.defenses);
        let (next, absorption) = self.character.damaged(mitigated.final_amount);
        self.set_character(next);
        if !self.character.is_conscious() {
            if let Some(combat) = self.combat.as_mut() {
                combat.state.concentration = None;
            }
        }
        debug!(name = %self.character.name, damage = mitigated.final_amount, current = self.character.hit_points.current, "damage taken");
        DamageReport {
            mitigated,
            absorption,
            hit_points: self.character.hit_points,
        }
    }

    pub fn heal(&mut self, amount: i32) -> HitPoints {
        let next = self.character.healed(amount);
        self.set_character(next);
        self.character.hit_points
    }

    /// Temporary hit points; only the temporary pool changes
    pub fn grant_temporary_hp(&mut self, amount: i32) -> HitPoints {
        let next = self.character.with_temporary_hp(amount);
        self.set_character(next);
        self.character.hit_points
    }

    // === Rests and progression ===

    pub fn short_rest(&mut self) -> Result<(), ActionFailure> {
        if self.combat.is_some() {
            return Err(ActionFailure::RestInCombat);
        }
        self.character = self.character.short_rested();
        info!(name = %self.character.name, favor = self.character.resources.favor, "short rest");
        Ok(())
    }

    pub fn long_rest(&mut self) -> Result<(), ActionFailure> {
        if self.combat.is_some() {
            return Err(ActionFailure::RestInCombat);
        }
        self.character = self.character.long_rested();
        info!(name = %self.character.name, "long rest");
        Ok(())
    }

    /// Gain a level; returns the new level
    pub fn level_up(&mut self) -> Result<u32, ActionFailure> {
        let max_level = self.constants.progression.max_level;
        if self.character.level >= max_level {
            return Err(ActionFailure::MaxLevel(max_level));
        }
        let next = self.character.leveled_up();
        self.set_character(next);
        info!(
            name = %self.character.name,
            level = self.character.level,
            max_hit_points = self.character.hit_points.max,
            "level up"
        );
        Ok(self.character.level)
    }

    // === Internals ===

    fn set_character(&mut self, character: Character) {
        self.character = character;
        self.sync_player();
    }

    /// Mirror the character's hit points and armor class onto its participant
    fn sync_player(&mut self) {
        if let Some(player) = self.combat.as_mut().and_then(|c| c.encounter.player_mut()) {
            player.hit_points = self.character.hit_points;
            player.armor_class = self.character.armor_class;
        }
    }

    fn state_mut(&mut self) -> Result<&mut CombatState, ActionFailure> {
        self.combat
            .as_mut()
            .map(|c| &mut c.state)
            .ok_or(ActionFailure::NotInCombat)
    }

    /// In combat, conscious and on the player's turn
    fn turn_guard(&self) -> Result<&CombatState, ActionFailure> {
        let combat = self.combat.as_ref().ok_or(ActionFailure::NotInCombat)?;
        if !self.character.is_conscious() {
            return Err(ActionFailure::Unconscious);
        }
        if !combat.state.is_turn {
            return Err(ActionFailure::NotYourTurn);
        }
        Ok(&combat.state)
    }

    /// Check the player may use a slot of the action economy right now.
    /// Reactions are allowed outside the player's turn.
    fn player_guard(&self, resource: TurnResource) -> Result<(), ActionFailure> {
        let combat = self.combat.as_ref().ok_or(ActionFailure::NotInCombat)?;
        if resource == TurnResource::Reaction {
            if !self.character.is_conscious() {
                return Err(ActionFailure::Unconscious);
            }
            return combat.state.check(resource);
        }
        self.turn_guard()?.check(resource)
    }

    fn difficult_terrain(&self) -> bool {
        self.combat
            .as_ref()
            .is_some_and(|c| c.encounter.environment.terrain == Terrain::Difficult)
    }

    fn cover_bonus(&self) -> i32 {
        self.combat
            .as_ref()
            .map_or(0, |c| c.encounter.environment.cover.armor_class_bonus())
    }

    fn in_darkness(&self) -> bool {
        self.combat
            .as_ref()
            .is_some_and(|c| c.encounter.environment.lighting == Lighting::Darkness)
    }

    /// A participant the player can target
    fn target(&self, target_id: &str) -> Result<&Participant, ActionFailure> {
        let combat = self.combat.as_ref().ok_or(ActionFailure::NotInCombat)?;
        let participant = combat
            .encounter
            .participant(target_id)
            .filter(|p| p.side != Side::Player)
            .ok_or_else(|| ActionFailure::UnknownTarget(target_id.to_string()))?;
        if !participant.is_active() {
            return Err(ActionFailure::TargetDown(participant.name.clone()));
        }
        if combat.encounter.environment.cover.blocks_targeting() {
            return Err(ActionFailure::TargetBlocked(participant.name.clone()));
        }
        Ok(participant)
    }

    fn weapon_strike(
        &mut self,
        target_id: &str,
        opportunity: bool,
        roller: &mut impl DieRoller,
    ) -> Result<AttackReport, ActionFailure> {
        let weapon = self.character.equipped_weapon().cloned().ok_or(ActionFailure::NoWeapon)?;
        let (armor_class, distance, name) = {
            let target = self.target(target_id)?;
            (target.armor_class, target.distance_feet, target.name.clone())
        };
        if (opportunity || weapon.kind == AttackKind::Melee) && distance > weapon.reach_feet {
            return Err(ActionFailure::OutOfReach { name, distance });
        }

        let mut request = AttackRequest::new(weapon.kind, armor_class + self.cover_bonus())
            .proficient()
            .with_critical_threshold(self.constants.combat.critical_threshold);
        if self.in_darkness() {
            request = request.with_disadvantage();
        }
        let attack = if opportunity {
            opportunity_attack(&self.character, &request, roller)
        } else {
            attack_roll(&self.character, &request, roller)
        };

        let mut report = AttackReport {
            target_id: target_id.to_string(),
            attack,
            damage: None,
            mitigated: None,
            target_hit_points: 0,
            target_down: false,
        };
        if report.attack.is_hit() {
            let roll = roll_damage(
                &weapon.damage,
                report.attack.ability_modifier,
                self.character.rune_damage_bonus(),
                report.attack.is_critical(),
                roller,
            );
            let (mitigated, _) = self.damage_participant(target_id, roll.total, weapon.damage_type)?;
            report.damage = Some(roll);
            report.mitigated = Some(mitigated);
        }
        let hit_points = self.target_hit_points(target_id)?;
        report.target_hit_points = hit_points.current;
        report.target_down = hit_points.is_down();
        Ok(report)
    }

    fn target_hit_points(&self, target_id: &str) -> Result<HitPoints, ActionFailure> {
        self.combat
            .as_ref()
            .and_then(|c| c.encounter.participant(target_id))
            .map(|p| p.hit_points)
            .ok_or_else(|| ActionFailure::UnknownTarget(target_id.to_string()))
    }

    /// Apply damage to a non-player participant after its defenses
    fn damage_participant(
        &mut self,
        target_id: &str,
        amount: i32,
        damage_type: DamageType,
    ) -> Result<(MitigatedDamage, HitPoints), ActionFailure> {
        let combat = self.combat.as_mut().ok_or(ActionFailure::NotInCombat)?;
        let participant = combat
            .encounter
            .participant_mut(target_id)
            .ok_or_else(|| ActionFailure::UnknownTarget(target_id.to_string()))?;
        let mitigated = mitigate(amount, damage_type, &participant.defenses);
        let (hit_points, _) = participant.hit_points.damaged(mitigated.final_amount);
        participant.hit_points = hit_points;
        debug!(target = target_id, damage = mitigated.final_amount, current = hit_points.current, "participant damaged");
        Ok((mitigated, hit_points))
    }

    /// A stat-block attack against the player, with damage applied on a hit
    fn strike_player(
        &mut self,
        attacker: &str,
        profile: &AttackProfile,
        mode: RollMode,
        roller: &mut impl DieRoller,
    ) -> (AttackResult, Option<DamageReport>) {
        let attack = profile_attack(
            attacker,
            profile,
            self.character.armor_class,
            mode,
            self.constants.combat.critical_threshold,
            roller,
        );
        let damage = if attack.is_hit() {
            let roll = roll_damage(&profile.damage, 0, profile.damage_bonus, attack.is_critical(), roller);
            Some(self.take_damage(roll.total, profile.damage_type))
        } else {
            None
        };
        (attack, damage)
    }

    fn enemy_opportunity_attack(&mut self, participant_id: &str, roller: &mut impl DieRoller) -> Option<EnemyAction> {
        let (name, profile) = {
            let participant = self.encounter()?.participant(participant_id)?;
            (participant.name.clone(), participant.attack.clone()?)
        };
        let (attack, damage) = self.strike_player(&name, &profile, RollMode::Disadvantage, roller);
        Some(EnemyAction {
            participant_id: participant_id.to_string(),
            moved_feet: 0,
            attack: Some(attack),
            damage,
            opportunity: true,
        })
    }

    /// An enemy closes to reach and attacks the player if it can
    fn run_enemy_turn(&mut self, index: usize, roller: &mut impl DieRoller) -> Option<EnemyAction> {
        let default_reach = self.constants.combat.reach_feet;
        let difficult = self.difficult_terrain();
        let mode = if self.in_darkness() {
            RollMode::Disadvantage
        } else {
            RollMode::Normal
        };

        let combat = self.combat.as_mut()?;
        let participant = combat.encounter.participants.get_mut(index)?;
        if participant.side != Side::Enemy || !participant.is_active() {
            return None;
        }
        let reach = participant.reach_feet(default_reach);
        let mut moved_feet = 0;
        if participant.distance_feet > reach {
            let allowance = movement_allowance(participant.speed, false, difficult);
            moved_feet = allowance.min(participant.distance_feet - reach);
            participant.distance_feet -= moved_feet;
        }
        let in_reach = participant.distance_feet <= reach;
        let participant_id = participant.id.clone();
        let name = participant.name.clone();
        let profile = participant.attack.clone();

        let mut action = EnemyAction {
            participant_id,
            moved_feet,
            attack: None,
            damage: None,
            opportunity: false,
        };
        if let Some(profile) = profile.filter(|_| in_reach && self.character.is_conscious()) {
            let (attack, damage) = self.strike_player(&name, &profile, mode, roller);
            action.attack = Some(attack);
            action.damage = damage;
        }
        debug!(enemy = %name, moved_feet, attacked = action.attack.is_some(), "enemy turn");
        Some(action)
    }

    fn run_until_player_turn(&mut self, roller: &mut impl DieRoller) -> Vec<EnemyAction> {
        let mut actions = Vec::new();
        let turns = self.combat.as_ref().map_or(0, |c| c.encounter.participants.len());
        for _ in 0..=turns {
            let (player_turn, resolved, index) = match self.combat.as_ref() {
                Some(c) => (c.encounter.is_player_turn(), c.encounter.is_resolved(), c.encounter.current_turn),
                None => break,
            };
            if player_turn {
                self.begin_player_turn();
                break;
            }
            if resolved || !self.character.is_conscious() {
                break;
            }
            if let Some(action) = self.run_enemy_turn(index, roller) {
                actions.push(action);
            }
            if let Some(combat) = self.combat.as_mut() {
                if combat.encounter.advance() {
                    debug!(round = combat.encounter.round, "new round");
                }
            }
        }
        actions
    }

    fn begin_player_turn(&mut self) {
        let movement = movement_allowance(self.character.speed, false, self.difficult_terrain());
        if let Some(combat) = self.combat.as_mut() {
            combat.state.start_turn(movement);
        }
    }
}
