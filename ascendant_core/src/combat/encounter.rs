//! Combat encounter - participants, turn order and environment

use crate::character::{AttackProfile, Character, Creature, HitPoints, ShadowSoldier};
use crate::types::{Ability, AbilityScores, Defenses};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Which side of the fight a participant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Player,
    Ally,
    Enemy,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Normal,
    Difficult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    #[default]
    Bright,
    Dim,
    Darkness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cover {
    #[default]
    None,
    Half,
    ThreeQuarters,
    Total,
}

impl Cover {
    /// AC bonus granted to a target behind this cover
    pub fn armor_class_bonus(&self) -> i32 {
        match self {
            Cover::None | Cover::Total => 0,
            Cover::Half => 2,
            Cover::ThreeQuarters => 5,
        }
    }

    /// Total cover cannot be targeted directly
    pub fn blocks_targeting(&self) -> bool {
        *self == Cover::Total
    }
}

/// Battlefield descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Environment {
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub lighting: Lighting,
    /// Cover enjoyed by the player's targets
    #[serde(default)]
    pub cover: Cover,
}

/// One combatant in an encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub side: Side,
    pub initiative_modifier: i32,
    #[serde(default)]
    pub initiative: Option<i32>,
    pub armor_class: i32,
    pub hit_points: HitPoints,
    /// Scores used for saving throws against powers
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub defenses: Defenses,
    #[serde(default)]
    pub attack: Option<AttackProfile>,
    pub speed: u32,
    /// Distance from the player in feet
    #[serde(default)]
    pub distance_feet: u32,
}

impl Participant {
    /// The session's own character
    pub fn player(character: &Character) -> Self {
        Participant {
            id: "player".to_string(),
            name: character.name.clone(),
            side: Side::Player,
            initiative_modifier: character.modifier(Ability::Agility),
            initiative: None,
            armor_class: character.armor_class,
            hit_points: character.hit_points,
            abilities: character.abilities,
            defenses: character.defenses.clone(),
            attack: None,
            speed: character.speed,
            distance_feet: 0,
        }
    }

    pub fn from_creature(creature: &Creature, side: Side, distance_feet: u32) -> Self {
        Participant {
            id: creature.id.clone(),
            name: creature.name.clone(),
            side,
            initiative_modifier: creature.abilities.modifier(Ability::Agility),
            initiative: None,
            armor_class: creature.armor_class,
            hit_points: HitPoints::full(creature.max_hit_points),
            abilities: creature.abilities,
            defenses: creature.defenses.clone(),
            attack: creature.attack.clone(),
            speed: creature.speed,
            distance_feet,
        }
    }

    /// A summoned shadow soldier fighting for the player
    pub fn from_soldier(soldier: &ShadowSoldier, distance_feet: u32) -> Self {
        let mut participant = Participant::from_creature(&soldier.creature, Side::Ally, distance_feet);
        participant.id = soldier.id.clone();
        participant.name = soldier.name.clone();
        participant
    }

    pub fn is_active(&self) -> bool {
        !self.hit_points.is_down()
    }

    pub fn is_hostile(&self) -> bool {
        self.side == Side::Enemy
    }

    /// Threat reach in feet, from its attack profile
    pub fn reach_feet(&self, default_reach: u32) -> u32 {
        self.attack.as_ref().map_or(default_reach, |a| a.reach_feet)
    }
}

/// An ordered fight with a round counter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatEncounter {
    pub participants: Vec<Participant>,
    pub round: u32,
    pub current_turn: usize,
    #[serde(default)]
    pub environment: Environment,
}

impl CombatEncounter {
    pub fn new(participants: Vec<Participant>) -> Self {
        let mut encounter = CombatEncounter {
            participants,
            round: 1,
            current_turn: 0,
            environment: Environment::default(),
        };
        encounter.assign_unique_ids();
        encounter
    }

    /// Suffix repeated ids (`goblin`, `goblin_2`, ...) so every participant
    /// stays addressable. The first holder of an id keeps it.
    pub fn assign_unique_ids(&mut self) {
        let mut taken: HashSet<String> = self.participants.iter().map(|p| p.id.clone()).collect();
        let mut seen = HashSet::new();
        for participant in &mut self.participants {
            if seen.insert(participant.id.clone()) {
                continue;
            }
            let mut suffix = 2;
            let mut candidate = format!("{}_{}", participant.id, suffix);
            while taken.contains(&candidate) {
                suffix += 1;
                candidate = format!("{}_{}", participant.id, suffix);
            }
            taken.insert(candidate.clone());
            seen.insert(candidate.clone());
            participant.id = candidate;
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn participant_mut(&mut self, id: &str) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.id == id)
    }

    pub fn player(&self) -> Option<&Participant> {
        self.participants.iter().find(|p| p.side == Side::Player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.side == Side::Player)
    }

    /// Participant whose turn it is
    pub fn current(&self) -> Option<&Participant> {
        self.participants.get(self.current_turn)
    }

    pub fn is_player_turn(&self) -> bool {
        self.current().is_some_and(|p| p.side == Side::Player)
    }

    /// Sort by initiative (highest first, agility modifier breaks ties) and
    /// restart at the top of round 1
    pub fn order_by_initiative(&mut self) {
        self.participants.sort_by(|a, b| {
            b.initiative
                .unwrap_or(i32::MIN)
                .cmp(&a.initiative.unwrap_or(i32::MIN))
                .then(b.initiative_modifier.cmp(&a.initiative_modifier))
        });
        self.round = 1;
        self.current_turn = 0;
    }

    /// Move to the next active participant; returns true when a new round began
    pub fn advance(&mut self) -> bool {
        let count = self.participants.len();
        if count == 0 {
            return false;
        }
        let mut new_round = false;
        for _ in 0..count {
            self.current_turn += 1;
            if self.current_turn >= count {
                self.current_turn = 0;
                self.round += 1;
                new_round = true;
            }
            if self.participants[self.current_turn].is_active() {
                break;
            }
        }
        new_round
    }

    pub fn enemies_remaining(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.is_hostile() && p.is_active())
            .count()
    }

    /// No enemy is left standing
    pub fn is_resolved(&self) -> bool {
        self.enemies_remaining() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goblin(id: &str, initiative: i32) -> Participant {
        let mut p = Participant::from_creature(&Creature::new(id, "Goblin", 13, 7), Side::Enemy, 20);
        p.initiative = Some(initiative);
        p
    }

    #[test]
    fn test_initiative_order() {
        let mut encounter = CombatEncounter::new(vec![goblin("a", 5), goblin("b", 17), goblin("c", 11)]);
        encounter.order_by_initiative();
        let order: Vec<&str> = encounter.participants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(encounter.current().unwrap().id, "b");
    }

    #[test]
    fn test_ties_broken_by_modifier() {
        let mut slow = goblin("slow", 12);
        slow.initiative_modifier = 0;
        let mut quick = goblin("quick", 12);
        quick.initiative_modifier = 3;
        let mut encounter = CombatEncounter::new(vec![slow, quick]);
        encounter.order_by_initiative();
        assert_eq!(encounter.participants[0].id, "quick");
    }

    #[test]
    fn test_advance_wraps_round_and_skips_downed() {
        let mut encounter = CombatEncounter::new(vec![goblin("a", 3), goblin("b", 2), goblin("c", 1)]);
        encounter.order_by_initiative();
        encounter.participants[1].hit_points.current = 0;

        assert!(!encounter.advance());
        assert_eq!(encounter.current().unwrap().id, "c");
        assert!(encounter.advance());
        assert_eq!(encounter.round, 2);
        assert_eq!(encounter.current().unwrap().id, "a");
    }

    #[test]
    fn test_resolution_counts_active_enemies() {
        let mut encounter = CombatEncounter::new(vec![goblin("a", 3), goblin("b", 2)]);
        assert_eq!(encounter.enemies_remaining(), 2);
        for p in &mut encounter.participants {
            p.hit_points.current = 0;
        }
        assert!(encounter.is_resolved());
    }

    #[test]
    fn test_repeated_ids_get_suffixes() {
        let encounter = CombatEncounter::new(vec![
            goblin("goblin", 1),
            goblin("goblin", 2),
            goblin("goblin_2", 3),
            goblin("goblin", 4),
        ]);
        let ids: Vec<&str> = encounter.participants.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["goblin", "goblin_3", "goblin_2", "goblin_4"]);
    }

    #[test]
    fn test_cover_bonus() {
        assert_eq!(Cover::Half.armor_class_bonus(), 2);
        assert_eq!(Cover::ThreeQuarters.armor_class_bonus(), 5);
        assert!(Cover::Total.blocks_targeting());
        assert!(!Cover::None.blocks_targeting());
    }
}
