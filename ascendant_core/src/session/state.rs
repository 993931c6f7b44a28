//! Per-encounter turn bookkeeping and session failures

use crate::character::ResourceFailure;
use crate::spell::CastFailure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ACTIONS_PER_TURN: u32 = 1;
pub const BONUS_ACTIONS_PER_TURN: u32 = 1;
pub const REACTIONS_PER_ROUND: u32 = 1;

/// Whether the session has an encounter running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    InCombat,
}

/// Narrative effect bought with one point of favor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorUse {
    Advantage,
    Reroll,
    Bonus,
    Heal,
}

/// Slots of the action economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnResource {
    Action,
    BonusAction,
    Reaction,
}

/// A refused session request. The message is shown to players as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionFailure {
    #[error("not in combat")]
    NotInCombat,
    #[error("already in combat")]
    AlreadyInCombat,
    #[error("cannot rest during combat")]
    RestInCombat,
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("character is unconscious")]
    Unconscious,
    #[error("action already used this turn")]
    ActionUsed,
    #[error("bonus action already used this turn")]
    BonusActionUsed,
    #[error("reaction already used this round")]
    ReactionUsed,
    #[error("not enough movement: need {needed} feet, have {remaining}")]
    InsufficientMovement { needed: u32, remaining: u32 },
    #[error("no participant '{0}' in this encounter")]
    UnknownTarget(String),
    #[error("{0} is already down")]
    TargetDown(String),
    #[error("{0} is behind total cover")]
    TargetBlocked(String),
    #[error("{name} is {distance} feet away, out of reach")]
    OutOfReach { name: String, distance: u32 },
    #[error("no weapon equipped")]
    NoWeapon,
    #[error("unknown power '{0}'")]
    UnknownPower(String),
    #[error("'{0}' has not been learned")]
    PowerNotKnown(String),
    #[error("{0} takes too long to cast in combat")]
    CastingTimeTooLong(String),
    #[error("already at maximum level {0}")]
    MaxLevel(u32),
    #[error(transparent)]
    Cast(#[from] CastFailure),
    #[error(transparent)]
    Resource(#[from] ResourceFailure),
}

/// The player's turn state for one encounter. Discarded when combat ends.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub initiative: i32,
    pub is_turn: bool,
    pub actions_taken: u32,
    pub bonus_actions_taken: u32,
    pub reactions_taken: u32,
    pub movement_remaining: u32,
    /// Power currently held with concentration
    pub concentration: Option<String>,
    pub favor_used_this_turn: bool,
    pub monarch_used_this_turn: bool,
    pub disengaged: bool,
    pub dashed: bool,
}

impl CombatState {
    pub fn new(initiative: i32) -> Self {
        CombatState {
            initiative,
            ..Self::default()
        }
    }

    /// Fresh counters for the start of the player's turn. The reaction comes
    /// back here too, once per round.
    pub fn start_turn(&mut self, movement: u32) {
        *self = CombatState {
            initiative: self.initiative,
            is_turn: true,
            movement_remaining: movement,
            concentration: self.concentration.take(),
            ..Self::default()
        };
    }

    pub fn end_turn(&mut self) {
        self.is_turn = false;
        self.movement_remaining = 0;
    }

    /// Check a slot of the action economy without using it
    pub fn check(&self, resource: TurnResource) -> Result<(), ActionFailure> {
        match resource {
            TurnResource::Action if self.actions_taken >= ACTIONS_PER_TURN => Err(ActionFailure::ActionUsed),
            TurnResource::BonusAction if self.bonus_actions_taken >= BONUS_ACTIONS_PER_TURN => {
                Err(ActionFailure::BonusActionUsed)
            }
            TurnResource::Reaction if self.reactions_taken >= REACTIONS_PER_ROUND => {
                Err(ActionFailure::ReactionUsed)
            }
            _ => Ok(()),
        }
    }

    pub fn spend(&mut self, resource: TurnResource) -> Result<(), ActionFailure> {
        self.check(resource)?;
        match resource {
            TurnResource::Action => self.actions_taken += 1,
            TurnResource::BonusAction => self.bonus_actions_taken += 1,
            TurnResource::Reaction => self.reactions_taken += 1,
        }
        Ok(())
    }
}
