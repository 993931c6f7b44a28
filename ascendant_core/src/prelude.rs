//! Prelude module for convenient imports
//!
//! ```rust
//! use ascendant_core::prelude::*;
//! ```

// Core types
pub use crate::types::{Ability, AbilityScores, ArmorCategory, AttackKind, CasterKind, DamageType, Defenses, Skill};

// Characters
pub use crate::character::{
    Character, CharacterFactory, CharacterOptions, Creature, Equipment, HitPoints, ShadowSoldier, WeaponProfile,
};

// Dice
pub use crate::dice::{DiceExpr, DieRoller, RngRoller, RollMode, ScriptedRoller};

// Combat
pub use crate::combat::{AttackRequest, AttackResult, CombatEncounter, Environment, Participant, Side};

// Spells
pub use crate::spell::{can_cast, cast, CastFailure, PowerCatalog, Spell};

// Session
pub use crate::session::{ActionFailure, FavorUse, SessionController, TurnResource};

// Config
pub use crate::config::{default_classes, default_powers, GameConstants};
