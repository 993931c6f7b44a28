//! ascendant_core - Rules engine for the hybrid ascendant/classic d20 ruleset
//!
//! This library provides:
//! - Ability math: modifiers, proficiency, favor pool and spell slot tables
//! - Character: immutable character snapshots built by `CharacterFactory`
//! - Combat resolution: attack, damage, saving throw, initiative and movement
//! - Spell resolution: casting legality and cast execution
//! - SessionController: rests, leveling and turn-by-turn combat for one character

pub mod ability;
pub mod character;
pub mod combat;
pub mod config;
pub mod dice;
pub mod prelude;
pub mod session;
pub mod spell;
pub mod types;

// Re-export core types for convenience
pub use character::{
    Character, CharacterFactory, CharacterOptions, CharacterTemplate, ClassCatalog, ClassProfile, HitPoints,
    ResourceFailure, ResourceLedger, ValidationIssue, ValidationReport,
};
pub use combat::{AttackOutcome, AttackRequest, AttackResult, CombatEncounter, DamageRoll, Participant};
pub use config::{default_classes, default_powers, ConfigError, GameConstants};
pub use dice::{DiceError, DiceExpr, DieRoller, RngRoller, RollMode, ScriptedRoller};
pub use session::{ActionFailure, CombatState, FavorUse, Phase, SessionController};
pub use spell::{CastFailure, CastResult, PowerCatalog, Spell};
pub use types::{Ability, AbilityScores, DamageType, Skill};
