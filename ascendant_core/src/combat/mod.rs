//! Combat resolution - stateless attack, damage, save and movement math
//!
//! Every function takes its inputs by reference plus a die source and
//! returns a result record; nothing here holds state between calls.

mod attack;
mod checks;
mod damage;
mod encounter;
mod movement;

pub use attack::{
    attack_roll, classify_attack, creature_attack, opportunity_attack, profile_attack, AttackOutcome, AttackRequest,
    AttackResult, DEFAULT_CRITICAL_THRESHOLD,
};
pub use checks::{
    ability_check, character_initiative, roll_check, roll_initiative, saving_throw, skill_check,
    CheckResult, InitiativeRoll,
};
pub use damage::{mitigate, roll_damage, roll_damage_expr, DamageRoll, MitigatedDamage, Mitigation};
pub use encounter::{CombatEncounter, Cover, Environment, Lighting, Participant, Side, Terrain};
pub use movement::{movement_allowance, provokes_opportunity_attack};
