//! Damage rolls and damage mitigation
//!
//! A critical hit doubles the dice-rolled portion only. The expression's own
//! bonus, the ability modifier and any flat bonus are added once.

use crate::dice::{DiceError, DiceExpr, DieRoller};
use crate::types::{DamageType, Defenses};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A rolled damage expression with its breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub expression: DiceExpr,
    /// Individual die results
    pub dice: Vec<u32>,
    /// Sum of the dice, doubled on a critical hit
    pub dice_total: i32,
    pub critical: bool,
    pub expression_bonus: i32,
    pub ability_modifier: i32,
    pub flat_bonus: i32,
    /// Final damage, never below 0
    pub total: i32,
}

/// Roll a parsed damage expression
pub fn roll_damage(
    expression: &DiceExpr,
    ability_modifier: i32,
    flat_bonus: i32,
    critical: bool,
    roller: &mut impl DieRoller,
) -> DamageRoll {
    let dice = expression.roll_dice(roller);
    let rolled: i32 = dice.iter().map(|d| *d as i32).sum();
    let dice_total = if critical { rolled * 2 } else { rolled };
    let total = (dice_total + expression.bonus + ability_modifier + flat_bonus).max(0);

    debug!(%expression, dice_total, critical, total, "damage roll");

    DamageRoll {
        expression: *expression,
        dice,
        dice_total,
        critical,
        expression_bonus: expression.bonus,
        ability_modifier,
        flat_bonus,
        total,
    }
}

/// Parse and roll a damage expression such as `2d6+3`
pub fn roll_damage_expr(
    expression: &str,
    ability_modifier: i32,
    flat_bonus: i32,
    critical: bool,
    roller: &mut impl DieRoller,
) -> Result<DamageRoll, DiceError> {
    let parsed = DiceExpr::parse(expression)?;
    Ok(roll_damage(&parsed, ability_modifier, flat_bonus, critical, roller))
}

/// How defenses changed incoming damage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mitigation {
    None,
    Resisted,
    Immune,
}

/// Damage after resistances and immunities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitigatedDamage {
    pub damage_type: DamageType,
    pub raw: i32,
    pub final_amount: i32,
    pub mitigation: Mitigation,
}

impl MitigatedDamage {
    pub fn prevented(&self) -> i32 {
        self.raw - self.final_amount
    }
}

/// Immunity zeroes damage, resistance halves it (floor), otherwise unchanged
pub fn mitigate(amount: i32, damage_type: DamageType, defenses: &Defenses) -> MitigatedDamage {
    let raw = amount.max(0);
    let (final_amount, mitigation) = if defenses.is_immune(damage_type) {
        (0, Mitigation::Immune)
    } else if defenses.resists(damage_type) {
        (raw / 2, Mitigation::Resisted)
    } else {
        (raw, Mitigation::None)
    };
    MitigatedDamage {
        damage_type,
        raw,
        final_amount,
        mitigation,
    }
}
