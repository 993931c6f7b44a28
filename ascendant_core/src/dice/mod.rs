//! Dice - injectable die source, roll modes and dice expressions

mod expression;
mod roller;

pub use expression::{DiceError, DiceExpr, MAX_DICE, MAX_FACES};
pub use roller::{DieRoller, RngRoller, ScriptedRoller};

use serde::{Deserialize, Serialize};

/// How a d20 test is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollMode {
    #[default]
    Normal,
    Advantage,
    Disadvantage,
}

impl RollMode {
    /// Combine advantage and disadvantage requests; both cancel to a flat roll
    pub fn from_flags(advantage: bool, disadvantage: bool) -> Self {
        match (advantage, disadvantage) {
            (true, false) => RollMode::Advantage,
            (false, true) => RollMode::Disadvantage,
            _ => RollMode::Normal,
        }
    }
}

/// A d20 draw under a roll mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct D20Roll {
    /// Every die drawn, in draw order
    pub rolls: Vec<u32>,
    /// The die that counts
    pub natural: u32,
    pub mode: RollMode,
}

/// Draw a d20, twice under advantage or disadvantage
pub fn roll_d20(mode: RollMode, roller: &mut impl DieRoller) -> D20Roll {
    let first = roller.roll(20);
    let (rolls, natural) = match mode {
        RollMode::Normal => (vec![first], first),
        RollMode::Advantage => {
            let second = roller.roll(20);
            (vec![first, second], first.max(second))
        }
        RollMode::Disadvantage => {
            let second = roller.roll(20);
            (vec![first, second], first.min(second))
        }
    };
    D20Roll { rolls, natural, mode }
}
