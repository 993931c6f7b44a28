//! Dice expressions of the form `NdM[+B]`

use super::DieRoller;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest die accepted in an expression
pub const MAX_FACES: u32 = 100;

/// Largest dice count accepted in an expression
pub const MAX_DICE: u32 = 100;

/// Malformed dice expression. A contract violation by the caller, not a
/// game state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiceError {
    #[error("empty dice expression")]
    Empty,
    #[error("malformed dice expression '{0}'")]
    Malformed(String),
    #[error("die faces {0} out of range (2-100)")]
    FacesOutOfRange(u32),
    #[error("dice count {0} out of range (1-100)")]
    CountOutOfRange(u32),
}

/// A parsed `NdM[+B]` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceExpr {
    pub count: u32,
    pub faces: u32,
    pub bonus: i32,
}

impl DiceExpr {
    /// Build an expression, checking count and faces
    pub fn new(count: u32, faces: u32, bonus: i32) -> Result<Self, DiceError> {
        if !(1..=MAX_DICE).contains(&count) {
            return Err(DiceError::CountOutOfRange(count));
        }
        if !(2..=MAX_FACES).contains(&faces) {
            return Err(DiceError::FacesOutOfRange(faces));
        }
        Ok(DiceExpr { count, faces, bonus })
    }

    /// Parse `NdM`, `dM`, `NdM+B` or `NdM-B` (case and spaces ignored)
    pub fn parse(input: &str) -> Result<Self, DiceError> {
        let compact: String = input
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        if compact.is_empty() {
            return Err(DiceError::Empty);
        }
        let malformed = || DiceError::Malformed(input.trim().to_string());

        let (count_part, rest) = compact.split_once('d').ok_or_else(malformed)?;
        let count = if count_part.is_empty() {
            1
        } else {
            unsigned(count_part).ok_or_else(malformed)?
        };

        let (faces_part, bonus) = match rest.find(['+', '-']) {
            Some(pos) => {
                let (faces, signed) = rest.split_at(pos);
                let magnitude = unsigned(&signed[1..])
                    .and_then(|m| i32::try_from(m).ok())
                    .ok_or_else(malformed)?;
                let bonus = if signed.starts_with('-') { -magnitude } else { magnitude };
                (faces, bonus)
            }
            None => (rest, 0),
        };
        let faces = unsigned(faces_part).ok_or_else(malformed)?;

        DiceExpr::new(count, faces, bonus)
    }

    /// Same expression with extra dice (upcast scaling)
    pub fn with_extra_dice(&self, extra: u32) -> Self {
        DiceExpr {
            count: self.count.saturating_add(extra),
            ..*self
        }
    }

    /// Roll every die, returning the individual results
    pub fn roll_dice(&self, roller: &mut impl DieRoller) -> Vec<u32> {
        (0..self.count).map(|_| roller.roll(self.faces)).collect()
    }

    /// Smallest possible total
    pub fn min_total(&self) -> i32 {
        self.count as i32 + self.bonus
    }

    /// Largest possible total
    pub fn max_total(&self) -> i32 {
        (self.count * self.faces) as i32 + self.bonus
    }
}

/// Plain digits only; `str::parse` would also take a leading sign
fn unsigned(part: &str) -> Option<u32> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl FromStr for DiceExpr {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DiceExpr::parse(s)
    }
}

impl TryFrom<String> for DiceExpr {
    type Error = DiceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        DiceExpr::parse(&value)
    }
}

impl From<DiceExpr> for String {
    fn from(expr: DiceExpr) -> Self {
        expr.to_string()
    }
}

impl fmt::Display for DiceExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.bonus {
            0 => Ok(()),
            b if b > 0 => write!(f, "+{}", b),
            b => write!(f, "{}", b),
        }
    }
}
