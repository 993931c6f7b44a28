//! Hit points and the resource ledger
//!
//! The favor counter is shared: system favor spends it freely, monarch power
//! spends it only while the monarch gate is open. Counters never go
//! negative; an overspend is refused, never clamped.

use crate::ability::SPELL_LEVELS;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Refused resource spend. The message is shown to players as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceFailure {
    #[error("no favor remaining")]
    NoFavorRemaining,
    #[error("not enough favor: need {needed}, have {available}")]
    InsufficientFavor { needed: u32, available: u32 },
    #[error("monarch power is not active")]
    MonarchInactive,
    #[error("not enough monarch power: need {needed}, have {available}")]
    InsufficientMonarchPower { needed: u32, available: u32 },
    #[error("no level {level} spell slots remaining")]
    NoSlotRemaining { level: usize },
}

/// Current, maximum and temporary hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitPoints {
    pub current: i32,
    pub max: i32,
    #[serde(default)]
    pub temporary: i32,
}

/// What a hit did to a hit point block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DamageAbsorption {
    pub absorbed_by_temporary: i32,
    pub dealt_to_current: i32,
}

impl HitPoints {
    /// Full hit points at the given maximum
    pub fn full(max: i32) -> Self {
        HitPoints {
            current: max.max(0),
            max,
            temporary: 0,
        }
    }

    /// Temporary hit points soak first, the rest comes off current (floor 0)
    pub fn damaged(self, amount: i32) -> (Self, DamageAbsorption) {
        let amount = amount.max(0);
        let absorbed = amount.min(self.temporary);
        let remaining = amount - absorbed;
        let dealt = remaining.min(self.current);
        let next = HitPoints {
            current: self.current - dealt,
            temporary: self.temporary - absorbed,
            ..self
        };
        (
            next,
            DamageAbsorption {
                absorbed_by_temporary: absorbed,
                dealt_to_current: dealt,
            },
        )
    }

    /// Restore current hit points, never above max
    pub fn healed(self, amount: i32) -> Self {
        HitPoints {
            current: (self.current + amount.max(0)).clamp(0, self.max.max(0)),
            ..self
        }
    }

    /// Temporary hit points do not stack; the larger pool wins
    pub fn with_temporary(self, amount: i32) -> Self {
        HitPoints {
            temporary: self.temporary.max(amount.max(0)),
            ..self
        }
    }

    pub fn without_temporary(self) -> Self {
        HitPoints { temporary: 0, ..self }
    }

    /// New maximum, keeping current inside [0, max]
    pub fn with_max(self, max: i32) -> Self {
        HitPoints {
            max,
            current: self.current.clamp(0, max.max(0)),
            ..self
        }
    }

    pub fn is_down(&self) -> bool {
        self.current <= 0
    }
}

/// Favor counter, monarch gate and spell slots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    /// Current favor; the maximum is derived from level
    pub favor: u32,
    /// Gate for spending the favor counter as monarch power
    #[serde(default)]
    pub monarch_active: bool,
    /// Unlock keys required by some monarch powers
    #[serde(default)]
    pub monarch_unlocks: Vec<String>,
    /// Remaining slots indexed by spell level; index 0 is never spent
    pub spell_slots: [u32; SPELL_LEVELS],
}

impl ResourceLedger {
    pub fn new(favor: u32, spell_slots: [u32; SPELL_LEVELS]) -> Self {
        ResourceLedger {
            favor,
            monarch_active: false,
            monarch_unlocks: Vec::new(),
            spell_slots,
        }
    }

    pub fn has_unlock(&self, key: &str) -> bool {
        self.monarch_unlocks.iter().any(|u| u == key)
    }

    /// Remaining slots at a spell level (0 beyond the table)
    pub fn slots_at(&self, level: usize) -> u32 {
        self.spell_slots.get(level).copied().unwrap_or(0)
    }

    /// Spend favor; the ledger is untouched on failure
    pub fn spend_favor(&self, amount: u32) -> Result<Self, ResourceFailure> {
        if amount == 0 {
            return Ok(self.clone());
        }
        if self.favor == 0 {
            return Err(ResourceFailure::NoFavorRemaining);
        }
        if amount > self.favor {
            return Err(ResourceFailure::InsufficientFavor {
                needed: amount,
                available: self.favor,
            });
        }
        Ok(ResourceLedger {
            favor: self.favor - amount,
            ..self.clone()
        })
    }

    /// Spend the favor counter as monarch power; needs the gate open
    pub fn spend_monarch_power(&self, cost: u32) -> Result<Self, ResourceFailure> {
        if !self.monarch_active {
            return Err(ResourceFailure::MonarchInactive);
        }
        if cost > self.favor {
            return Err(ResourceFailure::InsufficientMonarchPower {
                needed: cost,
                available: self.favor,
            });
        }
        Ok(ResourceLedger {
            favor: self.favor - cost,
            ..self.clone()
        })
    }

    /// Spend one slot at a level; cantrips cost nothing
    pub fn spend_slot(&self, level: usize) -> Result<Self, ResourceFailure> {
        if level == 0 {
            return Ok(self.clone());
        }
        let remaining = self.slots_at(level);
        if remaining == 0 {
            return Err(ResourceFailure::NoSlotRemaining { level });
        }
        let mut next = self.clone();
        next.spell_slots[level] = remaining - 1;
        Ok(next)
    }

    /// Restore favor, capped at the given maximum
    pub fn with_favor_restored(&self, amount: u32, max: u32) -> Self {
        ResourceLedger {
            favor: self.favor.saturating_add(amount).min(max),
            ..self.clone()
        }
    }
}
