//! Ability model - pure derived-stat formulas
//!
//! Everything here is a pure function of its inputs. Proficiency bonus and
//! favor ceilings depend on level only and are recomputed on demand rather
//! than stored on a character.

use crate::types::{ArmorCategory, CasterKind};

/// Number of spell levels tracked, 0 (cantrips) through 9
pub const SPELL_LEVELS: usize = 10;

/// Highest agility modifier medium armor lets through
const MEDIUM_ARMOR_AGI_CAP: i32 = 2;

/// AC granted by a shield
const SHIELD_BONUS: i32 = 2;

/// Ability modifier: floor((score - 10) / 2)
pub fn modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}

/// Proficiency bonus: floor((level - 1) / 4) + 2
pub fn proficiency_bonus(level: u32) -> i32 {
    (level.max(1) as i32 - 1) / 4 + 2
}

/// Favor pool ceiling by level tier
pub fn favor_pool_max(level: u32) -> u32 {
    match level {
        0..=4 => 3,
        5..=10 => 4,
        11..=16 => 5,
        _ => 6,
    }
}

/// Level 1 hit points: full hit die plus vitality modifier
///
/// Not floored; callers supply a positive die.
pub fn hit_points_at_level1(hit_die_faces: u32, vit_mod: i32) -> i32 {
    hit_die_faces as i32 + vit_mod
}

/// Hit points gained on each level after the first (average roll)
pub fn hit_points_per_level(hit_die_faces: u32, vit_mod: i32) -> i32 {
    (hit_die_faces / 2) as i32 + 1 + vit_mod
}

/// Maximum hit points at a level using the average-roll progression
pub fn hit_points_total(hit_die_faces: u32, vit_mod: i32, level: u32) -> i32 {
    let extra_levels = level.max(1) as i32 - 1;
    hit_points_at_level1(hit_die_faces, vit_mod)
        + extra_levels * hit_points_per_level(hit_die_faces, vit_mod)
}

/// Armor class from agility modifier, armor weight and shield
pub fn armor_class(agi_mod: i32, category: ArmorCategory, has_shield: bool) -> i32 {
    let agility = match category {
        ArmorCategory::None | ArmorCategory::Light => agi_mod,
        ArmorCategory::Medium => agi_mod.min(MEDIUM_ARMOR_AGI_CAP),
        ArmorCategory::Heavy => 0,
    };
    let shield = if has_shield { SHIELD_BONUS } else { 0 };
    10 + agility + shield
}

/// Slots per spell level 1-9 for a full caster, indexed by character level - 1
const FULL_CASTER_SLOTS: [[u32; 9]; 20] = [
    [2, 0, 0, 0, 0, 0, 0, 0, 0],
    [3, 0, 0, 0, 0, 0, 0, 0, 0],
    [4, 2, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 0, 0, 0, 0, 0, 0, 0],
    [4, 3, 2, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 0, 0, 0, 0, 0, 0],
    [4, 3, 3, 1, 0, 0, 0, 0, 0],
    [4, 3, 3, 2, 0, 0, 0, 0, 0],
    [4, 3, 3, 3, 1, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 0, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 0, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 0, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 0],
    [4, 3, 3, 3, 2, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 1, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 1, 1, 1],
    [4, 3, 3, 3, 3, 2, 2, 1, 1],
];

/// Pact slot tier: (slot count, slot level)
pub fn pact_slot_tier(level: u32) -> (u32, usize) {
    let level = level.max(1);
    let count = match level {
        1 => 1,
        2..=10 => 2,
        11..=16 => 3,
        _ => 4,
    };
    let slot_level = ((level + 1) / 2).min(5) as usize;
    (count, slot_level)
}

/// Spell slot maxima indexed by spell level (index 0 is always 0)
pub fn spell_slot_maxima(caster: CasterKind, level: u32) -> [u32; SPELL_LEVELS] {
    let mut slots = [0; SPELL_LEVELS];
    let row = match caster {
        CasterKind::None => return slots,
        CasterKind::Full => level,
        CasterKind::Half if level < 2 => return slots,
        CasterKind::Half => level.div_ceil(2),
        CasterKind::Pact => {
            let (count, slot_level) = pact_slot_tier(level);
            slots[slot_level] = count;
            return slots;
        }
    };
    let index = (row.clamp(1, 20) - 1) as usize;
    slots[1..].copy_from_slice(&FULL_CASTER_SLOTS[index]);
    slots
}
