//! Movement allowance and opportunity-attack triggers

/// Feet a creature may move this turn
///
/// Dash doubles the base speed, difficult terrain halves the result
/// (floored). Both apply when both hold.
pub fn movement_allowance(speed: u32, dash: bool, difficult_terrain: bool) -> u32 {
    let mut allowance = speed;
    if dash {
        allowance *= 2;
    }
    if difficult_terrain {
        allowance /= 2;
    }
    allowance
}

/// Whether a move provokes an opportunity attack from a threatening creature
///
/// Provoked when the mover starts inside the reach and ends outside it
/// without having disengaged.
pub fn provokes_opportunity_attack(start_distance: u32, end_distance: u32, reach: u32, disengaged: bool) -> bool {
    !disengaged && start_distance <= reach && end_distance > reach
}
