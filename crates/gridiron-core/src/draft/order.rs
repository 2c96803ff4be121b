// Draft order arithmetic for linear and snake drafts.
//
// Overall picks and team slots are both 1-indexed.

/// Round containing `overall_pick`: `ceil(overall / teams)`.
pub fn round_for_pick(overall_pick: u32, teams: u32) -> u32 {
    overall_pick.max(1).div_ceil(teams.max(1))
}

/// 1-indexed position of `overall_pick` within its round.
pub fn position_in_round(overall_pick: u32, teams: u32) -> u32 {
    (overall_pick.max(1) - 1) % teams.max(1) + 1
}

/// The team slot (1..=teams) that owns `overall_pick`.
///
/// Linear drafts repeat the same order every round. Snake drafts reverse the
/// order in even rounds.
pub fn pick_owner(overall_pick: u32, teams: u32, snake: bool) -> u32 {
    let teams = teams.max(1);
    let position = position_in_round(overall_pick, teams);
    if snake && round_for_pick(overall_pick, teams) % 2 == 0 {
        teams - position + 1
    } else {
        position
    }
}

/// The overall pick at which `slot` picks in `round`. Saturates at
/// `u32::MAX` for rounds past the representable range.
fn pick_for_slot_in_round(round: u32, slot: u32, teams: u32, snake: bool) -> u32 {
    let index = if snake && round % 2 == 0 {
        teams - slot + 1
    } else {
        slot
    };
    round
        .saturating_sub(1)
        .saturating_mul(teams)
        .saturating_add(index)
}

/// First overall pick at or after `current_overall` that belongs to `slot`.
pub fn next_pick_for_slot(current_overall: u32, slot: u32, teams: u32, snake: bool) -> u32 {
    let teams = teams.max(1);
    let slot = slot.clamp(1, teams);
    let current = current_overall.max(1);
    let round = round_for_pick(current, teams);
    let this_round = pick_for_slot_in_round(round, slot, teams, snake);
    if this_round >= current {
        this_round
    } else {
        pick_for_slot_in_round(round.saturating_add(1), slot, teams, snake)
    }
}

/// Number of picks made by others before `slot` is on the clock again.
pub fn picks_until(current_overall: u32, slot: u32, teams: u32, snake: bool) -> u32 {
    next_pick_for_slot(current_overall, slot, teams, snake).saturating_sub(current_overall.max(1))
}
