// Replacement levels and value over replacement (VORP).
//
// The replacement level at a position is the projected points of the best
// player who would not start in a league where every team fills its
// starting lineup. FLEX slots are handed out one at a time to whichever
// FLEX-eligible position has the strongest next player.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::EngineError;
use crate::league::{validate_teams, RosterRequirements};
use crate::player::{Player, Position};
use crate::scoring::{compute_points, ScoringRules};

/// Replacement-level points and league-wide starter counts per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplacementLevels {
    levels: BTreeMap<Position, f64>,
    starters: BTreeMap<Position, u32>,
}

impl ReplacementLevels {
    /// Replacement-level points, or `None` when no players exist at `position`.
    pub fn get(&self, position: Position) -> Option<f64> {
        self.levels.get(&position).copied()
    }

    /// League-wide starters at `position`, FLEX share included.
    pub fn starters(&self, position: Position) -> u32 {
        self.starters.get(&position).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Position, f64)> + '_ {
        self.levels.iter().map(|(pos, level)| (*pos, *level))
    }
}

/// Replacement levels for every position present in `pool`.
///
/// Players whose position is unrecognized, or whose projection shape does
/// not fit their position, take no part in the baseline.
pub fn compute_replacement_levels(
    pool: &[Player],
    rules: &ScoringRules,
    roster: &RosterRequirements,
    teams: u32,
) -> Result<ReplacementLevels, EngineError> {
    validate_teams(teams)?;
    rules.validate()?;
    let by_position =
        points_by_position(pool.iter().map(|p| (p, compute_points(p, rules))));
    Ok(replacement_levels_from_points(&by_position, roster, teams))
}

/// Value over replacement. Positions with no replacement level yield 0.
pub fn compute_vorp(points: f64, position: Position, levels: &ReplacementLevels) -> f64 {
    levels.get(position).map_or(0.0, |level| points - level)
}

/// Group scored players by position, each group sorted descending.
pub(crate) fn points_by_position<'a, I>(scored: I) -> BTreeMap<Position, Vec<f64>>
where
    I: IntoIterator<Item = (&'a Player, f64)>,
{
    let mut groups: BTreeMap<Position, Vec<f64>> = BTreeMap::new();
    for (player, points) in scored {
        if !player.stats_match_position() {
            continue;
        }
        if let Some(pos) = player.position {
            groups.entry(pos).or_default().push(points);
        }
    }
    for points in groups.values_mut() {
        points.sort_by(|a, b| b.total_cmp(a));
    }
    groups
}

/// Compute levels from pre-sorted (descending) points per position.
pub(crate) fn replacement_levels_from_points(
    by_position: &BTreeMap<Position, Vec<f64>>,
    roster: &RosterRequirements,
    teams: u32,
) -> ReplacementLevels {
    let mut starters: BTreeMap<Position, u32> = Position::PLAYING
        .iter()
        .map(|&pos| (pos, roster.count(pos) * teams))
        .collect();

    // Hand out FLEX slots one at a time. Ties go to the earlier position in
    // FLEX_ELIGIBLE order (RB, WR, TE).
    let flex_slots = roster.flex() * teams;
    for _ in 0..flex_slots {
        let mut best: Option<(Position, f64)> = None;
        for pos in Position::FLEX_ELIGIBLE {
            let taken = starters.get(&pos).copied().unwrap_or(0) as usize;
            let Some(&next) = by_position.get(&pos).and_then(|pts| pts.get(taken)) else {
                continue;
            };
            if best.map_or(true, |(_, b)| next > b) {
                best = Some((pos, next));
            }
        }
        match best {
            Some((pos, _)) => *starters.entry(pos).or_insert(0) += 1,
            None => break,
        }
    }

    let mut levels = BTreeMap::new();
    for (&pos, points) in by_position {
        let n = starters.get(&pos).copied().unwrap_or(0) as usize;
        // The (n+1)th player, or the lowest player when the pool runs short.
        if let Some(&level) = points.get(n).or_else(|| points.last()) {
            levels.insert(pos, level);
        }
    }

    ReplacementLevels { levels, starters }
}
