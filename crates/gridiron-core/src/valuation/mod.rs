// Player valuation: points, VORP, positional rank, and value against ADP.

pub mod replacement;
pub mod scarcity;

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{EngineError, ScoreWarning};
use crate::league::{validate_teams, RosterRequirements};
use crate::player::{Player, PlayerId};
use crate::scoring::{compute_points, ScoringRules};
use replacement::{
    compute_vorp, points_by_position, replacement_levels_from_points, ReplacementLevels,
};

/// A player's derived value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerScore {
    pub player: Player,
    pub points: f64,
    pub vorp: f64,
    /// 1-indexed rank by points among players sharing this position label.
    pub rank_within_position: u32,
    /// `adp_rank - value_rank` among players with an ADP. Positive when the
    /// market is drafting the player later than their VORP warrants.
    pub value_vs_adp: Option<i32>,
    pub warning: Option<ScoreWarning>,
}

impl PlayerScore {
    pub fn player_id(&self) -> PlayerId {
        self.player.player_id
    }
}

/// Why a player cannot be scored normally, if anything.
pub fn scoring_warning(player: &Player) -> Option<ScoreWarning> {
    match player.position {
        None => Some(ScoreWarning::UnknownPosition {
            label: player.position_label.clone(),
        }),
        Some(_) if !player.stats_match_position() => Some(ScoreWarning::MismatchedStats {
            label: player.position_label.clone(),
        }),
        Some(_) => None,
    }
}

/// Score, baseline, and rank every player in `pool`.
///
/// Sorted by points descending, then VORP descending, then player id.
pub fn rank_players(
    pool: &[Player],
    rules: &ScoringRules,
    roster: &RosterRequirements,
    teams: u32,
) -> Result<Vec<PlayerScore>, EngineError> {
    let players: Vec<&Player> = pool.iter().collect();
    let (mut scores, _) = score_players(&players, rules, roster, teams)?;
    scores.sort_by(compare_by_points);
    Ok(scores)
}

pub(crate) fn compare_by_points(a: &PlayerScore, b: &PlayerScore) -> Ordering {
    b.points
        .total_cmp(&a.points)
        .then_with(|| b.vorp.total_cmp(&a.vorp))
        .then_with(|| a.player_id().cmp(&b.player_id()))
}

/// Score `players` against replacement levels computed from the same set.
/// Output order matches input order.
pub(crate) fn score_players(
    players: &[&Player],
    rules: &ScoringRules,
    roster: &RosterRequirements,
    teams: u32,
) -> Result<(Vec<PlayerScore>, ReplacementLevels), EngineError> {
    validate_teams(teams)?;
    rules.validate()?;

    let points: Vec<f64> = players.iter().map(|p| compute_points(p, rules)).collect();
    let by_position = points_by_position(players.iter().copied().zip(points.iter().copied()));
    let levels = replacement_levels_from_points(&by_position, roster, teams);

    let mut scores: Vec<PlayerScore> = players
        .iter()
        .zip(points)
        .map(|(&player, points)| {
            let warning = scoring_warning(player);
            if let Some(w) = &warning {
                warn!("player {} ({}): {}", player.player_id, player.name, w.message());
            }
            let vorp = match (player.position, &warning) {
                (Some(pos), None) => compute_vorp(points, pos, &levels),
                _ => 0.0,
            };
            PlayerScore {
                player: player.clone(),
                points,
                vorp,
                rank_within_position: 0,
                value_vs_adp: None,
                warning,
            }
        })
        .collect();

    assign_position_ranks(&mut scores);
    assign_value_vs_adp(&mut scores);

    debug!("scored {} players", scores.len());
    Ok((scores, levels))
}

fn assign_position_ranks(scores: &mut [PlayerScore]) {
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, score) in scores.iter().enumerate() {
        groups
            .entry(score.player.position_label.clone())
            .or_default()
            .push(i);
    }
    for mut indices in groups.into_values() {
        indices.sort_by(|&a, &b| compare_by_points(&scores[a], &scores[b]));
        for (rank, idx) in indices.into_iter().enumerate() {
            scores[idx].rank_within_position = rank as u32 + 1;
        }
    }
}

fn assign_value_vs_adp(scores: &mut [PlayerScore]) {
    let mut with_adp: Vec<(usize, f64)> = scores
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.player.adp.filter(|a| a.is_finite()).map(|adp| (i, adp)))
        .collect();

    // Market order: ADP ascending.
    with_adp.sort_by(|a, b| {
        a.1.total_cmp(&b.1)
            .then_with(|| scores[a.0].player_id().cmp(&scores[b.0].player_id()))
    });
    let adp_rank: HashMap<usize, i32> = with_adp
        .iter()
        .enumerate()
        .map(|(rank, &(idx, _))| (idx, rank as i32 + 1))
        .collect();

    // Value order: VORP descending, ties to the earlier ADP.
    let mut by_value = with_adp;
    by_value.sort_by(|a, b| {
        scores[b.0]
            .vorp
            .total_cmp(&scores[a.0].vorp)
            .then_with(|| a.1.total_cmp(&b.1))
            .then_with(|| scores[a.0].player_id().cmp(&scores[b.0].player_id()))
    });
    for (value_rank, &(idx, _)) in by_value.iter().enumerate() {
        if let Some(&market) = adp_rank.get(&idx) {
            scores[idx].value_vs_adp = Some(market - (value_rank as i32 + 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::OffenseStats;
    use crate::scoring::ScoringCategory;

    fn td_rules() -> ScoringRules {
        ScoringRules::empty().with_weight(ScoringCategory::RushTd, 1.0)
    }

    fn player(id: u64, pos: &str, points: f64) -> Player {
        Player::new(id, format!("P{id}"), pos).with_offense(OffenseStats {
            rushing_tds: points,
            ..Default::default()
        })
    }

    fn roster() -> RosterRequirements {
        RosterRequirements::from_counts([("QB", 1), ("RB", 1)]).unwrap()
    }

    #[test]
    fn ranks_by_points_then_vorp_then_id() {
        let pool = vec![
            player(3, "RB", 50.0),
            player(1, "QB", 80.0),
            player(2, "RB", 50.0),
            player(4, "QB", 20.0),
            player(5, "QB", 10.0),
            player(6, "RB", 5.0),
        ];
        let ranked = rank_players(&pool, &td_rules(), &roster(), 2).unwrap();
        let ids: Vec<u64> = ranked.iter().map(|s| s.player_id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn vorp_uses_replacement_level() {
        let pool = vec![
            player(1, "QB", 80.0),
            player(2, "QB", 60.0),
            player(3, "QB", 30.0),
            player(4, "QB", 10.0),
        ];
        let ranked = rank_players(&pool, &td_rules(), &roster(), 2).unwrap();
        // Two starting QBs; the third (30) is replacement.
        for score in &ranked {
            assert_eq!(score.vorp, score.points - 30.0);
        }
    }

    #[test]
    fn rank_within_position() {
        let pool = vec![
            player(1, "QB", 80.0),
            player(2, "RB", 70.0),
            player(3, "QB", 90.0),
            player(4, "RB", 75.0),
        ];
        let ranked = rank_players(&pool, &td_rules(), &roster(), 2).unwrap();
        let rank_of = |id| {
            ranked
                .iter()
                .find(|s| s.player_id() == id)
                .unwrap()
                .rank_within_position
        };
        assert_eq!(rank_of(3), 1);
        assert_eq!(rank_of(1), 2);
        assert_eq!(rank_of(4), 1);
        assert_eq!(rank_of(2), 2);
    }

    #[test]
    fn value_vs_adp_positive_for_market_bargains() {
        // VORP order: 1, 2, 3. ADP order: 2, 3, 1.
        let pool = vec![
            player(1, "RB", 90.0).with_adp(30.0),
            player(2, "RB", 60.0).with_adp(5.0),
            player(3, "RB", 40.0).with_adp(10.0),
            player(4, "RB", 0.0),
        ];
        let ranked = rank_players(&pool, &td_rules(), &roster(), 2).unwrap();
        let vva = |id| ranked.iter().find(|s| s.player_id() == id).unwrap().value_vs_adp;
        assert_eq!(vva(1), Some(2));
        assert_eq!(vva(2), Some(-1));
        assert_eq!(vva(3), Some(-1));
        assert_eq!(vva(4), None);
    }

    #[test]
    fn unknown_position_kept_with_warning() {
        let pool = vec![player(1, "RB", 50.0), player(2, "LB", 90.0)];
        let ranked = rank_players(&pool, &td_rules(), &roster(), 2).unwrap();
        let lb = ranked.iter().find(|s| s.player_id() == 2).unwrap();
        assert_eq!(lb.points, 0.0);
        assert_eq!(lb.vorp, 0.0);
        assert_eq!(
            lb.warning,
            Some(ScoreWarning::UnknownPosition {
                label: "LB".into()
            })
        );
        assert_eq!(lb.rank_within_position, 1);
    }

    #[test]
    fn invalid_configuration_rejected() {
        let pool = vec![player(1, "RB", 50.0)];
        assert!(rank_players(&pool, &td_rules(), &roster(), 1).is_err());

        let bad_rules = ScoringRules::empty().with_weight(ScoringCategory::Rec, f64::NAN);
        assert!(rank_players(&pool, &bad_rules, &roster(), 2).is_err());
    }

    #[test]
    fn empty_pool_ranks_nothing() {
        let ranked = rank_players(&[], &td_rules(), &roster(), 2).unwrap();
        assert!(ranked.is_empty());
    }
}
