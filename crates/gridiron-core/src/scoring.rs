// Fantasy point computation from season projections.
//
// Offensive players score a weighted sum of their counting stats. Kickers add
// field goal and extra point terms. Defenses score linear terms plus a single
// points-allowed bucket.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::EngineError;
use crate::player::{DefenseStats, OffenseStats, Player, Position, StatLine};

// ---------------------------------------------------------------------------
// Scoring categories
// ---------------------------------------------------------------------------

/// Every weight a scoring system may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoringCategory {
    PassYd,
    PassTd,
    PassInt,
    RushYd,
    RushTd,
    Rec,
    RecYd,
    RecTd,
    FumLost,
    TwoPt,
    KickFg,
    KickXp,
    DstSack,
    DstInt,
    DstFumbleRecovery,
    DstSafety,
    DstTd,
    DstReturnTd,
    DstPa0,
    DstPa1To6,
    DstPa7To13,
    DstPa14To20,
    DstPa21To27,
    DstPa28To34,
    DstPa35Plus,
}

impl ScoringCategory {
    pub const ALL: [ScoringCategory; 25] = [
        ScoringCategory::PassYd,
        ScoringCategory::PassTd,
        ScoringCategory::PassInt,
        ScoringCategory::RushYd,
        ScoringCategory::RushTd,
        ScoringCategory::Rec,
        ScoringCategory::RecYd,
        ScoringCategory::RecTd,
        ScoringCategory::FumLost,
        ScoringCategory::TwoPt,
        ScoringCategory::KickFg,
        ScoringCategory::KickXp,
        ScoringCategory::DstSack,
        ScoringCategory::DstInt,
        ScoringCategory::DstFumbleRecovery,
        ScoringCategory::DstSafety,
        ScoringCategory::DstTd,
        ScoringCategory::DstReturnTd,
        ScoringCategory::DstPa0,
        ScoringCategory::DstPa1To6,
        ScoringCategory::DstPa7To13,
        ScoringCategory::DstPa14To20,
        ScoringCategory::DstPa21To27,
        ScoringCategory::DstPa28To34,
        ScoringCategory::DstPa35Plus,
    ];

    /// The key used for this category in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            ScoringCategory::PassYd => "pass_yd",
            ScoringCategory::PassTd => "pass_td",
            ScoringCategory::PassInt => "pass_int",
            ScoringCategory::RushYd => "rush_yd",
            ScoringCategory::RushTd => "rush_td",
            ScoringCategory::Rec => "rec",
            ScoringCategory::RecYd => "rec_yd",
            ScoringCategory::RecTd => "rec_td",
            ScoringCategory::FumLost => "fum_lost",
            ScoringCategory::TwoPt => "two_pt",
            ScoringCategory::KickFg => "k_fg",
            ScoringCategory::KickXp => "k_xp",
            ScoringCategory::DstSack => "dst_sack",
            ScoringCategory::DstInt => "dst_int",
            ScoringCategory::DstFumbleRecovery => "dst_fr",
            ScoringCategory::DstSafety => "dst_safety",
            ScoringCategory::DstTd => "dst_td",
            ScoringCategory::DstReturnTd => "dst_ret_td",
            ScoringCategory::DstPa0 => "dst_pa_0",
            ScoringCategory::DstPa1To6 => "dst_pa_1_6",
            ScoringCategory::DstPa7To13 => "dst_pa_7_13",
            ScoringCategory::DstPa14To20 => "dst_pa_14_20",
            ScoringCategory::DstPa21To27 => "dst_pa_21_27",
            ScoringCategory::DstPa28To34 => "dst_pa_28_34",
            ScoringCategory::DstPa35Plus => "dst_pa_35p",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// Points-allowed buckets as (inclusive upper bound, category), ascending.
const POINTS_ALLOWED_BUCKETS: [(f64, ScoringCategory); 7] = [
    (0.0, ScoringCategory::DstPa0),
    (6.0, ScoringCategory::DstPa1To6),
    (13.0, ScoringCategory::DstPa7To13),
    (20.0, ScoringCategory::DstPa14To20),
    (27.0, ScoringCategory::DstPa21To27),
    (34.0, ScoringCategory::DstPa28To34),
    (f64::INFINITY, ScoringCategory::DstPa35Plus),
];

/// The bucket with the smallest upper bound that is >= `points_allowed`.
pub fn points_allowed_bucket(points_allowed: f64) -> ScoringCategory {
    POINTS_ALLOWED_BUCKETS
        .iter()
        .find(|(upper, _)| points_allowed <= *upper)
        .map(|&(_, category)| category)
        .unwrap_or(ScoringCategory::DstPa35Plus)
}

// ---------------------------------------------------------------------------
// Scoring rules
// ---------------------------------------------------------------------------

/// Category weights. Categories that are not set weigh 0.
///
/// Serialized as a flat `name -> weight` table, e.g. `rec = 0.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, f64>",
    into = "BTreeMap<String, f64>"
)]
pub struct ScoringRules {
    weights: BTreeMap<ScoringCategory, f64>,
}

impl ScoringRules {
    /// A rule set with every weight at 0.
    pub fn empty() -> Self {
        ScoringRules {
            weights: BTreeMap::new(),
        }
    }

    /// Half-PPR defaults.
    pub fn half_ppr() -> Self {
        use ScoringCategory::*;
        let defaults = [
            (PassYd, 0.04),
            (PassTd, 4.0),
            (PassInt, -2.0),
            (RushYd, 0.1),
            (RushTd, 6.0),
            (Rec, 0.5),
            (RecYd, 0.1),
            (RecTd, 6.0),
            (FumLost, -2.0),
            (TwoPt, 2.0),
            (KickFg, 3.0),
            (KickXp, 1.0),
            (DstSack, 1.0),
            (DstInt, 2.0),
            (DstFumbleRecovery, 2.0),
            (DstSafety, 2.0),
            (DstTd, 6.0),
            (DstReturnTd, 6.0),
            (DstPa0, 10.0),
            (DstPa1To6, 7.0),
            (DstPa7To13, 4.0),
            (DstPa14To20, 1.0),
            (DstPa21To27, 0.0),
            (DstPa28To34, -1.0),
            (DstPa35Plus, -4.0),
        ];
        ScoringRules {
            weights: defaults.into_iter().collect(),
        }
    }

    /// Build rules from `(category name, weight)` pairs. Unknown names and
    /// non-finite weights are rejected.
    pub fn from_named<I, S>(pairs: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let mut weights = BTreeMap::new();
        for (name, weight) in pairs {
            let name = name.as_ref();
            let category = ScoringCategory::from_name(name).ok_or_else(|| {
                EngineError::invalid(
                    format!("scoring.{name}"),
                    "unknown scoring category",
                )
            })?;
            weights.insert(category, weight);
        }
        let rules = ScoringRules { weights };
        rules.validate()?;
        Ok(rules)
    }

    pub fn weight(&self, category: ScoringCategory) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }

    pub fn with_weight(mut self, category: ScoringCategory, weight: f64) -> Self {
        self.weights.insert(category, weight);
        self
    }

    /// Every weight must be a finite number.
    pub fn validate(&self) -> Result<(), EngineError> {
        for (category, weight) in &self.weights {
            if !weight.is_finite() {
                return Err(EngineError::invalid(
                    format!("scoring.{}", category.name()),
                    format!("weight must be finite, got {weight}"),
                ));
            }
        }
        Ok(())
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::half_ppr()
    }
}

impl TryFrom<BTreeMap<String, f64>> for ScoringRules {
    type Error = EngineError;

    fn try_from(raw: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        ScoringRules::from_named(raw)
    }
}

impl From<ScoringRules> for BTreeMap<String, f64> {
    fn from(rules: ScoringRules) -> Self {
        rules
            .weights
            .into_iter()
            .map(|(category, weight)| (category.name().to_string(), weight))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Point computation
// ---------------------------------------------------------------------------

/// Season fantasy points for `player` under `rules`.
///
/// Total: unrecognized positions and projections whose shape contradicts
/// the position score 0 rather than failing.
pub fn compute_points(player: &Player, rules: &ScoringRules) -> f64 {
    let Some(position) = player.position else {
        debug!(
            "player {} has unrecognized position {:?}; scoring 0",
            player.player_id, player.position_label
        );
        return 0.0;
    };

    match (&player.stats, position) {
        (StatLine::Defense(stats), Position::Defense) => defense_points(stats, rules),
        (StatLine::Offense(stats), Position::Kicker) => {
            kicking_points(stats, rules) + offense_points(stats, rules)
        }
        (StatLine::Offense(stats), pos) if pos != Position::Defense && !pos.is_meta_slot() => {
            offense_points(stats, rules)
        }
        _ => {
            debug!(
                "player {} projection shape does not match {}; scoring 0",
                player.player_id, position
            );
            0.0
        }
    }
}

fn offense_points(s: &OffenseStats, rules: &ScoringRules) -> f64 {
    use ScoringCategory::*;
    rules.weight(PassYd) * s.passing_yards
        + rules.weight(PassTd) * s.passing_tds
        + rules.weight(PassInt) * s.interceptions
        + rules.weight(RushYd) * s.rushing_yards
        + rules.weight(RushTd) * s.rushing_tds
        + rules.weight(Rec) * s.receptions
        + rules.weight(RecYd) * s.receiving_yards
        + rules.weight(RecTd) * s.receiving_tds
        + rules.weight(FumLost) * s.fumbles_lost
        + rules.weight(TwoPt) * s.two_point_conversions
}

fn kicking_points(s: &OffenseStats, rules: &ScoringRules) -> f64 {
    rules.weight(ScoringCategory::KickFg) * s.field_goals_made
        + rules.weight(ScoringCategory::KickXp) * s.extra_points_made
}

fn defense_points(s: &DefenseStats, rules: &ScoringRules) -> f64 {
    use ScoringCategory::*;
    rules.weight(DstSack) * s.sacks
        + rules.weight(DstInt) * s.interceptions
        + rules.weight(DstFumbleRecovery) * s.fumble_recoveries
        + rules.weight(DstSafety) * s.safeties
        + rules.weight(DstTd) * s.defensive_tds
        + rules.weight(DstReturnTd) * s.return_tds
        + rules.weight(points_allowed_bucket(s.points_allowed))
}
