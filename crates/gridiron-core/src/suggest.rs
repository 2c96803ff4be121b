// "Best pick now" suggestions.
//
// Every call rescores the undrafted pool from scratch, then blends VORP with
// roster need, value against ADP, and (optionally) the risk that a player is
// gone before the user picks again or shares a bye week with too many of the
// user's players. Kickers and defenses are held back until the gating round.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::draft::needs::{remaining_needs, RosterNeeds};
use crate::draft::order::next_pick_for_slot;
use crate::draft::state::DraftState;
use crate::error::EngineError;
use crate::league::{DraftContext, RosterRequirements};
use crate::player::{Player, PlayerId, Position};
use crate::scoring::ScoringRules;
use crate::valuation::scarcity::{compute_scarcity, scarcity_for, ScarcityEntry};
use crate::valuation::{score_players, PlayerScore};

/// Contributions smaller than this are treated as absent.
const NEGLIGIBLE: f64 = 1e-9;

const MAX_REASONS: usize = 3;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Weights applied to each non-VORP factor of the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestWeights {
    /// Points added when the player fills an open starting slot.
    pub need_weight: f64,
    /// Points per spot the player is falling past their ADP.
    pub value_weight: f64,
    /// Points added at full risk of losing the player before the user's
    /// pick after next.
    pub snake_risk_weight: f64,
    /// Multiplier on the bye-week conflict penalty.
    pub bye_weight: f64,
}

impl Default for SuggestWeights {
    fn default() -> Self {
        SuggestWeights {
            need_weight: 10.0,
            value_weight: 0.5,
            snake_risk_weight: 0.0,
            bye_weight: 0.0,
        }
    }
}

impl SuggestWeights {
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("suggest.need_weight", self.need_weight),
            ("suggest.value_weight", self.value_weight),
            ("suggest.snake_risk_weight", self.snake_risk_weight),
            ("suggest.bye_weight", self.bye_weight),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EngineError::invalid(
                    field,
                    format!("must be finite, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestOptions {
    /// Maximum suggestions to return; zero or negative returns all.
    pub count: i64,
    pub weights: SuggestWeights,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        SuggestOptions {
            count: 10,
            weights: SuggestWeights::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestion
// ---------------------------------------------------------------------------

/// A term of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Vorp,
    Need,
    AdpValue,
    SnakeRisk,
    ByeConflict,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::Vorp,
        Factor::Need,
        Factor::AdpValue,
        Factor::SnakeRisk,
        Factor::ByeConflict,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Vorp => "vorp",
            Factor::Need => "need",
            Factor::AdpValue => "adp_value",
            Factor::SnakeRisk => "snake_risk",
            Factor::ByeConflict => "bye_conflict",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub player_score: PlayerScore,
    /// Composite score; the sum of `components`.
    pub score: f64,
    /// Signed contribution of each factor.
    pub components: BTreeMap<Factor, f64>,
    /// Most significant factors first. Never empty.
    pub reasons: Vec<String>,
}

impl Suggestion {
    pub fn player(&self) -> &Player {
        &self.player_score.player
    }

    pub fn component(&self, factor: Factor) -> f64 {
        self.components.get(&factor).copied().unwrap_or(0.0)
    }

    /// Components keyed by factor name, as carried on the wire.
    pub fn components_by_name(&self) -> BTreeMap<String, f64> {
        self.components
            .iter()
            .map(|(factor, value)| (factor.name().to_string(), *value))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// The user's next two turns, used to judge whether a player will last.
#[derive(Debug, Clone, Copy)]
struct TurnWindow {
    next: u32,
    following: u32,
}

impl TurnWindow {
    fn for_context(context: &DraftContext, state: &DraftState) -> Self {
        let current = context.effective_pick(state);
        let next = next_pick_for_slot(current, context.pick_slot, context.teams, context.snake);
        let following = next_pick_for_slot(
            next.saturating_add(1),
            context.pick_slot,
            context.teams,
            context.snake,
        );
        TurnWindow { next, following }
    }

    /// 1.0 when the market expects the player to go before the user's pick
    /// after next, 0.5 within half a turn gap beyond it, otherwise 0.
    fn risk(&self, adp: Option<f64>) -> f64 {
        let Some(adp) = adp.filter(|a| a.is_finite()) else {
            return 0.0;
        };
        let following = f64::from(self.following);
        let half_gap = f64::from(self.following.saturating_sub(self.next)) / 2.0;
        if adp <= following {
            1.0
        } else if adp <= following + half_gap {
            0.5
        } else {
            0.0
        }
    }
}

/// Facts about the board shared by every candidate's reasons.
struct Board<'a> {
    needs: &'a RosterNeeds,
    scarcity: &'a [ScarcityEntry],
    best_at_position: &'a HashMap<Position, PlayerId>,
    window: TurnWindow,
    /// How many of the user's players sit out each bye week.
    my_byes: &'a HashMap<u8, u32>,
}

/// Penalty for adding a player whose bye week already idles `overlap` of
/// the user's players: 1.5 at two, 3.0 at three or more.
fn bye_conflict_penalty(overlap: u32) -> f64 {
    match overlap {
        0 | 1 => 0.0,
        2 => 1.5,
        _ => 3.0,
    }
}

impl Board<'_> {
    fn bye_overlap(&self, player: &Player) -> u32 {
        player
            .bye_week
            .and_then(|week| self.my_byes.get(&week).copied())
            .unwrap_or(0)
    }
}

/// Ranked suggestions for the user's next pick.
///
/// Deterministic: sorted by composite score descending, then ADP ascending
/// (missing ADP last), then player id. Returns an empty list when nothing
/// is left to draft.
pub fn suggest(
    pool: &[Player],
    rules: &ScoringRules,
    roster: &RosterRequirements,
    draft_state: &DraftState,
    context: &DraftContext,
    options: &SuggestOptions,
) -> Result<Vec<Suggestion>, EngineError> {
    context.validate()?;
    rules.validate()?;
    options.weights.validate()?;

    let drafted = draft_state.drafted_ids();
    let remaining: Vec<&Player> = pool
        .iter()
        .filter(|p| !drafted.contains(&p.player_id))
        .collect();
    if remaining.is_empty() {
        debug!("no undrafted players; nothing to suggest");
        return Ok(Vec::new());
    }

    let (scores, _) = score_players(&remaining, rules, roster, context.teams)?;

    let by_id: HashMap<PlayerId, &Player> = pool.iter().map(|p| (p.player_id, p)).collect();
    let my_players = draft_state
        .my_picks()
        .filter_map(|pick| by_id.get(&pick.player_id).copied())
        .collect::<Vec<_>>();
    let mut my_byes: HashMap<u8, u32> = HashMap::new();
    for week in my_players.iter().filter_map(|p| p.bye_week) {
        *my_byes.entry(week).or_default() += 1;
    }
    let needs = remaining_needs(my_players, roster);

    let round = context.effective_round(draft_state);
    let gate_closed = round < context.kdst_gate_round;

    let scarcity = compute_scarcity(&scores);
    let best_at_position = best_at_position(&scores);
    let board = Board {
        needs: &needs,
        scarcity: &scarcity,
        best_at_position: &best_at_position,
        window: TurnWindow::for_context(context, draft_state),
        my_byes: &my_byes,
    };

    let mut suggestions: Vec<Suggestion> = scores
        .into_iter()
        .filter(|s| {
            !(gate_closed
                && s.player
                    .position
                    .is_some_and(|pos| pos.is_late_round_only()))
        })
        .map(|s| build_suggestion(s, &board, &options.weights))
        .collect();

    suggestions.sort_by(compare_suggestions);
    if options.count > 0 {
        suggestions.truncate(usize::try_from(options.count).unwrap_or(usize::MAX));
    }

    debug!(
        "round {}: {} suggestions (K/DST gate {})",
        round,
        suggestions.len(),
        if gate_closed { "closed" } else { "open" }
    );
    Ok(suggestions)
}

fn best_at_position(scores: &[PlayerScore]) -> HashMap<Position, PlayerId> {
    let mut best: HashMap<Position, &PlayerScore> = HashMap::new();
    for score in scores.iter().filter(|s| s.warning.is_none()) {
        let Some(pos) = score.player.position else {
            continue;
        };
        let replace = best.get(&pos).map_or(true, |current| {
            score
                .vorp
                .total_cmp(&current.vorp)
                .then_with(|| current.player_id().cmp(&score.player_id()))
                == Ordering::Greater
        });
        if replace {
            best.insert(pos, score);
        }
    }
    best.into_iter()
        .map(|(pos, score)| (pos, score.player_id()))
        .collect()
}

fn build_suggestion(score: PlayerScore, board: &Board<'_>, weights: &SuggestWeights) -> Suggestion {
    let position = score.player.position.filter(|_| score.warning.is_none());

    let need = match position {
        Some(pos) if board.needs.needs(pos) => weights.need_weight,
        _ => 0.0,
    };
    let adp_value =
        weights.value_weight * f64::from(score.value_vs_adp.unwrap_or(0).max(0));
    let snake_risk = weights.snake_risk_weight * board.window.risk(score.player.adp);
    let bye_conflict =
        0.0 - weights.bye_weight * bye_conflict_penalty(board.bye_overlap(&score.player));

    let components: BTreeMap<Factor, f64> = [
        (Factor::Vorp, score.vorp),
        (Factor::Need, need),
        (Factor::AdpValue, adp_value),
        (Factor::SnakeRisk, snake_risk),
        (Factor::ByeConflict, bye_conflict),
    ]
    .into_iter()
    .collect();
    let composite: f64 = components.values().sum();
    let reasons = reasons_for(&score, &components, board);

    Suggestion {
        player_score: score,
        score: composite,
        components,
        reasons,
    }
}

fn compare_suggestions(a: &Suggestion, b: &Suggestion) -> Ordering {
    let adp_key = |s: &Suggestion| {
        s.player()
            .adp
            .filter(|adp| adp.is_finite())
            .unwrap_or(f64::INFINITY)
    };
    b.score
        .total_cmp(&a.score)
        .then_with(|| adp_key(a).total_cmp(&adp_key(b)))
        .then_with(|| a.player().player_id.cmp(&b.player().player_id))
}

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

fn reasons_for(
    score: &PlayerScore,
    components: &BTreeMap<Factor, f64>,
    board: &Board<'_>,
) -> Vec<String> {
    let mut significant: Vec<(Factor, f64)> = components
        .iter()
        .filter(|(_, value)| value.abs() > NEGLIGIBLE)
        .map(|(factor, value)| (*factor, *value))
        .collect();
    // Stable sort keeps factor order for equal magnitudes.
    significant.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));

    let reasons: Vec<String> = significant
        .into_iter()
        .take(MAX_REASONS)
        .map(|(factor, _)| describe(factor, score, board))
        .collect();

    if reasons.is_empty() {
        vec![format!("Replacement-level {}", score.player.position_label)]
    } else {
        reasons
    }
}

fn describe(factor: Factor, score: &PlayerScore, board: &Board<'_>) -> String {
    let label = &score.player.position_label;
    match factor {
        Factor::Vorp => {
            let position = score.player.position;
            let is_best = position
                .and_then(|pos| board.best_at_position.get(&pos))
                .is_some_and(|&id| id == score.player_id());
            let pressing = position
                .and_then(|pos| scarcity_for(board.scarcity, pos))
                .filter(|entry| entry.urgency.is_pressing());

            if score.vorp < 0.0 {
                format!("Below {label} replacement ({:+.1})", score.vorp)
            } else if is_best {
                format!("Best {label} available (VORP {:+.1})", score.vorp)
            } else if let Some(entry) = pressing {
                format!(
                    "{label} thinning: {} left above replacement",
                    entry.players_above_replacement
                )
            } else {
                format!("VORP {:+.1} over replacement {label}", score.vorp)
            }
        }
        Factor::Need => match score.player.position {
            Some(pos) if board.needs.fills_flex_only(pos) => "Fills open FLEX".to_string(),
            _ => format!("Fills open {label} starter"),
        },
        Factor::AdpValue => format!(
            "Falling past ADP ({} spots)",
            score.value_vs_adp.unwrap_or(0)
        ),
        Factor::SnakeRisk => format!(
            "Unlikely to last to pick {}",
            board.window.following
        ),
        Factor::ByeConflict => format!(
            "Bye week {} overlaps {} of your players",
            score.player.bye_week.unwrap_or(0),
            board.bye_overlap(&score.player)
        ),
    }
}
