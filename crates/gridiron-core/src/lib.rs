// Scoring and suggestion engine for live fantasy-football drafts.
//
// Everything in this crate is synchronous and free of I/O. Callers own the
// player pool, the rules, and the draft state; every operation recomputes
// from those inputs.

pub mod boundary;
pub mod draft;
pub mod error;
pub mod league;
pub mod player;
pub mod scoring;
pub mod suggest;
pub mod valuation;

pub use draft::needs::{remaining_needs, RosterNeeds};
pub use draft::order::{next_pick_for_slot, pick_owner, round_for_pick};
pub use draft::state::{DraftState, Pick, SELF_TEAM};
pub use error::{EngineError, ScoreWarning};
pub use league::{DraftContext, RosterRequirements};
pub use player::{DefenseStats, OffenseStats, Player, PlayerId, Position, StatLine};
pub use scoring::{compute_points, ScoringCategory, ScoringRules};
pub use suggest::{suggest, Factor, SuggestOptions, SuggestWeights, Suggestion};
pub use valuation::replacement::{compute_replacement_levels, compute_vorp, ReplacementLevels};
pub use valuation::scarcity::{compute_scarcity, ScarcityEntry, ScarcityUrgency};
pub use valuation::{rank_players, PlayerScore};
