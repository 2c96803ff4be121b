// Positional scarcity among the players still on the board.
//
// For each position, counts how many available players remain above
// replacement and how steeply value drops after the top option.

use serde::Serialize;

use crate::player::Position;
use crate::valuation::PlayerScore;

// ---------------------------------------------------------------------------
// Scarcity urgency levels
// ---------------------------------------------------------------------------

/// How urgently a position needs to be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScarcityUrgency {
    /// 0-2 players above replacement: act now or miss out.
    Critical,
    /// 3-5 players above replacement: should address soon.
    High,
    /// 6-10 players above replacement: comfortable window.
    Medium,
    /// 11+ players above replacement: no rush.
    Low,
}

impl ScarcityUrgency {
    /// Determine urgency from the count of players above replacement.
    pub fn from_count(players_above_replacement: usize) -> Self {
        match players_above_replacement {
            0..=2 => ScarcityUrgency::Critical,
            3..=5 => ScarcityUrgency::High,
            6..=10 => ScarcityUrgency::Medium,
            _ => ScarcityUrgency::Low,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScarcityUrgency::Critical => "CRITICAL",
            ScarcityUrgency::High => "HIGH",
            ScarcityUrgency::Medium => "MEDIUM",
            ScarcityUrgency::Low => "LOW",
        }
    }

    /// Critical and High mean the position is thinning out.
    pub fn is_pressing(&self) -> bool {
        matches!(self, ScarcityUrgency::Critical | ScarcityUrgency::High)
    }
}

// ---------------------------------------------------------------------------
// Scarcity entry
// ---------------------------------------------------------------------------

/// Scarcity analysis for a single position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScarcityEntry {
    pub position: Position,
    /// Available players at this position with positive VORP.
    pub players_above_replacement: usize,
    /// VORP of the top available player at this position.
    pub top_available_vorp: f64,
    /// VORP of the 3rd-best available player above replacement, or the
    /// worst of them when fewer than 3 remain (0.0 when none do).
    pub third_best_vorp: f64,
    /// Difference between top and 3rd-best VORP.
    pub dropoff: f64,
    pub urgency: ScarcityUrgency,
}

/// Compute scarcity for every playing position, most urgent first.
///
/// Ties in urgency are broken by steeper dropoff, then position order.
pub fn compute_scarcity(available: &[PlayerScore]) -> Vec<ScarcityEntry> {
    let mut entries: Vec<ScarcityEntry> = Position::PLAYING
        .iter()
        .map(|&pos| {
            let mut above: Vec<f64> = available
                .iter()
                .filter(|s| s.player.position == Some(pos) && s.vorp > 0.0)
                .map(|s| s.vorp)
                .collect();
            above.sort_by(|a, b| b.total_cmp(a));

            let top_available_vorp = above.first().copied().unwrap_or(0.0);
            let third_best_vorp = above
                .get(2)
                .or_else(|| above.last())
                .copied()
                .unwrap_or(0.0);

            ScarcityEntry {
                position: pos,
                players_above_replacement: above.len(),
                top_available_vorp,
                third_best_vorp,
                dropoff: top_available_vorp - third_best_vorp,
                urgency: ScarcityUrgency::from_count(above.len()),
            }
        })
        .collect();

    entries.sort_by(|a, b| {
        a.urgency
            .cmp(&b.urgency)
            .then_with(|| b.dropoff.total_cmp(&a.dropoff))
            .then_with(|| a.position.cmp(&b.position))
    });
    entries
}

/// Look up the entry for `position`.
pub fn scarcity_for(entries: &[ScarcityEntry], position: Position) -> Option<&ScarcityEntry> {
    entries.iter().find(|e| e.position == position)
}
