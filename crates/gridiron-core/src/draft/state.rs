// Draft pick log.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use crate::error::EngineError;
use crate::player::PlayerId;

/// Team index of the user's own team. Opponents use 1 and up.
pub const SELF_TEAM: u32 = 0;

/// A single selection in the draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pick {
    pub player_id: PlayerId,
    pub team_index: u32,
}

impl Pick {
    pub fn is_mine(&self) -> bool {
        self.team_index == SELF_TEAM
    }
}

/// Ordered log of picks. A player appears at most once.
///
/// The current overall pick is always `picks.len() + 1`: it starts at 1,
/// advances on every recorded pick, and steps back on undo.
///
/// Serialized as the bare pick list; deserializing replays the picks and
/// rejects a list that drafts the same player twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Pick>", into = "Vec<Pick>")]
pub struct DraftState {
    picks: Vec<Pick>,
}

impl DraftState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state by replaying `picks` in order.
    pub fn restore_from_picks<I>(picks: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = Pick>,
    {
        let mut state = DraftState::new();
        for pick in picks {
            state.record_pick(pick.player_id, pick.team_index)?;
        }
        Ok(state)
    }

    /// Append a pick. Fails with `AlreadyDrafted` (state untouched) if the
    /// player has been taken.
    pub fn record_pick(&mut self, player_id: PlayerId, team_index: u32) -> Result<(), EngineError> {
        if let Some(existing) = self.drafted_by(player_id) {
            warn!(
                "rejecting pick of player {} by team {}: already drafted by team {}",
                player_id, team_index, existing
            );
            return Err(EngineError::AlreadyDrafted {
                player_id,
                team_index: existing,
            });
        }
        self.picks.push(Pick {
            player_id,
            team_index,
        });
        debug!(
            "pick {} recorded: player {} to team {}",
            self.picks.len(),
            player_id,
            team_index
        );
        Ok(())
    }

    /// Remove and return the most recent pick. No-op on an empty log.
    pub fn undo_last(&mut self) -> Option<Pick> {
        let pick = self.picks.pop();
        if let Some(p) = &pick {
            info!("undid pick {}: player {}", self.picks.len() + 1, p.player_id);
        }
        pick
    }

    pub fn clear(&mut self) {
        info!("clearing draft state ({} picks)", self.picks.len());
        self.picks.clear();
    }

    pub fn current_pick_overall(&self) -> u32 {
        u32::try_from(self.picks.len()).map_or(u32::MAX, |n| n.saturating_add(1))
    }

    pub fn picks(&self) -> &[Pick] {
        &self.picks
    }

    pub fn len(&self) -> usize {
        self.picks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    pub fn last_pick(&self) -> Option<&Pick> {
        self.picks.last()
    }

    pub fn is_drafted(&self, player_id: PlayerId) -> bool {
        self.drafted_by(player_id).is_some()
    }

    /// The team that drafted `player_id`, if anyone has.
    pub fn drafted_by(&self, player_id: PlayerId) -> Option<u32> {
        self.picks
            .iter()
            .find(|p| p.player_id == player_id)
            .map(|p| p.team_index)
    }

    pub fn drafted_ids(&self) -> HashSet<PlayerId> {
        self.picks.iter().map(|p| p.player_id).collect()
    }

    pub fn picks_for_team(&self, team_index: u32) -> impl Iterator<Item = &Pick> + '_ {
        self.picks.iter().filter(move |p| p.team_index == team_index)
    }

    pub fn my_picks(&self) -> impl Iterator<Item = &Pick> + '_ {
        self.picks_for_team(SELF_TEAM)
    }
}

impl TryFrom<Vec<Pick>> for DraftState {
    type Error = EngineError;

    fn try_from(picks: Vec<Pick>) -> Result<Self, Self::Error> {
        DraftState::restore_from_picks(picks)
    }
}

impl From<DraftState> for Vec<Pick> {
    fn from(state: DraftState) -> Self {
        state.picks
    }
}
