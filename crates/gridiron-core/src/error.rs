// Engine error and warning types.

use serde::Serialize;
use thiserror::Error;

use crate::player::PlayerId;

/// Errors returned by engine operations.
///
/// `AlreadyDrafted` is recoverable: the caller may pick someone else.
/// `InvalidConfiguration` aborts the operation before any work is done.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("player {player_id} was already drafted by team {team_index}")]
    AlreadyDrafted { player_id: PlayerId, team_index: u32 },

    #[error("invalid configuration for `{field}`: {message}")]
    InvalidConfiguration { field: String, message: String },
}

impl EngineError {
    pub(crate) fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::InvalidConfiguration {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Non-fatal conditions attached to a scored player. The player still
/// appears in rankings, scored as 0 points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreWarning {
    /// The position label did not normalize to QB/RB/WR/TE/K/DST.
    UnknownPosition { label: String },
    /// The stat projection shape does not belong to the player's position
    /// (e.g. defensive stats on a running back).
    MismatchedStats { label: String },
}

impl ScoreWarning {
    pub fn message(&self) -> String {
        match self {
            ScoreWarning::UnknownPosition { label } => {
                format!("unrecognized position `{label}`; scored as 0")
            }
            ScoreWarning::MismatchedStats { label } => {
                format!("stat projection does not match position `{label}`; scored as 0")
            }
        }
    }
}
