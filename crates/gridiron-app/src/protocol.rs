// JSON messages exchanged with the draft client over the WebSocket.
//
// Every message is an object tagged by `type`. Each request gets exactly one
// response.

use serde::{Deserialize, Serialize};

use gridiron_core::boundary::{PayloadShape, SuggestionPayload};
use gridiron_core::{
    EngineError, Pick, PlayerId, PlayerScore, Position, RosterNeeds, ScarcityEntry,
};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request from the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientRequest {
    /// Record a pick. Without `team_index` the pick goes to the team on the
    /// clock.
    RecordPick {
        player_id: PlayerId,
        #[serde(default)]
        team_index: Option<u32>,
    },
    UndoLast,
    Clear,
    Suggest {
        #[serde(default)]
        count: Option<i64>,
        #[serde(default)]
        shape: PayloadShape,
    },
    RankPlayers {
        #[serde(default)]
        position: Option<String>,
    },
    ReplacementLevels,
    RemainingNeeds {
        #[serde(default)]
        team_index: u32,
    },
    Scarcity,
    DraftStatus,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Where the draft stands.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftStatus {
    pub draft_id: String,
    pub picks: Vec<Pick>,
    pub current_pick_overall: u32,
    pub round: u32,
    /// Slot (1..=teams) on the clock.
    pub on_the_clock: u32,
    pub is_user_turn: bool,
    /// Picks by other teams before the user is on the clock again.
    pub picks_until_user_turn: u32,
    pub draft_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplacementLevelEntry {
    pub position: Position,
    pub level: f64,
    /// League-wide starters at this position, FLEX share included.
    pub starters: u32,
}

/// Error categories reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    AlreadyDrafted,
    InvalidConfiguration,
    UnknownPlayer,
    BadRequest,
    Storage,
}

impl From<&EngineError> for ErrorKind {
    fn from(err: &EngineError) -> Self {
        match err {
            EngineError::AlreadyDrafted { .. } => ErrorKind::AlreadyDrafted,
            EngineError::InvalidConfiguration { .. } => ErrorKind::InvalidConfiguration,
        }
    }
}

/// A response to the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerResponse {
    DraftState(DraftStatus),
    Suggestions {
        suggestions: Vec<SuggestionPayload>,
    },
    Rankings {
        players: Vec<PlayerScore>,
    },
    ReplacementLevels {
        levels: Vec<ReplacementLevelEntry>,
    },
    RemainingNeeds {
        team_index: u32,
        needs: RosterNeeds,
    },
    Scarcity {
        entries: Vec<ScarcityEntry>,
    },
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ServerResponse {
    pub fn error(kind: ErrorKind, message: impl Into<String>) -> Self {
        ServerResponse::Error {
            kind,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ServerResponse {
    fn from(err: EngineError) -> Self {
        ServerResponse::error(ErrorKind::from(&err), err.to_string())
    }
}
