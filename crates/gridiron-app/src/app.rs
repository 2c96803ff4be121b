// Application state and orchestration logic.
//
// The event loop owns the draft state. Every request from the WebSocket is
// handled here, one at a time, and answered with exactly one response.
// Picks are written through to SQLite; a failed write rolls the in-memory
// change back.

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use gridiron_core::boundary::{PayloadShape, SuggestionPayload};
use gridiron_core::draft::order::picks_until;
use gridiron_core::{
    compute_replacement_levels, compute_scarcity, pick_owner, rank_players, remaining_needs,
    round_for_pick, suggest, DraftState, Player, PlayerId, Position, SuggestOptions, SELF_TEAM,
};

use crate::config::Config;
use crate::db::Database;
use crate::protocol::{
    ClientRequest, DraftStatus, ErrorKind, ReplacementLevelEntry, ServerResponse,
};
use crate::ws_server::WsEvent;

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    /// The full player pool, drafted players included.
    pub players: Vec<Player>,
    pub draft_state: DraftState,
    pub db: Database,
    /// Picks are stored under this ID so a restart only replays its own draft.
    pub draft_id: String,
}

impl AppState {
    pub fn new(config: Config, players: Vec<Player>, db: Database, draft_id: String) -> Self {
        AppState {
            config,
            players,
            draft_state: DraftState::new(),
            db,
            draft_id,
        }
    }

    fn find_player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Players not yet drafted, in pool order.
    pub fn available_players(&self) -> Vec<Player> {
        self.players
            .iter()
            .filter(|p| !self.draft_state.is_drafted(p.player_id))
            .cloned()
            .collect()
    }

    /// Team index of the slot on the clock: the user's slot maps to
    /// `SELF_TEAM`, every other slot to its own number.
    fn team_index_for_slot(&self, slot: u32) -> u32 {
        if slot == self.config.league.context.pick_slot {
            SELF_TEAM
        } else {
            slot
        }
    }

    /// Check a client-supplied team index against the league size.
    fn resolve_team_index(&self, team_index: u32) -> Result<u32, ServerResponse> {
        let teams = self.config.league.teams();
        if team_index > teams {
            return Err(ServerResponse::error(
                ErrorKind::BadRequest,
                format!("team_index must be between 0 and {teams}, got {team_index}"),
            ));
        }
        Ok(self.team_index_for_slot(team_index))
    }

    /// Every team has made all of its picks.
    pub fn draft_complete(&self) -> bool {
        let ctx = &self.config.league.context;
        self.draft_state.current_pick_overall() > ctx.teams.saturating_mul(ctx.total_rounds)
    }

    pub fn draft_status(&self) -> DraftStatus {
        let ctx = &self.config.league.context;
        let current = self.draft_state.current_pick_overall();
        let on_the_clock = pick_owner(current, ctx.teams, ctx.snake);
        DraftStatus {
            draft_id: self.draft_id.clone(),
            picks: self.draft_state.picks().to_vec(),
            current_pick_overall: current,
            round: round_for_pick(current, ctx.teams),
            on_the_clock,
            is_user_turn: on_the_clock == ctx.pick_slot,
            picks_until_user_turn: picks_until(current, ctx.pick_slot, ctx.teams, ctx.snake),
            draft_complete: self.draft_complete(),
        }
    }

    /// Handle one request and build its response.
    pub fn handle_request(&mut self, request: ClientRequest) -> ServerResponse {
        debug!("handling request: {:?}", request);
        match request {
            ClientRequest::RecordPick {
                player_id,
                team_index,
            } => self.record_pick(player_id, team_index),
            ClientRequest::UndoLast => self.undo_last(),
            ClientRequest::Clear => self.clear(),
            ClientRequest::Suggest { count, shape } => self.suggestions(count, shape),
            ClientRequest::RankPlayers { position } => self.rankings(position.as_deref()),
            ClientRequest::ReplacementLevels => self.replacement_levels(),
            ClientRequest::RemainingNeeds { team_index } => self.remaining_needs(team_index),
            ClientRequest::Scarcity => self.scarcity(),
            ClientRequest::DraftStatus => ServerResponse::DraftState(self.draft_status()),
        }
    }

    // -- Draft mutations --

    fn record_pick(&mut self, player_id: PlayerId, team_index: Option<u32>) -> ServerResponse {
        if self.draft_complete() {
            let ctx = &self.config.league.context;
            return ServerResponse::error(
                ErrorKind::BadRequest,
                format!(
                    "draft is complete after {} picks",
                    ctx.teams.saturating_mul(ctx.total_rounds)
                ),
            );
        }
        if self.find_player(player_id).is_none() {
            return ServerResponse::error(
                ErrorKind::UnknownPlayer,
                format!("no player with id {player_id} in the pool"),
            );
        }

        let team_index = match team_index {
            Some(index) => match self.resolve_team_index(index) {
                Ok(index) => index,
                Err(response) => return response,
            },
            None => {
                let ctx = &self.config.league.context;
                let slot = pick_owner(self.draft_state.current_pick_overall(), ctx.teams, ctx.snake);
                self.team_index_for_slot(slot)
            }
        };

        if let Err(e) = self.draft_state.record_pick(player_id, team_index) {
            return e.into();
        }

        let seq = self.draft_state.len();
        let Some(&pick) = self.draft_state.last_pick() else {
            return ServerResponse::error(ErrorKind::Storage, "pick was not recorded");
        };
        if let Err(e) = self.db.record_pick(&self.draft_id, seq, &pick) {
            warn!("failed to persist pick {seq}, rolling back: {e:#}");
            self.draft_state.undo_last();
            return ServerResponse::error(ErrorKind::Storage, format!("{e:#}"));
        }

        info!(
            "pick {}: player {} to team {}",
            seq, pick.player_id, pick.team_index
        );
        ServerResponse::DraftState(self.draft_status())
    }

    fn undo_last(&mut self) -> ServerResponse {
        let Some(undone) = self.draft_state.undo_last() else {
            return ServerResponse::DraftState(self.draft_status());
        };

        if let Err(e) = self.db.remove_last_pick(&self.draft_id) {
            warn!("failed to persist undo, restoring pick: {e:#}");
            if let Err(restore) = self
                .draft_state
                .record_pick(undone.player_id, undone.team_index)
            {
                warn!("failed to restore undone pick: {restore}");
            }
            return ServerResponse::error(ErrorKind::Storage, format!("{e:#}"));
        }

        info!("undid pick of player {}", undone.player_id);
        ServerResponse::DraftState(self.draft_status())
    }

    fn clear(&mut self) -> ServerResponse {
        if let Err(e) = self.db.clear_draft(&self.draft_id) {
            warn!("failed to clear draft in database: {e:#}");
            return ServerResponse::error(ErrorKind::Storage, format!("{e:#}"));
        }
        self.draft_state.clear();
        info!("draft {} cleared", self.draft_id);
        ServerResponse::DraftState(self.draft_status())
    }

    // -- Queries --

    fn suggestions(&self, count: Option<i64>, shape: PayloadShape) -> ServerResponse {
        let options = SuggestOptions {
            count: count.unwrap_or(self.config.suggest.count),
            weights: self.config.suggest.weights.clone(),
        };
        let result = suggest(
            &self.players,
            &self.config.scoring,
            &self.config.league.roster,
            &self.draft_state,
            &self.config.league.context,
            &options,
        );
        match result {
            Ok(suggestions) => ServerResponse::Suggestions {
                suggestions: suggestions
                    .iter()
                    .map(|s| SuggestionPayload::from_suggestion(s, shape))
                    .collect(),
            },
            Err(e) => e.into(),
        }
    }

    fn rankings(&self, position: Option<&str>) -> ServerResponse {
        let filter = match position {
            None => None,
            Some(label) => match Position::from_str_pos(label) {
                Some(pos) if pos == Position::Flex || !pos.is_meta_slot() => Some(pos),
                _ => {
                    return ServerResponse::error(
                        ErrorKind::BadRequest,
                        format!("cannot rank by position '{label}'"),
                    );
                }
            },
        };

        let available = self.available_players();
        match rank_players(
            &available,
            &self.config.scoring,
            &self.config.league.roster,
            self.config.league.teams(),
        ) {
            Ok(mut players) => {
                if let Some(pos) = filter {
                    players.retain(|s| match s.player.position {
                        Some(p) if pos == Position::Flex => p.is_flex_eligible(),
                        Some(p) => p == pos,
                        None => false,
                    });
                }
                ServerResponse::Rankings { players }
            }
            Err(e) => e.into(),
        }
    }

    fn replacement_levels(&self) -> ServerResponse {
        let available = self.available_players();
        match compute_replacement_levels(
            &available,
            &self.config.scoring,
            &self.config.league.roster,
            self.config.league.teams(),
        ) {
            Ok(levels) => ServerResponse::ReplacementLevels {
                levels: levels
                    .iter()
                    .map(|(position, level)| ReplacementLevelEntry {
                        position,
                        level,
                        starters: levels.starters(position),
                    })
                    .collect(),
            },
            Err(e) => e.into(),
        }
    }

    fn remaining_needs(&self, team_index: u32) -> ServerResponse {
        let team_index = match self.resolve_team_index(team_index) {
            Ok(index) => index,
            Err(response) => return response,
        };
        let team_players: Vec<&Player> = self
            .draft_state
            .picks_for_team(team_index)
            .filter_map(|pick| self.find_player(pick.player_id))
            .collect();
        ServerResponse::RemainingNeeds {
            team_index,
            needs: remaining_needs(team_players, &self.config.league.roster),
        }
    }

    fn scarcity(&self) -> ServerResponse {
        let available = self.available_players();
        match rank_players(
            &available,
            &self.config.scoring,
            &self.config.league.roster,
            self.config.league.teams(),
        ) {
            Ok(scores) => ServerResponse::Scarcity {
                entries: compute_scarcity(&scores),
            },
            Err(e) => e.into(),
        }
    }
}

/// Parse and handle one raw JSON request. Unparseable input becomes a
/// `BAD_REQUEST` error response.
pub fn handle_message(state: &mut AppState, json_str: &str) -> ServerResponse {
    match serde_json::from_str::<ClientRequest>(json_str) {
        Ok(request) => state.handle_request(request),
        Err(e) => {
            warn!("Failed to parse client message: {}", e);
            ServerResponse::error(ErrorKind::BadRequest, format!("invalid request: {e}"))
        }
    }
}

/// Restore the draft from the database after a crash or restart.
///
/// Returns `true` when picks for the current draft ID were found and
/// replayed.
pub fn recover_from_db(state: &mut AppState) -> anyhow::Result<bool> {
    if !state.db.has_draft_in_progress(&state.draft_id)? {
        info!("No draft in progress for draft_id={}, starting fresh", state.draft_id);
        return Ok(false);
    }

    let picks = state.db.load_picks(&state.draft_id)?;
    let unknown = picks
        .iter()
        .filter(|p| state.find_player(p.player_id).is_none())
        .count();
    if unknown > 0 {
        warn!("{unknown} recovered picks reference players missing from the pool");
    }

    state.draft_state = DraftState::restore_from_picks(picks)
        .context("stored picks for this draft are inconsistent")?;

    info!(
        "Crash recovery complete: {} picks restored, {} players remaining",
        state.draft_state.len(),
        state.available_players().len()
    );
    Ok(true)
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Main application event loop.
///
/// Consumes WebSocket events and writes one serialized response to `out_tx`
/// for every text message. Returns when either channel closes.
pub async fn run(
    mut ws_rx: mpsc::Receiver<WsEvent>,
    out_tx: mpsc::Sender<String>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    while let Some(event) = ws_rx.recv().await {
        match event {
            WsEvent::Connected { addr } => {
                info!("Client connected from {}", addr);
            }
            WsEvent::Disconnected => {
                info!("Client disconnected");
            }
            WsEvent::Message(json_str) => {
                let response = handle_message(&mut state, &json_str);
                let reply =
                    serde_json::to_string(&response).context("failed to serialize response")?;
                if out_tx.send(reply).await.is_err() {
                    info!("Outbound channel closed, shutting down");
                    break;
                }
            }
        }
    }

    info!("Application event loop exiting");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataPaths, LeagueConfig};
    use gridiron_core::{
        DefenseStats, DraftContext, OffenseStats, Pick, RosterRequirements, ScoringRules,
    };
    use serde_json::{json, Value};

    fn test_config() -> Config {
        let mut context = DraftContext::new(4, 2);
        context.total_rounds = 4;
        context.kdst_gate_round = 3;
        Config {
            league: LeagueConfig {
                name: "Test League".into(),
                context,
                roster: RosterRequirements::from_counts([
                    ("QB", 1),
                    ("RB", 1),
                    ("WR", 1),
                    ("K", 1),
                ])
                .unwrap(),
            },
            scoring: ScoringRules::half_ppr(),
            suggest: SuggestOptions::default(),
            ws_port: 9002,
            db_path: ":memory:".into(),
            data_paths: DataPaths {
                players: "unused.csv".into(),
            },
        }
    }

    fn offense(id: u64, pos: &str, rush: f64, rec: f64, pass: f64, adp: f64) -> Player {
        Player::new(id, format!("{pos} {id}"), pos)
            .with_adp(adp)
            .with_offense(OffenseStats {
                rushing_yards: rush,
                receiving_yards: rec,
                passing_yards: pass,
                ..Default::default()
            })
    }

    fn test_players() -> Vec<Player> {
        let mut players = Vec::new();
        for i in 0..6u64 {
            let f = i as f64;
            players.push(offense(1 + i, "RB", 1200.0 - 150.0 * f, 0.0, 0.0, 1.0 + 3.0 * f));
            players.push(offense(11 + i, "WR", 0.0, 1300.0 - 140.0 * f, 0.0, 2.0 + 3.0 * f));
            players.push(offense(21 + i, "QB", 0.0, 0.0, 4500.0 - 300.0 * f, 3.0 + 3.0 * f));
        }
        players.push(
            Player::new(31, "K 31", "K").with_adp(40.0).with_offense(OffenseStats {
                field_goals_made: 30.0,
                ..Default::default()
            }),
        );
        players.push(
            Player::new(41, "DST 41", "DST")
                .with_adp(45.0)
                .with_defense(DefenseStats {
                    sacks: 40.0,
                    points_allowed: 20.0,
                    ..Default::default()
                }),
        );
        players
    }

    fn create_test_app_state() -> AppState {
        let db = Database::open(":memory:").unwrap();
        AppState::new(test_config(), test_players(), db, "draft_test".into())
    }

    fn respond(state: &mut AppState, request: Value) -> Value {
        let response = handle_message(state, &request.to_string());
        serde_json::to_value(&response).unwrap()
    }

    #[test]
    fn record_pick_persists_and_reports_state() {
        let mut state = create_test_app_state();
        let resp = respond(
            &mut state,
            json!({"type": "RECORD_PICK", "player_id": 1, "team_index": 1}),
        );
        assert_eq!(resp["type"], json!("DRAFT_STATE"));
        assert_eq!(resp["current_pick_overall"], json!(2));
        assert_eq!(resp["on_the_clock"], json!(2));
        assert_eq!(resp["is_user_turn"], json!(true));
        assert_eq!(
            state.db.load_picks("draft_test").unwrap(),
            vec![Pick {
                player_id: 1,
                team_index: 1
            }]
        );
    }

    #[test]
    fn record_pick_without_team_goes_to_team_on_the_clock() {
        let mut state = create_test_app_state();
        respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 1}));
        respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 2}));
        let picks = state.draft_state.picks();
        assert_eq!(picks[0].team_index, 1);
        // Slot 2 is the user's.
        assert_eq!(picks[1].team_index, SELF_TEAM);
    }

    #[test]
    fn user_slot_index_is_normalized_to_self() {
        let mut state = create_test_app_state();
        respond(
            &mut state,
            json!({"type": "RECORD_PICK", "player_id": 1, "team_index": 2}),
        );
        assert_eq!(state.draft_state.picks()[0].team_index, SELF_TEAM);
    }

    #[test]
    fn double_draft_is_rejected_without_changes() {
        let mut state = create_test_app_state();
        respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 1}));
        let resp = respond(
            &mut state,
            json!({"type": "RECORD_PICK", "player_id": 1, "team_index": 3}),
        );
        assert_eq!(resp["type"], json!("ERROR"));
        assert_eq!(resp["kind"], json!("ALREADY_DRAFTED"));
        assert_eq!(state.draft_state.len(), 1);
        assert_eq!(state.db.pick_count("draft_test").unwrap(), 1);
    }

    #[test]
    fn unknown_player_and_bad_team_rejected() {
        let mut state = create_test_app_state();
        let resp = respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 999}));
        assert_eq!(resp["kind"], json!("UNKNOWN_PLAYER"));

        let resp = respond(
            &mut state,
            json!({"type": "RECORD_PICK", "player_id": 1, "team_index": 5}),
        );
        assert_eq!(resp["kind"], json!("BAD_REQUEST"));
        assert!(state.draft_state.is_empty());
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let mut state = create_test_app_state();
        let response = handle_message(&mut state, "{not json");
        match response {
            ServerResponse::Error { kind, .. } => assert_eq!(kind, ErrorKind::BadRequest),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn undo_and_clear_write_through() {
        let mut state = create_test_app_state();
        for id in [1, 11, 21] {
            respond(&mut state, json!({"type": "RECORD_PICK", "player_id": id}));
        }
        let resp = respond(&mut state, json!({"type": "UNDO_LAST"}));
        assert_eq!(resp["current_pick_overall"], json!(3));
        assert_eq!(state.db.pick_count("draft_test").unwrap(), 2);

        respond(&mut state, json!({"type": "CLEAR"}));
        assert!(state.draft_state.is_empty());
        assert_eq!(state.db.pick_count("draft_test").unwrap(), 0);

        // Undo on an empty draft is a no-op.
        let resp = respond(&mut state, json!({"type": "UNDO_LAST"}));
        assert_eq!(resp["current_pick_overall"], json!(1));
    }

    #[test]
    fn failed_persist_rolls_back_pick() {
        let mut state = create_test_app_state();
        // Occupy seq 1 behind the app's back so the next insert collides.
        state
            .db
            .record_pick(
                "draft_test",
                1,
                &Pick {
                    player_id: 99,
                    team_index: 3,
                },
            )
            .unwrap();
        let resp = respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 1}));
        assert_eq!(resp["kind"], json!("STORAGE"));
        assert!(state.draft_state.is_empty());
        assert!(!state.draft_state.is_drafted(1));
    }

    #[test]
    fn suggestions_exclude_drafted_and_respect_count() {
        let mut state = create_test_app_state();
        respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 1}));
        let resp = respond(&mut state, json!({"type": "SUGGEST", "count": 3}));
        assert_eq!(resp["type"], json!("SUGGESTIONS"));
        let list = resp["suggestions"].as_array().unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.iter().all(|s| s["player"]["player_id"] != json!(1)));
        assert!(list.iter().all(|s| !s["reasons"].as_array().unwrap().is_empty()));
    }

    #[test]
    fn suggestions_in_components_shape() {
        let mut state = create_test_app_state();
        let resp = respond(
            &mut state,
            json!({"type": "SUGGEST", "count": 2, "shape": "components"}),
        );
        let list = resp["suggestions"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        for s in list {
            assert!(s["components"].is_object());
            assert!(s.get("reasons").is_none());
        }
    }

    #[test]
    fn kicker_held_back_until_gate_round() {
        let mut state = create_test_app_state();
        let resp = respond(&mut state, json!({"type": "SUGGEST", "count": 0}));
        let ids: Vec<u64> = resp["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["player"]["player_id"].as_u64().unwrap())
            .collect();
        assert!(!ids.contains(&31));
        assert!(!ids.contains(&41));

        // Eight picks finish round 2; round 3 opens the gate.
        for id in [1, 2, 3, 11, 12, 13, 21, 22] {
            respond(&mut state, json!({"type": "RECORD_PICK", "player_id": id}));
        }
        let resp = respond(&mut state, json!({"type": "SUGGEST", "count": 0}));
        let ids: Vec<u64> = resp["suggestions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["player"]["player_id"].as_u64().unwrap())
            .collect();
        assert!(ids.contains(&31));
        assert!(ids.contains(&41));
    }

    #[test]
    fn picks_rejected_once_draft_is_complete() {
        let mut state = create_test_app_state();
        // Four teams, four rounds.
        let ids = [1, 2, 3, 4, 5, 6, 11, 12, 13, 14, 15, 16, 21, 22, 23, 24];
        for id in ids {
            let resp = respond(&mut state, json!({"type": "RECORD_PICK", "player_id": id}));
            assert_eq!(resp["type"], "DRAFT_STATE");
        }
        let status = respond(&mut state, json!({"type": "DRAFT_STATUS"}));
        assert_eq!(status["draft_complete"], json!(true));

        let resp = respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 25}));
        assert_eq!(resp["type"], "ERROR");
        assert_eq!(resp["kind"], "BAD_REQUEST");
        assert_eq!(state.draft_state.len(), 16);
        assert_eq!(state.db.pick_count(&state.draft_id).unwrap(), 16);

        // Undo reopens the last pick.
        respond(&mut state, json!({"type": "UNDO_LAST"}));
        let resp = respond(&mut state, json!({"type": "RECORD_PICK", "player_id": 25}));
        assert_eq!(resp["type"], "DRAFT_STATE");
    }

    #[test]
    fn rankings_filter_by_position() {
        let mut state = create_test_app_state();
        let resp = respond(&mut state, json!({"type": "RANK_PLAYERS", "position": "rb"}));
        let players = resp["players"].as_array().unwrap();
        assert_eq!(players.len(), 6);
        assert!(players
            .iter()
            .all(|p| p["player"]["position_label"] == json!("RB")));
        assert_eq!(players[0]["player"]["player_id"], json!(1));

        let resp = respond(&mut state, json!({"type": "RANK_PLAYERS", "position": "FLEX"}));
        assert_eq!(resp["players"].as_array().unwrap().len(), 12);

        let resp = respond(&mut state, json!({"type": "RANK_PLAYERS", "position": "BE"}));
        assert_eq!(resp["kind"], json!("BAD_REQUEST"));
    }

    #[test]
    fn replacement_levels_cover_present_positions() {
        let mut state = create_test_app_state();
        let resp = respond(&mut state, json!({"type": "REPLACEMENT_LEVELS"}));
        let levels = resp["levels"].as_array().unwrap();
        let qb = levels
            .iter()
            .find(|l| l["position"] == json!("QB"))
            .unwrap();
        assert_eq!(qb["starters"], json!(4));
        // Fifth-best QB: 4500 - 1200 passing yards at 0.04.
        assert!((qb["level"].as_f64().unwrap() - 132.0).abs() < 1e-9);
    }

    #[test]
    fn remaining_needs_per_team() {
        let mut state = create_test_app_state();
        respond(
            &mut state,
            json!({"type": "RECORD_PICK", "player_id": 21, "team_index": 0}),
        );
        let resp = respond(&mut state, json!({"type": "REMAINING_NEEDS", "team_index": 0}));
        assert_eq!(resp["type"], json!("REMAINING_NEEDS"));
        assert_eq!(resp["needs"]["QB"], json!(0));
        assert_eq!(resp["needs"]["RB"], json!(1));

        let resp = respond(&mut state, json!({"type": "REMAINING_NEEDS", "team_index": 3}));
        assert_eq!(resp["needs"]["QB"], json!(1));
    }

    #[test]
    fn scarcity_lists_every_playing_position() {
        let mut state = create_test_app_state();
        let resp = respond(&mut state, json!({"type": "SCARCITY"}));
        assert_eq!(resp["entries"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn crash_recovery_restores_state() {
        let db = Database::open(":memory:").unwrap();
        let picks = [
            Pick {
                player_id: 1,
                team_index: 1,
            },
            Pick {
                player_id: 11,
                team_index: SELF_TEAM,
            },
        ];
        for (i, pick) in picks.iter().enumerate() {
            db.record_pick("draft_test", i + 1, pick).unwrap();
        }
        db.record_pick(
            "draft_other",
            1,
            &Pick {
                player_id: 21,
                team_index: 3,
            },
        )
        .unwrap();

        let mut state = AppState::new(test_config(), test_players(), db, "draft_test".into());
        assert!(recover_from_db(&mut state).unwrap());
        assert_eq!(state.draft_state.picks(), picks.as_slice());
        assert!(!state.draft_state.is_drafted(21));
        assert_eq!(state.draft_status().current_pick_overall, 3);
    }

    #[test]
    fn crash_recovery_no_picks_returns_false() {
        let mut state = create_test_app_state();
        assert!(!recover_from_db(&mut state).unwrap());
        assert!(state.draft_state.is_empty());
    }

    #[test]
    fn draft_status_tracks_snake_turns() {
        let mut state = create_test_app_state();
        let status = state.draft_status();
        assert_eq!(status.on_the_clock, 1);
        assert!(!status.is_user_turn);
        assert_eq!(status.picks_until_user_turn, 1);

        for id in [1, 2, 3, 4] {
            respond(&mut state, json!({"type": "RECORD_PICK", "player_id": id}));
        }
        // Pick 5 opens round 2, which runs 4, 3, 2, 1.
        let status = state.draft_status();
        assert_eq!(status.round, 2);
        assert_eq!(status.on_the_clock, 4);
        assert_eq!(status.picks_until_user_turn, 2);
        assert!(!status.draft_complete);
    }

    #[tokio::test]
    async fn event_loop_answers_each_message() {
        let (ws_tx, ws_rx) = mpsc::channel(16);
        let (out_tx, mut out_rx) = mpsc::channel(16);
        let state = create_test_app_state();
        let handle = tokio::spawn(run(ws_rx, out_tx, state));

        ws_tx
            .send(WsEvent::Connected {
                addr: "127.0.0.1:5000".into(),
            })
            .await
            .unwrap();
        ws_tx
            .send(WsEvent::Message(r#"{"type":"DRAFT_STATUS"}"#.into()))
            .await
            .unwrap();
        ws_tx
            .send(WsEvent::Message(r#"{"type":"BOGUS"}"#.into()))
            .await
            .unwrap();

        let first: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
        assert_eq!(first["type"], json!("DRAFT_STATE"));
        let second: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
        assert_eq!(second["kind"], json!("BAD_REQUEST"));

        drop(ws_tx);
        handle.await.unwrap().unwrap();
    }
}
