// Integration tests for the gridiron draft engine.
//
// These tests drive the library crate's public API end-to-end: the CSV
// player pool, the JSON request protocol, SQLite persistence with crash
// recovery, and the async event loop that sits behind the WebSocket.

use std::path::PathBuf;

use gridiron_app::app::{self, AppState};
use gridiron_app::config::{Config, DataPaths, LeagueConfig};
use gridiron_app::db::Database;
use gridiron_app::projections::load_players;
use gridiron_app::protocol::*;
use gridiron_app::ws_server::WsEvent;
use gridiron_core::{
    DraftContext, Player, Position, RosterRequirements, ScoringRules, SuggestOptions, SELF_TEAM,
};

use serde_json::Value;
use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

const TEAMS: u32 = 4;
const USER_SLOT: u32 = 2;
const ROUNDS: u32 = 6;
const GATE_ROUND: u32 = 5;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/players.csv")
}

fn fixture_players() -> Vec<Player> {
    load_players(&fixture_path()).expect("fixture CSV should load")
}

/// A small league built inline, no config files involved.
fn inline_config() -> Config {
    let mut context = DraftContext::new(TEAMS, USER_SLOT);
    context.total_rounds = ROUNDS;
    context.kdst_gate_round = GATE_ROUND;
    Config {
        league: LeagueConfig {
            name: "Integration League".into(),
            context,
            roster: RosterRequirements::from_counts([
                ("QB", 1),
                ("RB", 1),
                ("WR", 2),
                ("TE", 1),
                ("FLEX", 1),
                ("K", 1),
                ("DST", 1),
                ("BE", 2),
            ])
            .unwrap(),
        },
        scoring: ScoringRules::half_ppr(),
        suggest: SuggestOptions::default(),
        ws_port: 9002,
        db_path: ":memory:".into(),
        data_paths: DataPaths {
            players: fixture_path().display().to_string(),
        },
    }
}

fn memory_state() -> AppState {
    let db = Database::open(":memory:").unwrap();
    let draft_id = db.current_or_new_draft_id().unwrap();
    AppState::new(inline_config(), fixture_players(), db, draft_id)
}

fn status(state: &mut AppState) -> DraftStatus {
    match app::handle_message(state, r#"{"type":"DRAFT_STATUS"}"#) {
        ServerResponse::DraftState(status) => status,
        other => panic!("expected DRAFT_STATE, got {other:?}"),
    }
}

fn position_of(state: &AppState, player_id: u64) -> Option<Position> {
    state
        .players
        .iter()
        .find(|p| p.player_id == player_id)
        .and_then(|p| p.position)
}

fn temp_db_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir.join("gridiron.db")
}

// ===========================================================================
// Player pool
// ===========================================================================

#[test]
fn fixture_pool_skips_duplicate_and_non_finite_rows() {
    let players = fixture_players();
    assert_eq!(players.len(), 37);

    let qb = players.iter().find(|p| p.player_id == 101).unwrap();
    assert_eq!(qb.name, "Josh Mason");
    assert!(players.iter().all(|p| p.player_id != 999));

    let defenses = players
        .iter()
        .filter(|p| p.position == Some(Position::Defense))
        .count();
    assert_eq!(defenses, 5);
}

// ===========================================================================
// Full draft
// ===========================================================================

#[test]
fn full_draft_simulation_via_messages() {
    let mut state = memory_state();

    loop {
        let current = status(&mut state);
        if current.draft_complete {
            break;
        }

        let player_id = if current.is_user_turn {
            let suggestions = match app::handle_message(
                &mut state,
                r#"{"type":"SUGGEST","count":3}"#,
            ) {
                ServerResponse::Suggestions { suggestions } => suggestions,
                other => panic!("expected SUGGESTIONS, got {other:?}"),
            };
            assert!(!suggestions.is_empty(), "pool ran dry at pick {}", current.current_pick_overall);
            if current.round < GATE_ROUND {
                for s in &suggestions {
                    let pos = position_of(&state, s.player().player_id);
                    assert!(
                        !matches!(pos, Some(Position::Kicker | Position::Defense)),
                        "K/DST suggested in round {}",
                        current.round
                    );
                }
            }
            suggestions[0].player().player_id
        } else {
            match app::handle_message(&mut state, r#"{"type":"RANK_PLAYERS"}"#) {
                ServerResponse::Rankings { players } => players[0].player_id(),
                other => panic!("expected RANKINGS, got {other:?}"),
            }
        };

        let request = format!(r#"{{"type":"RECORD_PICK","player_id":{player_id}}}"#);
        match app::handle_message(&mut state, &request) {
            ServerResponse::DraftState(after) => {
                assert_eq!(after.current_pick_overall, current.current_pick_overall + 1);
            }
            other => panic!("expected DRAFT_STATE, got {other:?}"),
        }
    }

    let total = (TEAMS * ROUNDS) as usize;
    assert_eq!(state.draft_state.len(), total);
    assert_eq!(state.draft_state.my_picks().count(), ROUNDS as usize);
    assert_eq!(state.db.pick_count(&state.draft_id).unwrap(), total);

    // Every player was drafted at most once.
    let ids = state.draft_state.drafted_ids();
    assert_eq!(ids.len(), total);

    // Remaining needs for the user shrink to at most the unfilled starters.
    match app::handle_message(&mut state, r#"{"type":"REMAINING_NEEDS"}"#) {
        ServerResponse::RemainingNeeds { team_index, needs } => {
            assert_eq!(team_index, SELF_TEAM);
            let starters = state.config.league.roster.starters_per_team();
            assert!(needs.total() < starters);
        }
        other => panic!("expected REMAINING_NEEDS, got {other:?}"),
    }
}

#[test]
fn double_draft_rejected_and_state_unchanged() {
    let mut state = memory_state();
    app::handle_message(&mut state, r#"{"type":"RECORD_PICK","player_id":201}"#);

    match app::handle_message(
        &mut state,
        r#"{"type":"RECORD_PICK","player_id":201,"team_index":3}"#,
    ) {
        ServerResponse::Error { kind, .. } => assert_eq!(kind, ErrorKind::AlreadyDrafted),
        other => panic!("expected ERROR, got {other:?}"),
    }
    assert_eq!(state.draft_state.len(), 1);
    assert_eq!(state.db.pick_count(&state.draft_id).unwrap(), 1);
}

#[test]
fn drafted_players_leave_rankings_and_suggestions() {
    let mut state = memory_state();

    let top = match app::handle_message(&mut state, r#"{"type":"SUGGEST","count":1}"#) {
        ServerResponse::Suggestions { suggestions } => suggestions[0].player().player_id,
        other => panic!("expected SUGGESTIONS, got {other:?}"),
    };
    let request = format!(r#"{{"type":"RECORD_PICK","player_id":{top},"team_index":1}}"#);
    app::handle_message(&mut state, &request);

    match app::handle_message(&mut state, r#"{"type":"SUGGEST","count":0}"#) {
        ServerResponse::Suggestions { suggestions } => {
            assert!(suggestions.iter().all(|s| s.player().player_id != top));
        }
        other => panic!("expected SUGGESTIONS, got {other:?}"),
    }
    match app::handle_message(&mut state, r#"{"type":"RANK_PLAYERS"}"#) {
        ServerResponse::Rankings { players } => {
            assert_eq!(players.len(), 36);
            assert!(players.iter().all(|p| p.player_id() != top));
        }
        other => panic!("expected RANKINGS, got {other:?}"),
    }
}

#[test]
fn undo_and_clear_round_trip() {
    let mut state = memory_state();
    for id in [201, 301, 101] {
        let request = format!(r#"{{"type":"RECORD_PICK","player_id":{id}}}"#);
        app::handle_message(&mut state, &request);
    }
    assert_eq!(status(&mut state).current_pick_overall, 4);

    match app::handle_message(&mut state, r#"{"type":"UNDO_LAST"}"#) {
        ServerResponse::DraftState(s) => {
            assert_eq!(s.picks.len(), 2);
            assert_eq!(s.current_pick_overall, 3);
        }
        other => panic!("expected DRAFT_STATE, got {other:?}"),
    }
    assert!(!state.draft_state.is_drafted(101));
    assert_eq!(state.db.pick_count(&state.draft_id).unwrap(), 2);

    match app::handle_message(&mut state, r#"{"type":"CLEAR"}"#) {
        ServerResponse::DraftState(s) => {
            assert!(s.picks.is_empty());
            assert_eq!(s.current_pick_overall, 1);
        }
        other => panic!("expected DRAFT_STATE, got {other:?}"),
    }
    assert_eq!(state.db.pick_count(&state.draft_id).unwrap(), 0);
}

// ===========================================================================
// Crash recovery
// ===========================================================================

#[test]
fn crash_recovery_replays_persisted_picks() {
    let db_path = temp_db_path("gridiron_integration_recovery");
    let db_path_str = db_path.display().to_string();

    let draft_id = {
        let db = Database::open(&db_path_str).unwrap();
        let draft_id = db.current_or_new_draft_id().unwrap();
        let mut state = AppState::new(inline_config(), fixture_players(), db, draft_id.clone());
        for id in [201, 202, 301, 302, 101] {
            let request = format!(r#"{{"type":"RECORD_PICK","player_id":{id}}}"#);
            match app::handle_message(&mut state, &request) {
                ServerResponse::DraftState(_) => {}
                other => panic!("expected DRAFT_STATE, got {other:?}"),
            }
        }
        draft_id
    };

    let db = Database::open(&db_path_str).unwrap();
    let reopened_id = db.current_or_new_draft_id().unwrap();
    assert_eq!(reopened_id, draft_id);

    let mut state = AppState::new(inline_config(), fixture_players(), db, reopened_id);
    assert!(app::recover_from_db(&mut state).unwrap());
    assert_eq!(state.draft_state.len(), 5);
    assert_eq!(state.draft_state.current_pick_overall(), 6);
    // Snake order with 4 teams: the user (slot 2) picked 2nd and 7th.
    assert_eq!(state.draft_state.my_picks().count(), 1);
    assert!(state.draft_state.is_drafted(202));

    let status = status(&mut state);
    assert_eq!(status.round, 2);
    assert_eq!(status.on_the_clock, 3);
    assert_eq!(status.picks_until_user_turn, 1);
}

// ===========================================================================
// Event loop
// ===========================================================================

#[tokio::test]
async fn event_loop_answers_every_message() {
    let (ws_tx, ws_rx) = mpsc::channel(16);
    let (out_tx, mut out_rx) = mpsc::channel(16);
    let handle = tokio::spawn(app::run(ws_rx, out_tx, memory_state()));

    ws_tx
        .send(WsEvent::Connected {
            addr: "127.0.0.1:50000".into(),
        })
        .await
        .unwrap();
    ws_tx
        .send(WsEvent::Message(
            r#"{"type":"RECORD_PICK","player_id":201}"#.into(),
        ))
        .await
        .unwrap();
    ws_tx
        .send(WsEvent::Message(r#"{"type":"SCARCITY"}"#.into()))
        .await
        .unwrap();
    ws_tx.send(WsEvent::Message("not json".into())).await.unwrap();
    ws_tx.send(WsEvent::Disconnected).await.unwrap();

    let first: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(first["type"], "DRAFT_STATE");
    assert_eq!(first["picks"][0]["player_id"], 201);

    let second: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(second["type"], "SCARCITY");
    assert!(second["entries"].as_array().is_some_and(|e| !e.is_empty()));

    let third: Value = serde_json::from_str(&out_rx.recv().await.unwrap()).unwrap();
    assert_eq!(third["type"], "ERROR");
    assert_eq!(third["kind"], "BAD_REQUEST");

    drop(ws_tx);
    handle.await.unwrap().unwrap();
    assert!(out_rx.recv().await.is_none());
}
