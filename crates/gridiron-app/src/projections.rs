// Player pool loading.
//
// Reads a single CSV with one row per player: identity columns, ADP, and
// season projections. Offensive and kicking columns apply to every position
// except DST, which reads the defensive columns instead.

use serde::Deserialize;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use gridiron_core::{DefenseStats, OffenseStats, Player, PlayerId, Position};

use crate::config::Config;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProjectionError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV row (private)
// ---------------------------------------------------------------------------

/// One CSV row. Stat columns may be missing or blank, both meaning 0.
/// Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct RawPlayerRow {
    player_id: PlayerId,
    name: String,
    position: String,
    #[serde(default)]
    team: Option<String>,
    #[serde(default)]
    bye_week: Option<u8>,
    #[serde(default)]
    adp: Option<f64>,

    #[serde(default)]
    passing_yards: Option<f64>,
    #[serde(default)]
    passing_tds: Option<f64>,
    #[serde(default)]
    interceptions: Option<f64>,
    #[serde(default)]
    rushing_yards: Option<f64>,
    #[serde(default)]
    rushing_tds: Option<f64>,
    #[serde(default)]
    receptions: Option<f64>,
    #[serde(default)]
    receiving_yards: Option<f64>,
    #[serde(default)]
    receiving_tds: Option<f64>,
    #[serde(default)]
    fumbles_lost: Option<f64>,
    #[serde(default)]
    two_point_conversions: Option<f64>,
    #[serde(default)]
    field_goals_made: Option<f64>,
    #[serde(default)]
    extra_points_made: Option<f64>,

    #[serde(default)]
    sacks: Option<f64>,
    #[serde(default)]
    def_interceptions: Option<f64>,
    #[serde(default)]
    fumble_recoveries: Option<f64>,
    #[serde(default)]
    safeties: Option<f64>,
    #[serde(default)]
    defensive_tds: Option<f64>,
    #[serde(default)]
    return_tds: Option<f64>,
    #[serde(default)]
    points_allowed: Option<f64>,
}

impl RawPlayerRow {
    fn numbers(&self) -> [Option<f64>; 20] {
        [
            self.adp,
            self.passing_yards,
            self.passing_tds,
            self.interceptions,
            self.rushing_yards,
            self.rushing_tds,
            self.receptions,
            self.receiving_yards,
            self.receiving_tds,
            self.fumbles_lost,
            self.two_point_conversions,
            self.field_goals_made,
            self.extra_points_made,
            self.sacks,
            self.def_interceptions,
            self.fumble_recoveries,
            self.safeties,
            self.defensive_tds,
            self.return_tds,
            self.points_allowed,
        ]
    }

    fn into_player(self) -> Player {
        let mut player = Player::new(self.player_id, self.name.trim(), &self.position);

        player = if player.position == Some(Position::Defense) {
            player.with_defense(DefenseStats {
                sacks: stat(self.sacks),
                interceptions: stat(self.def_interceptions),
                fumble_recoveries: stat(self.fumble_recoveries),
                safeties: stat(self.safeties),
                defensive_tds: stat(self.defensive_tds),
                return_tds: stat(self.return_tds),
                points_allowed: stat(self.points_allowed),
            })
        } else {
            player.with_offense(OffenseStats {
                passing_yards: stat(self.passing_yards),
                passing_tds: stat(self.passing_tds),
                interceptions: stat(self.interceptions),
                rushing_yards: stat(self.rushing_yards),
                rushing_tds: stat(self.rushing_tds),
                receptions: stat(self.receptions),
                receiving_yards: stat(self.receiving_yards),
                receiving_tds: stat(self.receiving_tds),
                fumbles_lost: stat(self.fumbles_lost),
                two_point_conversions: stat(self.two_point_conversions),
                field_goals_made: stat(self.field_goals_made),
                extra_points_made: stat(self.extra_points_made),
            })
        };

        if let Some(team) = self.team.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            player = player.with_team(team);
        }
        if let Some(bye) = self.bye_week {
            player = player.with_bye_week(bye);
        }
        if let Some(adp) = self.adp {
            player = player.with_adp(adp);
        }
        player
    }
}

fn stat(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Reader-based loader (private, enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players = Vec::new();
    let mut seen: HashSet<PlayerId> = HashSet::new();

    for result in reader.deserialize::<RawPlayerRow>() {
        match result {
            Ok(raw) => {
                if raw.numbers().iter().flatten().any(|v| !v.is_finite()) {
                    warn!("skipping player '{}': non-finite numeric value", raw.name.trim());
                    continue;
                }
                if !seen.insert(raw.player_id) {
                    warn!(
                        "skipping player '{}': duplicate player_id {}",
                        raw.name.trim(),
                        raw.player_id
                    );
                    continue;
                }
                let player = raw.into_player();
                if player.position.is_none() {
                    warn!(
                        "player '{}' has unrecognized position '{}'",
                        player.name, player.position_label
                    );
                }
                players.push(player);
            }
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
            }
        }
    }
    Ok(players)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load the player pool from a CSV file. A file that yields no valid rows
/// is an error.
pub fn load_players(path: &Path) -> Result<Vec<Player>, ProjectionError> {
    let file = std::fs::File::open(path).map_err(|e| ProjectionError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file).map_err(|e| ProjectionError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if players.is_empty() {
        return Err(ProjectionError::Validation(format!(
            "player CSV {} produced zero valid rows",
            path.display()
        )));
    }

    info!("loaded {} players from {}", players.len(), path.display());
    Ok(players)
}

/// Load the player pool named by the config's data paths.
pub fn load_pool(config: &Config) -> Result<Vec<Player>, ProjectionError> {
    load_players(Path::new(&config.data_paths.players))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
