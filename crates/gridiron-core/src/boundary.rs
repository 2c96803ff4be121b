// Suggestion payloads as they cross the wire.
//
// Older clients receive a flat `reasons` list; newer ones receive a
// `components` map of factor contributions. Both are turned into the same
// display rows here, so nothing inside the engine needs to care.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::player::PlayerId;
use crate::suggest::Suggestion;

/// Reasons shown per suggestion when derived from components.
pub const DISPLAY_REASONS: usize = 3;

/// Player summary carried in a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadPlayer {
    pub player_id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub adp: Option<f64>,
}

/// Which payload shape to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    #[default]
    Reasons,
    Components,
}

/// A suggestion on the wire, in either shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SuggestionPayload {
    Components {
        player: PayloadPlayer,
        #[serde(default)]
        score: f64,
        components: BTreeMap<String, f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reasons: Option<Vec<String>>,
    },
    Reasons {
        player: PayloadPlayer,
        #[serde(default)]
        score: f64,
        #[serde(default)]
        reasons: Vec<String>,
    },
}

/// A suggestion ready to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySuggestion {
    pub player: PayloadPlayer,
    pub score: f64,
    pub reasons: Vec<String>,
}

impl SuggestionPayload {
    /// Encode an engine suggestion in the requested shape.
    pub fn from_suggestion(suggestion: &Suggestion, shape: PayloadShape) -> Self {
        let p = suggestion.player();
        let player = PayloadPlayer {
            player_id: p.player_id,
            name: p.name.clone(),
            position: p.position_label.clone(),
            team: p.team.clone(),
            adp: p.adp,
        };
        match shape {
            PayloadShape::Reasons => SuggestionPayload::Reasons {
                player,
                score: suggestion.score,
                reasons: suggestion.reasons.clone(),
            },
            PayloadShape::Components => SuggestionPayload::Components {
                player,
                score: suggestion.score,
                components: suggestion.components_by_name(),
                reasons: None,
            },
        }
    }

    pub fn player(&self) -> &PayloadPlayer {
        match self {
            SuggestionPayload::Components { player, .. } | SuggestionPayload::Reasons { player, .. } => {
                player
            }
        }
    }

    /// Convert to a display row. A non-empty explicit reasons list wins;
    /// otherwise the strongest `max_reasons` components are rendered.
    pub fn into_display(self, max_reasons: usize) -> DisplaySuggestion {
        match self {
            SuggestionPayload::Components {
                player,
                score,
                components,
                reasons,
            } => DisplaySuggestion {
                player,
                score,
                reasons: reasons
                    .filter(|reasons| !reasons.is_empty())
                    .unwrap_or_else(|| reasons_from_components(&components, max_reasons)),
            },
            SuggestionPayload::Reasons {
                player,
                score,
                reasons,
            } => DisplaySuggestion {
                player,
                score,
                reasons,
            },
        }
    }
}

/// Render the strongest non-zero components as `"name: value"` with two
/// decimals, largest absolute value first. Equal magnitudes keep name order.
pub fn reasons_from_components(components: &BTreeMap<String, f64>, max_reasons: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = components
        .iter()
        .filter(|(_, value)| **value != 0.0)
        .map(|(name, value)| (name, *value))
        .collect();
    ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
    ranked
        .into_iter()
        .take(max_reasons)
        .map(|(name, value)| format!("{name}: {value:.2}"))
        .collect()
}

/// Parse a JSON suggestions list in either shape into display rows.
///
/// A document that is not an array yields no rows. Elements that match
/// neither shape are skipped.
pub fn normalize_json(text: &str) -> Result<Vec<DisplaySuggestion>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    let mut rows = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<SuggestionPayload>(item) {
            Ok(payload) => rows.push(payload.into_display(DISPLAY_REASONS)),
            Err(e) => warn!("skipping malformed suggestion at index {index}: {e}"),
        }
    }
    Ok(rows)
}
