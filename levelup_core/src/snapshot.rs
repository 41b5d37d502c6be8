//! Snapshot encoding for persistence, export and import.
//!
//! A snapshot is the whole `SaveState` as a single JSON document. Decoding
//! is all-or-nothing: a document that is missing fields, has wrongly typed
//! fields or breaks a structural invariant is rejected as
//! `Error::InvalidFormat` and never partially applied.

use crate::{Error, PhotoBlob, Result, SaveState};
use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Fixed key the persisted snapshot is stored under
pub const STORAGE_KEY: &str = "solo-leveling-irl-offline";

/// Cached default save state - built once, cloned on every reset
static DEFAULT_STATE: Lazy<SaveState> = Lazy::new(build_default_state);

/// The fixed first-run state
pub fn default_state() -> SaveState {
    DEFAULT_STATE.clone()
}

fn build_default_state() -> SaveState {
    use crate::{ExpMultipliers, Settings, Stats};

    SaveState {
        level: 1,
        exp: 0.0,
        next_level_exp: crate::progression::level_threshold(1),
        coins: 0,
        stats: Stats::default(),
        workouts: Vec::new(),
        diet: Vec::new(),
        quests: crate::quests::seed_quests(),
        inventory: vec!["Beginner's Training Manual".into()],
        weights: Vec::new(),
        photos: Vec::new(),
        settings: Settings {
            display_name: "Player".into(),
            calorie_goal: 2200.0,
            exp_multipliers: ExpMultipliers {
                minutes: 2.0,
                total_weight: 0.1,
                protein: 0.5,
            },
        },
    }
}

/// Encode the full state as compact JSON
pub fn serialize(state: &SaveState) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(state)?)
}

/// Encode the full state as indented JSON (used for exports)
pub fn serialize_pretty(state: &SaveState) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(state)?)
}

/// Decode and validate a snapshot
pub fn deserialize(bytes: &[u8]) -> Result<SaveState> {
    let state: SaveState =
        serde_json::from_slice(bytes).map_err(|e| Error::InvalidFormat(e.to_string()))?;
    validate(&state)?;
    Ok(state)
}

/// Check the structural invariants serde cannot express
pub fn validate(state: &SaveState) -> Result<()> {
    let invalid = |msg: String| Err(Error::InvalidFormat(msg));

    if state.level < 1 || state.level > crate::leveling::MAX_LEVEL {
        return invalid(format!(
            "level must be within 1-{}, got {}",
            crate::leveling::MAX_LEVEL,
            state.level
        ));
    }
    if !non_negative(state.exp) {
        return invalid(format!("exp must be a non-negative number, got {}", state.exp));
    }
    if !(state.next_level_exp.is_finite() && state.next_level_exp > 0.0) {
        return invalid(format!(
            "nextLevelExp must be positive, got {}",
            state.next_level_exp
        ));
    }
    for (attribute, value) in state.stats.iter() {
        if !non_negative(value) {
            return invalid(format!("stat {} is {}", attribute.name(), value));
        }
    }

    let mut seen = HashSet::new();
    for quest in &state.quests {
        if !seen.insert(quest.id.as_str()) {
            return invalid(format!("duplicate quest id {:?}", quest.id));
        }
        if !non_negative(quest.reward_exp) {
            return invalid(format!("quest {:?} has invalid rewardExp", quest.id));
        }
    }

    for workout in &state.workouts {
        crate::ledger::check_workout_items(&workout.items)
            .map_err(|e| Error::InvalidFormat(format!("workout {:?}: {}", workout.id, e)))?;
    }
    for entry in &state.diet {
        let meal = crate::Meal {
            calories: entry.calories,
            protein: entry.protein,
            carbs: entry.carbs,
            fat: entry.fat,
        };
        crate::ledger::check_meal(&meal)
            .map_err(|e| Error::InvalidFormat(format!("diet {:?}: {}", entry.id, e)))?;
    }
    for entry in &state.weights {
        crate::ledger::check_weight(entry.weight, entry.body_fat)
            .map_err(|e| Error::InvalidFormat(format!("weight at {}: {}", entry.date, e)))?;
    }

    crate::engine::check_settings(&state.settings)
        .map_err(|e| Error::InvalidFormat(e.to_string()))?;

    Ok(())
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

/// File name for an exported snapshot; embeds the current level
pub fn export_file_name(level: u32) -> String {
    format!("solo-leveling-save-level-{}.json", level)
}

// ============================================================================
// Photo data URLs
// ============================================================================

const DATA_URL_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";
const DEFAULT_MIME: &str = "application/octet-stream";

impl PhotoBlob {
    pub fn new(mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            bytes,
        }
    }

    /// Render as a `data:` URL
    pub fn to_data_url(&self) -> String {
        format!(
            "{}{}{},{}",
            DATA_URL_PREFIX,
            self.mime,
            BASE64_MARKER,
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }

    /// Parse a base64 `data:` URL
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| Error::InvalidFormat("photo is not a data URL".into()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidFormat("photo data URL has no payload".into()))?;
        let mime = header
            .strip_suffix(BASE64_MARKER)
            .ok_or_else(|| Error::InvalidFormat("photo data URL is not base64".into()))?;
        let bytes = general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::InvalidFormat(format!("photo payload: {}", e)))?;

        let mime = if mime.is_empty() { DEFAULT_MIME } else { mime };
        Ok(Self::new(mime, bytes))
    }
}

impl TryFrom<String> for PhotoBlob {
    type Error = Error;

    fn try_from(url: String) -> Result<Self> {
        Self::from_data_url(&url)
    }
}

impl From<PhotoBlob> for String {
    fn from(blob: PhotoBlob) -> Self {
        blob.to_data_url()
    }
}
