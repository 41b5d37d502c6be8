//! Core domain types for the LevelUp progression engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Character attributes and progression state
//! - Activity records (workouts, meals, weigh-ins, photos)
//! - Quests and settings
//! - The `SaveState` aggregate and the events operations report
//!
//! Field names serialize in camelCase so that a snapshot matches the
//! documented export format byte for byte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Character Attributes
// ============================================================================

/// One of the six named character attributes
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Attribute {
    Strength,
    Endurance,
    Agility,
    Vitality,
    Intelligence,
    Willpower,
}

impl Attribute {
    pub const ALL: [Attribute; 6] = [
        Attribute::Strength,
        Attribute::Endurance,
        Attribute::Agility,
        Attribute::Vitality,
        Attribute::Intelligence,
        Attribute::Willpower,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Endurance => "Endurance",
            Attribute::Agility => "Agility",
            Attribute::Vitality => "Vitality",
            Attribute::Intelligence => "Intelligence",
            Attribute::Willpower => "Willpower",
        }
    }
}

/// Per-attribute accumulators.
///
/// Agility, Intelligence and Willpower have no producing rule yet; they are
/// carried (and persisted) so future activity types can feed them.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    #[serde(rename = "Strength")]
    pub strength: f64,
    #[serde(rename = "Endurance")]
    pub endurance: f64,
    #[serde(rename = "Agility")]
    pub agility: f64,
    #[serde(rename = "Vitality")]
    pub vitality: f64,
    #[serde(rename = "Intelligence")]
    pub intelligence: f64,
    #[serde(rename = "Willpower")]
    pub willpower: f64,
}

impl Stats {
    pub fn get(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Endurance => self.endurance,
            Attribute::Agility => self.agility,
            Attribute::Vitality => self.vitality,
            Attribute::Intelligence => self.intelligence,
            Attribute::Willpower => self.willpower,
        }
    }

    /// Add a contribution to an attribute. Non-positive and non-finite
    /// amounts are ignored so an attribute never decreases.
    pub fn add(&mut self, attribute: Attribute, amount: f64) {
        if !amount.is_finite() || amount <= 0.0 {
            return;
        }
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Endurance => &mut self.endurance,
            Attribute::Agility => &mut self.agility,
            Attribute::Vitality => &mut self.vitality,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Willpower => &mut self.willpower,
        };
        *slot += amount;
    }

    /// Iterate attributes in display order
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, f64)> + '_ {
        Attribute::ALL.into_iter().map(move |a| (a, self.get(a)))
    }
}

// ============================================================================
// Activity Records
// ============================================================================

/// A single exercise line within a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExerciseSet {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    /// Load in kilograms
    pub weight: f64,
    pub minutes: f64,
}

impl ExerciseSet {
    /// Weight moved by this line: weight × reps × sets
    pub fn volume(&self) -> f64 {
        self.weight * f64::from(self.reps) * f64::from(self.sets)
    }
}

/// A logged workout session
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub items: Vec<ExerciseSet>,
}

/// Macro fields supplied when logging a meal
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Meal {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A logged meal
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DietEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// A body-weight check-in
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub date: DateTime<Utc>,
    pub weight: f64,
    /// Body-fat percentage, written as `null` when absent
    pub body_fat: Option<f64>,
}

/// Opaque image bytes plus their MIME type.
///
/// Embedded in snapshots as a `data:<mime>;base64,<payload>` URL.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct PhotoBlob {
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// A progress photo
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Photo {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "dataUrl")]
    pub image: PhotoBlob,
}

// ============================================================================
// Quests
// ============================================================================

/// Quest cadence
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QuestKind {
    Daily,
    Weekly,
}

/// A quest definition and its completion status
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    /// Advisory only; nothing updates it automatically
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    pub reward_exp: f64,
    pub reward_coins: u64,
    pub completed: bool,
}

// ============================================================================
// Settings
// ============================================================================

/// Weights applied to raw activity quantities when computing EXP
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpMultipliers {
    /// EXP per workout minute
    pub minutes: f64,
    /// EXP per kilogram of volume
    pub total_weight: f64,
    /// EXP per gram of protein
    pub protein: f64,
}

/// User-editable game settings
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(rename = "name")]
    pub display_name: String,
    pub calorie_goal: f64,
    pub exp_multipliers: ExpMultipliers,
}

// ============================================================================
// Save State
// ============================================================================

/// The aggregate root holding all character and history data
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaveState {
    pub level: u32,
    pub exp: f64,
    pub next_level_exp: f64,
    pub coins: u64,
    pub stats: Stats,
    pub workouts: Vec<WorkoutEntry>,
    pub diet: Vec<DietEntry>,
    pub quests: Vec<Quest>,
    pub inventory: Vec<String>,
    pub weights: Vec<WeightEntry>,
    pub photos: Vec<Photo>,
    pub settings: Settings,
}

impl Default for SaveState {
    fn default() -> Self {
        crate::snapshot::default_state()
    }
}

// ============================================================================
// Events and Outcomes
// ============================================================================

/// Discrete domain events for the presentation layer
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// One or more level-ups happened during a single operation
    LeveledUp { to: u32 },
    /// A quest was completed for the first time
    QuestCompleted { id: String },
}

/// Result of a logging operation: the created record, the global EXP it
/// granted and the events raised while applying it
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome<T> {
    pub record: T,
    pub exp_gained: f64,
    pub events: Vec<Event>,
}

impl<T> Outcome<T> {
    /// An outcome with no EXP effect
    pub fn quiet(record: T) -> Self {
        Self {
            record,
            exp_gained: 0.0,
            events: Vec::new(),
        }
    }

    pub fn leveled_to(&self) -> Option<u32> {
        self.events.iter().find_map(|e| match e {
            Event::LeveledUp { to } => Some(*to),
            _ => None,
        })
    }
}
