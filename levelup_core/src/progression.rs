//! Progression math: level thresholds and activity yields.
//!
//! Everything here is pure. The leveling engine and the ledgers call into
//! these functions; nothing in this module touches a `SaveState`.
//!
//! - Threshold: `floor(100 × 1.2^(level − 1))`
//! - Workout: strength from volume, endurance from minutes
//! - Diet: vitality from protein, plus a flat bonus near the calorie goal

use crate::{DietEntry, ExpMultipliers, Settings, WorkoutEntry};

/// Base EXP needed to clear level 1
pub const BASE_THRESHOLD: f64 = 100.0;

/// Growth factor applied per level
pub const THRESHOLD_GROWTH: f64 = 1.2;

/// Flat vitality bonus for a meal close to the calorie goal
pub const CALORIE_BAND_BONUS: f64 = 25.0;

/// Half-width of the band around the calorie goal that earns the bonus
pub const CALORIE_BAND: f64 = 100.0;

/// EXP required to advance from `level` to `level + 1`.
///
/// Levels below 1 are treated as level 1.
pub fn level_threshold(level: u32) -> f64 {
    let exponent = f64::from(level.saturating_sub(1));
    (BASE_THRESHOLD * THRESHOLD_GROWTH.powf(exponent)).floor()
}

/// EXP and stat contributions of one workout
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutYield {
    pub strength_exp: f64,
    pub endurance_exp: f64,
    pub total_minutes: f64,
    pub total_volume: f64,
}

impl WorkoutYield {
    /// Global EXP granted by the workout.
    ///
    /// Uses the same components as the two stat contributions, so the sum
    /// equals `strength_exp + endurance_exp`.
    pub fn exp_delta(&self, multipliers: &ExpMultipliers) -> f64 {
        multipliers.minutes * self.total_minutes + multipliers.total_weight * self.total_volume
    }
}

/// Compute the yield of a workout under the given multipliers
pub fn workout_yield(record: &WorkoutEntry, multipliers: &ExpMultipliers) -> WorkoutYield {
    let total_minutes: f64 = record.items.iter().map(|i| i.minutes).sum();
    let total_volume: f64 = record.items.iter().map(|i| i.volume()).sum();

    WorkoutYield {
        strength_exp: total_volume * multipliers.total_weight,
        endurance_exp: total_minutes * multipliers.minutes,
        total_minutes,
        total_volume,
    }
}

/// EXP and stat contribution of one meal
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DietYield {
    pub vitality_exp: f64,
}

/// Compute the yield of a meal against the current settings.
///
/// The band bonus applies once per meal, whether the meal is over or under
/// the goal.
pub fn diet_yield(record: &DietEntry, settings: &Settings) -> DietYield {
    let protein_exp = record.protein * settings.exp_multipliers.protein;
    let bonus = if within_calorie_band(record.calories, settings.calorie_goal) {
        CALORIE_BAND_BONUS
    } else {
        0.0
    };

    DietYield {
        vitality_exp: protein_exp + bonus,
    }
}

fn within_calorie_band(calories: f64, goal: f64) -> bool {
    (calories - goal).abs() <= CALORIE_BAND
}
