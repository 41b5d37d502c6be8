//! Activity ledgers: workouts, meals, weigh-ins and photos.
//!
//! Every ledger is append-only and newest-first: records are prepended and
//! never edited or removed. Workouts and meals feed stats and global EXP;
//! weigh-ins and photos are history only.
//!
//! Records are checked before anything is mutated, so a rejected record
//! leaves the state untouched.

use crate::leveling::{apply_exp_into, check_exp};
use crate::progression::{diet_yield, workout_yield};
use crate::{
    Attribute, DietEntry, Error, ExerciseSet, Meal, Outcome, Photo, PhotoBlob, Result, SaveState,
    WeightEntry, WorkoutEntry,
};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a fresh record id
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Log a workout, credit Strength/Endurance and apply the combined EXP
pub fn log_workout(
    state: &mut SaveState,
    items: Vec<ExerciseSet>,
    at: DateTime<Utc>,
) -> Result<Outcome<WorkoutEntry>> {
    check_workout_items(&items)?;

    let record = WorkoutEntry {
        id: new_id(),
        date: at,
        items,
    };
    let multipliers = &state.settings.exp_multipliers;
    let yields = workout_yield(&record, multipliers);
    let exp_delta = yields.exp_delta(multipliers);

    check_gain(state, Attribute::Strength, yields.strength_exp)?;
    check_gain(state, Attribute::Endurance, yields.endurance_exp)?;
    check_gain_exp(state, exp_delta)?;

    state.workouts.insert(0, record.clone());
    state.stats.add(Attribute::Strength, yields.strength_exp);
    state.stats.add(Attribute::Endurance, yields.endurance_exp);

    let mut events = Vec::new();
    apply_exp_into(state, exp_delta, &mut events);

    tracing::debug!(
        "Logged workout {}: {} min, {} kg volume, +{:.1} EXP",
        record.id,
        yields.total_minutes,
        yields.total_volume,
        exp_delta
    );

    Ok(Outcome {
        record,
        exp_gained: exp_delta,
        events,
    })
}

/// Log a meal, credit Vitality and apply it as EXP
pub fn log_diet(state: &mut SaveState, meal: Meal, at: DateTime<Utc>) -> Result<Outcome<DietEntry>> {
    check_meal(&meal)?;

    let record = DietEntry {
        id: new_id(),
        date: at,
        calories: meal.calories,
        protein: meal.protein,
        carbs: meal.carbs,
        fat: meal.fat,
    };
    let vitality_exp = diet_yield(&record, &state.settings).vitality_exp;
    check_gain(state, Attribute::Vitality, vitality_exp)?;
    check_gain_exp(state, vitality_exp)?;

    state.diet.insert(0, record.clone());
    state.stats.add(Attribute::Vitality, vitality_exp);

    let mut events = Vec::new();
    apply_exp_into(state, vitality_exp, &mut events);

    tracing::debug!(
        "Logged meal {}: {} kcal, {} g protein, +{:.1} EXP",
        record.id,
        record.calories,
        record.protein,
        vitality_exp
    );

    Ok(Outcome {
        record,
        exp_gained: vitality_exp,
        events,
    })
}

/// Record a body-weight check-in (no EXP effect)
pub fn log_weight(
    state: &mut SaveState,
    weight: f64,
    body_fat: Option<f64>,
    at: DateTime<Utc>,
) -> Result<Outcome<WeightEntry>> {
    check_weight(weight, body_fat)?;

    let record = WeightEntry {
        date: at,
        weight,
        body_fat,
    };
    state.weights.insert(0, record.clone());

    tracing::debug!("Logged weight {} kg (body fat {:?})", weight, body_fat);
    Ok(Outcome::quiet(record))
}

/// Attach a progress photo (no EXP effect)
pub fn log_photo(state: &mut SaveState, image: PhotoBlob, at: DateTime<Utc>) -> Outcome<Photo> {
    let record = Photo {
        id: new_id(),
        date: at,
        image,
    };
    state.photos.insert(0, record.clone());

    tracing::debug!(
        "Logged photo {} ({}, {} bytes)",
        record.id,
        record.image.mime,
        record.image.bytes.len()
    );
    Outcome::quiet(record)
}

// ============================================================================
// Structural checks
// ============================================================================

fn check_quantity(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidEntry(format!(
            "{} must be a non-negative number, got {}",
            field, value
        )))
    }
}

/// A computed yield must be finite and keep the attribute finite
fn check_gain(state: &SaveState, attribute: Attribute, amount: f64) -> Result<()> {
    if !amount.is_finite() || !(state.stats.get(attribute) + amount).is_finite() {
        return Err(Error::InvalidEntry(format!(
            "{} gain of {} is out of range",
            attribute.name(),
            amount
        )));
    }
    Ok(())
}

fn check_gain_exp(state: &SaveState, delta: f64) -> Result<()> {
    if !delta.is_finite() {
        return Err(Error::InvalidEntry(format!("EXP gain of {} is out of range", delta)));
    }
    check_exp(state, delta).map_err(|e| Error::InvalidEntry(e.to_string()))
}

/// Reject exercise lines with negative or non-finite load/duration
pub fn check_workout_items(items: &[ExerciseSet]) -> Result<()> {
    for item in items {
        check_quantity("weight", item.weight)?;
        check_quantity("minutes", item.minutes)?;
    }
    Ok(())
}

/// Reject meals with negative or non-finite macros
pub fn check_meal(meal: &Meal) -> Result<()> {
    check_quantity("calories", meal.calories)?;
    check_quantity("protein", meal.protein)?;
    check_quantity("carbs", meal.carbs)?;
    check_quantity("fat", meal.fat)
}

/// Weight must be positive; body fat, when given, a percentage
pub fn check_weight(weight: f64, body_fat: Option<f64>) -> Result<()> {
    if !(weight.is_finite() && weight > 0.0) {
        return Err(Error::InvalidEntry(format!(
            "weight must be positive, got {}",
            weight
        )));
    }
    if let Some(bf) = body_fat {
        if !(0.0..=100.0).contains(&bf) {
            return Err(Error::InvalidEntry(format!(
                "body fat must be within 0-100, got {}",
                bf
            )));
        }
    }
    Ok(())
}
