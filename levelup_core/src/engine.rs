//! The progression engine: sole owner of a `SaveState`.
//!
//! All mutation goes through the methods here. Each mutating call either
//! applies completely or leaves the state as it was, and reports what
//! happened as a list of `Event`s instead of talking to any UI. Persisting
//! the result is the host's job: call `serialize` (or a `SnapshotStore`)
//! after every mutation.

use crate::{
    ledger, quests, snapshot, DietEntry, Error, Event, ExerciseSet, Meal, Outcome, Photo,
    PhotoBlob, Quest, Result, SaveState, Settings, WeightEntry, WorkoutEntry,
};
use chrono::{DateTime, Utc};

/// Engine instance owning the save state
#[derive(Clone, Debug, Default)]
pub struct Engine {
    state: SaveState,
}

impl Engine {
    /// Start from an existing state (e.g. one loaded from storage)
    pub fn new(state: SaveState) -> Self {
        Self { state }
    }

    /// Start from the encoded snapshot, or the default state when absent
    pub fn open(snapshot: Option<&[u8]>) -> Result<Self> {
        match snapshot {
            Some(bytes) => Ok(Self::new(snapshot::deserialize(bytes)?)),
            None => Ok(Self::default()),
        }
    }

    pub fn state(&self) -> &SaveState {
        &self.state
    }

    pub fn into_state(self) -> SaveState {
        self.state
    }

    // ------------------------------------------------------------------
    // Activity ledger
    // ------------------------------------------------------------------

    pub fn log_workout(&mut self, items: Vec<ExerciseSet>) -> Result<Outcome<WorkoutEntry>> {
        self.log_workout_at(items, Utc::now())
    }

    pub fn log_workout_at(
        &mut self,
        items: Vec<ExerciseSet>,
        at: DateTime<Utc>,
    ) -> Result<Outcome<WorkoutEntry>> {
        ledger::log_workout(&mut self.state, items, at)
    }

    pub fn log_diet(&mut self, meal: Meal) -> Result<Outcome<DietEntry>> {
        self.log_diet_at(meal, Utc::now())
    }

    pub fn log_diet_at(&mut self, meal: Meal, at: DateTime<Utc>) -> Result<Outcome<DietEntry>> {
        ledger::log_diet(&mut self.state, meal, at)
    }

    pub fn log_weight(&mut self, weight: f64, body_fat: Option<f64>) -> Result<Outcome<WeightEntry>> {
        self.log_weight_at(weight, body_fat, Utc::now())
    }

    pub fn log_weight_at(
        &mut self,
        weight: f64,
        body_fat: Option<f64>,
        at: DateTime<Utc>,
    ) -> Result<Outcome<WeightEntry>> {
        ledger::log_weight(&mut self.state, weight, body_fat, at)
    }

    pub fn log_photo(&mut self, image: PhotoBlob) -> Outcome<Photo> {
        self.log_photo_at(image, Utc::now())
    }

    pub fn log_photo_at(&mut self, image: PhotoBlob, at: DateTime<Utc>) -> Outcome<Photo> {
        ledger::log_photo(&mut self.state, image, at)
    }

    // ------------------------------------------------------------------
    // Quests
    // ------------------------------------------------------------------

    /// Complete a quest; an empty event list means nothing changed
    pub fn complete_quest(&mut self, id: &str) -> Vec<Event> {
        quests::complete_quest(&mut self.state, id)
    }

    /// Why (or whether) a quest can be completed right now
    pub fn check_quest(&self, id: &str) -> Result<&Quest> {
        quests::check_quest(&self.state, id)
    }

    pub fn quest(&self, id: &str) -> Option<&Quest> {
        self.state.quests.iter().find(|q| q.id == id)
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    /// Replace the settings. Only future yields are affected.
    pub fn update_settings(&mut self, settings: Settings) -> Result<()> {
        check_settings(&settings)?;
        tracing::info!("Updated settings: {:?}", settings);
        self.state.settings = settings;
        Ok(())
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!("Updated display name: {:?}", name);
        self.state.settings.display_name = name;
    }

    // ------------------------------------------------------------------
    // Snapshot I/O
    // ------------------------------------------------------------------

    pub fn serialize(&self) -> Result<Vec<u8>> {
        snapshot::serialize(&self.state)
    }

    /// Wholesale substitution, no merging with the prior state
    pub fn replace(&mut self, state: SaveState) {
        tracing::info!("Replacing save state (level {})", state.level);
        self.state = state;
    }

    /// Decode and replace. On failure the current state is kept.
    pub fn import(&mut self, bytes: &[u8]) -> Result<()> {
        match snapshot::deserialize(bytes) {
            Ok(state) => {
                self.replace(state);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Import rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Restore the fixed default state. Confirming intent is the caller's job.
    pub fn reset(&mut self) -> &SaveState {
        tracing::info!("Resetting save state");
        self.state = snapshot::default_state();
        &self.state
    }

    /// Pretty-printed export with a level-stamped file name
    pub fn export(&self) -> Result<(String, Vec<u8>)> {
        Ok((
            snapshot::export_file_name(self.state.level),
            snapshot::serialize_pretty(&self.state)?,
        ))
    }

    /// Compact copy of the save with a level-stamped file name
    pub fn duplicate(&self) -> Result<(String, Vec<u8>)> {
        Ok((
            snapshot::export_file_name(self.state.level),
            snapshot::serialize(&self.state)?,
        ))
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    /// Fill of the EXP bar, in percent, capped at 100
    pub fn exp_progress(&self) -> f64 {
        (self.state.exp / self.state.next_level_exp * 100.0).min(100.0)
    }
}

/// Calorie goal must be positive; multipliers finite and non-negative
pub fn check_settings(settings: &Settings) -> Result<()> {
    if !(settings.calorie_goal.is_finite() && settings.calorie_goal > 0.0) {
        return Err(Error::InvalidSettings(format!(
            "calorie goal must be positive, got {}",
            settings.calorie_goal
        )));
    }

    let m = &settings.exp_multipliers;
    for (name, value) in [
        ("minutes", m.minutes),
        ("totalWeight", m.total_weight),
        ("protein", m.protein),
    ] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(Error::InvalidSettings(format!(
                "multiplier {} must be non-negative, got {}",
                name, value
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExpMultipliers;

    fn squat() -> ExerciseSet {
        ExerciseSet {
            exercise: "Squat".into(),
            sets: 3,
            reps: 5,
            weight: 60.0,
            minutes: 30.0,
        }
    }

    /// Drive an engine through every kind of mutation
    fn busy_engine() -> Engine {
        crate::logging::init_test();
        let mut engine = Engine::default();
        engine.log_workout(vec![squat()]).unwrap();
        engine
            .log_diet(Meal {
                calories: 2150.0,
                protein: 150.0,
                carbs: 210.0,
                fat: 65.0,
            })
            .unwrap();
        engine.log_weight(80.4, Some(17.5)).unwrap();
        engine.log_weight(80.1, None).unwrap();
        engine.log_photo(PhotoBlob::new("image/png", vec![0x89, 0x50, 0x4e, 0x47]));
        engine.complete_quest("dq1");
        engine.set_display_name("Sung");
        engine
    }

    #[test]
    fn test_roundtrip_reproduces_state() {
        let engine = busy_engine();
        let bytes = engine.serialize().unwrap();

        let reopened = Engine::open(Some(&bytes)).unwrap();
        assert_eq!(reopened.state(), engine.state());
    }

    #[test]
    fn test_open_without_snapshot_is_default() {
        let engine = Engine::open(None).unwrap();
        assert_eq!(engine.state(), &SaveState::default());
    }

    #[test]
    fn test_import_missing_stats_keeps_prior_state() {
        let mut engine = busy_engine();
        let before = engine.state().clone();

        let mut doc: serde_json::Value = serde_json::from_slice(&engine.serialize().unwrap()).unwrap();
        doc.as_object_mut().unwrap().remove("stats");
        let bytes = serde_json::to_vec(&doc).unwrap();

        let result = engine.import(&bytes);
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
        assert_eq!(engine.state(), &before);
    }

    fn with_counters(level: u64, coins: u64) -> Vec<u8> {
        let mut doc: serde_json::Value =
            serde_json::from_slice(&Engine::default().serialize().unwrap()).unwrap();
        doc["level"] = serde_json::json!(level);
        doc["coins"] = serde_json::json!(coins);
        serde_json::to_vec(&doc).unwrap()
    }

    #[test]
    fn test_import_rejects_level_out_of_range() {
        let mut engine = busy_engine();
        let before = engine.state().clone();

        for level in [
            u64::from(crate::leveling::MAX_LEVEL) + 1,
            u64::from(u32::MAX),
        ] {
            assert!(matches!(
                engine.import(&with_counters(level, 0)),
                Err(Error::InvalidFormat(_))
            ));
        }
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_imported_limits_still_complete_quests() {
        let max = crate::leveling::MAX_LEVEL;
        let mut doc: serde_json::Value =
            serde_json::from_slice(&with_counters(u64::from(max), u64::MAX)).unwrap();
        doc["nextLevelExp"] = serde_json::json!(crate::level_threshold(max));

        let mut engine = Engine::default();
        engine.import(&serde_json::to_vec(&doc).unwrap()).unwrap();

        let events = engine.complete_quest("wq1");

        assert_eq!(events, vec![Event::QuestCompleted { id: "wq1".into() }]);
        assert_eq!(engine.state().coins, u64::MAX);
        assert_eq!(engine.state().level, crate::leveling::MAX_LEVEL);

        let reopened = Engine::open(Some(&engine.serialize().unwrap())).unwrap();
        assert_eq!(reopened.state(), engine.state());
    }

    #[test]
    fn test_set_display_name() {
        let mut engine = Engine::default();
        engine.set_display_name("Jinwoo");
        assert_eq!(engine.state().settings.display_name, "Jinwoo");
    }

    #[test]
    fn test_import_replaces_wholesale() {
        let mut engine = busy_engine();
        let other = Engine::default().serialize().unwrap();

        engine.import(&other).unwrap();

        assert_eq!(engine.state(), &SaveState::default());
        assert!(engine.state().workouts.is_empty());
    }

    #[test]
    fn test_reset_always_yields_default() {
        let mut engine = busy_engine();
        assert_ne!(engine.state(), &SaveState::default());

        engine.reset();
        assert_eq!(engine.state(), &SaveState::default());

        engine.reset();
        assert_eq!(engine.state(), &SaveState::default());
    }

    #[test]
    fn test_export_and_duplicate_names_embed_level() {
        let engine = busy_engine();
        let level = engine.state().level;

        let (export_name, export_bytes) = engine.export().unwrap();
        let (dup_name, dup_bytes) = engine.duplicate().unwrap();

        assert!(export_name.contains(&format!("level-{}", level)));
        assert_eq!(export_name, dup_name);
        assert_eq!(
            snapshot::deserialize(&export_bytes).unwrap(),
            snapshot::deserialize(&dup_bytes).unwrap()
        );
    }

    #[test]
    fn test_complete_quest_twice_is_byte_identical() {
        let mut engine = Engine::default();
        assert!(!engine.complete_quest("dq2").is_empty());
        let before = engine.serialize().unwrap();

        assert!(engine.complete_quest("dq2").is_empty());
        assert_eq!(engine.serialize().unwrap(), before);
    }

    #[test]
    fn test_settings_affect_only_future_yields() {
        let mut engine = Engine::default();
        engine.log_workout(vec![squat()]).unwrap();
        let strength_before = engine.state().stats.strength;

        let mut settings = engine.state().settings.clone();
        settings.exp_multipliers = ExpMultipliers {
            minutes: 1.0,
            total_weight: 1.0,
            protein: 1.0,
        };
        engine.update_settings(settings).unwrap();

        // Past contributions are not recomputed
        assert_eq!(engine.state().stats.strength, strength_before);

        engine.log_workout(vec![squat()]).unwrap();
        assert!((engine.state().stats.strength - (strength_before + 900.0)).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut engine = Engine::default();
        let before = engine.state().clone();

        let mut bad_goal = before.settings.clone();
        bad_goal.calorie_goal = 0.0;
        let mut bad_multiplier = before.settings.clone();
        bad_multiplier.exp_multipliers.protein = -0.5;

        assert!(matches!(
            engine.update_settings(bad_goal),
            Err(Error::InvalidSettings(_))
        ));
        assert!(matches!(
            engine.update_settings(bad_multiplier),
            Err(Error::InvalidSettings(_))
        ));
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_exp_progress() {
        let mut engine = Engine::default();
        assert_eq!(engine.exp_progress(), 0.0);

        crate::leveling::apply_exp(&mut engine.state, 25.0);
        assert!((engine.exp_progress() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_stats_never_decrease_across_operations() {
        let mut engine = Engine::default();
        let mut previous = engine.state().stats.clone();

        for i in 0..20 {
            match i % 3 {
                0 => {
                    engine.log_workout(vec![squat()]).unwrap();
                }
                1 => {
                    engine
                        .log_diet(Meal {
                            calories: 1900.0 + f64::from(i) * 20.0,
                            protein: 30.0,
                            ..Meal::default()
                        })
                        .unwrap();
                }
                _ => {
                    engine.log_weight(80.0, None).unwrap();
                }
            }

            let current = engine.state().stats.clone();
            for ((_, before), (_, after)) in previous.iter().zip(current.iter()) {
                assert!(after >= before);
            }
            assert!(engine.state().exp < engine.state().next_level_exp);
            previous = current;
        }
    }
}
