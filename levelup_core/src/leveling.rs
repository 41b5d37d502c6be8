//! Leveling engine: folds an EXP delta into a save state.
//!
//! A single delta may clear any number of thresholds. Each level-up
//! awards a fixed coin bonus and recomputes the next threshold from the
//! new level, so `exp < next_level_exp` holds when `apply_exp` returns.
//!
//! Levels stop at `MAX_LEVEL`; a delta that would carry past it is refused
//! whole rather than applied in part.

use crate::progression::level_threshold;
use crate::{Error, Event, Result, SaveState};

/// Coins awarded for every level gained
pub const LEVEL_UP_COINS: u64 = 10;

/// Highest level a save can reach. Its threshold is still a finite f64.
pub const MAX_LEVEL: u32 = 3000;

/// Summary of the level-ups produced by one `apply_exp` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelUp {
    pub from: u32,
    pub to: u32,
    pub coins_awarded: u64,
}

impl LevelUp {
    pub fn levels_gained(&self) -> u32 {
        self.to - self.from
    }

    /// Collapsed notification for the whole run of level-ups
    pub fn event(&self) -> Event {
        Event::LeveledUp { to: self.to }
    }
}

/// Check that `delta` can be folded into the state without the EXP total
/// overflowing or the level passing `MAX_LEVEL`.
///
/// Deltas that `apply_exp` ignores always pass.
pub fn check_exp(state: &SaveState, delta: f64) -> Result<()> {
    if !delta.is_finite() || delta <= 0.0 {
        return Ok(());
    }

    let mut exp = state.exp + delta;
    if !exp.is_finite() {
        return Err(Error::Overflow(format!(
            "adding {} EXP to {} is not representable",
            delta, state.exp
        )));
    }

    let mut level = state.level;
    let mut next = state.next_level_exp;
    while exp >= next {
        if level >= MAX_LEVEL {
            return Err(Error::Overflow(format!(
                "{} EXP would carry past level {}",
                delta, MAX_LEVEL
            )));
        }
        exp -= next;
        level += 1;
        next = level_threshold(level);
    }
    Ok(())
}

/// Apply an EXP delta to the state.
///
/// Zero, negative and non-finite deltas are no-ops, as are deltas refused
/// by `check_exp`. Returns `Some` when at least one level was gained.
pub fn apply_exp(state: &mut SaveState, delta: f64) -> Option<LevelUp> {
    if !delta.is_finite() || delta <= 0.0 {
        tracing::debug!("Ignoring non-positive EXP delta {}", delta);
        return None;
    }
    if let Err(e) = check_exp(state, delta) {
        tracing::warn!("Ignoring EXP delta: {}", e);
        return None;
    }

    let from = state.level;
    state.exp += delta;

    let mut coins_awarded: u64 = 0;
    while state.exp >= state.next_level_exp {
        state.exp -= state.next_level_exp;
        state.level += 1;
        state.coins = state.coins.saturating_add(LEVEL_UP_COINS);
        coins_awarded = coins_awarded.saturating_add(LEVEL_UP_COINS);
        state.next_level_exp = level_threshold(state.level);
    }

    if state.level == from {
        tracing::debug!(
            "Gained {:.1} EXP ({:.1}/{})",
            delta,
            state.exp,
            state.next_level_exp
        );
        return None;
    }

    tracing::info!("Level up: {} -> {}", from, state.level);

    Some(LevelUp {
        from,
        to: state.level,
        coins_awarded,
    })
}

/// Apply an EXP delta and push the collapsed level-up event, if any
pub(crate) fn apply_exp_into(state: &mut SaveState, delta: f64, events: &mut Vec<Event>) {
    if let Some(level_up) = apply_exp(state, delta) {
        events.push(level_up.event());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> SaveState {
        SaveState::default()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_small_delta_no_level_up() {
        let mut state = fresh();
        let result = apply_exp(&mut state, 40.0);

        assert!(result.is_none());
        assert_eq!(state.level, 1);
        assert!(approx(state.exp, 40.0));
        assert_eq!(state.coins, 0);
    }

    #[test]
    fn test_exact_threshold_levels_up() {
        let mut state = fresh();
        let result = apply_exp(&mut state, 100.0).unwrap();

        assert_eq!(result.from, 1);
        assert_eq!(result.to, 2);
        assert_eq!(state.level, 2);
        assert!(approx(state.exp, 0.0));
        assert_eq!(state.next_level_exp, 120.0);
        assert_eq!(state.coins, LEVEL_UP_COINS);
    }

    #[test]
    fn test_large_delta_collapses_into_one_event() {
        let mut state = fresh();
        // 100 + 120 + 144 = 364 clears three levels
        let result = apply_exp(&mut state, 370.0).unwrap();

        assert_eq!(result.levels_gained(), 3);
        assert_eq!(result.coins_awarded, 3 * LEVEL_UP_COINS);
        assert_eq!(result.event(), Event::LeveledUp { to: 4 });
        assert_eq!(state.level, 4);
        assert!(approx(state.exp, 6.0));
        assert_eq!(state.next_level_exp, level_threshold(4));
    }

    #[test]
    fn test_non_positive_delta_is_noop() {
        for delta in [0.0, -5.0, f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
            let mut state = fresh();
            state.exp = 42.0;
            let before = state.clone();

            assert!(apply_exp(&mut state, delta).is_none());
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_invariant_and_conservation() {
        let deltas = [0.5, 99.9, 100.0, 250.0, 1234.5, 10_000.0, 7.25];
        let mut state = fresh();

        for delta in deltas {
            let before = state.clone();
            apply_exp(&mut state, delta);

            assert!(state.exp < state.next_level_exp);
            assert!(state.level >= before.level);
            assert_eq!(state.next_level_exp, level_threshold(state.level));

            let spent: f64 = (before.level..state.level).map(level_threshold).sum();
            assert!(
                approx(spent + state.exp, before.exp + delta),
                "conservation broken for delta {}",
                delta
            );
        }
    }

    #[test]
    fn test_max_level_threshold_is_finite() {
        assert!(level_threshold(MAX_LEVEL).is_finite());
        assert!(level_threshold(MAX_LEVEL + 1).is_finite());
    }

    #[test]
    fn test_delta_past_max_level_is_refused_whole() {
        let mut state = fresh();
        state.level = MAX_LEVEL;
        state.next_level_exp = level_threshold(MAX_LEVEL);
        state.exp = state.next_level_exp / 2.0;
        let before = state.clone();
        let threshold = state.next_level_exp;

        assert!(matches!(
            check_exp(&state, threshold),
            Err(Error::Overflow(_))
        ));
        assert!(apply_exp(&mut state, threshold).is_none());
        assert_eq!(state, before);

        // Small gains at the cap still land
        assert!(check_exp(&state, 0.5).is_ok());
        assert!(apply_exp(&mut state, 0.5).is_none());
        assert_eq!(state.level, MAX_LEVEL);
        assert!(state.exp < state.next_level_exp);
    }

    #[test]
    fn test_unrepresentable_exp_is_refused() {
        let mut state = fresh();
        state.exp = 50.0;
        let before = state.clone();

        assert!(matches!(
            check_exp(&state, f64::MAX),
            Err(Error::Overflow(_))
        ));
        assert!(apply_exp(&mut state, f64::MAX).is_none());
        assert_eq!(state, before);
    }

    #[test]
    fn test_coins_saturate_on_level_up() {
        let mut state = fresh();
        state.coins = u64::MAX - 3;

        let result = apply_exp(&mut state, 100.0).unwrap();

        assert_eq!(result.to, 2);
        assert_eq!(state.coins, u64::MAX);
    }

    #[test]
    fn test_apply_exp_into_pushes_single_event() {
        let mut state = fresh();
        let mut events = Vec::new();

        apply_exp_into(&mut state, 50.0, &mut events);
        assert!(events.is_empty());

        apply_exp_into(&mut state, 500.0, &mut events);
        assert_eq!(events, vec![Event::LeveledUp { to: state.level }]);
    }
}
