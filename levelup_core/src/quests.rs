//! Quest ledger: seed quests and one-shot completion.
//!
//! Completion grants the quest's coins and EXP in the same call that marks
//! it done. Completing an unknown or already-finished quest changes nothing.

use crate::leveling::{apply_exp_into, check_exp};
use crate::{Error, Event, Quest, QuestKind, Result, SaveState};

/// Quests present in a fresh save
pub fn seed_quests() -> Vec<Quest> {
    vec![
        Quest {
            id: "dq1".into(),
            title: "Consume 120g protein".into(),
            kind: QuestKind::Daily,
            target: Some(120.0),
            progress: Some(0.0),
            reward_exp: 50.0,
            reward_coins: 5,
            completed: false,
        },
        Quest {
            id: "dq2".into(),
            title: "Workout 60 min".into(),
            kind: QuestKind::Daily,
            target: Some(60.0),
            progress: Some(0.0),
            reward_exp: 60.0,
            reward_coins: 5,
            completed: false,
        },
        Quest {
            id: "wq1".into(),
            title: "Increase squat by 5kg".into(),
            kind: QuestKind::Weekly,
            target: None,
            progress: None,
            reward_exp: 150.0,
            reward_coins: 20,
            completed: false,
        },
    ]
}

/// Look up a quest and report whether it can still be completed,
/// including whether its EXP reward still fits the save
pub fn check_quest<'a>(state: &'a SaveState, id: &str) -> Result<&'a Quest> {
    let quest = state
        .quests
        .iter()
        .find(|q| q.id == id)
        .ok_or_else(|| Error::NotFound(format!("quest {}", id)))?;

    if quest.completed {
        return Err(Error::AlreadyCompleted(format!("quest {}", id)));
    }
    check_exp(state, quest.reward_exp)?;
    Ok(quest)
}

/// Complete a quest, granting coins and EXP.
///
/// Returns the raised events; an empty list means nothing changed.
pub fn complete_quest(state: &mut SaveState, id: &str) -> Vec<Event> {
    let (reward_exp, reward_coins) = match check_quest(state, id) {
        Ok(quest) => (quest.reward_exp, quest.reward_coins),
        Err(e) => {
            tracing::warn!("Ignoring quest completion: {}", e);
            return Vec::new();
        }
    };

    if let Some(quest) = state.quests.iter_mut().find(|q| q.id == id) {
        quest.completed = true;
    }
    state.coins = state.coins.saturating_add(reward_coins);

    let mut events = vec![Event::QuestCompleted { id: id.to_string() }];
    apply_exp_into(state, reward_exp, &mut events);

    tracing::info!(
        "Completed quest {}: +{} EXP, +{} coins",
        id,
        reward_exp,
        reward_coins
    );
    events
}
