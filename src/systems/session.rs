use bevy_ecs::prelude::*;
use bevy_utils::tracing::{debug, info};

use crate::core::world::{IntentQueue, QuestIntent};
use crate::data::quests::QuestCatalog;
use crate::session::QuestSession;

/// Resource holding the catalog sessions start from.
#[derive(Resource, Debug)]
pub struct QuestCatalogRes(pub QuestCatalog);

/// Resource holding the active session, if any.
#[derive(Resource, Debug, Default)]
pub struct SessionSlot(pub Option<QuestSession>);

/// Resource collecting narration lines for the UI, in tick order.
#[derive(Resource, Debug, Default)]
pub struct SessionEventLog(pub Vec<String>);

/// Resource collecting the educational feedback attached to resolved choices.
#[derive(Resource, Debug, Default)]
pub struct FeedbackLog(pub Vec<String>);

/// Resource holding the seed new sessions are pinned to.
#[derive(Resource, Debug)]
pub struct SessionSeed(pub u64);

/// System: Starts, restarts, and abandons sessions. Selection intents are put
/// back for [`session_choice_system`].
pub fn session_admin_system(
    mut queue: ResMut<IntentQueue>,
    catalog: Res<QuestCatalogRes>,
    seed: Res<SessionSeed>,
    mut slot: ResMut<SessionSlot>,
    mut events: ResMut<SessionEventLog>,
) {
    let intents = std::mem::take(&mut queue.0);
    queue.0 = apply_admin_intents(intents, &catalog.0, seed.0, &mut slot, &mut events);
}

/// System: Resolves the first selection intent of the tick; extras are
/// dropped with a note in the event log.
pub fn session_choice_system(
    mut queue: ResMut<IntentQueue>,
    catalog: Res<QuestCatalogRes>,
    mut slot: ResMut<SessionSlot>,
    mut events: ResMut<SessionEventLog>,
    mut feedback: ResMut<FeedbackLog>,
) {
    let intents = std::mem::take(&mut queue.0);
    resolve_selections(intents, &catalog.0, &mut slot, &mut events, &mut feedback);
}

/// Handle everything except selections and return the selections in order.
pub fn apply_admin_intents(
    intents: Vec<QuestIntent>,
    catalog: &QuestCatalog,
    seed: u64,
    slot: &mut SessionSlot,
    events: &mut SessionEventLog,
) -> Vec<QuestIntent> {
    let mut selections = Vec::new();
    for intent in intents {
        match intent {
            QuestIntent::Choose { .. } => selections.push(intent),
            QuestIntent::Start { quest_id } => {
                start_session(catalog, seed, slot, events, &quest_id);
            }
            QuestIntent::Restart => restart_session(catalog, slot, events),
            QuestIntent::Abandon => abandon_session(slot, events),
        }
    }
    selections
}

fn start_session(
    catalog: &QuestCatalog,
    seed: u64,
    slot: &mut SessionSlot,
    events: &mut SessionEventLog,
    quest_id: &str,
) {
    let Some(quest) = catalog.quest(quest_id) else {
        events
            .0
            .push(format!("No quest named {} in the catalog", quest_id));
        return;
    };

    if let Some(previous) = slot.0.take() {
        if !previous.is_terminal() {
            events
                .0
                .push(format!("Quest abandoned: {}", previous.quest_id));
        }
    }

    match QuestSession::start(quest, seed) {
        Ok(session) => {
            info!("session started: {} (seed {})", quest.id, seed);
            events.0.push(format!("Quest started: {}", quest.title));
            if !quest.intro.is_empty() {
                events.0.push(quest.intro.clone());
            }
            slot.0 = Some(session);
        }
        Err(err) => {
            events
                .0
                .push(format!("Quest {} failed validation: {}", quest_id, err));
        }
    }
}

fn restart_session(catalog: &QuestCatalog, slot: &mut SessionSlot, events: &mut SessionEventLog) {
    let Some(session) = slot.0.as_mut() else {
        events.0.push("No active session to restart".to_string());
        return;
    };
    let Some(quest) = catalog.quest(&session.quest_id) else {
        events.0.push(format!(
            "Quest {} missing from the catalog",
            session.quest_id
        ));
        return;
    };

    session.reset(quest);
    info!("session restarted: {}", quest.id);
    events.0.push(format!("Quest restarted: {}", quest.title));
    if !quest.intro.is_empty() {
        events.0.push(quest.intro.clone());
    }
}

fn abandon_session(slot: &mut SessionSlot, events: &mut SessionEventLog) {
    match slot.0.take() {
        Some(session) => {
            info!("session abandoned: {}", session.quest_id);
            events
                .0
                .push(format!("Quest abandoned: {}", session.quest_id));
        }
        None => events.0.push("No active session to abandon".to_string()),
    }
}

/// Resolve the first selection against the active session. The resolution
/// lines are mirrored into the event log; feedback goes to its own stream so
/// the UI can stage it separately.
pub fn resolve_selections(
    intents: Vec<QuestIntent>,
    catalog: &QuestCatalog,
    slot: &mut SessionSlot,
    events: &mut SessionEventLog,
    feedback: &mut FeedbackLog,
) {
    let mut chose = false;
    for intent in intents {
        let QuestIntent::Choose {
            stage_id,
            choice_id,
        } = intent
        else {
            continue;
        };
        if chose {
            debug!("dropping extra selection: {}/{}", stage_id, choice_id);
            events.0.push("Dropped extra selection this tick".to_string());
            continue;
        }
        chose = true;

        let Some(session) = slot.0.as_mut() else {
            events
                .0
                .push("No active session; start a quest first".to_string());
            continue;
        };
        let Some(quest) = catalog.quest(&session.quest_id) else {
            events.0.push(format!(
                "Quest {} missing from the catalog",
                session.quest_id
            ));
            continue;
        };

        let label = quest
            .stage(&stage_id)
            .and_then(|stage| stage.choice(&choice_id))
            .map(|choice| choice.label.clone())
            .unwrap_or_else(|| choice_id.clone());

        match session.choose(quest, &stage_id, &choice_id) {
            Ok(outcome) => {
                events.0.push(format!("[{}] {}", session.turn, label));
                for line in &outcome.applied {
                    events.0.push(format!("  {}", line));
                }
                if outcome.marked_incorrect {
                    events.0.push("That was not the right call".to_string());
                }
                if let Some(text) = outcome.feedback {
                    feedback.0.push(text);
                }
                if let Some(end) = &outcome.end {
                    info!("session ended: {} ({:?})", session.quest_id, end);
                    events
                        .0
                        .push(format!("Quest ends: {}", quest.endings.for_end(end)));
                }
            }
            Err(err) => {
                debug!("selection rejected: {}", err);
                events.0.push(format!("Selection rejected: {}", err));
            }
        }
    }
}
