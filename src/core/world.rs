use bevy_ecs::prelude::*;

use crate::core::ecs::{create_schedule, create_world};
use crate::data::builtin_quest_catalog;
use crate::data::quests::QuestCatalog;
use crate::rules::outcome::QuestEnd;
use crate::session::{SessionStatus, Vital};
use crate::systems::session::{FeedbackLog, QuestCatalogRes, SessionEventLog, SessionSlot};

/// Commands fed into the ECS each tick. Within one tick, session admin
/// (start, restart, abandon) resolves before selections, and only the first
/// selection is honoured.
#[derive(Debug, Clone)]
pub enum QuestIntent {
    Start { quest_id: String },
    Choose { stage_id: String, choice_id: String },
    Restart,
    Abandon,
}

/// Resource storing the intents for the next tick.
#[derive(Resource, Default, Debug)]
pub struct IntentQueue(pub Vec<QuestIntent>);

/// One vital as the UI should render it.
#[derive(Debug, Clone)]
pub struct VitalReading {
    pub id: String,
    pub value: i64,
    pub max: i64,
    pub target: Option<i64>,
}

/// One selectable choice as the UI should render it.
#[derive(Debug, Clone)]
pub struct ChoiceListing {
    pub id: String,
    pub label: String,
    pub cost: i64,
}

/// Data snapshot returned to the UI layer after each tick. Flags are sorted
/// so equal sessions render identically.
#[derive(Debug, Clone, Default)]
pub struct QuestSnapshot {
    pub quest_id: Option<String>,
    pub title: Option<String>,
    pub status: Option<SessionStatus>,
    pub end: Option<QuestEnd>,
    pub stage_id: Option<String>,
    pub prompt: Option<String>,
    pub turn: u64,
    pub score: i64,
    pub score_target: Option<i64>,
    pub vitals: Vec<VitalReading>,
    pub flags: Vec<String>,
    pub available: Vec<ChoiceListing>,
    pub events: Vec<String>,
    pub feedback: Vec<String>,
}

/// Wrapper around the ECS world and schedule.
pub struct QuestRunner {
    world: World,
    schedule: Schedule,
    seed: u64,
}

impl QuestRunner {
    /// Runner over the builtin quest pack.
    pub fn new(seed: u64) -> Self {
        Self::with_catalog(seed, builtin_quest_catalog())
    }

    pub fn with_catalog(seed: u64, catalog: QuestCatalog) -> Self {
        let world = create_world(seed, catalog);
        let schedule = create_schedule();
        Self {
            world,
            schedule,
            seed,
        }
    }

    /// Run one tick with the provided intents and return a snapshot for
    /// rendering.
    pub fn tick(&mut self, intents: Vec<QuestIntent>) -> QuestSnapshot {
        {
            let mut queue = self.world.resource_mut::<IntentQueue>();
            queue.0 = intents;
        }

        self.schedule.run(&mut self.world);
        QuestSnapshot::capture(&self.world)
    }

    /// Snapshot without advancing the session.
    pub fn snapshot(&self) -> QuestSnapshot {
        QuestSnapshot::capture(&self.world)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl QuestSnapshot {
    fn capture(world: &World) -> Self {
        let events = world
            .get_resource::<SessionEventLog>()
            .map(|log| log.0.clone())
            .unwrap_or_default();
        let feedback = world
            .get_resource::<FeedbackLog>()
            .map(|log| log.0.clone())
            .unwrap_or_default();

        let slot = world.resource::<SessionSlot>();
        let Some(session) = slot.0.as_ref() else {
            return Self {
                events,
                feedback,
                ..Default::default()
            };
        };

        let catalog = world.resource::<QuestCatalogRes>();
        let quest = catalog.0.quest(&session.quest_id);
        let stage = quest.and_then(|q| q.stage(&session.current_stage));

        let available = quest
            .map(|q| {
                session
                    .available_choices(q)
                    .iter()
                    .map(|choice| ChoiceListing {
                        id: choice.id.clone(),
                        label: choice.label.clone(),
                        cost: choice.cost,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut flags: Vec<String> = session.flags.iter().cloned().collect();
        flags.sort();

        Self {
            quest_id: Some(session.quest_id.clone()),
            title: quest.map(|q| q.title.clone()),
            status: Some(session.status),
            end: session.end.clone(),
            stage_id: Some(session.current_stage.clone()),
            prompt: stage.map(|s| s.prompt.clone()),
            turn: session.turn,
            score: session.score,
            score_target: quest.and_then(|q| q.score_target),
            vitals: session.vitals.iter().map(VitalReading::of).collect(),
            flags,
            available,
            events,
            feedback,
        }
    }
}

impl VitalReading {
    fn of(vital: &Vital) -> Self {
        Self {
            id: vital.id.clone(),
            value: vital.value,
            max: vital.max,
            target: vital.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runner_plays_a_quest_end_to_end() {
        let mut runner = QuestRunner::new(7);
        let snapshot = runner.tick(vec![QuestIntent::Start {
            quest_id: "sarcophagus-cipher".to_string(),
        }]);
        assert_eq!(snapshot.quest_id.as_deref(), Some("sarcophagus-cipher"));
        assert_eq!(snapshot.status, Some(SessionStatus::Playing));
        assert_eq!(snapshot.stage_id.as_deref(), Some("riddle-sun"));
        assert!(snapshot.prompt.is_some());
        assert_eq!(snapshot.available.len(), 3);

        let script = [
            ("riddle-sun", "name-ra"),
            ("riddle-river", "answer-silt"),
            ("riddle-scale", "answer-feather"),
            ("riddle-door", "speak-name"),
        ];
        let mut last = snapshot;
        for (stage_id, choice_id) in script {
            last = runner.tick(vec![QuestIntent::Choose {
                stage_id: stage_id.to_string(),
                choice_id: choice_id.to_string(),
            }]);
        }
        assert_eq!(last.status, Some(SessionStatus::Won));
        assert_eq!(last.end, Some(QuestEnd::AllTargetsMet));
        assert_eq!(last.score, 4);
        assert!(last.available.is_empty());
    }

    #[test]
    fn test_first_choose_wins_within_a_tick() {
        let mut runner = QuestRunner::new(7);
        runner.tick(vec![QuestIntent::Start {
            quest_id: "verdant-biosphere".to_string(),
        }]);
        let snapshot = runner.tick(vec![
            QuestIntent::Choose {
                stage_id: "control-room".to_string(),
                choice_id: "install-filter".to_string(),
            },
            QuestIntent::Choose {
                stage_id: "control-room".to_string(),
                choice_id: "install-filter".to_string(),
            },
        ]);
        assert_eq!(snapshot.turn, 1);
        let water = snapshot
            .vitals
            .iter()
            .find(|v| v.id == "water")
            .map(|v| v.value);
        assert_eq!(water, Some(55));
        assert!(snapshot
            .events
            .iter()
            .any(|line| line.contains("Dropped extra selection")));
    }

    #[test]
    fn test_admin_intents_resolve_before_selections() {
        let mut runner = QuestRunner::new(7);
        runner.tick(vec![QuestIntent::Start {
            quest_id: "verdant-biosphere".to_string(),
        }]);
        // Abandon and a selection in the same tick: the selection finds no
        // session to act on.
        let snapshot = runner.tick(vec![
            QuestIntent::Choose {
                stage_id: "control-room".to_string(),
                choice_id: "install-filter".to_string(),
            },
            QuestIntent::Abandon,
        ]);
        assert_eq!(snapshot.quest_id, None);
        assert!(snapshot.events.iter().any(|line| line.contains("abandoned")));
    }

    #[test]
    fn test_restart_returns_to_initial_state() {
        let mut runner = QuestRunner::new(7);
        runner.tick(vec![QuestIntent::Start {
            quest_id: "verdant-biosphere".to_string(),
        }]);
        runner.tick(vec![QuestIntent::Choose {
            stage_id: "control-room".to_string(),
            choice_id: "dump-greywater".to_string(),
        }]);
        let lost = runner.snapshot();
        assert_eq!(lost.status, Some(SessionStatus::Lost));

        let fresh = runner.tick(vec![QuestIntent::Restart]);
        assert_eq!(fresh.status, Some(SessionStatus::Playing));
        assert_eq!(fresh.turn, 0);
        let plant = fresh
            .vitals
            .iter()
            .find(|v| v.id == "plant")
            .map(|v| v.value);
        assert_eq!(plant, Some(25));
    }

    #[test]
    fn test_unknown_quest_start_reports_and_leaves_slot_empty() {
        let mut runner = QuestRunner::new(7);
        let snapshot = runner.tick(vec![QuestIntent::Start {
            quest_id: "no-such-quest".to_string(),
        }]);
        assert_eq!(snapshot.quest_id, None);
        assert!(snapshot
            .events
            .iter()
            .any(|line| line.contains("no-such-quest")));
    }
}
