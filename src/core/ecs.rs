use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemSet;
use bevy_utils::tracing::warn;

use crate::core::world::IntentQueue;
use crate::data::builtin_quest_catalog;
use crate::data::quests::{load_quest_catalog, QuestCatalog};
use crate::systems::session::{
    session_admin_system, session_choice_system, FeedbackLog, QuestCatalogRes, SessionEventLog,
    SessionSeed, SessionSlot,
};

/// Canonical tick ordering for the engine.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum TickSet {
    Intake,
    Simulation,
    Cleanup,
}

/// Build the ECS world with baseline resources.
pub fn create_world(seed: u64, catalog: QuestCatalog) -> World {
    let mut world = World::new();
    world.insert_resource(IntentQueue::default());
    world.insert_resource(SessionSlot::default());
    world.insert_resource(SessionEventLog::default());
    world.insert_resource(FeedbackLog::default());
    world.insert_resource(SessionSeed(seed));
    world.insert_resource(QuestCatalogRes(catalog));
    world
}

/// Build the system schedule in the canonical order.
pub fn create_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.configure_sets((TickSet::Intake, TickSet::Simulation, TickSet::Cleanup).chain());

    schedule.add_systems((
        session_admin_system.in_set(TickSet::Intake),
        session_choice_system.in_set(TickSet::Simulation),
    ));

    schedule
}

/// Load a quest catalog file, falling back to the builtin pack on any
/// failure. `None` means the builtin pack was asked for directly.
pub fn load_quests_or_builtin(path: Option<&str>) -> QuestCatalog {
    let Some(path) = path else {
        return builtin_quest_catalog();
    };
    match load_quest_catalog(path) {
        Ok(catalog) => catalog,
        Err(err) => {
            warn!("failed to load quests from {}: {}", path, err);
            builtin_quest_catalog()
        }
    }
}
