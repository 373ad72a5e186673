pub mod ecs;
pub mod world;

pub use ecs::{create_schedule, create_world, load_quests_or_builtin, TickSet};
pub use world::{
    ChoiceListing, IntentQueue, QuestIntent, QuestRunner, QuestSnapshot, VitalReading,
};
