pub mod builtin;
pub mod quests;
pub mod zones;

pub use builtin::{builtin_quest_catalog, builtin_zone_catalog};
pub use quests::{
    load_quest_catalog, ChoiceDef, EndingTexts, IncorrectPolicy, QuestCatalog, QuestDataError,
    QuestDefinition, StageDef, VitalSpec,
};
pub use zones::{load_zone_catalog, ZoneCatalog, ZoneDataError, ZoneDef, ZoneDifficulty};
