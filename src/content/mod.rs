pub mod repository;
pub mod schema;
pub mod sqlite;

pub use repository::{CatalogQuestRepository, ContentStats, QuestRepository, QuestSummary};
pub use sqlite::SqliteQuestRepository;
