pub mod session;

pub use session::{
    session_admin_system, session_choice_system, FeedbackLog, QuestCatalogRes, SessionEventLog,
    SessionSeed, SessionSlot,
};
