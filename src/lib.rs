// Re-export core modules for use by the binary or other consumers
pub mod content;
pub mod core;
pub mod data;
pub mod flows;
pub mod persistence;
pub mod rules;
pub mod session;
pub mod systems;
pub mod ui;

// Expose the main runner wrapper and types needed for interaction
pub use crate::core::world::{QuestIntent, QuestRunner, QuestSnapshot};
pub use crate::session::{QuestSession, SessionStatus};
