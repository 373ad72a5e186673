pub mod state;
pub mod vitals;

pub use state::{ChoiceOutcome, QuestSession, SelectionError, SessionStatus};
pub use vitals::{Vital, VitalBank};
