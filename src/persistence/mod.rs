pub mod prefs;

pub use prefs::{PrefStore, DEFAULT_PREFS_PATH};
