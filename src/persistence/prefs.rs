use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy_utils::tracing::warn;
use serde::{Deserialize, Serialize};

use crate::content::schema::DEFAULT_LOCALE;

pub const DEFAULT_PREFS_PATH: &str = "./questforge_prefs.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PrefDoc {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Key/value preferences persisted as JSON. Reads and writes are
/// best-effort: a missing or broken file degrades to defaults, and a failed
/// write is logged and dropped. Preferences are never worth a crash.
#[derive(Debug)]
pub struct PrefStore {
    path: PathBuf,
    doc: PrefDoc,
}

impl PrefStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let doc = read_doc(&path);
        Self { path, doc }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.doc.entries.get(key).map(String::as_str)
    }

    /// Stores the value and writes the file through immediately.
    pub fn set(&mut self, key: &str, value: &str) {
        self.doc
            .entries
            .insert(key.to_string(), value.to_string());
        self.save();
    }

    /// Locale preference, falling back to the content default.
    pub fn locale(&self) -> &str {
        self.get("locale").unwrap_or(DEFAULT_LOCALE)
    }

    /// Re-reads the file, dropping any state another process has not seen.
    pub fn reload(&mut self) {
        self.doc = read_doc(&self.path);
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.doc
            .entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    fn save(&self) {
        match serde_json::to_string_pretty(&self.doc) {
            Ok(json) => {
                if let Err(err) = fs::write(&self.path, json) {
                    warn!("failed to write prefs to {}: {}", self.path.display(), err);
                }
            }
            Err(err) => warn!("failed to serialize prefs: {}", err),
        }
    }
}

fn read_doc(path: &Path) -> PrefDoc {
    // A missing file is the normal first run.
    let Ok(raw) = fs::read_to_string(path) else {
        return PrefDoc::default();
    };
    match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(err) => {
            warn!("ignoring malformed prefs file {}: {}", path.display(), err);
            PrefDoc::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("questforge_prefs_{}_{}.json", tag, std::process::id()))
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let store = PrefStore::open(temp_path("missing"));
        assert_eq!(store.get("locale"), None);
        assert_eq!(store.locale(), "en");
    }

    #[test]
    fn test_set_persists_across_opens() {
        let path = temp_path("persists");
        let mut store = PrefStore::open(&path);
        store.set("locale", "de");
        store.set("last_quest", "verdant-biosphere");

        let reopened = PrefStore::open(&path);
        assert_eq!(reopened.locale(), "de");
        assert_eq!(reopened.get("last_quest"), Some("verdant-biosphere"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let path = temp_path("reload");
        let mut store = PrefStore::open(&path);
        store.set("volume", "3");

        let mut other = PrefStore::open(&path);
        other.set("volume", "7");

        store.reload();
        assert_eq!(store.get("volume"), Some("7"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_malformed_file_degrades_to_defaults() {
        let path = temp_path("malformed");
        fs::write(&path, "not json at all").unwrap();
        let store = PrefStore::open(&path);
        assert_eq!(store.get("anything"), None);
        assert_eq!(store.locale(), "en");
        let _ = fs::remove_file(&path);
    }
}
