use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneCatalog {
    pub schema_version: u32,
    pub zones: Vec<ZoneDef>,
}

/// A learning zone grouping related quests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub difficulty: ZoneDifficulty,
    #[serde(default)]
    pub blurb: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZoneDifficulty {
    Intro,
    Standard,
    Advanced,
}

impl ZoneDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneDifficulty::Intro => "INTRO",
            ZoneDifficulty::Standard => "STANDARD",
            ZoneDifficulty::Advanced => "ADVANCED",
        }
    }
}

impl std::str::FromStr for ZoneDifficulty {
    type Err = ZoneDataError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "INTRO" => Ok(ZoneDifficulty::Intro),
            "STANDARD" => Ok(ZoneDifficulty::Standard),
            "ADVANCED" => Ok(ZoneDifficulty::Advanced),
            other => Err(ZoneDataError::Validation(format!(
                "unknown zone difficulty {}",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub enum ZoneDataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for ZoneDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneDataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            ZoneDataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            ZoneDataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ZoneDataError {}

pub fn load_zone_catalog(path: impl AsRef<Path>) -> Result<ZoneCatalog, ZoneDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ZoneDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog: ZoneCatalog = serde_json::from_str(&raw).map_err(|source| ZoneDataError::Json {
        path: path.display().to_string(),
        source,
    })?;
    catalog.validate()?;
    Ok(catalog)
}

impl ZoneCatalog {
    pub fn validate(&self) -> Result<(), ZoneDataError> {
        if self.schema_version == 0 {
            return Err(ZoneDataError::Validation(
                "zone catalog schema_version must be >= 1".to_string(),
            ));
        }
        let mut ids = HashSet::new();
        for zone in &self.zones {
            if zone.id.trim().is_empty() {
                return Err(ZoneDataError::Validation(
                    "zone id cannot be empty".to_string(),
                ));
            }
            if !ids.insert(zone.id.clone()) {
                return Err(ZoneDataError::Validation(format!(
                    "duplicate zone id {}",
                    zone.id
                )));
            }
            if zone.title.trim().is_empty() {
                return Err(ZoneDataError::Validation(format!(
                    "zone {} missing title",
                    zone.id
                )));
            }
            if zone.subject.trim().is_empty() {
                return Err(ZoneDataError::Validation(format!(
                    "zone {} missing subject",
                    zone.id
                )));
            }
        }
        Ok(())
    }

    pub fn zone(&self, zone_id: &str) -> Option<&ZoneDef> {
        self.zones.iter().find(|zone| zone.id == zone_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(id: &str) -> ZoneDef {
        ZoneDef {
            id: id.to_string(),
            title: format!("Zone {}", id),
            subject: "ecology".to_string(),
            difficulty: ZoneDifficulty::Intro,
            blurb: String::new(),
        }
    }

    #[test]
    fn test_valid_catalog_passes() {
        let catalog = ZoneCatalog {
            schema_version: 1,
            zones: vec![zone("eco"), zone("cyber")],
        };
        catalog.validate().unwrap();
    }

    #[test]
    fn test_rejects_duplicate_zone_id() {
        let catalog = ZoneCatalog {
            schema_version: 1,
            zones: vec![zone("eco"), zone("eco")],
        };
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_rejects_empty_title() {
        let mut broken = zone("eco");
        broken.title = " ".to_string();
        let catalog = ZoneCatalog {
            schema_version: 1,
            zones: vec![broken],
        };
        assert!(catalog.validate().is_err());
    }
}
