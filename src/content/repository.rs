use crate::data::quests::{QuestCatalog, QuestDefinition};
use crate::data::zones::{ZoneCatalog, ZoneDef};
use crate::data::{builtin_quest_catalog, builtin_zone_catalog};

/// One row in a quest listing.
#[derive(Debug, Clone)]
pub struct QuestSummary {
    pub id: String,
    pub zone: String,
    pub title: String,
    pub stage_count: usize,
    pub blurb: String,
}

impl QuestSummary {
    pub fn of(quest: &QuestDefinition) -> Self {
        Self {
            id: quest.id.clone(),
            zone: quest.zone.clone(),
            title: quest.title.clone(),
            stage_count: quest.stage_count(),
            blurb: quest.intro.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ContentStats {
    pub zone_count: i64,
    pub quest_count: i64,
    pub stage_count: i64,
}

pub trait QuestRepository {
    fn stats(&self) -> Result<ContentStats, Box<dyn std::error::Error>>;
    fn zones(&self) -> Result<Vec<ZoneDef>, Box<dyn std::error::Error>>;
    fn quests_in_zone(
        &self,
        zone_id: &str,
    ) -> Result<Vec<QuestSummary>, Box<dyn std::error::Error>>;
    fn quest(&self, quest_id: &str)
        -> Result<Option<QuestDefinition>, Box<dyn std::error::Error>>;
}

/// In-memory repository over validated catalogs. Backs the shipped content
/// pack and any catalog loaded from JSON.
pub struct CatalogQuestRepository {
    zones: ZoneCatalog,
    quests: QuestCatalog,
}

impl CatalogQuestRepository {
    pub fn new(
        zones: ZoneCatalog,
        quests: QuestCatalog,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        validate_catalogs(&zones, &quests)?;
        Ok(Self { zones, quests })
    }

    pub fn builtin() -> Result<Self, Box<dyn std::error::Error>> {
        Self::new(builtin_zone_catalog(), builtin_quest_catalog())
    }
}

/// Validates both catalogs and the zone references between them.
pub(crate) fn validate_catalogs(
    zones: &ZoneCatalog,
    quests: &QuestCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    zones.validate()?;
    quests.validate()?;
    for quest in &quests.quests {
        if zones.zone(&quest.zone).is_none() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("quest {} names unknown zone {}", quest.id, quest.zone),
            )
            .into());
        }
    }
    Ok(())
}

impl QuestRepository for CatalogQuestRepository {
    fn stats(&self) -> Result<ContentStats, Box<dyn std::error::Error>> {
        Ok(ContentStats {
            zone_count: self.zones.zones.len() as i64,
            quest_count: self.quests.quests.len() as i64,
            stage_count: self
                .quests
                .quests
                .iter()
                .map(|quest| quest.stage_count() as i64)
                .sum(),
        })
    }

    fn zones(&self) -> Result<Vec<ZoneDef>, Box<dyn std::error::Error>> {
        Ok(self.zones.zones.clone())
    }

    fn quests_in_zone(
        &self,
        zone_id: &str,
    ) -> Result<Vec<QuestSummary>, Box<dyn std::error::Error>> {
        Ok(self
            .quests
            .quests
            .iter()
            .filter(|quest| quest.zone == zone_id)
            .map(QuestSummary::of)
            .collect())
    }

    fn quest(
        &self,
        quest_id: &str,
    ) -> Result<Option<QuestDefinition>, Box<dyn std::error::Error>> {
        Ok(self.quests.quest(quest_id).cloned())
    }
}
