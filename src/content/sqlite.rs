use std::path::Path;
use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::content::repository::{
    validate_catalogs, ContentStats, QuestRepository, QuestSummary,
};
use crate::content::schema::{CONTENT_SCHEMA_VERSION, CONTENT_VERSION};
use crate::data::quests::{QuestCatalog, QuestDefinition};
use crate::data::zones::{ZoneCatalog, ZoneDef, ZoneDifficulty};

/// Repository over a packaged content database. Quest definitions are stored
/// as JSON documents next to the columns the listings need.
pub struct SqliteQuestRepository {
    conn: Connection,
}

impl SqliteQuestRepository {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open(path)?;
        validate_content_meta(&conn)?;
        Ok(Self { conn })
    }

    /// In-memory database seeded from the given catalogs. Test and tooling
    /// entry point.
    pub fn open_in_memory(
        zones: &ZoneCatalog,
        quests: &QuestCatalog,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let conn = Connection::open_in_memory()?;
        bootstrap(&conn, zones, quests)?;
        Ok(Self { conn })
    }
}

/// Creates the content tables and fills them from validated catalogs.
pub fn bootstrap(
    conn: &Connection,
    zones: &ZoneCatalog,
    quests: &QuestCatalog,
) -> Result<(), Box<dyn std::error::Error>> {
    validate_catalogs(zones, quests)?;

    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS content_meta (\
             id INTEGER PRIMARY KEY,\
             schema_version INTEGER NOT NULL,\
             content_version TEXT NOT NULL\
         );\
         CREATE TABLE IF NOT EXISTS zone (\
             zone_id TEXT PRIMARY KEY,\
             title TEXT NOT NULL,\
             subject TEXT NOT NULL,\
             difficulty TEXT NOT NULL,\
             blurb TEXT NOT NULL\
         );\
         CREATE TABLE IF NOT EXISTS quest (\
             quest_id TEXT PRIMARY KEY,\
             zone_id TEXT NOT NULL,\
             title TEXT NOT NULL,\
             stage_count INTEGER NOT NULL,\
             blurb TEXT NOT NULL,\
             doc TEXT NOT NULL\
         );",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO content_meta (id, schema_version, content_version) \
         VALUES (1, ?1, ?2)",
        params![i64::from(CONTENT_SCHEMA_VERSION), CONTENT_VERSION],
    )?;

    for zone in &zones.zones {
        conn.execute(
            "INSERT OR REPLACE INTO zone (zone_id, title, subject, difficulty, blurb) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                zone.id,
                zone.title,
                zone.subject,
                zone.difficulty.as_str(),
                zone.blurb
            ],
        )?;
    }

    for quest in &quests.quests {
        let doc = serde_json::to_string(quest)?;
        conn.execute(
            "INSERT OR REPLACE INTO quest (quest_id, zone_id, title, stage_count, blurb, doc) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                quest.id,
                quest.zone,
                quest.title,
                quest.stage_count() as i64,
                quest.intro,
                doc
            ],
        )?;
    }

    Ok(())
}

impl QuestRepository for SqliteQuestRepository {
    fn stats(&self) -> Result<ContentStats, Box<dyn std::error::Error>> {
        let stage_count: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(stage_count), 0) FROM quest",
            [],
            |row| row.get(0),
        )?;
        Ok(ContentStats {
            zone_count: count_rows(&self.conn, "zone")?,
            quest_count: count_rows(&self.conn, "quest")?,
            stage_count,
        })
    }

    fn zones(&self) -> Result<Vec<ZoneDef>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT zone_id, title, subject, difficulty, blurb FROM zone ORDER BY zone_id",
        )?;
        let rows = stmt.query_map([], |row| {
            let id: String = row.get(0)?;
            let title: String = row.get(1)?;
            let subject: String = row.get(2)?;
            let difficulty: String = row.get(3)?;
            let blurb: String = row.get(4)?;
            Ok((id, title, subject, difficulty, blurb))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, title, subject, difficulty, blurb) = row?;
            out.push(ZoneDef {
                id,
                title,
                subject,
                difficulty: ZoneDifficulty::from_str(&difficulty)?,
                blurb,
            });
        }
        Ok(out)
    }

    fn quests_in_zone(
        &self,
        zone_id: &str,
    ) -> Result<Vec<QuestSummary>, Box<dyn std::error::Error>> {
        let mut stmt = self.conn.prepare(
            "SELECT quest_id, zone_id, title, stage_count, blurb FROM quest \
             WHERE zone_id = ?1 ORDER BY quest_id",
        )?;
        let rows = stmt.query_map([zone_id], |row| {
            let id: String = row.get(0)?;
            let zone: String = row.get(1)?;
            let title: String = row.get(2)?;
            let stage_count: i64 = row.get(3)?;
            let blurb: String = row.get(4)?;
            Ok((id, zone, title, stage_count, blurb))
        })?;

        let mut out = Vec::new();
        for row in rows {
            let (id, zone, title, stage_count, blurb) = row?;
            out.push(QuestSummary {
                id,
                zone,
                title,
                stage_count: stage_count as usize,
                blurb,
            });
        }
        Ok(out)
    }

    fn quest(
        &self,
        quest_id: &str,
    ) -> Result<Option<QuestDefinition>, Box<dyn std::error::Error>> {
        let doc = self
            .conn
            .query_row(
                "SELECT doc FROM quest WHERE quest_id = ?1",
                [quest_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        let Some(doc) = doc else {
            return Ok(None);
        };

        let quest: QuestDefinition = serde_json::from_str(&doc)?;
        quest.validate()?;
        Ok(Some(quest))
    }
}

fn count_rows(conn: &Connection, table: &str) -> Result<i64, Box<dyn std::error::Error>> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let count = conn.query_row(&sql, [], |row| row.get::<_, i64>(0))?;
    Ok(count)
}

fn validate_content_meta(conn: &Connection) -> Result<(), Box<dyn std::error::Error>> {
    let table = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='content_meta'",
            [],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    if table.is_none() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "content_meta table missing (not a questforge content database?)",
        )
        .into());
    }

    let meta = conn
        .query_row(
            "SELECT schema_version, content_version FROM content_meta WHERE id = 1",
            [],
            |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()?;

    let Some((schema_version, content_version)) = meta else {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "content_meta missing row id=1",
        )
        .into());
    };

    if schema_version != i64::from(CONTENT_SCHEMA_VERSION) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "content_meta schema_version {} != expected {}",
                schema_version, CONTENT_SCHEMA_VERSION
            ),
        )
        .into());
    }
    if content_version != CONTENT_VERSION {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "content_meta content_version {} != expected {}",
                content_version, CONTENT_VERSION
            ),
        )
        .into());
    }

    Ok(())
}
