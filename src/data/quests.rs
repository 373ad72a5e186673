use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::rules::condition::{parse_conditions, SCORE_KEY};
use crate::rules::effect::{parse_effects, Effect};
use crate::rules::outcome::QuestEnd;
use crate::session::vitals::Vital;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestCatalog {
    pub schema_version: u32,
    pub quests: Vec<QuestDefinition>,
}

/// One authored quest: vitals, a stage graph and the policies that drive the
/// outcome classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestDefinition {
    pub id: String,
    pub title: String,
    pub zone: String,
    #[serde(default)]
    pub intro: String,
    pub vitals: Vec<VitalSpec>,
    #[serde(default)]
    pub flags: Vec<String>,
    pub entry_stage: String,
    pub stages: Vec<StageDef>,
    #[serde(default)]
    pub budget_vital: Option<String>,
    #[serde(default)]
    pub score_target: Option<i64>,
    #[serde(default)]
    pub on_incorrect: IncorrectPolicy,
    #[serde(default = "default_incorrect_penalty")]
    pub incorrect_penalty: i64,
    #[serde(default)]
    pub endings: EndingTexts,
}

fn default_incorrect_penalty() -> i64 {
    1
}

/// Authoring-side vital declaration; instantiated into a live [`Vital`] when a
/// session starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalSpec {
    pub id: String,
    pub start: i64,
    #[serde(default)]
    pub min: i64,
    #[serde(default = "default_vital_max")]
    pub max: i64,
    #[serde(default)]
    pub target: Option<i64>,
    #[serde(default)]
    pub critical_floor: Option<i64>,
}

fn default_vital_max() -> i64 {
    100
}

impl VitalSpec {
    pub fn instantiate(&self) -> Vital {
        Vital {
            id: self.id.clone(),
            value: self.start.clamp(self.min, self.max),
            min: self.min,
            max: self.max,
            target: self.target,
            critical_floor: self.critical_floor,
        }
    }
}

/// A decision point. `requires` gates the whole stage: while unmet, none of
/// its choices are selectable. `effects` apply on every resolution at this
/// stage, before the chosen option's own effects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDef {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    pub choices: Vec<ChoiceDef>,
}

impl StageDef {
    pub fn choice(&self, choice_id: &str) -> Option<&ChoiceDef> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }
}

/// One selectable option. `next` names the successor stage; `None` ends the
/// stage sequence. `correct` marks quiz options: `Some(true)` awards a score
/// point, `Some(false)` triggers the quest's incorrect-answer policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceDef {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub cost: i64,
    #[serde(default)]
    pub requires: Vec<String>,
    #[serde(default)]
    pub effects: Vec<String>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub correct: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncorrectPolicy {
    /// Stay on the stage and answer again.
    Retry,
    /// Stay on the stage; the budget vital pays `incorrect_penalty`.
    PenalizeResource,
    /// Jump back to the entry stage; vitals, flags and score are kept.
    ResetSequence,
}

impl Default for IncorrectPolicy {
    fn default() -> Self {
        IncorrectPolicy::Retry
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndingTexts {
    #[serde(default = "default_victory_text")]
    pub victory: String,
    #[serde(default = "default_collapse_text")]
    pub collapse: String,
    #[serde(default = "default_exhausted_text")]
    pub exhausted: String,
    #[serde(default = "default_stranded_text")]
    pub stranded: String,
}

fn default_victory_text() -> String {
    "Every goal is met. The quest is complete.".to_string()
}

fn default_collapse_text() -> String {
    "A vital system collapsed beyond recovery.".to_string()
}

fn default_exhausted_text() -> String {
    "The budget ran dry before the goals were met.".to_string()
}

fn default_stranded_text() -> String {
    "The path ran out with goals still unmet.".to_string()
}

impl Default for EndingTexts {
    fn default() -> Self {
        Self {
            victory: default_victory_text(),
            collapse: default_collapse_text(),
            exhausted: default_exhausted_text(),
            stranded: default_stranded_text(),
        }
    }
}

impl EndingTexts {
    pub fn for_end(&self, end: &QuestEnd) -> &str {
        match end {
            QuestEnd::AllTargetsMet => &self.victory,
            QuestEnd::VitalCollapsed(_) => &self.collapse,
            QuestEnd::BudgetExhausted(_) => &self.exhausted,
            QuestEnd::OutOfStages => &self.stranded,
        }
    }
}

#[derive(Debug)]
pub enum QuestDataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for QuestDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestDataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            QuestDataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            QuestDataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for QuestDataError {}

pub fn load_quest_catalog(path: impl AsRef<Path>) -> Result<QuestCatalog, QuestDataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| QuestDataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog: QuestCatalog =
        serde_json::from_str(&raw).map_err(|source| QuestDataError::Json {
            path: path.display().to_string(),
            source,
        })?;
    catalog.validate()?;
    Ok(catalog)
}

impl QuestCatalog {
    pub fn validate(&self) -> Result<(), QuestDataError> {
        if self.schema_version == 0 {
            return Err(QuestDataError::Validation(
                "quest catalog schema_version must be >= 1".to_string(),
            ));
        }
        let mut ids = HashSet::new();
        for quest in &self.quests {
            quest.validate()?;
            if !ids.insert(quest.id.clone()) {
                return Err(QuestDataError::Validation(format!(
                    "duplicate quest id {}",
                    quest.id
                )));
            }
        }
        Ok(())
    }

    pub fn quest(&self, quest_id: &str) -> Option<&QuestDefinition> {
        self.quests.iter().find(|quest| quest.id == quest_id)
    }
}

impl QuestDefinition {
    pub fn stage(&self, stage_id: &str) -> Option<&StageDef> {
        self.stages.iter().find(|stage| stage.id == stage_id)
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Structural fail-fast check: ids, references, rule strings and win
    /// conditions. A definition that passes cannot produce hard errors during
    /// play.
    pub fn validate(&self) -> Result<(), QuestDataError> {
        if self.id.trim().is_empty() {
            return Err(QuestDataError::Validation(
                "quest id cannot be empty".to_string(),
            ));
        }
        if self.title.trim().is_empty() {
            return Err(QuestDataError::Validation(format!(
                "quest {} missing title",
                self.id
            )));
        }
        if self.zone.trim().is_empty() {
            return Err(QuestDataError::Validation(format!(
                "quest {} missing zone",
                self.id
            )));
        }

        self.validate_vitals()?;
        self.validate_stages()?;
        self.validate_policies()?;
        self.validate_rule_strings()?;
        Ok(())
    }

    fn validate_vitals(&self) -> Result<(), QuestDataError> {
        if self.vitals.is_empty() {
            return Err(QuestDataError::Validation(format!(
                "quest {} declares no vitals",
                self.id
            )));
        }
        let mut vital_ids = HashSet::new();
        for vital in &self.vitals {
            if vital.id.trim().is_empty() {
                return Err(QuestDataError::Validation(format!(
                    "quest {} has a vital with an empty id",
                    self.id
                )));
            }
            if vital.id == SCORE_KEY {
                return Err(QuestDataError::Validation(format!(
                    "quest {} vital id {} is reserved",
                    self.id, SCORE_KEY
                )));
            }
            if !vital_ids.insert(vital.id.clone()) {
                return Err(QuestDataError::Validation(format!(
                    "quest {} duplicate vital id {}",
                    self.id, vital.id
                )));
            }
            if vital.min > vital.max {
                return Err(QuestDataError::Validation(format!(
                    "quest {} vital {} has min {} above max {}",
                    self.id, vital.id, vital.min, vital.max
                )));
            }
            if vital.start < vital.min || vital.start > vital.max {
                return Err(QuestDataError::Validation(format!(
                    "quest {} vital {} start {} outside [{}, {}]",
                    self.id, vital.id, vital.start, vital.min, vital.max
                )));
            }
            if let Some(target) = vital.target {
                if target < vital.min || target > vital.max {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} vital {} target {} outside [{}, {}]",
                        self.id, vital.id, target, vital.min, vital.max
                    )));
                }
            }
            if let Some(floor) = vital.critical_floor {
                if floor < vital.min || floor > vital.max {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} vital {} critical floor {} outside [{}, {}]",
                        self.id, vital.id, floor, vital.min, vital.max
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_stages(&self) -> Result<(), QuestDataError> {
        if self.stages.is_empty() {
            return Err(QuestDataError::Validation(format!(
                "quest {} has no stages",
                self.id
            )));
        }
        let mut stage_ids = HashSet::new();
        for stage in &self.stages {
            if stage.id.trim().is_empty() {
                return Err(QuestDataError::Validation(format!(
                    "quest {} has a stage with an empty id",
                    self.id
                )));
            }
            if !stage_ids.insert(stage.id.clone()) {
                return Err(QuestDataError::Validation(format!(
                    "quest {} duplicate stage id {}",
                    self.id, stage.id
                )));
            }
            if stage.prompt.trim().is_empty() {
                return Err(QuestDataError::Validation(format!(
                    "quest {} stage {} missing prompt",
                    self.id, stage.id
                )));
            }
            if stage.choices.is_empty() {
                return Err(QuestDataError::Validation(format!(
                    "quest {} stage {} has no choices",
                    self.id, stage.id
                )));
            }
            let mut choice_ids = HashSet::new();
            for choice in &stage.choices {
                if choice.id.trim().is_empty() {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} has a choice with an empty id",
                        self.id, stage.id
                    )));
                }
                if !choice_ids.insert(choice.id.clone()) {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} duplicate choice id {}",
                        self.id, stage.id, choice.id
                    )));
                }
                if choice.label.trim().is_empty() {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} choice {} missing label",
                        self.id, stage.id, choice.id
                    )));
                }
                if choice.cost < 0 {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} choice {} has negative cost",
                        self.id, stage.id, choice.id
                    )));
                }
            }
        }

        if !stage_ids.contains(&self.entry_stage) {
            return Err(QuestDataError::Validation(format!(
                "quest {} entry stage {} does not exist",
                self.id, self.entry_stage
            )));
        }
        for stage in &self.stages {
            for choice in &stage.choices {
                if let Some(next) = &choice.next {
                    if !stage_ids.contains(next) {
                        return Err(QuestDataError::Validation(format!(
                            "quest {} stage {} choice {} points at missing stage {}",
                            self.id, stage.id, choice.id, next
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_policies(&self) -> Result<(), QuestDataError> {
        if let Some(budget) = &self.budget_vital {
            if !self.vitals.iter().any(|vital| &vital.id == budget) {
                return Err(QuestDataError::Validation(format!(
                    "quest {} budget vital {} is not declared",
                    self.id, budget
                )));
            }
        }

        let has_costs = self
            .stages
            .iter()
            .any(|stage| stage.choices.iter().any(|choice| choice.cost > 0));
        if has_costs && self.budget_vital.is_none() {
            return Err(QuestDataError::Validation(format!(
                "quest {} has choice costs but no budget vital",
                self.id
            )));
        }

        if self.on_incorrect == IncorrectPolicy::PenalizeResource {
            if self.budget_vital.is_none() {
                return Err(QuestDataError::Validation(format!(
                    "quest {} penalizes a resource but declares no budget vital",
                    self.id
                )));
            }
            if self.incorrect_penalty < 1 {
                return Err(QuestDataError::Validation(format!(
                    "quest {} incorrect penalty must be at least 1",
                    self.id
                )));
            }
        }

        let has_goal = self.score_target.is_some()
            || self.vitals.iter().any(|vital| vital.target.is_some());
        if !has_goal {
            return Err(QuestDataError::Validation(format!(
                "quest {} declares no vital target or score target and cannot be won",
                self.id
            )));
        }
        if let Some(target) = self.score_target {
            if target < 1 {
                return Err(QuestDataError::Validation(format!(
                    "quest {} score target must be at least 1",
                    self.id
                )));
            }
        }
        Ok(())
    }

    fn validate_rule_strings(&self) -> Result<(), QuestDataError> {
        let vital_ids: HashSet<&str> = self.vitals.iter().map(|vital| vital.id.as_str()).collect();

        for stage in &self.stages {
            self.check_conditions(&stage.requires, &vital_ids, &stage.id)?;
            self.check_effects(&stage.effects, &vital_ids, &stage.id)?;
            for choice in &stage.choices {
                let at = format!("{}/{}", stage.id, choice.id);
                self.check_conditions(&choice.requires, &vital_ids, &at)?;
                self.check_effects(&choice.effects, &vital_ids, &at)?;
            }
        }
        Ok(())
    }

    fn check_conditions(
        &self,
        raw: &[String],
        vital_ids: &HashSet<&str>,
        at: &str,
    ) -> Result<(), QuestDataError> {
        let conditions = parse_conditions(raw).map_err(|err| {
            QuestDataError::Validation(format!("quest {} stage {}: {}", self.id, at, err))
        })?;
        for condition in &conditions {
            if let Some(key) = condition.threshold_key() {
                if key != SCORE_KEY && !vital_ids.contains(key) {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} condition references unknown vital {}",
                        self.id, at, key
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_effects(
        &self,
        raw: &[String],
        vital_ids: &HashSet<&str>,
        at: &str,
    ) -> Result<(), QuestDataError> {
        let effects = parse_effects(raw).map_err(|err| {
            QuestDataError::Validation(format!("quest {} stage {}: {}", self.id, at, err))
        })?;
        for effect in &effects {
            if let Effect::VitalDelta { id, .. } = effect {
                if !vital_ids.contains(id.as_str()) {
                    return Err(QuestDataError::Validation(format!(
                        "quest {} stage {} effect references unknown vital {}",
                        self.id, at, id
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vital(id: &str, start: i64) -> VitalSpec {
        VitalSpec {
            id: id.to_string(),
            start,
            min: 0,
            max: 100,
            target: Some(75),
            critical_floor: Some(10),
        }
    }

    fn choice(id: &str, next: Option<&str>) -> ChoiceDef {
        ChoiceDef {
            id: id.to_string(),
            label: format!("Choice {}", id),
            cost: 0,
            requires: Vec::new(),
            effects: Vec::new(),
            feedback: None,
            next: next.map(str::to_string),
            correct: None,
        }
    }

    fn stage(id: &str, choices: Vec<ChoiceDef>) -> StageDef {
        StageDef {
            id: id.to_string(),
            prompt: format!("Stage {}", id),
            requires: Vec::new(),
            effects: Vec::new(),
            choices,
        }
    }

    fn quest_fixture() -> QuestDefinition {
        QuestDefinition {
            id: "fixture".to_string(),
            title: "Fixture".to_string(),
            zone: "lab".to_string(),
            intro: String::new(),
            vitals: vec![vital("water", 30)],
            flags: Vec::new(),
            entry_stage: "hub".to_string(),
            stages: vec![
                stage("hub", vec![choice("go", Some("end")), choice("stay", Some("hub"))]),
                stage("end", vec![choice("finish", None)]),
            ],
            budget_vital: None,
            score_target: None,
            on_incorrect: IncorrectPolicy::Retry,
            incorrect_penalty: 1,
            endings: EndingTexts::default(),
        }
    }

    #[test]
    fn test_fixture_is_valid() {
        quest_fixture().validate().unwrap();
    }

    #[test]
    fn test_rejects_duplicate_stage_id() {
        let mut quest = quest_fixture();
        quest.stages.push(stage("hub", vec![choice("x", None)]));
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_dangling_successor() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].next = Some("nowhere".to_string());
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_entry_stage() {
        let mut quest = quest_fixture();
        quest.entry_stage = "missing".to_string();
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_unparsable_effect() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].effects = vec!["water:soon".to_string()];
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_effect_on_unknown_vital() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].effects = vec!["lava:+5".to_string()];
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_condition_on_unknown_vital() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].requires = vec!["lava >= 1".to_string()];
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_score_condition_is_allowed() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].requires = vec!["score >= 1".to_string()];
        quest.validate().unwrap();
    }

    #[test]
    fn test_rejects_cost_without_budget() {
        let mut quest = quest_fixture();
        quest.stages[0].choices[0].cost = 2;
        assert!(quest.validate().is_err());
        quest.budget_vital = Some("water".to_string());
        quest.validate().unwrap();
    }

    #[test]
    fn test_rejects_penalize_policy_without_budget() {
        let mut quest = quest_fixture();
        quest.on_incorrect = IncorrectPolicy::PenalizeResource;
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_rejects_goalless_quest() {
        let mut quest = quest_fixture();
        quest.vitals[0].target = None;
        assert!(quest.validate().is_err());
        quest.score_target = Some(1);
        quest.validate().unwrap();
    }

    #[test]
    fn test_rejects_start_outside_bounds() {
        let mut quest = quest_fixture();
        quest.vitals[0].start = 120;
        assert!(quest.validate().is_err());
    }

    #[test]
    fn test_catalog_rejects_duplicate_quests() {
        let catalog = QuestCatalog {
            schema_version: 1,
            quests: vec![quest_fixture(), quest_fixture()],
        };
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_vital_spec_instantiates_clamped() {
        let mut spec = vital("water", 30);
        spec.min = 5;
        let live = spec.instantiate();
        assert_eq!(live.value, 30);
        assert_eq!(live.min, 5);
        assert_eq!(live.target, Some(75));
    }
}
