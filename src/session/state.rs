use std::collections::HashSet;

use crate::data::quests::{
    ChoiceDef, IncorrectPolicy, QuestDataError, QuestDefinition, VitalSpec,
};
use crate::rules::condition::first_unmet;
use crate::rules::effect::apply_effects;
use crate::rules::outcome::{classify, QuestEnd};
use crate::session::vitals::{Vital, VitalBank};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Playing,
    Won,
    Lost,
}

/// Rejection reasons for a selection. None of these mutate the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    AlreadyTerminal,
    UnknownStage(String),
    NotCurrentStage { expected: String, got: String },
    UnknownChoice(String),
    RequirementNotMet(String),
    InsufficientBudget { vital: String, cost: i64, available: i64 },
}

impl std::fmt::Display for SelectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionError::AlreadyTerminal => {
                write!(f, "session already ended; restart to play again")
            }
            SelectionError::UnknownStage(stage_id) => write!(f, "unknown stage {}", stage_id),
            SelectionError::NotCurrentStage { expected, got } => {
                write!(f, "stage {} is not the current stage {}", got, expected)
            }
            SelectionError::UnknownChoice(choice_id) => write!(f, "unknown choice {}", choice_id),
            SelectionError::RequirementNotMet(condition) => {
                write!(f, "requirement not met: {}", condition)
            }
            SelectionError::InsufficientBudget {
                vital,
                cost,
                available,
            } => write!(f, "{} too low: need {}, have {}", vital, cost, available),
        }
    }
}

impl std::error::Error for SelectionError {}

/// What one resolved selection did to the session.
#[derive(Debug, Clone)]
pub struct ChoiceOutcome {
    pub applied: Vec<String>,
    pub feedback: Option<String>,
    pub marked_incorrect: bool,
    pub end: Option<QuestEnd>,
    pub stage_after: String,
}

/// Live state of one quest run. All mutation happens through [`choose`];
/// once terminal the session freezes until [`reset`].
///
/// [`choose`]: QuestSession::choose
/// [`reset`]: QuestSession::reset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestSession {
    pub quest_id: String,
    pub vitals: VitalBank,
    pub flags: HashSet<String>,
    pub current_stage: String,
    pub score: i64,
    pub turn: u64,
    pub status: SessionStatus,
    pub end: Option<QuestEnd>,
    pub log: Vec<String>,
    seed: u64,
    rng: u64,
}

impl QuestSession {
    /// Validate the definition and begin a run. The seed pins every stochastic
    /// pick, so equal seeds replay identically.
    pub fn start(quest: &QuestDefinition, seed: u64) -> Result<Self, QuestDataError> {
        quest.validate()?;
        Ok(Self::fresh(quest, seed))
    }

    fn fresh(quest: &QuestDefinition, seed: u64) -> Self {
        let mut session = Self {
            quest_id: quest.id.clone(),
            vitals: VitalBank::new(quest.vitals.iter().map(VitalSpec::instantiate).collect()),
            flags: quest.flags.iter().cloned().collect(),
            current_stage: quest.entry_stage.clone(),
            score: 0,
            turn: 0,
            status: SessionStatus::Playing,
            end: None,
            log: Vec::new(),
            seed,
            rng: seed ^ hash_seed(&quest.id),
        };
        session.log.push(format!("Quest started: {}", quest.title));
        session
    }

    /// Rebuild this run from its definition and original seed. Nothing
    /// carries over; the result is indistinguishable from a fresh start.
    pub fn reset(&mut self, quest: &QuestDefinition) {
        *self = Self::fresh(quest, self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_terminal(&self) -> bool {
        self.status != SessionStatus::Playing
    }

    /// Choices selectable right now, in declaration order. Empty while the
    /// stage gate is unmet or the session is terminal.
    pub fn available_choices<'a>(&self, quest: &'a QuestDefinition) -> Vec<&'a ChoiceDef> {
        let Some(stage) = quest.stage(&self.current_stage) else {
            return Vec::new();
        };
        stage
            .choices
            .iter()
            .filter(|choice| self.check_choice(quest, &stage.id, &choice.id).is_ok())
            .collect()
    }

    /// Every rejection a [`choose`] call could produce, without mutating.
    ///
    /// [`choose`]: QuestSession::choose
    pub fn check_choice(
        &self,
        quest: &QuestDefinition,
        stage_id: &str,
        choice_id: &str,
    ) -> Result<(), SelectionError> {
        if self.is_terminal() {
            return Err(SelectionError::AlreadyTerminal);
        }
        let Some(stage) = quest.stage(stage_id) else {
            return Err(SelectionError::UnknownStage(stage_id.to_string()));
        };
        if stage.id != self.current_stage {
            return Err(SelectionError::NotCurrentStage {
                expected: self.current_stage.clone(),
                got: stage_id.to_string(),
            });
        }
        let Some(choice) = stage.choice(choice_id) else {
            return Err(SelectionError::UnknownChoice(choice_id.to_string()));
        };
        if let Some(unmet) = first_unmet(&stage.requires, &self.vitals, &self.flags, self.score) {
            return Err(SelectionError::RequirementNotMet(unmet.to_string()));
        }
        if let Some(unmet) = first_unmet(&choice.requires, &self.vitals, &self.flags, self.score) {
            return Err(SelectionError::RequirementNotMet(unmet.to_string()));
        }
        if choice.cost > 0 {
            let budget_id = quest.budget_vital.as_deref().unwrap_or_default();
            let available = self
                .vitals
                .get(budget_id)
                .map(Vital::headroom)
                .unwrap_or(0);
            if available < choice.cost {
                return Err(SelectionError::InsufficientBudget {
                    vital: budget_id.to_string(),
                    cost: choice.cost,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Resolve one selection: deduct the cost, apply stage then choice
    /// effects, honour the correctness policy, classify, and advance.
    pub fn choose(
        &mut self,
        quest: &QuestDefinition,
        stage_id: &str,
        choice_id: &str,
    ) -> Result<ChoiceOutcome, SelectionError> {
        self.check_choice(quest, stage_id, choice_id)?;
        let Some(stage) = quest.stage(stage_id) else {
            return Err(SelectionError::UnknownStage(stage_id.to_string()));
        };
        let Some(choice) = stage.choice(choice_id) else {
            return Err(SelectionError::UnknownChoice(choice_id.to_string()));
        };

        self.turn += 1;
        let mut applied = Vec::new();

        if choice.cost > 0 {
            if let Some(budget_id) = quest.budget_vital.as_deref() {
                if let Some(value) = self.vitals.apply_delta(budget_id, -choice.cost) {
                    applied.push(format!("{} {:+} (now {})", budget_id, -choice.cost, value));
                }
            }
        }

        applied.extend(apply_effects(
            &stage.effects,
            &mut self.vitals,
            &mut self.flags,
            &mut self.score,
            &mut self.rng,
        ));
        applied.extend(apply_effects(
            &choice.effects,
            &mut self.vitals,
            &mut self.flags,
            &mut self.score,
            &mut self.rng,
        ));

        let marked_incorrect = choice.correct == Some(false);
        if choice.correct == Some(true) {
            self.score += 1;
            applied.push(format!("score +1 (now {})", self.score));
        }

        let next_stage = if marked_incorrect {
            match quest.on_incorrect {
                IncorrectPolicy::Retry => Some(self.current_stage.clone()),
                IncorrectPolicy::PenalizeResource => {
                    if let Some(budget_id) = quest.budget_vital.as_deref() {
                        if let Some(value) =
                            self.vitals.apply_delta(budget_id, -quest.incorrect_penalty)
                        {
                            applied.push(format!(
                                "{} {:+} (now {})",
                                budget_id, -quest.incorrect_penalty, value
                            ));
                        }
                    }
                    Some(self.current_stage.clone())
                }
                IncorrectPolicy::ResetSequence => Some(quest.entry_stage.clone()),
            }
        } else {
            choice.next.clone()
        };

        self.log.push(format!("[{}] {}", self.turn, choice.label));
        for line in &applied {
            self.log.push(format!("  {}", line));
        }

        let end = classify(
            &self.vitals,
            self.score,
            quest.score_target,
            quest.budget_vital.as_deref(),
            next_stage.is_some(),
        );

        if let Some(end_reason) = &end {
            self.finish(quest, end_reason.clone());
        } else if let Some(next) = next_stage {
            self.current_stage = next;
        }

        Ok(ChoiceOutcome {
            applied,
            feedback: choice.feedback.clone(),
            marked_incorrect,
            end,
            stage_after: self.current_stage.clone(),
        })
    }

    fn finish(&mut self, quest: &QuestDefinition, end: QuestEnd) {
        self.status = if end.is_victory() {
            SessionStatus::Won
        } else {
            SessionStatus::Lost
        };
        self.log
            .push(format!("Quest ends: {}", quest.endings.for_end(&end)));
        self.end = Some(end);
    }
}

fn hash_seed(value: &str) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}
