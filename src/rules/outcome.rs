use crate::session::vitals::VitalBank;

/// Terminal classification for a quest run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestEnd {
    AllTargetsMet,
    VitalCollapsed(String),
    BudgetExhausted(String),
    OutOfStages,
}

impl QuestEnd {
    pub fn is_victory(&self) -> bool {
        matches!(self, QuestEnd::AllTargetsMet)
    }
}

/// Classify the session after a resolution step. `None` means still playing.
///
/// The checks run in a fixed order:
/// 1. any vital at or below its critical floor loses, before anything else;
/// 2. every vital target met, and `score_target` met if declared, wins;
/// 3. the budget vital drained to its minimum loses;
/// 4. no successor stage without a win loses.
///
/// A run with no declared vital target and no score target can never win.
pub fn classify(
    vitals: &VitalBank,
    score: i64,
    score_target: Option<i64>,
    budget_vital: Option<&str>,
    has_next_stage: bool,
) -> Option<QuestEnd> {
    if let Some(vital) = vitals.first_collapsed() {
        return Some(QuestEnd::VitalCollapsed(vital.id.clone()));
    }

    let has_goal = score_target.is_some() || vitals.has_target();
    let score_met = score_target.map(|t| score >= t).unwrap_or(true);
    if has_goal && score_met && vitals.all_targets_met() {
        return Some(QuestEnd::AllTargetsMet);
    }

    if let Some(budget_id) = budget_vital {
        if let Some(budget) = vitals.get(budget_id) {
            if budget.exhausted() {
                return Some(QuestEnd::BudgetExhausted(budget.id.clone()));
            }
        }
    }

    if !has_next_stage {
        return Some(QuestEnd::OutOfStages);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::vitals::Vital;

    fn vital(id: &str, value: i64, target: Option<i64>, floor: Option<i64>) -> Vital {
        Vital {
            id: id.to_string(),
            value,
            min: 0,
            max: 100,
            target,
            critical_floor: floor,
        }
    }

    #[test]
    fn test_playing_when_no_rule_fires() {
        let vitals = VitalBank::new(vec![vital("water", 55, Some(75), Some(10))]);
        assert_eq!(classify(&vitals, 0, None, None, true), None);
    }

    #[test]
    fn test_all_targets_met_wins() {
        let vitals = VitalBank::new(vec![
            vital("water", 80, Some(75), Some(10)),
            vital("air", 75, Some(75), Some(10)),
        ]);
        assert_eq!(
            classify(&vitals, 0, None, None, true),
            Some(QuestEnd::AllTargetsMet)
        );
    }

    #[test]
    fn test_collapse_beats_win() {
        // Every target met, but one vital sits on its floor: the run is lost.
        let vitals = VitalBank::new(vec![
            vital("water", 90, Some(75), Some(10)),
            vital("plant", 10, None, Some(10)),
        ]);
        assert_eq!(
            classify(&vitals, 0, None, None, true),
            Some(QuestEnd::VitalCollapsed("plant".to_string()))
        );
    }

    #[test]
    fn test_win_requires_score_target_too() {
        let vitals = VitalBank::new(vec![vital("focus", 80, Some(75), None)]);
        assert_eq!(classify(&vitals, 2, Some(4), None, true), None);
        assert_eq!(
            classify(&vitals, 4, Some(4), None, true),
            Some(QuestEnd::AllTargetsMet)
        );
    }

    #[test]
    fn test_budget_exhaustion_loses() {
        let vitals = VitalBank::new(vec![
            vital("score_track", 10, Some(75), None),
            vital("cycles", 0, None, None),
        ]);
        assert_eq!(
            classify(&vitals, 0, None, Some("cycles"), true),
            Some(QuestEnd::BudgetExhausted("cycles".to_string()))
        );
    }

    #[test]
    fn test_win_beats_exhaustion_on_same_step() {
        // Spending the last budget point on the winning move still wins.
        let vitals = VitalBank::new(vec![
            vital("water", 80, Some(75), None),
            vital("cycles", 0, None, None),
        ]);
        assert_eq!(
            classify(&vitals, 0, None, Some("cycles"), true),
            Some(QuestEnd::AllTargetsMet)
        );
    }

    #[test]
    fn test_out_of_stages_without_win_loses() {
        let vitals = VitalBank::new(vec![vital("water", 55, Some(75), None)]);
        assert_eq!(
            classify(&vitals, 0, None, None, false),
            Some(QuestEnd::OutOfStages)
        );
    }

    #[test]
    fn test_no_goal_never_wins() {
        let vitals = VitalBank::new(vec![vital("water", 80, None, None)]);
        assert_eq!(classify(&vitals, 0, None, None, true), None);
    }

    #[test]
    fn test_victory_mapping() {
        assert!(QuestEnd::AllTargetsMet.is_victory());
        assert!(!QuestEnd::VitalCollapsed("water".to_string()).is_victory());
        assert!(!QuestEnd::BudgetExhausted("cycles".to_string()).is_victory());
        assert!(!QuestEnd::OutOfStages.is_victory());
    }
}
