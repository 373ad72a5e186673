use std::collections::{HashMap, HashSet, VecDeque};

use crate::data::quests::{QuestCatalog, QuestDefinition};
use crate::data::zones::ZoneCatalog;
use crate::rules::effect::Effect;

pub fn render_authoring_dashboard(zones: &ZoneCatalog, quests: &QuestCatalog) -> String {
    let mut output = String::new();
    output.push_str("=== Authoring Console ===\n");

    let mut zone_quest_counts: HashMap<String, usize> = HashMap::new();
    let mut orphan_quests = 0usize;
    for quest in &quests.quests {
        if zones.zone(&quest.zone).is_some() {
            *zone_quest_counts.entry(quest.zone.clone()).or_insert(0) += 1;
        } else {
            orphan_quests += 1;
        }
    }

    output.push_str("Zones\n");
    output.push_str(&format!("  Total: {}\n", zones.zones.len()));
    for zone in &zones.zones {
        let count = zone_quest_counts.get(&zone.id).copied().unwrap_or(0);
        output.push_str(&format!(
            "  {} [{}] {}: {} quests\n",
            zone.id,
            zone.difficulty.as_str(),
            zone.title,
            count
        ));
    }
    if orphan_quests > 0 {
        output.push_str(&format!("  Orphan quests (unknown zone): {}\n", orphan_quests));
    }

    let mut stage_total = 0usize;
    let mut choice_total = 0usize;
    let mut gated_stages = 0usize;
    let mut gated_choices = 0usize;
    let mut costed_choices = 0usize;
    let mut graded_choices = 0usize;
    let mut feedback_choices = 0usize;
    let mut reveal_effects = 0usize;
    let mut budgeted_quests = 0usize;
    let mut scored_quests = 0usize;
    let mut policy_counts: HashMap<String, usize> = HashMap::new();
    let mut vital_specs = 0usize;
    let mut vital_targets = 0usize;
    let mut vital_floors = 0usize;

    for quest in &quests.quests {
        stage_total += quest.stages.len();
        if quest.budget_vital.is_some() {
            budgeted_quests += 1;
        }
        if quest.score_target.is_some() {
            scored_quests += 1;
        }
        *policy_counts
            .entry(format!("{:?}", quest.on_incorrect))
            .or_insert(0) += 1;

        for spec in &quest.vitals {
            vital_specs += 1;
            if spec.target.is_some() {
                vital_targets += 1;
            }
            if spec.critical_floor.is_some() {
                vital_floors += 1;
            }
        }

        for stage in &quest.stages {
            if !stage.requires.is_empty() {
                gated_stages += 1;
            }
            reveal_effects += count_reveals(&stage.effects);
            choice_total += stage.choices.len();
            for choice in &stage.choices {
                if !choice.requires.is_empty() {
                    gated_choices += 1;
                }
                if choice.cost > 0 {
                    costed_choices += 1;
                }
                if choice.correct.is_some() {
                    graded_choices += 1;
                }
                if choice.feedback.is_some() {
                    feedback_choices += 1;
                }
                reveal_effects += count_reveals(&choice.effects);
            }
        }
    }

    output.push_str("\nQuests\n");
    output.push_str(&format!("  Total: {}\n", quests.quests.len()));
    output.push_str(&format!("  Stages: {}\n", stage_total));
    output.push_str(&format!("  Choices: {}\n", choice_total));
    output.push_str(&format!("  Budgeted: {}\n", budgeted_quests));
    output.push_str(&format!("  Score-targeted: {}\n", scored_quests));
    output.push_str("  Incorrect policies:\n");
    let mut policies: Vec<(String, usize)> = policy_counts.into_iter().collect();
    policies.sort_by(|a, b| a.0.cmp(&b.0));
    for (policy, count) in policies {
        output.push_str(&format!("    {}: {}\n", policy, count));
    }

    output.push_str("\nChoices\n");
    output.push_str(&format!("  Gated: {}\n", gated_choices));
    output.push_str(&format!("  Costed: {}\n", costed_choices));
    output.push_str(&format!("  Graded: {}\n", graded_choices));
    output.push_str(&format!("  With feedback: {}\n", feedback_choices));
    if gated_stages > 0 {
        output.push_str(&format!("  Gated stages: {}\n", gated_stages));
    }
    if reveal_effects > 0 {
        output.push_str(&format!("  Reveal effects: {}\n", reveal_effects));
    }

    output.push_str("\nVitals\n");
    output.push_str(&format!("  Specs: {}\n", vital_specs));
    output.push_str(&format!("  With target: {}\n", vital_targets));
    output.push_str(&format!("  With critical floor: {}\n", vital_floors));

    let mut unreachable: Vec<String> = Vec::new();
    let mut final_stages = 0usize;
    for quest in &quests.quests {
        let reachable = reachable_stages(quest);
        for stage in &quest.stages {
            if !reachable.contains(stage.id.as_str()) {
                unreachable.push(format!("    {}: {}\n", quest.id, stage.id));
            }
            if stage.choices.iter().all(|choice| choice.next.is_none()) {
                final_stages += 1;
            }
        }
    }

    output.push_str("\nLint\n");
    output.push_str(&format!("  Final stages (no outgoing choice): {}\n", final_stages));
    if unreachable.is_empty() {
        output.push_str("  Unreachable stages: none\n");
    } else {
        output.push_str(&format!("  Unreachable stages: {}\n", unreachable.len()));
        unreachable.sort();
        for line in unreachable {
            output.push_str(&line);
        }
    }

    output
}

fn count_reveals(effects: &[String]) -> usize {
    effects
        .iter()
        .filter(|raw| matches!(raw.parse::<Effect>(), Ok(Effect::RevealOneOf(_))))
        .count()
}

/// Stage ids reachable from the entry stage by following choice successors.
/// The incorrect policy never adds edges beyond the entry stage itself.
fn reachable_stages(quest: &QuestDefinition) -> HashSet<&str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut frontier: VecDeque<&str> = VecDeque::new();
    frontier.push_back(quest.entry_stage.as_str());

    while let Some(stage_id) = frontier.pop_front() {
        if !seen.insert(stage_id) {
            continue;
        }
        let Some(stage) = quest.stage(stage_id) else {
            continue;
        };
        for choice in &stage.choices {
            if let Some(next) = choice.next.as_deref() {
                if !seen.contains(next) {
                    frontier.push_back(next);
                }
            }
        }
    }

    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{builtin_quest_catalog, builtin_zone_catalog};

    #[test]
    fn test_dashboard_covers_builtin_pack() {
        let report =
            render_authoring_dashboard(&builtin_zone_catalog(), &builtin_quest_catalog());
        assert!(report.contains("=== Authoring Console ==="));
        assert!(report.contains("Total: 4\n"));
        assert!(report.contains("terra-dome [INTRO]"));
        assert!(report.contains("Unreachable stages: none"));
    }

    #[test]
    fn test_unreachable_stage_is_flagged() {
        let zones = builtin_zone_catalog();
        let mut quests = builtin_quest_catalog();
        if let Some(quest) = quests.quests.iter_mut().find(|q| q.id == "firewall-triage") {
            let mut stray = quest.stages[0].clone();
            stray.id = "orphaned-stage".to_string();
            quest.stages.push(stray);
        }

        let report = render_authoring_dashboard(&zones, &quests);
        assert!(report.contains("Unreachable stages: 1"));
        assert!(report.contains("firewall-triage: orphaned-stage"));
    }
}
