//! Integration tests for full quest runs through the ECS runner.
//!
//! Exercises: intent queue → session admin → selection resolution
//! → outcome classification → snapshot capture, over the builtin pack.
//!
//! All tests drive the public `QuestRunner` surface only.

use questforge::data::{
    builtin_quest_catalog, builtin_zone_catalog, load_quest_catalog, load_zone_catalog, ChoiceDef,
    EndingTexts, IncorrectPolicy, QuestCatalog, QuestDefinition, StageDef, VitalSpec,
};
use questforge::rules::QuestEnd;
use questforge::{QuestIntent, QuestRunner, QuestSnapshot, SessionStatus};

// ── Helpers ────────────────────────────────────────────────────────────

fn start(quest_id: &str) -> QuestIntent {
    QuestIntent::Start {
        quest_id: quest_id.to_string(),
    }
}

fn choose(stage_id: &str, choice_id: &str) -> QuestIntent {
    QuestIntent::Choose {
        stage_id: stage_id.to_string(),
        choice_id: choice_id.to_string(),
    }
}

fn vital(snapshot: &QuestSnapshot, id: &str) -> i64 {
    snapshot
        .vitals
        .iter()
        .find(|v| v.id == id)
        .map(|v| v.value)
        .unwrap()
}

fn readings(snapshot: &QuestSnapshot) -> Vec<(String, i64)> {
    snapshot
        .vitals
        .iter()
        .map(|v| (v.id.clone(), v.value))
        .collect()
}

/// Play a scripted run and return the final snapshot.
fn run_script(runner: &mut QuestRunner, script: &[(&str, &str)]) -> QuestSnapshot {
    let mut last = runner.snapshot();
    for (stage_id, choice_id) in script {
        last = runner.tick(vec![choose(stage_id, choice_id)]);
    }
    last
}

/// One quest where the winning move also drops a gauge through its floor.
fn overreach_catalog() -> QuestCatalog {
    QuestCatalog {
        schema_version: 1,
        quests: vec![QuestDefinition {
            id: "flood-gate".to_string(),
            title: "Flood Gate".to_string(),
            zone: "terra-dome".to_string(),
            intro: String::new(),
            vitals: vec![
                VitalSpec {
                    id: "water".to_string(),
                    start: 30,
                    min: 0,
                    max: 100,
                    target: Some(75),
                    critical_floor: None,
                },
                VitalSpec {
                    id: "plant".to_string(),
                    start: 40,
                    min: 0,
                    max: 100,
                    target: None,
                    critical_floor: Some(10),
                },
            ],
            flags: Vec::new(),
            entry_stage: "sluice".to_string(),
            stages: vec![StageDef {
                id: "sluice".to_string(),
                prompt: "The sluice wheel waits.".to_string(),
                requires: Vec::new(),
                effects: Vec::new(),
                choices: vec![ChoiceDef {
                    id: "open-wide".to_string(),
                    label: "Open the sluice all the way".to_string(),
                    cost: 0,
                    requires: Vec::new(),
                    effects: vec!["water:+60".to_string(), "plant:-40".to_string()],
                    feedback: None,
                    next: Some("sluice".to_string()),
                    correct: None,
                }],
            }],
            budget_vital: None,
            score_target: None,
            on_incorrect: IncorrectPolicy::Retry,
            incorrect_penalty: 1,
            endings: EndingTexts::default(),
        }],
    }
}

// ── Shipped content ────────────────────────────────────────────────────

#[test]
fn asset_catalogs_mirror_the_builtin_pack() {
    let zones = load_zone_catalog("assets/data/zones_core.json").unwrap();
    let quests = load_quest_catalog("assets/data/quests_core.json").unwrap();

    let as_value = serde_json::to_value(&zones).unwrap();
    let builtin = serde_json::to_value(&builtin_zone_catalog()).unwrap();
    assert_eq!(as_value, builtin, "zone assets drifted from the builtin pack");

    let as_value = serde_json::to_value(&quests).unwrap();
    let builtin = serde_json::to_value(&builtin_quest_catalog()).unwrap();
    assert_eq!(as_value, builtin, "quest assets drifted from the builtin pack");
}

// ── Full-run outcomes ──────────────────────────────────────────────────

#[test]
fn biosphere_restoration_reaches_victory() {
    let mut runner = QuestRunner::new(11);
    let snapshot = runner.tick(vec![start("verdant-biosphere")]);
    assert_eq!(snapshot.status, Some(SessionStatus::Playing));

    let last = run_script(
        &mut runner,
        &[
            ("control-room", "install-filter"),
            ("control-room", "install-filter"),
            ("control-room", "cycle-scrubbers"),
            ("control-room", "cycle-scrubbers"),
            ("control-room", "seed-planters"),
            ("control-room", "seed-planters"),
            ("control-room", "release-pollinators"),
            ("control-room", "release-pollinators"),
            ("control-room", "release-pollinators"),
            ("control-room", "install-filter"),
        ],
    );
    assert_eq!(last.status, Some(SessionStatus::Won));
    assert_eq!(last.end, Some(QuestEnd::AllTargetsMet));
    assert_eq!(last.turn, 10);
    for v in &last.vitals {
        assert!(
            v.value >= v.target.unwrap(),
            "{} finished below target",
            v.id
        );
    }
    assert!(last
        .events
        .iter()
        .any(|line| line.contains("Every gauge holds green")));
}

#[test]
fn firewall_perfect_run_wins_with_budget_left() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("firewall-triage")]);
    let last = run_script(
        &mut runner,
        &[
            ("port-sweep", "blackhole-route"),
            ("invoice-lure", "quarantine-message"),
            ("emergency-patch", "canary-rollout"),
        ],
    );
    assert_eq!(last.status, Some(SessionStatus::Won));
    assert_eq!(last.end, Some(QuestEnd::AllTargetsMet));
    assert_eq!(last.score, 3);
    assert_eq!(last.score_target, Some(3));
    assert_eq!(vital(&last, "cycles"), 5);
    assert_eq!(vital(&last, "integrity"), 60);
}

#[test]
fn caravan_scouted_route_reaches_the_gates() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("caravan-crossroads")]);
    let last = run_script(
        &mut runner,
        &[
            ("trailhead", "hire-scout"),
            ("fork", "smugglers-pass"),
            ("springs", "night-march"),
            ("flats", "force-pace"),
            ("gates", "beggars-gate"),
        ],
    );
    assert_eq!(last.status, Some(SessionStatus::Won));
    assert_eq!(last.end, Some(QuestEnd::AllTargetsMet));
    assert_eq!(vital(&last, "progress"), 100);
    assert_eq!(vital(&last, "supplies"), 2);
    assert!(last.flags.iter().any(|flag| flag == "scout-map"));
}

#[test]
fn cipher_study_loop_burns_the_lantern_dry() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("sarcophagus-cipher")]);
    let mut last = runner.snapshot();
    for _ in 0..10 {
        last = runner.tick(vec![choose("riddle-sun", "study-frieze")]);
    }
    assert_eq!(last.turn, 10);
    assert_eq!(vital(&last, "lantern-oil"), 0);
    assert_eq!(last.status, Some(SessionStatus::Lost));
    assert_eq!(
        last.end,
        Some(QuestEnd::BudgetExhausted("lantern-oil".to_string()))
    );
    assert!(last
        .events
        .iter()
        .any(|line| line.contains("The lantern gutters out")));
}

#[test]
fn collapse_outranks_victory_on_the_same_step() {
    let mut runner = QuestRunner::with_catalog(7, overreach_catalog());
    runner.tick(vec![start("flood-gate")]);
    let last = runner.tick(vec![choose("sluice", "open-wide")]);

    // Water lands on its target in the same step plant falls through the
    // floor; the collapse decides the run.
    assert_eq!(vital(&last, "water"), 90);
    assert_eq!(vital(&last, "plant"), 0);
    assert_eq!(last.status, Some(SessionStatus::Lost));
    assert_eq!(last.end, Some(QuestEnd::VitalCollapsed("plant".to_string())));
}

// ── Selection rules ────────────────────────────────────────────────────

#[test]
fn vital_gains_clamp_at_the_declared_max() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("verdant-biosphere")]);
    let mut seen = Vec::new();
    for _ in 0..6 {
        let snapshot = runner.tick(vec![choose("control-room", "install-filter")]);
        seen.push(vital(&snapshot, "water"));
    }
    assert_eq!(seen, vec![55, 80, 100, 100, 100, 100]);
    let last = runner.snapshot();
    assert!(last.events.iter().any(|line| line.contains("water +25 (now 100)")));
}

#[test]
fn unscouted_caravan_cannot_take_the_pass() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("caravan-crossroads")]);
    let at_fork = runner.tick(vec![choose("trailhead", "set-out")]);
    assert_eq!(at_fork.stage_id.as_deref(), Some("fork"));
    let ids: Vec<&str> = at_fork.available.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["canyon-road", "dune-crossing"]);

    let rejected = runner.tick(vec![choose("fork", "smugglers-pass")]);
    assert_eq!(rejected.turn, at_fork.turn);
    assert!(rejected
        .events
        .iter()
        .any(|line| line.contains("flag.scout-map")));
}

#[test]
fn diagnostic_reveals_exactly_one_contaminant_followup() {
    let mut runner = QuestRunner::new(7);
    let started = runner.tick(vec![start("verdant-biosphere")]);
    let ids: Vec<&str> = started.available.iter().map(|c| c.id.as_str()).collect();
    assert!(!ids.contains(&"lime-dose"));
    assert!(!ids.contains(&"fungicide-mist"));

    let after = runner.tick(vec![choose("control-room", "soil-diagnostic")]);
    assert_eq!(after.flags.len(), 1);
    let ids: Vec<&str> = after.available.iter().map(|c| c.id.as_str()).collect();
    assert!(
        ids.contains(&"lime-dose") ^ ids.contains(&"fungicide-mist"),
        "one treatment should unlock, got {:?}",
        ids
    );
    assert_eq!(ids.len(), 7);
}

#[test]
fn terminal_session_rejects_further_selections() {
    let mut runner = QuestRunner::new(7);
    runner.tick(vec![start("verdant-biosphere")]);
    let lost = runner.tick(vec![choose("control-room", "dump-greywater")]);
    assert_eq!(lost.status, Some(SessionStatus::Lost));
    assert_eq!(lost.end, Some(QuestEnd::VitalCollapsed("plant".to_string())));
    assert!(lost.available.is_empty());

    let after = runner.tick(vec![choose("control-room", "install-filter")]);
    assert_eq!(after.turn, lost.turn);
    assert_eq!(vital(&after, "water"), vital(&lost, "water"));
    assert!(after
        .events
        .iter()
        .any(|line| line.contains("Selection rejected")));
}

// ── Determinism and restart ────────────────────────────────────────────

#[test]
fn equal_seeds_replay_identically() {
    let script = [
        ("control-room", "soil-diagnostic"),
        ("control-room", "install-filter"),
        ("control-room", "soil-diagnostic"),
    ];
    let run = |seed: u64| {
        let mut runner = QuestRunner::new(seed);
        runner.tick(vec![start("verdant-biosphere")]);
        run_script(&mut runner, &script)
    };

    let a = run(303);
    let b = run(303);
    assert_eq!(a.turn, b.turn);
    assert_eq!(a.score, b.score);
    assert_eq!(a.flags, b.flags);
    assert_eq!(a.stage_id, b.stage_id);
    assert_eq!(a.events, b.events);
    assert_eq!(readings(&a), readings(&b));
}

#[test]
fn restart_matches_a_fresh_start() {
    let script = [
        ("control-room", "soil-diagnostic"),
        ("control-room", "cycle-scrubbers"),
    ];
    let mut played = QuestRunner::new(23);
    played.tick(vec![start("verdant-biosphere")]);
    run_script(&mut played, &script);
    let restarted = played.tick(vec![QuestIntent::Restart]);

    let mut fresh = QuestRunner::new(23);
    let started = fresh.tick(vec![start("verdant-biosphere")]);

    assert_eq!(restarted.turn, started.turn);
    assert_eq!(restarted.score, started.score);
    assert_eq!(restarted.flags, started.flags);
    assert_eq!(restarted.stage_id, started.stage_id);
    assert_eq!(readings(&restarted), readings(&started));

    // The restarted run replays onto the same values as the fresh one.
    let a = run_script(&mut played, &script);
    let b = run_script(&mut fresh, &script);
    assert_eq!(readings(&a), readings(&b));
    assert_eq!(a.flags, b.flags);
}
